use super::*;
use std::cmp::Ordering;

#[test]
fn cross_sign_integers_compare_numerically() {
    assert!(values_equal(&Value::Int(1), &Value::Uint(1)));
    assert_eq!(
        compare_order(&Value::Int(-1), &Value::Uint(0)),
        Some(Ordering::Less)
    );
    assert_eq!(
        compare_order(&Value::Uint(u64::MAX), &Value::Int(i64::MAX)),
        Some(Ordering::Greater)
    );
}

#[test]
fn null_never_equals_anything() {
    assert!(!values_equal(&Value::Null, &Value::Null));
    assert!(!values_equal(&Value::Null, &Value::Int(0)));
    assert_eq!(compare_order(&Value::Null, &Value::Int(0)), None);
}

#[test]
fn mismatched_families_do_not_order() {
    assert_eq!(
        compare_order(&Value::Text("1".into()), &Value::Int(1)),
        None
    );
    assert!(!values_equal(&Value::Bool(true), &Value::Int(1)));
}

#[test]
fn sql_literals_escape_quotes() {
    assert_eq!(Value::Text("o'neil".into()).to_sql_literal(), "'o''neil'");
    assert_eq!(Value::Bool(true).to_sql_literal(), "TRUE");
    assert_eq!(Value::Null.to_sql_literal(), "NULL");
    assert_eq!(
        Value::List(vec![Value::Int(1), Value::Text("a".into())]).to_sql_literal(),
        "(1, 'a')"
    );
}
