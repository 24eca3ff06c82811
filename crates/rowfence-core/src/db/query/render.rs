//! SQL text rendering for diagnostics.
//!
//! The engine never parses this text; it exists so callers can see exactly
//! which restriction a failed mutation carried.

use crate::{
    config::SqlConfig,
    db::{
        primitives::{Cmp, FilterClause, FilterExpr},
        query::{DeleteQuery, UpdateQuery},
    },
    value::Value,
};

///
/// SqlRenderer
///

#[derive(Clone, Copy, Debug)]
pub struct SqlRenderer {
    quote_identifiers: bool,
}

impl Default for SqlRenderer {
    fn default() -> Self {
        Self::new(&SqlConfig::default())
    }
}

// Enclosing connective of the term being rendered.
#[derive(Clone, Copy, Eq, PartialEq)]
enum Parent {
    Root,
    And,
    Or,
}

impl SqlRenderer {
    #[must_use]
    pub const fn new(config: &SqlConfig) -> Self {
        Self {
            quote_identifiers: config.quote_identifiers,
        }
    }

    #[must_use]
    pub fn delete(&self, query: &DeleteQuery) -> String {
        let mut sql = format!("DELETE FROM {}", self.ident(&query.table));
        self.push_where(&mut sql, &query.filter);
        sql
    }

    #[must_use]
    pub fn update(&self, query: &UpdateQuery) -> String {
        let assignments: Vec<_> = query
            .set
            .iter()
            .map(|(field, value)| format!("{} = {}", self.ident(field), value.to_sql_literal()))
            .collect();

        let mut sql = format!(
            "UPDATE {} SET {}",
            self.ident(&query.table),
            assignments.join(", ")
        );
        self.push_where(&mut sql, &query.filter);
        sql
    }

    /// Render a bare restriction as it would appear after `WHERE`.
    #[must_use]
    pub fn filter(&self, expr: &FilterExpr) -> String {
        self.expr(expr, Parent::Root)
    }

    fn push_where(&self, sql: &mut String, filter: &FilterExpr) {
        if matches!(filter, FilterExpr::True) {
            return;
        }
        sql.push_str(" WHERE ");
        sql.push_str(&self.filter(filter));
    }

    fn ident(&self, name: &str) -> String {
        if self.quote_identifiers {
            format!("\"{}\"", name.replace('"', "\"\""))
        } else {
            name.to_string()
        }
    }

    fn expr(&self, expr: &FilterExpr, parent: Parent) -> String {
        match expr {
            FilterExpr::True => "TRUE".to_string(),
            FilterExpr::False => "FALSE".to_string(),
            FilterExpr::Clause(clause) => self.clause(clause),
            FilterExpr::And(children) => {
                self.connective(children, " AND ", Parent::And, parent == Parent::Or)
            }
            FilterExpr::Or(children) => {
                self.connective(children, " OR ", Parent::Or, parent == Parent::And)
            }
            FilterExpr::Not(inner) => format!("NOT ({})", self.expr(inner, Parent::Root)),
        }
    }

    fn connective(&self, children: &[FilterExpr], sep: &str, this: Parent, wrap: bool) -> String {
        let parts: Vec<_> = children.iter().map(|c| self.expr(c, this)).collect();
        let joined = parts.join(sep);

        if wrap { format!("({joined})") } else { joined }
    }

    fn clause(&self, clause: &FilterClause) -> String {
        let field = self.ident(&clause.field);
        let value = &clause.value;

        match clause.cmp {
            Cmp::Eq if value.is_null() => format!("{field} IS NULL"),
            Cmp::Ne if value.is_null() => format!("{field} IS NOT NULL"),
            Cmp::IsNull | Cmp::IsNotNull => format!("{field} {}", clause.cmp.sql_operator()),
            Cmp::In | Cmp::NotIn => match value {
                Value::List(items) if items.is_empty() => {
                    let constant = if clause.cmp == Cmp::In { "FALSE" } else { "TRUE" };
                    constant.to_string()
                }
                Value::List(_) => {
                    format!("{field} {} {}", clause.cmp.sql_operator(), value.to_sql_literal())
                }
                scalar => format!(
                    "{field} {} ({})",
                    clause.cmp.sql_operator(),
                    scalar.to_sql_literal()
                ),
            },
            Cmp::Contains | Cmp::StartsWith | Cmp::EndsWith => {
                let pattern = match (clause.cmp, value.as_text()) {
                    (Cmp::Contains, Some(s)) => Value::Text(format!("%{s}%")),
                    (Cmp::StartsWith, Some(s)) => Value::Text(format!("{s}%")),
                    (Cmp::EndsWith, Some(s)) => Value::Text(format!("%{s}")),
                    _ => value.clone(),
                };
                format!("{field} LIKE {}", pattern.to_sql_literal())
            }
            Cmp::Eq | Cmp::Ne | Cmp::Lt | Cmp::Lte | Cmp::Gt | Cmp::Gte => {
                format!("{field} {} {}", clause.cmp.sql_operator(), value.to_sql_literal())
            }
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::primitives::FilterExt;

    fn render(expr: FilterExpr) -> String {
        SqlRenderer::default().filter(&expr)
    }

    #[test]
    fn top_level_conjunction_renders_flat_in_order() {
        let q = DeleteQuery::new("items")
            .filter(FilterExpr::eq("id", 1))
            .filter(FilterExpr::eq("a", 1))
            .filter(FilterExpr::eq("b", 2));

        assert_eq!(
            SqlRenderer::default().delete(&q),
            r#"DELETE FROM "items" WHERE "id" = 1 AND "a" = 1 AND "b" = 2"#
        );
    }

    #[test]
    fn unrestricted_statements_have_no_where() {
        let q = UpdateQuery::new("items").set("name", "x");

        assert_eq!(
            SqlRenderer::default().update(&q),
            r#"UPDATE "items" SET "name" = 'x'"#
        );
        assert_eq!(
            SqlRenderer::default().delete(&DeleteQuery::new("items")),
            r#"DELETE FROM "items""#
        );
    }

    #[test]
    fn nested_connectives_are_parenthesised() {
        let f = FilterExpr::eq("id", 1) & (FilterExpr::eq("a", 1) | FilterExpr::eq("b", 2));
        assert_eq!(render(f), r#""id" = 1 AND ("a" = 1 OR "b" = 2)"#);

        let g = (FilterExpr::eq("a", 1) & FilterExpr::eq("b", 2)) | FilterExpr::eq("c", 3);
        assert_eq!(render(g), r#"("a" = 1 AND "b" = 2) OR "c" = 3"#);

        assert_eq!(render(!FilterExpr::eq("a", true)), r#"NOT ("a" = TRUE)"#);
    }

    #[test]
    fn null_membership_and_patterns() {
        assert_eq!(render(FilterExpr::eq("a", ())), r#""a" IS NULL"#);
        assert_eq!(render(FilterExpr::ne("a", ())), r#""a" IS NOT NULL"#);
        assert_eq!(render(FilterExpr::in_iter("a", [1, 2])), r#""a" IN (1, 2)"#);
        assert_eq!(render(FilterExpr::in_iter("a", Vec::<i64>::new())), "FALSE");
        assert_eq!(render(FilterExpr::starts_with("n", "Ad")), r#""n" LIKE 'Ad%'"#);
        assert_eq!(render(FilterExpr::ne("n", "o'k")), r#""n" <> 'o''k'"#);
    }

    #[test]
    fn identifiers_can_render_bare() {
        let renderer = SqlRenderer::new(&SqlConfig {
            quote_identifiers: false,
        });
        let q = DeleteQuery::new("items").filter(FilterExpr::eq("id", 1));

        assert_eq!(renderer.delete(&q), "DELETE FROM items WHERE id = 1");
    }
}
