use proptest::prelude::*;
use rowfence::{
    error::{ErrorKind, RecordErrorKind},
    prelude::*,
};
use std::{
    io,
    sync::{Arc, Mutex, Once},
};
use tracing_subscriber::{filter::LevelFilter, util::SubscriberInitExt};

///
/// Item
///

struct Item;

impl Path for Item {
    const PATH: &'static str = "tests::Item";
}

impl EntityKind for Item {
    const TABLE: &'static str = "items";
    const PRIMARY_KEY: &'static str = "id";
    const FIELDS: &'static [&'static str] = &["id", "flag", "name", "a", "b"];
}

fn init_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

///
/// CapturedLogs
/// In-memory writer for asserting on formatted tracing output.
///

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn text(&self) -> String {
        let buf = self.0.lock().expect("log buffer should lock");
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("log buffer should lock")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// Runs `f` under a thread-local DEBUG subscriber and returns what it logged.
fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(LevelFilter::DEBUG)
        .finish();

    let result = {
        let _guard = subscriber.set_default();
        f()
    };

    (result, logs.text())
}

fn seed(db: &Db, flag: bool) -> Record<Item> {
    init_tracing();

    let row = Row::new()
        .with("id", 1)
        .with("flag", flag)
        .with("name", "first")
        .with("a", 1)
        .with("b", 2);

    Record::<Item>::insert(db, row).expect("seed insert should succeed")
}

// ─────────────────────────────────────────────
// SCENARIOS
// ─────────────────────────────────────────────

#[test]
fn filtered_out_delete_fails_and_keeps_row() {
    let db = Db::new();
    let mut handle = seed(&db, false);
    handle.instance_filter(("flag", true));

    let err: Error = handle.delete().expect_err("delete should be filtered out").into();

    assert_eq!(
        err.kind,
        ErrorKind::Record(RecordErrorKind::InstanceFilterMismatch)
    );
    assert!(
        err.message
            .contains(r#"DELETE FROM "items" WHERE "id" = 1 AND "flag" = TRUE"#)
    );
    assert!(db.get::<Item>(&Key::Int(1)).is_some());
    assert_eq!(handle.instance_filters().len(), 1);
}

#[test]
fn delete_succeeds_once_another_handle_satisfies_the_filter() {
    let db = Db::new();
    let mut handle = seed(&db, false);
    handle.instance_filter(("flag", true));

    let mut other = Record::<Item>::load(&db, 1).expect("load should succeed");
    other
        .update([("flag", true)])
        .expect("other handle update should succeed");

    let outcome = handle.delete().expect("delete should now succeed");

    assert_eq!(outcome.rows_affected, 1);
    assert!(handle.instance_filters().is_empty());
    assert!(db.get::<Item>(&Key::Int(1)).is_none());
}

#[test]
fn unfiltered_update_matches_the_base_statement() {
    let db = Db::new();
    let mut handle = seed(&db, true);

    let base = UpdateQuery::for_entity::<Item>()
        .set("name", "x")
        .filter(("id", 1));
    assert_eq!(
        handle.update_query([("name", "x")]).expect("preview should build"),
        base
    );

    let outcome = handle
        .update([("name", "x")])
        .expect("update should succeed");

    assert_eq!(outcome.sql, base.to_sql(&db.renderer()));
    assert_eq!(outcome.sql, r#"UPDATE "items" SET "name" = 'x' WHERE "id" = 1"#);
    assert_eq!(handle.get("name").as_text(), Some("x"));
}

#[test]
fn filters_render_in_the_order_they_were_added() {
    let db = Db::new();
    let mut handle = seed(&db, true);
    handle.instance_filter(("a", 1)).instance_filter(("b", 2));

    let preview = handle
        .delete_query()
        .expect("preview should build")
        .to_sql(&db.renderer());
    assert_eq!(
        preview,
        r#"DELETE FROM "items" WHERE "id" = 1 AND "a" = 1 AND "b" = 2"#
    );

    let outcome = handle.delete().expect("delete should succeed");
    assert_eq!(outcome.sql, preview);
}

// ─────────────────────────────────────────────
// HANDLES
// ─────────────────────────────────────────────

#[test]
fn handles_for_the_same_row_are_independent() {
    let db = Db::new();
    let mut first = seed(&db, true);
    let mut second = Record::<Item>::load(&db, 1).expect("load should succeed");

    first.instance_filter(("flag", false));

    assert!(second.instance_filters().is_empty());
    second
        .update([("name", "second")])
        .expect("unfiltered handle should update");
    assert_eq!(first.instance_filters().len(), 1);

    let err = first
        .update([("name", "first-again")])
        .expect_err("filtered handle should fail");
    assert!(Error::from(err).is_instance_filter_mismatch());
}

#[test]
fn mismatch_on_a_missing_row_reports_zero_rows() {
    let db = Db::new();
    let mut handle = seed(&db, true);
    let mut other = Record::<Item>::load(&db, 1).expect("load should succeed");
    other.delete().expect("first delete should succeed");

    let err = handle.delete().expect_err("row is already gone");
    let mismatch = err
        .instance_filter_mismatch()
        .expect("error should carry mismatch detail");

    assert_eq!(mismatch.rows_affected, 0);
    assert_eq!(mismatch.kind, MutationKind::Delete);
}

// ─────────────────────────────────────────────
// CONFIGURATION
// ─────────────────────────────────────────────

#[test]
fn debug_config_logs_executed_statements() {
    let config = RowfenceConfig::from_toml_str(
        "[sql]\nquote_identifiers = false\n\n[executor]\ndebug = true\n",
    )
    .expect("config should parse");
    let db = Db::with_config(config);
    let mut handle = seed(&db, true);
    handle.instance_filter(("flag", true));

    let (result, logs) = capture_logs(|| handle.delete());
    let outcome = result.expect("delete should succeed");

    assert_eq!(outcome.sql, "DELETE FROM items WHERE id = 1 AND flag = TRUE");
    assert!(logs.contains("mutation executed"), "logs: {logs}");
    assert!(logs.contains("sql=DELETE FROM items WHERE id = 1 AND flag = TRUE"));
    assert!(logs.contains("rows_affected=1"));
    assert!(logs.contains("instance filters cleared"));
}

#[test]
fn statements_are_not_logged_without_debug() {
    let db = Db::new();
    let mut handle = seed(&db, false);
    handle.instance_filter(("flag", true));

    let (result, logs) = capture_logs(|| handle.delete());
    result.expect_err("delete should be filtered out");

    assert!(!db.config().executor.debug);
    assert!(!logs.contains("mutation executed"), "logs: {logs}");
    assert!(logs.contains("instance filter mismatch"));
    assert!(logs.contains("rows_affected=0"));
}

// ─────────────────────────────────────────────
// PROPERTIES
// ─────────────────────────────────────────────

proptest! {
    #[test]
    fn reported_sql_is_the_previewed_statement(
        flag in any::<bool>(),
        wanted in prop::collection::vec(any::<bool>(), 0..4),
    ) {
        let db = Db::new();
        let mut handle = seed(&db, flag);
        for &value in &wanted {
            handle.instance_filter(("flag", value));
        }

        let preview = handle
            .delete_query()
            .expect("preview should build")
            .to_sql(&db.renderer());
        let matches = wanted.iter().all(|&value| value == flag);

        match handle.delete() {
            Ok(outcome) => {
                prop_assert!(matches);
                prop_assert_eq!(outcome.sql, preview);
                prop_assert!(db.get::<Item>(&Key::Int(1)).is_none());
            }
            Err(err) => {
                prop_assert!(!matches);
                let mismatch = err
                    .instance_filter_mismatch()
                    .expect("error should carry mismatch detail");
                prop_assert_eq!(&mismatch.sql, &preview);
                prop_assert!(db.get::<Item>(&Key::Int(1)).is_some());
                prop_assert_eq!(handle.instance_filters().len(), wanted.len());
            }
        }
    }
}
