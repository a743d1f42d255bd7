//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    canvass_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    assert!(info_str.contains("identity"), "missing identity table");
    assert!(info_str.contains("device_state"), "missing device_state table");
    assert!(info_str.contains("audit_log"), "missing audit_log table");
    assert!(info_str.contains("_migration"), "missing _migration table");
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    canvass_db::run_migrations(&db).await.unwrap();
    canvass_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1, "expected exactly one migration record");
}

#[tokio::test]
async fn audit_log_rejects_unknown_action() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    canvass_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE audit_log SET identity_id = 'u1', action = 'PATCH', \
             resource_type = 'voters', allowed = false, reason = 'x'",
        )
        .await
        .unwrap()
        .check();
    assert!(result.is_err(), "ASSERT on action should reject PATCH");
}
