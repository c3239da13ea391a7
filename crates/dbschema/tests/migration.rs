//! Migration generation against in-memory SQLite.

mod common;

use std::fs;

use common::{memory_gateway, seed, test_definition, CREATE_TEST};
use dbschema_core::migration::{DOWN_MARKER, UP_MARKER};
use dbschema_core::prelude::*;

#[tokio::test]
async fn test_generate_and_write_migration() {
    let mut gateway = memory_gateway().await;
    seed(&mut gateway, &["CREATE TABLE legacy (id INTEGER)"]).await;
    let mut reconciler = Reconciler::new(test_definition, RecordingReporter::new());

    let script = reconciler
        .generate_migration(&mut gateway, "Version20240301123005")
        .await
        .unwrap();

    assert_eq!(script.up, vec![CREATE_TEST, "DROP TABLE legacy"]);
    assert_eq!(
        script.down,
        vec!["CREATE TABLE legacy (id INTEGER)", "DROP TABLE test"]
    );

    // Nothing is applied.
    assert_eq!(gateway.list_table_names().await.unwrap(), vec!["legacy"]);

    let dir = tempfile::tempdir().unwrap();
    let path = script.write_to(dir.path()).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains(&format!("{UP_MARKER}\n{CREATE_TEST};\n")));
    assert!(written.contains(&format!("{DOWN_MARKER}\nCREATE TABLE legacy (id INTEGER);\n")));

    assert!(matches!(
        script.write_to(dir.path()),
        Err(SchemaError::MigrationExists(_))
    ));
}

#[tokio::test]
async fn test_up_migration_applies_cleanly() {
    let mut gateway = memory_gateway().await;
    let mut reconciler = Reconciler::new(test_definition, RecordingReporter::new());

    let script = reconciler
        .generate_migration(&mut gateway, version_now())
        .await
        .unwrap();
    TransactionalExecutor
        .execute_batch(&mut gateway, &script.up)
        .await
        .unwrap();

    let outcome = reconciler
        .update(&mut gateway, UpdateOptions::dry_run())
        .await
        .unwrap();
    assert_eq!(outcome.status, OutcomeStatus::UpToDate);

    DirectExecutor
        .execute_batch(&mut gateway, &script.down)
        .await
        .unwrap();
    assert!(gateway.list_table_names().await.unwrap().is_empty());
}
