//! A schema applied to SQLite reads back as the schema it was built from.

mod common;

use common::memory_gateway;
use dbschema_core::prelude::*;

fn catalog(schema: &mut SchemaBuilder) -> Result<()> {
    schema
        .create_table("authors")?
        .add_column(Column::new("id", SqlType::BigInt).auto_increment())?
        .add_column(Column::new("name", SqlType::String(80)))?
        .add_column(Column::new("bio", SqlType::Text).nullable())?
        .set_primary_key(["id"])?
        .add_index(Index::unique("uniq_author_name", ["name"]))?;

    schema
        .create_table("books")?
        .add_column(Column::new("isbn", SqlType::String(13)).nullable())?
        .add_column(Column::new("author_id", SqlType::Integer))?
        .add_column(Column::new("pages", SqlType::SmallInt).default(DefaultValue::Integer(0)))?
        .add_column(Column::new("available", SqlType::Boolean).default(DefaultValue::Bool(true)))?
        .add_column(Column::new("price", SqlType::Decimal(10, 2)).nullable())?
        .add_column(Column::new("rating", SqlType::Float).default(DefaultValue::Float(2.5)))?
        .add_column(Column::new("published_on", SqlType::Date).nullable())?
        .add_column(Column::new("opens_at", SqlType::Time).nullable())?
        .add_column(
            Column::new("created_at", SqlType::DateTime)
                .default(DefaultValue::Expression("CURRENT_TIMESTAMP".into())),
        )?
        .add_column(Column::new("cover", SqlType::Blob).nullable())?
        .add_column(Column::new("metadata", SqlType::Json).nullable())?
        .add_column(Column::new("external_id", SqlType::Guid).nullable())?
        .add_column(Column::new("shelf", SqlType::Custom("geometry".into())).nullable())?
        .add_column(
            Column::new("blurb", SqlType::string()).default(DefaultValue::String("it's new".into())),
        )?
        .add_column(
            Column::new("note", SqlType::Text)
                .nullable()
                .default(DefaultValue::Null),
        )?
        .set_primary_key(["isbn"])?
        .add_index(Index::new("idx_books_author", ["author_id", "pages"]))?
        .add_foreign_key(
            ForeignKey::new("fk_books_author", ["author_id"], "authors", ["id"])
                .on_delete(ForeignKeyAction::Cascade),
        )?;

    schema
        .create_table("loans")?
        .add_column(Column::new("book_isbn", SqlType::String(13)))?
        .add_column(Column::new("copy", SqlType::Integer))?
        .add_column(Column::new("counter", SqlType::Integer).default(DefaultValue::Bool(false)))?
        .set_primary_key(["book_isbn", "copy"])?
        .add_foreign_key(ForeignKey::new("fk_loans_book", ["book_isbn"], "books", ["isbn"]))?;
    Ok(())
}

#[tokio::test]
async fn test_second_update_is_up_to_date() {
    let mut gateway = memory_gateway().await;
    let mut reconciler = Reconciler::new(catalog, RecordingReporter::new());

    let first = reconciler
        .update(&mut gateway, UpdateOptions::forced())
        .await
        .unwrap();
    assert_eq!(first.status, OutcomeStatus::Applied);

    let second = reconciler
        .update(&mut gateway, UpdateOptions::dry_run())
        .await
        .unwrap();
    assert_eq!(second.status, OutcomeStatus::UpToDate, "{:?}", second.statements);
}

#[tokio::test]
async fn test_foreign_keys_exist_after_update() {
    let mut gateway = memory_gateway().await;
    let mut reconciler = Reconciler::new(catalog, RecordingReporter::new());

    reconciler
        .update(&mut gateway, UpdateOptions::forced())
        .await
        .unwrap();

    let live = gateway.introspect().await.unwrap();
    let books = live.table("books").unwrap();
    assert_eq!(books.foreign_keys.len(), 1);
    assert_eq!(books.foreign_keys[0].referenced_table, "authors");
    assert_eq!(books.foreign_keys[0].on_delete, ForeignKeyAction::Cascade);
    assert_eq!(live.table("loans").unwrap().foreign_keys.len(), 1);

    let authors = live.table("authors").unwrap();
    assert!(authors.column("id").unwrap().auto_increment);
    // Primary key columns are NOT NULL even when declared nullable.
    assert!(!books.column("isbn").unwrap().nullable);
}

#[tokio::test]
async fn test_auto_increment_outside_primary_key_is_rejected() {
    let definition = |schema: &mut SchemaBuilder| -> Result<()> {
        schema
            .create_table("t")?
            .add_column(Column::new("n", SqlType::Integer).auto_increment())?;
        Ok(())
    };
    let mut gateway = memory_gateway().await;
    let mut reconciler = Reconciler::new(definition, RecordingReporter::new());

    let err = reconciler
        .update(&mut gateway, UpdateOptions::forced())
        .await
        .unwrap_err();

    assert!(matches!(err, SchemaError::Render(RenderError::Unsupported { .. })));
    assert!(gateway.list_table_names().await.unwrap().is_empty());
}
