//! Shared helpers for SQLite integration tests.

#![allow(dead_code)]

use dbschema::SqliteGateway;
use dbschema_core::prelude::*;
use sqlx::{Connection, SqliteConnection};

pub const CREATE_TEST: &str =
    "CREATE TABLE test (id INTEGER NOT NULL, email VARCHAR(255) NOT NULL, PRIMARY KEY(id))";

/// A gateway over a fresh in-memory database.
pub async fn memory_gateway() -> SqliteGateway {
    let conn = SqliteConnection::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite database");
    SqliteGateway::new(conn)
}

/// Runs setup statements directly on the connection.
pub async fn seed(gateway: &mut SqliteGateway, statements: &[&str]) {
    for sql in statements {
        sqlx::query(sql)
            .execute(gateway.connection_mut())
            .await
            .expect("Failed to seed database");
    }
}

pub async fn row_count(gateway: &mut SqliteGateway, table: &str) -> i64 {
    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(gateway.connection_mut())
        .await
        .expect("Failed to count rows");
    row.0
}

pub fn empty_definition(_: &mut SchemaBuilder) -> Result<()> {
    Ok(())
}

/// `test(id integer PK, email string)`.
pub fn test_definition(schema: &mut SchemaBuilder) -> Result<()> {
    schema
        .create_table("test")?
        .add_column(Column::new("id", SqlType::Integer))?
        .add_column(Column::new("email", SqlType::string()))?
        .set_primary_key(["id"])?;
    Ok(())
}
