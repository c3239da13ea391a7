//! SQLite support for `dbschema-core`.
//!
//! Provides [`SqliteGateway`], which executes statements and introspects
//! the live schema over one `sqlx` connection, and the `dbschema` command
//! line tool built on it.
//!
//! ```rust,no_run
//! use dbschema::SqliteGateway;
//! use dbschema_core::prelude::*;
//! use sqlx::{Connection, SqliteConnection};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let conn = SqliteConnection::connect("sqlite:db.sqlite3").await?;
//! let mut gateway = SqliteGateway::new(conn);
//!
//! let definition = JsonSchemaDefinition::from_path("schema.json")?;
//! let mut reconciler = Reconciler::new(definition, ConsoleReporter);
//! reconciler.update(&mut gateway, UpdateOptions::forced()).await?;
//! # Ok(())
//! # }
//! ```

pub mod introspect;
pub mod sqlite;

pub use sqlite::SqliteGateway;
