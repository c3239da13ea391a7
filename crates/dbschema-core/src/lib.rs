//! Declarative schema management for SQL databases.
//!
//! `dbschema-core` compares a live database schema with the schema an
//! application declares and brings the database in line, without versioned
//! migration files:
//! - The desired schema is declared through a [`SchemaDefinition`]
//!   (a closure or a JSON document) on a validating [`SchemaBuilder`]
//! - The [`Comparator`] computes an ordered, deterministic change set
//! - The [`SqlRenderer`] turns it into DDL for one [`Platform`]
//! - The [`Reconciler`] reports every statement and only executes them when
//!   forced, inside one transaction by default
//!
//! # Architecture
//!
//! - **Schema** - Tables, columns, indexes, foreign keys and sequences
//! - **Diff** - Change sets between two schemas, in a dependency-safe order
//! - **Platform** - Native types, capabilities and DDL per dialect (SQLite,
//!   PostgreSQL, MySQL)
//! - **Gateway** - The caller's database connection
//! - **Reconcile** - Update, purge and migration generation runs
//!
//! The engine never talks to a driver directly; the `dbschema` crate
//! provides the SQLite gateway and the command-line tool.
//!
//! # Example
//!
//! ```rust
//! use dbschema_core::prelude::*;
//!
//! let definition = |schema: &mut SchemaBuilder| -> Result<()> {
//!     schema
//!         .create_table("test")?
//!         .add_column(Column::new("id", SqlType::Integer))?
//!         .add_column(Column::new("email", SqlType::string()))?
//!         .set_primary_key(["id"])?;
//!     Ok(())
//! };
//!
//! let desired = build_schema(&definition)?;
//! let platform = SqlitePlatform::new();
//! let changes = Comparator::new(&platform).compare(&Schema::new(), &desired)?;
//! let sql = SqlRenderer::new(&platform).render_all(&changes)?;
//!
//! assert_eq!(
//!     sql,
//!     vec!["CREATE TABLE test (id INTEGER NOT NULL, email VARCHAR(255) NOT NULL, PRIMARY KEY(id))"]
//! );
//! # Ok::<(), SchemaError>(())
//! ```

pub mod builder;
pub mod definition;
pub mod diff;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod migration;
pub mod operations;
pub mod platform;
pub mod reconcile;
pub mod render;
pub mod report;
pub mod schema;
pub mod state;

#[cfg(test)]
mod testing;

pub use builder::SchemaBuilder;
pub use definition::{build_schema, SchemaDefinition};
pub use diff::Comparator;
pub use platform::Platform;
pub use reconcile::Reconciler;
pub use render::SqlRenderer;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::builder::{SchemaBuilder, TableBuilder};
    pub use crate::definition::{build_schema, JsonSchemaDefinition, SchemaDefinition};
    pub use crate::diff::{ChangeSet, Comparator};
    pub use crate::error::{DbError, RenderError, Result, SchemaError, ValidationError};
    pub use crate::executor::{
        DirectExecutor, ExecutionMode, StatementBatchExecutor, TransactionalExecutor,
    };
    pub use crate::gateway::{DatabaseGateway, RowsAffected};
    pub use crate::migration::{version_now, MigrationGenerator, MigrationScript};
    pub use crate::operations::{ChangeOperation, ColumnProperty};
    pub use crate::platform::{
        MySqlPlatform, NameCase, Platform, PostgresPlatform, SqlitePlatform,
    };
    pub use crate::reconcile::{
        Outcome, OutcomeStatus, PurgeOutcome, ReconcileState, Reconciler, UpdateOptions,
    };
    pub use crate::render::SqlRenderer;
    pub use crate::report::{ConsoleReporter, RecordingReporter, ReportLevel, Reporter};
    pub use crate::schema::{
        Column, DefaultValue, ForeignKey, ForeignKeyAction, Index, Schema, Sequence, SqlType,
        Table,
    };
    pub use crate::state::SchemaState;
}
