//! The database collaborator of the engine.
//!
//! A [`DatabaseGateway`] wraps one caller-owned connection. The engine never
//! opens, pools or caches connections itself.

use crate::error::DbError;
use crate::platform::Platform;
use crate::schema::Schema;

/// Number of rows a statement touched, as reported by the driver.
pub type RowsAffected = u64;

/// Executes SQL against, and reads the structure of, a live database.
#[allow(async_fn_in_trait)]
pub trait DatabaseGateway {
    /// The platform the connected database speaks.
    fn platform(&self) -> &dyn Platform;

    /// Returns whether foreign key constraints can be managed on this
    /// database.
    fn supports_foreign_key_constraints(&self) -> bool {
        self.platform().supports_foreign_keys()
    }

    /// Executes one statement.
    async fn execute(&mut self, sql: &str) -> Result<RowsAffected, DbError>;

    /// Reads the live schema.
    async fn introspect(&mut self) -> Result<Schema, DbError>;

    /// Lists the names of the live tables.
    async fn list_table_names(&mut self) -> Result<Vec<String>, DbError> {
        Ok(self.introspect().await?.table_names())
    }

    /// Opens a transaction.
    async fn begin_transaction(&mut self) -> Result<(), DbError>;

    /// Commits the open transaction.
    async fn commit(&mut self) -> Result<(), DbError>;

    /// Rolls back the open transaction.
    async fn rollback(&mut self) -> Result<(), DbError>;
}
