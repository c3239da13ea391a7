//! SQLite database gateway.

use sqlx::sqlite::SqliteConnection;
use tracing::debug;

use dbschema_core::error::DbError;
use dbschema_core::gateway::{DatabaseGateway, RowsAffected};
use dbschema_core::platform::{Platform, SqlitePlatform};
use dbschema_core::schema::Schema;

use crate::introspect;

/// A [`DatabaseGateway`] over one SQLite connection owned by the caller.
pub struct SqliteGateway {
    conn: SqliteConnection,
    platform: SqlitePlatform,
}

impl SqliteGateway {
    /// Wraps an open connection.
    #[must_use]
    pub fn new(conn: SqliteConnection) -> Self {
        Self {
            conn,
            platform: SqlitePlatform::new(),
        }
    }

    /// The underlying connection.
    pub fn connection_mut(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }

    /// Gives the connection back.
    #[must_use]
    pub fn into_inner(self) -> SqliteConnection {
        self.conn
    }
}

impl DatabaseGateway for SqliteGateway {
    fn platform(&self) -> &dyn Platform {
        &self.platform
    }

    async fn execute(&mut self, sql: &str) -> Result<RowsAffected, DbError> {
        debug!(sql = %sql, "Executing SQL");
        let result = sqlx::query(sql)
            .execute(&mut self.conn)
            .await
            .map_err(DbError::driver)?;
        Ok(result.rows_affected())
    }

    async fn introspect(&mut self) -> Result<Schema, DbError> {
        introspect::read_schema(&mut self.conn, &self.platform).await
    }

    async fn list_table_names(&mut self) -> Result<Vec<String>, DbError> {
        introspect::table_names(&mut self.conn).await
    }

    async fn begin_transaction(&mut self) -> Result<(), DbError> {
        self.execute("BEGIN").await.map(|_| ())
    }

    async fn commit(&mut self) -> Result<(), DbError> {
        self.execute("COMMIT").await.map(|_| ())
    }

    async fn rollback(&mut self) -> Result<(), DbError> {
        self.execute("ROLLBACK").await.map(|_| ())
    }
}
