//! Scripted gateway for engine tests.

use std::collections::VecDeque;

use crate::error::DbError;
use crate::gateway::{DatabaseGateway, RowsAffected};
use crate::platform::{Platform, SqlitePlatform};
use crate::schema::Schema;

/// Records every call and answers introspection from a script.
///
/// Statements run inside a transaction are only moved to `applied` on
/// commit. Introspection returns the queued schemas in order and keeps
/// returning the last one.
pub(crate) struct FakeGateway {
    platform: Box<dyn Platform>,
    schemas: VecDeque<Schema>,
    fail_on: Option<String>,
    in_transaction: bool,
    pending: Vec<String>,
    applied: Vec<String>,
    log: Vec<String>,
}

impl FakeGateway {
    pub(crate) fn new() -> Self {
        Self::with_platform(SqlitePlatform::new())
    }

    pub(crate) fn with_platform(platform: impl Platform + 'static) -> Self {
        Self {
            platform: Box::new(platform),
            schemas: VecDeque::new(),
            fail_on: None,
            in_transaction: false,
            pending: Vec::new(),
            applied: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Queues a schema for the next introspection.
    pub(crate) fn then_schema(mut self, schema: Schema) -> Self {
        self.schemas.push_back(schema);
        self
    }

    /// Makes any statement containing `fragment` fail.
    pub(crate) fn fail_on(mut self, fragment: &str) -> Self {
        self.fail_on = Some(fragment.to_string());
        self
    }

    /// Statements that persisted.
    pub(crate) fn applied(&self) -> &[String] {
        &self.applied
    }

    /// Every statement and transaction boundary, in call order.
    pub(crate) fn log(&self) -> &[String] {
        &self.log
    }
}

impl DatabaseGateway for FakeGateway {
    fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    async fn execute(&mut self, sql: &str) -> Result<RowsAffected, DbError> {
        self.log.push(sql.to_string());
        if let Some(fragment) = &self.fail_on {
            if sql.contains(fragment.as_str()) {
                return Err(DbError::new(format!("near \"{fragment}\": syntax error")));
            }
        }
        if self.in_transaction {
            self.pending.push(sql.to_string());
        } else {
            self.applied.push(sql.to_string());
        }
        Ok(0)
    }

    async fn introspect(&mut self) -> Result<Schema, DbError> {
        let schema = if self.schemas.len() > 1 {
            self.schemas.pop_front()
        } else {
            self.schemas.front().cloned()
        };
        Ok(schema.unwrap_or_default())
    }

    async fn begin_transaction(&mut self) -> Result<(), DbError> {
        if self.in_transaction {
            return Err(DbError::new("cannot start a transaction within a transaction"));
        }
        self.log.push("BEGIN".to_string());
        self.in_transaction = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), DbError> {
        self.log.push("COMMIT".to_string());
        self.in_transaction = false;
        self.applied.append(&mut self.pending);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), DbError> {
        self.log.push("ROLLBACK".to_string());
        self.in_transaction = false;
        self.pending.clear();
        Ok(())
    }
}
