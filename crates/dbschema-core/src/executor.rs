//! Statement batch execution strategies.
//!
//! A rendered change set runs either inside one transaction
//! ([`TransactionalExecutor`], all or nothing) or statement by statement
//! ([`DirectExecutor`], applied statements stay applied on failure). The
//! strategy is chosen once through [`ExecutionMode`].

use tracing::{debug, info, warn};

use crate::error::{Result, SchemaError};
use crate::gateway::DatabaseGateway;

/// Runs a batch of SQL statements against a gateway.
#[allow(async_fn_in_trait)]
pub trait StatementBatchExecutor {
    /// Executes every statement in order and returns how many ran.
    ///
    /// A failing statement is reported as [`SchemaError::Statement`] with
    /// its index in the batch.
    async fn execute_batch<G: DatabaseGateway>(
        &self,
        gateway: &mut G,
        statements: &[String],
    ) -> Result<usize>;
}

/// Runs the batch inside one transaction, rolled back on any failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionalExecutor;

impl StatementBatchExecutor for TransactionalExecutor {
    async fn execute_batch<G: DatabaseGateway>(
        &self,
        gateway: &mut G,
        statements: &[String],
    ) -> Result<usize> {
        if !gateway.platform().supports_transactional_ddl() {
            warn!(
                platform = gateway.platform().name(),
                "Platform commits DDL implicitly; rollback will be partial"
            );
        }

        gateway.begin_transaction().await?;

        match run_statements(gateway, statements, true).await {
            Ok(count) => {
                if let Err(err) = gateway.commit().await {
                    roll_back(gateway).await;
                    return Err(err.into());
                }
                info!(statements = count, "Committed schema changes");
                Ok(count)
            }
            Err(err) => {
                roll_back(gateway).await;
                Err(err)
            }
        }
    }
}

/// Runs each statement on its own, without a transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectExecutor;

impl StatementBatchExecutor for DirectExecutor {
    async fn execute_batch<G: DatabaseGateway>(
        &self,
        gateway: &mut G,
        statements: &[String],
    ) -> Result<usize> {
        let count = run_statements(gateway, statements, false).await?;
        info!(statements = count, "Applied schema changes");
        Ok(count)
    }
}

/// Selects the execution strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// All statements in one transaction.
    #[default]
    Transactional,
    /// Statements one by one, outside a transaction.
    Direct,
}

impl ExecutionMode {
    /// Picks the mode from a "no transaction" switch.
    #[must_use]
    pub const fn from_no_transaction(no_transaction: bool) -> Self {
        if no_transaction {
            Self::Direct
        } else {
            Self::Transactional
        }
    }
}

impl StatementBatchExecutor for ExecutionMode {
    async fn execute_batch<G: DatabaseGateway>(
        &self,
        gateway: &mut G,
        statements: &[String],
    ) -> Result<usize> {
        match self {
            Self::Transactional => TransactionalExecutor.execute_batch(gateway, statements).await,
            Self::Direct => DirectExecutor.execute_batch(gateway, statements).await,
        }
    }
}

async fn run_statements<G: DatabaseGateway>(
    gateway: &mut G,
    statements: &[String],
    transactional: bool,
) -> Result<usize> {
    for (index, sql) in statements.iter().enumerate() {
        debug!(index, sql = %sql, "Executing SQL");
        gateway
            .execute(sql)
            .await
            .map_err(|source| SchemaError::Statement {
                index,
                statement: sql.clone(),
                transactional,
                source,
            })?;
    }
    Ok(statements.len())
}

async fn roll_back<G: DatabaseGateway>(gateway: &mut G) {
    if let Err(err) = gateway.rollback().await {
        warn!(error = %err, "Rollback failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeGateway;

    fn batch() -> Vec<String> {
        vec![
            "CREATE TABLE a (id INTEGER NOT NULL)".to_string(),
            "CREATE TABLE b (id INTEGER NOT NULL)".to_string(),
            "CREATE TABLE c (id INTEGER NOT NULL)".to_string(),
        ]
    }

    #[tokio::test]
    async fn test_transactional_commits() {
        let mut gateway = FakeGateway::new();
        let count = TransactionalExecutor
            .execute_batch(&mut gateway, &batch())
            .await
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(gateway.applied(), batch().as_slice());
        assert_eq!(gateway.log().first().map(String::as_str), Some("BEGIN"));
        assert_eq!(gateway.log().last().map(String::as_str), Some("COMMIT"));
    }

    #[tokio::test]
    async fn test_transactional_rolls_back_on_failure() {
        let mut gateway = FakeGateway::new().fail_on("TABLE b");
        let err = TransactionalExecutor
            .execute_batch(&mut gateway, &batch())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SchemaError::Statement {
                index: 1,
                transactional: true,
                ..
            }
        ));
        assert!(gateway.applied().is_empty());
        assert_eq!(gateway.log().last().map(String::as_str), Some("ROLLBACK"));
        assert!(!gateway.log().iter().any(|s| s.contains("TABLE c")));
    }

    #[tokio::test]
    async fn test_direct_keeps_statements_before_failure() {
        let mut gateway = FakeGateway::new().fail_on("TABLE b");
        let err = DirectExecutor
            .execute_batch(&mut gateway, &batch())
            .await
            .unwrap_err();

        match err {
            SchemaError::Statement {
                index,
                statement,
                transactional,
                ..
            } => {
                assert_eq!(index, 1);
                assert_eq!(statement, "CREATE TABLE b (id INTEGER NOT NULL)");
                assert!(!transactional);
            }
            other => panic!("Expected Statement error, got {other}"),
        }
        assert_eq!(gateway.applied(), &batch()[..1]);
        assert!(!gateway.log().iter().any(|s| s == "BEGIN"));
    }

    #[tokio::test]
    async fn test_execution_mode_selects_strategy() {
        assert_eq!(ExecutionMode::from_no_transaction(true), ExecutionMode::Direct);
        assert_eq!(ExecutionMode::default(), ExecutionMode::Transactional);

        let mut gateway = FakeGateway::new();
        ExecutionMode::Direct
            .execute_batch(&mut gateway, &batch())
            .await
            .unwrap();
        assert_eq!(gateway.log().len(), 3);
    }
}
