//! Reconciliation of a live database with a schema definition.
//!
//! A [`Reconciler`] drives one run at a time through
//! `Idle -> Diffing -> Previewing -> (Applying | Done)`. Every planned
//! statement is reported before anything runs, and nothing runs unless the
//! caller forces it.

use tracing::{debug, info, warn};

use crate::definition::{build_schema, SchemaDefinition};
use crate::diff::Comparator;
use crate::error::{Result, SchemaError};
use crate::executor::{DirectExecutor, ExecutionMode, StatementBatchExecutor};
use crate::gateway::DatabaseGateway;
use crate::migration::{MigrationGenerator, MigrationScript};
use crate::operations::ChangeOperation;
use crate::render::SqlRenderer;
use crate::report::{ReportLevel, Reporter};

/// Notice for an empty change set.
pub const UP_TO_DATE: &str = "The database is up to date";
/// Notice for a run that was not forced.
pub const DRY_RUN: &str = "No query was run, use the --force option to run the queries";
/// Notice for a forced run that succeeded.
pub const APPLIED: &str = "Queries were successfully run against the database";

/// Where a [`Reconciler`] is in its current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileState {
    /// No run started.
    #[default]
    Idle,
    /// Reading the live schema and computing the change set.
    Diffing,
    /// Reporting the planned statements.
    Previewing,
    /// Executing the planned statements.
    Applying,
    /// The run finished, successfully or not.
    Done,
}

/// Options of an update run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Execute the planned statements instead of only reporting them.
    pub force: bool,
    /// How the statements are executed when forced.
    pub execution: ExecutionMode,
}

impl UpdateOptions {
    /// Report only.
    #[must_use]
    pub fn dry_run() -> Self {
        Self::default()
    }

    /// Report and execute in one transaction.
    #[must_use]
    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }

    /// Sets the execution mode.
    #[must_use]
    pub const fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }
}

/// How an update run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// There was nothing to do.
    UpToDate,
    /// Statements were planned but not executed.
    DryRun,
    /// Statements were executed.
    Applied,
}

/// Result of an update run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// How the run ended.
    pub status: OutcomeStatus,
    /// The planned statements, in execution order.
    pub statements: Vec<String>,
}

impl Outcome {
    /// Number of statements that were executed.
    #[must_use]
    pub fn executed(&self) -> usize {
        match self.status {
            OutcomeStatus::Applied => self.statements.len(),
            OutcomeStatus::UpToDate | OutcomeStatus::DryRun => 0,
        }
    }
}

/// Result of a purge run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeOutcome {
    /// Live tables at the start of the run.
    pub tables: Vec<String>,
    /// Whether the tables were actually dropped.
    pub dropped: bool,
    /// The update run that followed.
    pub update: Outcome,
}

/// Brings a live database in line with a [`SchemaDefinition`].
pub struct Reconciler<D, R> {
    definition: D,
    reporter: R,
    state: ReconcileState,
}

impl<D: SchemaDefinition, R: Reporter> Reconciler<D, R> {
    /// Creates a reconciler for a definition, reporting to `reporter`.
    pub fn new(definition: D, reporter: R) -> Self {
        Self {
            definition,
            reporter,
            state: ReconcileState::Idle,
        }
    }

    /// The state of the current (or last) run.
    #[must_use]
    pub const fn state(&self) -> ReconcileState {
        self.state
    }

    /// The reporter.
    pub const fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Consumes the reconciler and returns the reporter.
    pub fn into_reporter(self) -> R {
        self.reporter
    }

    /// Diffs the live schema against the definition, reports the planned
    /// statements and executes them if `options.force` is set.
    ///
    /// Any error is reported at [`ReportLevel::Error`] before being
    /// returned.
    pub async fn update<G: DatabaseGateway>(
        &mut self,
        gateway: &mut G,
        options: UpdateOptions,
    ) -> Result<Outcome> {
        let result = self.run_update(gateway, options).await;
        self.finish(result)
    }

    /// Drops every live table, then runs an update from the empty database.
    ///
    /// Foreign key checks are switched off around the drops on platforms
    /// that can toggle them. Without `force`, nothing is dropped and the
    /// follow-up update is a dry run.
    pub async fn purge<G: DatabaseGateway>(
        &mut self,
        gateway: &mut G,
        force: bool,
    ) -> Result<PurgeOutcome> {
        let result = self.run_purge(gateway, force).await;
        let (tables, dropped) = self.finish(result)?;

        let update = self
            .update(
                gateway,
                UpdateOptions {
                    force,
                    execution: ExecutionMode::default(),
                },
            )
            .await?;

        Ok(PurgeOutcome {
            tables,
            dropped,
            update,
        })
    }

    /// Writes the difference between the live schema and the definition as
    /// a migration script instead of applying it.
    pub async fn generate_migration<G: DatabaseGateway>(
        &mut self,
        gateway: &mut G,
        version: impl Into<String>,
    ) -> Result<MigrationScript> {
        let result = self.run_generate(gateway, version.into()).await;
        self.finish(result)
    }

    async fn run_generate<G: DatabaseGateway>(
        &mut self,
        gateway: &mut G,
        version: String,
    ) -> Result<MigrationScript> {
        self.state = ReconcileState::Diffing;
        let current = gateway.introspect().await?;
        let desired = build_schema(&self.definition)?;
        MigrationGenerator::new(gateway.platform()).generate(&current, &desired, version)
    }

    async fn run_update<G: DatabaseGateway>(
        &mut self,
        gateway: &mut G,
        options: UpdateOptions,
    ) -> Result<Outcome> {
        self.state = ReconcileState::Diffing;
        let current = gateway.introspect().await?;
        let desired = build_schema(&self.definition)?;
        let changes = Comparator::new(gateway.platform()).compare(&current, &desired)?;
        let statements = SqlRenderer::new(gateway.platform()).render_all(&changes)?;
        debug!(
            operations = changes.len(),
            statements = statements.len(),
            "Computed schema changes"
        );

        self.state = ReconcileState::Previewing;
        if statements.is_empty() {
            self.reporter.report(UP_TO_DATE, ReportLevel::Info);
            return Ok(Outcome {
                status: OutcomeStatus::UpToDate,
                statements,
            });
        }

        for statement in &statements {
            self.reporter
                .report(&format!("Running {statement}"), ReportLevel::Info);
        }

        if !options.force {
            self.reporter.report(DRY_RUN, ReportLevel::Comment);
            return Ok(Outcome {
                status: OutcomeStatus::DryRun,
                statements,
            });
        }

        self.state = ReconcileState::Applying;
        info!(
            statements = statements.len(),
            mode = ?options.execution,
            "Applying schema changes"
        );
        options.execution.execute_batch(gateway, &statements).await?;
        self.reporter.report(APPLIED, ReportLevel::Comment);

        Ok(Outcome {
            status: OutcomeStatus::Applied,
            statements,
        })
    }

    async fn run_purge<G: DatabaseGateway>(
        &mut self,
        gateway: &mut G,
        force: bool,
    ) -> Result<(Vec<String>, bool)> {
        self.state = ReconcileState::Diffing;
        let live = gateway.introspect().await?;
        let tables = live.table_names();
        let changes = Comparator::new(gateway.platform()).compare(&live, &live.without_tables())?;
        let statements = SqlRenderer::new(gateway.platform()).render_all(&changes)?;

        self.state = ReconcileState::Previewing;
        for operation in &changes {
            if let ChangeOperation::DropTable { name } = operation {
                self.reporter
                    .report(&format!("Dropping table {name}"), ReportLevel::Info);
            }
        }

        if !force {
            self.reporter.report(DRY_RUN, ReportLevel::Comment);
            return Ok((tables, false));
        }

        self.state = ReconcileState::Applying;
        info!(tables = tables.len(), "Purging database");

        let platform = gateway.platform();
        let disable = platform.foreign_key_checks_sql(false);
        let enable = platform.foreign_key_checks_sql(true);

        if let Some(sql) = &disable {
            debug!(sql = %sql, "Disabling foreign key checks");
            gateway.execute(sql).await?;
        }
        let dropped = DirectExecutor.execute_batch(gateway, &statements).await;
        if let Some(sql) = &enable {
            debug!(sql = %sql, "Enabling foreign key checks");
            if let Err(err) = gateway.execute(sql).await {
                // The drop failure, if any, is the one worth returning.
                if dropped.is_ok() {
                    return Err(err.into());
                }
                warn!(error = %err, "Failed to re-enable foreign key checks");
            }
        }
        dropped?;

        self.reporter.report(APPLIED, ReportLevel::Comment);
        Ok((tables, true))
    }

    fn finish<T>(&mut self, result: Result<T>) -> Result<T> {
        self.state = ReconcileState::Done;
        if let Err(err) = &result {
            warn!(error = %err, "Schema run failed");
            self.reporter.report(&failure_message(err), ReportLevel::Error);
        }
        result
    }
}

fn failure_message(err: &SchemaError) -> String {
    format!("Schema update failed: {err}")
}
