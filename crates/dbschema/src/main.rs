//! dbschema CLI
//!
//! Keeps a SQLite database in line with a JSON schema definition.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Parser, Subcommand};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::ConnectOptions;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use dbschema::SqliteGateway;
use dbschema_core::migration::version_now;
use dbschema_core::prelude::*;

/// Declarative schema management for SQLite.
#[derive(Parser)]
#[command(name = "dbschema")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL.
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    database: String,

    /// JSON schema definition file.
    #[arg(short, long, env = "DBSCHEMA_DEFINITION", default_value = "schema.json")]
    schema: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Update the database schema to match the definition.
    Update {
        /// Run the queries instead of only showing them.
        #[arg(short, long)]
        force: bool,

        /// Run each query on its own instead of in one transaction.
        #[arg(long)]
        no_transaction: bool,
    },

    /// Drop all tables and re-create them from the definition.
    Purge {
        /// Run the queries instead of only showing them.
        #[arg(short, long)]
        force: bool,
    },

    /// Write the pending changes as a migration file.
    Diff {
        /// Migrations directory.
        #[arg(short, long, default_value = "migrations")]
        migrations_dir: PathBuf,

        /// Show the migration without writing it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the live schema as a JSON definition.
    Dump,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Connect to database
    let conn = SqliteConnectOptions::from_str(&cli.database)?
        .create_if_missing(true)
        .connect()
        .await?;
    let mut gateway = SqliteGateway::new(conn);

    match cli.command {
        Commands::Update {
            force,
            no_transaction,
        } => {
            let options = UpdateOptions {
                force,
                execution: ExecutionMode::from_no_transaction(no_transaction),
            };
            reconciler(&cli.schema)?
                .update(&mut gateway, options)
                .await?;
        }

        Commands::Purge { force } => {
            reconciler(&cli.schema)?.purge(&mut gateway, force).await?;
        }

        Commands::Diff {
            migrations_dir,
            dry_run,
        } => {
            let script = reconciler(&cli.schema)?
                .generate_migration(&mut gateway, version_now())
                .await?;

            if script.is_empty() {
                println!("The database is up to date");
            } else if dry_run {
                println!("Would create migration: {}", script.file_name());
                println!("\n{}", script.to_sql());
            } else {
                let path = script.write_to(&migrations_dir)?;
                info!(path = %path.display(), "Created migration");
                println!("Created migration: {}", path.display());
            }
        }

        Commands::Dump => {
            let live = gateway.introspect().await?;
            println!("{}", JsonSchemaDefinition::from_schema(&live).to_json()?);
        }
    }

    Ok(())
}

fn reconciler(schema: &Path) -> anyhow::Result<Reconciler<JsonSchemaDefinition, ConsoleReporter>> {
    let definition = JsonSchemaDefinition::from_path(schema)?;
    Ok(Reconciler::new(definition, ConsoleReporter))
}
