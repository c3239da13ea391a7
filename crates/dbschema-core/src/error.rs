//! Error types for schema reconciliation.

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

/// Errors raised while building a schema model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A table with the same name was already declared.
    #[error("Table '{0}' is already defined")]
    DuplicateTable(String),

    /// A column with the same name was already declared on the table.
    #[error("Column '{column}' is already defined on table '{table}'")]
    DuplicateColumn {
        /// Owning table.
        table: String,
        /// Offending column.
        column: String,
    },

    /// An index with the same name was already declared on the table.
    #[error("Index '{index}' is already defined on table '{table}'")]
    DuplicateIndex {
        /// Owning table.
        table: String,
        /// Offending index.
        index: String,
    },

    /// A foreign key with the same name was already declared on the table.
    #[error("Foreign key '{foreign_key}' is already defined on table '{table}'")]
    DuplicateForeignKey {
        /// Owning table.
        table: String,
        /// Offending foreign key.
        foreign_key: String,
    },

    /// A sequence with the same name was already declared.
    #[error("Sequence '{0}' is already defined")]
    DuplicateSequence(String),

    /// A primary key, index or foreign key names a column the table lacks.
    #[error("{context} on table '{table}' references unknown column '{column}'")]
    UnknownColumn {
        /// Owning table.
        table: String,
        /// The missing column.
        column: String,
        /// What referenced the column (e.g. "Index 'idx_email'").
        context: String,
    },

    /// A primary key, index or foreign key was declared without columns.
    #[error("{context} on table '{table}' has no columns")]
    EmptyColumnList {
        /// Owning table.
        table: String,
        /// What was declared empty.
        context: String,
    },

    /// A foreign key's local and referenced column lists differ in length.
    #[error(
        "Foreign key '{foreign_key}' on table '{table}' maps {local} local column(s) to {referenced} referenced column(s)"
    )]
    ForeignKeyArity {
        /// Owning table.
        table: String,
        /// Offending foreign key.
        foreign_key: String,
        /// Number of local columns.
        local: usize,
        /// Number of referenced columns.
        referenced: usize,
    },

    /// An identifier is empty.
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),
}

/// An operation the target platform cannot express.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The platform has no rendering for this kind of change.
    #[error("{platform} cannot render operation: {operation}")]
    Unsupported {
        /// Platform name.
        platform: &'static str,
        /// Description of the operation.
        operation: String,
    },

    /// The platform has no native type for an abstract column type.
    #[error("{platform} has no native type for {sql_type}")]
    UnsupportedType {
        /// Platform name.
        platform: &'static str,
        /// The abstract type.
        sql_type: String,
    },
}

/// A failure reported by a database gateway.
///
/// Drivers wrap their own error types with [`DbError::driver`] so the engine
/// stays independent of any particular driver crate.
#[derive(Debug)]
pub struct DbError {
    message: String,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl DbError {
    /// Creates an error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps a driver error.
    pub fn driver<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for DbError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Errors that can occur while diffing, rendering or applying a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema model is malformed.
    #[error("Invalid schema: {0}")]
    Validation(#[from] ValidationError),

    /// A foreign key points at a table or column that does not exist.
    #[error("Foreign key '{foreign_key}' on table '{table}' references unknown {target}")]
    UnresolvedReference {
        /// Table owning the foreign key.
        table: String,
        /// The foreign key name.
        foreign_key: String,
        /// The missing target, e.g. "table 'users'".
        target: String,
    },

    /// A change cannot be rendered for the target platform.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// The gateway failed outside of statement execution.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// A statement of a batch failed.
    ///
    /// In direct mode, statements before `index` remain applied. In
    /// transactional mode, they were rolled back.
    #[error("Statement #{index} failed{}: {statement}: {source}", rollback_note(.transactional))]
    Statement {
        /// Zero-based position of the failing statement in the batch.
        index: usize,
        /// The failing SQL.
        statement: String,
        /// Whether the batch ran inside a transaction.
        transactional: bool,
        /// The underlying failure.
        #[source]
        source: DbError,
    },

    /// A change does not apply to the schema it is replayed on.
    #[error("Invalid schema state: {0}")]
    InvalidState(String),

    /// IO error (reading definitions, writing migration files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Migration file already exists.
    #[error("Migration file already exists: {0}")]
    MigrationExists(PathBuf),
}

fn rollback_note(transactional: &bool) -> &'static str {
    if *transactional {
        " (rolled back)"
    } else {
        ""
    }
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
