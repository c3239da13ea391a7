//! Schema change operations.
//!
//! A change-set is an ordered list of [`ChangeOperation`] values. Each
//! operation carries just enough data for a platform to render it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{Column, ForeignKey, Index, Sequence, Table};

/// A column property that differs between two versions of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnProperty {
    /// The data type.
    Type,
    /// NULL / NOT NULL.
    Nullable,
    /// The default value.
    Default,
    /// The auto-increment flag.
    AutoIncrement,
}

impl fmt::Display for ColumnProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Type => "type",
            Self::Nullable => "nullability",
            Self::Default => "default",
            Self::AutoIncrement => "auto-increment",
        })
    }
}

/// A single schema change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChangeOperation {
    /// Create a table with its columns, primary key and indexes. Foreign keys
    /// are added by separate [`ChangeOperation::AddForeignKey`] operations.
    CreateTable {
        /// The table to create.
        table: Table,
    },

    /// Drop a table.
    DropTable {
        /// Table name.
        name: String,
    },

    /// Rename a table.
    RenameTable {
        /// Old table name.
        from: String,
        /// New table name.
        to: String,
    },

    /// Add a column to a table.
    AddColumn {
        /// Table name.
        table: String,
        /// Column definition.
        column: Column,
    },

    /// Drop a column from a table.
    DropColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// Change the definition of a column.
    ModifyColumn {
        /// Table name.
        table: String,
        /// The column as it currently is.
        from: Column,
        /// The column as it should be.
        to: Column,
        /// The properties that differ.
        changes: Vec<ColumnProperty>,
    },

    /// Rename a column.
    RenameColumn {
        /// Table name.
        table: String,
        /// Old column name.
        from: String,
        /// New column name.
        to: String,
    },

    /// Add a primary key to a table that has none.
    AddPrimaryKey {
        /// Table name.
        table: String,
        /// Key columns, in order.
        columns: Vec<String>,
    },

    /// Drop the primary key of a table.
    DropPrimaryKey {
        /// Table name.
        table: String,
    },

    /// Create an index.
    AddIndex {
        /// Table name.
        table: String,
        /// Index definition.
        index: Index,
    },

    /// Drop an index.
    DropIndex {
        /// Table name.
        table: String,
        /// Index name.
        name: String,
    },

    /// Add a foreign key constraint.
    AddForeignKey {
        /// Table owning the constraint.
        table: String,
        /// Constraint definition.
        foreign_key: ForeignKey,
    },

    /// Drop a foreign key constraint.
    DropForeignKey {
        /// Table owning the constraint.
        table: String,
        /// Constraint name.
        name: String,
    },

    /// Create a sequence.
    CreateSequence {
        /// Sequence definition.
        sequence: Sequence,
    },

    /// Drop a sequence.
    DropSequence {
        /// Sequence name.
        name: String,
    },
}

impl ChangeOperation {
    /// Creates a `CreateTable` operation, stripping the table's foreign keys.
    #[must_use]
    pub fn create_table(table: &Table) -> Self {
        Self::CreateTable {
            table: table.without_foreign_keys(),
        }
    }

    /// Creates a `CreateTable` operation that keeps the table's foreign keys,
    /// for platforms declaring them inline.
    #[must_use]
    pub fn create_table_with_foreign_keys(table: &Table) -> Self {
        Self::CreateTable {
            table: table.clone(),
        }
    }

    /// Creates a `DropTable` operation.
    pub fn drop_table(name: impl Into<String>) -> Self {
        Self::DropTable { name: name.into() }
    }

    /// Creates an `AddColumn` operation.
    pub fn add_column(table: impl Into<String>, column: Column) -> Self {
        Self::AddColumn {
            table: table.into(),
            column,
        }
    }

    /// Creates a `DropColumn` operation.
    pub fn drop_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::DropColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates an `AddIndex` operation.
    pub fn add_index(table: impl Into<String>, index: Index) -> Self {
        Self::AddIndex {
            table: table.into(),
            index,
        }
    }

    /// Creates a `DropIndex` operation.
    pub fn drop_index(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DropIndex {
            table: table.into(),
            name: name.into(),
        }
    }

    /// Creates an `AddForeignKey` operation.
    pub fn add_foreign_key(table: impl Into<String>, foreign_key: ForeignKey) -> Self {
        Self::AddForeignKey {
            table: table.into(),
            foreign_key,
        }
    }

    /// Creates a `DropForeignKey` operation.
    pub fn drop_foreign_key(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DropForeignKey {
            table: table.into(),
            name: name.into(),
        }
    }

    /// The table this operation touches, or the sequence name for sequence
    /// operations.
    #[must_use]
    pub fn subject(&self) -> &str {
        match self {
            Self::CreateTable { table } => &table.name,
            Self::DropTable { name } | Self::DropSequence { name } => name,
            Self::RenameTable { from, .. } => from,
            Self::CreateSequence { sequence } => &sequence.name,
            Self::AddColumn { table, .. }
            | Self::DropColumn { table, .. }
            | Self::ModifyColumn { table, .. }
            | Self::RenameColumn { table, .. }
            | Self::AddPrimaryKey { table, .. }
            | Self::DropPrimaryKey { table }
            | Self::AddIndex { table, .. }
            | Self::DropIndex { table, .. }
            | Self::AddForeignKey { table, .. }
            | Self::DropForeignKey { table, .. } => table,
        }
    }

    /// The column, index or constraint inside the table, if any.
    #[must_use]
    pub fn member(&self) -> &str {
        match self {
            Self::AddColumn { column, .. } => &column.name,
            Self::DropColumn { column, .. } => column,
            Self::ModifyColumn { to, .. } => &to.name,
            Self::RenameColumn { from, .. } => from,
            Self::AddIndex { index, .. } => &index.name,
            Self::AddForeignKey { foreign_key, .. } => &foreign_key.name,
            Self::DropIndex { name, .. } | Self::DropForeignKey { name, .. } => name,
            Self::CreateTable { .. }
            | Self::DropTable { .. }
            | Self::RenameTable { .. }
            | Self::AddPrimaryKey { .. }
            | Self::DropPrimaryKey { .. }
            | Self::CreateSequence { .. }
            | Self::DropSequence { .. } => "",
        }
    }

    /// Returns whether the operation concerns foreign key constraints.
    #[must_use]
    pub const fn is_foreign_key(&self) -> bool {
        matches!(
            self,
            Self::AddForeignKey { .. } | Self::DropForeignKey { .. }
        )
    }

    /// Returns a human-readable description of this operation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::CreateTable { table } => format!("Create table '{}'", table.name),
            Self::DropTable { name } => format!("Drop table '{name}'"),
            Self::RenameTable { from, to } => format!("Rename table '{from}' to '{to}'"),
            Self::AddColumn { table, column } => {
                format!("Add column '{}' to table '{table}'", column.name)
            }
            Self::DropColumn { table, column } => {
                format!("Drop column '{column}' from table '{table}'")
            }
            Self::ModifyColumn {
                table, to, changes, ..
            } => {
                let changes: Vec<String> = changes.iter().map(ToString::to_string).collect();
                format!(
                    "Change {} of column '{}' in table '{table}'",
                    changes.join(", "),
                    to.name
                )
            }
            Self::RenameColumn { table, from, to } => {
                format!("Rename column '{from}' to '{to}' in table '{table}'")
            }
            Self::AddPrimaryKey { table, columns } => {
                format!("Add primary key ({}) to table '{table}'", columns.join(", "))
            }
            Self::DropPrimaryKey { table } => format!("Drop primary key of table '{table}'"),
            Self::AddIndex { table, index } => {
                format!("Create index '{}' on table '{table}'", index.name)
            }
            Self::DropIndex { table, name } => format!("Drop index '{name}' on table '{table}'"),
            Self::AddForeignKey { table, foreign_key } => format!(
                "Add foreign key '{}' to table '{table}'",
                foreign_key.name
            ),
            Self::DropForeignKey { table, name } => {
                format!("Drop foreign key '{name}' from table '{table}'")
            }
            Self::CreateSequence { sequence } => format!("Create sequence '{}'", sequence.name),
            Self::DropSequence { name } => format!("Drop sequence '{name}'"),
        }
    }
}

impl fmt::Display for ChangeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}
