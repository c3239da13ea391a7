//! SQL rendering of change sets.

use tracing::debug;

use crate::error::{RenderError, Result};
use crate::operations::ChangeOperation;
use crate::platform::Platform;

/// Turns [`ChangeOperation`]s into DDL statements for one platform.
///
/// Capability gaps with a harmless fallback render to nothing: foreign key
/// operations on platforms without foreign key support and sequence
/// operations on platforms without sequences. Any other gap is a
/// [`RenderError`].
pub struct SqlRenderer<'p> {
    platform: &'p dyn Platform,
}

impl<'p> SqlRenderer<'p> {
    /// Creates a renderer for the given platform.
    #[must_use]
    pub fn new(platform: &'p dyn Platform) -> Self {
        Self { platform }
    }

    /// The target platform.
    #[must_use]
    pub fn platform(&self) -> &'p dyn Platform {
        self.platform
    }

    /// Renders one operation to zero or more statements.
    pub fn render(&self, operation: &ChangeOperation) -> Result<Vec<String>> {
        let platform = self.platform;

        if operation.is_foreign_key() && !platform.supports_foreign_keys() {
            debug!(
                platform = platform.name(),
                operation = %operation,
                "Skipping foreign key operation"
            );
            return Ok(Vec::new());
        }

        let statements = match operation {
            ChangeOperation::CreateTable { table } => platform.create_table_sql(table)?,
            ChangeOperation::DropTable { name } => vec![platform.drop_table_sql(name)],
            ChangeOperation::RenameTable { from, to } => {
                vec![platform.rename_table_sql(from, to)]
            }
            ChangeOperation::AddColumn { table, column } => {
                vec![platform.add_column_sql(table, column)?]
            }
            ChangeOperation::DropColumn { table, column } => {
                vec![platform.drop_column_sql(table, column)]
            }
            ChangeOperation::ModifyColumn {
                table,
                from,
                to,
                changes,
            } => {
                if !platform.supports_alter_column() {
                    return Err(self.unsupported(operation).into());
                }
                platform.modify_column_sql(table, from, to, changes)?
            }
            ChangeOperation::RenameColumn { table, from, to } => {
                vec![platform.rename_column_sql(table, from, to)]
            }
            ChangeOperation::AddPrimaryKey { table, columns } => {
                if !platform.supports_primary_key_changes() {
                    return Err(self.unsupported(operation).into());
                }
                vec![platform.add_primary_key_sql(table, columns)]
            }
            ChangeOperation::DropPrimaryKey { table } => {
                if !platform.supports_primary_key_changes() {
                    return Err(self.unsupported(operation).into());
                }
                vec![platform.drop_primary_key_sql(table)]
            }
            ChangeOperation::AddIndex { table, index } => {
                vec![platform.create_index_sql(table, index)]
            }
            ChangeOperation::DropIndex { table, name } => {
                vec![platform.drop_index_sql(table, name)]
            }
            ChangeOperation::AddForeignKey { table, foreign_key } => {
                vec![platform.add_foreign_key_sql(table, foreign_key)]
            }
            ChangeOperation::DropForeignKey { table, name } => {
                vec![platform.drop_foreign_key_sql(table, name)]
            }
            ChangeOperation::CreateSequence { sequence } => {
                if !platform.supports_sequences() {
                    return Ok(Vec::new());
                }
                vec![platform.create_sequence_sql(sequence)]
            }
            ChangeOperation::DropSequence { name } => {
                if !platform.supports_sequences() {
                    return Ok(Vec::new());
                }
                vec![platform.drop_sequence_sql(name)]
            }
        };

        Ok(statements)
    }

    /// Renders a sequence of operations, stopping at the first failure.
    pub fn render_all<'a, I>(&self, operations: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = &'a ChangeOperation>,
    {
        let mut statements = Vec::new();
        for operation in operations {
            statements.extend(self.render(operation)?);
        }
        Ok(statements)
    }

    fn unsupported(&self, operation: &ChangeOperation) -> RenderError {
        RenderError::Unsupported {
            platform: self.platform.name(),
            operation: operation.description(),
        }
    }
}
