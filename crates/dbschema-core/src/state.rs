//! In-memory replay of change sets.
//!
//! [`SchemaState`] applies [`ChangeOperation`]s to a [`Schema`] without
//! touching a database. It predicts the schema a change set produces, which
//! is how diffs are checked for idempotence.

use crate::error::{Result, SchemaError};
use crate::operations::ChangeOperation;
use crate::schema::{Schema, Table};

/// A schema that change sets can be replayed on.
#[derive(Debug, Clone, Default)]
pub struct SchemaState {
    schema: Schema,
}

impl SchemaState {
    /// Starts from the given schema.
    #[must_use]
    pub const fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// Returns the current schema.
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Consumes and returns the schema.
    #[must_use]
    pub fn into_schema(self) -> Schema {
        self.schema
    }

    /// Applies operations in order.
    pub fn apply_all<'a, I>(&mut self, operations: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a ChangeOperation>,
    {
        for operation in operations {
            self.apply_operation(operation)?;
        }
        Ok(())
    }

    /// Applies a single operation.
    pub fn apply_operation(&mut self, operation: &ChangeOperation) -> Result<()> {
        match operation {
            ChangeOperation::CreateTable { table } => {
                let tables = self.schema.tables_mut();
                if tables.contains_key(&table.name) {
                    return Err(invalid(format!("Table '{}' already exists", table.name)));
                }
                tables.insert(table.name.clone(), table.clone());
            }

            ChangeOperation::DropTable { name } => {
                self.schema
                    .tables_mut()
                    .remove(name)
                    .ok_or_else(|| missing_table(name))?;
            }

            ChangeOperation::RenameTable { from, to } => {
                let tables = self.schema.tables_mut();
                if tables.contains_key(to) {
                    return Err(invalid(format!("Table '{to}' already exists")));
                }
                let mut table = tables.remove(from).ok_or_else(|| missing_table(from))?;
                table.name.clone_from(to);
                tables.insert(to.clone(), table);
            }

            ChangeOperation::AddColumn { table, column } => {
                let t = self.table_mut(table)?;
                if t.column(&column.name).is_some() {
                    return Err(invalid(format!(
                        "Column '{}' already exists in table '{table}'",
                        column.name
                    )));
                }
                t.columns.push(column.clone());
            }

            ChangeOperation::DropColumn { table, column } => {
                let t = self.table_mut(table)?;
                let idx = column_position(t, column)?;
                t.columns.remove(idx);
            }

            ChangeOperation::ModifyColumn { table, from, to, .. } => {
                let t = self.table_mut(table)?;
                let idx = column_position(t, &from.name)?;
                t.columns[idx] = to.clone();
            }

            ChangeOperation::RenameColumn { table, from, to } => {
                let t = self.table_mut(table)?;
                let idx = column_position(t, from)?;
                t.columns[idx].name.clone_from(to);
                for key in t
                    .primary_key
                    .iter_mut()
                    .chain(t.indexes.iter_mut().flat_map(|i| i.columns.iter_mut()))
                    .chain(t.foreign_keys.iter_mut().flat_map(|fk| fk.columns.iter_mut()))
                {
                    if key == from {
                        key.clone_from(to);
                    }
                }
            }

            ChangeOperation::AddPrimaryKey { table, columns } => {
                let t = self.table_mut(table)?;
                if t.has_primary_key() {
                    return Err(invalid(format!("Table '{table}' already has a primary key")));
                }
                t.primary_key.clone_from(columns);
            }

            ChangeOperation::DropPrimaryKey { table } => {
                self.table_mut(table)?.primary_key.clear();
            }

            ChangeOperation::AddIndex { table, index } => {
                let t = self.table_mut(table)?;
                if t.index(&index.name).is_some() {
                    return Err(invalid(format!(
                        "Index '{}' already exists on table '{table}'",
                        index.name
                    )));
                }
                t.indexes.push(index.clone());
            }

            ChangeOperation::DropIndex { table, name } => {
                let t = self.table_mut(table)?;
                let idx = t
                    .indexes
                    .iter()
                    .position(|i| i.name == *name)
                    .ok_or_else(|| invalid(format!("Index '{name}' does not exist on table '{table}'")))?;
                t.indexes.remove(idx);
            }

            ChangeOperation::AddForeignKey { table, foreign_key } => {
                let t = self.table_mut(table)?;
                if t.foreign_key(&foreign_key.name).is_some() {
                    return Err(invalid(format!(
                        "Foreign key '{}' already exists on table '{table}'",
                        foreign_key.name
                    )));
                }
                t.foreign_keys.push(foreign_key.clone());
            }

            ChangeOperation::DropForeignKey { table, name } => {
                let t = self.table_mut(table)?;
                let idx = t
                    .foreign_keys
                    .iter()
                    .position(|fk| fk.name == *name)
                    .ok_or_else(|| {
                        invalid(format!(
                            "Foreign key '{name}' does not exist on table '{table}'"
                        ))
                    })?;
                t.foreign_keys.remove(idx);
            }

            ChangeOperation::CreateSequence { sequence } => {
                let sequences = self.schema.sequences_mut();
                if sequences.contains_key(&sequence.name) {
                    return Err(invalid(format!(
                        "Sequence '{}' already exists",
                        sequence.name
                    )));
                }
                sequences.insert(sequence.name.clone(), sequence.clone());
            }

            ChangeOperation::DropSequence { name } => {
                self.schema
                    .sequences_mut()
                    .remove(name)
                    .ok_or_else(|| invalid(format!("Sequence '{name}' does not exist")))?;
            }
        }

        Ok(())
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.schema
            .tables_mut()
            .get_mut(name)
            .ok_or_else(|| missing_table(name))
    }
}

fn invalid(message: String) -> SchemaError {
    SchemaError::InvalidState(message)
}

fn missing_table(name: &str) -> SchemaError {
    invalid(format!("Table '{name}' does not exist"))
}

fn column_position(table: &Table, column: &str) -> Result<usize> {
    table
        .columns
        .iter()
        .position(|c| c.name == column)
        .ok_or_else(|| {
            invalid(format!(
                "Column '{column}' does not exist in table '{}'",
                table.name
            ))
        })
}
