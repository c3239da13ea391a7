//! Validating construction of [`Schema`] values.
//!
//! Every step checks what it can see locally: duplicate names and columns
//! referenced within the same table. Foreign key targets in other tables are
//! only resolved when the schema is diffed.
//!
//! ```rust
//! use dbschema_core::builder::SchemaBuilder;
//! use dbschema_core::schema::{Column, SqlType};
//!
//! let mut builder = SchemaBuilder::new();
//! builder
//!     .create_table("test")?
//!     .add_column(Column::new("id", SqlType::Integer))?
//!     .add_column(Column::new("email", SqlType::string()))?
//!     .set_primary_key(["id"])?;
//! let schema = builder.build();
//! assert_eq!(schema.table_names(), vec!["test".to_string()]);
//! # Ok::<(), dbschema_core::error::ValidationError>(())
//! ```

use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::schema::{Column, ForeignKey, Index, Schema, Sequence, Table};

/// Builds a [`Schema`] one table at a time.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    tables: BTreeMap<String, TableBuilder>,
    sequences: BTreeMap<String, Sequence>,
}

impl SchemaBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a new, empty table and returns it for further configuration.
    pub fn create_table(
        &mut self,
        name: impl Into<String>,
    ) -> Result<&mut TableBuilder, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::EmptyName("Table"));
        }
        if self.tables.contains_key(&name) {
            return Err(ValidationError::DuplicateTable(name));
        }
        Ok(self
            .tables
            .entry(name.clone())
            .or_insert_with(|| TableBuilder::new(name)))
    }

    /// Adds a fully described table, validating every part of it.
    pub fn add_table(&mut self, table: Table) -> Result<&mut Self, ValidationError> {
        let Table {
            name,
            columns,
            primary_key,
            indexes,
            foreign_keys,
        } = table;
        let builder = self.create_table(name)?;
        for column in columns {
            builder.add_column(column)?;
        }
        if !primary_key.is_empty() {
            builder.set_primary_key(primary_key)?;
        }
        for index in indexes {
            builder.add_index(index)?;
        }
        for foreign_key in foreign_keys {
            builder.add_foreign_key(foreign_key)?;
        }
        Ok(self)
    }

    /// Gets a previously declared table.
    pub fn table_mut(&mut self, name: &str) -> Option<&mut TableBuilder> {
        self.tables.get_mut(name)
    }

    /// Returns whether a table with this exact name was declared.
    #[must_use]
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Declares a sequence.
    pub fn create_sequence(&mut self, sequence: Sequence) -> Result<&mut Self, ValidationError> {
        if sequence.name.is_empty() {
            return Err(ValidationError::EmptyName("Sequence"));
        }
        if self.sequences.contains_key(&sequence.name) {
            return Err(ValidationError::DuplicateSequence(sequence.name));
        }
        self.sequences.insert(sequence.name.clone(), sequence);
        Ok(self)
    }

    /// Freezes the builder into a schema snapshot.
    #[must_use]
    pub fn build(self) -> Schema {
        let tables = self
            .tables
            .into_iter()
            .map(|(name, builder)| (name, builder.table))
            .collect();
        Schema::from_parts(tables, self.sequences)
    }
}

/// Configures one table of a [`SchemaBuilder`].
#[derive(Debug)]
pub struct TableBuilder {
    table: Table,
}

impl TableBuilder {
    fn new(name: String) -> Self {
        Self {
            table: Table::new(name),
        }
    }

    /// The table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.table.name
    }

    /// The table as declared so far.
    #[must_use]
    pub const fn table(&self) -> &Table {
        &self.table
    }

    /// Appends a column.
    pub fn add_column(&mut self, column: Column) -> Result<&mut Self, ValidationError> {
        if column.name.is_empty() {
            return Err(ValidationError::EmptyName("Column"));
        }
        if self.table.column(&column.name).is_some() {
            return Err(ValidationError::DuplicateColumn {
                table: self.table.name.clone(),
                column: column.name,
            });
        }
        self.table.columns.push(column);
        Ok(self)
    }

    /// Sets (or replaces) the primary key. Its columns become NOT NULL.
    pub fn set_primary_key<I, S>(&mut self, columns: I) -> Result<&mut Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        self.require_columns(&columns, "Primary key")?;
        for column in &mut self.table.columns {
            if columns.contains(&column.name) {
                column.nullable = false;
            }
        }
        self.table.primary_key = columns;
        Ok(self)
    }

    /// Adds an index over existing columns.
    pub fn add_index(&mut self, index: Index) -> Result<&mut Self, ValidationError> {
        if index.name.is_empty() {
            return Err(ValidationError::EmptyName("Index"));
        }
        if self.table.index(&index.name).is_some() {
            return Err(ValidationError::DuplicateIndex {
                table: self.table.name.clone(),
                index: index.name,
            });
        }
        self.require_columns(&index.columns, &format!("Index '{}'", index.name))?;
        self.table.indexes.push(index);
        Ok(self)
    }

    /// Adds a foreign key over existing local columns.
    ///
    /// The referenced table is not checked here.
    pub fn add_foreign_key(&mut self, foreign_key: ForeignKey) -> Result<&mut Self, ValidationError> {
        if foreign_key.name.is_empty() {
            return Err(ValidationError::EmptyName("Foreign key"));
        }
        if self.table.foreign_key(&foreign_key.name).is_some() {
            return Err(ValidationError::DuplicateForeignKey {
                table: self.table.name.clone(),
                foreign_key: foreign_key.name,
            });
        }
        if foreign_key.columns.len() != foreign_key.referenced_columns.len() {
            return Err(ValidationError::ForeignKeyArity {
                table: self.table.name.clone(),
                foreign_key: foreign_key.name,
                local: foreign_key.columns.len(),
                referenced: foreign_key.referenced_columns.len(),
            });
        }
        self.require_columns(
            &foreign_key.columns,
            &format!("Foreign key '{}'", foreign_key.name),
        )?;
        self.table.foreign_keys.push(foreign_key);
        Ok(self)
    }

    fn require_columns(&self, columns: &[String], context: &str) -> Result<(), ValidationError> {
        if columns.is_empty() {
            return Err(ValidationError::EmptyColumnList {
                table: self.table.name.clone(),
                context: context.to_string(),
            });
        }
        match columns.iter().find(|c| self.table.column(c).is_none()) {
            Some(missing) => Err(ValidationError::UnknownColumn {
                table: self.table.name.clone(),
                column: missing.clone(),
                context: context.to_string(),
            }),
            None => Ok(()),
        }
    }
}
