//! SQLite platform.
//!
//! SQLite cannot alter column definitions or primary keys in place, and
//! foreign keys only exist inline in `CREATE TABLE`, so foreign key changes
//! on existing tables render to nothing. Auto-increment is only expressible
//! on a single `INTEGER PRIMARY KEY` column.

use crate::error::RenderError;
use crate::schema::{Column, SqlType, Table, TypeKind};

use super::types::{custom, numeric, varchar, TypeMap};
use super::{NameCase, Platform};

/// SQLite platform adapter.
#[derive(Debug)]
pub struct SqlitePlatform {
    types: TypeMap,
}

impl Default for SqlitePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlitePlatform {
    /// Creates a new SQLite platform.
    #[must_use]
    pub fn new() -> Self {
        let types = TypeMap::new()
            .with_name(TypeKind::SmallInt, "SMALLINT")
            .with_name(TypeKind::Integer, "INTEGER")
            .with_name(TypeKind::BigInt, "BIGINT")
            .with(TypeKind::String, varchar)
            .with_name(TypeKind::Text, "CLOB")
            .with_name(TypeKind::Boolean, "BOOLEAN")
            .with(TypeKind::Decimal, numeric)
            .with_name(TypeKind::Float, "DOUBLE PRECISION")
            .with_name(TypeKind::Date, "DATE")
            .with_name(TypeKind::Time, "TIME")
            .with_name(TypeKind::DateTime, "DATETIME")
            .with_name(TypeKind::Blob, "BLOB")
            .with_name(TypeKind::Json, "CLOB")
            .with_name(TypeKind::Guid, "CHAR(36)")
            .with(TypeKind::Custom, custom);
        Self { types }
    }

    /// The single auto-incrementing primary key column, which SQLite only
    /// accepts inline as `INTEGER PRIMARY KEY AUTOINCREMENT`.
    fn inline_primary_key(table: &Table) -> Option<&Column> {
        match table.primary_key.as_slice() {
            [only] => table
                .column(only)
                .filter(|c| c.auto_increment && c.sql_type.is_integer()),
            _ => None,
        }
    }

    fn column_sql(&self, column: &Column, inline_primary_key: bool) -> Result<String, RenderError> {
        let mut parts = vec![self.identifier(&column.name)];

        if inline_primary_key {
            parts.push("INTEGER PRIMARY KEY".to_string());
            parts.push(self.auto_increment_keyword().to_string());
        } else if column.auto_increment {
            return Err(RenderError::Unsupported {
                platform: self.name(),
                operation: format!(
                    "Auto-increment on column '{}' outside a single integer primary key",
                    column.name
                ),
            });
        } else {
            parts.push(self.native_type(&column.sql_type)?);
        }

        if let Some(default) = &column.default {
            parts.push(format!("DEFAULT {}", self.render_default(default)));
        }

        if !column.nullable {
            parts.push("NOT NULL".to_string());
        }

        Ok(parts.join(" "))
    }
}

impl Platform for SqlitePlatform {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn type_map(&self) -> &TypeMap {
        &self.types
    }

    fn name_case(&self) -> NameCase {
        NameCase::Insensitive
    }

    fn supports_foreign_keys(&self) -> bool {
        false
    }

    fn supports_inline_foreign_keys(&self) -> bool {
        true
    }

    fn supports_alter_column(&self) -> bool {
        false
    }

    fn foreign_key_checks_sql(&self, enabled: bool) -> Option<String> {
        Some(format!(
            "PRAGMA foreign_keys = {}",
            if enabled { "ON" } else { "OFF" }
        ))
    }

    // All integer types share one storage class.
    fn comparable_type(&self, sql_type: &SqlType) -> String {
        if sql_type.is_integer() {
            return "INTEGER".to_string();
        }
        self.native_type(sql_type)
            .unwrap_or_else(|_| sql_type.to_string())
            .to_uppercase()
    }

    fn auto_increment_keyword(&self) -> &'static str {
        "AUTOINCREMENT"
    }

    fn column_definition(&self, column: &Column) -> Result<String, RenderError> {
        self.column_sql(column, false)
    }

    fn create_table_sql(&self, table: &Table) -> Result<Vec<String>, RenderError> {
        let inline = Self::inline_primary_key(table);

        let mut definitions = table
            .columns
            .iter()
            .map(|c| self.column_sql(c, inline.is_some_and(|pk| pk.name == c.name)))
            .collect::<Result<Vec<_>, _>>()?;

        if inline.is_none() && table.has_primary_key() {
            definitions.push(format!(
                "PRIMARY KEY({})",
                self.identifier_list(&table.primary_key)
            ));
        }
        definitions.extend(
            table
                .foreign_keys
                .iter()
                .map(|fk| self.foreign_key_constraint(fk)),
        );

        let mut statements = vec![format!(
            "CREATE TABLE {} ({})",
            self.identifier(&table.name),
            definitions.join(", ")
        )];
        statements.extend(
            table
                .indexes
                .iter()
                .map(|index| self.create_index_sql(&table.name, index)),
        );
        Ok(statements)
    }

    fn add_column_sql(&self, table: &str, column: &Column) -> Result<String, RenderError> {
        Ok(format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.identifier(table),
            self.column_definition(column)?
        ))
    }
}
