//! Database platform adapters.
//!
//! A [`Platform`] knows a dialect's native column types, its capabilities and
//! how each kind of schema change is spelled in that dialect. Default methods
//! produce ANSI-flavoured DDL; platforms override where they differ.

mod mysql;
mod postgres;
mod sqlite;
pub mod types;

pub use mysql::MySqlPlatform;
pub use postgres::PostgresPlatform;
pub use sqlite::SqlitePlatform;
pub use types::TypeMap;

use crate::error::RenderError;
use crate::operations::ColumnProperty;
use crate::schema::{
    Column, DefaultValue, ForeignKey, ForeignKeyAction, Index, Sequence, SqlType, Table,
};

/// Words that must be quoted when used as identifiers.
const RESERVED_WORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "AS", "ASC", "BETWEEN", "BY", "CASE", "CHECK", "COLUMN",
    "CONSTRAINT", "CREATE", "CROSS", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE",
    "END", "EXISTS", "FOREIGN", "FROM", "FULL", "GROUP", "HAVING", "IN", "INDEX", "INNER",
    "INSERT", "INTO", "IS", "JOIN", "KEY", "LEFT", "LIKE", "LIMIT", "NOT", "NULL", "ON", "OR",
    "ORDER", "OUTER", "PRIMARY", "REFERENCES", "RIGHT", "SELECT", "SET", "TABLE", "THEN", "TO",
    "UNION", "UNIQUE", "UPDATE", "USER", "USING", "VALUES", "WHEN", "WHERE", "WITH",
];

/// How identifiers are compared when matching two schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameCase {
    /// `Users` and `users` are different names.
    Sensitive,
    /// `Users` and `users` name the same object.
    Insensitive,
}

impl NameCase {
    /// The key under which a name is matched.
    #[must_use]
    pub fn key(self, name: &str) -> String {
        match self {
            Self::Sensitive => name.to_string(),
            Self::Insensitive => name.to_lowercase(),
        }
    }

    /// Returns whether two names denote the same object.
    #[must_use]
    pub fn matches(self, a: &str, b: &str) -> bool {
        self.key(a) == self.key(b)
    }
}

/// Trait for dialect-specific DDL generation and capability reporting.
pub trait Platform: Send + Sync {
    /// Returns the platform name.
    fn name(&self) -> &'static str;

    /// The abstract-to-native type table of this platform.
    fn type_map(&self) -> &TypeMap;

    /// How identifiers are compared on this platform.
    fn name_case(&self) -> NameCase;

    /// Returns whether foreign keys can be added and dropped on existing tables.
    fn supports_foreign_keys(&self) -> bool;

    /// Returns whether foreign keys are declared inside `CREATE TABLE`, so a
    /// new table carries its own foreign keys instead of separate additions.
    fn supports_inline_foreign_keys(&self) -> bool {
        false
    }

    /// Returns whether column definitions can be altered in place.
    fn supports_alter_column(&self) -> bool;

    /// Returns whether primary keys can be dropped and added on existing tables.
    fn supports_primary_key_changes(&self) -> bool {
        self.supports_alter_column()
    }

    /// Returns whether the platform has sequences.
    fn supports_sequences(&self) -> bool {
        false
    }

    /// Returns whether DDL statements take part in transactions.
    fn supports_transactional_ddl(&self) -> bool {
        true
    }

    /// SQL toggling foreign key enforcement for the session, if the platform
    /// has such a switch.
    fn foreign_key_checks_sql(&self, _enabled: bool) -> Option<String> {
        None
    }

    /// The identifier quote character.
    fn quote_char(&self) -> char {
        '"'
    }

    /// Quotes an identifier unconditionally.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.quote_char();
        let escaped = name.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{escaped}{quote}")
    }

    /// Returns whether an identifier must be quoted to survive unchanged.
    fn requires_quoting(&self, name: &str) -> bool {
        let mut chars = name.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        !valid_start
            || !valid_rest
            || RESERVED_WORDS
                .iter()
                .any(|word| word.eq_ignore_ascii_case(name))
    }

    /// Renders an identifier, quoting it only when required.
    fn identifier(&self, name: &str) -> String {
        if self.requires_quoting(name) {
            self.quote_identifier(name)
        } else {
            name.to_string()
        }
    }

    /// Renders a comma separated identifier list.
    fn identifier_list(&self, names: &[String]) -> String {
        names
            .iter()
            .map(|name| self.identifier(name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Returns the native type for an abstract type.
    fn native_type(&self, sql_type: &SqlType) -> Result<String, RenderError> {
        self.type_map()
            .render(sql_type)
            .ok_or_else(|| RenderError::UnsupportedType {
                platform: self.name(),
                sql_type: sql_type.to_string(),
            })
    }

    /// The form under which two column types are compared. Types with the
    /// same comparable form need no change. Type names are case-insensitive.
    fn comparable_type(&self, sql_type: &SqlType) -> String {
        self.native_type(sql_type)
            .unwrap_or_else(|_| sql_type.to_string())
            .to_uppercase()
    }

    /// Maps a type declared in the live database back to an abstract type.
    fn parse_native_type(&self, declared: &str) -> SqlType {
        types::parse_native_type(declared)
    }

    /// Renders a boolean literal.
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    /// Renders a default value.
    fn render_default(&self, value: &DefaultValue) -> String {
        match value {
            DefaultValue::Null => "NULL".to_string(),
            DefaultValue::Bool(b) => self.boolean_literal(*b).to_string(),
            DefaultValue::Integer(i) => i.to_string(),
            DefaultValue::Float(f) => f.to_string(),
            DefaultValue::String(s) => format!("'{}'", s.replace('\'', "''")),
            DefaultValue::Expression(expr) => expr.clone(),
        }
    }

    /// The keyword appended to auto-incrementing columns.
    fn auto_increment_keyword(&self) -> &'static str;

    /// Generates a column definition.
    fn column_definition(&self, column: &Column) -> Result<String, RenderError> {
        let mut parts = vec![
            self.identifier(&column.name),
            self.native_type(&column.sql_type)?,
        ];

        if column.auto_increment {
            parts.push(self.auto_increment_keyword().to_string());
        }

        if let Some(default) = &column.default {
            parts.push(format!("DEFAULT {}", self.render_default(default)));
        }

        if !column.nullable {
            parts.push("NOT NULL".to_string());
        }

        Ok(parts.join(" "))
    }

    /// Generates `CREATE TABLE` plus one `CREATE INDEX` per declared index.
    /// Foreign keys still present on the table are declared inline.
    fn create_table_sql(&self, table: &Table) -> Result<Vec<String>, RenderError> {
        let mut definitions = table
            .columns
            .iter()
            .map(|c| self.column_definition(c))
            .collect::<Result<Vec<_>, _>>()?;

        if table.has_primary_key() {
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

    /// Generates `DROP TABLE`.
    fn drop_table_sql(&self, name: &str) -> String {
        format!("DROP TABLE {}", self.identifier(name))
    }

    /// Generates a table rename.
    fn rename_table_sql(&self, from: &str, to: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME TO {}",
            self.identifier(from),
            self.identifier(to)
        )
    }

    /// Generates `ADD COLUMN`.
    fn add_column_sql(&self, table: &str, column: &Column) -> Result<String, RenderError> {
        Ok(format!(
            "ALTER TABLE {} ADD {}",
            self.identifier(table),
            self.column_definition(column)?
        ))
    }

    /// Generates `DROP COLUMN`.
    fn drop_column_sql(&self, table: &str, column: &str) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.identifier(table),
            self.identifier(column)
        )
    }

    /// Generates the statements changing a column definition.
    fn modify_column_sql(
        &self,
        table: &str,
        from: &Column,
        _to: &Column,
        _changes: &[ColumnProperty],
    ) -> Result<Vec<String>, RenderError> {
        Err(RenderError::Unsupported {
            platform: self.name(),
            operation: format!("change column '{}' of table '{table}'", from.name),
        })
    }

    /// Generates a column rename.
    fn rename_column_sql(&self, table: &str, from: &str, to: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.identifier(table),
            self.identifier(from),
            self.identifier(to)
        )
    }

    /// Generates `ADD PRIMARY KEY`.
    fn add_primary_key_sql(&self, table: &str, columns: &[String]) -> String {
        format!(
            "ALTER TABLE {} ADD PRIMARY KEY ({})",
            self.identifier(table),
            self.identifier_list(columns)
        )
    }

    /// Generates the statement removing a primary key.
    fn drop_primary_key_sql(&self, table: &str) -> String {
        format!("ALTER TABLE {} DROP PRIMARY KEY", self.identifier(table))
    }

    /// Generates `CREATE INDEX`.
    fn create_index_sql(&self, table: &str, index: &Index) -> String {
        format!(
            "CREATE {}INDEX {} ON {} ({})",
            if index.unique { "UNIQUE " } else { "" },
            self.identifier(&index.name),
            self.identifier(table),
            self.identifier_list(&index.columns)
        )
    }

    /// Generates `DROP INDEX`.
    fn drop_index_sql(&self, _table: &str, name: &str) -> String {
        format!("DROP INDEX {}", self.identifier(name))
    }

    /// Generates `CONSTRAINT ... FOREIGN KEY ... REFERENCES ...`.
    fn foreign_key_constraint(&self, foreign_key: &ForeignKey) -> String {
        let mut sql = format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.identifier(&foreign_key.name),
            self.identifier_list(&foreign_key.columns),
            self.identifier(&foreign_key.referenced_table),
            self.identifier_list(&foreign_key.referenced_columns)
        );
        if foreign_key.on_delete != ForeignKeyAction::NoAction {
            sql.push_str(" ON DELETE ");
            sql.push_str(foreign_key.on_delete.to_sql());
        }
        if foreign_key.on_update != ForeignKeyAction::NoAction {
            sql.push_str(" ON UPDATE ");
            sql.push_str(foreign_key.on_update.to_sql());
        }
        sql
    }

    /// Generates `ADD CONSTRAINT ... FOREIGN KEY`.
    fn add_foreign_key_sql(&self, table: &str, foreign_key: &ForeignKey) -> String {
        format!(
            "ALTER TABLE {} ADD {}",
            self.identifier(table),
            self.foreign_key_constraint(foreign_key)
        )
    }

    /// Generates the statement removing a foreign key.
    fn drop_foreign_key_sql(&self, table: &str, name: &str) -> String {
        format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.identifier(table),
            self.identifier(name)
        )
    }

    /// Generates `CREATE SEQUENCE`.
    fn create_sequence_sql(&self, sequence: &Sequence) -> String {
        format!(
            "CREATE SEQUENCE {} INCREMENT BY {} MINVALUE {} START {}",
            self.identifier(&sequence.name),
            sequence.allocation_size,
            sequence.initial_value,
            sequence.initial_value
        )
    }

    /// Generates `DROP SEQUENCE`.
    fn drop_sequence_sql(&self, name: &str) -> String {
        format!("DROP SEQUENCE {}", self.identifier(name))
    }
}
