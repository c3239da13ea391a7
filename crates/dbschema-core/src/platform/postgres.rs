//! PostgreSQL platform.

use crate::error::RenderError;
use crate::operations::ColumnProperty;
use crate::schema::{Column, SqlType, TypeKind};

use super::types::{custom, numeric, varchar, TypeMap};
use super::{NameCase, Platform};

/// PostgreSQL platform adapter.
#[derive(Debug)]
pub struct PostgresPlatform {
    types: TypeMap,
}

impl Default for PostgresPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PostgresPlatform {
    /// Creates a new PostgreSQL platform.
    #[must_use]
    pub fn new() -> Self {
        let types = TypeMap::new()
            .with_name(TypeKind::SmallInt, "SMALLINT")
            .with_name(TypeKind::Integer, "INT")
            .with_name(TypeKind::BigInt, "BIGINT")
            .with(TypeKind::String, varchar)
            .with_name(TypeKind::Text, "TEXT")
            .with_name(TypeKind::Boolean, "BOOLEAN")
            .with(TypeKind::Decimal, numeric)
            .with_name(TypeKind::Float, "DOUBLE PRECISION")
            .with_name(TypeKind::Date, "DATE")
            .with_name(TypeKind::Time, "TIME")
            .with_name(TypeKind::DateTime, "TIMESTAMP")
            .with_name(TypeKind::Blob, "BYTEA")
            .with_name(TypeKind::Json, "JSON")
            .with_name(TypeKind::Guid, "UUID")
            .with(TypeKind::Custom, custom);
        Self { types }
    }

    fn serial_type(sql_type: &SqlType) -> Option<&'static str> {
        match sql_type {
            SqlType::SmallInt => Some("SMALLSERIAL"),
            SqlType::Integer => Some("SERIAL"),
            SqlType::BigInt => Some("BIGSERIAL"),
            _ => None,
        }
    }
}

impl Platform for PostgresPlatform {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn type_map(&self) -> &TypeMap {
        &self.types
    }

    fn name_case(&self) -> NameCase {
        NameCase::Sensitive
    }

    fn supports_foreign_keys(&self) -> bool {
        true
    }

    fn supports_alter_column(&self) -> bool {
        true
    }

    fn supports_sequences(&self) -> bool {
        true
    }

    // Unquoted identifiers fold to lower case.
    fn requires_quoting(&self, name: &str) -> bool {
        name.chars().any(|c| c.is_ascii_uppercase())
            || !name
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            || super::RESERVED_WORDS
                .iter()
                .any(|word| word.eq_ignore_ascii_case(name))
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value { "true" } else { "false" }
    }

    fn auto_increment_keyword(&self) -> &'static str {
        ""
    }

    fn column_definition(&self, column: &Column) -> Result<String, RenderError> {
        let native = match Self::serial_type(&column.sql_type) {
            Some(serial) if column.auto_increment => serial.to_string(),
            _ => self.native_type(&column.sql_type)?,
        };
        let mut parts = vec![self.identifier(&column.name), native];

        if let Some(default) = &column.default {
            parts.push(format!("DEFAULT {}", self.render_default(default)));
        }

        if !column.nullable {
            parts.push("NOT NULL".to_string());
        }

        Ok(parts.join(" "))
    }

    fn modify_column_sql(
        &self,
        table: &str,
        _from: &Column,
        to: &Column,
        changes: &[ColumnProperty],
    ) -> Result<Vec<String>, RenderError> {
        let prefix = format!(
            "ALTER TABLE {} ALTER COLUMN {}",
            self.identifier(table),
            self.identifier(&to.name)
        );

        changes
            .iter()
            .map(|change| match change {
                ColumnProperty::Type => Ok(format!(
                    "{prefix} TYPE {}",
                    self.native_type(&to.sql_type)?
                )),
                ColumnProperty::Nullable if to.nullable => Ok(format!("{prefix} DROP NOT NULL")),
                ColumnProperty::Nullable => Ok(format!("{prefix} SET NOT NULL")),
                ColumnProperty::Default => Ok(match &to.default {
                    Some(default) => {
                        format!("{prefix} SET DEFAULT {}", self.render_default(default))
                    }
                    None => format!("{prefix} DROP DEFAULT"),
                }),
                ColumnProperty::AutoIncrement => Err(RenderError::Unsupported {
                    platform: self.name(),
                    operation: format!(
                        "change auto-increment of column '{}' in table '{table}'",
                        to.name
                    ),
                }),
            })
            .collect()
    }

    fn drop_primary_key_sql(&self, table: &str) -> String {
        format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.identifier(table),
            self.identifier(&format!("{table}_pkey"))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DefaultValue, Sequence, Table};

    #[test]
    fn test_create_table_with_serial() {
        let mut table = Table::new("users");
        table
            .columns
            .push(Column::new("id", SqlType::BigInt).auto_increment());
        table.columns.push(
            Column::new("active", SqlType::Boolean).default(DefaultValue::Bool(false)),
        );
        table.primary_key = vec!["id".into()];

        let sql = PostgresPlatform::new().create_table_sql(&table).unwrap();
        assert_eq!(
            sql,
            vec!["CREATE TABLE users (id BIGSERIAL NOT NULL, active BOOLEAN DEFAULT false NOT NULL, PRIMARY KEY(id))"]
        );
    }

    #[test]
    fn test_mixed_case_identifiers_are_quoted() {
        let platform = PostgresPlatform::new();
        assert_eq!(platform.identifier("userId"), "\"userId\"");
        assert_eq!(platform.identifier("user_id"), "user_id");
    }

    #[test]
    fn test_modify_column() {
        let from = Column::new("age", SqlType::Integer);
        let to = Column::new("age", SqlType::BigInt)
            .nullable()
            .default(DefaultValue::Integer(0));
        let sql = PostgresPlatform::new()
            .modify_column_sql(
                "users",
                &from,
                &to,
                &[
                    ColumnProperty::Type,
                    ColumnProperty::Nullable,
                    ColumnProperty::Default,
                ],
            )
            .unwrap();
        assert_eq!(
            sql,
            vec![
                "ALTER TABLE users ALTER COLUMN age TYPE BIGINT",
                "ALTER TABLE users ALTER COLUMN age DROP NOT NULL",
                "ALTER TABLE users ALTER COLUMN age SET DEFAULT 0",
            ]
        );
    }

    #[test]
    fn test_auto_increment_change_is_unsupported() {
        let from = Column::new("id", SqlType::Integer);
        let to = Column::new("id", SqlType::Integer).auto_increment();
        let err = PostgresPlatform::new()
            .modify_column_sql("users", &from, &to, &[ColumnProperty::AutoIncrement])
            .unwrap_err();
        assert!(matches!(err, RenderError::Unsupported { .. }));
    }

    #[test]
    fn test_primary_key_and_sequence() {
        let platform = PostgresPlatform::new();
        assert_eq!(
            platform.drop_primary_key_sql("users"),
            "ALTER TABLE users DROP CONSTRAINT users_pkey"
        );
        assert_eq!(
            platform.create_sequence_sql(&Sequence::new("order_seq").allocation_size(10)),
            "CREATE SEQUENCE order_seq INCREMENT BY 10 MINVALUE 1 START 1"
        );
    }
}
