//! MySQL platform.

use crate::error::RenderError;
use crate::operations::ColumnProperty;
use crate::schema::{Column, TypeKind};

use super::types::{custom, numeric, varchar, TypeMap};
use super::{NameCase, Platform};

/// MySQL platform adapter.
#[derive(Debug)]
pub struct MySqlPlatform {
    types: TypeMap,
}

impl Default for MySqlPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MySqlPlatform {
    /// Creates a new MySQL platform.
    #[must_use]
    pub fn new() -> Self {
        let types = TypeMap::new()
            .with_name(TypeKind::SmallInt, "SMALLINT")
            .with_name(TypeKind::Integer, "INT")
            .with_name(TypeKind::BigInt, "BIGINT")
            .with(TypeKind::String, varchar)
            .with_name(TypeKind::Text, "LONGTEXT")
            .with_name(TypeKind::Boolean, "TINYINT(1)")
            .with(TypeKind::Decimal, numeric)
            .with_name(TypeKind::Float, "DOUBLE PRECISION")
            .with_name(TypeKind::Date, "DATE")
            .with_name(TypeKind::Time, "TIME")
            .with_name(TypeKind::DateTime, "DATETIME")
            .with_name(TypeKind::Blob, "LONGBLOB")
            .with_name(TypeKind::Json, "JSON")
            .with_name(TypeKind::Guid, "CHAR(36)")
            .with(TypeKind::Custom, custom);
        Self { types }
    }
}

impl Platform for MySqlPlatform {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn type_map(&self) -> &TypeMap {
        &self.types
    }

    fn name_case(&self) -> NameCase {
        NameCase::Insensitive
    }

    fn supports_foreign_keys(&self) -> bool {
        true
    }

    fn supports_alter_column(&self) -> bool {
        true
    }

    // DDL commits implicitly.
    fn supports_transactional_ddl(&self) -> bool {
        false
    }

    fn foreign_key_checks_sql(&self, enabled: bool) -> Option<String> {
        Some(format!(
            "SET FOREIGN_KEY_CHECKS = {}",
            u8::from(enabled)
        ))
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn auto_increment_keyword(&self) -> &'static str {
        "AUTO_INCREMENT"
    }

    fn modify_column_sql(
        &self,
        table: &str,
        _from: &Column,
        to: &Column,
        _changes: &[ColumnProperty],
    ) -> Result<Vec<String>, RenderError> {
        Ok(vec![format!(
            "ALTER TABLE {} MODIFY {}",
            self.identifier(table),
            self.column_definition(to)?
        )])
    }

    fn drop_index_sql(&self, table: &str, name: &str) -> String {
        format!(
            "DROP INDEX {} ON {}",
            self.identifier(name),
            self.identifier(table)
        )
    }

    fn drop_foreign_key_sql(&self, table: &str, name: &str) -> String {
        format!(
            "ALTER TABLE {} DROP FOREIGN KEY {}",
            self.identifier(table),
            self.identifier(name)
        )
    }
}
