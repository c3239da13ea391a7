//! Abstract-to-native type lookup tables.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::schema::{SqlType, TypeKind, DEFAULT_STRING_LENGTH};

/// Renders one abstract type to its native spelling.
pub type TypeRenderer = Box<dyn Fn(&SqlType) -> String + Send + Sync>;

/// Per-platform table of type renderers, keyed by [`TypeKind`].
///
/// Platforms build their table once when constructed; rendering a column
/// type is then a single lookup.
#[derive(Default)]
pub struct TypeMap {
    renderers: HashMap<TypeKind, TypeRenderer>,
}

impl TypeMap {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a renderer for a kind.
    #[must_use]
    pub fn with<F>(mut self, kind: TypeKind, renderer: F) -> Self
    where
        F: Fn(&SqlType) -> String + Send + Sync + 'static,
    {
        self.renderers.insert(kind, Box::new(renderer));
        self
    }

    /// Registers a fixed native name for a kind.
    #[must_use]
    pub fn with_name(self, kind: TypeKind, name: &'static str) -> Self {
        self.with(kind, move |_| name.to_string())
    }

    /// Renders a type, or `None` when the kind is not registered.
    #[must_use]
    pub fn render(&self, sql_type: &SqlType) -> Option<String> {
        self.renderers
            .get(&sql_type.kind())
            .map(|renderer| renderer(sql_type))
    }

    /// Returns whether a renderer exists for the kind.
    #[must_use]
    pub fn supports(&self, kind: TypeKind) -> bool {
        self.renderers.contains_key(&kind)
    }
}

impl fmt::Debug for TypeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<TypeKind> = self.renderers.keys().copied().collect();
        kinds.sort();
        f.debug_struct("TypeMap").field("kinds", &kinds).finish()
    }
}

/// `VARCHAR(n)`.
#[must_use]
pub fn varchar(sql_type: &SqlType) -> String {
    match sql_type {
        SqlType::String(length) => format!("VARCHAR({length})"),
        _ => format!("VARCHAR({DEFAULT_STRING_LENGTH})"),
    }
}

/// `NUMERIC(p, s)`.
#[must_use]
pub fn numeric(sql_type: &SqlType) -> String {
    match sql_type {
        SqlType::Decimal(precision, scale) => format!("NUMERIC({precision}, {scale})"),
        _ => "NUMERIC".to_string(),
    }
}

/// The native spelling carried by a custom type.
#[must_use]
pub fn custom(sql_type: &SqlType) -> String {
    match sql_type {
        SqlType::Custom(native) => native.clone(),
        other => other.to_string().to_uppercase(),
    }
}

static NATIVE_TYPE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_ ]*?)\s*(?:\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\))?\s*$").ok()
});

/// Maps a declared native type (as reported by a catalog) back to an
/// abstract type. Unknown spellings become [`SqlType::Custom`], keeping
/// their declared case.
#[must_use]
pub fn parse_native_type(declared: &str) -> SqlType {
    let fallback = || SqlType::Custom(declared.trim().to_string());
    let Some(captures) = NATIVE_TYPE.as_ref().and_then(|re| re.captures(declared)) else {
        return fallback();
    };

    let base = captures
        .get(1)
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
        .to_uppercase();
    let first = captures.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
    let second = captures.get(3).and_then(|m| m.as_str().parse::<u8>().ok());

    match base.as_str() {
        "SMALLINT" | "INT2" => SqlType::SmallInt,
        "INT" | "INTEGER" | "INT4" | "MEDIUMINT" => SqlType::Integer,
        "BIGINT" | "INT8" => SqlType::BigInt,
        "VARCHAR" | "CHARACTER VARYING" | "NVARCHAR" | "VARCHAR2" => {
            SqlType::String(first.unwrap_or(DEFAULT_STRING_LENGTH))
        }
        "TEXT" | "CLOB" | "LONGTEXT" | "MEDIUMTEXT" | "TINYTEXT" => SqlType::Text,
        "BOOLEAN" | "BOOL" => SqlType::Boolean,
        "TINYINT" if first == Some(1) => SqlType::Boolean,
        "NUMERIC" | "DECIMAL" => {
            let precision = first.and_then(|p| u8::try_from(p).ok()).unwrap_or(10);
            SqlType::Decimal(precision, second.unwrap_or(0))
        }
        "DOUBLE PRECISION" | "DOUBLE" | "FLOAT" | "FLOAT8" | "REAL" => SqlType::Float,
        "DATE" => SqlType::Date,
        "TIME" => SqlType::Time,
        "DATETIME" | "TIMESTAMP" => SqlType::DateTime,
        "BLOB" | "BYTEA" | "LONGBLOB" => SqlType::Blob,
        "JSON" | "JSONB" => SqlType::Json,
        "UUID" => SqlType::Guid,
        _ => fallback(),
    }
}
