//! Schema representation types.
//!
//! A [`Schema`] is an immutable snapshot of a database structure: tables with
//! their columns, primary key, indexes and foreign keys, plus sequences. It is
//! produced either by a [`SchemaBuilder`](crate::builder::SchemaBuilder) from
//! an application definition or by introspecting a live database.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Length used for `string` columns declared without one.
pub const DEFAULT_STRING_LENGTH: u32 = 255;

/// Abstract column types, independent of any SQL dialect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    /// Small integer (16-bit).
    SmallInt,
    /// Integer (32-bit).
    Integer,
    /// Big integer (64-bit).
    BigInt,
    /// Variable-length character string with a maximum length.
    String(u32),
    /// Unbounded text.
    Text,
    /// Boolean.
    Boolean,
    /// Exact decimal with precision and scale.
    Decimal(u8, u8),
    /// Double precision floating point.
    Float,
    /// Date only.
    Date,
    /// Time only.
    Time,
    /// Date and time.
    DateTime,
    /// Binary large object.
    Blob,
    /// JSON document.
    Json,
    /// Globally unique identifier.
    Guid,
    /// A native type with no abstract counterpart, rendered verbatim.
    Custom(String),
}

impl SqlType {
    /// A `string` column of the default length.
    #[must_use]
    pub const fn string() -> Self {
        Self::String(DEFAULT_STRING_LENGTH)
    }

    /// The renderer lookup key of this type.
    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::SmallInt => TypeKind::SmallInt,
            Self::Integer => TypeKind::Integer,
            Self::BigInt => TypeKind::BigInt,
            Self::String(_) => TypeKind::String,
            Self::Text => TypeKind::Text,
            Self::Boolean => TypeKind::Boolean,
            Self::Decimal(_, _) => TypeKind::Decimal,
            Self::Float => TypeKind::Float,
            Self::Date => TypeKind::Date,
            Self::Time => TypeKind::Time,
            Self::DateTime => TypeKind::DateTime,
            Self::Blob => TypeKind::Blob,
            Self::Json => TypeKind::Json,
            Self::Guid => TypeKind::Guid,
            Self::Custom(_) => TypeKind::Custom,
        }
    }

    /// Whether the type belongs to the integer family.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::SmallInt | Self::Integer | Self::BigInt)
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(length) => write!(f, "string({length})"),
            Self::Decimal(precision, scale) => write!(f, "decimal({precision}, {scale})"),
            Self::Custom(native) => write!(f, "custom({native})"),
            other => write!(f, "{}", other.kind().name()),
        }
    }
}

/// Parameterless discriminant of [`SqlType`], used to key per-platform type
/// renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKind {
    SmallInt,
    Integer,
    BigInt,
    String,
    Text,
    Boolean,
    Decimal,
    Float,
    Date,
    Time,
    DateTime,
    Blob,
    Json,
    Guid,
    Custom,
}

impl TypeKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::SmallInt,
        Self::Integer,
        Self::BigInt,
        Self::String,
        Self::Text,
        Self::Boolean,
        Self::Decimal,
        Self::Float,
        Self::Date,
        Self::Time,
        Self::DateTime,
        Self::Blob,
        Self::Json,
        Self::Guid,
        Self::Custom,
    ];

    /// Lower-case name of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SmallInt => "smallint",
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::String => "string",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Blob => "blob",
            Self::Json => "json",
            Self::Guid => "guid",
            Self::Custom => "custom",
        }
    }
}

/// Default value for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    /// NULL default.
    Null,
    /// Boolean default.
    Bool(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default.
    String(String),
    /// SQL expression (e.g., "CURRENT_TIMESTAMP").
    Expression(String),
}

impl DefaultValue {
    /// Parses a default as reported by a database catalog.
    ///
    /// Quoted literals become strings, numbers become numeric defaults and
    /// anything else is kept as an expression.
    #[must_use]
    pub fn from_sql(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("NULL") {
            return Self::Null;
        }
        if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
            return Self::String(raw[1..raw.len() - 1].replace("''", "'"));
        }
        if let Ok(value) = raw.parse::<i64>() {
            return Self::Integer(value);
        }
        if let Ok(value) = raw.parse::<f64>() {
            return Self::Float(value);
        }
        Self::Expression(raw.to_string())
    }
}

/// Foreign key action (ON DELETE, ON UPDATE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyAction {
    /// No action (error if referenced row is deleted/updated).
    #[default]
    NoAction,
    /// Restrict (same as NoAction but checked immediately).
    Restrict,
    /// Cascade the delete/update to referencing rows.
    Cascade,
    /// Set the foreign key column to NULL.
    SetNull,
    /// Set the foreign key column to its default value.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of this action.
    #[must_use]
    pub const fn to_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }

    /// Parses an action as reported by a database catalog.
    #[must_use]
    pub fn from_sql(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "RESTRICT" => Self::Restrict,
            "CASCADE" => Self::Cascade,
            "SET NULL" => Self::SetNull,
            "SET DEFAULT" => Self::SetDefault,
            _ => Self::NoAction,
        }
    }
}

/// A table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Abstract data type.
    #[serde(rename = "type")]
    pub sql_type: SqlType,
    /// Whether the column allows NULL values.
    #[serde(default)]
    pub nullable: bool,
    /// Default value, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    /// Whether this column auto-increments.
    #[serde(default)]
    pub auto_increment: bool,
}

impl Column {
    /// Creates a NOT NULL column without default.
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            nullable: false,
            default: None,
            auto_increment: false,
        }
    }

    /// Allows NULL values.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Forbids NULL values.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Marks the column as auto-incrementing.
    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }
}

/// A table index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Indexed columns, in order.
    pub columns: Vec<String>,
    /// Whether this is a unique index.
    #[serde(default)]
    pub unique: bool,
}

impl Index {
    /// Creates a non-unique index.
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    /// Creates a unique index.
    pub fn unique<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unique: true,
            ..Self::new(name, columns)
        }
    }
}

/// A foreign key constraint.
///
/// The referenced table is named, not linked: it is resolved when the schema
/// is diffed, so tables may be declared in any order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name.
    pub name: String,
    /// Local columns, in order.
    pub columns: Vec<String>,
    /// Referenced table name.
    pub referenced_table: String,
    /// Referenced columns, in order.
    pub referenced_columns: Vec<String>,
    /// ON DELETE action.
    #[serde(default)]
    pub on_delete: ForeignKeyAction,
    /// ON UPDATE action.
    #[serde(default)]
    pub on_update: ForeignKeyAction,
}

impl ForeignKey {
    /// Creates a foreign key with `NO ACTION` semantics.
    pub fn new<I, S, J, T>(
        name: impl Into<String>,
        columns: I,
        referenced_table: impl Into<String>,
        referenced_columns: J,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        J: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            referenced_table: referenced_table.into(),
            referenced_columns: referenced_columns.into_iter().map(Into::into).collect(),
            on_delete: ForeignKeyAction::NoAction,
            on_update: ForeignKeyAction::NoAction,
        }
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub const fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = action;
        self
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub const fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = action;
        self
    }
}

/// A database sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    /// Sequence name.
    pub name: String,
    /// Increment between generated values.
    #[serde(default = "one")]
    pub allocation_size: i64,
    /// First generated value.
    #[serde(default = "one")]
    pub initial_value: i64,
}

const fn one() -> i64 {
    1
}

impl Sequence {
    /// Creates a sequence starting at 1 with an increment of 1.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allocation_size: 1,
            initial_value: 1,
        }
    }

    /// Sets the increment.
    #[must_use]
    pub const fn allocation_size(mut self, size: i64) -> Self {
        self.allocation_size = size;
        self
    }

    /// Sets the first value.
    #[must_use]
    pub const fn initial_value(mut self, value: i64) -> Self {
        self.initial_value = value;
        self
    }
}

/// A table definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Columns, in declaration order.
    pub columns: Vec<Column>,
    /// Primary key columns, in order. Empty when the table has no primary key.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,
    /// Indexes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<Index>,
    /// Foreign keys.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Gets a column by exact name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Gets an index by exact name.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Gets a foreign key by exact name.
    #[must_use]
    pub fn foreign_key(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.name == name)
    }

    /// Returns whether the table declares a primary key.
    #[must_use]
    pub fn has_primary_key(&self) -> bool {
        !self.primary_key.is_empty()
    }

    /// Returns a copy of this table without its foreign keys.
    #[must_use]
    pub fn without_foreign_keys(&self) -> Self {
        Self {
            foreign_keys: Vec::new(),
            ..self.clone()
        }
    }
}

/// An immutable database schema snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    tables: BTreeMap<String, Table>,
    sequences: BTreeMap<String, Sequence>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) const fn from_parts(
        tables: BTreeMap<String, Table>,
        sequences: BTreeMap<String, Sequence>,
    ) -> Self {
        Self { tables, sequences }
    }

    /// Gets a table by exact name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Iterates tables ordered by name.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Table names, ordered.
    #[must_use]
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Gets a sequence by exact name.
    #[must_use]
    pub fn sequence(&self, name: &str) -> Option<&Sequence> {
        self.sequences.get(name)
    }

    /// Iterates sequences ordered by name.
    pub fn sequences(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.values()
    }

    /// Returns whether the schema has neither tables nor sequences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.sequences.is_empty()
    }

    /// Returns a schema with the same sequences and no tables.
    #[must_use]
    pub fn without_tables(&self) -> Self {
        Self {
            tables: BTreeMap::new(),
            sequences: self.sequences.clone(),
        }
    }

    pub(crate) fn tables_mut(&mut self) -> &mut BTreeMap<String, Table> {
        &mut self.tables
    }

    pub(crate) fn sequences_mut(&mut self) -> &mut BTreeMap<String, Sequence> {
        &mut self.sequences
    }
}
