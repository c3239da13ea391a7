//! Sources of the desired schema.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builder::SchemaBuilder;
use crate::error::Result;
use crate::schema::{Schema, Sequence, Table};

/// Describes the schema an application wants.
///
/// `define` is called once per run with a fresh builder.
pub trait SchemaDefinition {
    /// Declares tables and sequences on the builder.
    fn define(&self, schema: &mut SchemaBuilder) -> Result<()>;
}

impl<F> SchemaDefinition for F
where
    F: Fn(&mut SchemaBuilder) -> Result<()>,
{
    fn define(&self, schema: &mut SchemaBuilder) -> Result<()> {
        self(schema)
    }
}

/// Runs a definition against an empty builder and returns the result.
pub fn build_schema<D: SchemaDefinition + ?Sized>(definition: &D) -> Result<Schema> {
    let mut builder = SchemaBuilder::new();
    definition.define(&mut builder)?;
    Ok(builder.build())
}

/// A schema described as a JSON document.
///
/// ```json
/// {
///   "tables": [
///     {
///       "name": "test",
///       "columns": [
///         { "name": "id", "type": "integer" },
///         { "name": "email", "type": { "string": 255 } }
///       ],
///       "primary_key": ["id"]
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaDefinition {
    /// Table definitions.
    #[serde(default)]
    pub tables: Vec<Table>,
    /// Sequence definitions.
    #[serde(default)]
    pub sequences: Vec<Sequence>,
}

impl JsonSchemaDefinition {
    /// Parses a definition document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a definition document from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading schema definition");
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Describes an existing schema, e.g. an introspected one.
    #[must_use]
    pub fn from_schema(schema: &Schema) -> Self {
        Self {
            tables: schema.tables().cloned().collect(),
            sequences: schema.sequences().cloned().collect(),
        }
    }

    /// Serializes the document as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl SchemaDefinition for JsonSchemaDefinition {
    fn define(&self, schema: &mut SchemaBuilder) -> Result<()> {
        for table in &self.tables {
            schema.add_table(table.clone())?;
        }
        for sequence in &self.sequences {
            schema.create_sequence(sequence.clone())?;
        }
        Ok(())
    }
}
