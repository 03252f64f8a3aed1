//! Property schema and column resolution.
//!
//! The replay engine never guesses a column's type: every stored column
//! must be resolved, per table, to a [`PropertyDescriptor`] whose
//! [`PropertyKind`] picks the typed accessor used on the decoded value.

use fieldlog_codec::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Identity of a synced table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    /// Creates a table id.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the table name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TableId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TableId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage kind of a model property.
///
/// Booleans have no kind of their own; they are stored as integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    /// 32-bit integer property.
    Int,
    /// 64-bit integer property.
    Long,
    /// Double property.
    Double,
    /// String property.
    Text,
}

impl PropertyKind {
    /// Reads `value` through this kind's accessor.
    ///
    /// Returns `None` when the value cannot be represented, e.g. text that
    /// is not a number for a numeric property.
    pub fn coerce(self, value: &Value) -> Option<Value> {
        match self {
            PropertyKind::Int => value.as_int().map(Value::Int),
            PropertyKind::Long => value.as_long().map(Value::Long),
            PropertyKind::Double => value.as_double().map(Value::Double),
            PropertyKind::Text => value.to_text().map(Value::Text),
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKind::Int => write!(f, "Int"),
            PropertyKind::Long => write!(f, "Long"),
            PropertyKind::Double => write!(f, "Double"),
            PropertyKind::Text => write!(f, "Text"),
        }
    }
}

/// Typed descriptor of a model property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Property name on the model.
    pub name: String,
    /// Storage kind.
    pub kind: PropertyKind,
}

impl PropertyDescriptor {
    /// Creates a descriptor.
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Maps a stored column to the property it is assigned through.
pub trait PropertyResolver: Send + Sync {
    /// Resolves `column` of `table`, or `None` if the table has no such column.
    fn resolve(&self, table: &TableId, column: &str) -> Option<PropertyDescriptor>;
}

/// Column registry of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table identity.
    pub table: TableId,
    /// Properties keyed by stored column name.
    pub columns: BTreeMap<String, PropertyDescriptor>,
}

impl TableSchema {
    /// Creates an empty table schema.
    pub fn new(table: impl Into<TableId>) -> Self {
        Self {
            table: table.into(),
            columns: BTreeMap::new(),
        }
    }

    /// Adds a property stored under a column of the same name.
    pub fn with_property(self, column: impl Into<String>, kind: PropertyKind) -> Self {
        let column = column.into();
        let name = column.clone();
        self.with_column(column, PropertyDescriptor::new(name, kind))
    }

    /// Adds a property stored under a different column name.
    pub fn with_column(mut self, column: impl Into<String>, descriptor: PropertyDescriptor) -> Self {
        self.columns.insert(column.into(), descriptor);
        self
    }
}

/// A resolver backed by an in-memory registry of tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    tables: HashMap<TableId, TableSchema>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table to the schema.
    pub fn add_table(&mut self, table: TableSchema) -> &mut Self {
        self.tables.insert(table.table.clone(), table);
        self
    }

    /// Builder-style method to add a table.
    pub fn with_table(mut self, table: TableSchema) -> Self {
        self.add_table(table);
        self
    }

    /// Gets a table schema by id.
    pub fn table(&self, table: &TableId) -> Option<&TableSchema> {
        self.tables.get(table)
    }
}

impl PropertyResolver for Schema {
    fn resolve(&self, table: &TableId, column: &str) -> Option<PropertyDescriptor> {
        self.tables.get(table)?.columns.get(column).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasks() -> Schema {
        Schema::new().with_table(
            TableSchema::new("tasks")
                .with_property("title", PropertyKind::Text)
                .with_property("importance", PropertyKind::Int)
                .with_column(
                    "dueDate",
                    PropertyDescriptor::new("due_date", PropertyKind::Long),
                ),
        )
    }

    #[test]
    fn resolves_known_columns() {
        let schema = tasks();
        let table = TableId::from("tasks");
        assert_eq!(
            schema.resolve(&table, "title"),
            Some(PropertyDescriptor::new("title", PropertyKind::Text))
        );
        assert_eq!(
            schema.resolve(&table, "dueDate"),
            Some(PropertyDescriptor::new("due_date", PropertyKind::Long))
        );
    }

    #[test]
    fn unknown_column_or_table_is_none() {
        let schema = tasks();
        assert_eq!(schema.resolve(&TableId::from("tasks"), "missing"), None);
        assert_eq!(schema.resolve(&TableId::from("tags"), "title"), None);
    }

    #[test]
    fn coerce_dispatches_on_kind() {
        assert_eq!(
            PropertyKind::Int.coerce(&Value::Bool(true)),
            Some(Value::Int(1))
        );
        assert_eq!(
            PropertyKind::Long.coerce(&Value::Int(4)),
            Some(Value::Long(4))
        );
        assert_eq!(
            PropertyKind::Double.coerce(&Value::Long(2)),
            Some(Value::Double(2.0))
        );
        assert_eq!(
            PropertyKind::Text.coerce(&Value::Int(9)),
            Some(Value::from("9"))
        );
        assert_eq!(PropertyKind::Int.coerce(&Value::from("abc")), None);
        assert_eq!(PropertyKind::Text.coerce(&Value::Null), None);
    }

    #[test]
    fn schema_serialization() {
        let schema = tasks();
        let json = serde_json::to_string(&schema).unwrap();
        let parsed: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(schema, parsed);
    }
}
