//! In-memory model snapshot built during replay.

use crate::entity::EntityId;
use crate::schema::{PropertyDescriptor, TableId};
use fieldlog_codec::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A model instance identified by its entity id.
///
/// Snapshots start out holding nothing but the id; every value set on them
/// goes through a resolved [`PropertyDescriptor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Table the entity lives in.
    pub table: TableId,
    /// Entity id.
    pub id: EntityId,
    values: BTreeMap<String, Value>,
}

impl EntitySnapshot {
    /// Creates an empty snapshot seeded with the entity id.
    pub fn new(table: TableId, id: EntityId) -> Self {
        Self {
            table,
            id,
            values: BTreeMap::new(),
        }
    }

    /// Assigns `value` to the property through its kind's accessor.
    ///
    /// Returns false (leaving the snapshot untouched) if the kind cannot
    /// represent the value. A later assignment to the same property
    /// replaces the earlier one.
    pub fn assign(&mut self, property: &PropertyDescriptor, value: &Value) -> bool {
        match property.kind.coerce(value) {
            Some(typed) => {
                self.values.insert(property.name.clone(), typed);
                true
            }
            None => false,
        }
    }

    /// Sets a property value directly.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(name.into(), value)
    }

    /// Gets a property value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// All set properties, ordered by name.
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Number of set properties.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no property has been set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
