//! Benchmark utilities.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use fieldlog_core::{
    EntityId, MemoryEntityStore, OutstandingEntry, PropertyKind, Schema, TableSchema, Value,
};
use rand::Rng;

/// Table used by the replay benchmarks.
pub const TABLE: &str = "bench";

/// Columns of [`TABLE`], one per property kind.
pub const COLUMNS: [(&str, PropertyKind); 4] = [
    ("count", PropertyKind::Int),
    ("stamp", PropertyKind::Long),
    ("ratio", PropertyKind::Double),
    ("label", PropertyKind::Text),
];

/// Schema holding [`TABLE`].
pub fn schema() -> Schema {
    let table = COLUMNS
        .iter()
        .fold(TableSchema::new(TABLE), |t, (name, kind)| {
            t.with_property(*name, *kind)
        });
    Schema::new().with_table(table)
}

/// Generate a random value of the given kind.
pub fn random_value(rng: &mut impl Rng, kind: PropertyKind) -> Value {
    match kind {
        PropertyKind::Int => Value::Int(rng.gen()),
        PropertyKind::Long => Value::Long(rng.gen()),
        PropertyKind::Double => Value::Double(rng.gen()),
        PropertyKind::Text => {
            let len = rng.gen_range(0..24);
            Value::Text(
                (0..len)
                    .map(|_| if rng.gen_bool(0.1) { '|' } else { rng.gen_range('a'..='z') })
                    .collect(),
            )
        }
    }
}

/// Generate `pairs` random `(key, value)` pairs.
pub fn random_pairs(pairs: usize) -> Vec<(String, Value)> {
    let mut rng = rand::thread_rng();
    (0..pairs)
        .map(|i| {
            let (_, kind) = COLUMNS[i % COLUMNS.len()];
            (format!("key_{i}"), random_value(&mut rng, kind))
        })
        .collect()
}

/// Generate a log of `entities * per_entity` entries in append order.
pub fn random_log(entities: i64, per_entity: usize) -> Vec<OutstandingEntry> {
    let mut rng = rand::thread_rng();
    let total = entities as usize * per_entity;
    (0..total)
        .map(|i| {
            let id = rng.gen_range(1..=entities);
            let (column, kind) = COLUMNS[rng.gen_range(0..COLUMNS.len())];
            let token = fieldlog_codec::encode_scalar(&random_value(&mut rng, kind))
                .unwrap_or_default();
            OutstandingEntry::new(id, column, token, i as i64)
        })
        .collect()
}

/// An entity store with an empty row for each of `1..=entities`.
pub fn entity_store(entities: i64) -> MemoryEntityStore {
    let store = MemoryEntityStore::new();
    for id in 1..=entities {
        store.insert(EntityId::new(id), []);
    }
    store
}
