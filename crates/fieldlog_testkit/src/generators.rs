//! Property-based test generators using proptest.
//!
//! Provides strategies for values that survive the wire format and for
//! outstanding-entry logs over the `tasks` schema.

use fieldlog_core::{EntityId, OutstandingEntry, Value};
use proptest::prelude::*;

/// Strategy for text that survives a round trip.
///
/// Literal `|` is allowed. Text containing `!PIPE` is excluded because its
/// escaped form cannot be told apart from an escaped separator.
pub fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 _.|!-]{0,16}")
        .expect("Invalid regex")
        .prop_filter("text must not contain the escape token", |s| {
            !s.contains("!PIPE")
        })
}

/// Strategy for values with a wire form.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(Value::Int),
        any::<i64>().prop_map(Value::Long),
        prop::num::f64::NORMAL.prop_map(Value::Double),
        any::<bool>().prop_map(Value::Bool),
        text_strategy().prop_map(Value::Text),
    ]
}

/// Strategy for map keys.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_|]{0,11}").expect("Invalid regex")
}

/// Strategy for an entity id in `1..=max`.
pub fn entity_id_strategy(max: i64) -> impl Strategy<Value = EntityId> {
    (1..=max).prop_map(EntityId::new)
}

/// A `tasks` column paired with a value its property accepts.
pub fn tasks_change_strategy() -> impl Strategy<Value = (&'static str, Value)> {
    prop_oneof![
        text_strategy().prop_map(|s| ("title", Value::Text(s))),
        any::<i32>().prop_map(|n| ("importance", Value::Int(n))),
        any::<i64>().prop_map(|n| ("dueDate", Value::Long(n))),
        prop::num::f64::NORMAL.prop_map(|d| ("progress", Value::Double(d))),
    ]
}

/// Strategy for a valid outstanding-entry log over [`TASKS`](crate::TASKS).
///
/// Entries are returned in append order, which is not scan order.
/// Creation times are distinct.
pub fn tasks_log_strategy(
    max_entities: i64,
    max_entries: usize,
) -> impl Strategy<Value = Vec<OutstandingEntry>> {
    prop::collection::vec(
        (entity_id_strategy(max_entities), tasks_change_strategy()),
        0..=max_entries,
    )
    .prop_map(|changes| {
        changes
            .into_iter()
            .enumerate()
            .map(|(i, (id, (column, value)))| {
                let token = fieldlog_codec::encode_scalar(&value).expect("value has a wire form");
                OutstandingEntry::new(id, column, token, i as i64)
            })
            .collect()
    })
}
