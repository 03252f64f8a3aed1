//! Replay fixtures.
//!
//! Provides a ready-wired set of in-memory collaborators and an entity
//! store that records what it is asked to save.

use fieldlog_codec::encode_scalar;
use fieldlog_core::{
    EntityId, EntitySnapshot, EntityStore, EntryStore, MemoryEntityStore, MemoryEntryStore,
    OutstandingEntry, PropertyDescriptor, PropertyKind, SaveError, Schema, TableId, TableSchema,
    Timestamp, Value,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Name of the table used by [`ReplayFixture::tasks`].
pub const TASKS: &str = "tasks";

/// Schema of the `tasks` table.
///
/// | column       | property     | kind   |
/// |--------------|--------------|--------|
/// | `title`      | `title`      | Text   |
/// | `importance` | `importance` | Int    |
/// | `dueDate`    | `due_date`   | Long   |
/// | `progress`   | `progress`   | Double |
pub fn tasks_schema() -> Schema {
    Schema::new().with_table(
        TableSchema::new(TASKS)
            .with_property("title", PropertyKind::Text)
            .with_property("importance", PropertyKind::Int)
            .with_column(
                "dueDate",
                PropertyDescriptor::new("due_date", PropertyKind::Long),
            )
            .with_property("progress", PropertyKind::Double),
    )
}

/// In-memory collaborators for one table.
///
/// The entity store is attached to the entry log, so an unsuppressed save
/// shows up as new outstanding entries.
pub struct ReplayFixture {
    /// Table being replayed.
    pub table: TableId,
    /// Column resolver.
    pub schema: Arc<Schema>,
    /// Outstanding-entry log.
    pub entries: Arc<MemoryEntryStore>,
    /// Entity rows.
    pub entities: Arc<MemoryEntityStore>,
}

impl ReplayFixture {
    /// Creates a fixture over the `tasks` table with an empty log.
    pub fn tasks() -> Self {
        Self::with_entries(Arc::new(MemoryEntryStore::new()))
    }

    /// Creates a fixture over the `tasks` table backed by `entries`.
    pub fn with_entries(entries: Arc<MemoryEntryStore>) -> Self {
        let log: Arc<dyn EntryStore> = entries.clone();
        Self {
            table: TableId::from(TASKS),
            schema: Arc::new(tasks_schema()),
            entries,
            entities: Arc::new(MemoryEntityStore::with_log(log, 1_000_000)),
        }
    }

    /// Inserts empty rows for `ids`.
    pub fn with_rows(self, ids: impl IntoIterator<Item = i64>) -> Self {
        for id in ids {
            self.entities.insert(EntityId::new(id), []);
        }
        self
    }

    /// Appends a raw entry.
    pub fn append(&self, entity_id: i64, column: &str, token: &str, created_at: Timestamp) {
        self.entries
            .append(OutstandingEntry::new(entity_id, column, token, created_at))
            .expect("memory append cannot fail");
    }

    /// Appends an entry holding the encoded form of `value`.
    pub fn append_value(&self, entity_id: i64, column: &str, value: &Value, created_at: Timestamp) {
        let token = encode_scalar(value).expect("value has a wire form");
        self.append(entity_id, column, &token, created_at);
    }

    /// Gets a stored property value.
    pub fn value(&self, entity_id: i64, property: &str) -> Option<Value> {
        self.entities
            .row(EntityId::new(entity_id))?
            .get(property)
            .cloned()
    }
}

/// One call received by a [`RecordingEntityStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSave {
    /// Snapshot passed to the store.
    pub snapshot: EntitySnapshot,
    /// Whether outstanding logging was suppressed.
    pub suppressed: bool,
}

/// Entity store that records every save and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingEntityStore {
    saves: Mutex<Vec<RecordedSave>>,
    failing: Mutex<HashSet<EntityId>>,
}

impl RecordingEntityStore {
    /// Creates an empty store that accepts every save.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes saves of `id` fail with a storage error.
    pub fn fail_on(&self, id: i64) {
        self.failing.lock().insert(EntityId::new(id));
    }

    /// Returns every save received, failed ones included.
    pub fn saves(&self) -> Vec<RecordedSave> {
        self.saves.lock().clone()
    }

    /// Returns the snapshots of saves for `id`.
    pub fn saves_for(&self, id: i64) -> Vec<EntitySnapshot> {
        self.saves
            .lock()
            .iter()
            .filter(|s| s.snapshot.id == EntityId::new(id))
            .map(|s| s.snapshot.clone())
            .collect()
    }
}

impl EntityStore for RecordingEntityStore {
    fn save_existing(
        &self,
        snapshot: &EntitySnapshot,
        suppress_outstanding_logging: bool,
    ) -> Result<(), SaveError> {
        self.saves.lock().push(RecordedSave {
            snapshot: snapshot.clone(),
            suppressed: suppress_outstanding_logging,
        });
        if self.failing.lock().contains(&snapshot.id) {
            return Err(SaveError::Storage(format!("save of {} failed", snapshot.id)));
        }
        Ok(())
    }
}

/// Last-write-wins reference model of a replay.
///
/// Folds `entries` in `(entity_id, created_at)` order, later entries
/// replacing earlier ones per column, and returns the decoded tokens per
/// entity. Columns and coercion are not considered.
pub fn latest_tokens(entries: &[OutstandingEntry]) -> BTreeMap<EntityId, BTreeMap<String, String>> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(OutstandingEntry::scan_key);

    let mut model: BTreeMap<EntityId, BTreeMap<String, String>> = BTreeMap::new();
    for entry in sorted {
        model
            .entry(entry.entity_id)
            .or_default()
            .insert(entry.column, entry.value);
    }
    model
}
