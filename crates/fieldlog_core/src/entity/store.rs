//! Entity store interface and in-memory implementation.

use crate::entity::{EntityId, EntitySnapshot};
use crate::error::SaveError;
use crate::outstanding::{record_changes, EntryStore, Timestamp};
use fieldlog_codec::Value;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

/// Destination of replayed snapshots.
pub trait EntityStore: Send + Sync {
    /// Writes the snapshot's values onto the existing entity.
    ///
    /// When `suppress_outstanding_logging` is set the write must not append
    /// outstanding entries of its own.
    fn save_existing(
        &self,
        snapshot: &EntitySnapshot,
        suppress_outstanding_logging: bool,
    ) -> Result<(), SaveError>;
}

type Row = BTreeMap<String, Value>;

/// An in-memory entity store.
///
/// When attached to an [`EntryStore`], unsuppressed saves record every
/// column they change, the way a local edit would.
pub struct MemoryEntityStore {
    rows: RwLock<BTreeMap<EntityId, Row>>,
    log: Option<Arc<dyn EntryStore>>,
    clock: AtomicI64,
    rejected: RwLock<HashSet<EntityId>>,
    saves: AtomicU64,
}

impl MemoryEntityStore {
    /// Creates an empty store that logs nothing.
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            log: None,
            clock: AtomicI64::new(0),
            rejected: RwLock::new(HashSet::new()),
            saves: AtomicU64::new(0),
        }
    }

    /// Creates a store that records unsuppressed changes into `log`.
    ///
    /// Recorded entries are stamped from a counter starting at `clock_start`.
    pub fn with_log(log: Arc<dyn EntryStore>, clock_start: Timestamp) -> Self {
        Self {
            log: Some(log),
            clock: AtomicI64::new(clock_start),
            ..Self::new()
        }
    }

    /// Inserts or replaces a row.
    pub fn insert(&self, id: EntityId, values: impl IntoIterator<Item = (String, Value)>) {
        self.rows.write().insert(id, values.into_iter().collect());
    }

    /// Returns a copy of a row.
    pub fn row(&self, id: EntityId) -> Option<BTreeMap<String, Value>> {
        self.rows.read().get(&id).cloned()
    }

    /// Makes every later save of `id` fail.
    pub fn reject(&self, id: EntityId) {
        self.rejected.write().insert(id);
    }

    /// Lets saves of `id` succeed again.
    pub fn accept(&self, id: EntityId) {
        self.rejected.write().remove(&id);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::SeqCst)
    }
}

impl Default for MemoryEntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore for MemoryEntityStore {
    fn save_existing(
        &self,
        snapshot: &EntitySnapshot,
        suppress_outstanding_logging: bool,
    ) -> Result<(), SaveError> {
        let id = snapshot.id;
        if self.rejected.read().contains(&id) {
            return Err(SaveError::Rejected {
                entity_id: id,
                reason: "rejected by store".into(),
            });
        }

        let mut rows = self.rows.write();
        let row = rows.get_mut(&id).ok_or(SaveError::NotFound(id))?;
        let changed: Vec<(&String, &Value)> = snapshot
            .values()
            .iter()
            .filter(|(name, value)| row.get(*name) != Some(*value))
            .collect();

        // Recorded before the row changes, so a failed record leaves it as it was.
        if !suppress_outstanding_logging && !changed.is_empty() {
            if let Some(log) = &self.log {
                let stamp = self.clock.fetch_add(1, Ordering::SeqCst);
                record_changes(
                    log.as_ref(),
                    id,
                    changed.iter().map(|(k, v)| (k.as_str(), *v)),
                    stamp,
                )
                .map_err(|e| SaveError::Storage(e.to_string()))?;
            }
        }

        for (name, value) in changed {
            row.insert(name.clone(), value.clone());
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
