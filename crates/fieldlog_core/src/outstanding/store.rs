//! Entry store interface and in-memory implementation.

use super::entry::{OutstandingEntry, Timestamp};
use crate::entity::EntityId;
use crate::error::{CoreError, CoreResult};
use parking_lot::RwLock;

/// Ascending scan over the log.
pub type EntryScan<'a> = Box<dyn Iterator<Item = CoreResult<OutstandingEntry>> + Send + 'a>;

/// Ordering a store guarantees for [`EntryStore::scan_ascending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrder {
    /// Ascending by entity id, then by creation time.
    EntityThenCreated,
    /// No ordering guarantee.
    Unordered,
}

/// Durable, ordered log of outstanding entries.
pub trait EntryStore: Send + Sync {
    /// Appends an entry.
    fn append(&self, entry: OutstandingEntry) -> CoreResult<()>;

    /// Ordering guaranteed by [`scan_ascending`](Self::scan_ascending).
    fn scan_order(&self) -> ScanOrder {
        ScanOrder::EntityThenCreated
    }

    /// Scans all entries ordered by `(entity_id, created_at)`.
    ///
    /// Entries with equal keys come back in append order.
    fn scan_ascending(&self) -> CoreResult<EntryScan<'_>>;

    /// Removes the entries of `entity_id` created at or before `up_to`.
    ///
    /// The bound is a timestamp, not the set of rows a scan returned. An
    /// entry appended after the scan with `created_at <= up_to` is removed
    /// too, without ever having been replayed. Stores that can append
    /// concurrently with a replay should bound deletion by the rows the
    /// scan actually delivered, or make appends and scans serialize.
    ///
    /// Returns the number of entries removed.
    fn delete_group(&self, entity_id: EntityId, up_to: Timestamp) -> CoreResult<usize>;

    /// Runs `apply` and deletes the group, as one unit.
    ///
    /// If `apply` fails nothing is deleted. Stores with real transactions
    /// should override this so that a failed delete also rolls back `apply`.
    ///
    /// Deletion follows [`delete_group`](Self::delete_group), including its
    /// window for entries appended during the pass.
    fn consume_group(
        &self,
        entity_id: EntityId,
        up_to: Timestamp,
        apply: &mut dyn FnMut() -> CoreResult<()>,
    ) -> CoreResult<usize> {
        apply()?;
        self.delete_group(entity_id, up_to)
    }
}

/// An in-memory entry store.
///
/// Scans sort a copy of the log, so entries appended during a scan are not
/// observed by it.
#[derive(Debug)]
pub struct MemoryEntryStore {
    entries: RwLock<Vec<OutstandingEntry>>,
    sorted: bool,
    advertised: ScanOrder,
}

impl MemoryEntryStore {
    /// Creates an empty store with ordered scans.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            sorted: true,
            advertised: ScanOrder::EntityThenCreated,
        }
    }

    /// Creates a store pre-populated with `entries`.
    #[must_use]
    pub fn with_entries(entries: Vec<OutstandingEntry>) -> Self {
        let store = Self::new();
        *store.entries.write() = entries;
        store
    }

    /// Creates a store that scans in append order and says so.
    #[must_use]
    pub fn insertion_ordered() -> Self {
        Self {
            sorted: false,
            advertised: ScanOrder::Unordered,
            ..Self::new()
        }
    }

    /// Overrides the ordering this store claims to provide.
    ///
    /// Useful for testing consumers against a store that lies.
    #[must_use]
    pub fn advertising(mut self, order: ScanOrder) -> Self {
        self.advertised = order;
        self
    }

    /// Returns a copy of all entries in append order.
    #[must_use]
    pub fn entries(&self) -> Vec<OutstandingEntry> {
        self.entries.read().clone()
    }

    /// Returns the entries of one entity, in append order.
    #[must_use]
    pub fn entries_for(&self, entity_id: EntityId) -> Vec<OutstandingEntry> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.entity_id == entity_id)
            .cloned()
            .collect()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MemoryEntryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryStore for MemoryEntryStore {
    fn append(&self, entry: OutstandingEntry) -> CoreResult<()> {
        self.entries.write().push(entry);
        Ok(())
    }

    fn scan_order(&self) -> ScanOrder {
        self.advertised
    }

    fn scan_ascending(&self) -> CoreResult<EntryScan<'_>> {
        let mut snapshot = self.entries.read().clone();
        if self.sorted {
            // Stable: equal keys keep append order.
            snapshot.sort_by_key(OutstandingEntry::scan_key);
        }
        Ok(Box::new(snapshot.into_iter().map(Ok::<_, CoreError>)))
    }

    fn delete_group(&self, entity_id: EntityId, up_to: Timestamp) -> CoreResult<usize> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| !(e.entity_id == entity_id && e.created_at <= up_to));
        Ok(before - entries.len())
    }
}
