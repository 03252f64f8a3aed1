//! The outstanding-entry log.
//!
//! Every local field-level mutation is appended as one
//! [`OutstandingEntry`] per changed column. Entries are immutable; they are
//! removed only once a replay has folded and committed them.

mod entry;
mod recorder;
mod store;

pub use entry::{OutstandingEntry, Timestamp};
pub use recorder::record_changes;
pub use store::{EntryScan, EntryStore, MemoryEntryStore, ScanOrder};
