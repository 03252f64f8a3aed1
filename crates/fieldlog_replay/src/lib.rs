//! # fieldlog Replay
//!
//! Rebuilds entity state from the outstanding-entry log.
//!
//! Outstanding entries record individual column changes that have not yet
//! been reconciled. A replay pass scans them in `(entity_id, created_at)`
//! order, folds each entity's run of entries onto a snapshot (the latest
//! write of a column wins), saves the snapshot without logging new
//! entries and removes the folded entries in the same unit of work.
//!
//! A group that cannot be folded or saved is aborted on its own: its
//! entries stay in the log for the next pass and the failure is handed to
//! a [`FailureReporter`].
//!
//! ## Example
//!
//! ```rust
//! use fieldlog_core::{
//!     EntityId, EntryStore, MemoryEntityStore, MemoryEntryStore, OutstandingEntry,
//!     PropertyKind, Schema, TableSchema, Value,
//! };
//! use fieldlog_replay::{ReplayConfig, ReplayEngine};
//! use std::sync::Arc;
//!
//! let schema = Schema::new().with_table(
//!     TableSchema::new("tasks")
//!         .with_property("title", PropertyKind::Text)
//!         .with_property("importance", PropertyKind::Int),
//! );
//!
//! let log = Arc::new(MemoryEntryStore::new());
//! log.append(OutstandingEntry::new(7, "importance", "i1", 10)).unwrap();
//! log.append(OutstandingEntry::new(7, "importance", "i3", 11)).unwrap();
//!
//! let entities = Arc::new(MemoryEntityStore::new());
//! entities.insert(EntityId::new(7), [("title".to_string(), Value::from("draft"))]);
//!
//! let engine = ReplayEngine::new(
//!     ReplayConfig::default(),
//!     "tasks",
//!     log.clone(),
//!     Arc::new(schema),
//!     entities.clone(),
//! );
//! let report = engine.replay().unwrap();
//!
//! assert_eq!(report.committed, vec![EntityId::new(7)]);
//! assert!(log.is_empty());
//! assert_eq!(entities.row(EntityId::new(7)).unwrap()["importance"], Value::Int(3));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod group;
mod report;

pub use config::{ConsumePolicy, ReplayConfig};
pub use engine::{ReplayEngine, ReplayState};
pub use error::{GroupError, ReplayError, ReplayResult};
pub use group::EntryGroups;
pub use report::{
    CollectingReporter, FailureReporter, ReplayFailure, ReplayReport, ReplayStats,
    TracingReporter,
};
