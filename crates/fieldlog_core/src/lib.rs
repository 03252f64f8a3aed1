//! # fieldlog Core
//!
//! Data model and collaborator interfaces for replaying outstanding
//! field-level changes.
//!
//! This crate provides:
//! - [`EntityId`] and [`EntitySnapshot`], the model being rebuilt
//! - [`OutstandingEntry`] and the [`EntryStore`] log interface
//! - [`PropertyResolver`] and the [`Schema`] registry that implements it
//! - [`EntityStore`], where replayed snapshots are written
//! - In-memory implementations of both stores
//!
//! ## Example
//!
//! ```rust
//! use fieldlog_core::{EntityId, EntryStore, MemoryEntryStore, OutstandingEntry};
//!
//! let log = MemoryEntryStore::new();
//! log.append(OutstandingEntry::new(2, "title", "sB", 20)).unwrap();
//! log.append(OutstandingEntry::new(1, "title", "sA", 10)).unwrap();
//!
//! let first = log.scan_ascending().unwrap().next().unwrap().unwrap();
//! assert_eq!(first.entity_id, EntityId::new(1));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod entity;
mod error;
pub mod outstanding;
pub mod schema;

pub use entity::{EntityId, EntitySnapshot, EntityStore, MemoryEntityStore};
pub use error::{CoreError, CoreResult, SaveError};
pub use outstanding::{
    record_changes, EntryScan, EntryStore, MemoryEntryStore, OutstandingEntry, ScanOrder,
    Timestamp,
};
pub use schema::{PropertyDescriptor, PropertyKind, PropertyResolver, Schema, TableId, TableSchema};

/// Re-exported so downstream crates need not depend on the codec directly.
pub use fieldlog_codec::Value;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
