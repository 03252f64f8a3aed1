//! # fieldlog Testkit
//!
//! Test utilities for fieldlog.
//!
//! This crate provides:
//! - A replay fixture wiring in-memory stores to a small schema
//! - An entity store that records every save it receives
//! - Property-based generators for values and outstanding-entry logs
//! - A last-write-wins reference model to check replays against
//! - Wire-format test vectors
//!
//! ## Usage
//!
//! ```rust
//! use fieldlog_testkit::prelude::*;
//!
//! let fixture = ReplayFixture::tasks();
//! fixture.append(1, "title", "sDraft", 10);
//! assert_eq!(fixture.entries.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use vectors::*;
