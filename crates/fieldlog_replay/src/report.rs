//! Replay outcomes and failure reporting.

use crate::error::GroupError;
use fieldlog_core::{EntityId, TableId};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// One aborted entity group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayFailure {
    /// Entity whose group was aborted.
    pub entity_id: EntityId,
    /// Column of the entry that caused the abort, if any.
    pub column: Option<String>,
    /// Raw stored token of that entry, if any.
    pub token: Option<String>,
    /// Number of the group's entries left in the log.
    pub entries_retained: usize,
    /// Cause.
    pub error: GroupError,
}

/// Outcome of one replay pass.
#[derive(Debug, Clone, Default)]
pub struct ReplayReport {
    /// Entities committed, in scan order.
    pub committed: Vec<EntityId>,
    /// Groups that were aborted.
    pub failures: Vec<ReplayFailure>,
    /// Entries folded into committed snapshots.
    pub entries_applied: usize,
    /// Entries removed from the log.
    pub entries_consumed: usize,
    /// Decoded values the target property could not represent.
    pub values_skipped: usize,
    /// The pass stopped early because of [`cancel`](crate::ReplayEngine::cancel).
    pub cancelled: bool,
    /// The pass stopped early because of `max_groups`.
    pub truncated: bool,
    /// Wall time of the pass.
    pub duration: Duration,
}

impl ReplayReport {
    /// Returns true if every group seen was committed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of groups seen (committed or aborted).
    pub fn groups(&self) -> usize {
        self.committed.len() + self.failures.len()
    }
}

/// Cumulative statistics across passes.
#[derive(Debug, Clone, Default)]
pub struct ReplayStats {
    /// Passes that ran to completion (including cancelled ones).
    pub passes_completed: u64,
    /// Groups committed.
    pub groups_committed: u64,
    /// Groups aborted.
    pub groups_aborted: u64,
    /// Entries removed from the log.
    pub entries_consumed: u64,
    /// When the last pass finished.
    pub last_replay_time: Option<Instant>,
    /// Last pass-level error message.
    pub last_error: Option<String>,
}

/// Receives every aborted group.
///
/// Implementations must not block the pass for long; they run between
/// groups on the replaying thread.
pub trait FailureReporter: Send + Sync {
    /// Called once per aborted group.
    fn report(&self, table: &TableId, failure: &ReplayFailure);
}

/// Reports failures as `tracing` warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, table: &TableId, failure: &ReplayFailure) {
        tracing::warn!(
            table = %table,
            entity_id = %failure.entity_id,
            column = failure.column.as_deref().unwrap_or(""),
            token = failure.token.as_deref().unwrap_or(""),
            retained = failure.entries_retained,
            error = %failure.error,
            "replay of outstanding entries aborted"
        );
    }
}

/// Keeps every reported failure in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    failures: Mutex<Vec<(TableId, ReplayFailure)>>,
}

impl CollectingReporter {
    /// Creates an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything reported so far.
    pub fn failures(&self) -> Vec<(TableId, ReplayFailure)> {
        self.failures.lock().clone()
    }

    /// Number of failures reported.
    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    /// Returns true if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }
}

impl FailureReporter for CollectingReporter {
    fn report(&self, table: &TableId, failure: &ReplayFailure) {
        self.failures.lock().push((table.clone(), failure.clone()));
    }
}
