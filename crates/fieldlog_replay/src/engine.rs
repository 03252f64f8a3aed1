//! The replay engine.
//!
//! A pass makes one ascending scan of the outstanding-entry log. Each run
//! of entries sharing an entity id goes through
//! `Start -> Accumulating -> (Commit | Abort)`:
//!
//! - **Start**: a fresh snapshot holding only the entity id.
//! - **Accumulating**: each entry's column is resolved, its token decoded
//!   and the value assigned. Entries arrive in creation order, so a later
//!   entry for the same property simply overwrites an earlier one.
//! - **Commit**: the snapshot is saved with outstanding logging
//!   suppressed and, depending on [`ConsumePolicy`], the run's entries are
//!   removed in the same unit of work.
//! - **Abort**: the run's entries stay in the log, the failure is
//!   reported and the pass moves on to the next entity.

use crate::config::{ConsumePolicy, ReplayConfig};
use crate::error::{GroupError, ReplayError, ReplayResult};
use crate::group::EntryGroups;
use crate::report::{FailureReporter, ReplayFailure, ReplayReport, ReplayStats, TracingReporter};
use fieldlog_core::{
    CoreError, EntityId, EntitySnapshot, EntityStore, EntryScan, EntryStore, OutstandingEntry,
    PropertyResolver, ScanOrder, TableId, Timestamp,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Lifecycle of the engine across passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayState {
    /// No pass has run yet.
    Idle,
    /// A pass is in progress.
    Replaying,
    /// The last pass finished (possibly with aborted groups).
    Completed,
    /// The last pass stopped on a pass-level error.
    Failed,
}

impl ReplayState {
    /// Returns true if a new pass may start.
    pub fn can_start(&self) -> bool {
        !matches!(self, ReplayState::Replaying)
    }
}

enum GroupOutcome {
    Committed {
        entity_id: EntityId,
        applied: usize,
        consumed: usize,
        skipped: usize,
    },
    Aborted(ReplayFailure),
}

struct Abort {
    column: String,
    token: String,
    error: GroupError,
}

/// Folds outstanding entries of one table back onto entity snapshots.
pub struct ReplayEngine<E, R, S>
where
    E: EntryStore + ?Sized,
    R: PropertyResolver + ?Sized,
    S: EntityStore + ?Sized,
{
    config: ReplayConfig,
    table: TableId,
    entries: Arc<E>,
    resolver: Arc<R>,
    entities: Arc<S>,
    reporter: Arc<dyn FailureReporter>,
    state: RwLock<ReplayState>,
    stats: RwLock<ReplayStats>,
    cancelled: AtomicBool,
}

impl<E, R, S> ReplayEngine<E, R, S>
where
    E: EntryStore + ?Sized,
    R: PropertyResolver + ?Sized,
    S: EntityStore + ?Sized,
{
    /// Creates an engine for `table`.
    ///
    /// Failures are reported through [`TracingReporter`] until
    /// [`with_reporter`](Self::with_reporter) says otherwise.
    pub fn new(
        config: ReplayConfig,
        table: impl Into<TableId>,
        entries: Arc<E>,
        resolver: Arc<R>,
        entities: Arc<S>,
    ) -> Self {
        Self {
            config,
            table: table.into(),
            entries,
            resolver,
            entities,
            reporter: Arc::new(TracingReporter),
            state: RwLock::new(ReplayState::Idle),
            stats: RwLock::new(ReplayStats::default()),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Sets the failure reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn FailureReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Gets the table being replayed.
    pub fn table(&self) -> &TableId {
        &self.table
    }

    /// Gets the configuration.
    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Gets the current state.
    pub fn state(&self) -> ReplayState {
        *self.state.read()
    }

    /// Gets the cumulative stats.
    pub fn stats(&self) -> ReplayStats {
        self.stats.read().clone()
    }

    /// Asks the running pass to stop at the next group boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Resets the cancelled flag.
    pub fn reset_cancel(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Runs one replay pass over the whole log.
    ///
    /// Groups that fail are reported and left in the log; only a store
    /// that cannot deliver an ordered scan stops the pass with an error.
    pub fn replay(&self) -> ReplayResult<ReplayReport> {
        let start = Instant::now();
        {
            let mut state = self.state.write();
            if !state.can_start() {
                return Err(ReplayError::AlreadyRunning);
            }
            *state = ReplayState::Replaying;
        }
        self.reset_cancel();

        let result = self.run_pass(start);

        let mut stats = self.stats.write();
        match &result {
            Ok(report) => {
                *self.state.write() = ReplayState::Completed;
                stats.passes_completed += 1;
                stats.groups_committed += report.committed.len() as u64;
                stats.groups_aborted += report.failures.len() as u64;
                stats.entries_consumed += report.entries_consumed as u64;
                stats.last_replay_time = Some(Instant::now());
                stats.last_error = None;
            }
            Err(err) => {
                *self.state.write() = ReplayState::Failed;
                stats.last_error = Some(err.to_string());
                tracing::error!(table = %self.table, error = %err, "replay pass failed");
            }
        }
        result
    }

    fn run_pass(&self, start: Instant) -> ReplayResult<ReplayReport> {
        if self.config.require_ordered_scan
            && self.entries.scan_order() != ScanOrder::EntityThenCreated
        {
            return Err(ReplayError::UnorderedScan);
        }

        let mut groups = EntryGroups::new(self.entries.scan_ascending()?);
        let mut report = ReplayReport::default();

        loop {
            if self.is_cancelled() {
                report.cancelled = true;
                break;
            }
            let Some(first) = groups.start_group()? else {
                break;
            };
            if self
                .config
                .max_groups
                .is_some_and(|max| report.groups() >= max)
            {
                report.truncated = true;
                break;
            }

            match self.replay_group(first, &mut groups)? {
                GroupOutcome::Committed {
                    entity_id,
                    applied,
                    consumed,
                    skipped,
                } => {
                    report.committed.push(entity_id);
                    report.entries_applied += applied;
                    report.entries_consumed += consumed;
                    report.values_skipped += skipped;
                }
                GroupOutcome::Aborted(failure) => {
                    self.reporter.report(&self.table, &failure);
                    report.failures.push(failure);
                }
            }
        }

        report.duration = start.elapsed();
        tracing::info!(
            table = %self.table,
            committed = report.committed.len(),
            aborted = report.failures.len(),
            consumed = report.entries_consumed,
            cancelled = report.cancelled,
            truncated = report.truncated,
            "replay pass finished"
        );
        Ok(report)
    }

    fn replay_group(
        &self,
        first: OutstandingEntry,
        groups: &mut EntryGroups<EntryScan<'_>>,
    ) -> ReplayResult<GroupOutcome> {
        let entity_id = first.entity_id;
        let mut snapshot = EntitySnapshot::new(self.table.clone(), entity_id);
        let mut up_to = first.created_at;
        let mut seen = 0;
        let mut skipped = 0;
        let mut abort: Option<Abort> = None;

        let mut next = Some(first);
        while let Some(entry) = next {
            seen += 1;
            up_to = up_to.max(entry.created_at);
            // After an abort the rest of the run is read but not folded.
            if abort.is_none() {
                match self.fold_entry(&mut snapshot, &entry) {
                    Ok(true) => {}
                    Ok(false) => skipped += 1,
                    Err(error) => {
                        abort = Some(Abort {
                            column: entry.column,
                            token: entry.value,
                            error,
                        });
                    }
                }
            }
            next = groups.next_in_group()?;
        }

        if let Some(abort) = abort {
            return Ok(GroupOutcome::Aborted(ReplayFailure {
                entity_id,
                column: Some(abort.column),
                token: Some(abort.token),
                entries_retained: seen,
                error: abort.error,
            }));
        }

        Ok(self.commit(&snapshot, up_to, seen, skipped))
    }

    /// Folds one entry; `Ok(false)` means the value was not assignable.
    fn fold_entry(
        &self,
        snapshot: &mut EntitySnapshot,
        entry: &OutstandingEntry,
    ) -> Result<bool, GroupError> {
        let property = self
            .resolver
            .resolve(&self.table, &entry.column)
            .ok_or_else(|| GroupError::UnresolvedColumn {
                table: self.table.clone(),
                column: entry.column.clone(),
            })?;

        let value = entry.decode_value().map_err(|source| GroupError::Decode {
            column: entry.column.clone(),
            token: entry.value.clone(),
            source,
        })?;

        if snapshot.assign(&property, &value) {
            return Ok(true);
        }
        tracing::warn!(
            table = %self.table,
            entity_id = %entry.entity_id,
            column = entry.column.as_str(),
            token = entry.value.as_str(),
            kind = %property.kind,
            "value not representable by property, skipped"
        );
        Ok(false)
    }

    fn commit(
        &self,
        snapshot: &EntitySnapshot,
        up_to: Timestamp,
        seen: usize,
        skipped: usize,
    ) -> GroupOutcome {
        let entity_id = snapshot.id;
        let mut save = || {
            self.entities
                .save_existing(snapshot, true)
                .map_err(CoreError::from)
        };
        let result = match self.config.consume {
            ConsumePolicy::DeleteOnCommit => {
                self.entries.consume_group(entity_id, up_to, &mut save)
            }
            ConsumePolicy::Retain => save().map(|()| 0),
        };

        match result {
            Ok(consumed) => {
                tracing::debug!(
                    table = %self.table,
                    entity_id = %entity_id,
                    applied = seen,
                    consumed,
                    "replayed outstanding entries"
                );
                GroupOutcome::Committed {
                    entity_id,
                    applied: seen,
                    consumed,
                    skipped,
                }
            }
            Err(err) => GroupOutcome::Aborted(ReplayFailure {
                entity_id,
                column: None,
                token: None,
                entries_retained: seen,
                error: err.into(),
            }),
        }
    }
}
