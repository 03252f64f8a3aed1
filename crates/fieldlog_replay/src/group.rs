//! Contiguous-run grouping over an ascending scan.

use crate::error::{ReplayError, ReplayResult};
use fieldlog_core::{CoreResult, EntityId, OutstandingEntry, Timestamp};
use std::iter::Peekable;

/// Splits an ordered scan into runs of entries sharing an entity id.
///
/// The scan is read strictly forward with one entry of lookahead: the
/// first entry of the next run is peeked at, never consumed, until that
/// run is started. Every entry is checked against its predecessor, and a
/// scan that goes back in `(entity_id, created_at)` order is rejected.
pub struct EntryGroups<I: Iterator<Item = CoreResult<OutstandingEntry>>> {
    scan: Peekable<I>,
    current: Option<EntityId>,
    last: Option<(EntityId, Timestamp)>,
}

impl<I: Iterator<Item = CoreResult<OutstandingEntry>>> EntryGroups<I> {
    /// Wraps a scan.
    pub fn new(scan: I) -> Self {
        Self {
            scan: scan.peekable(),
            current: None,
            last: None,
        }
    }

    /// Starts the next run and returns its first entry.
    ///
    /// Any entries left in the current run are skipped first.
    pub fn start_group(&mut self) -> ReplayResult<Option<OutstandingEntry>> {
        while self.next_in_group()?.is_some() {}

        let Some(next) = self.scan.next() else {
            self.current = None;
            return Ok(None);
        };
        let entry = next?;
        self.check_order(&entry)?;
        self.current = Some(entry.entity_id);
        Ok(Some(entry))
    }

    /// Returns the next entry of the current run, or `None` at its end.
    pub fn next_in_group(&mut self) -> ReplayResult<Option<OutstandingEntry>> {
        let Some(current) = self.current else {
            return Ok(None);
        };
        // A failed read may belong to the current run, so it ends the run
        // with an error rather than closing it.
        let same_entity = match self.scan.peek() {
            Some(Ok(e)) => e.entity_id == current,
            Some(Err(_)) => true,
            None => false,
        };
        if !same_entity {
            return Ok(None);
        }
        match self.scan.next() {
            Some(Ok(entry)) => {
                self.check_order(&entry)?;
                Ok(Some(entry))
            }
            Some(Err(err)) => Err(err.into()),
            None => Ok(None),
        }
    }

    fn check_order(&mut self, entry: &OutstandingEntry) -> ReplayResult<()> {
        let key = entry.scan_key();
        if let Some((previous_entity, previous_created_at)) = self.last {
            let new_group = self.current != Some(entry.entity_id);
            let backwards = if new_group {
                entry.entity_id <= previous_entity
            } else {
                entry.created_at < previous_created_at
            };
            if backwards {
                return Err(ReplayError::OrderingViolation {
                    previous_entity,
                    previous_created_at,
                    entity: entry.entity_id,
                    created_at: entry.created_at,
                });
            }
        }
        self.last = Some(key);
        Ok(())
    }
}
