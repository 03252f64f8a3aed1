//! The local-mutation path: turning changed columns into log entries.

use super::entry::{OutstandingEntry, Timestamp};
use super::store::EntryStore;
use crate::entity::EntityId;
use crate::error::CoreResult;
use fieldlog_codec::{encode_scalar, Value};

/// Appends one entry per changed column, all stamped `created_at`.
///
/// Returns the number of entries appended.
///
/// # Errors
///
/// Fails on the first value without a wire form or on a store error;
/// entries appended before the failure stay in the log.
pub fn record_changes<'a, I, K>(
    store: &dyn EntryStore,
    entity_id: EntityId,
    changes: I,
    created_at: Timestamp,
) -> CoreResult<usize>
where
    I: IntoIterator<Item = (K, &'a Value)>,
    K: AsRef<str>,
{
    let mut appended = 0;
    for (column, value) in changes {
        let token = encode_scalar(value)?;
        store.append(OutstandingEntry::new(
            entity_id,
            column.as_ref(),
            token,
            created_at,
        ))?;
        appended += 1;
    }
    tracing::trace!(%entity_id, appended, "recorded outstanding changes");
    Ok(appended)
}
