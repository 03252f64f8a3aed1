//! Error types for the replay engine.

use fieldlog_codec::CodecError;
use fieldlog_core::{CoreError, EntityId, SaveError, TableId, Timestamp};
use thiserror::Error;

/// Result type for replay passes.
pub type ReplayResult<T> = Result<T, ReplayError>;

/// Errors that stop a whole replay pass.
///
/// Failures confined to one entity's group are not errors of the pass;
/// they are reported as [`ReplayFailure`](crate::ReplayFailure)s.
#[derive(Error, Debug)]
pub enum ReplayError {
    /// The entry store does not promise `(entity_id, created_at)` ordering.
    #[error("entry store scan is not ordered by (entity_id, created_at)")]
    UnorderedScan,

    /// The scan produced entries out of order.
    #[error(
        "scan out of order: entity {entity} at {created_at} after entity {previous_entity} at {previous_created_at}"
    )]
    OrderingViolation {
        /// Entity of the previous entry.
        previous_entity: EntityId,
        /// Creation time of the previous entry.
        previous_created_at: Timestamp,
        /// Entity of the offending entry.
        entity: EntityId,
        /// Creation time of the offending entry.
        created_at: Timestamp,
    },

    /// A pass is already running on this engine.
    #[error("replay already in progress")]
    AlreadyRunning,

    /// The entry store failed while scanning.
    #[error("entry store error: {0}")]
    Store(#[from] CoreError),
}

/// Why one entity's group was aborted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    /// A column has no property in the table's schema.
    #[error("no local property for column {column:?} in table {table}")]
    UnresolvedColumn {
        /// Table being replayed.
        table: TableId,
        /// Unresolvable column.
        column: String,
    },

    /// A stored token could not be decoded.
    #[error("cannot decode {token:?} for column {column:?}: {source}")]
    Decode {
        /// Column of the entry.
        column: String,
        /// Raw stored token.
        token: String,
        /// Underlying codec error.
        source: CodecError,
    },

    /// The entity store refused the snapshot.
    #[error("save failed: {0}")]
    Save(#[from] SaveError),

    /// The entry store failed while consuming the group.
    #[error("entry store error: {message}")]
    Store {
        /// Description of the failure.
        message: String,
    },
}

impl From<CoreError> for GroupError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Save(save) => GroupError::Save(save),
            other => GroupError::Store {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_save_error_unwraps() {
        let err = GroupError::from(CoreError::from(SaveError::Storage("io".into())));
        assert_eq!(err, GroupError::Save(SaveError::Storage("io".into())));

        let err = GroupError::from(CoreError::store("gone"));
        assert!(matches!(err, GroupError::Store { .. }));
    }

    #[test]
    fn error_display() {
        let err = GroupError::UnresolvedColumn {
            table: TableId::from("tasks"),
            column: "ghost".into(),
        };
        assert_eq!(
            err.to_string(),
            "no local property for column \"ghost\" in table tasks"
        );

        let err = ReplayError::OrderingViolation {
            previous_entity: EntityId::new(2),
            previous_created_at: 5,
            entity: EntityId::new(1),
            created_at: 1,
        };
        assert_eq!(
            err.to_string(),
            "scan out of order: entity 1 at 1 after entity 2 at 5"
        );
    }
}
