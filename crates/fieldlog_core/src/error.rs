//! Error types for fieldlog core.

use crate::entity::EntityId;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Codec error while encoding or decoding a stored value.
    #[error("codec error: {0}")]
    Codec(#[from] fieldlog_codec::CodecError),

    /// Entity store refused a write.
    #[error("save failed: {0}")]
    Save(#[from] SaveError),

    /// The outstanding-entry store failed.
    #[error("entry store error: {message}")]
    Store {
        /// Description of the failure.
        message: String,
    },
}

impl CoreError {
    /// Create an entry store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }
}

/// Errors returned by [`EntityStore::save_existing`](crate::EntityStore::save_existing).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SaveError {
    /// No row exists for the entity.
    #[error("entity {0} does not exist")]
    NotFound(EntityId),

    /// The store rejected the snapshot.
    #[error("entity {entity_id} rejected: {reason}")]
    Rejected {
        /// The entity that was rejected.
        entity_id: EntityId,
        /// Why the write was refused.
        reason: String,
    },

    /// Underlying storage failure.
    #[error("storage failure: {0}")]
    Storage(String),
}
