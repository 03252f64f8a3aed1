//! Outstanding entry record.

use crate::entity::EntityId;
use fieldlog_codec::{decode_scalar, CodecResult, Value};
use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// One logged column change awaiting sync or replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingEntry {
    /// Entity the change belongs to.
    pub entity_id: EntityId,
    /// Stored column name.
    pub column: String,
    /// Encoded scalar token (`<tag><text>`).
    pub value: String,
    /// When the change was made.
    pub created_at: Timestamp,
}

impl OutstandingEntry {
    /// Creates an entry.
    pub fn new(
        entity_id: impl Into<EntityId>,
        column: impl Into<String>,
        value: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            column: column.into(),
            value: value.into(),
            created_at,
        }
    }

    /// Decodes the stored token.
    pub fn decode_value(&self) -> CodecResult<Value> {
        decode_scalar(&self.value)
    }

    /// Scan ordering key.
    pub fn scan_key(&self) -> (EntityId, Timestamp) {
        (self.entity_id, self.created_at)
    }
}
