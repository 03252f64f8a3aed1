//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The first character of a token is not a known type tag.
    #[error("unknown type tag {tag:?} in token {token:?}")]
    UnknownTag {
        /// The offending tag character.
        tag: char,
        /// The full raw token.
        token: String,
    },

    /// A token is empty or a key is missing its value half.
    #[error("malformed token: {token:?}")]
    MalformedToken {
        /// The raw token (or serialized string) that could not be read.
        token: String,
    },

    /// The value has no tagged wire representation.
    #[error("unsupported value type: {type_name}")]
    UnsupportedType {
        /// Name of the unsupported type.
        type_name: String,
    },
}

impl CodecError {
    /// Create a malformed token error.
    pub fn malformed(token: impl Into<String>) -> Self {
        Self::MalformedToken {
            token: token.into(),
        }
    }

    /// Create an unknown tag error.
    pub fn unknown_tag(tag: char, token: impl Into<String>) -> Self {
        Self::UnknownTag {
            tag,
            token: token.into(),
        }
    }

    /// Create an unsupported type error.
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }
}
