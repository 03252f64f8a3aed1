//! # fieldlog Codec
//!
//! Tagged string encoding of typed scalars.
//!
//! Every scalar is written as a single type tag character followed by the
//! value's text form:
//!
//! | tag | type            | example   |
//! |-----|-----------------|-----------|
//! | `i` | 32-bit integer  | `i42`     |
//! | `l` | 64-bit integer  | `l-7`     |
//! | `d` | double          | `d0.5`    |
//! | `b` | boolean         | `btrue`   |
//! | `s` | string          | `shello`  |
//!
//! A map of `(key, value)` pairs is the concatenation of
//! `escaped_key|<tag><text>|` for each pair. Any literal `|` inside a key
//! or string value is replaced by `!PIPE!` on the way out and restored on
//! the way in.
//!
//! ## Usage
//!
//! ```
//! use fieldlog_codec::{decode_map, encode_map, EncodeConfig, Value};
//!
//! let title = Value::from("a|b");
//! let count = Value::Int(3);
//! let encoded = encode_map([("title", &title), ("count", &count)], &EncodeConfig::default()).unwrap();
//! assert_eq!(encoded, "title|sa!PIPE!b|count|i3|");
//!
//! let pairs = decode_map(&encoded).unwrap();
//! assert_eq!(pairs[0], ("title".to_string(), title));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod value;

pub use decoder::{decode_map, decode_scalar, decode_tagged, unescape, MapDecoder};
pub use encoder::{encode_map, encode_scalar, escape, EncodeConfig, MapEncoder};
pub use error::{CodecError, CodecResult};
pub use value::{Value, ValueTag};

/// Record delimiter of the wire format.
pub const SEPARATOR: char = '|';

/// Token that stands in for a literal [`SEPARATOR`] inside keys and strings.
pub const SEPARATOR_ESCAPE: &str = "!PIPE!";

/// Trait for types that can be encoded to a tagged token.
pub trait Encode {
    /// Encode this value to its tagged token.
    fn encode(&self) -> CodecResult<String>;
}

/// Trait for types that can be decoded from a tagged token.
pub trait Decode: Sized {
    /// Decode this value from a tagged token.
    fn decode(token: &str) -> CodecResult<Self>;
}

impl Encode for Value {
    fn encode(&self) -> CodecResult<String> {
        encode_scalar(self)
    }
}

impl Decode for Value {
    fn decode(token: &str) -> CodecResult<Self> {
        decode_scalar(token)
    }
}
