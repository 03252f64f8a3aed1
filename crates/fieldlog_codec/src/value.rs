//! Dynamic scalar value type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One-character type tag that prefixes every encoded scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueTag {
    /// 32-bit signed integer (`i`).
    Int,
    /// 64-bit signed integer (`l`).
    Long,
    /// 64-bit float (`d`).
    Double,
    /// Boolean (`b`).
    Bool,
    /// UTF-8 string (`s`).
    Text,
}

impl ValueTag {
    /// All tags, in wire-table order.
    pub const ALL: [ValueTag; 5] = [
        ValueTag::Int,
        ValueTag::Double,
        ValueTag::Long,
        ValueTag::Text,
        ValueTag::Bool,
    ];

    /// Returns the wire character for this tag.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            ValueTag::Int => 'i',
            ValueTag::Long => 'l',
            ValueTag::Double => 'd',
            ValueTag::Bool => 'b',
            ValueTag::Text => 's',
        }
    }

    /// Parses a wire character into a tag.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'i' => Some(ValueTag::Int),
            'l' => Some(ValueTag::Long),
            'd' => Some(ValueTag::Double),
            'b' => Some(ValueTag::Bool),
            's' => Some(ValueTag::Text),
            _ => None,
        }
    }

    /// Returns true for the tags whose text form goes through a numeric parse.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, ValueTag::Int | ValueTag::Long | ValueTag::Double)
    }
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A dynamically typed column value.
///
/// Only the five tagged kinds have a wire form. `Null` and `Bytes` exist so
/// that callers holding a whole row can hand it to the encoder, which then
/// rejects or drops them depending on [`EncodeConfig`](crate::EncodeConfig).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    Long(i64),
    /// 64-bit float.
    Double(f64),
    /// Text string (UTF-8).
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl Value {
    /// Returns the wire tag for this value, or `None` if it has no wire form.
    #[must_use]
    pub fn tag(&self) -> Option<ValueTag> {
        match self {
            Value::Bool(_) => Some(ValueTag::Bool),
            Value::Int(_) => Some(ValueTag::Int),
            Value::Long(_) => Some(ValueTag::Long),
            Value::Double(_) => Some(ValueTag::Double),
            Value::Text(_) => Some(ValueTag::Text),
            Value::Null | Value::Bytes(_) => None,
        }
    }

    /// Human-readable name of the variant, used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Long(_) => "Long",
            Value::Double(_) => "Double",
            Value::Text(_) => "Text",
            Value::Bytes(_) => "Bytes",
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Reads this value as a 32-bit integer.
    ///
    /// Wider numbers are narrowed the way a row accessor narrows them:
    /// longs wrap, doubles truncate toward zero (saturating). Booleans read
    /// as 1/0 and numeric text is parsed.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Long(n) => Some(*n as i32),
            Value::Double(d) => Some(*d as i32),
            Value::Bool(b) => Some(i32::from(*b)),
            Value::Text(s) => s.parse().ok(),
            Value::Null | Value::Bytes(_) => None,
        }
    }

    /// Reads this value as a 64-bit integer. See [`Value::as_int`].
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(i64::from(*n)),
            Value::Long(n) => Some(*n),
            Value::Double(d) => Some(*d as i64),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Text(s) => s.parse().ok(),
            Value::Null | Value::Bytes(_) => None,
        }
    }

    /// Reads this value as a double.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(f64::from(*n)),
            Value::Long(n) => Some(*n as f64),
            Value::Double(d) => Some(*d),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => crate::decoder::parse_double(s),
            Value::Null | Value::Bytes(_) => None,
        }
    }

    /// Reads this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(n) => Some(*n != 0),
            Value::Long(n) => Some(*n != 0),
            Value::Text(s) => Some(crate::decoder::parse_bool(s)),
            Value::Double(_) | Value::Null | Value::Bytes(_) => None,
        }
    }

    /// Get this value as a string slice, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the canonical text form of any tagged value.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Null | Value::Bytes(_) => None,
            other => Some(other.to_string()),
        }
    }
}

/// Canonical (unescaped) text form, as written after the tag on the wire.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Long(n) => write!(f, "{n}"),
            // Debug keeps the fractional part ("1.0") and round-trips exactly.
            Value::Double(d) => write!(f, "{d:?}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Null
    }
}
