//! Tagged string encoder.

use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use crate::{SEPARATOR, SEPARATOR_ESCAPE};
use std::fmt::Write as _;

/// Encoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeConfig {
    /// When true, encoding a value without a wire tag fails with
    /// [`CodecError::UnsupportedType`]. When false the pair is dropped.
    pub error_on_unsupported_type: bool,
}

impl EncodeConfig {
    /// Creates the default (strict) configuration.
    pub fn new() -> Self {
        Self {
            error_on_unsupported_type: true,
        }
    }

    /// Creates a configuration that drops unsupported values.
    pub fn lenient() -> Self {
        Self {
            error_on_unsupported_type: false,
        }
    }

    /// Sets whether unsupported values are an error.
    pub fn with_error_on_unsupported_type(mut self, error: bool) -> Self {
        self.error_on_unsupported_type = error;
        self
    }
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Replaces every literal separator with the escape token.
pub fn escape(text: &str) -> String {
    text.replace(SEPARATOR, SEPARATOR_ESCAPE)
}

/// Encode a single scalar to its `<tag><text>` token.
///
/// String values are escaped so the token never contains a separator.
///
/// # Errors
///
/// Returns [`CodecError::UnsupportedType`] for `Null` and `Bytes`.
pub fn encode_scalar(value: &Value) -> CodecResult<String> {
    let mut out = String::new();
    write_scalar(&mut out, value)?;
    Ok(out)
}

fn write_scalar(out: &mut String, value: &Value) -> CodecResult<()> {
    let tag = value
        .tag()
        .ok_or_else(|| CodecError::unsupported_type(value.type_name()))?;
    out.push(tag.as_char());
    match value {
        Value::Text(s) => out.push_str(&escape(s)),
        // Writing to a String cannot fail.
        other => {
            let _ = write!(out, "{other}");
        }
    }
    Ok(())
}

/// Encode an ordered sequence of `(key, value)` pairs to one string.
///
/// Each pair becomes `escaped_key|<tag><text>|`; pairs are concatenated
/// with nothing in between.
///
/// # Errors
///
/// Returns [`CodecError::UnsupportedType`] if a value has no wire form and
/// `config.error_on_unsupported_type` is set.
pub fn encode_map<'a, I, K>(pairs: I, config: &EncodeConfig) -> CodecResult<String>
where
    I: IntoIterator<Item = (K, &'a Value)>,
    K: AsRef<str>,
{
    let mut encoder = MapEncoder::new(*config);
    for (key, value) in pairs {
        encoder.push(key.as_ref(), value)?;
    }
    Ok(encoder.into_string())
}

/// Incremental encoder for a serialized map.
#[derive(Debug, Default)]
pub struct MapEncoder {
    buffer: String,
    config: EncodeConfig,
    dropped: usize,
}

impl MapEncoder {
    /// Create a new encoder.
    pub fn new(config: EncodeConfig) -> Self {
        Self {
            buffer: String::new(),
            config,
            dropped: 0,
        }
    }

    /// Append one pair.
    ///
    /// Returns `Ok(false)` if the value was dropped under the lenient config.
    pub fn push(&mut self, key: &str, value: &Value) -> CodecResult<bool> {
        if value.tag().is_none() {
            if self.config.error_on_unsupported_type {
                return Err(CodecError::unsupported_type(value.type_name()));
            }
            tracing::trace!(key, type_name = value.type_name(), "dropping unsupported value");
            self.dropped += 1;
            return Ok(false);
        }

        self.buffer.push_str(&escape(key));
        self.buffer.push(SEPARATOR);
        write_scalar(&mut self.buffer, value)?;
        self.buffer.push(SEPARATOR);
        Ok(true)
    }

    /// Number of pairs dropped so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Get a reference to the encoded text.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Consume this encoder and return the encoded string.
    pub fn into_string(self) -> String {
        self.buffer
    }
}
