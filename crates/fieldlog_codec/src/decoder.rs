//! Tagged string decoder.

use crate::error::{CodecError, CodecResult};
use crate::value::{Value, ValueTag};
use crate::{SEPARATOR, SEPARATOR_ESCAPE};

/// Reverses [`escape`](crate::escape).
pub fn unescape(text: &str) -> String {
    text.replace(SEPARATOR_ESCAPE, &SEPARATOR.to_string())
}

/// Decode a single `<tag><text>` token.
///
/// A numeric tag whose text does not parse falls back to a `Text` value
/// holding the unescaped text. Boolean text never fails: anything other
/// than a case-insensitive `true` reads as `false`.
///
/// # Errors
///
/// Returns [`CodecError::MalformedToken`] for an empty token and
/// [`CodecError::UnknownTag`] when the first character is not a known tag.
pub fn decode_scalar(token: &str) -> CodecResult<Value> {
    let mut chars = token.chars();
    let Some(first) = chars.next() else {
        return Err(CodecError::malformed(token));
    };
    let tag = ValueTag::from_char(first).ok_or_else(|| CodecError::unknown_tag(first, token))?;
    Ok(decode_tagged(tag, chars.as_str()))
}

/// Decode the text half of a token whose tag is already known.
pub fn decode_tagged(tag: ValueTag, text: &str) -> Value {
    let parsed = match tag {
        ValueTag::Int => text.parse().ok().map(Value::Int),
        ValueTag::Long => text.parse().ok().map(Value::Long),
        ValueTag::Double => parse_double(text).map(Value::Double),
        ValueTag::Bool => Some(Value::Bool(parse_bool(text))),
        ValueTag::Text => None,
    };
    parsed.unwrap_or_else(|| Value::Text(unescape(text)))
}

/// Parses a double, also accepting the legacy forms `Infinity`, padded
/// text and a trailing `d`/`f` suffix.
pub(crate) fn parse_double(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    trimmed.parse().ok().or_else(|| {
        trimmed
            .strip_suffix(&['d', 'D', 'f', 'F'][..])
            .and_then(|rest| rest.parse().ok())
    })
}

pub(crate) fn parse_bool(text: &str) -> bool {
    text.eq_ignore_ascii_case("true")
}

/// Decode a serialized map into its ordered `(key, value)` pairs.
///
/// Pairs with a missing or empty value half are skipped with a warning.
///
/// # Errors
///
/// Returns [`CodecError::UnknownTag`] if any value token carries an unknown tag.
pub fn decode_map(input: &str) -> CodecResult<Vec<(String, Value)>> {
    MapDecoder::new(input).collect()
}

/// Iterator over the pairs of a serialized map.
///
/// Malformed pairs are logged and skipped; an unknown tag is yielded as an
/// error and iteration may continue past it.
pub struct MapDecoder<'a> {
    input: &'a str,
    segments: Vec<&'a str>,
    pos: usize,
    skipped: usize,
}

impl<'a> MapDecoder<'a> {
    /// Create a new decoder for the given serialized string.
    pub fn new(input: &'a str) -> Self {
        let mut segments: Vec<&str> = input.split(SEPARATOR).collect();
        // Trailing separators do not introduce pairs.
        while segments.last().is_some_and(|s| s.is_empty()) {
            segments.pop();
        }
        Self {
            input,
            segments,
            pos: 0,
            skipped: 0,
        }
    }

    /// Number of malformed pairs skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for MapDecoder<'_> {
    type Item = CodecResult<(String, Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw_key = *self.segments.get(self.pos)?;
            let token = self.segments.get(self.pos + 1).copied();
            self.pos += 2;

            let key = unescape(raw_key);
            match token {
                Some(token) if !token.is_empty() => {
                    return Some(decode_scalar(token).map(|value| (key, value)));
                }
                _ => {
                    self.skipped += 1;
                    tracing::warn!(
                        serialized = self.input,
                        key = key.as_str(),
                        "badly formed serialization, skipping pair"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_each_tag() {
        assert_eq!(decode_scalar("i5").unwrap(), Value::Int(5));
        assert_eq!(decode_scalar("l-12").unwrap(), Value::Long(-12));
        assert_eq!(decode_scalar("d0.25").unwrap(), Value::Double(0.25));
        assert_eq!(decode_scalar("btrue").unwrap(), Value::Bool(true));
        assert_eq!(decode_scalar("sx").unwrap(), Value::from("x"));
        assert_eq!(decode_scalar("s").unwrap(), Value::from(""));
    }

    #[test]
    fn numeric_fallback_to_text() {
        assert_eq!(decode_scalar("iabc").unwrap(), Value::from("abc"));
        assert_eq!(decode_scalar("l1.5").unwrap(), Value::from("1.5"));
        assert_eq!(decode_scalar("dfoo").unwrap(), Value::from("foo"));
        assert_eq!(decode_scalar("i").unwrap(), Value::from(""));
        assert_eq!(decode_scalar("ia!PIPE!b").unwrap(), Value::from("a|b"));
    }

    #[test]
    fn int_overflow_falls_back() {
        assert_eq!(
            decode_scalar("i4294967296").unwrap(),
            Value::from("4294967296")
        );
        assert_eq!(
            decode_scalar("l4294967296").unwrap(),
            Value::Long(4_294_967_296)
        );
    }

    #[test]
    fn lenient_bool() {
        assert_eq!(decode_scalar("bTRUE").unwrap(), Value::Bool(true));
        assert_eq!(decode_scalar("byes").unwrap(), Value::Bool(false));
        assert_eq!(decode_scalar("b").unwrap(), Value::Bool(false));
    }

    #[test]
    fn legacy_double_forms() {
        assert_eq!(decode_scalar("d1.0E10").unwrap(), Value::Double(1.0e10));
        assert_eq!(
            decode_scalar("dInfinity").unwrap(),
            Value::Double(f64::INFINITY)
        );
        assert_eq!(decode_scalar("dinf").unwrap(), Value::Double(f64::INFINITY));
        assert_eq!(decode_scalar("d2.5f").unwrap(), Value::Double(2.5));
        assert!(matches!(decode_scalar("dNaN").unwrap(), Value::Double(d) if d.is_nan()));
    }

    #[test]
    fn unknown_tag_is_error() {
        assert_eq!(
            decode_scalar("x12"),
            Err(CodecError::unknown_tag('x', "x12"))
        );
        assert!(matches!(decode_scalar(""), Err(CodecError::MalformedToken { .. })));
    }

    #[test]
    fn decode_map_pairs() {
        let pairs = decode_map("a|i1|b|stwo|c|bfalse|").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), Value::Int(1)),
                ("b".to_string(), Value::from("two")),
                ("c".to_string(), Value::Bool(false)),
            ]
        );
    }

    #[test]
    fn decode_map_unescapes() {
        let pairs = decode_map("k!PIPE!1|sv!PIPE!w|").unwrap();
        assert_eq!(pairs, vec![("k|1".to_string(), Value::from("v|w"))]);
    }

    #[test]
    fn decode_map_skips_malformed_pairs() {
        // Empty value half, then a dangling key.
        let mut decoder = MapDecoder::new("a||b|l7|dangling");
        let pairs: Vec<_> = decoder.by_ref().collect::<CodecResult<_>>().unwrap();
        assert_eq!(pairs, vec![("b".to_string(), Value::Long(7))]);
        assert_eq!(decoder.skipped(), 2);
    }

    #[test]
    fn decode_map_empty() {
        assert!(decode_map("").unwrap().is_empty());
        assert!(decode_map("|||").unwrap().is_empty());
    }

    #[test]
    fn decode_map_unknown_tag() {
        let result = decode_map("a|i1|b|q2|");
        assert!(matches!(result, Err(CodecError::UnknownTag { tag: 'q', .. })));
    }
}
