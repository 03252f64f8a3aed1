//! Wire-format test vectors.
//!
//! Stored tokens outlive the code that wrote them, so these vectors pin
//! the exact strings the codec produces and accepts.

use fieldlog_core::Value;
use serde::{Deserialize, Serialize};

/// A single-value vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Stored token.
    pub token: String,
    /// Decoded value.
    pub value: Value,
    /// Whether encoding `value` reproduces `token` exactly.
    pub canonical: bool,
}

/// A serialized-map vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Serialized form.
    pub serialized: String,
    /// Decoded pairs, in order.
    pub pairs: Vec<(String, Value)>,
    /// Whether encoding `pairs` reproduces `serialized` exactly.
    pub canonical: bool,
}

/// A token that must not decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Offending input.
    pub input: String,
}

fn scalar(id: &str, token: &str, value: Value, canonical: bool) -> ScalarVector {
    ScalarVector {
        id: id.into(),
        token: token.into(),
        value,
        canonical,
    }
}

/// Scalar vectors.
pub fn scalar_vectors() -> Vec<ScalarVector> {
    vec![
        scalar("int", "i5", Value::Int(5), true),
        scalar("int_negative", "i-42", Value::Int(-42), true),
        scalar("int_max", "i2147483647", Value::Int(i32::MAX), true),
        scalar("long", "l9007199254740993", Value::Long(9_007_199_254_740_993), true),
        scalar("double", "d0.25", Value::Double(0.25), true),
        scalar("double_whole", "d1.0", Value::Double(1.0), true),
        scalar("bool_true", "btrue", Value::Bool(true), true),
        scalar("bool_false", "bfalse", Value::Bool(false), true),
        scalar("text", "shello", Value::from("hello"), true),
        scalar("text_empty", "s", Value::from(""), true),
        scalar("text_pipe", "sa!PIPE!b", Value::from("a|b"), true),
        // Lenient forms accepted on decode only.
        scalar("double_suffix", "d2.5f", Value::Double(2.5), false),
        scalar("double_integral", "d3", Value::Double(3.0), false),
        scalar("bool_upper", "bTRUE", Value::Bool(true), false),
        scalar("bool_other", "byes", Value::Bool(false), false),
        scalar("int_fallback", "i12x", Value::from("12x"), false),
        scalar("int_overflow", "i2147483648", Value::from("2147483648"), false),
        scalar("long_empty", "l", Value::from(""), false),
    ]
}

fn map(id: &str, serialized: &str, pairs: &[(&str, Value)], canonical: bool) -> MapVector {
    MapVector {
        id: id.into(),
        serialized: serialized.into(),
        pairs: pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect(),
        canonical,
    }
}

/// Map vectors.
pub fn map_vectors() -> Vec<MapVector> {
    vec![
        map("empty", "", &[], true),
        map(
            "two_pairs",
            "a|i5|b|sx|",
            &[("a", Value::Int(5)), ("b", Value::from("x"))],
            true,
        ),
        map(
            "escaped",
            "na!PIPE!me|sa!PIPE!b|",
            &[("na|me", Value::from("a|b"))],
            true,
        ),
        map(
            "all_tags",
            "i|i1|l|l2|d|d3.5|b|bfalse|s|s|",
            &[
                ("i", Value::Int(1)),
                ("l", Value::Long(2)),
                ("d", Value::Double(3.5)),
                ("b", Value::Bool(false)),
                ("s", Value::from("")),
            ],
            true,
        ),
        map("no_trailing", "a|i5", &[("a", Value::Int(5))], false),
        map("missing_value", "a|i5|b|", &[("a", Value::Int(5))], false),
        map("empty_value", "a||b|i1|", &[("b", Value::Int(1))], false),
    ]
}

/// Inputs that must fail to decode.
pub fn reject_vectors() -> Vec<RejectVector> {
    [
        ("empty_token", ""),
        ("unknown_tag", "q1"),
        ("uppercase_tag", "I5"),
    ]
    .into_iter()
    .map(|(id, input)| RejectVector {
        id: id.into(),
        input: input.into(),
    })
    .collect()
}

/// Generate all test vectors as JSON.
pub fn all_vectors_json() -> String {
    let vectors = AllTestVectors {
        scalar: scalar_vectors(),
        map: map_vectors(),
        reject: reject_vectors(),
    };

    serde_json::to_string_pretty(&vectors).expect("Failed to serialize vectors")
}

#[derive(Debug, Serialize, Deserialize)]
struct AllTestVectors {
    scalar: Vec<ScalarVector>,
    map: Vec<MapVector>,
    reject: Vec<RejectVector>,
}
