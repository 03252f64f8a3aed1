//! Encode command implementation.

use fieldlog_codec::{encode_map, EncodeConfig, Value, ValueTag};

/// Runs the encode command.
pub fn run(pairs: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = pairs
        .iter()
        .map(|arg| parse_pair(arg))
        .collect::<Result<Vec<_>, _>>()?;

    let serialized = encode_map(
        parsed.iter().map(|(k, v)| (k.as_str(), v)),
        &EncodeConfig::default(),
    )?;
    println!("{serialized}");
    Ok(())
}

/// Parses `key=tag:text` into a typed pair.
///
/// Unlike the wire decoder this is strict: numeric text must parse and
/// booleans must be `true` or `false`.
pub fn parse_pair(arg: &str) -> Result<(String, Value), String> {
    let (key, typed) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=tag:text, got {arg:?}"))?;
    let (tag, text) = typed
        .split_once(':')
        .ok_or_else(|| format!("expected tag:text after '=' in {arg:?}"))?;

    let mut chars = tag.chars();
    let tag = match (chars.next(), chars.next()) {
        (Some(c), None) => ValueTag::from_char(c),
        _ => None,
    }
    .ok_or_else(|| format!("unknown tag {tag:?}; expected one of i, l, d, b, s"))?;

    let invalid = || format!("{text:?} is not a valid {tag} value");
    let value = match tag {
        ValueTag::Int => Value::Int(text.parse().map_err(|_| invalid())?),
        ValueTag::Long => Value::Long(text.parse().map_err(|_| invalid())?),
        ValueTag::Double => Value::Double(text.parse().map_err(|_| invalid())?),
        ValueTag::Bool => Value::Bool(text.parse().map_err(|_| invalid())?),
        ValueTag::Text => Value::Text(text.to_string()),
    };
    Ok((key.to_string(), value))
}
