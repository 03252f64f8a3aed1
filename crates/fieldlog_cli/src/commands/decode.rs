//! Decode command implementation.

use fieldlog_codec::{decode_map, Value};
use serde::Serialize;

/// One decoded pair for output.
#[derive(Debug, Serialize)]
pub struct PairInfo {
    /// Unescaped key.
    pub key: String,
    /// Decoded value.
    pub value: Value,
}

/// Runs the decode command.
pub fn run(serialized: &str, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let pairs: Vec<PairInfo> = decode_map(serialized)?
        .into_iter()
        .map(|(key, value)| PairInfo { key, value })
        .collect();

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&pairs)?);
        }
        _ => {
            print_text_output(&pairs);
        }
    }

    Ok(())
}

fn print_text_output(pairs: &[PairInfo]) {
    if pairs.is_empty() {
        println!("(empty)");
        return;
    }
    let width = pairs.iter().map(|p| p.key.len()).max().unwrap_or(0);
    for pair in pairs {
        println!(
            "{:width$}  {:<6}  {}",
            pair.key,
            pair.value.type_name(),
            pair.value,
            width = width
        );
    }
}
