//! Replay command implementation.
//!
//! Loads a schema and an entry log from JSON, replays one table against
//! in-memory rows and prints the resulting rows and pass report.

use fieldlog_core::{
    EntityId, MemoryEntityStore, MemoryEntryStore, OutstandingEntry, Schema, TableId, Value,
};
use fieldlog_replay::{ConsumePolicy, ReplayConfig, ReplayEngine, ReplayReport};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Inputs of the replay command.
#[derive(Debug)]
pub struct ReplayOptions {
    /// Schema JSON file.
    pub schema: PathBuf,
    /// Entries JSON file.
    pub entries: PathBuf,
    /// Table to replay.
    pub table: String,
    /// Optional rows JSON file, keyed by entity id.
    pub rows: Option<PathBuf>,
    /// Keep entries after commit.
    pub retain: bool,
    /// Group limit for the pass.
    pub max_groups: Option<usize>,
}

/// Replay outcome for output.
#[derive(Debug, Serialize)]
pub struct ReplayOutput {
    /// Table replayed.
    pub table: String,
    /// Committed entity ids.
    pub committed: Vec<EntityId>,
    /// Aborted groups.
    pub failures: Vec<FailureInfo>,
    /// Entries folded into committed snapshots.
    pub entries_applied: usize,
    /// Entries removed from the log.
    pub entries_consumed: usize,
    /// Values the target property could not hold.
    pub values_skipped: usize,
    /// Whether the group limit cut the pass short.
    pub truncated: bool,
    /// Rows of committed entities after the pass.
    pub rows: BTreeMap<EntityId, BTreeMap<String, Value>>,
    /// Entries left in the log.
    pub remaining: Vec<OutstandingEntry>,
}

/// One aborted group for output.
#[derive(Debug, Serialize)]
pub struct FailureInfo {
    /// Entity id.
    pub entity_id: EntityId,
    /// Offending column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Offending raw token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Entries left in the log.
    pub entries_retained: usize,
    /// Cause.
    pub error: String,
}

/// Runs the replay command.
pub fn run(options: &ReplayOptions, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let schema: Schema = read_json(&options.schema)?;
    let entries: Vec<OutstandingEntry> = read_json(&options.entries)?;
    let table = TableId::from(options.table.as_str());
    if schema.table(&table).is_none() {
        return Err(format!("table {table} is not in the schema").into());
    }

    let entities = Arc::new(MemoryEntityStore::new());
    match &options.rows {
        Some(path) => {
            let rows: BTreeMap<EntityId, BTreeMap<String, Value>> = read_json(path)?;
            for (id, row) in rows {
                entities.insert(id, row);
            }
        }
        None => {
            for entry in &entries {
                if entities.row(entry.entity_id).is_none() {
                    entities.insert(entry.entity_id, []);
                }
            }
        }
    }

    let log = Arc::new(MemoryEntryStore::with_entries(entries));
    let consume = if options.retain {
        ConsumePolicy::Retain
    } else {
        ConsumePolicy::DeleteOnCommit
    };
    let mut config = ReplayConfig::new().with_consume(consume);
    if let Some(max) = options.max_groups {
        config = config.with_max_groups(max);
    }

    let engine = ReplayEngine::new(
        config,
        table.clone(),
        log.clone(),
        Arc::new(schema),
        entities.clone(),
    );
    let report = engine.replay()?;
    let output = build_output(&table, &report, &entities, log.as_ref());

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            print_text_output(&output, &report);
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let value = serde_json::from_str(&text)
        .map_err(|e| format!("cannot parse {}: {e}", path.display()))?;
    Ok(value)
}

fn build_output(
    table: &TableId,
    report: &ReplayReport,
    entities: &MemoryEntityStore,
    log: &MemoryEntryStore,
) -> ReplayOutput {
    let rows = report
        .committed
        .iter()
        .filter_map(|id| entities.row(*id).map(|row| (*id, row)))
        .collect();
    let failures = report
        .failures
        .iter()
        .map(|f| FailureInfo {
            entity_id: f.entity_id,
            column: f.column.clone(),
            token: f.token.clone(),
            entries_retained: f.entries_retained,
            error: f.error.to_string(),
        })
        .collect();

    let mut remaining = log.entries();
    remaining.sort_by_key(OutstandingEntry::scan_key);

    ReplayOutput {
        table: table.to_string(),
        committed: report.committed.clone(),
        failures,
        entries_applied: report.entries_applied,
        entries_consumed: report.entries_consumed,
        values_skipped: report.values_skipped,
        truncated: report.truncated,
        rows,
        remaining,
    }
}

fn print_text_output(output: &ReplayOutput, report: &ReplayReport) {
    println!("=== Replay: {} ===", output.table);
    println!();
    println!("Committed groups: {}", output.committed.len());
    println!("Aborted groups:   {}", output.failures.len());
    println!("Entries applied:  {}", output.entries_applied);
    println!("Entries consumed: {}", output.entries_consumed);
    println!("Values skipped:   {}", output.values_skipped);
    println!("Duration:         {:?}", report.duration);
    if output.truncated {
        println!("(stopped at group limit)");
    }

    if !output.rows.is_empty() {
        println!();
        println!("--- Rows ---");
        for (id, row) in &output.rows {
            let fields: Vec<String> = row.iter().map(|(k, v)| format!("{k}={v}")).collect();
            println!("  {id}: {}", fields.join(", "));
        }
    }

    if !output.failures.is_empty() {
        println!();
        println!("--- Failures ---");
        for failure in &output.failures {
            println!(
                "  {}: {} ({} entries retained)",
                failure.entity_id, failure.error, failure.entries_retained
            );
        }
    }

    println!();
    println!("Entries remaining: {}", output.remaining.len());
}
