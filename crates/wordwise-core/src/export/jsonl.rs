//! JSON Lines export for catalog and review data.
//!
//! Each line is one item with its memory state, if it has one. Useful for
//! backups and for inspecting a deck with `jq`.

use crate::types::{Item, MemoryState};
use crate::WordwiseResult;
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Write};

/// Statistics from an export operation.
#[derive(Debug, Default, Clone)]
pub struct ExportStats {
    /// Total records processed.
    pub total: u64,
    /// Successfully exported records.
    pub exported: u64,
    /// Items that had a memory state.
    pub with_memory: u64,
    /// Error messages for failed records.
    pub errors: Vec<String>,
}

impl ExportStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if export completed without errors.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.total == self.exported
    }
}

/// An item and its memory state in export format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportableRecord {
    #[serde(flatten)]
    pub item: Item,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_state: Option<MemoryState>,
}

impl From<(Item, Option<MemoryState>)> for ExportableRecord {
    fn from((item, memory_state): (Item, Option<MemoryState>)) -> Self {
        Self { item, memory_state }
    }
}

/// Export records to JSON Lines.
///
/// Per-record serialization or write failures are collected in the stats;
/// only the final flush failing is returned as an error.
pub fn export_jsonl<I, W>(records: I, writer: W) -> WordwiseResult<ExportStats>
where
    I: IntoIterator,
    I::Item: Into<ExportableRecord>,
    W: Write,
{
    let mut stats = ExportStats::new();
    let mut writer = BufWriter::new(writer);

    for record in records {
        stats.total += 1;
        let record: ExportableRecord = record.into();

        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(e) => {
                stats
                    .errors
                    .push(format!("Serialization error for item {}: {}", record.item.key, e));
                continue;
            }
        };

        if let Err(e) = writeln!(writer, "{}", json) {
            stats
                .errors
                .push(format!("Write error for item {}: {}", record.item.key, e));
            continue;
        }

        stats.exported += 1;
        if record.memory_state.is_some() {
            stats.with_memory += 1;
        }
    }

    writer.flush()?;

    tracing::debug!(
        exported = stats.exported,
        with_memory = stats.with_memory,
        "Finished JSON Lines export"
    );

    Ok(stats)
}
