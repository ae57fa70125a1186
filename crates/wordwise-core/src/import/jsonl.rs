//! JSON Lines import for catalog items.
//!
//! Each non-empty line is one item. Lines that fail to parse or validate are
//! recorded in [`ImportStats::errors`] and the import carries on.

use crate::types::Item;
use crate::WordwiseResult;
use serde::Deserialize;
use std::io::BufRead;

/// Statistics from an import operation.
#[derive(Debug, Default, Clone)]
pub struct ImportStats {
    /// Non-empty lines processed.
    pub total: u64,
    /// Items written to the catalog.
    pub imported: u64,
    /// Parsed items the batch callback did not write.
    pub skipped: u64,
    /// Error messages for lines or batches that failed.
    pub errors: Vec<String>,
}

impl ImportStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if import completed without errors.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the error rate as a percentage.
    pub fn error_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.errors.len() as f64 / self.total as f64) * 100.0
        }
    }
}

/// One catalog item in import format.
///
/// `key` defaults to the word itself. `deck_name` is accepted for `deck`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportableItem {
    #[serde(default)]
    pub key: Option<String>,
    pub word: String,
    #[serde(default)]
    pub meaning: Option<String>,
    #[serde(default, alias = "deck_name")]
    pub deck: Option<String>,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub example_sentence: Option<String>,
}

impl ImportableItem {
    /// Convert into a validated [`Item`].
    pub fn into_item(self) -> WordwiseResult<Item> {
        let item = Item {
            key: self.key.unwrap_or_else(|| self.word.trim().to_string()),
            word: self.word,
            meaning: self.meaning,
            deck: self.deck,
            phonetic: self.phonetic,
            example_sentence: self.example_sentence,
        };
        item.validate()?;
        Ok(item)
    }
}

/// Import items from JSON Lines.
///
/// Valid items are handed to `import_batch` in groups of `batch_size`; the
/// callback returns how many it wrote. A failing batch is recorded as an
/// error and does not stop later batches.
pub fn import_jsonl<R, F>(reader: R, batch_size: usize, mut import_batch: F) -> WordwiseResult<ImportStats>
where
    R: BufRead,
    F: FnMut(Vec<Item>) -> WordwiseResult<usize>,
{
    let batch_size = batch_size.max(1);
    let mut stats = ImportStats::new();
    let mut batch = Vec::with_capacity(batch_size);

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        stats.total += 1;
        let line_no = index + 1;

        let parsed = serde_json::from_str::<ImportableItem>(line)
            .map_err(|e| format!("Parse error at line {}: {}", line_no, e))
            .and_then(|raw| {
                raw.into_item()
                    .map_err(|e| format!("Invalid item at line {}: {}", line_no, e))
            });

        match parsed {
            Ok(item) => {
                batch.push(item);
                if batch.len() >= batch_size {
                    flush(&mut stats, std::mem::take(&mut batch), &mut import_batch);
                }
            }
            Err(message) => stats.errors.push(message),
        }
    }

    if !batch.is_empty() {
        flush(&mut stats, batch, &mut import_batch);
    }

    tracing::debug!(
        total = stats.total,
        imported = stats.imported,
        errors = stats.errors.len(),
        "Finished JSON Lines import"
    );

    Ok(stats)
}

fn flush<F>(stats: &mut ImportStats, batch: Vec<Item>, import_batch: &mut F)
where
    F: FnMut(Vec<Item>) -> WordwiseResult<usize>,
{
    let batch_count = batch.len();
    match import_batch(batch) {
        Ok(count) => {
            stats.imported += count as u64;
            stats.skipped += batch_count.saturating_sub(count) as u64;
        }
        Err(e) => stats.errors.push(format!("Batch import error: {}", e)),
    }
}
