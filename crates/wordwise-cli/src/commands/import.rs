//! The `wordwise import` command.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use serde_json::json;
use wordwise_core::import::import_jsonl;

use super::Context;

pub fn execute(ctx: &Context, file: PathBuf, batch_size: usize) -> Result<()> {
    let reader = BufReader::new(
        File::open(&file).with_context(|| format!("cannot open {}", file.display()))?,
    );

    let stats = import_jsonl(reader, batch_size, |batch| ctx.scheduler.add_items(&batch))?;

    if ctx.json {
        return ctx.print_json(&json!({
            "total": stats.total,
            "imported": stats.imported,
            "skipped": stats.skipped,
            "errors": stats.errors,
        }));
    }

    println!("Imported {} of {} words from {}", stats.imported, stats.total, file.display());
    for error in &stats.errors {
        eprintln!("  {error}");
    }
    if !stats.is_success() {
        eprintln!("{} line(s) could not be imported.", stats.errors.len());
    }
    Ok(())
}
