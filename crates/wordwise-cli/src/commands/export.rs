//! The `wordwise export` command.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use wordwise_core::export::export_jsonl;

use super::Context;

pub fn execute(ctx: &Context, output: Option<PathBuf>) -> Result<()> {
    let records = ctx.scheduler.store().all_records()?;

    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            let stats = export_jsonl(records, file)?;
            for error in &stats.errors {
                eprintln!("  {error}");
            }
            println!(
                "Exported {} words ({} with review history) to {}",
                stats.exported,
                stats.with_memory,
                path.display()
            );
        }
        None => {
            let stats = export_jsonl(records, std::io::stdout().lock())?;
            tracing::info!(exported = stats.exported, "Exported to stdout");
        }
    }
    Ok(())
}
