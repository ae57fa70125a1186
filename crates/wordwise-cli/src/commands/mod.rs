//! Subcommand implementations.

use anyhow::{Context as _, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use wordwise_core::{ReviewScheduler, WordwiseConfig};

use crate::GlobalArgs;

pub mod add;
pub mod due;
pub mod export;
pub mod import;
pub mod next;
pub mod remove;
pub mod reset;
pub mod review;
pub mod show;
pub mod stats;

/// State shared by every subcommand.
pub struct Context {
    pub scheduler: ReviewScheduler,
    pub now: DateTime<Utc>,
    pub json: bool,
}

impl Context {
    /// Resolve configuration and open the scheduler.
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => WordwiseConfig::from_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => WordwiseConfig::default(),
        };
        config.apply_env();
        if let Some(db) = &args.db {
            config.store.db_path = db.clone();
        }

        tracing::debug!(db = %config.store.db_path.display(), "Opening scheduler");
        let scheduler = ReviewScheduler::from_config(&config)?;

        Ok(Self {
            scheduler,
            now: args.now.unwrap_or_else(Utc::now),
            json: args.json,
        })
    }

    /// Print `value` as pretty JSON on stdout.
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

pub(crate) fn format_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

pub(crate) fn item_table(items: &[wordwise_core::Item]) -> comfy_table::Table {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Key", "Word", "Meaning", "Deck"]);
    for item in items {
        table.add_row(vec![
            Cell::new(&item.key),
            Cell::new(&item.word),
            Cell::new(or_dash(item.meaning.as_deref())),
            Cell::new(or_dash(item.deck.as_deref())),
        ]);
    }
    table
}
