//! wordwise CLI - study vocabulary with spaced repetition from the terminal.
//!
//! # Configuration
//!
//! Settings are layered: defaults, then `--config <file>`, then `WORDWISE_*`
//! environment variables (a `.env` file is honoured), then `--db`.
//!
//! - `WORDWISE_DB_PATH` - database file, defaults to `~/.wordwise/wordwise.db`
//! - `WORDWISE_SEED` - makes new-word selection reproducible
//! - `RUST_LOG` - log filter; logs go to stderr

use std::path::PathBuf;
use std::process;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wordwise_core::WordwiseError;

mod commands;

#[derive(Parser)]
#[command(name = "wordwise", version, about = "Spaced-repetition vocabulary scheduler")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args)]
pub struct GlobalArgs {
    /// Config file (.toml, .json, .yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Evaluate as of this RFC 3339 instant instead of the system clock
    #[arg(long, global = true, value_parser = parse_timestamp)]
    now: Option<DateTime<Utc>>,

    /// Print JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a word to the catalog (updates it if the key exists)
    Add {
        /// The word to learn
        word: String,

        /// Stable key (defaults to the word)
        #[arg(long)]
        key: Option<String>,

        /// Translation or definition
        #[arg(long)]
        meaning: Option<String>,

        /// Deck name
        #[arg(long)]
        deck: Option<String>,

        /// Phonetic transcription
        #[arg(long)]
        phonetic: Option<String>,

        /// Example sentence
        #[arg(long)]
        example: Option<String>,
    },

    /// Import words from a JSON Lines file
    Import {
        /// Path to .jsonl file
        file: PathBuf,

        /// Words written per transaction
        #[arg(long, default_value = "100")]
        batch_size: usize,
    },

    /// Remove a word and its review history
    Remove {
        /// Item key
        key: String,
    },

    /// Show the next word to study
    Next,

    /// Record a review (rating 1-4 or again/hard/good/easy)
    Review {
        /// Item key
        key: String,

        /// Recall quality
        rating: String,
    },

    /// Check a typed answer and record the resulting review
    Practice {
        /// Item key
        key: String,

        /// The answer you typed
        answer: String,

        /// How long answering took, in milliseconds
        #[arg(long, default_value = "3000")]
        response_ms: u64,
    },

    /// Show a word with its memory state
    Show {
        /// Item key
        key: String,
    },

    /// List words that are due
    Due {
        /// Maximum number of words
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Sample reviewed words within a difficulty range
    ByDifficulty {
        /// Lowest difficulty (1-10)
        #[arg(long, default_value = "1.0")]
        min: f64,

        /// Highest difficulty (1-10)
        #[arg(long, default_value = "10.0")]
        max: f64,

        /// Maximum number of words
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Forget a word's review history so it is new again
    Reset {
        /// Item key
        key: String,
    },

    /// Show study statistics
    Stats,

    /// Export words and memory states as JSON Lines
    Export {
        /// Output file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp such as 2026-01-31T09:00:00Z: {e}"))
}

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let result = commands::Context::load(&cli.global).and_then(|ctx| match cli.command {
        Commands::Add {
            word,
            key,
            meaning,
            deck,
            phonetic,
            example,
        } => commands::add::execute(&ctx, word, key, meaning, deck, phonetic, example),
        Commands::Import { file, batch_size } => commands::import::execute(&ctx, file, batch_size),
        Commands::Remove { key } => commands::remove::execute(&ctx, &key),
        Commands::Next => commands::next::execute(&ctx),
        Commands::Review { key, rating } => commands::review::execute(&ctx, &key, &rating),
        Commands::Practice {
            key,
            answer,
            response_ms,
        } => commands::review::practice(&ctx, &key, &answer, response_ms),
        Commands::Show { key } => commands::show::execute(&ctx, &key),
        Commands::Due { limit } => commands::due::execute(&ctx, limit),
        Commands::ByDifficulty { min, max, limit } => {
            commands::due::by_difficulty(&ctx, min, max, limit)
        }
        Commands::Reset { key } => commands::reset::execute(&ctx, &key),
        Commands::Stats => commands::stats::execute(&ctx),
        Commands::Export { output } => commands::export::execute(&ctx, output),
    });

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        if let Some(hint) = e.downcast_ref::<WordwiseError>().and_then(|w| w.suggestion()) {
            eprintln!("Hint: {hint}");
        }
        process::exit(1);
    }
}
