//! wordwise-core - Core library for wordwise.
//!
//! A spaced-repetition scheduler for vocabulary learning: an exponential
//! forgetting model, a stability/difficulty update policy, a due-item
//! selector, and a SQLite-backed orchestrator that persists every review
//! atomically.
//!
//! # Example
//!
//! ```ignore
//! use chrono::Utc;
//! use wordwise_core::{Item, ReviewScheduler, WordwiseConfig};
//!
//! let scheduler = ReviewScheduler::from_config(&WordwiseConfig::from_env())?;
//! scheduler.add_item(&Item::new("apple", "apple").with_meaning("manzana"))?;
//!
//! if let Some(item) = scheduler.get_next_item(Utc::now())? {
//!     let outcome = scheduler.submit_review(&item.key, 3, Utc::now())?;
//!     println!("next review at {}", outcome.next_review_at);
//! }
//! ```

pub mod cognitive;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod types;

// Re-export commonly used types
pub use cognitive::{
    CandidatePool, DecayModel, DueSelector, MemoryUpdate, ReviewScheduler, ReviewStore, Selection,
    SelectionReason, SelectionSource, UpdatePolicy,
};
pub use config::{SchedulerParams, SelectionConfig, StoreConfig, WordwiseConfig};
pub use error::{ErrorCode, WordwiseError, WordwiseResult};
pub use types::{answers_match, Item, MemoryState, Rating, ReviewOutcome, ReviewStats};
