//! Core types for wordwise.

mod item;
mod memory_state;
mod rating;

pub use item::Item;
pub use memory_state::{MemoryState, ReviewOutcome, ReviewStats};
pub use rating::{answers_match, Rating};
