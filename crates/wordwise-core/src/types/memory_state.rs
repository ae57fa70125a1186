//! Per-item memory state and review results.

use super::Rating;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Memory state of one item, created lazily on its first review.
///
/// Difficulty is on the 1-10 scale. A state whose `next_review_at` is
/// `None` is treated as never reviewed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    /// Key of the item this state belongs to.
    pub item_key: String,
    /// Days until retrievability decays to the reference retention.
    pub stability: f64,
    /// Resistance to stability growth (1 = easiest, 10 = hardest).
    pub difficulty: f64,
    /// When the item was last reviewed.
    pub last_review_at: Option<DateTime<Utc>>,
    /// When the item is due next.
    pub next_review_at: Option<DateTime<Utc>>,
    /// Reviews recorded for this state.
    pub review_count: u32,
    /// Lifetime review counter.
    pub total_reviews: u32,
    /// Passing reviews in a row; reset by any rating below Good.
    pub consecutive_correct: u32,
}

impl MemoryState {
    /// Whether the item has never been scheduled.
    pub fn is_new(&self) -> bool {
        self.next_review_at.is_none()
    }

    /// Whether the item is due at `now`. New states are never due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at.is_some_and(|at| at <= now)
    }

    /// Days elapsed since the last review, floored at zero.
    pub fn elapsed_days(&self, now: DateTime<Utc>) -> Option<f64> {
        self.last_review_at.map(|last| {
            let seconds = now.signed_duration_since(last).num_milliseconds() as f64 / 1000.0;
            (seconds / SECONDS_PER_DAY).max(0.0)
        })
    }
}

/// Result of a submitted review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    /// The persisted state after the review.
    pub state: MemoryState,
    /// Rating that was applied.
    pub rating: Rating,
    /// When the item is due next.
    pub next_review_at: DateTime<Utc>,
    /// Days until the next review.
    pub interval_days: f64,
    /// Retrievability of the prior state at the moment of review.
    pub retrievability: f64,
}

impl ReviewOutcome {
    /// New stability.
    pub fn stability(&self) -> f64 {
        self.state.stability
    }

    /// New difficulty.
    pub fn difficulty(&self) -> f64 {
        self.state.difficulty
    }

    /// Review counter after this review.
    pub fn review_count(&self) -> u32 {
        self.state.review_count
    }
}

/// Aggregate view over all persisted memory states.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewStats {
    /// Items whose `next_review_at` is at or before now.
    pub due_count: u64,
    /// Items due within the next 24 hours (including overdue ones).
    pub due_within_day: u64,
    /// Items in the catalog.
    pub total_items: u64,
    /// Items that have a memory state.
    pub items_with_memory: u64,
    /// Items last reviewed on now's UTC calendar day.
    pub reviewed_today: u64,
    /// Mean stability over items with memory (0 when there are none).
    pub avg_stability: f64,
    /// Mean difficulty over items with memory (0 when there are none).
    pub avg_difficulty: f64,
    /// Share of catalog items that have been reviewed at least once.
    pub memorization_rate: f64,
}
