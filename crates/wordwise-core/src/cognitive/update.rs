//! Memory state transitions for a single review.

use crate::config::SchedulerParams;
use crate::types::{MemoryState, Rating};

/// New values produced by one review, before timestamps are attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryUpdate {
    pub stability: f64,
    pub difficulty: f64,
    pub review_count: u32,
    pub total_reviews: u32,
    pub consecutive_correct: u32,
}

/// Maps `(prior state, rating, retrievability at review)` to the next state.
///
/// Deterministic: the same inputs always produce the same output. Both
/// stability and difficulty are clamped into the configured bounds on every
/// path.
#[derive(Debug, Clone)]
pub struct UpdatePolicy {
    params: SchedulerParams,
}

impl UpdatePolicy {
    /// Create an update policy with the given parameters.
    pub fn new(params: SchedulerParams) -> Self {
        Self { params }
    }

    /// Parameters this policy was built with.
    pub fn params(&self) -> &SchedulerParams {
        &self.params
    }

    /// Difficulty after a review: Again and Hard raise it, Easy lowers it,
    /// Good leaves it where it was.
    pub fn next_difficulty(&self, difficulty: f64, rating: Rating) -> f64 {
        let shifted = difficulty - self.params.difficulty_step * rating.offset_from_good();
        self.params.clamp_difficulty(shifted)
    }

    /// Stability after reviewing a state that already has a memory.
    ///
    /// `retrievability` is the recall probability of the prior state at the
    /// moment of review; the lower it was, the more a successful recall
    /// strengthens the memory.
    pub fn next_stability(
        &self,
        stability: f64,
        difficulty: f64,
        rating: Rating,
        retrievability: f64,
    ) -> f64 {
        let p = &self.params;
        if rating == Rating::Again {
            return p.clamp_stability(p.reset_stability);
        }

        let stability = p.clamp_stability(stability);
        let difficulty = p.clamp_difficulty(difficulty);
        let r = retrievability.clamp(0.0, 1.0);

        let growth = p.growth_rate.exp()
            * (p.growth_difficulty_ceiling - difficulty)
            * stability.powf(-p.stability_damping)
            * (((1.0 - r) * p.retrievability_gain).exp() - 1.0);

        let modifier = match rating {
            Rating::Hard => p.hard_penalty,
            Rating::Easy => p.easy_bonus,
            _ => 1.0,
        };

        p.clamp_stability(stability * (1.0 + growth * modifier))
    }

    /// Stability assigned on an item's very first review.
    pub fn initial_stability(&self, rating: Rating) -> f64 {
        let p = &self.params;
        let stability = match rating {
            Rating::Again => p.reset_stability,
            Rating::Hard => p.initial_stability[0],
            Rating::Good => p.initial_stability[1],
            Rating::Easy => p.initial_stability[2],
        };
        p.clamp_stability(stability)
    }

    /// Full transition for one review.
    ///
    /// `prior` is `None` (or a state with no `next_review_at`) for an item
    /// that has never been reviewed.
    pub fn update(
        &self,
        prior: Option<&MemoryState>,
        rating: Rating,
        retrievability: f64,
    ) -> MemoryUpdate {
        let scheduled = prior.filter(|s| !s.is_new());

        let (stability, difficulty) = match scheduled {
            Some(state) => (
                self.next_stability(state.stability, state.difficulty, rating, retrievability),
                self.next_difficulty(state.difficulty, rating),
            ),
            None => (
                self.initial_stability(rating),
                self.next_difficulty(self.params.initial_difficulty, rating),
            ),
        };

        let (review_count, total_reviews, streak) = prior
            .map(|s| (s.review_count, s.total_reviews, s.consecutive_correct))
            .unwrap_or((0, 0, 0));

        MemoryUpdate {
            stability,
            difficulty,
            review_count: review_count.saturating_add(1),
            total_reviews: total_reviews.saturating_add(1),
            consecutive_correct: if rating.is_pass() {
                streak.saturating_add(1)
            } else {
                0
            },
        }
    }
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        Self::new(SchedulerParams::default())
    }
}
