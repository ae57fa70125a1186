//! Forgetting curve and interval computation.
//!
//! Pure functions of a memory state: no I/O, no clock reads. Callers pass
//! `now` explicitly.

use crate::config::SchedulerParams;
use crate::types::MemoryState;
use chrono::{DateTime, Duration, Utc};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Exponential forgetting model.
///
/// Retrievability after `t` days is `R = exp(ln(reference_retention) * t / S)`,
/// so a state with stability `S` is recalled with the reference retention
/// (0.9 by default) exactly `S` days after its last review.
#[derive(Debug, Clone)]
pub struct DecayModel {
    params: SchedulerParams,
}

impl DecayModel {
    /// Create a decay model with the given parameters.
    pub fn new(params: SchedulerParams) -> Self {
        Self { params }
    }

    /// Parameters this model was built with.
    pub fn params(&self) -> &SchedulerParams {
        &self.params
    }

    /// Probability of recall `elapsed_days` after the last review.
    ///
    /// Returns 0.0 when `stability <= 0` (no memory formed). Negative
    /// elapsed time is treated as zero.
    pub fn retrievability(&self, stability: f64, elapsed_days: f64) -> f64 {
        if stability <= 0.0 {
            return 0.0;
        }
        let elapsed = elapsed_days.max(0.0);
        (self.params.reference_retention.ln() * elapsed / stability).exp()
    }

    /// Retrievability of a stored state at `now`.
    ///
    /// A state that was never reviewed has nothing to forget and reports 1.0.
    pub fn retrievability_at(&self, state: &MemoryState, now: DateTime<Utc>) -> f64 {
        match state.elapsed_days(now) {
            Some(elapsed) => self.retrievability(state.stability, elapsed),
            None => 1.0,
        }
    }

    /// Days until the next review.
    ///
    /// Grows strictly with stability and shrinks as difficulty rises. Never
    /// returns less than `min_interval_days`; a non-positive stability maps
    /// straight to that floor.
    pub fn next_interval_days(&self, stability: f64, difficulty: f64) -> f64 {
        let floor = self.params.min_interval_days;
        if stability <= 0.0 {
            return floor;
        }

        let p = &self.params;
        let span = p.max_difficulty - p.min_difficulty;
        let d = ((difficulty - p.min_difficulty) / span).clamp(0.0, 1.0);

        let raw = stability
            * (p.interval_difficulty_weight * (1.0 - d)).exp()
            * (d + 2.0).ln()
            * p.interval_scale;

        raw.max(floor)
    }

    /// Instant the item falls due, `interval_days` after `reviewed_at`.
    pub fn due_at(&self, reviewed_at: DateTime<Utc>, interval_days: f64) -> DateTime<Utc> {
        let millis = (interval_days * MILLIS_PER_DAY).round() as i64;
        reviewed_at + Duration::milliseconds(millis)
    }
}

impl Default for DecayModel {
    fn default() -> Self {
        Self::new(SchedulerParams::default())
    }
}
