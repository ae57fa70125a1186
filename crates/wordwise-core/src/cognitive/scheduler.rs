//! Review scheduler.
//!
//! Ties the decay model, update policy and due selector to the persistent
//! store. This is the only component with side effects.

use crate::cognitive::decay::DecayModel;
use crate::cognitive::selector::{DueSelector, Selection};
use crate::cognitive::store::ReviewStore;
use crate::cognitive::update::UpdatePolicy;
use crate::config::{SchedulerParams, WordwiseConfig};
use crate::error::{WordwiseError, WordwiseResult};
use crate::types::{Item, MemoryState, Rating, ReviewOutcome, ReviewStats};
use chrono::{DateTime, SubsecRound, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Spaced-repetition scheduler over a [`ReviewStore`].
///
/// Reviews of the same item are serialized by the store's transaction, so
/// concurrent submissions never lose an update.
pub struct ReviewScheduler {
    store: ReviewStore,
    decay: DecayModel,
    policy: UpdatePolicy,
    selector: DueSelector,
    rng: Mutex<StdRng>,
}

impl ReviewScheduler {
    /// Create a scheduler over `store` with validated parameters.
    ///
    /// New-item selection is seeded from entropy; see [`Self::with_seed`].
    pub fn new(store: ReviewStore, params: SchedulerParams) -> WordwiseResult<Self> {
        params.validate()?;
        Ok(Self {
            store,
            decay: DecayModel::new(params.clone()),
            policy: UpdatePolicy::new(params),
            selector: DueSelector::new(),
            rng: Mutex::new(StdRng::from_entropy()),
        })
    }

    /// Open the configured store and build a scheduler over it.
    pub fn from_config(config: &WordwiseConfig) -> WordwiseResult<Self> {
        let store = ReviewStore::open(&config.store)?;
        let scheduler = Self::new(store, config.scheduler.clone())?;
        Ok(match config.selection.seed {
            Some(seed) => scheduler.with_seed(seed),
            None => scheduler,
        })
    }

    /// Scheduler over a fresh in-memory store with default parameters.
    pub fn in_memory() -> WordwiseResult<Self> {
        Self::new(ReviewStore::in_memory()?, SchedulerParams::default())
    }

    /// Make new-item selection reproducible.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    pub fn store(&self) -> &ReviewStore {
        &self.store
    }

    pub fn params(&self) -> &SchedulerParams {
        self.policy.params()
    }

    pub fn decay_model(&self) -> &DecayModel {
        &self.decay
    }

    pub fn update_policy(&self) -> &UpdatePolicy {
        &self.policy
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// Record a review given as a raw integer rating.
    ///
    /// Ratings outside 1..=4 fail with `InvalidRating` before any state is
    /// read or written.
    pub fn submit_review(
        &self,
        item_key: &str,
        rating: i64,
        now: DateTime<Utc>,
    ) -> WordwiseResult<ReviewOutcome> {
        let rating = Rating::from_value(rating)?;
        self.submit_rating(item_key, rating, now)
    }

    /// Record a review.
    ///
    /// Loads (or lazily creates) the item's state, applies the update policy,
    /// schedules the next review and persists the result atomically.
    pub fn submit_rating(
        &self,
        item_key: &str,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> WordwiseResult<ReviewOutcome> {
        // Stored timestamps carry microseconds.
        let now = now.trunc_subsecs(6);

        let mut computed = None;
        self.store.transact_review(item_key, |prior| {
            let outcome = self.compute_review(item_key, prior, rating, now)?;
            let state = outcome.state.clone();
            computed = Some(outcome);
            Ok(state)
        })?;

        let outcome =
            computed.ok_or_else(|| WordwiseError::internal("review committed without an outcome"))?;

        info!(
            item_key,
            rating = %rating,
            stability = outcome.state.stability,
            difficulty = outcome.state.difficulty,
            next_review_at = %outcome.next_review_at,
            review_count = outcome.state.review_count,
            "Recorded review"
        );

        Ok(outcome)
    }

    fn compute_review(
        &self,
        item_key: &str,
        prior: Option<&MemoryState>,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> WordwiseResult<ReviewOutcome> {
        let scheduled = prior.filter(|s| !s.is_new());

        if let Some(last) = scheduled.and_then(|s| s.last_review_at) {
            if now < last {
                warn!(
                    item_key,
                    last_review_at = %last,
                    now = %now,
                    "Review predates the previous one; treating elapsed time as zero"
                );
            }
        }

        let retrievability = scheduled
            .map(|s| self.decay.retrievability_at(s, now))
            .unwrap_or(1.0);
        let update = self.policy.update(prior, rating, retrievability);
        let interval_days = self.decay.next_interval_days(update.stability, update.difficulty);

        ensure_finite("retrievability", retrievability)?;
        ensure_finite("stability", update.stability)?;
        ensure_finite("difficulty", update.difficulty)?;
        ensure_finite("interval", interval_days)?;

        let next_review_at = self.decay.due_at(now, interval_days);

        debug!(
            item_key,
            retrievability,
            interval_days,
            first_review = scheduled.is_none(),
            "Computed review update"
        );

        let state = MemoryState {
            item_key: item_key.to_string(),
            stability: update.stability,
            difficulty: update.difficulty,
            last_review_at: Some(now),
            next_review_at: Some(next_review_at),
            review_count: update.review_count,
            total_reviews: update.total_reviews,
            consecutive_correct: update.consecutive_correct,
        };

        Ok(ReviewOutcome {
            state,
            rating,
            next_review_at,
            interval_days,
            retrievability,
        })
    }

    /// Return an item to "new" status.
    ///
    /// Idempotent: returns whether there was a state to clear.
    pub fn reset_memory(&self, item_key: &str) -> WordwiseResult<bool> {
        let existed = self.store.delete_state(item_key)?;
        if existed {
            info!(item_key, "Reset memory state");
        } else {
            debug!(item_key, "No memory state to reset");
        }
        Ok(existed)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Next item to present, or `None` if the catalog is empty.
    pub fn get_next_item(&self, now: DateTime<Utc>) -> WordwiseResult<Option<Item>> {
        Ok(self.select_next(now)?.map(|selection| selection.item))
    }

    /// Like [`Self::get_next_item`], also reporting why the item was chosen.
    pub fn select_next(&self, now: DateTime<Utc>) -> WordwiseResult<Option<Selection>> {
        let mut rng = self.lock_rng()?;
        self.selector.select(&self.store, now, &mut *rng)
    }

    /// Select the next item with a caller-provided random source.
    pub fn next_item_with_rng<R: Rng + ?Sized>(
        &self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> WordwiseResult<Option<Selection>> {
        self.selector.select(&self.store, now, rng)
    }

    /// Items due at `now`, oldest due first.
    pub fn get_due_items(&self, now: DateTime<Utc>, limit: usize) -> WordwiseResult<Vec<Item>> {
        self.store.due_items(now, limit)
    }

    pub fn due_count(&self, now: DateTime<Utc>) -> WordwiseResult<u64> {
        self.store.due_count(now)
    }

    pub fn get_stats(&self, now: DateTime<Utc>) -> WordwiseResult<ReviewStats> {
        self.store.stats(now)
    }

    /// Random sample of up to `limit` reviewed items with difficulty in
    /// `[min, max]`.
    pub fn get_items_by_difficulty(
        &self,
        min: f64,
        max: f64,
        limit: usize,
    ) -> WordwiseResult<Vec<Item>> {
        if !(min.is_finite() && max.is_finite()) || min > max {
            return Err(WordwiseError::validation(format!(
                "invalid difficulty range [{}, {}]",
                min, max
            )));
        }

        let mut items = self.store.items_by_difficulty(min, max)?;
        let mut rng = self.lock_rng()?;
        items.shuffle(&mut *rng);
        items.truncate(limit);
        Ok(items)
    }

    pub fn memory_state(&self, item_key: &str) -> WordwiseResult<Option<MemoryState>> {
        self.store.get_state(item_key)
    }

    /// Current recall probability, or `None` for an item without memory.
    pub fn retrievability(&self, item_key: &str, now: DateTime<Utc>) -> WordwiseResult<Option<f64>> {
        Ok(self
            .store
            .get_state(item_key)?
            .filter(|s| !s.is_new())
            .map(|s| self.decay.retrievability_at(&s, now)))
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    pub fn add_item(&self, item: &Item) -> WordwiseResult<()> {
        self.store.upsert_item(item)?;
        debug!(item_key = %item.key, "Added item");
        Ok(())
    }

    pub fn add_items(&self, items: &[Item]) -> WordwiseResult<usize> {
        self.store.upsert_items(items)
    }

    pub fn get_item(&self, item_key: &str) -> WordwiseResult<Option<Item>> {
        self.store.get_item(item_key)
    }

    /// Remove an item and its memory state.
    pub fn remove_item(&self, item_key: &str) -> WordwiseResult<bool> {
        let removed = self.store.remove_item(item_key)?;
        if removed {
            info!(item_key, "Removed item");
        }
        Ok(removed)
    }

    pub fn item_count(&self) -> WordwiseResult<u64> {
        self.store.item_count()
    }

    fn lock_rng(&self) -> WordwiseResult<MutexGuard<'_, StdRng>> {
        self.rng
            .lock()
            .map_err(|e| WordwiseError::internal(format!("selection rng poisoned: {}", e)))
    }
}

fn ensure_finite(name: &str, value: f64) -> WordwiseResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(WordwiseError::internal(format!(
            "{} is not a finite number ({})",
            name, value
        )))
    }
}
