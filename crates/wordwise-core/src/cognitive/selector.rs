//! Next-item selection.
//!
//! Priority is strict: overdue items first (oldest due, then key), then a
//! uniformly random never-reviewed item, then the earliest scheduled item
//! even if it is not yet due. An empty catalog yields `None`.

use crate::error::WordwiseResult;
use crate::types::{Item, MemoryState};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Why an item was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SelectionReason {
    /// `next_review_at` is at or before now.
    Due,
    /// The item has never been reviewed.
    New,
    /// Nothing is due and nothing is new; this is the next item to fall due.
    Early,
}

/// An item picked for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub item: Item,
    pub reason: SelectionReason,
}

/// Queries the selector needs from wherever states live.
///
/// New items are addressed by position in ascending key order so the random
/// pick is reproducible for a given RNG seed.
pub trait SelectionSource {
    /// Item with the smallest `next_review_at <= now`, ties by key.
    fn oldest_due(&self, now: DateTime<Utc>) -> WordwiseResult<Option<Item>>;

    /// Pick one item without a scheduled memory state.
    ///
    /// `choose` receives the number of new items (always > 0) and returns an
    /// index below it; the item at that position in key order is returned.
    /// Counting and fetching must observe the same snapshot, so a pick never
    /// misses while new items remain.
    fn pick_new(&self, choose: &mut dyn FnMut(u64) -> u64) -> WordwiseResult<Option<Item>>;

    /// Item with the smallest `next_review_at` overall, ties by key.
    fn earliest_scheduled(&self) -> WordwiseResult<Option<Item>>;
}

/// Applies the selection priority to a [`SelectionSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DueSelector;

impl DueSelector {
    pub fn new() -> Self {
        Self
    }

    /// Pick the next item, or `None` when there is nothing to present.
    pub fn select<S, R>(
        &self,
        source: &S,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> WordwiseResult<Option<Selection>>
    where
        S: SelectionSource + ?Sized,
        R: Rng + ?Sized,
    {
        if let Some(item) = source.oldest_due(now)? {
            return Ok(Some(Selection {
                item,
                reason: SelectionReason::Due,
            }));
        }

        if let Some(item) = source.pick_new(&mut |count: u64| rng.gen_range(0..count))? {
            return Ok(Some(Selection {
                item,
                reason: SelectionReason::New,
            }));
        }

        Ok(source.earliest_scheduled()?.map(|item| Selection {
            item,
            reason: SelectionReason::Early,
        }))
    }
}

/// In-memory [`SelectionSource`] over items joined with their states.
///
/// Useful when the caller already holds the candidate set, and in tests.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    entries: Vec<(Item, Option<MemoryState>)>,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item with its (optional) memory state.
    pub fn push(&mut self, item: Item, state: Option<MemoryState>) {
        self.entries.push((item, state));
    }

    /// Builder-style [`CandidatePool::push`].
    pub fn with(mut self, item: Item, state: Option<MemoryState>) -> Self {
        self.push(item, state);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn scheduled(&self) -> impl Iterator<Item = (&Item, DateTime<Utc>)> {
        self.entries
            .iter()
            .filter_map(|(item, state)| state.as_ref()?.next_review_at.map(|at| (item, at)))
    }

    fn earliest<'a>(
        candidates: impl Iterator<Item = (&'a Item, DateTime<Utc>)>,
    ) -> Option<Item> {
        candidates
            .min_by(|(a, at_a), (b, at_b)| at_a.cmp(at_b).then_with(|| a.key.cmp(&b.key)))
            .map(|(item, _)| item.clone())
    }

    fn new_items(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self
            .entries
            .iter()
            .filter(|(_, state)| state.as_ref().map_or(true, MemoryState::is_new))
            .map(|(item, _)| item)
            .collect();
        items.sort_by(|a, b| a.key.cmp(&b.key));
        items
    }
}

impl FromIterator<(Item, Option<MemoryState>)> for CandidatePool {
    fn from_iter<T: IntoIterator<Item = (Item, Option<MemoryState>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl SelectionSource for CandidatePool {
    fn oldest_due(&self, now: DateTime<Utc>) -> WordwiseResult<Option<Item>> {
        Ok(Self::earliest(self.scheduled().filter(|(_, at)| *at <= now)))
    }

    fn pick_new(&self, choose: &mut dyn FnMut(u64) -> u64) -> WordwiseResult<Option<Item>> {
        let items = self.new_items();
        if items.is_empty() {
            return Ok(None);
        }
        let index = clamp_index(choose(items.len() as u64), items.len());
        Ok(items.get(index).map(|item| (*item).clone()))
    }

    fn earliest_scheduled(&self) -> WordwiseResult<Option<Item>> {
        Ok(Self::earliest(self.scheduled()))
    }
}

/// Keep a chosen position inside `0..len` (`len > 0`).
pub(crate) fn clamp_index(index: u64, len: usize) -> usize {
    usize::try_from(index).map_or(len - 1, |i| i.min(len - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap()
    }

    fn scheduled(key: &str, next: DateTime<Utc>) -> (Item, Option<MemoryState>) {
        let state = MemoryState {
            item_key: key.to_string(),
            stability: 3.0,
            difficulty: 5.0,
            last_review_at: Some(next - Duration::days(3)),
            next_review_at: Some(next),
            review_count: 1,
            total_reviews: 1,
            consecutive_correct: 1,
        };
        (Item::new(key, key), Some(state))
    }

    fn fresh(key: &str) -> (Item, Option<MemoryState>) {
        (Item::new(key, key), None)
    }

    fn pick(pool: &CandidatePool, seed: u64) -> Option<Selection> {
        let mut rng = StdRng::seed_from_u64(seed);
        DueSelector::new().select(pool, now(), &mut rng).unwrap()
    }

    #[test]
    fn test_oldest_due_first() {
        let t = now();
        let pool: CandidatePool = vec![
            scheduled("b", t - Duration::hours(1)),
            scheduled("c", t + Duration::hours(1)),
            scheduled("a", t - Duration::hours(2)),
            fresh("z"),
        ]
        .into_iter()
        .collect();

        let selection = pick(&pool, 1).unwrap();
        assert_eq!(selection.item.key, "a");
        assert_eq!(selection.reason, SelectionReason::Due);
    }

    #[test]
    fn test_due_ties_broken_by_key() {
        let t = now() - Duration::minutes(5);
        let pool: CandidatePool = vec![scheduled("pear", t), scheduled("fig", t)]
            .into_iter()
            .collect();

        assert_eq!(pick(&pool, 3).unwrap().item.key, "fig");
    }

    #[test]
    fn test_due_at_exactly_now() {
        let (item, state) = scheduled("x", now());
        let pool = CandidatePool::new().with(item, state);
        assert_eq!(pick(&pool, 0).unwrap().reason, SelectionReason::Due);
    }

    #[test]
    fn test_new_before_not_due() {
        let pool: CandidatePool = vec![scheduled("b", now() + Duration::days(1)), fresh("a")]
            .into_iter()
            .collect();

        let selection = pick(&pool, 9).unwrap();
        assert_eq!(selection.item.key, "a");
        assert_eq!(selection.reason, SelectionReason::New);
    }

    #[test]
    fn test_early_fallback() {
        let t = now();
        let pool: CandidatePool = vec![
            scheduled("later", t + Duration::days(3)),
            scheduled("soon", t + Duration::hours(2)),
        ]
        .into_iter()
        .collect();

        let selection = pick(&pool, 0).unwrap();
        assert_eq!(selection.item.key, "soon");
        assert_eq!(selection.reason, SelectionReason::Early);
    }

    #[test]
    fn test_empty_universe() {
        assert!(pick(&CandidatePool::new(), 0).is_none());
    }

    #[test]
    fn test_unscheduled_state_counts_as_new() {
        let (item, state) = scheduled("reset", now() - Duration::days(1));
        let mut state = state.unwrap();
        state.next_review_at = None;
        let pool = CandidatePool::new().with(item, Some(state));

        let selection = pick(&pool, 0).unwrap();
        assert_eq!(selection.reason, SelectionReason::New);
    }

    #[test]
    fn test_new_selection_reproducible_with_seed() {
        let pool: CandidatePool = ["k1", "k2", "k3", "k4", "k5", "k6"]
            .into_iter()
            .map(fresh)
            .collect();

        for seed in 0..20 {
            assert_eq!(pick(&pool, seed), pick(&pool, seed));
        }
    }

    #[test]
    fn test_new_selection_covers_all_new_items() {
        let pool: CandidatePool = ["k1", "k2", "k3"].into_iter().map(fresh).collect();
        let seen: HashSet<String> = (0..200).filter_map(|seed| pick(&pool, seed)).map(|s| s.item.key).collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_out_of_range_choice_is_clamped() {
        let pool: CandidatePool = ["k1", "k2"].into_iter().map(fresh).collect();
        let item = pool.pick_new(&mut |count: u64| count + 5).unwrap().unwrap();
        assert_eq!(item.key, "k2");
        assert_eq!(clamp_index(u64::MAX, 3), 2);
    }

    #[test]
    fn test_pick_new_without_new_items() {
        let pool = CandidatePool::new().with(Item::new("x", "x"), scheduled("x", now()).1);
        let mut called = false;
        let picked = pool
            .pick_new(&mut |_: u64| {
                called = true;
                0
            })
            .unwrap();
        assert!(picked.is_none());
        assert!(!called);
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(SelectionReason::Early.to_string(), "early");
    }
}
