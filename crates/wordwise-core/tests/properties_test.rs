//! Property-based tests for the memory model.
//!
//! - Clamping: stability and difficulty always stay in bounds
//! - Monotonicity: intervals grow with stability and shrink with difficulty
//! - Rating ordering: Easy >= Good >= Hard, Again always resets

use proptest::prelude::*;
use wordwise_core::{DecayModel, MemoryState, Rating, SchedulerParams, UpdatePolicy};

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_rating() -> impl Strategy<Value = Rating> {
    prop_oneof![
        Just(Rating::Again),
        Just(Rating::Hard),
        Just(Rating::Good),
        Just(Rating::Easy),
    ]
}

fn arb_stability() -> impl Strategy<Value = f64> {
    prop_oneof![0.0f64..=1.0, 0.1f64..=100.0, 100.0f64..=1.0e6]
}

fn arb_difficulty() -> impl Strategy<Value = f64> {
    -5.0f64..=20.0
}

fn arb_retrievability() -> impl Strategy<Value = f64> {
    (0u64..=1000u64).prop_map(|v| v as f64 / 1000.0)
}

fn scheduled_state(stability: f64, difficulty: f64) -> MemoryState {
    let now = chrono::Utc::now();
    MemoryState {
        item_key: "item".to_string(),
        stability,
        difficulty,
        last_review_at: Some(now),
        next_review_at: Some(now),
        review_count: 2,
        total_reviews: 2,
        consecutive_correct: 1,
    }
}

proptest! {
    #[test]
    fn prop_update_output_is_clamped(
        s in arb_stability(),
        d in arb_difficulty(),
        rating in arb_rating(),
        r in arb_retrievability(),
        first_review in any::<bool>(),
    ) {
        let params = SchedulerParams::default();
        let policy = UpdatePolicy::new(params.clone());
        let prior = scheduled_state(s, d);
        let update = policy.update((!first_review).then_some(&prior), rating, r);

        prop_assert!(update.stability >= params.min_stability);
        prop_assert!(update.stability <= params.max_stability);
        prop_assert!(update.difficulty >= params.min_difficulty);
        prop_assert!(update.difficulty <= params.max_difficulty);
    }

    #[test]
    fn prop_interval_at_least_floor(s in -10.0f64..=1.0e5, d in arb_difficulty()) {
        let model = DecayModel::default();
        let interval = model.next_interval_days(s, d);
        prop_assert!(interval.is_finite());
        prop_assert!(interval >= 1.0);
    }

    // Above S = 1.5 the raw interval clears the 1-day floor at every
    // difficulty (at D = 10 it is about 0.75 * S), so growth is strict there.
    #[test]
    fn prop_interval_strictly_increases_with_stability(
        s1 in 1.5f64..=36_500.0,
        delta in 1.0e-3f64..=1_000.0,
        d in 1.0f64..=10.0,
    ) {
        let model = DecayModel::default();
        let s2 = s1 + delta;
        prop_assert!(model.next_interval_days(s1, d) < model.next_interval_days(s2, d));
    }

    // Below that the floor flattens the curve: intervals never shrink as
    // stability grows, but neighbouring stabilities may share the 1-day floor.
    #[test]
    fn prop_interval_non_decreasing_across_floor(
        s1 in -1.0f64..=1.5,
        delta in 0.0f64..=2.0,
        d in 1.0f64..=10.0,
    ) {
        let model = DecayModel::default();
        let low = model.next_interval_days(s1, d);
        let high = model.next_interval_days(s1 + delta, d);
        prop_assert!(low <= high);
        if s1 <= 0.5 {
            prop_assert_eq!(low, 1.0);
        }
    }

    #[test]
    fn prop_interval_non_increasing_with_difficulty(
        s in 0.1f64..=36_500.0,
        d2 in 1.0f64..=10.0,
        delta in 1.0e-3f64..=9.0,
    ) {
        let model = DecayModel::default();
        let d1 = d2 + delta;
        prop_assert!(model.next_interval_days(s, d1) <= model.next_interval_days(s, d2));
    }

    #[test]
    fn prop_rating_ordering(
        s in 0.1f64..=36_500.0,
        d in 1.0f64..=10.0,
        r in arb_retrievability(),
    ) {
        let policy = UpdatePolicy::default();
        let hard = policy.next_stability(s, d, Rating::Hard, r);
        let good = policy.next_stability(s, d, Rating::Good, r);
        let easy = policy.next_stability(s, d, Rating::Easy, r);
        let again = policy.next_stability(s, d, Rating::Again, r);

        prop_assert!(easy >= good);
        prop_assert!(good >= hard);
        prop_assert_eq!(again, policy.params().reset_stability);
    }

    #[test]
    fn prop_successful_review_never_shrinks_stability(
        s in 0.1f64..=36_500.0,
        d in 1.0f64..=10.0,
        r in arb_retrievability(),
        rating in prop_oneof![Just(Rating::Hard), Just(Rating::Good), Just(Rating::Easy)],
    ) {
        let policy = UpdatePolicy::default();
        prop_assert!(policy.next_stability(s, d, rating, r) >= s);
    }

    #[test]
    fn prop_retrievability_in_unit_interval(s in arb_stability(), t in -10.0f64..=1.0e5) {
        let model = DecayModel::default();
        let r = model.retrievability(s, t);
        prop_assert!((0.0..=1.0).contains(&r));
    }

    #[test]
    fn prop_rating_roundtrips_through_value(v in 1i64..=4) {
        let rating = Rating::from_value(v).unwrap();
        prop_assert_eq!(i64::from(rating.value()), v);
    }

    #[test]
    fn prop_rating_rejects_out_of_range(v in prop_oneof![i64::MIN..=0, 5i64..=i64::MAX]) {
        prop_assert!(Rating::from_value(v).is_err());
    }
}
