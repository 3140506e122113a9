//! Property-based tests for series alignment and averaging
//!
//! - Test mathematical invariants of interpolation and group means
//! - Run with ProptestConfig::with_cases(100)

use proptest::prelude::*;
use run_scorer::series::{interpolated_mean, mean_by_time, time_axis, ScoreSeries};
use run_scorer::ScoreTable;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Generate a series with up to `max_len` distinct times in 0..10_000
fn arb_series(max_len: usize) -> impl Strategy<Value = ScoreSeries> {
    proptest::collection::btree_map(0i64..10_000, -100.0f64..100.0, 1..=max_len)
        .prop_map(ScoreSeries::from_map)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: series times are strictly ascending
    #[test]
    fn prop_series_strictly_ascending(points in proptest::collection::vec((0i64..1000, -1.0f64..1.0), 0..50)) {
        let series: ScoreSeries = points.into_iter().collect();
        let times: Vec<i64> = series.times().collect();
        prop_assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    /// Property: a single-member group average equals the member
    /// (after reindexing onto the global axis)
    #[test]
    fn prop_single_member_unchanged(series in arb_series(30), other in arb_series(30)) {
        prop_assert_eq!(mean_by_time([&series]), series.clone());
        prop_assert_eq!(interpolated_mean(&time_axis([&series]), [&series]), series.clone());

        let axis = time_axis([&series, &other]);
        let avg = interpolated_mean(&axis, [&series]);
        for p in series.points() {
            prop_assert_eq!(avg.value_at(p.time), Some(p.score));
        }
        for q in avg.points() {
            prop_assert_eq!(series.interpolate_at(q.time), Some(q.score));
        }
    }

    /// Property: identical time points average to the arithmetic mean
    #[test]
    fn prop_identical_times_arithmetic_mean(
        base in arb_series(30),
        offset in -50.0f64..50.0
    ) {
        let shifted: ScoreSeries = base.points().iter().map(|p| (p.time, p.score + offset)).collect();
        let axis = time_axis([&base, &shifted]);
        let avg = interpolated_mean(&axis, [&base, &shifted]);

        prop_assert_eq!(avg.len(), base.len());
        for p in base.points() {
            let expected = (p.score + (p.score + offset)) / 2.0;
            let actual = avg.value_at(p.time).unwrap();
            prop_assert!((actual - expected).abs() < 1e-9);
        }
    }

    /// Property: interpolated values stay between neighbouring observations
    #[test]
    fn prop_interpolation_bounded(series in arb_series(20), t in 0i64..10_000) {
        if let Some(v) = series.interpolate_at(t) {
            let lo = series.points().iter().filter(|p| p.time <= t).last().unwrap();
            let hi = series.points().iter().find(|p| p.time >= t).unwrap_or(lo);
            let (min, max) = if lo.score <= hi.score { (lo.score, hi.score) } else { (hi.score, lo.score) };
            prop_assert!(v >= min - 1e-9 && v <= max + 1e-9);
        }
    }

    /// Property: nothing before a run's first observation; its last score
    /// carries forward to every later axis time
    #[test]
    fn prop_leading_dropped_trailing_carried(series in arb_series(20), other in arb_series(20)) {
        let axis = time_axis([&series, &other]);
        let first = series.points().first().unwrap();
        let last = series.points().last().unwrap();
        let avg = interpolated_mean(&axis, [&series]);
        prop_assert!(avg.times().all(|t| t >= first.time));
        for &t in axis.iter().filter(|&&t| t >= last.time) {
            prop_assert_eq!(avg.value_at(t), Some(last.score));
        }
    }

    /// Property: step limit removes every later time
    #[test]
    fn prop_step_limit(series in arb_series(30), limit in 0i64..10_000) {
        let table = ScoreTable::merge([("g", &series)], Some(limit)).unwrap();
        prop_assert!(table.times().values().iter().all(|&t| t <= limit));
    }

    /// Property: merged table times are sorted and unique
    #[test]
    fn prop_merge_sorted_unique(a in arb_series(20), b in arb_series(20)) {
        let table = ScoreTable::merge([("a", &a), ("b", &b)], None).unwrap();
        let times = table.times().values().to_vec();
        prop_assert!(times.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(times, time_axis([&a, &b]));
    }
}
