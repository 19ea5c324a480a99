//! Decile bucketing and long-short spread analysis.
//!
//! A day's cross-sectional sample is sorted by feature value and split into
//! ten ordered buckets. Uneven bucket sizes are expected when n is not a
//! multiple of ten. The spread is the mean target of the top bucket minus
//! the mean target of the bottom bucket.

use serde::{Deserialize, Serialize};

use ronda_traits::stats;
use ronda_traits::Date;

/// Number of buckets per day.
pub const BUCKETS: usize = 10;

/// Smallest cross-sectional sample that supports decile bucketing.
pub const MIN_SAMPLE: usize = 10;

/// Decile bucket means for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecileDay {
    /// Observation date.
    pub date: Date,
    /// Mean target value per bucket, ascending by feature value.
    pub buckets: [Option<f64>; BUCKETS],
    /// Top-minus-bottom bucket mean.
    pub spread: Option<f64>,
    /// Sample size behind the bucketing.
    pub n: usize,
}

/// Per-bucket means aggregated across days.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecileCurve {
    /// Each bucket's per-day mean averaged over the days where the bucket
    /// had at least one member.
    pub buckets: [Option<f64>; BUCKETS],
    /// Aggregated top-minus-bottom spread, present only when both end
    /// buckets had at least one contributing day.
    pub spread: Option<f64>,
    /// Number of days that contributed at least one bucket.
    pub days: usize,
}

/// Bucket one day's (feature, target) sample into deciles.
///
/// Pairs are sorted ascending by feature value; the pair at ordinal
/// position `i` lands in bucket `min(9, i * 10 / n)`, so every day yields
/// exactly ten buckets regardless of n. Days with fewer than
/// [`MIN_SAMPLE`] pairs produce no bucketing.
#[must_use]
pub fn bucket_day(date: Date, pairs: &[(f64, f64)]) -> Option<DecileDay> {
    let n = pairs.len();
    if n < MIN_SAMPLE {
        return None;
    }

    let mut sorted = pairs.to_vec();
    sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut sums = [0.0f64; BUCKETS];
    let mut counts = [0usize; BUCKETS];
    for (i, (_, target)) in sorted.iter().enumerate() {
        let bucket = (i * BUCKETS / n).min(BUCKETS - 1);
        sums[bucket] += target;
        counts[bucket] += 1;
    }

    let mut buckets = [None; BUCKETS];
    for b in 0..BUCKETS {
        if counts[b] > 0 {
            buckets[b] = Some(sums[b] / counts[b] as f64);
        }
    }

    let spread = match (buckets[BUCKETS - 1], buckets[0]) {
        (Some(top), Some(bottom)) => Some(top - bottom),
        _ => None,
    };

    Some(DecileDay {
        date,
        buckets,
        spread,
        n,
    })
}

/// Average per-bucket means across days.
///
/// A bucket's aggregate covers only the days where it had members; the
/// aggregated spread exists only when buckets 0 and 9 each contributed on
/// at least one day.
#[must_use]
pub fn aggregate(days: &[DecileDay]) -> DecileCurve {
    let mut per_bucket: [Vec<f64>; BUCKETS] = Default::default();
    for day in days {
        for (b, value) in day.buckets.iter().enumerate() {
            if let Some(v) = value {
                per_bucket[b].push(*v);
            }
        }
    }

    let mut buckets = [None; BUCKETS];
    for b in 0..BUCKETS {
        buckets[b] = stats::mean(&per_bucket[b]);
    }

    let spread = match (buckets[BUCKETS - 1], buckets[0]) {
        (Some(top), Some(bottom)) => Some(top - bottom),
        _ => None,
    };

    DecileCurve {
        buckets,
        spread,
        days: days.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date() -> Date {
        Date::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn test_hundred_sorted_pairs_fill_ten_even_buckets() {
        // Target monotonically increasing in feature value.
        let pairs: Vec<(f64, f64)> = (0..100).map(|i| (i as f64, i as f64 / 100.0)).collect();
        let day = bucket_day(date(), &pairs).unwrap();

        assert!(day.buckets.iter().all(|b| b.is_some()));
        // Bucket 0 holds targets 0.00..=0.09, mean 0.045.
        assert_relative_eq!(day.buckets[0].unwrap(), 0.045, epsilon = 1e-12);
        assert_relative_eq!(day.buckets[9].unwrap(), 0.945, epsilon = 1e-12);
        assert!(day.buckets[9].unwrap() >= day.buckets[0].unwrap());
        assert_relative_eq!(day.spread.unwrap(), 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_uneven_sample_still_yields_ten_buckets() {
        let pairs: Vec<(f64, f64)> = (0..13).map(|i| (i as f64, i as f64)).collect();
        let day = bucket_day(date(), &pairs).unwrap();
        assert!(day.buckets.iter().all(|b| b.is_some()));
        assert!(day.spread.is_some());
    }

    #[test]
    fn test_small_sample_produces_no_bucketing() {
        let pairs: Vec<(f64, f64)> = (0..9).map(|i| (i as f64, i as f64)).collect();
        assert!(bucket_day(date(), &pairs).is_none());
    }

    #[test]
    fn test_bucketing_ignores_input_order() {
        let mut pairs: Vec<(f64, f64)> = (0..50).map(|i| (i as f64, i as f64)).collect();
        let sorted = bucket_day(date(), &pairs).unwrap();
        pairs.reverse();
        let reversed = bucket_day(date(), &pairs).unwrap();
        assert_eq!(sorted, reversed);
    }

    #[test]
    fn test_aggregate_averages_contributing_days() {
        let pairs_a: Vec<(f64, f64)> = (0..20).map(|i| (i as f64, 1.0)).collect();
        let pairs_b: Vec<(f64, f64)> = (0..20).map(|i| (i as f64, 3.0)).collect();
        let days = vec![
            bucket_day(date(), &pairs_a).unwrap(),
            bucket_day(date() + chrono::Days::new(1), &pairs_b).unwrap(),
        ];

        let curve = aggregate(&days);
        assert_eq!(curve.days, 2);
        for bucket in &curve.buckets {
            assert_relative_eq!(bucket.unwrap(), 2.0, epsilon = 1e-12);
        }
        assert_relative_eq!(curve.spread.unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_aggregate_of_no_days_is_empty() {
        let curve = aggregate(&[]);
        assert!(curve.buckets.iter().all(|b| b.is_none()));
        assert!(curve.spread.is_none());
        assert_eq!(curve.days, 0);
    }
}
