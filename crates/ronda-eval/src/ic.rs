//! Information Coefficient (IC) calculations.
//!
//! The IC for one day is the cross-sectional correlation between a feature's
//! values and the realized forward returns across a universe of instruments.
//! Two interchangeable methods are supported: Pearson on raw values and
//! Spearman on average-tie ranks.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use ronda_traits::stats;
use ronda_traits::{CorrMethod, Date};

/// Calculate the Information Coefficient between feature values and forward
/// returns.
///
/// Non-finite pairs are dropped before correlating. The result is `None`
/// when the inputs differ in length, fewer than two finite pairs remain, or
/// either side has zero variance. It is never coerced to zero, so downstream
/// averages stay unbiased.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use ronda_eval::calculate_ic;
/// use ronda_traits::CorrMethod;
///
/// let values = array![1.5, 0.3, -0.8, 2.1];
/// let returns = array![0.02, 0.01, -0.01, 0.03];
/// let ic = calculate_ic(&values, &returns, CorrMethod::Spearman).unwrap();
/// assert!(ic > 0.99);
/// ```
#[must_use]
pub fn calculate_ic(
    feature_values: &Array1<f64>,
    forward_returns: &Array1<f64>,
    method: CorrMethod,
) -> Option<f64> {
    if feature_values.len() != forward_returns.len() {
        return None;
    }

    let pairs: Vec<(f64, f64)> = feature_values
        .iter()
        .zip(forward_returns.iter())
        .filter(|(f, r)| f.is_finite() && r.is_finite())
        .map(|(&f, &r)| (f, r))
        .collect();

    ic_from_pairs(&pairs, method)
}

/// IC over an already-assembled cross-sectional sample.
#[must_use]
pub fn ic_from_pairs(pairs: &[(f64, f64)], method: CorrMethod) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }

    let features: Vec<f64> = pairs.iter().map(|(f, _)| *f).collect();
    let returns: Vec<f64> = pairs.iter().map(|(_, r)| *r).collect();

    match method {
        CorrMethod::Pearson => stats::pearson(&features, &returns),
        CorrMethod::Spearman => stats::spearman(&features, &returns),
    }
}

/// One day's realized IC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyIc {
    /// Observation date.
    pub date: Date,
    /// Realized IC, or `None` when the day had no qualifying sample.
    pub ic: Option<f64>,
    /// Number of (feature, target) pairs behind the IC.
    pub n: usize,
}

/// Aggregate statistics over a daily IC series.
///
/// A day without a realized IC is absent from the aggregation, not
/// zero-filled. Every statistic is `None` whenever its preconditions are
/// unmet (fewer than two days for the std, zero std for IR and t-stat).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IcSummary {
    /// Mean of the realized daily ICs.
    pub mean: Option<f64>,
    /// Sample standard deviation (Bessel-corrected) of the daily ICs.
    pub std: Option<f64>,
    /// Information ratio: mean / std.
    pub ir: Option<f64>,
    /// t-statistic: mean / (std / sqrt(days)).
    pub t_stat: Option<f64>,
    /// Share of realized daily ICs that are positive.
    pub hit_rate: Option<f64>,
    /// Number of days with a realized IC.
    pub days: usize,
}

impl IcSummary {
    /// Aggregate a daily IC series.
    #[must_use]
    pub fn from_daily(daily: &[DailyIc]) -> Self {
        let realized: Vec<f64> = daily.iter().filter_map(|d| d.ic).collect();
        let days = realized.len();

        let mean = stats::mean(&realized);
        let std = stats::sample_std(&realized);

        let ir = match (mean, std) {
            (Some(m), Some(s)) if s > 0.0 => Some(m / s),
            _ => None,
        };
        let t_stat = match (mean, std) {
            (Some(m), Some(s)) if s > 0.0 => Some(m / (s / (days as f64).sqrt())),
            _ => None,
        };
        let hit_rate = if days > 0 {
            Some(realized.iter().filter(|&&ic| ic > 0.0).count() as f64 / days as f64)
        } else {
            None
        };

        Self {
            mean,
            std,
            ir,
            t_stat,
            hit_rate,
            days,
        }
    }
}
