//! Trailing-window statistics over a gap-tolerant daily series.
//!
//! The input keeps one slot per date even when the value is absent; each
//! output point covers the non-absent values inside the trailing window at
//! that position. Unmet preconditions yield `None`, never zero.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use ronda_traits::stats;
use ronda_traits::Date;

/// Four parallel metric series aligned one-to-one with the input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RollingSeries {
    /// Input dates, in order.
    pub dates: Vec<Date>,
    /// Window mean of the non-absent values.
    pub mean: Vec<Option<f64>>,
    /// Bessel-corrected window standard deviation, needs >= 2 values.
    pub std: Vec<Option<f64>>,
    /// mean / std, absent when std is zero or absent.
    pub ir: Vec<Option<f64>>,
    /// mean / (std / sqrt(count)), same preconditions as IR.
    pub t_stat: Vec<Option<f64>>,
}

/// Compute trailing-window statistics over an ordered daily series.
///
/// `window` is coerced to at least 1. The buffer slides over every input
/// slot, absent or not, so a gap narrows the effective sample rather than
/// shifting the window.
#[must_use]
pub fn rolling_stats(series: &[(Date, Option<f64>)], window: usize) -> RollingSeries {
    let window = window.max(1);
    let n = series.len();

    let mut out = RollingSeries {
        dates: Vec::with_capacity(n),
        mean: Vec::with_capacity(n),
        std: Vec::with_capacity(n),
        ir: Vec::with_capacity(n),
        t_stat: Vec::with_capacity(n),
    };

    let mut buffer: VecDeque<Option<f64>> = VecDeque::with_capacity(window + 1);
    for &(date, value) in series {
        buffer.push_back(value);
        if buffer.len() > window {
            buffer.pop_front();
        }

        let present: Vec<f64> = buffer.iter().copied().flatten().collect();
        let count = present.len();
        let mean = stats::mean(&present);
        let std = stats::sample_std(&present);
        let ir = match (mean, std) {
            (Some(m), Some(s)) if s > 0.0 => Some(m / s),
            _ => None,
        };
        let t_stat = match (mean, std) {
            (Some(m), Some(s)) if s > 0.0 => Some(m / (s / (count as f64).sqrt())),
            _ => None,
        };

        out.dates.push(date);
        out.mean.push(mean);
        out.std.push(std);
        out.ir.push(ir);
        out.t_stat.push(t_stat);
    }

    out
}
