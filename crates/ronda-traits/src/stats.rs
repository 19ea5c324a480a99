//! Statistical primitives shared across the evaluation crates.
//!
//! Every function here returns `Option<f64>` for statistics that can be
//! undefined (insufficient sample, zero variance). Undefined is always
//! `None`, never zero, so downstream aggregation is not biased by
//! placeholder values.

/// Arithmetic mean. `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation with Bessel's correction (divisor n-1).
///
/// `None` when fewer than two values are supplied.
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(variance.sqrt())
}

/// Compute ranks of values, handling ties with average rank.
///
/// Equal values receive the mean of the rank positions they jointly occupy;
/// e.g. three tied values spanning sorted positions 4, 5 and 6 all receive
/// rank 5. Ranks are zero-based, which leaves correlations unaffected.
#[must_use]
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();

    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranks = vec![0.0; n];
    let mut i = 0;

    while i < n {
        let mut j = i;
        // Find ties
        while j < n && (indexed[j].1 - indexed[i].1).abs() < f64::EPSILON {
            j += 1;
        }

        // Average rank for the tied group
        let avg_rank = (i + j - 1) as f64 / 2.0;
        for k in i..j {
            ranks[indexed[k].0] = avg_rank;
        }

        i = j;
    }

    ranks
}

/// Pearson correlation coefficient between two equal-length series.
///
/// `None` when the lengths differ, fewer than two pairs are supplied, or
/// either series has zero variance.
#[must_use]
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Spearman rank correlation: average-rank both series, then Pearson on the
/// ranks. Same undefined conditions as [`pearson`].
#[must_use]
pub fn spearman(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    pearson(&average_ranks(xs), &average_ranks(ys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_std() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(mean(&values).unwrap(), 3.0);
        assert_relative_eq!(sample_std(&values).unwrap(), 2.5_f64.sqrt());

        assert!(mean(&[]).is_none());
        assert!(sample_std(&[1.0]).is_none());
    }

    #[test]
    fn test_average_ranks_no_ties() {
        let values = [3.0, 1.0, 2.0, 5.0, 4.0];
        assert_eq!(average_ranks(&values), vec![2.0, 0.0, 1.0, 4.0, 3.0]);
    }

    #[test]
    fn test_average_ranks_with_ties() {
        let values = [1.0, 2.0, 2.0, 3.0];
        let ranks = average_ranks(&values);
        assert_relative_eq!(ranks[0], 0.0);
        assert_relative_eq!(ranks[1], 1.5);
        assert_relative_eq!(ranks[2], 1.5);
        assert_relative_eq!(ranks[3], 3.0);
    }

    #[test]
    fn test_pearson_perfect() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [0.01, 0.02, 0.03, 0.04];
        assert_relative_eq!(pearson(&xs, &ys).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_zero_variance() {
        let xs = [1.0, 1.0, 1.0];
        let ys = [0.01, 0.02, 0.03];
        assert!(pearson(&xs, &ys).is_none());
    }

    #[test]
    fn test_spearman_self_and_negation() {
        let xs = [0.4, 1.7, -0.3, 2.9, 0.8];
        let neg: Vec<f64> = xs.iter().map(|x| -x).collect();

        assert_relative_eq!(spearman(&xs, &xs).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(spearman(&xs, &neg).unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_spearman_too_short() {
        assert!(spearman(&[1.0], &[2.0]).is_none());
    }
}
