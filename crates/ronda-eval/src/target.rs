//! Forward-return target construction.
//!
//! A target map answers: for each valid date in a range, what return did
//! each instrument realize `horizon` trading days later? The map is built
//! once per (universe, range, horizon, kind) combination and reused across
//! every feature evaluated against it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use ronda_calendar::TradingCalendar;
use ronda_traits::{Date, Instrument, PriceProvider, Result, TargetKind};

/// Forward-return targets for one (universe, range, horizon, kind) request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardTargets {
    /// Calendar steps between observation and outcome.
    pub horizon: usize,
    /// Return definition used.
    pub kind: TargetKind,
    /// Range-sliced calendar with the last `horizon` entries dropped.
    ///
    /// This list is the downstream iteration order; it is non-empty even
    /// when the price provider returned no rows.
    pub valid_dates: Vec<Date>,
    /// Per-date, per-instrument realized forward return. Dates with no
    /// computable pair are absent.
    pub by_date: HashMap<Date, HashMap<Instrument, f64>>,
}

impl ForwardTargets {
    /// The target values for one date, if any instrument qualified.
    #[must_use]
    pub fn sample(&self, date: Date) -> Option<&HashMap<Instrument, f64>> {
        self.by_date.get(&date)
    }
}

/// Build the forward-return target map.
///
/// Prices are fetched for the full range, not just the valid subset, since
/// each valid date needs prices up to `horizon` steps past it. The future
/// price for valid date `i` sits at sliced-calendar position `i + horizon`;
/// an instrument with no usable prices at either end of the pair is skipped
/// for that date. A provider that yields no rows produces an empty target
/// map paired with the valid-date list, not an error.
///
/// # Errors
///
/// Returns a range error when `from > to` and propagates provider failures.
pub fn build_targets(
    provider: &dyn PriceProvider,
    calendar: &TradingCalendar,
    universe: &[Instrument],
    from: Date,
    to: Date,
    horizon: usize,
    kind: TargetKind,
) -> Result<ForwardTargets> {
    let sliced = calendar.slice(from, to)?.to_vec();
    let valid_len = sliced.len().saturating_sub(horizon);
    let valid_dates = sliced[..valid_len].to_vec();

    // (instrument, date) -> (open, close) over the full sliced range.
    let mut prices: HashMap<&str, HashMap<Date, (Option<f64>, Option<f64>)>> = HashMap::new();
    for instrument in universe {
        let bars = provider.bars(instrument, from, to)?;
        let by_date = bars
            .into_iter()
            .map(|bar| (bar.date, (bar.open, bar.close)))
            .collect();
        prices.insert(instrument.as_str(), by_date);
    }

    let mut by_date: HashMap<Date, HashMap<Instrument, f64>> = HashMap::new();
    for (i, &date) in valid_dates.iter().enumerate() {
        let Some(&future) = sliced.get(i + horizon) else {
            break;
        };

        let mut day: HashMap<Instrument, f64> = HashMap::new();
        for instrument in universe {
            let Some(series) = prices.get(instrument.as_str()) else {
                continue;
            };
            if let Some(value) = forward_return(series, date, future, kind) {
                day.insert(instrument.clone(), value);
            }
        }
        if !day.is_empty() {
            by_date.insert(date, day);
        }
    }

    debug!(
        kind = %kind,
        horizon,
        valid_dates = valid_dates.len(),
        populated_dates = by_date.len(),
        "built forward targets"
    );

    Ok(ForwardTargets {
        horizon,
        kind,
        valid_dates,
        by_date,
    })
}

/// One instrument's forward return between `date` and `future`, or `None`
/// when either leg is missing or the denominator is zero.
fn forward_return(
    series: &HashMap<Date, (Option<f64>, Option<f64>)>,
    date: Date,
    future: Date,
    kind: TargetKind,
) -> Option<f64> {
    let &(open_now, close_now) = series.get(&date)?;
    let &(open_future, close_future) = series.get(&future)?;

    let (numerator, denominator) = match kind {
        TargetKind::RetCc => (close_future?, close_now?),
        TargetKind::CloseOpen => (close_future?, open_now?),
        TargetKind::OpenOpen => (open_future?, open_now?),
    };

    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ronda_traits::PriceBar;

    struct TablePrices {
        rows: HashMap<String, Vec<PriceBar>>,
    }

    impl PriceProvider for TablePrices {
        fn bars(&self, instrument: &str, from: Date, to: Date) -> Result<Vec<PriceBar>> {
            Ok(self
                .rows
                .get(instrument)
                .map(|bars| {
                    bars.iter()
                        .filter(|b| b.date >= from && b.date <= to)
                        .copied()
                        .collect()
                })
                .unwrap_or_default())
        }
    }

    fn date(s: &str) -> Date {
        Date::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn calendar() -> TradingCalendar {
        TradingCalendar::from_text("2024-03-04\n2024-03-05\n2024-03-06\n2024-03-07\n2024-03-08\n")
            .unwrap()
    }

    fn provider() -> TablePrices {
        let closes = [100.0, 102.0, 99.0, 101.0, 105.0];
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                PriceBar::from_open_close(
                    date("2024-03-04") + chrono::Days::new(i as u64),
                    Some(c - 0.5),
                    Some(c),
                )
            })
            .collect();
        TablePrices {
            rows: HashMap::from([("abc".to_string(), bars)]),
        }
    }

    #[test]
    fn test_valid_dates_drop_horizon_tail() {
        let targets = build_targets(
            &provider(),
            &calendar(),
            &["abc".to_string()],
            date("2024-03-04"),
            date("2024-03-08"),
            2,
            TargetKind::RetCc,
        )
        .unwrap();

        assert_eq!(targets.valid_dates.len(), 3);
        assert_eq!(*targets.valid_dates.last().unwrap(), date("2024-03-06"));
    }

    #[test]
    fn test_ret_cc_values() {
        let targets = build_targets(
            &provider(),
            &calendar(),
            &["abc".to_string()],
            date("2024-03-04"),
            date("2024-03-08"),
            1,
            TargetKind::RetCc,
        )
        .unwrap();

        let day = targets.sample(date("2024-03-04")).unwrap();
        assert_relative_eq!(day["abc"], 102.0 / 100.0 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_horizon_ret_cc_is_zero() {
        let targets = build_targets(
            &provider(),
            &calendar(),
            &["abc".to_string()],
            date("2024-03-04"),
            date("2024-03-08"),
            0,
            TargetKind::RetCc,
        )
        .unwrap();

        assert_eq!(targets.valid_dates.len(), 5);
        for &d in &targets.valid_dates {
            assert_relative_eq!(targets.sample(d).unwrap()["abc"], 0.0);
        }
    }

    #[test]
    fn test_open_open_uses_opens() {
        let targets = build_targets(
            &provider(),
            &calendar(),
            &["abc".to_string()],
            date("2024-03-04"),
            date("2024-03-08"),
            1,
            TargetKind::OpenOpen,
        )
        .unwrap();

        let day = targets.sample(date("2024-03-04")).unwrap();
        assert_relative_eq!(day["abc"], 101.5 / 99.5 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_prices_skip_instrument_not_day() {
        let mut p = provider();
        // Second instrument with a hole on 03-05: ret_cc from 03-04 has no
        // future close, so only "abc" contributes that day.
        p.rows.insert(
            "xyz".to_string(),
            vec![
                PriceBar::from_open_close(date("2024-03-04"), Some(10.0), Some(10.0)),
                PriceBar::from_open_close(date("2024-03-05"), Some(10.0), None),
                PriceBar::from_open_close(date("2024-03-06"), Some(10.0), Some(11.0)),
            ],
        );

        let targets = build_targets(
            &p,
            &calendar(),
            &["abc".to_string(), "xyz".to_string()],
            date("2024-03-04"),
            date("2024-03-08"),
            1,
            TargetKind::RetCc,
        )
        .unwrap();

        let day = targets.sample(date("2024-03-04")).unwrap();
        assert_eq!(day.len(), 1);
        assert!(day.contains_key("abc"));

        // From 03-05 the future close exists but the base close is missing.
        let day = targets.sample(date("2024-03-05")).unwrap();
        assert!(!day.contains_key("xyz"));
    }

    #[test]
    fn test_zero_denominator_skipped() {
        let p = TablePrices {
            rows: HashMap::from([(
                "abc".to_string(),
                vec![
                    PriceBar::from_open_close(date("2024-03-04"), Some(0.0), Some(0.0)),
                    PriceBar::from_open_close(date("2024-03-05"), Some(1.0), Some(1.0)),
                ],
            )]),
        };

        let targets = build_targets(
            &p,
            &calendar(),
            &["abc".to_string()],
            date("2024-03-04"),
            date("2024-03-08"),
            1,
            TargetKind::RetCc,
        )
        .unwrap();

        assert!(targets.sample(date("2024-03-04")).is_none());
    }

    #[test]
    fn test_empty_provider_is_not_an_error() {
        let p = TablePrices {
            rows: HashMap::new(),
        };

        let targets = build_targets(
            &p,
            &calendar(),
            &["abc".to_string()],
            date("2024-03-04"),
            date("2024-03-08"),
            1,
            TargetKind::RetCc,
        )
        .unwrap();

        assert!(targets.by_date.is_empty());
        assert_eq!(targets.valid_dates.len(), 4);
    }

    #[test]
    fn test_determinism() {
        let build = || {
            build_targets(
                &provider(),
                &calendar(),
                &["abc".to_string()],
                date("2024-03-04"),
                date("2024-03-08"),
                1,
                TargetKind::RetCc,
            )
            .unwrap()
        };
        let a = build();
        let b = build();
        assert_eq!(a.valid_dates, b.valid_dates);
        for d in &a.valid_dates {
            assert_eq!(a.by_date.get(d), b.by_date.get(d));
        }
    }
}
