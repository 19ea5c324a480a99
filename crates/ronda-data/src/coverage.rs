//! Missing-data reporting for calendar-aligned series.
//!
//! When bars or feature rows are aligned to a sliced trading calendar, the
//! gaps are part of the answer: which dates had no row at all, and what
//! share of each field is missing over the range.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use ronda_traits::{Date, PriceBar};

/// Missing share for one field over a calendar slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCoverage {
    /// Field name.
    pub field: String,
    /// Calendar days without a value for this field.
    pub missing: usize,
    /// `missing / days`, 0.0 for an empty calendar slice.
    pub ratio: f64,
}

/// Alignment report for one instrument over a calendar slice.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Calendar days in the slice.
    pub days: usize,
    /// Calendar days with no data for any field.
    pub missing_dates: Vec<Date>,
    /// Per-field missing shares; a day without a row counts as missing for
    /// every field.
    pub fields: Vec<FieldCoverage>,
}

/// Align a bar series to a calendar slice and report the gaps.
#[must_use]
pub fn price_coverage(calendar: &[Date], bars: &[PriceBar]) -> CoverageReport {
    let by_date: HashMap<Date, &PriceBar> = bars.iter().map(|bar| (bar.date, bar)).collect();
    let days = calendar.len();

    let mut missing_dates = Vec::new();
    let fields = ["open", "high", "low", "close", "volume"];
    let mut missing = [0usize; 5];

    for &day in calendar {
        match by_date.get(&day) {
            None => {
                missing_dates.push(day);
                for count in &mut missing {
                    *count += 1;
                }
            }
            Some(bar) => {
                let values = [bar.open, bar.high, bar.low, bar.close, bar.volume];
                for (count, value) in missing.iter_mut().zip(values) {
                    if value.is_none() {
                        *count += 1;
                    }
                }
            }
        }
    }

    let fields = fields
        .iter()
        .zip(missing)
        .map(|(field, missing)| FieldCoverage {
            field: (*field).to_string(),
            missing,
            ratio: if days == 0 {
                0.0
            } else {
                missing as f64 / days as f64
            },
        })
        .collect();

    CoverageReport {
        days,
        missing_dates,
        fields,
    }
}

/// Align per-feature series to a calendar slice and report the gaps.
///
/// `series` pairs each feature name with its `(date, value)` rows as fetched
/// from a feature source; a `None` value counts as missing just like an
/// absent row. A date lands in `missing_dates` only when every requested
/// feature is missing there.
#[must_use]
pub fn feature_coverage(
    calendar: &[Date],
    series: &[(String, Vec<(Date, Option<f64>)>)],
) -> CoverageReport {
    let days = calendar.len();
    let maps: Vec<HashMap<Date, f64>> = series
        .iter()
        .map(|(_, rows)| {
            rows.iter()
                .filter_map(|&(date, value)| value.map(|v| (date, v)))
                .collect()
        })
        .collect();

    let mut missing_dates = Vec::new();
    let mut missing = vec![0usize; series.len()];
    for &day in calendar {
        let mut any_present = false;
        for (count, map) in missing.iter_mut().zip(&maps) {
            if map.contains_key(&day) {
                any_present = true;
            } else {
                *count += 1;
            }
        }
        if !any_present && !series.is_empty() {
            missing_dates.push(day);
        }
    }

    let fields = series
        .iter()
        .zip(missing)
        .map(|((name, _), missing)| FieldCoverage {
            field: name.clone(),
            missing,
            ratio: if days == 0 {
                0.0
            } else {
                missing as f64 / days as f64
            },
        })
        .collect();

    CoverageReport {
        days,
        missing_dates,
        fields,
    }
}
