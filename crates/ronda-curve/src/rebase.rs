//! Base-date-anchored rebasing of a reference series.
//!
//! Rebasing lets a market index or a sector factor-return chain be drawn on
//! the same axis as an instrument's price: the reference is rescaled so that
//! it equals the instrument's close at a shared base date and evolves with
//! the reference's own dynamics thereafter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ronda_traits::{Date, Result, RondaError};

/// The series being rebased onto the instrument's price level.
#[derive(Debug, Clone)]
pub enum Reference {
    /// Another instrument's close-price series (e.g. a market index).
    Close(BTreeMap<Date, f64>),
    /// Daily factor returns compounded into a cumulative chain from the base
    /// date (e.g. a sector return factor).
    FactorReturns(BTreeMap<Date, f64>),
}

/// A rebased series aligned to the requested calendar slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebasedSeries {
    /// First date in the requested range with a non-missing instrument
    /// close.
    pub base_date: Date,
    /// The instrument close at the base date.
    pub base_close: f64,
    /// One point per requested calendar day; `None` where either side of
    /// the rescaling is unavailable.
    pub points: Vec<(Date, Option<f64>)>,
}

/// Rebase `reference` onto the instrument's price level.
///
/// `requested` is the calendar slice of the requested range, in order. The
/// base date is the first requested day with a non-missing instrument
/// close; the reference anchors independently at its own first available
/// value at or after the base date. A factor-return chain is defined as
/// exactly 1.0 at the base date and compounds forward via
/// `factor *= 1 + r`; a missing daily return yields `None` for that date
/// without advancing the chain.
///
/// # Errors
///
/// Returns [`RondaError::BasePriceNotFound`] when the instrument has no
/// close anywhere in the requested range.
pub fn rebase(
    requested: &[Date],
    instrument_closes: &BTreeMap<Date, f64>,
    reference: &Reference,
) -> Result<RebasedSeries> {
    let base_pos = requested
        .iter()
        .position(|d| instrument_closes.contains_key(d))
        .ok_or(RondaError::BasePriceNotFound)?;
    let base_date = requested[base_pos];
    let base_close = instrument_closes[&base_date];

    // Calendar days from the base date onward; the reference anchors and
    // compounds over this tail only.
    let tail = &requested[base_pos..];

    let points = match reference {
        Reference::Close(closes) => rebase_close(requested, tail, base_date, base_close, closes),
        Reference::FactorReturns(returns) => {
            rebase_factor(requested, tail, base_date, base_close, returns)
        }
    };

    Ok(RebasedSeries {
        base_date,
        base_close,
        points,
    })
}

fn rebase_close(
    requested: &[Date],
    tail: &[Date],
    base_date: Date,
    base_close: f64,
    closes: &BTreeMap<Date, f64>,
) -> Vec<(Date, Option<f64>)> {
    // Anchor at the base date when the reference trades there, otherwise at
    // its first available value after it.
    let ref_base_date = if closes.contains_key(&base_date) {
        Some(base_date)
    } else {
        tail.iter().copied().find(|d| closes.contains_key(d))
    };
    let ref_base = ref_base_date.and_then(|d| closes.get(&d)).copied();

    requested
        .iter()
        .map(|&day| {
            let value = match (ref_base, ref_base_date) {
                (Some(base), Some(anchor)) if day >= anchor && base != 0.0 => {
                    closes.get(&day).map(|close| base_close * (close / base))
                }
                _ => None,
            };
            (day, value)
        })
        .collect()
}

fn rebase_factor(
    requested: &[Date],
    tail: &[Date],
    base_date: Date,
    base_close: f64,
    returns: &BTreeMap<Date, f64>,
) -> Vec<(Date, Option<f64>)> {
    let mut by_date: BTreeMap<Date, Option<f64>> = BTreeMap::new();
    let mut factor = 1.0f64;
    for &day in tail {
        if day == base_date {
            by_date.insert(day, Some(factor));
            continue;
        }
        match returns.get(&day) {
            // Missing return freezes the chain at this date: the factor is
            // not advanced and the date reports no value.
            None => {
                by_date.insert(day, None);
            }
            Some(r) => {
                factor *= 1.0 + r;
                by_date.insert(day, Some(factor));
            }
        }
    }

    requested
        .iter()
        .map(|&day| {
            let value = by_date
                .get(&day)
                .copied()
                .flatten()
                .map(|f| base_close * f);
            (day, value)
        })
        .collect()
}
