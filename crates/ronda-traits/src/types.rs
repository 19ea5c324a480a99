//! Common types used throughout the Ronda engine.
//!
//! This module defines the primitive vocabulary of the system: trading dates,
//! instrument identifiers, price observations, forward-return target kinds
//! and cross-sectional correlation methods.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RondaError;

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// Days between 0001-01-01 (chrono's CE epoch) and 1970-01-01.
///
/// Polars date columns count days from the Unix epoch while chrono's
/// `from_num_days_from_ce_opt` counts from the CE epoch; this offset
/// converts between the two.
pub const CE_TO_UNIX_EPOCH_DAYS: i32 = 719_163;

/// An instrument identifier.
///
/// Instruments are lower-cased ticker strings such as `"abb"` or `"volv_b"`.
pub type Instrument = String;

/// A single end-of-day price observation for one instrument.
///
/// Every field except the date is independently nullable; upstream data can
/// be missing any subset of the bar. The evaluation core only consumes
/// `open` and `close`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading date of the observation.
    pub date: Date,
    /// Opening price, if known.
    pub open: Option<f64>,
    /// Intraday high, if known.
    pub high: Option<f64>,
    /// Intraday low, if known.
    pub low: Option<f64>,
    /// Closing price, if known.
    pub close: Option<f64>,
    /// Traded volume, if known.
    pub volume: Option<f64>,
}

impl PriceBar {
    /// Create a bar carrying only open and close, the fields the evaluation
    /// core consumes.
    #[must_use]
    pub const fn from_open_close(date: Date, open: Option<f64>, close: Option<f64>) -> Self {
        Self {
            date,
            open,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }

    /// Whether every price field of the bar is missing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.open.is_none()
            && self.high.is_none()
            && self.low.is_none()
            && self.close.is_none()
            && self.volume.is_none()
    }
}

/// Forward-return definition used when building prediction targets.
///
/// The horizon-`H` target for date `D` pairs a price at `D` with a price `H`
/// trading days later:
///
/// - [`RetCc`](Self::RetCc): `close[D+H] / close[D] - 1`
/// - [`CloseOpen`](Self::CloseOpen): `close[D+H] / open[D] - 1`
/// - [`OpenOpen`](Self::OpenOpen): `open[D+H] / open[D] - 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Close-to-close return.
    RetCc,
    /// Open-to-future-close return.
    CloseOpen,
    /// Open-to-open return.
    OpenOpen,
}

impl TargetKind {
    /// The wire name of the target kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RetCc => "ret_cc",
            Self::CloseOpen => "close_open",
            Self::OpenOpen => "open_open",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = RondaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ret_cc" => Ok(Self::RetCc),
            "close_open" => Ok(Self::CloseOpen),
            "open_open" => Ok(Self::OpenOpen),
            other => Err(RondaError::UnknownTargetKind(other.to_string())),
        }
    }
}

/// Cross-sectional correlation method for daily IC computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrMethod {
    /// Linear (Pearson) correlation on raw values.
    Pearson,
    /// Rank (Spearman) correlation, ties broken by average rank.
    Spearman,
}

impl CorrMethod {
    /// The wire name of the method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pearson => "pearson",
            Self::Spearman => "spearman",
        }
    }
}

impl fmt::Display for CorrMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrMethod {
    type Err = RondaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pearson" => Ok(Self::Pearson),
            "spearman" => Ok(Self::Spearman),
            other => Err(RondaError::UnknownMethod(other.to_string())),
        }
    }
}

/// Parse a `YYYY-MM-DD` parameter, naming the parameter in the error.
///
/// # Errors
///
/// Returns [`RondaError::InvalidDate`] when the value is not an ISO-8601
/// calendar date.
pub fn parse_iso_date(value: &str, name: &str) -> Result<Date, RondaError> {
    Date::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| RondaError::InvalidDate(format!("{name} must be YYYY-MM-DD, got {value:?}")))
}
