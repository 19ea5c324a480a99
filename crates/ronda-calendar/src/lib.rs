#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Trading-calendar index for the Ronda engine.
//!
//! A [`TradingCalendar`] is an immutable, strictly increasing sequence of
//! trading days built once from a static text source. It offers O(1) exact
//! position lookup and O(log n) range slicing where the bounds need not be
//! trading days themselves: a non-trading start bound rounds up to the next
//! trading day and a non-trading end bound rounds down to the previous one.

use std::collections::HashMap;
use std::path::Path;

use ronda_traits::{Date, Result, RondaError};

/// An ordered trading-day sequence with fast lookups.
///
/// Invariants: non-empty, strictly increasing, no duplicates. Enforced at
/// construction; the calendar is immutable afterwards.
#[derive(Debug, Clone)]
pub struct TradingCalendar {
    dates: Vec<Date>,
    index: HashMap<Date, usize>,
}

impl TradingCalendar {
    /// Build a calendar from an already-ordered list of dates.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::Calendar`] when the list is empty or not
    /// strictly increasing.
    pub fn from_dates(dates: Vec<Date>) -> Result<Self> {
        if dates.is_empty() {
            return Err(RondaError::Calendar("Calendar is empty".to_string()));
        }
        for pair in dates.windows(2) {
            if pair[0] >= pair[1] {
                return Err(RondaError::Calendar(format!(
                    "Calendar dates not strictly increasing at {}",
                    pair[1]
                )));
            }
        }

        let index = dates.iter().copied().enumerate().map(|(i, d)| (d, i)).collect();
        Ok(Self { dates, index })
    }

    /// Parse a calendar from text, one `YYYY-MM-DD` date per line.
    ///
    /// Blank lines and `#` comments are ignored. Any malformed date is a
    /// hard error; a source with no dates is a hard error.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::Calendar`] for malformed, empty or unordered
    /// input.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut dates = Vec::new();
        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let date = Date::parse_from_str(line, "%Y-%m-%d")
                .map_err(|_| RondaError::Calendar(format!("Invalid calendar date: {line}")))?;
            dates.push(date);
        }
        Self::from_dates(dates)
    }

    /// Load a calendar from a text file.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures and [`from_text`](Self::from_text) errors.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_text(&text)
    }

    /// Number of trading days in the calendar.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the calendar is empty. Always false for a constructed
    /// calendar; present for API completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// All trading days, in order.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Exact position of a trading day, if it is one.
    #[must_use]
    pub fn position(&self, date: Date) -> Option<usize> {
        self.index.get(&date).copied()
    }

    /// Whether the date is a trading day.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.index.contains_key(&date)
    }

    /// Slice the calendar to the trading days within `[from, to]`.
    ///
    /// Bounds that are not trading days resolve by binary search: the start
    /// rounds up to the next trading day, the end rounds down to the
    /// previous one. A range that contains no trading days (a weekend-only
    /// window, or one entirely outside the calendar) yields an empty slice,
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidRange`] when `from > to`.
    pub fn slice(&self, from: Date, to: Date) -> Result<&[Date]> {
        if from > to {
            return Err(RondaError::InvalidRange(format!(
                "from date {from} is after to date {to}"
            )));
        }

        let start_idx = self
            .position(from)
            .unwrap_or_else(|| self.dates.partition_point(|d| *d < from));

        let end_idx = match self.position(to) {
            Some(idx) => idx as i64,
            None => self.dates.partition_point(|d| *d <= to) as i64 - 1,
        };
        let end_idx = end_idx.min(self.dates.len() as i64 - 1);

        if start_idx as i64 > end_idx {
            return Ok(&[]);
        }

        Ok(&self.dates[start_idx..=end_idx as usize])
    }
}
