//! Instrument universe loading and group resolution.
//!
//! Universe files carry one instrument per line: a ticker followed by an
//! optional listing start and end date, separated by commas or whitespace.
//! Tickers are lower-cased on load. Two named groups exist: `all` (the
//! equity list) and `indexes`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use ronda_traits::{parse_iso_date, Date, Instrument, Result, RondaError};

/// One universe entry with its optional listing window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    /// Lower-cased ticker.
    pub ticker: Instrument,
    /// First tradeable date, if bounded.
    pub start: Option<Date>,
    /// Last tradeable date, if bounded.
    pub end: Option<Date>,
}

impl InstrumentRecord {
    /// Intersect a requested range with the listing window.
    ///
    /// Returns `None` when the request lies entirely outside the window.
    #[must_use]
    pub fn clamp_range(&self, from: Date, to: Date) -> Option<(Date, Date)> {
        let from = self.start.map_or(from, |start| from.max(start));
        let to = self.end.map_or(to, |end| to.min(end));
        (from <= to).then_some((from, to))
    }
}

fn split_line(line: &str) -> Vec<&str> {
    if line.contains(',') {
        line.split(',').map(str::trim).filter(|p| !p.is_empty()).collect()
    } else {
        line.split_whitespace().collect()
    }
}

/// Load a universe file.
///
/// Blank lines and `#` comments are ignored.
///
/// # Errors
///
/// Fails on I/O errors and on malformed listing dates.
pub fn load_instruments(path: impl AsRef<Path>) -> Result<Vec<InstrumentRecord>> {
    let raw = fs::read_to_string(path)?;
    let mut records = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts = split_line(line);
        let Some(ticker) = parts.first() else {
            continue;
        };

        let start = parts
            .get(1)
            .map(|value| parse_iso_date(value, "start"))
            .transpose()?;
        let end = parts
            .get(2)
            .map(|value| parse_iso_date(value, "end"))
            .transpose()?;

        records.push(InstrumentRecord {
            ticker: ticker.to_lowercase(),
            start,
            end,
        });
    }

    Ok(records)
}

/// The full configured universe: equities plus market indexes.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    equities: Vec<InstrumentRecord>,
    indexes: Vec<InstrumentRecord>,
}

impl Universe {
    /// Build a universe from already-loaded record lists.
    #[must_use]
    pub const fn new(equities: Vec<InstrumentRecord>, indexes: Vec<InstrumentRecord>) -> Self {
        Self { equities, indexes }
    }

    /// Load a universe from an equity file and an index file.
    ///
    /// # Errors
    ///
    /// Propagates file and date-parse errors from either list.
    pub fn load(equities: impl AsRef<Path>, indexes: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(
            load_instruments(equities)?,
            load_instruments(indexes)?,
        ))
    }

    /// Whether a ticker appears in either list.
    #[must_use]
    pub fn contains(&self, ticker: &str) -> bool {
        self.record(ticker).is_some()
    }

    /// Look up one instrument's record.
    #[must_use]
    pub fn record(&self, ticker: &str) -> Option<&InstrumentRecord> {
        self.equities
            .iter()
            .chain(self.indexes.iter())
            .find(|r| r.ticker == ticker)
    }

    /// Market index tickers.
    #[must_use]
    pub fn indexes(&self) -> Vec<Instrument> {
        self.indexes.iter().map(|r| r.ticker.clone()).collect()
    }

    /// Resolve a universe selector to a ticker list.
    ///
    /// The selector is either a named group (`all`, `indexes`) or a comma-
    /// separated ticker list. Tickers are lower-cased before lookup.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::UnknownInstrument`] for a ticker outside the
    /// universe, or [`RondaError::MissingParameter`] for an empty selector.
    pub fn resolve(&self, selector: &str) -> Result<Vec<Instrument>> {
        match selector.trim() {
            "" => Err(RondaError::MissingParameter("universe".to_string())),
            "all" => Ok(self.equities.iter().map(|r| r.ticker.clone()).collect()),
            "indexes" => Ok(self.indexes()),
            explicit => {
                let mut tickers = Vec::new();
                for part in explicit.split(',') {
                    let ticker = part.trim().to_lowercase();
                    if ticker.is_empty() {
                        continue;
                    }
                    if !self.contains(&ticker) {
                        return Err(RondaError::UnknownInstrument(ticker));
                    }
                    tickers.push(ticker);
                }
                if tickers.is_empty() {
                    return Err(RondaError::MissingParameter("universe".to_string()));
                }
                Ok(tickers)
            }
        }
    }
}
