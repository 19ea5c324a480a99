//! JSON-file-backed price provider.
//!
//! An external build step emits one JSON file per instrument under a root
//! directory; this provider reads them read-only. A missing instrument file
//! means no data, a missing root means the emitting side has not run yet,
//! and a malformed file is a hard parse error.
//!
//! File contract: `<root>/<instrument>.json` containing
//! `{"bars": [{"date": "YYYY-MM-DD", "open": .., "high": .., "low": ..,
//! "close": .., "volume": ..}, ...]}` with every price field optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use ronda_traits::{parse_iso_date, Date, PriceBar, PriceProvider, Result, RondaError};

#[derive(Debug, Deserialize)]
struct BarFile {
    bars: Vec<BarRow>,
}

#[derive(Debug, Deserialize)]
struct BarRow {
    date: String,
    #[serde(default)]
    open: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    #[serde(default)]
    close: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
}

/// Reads per-instrument bar files from a directory.
#[derive(Debug, Clone)]
pub struct JsonPriceProvider {
    root: PathBuf,
}

impl JsonPriceProvider {
    /// Create a provider over a bar-file directory.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::Provider`] when the root directory does not
    /// exist; the emitting side has not produced data yet and the caller
    /// may retry later.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(RondaError::Provider(format!(
                "price directory not found: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    fn instrument_path(&self, instrument: &str) -> PathBuf {
        self.root.join(format!("{instrument}.json"))
    }
}

impl PriceProvider for JsonPriceProvider {
    fn bars(&self, instrument: &str, from: Date, to: Date) -> Result<Vec<PriceBar>> {
        let path = self.instrument_path(instrument);
        if !path.exists() {
            debug!(instrument, "no bar file, returning empty history");
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&path)?;
        let file: BarFile = serde_json::from_str(&raw)?;

        let mut bars = Vec::with_capacity(file.bars.len());
        for row in file.bars {
            let date = parse_iso_date(&row.date, "date")?;
            if date < from || date > to {
                continue;
            }
            bars.push(PriceBar {
                date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }
        bars.sort_by_key(|bar| bar.date);
        Ok(bars)
    }
}
