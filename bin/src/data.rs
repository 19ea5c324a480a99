//! Data-root wiring for the ronda CLI.
//!
//! All commands read from one directory with a fixed layout:
//!
//! ```text
//! <data-root>/
//!   calendars/day.txt          trading calendar, one date per line
//!   instruments/all.txt        equity universe
//!   instruments/indexes.txt    market indexes
//!   prices/<ticker>.json       per-instrument bar files
//!   tables/<name>.parquet      feature tables, optional per table
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::warn;

use ronda_calendar::TradingCalendar;
use ronda_data::{FeatureStore, JsonPriceProvider, Universe};

/// Feature tables in registration order. First-match-wins name resolution
/// makes this order part of the contract.
const TABLE_SPECS: [&str; 5] = [
    "alpha360",
    "features_vol",
    "features_liquidity",
    "features_sector",
    "exogenous_daily",
];

/// Everything the commands need, wired from one data root.
pub(crate) struct Workspace {
    pub(crate) calendar: TradingCalendar,
    pub(crate) prices: JsonPriceProvider,
    pub(crate) store: FeatureStore,
    pub(crate) universe: Universe,
    /// Tables whose parquet file was absent at startup.
    pub(crate) missing_tables: Vec<String>,
}

impl Workspace {
    /// Load calendar, universe, prices and every available feature table.
    pub(crate) fn open(data_root: &Path) -> Result<Self> {
        let calendar = TradingCalendar::load(data_root.join("calendars").join("day.txt"))
            .context("loading trading calendar")?;
        let universe = Universe::load(
            data_root.join("instruments").join("all.txt"),
            data_root.join("instruments").join("indexes.txt"),
        )
        .context("loading universe files")?;
        let prices =
            JsonPriceProvider::open(data_root.join("prices")).context("opening price directory")?;

        let mut store = FeatureStore::new();
        let mut missing_tables = Vec::new();
        for table in TABLE_SPECS {
            let path = table_path(data_root, table);
            if !path.exists() {
                warn!(table, path = %path.display(), "feature table not found, skipping");
                missing_tables.push(table.to_string());
                continue;
            }
            let frame = read_parquet(&path)
                .with_context(|| format!("reading feature table {table}"))?;
            store
                .register(table, frame)
                .with_context(|| format!("registering feature table {table}"))?;
        }

        Ok(Self {
            calendar,
            prices,
            store,
            universe,
            missing_tables,
        })
    }
}

fn table_path(data_root: &Path, table: &str) -> PathBuf {
    data_root.join("tables").join(format!("{table}.parquet"))
}

fn read_parquet(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;
    let df = ParquetReader::new(file).finish()?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_path_layout() {
        let path = table_path(Path::new("/data/xsto"), "features_vol");
        assert_eq!(
            path,
            PathBuf::from("/data/xsto/tables/features_vol.parquet")
        );
    }
}
