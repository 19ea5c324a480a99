//! Table schema descriptors.
//!
//! Every registered feature table must expose one instrument column and one
//! date column drawn from fixed candidate lists. The descriptor is resolved
//! once at registration and reused for every query; reserved columns are
//! bookkeeping, never features.

use polars::prelude::*;

use ronda_traits::{Result, RondaError};

/// Columns that are never exported as features.
pub const RESERVED_COLUMNS: [&str; 5] = ["instrument", "ticker", "datetime", "date", "time"];

/// Candidate instrument-identifier columns, in preference order.
pub const INSTRUMENT_COLUMNS: [&str; 2] = ["instrument", "ticker"];

/// Candidate date columns, in preference order.
pub const DATE_COLUMNS: [&str; 2] = ["datetime", "date"];

/// Resolved schema of one feature table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name as registered.
    pub table: String,
    /// The column holding instrument identifiers.
    pub instrument_column: String,
    /// The column holding observation dates.
    pub date_column: String,
    /// Exported feature columns as (name, declared dtype) pairs, in the
    /// table's column order.
    pub features: Vec<(String, String)>,
}

impl TableSchema {
    /// Resolve the schema descriptor of a table.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidSchema`] when the table lacks an
    /// instrument or date column, or exports no feature column at all.
    pub fn probe(table: &str, frame: &DataFrame) -> Result<Self> {
        let names: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let dtypes = frame.dtypes();

        let instrument_column = INSTRUMENT_COLUMNS
            .iter()
            .find(|candidate| names.iter().any(|n| n == *candidate))
            .map(|c| (*c).to_string())
            .ok_or_else(|| {
                RondaError::InvalidSchema(format!("table {table} has no instrument column"))
            })?;
        let date_column = DATE_COLUMNS
            .iter()
            .find(|candidate| names.iter().any(|n| n == *candidate))
            .map(|c| (*c).to_string())
            .ok_or_else(|| {
                RondaError::InvalidSchema(format!("table {table} has no date column"))
            })?;

        let features: Vec<(String, String)> = names
            .iter()
            .zip(dtypes.iter())
            .filter(|(name, _)| !RESERVED_COLUMNS.contains(&name.as_str()))
            .map(|(name, dtype)| (name.clone(), dtype.to_string()))
            .collect();

        if features.is_empty() {
            return Err(RondaError::InvalidSchema(format!(
                "table {table} exports no feature columns"
            )));
        }

        Ok(Self {
            table: table.to_string(),
            instrument_column,
            date_column,
            features,
        })
    }

    /// Declared dtype of one feature column, if the table exports it.
    #[must_use]
    pub fn dtype(&self, feature: &str) -> Option<&str> {
        self.features
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, dtype)| dtype.as_str())
    }
}
