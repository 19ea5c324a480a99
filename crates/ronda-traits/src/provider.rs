//! External collaborator traits.
//!
//! The evaluation core never performs I/O itself. Prices and feature columns
//! are supplied by implementations of the traits in this module; the core
//! consumes their already-fetched rows as plain values. Implementations are
//! expected to surface unavailability as [`RondaError::Provider`] so callers
//! can distinguish retry-worthy failures from configuration mistakes.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Date, PriceBar};

/// Supplies raw end-of-day price history per instrument.
pub trait PriceProvider {
    /// Fetch bars for one instrument over an inclusive date range.
    ///
    /// An empty vector is a normal outcome (no data in range), not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only when the underlying source cannot be reached or
    /// is malformed.
    fn bars(&self, instrument: &str, from: Date, to: Date) -> Result<Vec<PriceBar>>;
}

/// Descriptor for one feature known to the store: its name, the table it was
/// resolved from, and the declared column type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureMeta {
    /// Feature (column) name.
    pub name: String,
    /// Name of the originating table.
    pub source: String,
    /// Declared type of the column, as reported by the table engine.
    pub dtype: String,
}

/// Supplies named feature columns per instrument and date range.
///
/// A feature name resolves to exactly one originating table; when several
/// registered tables declare the same column name, the first registration
/// wins (see `ronda-data` for the registration order contract).
pub trait FeatureSource {
    /// Resolve a feature name to its originating table and declared type.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::UnknownFeature`] when no registered table
    /// declares the column.
    ///
    /// [`RondaError::UnknownFeature`]: crate::error::RondaError::UnknownFeature
    fn resolve(&self, name: &str) -> Result<FeatureMeta>;

    /// Fetch `(date, value)` rows for one feature and instrument over an
    /// inclusive date range. Missing observations appear as `None` values or
    /// are absent entirely; both mean the same thing downstream.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::UnknownFeature`] for unregistered names, or a
    /// provider error when the table engine fails.
    ///
    /// [`RondaError::UnknownFeature`]: crate::error::RondaError::UnknownFeature
    fn series(
        &self,
        name: &str,
        instrument: &str,
        from: Date,
        to: Date,
    ) -> Result<Vec<(Date, Option<f64>)>>;

    /// Enumerate every known feature with its originating table and type.
    fn catalog(&self) -> Vec<FeatureMeta>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RondaError;

    struct FixedPrices;

    impl PriceProvider for FixedPrices {
        fn bars(&self, _instrument: &str, from: Date, _to: Date) -> Result<Vec<PriceBar>> {
            Ok(vec![PriceBar::from_open_close(
                from,
                Some(10.0),
                Some(10.5),
            )])
        }
    }

    struct EmptySource;

    impl FeatureSource for EmptySource {
        fn resolve(&self, name: &str) -> Result<FeatureMeta> {
            Err(RondaError::UnknownFeature(name.to_string()))
        }

        fn series(
            &self,
            name: &str,
            _instrument: &str,
            _from: Date,
            _to: Date,
        ) -> Result<Vec<(Date, Option<f64>)>> {
            Err(RondaError::UnknownFeature(name.to_string()))
        }

        fn catalog(&self) -> Vec<FeatureMeta> {
            Vec::new()
        }
    }

    #[test]
    fn test_traits_are_object_safe() {
        let prices: &dyn PriceProvider = &FixedPrices;
        let features: &dyn FeatureSource = &EmptySource;

        let date = Date::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(prices.bars("abc", date, date).unwrap().len(), 1);
        assert!(features.resolve("vol_20d").is_err());
        assert!(features.catalog().is_empty());
    }
}
