//! The tabular feature store.
//!
//! Tables register in an explicit order; a feature name maps to the first
//! registered table that declares it (first-match-wins). Each table carries
//! a resolved [`TableSchema`] so queries never re-probe columns.

use std::collections::HashMap;

use polars::prelude::*;
use tracing::debug;

use ronda_traits::{
    Date, FeatureMeta, FeatureSource, Result, RondaError, CE_TO_UNIX_EPOCH_DAYS,
};

use crate::schema::TableSchema;

/// One registered table: its resolved schema and its rows.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    schema: TableSchema,
    frame: DataFrame,
}

impl FeatureTable {
    /// The table's resolved schema.
    #[must_use]
    pub const fn schema(&self) -> &TableSchema {
        &self.schema
    }
}

/// A catalog filter: substring query, source table, and result cap.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    /// Case-insensitive substring on the feature name.
    pub query: Option<String>,
    /// Exact originating-table filter.
    pub source: Option<String>,
    /// Maximum number of returned descriptors; must be positive when given.
    /// Matches are still counted past the cap.
    pub limit: Option<usize>,
}

/// A filtered slice of the catalog with match bookkeeping.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    /// Descriptors within the limit, in name order.
    pub features: Vec<FeatureMeta>,
    /// Features matching the filter, ignoring the limit.
    pub matched: usize,
    /// Features known to the store overall.
    pub total: usize,
}

/// An ordered collection of feature tables with first-match-wins name
/// resolution.
#[derive(Debug, Clone, Default)]
pub struct FeatureStore {
    tables: Vec<FeatureTable>,
    sources: HashMap<String, usize>,
}

impl FeatureStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table under a name.
    ///
    /// Registration order is significant: a feature column already claimed
    /// by an earlier table keeps its original source.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidSchema`] when the table fails its
    /// schema probe.
    pub fn register(&mut self, table: &str, frame: DataFrame) -> Result<()> {
        let schema = TableSchema::probe(table, &frame)?;
        let index = self.tables.len();

        let mut claimed = 0usize;
        for (feature, _) in &schema.features {
            if !self.sources.contains_key(feature) {
                self.sources.insert(feature.clone(), index);
                claimed += 1;
            }
        }

        debug!(
            table,
            columns = schema.features.len(),
            claimed,
            "registered feature table"
        );
        self.tables.push(FeatureTable { schema, frame });
        Ok(())
    }

    /// Names of the registered tables, in registration order.
    #[must_use]
    pub fn tables(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.schema.table.as_str()).collect()
    }

    /// Filter the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidLimit`] for a zero limit.
    pub fn search(&self, query: &CatalogQuery) -> Result<CatalogPage> {
        if query.limit == Some(0) {
            return Err(RondaError::InvalidLimit(0));
        }

        let all = self.catalog();
        let total = all.len();
        let needle = query.query.as_ref().map(|q| q.to_lowercase());

        let mut features = Vec::new();
        let mut matched = 0usize;
        for meta in all {
            if let Some(source) = &query.source {
                if *source != meta.source {
                    continue;
                }
            }
            if let Some(needle) = &needle {
                if !meta.name.to_lowercase().contains(needle.as_str()) {
                    continue;
                }
            }
            matched += 1;
            if query.limit.is_none_or(|limit| features.len() < limit) {
                features.push(meta);
            }
        }

        Ok(CatalogPage {
            features,
            matched,
            total,
        })
    }

    fn meta(&self, name: &str, index: usize) -> FeatureMeta {
        let schema = &self.tables[index].schema;
        FeatureMeta {
            name: name.to_string(),
            source: schema.table.clone(),
            dtype: schema.dtype(name).unwrap_or_default().to_string(),
        }
    }
}

impl FeatureSource for FeatureStore {
    fn resolve(&self, name: &str) -> Result<FeatureMeta> {
        let index = *self
            .sources
            .get(name)
            .ok_or_else(|| RondaError::UnknownFeature(name.to_string()))?;
        Ok(self.meta(name, index))
    }

    fn series(
        &self,
        name: &str,
        instrument: &str,
        from: Date,
        to: Date,
    ) -> Result<Vec<(Date, Option<f64>)>> {
        let index = *self
            .sources
            .get(name)
            .ok_or_else(|| RondaError::UnknownFeature(name.to_string()))?;
        let table = &self.tables[index];
        let schema = &table.schema;

        let instrument_mask = table
            .frame
            .column(&schema.instrument_column)?
            .as_materialized_series()
            .str()?
            .equal(instrument);
        let rows = table.frame.filter(&instrument_mask)?;

        let dates = rows
            .column(&schema.date_column)?
            .as_materialized_series()
            .cast(&DataType::Date)?;
        let date_mask = dates
            .date()?
            .into_iter()
            .map(|d: Option<i32>| {
                d.and_then(|d| Date::from_num_days_from_ce_opt(d + CE_TO_UNIX_EPOCH_DAYS))
                    .map(|d| d >= from && d <= to)
                    .unwrap_or(false)
            })
            .collect::<BooleanChunked>();
        let rows = rows.filter(&date_mask)?;
        let rows = rows.sort([schema.date_column.as_str()], SortMultipleOptions::default())?;

        let dates = rows
            .column(&schema.date_column)?
            .as_materialized_series()
            .cast(&DataType::Date)?;
        let values = rows
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;

        let out = dates
            .date()?
            .into_iter()
            .zip(values.f64()?)
            .filter_map(|(d, v)| {
                d.and_then(|d| Date::from_num_days_from_ce_opt(d + CE_TO_UNIX_EPOCH_DAYS))
                    .map(|d| (d, v))
            })
            .collect();
        Ok(out)
    }

    fn catalog(&self) -> Vec<FeatureMeta> {
        let mut names: Vec<&String> = self.sources.keys().collect();
        names.sort();
        names
            .into_iter()
            .map(|name| self.meta(name, self.sources[name]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(s: &str) -> Date {
        Date::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn vol_table() -> DataFrame {
        df![
            "ticker" => ["abc", "abc", "abc", "xyz"],
            "date" => [
                date("2024-01-03"),
                date("2024-01-02"),
                date("2024-01-04"),
                date("2024-01-02"),
            ],
            "vol_20d" => [Some(0.19), Some(0.18), None, Some(0.30)],
            "beta" => [1.1, 1.0, 1.2, 0.8],
        ]
        .unwrap()
    }

    fn sector_table() -> DataFrame {
        df![
            "instrument" => ["abc"],
            "datetime" => [date("2024-01-02")],
            // Collides with vol_table; registered later, so it loses.
            "beta" => [9.9],
            "sector_ret" => [0.01],
        ]
        .unwrap()
    }

    fn store() -> FeatureStore {
        let mut store = FeatureStore::new();
        store.register("features_vol", vol_table()).unwrap();
        store.register("features_sector", sector_table()).unwrap();
        store
    }

    #[test]
    fn test_first_match_wins() {
        let store = store();
        assert_eq!(store.resolve("beta").unwrap().source, "features_vol");
        assert_eq!(
            store.resolve("sector_ret").unwrap().source,
            "features_sector"
        );
    }

    #[test]
    fn test_unknown_feature() {
        assert!(matches!(
            store().resolve("no_such").unwrap_err(),
            RondaError::UnknownFeature(_)
        ));
        assert!(store()
            .series("no_such", "abc", date("2024-01-01"), date("2024-01-31"))
            .is_err());
    }

    #[test]
    fn test_catalog_excludes_reserved_columns() {
        let names: Vec<String> = store().catalog().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["beta", "sector_ret", "vol_20d"]);
    }

    #[test]
    fn test_series_filters_and_sorts() {
        let rows = store()
            .series("vol_20d", "abc", date("2024-01-02"), date("2024-01-03"))
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, date("2024-01-02"));
        assert_relative_eq!(rows[0].1.unwrap(), 0.18);
        assert_eq!(rows[1].0, date("2024-01-03"));
    }

    #[test]
    fn test_series_keeps_null_values() {
        let rows = store()
            .series("vol_20d", "abc", date("2024-01-01"), date("2024-01-31"))
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], (date("2024-01-04"), None));
    }

    #[test]
    fn test_series_unknown_instrument_is_empty() {
        let rows = store()
            .series("vol_20d", "zzz", date("2024-01-01"), date("2024-01-31"))
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_search_filters() {
        let store = store();

        let by_query = store
            .search(&CatalogQuery {
                query: Some("VOL".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_query.matched, 1);
        assert_eq!(by_query.total, 3);
        assert_eq!(by_query.features[0].name, "vol_20d");

        let by_source = store
            .search(&CatalogQuery {
                source: Some("features_vol".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_source.matched, 2);

        let limited = store
            .search(&CatalogQuery {
                limit: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(limited.features.len(), 1);
        assert_eq!(limited.matched, 3);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let err = store()
            .search(&CatalogQuery {
                limit: Some(0),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, RondaError::InvalidLimit(0)));
    }
}
