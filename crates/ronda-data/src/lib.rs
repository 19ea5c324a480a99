#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Data access for the Ronda engine.
//!
//! This crate implements the external collaborators the evaluation core
//! declares in `ronda-traits`:
//! - [`FeatureStore`]: polars-backed tabular feature store with validated
//!   schemas and first-match-wins name resolution
//! - [`JsonPriceProvider`]: read-only per-instrument JSON bar files
//! - [`Universe`]: instrument list loading and named-group resolution
//! - coverage reporting for calendar-aligned series

pub mod coverage;
pub mod prices;
pub mod schema;
pub mod store;
pub mod universe;

pub use coverage::{feature_coverage, price_coverage, CoverageReport, FieldCoverage};
pub use prices::JsonPriceProvider;
pub use schema::{TableSchema, DATE_COLUMNS, INSTRUMENT_COLUMNS, RESERVED_COLUMNS};
pub use store::{CatalogPage, CatalogQuery, FeatureStore, FeatureTable};
pub use universe::{load_instruments, InstrumentRecord, Universe};
