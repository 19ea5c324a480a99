#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # ronda
//!
//! Cross-sectional feature evaluation engine for equity research.
//!
//! ronda measures how well a tabular feature predicts forward returns
//! across a universe of instruments, day by day:
//!
//! 1. A **trading calendar** fixes the day grid and range slicing.
//! 2. A **target map** pairs each valid date with each instrument's
//!    realized forward return at a chosen horizon.
//! 3. The **panel evaluator** correlates feature values against targets
//!    per day (the IC), buckets them into deciles, and rolls summary
//!    statistics over the IC series.
//! 4. **Curve analysis** extracts drawdown episodes from equity or index
//!    curves and rebases reference series for like-for-like comparison.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ronda::calendar::TradingCalendar;
//! use ronda::data::{FeatureStore, JsonPriceProvider};
//! use ronda::eval::{EvalRequest, PanelEvaluator};
//! use ronda::{CorrMethod, TargetKind};
//!
//! # fn main() -> ronda::Result<()> {
//! let calendar = TradingCalendar::load("data/calendar.txt")?;
//! let prices = JsonPriceProvider::open("data/prices")?;
//! let mut store = FeatureStore::new();
//! // store.register("features_vol", frame)?;
//!
//! let evaluator = PanelEvaluator::new(&calendar, &prices, &store);
//! // let report = evaluator.evaluate(&request)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Shared types, errors and collaborator traits
//! - [`calendar`] - Trading-calendar index and range slicing
//! - [`data`] - Feature store, price provider and universe loading
//! - [`eval`] - Targets, IC, deciles, rolling stats and the evaluator
//! - [`curve`] - Drawdown extraction and index rebasing

/// Version information for the ronda crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared types, errors and collaborator traits.
pub mod traits {
    pub use ronda_traits::*;
}

/// Trading-calendar index and range slicing.
pub mod calendar {
    pub use ronda_calendar::*;
}

/// Feature store, price provider and universe loading.
pub mod data {
    pub use ronda_data::*;
}

/// Targets, IC, deciles, rolling statistics and the panel evaluator.
pub mod eval {
    pub use ronda_eval::*;
}

/// Drawdown extraction and index rebasing.
pub mod curve {
    pub use ronda_curve::*;
}

// Re-export the common vocabulary at top level for convenience.
pub use ronda_calendar::TradingCalendar;
pub use ronda_traits::{
    CorrMethod, Date, FeatureMeta, FeatureSource, Instrument, PriceBar, PriceProvider, Result,
    RondaError, TargetKind,
};

/// Prelude module for convenient imports.
///
/// ```ignore
/// use ronda::prelude::*;
/// ```
pub mod prelude {
    pub use crate::curve::{analyze, rebase, DrawdownReport, RebasedSeries, Reference};
    pub use crate::data::{FeatureStore, JsonPriceProvider, Universe};
    pub use crate::eval::{EvalRequest, PanelEvaluator, PanelReport};
    pub use crate::{
        CorrMethod, Date, FeatureSource, PriceProvider, Result, RondaError, TargetKind,
        TradingCalendar,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
    }

    #[test]
    fn test_re_exports() {
        fn _accept_prices(_prices: &dyn PriceProvider) {}
        fn _accept_features(_features: &dyn FeatureSource) {}

        let _result: Result<()> = Ok(());
        let _error: RondaError = RondaError::BasePriceNotFound;
    }
}
