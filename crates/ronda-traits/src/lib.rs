#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core type and trait definitions for the Ronda feature evaluation engine.
//!
//! This crate provides the foundational abstractions used by the calendar,
//! data, evaluation and curve crates: shared primitive types, the error
//! taxonomy, external collaborator traits, and statistical helpers.

/// The version of the ronda-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod provider;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{Result, RondaError};
pub use provider::{FeatureMeta, FeatureSource, PriceProvider};
pub use types::{
    parse_iso_date, CorrMethod, Date, Instrument, PriceBar, TargetKind, CE_TO_UNIX_EPOCH_DAYS,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
