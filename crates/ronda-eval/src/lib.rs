#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Cross-sectional feature evaluation for the Ronda engine.
//!
//! This crate turns raw prices and feature columns into evaluation
//! reports:
//! - forward-return target construction over a trading calendar
//! - daily Information Coefficient (IC) with Pearson or Spearman methods
//! - decile bucketing with long-short spread curves
//! - rolling-window statistics over the daily IC series
//!
//! [`PanelEvaluator`] orchestrates the whole pipeline: one shared target
//! map, one report per feature.

pub mod decile;
pub mod evaluator;
pub mod ic;
pub mod rolling;
pub mod target;

pub use decile::{aggregate, bucket_day, DecileCurve, DecileDay};
pub use evaluator::{EvalRequest, FeatureReport, PanelEvaluator, PanelReport};
pub use ic::{calculate_ic, ic_from_pairs, DailyIc, IcSummary};
pub use rolling::{rolling_stats, RollingSeries};
pub use target::{build_targets, ForwardTargets};
