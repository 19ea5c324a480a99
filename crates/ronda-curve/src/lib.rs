#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Equity-curve analytics for the Ronda engine.
//!
//! This crate operates on `(date, value)` sequences only and has no
//! dependency on the evaluation components:
//!
//! - [`drawdown`] extracts ranked peak-to-trough episodes from an equity or
//!   index curve.
//! - [`rebase`] rescales a reference series onto an instrument's price level
//!   at a shared base date.

pub mod drawdown;
pub mod rebase;

pub use drawdown::{analyze, DrawdownEvent, DrawdownReport};
pub use rebase::{rebase, RebasedSeries, Reference};
