//! Peak-to-trough drawdown extraction.
//!
//! A single pass over the curve tracks the running peak and an optional open
//! episode. A new high closes the open episode (the new-high day is its
//! recovery); a value below the peak opens an episode or deepens its trough.
//! An episode still open at the end of the curve is emitted without a
//! recovery date.

use serde::{Deserialize, Serialize};

use ronda_traits::Date;

/// One completed or still-open drawdown episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownEvent {
    /// First date the curve traded below the prior peak.
    pub start: Date,
    /// Date of the deepest point of the episode.
    pub trough: Date,
    /// Date the curve made a new high, or `None` if never recovered.
    pub recovery: Option<Date>,
    /// Fractional decline at the trough, always <= 0.
    pub depth: f64,
    /// Index distance from the start to the recovery (or to the last index
    /// for an unrecovered episode).
    pub length: usize,
    /// Index distance from the start to the trough.
    pub days_to_trough: usize,
}

/// Full drawdown analysis of one curve.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrawdownReport {
    /// Per-date drawdown from the running peak, aligned with the input.
    pub drawdowns: Vec<f64>,
    /// Episodes ranked by depth, most severe first.
    pub events: Vec<DrawdownEvent>,
}

impl DrawdownReport {
    /// The `n` most severe episodes.
    #[must_use]
    pub fn top(&self, n: usize) -> &[DrawdownEvent] {
        &self.events[..n.min(self.events.len())]
    }

    /// The deepest drawdown observed anywhere on the curve, 0.0 for a curve
    /// that never declined.
    #[must_use]
    pub fn max_drawdown(&self) -> f64 {
        self.events.first().map_or(0.0, |e| e.depth)
    }
}

/// Analyze an equity or index curve.
///
/// `dates` and `values` are parallel; extra entries on either side are
/// ignored. Events are collected in start order, then ranked by depth (most
/// negative first).
#[must_use]
pub fn analyze(dates: &[Date], values: &[f64]) -> DrawdownReport {
    let n = dates.len().min(values.len());
    if n == 0 {
        return DrawdownReport::default();
    }

    let mut drawdowns = Vec::with_capacity(n);
    let mut events: Vec<DrawdownEvent> = Vec::new();

    let mut peak = values[0];
    let mut start_idx: Option<usize> = None;
    let mut trough_idx = 0usize;
    let mut trough_dd = 0.0f64;

    for i in 0..n {
        let v = values[i];
        if v > peak {
            // New high closes any open episode; this day is its recovery.
            if let Some(start) = start_idx.take() {
                events.push(DrawdownEvent {
                    start: dates[start],
                    trough: dates[trough_idx],
                    recovery: Some(dates[i]),
                    depth: trough_dd,
                    length: i - start,
                    days_to_trough: trough_idx - start,
                });
                trough_dd = 0.0;
            }
            peak = v;
        }

        let dd = v / peak - 1.0;
        drawdowns.push(dd);

        if dd < 0.0 {
            match start_idx {
                None => {
                    start_idx = Some(i);
                    trough_idx = i;
                    trough_dd = dd;
                }
                Some(_) if dd < trough_dd => {
                    trough_dd = dd;
                    trough_idx = i;
                }
                Some(_) => {}
            }
        }
    }

    // Episode still open at the end of the curve: no recovery observed.
    if let Some(start) = start_idx {
        events.push(DrawdownEvent {
            start: dates[start],
            trough: dates[trough_idx],
            recovery: None,
            depth: trough_dd,
            length: n - start - 1,
            days_to_trough: trough_idx - start,
        });
    }

    // Rank by depth, most severe first.
    events.sort_by(|a, b| a.depth.partial_cmp(&b.depth).unwrap_or(std::cmp::Ordering::Equal));

    DrawdownReport { drawdowns, events }
}
