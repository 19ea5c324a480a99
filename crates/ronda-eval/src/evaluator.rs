//! Panel evaluation: one target map, many features.
//!
//! The evaluator wires the pieces together: it slices the calendar, builds
//! the forward-return target map once, then evaluates each requested
//! feature against it: daily IC, decile curve, and rolling IC statistics.

use std::collections::HashMap;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ronda_calendar::TradingCalendar;
use ronda_traits::{
    CorrMethod, Date, FeatureSource, Instrument, PriceProvider, Result, RondaError, TargetKind,
};

use crate::decile::{self, DecileCurve, DecileDay};
use crate::ic::{calculate_ic, DailyIc, IcSummary};
use crate::rolling::{rolling_stats, RollingSeries};
use crate::target::{build_targets, ForwardTargets};

/// One evaluation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalRequest {
    /// Feature names to evaluate, resolved through the feature source.
    pub features: Vec<String>,
    /// Instrument identifiers, lower-cased.
    pub universe: Vec<Instrument>,
    /// Inclusive range start.
    pub from: Date,
    /// Inclusive range end.
    pub to: Date,
    /// Calendar steps between observation and outcome.
    pub horizon: usize,
    /// Forward-return definition.
    pub kind: TargetKind,
    /// Correlation method for the daily IC.
    pub method: CorrMethod,
    /// Rolling window over the daily IC series.
    pub window: usize,
}

impl EvalRequest {
    fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            return Err(RondaError::MissingParameter("features".to_string()));
        }
        if self.universe.is_empty() {
            return Err(RondaError::MissingParameter("universe".to_string()));
        }
        if self.window == 0 {
            return Err(RondaError::InvalidWindow(self.window));
        }
        Ok(())
    }
}

/// Evaluation results for one feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureReport {
    /// Feature name as requested.
    pub feature: String,
    /// Table the feature resolved to.
    pub source: String,
    /// Daily IC series, one point per valid date.
    pub daily: Vec<DailyIc>,
    /// Aggregate IC statistics.
    pub summary: IcSummary,
    /// Per-day decile bucketings, days below the sample floor omitted.
    pub decile_days: Vec<DecileDay>,
    /// Decile curve aggregated across days.
    pub deciles: DecileCurve,
    /// Rolling statistics over the daily IC series.
    pub rolling: RollingSeries,
}

/// Evaluation results for a whole request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelReport {
    /// The request that produced this report.
    pub request: EvalRequest,
    /// Valid dates the evaluation iterated, in order.
    pub valid_dates: Vec<Date>,
    /// Per-feature results, in request order.
    pub features: Vec<FeatureReport>,
}

/// Evaluates features cross-sectionally against shared forward targets.
///
/// Borrows its collaborators; every evaluation takes immutable inputs and
/// returns fresh output structures, so one evaluator can serve concurrent
/// requests.
pub struct PanelEvaluator<'a> {
    calendar: &'a TradingCalendar,
    prices: &'a dyn PriceProvider,
    features: &'a dyn FeatureSource,
}

impl<'a> PanelEvaluator<'a> {
    /// Create an evaluator over a calendar, a price provider, and a feature
    /// source.
    #[must_use]
    pub const fn new(
        calendar: &'a TradingCalendar,
        prices: &'a dyn PriceProvider,
        features: &'a dyn FeatureSource,
    ) -> Self {
        Self {
            calendar,
            prices,
            features,
        }
    }

    /// Run a full evaluation.
    ///
    /// The target map is built once and shared across every feature in the
    /// request.
    ///
    /// # Errors
    ///
    /// Fails on an empty feature list or universe, a zero window, an
    /// invalid date range, an unknown feature name, or a provider failure.
    /// Absence of data within a valid request is reported through empty or
    /// `None` fields, never as an error.
    pub fn evaluate(&self, request: &EvalRequest) -> Result<PanelReport> {
        request.validate()?;

        let targets = build_targets(
            self.prices,
            self.calendar,
            &request.universe,
            request.from,
            request.to,
            request.horizon,
            request.kind,
        )?;

        let mut features = Vec::with_capacity(request.features.len());
        for name in &request.features {
            features.push(self.evaluate_feature(name, request, &targets)?);
        }

        info!(
            features = features.len(),
            universe = request.universe.len(),
            valid_dates = targets.valid_dates.len(),
            "panel evaluation complete"
        );

        Ok(PanelReport {
            request: request.clone(),
            valid_dates: targets.valid_dates,
            features,
        })
    }

    fn evaluate_feature(
        &self,
        name: &str,
        request: &EvalRequest,
        targets: &ForwardTargets,
    ) -> Result<FeatureReport> {
        let meta = self.features.resolve(name)?;
        let panel = self.fetch_panel(name, request)?;

        let mut daily = Vec::with_capacity(targets.valid_dates.len());
        let mut decile_days = Vec::new();
        for &date in &targets.valid_dates {
            let pairs = cross_section(&panel, targets, date);
            let n = pairs.len();

            let values = Array1::from_iter(pairs.iter().map(|(f, _)| *f));
            let returns = Array1::from_iter(pairs.iter().map(|(_, r)| *r));
            let ic = calculate_ic(&values, &returns, request.method);
            daily.push(DailyIc { date, ic, n });

            if let Some(day) = decile::bucket_day(date, &pairs) {
                decile_days.push(day);
            }
        }

        let summary = IcSummary::from_daily(&daily);
        let deciles = decile::aggregate(&decile_days);
        let ic_series: Vec<(Date, Option<f64>)> = daily.iter().map(|d| (d.date, d.ic)).collect();
        let rolling = rolling_stats(&ic_series, request.window);

        debug!(
            feature = name,
            source = %meta.source,
            realized_days = summary.days,
            decile_days = decile_days.len(),
            "evaluated feature"
        );

        Ok(FeatureReport {
            feature: name.to_string(),
            source: meta.source,
            daily,
            summary,
            decile_days,
            deciles,
            rolling,
        })
    }

    /// Fetch the feature's per-instrument series and key them by date.
    fn fetch_panel(
        &self,
        name: &str,
        request: &EvalRequest,
    ) -> Result<HashMap<Instrument, HashMap<Date, f64>>> {
        let mut panel = HashMap::with_capacity(request.universe.len());
        for instrument in &request.universe {
            let rows = self
                .features
                .series(name, instrument, request.from, request.to)?;
            let by_date: HashMap<Date, f64> = rows
                .into_iter()
                .filter_map(|(date, value)| value.map(|v| (date, v)))
                .collect();
            panel.insert(instrument.clone(), by_date);
        }
        Ok(panel)
    }
}

/// Assemble one day's (feature, target) pairs across the universe.
///
/// An instrument contributes only when both sides are present and finite.
fn cross_section(
    panel: &HashMap<Instrument, HashMap<Date, f64>>,
    targets: &ForwardTargets,
    date: Date,
) -> Vec<(f64, f64)> {
    let Some(day_targets) = targets.sample(date) else {
        return Vec::new();
    };

    let mut pairs: Vec<(&Instrument, f64, f64)> = day_targets
        .iter()
        .filter_map(|(instrument, &target)| {
            let feature = panel.get(instrument)?.get(&date)?;
            (feature.is_finite() && target.is_finite()).then_some((instrument, *feature, target))
        })
        .collect();

    // Deterministic sample order regardless of map iteration.
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs.into_iter().map(|(_, f, t)| (f, t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ronda_traits::{FeatureMeta, PriceBar};

    struct TablePrices {
        rows: HashMap<String, Vec<PriceBar>>,
    }

    impl PriceProvider for TablePrices {
        fn bars(&self, instrument: &str, from: Date, to: Date) -> Result<Vec<PriceBar>> {
            Ok(self
                .rows
                .get(instrument)
                .map(|bars| {
                    bars.iter()
                        .filter(|b| b.date >= from && b.date <= to)
                        .copied()
                        .collect()
                })
                .unwrap_or_default())
        }
    }

    struct TableFeatures {
        rows: HashMap<(String, String), Vec<(Date, Option<f64>)>>,
    }

    impl FeatureSource for TableFeatures {
        fn resolve(&self, name: &str) -> Result<FeatureMeta> {
            if self.rows.keys().any(|(f, _)| f == name) {
                Ok(FeatureMeta {
                    name: name.to_string(),
                    source: "daily_features".to_string(),
                    dtype: "f64".to_string(),
                })
            } else {
                Err(RondaError::UnknownFeature(name.to_string()))
            }
        }

        fn series(
            &self,
            name: &str,
            instrument: &str,
            from: Date,
            to: Date,
        ) -> Result<Vec<(Date, Option<f64>)>> {
            Ok(self
                .rows
                .get(&(name.to_string(), instrument.to_string()))
                .map(|rows| {
                    rows.iter()
                        .filter(|(d, _)| *d >= from && *d <= to)
                        .copied()
                        .collect()
                })
                .unwrap_or_default())
        }

        fn catalog(&self) -> Vec<FeatureMeta> {
            Vec::new()
        }
    }

    fn date(s: &str) -> Date {
        Date::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn calendar() -> TradingCalendar {
        TradingCalendar::from_text("2024-03-04\n2024-03-05\n2024-03-06\n2024-03-07\n").unwrap()
    }

    /// Twelve instruments whose next-day returns follow their momentum
    /// scores exactly.
    fn fixture() -> (TablePrices, TableFeatures, Vec<Instrument>) {
        let mut prices = HashMap::new();
        let mut features = HashMap::new();
        let mut universe = Vec::new();

        for k in 0..12usize {
            let instrument = format!("i{k:02}");
            let growth = 1.0 + k as f64 / 100.0;
            let bars = (0..4)
                .map(|i| {
                    let close = 100.0 * growth.powi(i);
                    PriceBar::from_open_close(
                        date("2024-03-04") + chrono::Days::new(i as u64),
                        Some(close),
                        Some(close),
                    )
                })
                .collect();
            prices.insert(instrument.clone(), bars);

            let series = (0..4)
                .map(|i| {
                    (
                        date("2024-03-04") + chrono::Days::new(i as u64),
                        Some(k as f64),
                    )
                })
                .collect();
            features.insert(("momentum".to_string(), instrument.clone()), series);
            universe.push(instrument);
        }

        (
            TablePrices { rows: prices },
            TableFeatures { rows: features },
            universe,
        )
    }

    fn request(universe: Vec<Instrument>) -> EvalRequest {
        EvalRequest {
            features: vec!["momentum".to_string()],
            universe,
            from: date("2024-03-04"),
            to: date("2024-03-07"),
            horizon: 1,
            kind: TargetKind::RetCc,
            method: CorrMethod::Spearman,
            window: 2,
        }
    }

    #[test]
    fn test_perfectly_predictive_feature() {
        let (prices, features, universe) = fixture();
        let cal = calendar();
        let evaluator = PanelEvaluator::new(&cal, &prices, &features);
        let report = evaluator.evaluate(&request(universe)).unwrap();

        assert_eq!(report.valid_dates.len(), 3);
        let feature = &report.features[0];
        assert_eq!(feature.source, "daily_features");
        assert_eq!(feature.daily.len(), 3);
        for day in &feature.daily {
            assert_eq!(day.n, 12);
            assert_relative_eq!(day.ic.unwrap(), 1.0, epsilon = 1e-10);
        }
        assert_relative_eq!(feature.summary.mean.unwrap(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(feature.summary.hit_rate.unwrap(), 1.0);

        // Monotone feature: the top decile outperforms the bottom one.
        assert_eq!(feature.decile_days.len(), 3);
        assert!(feature.deciles.spread.unwrap() > 0.0);

        assert_eq!(feature.rolling.dates.len(), 3);
        assert_relative_eq!(feature.rolling.mean[0].unwrap(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_validation_errors() {
        let (prices, features, universe) = fixture();
        let cal = calendar();
        let evaluator = PanelEvaluator::new(&cal, &prices, &features);

        let mut no_features = request(universe.clone());
        no_features.features.clear();
        assert!(matches!(
            evaluator.evaluate(&no_features).unwrap_err(),
            RondaError::MissingParameter(p) if p == "features"
        ));

        let mut no_universe = request(universe.clone());
        no_universe.universe.clear();
        assert!(matches!(
            evaluator.evaluate(&no_universe).unwrap_err(),
            RondaError::MissingParameter(p) if p == "universe"
        ));

        let mut zero_window = request(universe);
        zero_window.window = 0;
        assert!(matches!(
            evaluator.evaluate(&zero_window).unwrap_err(),
            RondaError::InvalidWindow(0)
        ));
    }

    #[test]
    fn test_unknown_feature_fails() {
        let (prices, features, universe) = fixture();
        let cal = calendar();
        let evaluator = PanelEvaluator::new(&cal, &prices, &features);

        let mut bad = request(universe);
        bad.features = vec!["no_such_feature".to_string()];
        assert!(matches!(
            evaluator.evaluate(&bad).unwrap_err(),
            RondaError::UnknownFeature(_)
        ));
    }

    #[test]
    fn test_missing_data_is_not_an_error() {
        let (_, features, universe) = fixture();
        let prices = TablePrices {
            rows: HashMap::new(),
        };
        let cal = calendar();
        let evaluator = PanelEvaluator::new(&cal, &prices, &features);
        let report = evaluator.evaluate(&request(universe)).unwrap();

        let feature = &report.features[0];
        assert_eq!(feature.daily.len(), 3);
        assert!(feature.daily.iter().all(|d| d.ic.is_none() && d.n == 0));
        assert_eq!(feature.summary.days, 0);
        assert!(feature.decile_days.is_empty());
        assert!(feature.deciles.spread.is_none());
    }

    #[test]
    fn test_small_cross_section_skips_deciles_keeps_ic() {
        let (prices, features, universe) = fixture();
        let cal = calendar();
        let evaluator = PanelEvaluator::new(&cal, &prices, &features);

        // Four instruments: enough for an IC, too few for deciles.
        let small = request(universe.into_iter().take(4).collect());
        let report = evaluator.evaluate(&small).unwrap();

        let feature = &report.features[0];
        assert!(feature.daily.iter().all(|d| d.ic.is_some()));
        assert!(feature.decile_days.is_empty());
    }
}
