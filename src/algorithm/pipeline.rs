//! Surveillance pipeline
//!
//! Runs one request end to end: aggregate observations into weekly series,
//! resolve detector parameters, run the selected detectors, interpret their
//! latest week, evaluate data quality and reach consensus. Nothing is cached
//! between calls, so identical inputs always give identical reports.

use std::collections::BTreeMap;
use std::time::Instant;

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::algorithm::aggregation::WeeklyAggregator;
use crate::algorithm::consensus::reach_consensus;
use crate::algorithm::detection::run_methods;
use crate::algorithm::interpretation::interpret;
use crate::algorithm::quality;
use crate::config::SurveillanceConfig;
use crate::models::{
    ConsensusDecision, DataQuality, Interpretation, MethodResult, MethodSelection, Observation,
    SeriesKey, WeeklySeries,
};
use crate::parameters::{ParameterRequest, ParameterResolver, ResolvedParameters};
use crate::registry::SignalDefinition;
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Full output for one weekly series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveillanceReport {
    /// Series the report is about
    pub series_key: SeriesKey,
    /// Parameters the detectors ran with
    pub parameters: ResolvedParameters,
    /// Raw detector output, in canonical method order
    pub methods: Vec<MethodResult>,
    /// Latest-week interpretation per method
    pub interpretations: Vec<Interpretation>,
    /// Data behind the decision
    pub data_quality: DataQuality,
    /// Reconciled decision
    pub consensus: ConsensusDecision,
}

impl SurveillanceReport {
    /// One-line summary for logs
    #[must_use]
    pub fn summary(&self) -> String {
        let week = self
            .interpretations
            .iter()
            .find_map(|i| i.week)
            .map_or_else(|| "-".to_string(), |w| w.to_string());
        format!(
            "{} [{}]: {} ({} confidence, {} alert / {} watch, n={}, weeks={}{})",
            self.series_key,
            week,
            self.consensus.decision,
            self.consensus.confidence,
            self.consensus.counts.alert,
            self.consensus.counts.watch,
            self.data_quality.overall_n,
            self.data_quality.weeks_coverage,
            if self.consensus.downgraded {
                ", downgraded"
            } else {
                ""
            }
        )
    }
}

/// Stateless evaluator over weekly series
#[derive(Debug, Clone, Default)]
pub struct SurveillancePipeline {
    config: SurveillanceConfig,
}

impl SurveillancePipeline {
    /// Pipeline with an explicit engine configuration
    #[must_use]
    pub const fn new(config: SurveillanceConfig) -> Self {
        Self { config }
    }

    /// Engine configuration in use
    #[must_use]
    pub const fn config(&self) -> &SurveillanceConfig {
        &self.config
    }

    /// Evaluate one weekly series with already-resolved parameters
    #[must_use]
    pub fn evaluate(
        &self,
        series: &WeeklySeries,
        parameters: &ResolvedParameters,
        selection: &MethodSelection,
    ) -> SurveillanceReport {
        let label = series.key.to_string();
        log_operation_start("Evaluating", &label);

        let methods = run_methods(series, selection, &parameters.config, &self.config);
        for result in methods.iter().filter(|r| !r.status.is_evaluated()) {
            debug!("{} on {}: {:?}", result.method, label, result.status);
        }

        let interpretations: Vec<Interpretation> = methods.iter().map(interpret).collect();
        let data_quality = quality::evaluate(series, &methods);
        let consensus = reach_consensus(&interpretations, &data_quality);

        let report = SurveillanceReport {
            series_key: series.key.clone(),
            parameters: parameters.clone(),
            methods,
            interpretations,
            data_quality,
            consensus,
        };
        debug!("{}", report.summary());
        report
    }

    /// Aggregate, resolve and evaluate the pooled series for one selection
    #[must_use]
    pub fn evaluate_observations(
        &self,
        scope_id: &str,
        observations: &[Observation],
        signal: &SignalDefinition,
        request: &ParameterRequest,
        selection: &MethodSelection,
    ) -> SurveillanceReport {
        let series = WeeklyAggregator::new(signal).aggregate(scope_id, observations);
        let parameters = ParameterResolver::new().resolve(request);
        self.evaluate(&series, &parameters, selection)
    }

    /// Evaluate the pooled series and every (sex, age band) stratum independently.
    ///
    /// Reports are keyed by series, so the pooled report and the strata come
    /// out in a fixed order whether or not they were evaluated in parallel.
    #[must_use]
    pub fn evaluate_stratified(
        &self,
        scope_id: &str,
        observations: &[Observation],
        signal: &SignalDefinition,
        request: &ParameterRequest,
        selection: &MethodSelection,
    ) -> BTreeMap<SeriesKey, SurveillanceReport> {
        let start = Instant::now();
        let all = WeeklyAggregator::new(signal).aggregate_stratified(scope_id, observations);
        let parameters = ParameterResolver::new().resolve(request);

        let reports: BTreeMap<SeriesKey, SurveillanceReport> = if self.config.use_parallel {
            all.par_iter()
                .map(|(key, series)| (key.clone(), self.evaluate(series, &parameters, selection)))
                .collect()
        } else {
            all.iter()
                .map(|(key, series)| (key.clone(), self.evaluate(series, &parameters, selection)))
                .collect()
        };

        log_operation_complete(
            "evaluated",
            &format!("{scope_id}/{}", signal.test_code),
            reports.len(),
            Some(start.elapsed()),
        );
        reports
    }
}
