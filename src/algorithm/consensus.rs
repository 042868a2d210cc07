//! Ensemble consensus
//!
//! Reconciles per-method interpretations into one decision:
//!
//! 1. Count methods at `alert` and at `watch`. Methods that could not be
//!    evaluated are left out of every count.
//! 2. `alert` needs at least two alerting methods. A single alerting method,
//!    or any method on watch, gives `attention`. Otherwise `stable`.
//! 3. When the data are too thin (`overallN < 20` or fewer than 4 weekly
//!    points) a note is attached, and an `alert` becomes `attention`.
//!
//! Every call starts from scratch; there is no transition history.

use std::collections::BTreeMap;

use log::info;

use crate::algorithm::quality::{MIN_OVERALL_N, MIN_WEEKS_COVERAGE};
use crate::models::{
    AlertLevel, ConfidenceLevel, ConsensusCounts, ConsensusDecision, DataQuality, Decision,
    Interpretation, MethodVerdict,
};

/// Methods that must alert together for an `alert` decision
pub const MIN_ALERTING_METHODS: usize = 2;

/// Decision from alert and watch counts, before any data-quality downgrade
#[must_use]
pub const fn decide(counts: ConsensusCounts) -> Decision {
    if counts.alert >= MIN_ALERTING_METHODS {
        Decision::Alert
    } else if counts.alert == 1 || counts.watch >= 1 {
        Decision::Attention
    } else {
        Decision::Stable
    }
}

/// Ensemble confidence over the participating methods
#[must_use]
pub fn ensemble_confidence(levels: &[ConfidenceLevel]) -> ConfidenceLevel {
    if levels.len() <= 1 {
        return ConfidenceLevel::Low;
    }
    let low = levels.iter().filter(|c| **c == ConfidenceLevel::Low).count();
    let high = levels.iter().filter(|c| **c == ConfidenceLevel::High).count();

    if low == 0 && high > 0 {
        ConfidenceLevel::High
    } else if low * 2 > levels.len() {
        ConfidenceLevel::Low
    } else {
        ConfidenceLevel::Medium
    }
}

/// Combine interpretations under the data-quality downgrade rule
#[must_use]
pub fn reach_consensus(interpretations: &[Interpretation], quality: &DataQuality) -> ConsensusDecision {
    let (participating, excluded): (Vec<&Interpretation>, Vec<&Interpretation>) =
        interpretations.iter().partition(|i| i.evaluated);

    let counts = ConsensusCounts {
        alert: participating
            .iter()
            .filter(|i| i.alert_level == AlertLevel::Alert)
            .count(),
        watch: participating
            .iter()
            .filter(|i| i.alert_level == AlertLevel::Watch)
            .count(),
    };

    let per_method: BTreeMap<_, _> = participating
        .iter()
        .map(|i| {
            (
                i.method,
                MethodVerdict {
                    alert_level: i.alert_level,
                    confidence_level: i.confidence_level,
                },
            )
        })
        .collect();
    let levels: Vec<ConfidenceLevel> = participating.iter().map(|i| i.confidence_level).collect();

    let mut notes = Vec::new();
    let mut decision = decide(counts);

    if !excluded.is_empty() {
        let names: Vec<&str> = excluded.iter().map(|i| i.method.name()).collect();
        notes.push(format!(
            "Not enough data to evaluate the latest week with: {}",
            names.join(", ")
        ));
    }
    if counts.alert == 1 && decision == Decision::Attention {
        notes.push(
            "Only one method crossed its control limit; reported as attention until another method agrees"
                .to_string(),
        );
    }

    let mut downgraded = false;
    if quality.is_insufficient() {
        notes.push(format!(
            "Limited data: {} observations over {} weeks (at least {} observations and {} weeks are needed for an alert)",
            quality.overall_n, quality.weeks_coverage, MIN_OVERALL_N, MIN_WEEKS_COVERAGE
        ));
        if decision == Decision::Alert {
            decision = Decision::Attention;
            downgraded = true;
            notes.push(
                "Alert downgraded to attention: method agreement on this little data is not reliable enough"
                    .to_string(),
            );
            info!(
                "Downgraded alert to attention ({} observations, {} weeks)",
                quality.overall_n, quality.weeks_coverage
            );
        }
    }

    ConsensusDecision {
        decision,
        confidence: ensemble_confidence(&levels),
        counts,
        per_method,
        excluded_methods: excluded.iter().map(|i| i.method).collect(),
        data_quality: quality.clone(),
        downgraded,
        notes,
    }
}
