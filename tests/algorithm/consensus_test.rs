//! Tests for ensemble consensus and the data-quality downgrade

use lab_surveillance::algorithm::consensus::reach_consensus;
use lab_surveillance::models::{AlertLevel, ConfidenceLevel, DataQuality};
use lab_surveillance::{Decision, Method};
use proptest::prelude::*;

use crate::utils::{good_quality, interpretation, unevaluated};

use AlertLevel::{Alert, Info, Watch};
use ConfidenceLevel::{High, Low, Medium};

#[test]
fn test_two_alerts_make_an_alert() {
    let interpretations = vec![
        interpretation(Method::Ewma, Alert, High),
        interpretation(Method::Cusum, Alert, High),
        interpretation(Method::Farrington, Info, High),
    ];
    let decision = reach_consensus(&interpretations, &good_quality());
    assert_eq!(decision.decision, Decision::Alert);
    assert_eq!(decision.confidence, High);
    assert_eq!(decision.counts.alert, 2);
    assert!(!decision.downgraded);
    assert!(decision.notes.is_empty());
    assert_eq!(decision.per_method.len(), 3);
}

#[test]
fn test_single_alert_is_attention_with_a_note() {
    let interpretations = vec![
        interpretation(Method::Ewma, Alert, High),
        interpretation(Method::Cusum, Info, High),
        interpretation(Method::Farrington, Info, Medium),
    ];
    let decision = reach_consensus(&interpretations, &good_quality());
    assert_eq!(decision.decision, Decision::Attention);
    assert_eq!(decision.notes.len(), 1);
    assert_eq!(decision.confidence, High);
}

#[test]
fn test_watch_is_attention() {
    let interpretations = vec![
        interpretation(Method::Ewma, Watch, Medium),
        interpretation(Method::Cusum, Info, Medium),
    ];
    let decision = reach_consensus(&interpretations, &good_quality());
    assert_eq!(decision.decision, Decision::Attention);
    assert_eq!(decision.counts.watch, 1);
}

#[test]
fn test_unevaluated_methods_do_not_count() {
    let interpretations = vec![
        interpretation(Method::Ewma, Alert, High),
        unevaluated(Method::Cusum),
        unevaluated(Method::Farrington),
    ];
    let decision = reach_consensus(&interpretations, &good_quality());
    assert_eq!(decision.decision, Decision::Attention);
    assert_eq!(decision.excluded_methods, vec![Method::Cusum, Method::Farrington]);
    assert_eq!(decision.per_method.len(), 1);
    // One participant is never enough for more than low confidence
    assert_eq!(decision.confidence, Low);
}

#[test]
fn test_no_methods_is_stable() {
    let decision = reach_consensus(&[], &good_quality());
    assert_eq!(decision.decision, Decision::Stable);
    assert_eq!(decision.confidence, Low);
}

#[test]
fn test_sparse_data_downgrades_alert() {
    let sparse = DataQuality {
        overall_n: 15,
        weeks_coverage: 3,
        recent_n: Some(5),
        small_n: true,
        sparse_series: true,
    };
    let interpretations = vec![
        interpretation(Method::Ewma, Alert, Low),
        interpretation(Method::Cusum, Alert, Low),
        interpretation(Method::Farrington, Alert, Low),
    ];
    let decision = reach_consensus(&interpretations, &sparse);
    assert_eq!(decision.decision, Decision::Attention);
    assert!(decision.downgraded);
    assert_eq!(decision.counts.alert, 3);
    assert_eq!(decision.notes.len(), 2);
    assert_eq!(decision.data_quality, sparse);
}

#[test]
fn test_sparse_data_without_alert_only_adds_a_note() {
    let thin = DataQuality {
        overall_n: 12,
        ..good_quality()
    };
    let interpretations = vec![
        interpretation(Method::Ewma, Info, Low),
        interpretation(Method::Cusum, Info, Low),
    ];
    let decision = reach_consensus(&interpretations, &thin);
    assert_eq!(decision.decision, Decision::Stable);
    assert!(!decision.downgraded);
    assert_eq!(decision.notes.len(), 1);
}

fn level() -> impl Strategy<Value = AlertLevel> {
    prop_oneof![Just(Info), Just(Watch), Just(Alert)]
}

fn confidence() -> impl Strategy<Value = ConfidenceLevel> {
    prop_oneof![Just(Low), Just(Medium), Just(High)]
}

fn quality() -> impl Strategy<Value = DataQuality> {
    (0u64..200, 0usize..30).prop_map(|(overall_n, weeks_coverage)| DataQuality {
        overall_n,
        weeks_coverage,
        recent_n: None,
        small_n: overall_n < 20,
        sparse_series: weeks_coverage > 0 && weeks_coverage < 4,
    })
}

proptest! {
    #[test]
    fn prop_decision_follows_the_counting_rule(
        levels in prop::collection::vec((level(), confidence(), any::<bool>()), 0..=3),
        data_quality in quality(),
    ) {
        let interpretations: Vec<_> = levels
            .iter()
            .zip(Method::ALL)
            .map(|(&(level, conf, evaluated), method)| {
                if evaluated { interpretation(method, level, conf) } else { unevaluated(method) }
            })
            .collect();
        let decision = reach_consensus(&interpretations, &data_quality);

        let counted = |wanted: AlertLevel| levels
            .iter()
            .filter(|&&(level, _, evaluated)| evaluated && level == wanted)
            .count();
        let alerts = counted(Alert);
        let watches = counted(Watch);
        prop_assert_eq!(decision.counts.alert, alerts);
        prop_assert_eq!(decision.counts.watch, watches);

        let insufficient = data_quality.overall_n < 20 || data_quality.weeks_coverage < 4;
        let expected = if alerts >= 2 && !insufficient {
            Decision::Alert
        } else if alerts >= 1 || watches >= 1 {
            Decision::Attention
        } else {
            Decision::Stable
        };
        prop_assert_eq!(decision.decision, expected);
        prop_assert_eq!(decision.downgraded, alerts >= 2 && insufficient);

        // No alert ever survives thin data
        if insufficient {
            prop_assert_ne!(decision.decision, Decision::Alert);
        }
    }
}
