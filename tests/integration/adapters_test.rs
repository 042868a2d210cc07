//! Tests for normalizing external shapes at the boundary

use lab_surveillance::adapters::{adapt_method_result, adapt_rows};
use lab_surveillance::algorithm::consensus::reach_consensus;
use lab_surveillance::algorithm::{interpret, quality};
use lab_surveillance::models::{AlertLevel, Sex};
use lab_surveillance::{Decision, Method};
use serde_json::json;

use crate::utils::series_from_counts;

#[test]
fn test_heterogeneous_rows_adapt_to_one_shape() {
    let rows = vec![
        json!({"scopeId": "F-01", "testCode": "HGB", "value": 11.0, "collectedAt": "2024-05-06", "sex": "F", "ageYears": 3}),
        json!({"facility": "F-01", "test": "HGB", "result": "11.0", "date": "2024-05-06T10:00:00+03:00", "gender": "male", "age": "3"}),
        json!({"scope_id": "F-01", "test_code": "HGB", "resultValue": 11, "collected_at": "2024-05-06 09:30:00", "age_years": 3.0}),
        json!({"scopeId": "F-01", "testCode": "HGB", "value": "n/a", "collectedAt": "2024-05-06"}),
    ];
    let adapted = adapt_rows(&rows);
    assert_eq!(adapted.rejected, 1);
    assert_eq!(adapted.observations.len(), 3);

    let first = &adapted.observations[0];
    for obs in &adapted.observations {
        assert_eq!(obs.scope_id, first.scope_id);
        assert_eq!(obs.test_code, first.test_code);
        assert_eq!(obs.value, first.value);
        assert_eq!(obs.collected_at, first.collected_at);
        assert_eq!(obs.age_years, Some(3.0));
    }
    assert_eq!(adapted.observations[1].sex, Sex::Male);
    assert_eq!(adapted.observations[2].sex, Sex::Unknown);
}

#[test]
fn test_external_results_feed_consensus() {
    let ewma = json!({
        "method": "ewma",
        "points": [
            {"week": "2024-W08", "ewma": 0.05, "ucl": 0.09, "n": 40},
            {"week": "2024-W09", "ewma": 0.05, "ucl": 0.09, "n": 40},
            {"week": "2024-W10", "ewma": 0.06, "ucl": 0.09, "n": 40},
            {"week": "2024-W11", "ewma": 0.12, "ucl": 0.09, "n": 40, "signal": true}
        ]
    });
    let farrington = json!({
        "method": "Farrington",
        "results": [
            {"week": "2024-W11", "observed": 0.30, "upper": 0.20, "total": 40, "flag": "yes"}
        ]
    });
    let results = [
        adapt_method_result(&ewma).unwrap(),
        adapt_method_result(&farrington).unwrap(),
    ];
    assert_eq!(results[1].method, Method::Farrington);

    let interpretations: Vec<_> = results.iter().map(interpret).collect();
    assert!(interpretations
        .iter()
        .all(|i| i.alert_level == AlertLevel::Alert));

    // Enough data behind the external series for an alert to stand
    let series = series_from_counts(&[(40, 2); 12]);
    let decision = reach_consensus(&interpretations, &quality::evaluate(&series, &results));
    assert_eq!(decision.decision, Decision::Alert);
}
