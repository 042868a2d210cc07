//! Tests for loading observation rows from JSON files

use lab_surveillance::{
    Decision, JsonRowLoader, MethodSelection, ParameterRequest, RowLoader, Selection,
    SurveillanceError, SurveillancePipeline, signal,
};
use serde_json::json;

use crate::utils::temp_file;

#[tokio::test]
async fn test_ndjson_rows_are_filtered_and_sorted() {
    let path = temp_file("rows.ndjson");
    let rows = [
        json!({"scopeId": "F-01", "testCode": "HGB", "value": 10.1, "collectedAt": "2024-02-12"}),
        json!({"facility": "F-02", "test": "HGB", "result": 13.0, "date": "2024-02-05"}),
        json!({"scope_id": "F-01", "test_code": "hgb", "resultValue": "12.4", "collected_at": "2024-02-05"}),
        json!({"scopeId": "F-01", "testCode": "LDL", "value": 170, "collectedAt": "2024-02-06"}),
        json!({"scopeId": "F-01", "testCode": "HGB", "collectedAt": "2024-02-07"}),
    ];
    let content: Vec<String> = rows.iter().map(ToString::to_string).collect();
    std::fs::write(&path, content.join("\n")).unwrap();

    let loader = JsonRowLoader::new(&path);
    let selection = Selection::test("HGB").in_scope("F-01");
    let observations = loader.load(&selection).await.unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(observations.len(), 2);
    assert!(observations.iter().all(|o| o.scope_id == "F-01"));
    assert!(observations[0].collected_at < observations[1].collected_at);
    assert!((observations[0].value - 12.4).abs() < 1e-12);
}

#[tokio::test]
async fn test_json_array_across_scopes() {
    let path = temp_file("rows.json");
    let rows = json!([
        {"scopeId": "F-01", "testCode": "HGB", "value": 10.1, "collectedAt": "2024-02-12"},
        {"scopeId": "F-02", "testCode": "HGB", "value": 13.0, "collectedAt": "2024-02-05"}
    ]);
    std::fs::write(&path, rows.to_string()).unwrap();

    let observations = JsonRowLoader::new(&path)
        .load(&Selection::test("HGB"))
        .await
        .unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(observations.len(), 2);
    assert_eq!(observations[0].scope_id, "F-02");
}

#[tokio::test]
async fn test_missing_file_is_a_file_error() {
    let loader = JsonRowLoader::new(temp_file("does_not_exist.json"));
    let result = loader.load(&Selection::test("HGB")).await;
    assert!(matches!(result, Err(SurveillanceError::File { .. })));
}

#[tokio::test]
async fn test_loaded_rows_feed_the_pipeline() {
    let path = temp_file("weekly.ndjson");
    let mut lines = Vec::new();
    for week in 0..12i64 {
        let monday = crate::utils::first_monday() + chrono::Duration::weeks(week);
        for i in 0..30 {
            // Constant 10% anemia among adult women
            let value = if i < 3 { 10.0 } else { 13.8 };
            lines.push(
                json!({
                    "scopeId": "F-01",
                    "testCode": "HGB",
                    "value": value,
                    "unit": "g/dL",
                    "collectedAt": monday.to_string(),
                    "sex": "female",
                    "ageYears": 28
                })
                .to_string(),
            );
        }
    }
    std::fs::write(&path, lines.join("\n")).unwrap();

    let selection = Selection::test("HGB").in_scope("F-01");
    let observations = JsonRowLoader::new(&path).load(&selection).await.unwrap();
    std::fs::remove_file(&path).ok();

    let report = SurveillancePipeline::default().evaluate_observations(
        selection.scope_label(),
        &observations,
        signal("anemia").unwrap(),
        &ParameterRequest::default(),
        &MethodSelection::all(),
    );
    assert_eq!(report.data_quality.overall_n, 360);
    assert_eq!(report.consensus.decision, Decision::Stable);
    assert!(report.consensus.excluded_methods.is_empty());
}
