//! Tests for preset resolution and override bounding

use lab_surveillance::parameters::{
    BOUNDS, DEFAULT_PRESET, OverrideValue, ParameterAdjustment, ParameterField, ParameterOverrides,
    ParameterRequest, ParameterResolver, Preset, within_bounds,
};
use proptest::prelude::*;

fn resolve(request: &ParameterRequest) -> lab_surveillance::parameters::ResolvedParameters {
    ParameterResolver::new().resolve(request)
}

#[test]
fn test_default_request_uses_the_locked_default() {
    let resolved = resolve(&ParameterRequest::default());
    assert_eq!(resolved.preset, DEFAULT_PRESET);
    assert!(resolved.locked);
    assert!(!resolved.overridden);
    assert_eq!(resolved.config, Preset::Standard.config());
    assert!(resolved.adjustments.is_empty());
}

#[test]
fn test_unknown_preset_falls_back_to_default() {
    let resolved = resolve(&ParameterRequest::preset("aggressive"));
    assert_eq!(resolved.preset, Preset::Standard);
    assert!(resolved.locked);
}

#[test]
fn test_non_default_preset_is_not_locked() {
    let resolved = resolve(&ParameterRequest::preset("HIGH"));
    assert_eq!(resolved.preset, Preset::High);
    assert!(!resolved.locked);
    assert_eq!(resolved.config.ewma.lambda, 0.4);
    assert_eq!(resolved.config.cusum.h, 3.0);
    assert_eq!(resolved.config.farrington.z, 1.65);
}

#[test]
fn test_overrides_need_advanced_mode() {
    let overrides = ParameterOverrides::new().with(ParameterField::EwmaLambda, 0.45);
    let request = ParameterRequest {
        preset: Some("standard".to_string()),
        advanced: false,
        overrides,
    };
    let resolved = resolve(&request);
    assert_eq!(resolved.config, Preset::Standard.config());
    assert!(!resolved.overridden);
}

#[test]
fn test_out_of_range_overrides_are_clamped() {
    let overrides = ParameterOverrides::new()
        .with(ParameterField::EwmaLambda, 0.9)
        .with(ParameterField::CusumK, 0.01)
        .with(ParameterField::FarringtonBaselineWeeks, 3.6);
    let resolved = resolve(&ParameterRequest::advanced(Some("low"), overrides));

    assert_eq!(resolved.config.ewma.lambda, 0.5);
    assert_eq!(resolved.config.cusum.k, 0.1);
    // 3.6 rounds to 4, which is inside the bounds
    assert_eq!(resolved.config.farrington.baseline_weeks, 4);
    assert!(resolved.overridden);
    assert!(!resolved.locked);

    assert_eq!(resolved.adjustments.len(), 2);
    assert!(resolved.adjustments.contains(&ParameterAdjustment::Clamped {
        field: ParameterField::EwmaLambda,
        requested: 0.9,
        applied: 0.5,
    }));
}

#[test]
fn test_invalid_overrides_are_ignored() {
    let overrides = ParameterOverrides::from_pairs([
        ("ewma_L", "wide"),
        ("cusum_h", "4"),
        ("shewhart_limit", "3"),
    ]);
    let resolved = resolve(&ParameterRequest::advanced(None, overrides));

    assert_eq!(resolved.config.ewma.l, Preset::Standard.config().ewma.l);
    assert_eq!(resolved.config.cusum.h, 4.0);
    assert_eq!(
        resolved.adjustments,
        vec![ParameterAdjustment::Ignored {
            field: ParameterField::EwmaL,
            raw: "wide".to_string(),
        }]
    );
    // Still the default preset, so still locked even though a value changed
    assert!(resolved.locked);
    assert!(resolved.overridden);
}

#[test]
fn test_resolved_parameters_serialize_in_camel_case() {
    let overrides = ParameterOverrides::new().with(ParameterField::CusumH, 50.0);
    let resolved = resolve(&ParameterRequest::advanced(Some("standard"), overrides));
    let json = serde_json::to_value(&resolved).unwrap();

    assert_eq!(json["preset"], "standard");
    assert_eq!(json["config"]["ewma"]["L"], 3.0);
    assert_eq!(json["config"]["cusum"]["h"], 10.0);
    assert_eq!(json["adjustments"][0]["kind"], "clamped");
    assert_eq!(json["adjustments"][0]["field"], "cusumH");
}

#[test]
fn test_every_preset_is_within_bounds() {
    for preset in Preset::ALL {
        assert!(within_bounds(&preset.config()), "{preset} is out of bounds");
    }
    assert_eq!(BOUNDS.cusum_h.max, 10.0);
}

fn raw_value() -> impl Strategy<Value = OverrideValue> {
    prop_oneof![
        any::<f64>().prop_map(OverrideValue::Number),
        (-1000.0f64..1000.0).prop_map(OverrideValue::Number),
        "[a-z0-9.]{0,6}".prop_map(OverrideValue::Text),
    ]
}

proptest! {
    #[test]
    fn prop_resolved_config_is_always_within_bounds(
        preset in prop::option::of("[a-zA-Z]{0,10}"),
        advanced in any::<bool>(),
        values in prop::collection::vec(raw_value(), 8),
    ) {
        let overrides = ParameterField::ALL
            .into_iter()
            .zip(values)
            .fold(ParameterOverrides::new(), |acc, (field, value)| acc.with(field, value));
        let request = ParameterRequest { preset, advanced, overrides };
        let resolved = resolve(&request);

        prop_assert!(within_bounds(&resolved.config));
        prop_assert_eq!(resolved.locked, resolved.preset == DEFAULT_PRESET);
        if !advanced {
            prop_assert!(resolved.adjustments.is_empty());
            prop_assert!(!resolved.overridden);
        }
        for adjustment in &resolved.adjustments {
            if let ParameterAdjustment::Clamped { field, applied, .. } = adjustment {
                prop_assert!(field.bounds().contains(*applied));
            }
        }
    }
}
