//! Tests for the EWMA, CUSUM and Farrington-style detectors

use lab_surveillance::algorithm::detection::{
    CusumDetector, Detector, EwmaDetector, FarringtonDetector, run_methods,
};
use lab_surveillance::models::MethodStatus;
use lab_surveillance::parameters::Preset;
use lab_surveillance::{Method, MethodSelection, SurveillanceConfig};

use crate::utils::{outbreak_series, series_from_counts, series_from_rates};

fn standard() -> lab_surveillance::parameters::SensitivityConfig {
    Preset::Standard.config()
}

#[test]
fn test_stationary_series_never_alerts() {
    let config = SurveillanceConfig::default();
    for preset in Preset::ALL {
        let params = preset.config();
        let series = series_from_counts(&[(40, 4); 40]);
        let results = run_methods(&series, &MethodSelection::all(), &params, &config);

        assert_eq!(results.len(), 3);
        for result in &results {
            assert_eq!(result.status, MethodStatus::Evaluated, "{preset} {}", result.method);
            assert_eq!(result.alert_weeks(), 0, "{preset} {} alerted", result.method);
        }
    }
}

#[test]
fn test_all_zero_series_never_alerts() {
    let config = SurveillanceConfig::default();
    let series = series_from_counts(&[(25, 0); 20]);
    for result in run_methods(&series, &MethodSelection::all(), &standard(), &config) {
        assert_eq!(result.alert_weeks(), 0, "{} alerted on zeros", result.method);
        let latest = result.latest().unwrap();
        assert!(latest.control_limit.unwrap() > 0.0);
    }
}

#[test]
fn test_one_point_per_week_in_order() {
    let config = SurveillanceConfig::default();
    let series = series_from_counts(&[(30, 3), (0, 0), (30, 2), (30, 4), (30, 3), (30, 3)]);
    for result in run_methods(&series, &MethodSelection::all(), &standard(), &config) {
        assert_eq!(result.points.len(), series.len());
        for (point, bucket) in result.points.iter().zip(&series.buckets) {
            assert_eq!(point.week, bucket.week);
            assert_eq!(point.n, bucket.n);
        }
    }
}

#[test]
fn test_gap_weeks_have_no_limit_and_carry_the_statistic() {
    let config = SurveillanceConfig::default();
    let mut counts = vec![(40, 4); 10];
    counts.push((0, 0));
    counts.push((40, 4));
    let series = series_from_counts(&counts);

    let ewma = EwmaDetector::new(standard().ewma, config.clone()).detect(&series);
    let gap = &ewma.points[10];
    assert_eq!(gap.n, 0);
    assert_eq!(gap.control_limit, None);
    assert!(!gap.alert);
    assert_eq!(gap.statistic, ewma.points[9].statistic);
    // The week after the gap is evaluated again
    assert!(ewma.points[11].control_limit.is_some());

    let cusum = CusumDetector::new(standard().cusum, config.clone()).detect(&series);
    assert_eq!(cusum.points[10].control_limit, None);
    assert_eq!(cusum.points[10].statistic, cusum.points[9].statistic);

    let farrington = FarringtonDetector::new(standard().farrington, config).detect(&series);
    let gap = &farrington.points[10];
    assert_eq!(gap.control_limit, None);
    assert!(!gap.alert);
    assert_eq!(gap.statistic, farrington.points[9].statistic);
    assert!((gap.statistic - 0.1).abs() < 1e-12);
}

/// Weekly rate with an eight-week winter peak starting at week 20 of every 52
fn seasonal_rate(index: usize) -> (u32, f64) {
    if (20..28).contains(&(index % 52)) {
        (100, 0.30)
    } else {
        (100, 0.05)
    }
}

#[test]
fn test_seasonal_peak_is_expected_from_earlier_years() {
    // First peak of year three, preceded by eight quiet weeks
    let onset = 2 * 52 + 20;
    let rates: Vec<_> = (0..=onset).map(seasonal_rate).collect();
    // The earliest peaks are flagged against quiet weeks and must stay in history
    let config = SurveillanceConfig::builder().exclude_signal_weeks(false).build();
    let detector = FarringtonDetector::new(standard().farrington, config);

    let seasonal = detector.detect(&series_from_rates(&rates));
    let peak = seasonal.latest().unwrap();
    assert!((peak.statistic - 0.30).abs() < 1e-12);
    assert!(!peak.alert, "limit {:?}", peak.control_limit);
    assert!(peak.control_limit.unwrap() > 0.4);
    // Without earlier seasons the first peak week of year one was flagged
    assert!(seasonal.points[20].alert);

    // Same weeks with no earlier year to compare against
    let trailing = detector.detect(&series_from_rates(&rates[onset - 24..]));
    let peak = trailing.latest().unwrap();
    assert!((peak.statistic - 0.30).abs() < 1e-12);
    assert!(peak.alert);
    assert!(peak.control_limit.unwrap() < 0.1);
}

#[test]
fn test_single_event_after_zero_weeks_stays_within_chart_limits() {
    let config = SurveillanceConfig::default();
    let mut counts = vec![(25, 0); 10];
    counts.push((25, 1));
    let series = series_from_counts(&counts);

    let ewma = EwmaDetector::new(standard().ewma, config.clone()).detect(&series);
    let latest = ewma.latest().unwrap();
    assert!(!latest.alert, "ewma {} over {:?}", latest.statistic, latest.control_limit);
    assert!(latest.control_limit.unwrap() > 0.012);

    let cusum = CusumDetector::new(standard().cusum, config).detect(&series);
    let latest = cusum.latest().unwrap();
    assert!(!latest.alert, "cusum {}", latest.statistic);
    assert!(latest.statistic < 4.0);
}

#[test]
fn test_short_series_reports_insufficient_data() {
    let config = SurveillanceConfig::default();
    let series = series_from_counts(&[(20, 2), (20, 3), (20, 1)]);

    let ewma = EwmaDetector::new(standard().ewma, config.clone()).detect(&series);
    assert_eq!(ewma.status, MethodStatus::InsufficientData);
    assert!(ewma.points.iter().all(|p| p.control_limit.is_none() && !p.alert));

    let cusum = CusumDetector::new(standard().cusum, config.clone()).detect(&series);
    assert_eq!(cusum.status, MethodStatus::InsufficientData);
    assert!(cusum.points.iter().all(|p| p.statistic == 0.0));

    let farrington = FarringtonDetector::new(standard().farrington, config).detect(&series);
    assert_eq!(farrington.status, MethodStatus::InsufficientHistory);
}

#[test]
fn test_empty_series() {
    let config = SurveillanceConfig::default();
    let series = series_from_counts(&[]);
    for result in run_methods(&series, &MethodSelection::all(), &standard(), &config) {
        assert!(result.points.is_empty());
        assert_eq!(result.status, MethodStatus::InsufficientData);
    }
}

#[test]
fn test_outbreak_is_detected_by_every_method() {
    let config = SurveillanceConfig::default();
    let series = outbreak_series(8, 3);
    let results = run_methods(&series, &MethodSelection::all(), &standard(), &config);

    for result in &results {
        let latest = result.latest().unwrap();
        assert!(latest.alert, "{} missed the outbreak", result.method);
        // The first eight weeks are in control
        assert!(result.points[..8].iter().all(|p| !p.alert));
    }

    let ewma = &results[0];
    assert_eq!(ewma.method, Method::Ewma);
    let latest = ewma.latest().unwrap();
    assert!((latest.statistic - 0.345_65).abs() < 1e-4);
    assert!(latest.control_limit.unwrap() < 0.1);
}

#[test]
fn test_flagged_weeks_do_not_contaminate_the_baseline() {
    let series = outbreak_series(8, 6);
    let excluding = SurveillanceConfig::default();
    let including = SurveillanceConfig::builder().exclude_signal_weeks(false).build();

    let kept = EwmaDetector::new(standard().ewma, excluding).detect(&series);
    let mixed = EwmaDetector::new(standard().ewma, including).detect(&series);

    let kept_limit = kept.latest().unwrap().control_limit.unwrap();
    let mixed_limit = mixed.latest().unwrap().control_limit.unwrap();
    assert!(kept_limit < mixed_limit);
    assert!(kept.latest().unwrap().alert);
}

#[test]
fn test_higher_sensitivity_gives_tighter_limits() {
    let config = SurveillanceConfig::default();
    let series = series_from_rates(&[(60, 0.1); 16]);

    let limit = |preset: Preset| {
        let result =
            FarringtonDetector::new(preset.config().farrington, config.clone()).detect(&series);
        result.latest().unwrap().control_limit.unwrap()
    };
    assert!(limit(Preset::High) < limit(Preset::Standard));
    assert!(limit(Preset::Standard) < limit(Preset::Low));
}

#[test]
fn test_selection_controls_which_methods_run() {
    let config = SurveillanceConfig::default();
    let series = series_from_counts(&[(40, 4); 12]);
    let selection = MethodSelection::parse("farrington, ewma").unwrap();
    let results = run_methods(&series, &selection, &standard(), &config);
    let methods: Vec<_> = results.iter().map(|r| r.method).collect();
    assert_eq!(methods, vec![Method::Ewma, Method::Farrington]);

    let sequential = SurveillanceConfig::builder().use_parallel(false).build();
    assert_eq!(results, run_methods(&series, &selection, &standard(), &sequential));
}
