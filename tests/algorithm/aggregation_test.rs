//! Tests for weekly aggregation

use chrono::Duration;
use lab_surveillance::models::{AgeBand, Sex};
use lab_surveillance::{WeeklyAggregator, signal};

use crate::utils::{first_monday, hgb, random_observations, week, weekly_observations};

#[test]
fn test_gap_weeks_are_filled() {
    let anemia = signal("anemia").unwrap();
    // Weeks 0, 1 and 4 observed; 2 and 3 empty
    let mut observations = weekly_observations(&[(10, 2), (10, 5)]);
    observations.push(hgb(
        "F-01",
        10.0,
        first_monday() + Duration::weeks(4),
        Sex::Female,
        Some(40.0),
    ));

    let series = WeeklyAggregator::new(anemia).aggregate("F-01", &observations);

    assert_eq!(series.len(), 5);
    assert!(series.is_contiguous());
    assert_eq!(series.buckets[0].rate, Some(0.2));
    assert_eq!(series.buckets[1].rate, Some(0.5));
    assert_eq!(series.buckets[2].n, 0);
    assert_eq!(series.buckets[2].rate, None);
    assert_eq!(series.buckets[3].rate, None);
    assert_eq!(series.buckets[4].week, week(4));
    assert_eq!(series.buckets[4].rate, Some(1.0));
    assert_eq!(series.total_n(), 21);
}

#[test]
fn test_empty_input_gives_empty_series() {
    let anemia = signal("anemia").unwrap();
    let series = WeeklyAggregator::new(anemia).aggregate("F-01", &[]);
    assert!(series.is_empty());
    assert_eq!(series.total_n(), 0);
    assert_eq!(series.skipped, 0);
}

#[test]
fn test_unknown_units_and_other_tests_are_skipped() {
    let anemia = signal("anemia").unwrap();
    let monday = first_monday();
    let mut in_g_per_l = hgb("F-01", 105.0, monday, Sex::Female, Some(30.0));
    in_g_per_l.unit = "g/L".to_string();
    let mut odd_unit = hgb("F-01", 10.0, monday, Sex::Female, Some(30.0));
    odd_unit.unit = "furlongs".to_string();
    let mut other_test = hgb("F-01", 5.0, monday, Sex::Female, Some(30.0));
    other_test.test_code = "LDL".to_string();

    let observations = vec![
        hgb("F-01", 13.0, monday, Sex::Male, Some(30.0)),
        in_g_per_l,
        odd_unit,
        other_test,
    ];
    let series = WeeklyAggregator::new(anemia).aggregate("F-01", &observations);

    assert_eq!(series.skipped, 2);
    assert_eq!(series.buckets[0].n, 2);
    // 105 g/L is 10.5 g/dL, below the adult female threshold
    assert_eq!(series.buckets[0].flagged_count, 1);
}

#[test]
fn test_age_and_sex_specific_thresholds() {
    let anemia = signal("anemia").unwrap();
    let monday = first_monday();
    let observations = vec![
        // 11.2 is normal for a toddler, anemic for a 10-year-old
        hgb("F-01", 11.2, monday, Sex::Male, Some(3.0)),
        hgb("F-01", 11.2, monday, Sex::Male, Some(10.0)),
        // 12.5 is normal for an adult woman, anemic for an adult man
        hgb("F-01", 12.5, monday, Sex::Female, Some(30.0)),
        hgb("F-01", 12.5, monday, Sex::Male, Some(30.0)),
    ];
    let series = WeeklyAggregator::new(anemia).aggregate("F-01", &observations);
    assert_eq!(series.buckets[0].n, 4);
    assert_eq!(series.buckets[0].flagged_count, 2);
}

#[test]
fn test_strata_partition_the_pooled_series() {
    let anemia = signal("anemia").unwrap();
    let observations = random_observations(7, 800, 20);
    let all = WeeklyAggregator::new(anemia).aggregate_stratified("F-01", &observations);

    let pooled = all
        .values()
        .find(|s| s.key.is_pooled())
        .expect("pooled series is always present");
    let weeks = pooled.len();
    assert!(pooled.is_contiguous());
    assert_eq!(pooled.total_n(), 800);

    let strata: Vec<_> = all.values().filter(|s| !s.key.is_pooled()).collect();
    assert!(!strata.is_empty());
    for stratum in &strata {
        assert_eq!(stratum.len(), weeks, "{} spans a different range", stratum.key);
        assert_eq!(stratum.buckets[0].week, pooled.buckets[0].week);
        assert!(stratum.key.sex.is_some() && stratum.key.age_band.is_some());
    }

    // Observations without an age only count towards the pooled series
    let with_age = observations.iter().filter(|o| o.age_band().is_some()).count() as u64;
    let strata_n: u64 = strata.iter().map(|s| s.total_n()).sum();
    let strata_flagged: u64 = strata.iter().map(|s| s.total_flagged()).sum();
    assert_eq!(strata_n, with_age);
    assert!(strata_flagged <= pooled.total_flagged());

    // Week by week, strata never exceed the pooled count
    for (i, bucket) in pooled.buckets.iter().enumerate() {
        let week_n: u32 = strata.iter().map(|s| s.buckets[i].n).sum();
        assert!(week_n <= bucket.n);
    }
}

#[test]
fn test_stratified_keys_are_ordered_and_unique() {
    let anemia = signal("anemia").unwrap();
    let monday = first_monday();
    let observations = vec![
        hgb("F-01", 10.0, monday, Sex::Male, Some(60.0)),
        hgb("F-01", 14.0, monday, Sex::Male, Some(61.0)),
        hgb("F-01", 10.0, monday, Sex::Female, Some(2.0)),
    ];
    let all = WeeklyAggregator::new(anemia).aggregate_stratified("F-01", &observations);
    let keys: Vec<_> = all.keys().cloned().collect();
    assert_eq!(keys.len(), 3);

    let men = all
        .keys()
        .find(|k| k.sex == Some(Sex::Male) && k.age_band == Some(AgeBand::Age50Plus))
        .unwrap();
    assert_eq!(all[men].buckets[0].n, 2);
    assert_eq!(all[men].buckets[0].flagged_count, 1);
}
