//! Weekly aggregation
//!
//! Turns raw observations for one scope/test selection into gap-free weekly
//! series. Every week between the first and last observed week is present,
//! including weeks without observations, so that detectors with memory never
//! read a missing week as a jump.

use std::collections::BTreeMap;

use itertools::Itertools;
use log::debug;
use rustc_hash::FxHashMap;

use crate::models::{AgeBand, Observation, SeriesKey, Sex, WeekKey, WeeklyBucket, WeeklySeries};
use crate::registry::SignalDefinition;
use crate::utils::logging::log_warning;

/// Builds weekly series for one signal
#[derive(Debug, Clone, Copy)]
pub struct WeeklyAggregator<'a> {
    signal: &'a SignalDefinition,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    n: u32,
    flagged: u32,
}

/// Observations that passed the signal's unit and test checks
struct Judged {
    week: WeekKey,
    sex: Sex,
    age_band: Option<AgeBand>,
    flagged: bool,
}

impl<'a> WeeklyAggregator<'a> {
    /// Aggregator applying `signal`'s abnormality rule
    #[must_use]
    pub const fn new(signal: &'a SignalDefinition) -> Self {
        Self { signal }
    }

    /// Pooled series (all sexes, all ages) for the selection `scope_id`
    #[must_use]
    pub fn aggregate(&self, scope_id: &str, observations: &[Observation]) -> WeeklySeries {
        let key = SeriesKey::pooled(scope_id, self.signal.test_code);
        let (judged, skipped) = self.judge(observations);

        let mut counts: FxHashMap<WeekKey, Counts> = FxHashMap::default();
        for obs in &judged {
            bump(counts.entry(obs.week).or_default(), obs.flagged);
        }

        let mut series = build_series(key, &counts, span(&judged));
        series.skipped = skipped;
        debug!(
            "Aggregated {} observations into {} weeks for {} ({} skipped)",
            judged.len(),
            series.len(),
            series.key,
            skipped
        );
        series
    }

    /// The pooled series plus one series per (sex, age band) stratum present.
    ///
    /// All series share the pooled series' week span. Observations without a
    /// usable age only contribute to the pooled series.
    #[must_use]
    pub fn aggregate_stratified(
        &self,
        scope_id: &str,
        observations: &[Observation],
    ) -> BTreeMap<SeriesKey, WeeklySeries> {
        let pooled_key = SeriesKey::pooled(scope_id, self.signal.test_code);
        let (judged, skipped) = self.judge(observations);
        let weeks = span(&judged);

        let mut counts: FxHashMap<SeriesKey, FxHashMap<WeekKey, Counts>> = FxHashMap::default();
        for obs in &judged {
            bump(
                counts
                    .entry(pooled_key.clone())
                    .or_default()
                    .entry(obs.week)
                    .or_default(),
                obs.flagged,
            );
            if let Some(age_band) = obs.age_band {
                let stratum = pooled_key.stratum(Some(obs.sex), Some(age_band));
                bump(
                    counts.entry(stratum).or_default().entry(obs.week).or_default(),
                    obs.flagged,
                );
            }
        }

        let mut all: BTreeMap<SeriesKey, WeeklySeries> = counts
            .into_iter()
            .map(|(key, weekly)| {
                let series = build_series(key.clone(), &weekly, weeks);
                (key, series)
            })
            .collect();

        match all.get_mut(&pooled_key) {
            Some(pooled) => pooled.skipped = skipped,
            None => {
                let mut empty = WeeklySeries::empty(pooled_key.clone());
                empty.skipped = skipped;
                all.insert(pooled_key, empty);
            }
        }

        debug!(
            "Aggregated {} observations into {} strata for {}/{}",
            judged.len(),
            all.len(),
            scope_id,
            self.signal.test_code
        );
        all
    }

    fn judge(&self, observations: &[Observation]) -> (Vec<Judged>, usize) {
        let mut judged = Vec::with_capacity(observations.len());
        let mut wrong_test = 0usize;
        let mut unknown_unit = 0usize;

        for obs in observations {
            if !obs.test_code.eq_ignore_ascii_case(self.signal.test_code) {
                wrong_test += 1;
                continue;
            }
            let Some(flagged) = self.signal.is_flagged(obs) else {
                unknown_unit += 1;
                continue;
            };
            judged.push(Judged {
                week: WeekKey::from_date(obs.collected_at),
                sex: obs.sex,
                age_band: obs.age_band(),
                flagged,
            });
        }

        if wrong_test > 0 {
            log_warning(
                &format!(
                    "Skipped {wrong_test} observations not for test {}",
                    self.signal.test_code
                ),
                Some(self.signal.id),
            );
        }
        if unknown_unit > 0 {
            log_warning(
                &format!(
                    "Skipped {unknown_unit} observations in units other than {} or its known conversions",
                    self.signal.canonical_unit
                ),
                Some(self.signal.id),
            );
        }

        (judged, wrong_test + unknown_unit)
    }
}

fn bump(counts: &mut Counts, flagged: bool) {
    counts.n += 1;
    if flagged {
        counts.flagged += 1;
    }
}

fn span(judged: &[Judged]) -> Option<(WeekKey, WeekKey)> {
    judged
        .iter()
        .map(|obs| obs.week)
        .minmax()
        .into_option()
}

fn build_series(
    key: SeriesKey,
    counts: &FxHashMap<WeekKey, Counts>,
    weeks: Option<(WeekKey, WeekKey)>,
) -> WeeklySeries {
    let Some((first, last)) = weeks else {
        return WeeklySeries::empty(key);
    };

    let buckets = first
        .through(last)
        .map(|week| match counts.get(&week) {
            Some(c) => WeeklyBucket::from_counts(week, c.n, c.flagged),
            None => WeeklyBucket::empty(week),
        })
        .collect();

    WeeklySeries {
        key,
        buckets,
        skipped: 0,
    }
}
