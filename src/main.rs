//! Lab surveillance CLI
//!
//! Usage:
//!   lab-surveillance --input rows.json --signal anemia [--scope F-01]
//!     [--preset standard] [--advanced --ewma-lambda 0.25 --cusum-h 4]
//!     [--methods ewma,cusum] [--stratify] [--pretty]

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::Parser;
use futures::future::try_join_all;
use itertools::Itertools;
use log::info;

use lab_surveillance::loader::empty_selection;
use lab_surveillance::parameters::ParameterField;
use lab_surveillance::registry::signals;
use lab_surveillance::{
    JsonRowLoader, MethodSelection, ParameterOverrides, ParameterRequest, RowLoader, Selection,
    SurveillanceConfig, SurveillancePipeline, signal,
};

#[derive(Parser)]
#[command(name = "lab-surveillance")]
#[command(version)]
#[command(about = "Weekly early-warning signals from laboratory results", long_about = None)]
struct Cli {
    /// Row files (JSON array or one JSON object per line); may be repeated
    #[arg(short, long, required = true)]
    input: Vec<PathBuf>,

    /// Signal id, e.g. anemia, hyperglycemia, ckd
    #[arg(short, long)]
    signal: String,

    /// Restrict to one reporting scope
    #[arg(long)]
    scope: Option<String>,

    /// Sensitivity preset: low, standard or high
    #[arg(long)]
    preset: Option<String>,

    /// Honour the per-parameter overrides below
    #[arg(long)]
    advanced: bool,

    /// EWMA smoothing factor
    #[arg(long)]
    ewma_lambda: Option<String>,

    /// EWMA control limit width in standard deviations
    #[arg(long)]
    ewma_l: Option<String>,

    /// EWMA baseline window in weeks
    #[arg(long)]
    ewma_baseline_n: Option<String>,

    /// CUSUM baseline window in weeks
    #[arg(long)]
    cusum_baseline_n: Option<String>,

    /// CUSUM reference value
    #[arg(long)]
    cusum_k: Option<String>,

    /// CUSUM decision threshold
    #[arg(long)]
    cusum_h: Option<String>,

    /// Farrington reference weeks
    #[arg(long)]
    farrington_baseline_weeks: Option<String>,

    /// Farrington threshold multiplier
    #[arg(long)]
    farrington_z: Option<String>,

    /// Comma-separated methods to run (default: all)
    #[arg(long, default_value = "")]
    methods: String,

    /// Also evaluate every sex and age-band stratum
    #[arg(long)]
    stratify: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    fn overrides(&self) -> ParameterOverrides {
        let pairs = [
            (ParameterField::EwmaLambda, &self.ewma_lambda),
            (ParameterField::EwmaL, &self.ewma_l),
            (ParameterField::EwmaBaselineN, &self.ewma_baseline_n),
            (ParameterField::CusumBaselineN, &self.cusum_baseline_n),
            (ParameterField::CusumK, &self.cusum_k),
            (ParameterField::CusumH, &self.cusum_h),
            (ParameterField::FarringtonBaselineWeeks, &self.farrington_baseline_weeks),
            (ParameterField::FarringtonZ, &self.farrington_z),
        ];
        pairs
            .into_iter()
            .filter_map(|(field, raw)| raw.as_deref().map(|raw| (field, raw)))
            .fold(ParameterOverrides::new(), |overrides, (field, raw)| {
                overrides.with(field, raw)
            })
    }

    fn request(&self) -> ParameterRequest {
        let overrides = self.overrides();
        if self.advanced {
            ParameterRequest::advanced(self.preset.as_deref(), overrides)
        } else {
            if !overrides.is_empty() {
                log::warn!("Parameter overrides are ignored without --advanced");
            }
            ParameterRequest {
                preset: self.preset.clone(),
                ..ParameterRequest::default()
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let start = Instant::now();

    let signal = signal(&cli.signal).with_context(|| {
        let known = signals().iter().map(|s| s.id).join(", ");
        format!("Cannot evaluate {} (known signals: {known})", cli.signal)
    })?;
    let selection = MethodSelection::parse(&cli.methods).context("Invalid --methods")?;
    let mut rows = Selection::test(signal.test_code);
    if let Some(scope) = &cli.scope {
        rows = rows.in_scope(scope.clone());
    }

    let loaders: Vec<JsonRowLoader> = cli.input.iter().map(JsonRowLoader::new).collect();
    let batches = try_join_all(loaders.iter().map(|loader| loader.load(&rows)))
        .await
        .context("Failed to load observations")?;
    let mut observations: Vec<_> = batches.into_iter().flatten().collect();
    observations.sort_by_key(|obs| obs.collected_at);
    if observations.is_empty() {
        bail!(empty_selection(&rows));
    }
    info!(
        "Loaded {} {} observations from {} files",
        observations.len(),
        signal.test_code,
        cli.input.len()
    );

    let pipeline = SurveillancePipeline::new(SurveillanceConfig::from_env());
    info!("Engine configuration: {}", pipeline.config());
    let request = cli.request();

    let json = if cli.stratify {
        let reports = pipeline.evaluate_stratified(
            rows.scope_label(),
            &observations,
            signal,
            &request,
            &selection,
        );
        for report in reports.values() {
            info!("{}", report.summary());
        }
        let reports: Vec<_> = reports.values().collect();
        to_json(&reports, cli.pretty)?
    } else {
        let report = pipeline.evaluate_observations(
            rows.scope_label(),
            &observations,
            signal,
            &request,
            &selection,
        );
        info!("{}", report.summary());
        to_json(&report, cli.pretty)?
    };

    println!("{json}");
    info!("Finished in {:?}", start.elapsed());
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
