use std::path::PathBuf;

use adlift_analysis::synthetic::SyntheticExperiment;
use anyhow::Context;
use clap::Args;

use crate::util::Output;

#[derive(Debug, Clone, Args)]
pub(crate) struct SimulateArg {
    /// Number of users to generate
    #[arg(long, default_value_t = SyntheticExperiment::default().rows)]
    rows: usize,
    /// Probability of a user being in the test group
    #[arg(long, default_value_t = SyntheticExperiment::default().treatment_share)]
    treatment_share: f64,
    /// Conversion probability without the ad
    #[arg(long, default_value_t = SyntheticExperiment::default().baseline_rate)]
    baseline_rate: f64,
    /// Conversion probability added by the ad
    #[arg(long, default_value_t = SyntheticExperiment::default().lift)]
    lift: f64,
    /// Mean total impressions per user
    #[arg(long, default_value_t = SyntheticExperiment::default().mean_impressions)]
    mean_impressions: f64,
    /// Random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Output CSV path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let experiment = SyntheticExperiment {
        rows: arg.rows,
        treatment_share: arg.treatment_share,
        baseline_rate: arg.baseline_rate,
        lift: arg.lift,
        mean_impressions: arg.mean_impressions,
        seed: arg.seed,
    };
    let table = experiment
        .generate()
        .context("Invalid synthetic experiment parameters")?;

    let mut output = Output::create(arg.output.as_deref())?;
    output.write_csv(&table)?;
    tracing::info!(rows = table.len(), %output, "synthetic data written");
    Ok(())
}
