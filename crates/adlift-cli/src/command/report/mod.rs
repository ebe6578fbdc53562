//! Experiment report command
//!
//! Loads the experiment CSV once, runs the analysis pipeline, renders the SVG
//! charts, writes the console report to stdout and saves the optional JSON
//! report.

mod chart;
mod console;

use std::{
    io,
    path::{Path, PathBuf},
};

use adlift_analysis::{
    report::{AnalysisParams, DEFAULT_SIGNIFICANCE, ExperimentReport},
    roi::{CampaignEconomics, DEFAULT_CPM, DEFAULT_VALUE_PER_CONVERSION},
};
use anyhow::Context;
use clap::Args;

use self::chart::ChartPaths;
use crate::{
    model::report::ReportJson,
    util::{self, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct ReportArg {
    /// Path to the experiment CSV file
    pub data: PathBuf,

    /// Cost per thousand impressions
    #[arg(long, default_value_t = DEFAULT_CPM)]
    pub cpm: f64,

    /// Value of one converted user
    #[arg(long, default_value_t = DEFAULT_VALUE_PER_CONVERSION)]
    pub value_per_conversion: f64,

    /// Significance level for the randomization and effectiveness tests
    #[arg(long, default_value_t = DEFAULT_SIGNIFICANCE)]
    pub significance: f64,

    /// Directory the SVG charts are written to
    #[arg(long, default_value = "charts")]
    pub chart_dir: PathBuf,

    /// Skip chart rendering
    #[arg(long)]
    pub no_charts: bool,

    /// Also save the report as JSON to this path
    #[arg(long)]
    pub json_output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ReportArg) -> anyhow::Result<()> {
    let table = util::read_observations_file(&arg.data)?;
    if table.is_empty() {
        tracing::warn!(path = %arg.data.display(), "experiment data has no rows");
    }

    let params = AnalysisParams {
        economics: CampaignEconomics {
            cpm: arg.cpm,
            value_per_conversion: arg.value_per_conversion,
        },
        significance: arg.significance,
    };
    let report = ExperimentReport::analyze(&table, params);

    let charts = if arg.no_charts {
        None
    } else {
        Some(render_charts(&arg.chart_dir, &report)?)
    };

    console::write_report(&mut io::stdout().lock(), &report, charts.as_ref())
        .context("Failed to write report to stdout")?;

    if let Some(path) = &arg.json_output {
        Output::create(Some(path.as_path()))?.write_json(&ReportJson::from(&report))?;
        tracing::info!(path = %path.display(), "JSON report written");
    }

    Ok(())
}

fn render_charts(dir: &Path, report: &ExperimentReport) -> anyhow::Result<ChartPaths> {
    let charts = ChartPaths::create(dir)?;
    chart::draw_frequency_chart(&charts.frequency, &report.frequency).with_context(|| {
        format!(
            "Failed to render frequency chart: {}",
            charts.frequency.display()
        )
    })?;
    chart::draw_day_chart(&charts.by_day, &report.timing)
        .with_context(|| format!("Failed to render day chart: {}", charts.by_day.display()))?;
    chart::draw_hour_chart(&charts.by_hour, &report.timing)
        .with_context(|| format!("Failed to render hour chart: {}", charts.by_hour.display()))?;
    tracing::info!(dir = %dir.display(), "charts written");
    Ok(charts)
}
