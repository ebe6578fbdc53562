//! SVG charts of the descriptive breakdowns
//!
//! - `frequency.svg`: grouped bars, one group of two bars per impression bucket
//! - `conversion_by_day.svg`: one line per group over Mon..Sun, with point markers
//! - `conversion_by_hour.svg`: one line per group over the observed hours
//!
//! Cells without users are not drawn; lines break around them.

use std::path::{Path, PathBuf};

use adlift_analysis::{
    frequency::FrequencyAnalysis,
    group::ConversionStats,
    observation::{ByGroup, Group},
    timing::TimingAnalysis,
};
use anyhow::Context;
use plotters::{coord::ranged1d::SegmentValue, prelude::*};

const FREQUENCY_FILE: &str = "frequency.svg";
const DAY_FILE: &str = "conversion_by_day.svg";
const HOUR_FILE: &str = "conversion_by_hour.svg";

const BAR_CHART_SIZE: (u32, u32) = (1400, 600);
const LINE_CHART_SIZE: (u32, u32) = (1000, 500);

const CAPTION_FONT: (&str, u32) = ("sans-serif", 24);
const RATE_AXIS_DESC: &str = "Conv Rate (%)";

fn group_color(group: Group) -> RGBColor {
    match group {
        Group::Control => RGBColor(87, 16, 110),
        Group::Test => RGBColor(249, 142, 9),
    }
}

fn rates(cells: &[&ByGroup<ConversionStats>], group: Group) -> Vec<Option<f64>> {
    cells
        .iter()
        .map(|cell| cell.get(group).rate_percent())
        .collect()
}

/// Upper bound of the rate axis, with headroom above the largest rate.
fn rate_axis_max(cells: &[&ByGroup<ConversionStats>]) -> f64 {
    let max = cells
        .iter()
        .flat_map(|cell| [cell.control.rate_percent(), cell.test.rate_percent()])
        .flatten()
        .fold(0.0_f64, f64::max);
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

/// Splits a series at missing values into runs of consecutive points.
fn contiguous_runs<X>(points: impl IntoIterator<Item = (X, Option<f64>)>) -> Vec<Vec<(X, f64)>> {
    let mut runs = vec![];
    let mut current = vec![];
    for (x, y) in points {
        if let Some(y) = y {
            current.push((x, y));
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Output paths of the three charts.
#[derive(Debug, Clone)]
pub(super) struct ChartPaths {
    pub frequency: PathBuf,
    pub by_day: PathBuf,
    pub by_hour: PathBuf,
}

impl ChartPaths {
    pub(super) fn create(dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create chart directory: {}", dir.display()))?;
        Ok(Self {
            frequency: dir.join(FREQUENCY_FILE),
            by_day: dir.join(DAY_FILE),
            by_hour: dir.join(HOUR_FILE),
        })
    }
}

pub(super) fn draw_frequency_chart(path: &Path, analysis: &FrequencyAnalysis) -> anyhow::Result<()> {
    let (labels, cells): (Vec<String>, Vec<_>) = analysis
        .rows()
        .map(|(bin, cell)| (bin.label(), cell))
        .unzip();
    let last = labels.len().saturating_sub(1);
    let y_max = rate_axis_max(&cells);

    let root = SVGBackend::new(path, BAR_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Conversion Rate by Impressions (Activity Bias Check)",
            CAPTION_FONT,
        )
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0..last).into_segmented(), 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc("Impression Bins")
        .y_desc("Conversion Rate (%)")
        .draw()?;

    for group in Group::ALL {
        let color = group_color(group);
        let bars = rates(&cells, group)
            .into_iter()
            .enumerate()
            .filter_map(|(i, rate)| {
                let (left, right) = match group {
                    Group::Control => (SegmentValue::Exact(i), SegmentValue::CenterOf(i)),
                    Group::Test => (SegmentValue::CenterOf(i), SegmentValue::Exact(i + 1)),
                };
                rate.map(|rate| {
                    let mut bar = Rectangle::new([(left, 0.0), (right, rate)], color.filled());
                    bar.set_margin(0, 0, 2, 2);
                    bar
                })
            });
        chart
            .draw_series(bars)?
            .label(group.to_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

pub(super) fn draw_day_chart(path: &Path, analysis: &TimingAnalysis) -> anyhow::Result<()> {
    let (labels, cells): (Vec<&str>, Vec<_>) = analysis
        .day_rows()
        .map(|(day, cell)| (day.to_str(), cell))
        .unzip();
    let last = labels.len().saturating_sub(1);
    let y_max = rate_axis_max(&cells);

    let root = SVGBackend::new(path, LINE_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Conversion Rate by Day", CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..last).into_segmented(), 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(i) => labels
                .get(*i)
                .map(ToString::to_string)
                .unwrap_or_default(),
            _ => String::new(),
        })
        .y_desc(RATE_AXIS_DESC)
        .light_line_style(BLACK.mix(0.05))
        .draw()?;

    for group in Group::ALL {
        let color = group_color(group);
        let points = rates(&cells, group)
            .into_iter()
            .enumerate()
            .map(|(i, rate)| (SegmentValue::CenterOf(i), rate));
        for run in contiguous_runs(points) {
            chart.draw_series(LineSeries::new(run, color.stroke_width(3)).point_size(5))?;
        }
        chart
            .draw_series(LineSeries::new(
                std::iter::empty::<(SegmentValue<usize>, f64)>(),
                color.stroke_width(3),
            ))?
            .label(group.to_str())
            .legend(move |(x, y)| PathElement::new([(x, y), (x + 20, y)], color.stroke_width(3)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

pub(super) fn draw_hour_chart(path: &Path, analysis: &TimingAnalysis) -> anyhow::Result<()> {
    let (hours, cells): (Vec<i64>, Vec<_>) = analysis
        .hour_rows()
        .map(|(hour, cell)| (*hour, cell))
        .unzip();
    let first_hour = hours.first().copied().unwrap_or(0);
    let last_hour = hours.last().copied().unwrap_or(23).max(first_hour + 1);
    let y_max = rate_axis_max(&cells);

    let root = SVGBackend::new(path, LINE_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Conversion Rate by Hour", CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(first_hour..last_hour, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_labels(24)
        .x_desc("mode_impr_hour")
        .y_desc(RATE_AXIS_DESC)
        .light_line_style(BLACK.mix(0.05))
        .draw()?;

    for group in Group::ALL {
        let color = group_color(group);
        let points = hours.iter().copied().zip(rates(&cells, group));
        for run in contiguous_runs(points) {
            chart.draw_series(LineSeries::new(run, color.stroke_width(3)))?;
        }
        chart
            .draw_series(LineSeries::new(
                std::iter::empty::<(i64, f64)>(),
                color.stroke_width(3),
            ))?
            .label(group.to_str())
            .legend(move |(x, y)| PathElement::new([(x, y), (x + 20, y)], color.stroke_width(3)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}
