//! Console report sections
//!
//! The report is written in one fixed layout. Numbers are written as-is, so
//! NaN and infinite values show up verbatim, and the same table always
//! renders to the same bytes.

use std::io::{self, Write};

use adlift_analysis::{
    effectiveness::Effectiveness,
    frequency::FrequencyAnalysis,
    group::ConversionStats,
    observation::ByGroup,
    randomization::{Balance, RandomizationCheck},
    report::ExperimentReport,
    roi::RoiReport,
    timing::{Peak, TimingAnalysis},
};
use adlift_stats::regression::{CONFIDENCE_LEVEL, Coefficient, SimpleRegression};

use super::chart::ChartPaths;
use crate::util;

const SECTION_RULE_WIDTH: usize = 40;

/// Write the whole report
///
/// # Arguments
/// * `w` - Destination of the report text
/// * `report` - Results of the analysis
/// * `charts` - Paths of the rendered charts, `None` if charts were skipped
pub(super) fn write_report<W>(
    w: &mut W,
    report: &ExperimentReport,
    charts: Option<&ChartPaths>,
) -> io::Result<()>
where
    W: Write,
{
    write_banner(w)?;

    write_randomization(w, &report.randomization)?;
    write_section_end(w)?;

    write_effectiveness(w, &report.effectiveness)?;
    write_section_end(w)?;

    write_roi(w, &report.roi)?;
    write_section_end(w)?;

    write_frequency(w, &report.frequency)?;
    if let Some(charts) = charts {
        writeln!(
            w,
            ">> FREQUENCY CHART GENERATED: {}",
            charts.frequency.display()
        )?;
    }
    writeln!(
        w,
        ">> Note: Observe if the Control group conversion rate rises with impressions."
    )?;
    write_section_end(w)?;

    write_timing(w, &report.timing)?;
    if let Some(charts) = charts {
        writeln!(w, "\n>> DAY CHART GENERATED: {}", charts.by_day.display())?;
        writeln!(w, ">> HOUR CHART GENERATED: {}", charts.by_hour.display())?;
    }
    w.flush()
}

fn write_banner<W: Write>(w: &mut W) -> io::Result<()> {
    writeln!(w, "==========================================")?;
    writeln!(w, "      A/B AD EXPERIMENT ANALYSIS          ")?;
    writeln!(w, "==========================================\n")
}

fn write_section_end<W: Write>(w: &mut W) -> io::Result<()> {
    writeln!(w, "{}\n", "-".repeat(SECTION_RULE_WIDTH))
}

fn write_randomization<W: Write>(w: &mut W, check: &RandomizationCheck) -> io::Result<()> {
    writeln!(w, "--- QUESTION 1: RANDOMIZATION CHECK ---")?;
    writeln!(
        w,
        "Avg Impressions (Control): {:.2}",
        check.mean_impressions.control
    )?;
    writeln!(
        w,
        "Avg Impressions (Test):    {:.2}",
        check.mean_impressions.test
    )?;

    writeln!(w, "\nStatistical Test for Randomization (tot_impr ~ test):")?;
    writeln!(w, "P-value: {:.4}", check.p_value())?;
    match check.balance() {
        Balance::Similar => writeln!(w, ">> CONCLUSION: The groups are {}.", Balance::Similar),
        Balance::Different => writeln!(
            w,
            ">> CONCLUSION: The groups are {} (Randomization check 'failed' slightly).",
            Balance::Different
        ),
    }
}

fn write_coefficient_row<W: Write>(w: &mut W, name: &str, c: &Coefficient) -> io::Result<()> {
    writeln!(
        w,
        "  {:<10} {:>12.6} {:>12.6} {:>10.3} {:>10.3} {:>12.6} {:>12.6}",
        name, c.estimate, c.std_error, c.t_value, c.p_value, c.conf_low, c.conf_high,
    )
}

/// Write an OLS summary table
///
/// # Arguments
/// * `title` - Model formula shown above the table
/// * `fit` - The fitted regression
/// * `regressor` - Name of the slope row
fn write_regression_summary<W: Write>(
    w: &mut W,
    title: &str,
    fit: &SimpleRegression,
    regressor: &str,
) -> io::Result<()> {
    let tail = (1.0 - CONFIDENCE_LEVEL) / 2.0;
    let low_col = format!("[{tail:.3}");
    let high_col = format!("{:.3}]", 1.0 - tail);

    writeln!(w, "OLS Regression Results: {title}")?;
    writeln!(
        w,
        "  Observations: {:<10} Df Residuals: {:<10} R-squared: {:.6}",
        fit.observations, fit.residual_df, fit.r_squared
    )?;
    writeln!(
        w,
        "  {:<10} {:>12} {:>12} {:>10} {:>10} {:>12} {:>12}",
        "", "coef", "std err", "t", "P>|t|", low_col, high_col,
    )?;
    // name(10) + coef(12) + std err(12) + t(10) + p(10) + low(12) + high(12) + spaces(6)
    writeln!(w, "  {}", "-".repeat(84))?;
    write_coefficient_row(w, "const", &fit.intercept)?;
    write_coefficient_row(w, regressor, &fit.slope)
}

fn write_effectiveness<W: Write>(w: &mut W, model: &Effectiveness) -> io::Result<()> {
    writeln!(w, "--- QUESTION 2: EFFECTIVENESS (REGRESSION) ---")?;
    write_regression_summary(w, "converted ~ test", &model.regression, "test")?;

    let intercept = model.baseline_rate();
    let lift = model.lift();
    writeln!(
        w,
        "\nIntercept (a): {intercept:.5} ({:.3}%)",
        intercept * 100.0
    )?;
    writeln!(w, "Lift Coefficient (b1): {lift:.5} ({:.3}%)", lift * 100.0)?;
    writeln!(w, "P-value: {}", util::scientific(model.p_value(), 2))?;
    writeln!(w, ">> CONCLUSION: {}", model.verdict())
}

fn write_roi<W: Write>(w: &mut W, roi: &RoiReport) -> io::Result<()> {
    writeln!(w, "--- QUESTION 3: PROFITABILITY & ROI ---")?;
    writeln!(
        w,
        "Test Group Size: {}",
        util::thousands(roi.exposure.test.users)
    )?;
    writeln!(w, "Calculated Lift: {:.5}", roi.lift)?;
    writeln!(
        w,
        "Incremental Conversions: {:.2}",
        roi.incremental_conversions
    )?;
    writeln!(
        w,
        "A) Extra Revenue Generated: {}",
        util::currency(roi.incremental_revenue)
    )?;
    writeln!(
        w,
        "B) Cost of Campaign: {}",
        util::currency(roi.campaign_cost)
    )?;
    writeln!(w, "C) ROI: {:.2}%", roi.roi * 100.0)?;

    let opportunity = &roi.opportunity_cost;
    writeln!(w, "\nD) Opportunity Cost of Control Group:")?;
    writeln!(
        w,
        "   Lost Revenue: {}",
        util::currency(opportunity.lost_revenue)
    )?;
    writeln!(w, "   Cost of PSAs: {}", util::currency(opportunity.psa_cost))?;
    writeln!(w, "   Total Opp Cost: {}", util::currency(opportunity.total))
}

fn write_breakdown_header<W: Write>(w: &mut W, label_col: &str) -> io::Result<()> {
    writeln!(
        w,
        "  {:<10} {:>10} {:>10} {:>10} {:>10}",
        label_col, "Control", "Test", "Control n", "Test n",
    )?;
    // label(10) + 4 * column(10) + spaces(4)
    writeln!(w, "  {}", "-".repeat(54))
}

fn write_breakdown_row<W: Write>(
    w: &mut W,
    label: &str,
    cell: &ByGroup<ConversionStats>,
) -> io::Result<()> {
    writeln!(
        w,
        "  {:<10} {:>10} {:>10} {:>10} {:>10}",
        label,
        util::percent_or_dash(cell.control.rate_percent()),
        util::percent_or_dash(cell.test.rate_percent()),
        cell.control.users,
        cell.test.users,
    )
}

fn write_frequency<W: Write>(w: &mut W, analysis: &FrequencyAnalysis) -> io::Result<()> {
    writeln!(w, "--- QUESTION 4: FREQUENCY ANALYSIS ---")?;
    writeln!(w, "Conversion rate by impression bucket:")?;
    write_breakdown_header(w, "Impr")?;
    for (bin, cell) in analysis.rows() {
        write_breakdown_row(w, &bin.label(), cell)?;
    }
    Ok(())
}

fn write_peak<W, K>(
    w: &mut W,
    what: &str,
    peak: Option<&Peak<K>>,
    label: impl Fn(&K) -> String,
) -> io::Result<()>
where
    W: Write,
{
    match peak {
        Some(p) => writeln!(
            w,
            "Best {what} for Test Group: {} ({:.3}%)",
            label(&p.key),
            p.rate_percent
        ),
        None => writeln!(w, "Best {what} for Test Group: n/a (no test group data)"),
    }
}

fn write_timing<W: Write>(w: &mut W, analysis: &TimingAnalysis) -> io::Result<()> {
    writeln!(w, "--- TIME ANALYSIS (OPTIMIZATION) ---")?;
    write_peak(w, "Day", analysis.best_day.as_ref(), ToString::to_string)?;
    write_peak(w, "Hour", analysis.best_hour.as_ref(), |hour| {
        format!("{hour}:00")
    })?;

    writeln!(w, "\nConversion rate by day:")?;
    write_breakdown_header(w, "Day")?;
    for (day, cell) in analysis.day_rows() {
        write_breakdown_row(w, day.to_str(), cell)?;
    }

    writeln!(w, "\nConversion rate by hour:")?;
    write_breakdown_header(w, "Hour")?;
    for (hour, cell) in analysis.hour_rows() {
        write_breakdown_row(w, &format!("{hour}:00"), cell)?;
    }
    Ok(())
}
