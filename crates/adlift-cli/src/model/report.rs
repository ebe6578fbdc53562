//! Machine-readable report written by `adlift report --json-output`
//!
//! Non-finite numbers (NaN coefficients of a degenerate table, the ROI of a
//! campaign without cost) are written as `null`.

use adlift_analysis::{
    group::{ConversionBreakdown, ConversionStats},
    observation::ByGroup,
    report::ExperimentReport,
    timing::Peak,
};
use adlift_stats::regression::{Coefficient, SimpleRegression};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportJson {
    pub observations: usize,
    pub significance: f64,
    pub randomization: RandomizationJson,
    pub effectiveness: EffectivenessJson,
    pub roi: RoiJson,
    pub frequency: Vec<BreakdownRowJson>,
    pub by_day: Vec<BreakdownRowJson>,
    pub by_hour: Vec<BreakdownRowJson>,
    pub best_day: Option<PeakJson>,
    pub best_hour: Option<PeakJson>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RandomizationJson {
    pub mean_impressions: GroupPairJson<f64>,
    pub p_value: f64,
    pub balance: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EffectivenessJson {
    pub baseline_rate: f64,
    pub lift: f64,
    pub p_value: f64,
    pub verdict: String,
    pub regression: RegressionJson,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegressionJson {
    pub observations: usize,
    pub r_squared: f64,
    pub intercept: CoefficientJson,
    pub slope: CoefficientJson,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoefficientJson {
    pub estimate: f64,
    pub std_error: f64,
    pub t_value: f64,
    pub p_value: f64,
    pub conf_low: f64,
    pub conf_high: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoiJson {
    pub cpm: f64,
    pub value_per_conversion: f64,
    pub users: GroupPairJson<usize>,
    pub impressions: GroupPairJson<u64>,
    pub incremental_conversions: f64,
    pub incremental_revenue: f64,
    pub campaign_cost: f64,
    pub roi_percent: f64,
    pub lost_revenue: f64,
    pub psa_cost: f64,
    pub opportunity_cost: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroupPairJson<T> {
    pub control: T,
    pub test: T,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BreakdownRowJson {
    pub label: String,
    pub control: CellJson,
    pub test: CellJson,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CellJson {
    pub users: usize,
    pub conversions: usize,
    pub rate_percent: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PeakJson {
    pub label: String,
    pub rate_percent: f64,
}

impl<T> From<ByGroup<T>> for GroupPairJson<T> {
    fn from(pair: ByGroup<T>) -> Self {
        Self {
            control: pair.control,
            test: pair.test,
        }
    }
}

impl From<&Coefficient> for CoefficientJson {
    fn from(c: &Coefficient) -> Self {
        Self {
            estimate: c.estimate,
            std_error: c.std_error,
            t_value: c.t_value,
            p_value: c.p_value,
            conf_low: c.conf_low,
            conf_high: c.conf_high,
        }
    }
}

impl From<&SimpleRegression> for RegressionJson {
    fn from(fit: &SimpleRegression) -> Self {
        Self {
            observations: fit.observations,
            r_squared: fit.r_squared,
            intercept: (&fit.intercept).into(),
            slope: (&fit.slope).into(),
        }
    }
}

impl From<&ConversionStats> for CellJson {
    fn from(stats: &ConversionStats) -> Self {
        Self {
            users: stats.users,
            conversions: stats.conversions,
            rate_percent: stats.rate_percent(),
        }
    }
}

fn breakdown_rows<K, F>(breakdown: &ConversionBreakdown<K>, mut label: F) -> Vec<BreakdownRowJson>
where
    K: Ord,
    F: FnMut(&K) -> String,
{
    breakdown
        .iter()
        .map(|(key, cell)| BreakdownRowJson {
            label: label(key),
            control: (&cell.control).into(),
            test: (&cell.test).into(),
        })
        .collect()
}

fn peak<K, F>(best: Option<&Peak<K>>, label: F) -> Option<PeakJson>
where
    F: FnOnce(&K) -> String,
{
    best.map(|p| PeakJson {
        label: label(&p.key),
        rate_percent: p.rate_percent,
    })
}

impl From<&ExperimentReport> for ReportJson {
    fn from(report: &ExperimentReport) -> Self {
        let randomization = &report.randomization;
        let effectiveness = &report.effectiveness;
        let roi = &report.roi;
        let timing = &report.timing;

        Self {
            observations: report.observations,
            significance: report.params.significance,
            randomization: RandomizationJson {
                mean_impressions: randomization.mean_impressions.into(),
                p_value: randomization.p_value(),
                balance: randomization.balance().to_string(),
            },
            effectiveness: EffectivenessJson {
                baseline_rate: effectiveness.baseline_rate(),
                lift: effectiveness.lift(),
                p_value: effectiveness.p_value(),
                verdict: effectiveness.verdict().to_string(),
                regression: (&effectiveness.regression).into(),
            },
            roi: RoiJson {
                cpm: roi.economics.cpm,
                value_per_conversion: roi.economics.value_per_conversion,
                users: roi.exposure.map(|e| e.users).into(),
                impressions: roi.exposure.map(|e| e.impressions).into(),
                incremental_conversions: roi.incremental_conversions,
                incremental_revenue: roi.incremental_revenue,
                campaign_cost: roi.campaign_cost,
                roi_percent: roi.roi * 100.0,
                lost_revenue: roi.opportunity_cost.lost_revenue,
                psa_cost: roi.opportunity_cost.psa_cost,
                opportunity_cost: roi.opportunity_cost.total,
            },
            frequency: breakdown_rows(&report.frequency.breakdown, |bin| bin.label()),
            by_day: breakdown_rows(&timing.by_day, ToString::to_string),
            by_hour: breakdown_rows(&timing.by_hour, |hour| format!("{hour}:00")),
            best_day: peak(timing.best_day.as_ref(), ToString::to_string),
            best_hour: peak(timing.best_hour.as_ref(), |hour| format!("{hour}:00")),
        }
    }
}

#[cfg(test)]
mod tests {
    use adlift_analysis::{
        observation::{Observation, ObservationTable},
        report::AnalysisParams,
    };

    use super::*;

    #[test]
    fn test_report_json_shape() {
        let row = |treated, converted, mode_day| Observation {
            treated,
            converted,
            total_impressions: 15,
            mode_day,
            mode_hour: 9,
        };
        let table = ObservationTable::from(vec![
            row(true, true, 1),
            row(true, false, 2),
            row(false, false, 1),
            row(false, false, 9),
        ]);
        let report = ExperimentReport::analyze(&table, AnalysisParams::default());
        let json = ReportJson::from(&report);

        assert_eq!(json.observations, 4);
        assert_eq!(json.frequency.len(), 21);
        assert_eq!(json.frequency[1].label, "10-19");
        assert_eq!(json.frequency[1].test.users, 2);
        assert_eq!(json.by_day.len(), 7);
        assert_eq!(json.by_day[0].label, "Mon");
        assert_eq!(json.by_hour.len(), 1);
        assert_eq!(json.best_day.as_ref().map(|p| p.label.as_str()), Some("Mon"));
        assert_eq!(json.best_hour.as_ref().map(|p| p.label.as_str()), Some("9:00"));
        assert_eq!(json.roi.users.test, 2);
        assert_eq!(json.roi.impressions.control, 30);
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let table = ObservationTable::from(vec![Observation {
            treated: true,
            converted: true,
            total_impressions: 3,
            mode_day: 1,
            mode_hour: 0,
        }]);
        let report = ExperimentReport::analyze(&table, AnalysisParams::default());
        let value = serde_json::to_value(ReportJson::from(&report)).unwrap();
        assert!(value["effectiveness"]["lift"].is_null());
        assert!(value["roi"]["roi_percent"].is_null());
        assert_eq!(value["by_day"][1]["test"]["rate_percent"], serde_json::Value::Null);
    }
}
