//! The full analysis pipeline
//!
//! Runs every analysis step over one loaded table, in a fixed order:
//! randomization check, effectiveness regression, ROI, frequency breakdown
//! and timing breakdown. The ROI step takes its lift from the effectiveness
//! regression.

use crate::{
    effectiveness::Effectiveness,
    frequency::FrequencyAnalysis,
    observation::ObservationTable,
    randomization::RandomizationCheck,
    roi::{CampaignEconomics, RoiReport},
    timing::TimingAnalysis,
};

/// Significance level used when none is configured.
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

/// Run-time parameters of the analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisParams {
    pub economics: CampaignEconomics,
    /// Level p-values are compared against
    pub significance: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            economics: CampaignEconomics::default(),
            significance: DEFAULT_SIGNIFICANCE,
        }
    }
}

/// Results of every analysis step.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentReport {
    pub params: AnalysisParams,
    pub observations: usize,
    pub randomization: RandomizationCheck,
    pub effectiveness: Effectiveness,
    pub roi: RoiReport,
    pub frequency: FrequencyAnalysis,
    pub timing: TimingAnalysis,
}

impl ExperimentReport {
    /// Runs the pipeline over `table`.
    ///
    /// # Examples
    ///
    /// ```
    /// use adlift_analysis::{
    ///     report::{AnalysisParams, ExperimentReport},
    ///     synthetic::SyntheticExperiment,
    /// };
    ///
    /// let table = SyntheticExperiment::default().generate().unwrap();
    /// let report = ExperimentReport::analyze(&table, AnalysisParams::default());
    ///
    /// assert_eq!(report.observations, table.len());
    /// assert_eq!(report.roi.lift, report.effectiveness.lift());
    /// ```
    #[must_use]
    pub fn analyze(table: &ObservationTable, params: AnalysisParams) -> Self {
        tracing::info!(rows = table.len(), "analyzing experiment");

        let randomization = RandomizationCheck::run(table, params.significance);
        let effectiveness = Effectiveness::run(table, params.significance);
        let roi = RoiReport::from_table(params.economics, table, effectiveness.lift());
        let frequency = FrequencyAnalysis::run(table);
        let timing = TimingAnalysis::run(table);

        Self {
            params,
            observations: table.len(),
            randomization,
            effectiveness,
            roi,
            frequency,
            timing,
        }
    }
}
