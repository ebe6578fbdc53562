//! Campaign profitability
//!
//! Converts the fitted lift into money. With `lift` the incremental
//! conversion probability per exposed user:
//!
//! ```text
//! incremental conversions = test users * lift
//! incremental revenue     = incremental conversions * value per conversion
//! campaign cost           = test impressions / 1000 * CPM
//! ROI                     = (incremental revenue - campaign cost) / campaign cost
//! ```
//!
//! The opportunity cost of the control group is the revenue the same lift
//! would have produced on control users, plus what was paid to show them
//! public-service announcements:
//!
//! ```text
//! lost revenue = control users * lift * value per conversion
//! PSA cost     = control impressions / 1000 * CPM
//! ```
//!
//! No division is guarded: a campaign without test impressions has zero cost
//! and an infinite or NaN ROI, and a NaN lift propagates into every figure.

use crate::observation::{ByGroup, ObservationTable};

/// Cost per thousand impressions used when none is configured.
pub const DEFAULT_CPM: f64 = 9.00;

/// Value of one converted user used when none is configured.
pub const DEFAULT_VALUE_PER_CONVERSION: f64 = 40.00;

/// Business constants of the campaign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CampaignEconomics {
    /// Cost per thousand impressions
    pub cpm: f64,
    /// Value of one converted user
    pub value_per_conversion: f64,
}

impl Default for CampaignEconomics {
    fn default() -> Self {
        Self {
            cpm: DEFAULT_CPM,
            value_per_conversion: DEFAULT_VALUE_PER_CONVERSION,
        }
    }
}

impl CampaignEconomics {
    /// Cost of serving `impressions`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn impression_cost(&self, impressions: u64) -> f64 {
        (impressions as f64 / 1000.0) * self.cpm
    }
}

/// Users and impressions of one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Exposure {
    pub users: usize,
    pub impressions: u64,
}

impl Exposure {
    /// Users and impressions of both groups of `table`.
    #[must_use]
    pub fn from_table(table: &ObservationTable) -> ByGroup<Self> {
        ByGroup::from_fn(|group| Self {
            users: table.group_size(group),
            impressions: table.group_impressions(group),
        })
    }
}

/// Revenue forgone and cost incurred by holding out the control group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpportunityCost {
    pub lost_conversions: f64,
    pub lost_revenue: f64,
    pub psa_cost: f64,
    pub total: f64,
}

/// Profitability figures of the campaign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiReport {
    pub economics: CampaignEconomics,
    pub exposure: ByGroup<Exposure>,
    pub lift: f64,
    pub incremental_conversions: f64,
    pub incremental_revenue: f64,
    pub campaign_cost: f64,
    /// `(revenue - cost) / cost` as a ratio; multiply by 100 for percent
    pub roi: f64,
    pub opportunity_cost: OpportunityCost,
}

impl RoiReport {
    /// Computes profitability from group exposure and the fitted lift.
    ///
    /// # Examples
    ///
    /// ```
    /// use adlift_analysis::{
    ///     observation::ByGroup,
    ///     roi::{CampaignEconomics, Exposure, RoiReport},
    /// };
    ///
    /// let exposure = ByGroup {
    ///     control: Exposure { users: 0, impressions: 0 },
    ///     test: Exposure { users: 100, impressions: 500_000 },
    /// };
    /// let report = RoiReport::compute(CampaignEconomics::default(), exposure, 0.02);
    ///
    /// assert!((report.incremental_conversions - 2.0).abs() < 1e-9);
    /// assert!((report.incremental_revenue - 80.0).abs() < 1e-9);
    /// assert!((report.campaign_cost - 4_500.0).abs() < 1e-9);
    /// assert!((report.roi * 100.0 - (-98.22)).abs() < 0.01);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn compute(economics: CampaignEconomics, exposure: ByGroup<Exposure>, lift: f64) -> Self {
        let incremental_conversions = exposure.test.users as f64 * lift;
        let incremental_revenue = incremental_conversions * economics.value_per_conversion;
        let campaign_cost = economics.impression_cost(exposure.test.impressions);
        let roi = (incremental_revenue - campaign_cost) / campaign_cost;

        let lost_conversions = exposure.control.users as f64 * lift;
        let lost_revenue = lost_conversions * economics.value_per_conversion;
        let psa_cost = economics.impression_cost(exposure.control.impressions);

        tracing::debug!(incremental_revenue, campaign_cost, roi, "roi computed");

        Self {
            economics,
            exposure,
            lift,
            incremental_conversions,
            incremental_revenue,
            campaign_cost,
            roi,
            opportunity_cost: OpportunityCost {
                lost_conversions,
                lost_revenue,
                psa_cost,
                total: lost_revenue + psa_cost,
            },
        }
    }

    /// Computes profitability for `table` with the given lift.
    #[must_use]
    pub fn from_table(economics: CampaignEconomics, table: &ObservationTable, lift: f64) -> Self {
        Self::compute(economics, Exposure::from_table(table), lift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::Observation;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn exposure(test: (usize, u64), control: (usize, u64)) -> ByGroup<Exposure> {
        ByGroup {
            control: Exposure {
                users: control.0,
                impressions: control.1,
            },
            test: Exposure {
                users: test.0,
                impressions: test.1,
            },
        }
    }

    #[test]
    fn test_reference_figures() {
        let report = RoiReport::compute(
            CampaignEconomics::default(),
            exposure((100, 500_000), (0, 0)),
            0.02,
        );
        assert_close(report.incremental_conversions, 2.0);
        assert_close(report.incremental_revenue, 80.0);
        assert_close(report.campaign_cost, 4_500.0);
        assert_close(report.roi, (80.0 - 4_500.0) / 4_500.0);
        assert!((report.roi * 100.0 + 98.22).abs() < 0.005);
    }

    #[test]
    fn test_opportunity_cost() {
        let report = RoiReport::compute(
            CampaignEconomics::default(),
            exposure((100, 500_000), (50, 20_000)),
            0.02,
        );
        assert_close(report.opportunity_cost.lost_conversions, 1.0);
        assert_close(report.opportunity_cost.lost_revenue, 40.0);
        assert_close(report.opportunity_cost.psa_cost, 180.0);
        assert_close(report.opportunity_cost.total, 220.0);
    }

    #[test]
    fn test_custom_economics() {
        let economics = CampaignEconomics {
            cpm: 2.0,
            value_per_conversion: 100.0,
        };
        let report = RoiReport::compute(economics, exposure((1_000, 1_000_000), (0, 0)), 0.05);
        assert_close(report.incremental_revenue, 5_000.0);
        assert_close(report.campaign_cost, 2_000.0);
        assert_close(report.roi, 1.5);
    }

    #[test]
    fn test_zero_cost_is_not_guarded() {
        let report = RoiReport::compute(
            CampaignEconomics::default(),
            exposure((10, 0), (10, 0)),
            0.1,
        );
        assert!(report.roi.is_infinite() && report.roi > 0.0);

        let report = RoiReport::compute(
            CampaignEconomics::default(),
            exposure((0, 0), (10, 0)),
            0.1,
        );
        assert!(report.roi.is_nan());
    }

    #[test]
    fn test_nan_lift_propagates() {
        let report = RoiReport::compute(
            CampaignEconomics::default(),
            exposure((10, 1_000), (0, 0)),
            f64::NAN,
        );
        assert!(report.incremental_revenue.is_nan());
        assert!(report.roi.is_nan());
        assert!(report.opportunity_cost.total.is_nan());
    }

    #[test]
    fn test_from_table_counts_groups() {
        let row = |treated, total_impressions| Observation {
            treated,
            converted: false,
            total_impressions,
            mode_day: 1,
            mode_hour: 0,
        };
        let table = ObservationTable::from(vec![row(true, 1_000), row(true, 3_000), row(false, 500)]);
        let report = RoiReport::from_table(CampaignEconomics::default(), &table, 0.5);
        assert_eq!(report.exposure.test.users, 2);
        assert_eq!(report.exposure.test.impressions, 4_000);
        assert_close(report.campaign_cost, 36.0);
        assert_close(report.opportunity_cost.psa_cost, 4.5);
    }
}
