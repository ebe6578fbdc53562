//! Randomization check
//!
//! A valid experiment assigns users to the test and control groups at random,
//! so both groups should have received a similar number of impressions.
//! This module compares the mean impressions of the two groups and tests the
//! difference with a regression of impressions on the treatment indicator:
//!
//! ```text
//! tot_impr = a + b * test
//! ```
//!
//! A significant `b` means the groups differ in exposure, and the
//! randomization is suspect.

use std::fmt;

use adlift_stats::{descriptive::DescriptiveStats, regression::SimpleRegression};

use crate::observation::{ByGroup, Group, ObservationTable};

/// Outcome of the randomization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Balance {
    /// No significant difference in impressions between the groups
    Similar,
    /// The groups received significantly different numbers of impressions
    Different,
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Balance::Similar => "Statistically Similar",
            Balance::Different => "Statistically Different",
        };
        fmt::Display::fmt(s, f)
    }
}

/// Comparison of impressions between the two groups.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomizationCheck {
    /// Mean total impressions per group (NaN for an empty group)
    pub mean_impressions: ByGroup<f64>,
    /// Fit of impressions on the treatment indicator
    pub regression: SimpleRegression,
    /// Significance level the p-value is compared against
    pub significance: f64,
}

impl RandomizationCheck {
    /// Runs the check on the whole table.
    ///
    /// # Examples
    ///
    /// ```
    /// use adlift_analysis::{
    ///     observation::{Observation, ObservationTable},
    ///     randomization::{Balance, RandomizationCheck},
    /// };
    ///
    /// let table = (0..200)
    ///     .map(|i| Observation {
    ///         treated: i % 2 == 0,
    ///         converted: false,
    ///         total_impressions: (i / 2) % 50,
    ///         mode_day: 1,
    ///         mode_hour: 0,
    ///     })
    ///     .collect::<ObservationTable>();
    ///
    /// let check = RandomizationCheck::run(&table, 0.05);
    /// assert_eq!(check.mean_impressions.control, check.mean_impressions.test);
    /// assert_eq!(check.balance(), Balance::Similar);
    /// ```
    #[must_use]
    pub fn run(table: &ObservationTable, significance: f64) -> Self {
        let mean_impressions = ByGroup::from_fn(|group| {
            DescriptiveStats::mean_or_nan(
                table
                    .group_rows(group)
                    .map(|row| f64::from(row.total_impressions)),
            )
        });

        let regression = SimpleRegression::fit(
            table
                .rows()
                .iter()
                .map(|row| (row.group().indicator(), f64::from(row.total_impressions))),
        );

        tracing::debug!(
            control = mean_impressions.control,
            test = mean_impressions.test,
            p_value = regression.slope.p_value,
            "randomization check"
        );

        Self {
            mean_impressions,
            regression,
            significance,
        }
    }

    /// p-value of the treatment coefficient.
    #[must_use]
    pub fn p_value(&self) -> f64 {
        self.regression.slope.p_value
    }

    /// Groups are different when the p-value is below the significance level.
    ///
    /// A NaN p-value (degenerate table) is not below the level and reads as
    /// similar.
    #[must_use]
    pub fn balance(&self) -> Balance {
        if self.p_value() < self.significance {
            Balance::Different
        } else {
            Balance::Similar
        }
    }

    /// Mean impressions of `group`.
    #[must_use]
    pub fn mean_impressions(&self, group: Group) -> f64 {
        *self.mean_impressions.get(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::Observation;

    fn row(treated: bool, total_impressions: u32) -> Observation {
        Observation {
            treated,
            converted: false,
            total_impressions,
            mode_day: 1,
            mode_hour: 0,
        }
    }

    #[test]
    fn test_identical_distributions_are_similar() {
        let table = (1..=100)
            .flat_map(|v| [row(false, v), row(true, v)])
            .collect::<ObservationTable>();
        let check = RandomizationCheck::run(&table, 0.05);
        assert!(check.p_value() > 0.05);
        assert_eq!(check.balance(), Balance::Similar);
        assert!((check.mean_impressions(Group::Control) - 50.5).abs() < 1e-12);
        assert!((check.mean_impressions(Group::Test) - 50.5).abs() < 1e-12);
    }

    #[test]
    fn test_shifted_distribution_is_different() {
        let table = (1..=100)
            .flat_map(|v| [row(false, v), row(true, v + 60)])
            .collect::<ObservationTable>();
        let check = RandomizationCheck::run(&table, 0.05);
        assert!(check.p_value() < 0.05);
        assert_eq!(check.balance(), Balance::Different);
        assert!((check.regression.slope.estimate - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_group_reads_as_similar() {
        let table = (1..=10).map(|v| row(true, v)).collect::<ObservationTable>();
        let check = RandomizationCheck::run(&table, 0.05);
        assert!(check.mean_impressions(Group::Control).is_nan());
        assert!(check.p_value().is_nan());
        assert_eq!(check.balance(), Balance::Similar);
    }
}
