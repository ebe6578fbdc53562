//! Advertising effectiveness
//!
//! Estimates the effect of ad exposure on conversion with a linear
//! probability model, an ordinary least squares fit of the 0/1 conversion
//! flag on the treatment indicator:
//!
//! ```text
//! converted = a + b * test
//! ```
//!
//! `a` is the control group's conversion rate and `b`, the lift, is the
//! difference in conversion probability caused by the ad. The lift stays on
//! the probability scale so that it can be multiplied by group sizes in the
//! ROI calculation (see [`crate::roi`]).

use std::fmt;

use adlift_stats::regression::SimpleRegression;

use crate::observation::ObservationTable;

/// Reading of the fitted lift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Positive lift, significant at the chosen level
    Effective,
    /// Negative lift, significant at the chosen level
    Harmful,
    /// Lift not significantly different from zero (or undefined)
    Inconclusive,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Effective => "The ad was effective (Positive Lift & Significant).",
            Verdict::Harmful => "The ad reduced conversion (Negative Lift & Significant).",
            Verdict::Inconclusive => "No significant effect of the ad on conversion.",
        };
        fmt::Display::fmt(s, f)
    }
}

/// Linear probability model of conversion on treatment.
#[derive(Debug, Clone, PartialEq)]
pub struct Effectiveness {
    pub regression: SimpleRegression,
    pub significance: f64,
}

impl Effectiveness {
    /// Fits the model to the whole table.
    ///
    /// # Examples
    ///
    /// ```
    /// use adlift_analysis::{
    ///     effectiveness::Effectiveness,
    ///     observation::{Observation, ObservationTable},
    /// };
    ///
    /// // Every treated user converts, no control user does
    /// let table = (0..10)
    ///     .map(|i| Observation {
    ///         treated: i < 5,
    ///         converted: i < 5,
    ///         total_impressions: 10,
    ///         mode_day: 1,
    ///         mode_hour: 0,
    ///     })
    ///     .collect::<ObservationTable>();
    ///
    /// let model = Effectiveness::run(&table, 0.05);
    /// assert_eq!(model.lift(), 1.0);
    /// assert_eq!(model.baseline_rate(), 0.0);
    /// ```
    #[must_use]
    pub fn run(table: &ObservationTable, significance: f64) -> Self {
        let regression = SimpleRegression::fit(
            table
                .rows()
                .iter()
                .map(|row| (row.group().indicator(), row.conversion_value())),
        );
        tracing::debug!(
            baseline = regression.intercept.estimate,
            lift = regression.slope.estimate,
            p_value = regression.slope.p_value,
            "effectiveness regression"
        );
        Self {
            regression,
            significance,
        }
    }

    /// Intercept: conversion rate without the ad.
    #[must_use]
    pub fn baseline_rate(&self) -> f64 {
        self.regression.intercept.estimate
    }

    /// Slope: incremental conversion probability from ad exposure.
    #[must_use]
    pub fn lift(&self) -> f64 {
        self.regression.slope.estimate
    }

    /// p-value of the lift.
    #[must_use]
    pub fn p_value(&self) -> f64 {
        self.regression.slope.p_value
    }

    #[must_use]
    pub fn verdict(&self) -> Verdict {
        let significant = self.p_value() < self.significance;
        if !significant {
            Verdict::Inconclusive
        } else if self.lift() > 0.0 {
            Verdict::Effective
        } else if self.lift() < 0.0 {
            Verdict::Harmful
        } else {
            Verdict::Inconclusive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::Observation;

    fn row(treated: bool, converted: bool) -> Observation {
        Observation {
            treated,
            converted,
            total_impressions: 1,
            mode_day: 1,
            mode_hour: 0,
        }
    }

    fn table(control: (usize, usize), test: (usize, usize)) -> ObservationTable {
        let group = |treated, (users, conversions): (usize, usize)| {
            (0..users).map(move |i| row(treated, i < conversions))
        };
        group(false, control).chain(group(true, test)).collect()
    }

    #[test]
    fn test_deterministic_conversion_gives_unit_lift() {
        let model = Effectiveness::run(&table((50, 0), (50, 50)), 0.05);
        assert_eq!(model.lift(), 1.0);
        assert_eq!(model.baseline_rate(), 0.0);
        assert_eq!(model.verdict(), Verdict::Effective);
    }

    #[test]
    fn test_coefficients_are_group_rates() {
        let model = Effectiveness::run(&table((1000, 20), (4000, 100)), 0.05);
        assert!((model.baseline_rate() - 0.02).abs() < 1e-12);
        assert!((model.lift() - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_equal_rates_are_inconclusive() {
        let model = Effectiveness::run(&table((100, 10), (100, 10)), 0.05);
        assert!(model.lift().abs() < 1e-12);
        assert_eq!(model.verdict(), Verdict::Inconclusive);
    }

    #[test]
    fn test_significant_drop_is_harmful() {
        let model = Effectiveness::run(&table((500, 250), (500, 50)), 0.05);
        assert!(model.lift() < 0.0);
        assert_eq!(model.verdict(), Verdict::Harmful);
    }

    #[test]
    fn test_single_group_gives_nan() {
        let model = Effectiveness::run(&table((0, 0), (10, 3)), 0.05);
        assert!(model.lift().is_nan());
        assert!(model.baseline_rate().is_nan());
        assert_eq!(model.verdict(), Verdict::Inconclusive);
    }
}
