//! Ordinary least squares with a single regressor
//!
//! This module fits the model `y = a + b * x` by ordinary least squares and
//! reports classical (homoskedastic) inference for both coefficients:
//! standard errors, t statistics, two-sided p-values and confidence intervals
//! from Student's t distribution with `n - 2` degrees of freedom.
//!
//! # Degenerate Inputs
//!
//! The fit never fails. When the regressor has no variance (for example every
//! observation belongs to the same treatment group) the slope is `0 / 0` and the
//! coefficients come out as NaN. Any statistic depending on a NaN is NaN as well,
//! and callers see the NaN values as they are.
//!
//! # Examples
//!
//! ## Linear probability model
//!
//! ```
//! use adlift_stats::regression::SimpleRegression;
//!
//! // converted (y) against treatment indicator (x)
//! let points = [
//!     (0.0, 0.0),
//!     (0.0, 1.0),
//!     (0.0, 0.0),
//!     (0.0, 0.0),
//!     (1.0, 1.0),
//!     (1.0, 1.0),
//!     (1.0, 0.0),
//!     (1.0, 1.0),
//! ];
//! let fit = SimpleRegression::fit(points);
//!
//! // Intercept is the control-group mean, slope the difference of group means
//! assert!((fit.intercept.estimate - 0.25).abs() < 1e-12);
//! assert!((fit.slope.estimate - 0.5).abs() < 1e-12);
//! assert!(fit.slope.p_value > 0.0 && fit.slope.p_value < 1.0);
//! ```

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Confidence level used for coefficient intervals.
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// Estimate and inference for one regression coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficient {
    /// Point estimate
    pub estimate: f64,
    /// Standard error of the estimate
    pub std_error: f64,
    /// `estimate / std_error`
    pub t_value: f64,
    /// Two-sided p-value of `t_value` under Student's t
    pub p_value: f64,
    /// Lower bound of the [`CONFIDENCE_LEVEL`] confidence interval
    pub conf_low: f64,
    /// Upper bound of the [`CONFIDENCE_LEVEL`] confidence interval
    pub conf_high: f64,
}

impl Coefficient {
    fn new(estimate: f64, std_error: f64, t_dist: Option<&StudentsT>) -> Self {
        let t_value = estimate / std_error;
        let p_value = two_sided_p_value(t_value, t_dist);
        let critical = t_dist.map_or(f64::NAN, |dist| {
            dist.inverse_cdf(1.0 - (1.0 - CONFIDENCE_LEVEL) / 2.0)
        });
        Self {
            estimate,
            std_error,
            t_value,
            p_value,
            conf_low: estimate - critical * std_error,
            conf_high: estimate + critical * std_error,
        }
    }
}

/// Result of fitting `y = a + b * x` by ordinary least squares.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleRegression {
    /// Number of observations used in the fit
    pub observations: usize,
    /// Residual degrees of freedom (`observations - 2`)
    pub residual_df: f64,
    /// Intercept `a`
    pub intercept: Coefficient,
    /// Slope `b`
    pub slope: Coefficient,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Residual sum of squares
    pub residual_sum_of_squares: f64,
}

impl SimpleRegression {
    /// Fits the regression to `(x, y)` points.
    ///
    /// # Arguments
    ///
    /// * `points` - The `(regressor, response)` pairs
    ///
    /// # Examples
    ///
    /// ```
    /// use adlift_stats::regression::SimpleRegression;
    ///
    /// let fit = SimpleRegression::fit([(1.0, 2.0), (2.0, 4.1), (3.0, 5.9), (4.0, 8.0)]);
    /// assert_eq!(fit.observations, 4);
    /// assert!(fit.r_squared > 0.99);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fit<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let points = points.into_iter().collect::<Vec<_>>();
        let observations = points.len();
        let n = observations as f64;

        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        let mut syy = 0.0;
        for (x, y) in &points {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let residual_sum_of_squares = points
            .iter()
            .map(|(x, y)| (y - intercept - slope * x).powi(2))
            .sum::<f64>();

        let residual_df = n - 2.0;
        let sigma2 = residual_sum_of_squares / residual_df;
        let slope_se = (sigma2 / sxx).sqrt();
        let intercept_se = (sigma2 * (1.0 / n + mean_x * mean_x / sxx)).sqrt();

        let t_dist = student_t(residual_df);

        Self {
            observations,
            residual_df,
            intercept: Coefficient::new(intercept, intercept_se, t_dist.as_ref()),
            slope: Coefficient::new(slope, slope_se, t_dist.as_ref()),
            r_squared: 1.0 - residual_sum_of_squares / syy,
            residual_sum_of_squares,
        }
    }
}

fn student_t(df: f64) -> Option<StudentsT> {
    if df.is_nan() || df <= 0.0 {
        return None;
    }
    StudentsT::new(0.0, 1.0, df).ok()
}

/// Two-sided p-value for a t statistic.
///
/// NaN statistics (and fits without residual degrees of freedom) give NaN,
/// infinite statistics give zero.
fn two_sided_p_value(t_value: f64, t_dist: Option<&StudentsT>) -> f64 {
    let Some(dist) = t_dist else {
        return f64::NAN;
    };
    if t_value.is_nan() {
        return f64::NAN;
    }
    if t_value.is_infinite() {
        return 0.0;
    }
    (2.0 * dist.sf(t_value.abs())).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_exact_line() {
        let fit = SimpleRegression::fit((0..10).map(|i| {
            let x = f64::from(i);
            (x, 3.0 - 0.5 * x)
        }));
        assert_close(fit.intercept.estimate, 3.0, 1e-12);
        assert_close(fit.slope.estimate, -0.5, 1e-12);
        assert_close(fit.r_squared, 1.0, 1e-12);
        assert_close(fit.residual_sum_of_squares, 0.0, 1e-20);
        assert_eq!(fit.observations, 10);
        assert_eq!(fit.residual_df, 8.0);
    }

    #[test]
    fn test_indicator_identical_to_response() {
        // Every treated row converts, no control row does
        let points = (0..20).map(|i| {
            let x = f64::from(u8::from(i % 2 == 0));
            (x, x)
        });
        let fit = SimpleRegression::fit(points);
        assert_eq!(fit.slope.estimate, 1.0);
        assert_eq!(fit.intercept.estimate, 0.0);
        assert_eq!(fit.slope.p_value, 0.0);
    }

    #[test]
    fn test_known_inference_values() {
        // y = [1, 3, 2, 5, 4], x = [1, 2, 3, 4, 5]
        // slope = 0.8, intercept = 0.6, SSE = 3.6, sigma^2 = 1.2
        // se(slope) = sqrt(1.2 / 10), t = 2.3094, p (df = 3) = 0.1041
        let fit = SimpleRegression::fit([(1.0, 1.0), (2.0, 3.0), (3.0, 2.0), (4.0, 5.0), (5.0, 4.0)]);
        assert_close(fit.slope.estimate, 0.8, 1e-12);
        assert_close(fit.intercept.estimate, 0.6, 1e-12);
        assert_close(fit.residual_sum_of_squares, 3.6, 1e-12);
        assert_close(fit.slope.std_error, (0.12_f64).sqrt(), 1e-12);
        assert_close(fit.slope.t_value, 2.309_401, 1e-5);
        assert_close(fit.slope.p_value, 0.1041, 1e-3);
        assert_close(fit.r_squared, 0.64, 1e-12);
        // t(0.975, 3) = 3.182446
        assert_close(fit.slope.conf_low, 0.8 - 3.182_446 * 0.12_f64.sqrt(), 1e-4);
        assert_close(fit.slope.conf_high, 0.8 + 3.182_446 * 0.12_f64.sqrt(), 1e-4);
    }

    #[test]
    fn test_balanced_groups_with_equal_means() {
        let control = (1..=100).map(|v| (0.0, f64::from(v)));
        let test = (1..=100).map(|v| (1.0, f64::from(v)));
        let fit = SimpleRegression::fit(control.chain(test));
        assert_close(fit.slope.estimate, 0.0, 1e-9);
        assert!(fit.slope.p_value > 0.05);
    }

    #[test]
    fn test_constant_regressor_gives_nan() {
        let fit = SimpleRegression::fit([(1.0, 0.0), (1.0, 1.0), (1.0, 0.0)]);
        assert!(fit.slope.estimate.is_nan());
        assert!(fit.intercept.estimate.is_nan());
        assert!(fit.slope.p_value.is_nan());
    }

    #[test]
    fn test_too_few_points_have_no_inference() {
        let fit = SimpleRegression::fit([(0.0, 1.0), (1.0, 2.0)]);
        assert_close(fit.slope.estimate, 1.0, 1e-12);
        assert!(fit.slope.p_value.is_nan());
        assert!(fit.slope.conf_low.is_nan());
    }
}
