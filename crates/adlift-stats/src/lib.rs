//! Statistical building blocks for the adlift experiment analysis.
//!
//! This crate provides the numeric pieces the analysis pipeline is assembled from:
//!
//! - **Descriptive statistics**: Count, sum, mean, variance and range of a sample
//! - **Simple linear regression**: Ordinary least squares with one regressor and an
//!   intercept, including classical standard errors, t statistics, p-values and
//!   confidence intervals
//! - **Fixed-width binning**: Equal-width buckets with an open-ended overflow bucket
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`regression`]: Ordinary least squares fit of `y = a + b * x`
//! - [`binning`]: Fixed-width binning of non-negative counts
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use adlift_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.sum, 15.0);
//! ```
//!
//! ## Fitting a regression line
//!
//! ```
//! use adlift_stats::regression::SimpleRegression;
//!
//! let points = [(0.0, 1.0), (1.0, 3.0), (2.0, 5.0), (3.0, 7.0)];
//! let fit = SimpleRegression::fit(points);
//! assert!((fit.intercept.estimate - 1.0).abs() < 1e-12);
//! assert!((fit.slope.estimate - 2.0).abs() < 1e-12);
//! ```
//!
//! ## Binning counts
//!
//! ```
//! use adlift_stats::binning::FixedWidthBins;
//!
//! let bins = FixedWidthBins::new(10, 200);
//! assert_eq!(bins.bin_of(199).label(), "190-199");
//! assert_eq!(bins.bin_of(200).label(), "200+");
//! ```

pub mod binning;
pub mod descriptive;
pub mod regression;
