//! Analysis of A/B advertising experiments
//!
//! This crate answers the questions a marketing team asks after running an
//! experiment where the test group saw an advertisement and the control
//! group saw a public-service announcement (PSA) in its place.
//!
//! # Overview
//!
//! The analysis runs over one [`observation::ObservationTable`] loaded from
//! CSV, one user per row:
//!
//! 1. **Randomization Check** ([`randomization::RandomizationCheck`]): Did both
//!    groups receive a similar number of impressions?
//! 2. **Effectiveness** ([`effectiveness::Effectiveness`]): How much did the ad
//!    raise the conversion probability (the lift), and is it significant?
//! 3. **Profitability** ([`roi::RoiReport`]): Did the incremental revenue cover
//!    the cost of the impressions? What did holding out the control group cost?
//! 4. **Frequency** ([`frequency::FrequencyAnalysis`]): How does conversion
//!    change with the number of impressions in each group?
//! 5. **Timing** ([`timing::TimingAnalysis`]): On which weekday and at which
//!    hour does the ad convert best?
//!
//! [`report::ExperimentReport`] runs all five steps in this order. The
//! grouping shared by the descriptive steps lives in [`group`], and
//! [`synthetic`] draws tables with a known lift.
//!
//! # Degenerate Data
//!
//! Nothing in the pipeline fails once the table is loaded. A table where every
//! user is in the same group yields NaN regression coefficients, and the NaN
//! values flow into the ROI figures unchanged.
//!
//! # Examples
//!
//! ```
//! use adlift_analysis::{
//!     observation::ObservationTable,
//!     report::{AnalysisParams, ExperimentReport},
//! };
//!
//! let csv = "\
//! test,converted,tot_impr,mode_impr_day,mode_impr_hour
//! 1,1,30,1,12
//! 1,0,12,2,9
//! 1,0,8,5,20
//! 0,0,25,3,9
//! 0,1,40,6,12
//! 0,0,3,7,23
//! ";
//! let table = ObservationTable::from_csv_reader(csv.as_bytes()).unwrap();
//! let report = ExperimentReport::analyze(&table, AnalysisParams::default());
//!
//! assert_eq!(report.roi.exposure.test.impressions, 50);
//! assert!(report.effectiveness.lift().abs() < 1e-12);
//! ```

pub mod effectiveness;
pub mod frequency;
pub mod group;
pub mod observation;
pub mod randomization;
pub mod report;
pub mod roi;
pub mod synthetic;
pub mod timing;
