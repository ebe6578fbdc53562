//! Conversion by impression frequency
//!
//! Users who see more ads tend to be more active online, and active users
//! convert more whether or not the ad works (activity bias). Splitting the
//! conversion rate by the number of impressions, for both groups side by side,
//! shows whether the control group's conversion also rises with exposure.
//!
//! Impressions are bucketed in steps of [`BUCKET_WIDTH`] up to
//! [`BUCKET_LIMIT`], with one open-ended bucket beyond:
//! `0-9`, `10-19`, …, `190-199`, `200+`. Every bucket is reported, including
//! buckets without users.

use adlift_stats::binning::{Bin, FixedWidthBins};

use crate::{
    group::{ConversionBreakdown, ConversionStats},
    observation::{ByGroup, ObservationTable},
};

/// Width of each impression bucket.
pub const BUCKET_WIDTH: u64 = 10;

/// Start of the open-ended impression bucket.
pub const BUCKET_LIMIT: u64 = 200;

/// The impression buckets used by the frequency analysis.
#[must_use]
pub fn impression_buckets() -> FixedWidthBins {
    FixedWidthBins::new(BUCKET_WIDTH, BUCKET_LIMIT)
}

/// Label of the bucket `total_impressions` falls into.
///
/// ```
/// use adlift_analysis::frequency::bucket_label;
///
/// assert_eq!(bucket_label(9), "0-9");
/// assert_eq!(bucket_label(199), "190-199");
/// assert_eq!(bucket_label(200), "200+");
/// ```
#[must_use]
pub fn bucket_label(total_impressions: u32) -> String {
    impression_buckets()
        .bin_of(u64::from(total_impressions))
        .label()
}

/// Conversion rates by impression bucket and group.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyAnalysis {
    pub buckets: FixedWidthBins,
    pub breakdown: ConversionBreakdown<Bin>,
}

impl FrequencyAnalysis {
    /// Buckets every row of `table` by its total impressions.
    ///
    /// # Examples
    ///
    /// ```
    /// use adlift_analysis::{
    ///     frequency::FrequencyAnalysis,
    ///     observation::{Observation, ObservationTable},
    /// };
    ///
    /// let row = |treated, converted, total_impressions| Observation {
    ///     treated,
    ///     converted,
    ///     total_impressions,
    ///     mode_day: 1,
    ///     mode_hour: 0,
    /// };
    /// let table = ObservationTable::from(vec![
    ///     row(true, true, 3),
    ///     row(true, false, 7),
    ///     row(false, false, 250),
    /// ]);
    ///
    /// let analysis = FrequencyAnalysis::run(&table);
    /// let rows = analysis.rows().collect::<Vec<_>>();
    /// assert_eq!(rows.len(), 21);
    /// assert_eq!(rows[0].0.label(), "0-9");
    /// assert_eq!(rows[0].1.test.rate_percent(), Some(50.0));
    /// assert_eq!(rows[20].1.control.users, 1);
    /// ```
    #[must_use]
    pub fn run(table: &ObservationTable) -> Self {
        let buckets = impression_buckets();
        let breakdown = ConversionBreakdown::collect_by_key(table, buckets.iter(), |row| {
            Some(buckets.bin_of(u64::from(row.total_impressions)))
        });
        tracing::debug!(buckets = breakdown.map.len(), "frequency breakdown");
        Self { buckets, breakdown }
    }

    /// Buckets in ascending order with their per-group conversion counts.
    pub fn rows(&self) -> impl Iterator<Item = (&Bin, &ByGroup<ConversionStats>)> + '_ {
        self.breakdown.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::{Group, Observation};

    fn row(treated: bool, converted: bool, total_impressions: u32) -> Observation {
        Observation {
            treated,
            converted,
            total_impressions,
            mode_day: 1,
            mode_hour: 0,
        }
    }

    #[test]
    fn test_bucket_labels() {
        assert_eq!(bucket_label(0), "0-9");
        assert_eq!(bucket_label(9), "0-9");
        assert_eq!(bucket_label(10), "10-19");
        assert_eq!(bucket_label(199), "190-199");
        assert_eq!(bucket_label(200), "200+");
        assert_eq!(bucket_label(2_065), "200+");
    }

    #[test]
    fn test_all_buckets_reported_in_order() {
        let analysis = FrequencyAnalysis::run(&ObservationTable::default());
        let labels = analysis
            .rows()
            .map(|(bin, _)| bin.label())
            .collect::<Vec<_>>();
        assert_eq!(labels.len(), 21);
        assert_eq!(labels[0], "0-9");
        assert_eq!(labels[1], "10-19");
        assert_eq!(labels[19], "190-199");
        assert_eq!(labels[20], "200+");
        assert!(analysis.rows().all(|(_, cell)| cell.test.rate().is_none()));
    }

    #[test]
    fn test_rates_by_bucket_and_group() {
        let table = ObservationTable::from(vec![
            row(true, true, 199),
            row(true, false, 195),
            row(false, true, 190),
            row(false, true, 200),
            row(false, false, 9),
        ]);
        let analysis = FrequencyAnalysis::run(&table);
        let rows = analysis.rows().collect::<Vec<_>>();

        let (bin, cell) = rows[19];
        assert_eq!(bin.label(), "190-199");
        assert_eq!(cell.get(Group::Test).rate_percent(), Some(50.0));
        assert_eq!(cell.get(Group::Control).rate_percent(), Some(100.0));

        let (bin, cell) = rows[20];
        assert_eq!(bin.label(), "200+");
        assert_eq!(cell.control.users, 1);
        assert_eq!(cell.test.rate(), None);

        assert_eq!(rows[0].1.control.rate_percent(), Some(0.0));
    }
}
