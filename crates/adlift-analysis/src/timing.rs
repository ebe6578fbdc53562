//! Conversion by day of week and hour of day
//!
//! Breaks the conversion rate down by the day and the hour at which each user
//! saw most of their impressions, and finds the day and hour where the ad
//! converts best for the test group.
//!
//! Day codes run from `1` (Monday) to `7` (Sunday). Rows with any other day
//! code have no weekday and are left out of the day breakdown; they are never
//! folded into a valid day. Hours are reported for every hour code present in
//! the data.

use std::fmt;

use crate::{
    group::{ConversionBreakdown, ConversionStats},
    observation::{ByGroup, Group, ObservationTable},
};

/// Day of the week, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// All days, Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Weekday for a day code, `1` = Monday … `7` = Sunday.
    ///
    /// ```
    /// use adlift_analysis::timing::Weekday;
    ///
    /// assert_eq!(Weekday::from_code(1), Some(Weekday::Mon));
    /// assert_eq!(Weekday::from_code(7), Some(Weekday::Sun));
    /// assert_eq!(Weekday::from_code(0), None);
    /// assert_eq!(Weekday::from_code(8), None);
    /// ```
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        let index = usize::try_from(code.checked_sub(1)?).ok()?;
        Self::ALL.get(index).copied()
    }

    /// Three-letter abbreviation.
    #[must_use]
    pub fn to_str(self) -> &'static str {
        match self {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
            Weekday::Sun => "Sun",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.to_str(), f)
    }
}

/// The key with the highest conversion rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak<K> {
    pub key: K,
    pub rate_percent: f64,
}

/// Finds the key with the highest conversion rate for `group`.
///
/// Keys are visited in ascending order and only a strictly higher rate
/// replaces the current peak, so ties go to the first key. Empty cells are
/// skipped; `None` if every cell is empty.
fn peak<K>(breakdown: &ConversionBreakdown<K>, group: Group) -> Option<Peak<K>>
where
    K: Ord + Copy,
{
    let mut best: Option<Peak<K>> = None;
    for (key, cell) in breakdown.iter() {
        let Some(rate_percent) = cell.get(group).rate_percent() else {
            continue;
        };
        if best.is_none_or(|b| rate_percent > b.rate_percent) {
            best = Some(Peak {
                key: *key,
                rate_percent,
            });
        }
    }
    best
}

/// Conversion rates by weekday and by hour.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingAnalysis {
    /// All seven days, Monday first
    pub by_day: ConversionBreakdown<Weekday>,
    /// Every hour code present in the data, ascending
    pub by_hour: ConversionBreakdown<i64>,
    /// Best day for the test group
    pub best_day: Option<Peak<Weekday>>,
    /// Best hour for the test group
    pub best_hour: Option<Peak<i64>>,
}

impl TimingAnalysis {
    /// # Examples
    ///
    /// ```
    /// use adlift_analysis::{
    ///     observation::{Observation, ObservationTable},
    ///     timing::{TimingAnalysis, Weekday},
    /// };
    ///
    /// let row = |converted, mode_day, mode_hour| Observation {
    ///     treated: true,
    ///     converted,
    ///     total_impressions: 1,
    ///     mode_day,
    ///     mode_hour,
    /// };
    /// let table = ObservationTable::from(vec![
    ///     row(false, 1, 9),
    ///     row(true, 5, 20),
    ///     row(false, 5, 9),
    /// ]);
    ///
    /// let analysis = TimingAnalysis::run(&table);
    /// assert_eq!(analysis.best_day.unwrap().key, Weekday::Fri);
    /// assert_eq!(analysis.best_hour.unwrap().key, 20);
    /// assert_eq!(analysis.best_hour.unwrap().rate_percent, 100.0);
    /// ```
    #[must_use]
    pub fn run(table: &ObservationTable) -> Self {
        let by_day = ConversionBreakdown::collect_by_key(table, Weekday::ALL, |row| {
            Weekday::from_code(row.mode_day)
        });
        let by_hour = ConversionBreakdown::collect_by_key(table, [], |row| Some(row.mode_hour));

        let unlabeled = table
            .rows()
            .iter()
            .filter(|row| Weekday::from_code(row.mode_day).is_none())
            .count();
        if unlabeled > 0 {
            tracing::warn!(
                rows = unlabeled,
                "rows with a day code outside 1-7 left out of the day breakdown"
            );
        }

        let best_day = peak(&by_day, Group::Test);
        let best_hour = peak(&by_hour, Group::Test);

        Self {
            by_day,
            by_hour,
            best_day,
            best_hour,
        }
    }

    /// Days in display order with their per-group conversion counts.
    pub fn day_rows(&self) -> impl Iterator<Item = (&Weekday, &ByGroup<ConversionStats>)> + '_ {
        self.by_day.iter()
    }

    /// Hours in ascending order with their per-group conversion counts.
    pub fn hour_rows(&self) -> impl Iterator<Item = (&i64, &ByGroup<ConversionStats>)> + '_ {
        self.by_hour.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::Observation;

    fn row(treated: bool, converted: bool, mode_day: i64, mode_hour: i64) -> Observation {
        Observation {
            treated,
            converted,
            total_impressions: 1,
            mode_day,
            mode_hour,
        }
    }

    #[test]
    fn test_day_codes() {
        assert_eq!(Weekday::from_code(1).map(Weekday::to_str), Some("Mon"));
        assert_eq!(Weekday::from_code(4).map(Weekday::to_str), Some("Thu"));
        assert_eq!(Weekday::from_code(7).map(Weekday::to_str), Some("Sun"));
        assert_eq!(Weekday::from_code(0), None);
        assert_eq!(Weekday::from_code(8), None);
        assert_eq!(Weekday::from_code(-1), None);
        assert_eq!(Weekday::from_code(i64::MIN), None);
    }

    #[test]
    fn test_days_in_fixed_order() {
        let table = ObservationTable::from(vec![row(true, true, 7, 0), row(true, false, 3, 0)]);
        let analysis = TimingAnalysis::run(&table);
        let days = analysis.day_rows().map(|(d, _)| *d).collect::<Vec<_>>();
        assert_eq!(days, Weekday::ALL);
        assert_eq!(analysis.by_day.get(&Weekday::Mon).unwrap().test.rate(), None);
    }

    #[test]
    fn test_out_of_range_day_is_excluded() {
        let table = ObservationTable::from(vec![row(true, true, 8, 0), row(true, false, 1, 0)]);
        let analysis = TimingAnalysis::run(&table);
        let counted = analysis
            .day_rows()
            .map(|(_, cell)| cell.test.users)
            .sum::<usize>();
        assert_eq!(counted, 1);
        assert_eq!(analysis.best_day.unwrap().key, Weekday::Mon);
        assert_eq!(analysis.best_day.unwrap().rate_percent, 0.0);
    }

    #[test]
    fn test_hours_only_where_observed() {
        let table = ObservationTable::from(vec![row(true, true, 1, 23), row(false, false, 1, 4)]);
        let analysis = TimingAnalysis::run(&table);
        let hours = analysis.hour_rows().map(|(h, _)| *h).collect::<Vec<_>>();
        assert_eq!(hours, [4, 23]);
    }

    #[test]
    fn test_best_uses_test_group_only() {
        let table = ObservationTable::from(vec![
            row(false, true, 2, 5),
            row(true, false, 2, 5),
            row(true, true, 6, 18),
        ]);
        let analysis = TimingAnalysis::run(&table);
        assert_eq!(analysis.best_day.unwrap().key, Weekday::Sat);
        assert_eq!(analysis.best_hour.unwrap().key, 18);
    }

    #[test]
    fn test_ties_resolve_to_first_in_order() {
        let table = ObservationTable::from(vec![
            row(true, true, 5, 14),
            row(true, true, 2, 8),
            row(true, false, 3, 3),
        ]);
        let analysis = TimingAnalysis::run(&table);
        assert_eq!(analysis.best_day.unwrap().key, Weekday::Tue);
        assert_eq!(analysis.best_hour.unwrap().key, 8);
    }

    #[test]
    fn test_no_test_rows_has_no_peak() {
        let table = ObservationTable::from(vec![row(false, true, 1, 1)]);
        let analysis = TimingAnalysis::run(&table);
        assert!(analysis.best_day.is_none());
        assert!(analysis.best_hour.is_none());
    }
}
