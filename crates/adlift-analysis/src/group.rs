//! Conversion rates grouped by a key and treatment group
//!
//! Every descriptive breakdown in the report has the same shape: split the
//! observations by some key (impression bucket, weekday, hour), split each key
//! again by treatment group, and report the share of converted users in each
//! cell. [`ConversionBreakdown`] computes that table once for any key type.
//!
//! Cells without observations have no rate rather than a rate of zero, so an
//! empty cell is never mistaken for a cell where nobody converted.
//!
//! # Examples
//!
//! ```
//! use adlift_analysis::{
//!     group::ConversionBreakdown,
//!     observation::{Group, Observation, ObservationTable},
//! };
//!
//! let row = |treated, converted, mode_hour| Observation {
//!     treated,
//!     converted,
//!     total_impressions: 1,
//!     mode_day: 1,
//!     mode_hour,
//! };
//! let table = ObservationTable::from(vec![
//!     row(true, true, 9),
//!     row(true, false, 9),
//!     row(false, false, 9),
//!     row(true, true, 21),
//! ]);
//!
//! let by_hour = ConversionBreakdown::collect_by_key(&table, [], |row| Some(row.mode_hour));
//! assert_eq!(by_hour.get(&9).unwrap().test.rate_percent(), Some(50.0));
//! assert_eq!(by_hour.get(&21).unwrap().control.rate_percent(), None);
//! ```

use std::collections::BTreeMap;

use crate::observation::{ByGroup, Observation, ObservationTable};

/// Conversion counts for one cell of a breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Number of users in the cell
    pub users: usize,
    /// Number of converted users in the cell
    pub conversions: usize,
}

impl ConversionStats {
    fn record(&mut self, row: &Observation) {
        self.users += 1;
        self.conversions += usize::from(row.converted);
    }

    /// Share of converted users, or `None` for an empty cell.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn rate(&self) -> Option<f64> {
        (self.users > 0).then(|| self.conversions as f64 / self.users as f64)
    }

    /// Conversion rate in percent, or `None` for an empty cell.
    #[must_use]
    pub fn rate_percent(&self) -> Option<f64> {
        self.rate().map(|rate| rate * 100.0)
    }
}

/// Conversion counts by key and treatment group.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionBreakdown<K> {
    pub map: BTreeMap<K, ByGroup<ConversionStats>>,
}

impl<K> ConversionBreakdown<K>
where
    K: Ord,
{
    /// Groups observations by the key computed from each row.
    ///
    /// Keys listed in `keys` are always present in the result, with empty
    /// cells if no row maps to them. Rows for which `key` returns `None` are
    /// left out of the breakdown.
    ///
    /// # Arguments
    ///
    /// * `table` - The observation table
    /// * `keys` - Keys to report even when they have no rows
    /// * `key` - Closure computing the key of a row
    pub fn collect_by_key<I, F>(table: &ObservationTable, keys: I, mut key: F) -> Self
    where
        I: IntoIterator<Item = K>,
        F: FnMut(&Observation) -> Option<K>,
    {
        let mut map = keys
            .into_iter()
            .map(|k| (k, ByGroup::default()))
            .collect::<BTreeMap<K, ByGroup<ConversionStats>>>();

        for row in table.rows() {
            let Some(k) = key(row) else {
                continue;
            };
            map.entry(k)
                .or_default()
                .get_mut(row.group())
                .record(row);
        }

        Self { map }
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&ByGroup<ConversionStats>> {
        self.map.get(key)
    }

    /// Iterates over `(key, stats)` in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &ByGroup<ConversionStats>)> + '_ {
        self.map.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::Group;

    fn row(treated: bool, converted: bool, mode_day: i64) -> Observation {
        Observation {
            treated,
            converted,
            total_impressions: 0,
            mode_day,
            mode_hour: 0,
        }
    }

    #[test]
    fn test_rates_per_cell() {
        let table = ObservationTable::from(vec![
            row(true, true, 1),
            row(true, false, 1),
            row(true, false, 1),
            row(true, false, 1),
            row(false, true, 1),
            row(false, false, 1),
        ]);
        let breakdown = ConversionBreakdown::collect_by_key(&table, [], |row| Some(row.mode_day));
        let cell = breakdown.get(&1).unwrap();
        assert_eq!(cell.get(Group::Test).rate_percent(), Some(25.0));
        assert_eq!(cell.get(Group::Control).rate_percent(), Some(50.0));
        assert_eq!(
            *cell.get(Group::Test),
            ConversionStats {
                users: 4,
                conversions: 1
            }
        );
    }

    #[test]
    fn test_seeded_keys_are_kept_empty() {
        let table = ObservationTable::from(vec![row(true, true, 2)]);
        let breakdown =
            ConversionBreakdown::collect_by_key(&table, [1, 2, 3], |row| Some(row.mode_day));
        assert_eq!(breakdown.map.keys().copied().collect::<Vec<_>>(), [1, 2, 3]);
        assert_eq!(breakdown.get(&1).unwrap().test.rate(), None);
        assert_eq!(breakdown.get(&2).unwrap().test.rate(), Some(1.0));
        assert_eq!(breakdown.get(&2).unwrap().control.rate(), None);
    }

    #[test]
    fn test_rows_without_key_are_dropped() {
        let table = ObservationTable::from(vec![row(true, true, 1), row(true, true, 8)]);
        let breakdown = ConversionBreakdown::collect_by_key(&table, [], |row| {
            (1..=7).contains(&row.mode_day).then_some(row.mode_day)
        });
        assert_eq!(breakdown.map.len(), 1);
        assert_eq!(breakdown.get(&1).unwrap().test.users, 1);
    }
}
