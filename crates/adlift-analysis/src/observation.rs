//! Observation table for an A/B advertising experiment
//!
//! Each row describes one user: whether they were in the treatment group
//! (shown the advertisement) or the control group (shown a public-service
//! announcement), how many impressions they received, whether they converted,
//! and the day and hour at which they saw most of their impressions.
//!
//! # CSV Layout
//!
//! The table is read from CSV with a header row. Column names follow the
//! experiment export; any extra column (such as `user_id`) is ignored:
//!
//! ```text
//! user_id,test,converted,tot_impr,mode_impr_day,mode_impr_hour
//! 1069124,1,0,130,1,20
//! 1119715,1,0,93,2,22
//! 1144181,0,0,21,2,18
//! ```
//!
//! | Column           | Field                 | Values            |
//! |------------------|-----------------------|-------------------|
//! | `test`           | [`Observation::treated`]           | `0`/`1`  |
//! | `converted`      | [`Observation::converted`]         | `0`/`1`  |
//! | `tot_impr`       | [`Observation::total_impressions`] | `>= 0`   |
//! | `mode_impr_day`  | [`Observation::mode_day`]          | `1`..`7` |
//! | `mode_impr_hour` | [`Observation::mode_hour`]         | `0`..`23`|
//!
//! All five columns must be present in the header, even when the file has
//! no data rows.
//!
//! Day and hour codes are not range-checked on load; codes outside their
//! expected range are kept and handled by the time-of-day analysis.
//!
//! # Examples
//!
//! ```
//! use adlift_analysis::observation::{Group, ObservationTable};
//!
//! let csv = "\
//! test,converted,tot_impr,mode_impr_day,mode_impr_hour
//! 1,1,30,1,12
//! 0,0,25,3,9
//! 1,0,5,7,23
//! ";
//! let table = ObservationTable::from_csv_reader(csv.as_bytes()).unwrap();
//!
//! assert_eq!(table.len(), 3);
//! assert_eq!(table.group_size(Group::Test), 2);
//! assert_eq!(table.group_impressions(Group::Test), 35);
//! ```

use std::{fmt, io};

use serde::{Deserialize, Serialize};

/// Columns every experiment CSV must provide.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "test",
    "converted",
    "tot_impr",
    "mode_impr_day",
    "mode_impr_hour",
];

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ReadTableError {
    #[display("missing required column(s): {}", missing.join(", "))]
    MissingColumns { missing: Vec<&'static str> },
    #[display("invalid CSV data")]
    Csv { source: csv::Error },
}

impl From<csv::Error> for ReadTableError {
    fn from(source: csv::Error) -> Self {
        Self::Csv { source }
    }
}

/// Experiment arm a user was assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Group {
    /// Shown a public-service announcement in place of the advertisement
    Control,
    /// Shown the advertisement
    Test,
}

impl Group {
    /// Both groups, control first.
    pub const ALL: [Group; 2] = [Group::Control, Group::Test];

    /// Group for a treatment indicator value.
    #[must_use]
    pub fn from_treated(treated: bool) -> Self {
        if treated { Group::Test } else { Group::Control }
    }

    /// Treatment indicator of this group as a regressor value.
    #[must_use]
    pub fn indicator(self) -> f64 {
        match self {
            Group::Control => 0.0,
            Group::Test => 1.0,
        }
    }

    #[must_use]
    pub fn to_str(self) -> &'static str {
        match self {
            Group::Control => "Control",
            Group::Test => "Test",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.to_str(), f)
    }
}

/// A pair of values, one per [`Group`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ByGroup<T> {
    pub control: T,
    pub test: T,
}

impl<T> ByGroup<T> {
    /// Builds a pair by evaluating `f` for each group.
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(Group) -> T,
    {
        Self {
            control: f(Group::Control),
            test: f(Group::Test),
        }
    }

    #[must_use]
    pub fn get(&self, group: Group) -> &T {
        match group {
            Group::Control => &self.control,
            Group::Test => &self.test,
        }
    }

    pub fn get_mut(&mut self, group: Group) -> &mut T {
        match group {
            Group::Control => &mut self.control,
            Group::Test => &mut self.test,
        }
    }

    pub fn map<U, F>(self, mut f: F) -> ByGroup<U>
    where
        F: FnMut(T) -> U,
    {
        ByGroup {
            control: f(self.control),
            test: f(self.test),
        }
    }
}

/// One user in the experiment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Observation {
    /// `true` if the user was in the test group
    #[serde(rename = "test", with = "indicator")]
    pub treated: bool,
    /// Whether the user converted
    #[serde(rename = "converted", with = "indicator")]
    pub converted: bool,
    /// Total number of impressions shown to the user
    #[serde(rename = "tot_impr")]
    pub total_impressions: u32,
    /// Day of week with the most impressions, `1` = Monday … `7` = Sunday
    #[serde(rename = "mode_impr_day")]
    pub mode_day: i64,
    /// Hour of day with the most impressions, `0`..`23`
    #[serde(rename = "mode_impr_hour")]
    pub mode_hour: i64,
}

impl Observation {
    #[must_use]
    pub fn group(&self) -> Group {
        Group::from_treated(self.treated)
    }

    /// Conversion flag as a 0/1 response value.
    #[must_use]
    pub fn conversion_value(&self) -> f64 {
        if self.converted { 1.0 } else { 0.0 }
    }
}

/// The full experiment dataset, loaded once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationTable {
    rows: Vec<Observation>,
}

impl From<Vec<Observation>> for ObservationTable {
    fn from(rows: Vec<Observation>) -> Self {
        Self { rows }
    }
}

impl FromIterator<Observation> for ObservationTable {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl ObservationTable {
    /// Reads a table from CSV with a header row.
    ///
    /// Fails if the header lacks any of [`REQUIRED_COLUMNS`], or on the first
    /// row holding a value that does not parse.
    pub fn from_csv_reader<R>(reader: R) -> Result<Self, ReadTableError>
    where
        R: io::Read,
    {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?;
        let missing = REQUIRED_COLUMNS
            .into_iter()
            .filter(|column| !headers.iter().any(|header| header == *column))
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(ReadTableError::MissingColumns { missing });
        }

        let rows = reader
            .deserialize::<Observation>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    /// Writes the table as CSV with a header row.
    pub fn write_csv<W>(&self, writer: W) -> Result<(), csv::Error>
    where
        W: io::Write,
    {
        let mut writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows assigned to `group`.
    pub fn group_rows(&self, group: Group) -> impl Iterator<Item = &Observation> + '_ {
        self.rows.iter().filter(move |row| row.group() == group)
    }

    /// Number of rows assigned to `group`.
    #[must_use]
    pub fn group_size(&self, group: Group) -> usize {
        self.group_rows(group).count()
    }

    /// Total impressions served to `group`.
    #[must_use]
    pub fn group_impressions(&self, group: Group) -> u64 {
        self.group_rows(group)
            .map(|row| u64::from(row.total_impressions))
            .sum()
    }
}

/// Serde adapter for 0/1 indicator columns.
///
/// Accepts `0`, `1`, `0.0`, `1.0`, `true` and `false`; writes `0` or `1`.
mod indicator {
    use serde::{Deserialize as _, Deserializer, Serializer, de};

    #[derive(Debug, derive_more::Display, derive_more::Error)]
    #[display("invalid indicator value {value:?}, expected 0 or 1")]
    pub(super) struct InvalidIndicator {
        value: String,
    }

    pub(super) fn parse(value: &str) -> Result<bool, InvalidIndicator> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "1.0" | "true" => Ok(true),
            "0" | "0.0" | "false" => Ok(false),
            _ => Err(InvalidIndicator {
                value: value.to_owned(),
            }),
        }
    }

    pub(super) fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(u8::from(*value))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        parse(&value).map_err(de::Error::custom)
    }
}
