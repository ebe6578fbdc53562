//! Fixed-width binning for count data
//!
//! This module divides non-negative counts into equal-width bins starting at
//! zero, followed by a single open-ended overflow bin that collects every
//! value at or beyond the upper limit. Bins are half-open: a bin starting at
//! `s` with width `w` holds `s <= value < s + w`.
//!
//! With a width of 10 and an upper limit of 200 the bins are:
//!
//! ```text
//! [0,10) [10,20) ... [190,200) [200,inf)
//!  0-9    10-19  ...  190-199    200+
//! ```
//!
//! # Examples
//!
//! ```
//! use adlift_stats::binning::FixedWidthBins;
//!
//! let bins = FixedWidthBins::new(10, 200);
//! assert_eq!(bins.len(), 21);
//!
//! assert_eq!(bins.bin_of(0).label(), "0-9");
//! assert_eq!(bins.bin_of(9).label(), "0-9");
//! assert_eq!(bins.bin_of(10).label(), "10-19");
//! assert_eq!(bins.bin_of(5000).label(), "200+");
//!
//! let labels = bins.iter().map(|bin| bin.label()).collect::<Vec<_>>();
//! assert_eq!(labels.first().unwrap(), "0-9");
//! assert_eq!(labels.last().unwrap(), "200+");
//! ```

use std::fmt;

/// A set of equal-width bins over `[0, limit)` plus an overflow bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWidthBins {
    width: u64,
    bounded_bins: u64,
}

/// A single bin produced by [`FixedWidthBins`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bin {
    /// Position of this bin, counting from zero
    pub index: usize,
    /// Smallest value in this bin
    pub start: u64,
    /// First value past this bin, `None` for the overflow bin
    pub end: Option<u64>,
}

impl Bin {
    /// Returns `true` if `value` falls into this bin.
    #[must_use]
    pub fn contains(&self, value: u64) -> bool {
        value >= self.start && self.end.is_none_or(|end| value < end)
    }

    /// Human-readable label: `"start-last"` for bounded bins, `"start+"` for the overflow bin.
    #[must_use]
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Bin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}-{}", self.start, end - 1),
            None => write!(f, "{}+", self.start),
        }
    }
}

impl FixedWidthBins {
    /// Creates bins of `width` covering `[0, limit)` followed by an overflow bin.
    ///
    /// `limit` is rounded up to a multiple of `width`.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero.
    #[must_use]
    pub fn new(width: u64, limit: u64) -> Self {
        assert!(width > 0, "bin width must be positive");
        Self {
            width,
            bounded_bins: limit.div_ceil(width),
        }
    }

    /// Width of each bounded bin.
    #[must_use]
    pub fn width(&self) -> u64 {
        self.width
    }

    /// Start of the overflow bin.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.bounded_bins * self.width
    }

    /// Number of bins, including the overflow bin.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bounded_bins as usize + 1
    }

    /// Always `false`: there is at least the overflow bin.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the bin at `index`, or `None` if out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Bin> {
        let idx = index as u64;
        if idx < self.bounded_bins {
            let start = idx * self.width;
            Some(Bin {
                index,
                start,
                end: Some(start + self.width),
            })
        } else if idx == self.bounded_bins {
            Some(Bin {
                index,
                start: self.limit(),
                end: None,
            })
        } else {
            None
        }
    }

    /// Index of the bin `value` falls into.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn index_of(&self, value: u64) -> usize {
        (value / self.width).min(self.bounded_bins) as usize
    }

    /// The bin `value` falls into.
    #[must_use]
    pub fn bin_of(&self, value: u64) -> Bin {
        let index = self.index_of(value);
        self.get(index)
            .unwrap_or_else(|| unreachable!("index_of always returns a valid bin index"))
    }

    /// Iterates over all bins in ascending order, ending with the overflow bin.
    pub fn iter(&self) -> impl Iterator<Item = Bin> + '_ {
        (0..self.len()).filter_map(|index| self.get(index))
    }
}
