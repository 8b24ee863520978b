//! The simulation clock: a flat index of time buckets covering the simulated years.
use crate::model::TimeResolution;
use std::ops::{Range, RangeInclusive};

/// The number of hours in a simulated year (leap days are ignored)
pub const HOURS_PER_YEAR: usize = 8760;

impl TimeResolution {
    /// The number of buckets in each year
    pub fn buckets_per_year(self) -> usize {
        match self {
            Self::Annual => 1,
            Self::Hourly => HOURS_PER_YEAR,
        }
    }

    /// The length of each bucket in hours
    pub fn bucket_hours(self) -> f64 {
        (HOURS_PER_YEAR / self.buckets_per_year()) as f64
    }
}

/// Maps years onto contiguous ranges of time buckets
#[derive(Debug, Clone, PartialEq)]
pub struct TimeIndex {
    start_year: u32,
    end_year: u32,
    resolution: TimeResolution,
}

impl TimeIndex {
    /// Create a new index covering `start_year` to `end_year` inclusive
    pub fn new(start_year: u32, end_year: u32, resolution: TimeResolution) -> Self {
        Self {
            start_year,
            end_year,
            resolution,
        }
    }

    /// The resolution of the clock
    pub fn resolution(&self) -> TimeResolution {
        self.resolution
    }

    /// The simulated years
    pub fn years(&self) -> RangeInclusive<u32> {
        self.start_year..=self.end_year
    }

    /// Whether the year is simulated
    pub fn contains_year(&self, year: u32) -> bool {
        self.years().contains(&year)
    }

    /// The total number of buckets
    pub fn len(&self) -> usize {
        if self.end_year < self.start_year {
            return 0;
        }

        (self.end_year - self.start_year + 1) as usize * self.resolution.buckets_per_year()
    }

    /// Whether there are no buckets
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The buckets making up the given year, or `None` if it isn't simulated
    pub fn year_range(&self, year: u32) -> Option<Range<usize>> {
        if !self.contains_year(year) {
            return None;
        }

        let per_year = self.resolution.buckets_per_year();
        let start = (year - self.start_year) as usize * per_year;
        Some(start..start + per_year)
    }

    /// All buckets from the start of `year` to the end of the simulation.
    ///
    /// Years before the start are clamped to the first bucket; years after the end give an empty
    /// range.
    pub fn buckets_from(&self, year: u32) -> Range<usize> {
        let per_year = self.resolution.buckets_per_year();
        let start = (year.saturating_sub(self.start_year) as usize * per_year).min(self.len());
        start..self.len()
    }
}
