//! Time-indexed series and the causal transforms defined over them.

mod frequency;
mod transform;
mod window;

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};

use crate::error::{Error, Result};
use crate::na::NA;

pub use self::frequency::{date_range, Frequency};
pub use self::transform::{
    difference, exponential_moving_average, geometric_mean_rolling, integrate, lag,
    log_transform, seasonal_difference, Decay,
};
pub use self::window::{rolling, Aggregation, Alignment, Rolling, Window};

/// Timestamp types usable as a series index.
pub trait Temporal: Clone + std::fmt::Debug + PartialOrd + Send + Sync + 'static {
    /// Parse a timestamp from its textual form
    fn parse_timestamp(s: &str) -> Result<Self>;

    /// Render the timestamp in the form accepted by `parse_timestamp`
    fn format_timestamp(&self) -> String;
}

impl Temporal for DateTime<Utc> {
    fn parse_timestamp(s: &str) -> Result<Self> {
        s.parse::<DateTime<Utc>>()
            .map_err(|e| Error::Format(format!("cannot parse timestamp {:?}: {}", s, e)))
    }

    fn format_timestamp(&self) -> String {
        self.to_rfc3339()
    }
}

impl Temporal for DateTime<Local> {
    fn parse_timestamp(s: &str) -> Result<Self> {
        s.parse::<DateTime<Local>>()
            .map_err(|e| Error::Format(format!("cannot parse timestamp {:?}: {}", s, e)))
    }

    fn format_timestamp(&self) -> String {
        self.to_rfc3339()
    }
}

impl Temporal for NaiveDateTime {
    fn parse_timestamp(s: &str) -> Result<Self> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
            .map_err(|e| Error::Format(format!("cannot parse timestamp {:?}: {}", s, e)))
    }

    fn format_timestamp(&self) -> String {
        self.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl Temporal for NaiveDate {
    fn parse_timestamp(s: &str) -> Result<Self> {
        match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(date) => Ok(date),
            // Month-level data is commonly written without a day ("1949-01")
            Err(_) => NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
                .map_err(|e| Error::Format(format!("cannot parse date {:?}: {}", s, e))),
        }
    }

    fn format_timestamp(&self) -> String {
        self.format("%Y-%m-%d").to_string()
    }
}

/// An ordered, immutable sequence of `(timestamp, value)` pairs.
///
/// Timestamps are strictly ascending. Every transform returns a new series with
/// the same length and the same (shared) timestamp index as its input, so
/// derived series can be fed back into further transforms or lined up against
/// each other position by position.
#[derive(Debug, Clone)]
pub struct TimeSeries<T: Temporal> {
    values: Vec<NA<f64>>,
    timestamps: Arc<[T]>,
    name: Option<String>,
    frequency: Option<Frequency>,
}

/// Output of a transform. Same length and index as the input it was derived from.
pub type DerivedSeries<T> = TimeSeries<T>;

impl<T: Temporal> TimeSeries<T> {
    /// Build a series, validating length agreement and timestamp order.
    pub fn new(values: Vec<NA<f64>>, timestamps: Vec<T>, name: Option<String>) -> Result<Self> {
        if values.len() != timestamps.len() {
            return Err(Error::LengthMismatch {
                expected: timestamps.len(),
                actual: values.len(),
            });
        }

        // `!(a < b)` also catches incomparable timestamps
        if let Some(position) = timestamps
            .windows(2)
            .position(|pair| !(pair[0] < pair[1]))
        {
            return Err(Error::UnorderedIndex {
                position: position + 1,
            });
        }

        Ok(TimeSeries {
            values,
            timestamps: timestamps.into(),
            name,
            frequency: None,
        })
    }

    /// Build a series with no missing values
    pub fn from_values(values: Vec<f64>, timestamps: Vec<T>, name: Option<String>) -> Result<Self> {
        Self::new(values.into_iter().map(NA::Value).collect(), timestamps, name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn timestamps(&self) -> &[T] {
        &self.timestamps
    }

    pub fn values(&self) -> &[NA<f64>] {
        &self.values
    }

    pub fn frequency(&self) -> Option<&Frequency> {
        self.frequency.as_ref()
    }

    pub fn with_frequency(mut self, freq: Frequency) -> Self {
        self.frequency = Some(freq);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Number of missing positions
    pub fn na_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_na()).count()
    }

    /// Present values only, in order. Dropping missing positions is always an
    /// explicit caller decision; transforms never do it themselves.
    pub fn present_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(NA::get).collect()
    }

    /// Pairs of `(timestamp, value)` in index order
    pub fn iter(&self) -> impl Iterator<Item = (&T, &NA<f64>)> {
        self.timestamps.iter().zip(self.values.iter())
    }

    /// Keep the points whose timestamp lies in `start..=end`
    pub fn filter_by_time(&self, start: &T, end: &T) -> Result<Self> {
        let mut values = Vec::new();
        let mut timestamps = Vec::new();

        for (ts, value) in self.iter() {
            if ts >= start && ts <= end {
                values.push(*value);
                timestamps.push(ts.clone());
            }
        }

        let mut filtered = Self::new(values, timestamps, self.name.clone())?;
        filtered.frequency = self.frequency.clone();
        Ok(filtered)
    }

    /// True when both series are indexed by the very same timestamps
    pub fn same_index(&self, other: &TimeSeries<T>) -> bool {
        Arc::ptr_eq(&self.timestamps, &other.timestamps)
            || self.timestamps.as_ref() == other.timestamps.as_ref()
    }

    /// Same index, name and frequency; new values.
    pub(crate) fn derive(&self, values: Vec<NA<f64>>) -> DerivedSeries<T> {
        debug_assert_eq!(values.len(), self.values.len());
        TimeSeries {
            values,
            timestamps: Arc::clone(&self.timestamps),
            name: self.name.clone(),
            frequency: self.frequency.clone(),
        }
    }
}

impl<T: Temporal> PartialEq for TimeSeries<T> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values && self.same_index(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(n: u32) -> Vec<NaiveDate> {
        (1..=n)
            .map(|d| NaiveDate::from_ymd_opt(2023, 1, d).unwrap())
            .collect()
    }

    #[test]
    fn rejects_length_disagreement() {
        let err = TimeSeries::from_values(vec![1.0, 2.0], days(3), None).unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn rejects_duplicate_and_descending_timestamps() {
        let mut stamps = days(3);
        stamps[2] = stamps[1];
        let err = TimeSeries::from_values(vec![1.0, 2.0, 3.0], stamps, None).unwrap_err();
        assert!(matches!(err, Error::UnorderedIndex { position: 2 }));

        let mut stamps = days(3);
        stamps.reverse();
        let err = TimeSeries::from_values(vec![1.0, 2.0, 3.0], stamps, None).unwrap_err();
        assert!(matches!(err, Error::UnorderedIndex { position: 1 }));
    }

    #[test]
    fn empty_series_is_valid() {
        let ts = TimeSeries::<NaiveDate>::new(Vec::new(), Vec::new(), None).unwrap();
        assert!(ts.is_empty());
        assert_eq!(ts.na_count(), 0);
    }

    #[test]
    fn derived_series_shares_the_index() {
        let ts = TimeSeries::from_values(vec![1.0, 2.0, 3.0], days(3), Some("x".into())).unwrap();
        let derived = ts.derive(vec![NA::NA, NA::Value(1.0), NA::Value(1.0)]);
        assert!(ts.same_index(&derived));
        assert_eq!(derived.name(), Some("x"));
        assert_eq!(derived.na_count(), 1);
    }

    #[test]
    fn month_only_dates_parse() {
        let date = NaiveDate::parse_timestamp("1949-03").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(1949, 3, 1).unwrap());
        assert!(NaiveDate::parse_timestamp("March").is_err());
    }
}
