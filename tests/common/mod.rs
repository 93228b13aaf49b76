//! Common test utilities module
//!
//! Builders for small daily and monthly series plus approximate comparison
//! helpers shared by the integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use tempolag::temporal::{date_range, Frequency, TimeSeries};
use tempolag::NA;

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Daily series starting 2023-01-01 with no missing values
pub fn daily(values: &[f64]) -> TimeSeries<NaiveDate> {
    let dates = date_range(day("2023-01-01"), values.len(), &Frequency::Daily).unwrap();
    TimeSeries::from_values(values.to_vec(), dates, Some("test".to_string())).unwrap()
}

/// Daily series where `None` marks a missing value
pub fn daily_with_gaps(values: &[Option<f64>]) -> TimeSeries<NaiveDate> {
    let dates = date_range(day("2023-01-01"), values.len(), &Frequency::Daily).unwrap();
    let values = values.iter().map(|v| NA::<f64>::from(*v)).collect();
    TimeSeries::new(values, dates, Some("test".to_string())).unwrap()
}

/// Expected output written as options, for readability in assertions
pub fn na(values: &[Option<f64>]) -> Vec<NA<f64>> {
    values.iter().map(|v| NA::<f64>::from(*v)).collect()
}

/// Compare two value vectors within `tolerance`, missing matching missing
pub fn assert_values_close(actual: &[NA<f64>], expected: &[NA<f64>], tolerance: f64) {
    assert_eq!(actual.len(), expected.len(), "length differs");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            a.approx_eq(e, tolerance),
            "position {}: expected {:?}, got {:?}",
            i,
            e,
            a
        );
    }
}
