//! Summary statistics and serial-dependence measures for time series.
//!
//! These consume transform output (for instance first differences) and never
//! drop or impute missing positions on their own: statistics are computed over
//! present values, and pairwise measures over positions where both sides are
//! present.

mod correlation;

pub use self::correlation::{
    autocorrelation, check_aligned, lagged_correlation, partial_autocorrelation, pearson,
};

use crate::error::{Error, Result};
use crate::temporal::{Temporal, TimeSeries};

/// Summary of the present values of a series
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    /// Number of present values
    pub count: usize,
    /// Number of missing positions
    pub missing: usize,
    pub mean: f64,
    /// Sample standard deviation (ddof = 1), 0 for a single value
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Sample skewness; `None` when the spread is zero
    pub skewness: Option<f64>,
    /// Excess kurtosis (0 for a normal distribution); `None` when the spread is zero
    pub kurtosis: Option<f64>,
}

/// Describe the distribution of a series' present values.
///
/// Skewness and excess kurtosis give a quick normality check of, e.g., the
/// first differences of a series.
///
/// # Example
/// ```rust
/// use chrono::NaiveDate;
/// use tempolag::stats;
/// use tempolag::temporal::{date_range, Frequency, TimeSeries};
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let dates = date_range(start, 5, &Frequency::Daily).unwrap();
/// let ts = TimeSeries::from_values(vec![1.0, 2.0, 3.0, 4.0, 5.0], dates, None).unwrap();
/// let summary = stats::describe(&ts).unwrap();
/// assert_eq!(summary.median, 3.0);
/// ```
pub fn describe<T: Temporal>(series: &TimeSeries<T>) -> Result<DescriptiveStats> {
    let data = series.present_values();
    if data.is_empty() {
        return Err(Error::EmptyData(
            "a summary needs at least one present value".to_string(),
        ));
    }

    let count = data.len();
    let n = count as f64;
    let mean = data.iter().sum::<f64>() / n;

    let m2 = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let m3 = data.iter().map(|x| (x - mean).powi(3)).sum::<f64>() / n;
    let m4 = data.iter().map(|x| (x - mean).powi(4)).sum::<f64>() / n;

    let std = if count > 1 {
        (m2 * n / (n - 1.0)).sqrt()
    } else {
        0.0
    };
    let (skewness, kurtosis) = if m2 > 0.0 {
        (Some(m3 / m2.powf(1.5)), Some(m4 / (m2 * m2) - 3.0))
    } else {
        (None, None)
    };

    let mut sorted = data;
    sorted.sort_by(|a, b| a.total_cmp(b));

    Ok(DescriptiveStats {
        count,
        missing: series.na_count(),
        mean,
        std,
        min: sorted[0],
        q1: percentile(&sorted, 0.25),
        median: percentile(&sorted, 0.5),
        q3: percentile(&sorted, 0.75),
        max: sorted[count - 1],
        skewness,
        kurtosis,
    })
}

/// Linear interpolation between closest ranks
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let idx = p * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let weight = idx - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}
