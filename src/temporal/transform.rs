//! Length-preserving, causal transforms.
//!
//! Each function takes a series and returns a new one on the same index.
//! Positions without enough history are `NA::NA`; `output[i]` never reads
//! `input[i + 1..]`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::na::NA;
use crate::temporal::window::map_windows;
use crate::temporal::{DerivedSeries, Temporal, TimeSeries, Window};

/// `out[i] = values[i - k]`, missing for `i < k`
fn shifted(values: &[NA<f64>], k: usize) -> impl Iterator<Item = NA<f64>> + '_ {
    (0..values.len()).map(move |i| if i < k { NA::NA } else { values[i - k] })
}

/// `out[i] = values[i] - values[i - k]`, missing for `i < k`
fn differenced(values: &[NA<f64>], k: usize) -> Vec<NA<f64>> {
    values
        .iter()
        .zip(shifted(values, k))
        .map(|(current, previous)| *current - previous)
        .collect()
}

/// First `value <= 0` (or NaN) among present values
fn first_non_positive(values: &[NA<f64>]) -> Option<(usize, f64)> {
    values.iter().enumerate().find_map(|(index, value)| match value {
        NA::Value(v) if !(*v > 0.0) => Some((index, *v)),
        _ => None,
    })
}

/// Order-`order` differencing.
///
/// First differencing is applied `order` times, so the first `order` positions
/// are missing and the output keeps the input's length.
pub fn difference<T: Temporal>(series: &TimeSeries<T>, order: usize) -> Result<DerivedSeries<T>> {
    if order == 0 {
        return Err(Error::InvalidConfiguration(
            "difference order must be at least 1".to_string(),
        ));
    }
    log::debug!("difference of order {} over {} points", order, series.len());

    // After `len` passes every position is already missing
    let mut values = series.values().to_vec();
    for _ in 0..order.min(values.len()) {
        values = differenced(&values, 1);
    }
    Ok(series.derive(values))
}

/// Lagged difference `s[i] - s[i - period]`, e.g. period 12 for monthly data.
pub fn seasonal_difference<T: Temporal>(
    series: &TimeSeries<T>,
    period: usize,
) -> Result<DerivedSeries<T>> {
    if period == 0 {
        return Err(Error::InvalidConfiguration(
            "seasonal period must be at least 1".to_string(),
        ));
    }
    log::debug!("seasonal difference at period {} over {} points", period, series.len());
    Ok(series.derive(differenced(series.values(), period)))
}

/// Shift the series `k >= 1` positions into the future.
pub fn lag<T: Temporal>(series: &TimeSeries<T>, k: usize) -> Result<DerivedSeries<T>> {
    if k == 0 {
        return Err(Error::InvalidConfiguration(
            "lag must be at least 1".to_string(),
        ));
    }
    log::debug!("lag {} over {} points", k, series.len());
    Ok(series.derive(shifted(series.values(), k).collect()))
}

/// Undo first differencing.
///
/// `out[0] = initial` and `out[i] = out[i - 1] + d[i]`. The leading element of
/// `d` is ignored. A missing difference leaves every later level missing.
pub fn integrate<T: Temporal>(differences: &TimeSeries<T>, initial: f64) -> DerivedSeries<T> {
    let mut level = NA::Value(initial);
    let values = differences
        .values()
        .iter()
        .enumerate()
        .map(|(i, d)| {
            if i > 0 {
                level = level + *d;
            }
            level
        })
        .collect();
    differences.derive(values)
}

/// Exponentially weighted moving average with smoothing factor `alpha` in `(0, 1]`.
///
/// The first present value seeds the estimate; earlier positions stay missing.
/// After that `out[i] = alpha * s[i] + (1 - alpha) * out[i - 1]`, and a missing
/// input holds the previous estimate instead of breaking the recursion.
pub fn exponential_moving_average<T: Temporal>(
    series: &TimeSeries<T>,
    alpha: f64,
) -> Result<DerivedSeries<T>> {
    let alpha = Decay::Alpha(alpha).alpha()?;
    log::debug!("ewma alpha={} over {} points", alpha, series.len());

    let mut estimate: Option<f64> = None;
    let values = series
        .values()
        .iter()
        .map(|value| {
            estimate = match (estimate, value) {
                (None, NA::Value(v)) => Some(*v),
                (Some(prev), NA::Value(v)) => Some(alpha * v + (1.0 - alpha) * prev),
                (held, NA::NA) => held,
            };
            estimate.map_or(NA::NA, NA::Value)
        })
        .collect();
    Ok(series.derive(values))
}

/// Smoothing strength of an exponentially weighted average
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decay {
    /// Smoothing factor in `(0, 1]`
    Alpha(f64),
    /// Span in periods; `alpha = 2 / (span + 1)`
    Span(usize),
}

impl Decay {
    /// Validated smoothing factor
    pub fn alpha(&self) -> Result<f64> {
        match *self {
            Decay::Alpha(alpha) if alpha > 0.0 && alpha <= 1.0 => Ok(alpha),
            Decay::Alpha(alpha) => Err(Error::InvalidConfiguration(format!(
                "decay factor {} must lie in (0, 1]",
                alpha
            ))),
            Decay::Span(0) => Err(Error::InvalidConfiguration(
                "span must be at least 1".to_string(),
            )),
            Decay::Span(span) => Ok(2.0 / (span as f64 + 1.0)),
        }
    }
}

/// Rolling geometric mean, `exp(mean(ln(window)))`.
///
/// Missing values propagate as in [`rolling`](crate::temporal::rolling). Every
/// present value that falls in some window must be strictly positive; the
/// first offending position is reported as a `DomainError`.
pub fn geometric_mean_rolling<T: Temporal>(
    series: &TimeSeries<T>,
    window: &Window,
) -> Result<DerivedSeries<T>> {
    // With a window longer than the series no value is ever windowed
    if window.size() <= series.len() {
        if let Some((index, value)) = first_non_positive(series.values()) {
            return Err(Error::DomainError { index, value });
        }
    }
    log::debug!(
        "rolling geometric mean over {} points, window {}",
        series.len(),
        window.size()
    );

    let values = map_windows(series.values(), window, |w| {
        let mean_log = w.iter().map(|v| v.ln()).sum::<f64>() / w.len() as f64;
        NA::Value(mean_log.exp())
    });
    Ok(series.derive(values))
}

/// Natural logarithm of every present value.
pub fn log_transform<T: Temporal>(series: &TimeSeries<T>) -> Result<DerivedSeries<T>> {
    if let Some((index, value)) = first_non_positive(series.values()) {
        return Err(Error::DomainError { index, value });
    }
    Ok(series.derive(series.values().iter().map(|v| v.map(|x| x.ln())).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifted_pads_with_missing() {
        let values = vec![NA::Value(1.0), NA::Value(2.0), NA::Value(3.0)];
        let out: Vec<_> = shifted(&values, 2).collect();
        assert_eq!(out, vec![NA::NA, NA::NA, NA::Value(1.0)]);

        let out: Vec<_> = shifted(&values, 5).collect();
        assert!(out.iter().all(NA::is_na));
    }

    #[test]
    fn decay_from_span_matches_the_usual_formula() {
        assert!((Decay::Span(3).alpha().unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(Decay::Alpha(1.0).alpha().unwrap(), 1.0);
        assert!(Decay::Alpha(0.0).alpha().is_err());
        assert!(Decay::Alpha(1.5).alpha().is_err());
        assert!(Decay::Alpha(f64::NAN).alpha().is_err());
        assert!(Decay::Span(0).alpha().is_err());
    }

    #[test]
    fn non_positive_scan_skips_missing() {
        let values = vec![NA::Value(1.0), NA::NA, NA::Value(0.0), NA::Value(-2.0)];
        assert_eq!(first_non_positive(&values), Some((2, 0.0)));
        assert_eq!(first_non_positive(&[NA::NA, NA::Value(3.0)]), None);
    }
}
