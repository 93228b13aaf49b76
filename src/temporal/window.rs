//! Right-aligned rolling windows.
//!
//! The output at position `i` only ever sees inputs at positions `<= i`.
//! No centred or left-aligned variant exists.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::na::NA;
use crate::temporal::{DerivedSeries, Temporal, TimeSeries};

/// Where the window sits relative to the output position.
///
/// `Right` is the only causal alignment and the only one offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Window covers `i-k+1..=i`
    #[default]
    Right,
}

/// Validated rolling window configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WindowDef", into = "WindowDef")]
pub struct Window {
    size: usize,
    alignment: Alignment,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct WindowDef {
    size: usize,
    #[serde(default)]
    alignment: Alignment,
}

impl Window {
    /// A right-aligned window of `size` observations; `size` must be at least 1.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidConfiguration(
                "window size must be at least 1".to_string(),
            ));
        }
        Ok(Window {
            size,
            alignment: Alignment::Right,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }
}

impl TryFrom<WindowDef> for Window {
    type Error = Error;

    fn try_from(def: WindowDef) -> Result<Self> {
        let window = Window::new(def.size)?;
        Ok(Window {
            alignment: def.alignment,
            ..window
        })
    }
}

impl From<Window> for WindowDef {
    fn from(window: Window) -> Self {
        WindowDef {
            size: window.size,
            alignment: window.alignment,
        }
    }
}

/// Aggregate computed over each complete window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Mean,
    Median,
    Sum,
    Min,
    Max,
    /// Sample standard deviation (ddof = 1); missing for single-point windows
    Std,
}

impl Aggregation {
    /// Aggregate a complete window of present values
    pub(crate) fn apply(&self, window: &[f64]) -> NA<f64> {
        let n = window.len();
        if n == 0 {
            return NA::NA;
        }
        match self {
            Aggregation::Mean => NA::Value(window.iter().sum::<f64>() / n as f64),
            Aggregation::Sum => NA::Value(window.iter().sum()),
            Aggregation::Min => NA::Value(window.iter().copied().fold(f64::INFINITY, f64::min)),
            Aggregation::Max => {
                NA::Value(window.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            }
            Aggregation::Median => {
                let mut sorted = window.to_vec();
                sorted.sort_by(|a, b| a.total_cmp(b));
                let mid = n / 2;
                if n % 2 == 0 {
                    NA::Value((sorted[mid - 1] + sorted[mid]) / 2.0)
                } else {
                    NA::Value(sorted[mid])
                }
            }
            Aggregation::Std => {
                if n < 2 {
                    return NA::NA;
                }
                let mean = window.iter().sum::<f64>() / n as f64;
                let variance =
                    window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
                NA::Value(variance.sqrt())
            }
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Aggregation::Mean => "mean",
            Aggregation::Median => "median",
            Aggregation::Sum => "sum",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Std => "std",
        };
        f.write_str(name)
    }
}

/// Apply `f` to every complete, fully present window.
///
/// Positions before the first complete window, and windows containing a
/// missing value, produce `NA::NA`. A window longer than the series leaves
/// every position missing.
pub(crate) fn map_windows<F>(values: &[NA<f64>], window: &Window, f: F) -> Vec<NA<f64>>
where
    F: Fn(&[f64]) -> NA<f64>,
{
    let size = window.size();
    let mut buffer = Vec::with_capacity(size);

    (0..values.len())
        .map(|i| {
            if i + 1 < size {
                return NA::NA;
            }
            buffer.clear();
            for value in &values[i + 1 - size..=i] {
                match value {
                    NA::Value(v) => buffer.push(*v),
                    NA::NA => return NA::NA,
                }
            }
            f(&buffer)
        })
        .collect()
}

/// Rolling aggregate over a right-aligned window.
pub fn rolling<T: Temporal>(
    series: &TimeSeries<T>,
    window: &Window,
    method: Aggregation,
) -> DerivedSeries<T> {
    log::debug!(
        "rolling {} over {} points, window {}",
        method,
        series.len(),
        window.size()
    );
    let values = map_windows(series.values(), window, |w| method.apply(w));
    series.derive(values)
}

/// Fluent access to rolling aggregates of one series
#[derive(Debug)]
pub struct Rolling<'a, T: Temporal> {
    series: &'a TimeSeries<T>,
    window: Window,
}

impl<'a, T: Temporal> Rolling<'a, T> {
    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn aggregate(&self, method: Aggregation) -> DerivedSeries<T> {
        rolling(self.series, &self.window, method)
    }

    pub fn mean(&self) -> DerivedSeries<T> {
        self.aggregate(Aggregation::Mean)
    }

    pub fn median(&self) -> DerivedSeries<T> {
        self.aggregate(Aggregation::Median)
    }

    pub fn sum(&self) -> DerivedSeries<T> {
        self.aggregate(Aggregation::Sum)
    }

    pub fn min(&self) -> DerivedSeries<T> {
        self.aggregate(Aggregation::Min)
    }

    pub fn max(&self) -> DerivedSeries<T> {
        self.aggregate(Aggregation::Max)
    }

    pub fn std(&self) -> DerivedSeries<T> {
        self.aggregate(Aggregation::Std)
    }

    /// Rolling geometric mean; fails on non-positive input
    pub fn geometric_mean(&self) -> Result<DerivedSeries<T>> {
        super::geometric_mean_rolling(self.series, &self.window)
    }
}

impl<T: Temporal> TimeSeries<T> {
    /// Start a right-aligned rolling computation over `size` points
    pub fn rolling(&self, size: usize) -> Result<Rolling<'_, T>> {
        Ok(Rolling {
            series: self,
            window: Window::new(size)?,
        })
    }
}
