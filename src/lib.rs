//! Causal transforms for time-indexed numeric series.
//!
//! Differences, lags, rolling aggregates, exponential smoothing and rolling
//! geometric means, all length-preserving and right-aligned: an output at
//! time `t` is computed from inputs at or before `t` only, and positions
//! without enough history are explicitly missing.
//!
//! ```rust
//! use tempolag::datasets::air_passengers;
//! use tempolag::temporal::{difference, rolling, Aggregation, Window};
//!
//! let passengers = air_passengers().unwrap();
//! let change = difference(&passengers, 1).unwrap();
//! let smoothed = rolling(&change, &Window::new(12).unwrap(), Aggregation::Mean);
//! assert_eq!(smoothed.len(), passengers.len());
//! assert_eq!(smoothed.values().iter().take_while(|v| v.is_na()).count(), 12);
//! ```

pub mod datasets;
pub mod error;
pub mod io;
pub mod na;
pub mod pipeline;
pub mod stats;
pub mod temporal;

// Re-export commonly used types
pub use error::{Error, Result};
pub use na::NA;
pub use pipeline::{Pipeline, PipelineConfig, Step, Transform, Transformer};
pub use temporal::{Aggregation, Decay, DerivedSeries, Frequency, Temporal, TimeSeries, Window};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
