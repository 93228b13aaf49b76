//! Declarative transform pipelines.
//!
//! A pipeline is a list of named steps. Each step chains one or more
//! [`Transform`]s and is applied to the same input series, so steps are
//! independent of each other and may run in parallel.

mod config;

use std::collections::HashSet;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::temporal::{
    self, Aggregation, Decay, DerivedSeries, Temporal, TimeSeries, Window,
};

pub use self::config::PipelineConfig;

/// Something that turns a series into a derived series on the same index
pub trait Transformer {
    fn transform<T: Temporal>(&self, series: &TimeSeries<T>) -> Result<DerivedSeries<T>>;
}

/// One causal transform with its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum Transform {
    Difference { order: usize },
    SeasonalDifference { period: usize },
    Lag { periods: usize },
    Rolling { window: Window, method: Aggregation },
    Ewma { decay: Decay },
    GeometricMean { window: Window },
    // struct form, so extra keys are rejected
    Log {},
}

impl Transform {
    /// Check parameters without touching any data
    pub fn validate(&self) -> Result<()> {
        let invalid = |what: &str| -> Result<()> {
            Err(Error::InvalidConfiguration(format!(
                "{} must be at least 1",
                what
            )))
        };
        match self {
            Transform::Difference { order: 0 } => invalid("difference order"),
            Transform::SeasonalDifference { period: 0 } => invalid("seasonal period"),
            Transform::Lag { periods: 0 } => invalid("lag"),
            Transform::Ewma { decay } => decay.alpha().map(|_| ()),
            _ => Ok(()),
        }
    }
}

impl Transformer for Transform {
    fn transform<T: Temporal>(&self, series: &TimeSeries<T>) -> Result<DerivedSeries<T>> {
        match self {
            Transform::Difference { order } => temporal::difference(series, *order),
            Transform::SeasonalDifference { period } => {
                temporal::seasonal_difference(series, *period)
            }
            Transform::Lag { periods } => temporal::lag(series, *periods),
            Transform::Rolling { window, method } => Ok(temporal::rolling(series, window, *method)),
            Transform::Ewma { decay } => {
                temporal::exponential_moving_average(series, decay.alpha()?)
            }
            Transform::GeometricMean { window } => temporal::geometric_mean_rolling(series, window),
            Transform::Log {} => temporal::log_transform(series),
        }
    }
}

/// A named chain of transforms, applied left to right
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub name: String,
    pub transforms: Vec<Transform>,
}

impl Step {
    pub fn new(name: impl Into<String>, transforms: Vec<Transform>) -> Self {
        Step {
            name: name.into(),
            transforms,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidConfiguration(
                "step name must not be empty".to_string(),
            ));
        }
        if self.transforms.is_empty() {
            return Err(Error::InvalidConfiguration(format!(
                "step {:?} has no transforms",
                self.name
            )));
        }
        self.transforms.iter().try_for_each(Transform::validate)
    }
}

impl Transformer for Step {
    fn transform<T: Temporal>(&self, series: &TimeSeries<T>) -> Result<DerivedSeries<T>> {
        let started = Instant::now();
        let mut current = series.clone();
        for transform in &self.transforms {
            current = transform.transform(&current)?;
        }
        log::trace!("step {:?} finished in {:?}", self.name, started.elapsed());
        Ok(current.with_name(self.name.clone()))
    }
}

/// Validated set of steps run against one input series
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    /// Validate every step up front; nothing runs on an invalid pipeline.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::from_steps(config.steps)
    }

    pub fn from_steps(steps: Vec<Step>) -> Result<Self> {
        let mut seen = HashSet::new();
        for step in &steps {
            step.validate()?;
            if !seen.insert(step.name.as_str()) {
                return Err(Error::InvalidConfiguration(format!(
                    "duplicate step name {:?}",
                    step.name
                )));
            }
        }
        Ok(Pipeline { steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Run every step in declaration order.
    ///
    /// Each output is named after its step. The first failing step aborts the
    /// run and no partial results are returned.
    pub fn run<T: Temporal>(&self, series: &TimeSeries<T>) -> Result<Vec<DerivedSeries<T>>> {
        log::debug!("running {} steps over {} points", self.steps.len(), series.len());
        self.steps.iter().map(|step| step.transform(series)).collect()
    }

    /// Same result as [`run`](Self::run), with steps spread over the rayon pool.
    pub fn run_parallel<T: Temporal>(
        &self,
        series: &TimeSeries<T>,
    ) -> Result<Vec<DerivedSeries<T>>> {
        log::debug!(
            "running {} steps in parallel over {} points",
            self.steps.len(),
            series.len()
        );
        self.steps
            .par_iter()
            .map(|step| step.transform(series))
            .collect()
    }
}
