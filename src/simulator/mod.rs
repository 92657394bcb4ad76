//! Protocol simulation
//!
//! A [Protocol] is sampled on a uniform grid from `0` to its duration (inclusive).
//! Each compound is turned into a [ConcentrationModel] once per pass, evaluated at
//! every grid time, and the contributions are summed into the total curve.

pub mod export;
pub mod model;
pub mod series;

pub use model::{ActiveWindow, Concentration, ConcentrationModel, MultiDose, PeakRatio};
pub use series::{CompoundSeries, SimulationResult, TimeSeriesPoint};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::protocol::Protocol;

/// Grid sizes past this are widened to keep rendering responsive
pub const DEFAULT_MAX_SAMPLES: usize = 20_000;

/// Errors raised before any sampling takes place
///
/// Everything below the protocol level fails soft instead: a malformed compound
/// contributes zero.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Protocol length must be a positive, finite number, got {0}")]
    InvalidLength(f64),
    #[error("Sampling step must be a positive, finite number of hours, got {0}")]
    InvalidStep(f64),
    #[error("Compound at index {index} has an empty name")]
    UnnamedCompound { index: usize },
}

/// Options for a simulation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOptions {
    /// Requested spacing of the sampling grid, in hours
    pub step_hours: f64,
    /// Upper bound on samples per series
    ///
    /// When the requested grid is larger, the step is widened to the smallest
    /// multiple of `step_hours` that fits.
    pub max_samples: usize,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            step_hours: 1.0,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

impl SimulationOptions {
    pub fn with_step(mut self, step_hours: f64) -> Self {
        self.step_hours = step_hours;
        self
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }
}

/// Runs protocols through the concentration models
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    options: SimulationOptions,
}

impl Simulator {
    pub fn new(options: SimulationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SimulationOptions {
        &self.options
    }

    /// Simulate one protocol
    ///
    /// Deterministic: the same protocol and options always give the same result.
    pub fn simulate(&self, protocol: &Protocol) -> Result<SimulationResult, SimulationError> {
        validate(protocol, self.options.step_hours)?;

        if protocol.compounds.is_empty() {
            return Ok(SimulationResult::default());
        }

        let duration = protocol.duration_hours();
        let (step, samples) = sampling_grid(duration, self.options.step_hours, self.options.max_samples);
        let times: Vec<f64> = (0..samples).map(|i| i as f64 * step).collect();

        let mut total = vec![0.0; samples];
        let mut per_compound = Vec::new();

        for compound in &protocol.compounds {
            let model = ConcentrationModel::for_compound(compound, protocol);
            tracing::trace!(compound = compound.name.as_str(), mode = model.mode(), "sampling compound");

            let values: Vec<f64> = times.iter().map(|&t| model.concentration(t)).collect();
            for (sum, value) in total.iter_mut().zip(&values) {
                *sum += value;
            }

            if compound.compare {
                let points = times
                    .iter()
                    .zip(values)
                    .map(|(&t, c)| TimeSeriesPoint::new(t, c))
                    .collect();
                per_compound.push(CompoundSeries::new(compound.name.clone(), points));
            }
        }

        let total = times
            .iter()
            .zip(total)
            .map(|(&t, c)| TimeSeriesPoint::new(t, c.max(0.0)))
            .collect();

        Ok(SimulationResult {
            total,
            per_compound,
        })
    }

    /// Simulate several protocols in parallel, keeping their order
    pub fn simulate_batch(
        &self,
        protocols: &[Protocol],
    ) -> Vec<Result<SimulationResult, SimulationError>> {
        protocols.par_iter().map(|p| self.simulate(p)).collect()
    }
}

/// Simulate a protocol on a grid with the given step, in hours
pub fn simulate(protocol: &Protocol, step_hours: f64) -> Result<SimulationResult, SimulationError> {
    Simulator::new(SimulationOptions::default().with_step(step_hours)).simulate(protocol)
}

fn validate(protocol: &Protocol, step_hours: f64) -> Result<(), SimulationError> {
    if !(protocol.length.is_finite() && protocol.length > 0.0 && protocol.duration_hours().is_finite()) {
        return Err(SimulationError::InvalidLength(protocol.length));
    }
    if !(step_hours.is_finite() && step_hours > 0.0) {
        return Err(SimulationError::InvalidStep(step_hours));
    }
    if let Some(index) = protocol
        .compounds
        .iter()
        .position(|c| c.name.trim().is_empty())
    {
        return Err(SimulationError::UnnamedCompound { index });
    }
    Ok(())
}

/// Step and sample count covering `[0, duration]`
///
/// Sample `i` sits at exactly `i * step`, so no floating point drift accumulates.
/// The grid is sized in floating point so that arbitrarily long protocols or tiny
/// steps are widened instead of overflowing the sample count.
fn sampling_grid(duration: f64, step: f64, max_samples: usize) -> (f64, usize) {
    let max_samples = max_samples.max(2);
    let intervals = (duration / step).floor();
    let max_intervals = (max_samples - 1) as f64;
    if intervals <= max_intervals {
        return (step, intervals as usize + 1);
    }

    let widened = step * (intervals / max_intervals).ceil();
    let decimated = ((duration / widened).floor() as usize)
        .saturating_add(1)
        .min(max_samples);
    tracing::debug!(
        requested = intervals + 1.0,
        samples = decimated,
        step = widened,
        "sampling grid widened"
    );
    (widened, decimated)
}
