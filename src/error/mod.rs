use thiserror::Error;

use crate::simulator::SimulationError;

#[derive(Error, Debug)]
pub enum DoseCurveError {
    #[error("Simulation failed: {0}")]
    Simulation(#[from] SimulationError),
    #[error("Invalid JSON record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
