use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::chart::{AxisPlan, AxisScalePlanner, InteractiveChart};
use crate::data::protocol::Protocol;
use crate::data::scale::ScaleSettings;
use crate::error::DoseCurveError;
use crate::simulator::{SimulationError, SimulationOptions, SimulationResult, Simulator};

/// Everything a simulate-and-draw pass depends on
///
/// Each pass reads the context and produces fresh values. Nothing is cached between
/// calls, so changing any field and calling again always reflects the change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationContext {
    pub protocol: Protocol,
    /// Axis settings; without them the protocol's length unit picks the tick rule
    #[serde(default)]
    pub scale: Option<ScaleSettings>,
    #[serde(default)]
    pub options: SimulationOptions,
    #[serde(default)]
    pub planner: AxisScalePlanner,
}

impl SimulationContext {
    pub fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            scale: None,
            options: SimulationOptions::default(),
            planner: AxisScalePlanner::default(),
        }
    }

    pub fn with_scale(mut self, scale: ScaleSettings) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_options(mut self, options: SimulationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn simulate(&self) -> Result<SimulationResult, SimulationError> {
        Simulator::new(self.options.clone()).simulate(&self.protocol)
    }

    pub fn plan(&self, result: &SimulationResult) -> AxisPlan {
        self.planner
            .plan_result(self.scale.as_ref(), &self.protocol, result)
    }

    /// Simulate, plan and hand the result to a chart
    pub fn render_into(&self, chart: &mut InteractiveChart) -> Result<SimulationResult, SimulationError> {
        let result = self.simulate()?;
        let plan = self.plan(&result);
        chart.set_data(&result, plan);
        Ok(result)
    }

    /// Simulate and write the series as CSV
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<SimulationResult, DoseCurveError> {
        let result = self.simulate()?;
        result.write_csv(writer)?;
        Ok(result)
    }
}
