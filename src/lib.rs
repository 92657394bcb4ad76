//! Dosing protocol simulation and interactive concentration charts
//!
//! A [Protocol] lists compounds with their pharmacokinetic parameters and dosing
//! regimen. [Simulator] samples the protocol into a [SimulationResult], the
//! [AxisScalePlanner] lays out the axes, and an [InteractiveChart] draws the curves
//! through any [Canvas] with zoom and pan handled as a view transform.
//!
//! ```
//! use dosecurve::*;
//!
//! let protocol = Protocol::new("Cycle", 2.0, LengthUnit::Weeks).with_compound(
//!     CompoundDosing::new("Compound A")
//!         .with_half_life(4.5, TimeUnit::Days)
//!         .with_dose(250.0)
//!         .with_schedule(ScheduleKind::EveryThreeDays),
//! );
//!
//! let result = simulate(&protocol, 1.0).unwrap();
//! assert_eq!(result.len(), 337);
//! ```

pub mod chart;
pub mod context;
pub mod data;
pub mod error;
pub mod simulator;

pub use crate::chart::{
    AxisPlan, AxisScalePlanner, Canvas, ChartOptions, ChartState, CommandBuffer, Domain,
    InteractiveChart, Tooltip, ViewTransform,
};
#[cfg(feature = "gui")]
pub use crate::chart::ChartWindow;
pub use crate::context::SimulationContext;
pub use crate::data::*;
pub use crate::simulator::{
    simulate, CompoundSeries, Concentration, ConcentrationModel, SimulationError,
    SimulationOptions, SimulationResult, Simulator, TimeSeriesPoint,
};
pub use error::DoseCurveError;

pub mod prelude {
    pub mod data {
        pub use crate::data::{
            CompoundDosing, DoseUnit, DosingSchedule, LengthUnit, Protocol, ScaleSettings,
            ScheduleKind, TimeUnit,
        };
    }
    pub mod simulator {
        pub use crate::simulator::{
            model::{ActiveWindow, MultiDose, PeakRatio},
            simulate, Concentration, ConcentrationModel, SimulationOptions, SimulationResult,
            Simulator,
        };
    }
    pub mod chart {
        pub use crate::chart::{
            axis::{AxisPlan, AxisScalePlanner},
            renderer::{ChartOptions, InteractiveChart},
            scene::{Canvas, CommandBuffer, DrawCommand},
            transform::ViewTransform,
        };
    }

    pub use crate::context::SimulationContext;
    pub use crate::data::*;
}
