//! Interactive concentration chart
//!
//! [AxisScalePlanner] turns scale settings and a simulation result into an
//! [AxisPlan]. [InteractiveChart] keeps the plotted series as a retained [Scene]
//! and redraws it through any [Canvas] under the current [ViewTransform].

pub mod axis;
#[cfg(feature = "gui")]
pub mod gui;
pub mod renderer;
pub mod scale;
pub mod scene;
pub mod transform;

pub use axis::{AxisPlan, AxisScalePlanner, LabelStyle, Tick, TickKind, MAX_TICKS};
#[cfg(feature = "gui")]
pub use gui::ChartWindow;
pub use renderer::{ChartOptions, ChartState, InteractiveChart, Margins, Tooltip};
pub use scale::{Domain, LinearScale};
pub use scene::{
    compound_color, total_color, Anchor, Canvas, Color, CommandBuffer, DrawCommand, LegendEntry,
    Pos, Scene, SeriesLayer, PALETTE,
};
pub use transform::{bounded_extent, ViewTransform, MIN_SCALE};
