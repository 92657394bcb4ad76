use serde::{Deserialize, Deserializer, Serialize};

use crate::data::numeric::{lenient, nan};
use crate::data::units::TimeUnit;

/// Display settings for the time axis
///
/// Tick intervals are in hours. A missing, non-finite or non-positive interval
/// means "use the default of the time unit's tick rule". These settings never
/// affect the simulation grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleSettings {
    #[serde(deserialize_with = "axis_time_unit")]
    pub time_unit: TimeUnit,
    #[serde(default = "nan", deserialize_with = "lenient")]
    pub minor_tick_interval: f64,
    #[serde(default = "nan", deserialize_with = "lenient")]
    pub major_tick_interval: f64,
}

impl Default for ScaleSettings {
    fn default() -> Self {
        Self::for_unit(TimeUnit::Days)
    }
}

impl ScaleSettings {
    /// Settings using the default tick intervals of `unit`
    pub fn for_unit(unit: TimeUnit) -> Self {
        let (minor, major) = match unit {
            TimeUnit::Weeks => (24.0, 168.0),
            TimeUnit::Hours => (1.0, 6.0),
            _ => (1.0, 24.0),
        };
        Self {
            time_unit: unit,
            minor_tick_interval: minor,
            major_tick_interval: major,
        }
    }

    /// Override the tick intervals, in hours
    pub fn with_intervals(mut self, minor: f64, major: f64) -> Self {
        self.minor_tick_interval = minor;
        self.major_tick_interval = major;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Axis units fall back to days, the default tick rule, rather than hours
fn axis_time_unit<'de, D>(deserializer: D) -> Result<TimeUnit, D::Error>
where
    D: Deserializer<'de>,
{
    let label = String::deserialize(deserializer)?;
    Ok(TimeUnit::from_label(&label).unwrap_or_else(|| {
        tracing::warn!(label = label.as_str(), "unrecognized axis time unit, using days");
        TimeUnit::Days
    }))
}
