//! Axis planning
//!
//! Turns [ScaleSettings] into tick spacing and label formatting for the time axis,
//! and derives both data domains from a simulation result. Nothing here draws.
//!
//! | Time unit | Minor | Major | Label |
//! |-----------|-------|-------|-------|
//! | weeks     | 24 h  | 168 h | `Week N` |
//! | days      | 1 h   | 24 h  | `Day N` |
//! | hours     | 1 h   | 6 h   | `N h` |
//!
//! Seconds and minutes use the days rule.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::scale::Domain;
use crate::data::protocol::{date_after, Protocol};
use crate::data::scale::ScaleSettings;
use crate::data::units::TimeUnit;
use crate::simulator::SimulationResult;

/// Upper bound on time-axis ticks in any domain
pub const MAX_TICKS: usize = 500;

/// Headroom above the highest concentration
pub const Y_HEADROOM: f64 = 1.1;

/// Y axis tick target when none is configured
pub const DEFAULT_Y_TICKS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickKind {
    Major,
    Minor,
}

/// A time-axis tick; minor ticks carry an empty label
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub kind: TickKind,
    pub label: String,
}

/// How major tick labels are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelStyle {
    /// `Week N`, N counted in major intervals
    Weeks,
    /// `Day N`, N counted in major intervals
    Days,
    /// `N h`, the hour value itself
    Hours,
}

impl LabelStyle {
    pub fn for_unit(unit: TimeUnit) -> Self {
        match unit {
            TimeUnit::Weeks => LabelStyle::Weeks,
            TimeUnit::Hours => LabelStyle::Hours,
            _ => LabelStyle::Days,
        }
    }

    pub fn format(&self, hours: f64, major_interval: f64) -> String {
        let index = (hours / major_interval).round() as i64;
        match self {
            LabelStyle::Weeks => format!("Week {}", index),
            LabelStyle::Days => format!("Day {}", index),
            LabelStyle::Hours => format!("{} h", hours),
        }
    }
}

/// Tick and domain layout for one chart
#[derive(Debug, Clone, PartialEq)]
pub struct AxisPlan {
    pub x_domain: Domain,
    pub y_domain: Domain,
    pub time_unit: TimeUnit,
    /// Configured minor tick spacing in hours; widened per domain when capped
    pub minor_interval: f64,
    pub major_interval: f64,
    /// Number of ticks over `x_domain`
    pub tick_count: usize,
    pub label_style: LabelStyle,
    pub max_ticks: usize,
    pub y_ticks: usize,
    pub start_date: Option<NaiveDate>,
}

impl AxisPlan {
    /// Whether a time value sits on a major interval boundary
    pub fn is_major(&self, hours: f64) -> bool {
        let ratio = hours / self.major_interval;
        (ratio - ratio.round()).abs() < 1e-9
    }

    /// Label for a time value, empty unless it is a major tick
    pub fn label(&self, hours: f64) -> String {
        if self.is_major(hours) {
            self.label_style.format(hours, self.major_interval)
        } else {
            String::new()
        }
    }

    /// Length of the outward tick mark, in pixels
    pub fn tick_size(&self, kind: TickKind) -> f64 {
        match kind {
            TickKind::Major => 6.0,
            TickKind::Minor => 3.0,
        }
    }

    /// Time-axis ticks for the planned domain
    pub fn ticks(&self) -> Vec<Tick> {
        self.ticks_in(self.x_domain)
    }

    /// Time-axis ticks for any visible domain
    ///
    /// Ticks sit on multiples of the minor interval, widened by whole multiples
    /// whenever the domain would need more than `max_ticks` of them.
    pub fn ticks_in(&self, domain: Domain) -> Vec<Tick> {
        if !domain.min.is_finite() || !domain.max.is_finite() || domain.max < domain.min {
            return Vec::new();
        }
        let step = capped_step(domain, self.minor_interval, self.max_ticks);
        let (first, count) = index_bounds(domain, step);

        (0..count)
            .map(|i| {
                let value = (first + i as f64) * step;
                let kind = if self.is_major(value) {
                    TickKind::Major
                } else {
                    TickKind::Minor
                };
                Tick {
                    value,
                    kind,
                    label: self.label(value),
                }
            })
            .collect()
    }

    /// Concentration ticks for a visible Y domain, on a 1/2/5 × 10ⁿ step
    pub fn y_ticks_in(&self, domain: Domain) -> Vec<f64> {
        let span = domain.width();
        if !span.is_finite() || span <= 0.0 {
            return Vec::new();
        }
        let step = nice_step(span, self.y_ticks.max(1));
        let (first, count) = index_bounds(domain, step);
        (0..count).map(|i| (first + i as f64) * step).collect()
    }

    /// Calendar date of a time value, if the protocol has a start date
    pub fn date_at(&self, hours: f64) -> Option<NaiveDate> {
        date_after(self.start_date?, hours)
    }
}

/// Builds an [AxisPlan] from display settings and simulated data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisScalePlanner {
    pub max_ticks: usize,
    pub y_ticks: usize,
}

impl Default for AxisScalePlanner {
    fn default() -> Self {
        Self {
            max_ticks: MAX_TICKS,
            y_ticks: DEFAULT_Y_TICKS,
        }
    }
}

impl AxisScalePlanner {
    pub fn with_y_ticks(mut self, y_ticks: usize) -> Self {
        self.y_ticks = y_ticks;
        self
    }

    /// Plan the axes for a time span
    ///
    /// Without explicit settings the protocol's length unit picks the tick rule.
    /// A missing or non-positive `data_max_time` gives the `[0, 10]` X domain, and
    /// a non-positive `data_max_concentration` the `[0, 10]` Y domain.
    pub fn plan(
        &self,
        settings: Option<&ScaleSettings>,
        protocol: &Protocol,
        data_max_time: Option<f64>,
        data_max_concentration: f64,
    ) -> AxisPlan {
        let settings = settings
            .cloned()
            .unwrap_or_else(|| ScaleSettings::for_unit(protocol.length_unit.time_unit()));
        let defaults = ScaleSettings::for_unit(rule_unit(settings.time_unit));

        let minor = positive_or(settings.minor_tick_interval, defaults.minor_tick_interval);
        let major = positive_or(settings.major_tick_interval, defaults.major_tick_interval);

        let x_domain = Domain::from_zero(data_max_time.unwrap_or(f64::NAN));
        let y_domain = Domain::from_zero(data_max_concentration * Y_HEADROOM);

        let requested = ((x_domain.max / minor).ceil() as usize).saturating_add(1);
        let tick_count = requested.min(self.max_ticks);
        if requested > self.max_ticks {
            tracing::debug!(
                requested,
                step = capped_step(x_domain, minor, self.max_ticks),
                "time axis tick count capped"
            );
        }

        AxisPlan {
            x_domain,
            y_domain,
            time_unit: settings.time_unit,
            minor_interval: minor,
            major_interval: major,
            tick_count,
            label_style: LabelStyle::for_unit(settings.time_unit),
            max_ticks: self.max_ticks,
            y_ticks: self.y_ticks,
            start_date: protocol.start_date,
        }
    }

    /// Plan the axes for a simulation result
    pub fn plan_result(
        &self,
        settings: Option<&ScaleSettings>,
        protocol: &Protocol,
        result: &SimulationResult,
    ) -> AxisPlan {
        self.plan(
            settings,
            protocol,
            result.max_time(),
            result.max_concentration(),
        )
    }
}

/// Units with their own tick rule; everything else uses days
fn rule_unit(unit: TimeUnit) -> TimeUnit {
    match unit {
        TimeUnit::Weeks | TimeUnit::Hours => unit,
        _ => TimeUnit::Days,
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Index of the first multiple of `step` inside `domain`, and how many follow
fn index_bounds(domain: Domain, step: f64) -> (f64, usize) {
    let first = (domain.min / step - 1e-9).ceil();
    let last = (domain.max / step + 1e-9).floor();
    (first, span_count(first, last) as usize)
}

fn span_count(first: f64, last: f64) -> f64 {
    (last - first + 1.0).max(0.0)
}

/// The minor step, widened by a whole multiple if `domain` would need too many ticks
fn capped_step(domain: Domain, minor: f64, max_ticks: usize) -> f64 {
    let max_ticks = max_ticks.max(2) as f64;
    let count = |step: f64| {
        let first = (domain.min / step - 1e-9).ceil();
        let last = (domain.max / step + 1e-9).floor();
        span_count(first, last)
    };

    let mut multiple = 1.0;
    let initial = count(minor);
    if initial > max_ticks {
        multiple = (initial / max_ticks).ceil();
        while count(minor * multiple) > max_ticks {
            // Grows geometrically once the multiple is large, so huge domains end quickly
            multiple = (multiple * (1.0 + 1.0 / max_ticks)).ceil().max(multiple + 1.0);
        }
    }
    minor * multiple
}

/// 1, 2 or 5 times a power of ten, giving roughly `target` steps over `span`
fn nice_step(span: f64, target: usize) -> f64 {
    let raw = span / target as f64;
    let base = 10f64.powf(raw.log10().floor());
    match raw / base {
        r if r <= 1.0 => base,
        r if r <= 2.0 => 2.0 * base,
        r if r <= 5.0 => 5.0 * base,
        _ => 10.0 * base,
    }
}
