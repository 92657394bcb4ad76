//! Protocols and the compound regimens attached to them
//!
//! A [Protocol] is a named dosing window (a number of days or weeks) together with
//! the [CompoundDosing] regimens administered during it. Both types mirror the
//! records written by the protocol editor: camelCase JSON where numeric fields may
//! be numbers or numeric text.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::data::numeric::{lenient, lenient_opt, nan};
use crate::data::schedule::DosingSchedule;
use crate::data::units::{DoseUnit, TimeUnit};

/// Unit of a protocol's length and of its compounds' active windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Days,
    Weeks,
}

impl LengthUnit {
    /// Number of hours in one unit
    pub fn hours(&self) -> f64 {
        match self {
            LengthUnit::Days => 24.0,
            LengthUnit::Weeks => 168.0,
        }
    }

    /// The equivalent [TimeUnit]
    pub fn time_unit(&self) -> TimeUnit {
        match self {
            LengthUnit::Days => TimeUnit::Days,
            LengthUnit::Weeks => TimeUnit::Weeks,
        }
    }
}

/// A dosing protocol
///
/// # Example
///
/// ```
/// use dosecurve::{CompoundDosing, LengthUnit, Protocol, ScheduleKind, TimeUnit};
///
/// let protocol = Protocol::new("Loading phase", 2.0, LengthUnit::Weeks).with_compound(
///     CompoundDosing::new("Compound A")
///         .with_half_life(36.0, TimeUnit::Hours)
///         .with_dose(50.0)
///         .with_schedule(ScheduleKind::EveryOtherDay),
/// );
///
/// assert_eq!(protocol.duration_hours(), 336.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    pub name: String,
    #[serde(deserialize_with = "lenient")]
    pub length: f64,
    pub length_unit: LengthUnit,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_date"
    )]
    pub start_date: Option<NaiveDate>,
    pub compounds: Vec<CompoundDosing>,
}

impl Protocol {
    /// Create a protocol without compounds
    pub fn new(name: impl Into<String>, length: f64, length_unit: LengthUnit) -> Self {
        Self {
            name: name.into(),
            length,
            length_unit,
            start_date: None,
            compounds: Vec::new(),
        }
    }

    /// Set the calendar date of hour zero
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Attach a compound regimen
    pub fn with_compound(mut self, compound: CompoundDosing) -> Self {
        self.compounds.push(compound);
        self
    }

    /// Parse a protocol record
    ///
    /// Missing structural fields (`name`, `length`, `lengthUnit`, `compounds`, or a
    /// compound's `name`) are errors. Malformed numbers are not: they become `NaN`
    /// and are handled by the simulator.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the protocol record
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Total duration of the protocol in hours
    pub fn duration_hours(&self) -> f64 {
        self.length * self.length_unit.hours()
    }

    /// Calendar date of a time point, when the protocol has a start date
    pub fn date_at(&self, hours: f64) -> Option<NaiveDate> {
        date_after(self.start_date?, hours)
    }
}

/// The calendar day a number of hours after `start` falls on
pub fn date_after(start: NaiveDate, hours: f64) -> Option<NaiveDate> {
    if !hours.is_finite() || hours < 0.0 {
        return None;
    }
    start.checked_add_days(Days::new((hours / 24.0).floor() as u64))
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Option::<String>::deserialize(deserializer)? {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Ok(None),
    };
    match NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d") {
        Ok(date) => Ok(Some(date)),
        Err(err) => {
            tracing::warn!(date = text.as_str(), %err, "ignoring unparseable start date");
            Ok(None)
        }
    }
}

/// A compound together with its regimen in one protocol
///
/// The identity fields (`half_life`, `cmax`, `tmax`, `bioavailability`, ...) come
/// from the compound library record; the remaining fields describe how the
/// compound is dosed in this protocol. Numeric fields that are missing or
/// malformed hold `NaN` rather than failing, and such a compound contributes
/// zero concentration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundDosing {
    pub name: String,

    #[serde(default = "nan", deserialize_with = "lenient")]
    pub half_life: f64,
    #[serde(default)]
    pub half_life_unit: TimeUnit,
    /// Peak concentration of a single dose (ng/ml)
    #[serde(rename = "Cmax", default = "nan", deserialize_with = "lenient")]
    pub cmax: f64,
    /// Time to peak concentration of a single dose
    #[serde(rename = "Tmax", default = "nan", deserialize_with = "lenient")]
    pub tmax: f64,
    #[serde(rename = "TmaxUnit", default)]
    pub tmax_unit: TimeUnit,
    /// Fraction of the dose reaching circulation, in `[0, 1]`
    #[serde(default = "nan", deserialize_with = "lenient")]
    pub bioavailability: f64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt"
    )]
    pub volume_of_distribution: Option<f64>,
    /// Absorption rate constant. Carried as metadata only
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt"
    )]
    pub ka: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Amount per administration, in `dose_unit`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt"
    )]
    pub dose: Option<f64>,
    #[serde(default)]
    pub dose_unit: DoseUnit,
    /// Shift of the active window, in days
    #[serde(default, deserialize_with = "lenient")]
    pub offset_days: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosing_schedule: Option<DosingSchedule>,
    /// Start of the active window, in protocol length units
    #[serde(default, deserialize_with = "lenient")]
    pub duration_from: f64,
    /// End of the active window, in protocol length units (`None` = protocol end)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt"
    )]
    pub duration_to: Option<f64>,
    /// Dose adjustment in percent, from -100 to 100
    #[serde(default, deserialize_with = "lenient")]
    pub adjust_levels: f64,
    #[serde(default)]
    pub accumulate: bool,
    #[serde(default)]
    pub compare: bool,
}

impl CompoundDosing {
    /// A compound with no pharmacokinetic data and no regimen
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            half_life: f64::NAN,
            half_life_unit: TimeUnit::Hours,
            cmax: f64::NAN,
            tmax: f64::NAN,
            tmax_unit: TimeUnit::Hours,
            bioavailability: f64::NAN,
            volume_of_distribution: None,
            ka: None,
            category: None,
            notes: None,
            dose: None,
            dose_unit: DoseUnit::Mg,
            offset_days: 0.0,
            dosing_schedule: None,
            duration_from: 0.0,
            duration_to: None,
            adjust_levels: 0.0,
            accumulate: false,
            compare: false,
        }
    }

    pub fn with_half_life(mut self, value: f64, unit: TimeUnit) -> Self {
        self.half_life = value;
        self.half_life_unit = unit;
        self
    }

    /// Set the single-dose peak parameters, with `tmax` in hours
    pub fn with_peak(mut self, cmax: f64, tmax: f64, bioavailability: f64) -> Self {
        self.cmax = cmax;
        self.tmax = tmax;
        self.tmax_unit = TimeUnit::Hours;
        self.bioavailability = bioavailability;
        self
    }

    /// Set the dose in milligrams
    pub fn with_dose(self, dose: f64) -> Self {
        self.with_dose_in(dose, DoseUnit::Mg)
    }

    pub fn with_dose_in(mut self, dose: f64, unit: DoseUnit) -> Self {
        self.dose = Some(dose);
        self.dose_unit = unit;
        self
    }

    pub fn with_schedule(mut self, schedule: impl Into<DosingSchedule>) -> Self {
        self.dosing_schedule = Some(schedule.into());
        self
    }

    /// Set an explicit dosing interval in hours
    pub fn with_interval(mut self, hours: f64) -> Self {
        self.dosing_schedule = Some(DosingSchedule::Interval(hours));
        self
    }

    /// Set the active window, in protocol length units
    pub fn with_window(mut self, from: f64, to: f64) -> Self {
        self.duration_from = from;
        self.duration_to = Some(to);
        self
    }

    pub fn with_offset_days(mut self, days: f64) -> Self {
        self.offset_days = days;
        self
    }

    pub fn with_adjust_levels(mut self, percent: f64) -> Self {
        self.adjust_levels = percent;
        self
    }

    pub fn with_volume_of_distribution(mut self, liters: f64) -> Self {
        self.volume_of_distribution = Some(liters);
        self
    }

    pub fn with_ka(mut self, ka: f64) -> Self {
        self.ka = Some(ka);
        self
    }

    pub fn accumulate(mut self, accumulate: bool) -> Self {
        self.accumulate = accumulate;
        self
    }

    pub fn compare(mut self, compare: bool) -> Self {
        self.compare = compare;
        self
    }

    /// The active window in absolute protocol hours, offset included
    ///
    /// Returns `None` when the window is unusable (non-finite bounds, a negative
    /// start, or an end before the start); such a compound contributes nothing.
    pub fn active_window_hours(&self, protocol: &Protocol) -> Option<(f64, f64)> {
        let unit = protocol.length_unit.hours();
        let offset = self.offset_days * 24.0;
        let start = self.duration_from * unit + offset;
        let end = self.duration_to.unwrap_or(protocol.length) * unit + offset;

        if !start.is_finite() || !end.is_finite() || start < 0.0 || end < start {
            tracing::debug!(
                compound = self.name.as_str(),
                start,
                end,
                "compound has no usable active window"
            );
            return None;
        }
        Some((start, end))
    }
}
