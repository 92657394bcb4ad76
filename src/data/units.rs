//! Time and dose units
//!
//! Every quantity entering the simulator is normalized to hours and milligrams.
//! Unknown unit labels never fail: they resolve to the canonical unit (a
//! passthrough of the value) and the fallback is reported through `tracing`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::data::numeric::AsNumeric;

/// Unit of a time quantity (half-life, Tmax, axis scale)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    #[default]
    Hours,
    Days,
    Weeks,
}

impl TimeUnit {
    /// Parse a unit label, returning `None` if it is not recognized
    ///
    /// Matching is case-insensitive and accepts the usual abbreviations.
    pub fn from_label(label: &str) -> Option<TimeUnit> {
        match label.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Some(TimeUnit::Seconds),
            "m" | "min" | "mins" | "minute" | "minutes" => Some(TimeUnit::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Some(TimeUnit::Hours),
            "d" | "day" | "days" => Some(TimeUnit::Days),
            "w" | "wk" | "wks" | "week" | "weeks" => Some(TimeUnit::Weeks),
            _ => None,
        }
    }

    /// Parse a unit label, falling back to hours for unknown labels
    pub fn or_default_unit(label: &str) -> TimeUnit {
        TimeUnit::from_label(label).unwrap_or_else(|| {
            tracing::warn!(label, "unrecognized time unit, treating value as hours");
            TimeUnit::Hours
        })
    }

    /// Canonical label
    pub fn label(&self) -> &'static str {
        match self {
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
            TimeUnit::Weeks => "weeks",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for TimeUnit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for TimeUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(TimeUnit::or_default_unit(&label))
    }
}

/// Unit of an administered dose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DoseUnit {
    Mcg,
    #[default]
    Mg,
    G,
}

impl DoseUnit {
    /// Parse a unit label, returning `None` if it is not recognized
    pub fn from_label(label: &str) -> Option<DoseUnit> {
        match label.trim().to_ascii_lowercase().as_str() {
            "mcg" | "µg" | "ug" | "microgram" | "micrograms" => Some(DoseUnit::Mcg),
            "mg" | "milligram" | "milligrams" => Some(DoseUnit::Mg),
            "g" | "gram" | "grams" => Some(DoseUnit::G),
            _ => None,
        }
    }

    /// Parse a unit label, falling back to milligrams for unknown labels
    pub fn or_default_unit(label: &str) -> DoseUnit {
        DoseUnit::from_label(label).unwrap_or_else(|| {
            tracing::warn!(label, "unrecognized dose unit, treating value as mg");
            DoseUnit::Mg
        })
    }

    /// Canonical label
    pub fn label(&self) -> &'static str {
        match self {
            DoseUnit::Mcg => "mcg",
            DoseUnit::Mg => "mg",
            DoseUnit::G => "g",
        }
    }
}

impl fmt::Display for DoseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for DoseUnit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for DoseUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(DoseUnit::or_default_unit(&label))
    }
}

/// Convert a time quantity to hours
pub fn to_hours(value: impl AsNumeric, unit: TimeUnit) -> f64 {
    let value = value.as_numeric();
    match unit {
        TimeUnit::Seconds => value / 3600.0,
        TimeUnit::Minutes => value / 60.0,
        TimeUnit::Hours => value,
        TimeUnit::Days => value * 24.0,
        TimeUnit::Weeks => value * 168.0,
    }
}

/// Convert a half-life to hours
///
/// # Example
///
/// ```
/// use dosecurve::{half_life_to_hours, TimeUnit};
///
/// assert_eq!(half_life_to_hours(1.0, TimeUnit::Days), 24.0);
/// assert_eq!(half_life_to_hours("90", TimeUnit::Minutes), 1.5);
/// assert!(half_life_to_hours("long", TimeUnit::Hours).is_nan());
/// ```
pub fn half_life_to_hours(value: impl AsNumeric, unit: TimeUnit) -> f64 {
    to_hours(value, unit)
}

/// Convert a dose to milligrams
pub fn dose_to_mg(value: impl AsNumeric, unit: DoseUnit) -> f64 {
    let value = value.as_numeric();
    match unit {
        DoseUnit::Mcg => value / 1000.0,
        DoseUnit::Mg => value,
        DoseUnit::G => value * 1000.0,
    }
}

/// Convert milligrams back to a dose in `unit`, the inverse of [`dose_to_mg`]
pub fn mg_to_dose(value: impl AsNumeric, unit: DoseUnit) -> f64 {
    let value = value.as_numeric();
    match unit {
        DoseUnit::Mcg => value * 1000.0,
        DoseUnit::Mg => value,
        DoseUnit::G => value / 1000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_half_life_conversions() {
        assert_eq!(half_life_to_hours(1.0, TimeUnit::Days), 24.0);
        assert_eq!(half_life_to_hours(7200.0, TimeUnit::Seconds), 2.0);
        assert_eq!(half_life_to_hours(30.0, TimeUnit::Minutes), 0.5);
        assert_eq!(half_life_to_hours(5.0, TimeUnit::Hours), 5.0);
        assert_eq!(half_life_to_hours(1.0, TimeUnit::Weeks), 168.0);
    }

    #[test]
    fn test_text_input() {
        assert_eq!(half_life_to_hours("2", TimeUnit::Days), 48.0);
        assert_eq!(dose_to_mg("500", DoseUnit::Mcg), 0.5);
        assert!(dose_to_mg("lots", DoseUnit::Mg).is_nan());
    }

    #[test]
    fn test_dose_conversions() {
        assert_eq!(dose_to_mg(250.0, DoseUnit::Mcg), 0.25);
        assert_eq!(dose_to_mg(40.0, DoseUnit::Mg), 40.0);
        assert_eq!(dose_to_mg(1.5, DoseUnit::G), 1500.0);
    }

    #[test]
    fn test_dose_round_trip() {
        for x in [250.0, 1500.0, 2.0, 0.5] {
            assert_eq!(dose_to_mg(mg_to_dose(x, DoseUnit::G), DoseUnit::G), x);
        }
        for x in [0.1, 33.3, 12345.678] {
            assert_relative_eq!(
                dose_to_mg(mg_to_dose(x, DoseUnit::Mcg), DoseUnit::Mcg),
                x,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_unknown_labels_fall_back() {
        assert_eq!(TimeUnit::from_label("fortnights"), None);
        assert_eq!(TimeUnit::or_default_unit("fortnights"), TimeUnit::Hours);
        assert_eq!(DoseUnit::or_default_unit("IU"), DoseUnit::Mg);
        assert_eq!(TimeUnit::or_default_unit(" Days "), TimeUnit::Days);
        assert_eq!(DoseUnit::or_default_unit("MCG"), DoseUnit::Mcg);
    }

    #[test]
    fn test_serde_labels() {
        let unit: TimeUnit = serde_json::from_str("\"minutes\"").unwrap();
        assert_eq!(unit, TimeUnit::Minutes);
        let unit: TimeUnit = serde_json::from_str("\"eons\"").unwrap();
        assert_eq!(unit, TimeUnit::Hours);
        assert_eq!(serde_json::to_string(&DoseUnit::G).unwrap(), "\"g\"");
    }
}
