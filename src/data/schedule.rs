//! Dosing schedules and their inter-dose intervals

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::data::numeric::parse_numeric;

/// Interval used when a schedule cannot be resolved (once a day)
pub const DEFAULT_INTERVAL_HOURS: f64 = 24.0;

/// The named dosing frequencies offered when attaching a compound to a protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleKind {
    FourTimesDaily,
    ThreeTimesDaily,
    TwiceDaily,
    OnceDaily,
    EveryOtherDay,
    ThreeTimesWeekly,
    EveryThreeDays,
    EveryThreeAndHalfDays,
    EveryFourDays,
    EveryFiveDays,
    EverySixDays,
    EverySevenDays,
}

struct ScheduleEntry {
    kind: ScheduleKind,
    label: &'static str,
    hours: f64,
    /// Accepted spellings after normalization, the canonical label included
    aliases: &'static [&'static str],
}

static SCHEDULE_TABLE: [ScheduleEntry; 12] = [
    ScheduleEntry {
        kind: ScheduleKind::FourTimesDaily,
        label: "4 times a day",
        hours: 6.0,
        aliases: &["4 times a day", "4x a day", "four times a day", "qid"],
    },
    ScheduleEntry {
        kind: ScheduleKind::ThreeTimesDaily,
        label: "3 times a day",
        hours: 8.0,
        aliases: &["3 times a day", "3x a day", "three times a day", "tid"],
    },
    ScheduleEntry {
        kind: ScheduleKind::TwiceDaily,
        label: "2 times a day",
        hours: 12.0,
        aliases: &[
            "2 times a day",
            "2x a day",
            "two times a day",
            "twice a day",
            "bid",
        ],
    },
    ScheduleEntry {
        kind: ScheduleKind::OnceDaily,
        label: "Once a day",
        hours: 24.0,
        aliases: &["once a day", "1x a day", "daily", "qd"],
    },
    ScheduleEntry {
        kind: ScheduleKind::EveryOtherDay,
        label: "Every other day",
        hours: 48.0,
        aliases: &["every other day", "once every 2 days", "every 2 days", "eod"],
    },
    ScheduleEntry {
        kind: ScheduleKind::ThreeTimesWeekly,
        label: "3 times a week",
        hours: 56.0,
        aliases: &["3 times a week", "3x a week", "three times a week"],
    },
    ScheduleEntry {
        kind: ScheduleKind::EveryThreeDays,
        label: "Once every 3 days",
        hours: 72.0,
        aliases: &["once every 3 days", "every 3 days"],
    },
    ScheduleEntry {
        kind: ScheduleKind::EveryThreeAndHalfDays,
        label: "Once every 3.5 days",
        hours: 84.0,
        aliases: &[
            "once every 3.5 days",
            "every 3.5 days",
            "twice a week",
            "2 times a week",
        ],
    },
    ScheduleEntry {
        kind: ScheduleKind::EveryFourDays,
        label: "Once every 4 days",
        hours: 96.0,
        aliases: &["once every 4 days", "every 4 days"],
    },
    ScheduleEntry {
        kind: ScheduleKind::EveryFiveDays,
        label: "Once every 5 days",
        hours: 120.0,
        aliases: &["once every 5 days", "every 5 days"],
    },
    ScheduleEntry {
        kind: ScheduleKind::EverySixDays,
        label: "Once every 6 days",
        hours: 144.0,
        aliases: &["once every 6 days", "every 6 days"],
    },
    ScheduleEntry {
        kind: ScheduleKind::EverySevenDays,
        label: "Once every 7 days",
        hours: 168.0,
        aliases: &["once every 7 days", "every 7 days", "once a week", "weekly"],
    },
];

/// Lowercase and collapse runs of whitespace
fn normalize(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl ScheduleKind {
    fn entry(&self) -> &'static ScheduleEntry {
        // Every variant has exactly one row in the table
        SCHEDULE_TABLE
            .iter()
            .find(|entry| entry.kind == *self)
            .unwrap_or(&SCHEDULE_TABLE[3])
    }

    /// All schedules, from most to least frequent
    pub fn all() -> impl Iterator<Item = ScheduleKind> {
        SCHEDULE_TABLE.iter().map(|entry| entry.kind)
    }

    /// Look up a schedule by label
    ///
    /// Case and extra whitespace are ignored, and the shorthand spellings used by
    /// the compound library (`"4x a day"`, `"Three Times a Week"`) are accepted.
    pub fn from_label(label: &str) -> Option<ScheduleKind> {
        let normalized = normalize(label);
        SCHEDULE_TABLE
            .iter()
            .find(|entry| entry.aliases.contains(&normalized.as_str()))
            .map(|entry| entry.kind)
    }

    /// Interval between two doses, in hours
    pub fn interval_hours(&self) -> f64 {
        self.entry().hours
    }

    /// Canonical label
    pub fn label(&self) -> &'static str {
        self.entry().label
    }
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How often a compound is dosed
///
/// Records carry either a frequency label or an explicit interval in hours.
/// A label that matches no known schedule is kept verbatim so that it can be
/// reported, and resolves to [`DEFAULT_INTERVAL_HOURS`].
#[derive(Debug, Clone, PartialEq)]
pub enum DosingSchedule {
    Named(ScheduleKind),
    Interval(f64),
    Unrecognized(String),
}

impl DosingSchedule {
    /// Build a schedule from a label or numeric text
    pub fn parse(text: &str) -> DosingSchedule {
        if let Some(kind) = ScheduleKind::from_label(text) {
            return DosingSchedule::Named(kind);
        }
        let hours = parse_numeric(text);
        if hours.is_nan() {
            DosingSchedule::Unrecognized(text.to_string())
        } else {
            DosingSchedule::Interval(hours)
        }
    }

    /// Resolve the schedule to an inter-dose interval in hours
    ///
    /// Unrecognized labels and unusable explicit intervals fall back to
    /// [`DEFAULT_INTERVAL_HOURS`] and are reported with a warning.
    pub fn interval_hours(&self) -> f64 {
        match self {
            DosingSchedule::Named(kind) => kind.interval_hours(),
            DosingSchedule::Interval(hours) if hours.is_finite() && *hours > 0.0 => *hours,
            DosingSchedule::Interval(hours) => {
                tracing::warn!(
                    interval = *hours,
                    "invalid dosing interval, defaulting to {} hours",
                    DEFAULT_INTERVAL_HOURS
                );
                DEFAULT_INTERVAL_HOURS
            }
            DosingSchedule::Unrecognized(label) => {
                tracing::warn!(
                    label = label.as_str(),
                    "unrecognized dosing schedule, defaulting to {} hours",
                    DEFAULT_INTERVAL_HOURS
                );
                DEFAULT_INTERVAL_HOURS
            }
        }
    }
}

impl Default for DosingSchedule {
    fn default() -> Self {
        DosingSchedule::Named(ScheduleKind::OnceDaily)
    }
}

impl From<ScheduleKind> for DosingSchedule {
    fn from(kind: ScheduleKind) -> Self {
        DosingSchedule::Named(kind)
    }
}

/// Resolve an optional schedule, treating a missing one as once a day
pub fn resolve_interval(schedule: Option<&DosingSchedule>) -> f64 {
    match schedule {
        Some(schedule) => schedule.interval_hours(),
        None => {
            tracing::debug!("no dosing schedule given, using once a day");
            DEFAULT_INTERVAL_HOURS
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSchedule {
    Hours(f64),
    Label(String),
}

impl Serialize for DosingSchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DosingSchedule::Named(kind) => serializer.serialize_str(kind.label()),
            DosingSchedule::Interval(hours) => serializer.serialize_f64(*hours),
            DosingSchedule::Unrecognized(label) => serializer.serialize_str(label),
        }
    }
}

impl<'de> Deserialize<'de> for DosingSchedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawSchedule::deserialize(deserializer)? {
            RawSchedule::Hours(hours) => DosingSchedule::Interval(hours),
            RawSchedule::Label(label) => DosingSchedule::parse(&label),
        })
    }
}
