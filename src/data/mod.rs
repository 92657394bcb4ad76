pub mod numeric;
pub mod protocol;
pub mod scale;
pub mod schedule;
pub mod units;
pub use numeric::{or_zero, parse_numeric, AsNumeric};
pub use protocol::{date_after, CompoundDosing, LengthUnit, Protocol};
pub use scale::ScaleSettings;
pub use schedule::{resolve_interval, DosingSchedule, ScheduleKind, DEFAULT_INTERVAL_HOURS};
pub use units::{dose_to_mg, half_life_to_hours, mg_to_dose, to_hours, DoseUnit, TimeUnit};
