//! Concentration models
//!
//! Two closed-form, first-order elimination models are available:
//!
//! - [MultiDose]: superposition of single-dose exponential decays, one per
//!   administration of a scheduled regimen.
//! - [PeakRatio]: a single-dose curve scaled from the compound's Cmax, Tmax and
//!   bioavailability, used to preview library compounds that have no regimen.
//!
//! [ConcentrationModel::for_compound] picks between them: a compound with a finite
//! `dose` uses [MultiDose], anything else uses [PeakRatio].
//!
//! All models fail soft. Non-finite or out-of-range parameters produce a
//! concentration of zero rather than `NaN`, so that one malformed compound cannot
//! blank the whole curve.

use std::f64::consts::LN_2;

use crate::data::numeric::or_zero;
use crate::data::protocol::{CompoundDosing, Protocol};
use crate::data::schedule::resolve_interval;
use crate::data::units::{dose_to_mg, half_life_to_hours, to_hours};

/// Elimination rate constant for a half-life in hours, if the half-life is usable
pub fn elimination_constant(half_life_hours: f64) -> Option<f64> {
    if half_life_hours.is_finite() && half_life_hours > 0.0 {
        Some(LN_2 / half_life_hours)
    } else {
        None
    }
}

/// A concentration curve over absolute protocol time
pub trait Concentration {
    /// Concentration at time `t` (hours since protocol start), always finite and `>= 0`
    fn concentration(&self, t: f64) -> f64;
}

/// An inclusive window of protocol time, in hours
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveWindow {
    pub start: f64,
    pub end: f64,
}

impl ActiveWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }
}

/// Superposition of exponential decays from repeated doses
///
/// Doses are given every `interval` hours starting at the beginning of the active
/// window. At time `t` inside the window, `n = floor((t - start) / interval) + 1`
/// doses have been administered, and dose `i` contributes
/// `dose * exp(-k * (t - start - i * interval))`.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiDose {
    dose_mg: f64,
    interval: f64,
    ke: Option<f64>,
    window: ActiveWindow,
    accumulate: bool,
}

impl MultiDose {
    /// Create the model
    ///
    /// # Arguments
    /// * `dose_mg` - Dose per administration in mg, before adjustment
    /// * `adjust_levels` - Dose adjustment in percent (`dose * (1 + adjust / 100)`)
    /// * `interval` - Hours between doses
    /// * `half_life` - Half-life in hours
    /// * `window` - Active window in protocol hours
    /// * `accumulate` - Sum every dose (true) or only the most recent one (false)
    pub fn new(
        dose_mg: f64,
        adjust_levels: f64,
        interval: f64,
        half_life: f64,
        window: ActiveWindow,
        accumulate: bool,
    ) -> Self {
        Self {
            dose_mg: dose_mg * (1.0 + adjust_levels / 100.0),
            interval,
            ke: elimination_constant(half_life),
            window,
            accumulate,
        }
    }

    /// Adjusted dose per administration, in mg
    pub fn adjusted_dose(&self) -> f64 {
        self.dose_mg
    }

    fn is_valid(&self) -> bool {
        self.ke.is_some()
            && self.dose_mg.is_finite()
            && self.interval.is_finite()
            && self.interval > 0.0
            && self.window.start.is_finite()
            && self.window.end.is_finite()
    }

    /// Number of doses administered by time `t`
    pub fn doses_administered(&self, t: f64) -> usize {
        if !self.is_valid() || !self.window.contains(t) {
            return 0;
        }
        // Saturates instead of overflowing for very long windows
        (((t - self.window.start) / self.interval).floor() + 1.0) as usize
    }

    /// Contribution of dose `index` alone at time `t`
    ///
    /// Zero outside the active window and before the dose is given.
    pub fn dose_contribution(&self, index: usize, t: f64) -> f64 {
        let ke = match self.ke {
            Some(ke) if self.is_valid() && self.window.contains(t) => ke,
            _ => return 0.0,
        };
        let elapsed = t - self.window.start - index as f64 * self.interval;
        if elapsed < 0.0 {
            return 0.0;
        }
        self.dose_mg * (-ke * elapsed).exp()
    }
}

impl Concentration for MultiDose {
    /// Evaluated in constant time whatever the number of doses
    ///
    /// Dose `i` of `n` has decayed `r^(n - 1 - i)` times as much as the latest one,
    /// with `r = exp(-k * interval)`, so the accumulated total is the latest
    /// contribution times the geometric sum `(1 - r^n) / (1 - r)`.
    fn concentration(&self, t: f64) -> f64 {
        let ke = match self.ke {
            Some(ke) if self.is_valid() && self.window.contains(t) => ke,
            _ => return 0.0,
        };
        let elapsed = t - self.window.start;
        let latest = self.dose_mg * (-ke * elapsed.rem_euclid(self.interval)).exp();

        let concentration = if self.accumulate {
            let doses = (elapsed / self.interval).floor() + 1.0;
            let decay = -ke * self.interval;
            let denominator = decay.exp_m1();
            if denominator == 0.0 {
                latest * doses
            } else {
                latest * ((decay * doses).exp_m1() / denominator)
            }
        } else {
            latest
        };
        or_zero(concentration).max(0.0)
    }
}

/// Single-dose curve derived from Cmax, Tmax and bioavailability
///
/// `C(t) = Cmax * F * exp(-k * t) / (1 - exp(-k * Tmax))` with `t` measured from the
/// start of the active window.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakRatio {
    cmax: f64,
    bioavailability: f64,
    half_life: f64,
    tmax: f64,
    window: ActiveWindow,
}

impl PeakRatio {
    /// Create the model, with `half_life` and `tmax` in hours
    pub fn new(
        cmax: f64,
        bioavailability: f64,
        half_life: f64,
        tmax: f64,
        window: ActiveWindow,
    ) -> Self {
        Self {
            cmax,
            bioavailability,
            half_life,
            tmax,
            window,
        }
    }

    fn is_valid(&self) -> bool {
        self.cmax.is_finite()
            && self.bioavailability.is_finite()
            && (0.0..=1.0).contains(&self.bioavailability)
            && self.half_life.is_finite()
            && self.half_life > 0.0
            && self.tmax.is_finite()
            && self.tmax > 0.0
    }

    /// Concentration at time zero of the window, the curve's maximum
    pub fn initial_concentration(&self) -> f64 {
        self.concentration(self.window.start)
    }
}

impl Concentration for PeakRatio {
    fn concentration(&self, t: f64) -> f64 {
        if !self.is_valid() || !self.window.contains(t) {
            return 0.0;
        }
        let ke = LN_2 / self.half_life;
        let elapsed = t - self.window.start;
        let concentration =
            self.cmax * self.bioavailability * ((-ke * elapsed).exp() / (1.0 - (-ke * self.tmax).exp()));
        or_zero(concentration).max(0.0)
    }
}

/// The model used for one compound during a simulation pass
#[derive(Debug, Clone, PartialEq)]
pub enum ConcentrationModel {
    MultiDose(MultiDose),
    PeakRatio(PeakRatio),
    /// The compound has no usable active window and contributes nothing
    Inert,
}

impl ConcentrationModel {
    /// Select and parameterize the model for a compound in a protocol
    ///
    /// Units are normalized here (half-life and Tmax to hours, dose to mg) and
    /// the schedule is resolved once, so sampling does no further lookups.
    pub fn for_compound(compound: &CompoundDosing, protocol: &Protocol) -> Self {
        let (start, end) = match compound.active_window_hours(protocol) {
            Some(window) => window,
            None => return ConcentrationModel::Inert,
        };
        let window = ActiveWindow::new(start, end);
        let half_life = half_life_to_hours(compound.half_life, compound.half_life_unit);

        match compound.dose {
            Some(dose) if dose.is_finite() => {
                let interval = resolve_interval(compound.dosing_schedule.as_ref());
                ConcentrationModel::MultiDose(MultiDose::new(
                    dose_to_mg(dose, compound.dose_unit),
                    compound.adjust_levels,
                    interval,
                    half_life,
                    window,
                    compound.accumulate,
                ))
            }
            _ => ConcentrationModel::PeakRatio(PeakRatio::new(
                compound.cmax,
                compound.bioavailability,
                half_life,
                to_hours(compound.tmax, compound.tmax_unit),
                window,
            )),
        }
    }

    /// Short name of the selected model, for diagnostics
    pub fn mode(&self) -> &'static str {
        match self {
            ConcentrationModel::MultiDose(_) => "multi-dose",
            ConcentrationModel::PeakRatio(_) => "peak-ratio",
            ConcentrationModel::Inert => "inert",
        }
    }
}

impl Concentration for ConcentrationModel {
    fn concentration(&self, t: f64) -> f64 {
        match self {
            ConcentrationModel::MultiDose(model) => model.concentration(t),
            ConcentrationModel::PeakRatio(model) => model.concentration(t),
            ConcentrationModel::Inert => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::protocol::LengthUnit;
    use crate::data::schedule::ScheduleKind;
    use crate::data::units::{DoseUnit, TimeUnit};
    use approx::assert_relative_eq;

    fn whole_week() -> ActiveWindow {
        ActiveWindow::new(0.0, 168.0)
    }

    #[test]
    fn test_single_dose_decay() {
        let model = MultiDose::new(100.0, 0.0, 1000.0, 10.0, whole_week(), true);
        assert_relative_eq!(model.concentration(0.0), 100.0);
        assert_relative_eq!(model.concentration(10.0), 50.0, epsilon = 1e-10);
        assert_relative_eq!(model.concentration(20.0), 25.0, epsilon = 1e-10);
    }

    #[test]
    fn test_accumulation_sums_every_dose() {
        let model = MultiDose::new(10.0, 0.0, 12.0, 24.0, whole_week(), true);
        let t = 50.0;
        assert_eq!(model.doses_administered(t), 5);
        let expected: f64 = (0..5).map(|i| 10.0 * (-(LN_2 / 24.0) * (t - 12.0 * i as f64)).exp()).sum();
        assert_relative_eq!(model.concentration(t), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_dense_dosing_stays_bounded() {
        let half_life = 24.0;
        let interval = 1e-9;
        let model = MultiDose::new(1.0, 0.0, interval, half_life, whole_week(), true);

        // Continuous-infusion limit of the dose train: D / (1 - r) * (1 - exp(-k t))
        let ke = LN_2 / half_life;
        let t = 100.0;
        let steady = 1.0 / -(-ke * interval).exp_m1();
        let expected = steady * -(-ke * t).exp_m1();
        assert_relative_eq!(model.concentration(t), expected, max_relative = 1e-6);
        assert!(model.concentration(168.0).is_finite());
        assert!(model.doses_administered(168.0) > 1_000_000_000);
    }

    #[test]
    fn test_huge_window_does_not_overflow() {
        let model = MultiDose::new(10.0, 0.0, 1e-3, 24.0, ActiveWindow::new(0.0, 1e300), true);
        assert_eq!(model.doses_administered(1e299), usize::MAX);
        let c = model.concentration(1e299);
        assert!(c.is_finite() && c >= 0.0);
    }

    #[test]
    fn test_without_accumulation_only_latest_dose_counts() {
        let model = MultiDose::new(10.0, 0.0, 12.0, 24.0, whole_week(), false);
        let t = 50.0;
        assert_relative_eq!(model.concentration(t), model.dose_contribution(4, t), epsilon = 1e-12);
        assert_relative_eq!(model.concentration(t), 10.0 * (-(LN_2 / 24.0) * 2.0).exp());
        // Right at a dose the curve restarts from the full dose
        assert_relative_eq!(model.concentration(48.0), 10.0);
    }

    #[test]
    fn test_adjust_levels() {
        let up = MultiDose::new(100.0, 50.0, 24.0, 12.0, whole_week(), true);
        let down = MultiDose::new(100.0, -100.0, 24.0, 12.0, whole_week(), true);
        assert_eq!(up.adjusted_dose(), 150.0);
        assert_eq!(down.concentration(5.0), 0.0);
    }

    #[test]
    fn test_window_bounds() {
        let model = MultiDose::new(10.0, 0.0, 24.0, 24.0, ActiveWindow::new(120.0, 240.0), true);
        assert_eq!(model.concentration(119.0), 0.0);
        assert_relative_eq!(model.concentration(120.0), 10.0);
        assert!(model.concentration(240.0) > 0.0);
        assert_eq!(model.concentration(241.0), 0.0);
    }

    #[test]
    fn test_invalid_multi_dose_parameters() {
        let window = whole_week();
        assert_eq!(MultiDose::new(10.0, 0.0, 24.0, 0.0, window, true).concentration(1.0), 0.0);
        assert_eq!(MultiDose::new(10.0, 0.0, 24.0, f64::NAN, window, true).concentration(1.0), 0.0);
        assert_eq!(MultiDose::new(f64::NAN, 0.0, 24.0, 5.0, window, true).concentration(1.0), 0.0);
        assert_eq!(MultiDose::new(10.0, f64::NAN, 24.0, 5.0, window, true).concentration(1.0), 0.0);
        assert_eq!(MultiDose::new(10.0, 0.0, 0.0, 5.0, window, true).concentration(1.0), 0.0);
        assert_eq!(
            MultiDose::new(f64::INFINITY, 0.0, 24.0, 5.0, window, true).concentration(1.0),
            0.0
        );
    }

    #[test]
    fn test_peak_ratio_formula() {
        let model = PeakRatio::new(100.0, 1.0, 24.0, 2.0, whole_week());
        let ke = LN_2 / 24.0;
        let c0 = 100.0 / (1.0 - (-ke * 2.0).exp());
        assert_relative_eq!(model.initial_concentration(), c0, epsilon = 1e-10);
        assert_relative_eq!(model.concentration(24.0), c0 / 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_peak_ratio_guards() {
        let window = whole_week();
        let cases = [
            PeakRatio::new(f64::NAN, 1.0, 24.0, 2.0, window),
            PeakRatio::new(100.0, f64::NAN, 24.0, 2.0, window),
            PeakRatio::new(100.0, 1.0, 0.0, 2.0, window),
            PeakRatio::new(100.0, 1.0, -3.0, 2.0, window),
            PeakRatio::new(100.0, 1.0, 24.0, 0.0, window),
            PeakRatio::new(100.0, 1.0, 24.0, f64::INFINITY, window),
            PeakRatio::new(100.0, 1.5, 24.0, 2.0, window),
        ];
        for model in cases {
            assert_eq!(model.concentration(3.0), 0.0, "{:?}", model);
        }
        assert_eq!(PeakRatio::new(-5.0, 1.0, 24.0, 2.0, window).concentration(1.0), 0.0);
    }

    #[test]
    fn test_model_selection() {
        let protocol = Protocol::new("p", 7.0, LengthUnit::Days);
        let dosed = CompoundDosing::new("a")
            .with_half_life(1.0, TimeUnit::Days)
            .with_dose_in(0.5, DoseUnit::G)
            .with_schedule(ScheduleKind::TwiceDaily);
        let preview = CompoundDosing::new("b")
            .with_half_life(24.0, TimeUnit::Hours)
            .with_peak(80.0, 3.0, 0.5);
        let broken_window = CompoundDosing::new("c").with_window(3.0, 1.0);

        match ConcentrationModel::for_compound(&dosed, &protocol) {
            ConcentrationModel::MultiDose(model) => {
                assert_eq!(model.adjusted_dose(), 500.0);
                assert_eq!(model.doses_administered(25.0), 3);
            }
            other => panic!("expected multi-dose, got {}", other.mode()),
        }
        assert_eq!(ConcentrationModel::for_compound(&preview, &protocol).mode(), "peak-ratio");
        assert_eq!(
            ConcentrationModel::for_compound(&broken_window, &protocol),
            ConcentrationModel::Inert
        );
    }

    #[test]
    fn test_tmax_unit_is_normalized() {
        let protocol = Protocol::new("p", 7.0, LengthUnit::Days);
        let mut in_minutes = CompoundDosing::new("a")
            .with_half_life(24.0, TimeUnit::Hours)
            .with_peak(80.0, 120.0, 1.0);
        in_minutes.tmax_unit = TimeUnit::Minutes;
        let in_hours = CompoundDosing::new("a")
            .with_half_life(24.0, TimeUnit::Hours)
            .with_peak(80.0, 2.0, 1.0);

        let a = ConcentrationModel::for_compound(&in_minutes, &protocol);
        let b = ConcentrationModel::for_compound(&in_hours, &protocol);
        assert_relative_eq!(a.concentration(10.0), b.concentration(10.0), epsilon = 1e-10);
    }
}
