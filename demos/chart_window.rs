use anyhow::Result;
use chrono::NaiveDate;
use dosecurve::*;

fn main() -> Result<()> {
    let mut protocol = Protocol::new("Twelve week cycle", 12.0, LengthUnit::Weeks)
        .with_compound(
            CompoundDosing::new("Compound A")
                .with_half_life(7.0, TimeUnit::Days)
                .with_dose(300.0)
                .with_schedule(ScheduleKind::EverySevenDays)
                .accumulate(true)
                .compare(true),
        )
        .with_compound(
            CompoundDosing::new("Compound B")
                .with_half_life(2.0, TimeUnit::Days)
                .with_dose(100.0)
                .with_schedule(ScheduleKind::EveryOtherDay)
                .with_window(2.0, 10.0)
                .accumulate(true)
                .compare(true),
        );
    if let Some(date) = NaiveDate::from_ymd_opt(2025, 3, 3) {
        protocol = protocol.with_start_date(date);
    }

    let context = SimulationContext::new(protocol).with_scale(ScaleSettings::for_unit(TimeUnit::Weeks));
    let window = ChartWindow::new(&context)?;
    window
        .run()
        .map_err(|e| anyhow::anyhow!("chart window failed: {e}"))
}
