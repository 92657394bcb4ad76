use anyhow::{Context, Result};
use dosecurve::*;

fn main() -> Result<()> {
    // A protocol record as a data-entry form would store it; numbers may arrive as text
    let record = r#"{
        "name": "Eight week cycle",
        "length": "8",
        "lengthUnit": "weeks",
        "startDate": "2025-01-06",
        "compounds": [
            {
                "name": "Compound A",
                "halfLife": 4.5,
                "halfLifeUnit": "days",
                "dose": 250,
                "doseUnit": "mg",
                "dosingSchedule": "Once every 3.5 days",
                "accumulate": true,
                "compare": true
            },
            {
                "name": "Compound B",
                "halfLife": "9",
                "halfLifeUnit": "hours",
                "dose": "0.05",
                "doseUnit": "g",
                "dosingSchedule": "2 times a day",
                "durationFrom": 4,
                "durationTo": 8,
                "accumulate": true,
                "compare": true
            }
        ]
    }"#;

    let protocol = Protocol::from_json(record).context("parsing protocol record")?;
    let context = SimulationContext::new(protocol)
        .with_scale(ScaleSettings::for_unit(TimeUnit::Weeks))
        .with_options(SimulationOptions::default().with_step(12.0));

    let result = context
        .export_csv(std::io::stdout().lock())
        .context("exporting simulated series")?;
    let plan = context.plan(&result);

    eprintln!(
        "{} samples, peak {:.2} ng/ml, {} time-axis ticks",
        result.len(),
        result.max_concentration(),
        plan.tick_count
    );
    Ok(())
}
