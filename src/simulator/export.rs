use std::io::Write;

use csv::WriterBuilder;

use super::series::SimulationResult;

impl SimulationResult {
    /// Write the result as CSV
    ///
    /// The header is `time_hours,total` followed by one column per compared
    /// compound, named after the compound. An empty result writes only the header.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);

        let mut header = vec!["time_hours".to_string(), "total".to_string()];
        header.extend(self.per_compound.iter().map(|s| s.name.clone()));
        writer.write_record(&header)?;

        for (i, point) in self.total.iter().enumerate() {
            let mut record = Vec::with_capacity(header.len());
            record.push(point.time.to_string());
            record.push(point.concentration.to_string());
            for series in &self.per_compound {
                let value = series.points.get(i).map(|p| p.concentration).unwrap_or(0.0);
                record.push(value.to_string());
            }
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Render the result as a CSV string
    pub fn to_csv_string(&self) -> Result<String, csv::Error> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
