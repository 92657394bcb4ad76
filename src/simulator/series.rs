use serde::{Deserialize, Serialize};

/// One sample of a concentration curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Hours since protocol start
    pub time: f64,
    /// Concentration, finite and `>= 0`
    pub concentration: f64,
}

impl TimeSeriesPoint {
    pub fn new(time: f64, concentration: f64) -> Self {
        Self {
            time,
            concentration,
        }
    }
}

/// The curve of a single compound, kept when the compound is marked for comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundSeries {
    pub name: String,
    pub points: Vec<TimeSeriesPoint>,
}

impl CompoundSeries {
    pub fn new(name: impl Into<String>, points: Vec<TimeSeriesPoint>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Peak concentration of this compound, `0.0` for an empty curve
    pub fn peak(&self) -> f64 {
        peak_of(&self.points)
    }
}

/// Output of a simulation pass
///
/// `total` is the summed curve over all compounds. `per_compound` holds the
/// individual curves of compounds with `compare` set, in protocol order. Every
/// series shares the same time grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub total: Vec<TimeSeriesPoint>,
    pub per_compound: Vec<CompoundSeries>,
}

impl SimulationResult {
    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }

    /// Number of samples on the shared grid
    pub fn len(&self) -> usize {
        self.total.len()
    }

    /// Last sampled time, or `None` if nothing was sampled
    pub fn max_time(&self) -> Option<f64> {
        self.total.last().map(|p| p.time)
    }

    /// Largest concentration across the total and every compared compound
    pub fn max_concentration(&self) -> f64 {
        self.per_compound
            .iter()
            .map(CompoundSeries::peak)
            .fold(peak_of(&self.total), f64::max)
    }

    /// Find a compared compound's curve by name
    pub fn compound(&self, name: &str) -> Option<&CompoundSeries> {
        self.per_compound.iter().find(|s| s.name == name)
    }

    /// Sample times of the shared grid
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.total.iter().map(|p| p.time)
    }
}

fn peak_of(points: &[TimeSeriesPoint]) -> f64 {
    points.iter().map(|p| p.concentration).fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(values: &[f64]) -> Vec<TimeSeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &c)| TimeSeriesPoint::new(i as f64, c))
            .collect()
    }

    #[test]
    fn test_empty_result() {
        let result = SimulationResult::default();
        assert!(result.is_empty());
        assert_eq!(result.max_time(), None);
        assert_eq!(result.max_concentration(), 0.0);
    }

    #[test]
    fn test_maxima_include_compared_compounds() {
        let result = SimulationResult {
            total: points(&[1.0, 3.0, 2.0]),
            per_compound: vec![
                CompoundSeries::new("a", points(&[0.5, 1.0, 0.5])),
                CompoundSeries::new("b", points(&[4.0, 2.0, 1.0])),
            ],
        };
        assert_eq!(result.len(), 3);
        assert_eq!(result.max_time(), Some(2.0));
        assert_eq!(result.max_concentration(), 4.0);
        assert_eq!(result.compound("a").map(|s| s.peak()), Some(1.0));
        assert!(result.compound("c").is_none());
    }
}
