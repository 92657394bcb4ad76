use serde::{Deserialize, Serialize};

/// A closed interval of data values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    /// `[0, 10]`, used when there is nothing to plot
    pub const DEFAULT: Domain = Domain {
        min: 0.0,
        max: 10.0,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// `[0, max]`, or [Domain::DEFAULT] when `max` is not a positive number
    pub fn from_zero(max: f64) -> Self {
        if max.is_finite() && max > 0.0 {
            Domain::new(0.0, max)
        } else {
            Domain::DEFAULT
        }
    }
}

/// Linear mapping from a data domain to a pixel range
///
/// The range may be inverted; the Y axis maps `[0, max]` onto `[height, 0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: Domain,
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: Domain, range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Data value to pixel
    pub fn map(&self, value: f64) -> f64 {
        let span = self.domain.width();
        if span == 0.0 || !span.is_finite() {
            return self.range.0;
        }
        self.range.0 + (value - self.domain.min) / span * (self.range.1 - self.range.0)
    }

    /// Pixel to data value
    pub fn invert(&self, pixel: f64) -> f64 {
        let extent = self.range.1 - self.range.0;
        if extent == 0.0 || !extent.is_finite() {
            return self.domain.min;
        }
        self.domain.min + (pixel - self.range.0) / extent * self.domain.width()
    }

    /// Same range, different domain
    pub fn with_domain(&self, domain: Domain) -> Self {
        Self {
            domain,
            range: self.range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_and_invert() {
        let scale = LinearScale::new(Domain::new(0.0, 168.0), (0.0, 840.0));
        assert_eq!(scale.map(0.0), 0.0);
        assert_eq!(scale.map(84.0), 420.0);
        assert_eq!(scale.invert(420.0), 84.0);
    }

    #[test]
    fn test_inverted_range() {
        let scale = LinearScale::new(Domain::new(0.0, 10.0), (400.0, 0.0));
        assert_eq!(scale.map(0.0), 400.0);
        assert_eq!(scale.map(10.0), 0.0);
        assert_eq!(scale.invert(200.0), 5.0);
    }

    #[test]
    fn test_degenerate_scales_stay_finite() {
        let flat = LinearScale::new(Domain::new(3.0, 3.0), (0.0, 100.0));
        assert_eq!(flat.map(5.0), 0.0);
        let collapsed = LinearScale::new(Domain::new(0.0, 1.0), (50.0, 50.0));
        assert_eq!(collapsed.invert(10.0), 0.0);
    }

    #[test]
    fn test_from_zero() {
        assert_eq!(Domain::from_zero(24.0), Domain::new(0.0, 24.0));
        assert_eq!(Domain::from_zero(0.0), Domain::DEFAULT);
        assert_eq!(Domain::from_zero(f64::NAN), Domain::DEFAULT);
    }
}
