//! Zoom and pan state
//!
//! A [ViewTransform] maps base pixel coordinates to transformed ones as
//! `p' = p * scale + translate`, per axis. The visible data domain is obtained by
//! pulling the range ends back through the transform and inverting them with the
//! base scale, so zooming never touches the underlying series.

use serde::{Deserialize, Serialize};

use super::scale::{Domain, LinearScale};

/// Lowest zoom factor any extent can allow; a zero scale would make the view singular
pub const MIN_SCALE: f64 = 1e-3;

/// A zoom extent that is safe to clamp against
///
/// The lower bound is raised to [MIN_SCALE] and the upper bound is kept finite and
/// no smaller than the lower one.
pub fn bounded_extent(extent: (f64, f64)) -> (f64, f64) {
    let min = if extent.0 >= MIN_SCALE && extent.0.is_finite() {
        extent.0
    } else {
        MIN_SCALE
    };
    let max = if extent.1.is_finite() && extent.1 >= min {
        extent.1
    } else {
        min
    };
    (min, max)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTransform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        scale_x: 1.0,
        scale_y: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Zoom by `factor` keeping the plot pixel `anchor` fixed
    ///
    /// The resulting scale is clamped to `extent`, after [bounded_extent]. Non-finite
    /// or non-positive factors are ignored.
    pub fn zoom_at(&mut self, anchor: (f64, f64), factor: f64, extent: (f64, f64)) {
        if !factor.is_finite() || factor <= 0.0 || !anchor.0.is_finite() || !anchor.1.is_finite() {
            return;
        }
        let (ax, ay) = anchor;
        let (min, max) = bounded_extent(extent);

        let base_x = (ax - self.translate_x) / self.scale_x;
        let base_y = (ay - self.translate_y) / self.scale_y;

        self.scale_x = (self.scale_x * factor).clamp(min, max);
        self.scale_y = (self.scale_y * factor).clamp(min, max);

        self.translate_x = ax - base_x * self.scale_x;
        self.translate_y = ay - base_y * self.scale_y;
    }

    /// Translate by a pixel delta
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() {
            self.translate_x += dx;
        }
        if dy.is_finite() {
            self.translate_y += dy;
        }
    }

    /// Base pixel to transformed pixel, X axis
    pub fn apply_x(&self, pixel: f64) -> f64 {
        pixel * self.scale_x + self.translate_x
    }

    /// Base pixel to transformed pixel, Y axis
    pub fn apply_y(&self, pixel: f64) -> f64 {
        pixel * self.scale_y + self.translate_y
    }

    pub fn invert_x(&self, pixel: f64) -> f64 {
        (pixel - self.translate_x) / self.scale_x
    }

    pub fn invert_y(&self, pixel: f64) -> f64 {
        (pixel - self.translate_y) / self.scale_y
    }

    /// The X scale as seen through this transform
    pub fn rescale_x(&self, base: &LinearScale) -> LinearScale {
        if self.scale_x == 1.0 && self.translate_x == 0.0 {
            return *base;
        }
        let (r0, r1) = base.range();
        base.with_domain(Domain::new(
            base.invert(self.invert_x(r0)),
            base.invert(self.invert_x(r1)),
        ))
    }

    /// The Y scale as seen through this transform
    ///
    /// The Y range runs from the bottom of the plot to the top, so the domain
    /// still comes out as `min..max`.
    pub fn rescale_y(&self, base: &LinearScale) -> LinearScale {
        if self.scale_y == 1.0 && self.translate_y == 0.0 {
            return *base;
        }
        let (r0, r1) = base.range();
        base.with_domain(Domain::new(
            base.invert(self.invert_y(r0)),
            base.invert(self.invert_y(r1)),
        ))
    }

    /// Shift horizontally so the visible X domain does not start below zero
    ///
    /// The zoom level, and therefore the visible width, is unchanged.
    pub fn clamp_origin(&mut self, base_x: &LinearScale) {
        let visible = self.rescale_x(base_x);
        if visible.domain().min < 0.0 {
            let (r0, _) = base_x.range();
            self.translate_x = r0 - self.scale_x * base_x.map(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EXTENT: (f64, f64) = (0.5, 20.0);

    fn base_x() -> LinearScale {
        LinearScale::new(Domain::new(0.0, 100.0), (0.0, 500.0))
    }

    #[test]
    fn test_identity_returns_base_domain() {
        let base = base_x();
        assert_eq!(ViewTransform::IDENTITY.rescale_x(&base), base);
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let base = base_x();
        let mut transform = ViewTransform::default();
        let before = transform.rescale_x(&base).invert(250.0);
        transform.zoom_at((250.0, 100.0), 2.0, EXTENT);
        let after = transform.rescale_x(&base).invert(250.0);
        assert_relative_eq!(before, after, epsilon = 1e-9);

        let visible = transform.rescale_x(&base).domain();
        assert_relative_eq!(visible.min, 25.0, epsilon = 1e-9);
        assert_relative_eq!(visible.max, 75.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zoom_extent_is_enforced() {
        let mut transform = ViewTransform::default();
        transform.zoom_at((0.0, 0.0), 1000.0, EXTENT);
        assert_eq!(transform.scale_x, 20.0);
        transform.zoom_at((0.0, 0.0), 0.0001, EXTENT);
        assert_eq!(transform.scale_x, 0.5);
        transform.zoom_at((0.0, 0.0), f64::NAN, EXTENT);
        assert_eq!(transform.scale_x, 0.5);
    }

    #[test]
    fn test_degenerate_extent_keeps_scales_finite() {
        let base = base_x();
        let mut transform = ViewTransform::default();
        transform.zoom_at((100.0, 0.0), 1e-12, (0.0, 20.0));
        assert_eq!(transform.scale_x, MIN_SCALE);
        let visible = transform.rescale_x(&base).domain();
        assert!(visible.min.is_finite() && visible.max.is_finite());

        // Inverted or NaN bounds must not panic in clamp
        transform.zoom_at((100.0, 0.0), 2.0, (5.0, 1.0));
        assert_eq!(transform.scale_x, 5.0);
        transform.zoom_at((100.0, 0.0), 2.0, (f64::NAN, f64::NAN));
        assert_eq!(transform.scale_x, MIN_SCALE);

        assert_eq!(bounded_extent(EXTENT), EXTENT);
        assert_eq!(bounded_extent((-1.0, f64::INFINITY)), (MIN_SCALE, MIN_SCALE));
    }

    #[test]
    fn test_pan_shifts_visible_domain() {
        let base = base_x();
        let mut transform = ViewTransform::default();
        transform.pan(-50.0, 0.0);
        let visible = transform.rescale_x(&base).domain();
        assert_relative_eq!(visible.min, 10.0, epsilon = 1e-9);
        assert_relative_eq!(visible.max, 110.0, epsilon = 1e-9);
        transform.pan(f64::INFINITY, f64::NAN);
        assert_eq!(transform.translate_x, -50.0);
    }

    #[test]
    fn test_clamp_origin_keeps_width() {
        let base = base_x();
        let mut transform = ViewTransform::default();
        transform.zoom_at((250.0, 0.0), 2.0, EXTENT);
        transform.pan(400.0, 0.0);
        let width = transform.rescale_x(&base).domain().width();
        assert!(transform.rescale_x(&base).domain().min < 0.0);

        transform.clamp_origin(&base);
        let visible = transform.rescale_x(&base).domain();
        assert_relative_eq!(visible.min, 0.0, epsilon = 1e-12);
        assert_relative_eq!(visible.width(), width, epsilon = 1e-9);
    }

    #[test]
    fn test_rescale_y_with_inverted_range() {
        let base = LinearScale::new(Domain::new(0.0, 10.0), (400.0, 0.0));
        let mut transform = ViewTransform::default();
        transform.zoom_at((0.0, 400.0), 2.0, EXTENT);
        let visible = transform.rescale_y(&base).domain();
        assert_relative_eq!(visible.min, 0.0, epsilon = 1e-12);
        assert_relative_eq!(visible.max, 5.0, epsilon = 1e-12);
    }
}
