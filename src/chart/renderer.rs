use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::axis::AxisPlan;
use super::scale::{Domain, LinearScale};
use super::scene::{Anchor, Canvas, Pos, Scene, AXIS, GRID, TEXT};
use super::transform::{bounded_extent, ViewTransform};
use crate::simulator::SimulationResult;

pub const X_AXIS_TITLE: &str = "Time";
pub const Y_AXIS_TITLE: &str = "Concentration (ng/ml)";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 30.0,
            bottom: 50.0,
            left: 60.0,
        }
    }
}

/// Layout and interaction settings of an [InteractiveChart]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    /// Canvas width in pixels, margins included
    pub width: f64,
    /// Canvas height in pixels, margins included
    pub height: f64,
    pub margins: Margins,
    /// Smallest and largest zoom factor
    pub zoom_extent: (f64, f64),
    pub marker_radius: f32,
    pub line_width: f32,
    /// Extra distance around a marker that still counts as hovering it
    pub hover_tolerance: f32,
    /// Keep the visible time domain from starting below zero
    pub clamp_origin: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 450.0,
            margins: Margins::default(),
            zoom_extent: (0.5, 20.0),
            marker_radius: 3.0,
            line_width: 2.0,
            hover_tolerance: 3.0,
            clamp_origin: true,
        }
    }
}

impl ChartOptions {
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Zoom bounds; the lower one never drops below [MIN_SCALE](super::transform::MIN_SCALE)
    pub fn with_zoom_extent(mut self, min: f64, max: f64) -> Self {
        self.zoom_extent = bounded_extent((min, max));
        self
    }

    pub fn with_marker_radius(mut self, radius: f32) -> Self {
        self.marker_radius = radius;
        self
    }

    pub fn with_hover_tolerance(mut self, tolerance: f32) -> Self {
        self.hover_tolerance = tolerance;
        self
    }

    pub fn with_clamp_origin(mut self, clamp: bool) -> Self {
        self.clamp_origin = clamp;
        self
    }

    pub fn plot_width(&self) -> f64 {
        (self.width - self.margins.left - self.margins.right).max(1.0)
    }

    pub fn plot_height(&self) -> f64 {
        (self.height - self.margins.top - self.margins.bottom).max(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartState {
    /// No data yet
    Idle,
    /// Showing fresh data at the identity transform
    Rendering,
    /// Zoomed or panned
    Interactive,
}

/// Details of the hovered marker
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub series: String,
    pub time: f64,
    pub concentration: f64,
    pub date: Option<NaiveDate>,
    /// Canvas position of the marker
    pub anchor: Pos,
}

impl Tooltip {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Time: {:.2} hours", self.time),
            format!("Concentration: {:.2} ng/ml", self.concentration),
        ];
        if let Some(date) = self.date {
            lines.push(format!("Date: {}", date));
        }
        lines
    }
}

/// A zoomable, pannable concentration chart
///
/// Data is set once per simulation; zoom and pan only change the view transform
/// and re-project the retained scene on the next [render](InteractiveChart::render).
#[derive(Debug, Clone)]
pub struct InteractiveChart {
    options: ChartOptions,
    state: ChartState,
    plan: Option<AxisPlan>,
    scene: Scene,
    base_x: LinearScale,
    base_y: LinearScale,
    transform: ViewTransform,
    tooltip: Option<Tooltip>,
}

impl Default for InteractiveChart {
    fn default() -> Self {
        Self::new(ChartOptions::default())
    }
}

impl InteractiveChart {
    pub fn new(options: ChartOptions) -> Self {
        let (base_x, base_y) = base_scales(&options, Domain::DEFAULT, Domain::DEFAULT);
        Self {
            options,
            state: ChartState::Idle,
            plan: None,
            scene: Scene::default(),
            base_x,
            base_y,
            transform: ViewTransform::IDENTITY,
            tooltip: None,
        }
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn state(&self) -> ChartState {
        self.state
    }

    pub fn plan(&self) -> Option<&AxisPlan> {
        self.plan.as_ref()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Replace the plotted data, discarding any zoom or pan
    pub fn set_data(&mut self, result: &SimulationResult, plan: AxisPlan) {
        self.scene = Scene::from_result(result);
        let (base_x, base_y) = base_scales(&self.options, plan.x_domain, plan.y_domain);
        self.base_x = base_x;
        self.base_y = base_y;
        self.plan = Some(plan);
        self.transform = ViewTransform::IDENTITY;
        self.tooltip = None;
        self.state = ChartState::Rendering;
        tracing::debug!(layers = self.scene.layers.len(), "chart data replaced");
    }

    /// Change the canvas size, keeping the current transform
    pub fn resize(&mut self, width: f64, height: f64) {
        if !(width.is_finite() && height.is_finite()) {
            return;
        }
        if width == self.options.width && height == self.options.height {
            return;
        }
        self.options.width = width;
        self.options.height = height;
        let (base_x, base_y) =
            base_scales(&self.options, self.base_x.domain(), self.base_y.domain());
        self.base_x = base_x;
        self.base_y = base_y;
    }

    /// X scale of the current view
    pub fn x_scale(&self) -> LinearScale {
        self.transform.rescale_x(&self.base_x)
    }

    /// Y scale of the current view
    pub fn y_scale(&self) -> LinearScale {
        self.transform.rescale_y(&self.base_y)
    }

    /// Visible time and concentration domains
    pub fn visible_domains(&self) -> (Domain, Domain) {
        (self.x_scale().domain(), self.y_scale().domain())
    }

    /// Zoom by `factor` around a canvas position
    pub fn zoom(&mut self, pointer: Pos, factor: f64) {
        if self.state == ChartState::Idle {
            return;
        }
        let anchor = self.to_plot(pointer);
        self.transform
            .zoom_at(anchor, factor, self.options.zoom_extent);
        self.after_interaction();
    }

    /// Pan by a pixel delta
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if self.state == ChartState::Idle {
            return;
        }
        self.transform.pan(dx, dy);
        self.after_interaction();
    }

    /// Return to the planned domains
    pub fn reset(&mut self) {
        self.transform = ViewTransform::IDENTITY;
        self.tooltip = None;
        if self.plan.is_some() {
            self.state = ChartState::Rendering;
        }
    }

    fn after_interaction(&mut self) {
        if self.options.clamp_origin {
            self.transform.clamp_origin(&self.base_x);
        }
        self.tooltip = None;
        self.state = ChartState::Interactive;
    }

    /// Canvas position to plot-local pixels
    fn to_plot(&self, pos: Pos) -> (f64, f64) {
        (
            pos.x as f64 - self.options.margins.left,
            pos.y as f64 - self.options.margins.top,
        )
    }

    /// Plot-local pixels to canvas position
    fn to_canvas(&self, x: f64, y: f64) -> Pos {
        Pos::new(
            (x + self.options.margins.left) as f32,
            (y + self.options.margins.top) as f32,
        )
    }

    /// Update the tooltip for the pointer position; `None` means the pointer left
    pub fn hover(&mut self, pointer: Option<Pos>) -> Option<&Tooltip> {
        self.tooltip = pointer.and_then(|pos| self.hit_test(pos));
        self.tooltip.as_ref()
    }

    fn hit_test(&self, pointer: Pos) -> Option<Tooltip> {
        let plan = self.plan.as_ref()?;
        let (xs, ys) = (self.x_scale(), self.y_scale());
        let (x_domain, y_domain) = (xs.domain(), ys.domain());
        let reach = self.options.marker_radius + self.options.hover_tolerance;

        let mut best: Option<(f32, Tooltip)> = None;
        for layer in &self.scene.layers {
            for point in layer.visible(x_domain.min, x_domain.max) {
                if !x_domain.contains(point.time) || !y_domain.contains(point.concentration) {
                    continue;
                }
                let anchor = self.to_canvas(xs.map(point.time), ys.map(point.concentration));
                let distance = anchor.distance(pointer);
                if distance > reach || best.as_ref().is_some_and(|(d, _)| distance >= *d) {
                    continue;
                }
                best = Some((
                    distance,
                    Tooltip {
                        series: layer.name.clone(),
                        time: point.time,
                        concentration: point.concentration,
                        date: plan.date_at(point.time),
                        anchor,
                    },
                ));
            }
        }
        best.map(|(_, tooltip)| tooltip)
    }

    /// Draw the current view
    pub fn render(&self, canvas: &mut impl Canvas) {
        let plan = match &self.plan {
            Some(plan) => plan,
            None => return,
        };
        let (xs, ys) = (self.x_scale(), self.y_scale());
        let (width, height) = (self.options.plot_width(), self.options.plot_height());

        self.draw_x_axis(canvas, plan, &xs, height);
        self.draw_y_axis(canvas, plan, &ys, width);

        canvas.line_segment(self.to_canvas(0.0, height), self.to_canvas(width, height), AXIS, 1.0);
        canvas.line_segment(self.to_canvas(0.0, 0.0), self.to_canvas(0.0, height), AXIS, 1.0);
        canvas.text(self.to_canvas(width / 2.0, height + 40.0), X_AXIS_TITLE, Anchor::Middle, TEXT);
        canvas.text(self.to_canvas(0.0, -8.0), Y_AXIS_TITLE, Anchor::Start, TEXT);

        self.draw_layers(canvas, &xs, &ys);
        self.draw_legend(canvas, width);
        self.draw_tooltip(canvas);
    }

    fn draw_x_axis(&self, canvas: &mut impl Canvas, plan: &AxisPlan, xs: &LinearScale, height: f64) {
        for tick in plan.ticks_in(xs.domain()) {
            let x = xs.map(tick.value);
            canvas.line_segment(self.to_canvas(x, 0.0), self.to_canvas(x, height), GRID, 1.0);
            canvas.line_segment(
                self.to_canvas(x, height),
                self.to_canvas(x, height + plan.tick_size(tick.kind)),
                AXIS,
                1.0,
            );
            if !tick.label.is_empty() {
                canvas.text(self.to_canvas(x, height + 18.0), &tick.label, Anchor::Middle, TEXT);
            }
        }
    }

    fn draw_y_axis(&self, canvas: &mut impl Canvas, plan: &AxisPlan, ys: &LinearScale, width: f64) {
        let ticks = plan.y_ticks_in(ys.domain());
        let decimals = match ticks.as_slice() {
            [a, b, ..] if b - a < 1.0 => (-(b - a).log10()).ceil().max(0.0) as usize,
            _ => 0,
        };
        for value in ticks {
            let y = ys.map(value);
            canvas.line_segment(self.to_canvas(0.0, y), self.to_canvas(width, y), GRID, 1.0);
            canvas.line_segment(self.to_canvas(-6.0, y), self.to_canvas(0.0, y), AXIS, 1.0);
            canvas.text(
                self.to_canvas(-9.0, y),
                &format!("{:.*}", decimals, value),
                Anchor::End,
                TEXT,
            );
        }
    }

    fn draw_layers(&self, canvas: &mut impl Canvas, xs: &LinearScale, ys: &LinearScale) {
        let (x_domain, y_domain) = (xs.domain(), ys.domain());
        for layer in &self.scene.layers {
            let visible = layer.visible(x_domain.min, x_domain.max);
            let line: Vec<Pos> = visible
                .iter()
                .map(|p| self.to_canvas(xs.map(p.time), ys.map(p.concentration)))
                .collect();
            if line.len() >= 2 {
                canvas.polyline(&line, layer.color, self.options.line_width);
            }
            for (point, pos) in visible.iter().zip(&line) {
                if x_domain.contains(point.time) && y_domain.contains(point.concentration) {
                    canvas.circle(*pos, self.options.marker_radius, layer.color);
                }
            }
        }
    }

    fn draw_legend(&self, canvas: &mut impl Canvas, width: f64) {
        for (i, entry) in self.scene.legend.iter().enumerate() {
            let y = 10.0 + i as f64 * 16.0;
            canvas.line_segment(
                self.to_canvas(width - 120.0, y),
                self.to_canvas(width - 100.0, y),
                entry.color,
                self.options.line_width,
            );
            canvas.text(self.to_canvas(width - 94.0, y), &entry.label, Anchor::Start, TEXT);
        }
    }

    fn draw_tooltip(&self, canvas: &mut impl Canvas) {
        if let Some(tooltip) = &self.tooltip {
            for (i, line) in tooltip.lines().iter().enumerate() {
                let pos = Pos::new(tooltip.anchor.x + 8.0, tooltip.anchor.y - 8.0 + i as f32 * 14.0);
                canvas.text(pos, line, Anchor::Start, TEXT);
            }
        }
    }
}

fn base_scales(options: &ChartOptions, x: Domain, y: Domain) -> (LinearScale, LinearScale) {
    (
        LinearScale::new(x, (0.0, options.plot_width())),
        LinearScale::new(y, (options.plot_height(), 0.0)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::axis::AxisScalePlanner;
    use crate::chart::scene::CommandBuffer;
    use crate::chart::transform::MIN_SCALE;
    use crate::data::protocol::{LengthUnit, Protocol};
    use crate::simulator::{CompoundSeries, TimeSeriesPoint};
    use chrono::NaiveDate;

    fn result() -> SimulationResult {
        let points: Vec<TimeSeriesPoint> = (0..=48)
            .map(|i| TimeSeriesPoint::new(i as f64, 10.0 * (-(i as f64) / 24.0).exp()))
            .collect();
        SimulationResult {
            total: points.clone(),
            per_compound: vec![CompoundSeries::new("a", points)],
        }
    }

    fn chart_with(protocol: &Protocol) -> InteractiveChart {
        let result = result();
        let plan = AxisScalePlanner::default().plan_result(None, protocol, &result);
        let mut chart = InteractiveChart::default();
        chart.set_data(&result, plan);
        chart
    }

    fn chart() -> InteractiveChart {
        chart_with(&Protocol::new("p", 2.0, LengthUnit::Days))
    }

    #[test]
    fn test_state_machine() {
        let mut chart = InteractiveChart::default();
        assert_eq!(chart.state(), ChartState::Idle);
        chart.pan(10.0, 0.0);
        assert_eq!(chart.state(), ChartState::Idle);

        let mut chart = self::chart();
        assert_eq!(chart.state(), ChartState::Rendering);
        chart.zoom(Pos::new(300.0, 200.0), 2.0);
        assert_eq!(chart.state(), ChartState::Interactive);
        chart.reset();
        assert_eq!(chart.state(), ChartState::Rendering);
        assert!(chart.transform().is_identity());
    }

    #[test]
    fn test_data_change_discards_transform() {
        let mut chart = chart();
        chart.zoom(Pos::new(300.0, 200.0), 3.0);
        let result = result();
        let plan = AxisScalePlanner::default().plan_result(
            None,
            &Protocol::new("p", 2.0, LengthUnit::Days),
            &result,
        );
        chart.set_data(&result, plan);
        assert!(chart.transform().is_identity());
        assert_eq!(chart.state(), ChartState::Rendering);
    }

    #[test]
    fn test_pan_never_shows_negative_time() {
        let mut chart = chart();
        chart.zoom(Pos::new(400.0, 200.0), 4.0);
        chart.pan(10_000.0, 0.0);
        let (x, _) = chart.visible_domains();
        assert!(x.min.abs() < 1e-9);
        assert!((x.width() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_render_draws_axes_and_lines() {
        let chart = chart();
        let mut canvas = CommandBuffer::new();
        chart.render(&mut canvas);

        let texts = canvas.texts();
        assert!(texts.contains(&X_AXIS_TITLE));
        assert!(texts.contains(&Y_AXIS_TITLE));
        assert!(texts.contains(&"Day 1"));
        assert!(texts.contains(&"Total"));
        assert_eq!(canvas.polylines().count(), 2);
        assert_eq!(canvas.circle_count(), 2 * 49);
    }

    #[test]
    fn test_idle_chart_draws_nothing() {
        let mut canvas = CommandBuffer::new();
        InteractiveChart::default().render(&mut canvas);
        assert!(canvas.commands.is_empty());
    }

    #[test]
    fn test_hover_shows_and_hides_tooltip() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut chart = chart_with(&Protocol::new("p", 2.0, LengthUnit::Days).with_start_date(start));
        let xs = chart.x_scale();
        let ys = chart.y_scale();
        let target = Pos::new(
            (xs.map(24.0) + 60.0) as f32 + 1.0,
            (ys.map(10.0 * (-1.0f64).exp()) + 20.0) as f32,
        );

        let tooltip = chart.hover(Some(target)).cloned().unwrap();
        assert_eq!(tooltip.time, 24.0);
        assert_eq!(
            tooltip.lines(),
            vec![
                "Time: 24.00 hours".to_string(),
                "Concentration: 3.68 ng/ml".to_string(),
                "Date: 2024-03-02".to_string(),
            ]
        );

        assert!(chart.hover(None).is_none());
        assert!(chart.hover(Some(Pos::new(-100.0, -100.0))).is_none());
    }

    #[test]
    fn test_zero_zoom_extent_is_bounded() {
        let options = ChartOptions::default().with_zoom_extent(0.0, 20.0);
        assert_eq!(options.zoom_extent, (MIN_SCALE, 20.0));

        // Options may also arrive unchecked through serde
        let options = ChartOptions {
            zoom_extent: (0.0, 20.0),
            ..ChartOptions::default()
        };
        let result = result();
        let plan = AxisScalePlanner::default()
            .plan_result(None, &Protocol::new("p", 2.0, LengthUnit::Days), &result);
        let mut chart = InteractiveChart::new(options);
        chart.set_data(&result, plan);
        for _ in 0..50 {
            chart.zoom(Pos::new(300.0, 200.0), 0.01);
        }
        let (x, y) = chart.visible_domains();
        assert!(x.min.is_finite() && x.max.is_finite());
        assert!(y.min.is_finite() && y.max.is_finite());
        assert!(chart.transform().scale_x >= MIN_SCALE);

        let mut canvas = CommandBuffer::new();
        chart.render(&mut canvas);
    }
}
