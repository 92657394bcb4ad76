use eframe::{
    egui::{self, Align2, Color32, FontId, Painter, Pos2, Sense, Stroke},
    App,
};

use super::renderer::{ChartOptions, InteractiveChart};
use super::scene::{Anchor, Canvas, Color, Pos};
use crate::context::SimulationContext;
use crate::simulator::SimulationError;

/// [Canvas] over an egui painter, offset to the allocated rect
struct PainterCanvas<'a> {
    painter: &'a Painter,
    origin: Pos2,
}

impl PainterCanvas<'_> {
    fn pos(&self, pos: Pos) -> Pos2 {
        Pos2::new(self.origin.x + pos.x, self.origin.y + pos.y)
    }
}

fn color32(color: Color) -> Color32 {
    Color32::from_rgb(color.r, color.g, color.b)
}

impl Canvas for PainterCanvas<'_> {
    fn polyline(&mut self, points: &[Pos], color: Color, width: f32) {
        let points = points.iter().map(|p| self.pos(*p)).collect();
        self.painter
            .add(egui::Shape::line(points, Stroke::new(width, color32(color))));
    }

    fn line_segment(&mut self, from: Pos, to: Pos, color: Color, width: f32) {
        self.painter.line_segment(
            [self.pos(from), self.pos(to)],
            Stroke::new(width, color32(color)),
        );
    }

    fn circle(&mut self, center: Pos, radius: f32, color: Color) {
        self.painter
            .circle_filled(self.pos(center), radius, color32(color));
    }

    fn text(&mut self, pos: Pos, text: &str, anchor: Anchor, color: Color) {
        let align = match anchor {
            Anchor::Start => Align2::LEFT_CENTER,
            Anchor::Middle => Align2::CENTER_CENTER,
            Anchor::End => Align2::RIGHT_CENTER,
        };
        self.painter.text(
            self.pos(pos),
            align,
            text,
            FontId::proportional(12.0),
            color32(color),
        );
    }
}

/// A native window showing one simulated protocol
///
/// Drag pans, ctrl+scroll or pinch zooms around the pointer, double-click resets
/// the view and hovering a marker shows its tooltip.
pub struct ChartWindow {
    title: String,
    chart: InteractiveChart,
}

impl ChartWindow {
    /// Simulate the context's protocol and load it into a new chart
    pub fn new(context: &SimulationContext) -> Result<Self, SimulationError> {
        let mut chart = InteractiveChart::new(ChartOptions::default());
        context.render_into(&mut chart)?;
        Ok(Self {
            title: context.protocol.name.clone(),
            chart,
        })
    }

    pub fn chart(&self) -> &InteractiveChart {
        &self.chart
    }

    pub fn run(self) -> eframe::Result {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([900.0, 520.0])
                .with_resizable(true)
                .with_min_inner_size([320.0, 240.0]),
            ..Default::default()
        };
        let title = self.title.clone();
        eframe::run_native(&title, options, Box::new(|_cc| Ok(Box::new(self))))
    }
}

impl App for ChartWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::WHITE))
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
                let rect = response.rect;
                self.chart
                    .resize(rect.width() as f64, rect.height() as f64);

                let local = |p: Pos2| Pos::new(p.x - rect.min.x, p.y - rect.min.y);

                if response.double_clicked() {
                    self.chart.reset();
                } else if response.dragged() {
                    let delta = response.drag_delta();
                    self.chart.pan(delta.x as f64, delta.y as f64);
                }

                if let Some(pointer) = response.hover_pos() {
                    let zoom = ui.input(|i| i.zoom_delta());
                    if zoom != 1.0 {
                        self.chart.zoom(local(pointer), zoom as f64);
                    }
                }

                self.chart.hover(response.hover_pos().map(local));

                let mut canvas = PainterCanvas {
                    painter: &painter,
                    origin: rect.min,
                };
                self.chart.render(&mut canvas);
            });
    }
}
