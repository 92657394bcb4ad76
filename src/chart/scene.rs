//! Drawing primitives and the retained scene
//!
//! The renderer never talks to a graphics API directly. It issues calls on a
//! [Canvas]; hosts implement it over their painter, and [CommandBuffer] records
//! the calls as [DrawCommand]s.

use serde::{Deserialize, Serialize};

use crate::simulator::{SimulationResult, TimeSeriesPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

pub const GRID: Color = Color::rgb(0xdd, 0xdd, 0xdd);
pub const AXIS: Color = Color::rgb(0x33, 0x33, 0x33);
pub const TEXT: Color = Color::rgb(0x22, 0x22, 0x22);

/// Categorical palette (d3 `schemeCategory10`)
pub const PALETTE: [Color; 10] = [
    Color::rgb(0x1f, 0x77, 0xb4),
    Color::rgb(0xff, 0x7f, 0x0e),
    Color::rgb(0x2c, 0xa0, 0x2c),
    Color::rgb(0xd6, 0x27, 0x28),
    Color::rgb(0x94, 0x67, 0xbd),
    Color::rgb(0x8c, 0x56, 0x4b),
    Color::rgb(0xe3, 0x77, 0xc2),
    Color::rgb(0x7f, 0x7f, 0x7f),
    Color::rgb(0xbc, 0xbd, 0x22),
    Color::rgb(0x17, 0xbe, 0xcf),
];

/// Color of the total curve
pub fn total_color() -> Color {
    PALETTE[0]
}

/// Color of the `index`-th compared compound
pub fn compound_color(index: usize) -> Color {
    PALETTE[(index + 1) % PALETTE.len()]
}

/// A canvas position in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pos {
    pub x: f32,
    pub y: f32,
}

impl Pos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Pos) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Horizontal text alignment relative to the given position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

/// A surface the chart can be drawn on
pub trait Canvas {
    fn polyline(&mut self, points: &[Pos], color: Color, width: f32);
    fn line_segment(&mut self, from: Pos, to: Pos, color: Color, width: f32);
    fn circle(&mut self, center: Pos, radius: f32, color: Color);
    fn text(&mut self, pos: Pos, text: &str, anchor: Anchor, color: Color);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Polyline {
        points: Vec<Pos>,
        color: Color,
        width: f32,
    },
    Line {
        from: Pos,
        to: Pos,
        color: Color,
        width: f32,
    },
    Circle {
        center: Pos,
        radius: f32,
        color: Color,
    },
    Text {
        pos: Pos,
        text: String,
        anchor: Anchor,
        color: Color,
    },
}

/// A [Canvas] that records every call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandBuffer {
    pub commands: Vec<DrawCommand>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// All text drawn, in order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn polylines(&self) -> impl Iterator<Item = (&[Pos], Color)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Polyline { points, color, .. } => Some((points.as_slice(), *color)),
            _ => None,
        })
    }

    pub fn circle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count()
    }

    /// Replay the recorded commands onto another canvas
    pub fn replay(&self, canvas: &mut impl Canvas) {
        for command in &self.commands {
            match command {
                DrawCommand::Polyline {
                    points,
                    color,
                    width,
                } => canvas.polyline(points, *color, *width),
                DrawCommand::Line {
                    from,
                    to,
                    color,
                    width,
                } => canvas.line_segment(*from, *to, *color, *width),
                DrawCommand::Circle {
                    center,
                    radius,
                    color,
                } => canvas.circle(*center, *radius, *color),
                DrawCommand::Text {
                    pos,
                    text,
                    anchor,
                    color,
                } => canvas.text(*pos, text, *anchor, *color),
            }
        }
    }
}

impl Canvas for CommandBuffer {
    fn polyline(&mut self, points: &[Pos], color: Color, width: f32) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            color,
            width,
        });
    }

    fn line_segment(&mut self, from: Pos, to: Pos, color: Color, width: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn circle(&mut self, center: Pos, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn text(&mut self, pos: Pos, text: &str, anchor: Anchor, color: Color) {
        self.commands.push(DrawCommand::Text {
            pos,
            text: text.to_string(),
            anchor,
            color,
        });
    }
}

/// One plotted curve, stored in data coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesLayer {
    pub name: String,
    pub color: Color,
    pub points: Vec<TimeSeriesPoint>,
}

impl SeriesLayer {
    /// Points whose time falls in `[min, max]`, plus one neighbour on each side
    /// so the line runs to the plot edge
    pub fn visible(&self, min: f64, max: f64) -> &[TimeSeriesPoint] {
        let start = self.points.partition_point(|p| p.time < min).saturating_sub(1);
        let end = (self.points.partition_point(|p| p.time <= max) + 1).min(self.points.len());
        if start >= end {
            return &[];
        }
        &self.points[start..end]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
}

/// Everything derived from one data change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub layers: Vec<SeriesLayer>,
    pub legend: Vec<LegendEntry>,
}

impl Scene {
    pub const TOTAL_LABEL: &'static str = "Total";

    /// Build the layers for a result: the total first, then each compared compound
    ///
    /// The legend is only filled when there is at least one compared compound.
    pub fn from_result(result: &SimulationResult) -> Self {
        let mut layers = Vec::with_capacity(result.per_compound.len() + 1);
        if !result.total.is_empty() {
            layers.push(SeriesLayer {
                name: Self::TOTAL_LABEL.to_string(),
                color: total_color(),
                points: result.total.clone(),
            });
        }
        for (i, series) in result.per_compound.iter().enumerate() {
            layers.push(SeriesLayer {
                name: series.name.clone(),
                color: compound_color(i),
                points: series.points.clone(),
            });
        }

        let legend = if result.per_compound.is_empty() {
            Vec::new()
        } else {
            layers
                .iter()
                .map(|layer| LegendEntry {
                    label: layer.name.clone(),
                    color: layer.color,
                })
                .collect()
        };

        Self { layers, legend }
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::CompoundSeries;

    fn points(n: usize) -> Vec<TimeSeriesPoint> {
        (0..n).map(|i| TimeSeriesPoint::new(i as f64, 1.0)).collect()
    }

    #[test]
    fn test_palette_assignment() {
        assert_eq!(total_color().to_hex(), "#1f77b4");
        assert_eq!(compound_color(0).to_hex(), "#ff7f0e");
        assert_eq!(compound_color(9), PALETTE[0]);
    }

    #[test]
    fn test_scene_layers_and_legend() {
        let result = SimulationResult {
            total: points(3),
            per_compound: vec![
                CompoundSeries::new("a", points(3)),
                CompoundSeries::new("b", points(3)),
            ],
        };
        let scene = Scene::from_result(&result);
        assert_eq!(scene.layers.len(), 3);
        let labels: Vec<&str> = scene.legend.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Total", "a", "b"]);
        assert_ne!(scene.legend[1].color, scene.legend[2].color);

        let total_only = SimulationResult {
            total: points(3),
            per_compound: Vec::new(),
        };
        assert!(Scene::from_result(&total_only).legend.is_empty());
    }

    #[test]
    fn test_visible_slice() {
        let layer = SeriesLayer {
            name: "t".into(),
            color: total_color(),
            points: points(10),
        };
        let visible = layer.visible(3.5, 6.0);
        assert_eq!(visible.first().map(|p| p.time), Some(3.0));
        assert_eq!(visible.last().map(|p| p.time), Some(7.0));
        assert_eq!(layer.visible(0.0, 100.0).len(), 10);
        assert_eq!(layer.visible(20.0, 30.0).len(), 1);
    }

    #[test]
    fn test_command_buffer_replay() {
        let mut buffer = CommandBuffer::new();
        buffer.line_segment(Pos::new(0.0, 0.0), Pos::new(1.0, 1.0), AXIS, 1.0);
        buffer.text(Pos::new(0.0, 0.0), "Time", Anchor::Middle, TEXT);
        buffer.circle(Pos::new(2.0, 2.0), 3.0, total_color());

        let mut copy = CommandBuffer::new();
        buffer.replay(&mut copy);
        assert_eq!(copy, buffer);
        assert_eq!(copy.texts(), vec!["Time"]);
        assert_eq!(copy.circle_count(), 1);
    }
}
