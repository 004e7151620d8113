//! Draw commands.
//!
//! A [`Scene`] is a flat, ordered list of primitives. Later primitives are
//! painted over earlier ones, so the pipeline emits edges, then edge labels,
//! then node groups. Every primitive carries a key that is stable for a
//! given dataset.

use serde::Serialize;

use super::overlay::HoverCard;
use crate::layout::Position;
use crate::viewport::Bounds;

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` form.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Colours used by the tree diagram.
pub mod palette {
    use super::Color;

    pub const UP: Color = Color::rgb(0x66, 0xff, 0x66);
    pub const MIDDLE: Color = Color::rgb(0x66, 0xcc, 0xff);
    pub const DOWN: Color = Color::rgb(0xff, 0x66, 0x66);
    pub const NEUTRAL: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const ROOT: Color = UP;
    pub const INTERIOR: Color = MIDDLE;
    pub const LEAF: Color = DOWN;
    pub const NODE_STROKE: Color = NEUTRAL;

    pub const NODE_TEXT: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const MESSAGE: Color = NEUTRAL;
    pub const MESSAGE_DETAIL: Color = Color::rgb(0xcc, 0xcc, 0xcc);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// A straight line segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub key: String,
    pub class: &'static str,
    pub from: Position,
    pub to: Position,
    pub color: Color,
    pub width: f64,
    pub opacity: f64,
}

/// A run of text. `dy` shifts it vertically in pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub key: String,
    pub class: &'static str,
    pub position: Position,
    pub dy: f64,
    pub content: String,
    pub font_size: f64,
    pub font_weight: u16,
    pub color: Color,
    pub anchor: TextAnchor,
}

impl Label {
    /// Approximate glyph extent, assuming an average advance of 0.6 em.
    fn extent(&self) -> Option<(Position, Position)> {
        if self.content.is_empty() {
            return None;
        }
        let width = self.content.chars().count() as f64 * self.font_size * 0.6;
        let left = match self.anchor {
            TextAnchor::Start => self.position.x,
            TextAnchor::Middle => self.position.x - width / 2.0,
            TextAnchor::End => self.position.x - width,
        };
        let baseline = self.position.y + self.dy;
        Some((
            Position::new(left, baseline - self.font_size),
            Position::new(left + width, baseline),
        ))
    }
}

/// A filled circle with an outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Circle {
    pub center: Position,
    pub radius: f64,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f64,
}

/// A node: circle and text translated to the node position, with the hover
/// card it shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeGroup {
    pub key: String,
    pub class: &'static str,
    pub translate: Position,
    pub circle: Circle,
    /// Positioned relative to `translate`.
    pub labels: Vec<Label>,
    pub hover: HoverCard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Primitive {
    Line(Line),
    Label(Label),
    Node(NodeGroup),
}

impl Primitive {
    pub fn key(&self) -> &str {
        match self {
            Primitive::Line(line) => &line.key,
            Primitive::Label(label) => &label.key,
            Primitive::Node(node) => &node.key,
        }
    }

    /// World-space extent of what the primitive paints, if anything.
    fn extent(&self) -> Option<(Position, Position)> {
        match self {
            Primitive::Line(line) => Some((
                Position::new(line.from.x.min(line.to.x), line.from.y.min(line.to.y)),
                Position::new(line.from.x.max(line.to.x), line.from.y.max(line.to.y)),
            )),
            Primitive::Label(label) => label.extent(),
            Primitive::Node(node) => {
                let c = &node.circle;
                let r = c.radius + c.stroke_width / 2.0;
                let mut min = Position::new(c.center.x - r, c.center.y - r);
                let mut max = Position::new(c.center.x + r, c.center.y + r);
                for (lo, hi) in node.labels.iter().filter_map(Label::extent) {
                    min = Position::new(min.x.min(lo.x), min.y.min(lo.y));
                    max = Position::new(max.x.max(hi.x), max.y.max(hi.y));
                }
                let t = node.translate;
                Some((
                    Position::new(min.x + t.x, min.y + t.y),
                    Position::new(max.x + t.x, max.y + t.y),
                ))
            }
        }
    }
}

/// An ordered list of primitives ready for a surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scene {
    pub primitives: Vec<Primitive>,
}

impl Scene {
    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Look a primitive up by key.
    pub fn get(&self, key: &str) -> Option<&Primitive> {
        self.primitives.iter().find(|p| p.key() == key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeGroup> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Node(node) => Some(node),
            _ => None,
        })
    }

    /// Union of the painted extents, `None` when nothing is painted.
    pub fn bounds(&self) -> Option<Bounds> {
        self.primitives
            .iter()
            .filter_map(Primitive::extent)
            .fold(None, |acc: Option<Bounds>, (min, max)| {
                let mut bounds = acc.unwrap_or_else(|| Bounds::at(min));
                bounds.include(min, max);
                Some(bounds)
            })
    }
}
