//! Headless surface that renders scenes to an SVG document.
//!
//! Used for export and for exercising the whole draw path without a
//! browser. The surface keeps the primitives it was given, so the document
//! can be regenerated at any time with the current transform and overlay.

use svg::Document;
use svg::node::element::{Circle as SvgCircle, Group, Line as SvgLine, Rectangle, Text};

use super::command::{Label, NodeGroup, Primitive, Scene};
use super::overlay::Overlay;
use super::DrawSurface;
use crate::error::ViewError;
use crate::viewport::{Size, ViewportTransform};

/// Line height of the overlay text.
const OVERLAY_LINE: f64 = 16.0;

/// An in-memory drawing surface.
#[derive(Debug, Clone)]
pub struct MarkupSurface {
    size: Size,
    primitives: Vec<Primitive>,
    transform: ViewportTransform,
    last_duration_ms: u32,
    overlay: Option<Overlay>,
}

impl MarkupSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            primitives: Vec::new(),
            transform: ViewportTransform::IDENTITY,
            last_duration_ms: 0,
            overlay: None,
        }
    }

    /// Primitives currently drawn.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn contains(&self, key: &str) -> bool {
        self.primitives.iter().any(|p| p.key() == key)
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    /// Duration of the last applied transform.
    pub fn last_duration_ms(&self) -> u32 {
        self.last_duration_ms
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    /// Build the SVG document.
    pub fn to_document(&self) -> Document {
        let mut root = Group::new()
            .set("class", "viewport")
            .set("transform", self.transform.svg_attribute());
        for primitive in &self.primitives {
            root = match primitive {
                Primitive::Line(line) => root.add(
                    SvgLine::new()
                        .set("data-key", line.key.as_str())
                        .set("class", line.class)
                        .set("x1", line.from.x)
                        .set("y1", line.from.y)
                        .set("x2", line.to.x)
                        .set("y2", line.to.y)
                        .set("stroke", line.color.hex())
                        .set("stroke-width", line.width)
                        .set("stroke-opacity", line.opacity),
                ),
                Primitive::Label(label) => root.add(text(label)),
                Primitive::Node(node) => root.add(node_group(node)),
            };
        }

        let mut document = Document::new()
            .set("xmlns", "http://www.w3.org/2000/svg")
            .set("width", self.size.width)
            .set("height", self.size.height)
            .set(
                "viewBox",
                format!("0 0 {} {}", self.size.width, self.size.height),
            )
            .add(root);

        if let Some(overlay) = &self.overlay {
            document = document.add(overlay_group(overlay));
        }
        document
    }

    /// Serialized SVG markup.
    pub fn to_svg_string(&self) -> String {
        self.to_document().to_string()
    }
}

fn text(label: &Label) -> Text {
    Text::new(label.content.as_str())
        .set("data-key", label.key.as_str())
        .set("class", label.class)
        .set("x", label.position.x)
        .set("y", label.position.y)
        .set("dy", label.dy)
        .set("font-size", label.font_size)
        .set("font-weight", u32::from(label.font_weight))
        .set("fill", label.color.hex())
        .set("text-anchor", label.anchor.as_str())
}

fn node_group(node: &NodeGroup) -> Group {
    let circle = &node.circle;
    let mut group = Group::new()
        .set("data-key", node.key.as_str())
        .set("class", node.class)
        .set(
            "transform",
            format!("translate({},{})", node.translate.x, node.translate.y),
        )
        .add(
            SvgCircle::new()
                .set("cx", circle.center.x)
                .set("cy", circle.center.y)
                .set("r", circle.radius)
                .set("fill", circle.fill.hex())
                .set("stroke", circle.stroke.hex())
                .set("stroke-width", circle.stroke_width),
        );
    for label in &node.labels {
        group = group.add(text(label));
    }
    group
}

fn overlay_group(overlay: &Overlay) -> Group {
    let lines = overlay.card.lines();
    let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let mut group = Group::new().set("class", "tooltip").add(
        Rectangle::new()
            .set("x", overlay.anchor.x)
            .set("y", overlay.anchor.y)
            .set("width", widest as f64 * 7.0 + 16.0)
            .set("height", lines.len() as f64 * OVERLAY_LINE + 8.0)
            .set("fill", "#1e1e1e")
            .set("fill-opacity", 0.9),
    );
    for (row, line) in lines.into_iter().enumerate() {
        group = group.add(
            Text::new(line)
                .set("x", overlay.anchor.x + 8.0)
                .set("y", overlay.anchor.y + (row as f64 + 1.0) * OVERLAY_LINE)
                .set("font-size", 12)
                .set("fill", "#ffffff"),
        );
    }
    group
}

impl DrawSurface for MarkupSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self) -> Result<(), ViewError> {
        self.primitives.clear();
        self.overlay = None;
        Ok(())
    }

    fn draw(&mut self, scene: &Scene) -> Result<(), ViewError> {
        self.primitives.extend(scene.primitives.iter().cloned());
        Ok(())
    }

    fn set_transform(
        &mut self,
        transform: ViewportTransform,
        duration_ms: u32,
    ) -> Result<(), ViewError> {
        self.transform = transform;
        self.last_duration_ms = duration_ms;
        Ok(())
    }

    fn show_overlay(&mut self, overlay: &Overlay) -> Result<(), ViewError> {
        self.overlay = Some(overlay.clone());
        Ok(())
    }

    fn hide_overlay(&mut self) -> Result<(), ViewError> {
        self.overlay = None;
        Ok(())
    }
}
