//! Hover overlay content and lifecycle.
//!
//! A [`HoverCard`] is computed once per node when the scene is built and
//! attached to the node's group. Showing it goes through [`OverlayState`],
//! which holds at most one overlay at a time.

use serde::Serialize;

use crate::graph::TreeNode;
use crate::layout::Position;

/// Offset of the overlay from the pointer, in page pixels.
pub const POINTER_OFFSET: Position = Position::new(15.0, -10.0);

/// One `label: value` row of a hover card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardRow {
    pub label: String,
    pub value: String,
}

impl CardRow {
    fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

/// A forward probability, as a percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityRow {
    pub label: &'static str,
    pub percent: f64,
}

impl ProbabilityRow {
    /// Percentage with one decimal and a `%` suffix.
    pub fn text(&self) -> String {
        format!("{:.1}%", self.percent)
    }
}

/// Content shown when the pointer rests on a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverCard {
    pub title: String,
    pub rows: Vec<CardRow>,
    /// Up/middle/down, present only when the node carries probabilities.
    pub probabilities: Vec<ProbabilityRow>,
}

impl HoverCard {
    pub fn for_node(node: &TreeNode) -> Self {
        let rows = vec![
            CardRow::new("Spot", format!("{:.6}", node.value)),
            CardRow::new("Option", format!("{:.6}", node.option_value)),
            CardRow::new("Payoff", format!("{:.6}", node.payoff)),
        ];

        let probabilities = node
            .probabilities()
            .map(|p| {
                vec![
                    ProbabilityRow {
                        label: "Up",
                        percent: p.up * 100.0,
                    },
                    ProbabilityRow {
                        label: "Mid",
                        percent: p.mid * 100.0,
                    },
                    ProbabilityRow {
                        label: "Down",
                        percent: p.down * 100.0,
                    },
                ]
            })
            .unwrap_or_default();

        Self {
            title: format!("Step {}", node.step),
            rows,
            probabilities,
        }
    }

    /// Plain-text lines, title first.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(1 + self.rows.len() + self.probabilities.len());
        lines.push(self.title.clone());
        lines.extend(self.rows.iter().map(|row| format!("{}: {}", row.label, row.value)));
        lines.extend(
            self.probabilities
                .iter()
                .map(|p| format!("{}: {}", p.label, p.text())),
        );
        lines
    }
}

/// A hover card placed on the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub card: HoverCard,
    /// Top-left corner in page coordinates.
    pub anchor: Position,
}

impl Overlay {
    /// Place `card` next to the pointer.
    pub fn at_pointer(card: HoverCard, pointer: Position) -> Self {
        Self {
            card,
            anchor: Position::new(pointer.x + POINTER_OFFSET.x, pointer.y + POINTER_OFFSET.y),
        }
    }
}

/// Holder of the single live overlay.
#[derive(Debug, Default)]
pub struct OverlayState {
    current: Option<Overlay>,
}

impl OverlayState {
    /// Replace any live overlay with a new one.
    pub fn show(&mut self, card: HoverCard, pointer: Position) -> &Overlay {
        self.current.insert(Overlay::at_pointer(card, pointer))
    }

    /// Drop the live overlay. Returns whether one existed.
    pub fn hide(&mut self) -> bool {
        self.current.take().is_some()
    }

    pub fn current(&self) -> Option<&Overlay> {
        self.current.as_ref()
    }
}
