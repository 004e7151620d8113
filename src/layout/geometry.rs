//! Geometry of a step-indexed tree.
//!
//! Pure functions: theoretical node counts of an unpruned trinomial tree and
//! the column/row placement of nodes inside a rectangular frame.
//!
//! Nodes of step `k` sit on the vertical line
//! `x = k * width / (N + 1) + margin`. Within a step they are spaced by a
//! single `step_height` shared by every step, derived from the busiest step,
//! and the step's group is centred vertically in the frame.

use std::collections::HashMap;

use serde::Serialize;

use crate::graph::{NodeId, StepPartition};

/// A point in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Midpoint between two positions.
    #[inline]
    pub fn midpoint(self, other: Position) -> Position {
        Position::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Node id to position.
pub type PositionMap = HashMap<NodeId, Position>;

/// The rectangle the tree is laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    /// Horizontal offset of step 0.
    pub margin: f64,
    /// Lower bound on the vertical distance between siblings of a step.
    pub min_spacing: f64,
}

/// Number of nodes of an unpruned trinomial tree of depth `n`.
///
/// Step `i` holds `2i + 1` nodes, so the total is `Σ (2i + 1) = (n + 1)²`.
pub fn theoretical_node_count(n: u32) -> u64 {
    let steps = u64::from(n) + 1;
    steps.saturating_mul(steps)
}

/// Vertical distance between siblings for a tree whose busiest step holds
/// `max_nodes_in_any_step` nodes.
pub fn step_height(frame: &Frame, max_nodes_in_any_step: usize) -> f64 {
    let rows = max_nodes_in_any_step as f64 + 1.0;
    frame.min_spacing.max(frame.height / rows)
}

/// Assign a position to every node of the partition.
///
/// Deterministic and total: every node of the input gets exactly one entry.
pub fn step_positions(partition: &StepPartition<'_>, frame: &Frame, n: u32) -> PositionMap {
    let step_width = frame.width / (f64::from(n) + 1.0);
    let max_nodes = partition.values().map(Vec::len).max().unwrap_or(0);
    let spacing = step_height(frame, max_nodes);

    let mut positions = PositionMap::with_capacity(partition.values().map(Vec::len).sum());
    for (&step, nodes) in partition {
        let x = f64::from(step) * step_width + frame.margin;
        let count = nodes.len() as f64;
        let start_y = (frame.height - (count - 1.0) * spacing) / 2.0;

        for (index, node) in nodes.iter().enumerate() {
            let y = start_y + index as f64 * spacing;
            positions.insert(node.id.clone(), Position::new(x, y));
        }
    }

    positions
}

/// How many nodes the pruning threshold removed from the full tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PruningReport {
    pub theoretical: u64,
    pub ignored: u64,
    /// Share of the full tree that was ignored, in percent.
    pub percentage: f64,
}

impl PruningReport {
    /// Compare the number of nodes actually received with the full tree.
    ///
    /// When the pricer had to fall back to a looser threshold it reports how
    /// many nodes the original threshold would have ignored; that figure
    /// takes precedence.
    pub fn new(n: u32, actual_nodes: usize, ignored_by_original_threshold: Option<u64>) -> Self {
        let theoretical = theoretical_node_count(n);
        let ignored = match ignored_by_original_threshold {
            Some(count) if count > 0 => count,
            _ => theoretical.saturating_sub(actual_nodes as u64),
        };
        let percentage = (ignored as f64 / theoretical as f64 * 100.0).max(0.0);

        Self {
            theoretical,
            ignored,
            percentage,
        }
    }

    /// Percentage with one decimal, as shown next to the ignored count.
    pub fn percentage_label(&self) -> String {
        format!("{:.1}", self.percentage)
    }
}
