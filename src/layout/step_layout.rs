//! Step layout engine.
//!
//! Groups the nodes of a tree by step, asks the level-of-detail policy how
//! much to draw, and places every node with the geometry model. Nothing is
//! retained between two calls: each dataset is laid out from scratch.

use serde::{Deserialize, Serialize};

use super::geometry::{self, Frame, PositionMap};
use super::lod::{DetailPolicy, DetailProfile};
use crate::graph::TreeGraph;

/// Configuration for the step layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepLayoutConfig {
    /// Horizontal offset of the root column (default: 50.0).
    pub margin: f64,
    /// Minimum vertical distance between two nodes of a step (default: 20.0).
    pub min_spacing: f64,
}

impl Default for StepLayoutConfig {
    fn default() -> Self {
        Self {
            margin: 50.0,
            min_spacing: 20.0,
        }
    }
}

/// Result of a layout pass.
#[derive(Debug, Clone)]
pub struct TreeLayout {
    /// One position per node; empty when the profile says not to render.
    pub positions: PositionMap,
    pub profile: DetailProfile,
    pub frame: Frame,
    /// Node count of the busiest step.
    pub max_nodes_in_any_step: usize,
}

/// The step layout engine.
#[derive(Debug, Clone, Default)]
pub struct StepLayout {
    config: StepLayoutConfig,
    policy: DetailPolicy,
}

impl StepLayout {
    /// Create a new step layout with the given configuration and policy.
    pub fn new(config: StepLayoutConfig, policy: DetailPolicy) -> Self {
        Self { config, policy }
    }

    /// Lay out a tree inside a `width × height` container.
    pub fn compute(&self, graph: &TreeGraph<'_>, width: f64, height: f64) -> TreeLayout {
        let n = graph.depth();
        let profile = self.policy.profile(n);
        let frame = Frame {
            width,
            height,
            margin: self.config.margin,
            min_spacing: self.config.min_spacing,
        };

        if !profile.render {
            log::debug!("N={n} exceeds the render limit, skipping geometry");
            return TreeLayout {
                positions: PositionMap::new(),
                profile,
                frame,
                max_nodes_in_any_step: 0,
            };
        }

        let partition = graph.nodes_by_step();
        let max_nodes_in_any_step = partition.values().map(Vec::len).max().unwrap_or(0);
        let positions = geometry::step_positions(&partition, &frame, n);

        log::debug!(
            "laid out {} nodes over {} steps (busiest step {}, scale {:.2})",
            positions.len(),
            partition.len(),
            max_nodes_in_any_step,
            profile.scale
        );

        TreeLayout {
            positions,
            profile,
            frame,
            max_nodes_in_any_step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Direction, NodeId, TreeDataset, TreeEdge, TreeNode, TreeParams};
    use crate::layout::Position;

    /// Full trinomial tree of depth `n` with ids `"<step>_<row>"`.
    fn full_tree(n: u32) -> TreeDataset {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        for step in 0..=n {
            for row in 0..(2 * step + 1) {
                nodes.push(TreeNode {
                    id: NodeId::new(format!("{step}_{row}")),
                    step,
                    value: 100.0 + f64::from(row),
                    option_value: 1.0,
                    payoff: 0.0,
                    prob_up: None,
                    prob_mid: None,
                    prob_down: None,
                });
                if step < n {
                    for (offset, direction) in
                        [(0, Direction::Up), (1, Direction::Middle), (2, Direction::Down)]
                    {
                        edges.push(TreeEdge {
                            source: NodeId::new(format!("{step}_{row}")),
                            target: NodeId::new(format!("{}_{}", step + 1, row + offset)),
                            direction,
                            probability: Some(1.0 / 3.0),
                        });
                    }
                }
            }
        }
        TreeDataset {
            nodes,
            edges,
            tree_params: TreeParams { n, final_price: 1.0 },
        }
    }

    #[test]
    fn test_layout_totality() {
        let dataset = full_tree(4);
        let graph = TreeGraph::build(&dataset);
        let layout = StepLayout::default().compute(&graph, 1000.0, 600.0);

        assert_eq!(layout.max_nodes_in_any_step, 9);
        assert_eq!(layout.positions.len(), 25);
        assert!(dataset.nodes.iter().all(|n| layout.positions.contains_key(&n.id)));
        assert!(graph.anomalies().is_empty());
    }

    #[test]
    fn test_layout_is_deterministic() {
        let dataset = full_tree(6);
        let graph = TreeGraph::build(&dataset);
        let engine = StepLayout::default();

        let first = engine.compute(&graph, 800.0, 500.0);
        let second = engine.compute(&graph, 800.0, 500.0);
        assert_eq!(first.positions, second.positions);
        assert_eq!(first.profile, second.profile);
    }

    #[test]
    fn test_single_node_tree() {
        let dataset = full_tree(0);
        let graph = TreeGraph::build(&dataset);
        let layout = StepLayout::default().compute(&graph, 1000.0, 600.0);

        assert_eq!(layout.positions.len(), 1);
        assert_eq!(layout.positions[&NodeId::from("0_0")], Position::new(50.0, 300.0));
    }

    #[test]
    fn test_oversized_tree_skips_geometry() {
        let dataset = full_tree(51);
        let graph = TreeGraph::build(&dataset);
        let layout = StepLayout::default().compute(&graph, 1000.0, 600.0);

        assert!(!layout.profile.render);
        assert!(layout.positions.is_empty());
    }

    #[test]
    fn test_root_is_centred_on_first_column() {
        let dataset = full_tree(3);
        let graph = TreeGraph::build(&dataset);
        let layout = StepLayout::default().compute(&graph, 1000.0, 600.0);

        let root = layout.positions[&NodeId::from("0_0")];
        let middle_leaf = layout.positions[&NodeId::from("3_3")];
        assert_eq!(root.y, 300.0);
        assert_eq!(middle_leaf.y, 300.0);
        assert_eq!(middle_leaf.x, 3.0 * 250.0 + 50.0);
    }
}
