//! TreeGraph - indexed view over a validated dataset.
//!
//! The TreeGraph stores the tree topology using petgraph's StableGraph so
//! that nodes can be looked up by id, grouped by step and checked against
//! the structural invariants of a trinomial tree. It borrows the dataset and
//! never mutates it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Directed;

use super::dataset::TreeDataset;
use super::edge::{Direction, TreeEdge};
use super::node::{NodeId, TreeNode};

/// Nodes grouped by step, ordered by step. Inside a step the input order is
/// preserved.
pub type StepPartition<'a> = BTreeMap<u32, Vec<&'a TreeNode>>;

/// A violated structural invariant. Anomalies are reported, never fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum Anomaly {
    /// The tree should have exactly one step-0 node.
    RootCount(usize),
    /// Two nodes share the same id; the later one wins lookups.
    DuplicateId(NodeId),
    /// An edge does not go from step k to step k + 1.
    StepMismatch {
        edge: String,
        source_step: u32,
        target_step: u32,
    },
    /// An edge endpoint is not in the node set.
    DanglingEdge { edge: String, missing: NodeId },
    /// A node lies beyond the tree depth.
    BeyondDepth { id: NodeId, step: u32 },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::RootCount(count) => write!(f, "expected one root node, found {count}"),
            Anomaly::DuplicateId(id) => write!(f, "duplicate node id {id}"),
            Anomaly::StepMismatch {
                edge,
                source_step,
                target_step,
            } => write!(f, "{edge} links step {source_step} to step {target_step}"),
            Anomaly::DanglingEdge { edge, missing } => {
                write!(f, "{edge} references unknown node {missing}")
            }
            Anomaly::BeyondDepth { id, step } => write!(f, "node {id} at step {step} is beyond N"),
        }
    }
}

/// Indexed tree topology.
pub struct TreeGraph<'a> {
    dataset: &'a TreeDataset,

    /// Node weight is the position of the node in `dataset.nodes`,
    /// edge weight is the branch direction.
    graph: StableGraph<usize, Direction, Directed>,

    /// Map from node id to petgraph NodeIndex
    index_of: HashMap<&'a NodeId, NodeIndex>,

    /// Positions in `dataset.edges` of edges with a missing endpoint
    dangling: Vec<usize>,

    duplicates: Vec<&'a NodeId>,
}

impl<'a> TreeGraph<'a> {
    /// Index a dataset.
    pub fn build(dataset: &'a TreeDataset) -> Self {
        let mut graph =
            StableGraph::with_capacity(dataset.nodes.len(), dataset.edges.len());
        let mut index_of = HashMap::with_capacity(dataset.nodes.len());
        let mut duplicates = Vec::new();

        for (slot, node) in dataset.nodes.iter().enumerate() {
            let index = graph.add_node(slot);
            if index_of.insert(&node.id, index).is_some() {
                duplicates.push(&node.id);
            }
        }

        let mut dangling = Vec::new();
        for (position, edge) in dataset.edges.iter().enumerate() {
            match (index_of.get(&edge.source), index_of.get(&edge.target)) {
                (Some(&source), Some(&target)) => {
                    graph.add_edge(source, target, edge.direction);
                }
                _ => dangling.push(position),
            }
        }

        Self {
            dataset,
            graph,
            index_of,
            dangling,
            duplicates,
        }
    }

    /// The dataset this graph indexes.
    #[inline]
    pub fn dataset(&self) -> &'a TreeDataset {
        self.dataset
    }

    /// Tree depth N.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.dataset.depth()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges whose endpoints both exist.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&'a TreeNode> {
        let index = self.index_of.get(id)?;
        let slot = *self.graph.node_weight(*index)?;
        self.dataset.nodes.get(slot)
    }

    /// Whether a node id exists.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.index_of.contains_key(id)
    }

    /// Edges with at least one missing endpoint.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &'a TreeEdge> + '_ {
        let dataset: &'a TreeDataset = self.dataset;
        self.dangling.iter().map(move |&i| &dataset.edges[i])
    }

    /// Group the nodes by step.
    pub fn nodes_by_step(&self) -> StepPartition<'a> {
        let mut partition: StepPartition<'a> = BTreeMap::new();
        for node in &self.dataset.nodes {
            partition.entry(node.step).or_default().push(node);
        }
        partition
    }

    /// Check the structural invariants of a trinomial tree.
    pub fn anomalies(&self) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();
        let depth = self.depth();

        let roots = self.dataset.nodes.iter().filter(|n| n.step == 0).count();
        if roots != 1 {
            anomalies.push(Anomaly::RootCount(roots));
        }

        for id in &self.duplicates {
            anomalies.push(Anomaly::DuplicateId((*id).clone()));
        }

        for node in &self.dataset.nodes {
            if node.step > depth {
                anomalies.push(Anomaly::BeyondDepth {
                    id: node.id.clone(),
                    step: node.step,
                });
            }
        }

        for edge in self.graph.edge_references() {
            let source = &self.dataset.nodes[self.graph[edge.source()]];
            let target = &self.dataset.nodes[self.graph[edge.target()]];
            if source.step + 1 != target.step {
                anomalies.push(Anomaly::StepMismatch {
                    edge: format!("edge:{}->{}", source.id, target.id),
                    source_step: source.step,
                    target_step: target.step,
                });
            }
        }

        for edge in self.dangling_edges() {
            let missing = if self.contains(&edge.source) {
                edge.target.clone()
            } else {
                edge.source.clone()
            };
            anomalies.push(Anomaly::DanglingEdge {
                edge: edge.key(),
                missing,
            });
        }

        anomalies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{TreeEdge, TreeParams};

    fn node(id: &str, step: u32) -> TreeNode {
        TreeNode {
            id: NodeId::from(id),
            step,
            value: 100.0,
            option_value: 5.0,
            payoff: 0.0,
            prob_up: None,
            prob_mid: None,
            prob_down: None,
        }
    }

    fn edge(source: &str, target: &str, direction: Direction) -> TreeEdge {
        TreeEdge {
            source: NodeId::from(source),
            target: NodeId::from(target),
            direction,
            probability: Some(1.0 / 3.0),
        }
    }

    fn one_step_tree() -> TreeDataset {
        TreeDataset {
            nodes: vec![node("r", 0), node("u", 1), node("m", 1), node("d", 1)],
            edges: vec![
                edge("r", "u", Direction::Up),
                edge("r", "m", Direction::Middle),
                edge("r", "d", Direction::Down),
            ],
            tree_params: TreeParams {
                n: 1,
                final_price: 5.0,
            },
        }
    }

    #[test]
    fn test_build_and_lookup() {
        let dataset = one_step_tree();
        let graph = TreeGraph::build(&dataset);

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.node(&NodeId::from("m")).map(|n| n.step), Some(1));
        assert!(graph.node(&NodeId::from("zz")).is_none());
        assert!(graph.anomalies().is_empty());
    }

    #[test]
    fn test_nodes_by_step_preserves_order() {
        let dataset = one_step_tree();
        let graph = TreeGraph::build(&dataset);
        let partition = graph.nodes_by_step();

        assert_eq!(partition.len(), 2);
        let ids: Vec<_> = partition[&1].iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["u", "m", "d"]);
    }

    #[test]
    fn test_dangling_edge_is_reported() {
        let mut dataset = one_step_tree();
        dataset.edges.push(edge("u", "ghost", Direction::Up));
        let graph = TreeGraph::build(&dataset);

        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.dangling_edges().count(), 1);
        assert!(graph.anomalies().contains(&Anomaly::DanglingEdge {
            edge: "edge:u->ghost".to_string(),
            missing: NodeId::from("ghost"),
        }));
    }

    #[test]
    fn test_structural_anomalies() {
        let mut dataset = one_step_tree();
        dataset.nodes.push(node("r2", 0));
        dataset.nodes.push(node("far", 4));
        dataset.edges.push(edge("r2", "far", Direction::Middle));
        let graph = TreeGraph::build(&dataset);
        let anomalies = graph.anomalies();

        assert!(anomalies.contains(&Anomaly::RootCount(2)));
        assert!(anomalies.contains(&Anomaly::BeyondDepth {
            id: NodeId::from("far"),
            step: 4,
        }));
        assert!(anomalies.iter().any(|a| matches!(
            a,
            Anomaly::StepMismatch {
                source_step: 0,
                target_step: 4,
                ..
            }
        )));
    }
}
