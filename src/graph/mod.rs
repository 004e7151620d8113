//! Tree data structures.
//!
//! This module provides the typed node/edge/parameter model received from
//! the pricing service, the validated [`TreeDataset`], and [`TreeGraph`], an
//! index built on petgraph's StableGraph for lookups, step grouping and
//! invariant checks.

mod dataset;
mod edge;
mod node;
mod tree;

pub use dataset::{RawTreeData, TreeDataset, TreeParams};
pub use edge::{Direction, TreeEdge};
pub use node::{NodeId, NodeRole, Probabilities, TreeNode};
pub use tree::{Anomaly, StepPartition, TreeGraph};
