//! Node type and related structures.
//!
//! Nodes are the states of the trinomial tree. Each node has:
//! - A stable identifier assigned by the pricing service
//! - The time step it belongs to (root = 0)
//! - The underlying value, the option value and the payoff at that state
//! - Optionally, the forward transition probabilities

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Stable node identifier.
///
/// The pricing service may emit ids as strings or integers; both are
/// normalised to their string form so edges and nodes always agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a new NodeId.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw string value.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    #[inline]
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => NodeId(text),
            RawId::Integer(n) => NodeId(n.to_string()),
            RawId::Float(f) => NodeId(f.to_string()),
        })
    }
}

/// One state of the tree at a given time step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub step: u32,
    /// Underlying (spot) value at this state.
    pub value: f64,
    /// Option valuation at this state.
    pub option_value: f64,
    #[serde(default)]
    pub payoff: f64,
    #[serde(default)]
    pub prob_up: Option<f64>,
    #[serde(default)]
    pub prob_mid: Option<f64>,
    #[serde(default)]
    pub prob_down: Option<f64>,
}

impl TreeNode {
    /// Forward transition probabilities, if the service sent them.
    ///
    /// Presence is keyed on `prob_up`; a missing middle or down branch
    /// counts as zero.
    pub fn probabilities(&self) -> Option<Probabilities> {
        self.prob_up.map(|up| Probabilities {
            up,
            mid: self.prob_mid.unwrap_or(0.0),
            down: self.prob_down.unwrap_or(0.0),
        })
    }

    /// Structural role of the node in a tree of depth `depth`.
    #[inline]
    pub fn role(&self, depth: u32) -> NodeRole {
        NodeRole::of(self.step, depth)
    }
}

/// Up/middle/down forward probabilities of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probabilities {
    pub up: f64,
    pub mid: f64,
    pub down: f64,
}

impl Probabilities {
    /// Sum of the three branches (≈ 1 for a well-formed tree).
    pub fn total(&self) -> f64 {
        self.up + self.mid + self.down
    }
}

/// Role of a node, used for colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Root,
    Interior,
    Leaf,
}

impl NodeRole {
    /// Root wins over leaf for the degenerate single-node tree.
    pub fn of(step: u32, depth: u32) -> Self {
        if step == 0 {
            NodeRole::Root
        } else if step == depth {
            NodeRole::Leaf
        } else {
            NodeRole::Interior
        }
    }
}
