//! Tree payload as received from the pricing service.
//!
//! [`RawTreeData`] mirrors the permissive JSON shape; converting it into a
//! [`TreeDataset`] is the validation step that rejects payloads missing any
//! of the three required parts before anything touches the drawing surface.

use serde::{Deserialize, Serialize};

use super::edge::TreeEdge;
use super::node::TreeNode;
use crate::error::ViewError;

/// Tree-wide parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Tree depth (number of time steps).
    #[serde(rename = "N")]
    pub n: u32,
    /// Root valuation produced by the tree.
    pub final_price: f64,
}

/// Unvalidated tree payload. Every part is optional so that a missing one
/// can be reported by name instead of as a generic decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTreeData {
    #[serde(default)]
    pub nodes: Option<Vec<TreeNode>>,
    #[serde(default)]
    pub edges: Option<Vec<TreeEdge>>,
    #[serde(default)]
    pub tree_params: Option<TreeParams>,
}

/// A validated node/edge dataset ready for layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeDataset {
    pub nodes: Vec<TreeNode>,
    pub edges: Vec<TreeEdge>,
    pub tree_params: TreeParams,
}

impl TreeDataset {
    /// Tree depth N.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.tree_params.n
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ViewError> {
        let raw: RawTreeData = serde_json::from_str(json)?;
        raw.try_into()
    }
}

impl TryFrom<RawTreeData> for TreeDataset {
    type Error = ViewError;

    fn try_from(raw: RawTreeData) -> Result<Self, Self::Error> {
        Ok(TreeDataset {
            nodes: raw.nodes.ok_or(ViewError::MissingField("nodes"))?,
            edges: raw.edges.ok_or(ViewError::MissingField("edges"))?,
            tree_params: raw.tree_params.ok_or(ViewError::MissingField("tree_params"))?,
        })
    }
}
