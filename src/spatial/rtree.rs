//! R-tree based spatial index using the rstar crate.
//!
//! Holds the laid-out centre of every drawn node so a pointer position can
//! be resolved to the node under it (nearest node within a pick radius).

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::layout::Position;

/// A point in the spatial index with the dataset slot of its node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePoint {
    /// Index of the node in the dataset's node list.
    pub slot: usize,
    pub x: f64,
    pub y: f64,
}

impl NodePoint {
    /// Create a new NodePoint.
    pub fn new(slot: usize, x: f64, y: f64) -> Self {
        Self { slot, x, y }
    }
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index over node centres.
///
/// Uses an R*-tree for efficient spatial queries.
pub struct SpatialIndex {
    tree: RTree<NodePoint>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Find the node nearest to a point, if it lies within `max_distance`.
    pub fn nearest_within(&self, point: Position, max_distance: f64) -> Option<usize> {
        let query = [point.x, point.y];
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&query)
            .filter(|candidate| candidate.distance_2(&query) <= max_distance_sq)
            .map(|candidate| candidate.slot)
    }

    /// Rebuild the index from `(slot, position)` pairs.
    ///
    /// Bulk loading is used since every draw replaces the whole layout.
    pub fn rebuild(&mut self, points: impl IntoIterator<Item = (usize, Position)>) {
        let node_points: Vec<_> = points
            .into_iter()
            .map(|(slot, p)| NodePoint::new(slot, p.x, p.y))
            .collect();

        self.tree = RTree::bulk_load(node_points);
    }

    /// Clear all nodes from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    /// Get the number of nodes in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
