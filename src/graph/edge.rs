//! Edge type and related structures.
//!
//! Edges are the forward transitions between nodes of consecutive steps.
//! Each edge has:
//! - Source and target node IDs
//! - The branch direction (up, middle, down)
//! - Optionally, the transition probability

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::NodeId;

/// Branch direction of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    #[serde(alias = "mid")]
    Middle,
    Down,
    /// Anything the service sends that is not one of the three branches.
    #[serde(other)]
    Other,
}

impl Direction {
    /// CSS-style class name of the direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Middle => "middle",
            Direction::Down => "down",
            Direction::Other => "other",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed transition between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub direction: Direction,
    #[serde(default)]
    pub probability: Option<f64>,
}

impl TreeEdge {
    /// Stable key used by drawing surfaces.
    pub fn key(&self) -> String {
        format!("edge:{}->{}", self.source, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parsing() {
        let up: Direction = serde_json::from_str("\"up\"").unwrap();
        let mid: Direction = serde_json::from_str("\"mid\"").unwrap();
        let middle: Direction = serde_json::from_str("\"middle\"").unwrap();
        let other: Direction = serde_json::from_str("\"sideways\"").unwrap();

        assert_eq!(up, Direction::Up);
        assert_eq!(mid, Direction::Middle);
        assert_eq!(middle, Direction::Middle);
        assert_eq!(other, Direction::Other);
    }

    #[test]
    fn test_edge_key() {
        let json = r#"{"source": 0, "target": "1", "direction": "down", "probability": 0.16}"#;
        let edge: TreeEdge = serde_json::from_str(json).unwrap();
        assert_eq!(edge.key(), "edge:0->1");
        assert_eq!(edge.direction.to_string(), "down");
        assert_eq!(edge.probability, Some(0.16));
    }
}
