//! Layout of step-indexed trees.
//!
//! This module turns a validated tree into positions: the pure geometry
//! model, the level-of-detail policy that decides how much of the tree is
//! worth drawing, and the step layout engine that ties both together.

pub mod geometry;
pub mod lod;
pub mod step_layout;

pub use geometry::{Frame, Position, PositionMap, PruningReport, theoretical_node_count};
pub use lod::{DetailPolicy, DetailProfile};
pub use step_layout::{StepLayout, StepLayoutConfig, TreeLayout};
