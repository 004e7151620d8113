//! Spatial indexing for pointer hit testing.
//!
//! This module provides an R-tree based spatial index over laid-out node
//! centres, used to resolve hover on surfaces without per-element events.

mod rtree;

pub use rtree::SpatialIndex;
