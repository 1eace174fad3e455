//! # Pangraph
//!
//! 2D Delaunay triangulation built on an explicit planar graph, with quadtree
//! partitioning and a seam-repairing merge for large point sets.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub use graph::{Edge, EdgeId, Face, FaceId, PlanarGraph, PruneReport, Vertex, VertexId};
pub use merge::merge_and_triangulate;
pub use partition::{partition, Region};
pub use point::{Bounds, Point};
pub use predicates::{circumcircle, Circle};
pub use triangulation::{is_delaunay, is_delaunay_par, triangulate, Triangulation};
pub use voronoi::voronoi_edges;

pub mod graph;
pub mod merge;
pub mod partition;
pub mod point;
pub mod predicates;
pub mod triangulation;
pub mod voronoi;
