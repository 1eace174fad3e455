//! The Voronoi diagram as the dual of a Delaunay triangulation.
//!
//! Every pair of neighboring faces contributes one Voronoi edge connecting
//! their circumcenters. Unbounded cells along the convex hull are not
//! clipped; only the finite dual edges are produced.

use crate::graph::{FaceId, PlanarGraph};
use crate::point::Point;
use std::collections::HashSet;

/// The finite edges of the Voronoi diagram dual to `graph`, one segment per
/// pair of neighboring faces.
pub fn voronoi_edges(graph: &PlanarGraph) -> Vec<(Point, Point)> {
    let mut seen: HashSet<(FaceId, FaceId)> = HashSet::new();
    let mut segments = Vec::new();

    for (fid, face) in graph.faces() {
        for &nid in face.neighbors() {
            let pair = if fid < nid { (fid, nid) } else { (nid, fid) };
            if !seen.insert(pair) {
                continue;
            }
            let Ok(neighbor) = graph.face(nid) else {
                continue;
            };
            segments.push((face.circumcircle().center, neighbor.circumcircle().center));
        }
    }

    segments
}
