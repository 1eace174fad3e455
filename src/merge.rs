//! Merging independently triangulated regions into one Delaunay graph.
//!
//! Each region is triangulated on its own (in parallel), the sub-graphs are
//! unioned, and the seams between regions are repaired: edges left bordering
//! fewer than two faces that are not on the global convex hull mark broken
//! seams, the faces around them are removed, and the orphaned points are
//! re-inserted incrementally. The result is verified; if repair did not
//! produce a sound Delaunay graph, the merger falls back to triangulating
//! all points from scratch.

use crate::graph::{EdgeId, FaceId, PlanarGraph};
use crate::partition::Region;
use crate::point::Point;
use crate::predicates::orient2d;
use crate::triangulation::{is_delaunay_par, triangulate, Triangulation};
use anyhow::Result;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::collections::HashSet;

/// Triangulate every region independently and merge the results into one
/// Delaunay triangulation of the union of all region points.
pub fn merge_and_triangulate(regions: Vec<Region>) -> Result<PlanarGraph> {
    let now = std::time::Instant::now();

    let all_points: Vec<Point> = regions
        .iter()
        .flat_map(|r| r.points().iter().copied())
        .collect();

    // Regions too small or too degenerate to triangulate alone defer their
    // points to the re-insertion phase.
    let results: Vec<(Option<PlanarGraph>, Vec<Point>)> = regions
        .into_par_iter()
        .map(|region| match triangulate(region.points()) {
            Ok(graph) => (Some(graph), Vec::new()),
            Err(_) => {
                log::debug!(
                    "deferring {} points of an untriangulable region",
                    region.points().len()
                );
                (None, region.into_points())
            }
        })
        .collect();

    let mut merged = PlanarGraph::new();
    let mut reinsert: Vec<Point> = Vec::new();
    for (graph, deferred) in results {
        if let Some(graph) = graph {
            merged.absorb(graph);
        }
        reinsert.extend(deferred);
    }

    repair_seams(&mut merged, &mut reinsert);

    let graph = match reinsert_points(merged, reinsert) {
        Ok(graph) if verify(&graph, &all_points) => graph,
        _ => {
            log::warn!("seam repair failed to converge, retriangulating from scratch");
            triangulate(&all_points)?
        }
    };

    log::debug!(
        "merged {} points into {} faces in {} ms",
        all_points.len(),
        graph.num_faces(),
        now.elapsed().as_millis()
    );

    Ok(graph)
}

/// Remove every face around a broken seam, collecting the points of all
/// pruned vertices into `reinsert`.
///
/// An edge bordering fewer than two faces is either on the global convex
/// hull (legitimate) or a seam artifact of the union. Hull edges are
/// excluded by a side test: all non-endpoint vertices lie on one side.
fn repair_seams(graph: &mut PlanarGraph, reinsert: &mut Vec<Point>) {
    let seam_edges: Vec<EdgeId> = graph
        .edges()
        .filter(|(_, edge)| edge.bordering_faces().len() < 2)
        .map(|(eid, _)| eid)
        .filter(|&eid| !is_hull_edge(graph, eid))
        .collect();

    if seam_edges.is_empty() {
        return;
    }

    let mut doomed: HashSet<FaceId> = HashSet::new();
    for &eid in &seam_edges {
        let Ok(edge) = graph.edge(eid) else { continue };
        for vid in edge.endpoints() {
            if let Ok(vertex) = graph.vertex(vid) {
                doomed.extend(vertex.touching_faces().iter().copied());
            }
        }
    }

    log::debug!(
        "{} seam edges, removing {} faces around them",
        seam_edges.len(),
        doomed.len()
    );

    for fid in doomed {
        // A removal may have pruned a face marked earlier via cascades.
        if !graph.contains_face(fid) {
            continue;
        }
        if let Ok(report) = graph.remove_face(fid) {
            reinsert.extend(report.pruned_vertices.into_iter().map(|(_, p)| p));
        }
    }
}

/// Whether every vertex of the graph lies on one side of (or on the line
/// through) the edge, i.e. the edge is on the global convex hull.
fn is_hull_edge(graph: &PlanarGraph, eid: EdgeId) -> bool {
    let Ok(edge) = graph.edge(eid) else {
        return false;
    };
    let [va, vb] = edge.endpoints();
    let (Ok(a), Ok(b)) = (graph.vertex(va), graph.vertex(vb)) else {
        return false;
    };
    let (a, b) = (a.point(), b.point());

    let mut seen_positive = false;
    let mut seen_negative = false;
    for (vid, vertex) in graph.vertices() {
        if vid == va || vid == vb {
            continue;
        }
        let side = orient2d(a, b, vertex.point());
        seen_positive |= side > 0.0;
        seen_negative |= side < 0.0;
        if seen_positive && seen_negative {
            return false;
        }
    }
    true
}

/// Insert the orphaned points back into the merged graph incrementally.
/// Points are inserted in coordinate order so the repair is deterministic.
fn reinsert_points(graph: PlanarGraph, mut points: Vec<Point>) -> Result<PlanarGraph> {
    points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    points.dedup();

    let mut triangulation = Triangulation::over_graph(graph);
    for p in points {
        triangulation.insert_point(p)?;
    }
    Ok(triangulation.into_graph())
}

/// Whether the merged graph covers all input points, is structurally sound
/// and satisfies the empty-circumcircle property.
fn verify(graph: &PlanarGraph, all_points: &[Point]) -> bool {
    let vertices: HashSet<Point> = graph.vertices().map(|(_, v)| v.point()).collect();
    if !all_points.iter().all(|p| vertices.contains(p)) {
        log::warn!("merged graph is missing input points");
        return false;
    }
    if !graph.check_soundness() {
        return false;
    }
    let fraction = is_delaunay_par(graph);
    if fraction < 1.0 {
        log::warn!("merged graph is only {fraction} Delaunay");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::partition;
    use crate::test_utils::sample_points_2d;
    use crate::triangulation::is_delaunay;

    fn vertex_points(graph: &PlanarGraph) -> HashSet<Point> {
        graph.vertices().map(|(_, v)| v.point()).collect()
    }

    #[test]
    fn test_single_region_passes_through() {
        let points = sample_points_2d(50, Some(0.0..=10.0));
        let regions = partition(&points, 100).unwrap();
        assert_eq!(regions.len(), 1);

        let graph = merge_and_triangulate(regions).unwrap();

        assert_eq!(graph.num_vertices(), points.len());
        assert!(is_delaunay(&graph));
    }

    #[test]
    fn test_merged_regions_cover_all_points() {
        let points = sample_points_2d(400, Some(0.0..=50.0));
        let regions = partition(&points, 60).unwrap();
        assert!(regions.len() >= 4);

        let graph = merge_and_triangulate(regions).unwrap();

        let vertices = vertex_points(&graph);
        for p in &points {
            assert!(vertices.contains(p), "point {p} missing from the merge");
        }
        assert!(graph.check_soundness());
        assert!(is_delaunay(&graph));
    }

    #[test]
    fn test_merge_matches_direct_triangulation_validity() {
        let points = sample_points_2d(200, Some(0.0..=20.0));
        let regions = partition(&points, 30).unwrap();

        let graph = merge_and_triangulate(regions).unwrap();

        assert_eq!(graph.num_vertices(), points.len());
        assert_eq!(is_delaunay_par(&graph), 1.0);
    }

    #[test]
    fn test_tiny_regions_are_deferred_and_reinserted() {
        // Budget 1 forces every region down to a single point; everything
        // goes through the deferral path.
        let points = sample_points_2d(12, Some(0.0..=5.0));
        let regions = partition(&points, 1).unwrap();

        let graph = merge_and_triangulate(regions).unwrap();

        assert_eq!(graph.num_vertices(), points.len());
        assert!(is_delaunay(&graph));
    }

    #[test]
    fn test_too_few_points_overall_is_an_error() {
        let points = vec![Point::new(0.0, 0.0), Point::new(3.0, 1.0)];
        let regions = partition(&points, 1).unwrap();

        assert!(merge_and_triangulate(regions).is_err());
    }

    #[test]
    fn test_hull_edge_detection() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
            Point::new(2.0, 2.0),
        ];
        let graph = triangulate(&points).unwrap();

        for (eid, edge) in graph.edges() {
            let on_hull = is_hull_edge(&graph, eid);
            let border_count = edge.bordering_faces().len();
            if on_hull {
                assert_eq!(border_count, 1);
            } else {
                assert_eq!(border_count, 2);
            }
        }
    }
}
