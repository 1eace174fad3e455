//! Incremental Delaunay triangulation via the Bowyer-Watson algorithm.
//!
//! Construction is seeded with a synthetic super-triangle enclosing all
//! input points. Each point insertion collects the faces whose circumcircle
//! contains the point, removes them, and re-triangulates the resulting
//! cavity by connecting the point to the cavity's boundary edges. The
//! super-triangle and everything attached to it is removed at the end.

use crate::graph::{EdgeId, FaceId, PlanarGraph, VertexId};
use crate::point::{Bounds, Point};
use crate::predicates::{circle_strictly_contains, circumcircle, orient2d};
use anyhow::Result;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::collections::HashMap;

/// Margin applied below the input minima when building the super-triangle.
const SUPER_MARGIN: f64 = 10.0;

/// An in-progress incremental triangulation.
///
/// ```
/// use pangraph::{triangulate, Point};
///
/// let points = vec![
///     Point::new(0.0, 0.0),
///     Point::new(4.0, 0.0),
///     Point::new(4.0, 4.0),
///     Point::new(0.0, 4.0),
///     Point::new(2.0, 1.5),
/// ];
///
/// let graph = triangulate(&points).unwrap();
/// assert_eq!(graph.num_vertices(), 5);
/// assert!(pangraph::is_delaunay(&graph));
/// ```
pub struct Triangulation {
    graph: PlanarGraph,
    /// Point -> vertex lookup scoped to this run only; never shared or
    /// reused across runs.
    point_lookup: HashMap<Point, VertexId>,
    super_points: Option<[Point; 3]>,
    time_scanning: u128,
    time_rebuilding: u128,
}

impl Triangulation {
    /// Set up a triangulation run for the given point set: validate the
    /// preconditions and seed the graph with the super-triangle.
    ///
    /// Fails if fewer than 3 distinct points are given, or if all points are
    /// exactly collinear.
    pub fn new(points: &[Point]) -> Result<Self> {
        let mut distinct = points.to_vec();
        distinct.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        distinct.dedup();

        if distinct.len() < 3 {
            return Err(anyhow::Error::msg(
                "Needs at least 3 distinct points to compute a 2D triangulation!",
            ));
        }
        if !has_non_collinear_triple(&distinct) {
            return Err(anyhow::Error::msg(
                "All points are aligned, i.e. could not find 3 non-aligned points!",
            ));
        }

        let bounds = Bounds::of(points).expect("at least 3 points");
        let super_points = super_triangle_points(&bounds);

        let mut triangulation = Self {
            graph: PlanarGraph::new(),
            point_lookup: HashMap::new(),
            super_points: Some(super_points),
            time_scanning: 0,
            time_rebuilding: 0,
        };
        triangulation.add_triangle(super_points)?;

        Ok(triangulation)
    }

    /// Resume incremental insertion over an existing graph whose faces carry
    /// cached circumcircles. Used by the partition merger for seam repair;
    /// there is no super-triangle to clean up in this mode.
    pub(crate) fn over_graph(graph: PlanarGraph) -> Self {
        let point_lookup = graph
            .vertices()
            .map(|(id, vertex)| (vertex.point(), id))
            .collect();

        Self {
            graph,
            point_lookup,
            super_points: None,
            time_scanning: 0,
            time_rebuilding: 0,
        }
    }

    /// Insert one point: collect the faces whose circumcircle contains it,
    /// remove them, and connect the point to the surviving cavity boundary.
    ///
    /// A point identical to an existing vertex is a no-op. Fails if no face's
    /// circumcircle contains the point (cannot happen under a super-triangle;
    /// the merger handles it).
    pub fn insert_point(&mut self, p: Point) -> Result<()> {
        if self.point_lookup.contains_key(&p) {
            return Ok(());
        }

        let now = std::time::Instant::now();

        // Scan all current faces for invalidated ones and buffer their
        // border edges.
        let mut bad_faces: Vec<FaceId> = Vec::new();
        let mut edge_counts: HashMap<EdgeId, usize> = HashMap::new();
        for (fid, _) in self.graph.faces() {
            if self.graph.face_circumcircle_contains(fid, p)? {
                bad_faces.push(fid);
                for eid in self.graph.face(fid)?.borders() {
                    *edge_counts.entry(eid).or_insert(0) += 1;
                }
            }
        }

        if bad_faces.is_empty() {
            return Err(anyhow::Error::msg(format!(
                "Point {p} is outside every face's circumcircle!"
            )));
        }

        // Edges buffered twice are interior to the cavity and vanish with
        // their faces; the rest bound the cavity. Capture endpoint points
        // now, the edges themselves may be pruned below.
        let mut boundary: Vec<(Point, Point)> = Vec::new();
        for (&eid, &count) in &edge_counts {
            if count == 1 {
                let [a, b] = self.graph.edge(eid)?.endpoints();
                boundary.push((self.graph.vertex(a)?.point(), self.graph.vertex(b)?.point()));
            }
        }
        self.time_scanning += now.elapsed().as_micros();

        let now = std::time::Instant::now();
        for fid in bad_faces {
            let report = self.graph.remove_face(fid)?;
            for (_, point) in report.pruned_vertices {
                self.point_lookup.remove(&point);
            }
        }

        for (a, b) in boundary {
            self.add_triangle([p, a, b])?;
        }
        self.time_rebuilding += now.elapsed().as_micros();

        Ok(())
    }

    /// Remove every face with a super-triangle corner, cascading the usual
    /// prune logic, and return the finished graph.
    pub fn finish(mut self) -> Result<PlanarGraph> {
        if let Some(super_points) = self.super_points {
            let super_vertices: Vec<VertexId> = super_points
                .iter()
                .filter_map(|p| self.point_lookup.get(p).copied())
                .collect();

            let doomed: Vec<FaceId> = self
                .graph
                .faces()
                .filter(|(_, face)| super_vertices.iter().any(|&v| face.has_corner(v)))
                .map(|(fid, _)| fid)
                .collect();

            log::debug!(
                "removing {} faces attached to the super-triangle",
                doomed.len()
            );
            for fid in doomed {
                self.graph.remove_face(fid)?;
            }
        }

        log::trace!(
            "face scans took {} µs, cavity rebuilds took {} µs",
            self.time_scanning,
            self.time_rebuilding
        );

        Ok(self.graph)
    }

    pub(crate) fn into_graph(self) -> PlanarGraph {
        log::trace!(
            "face scans took {} µs, cavity rebuilds took {} µs",
            self.time_scanning,
            self.time_rebuilding
        );
        self.graph
    }

    /// Add one triangle over the given corner points, reusing vertices via
    /// the per-run lookup and edges via adjacency lookups, creating and
    /// wiring whatever is missing, and caching the circumcircle.
    fn add_triangle(&mut self, corners: [Point; 3]) -> Result<FaceId> {
        let mut vertex_ids = Vec::with_capacity(3);
        for &p in &corners {
            let vid = match self.point_lookup.get(&p) {
                Some(&vid) => vid,
                None => {
                    let vid = self.graph.add_vertex(p);
                    self.point_lookup.insert(p, vid);
                    vid
                }
            };
            vertex_ids.push(vid);
        }
        let vertex_ids = [vertex_ids[0], vertex_ids[1], vertex_ids[2]];

        let mut edge_ids = Vec::with_capacity(3);
        for (i, j) in [(0, 1), (1, 2), (2, 0)] {
            let (a, b) = (vertex_ids[i], vertex_ids[j]);
            let eid = match self.graph.edge_between(a, b) {
                Some(eid) => eid,
                None => self.graph.add_edge(a, b)?,
            };
            edge_ids.push(eid);
        }
        let borders = [edge_ids[0], edge_ids[1], edge_ids[2]];

        let circle = circumcircle(corners[0], corners[1], corners[2]);
        self.graph.add_face(vertex_ids, borders, circle)
    }
}

/// Compute the Delaunay triangulation of `points` as a planar graph.
///
/// The result contains only entities derived from the input points; the
/// synthetic super-triangle is removed. Input order affects intermediate
/// state only, never the final topology.
pub fn triangulate(points: &[Point]) -> Result<PlanarGraph> {
    let now = std::time::Instant::now();

    let mut triangulation = Triangulation::new(points)?;
    for &p in points {
        triangulation.insert_point(p)?;
    }
    let graph = triangulation.finish()?;

    log::debug!(
        "triangulated {} points into {} faces in {} ms",
        points.len(),
        graph.num_faces(),
        now.elapsed().as_millis()
    );

    Ok(graph)
}

/// Whether some triple in the (deduplicated, sorted) point set is not
/// collinear. The scan fixes the two extreme points and tests the rest
/// against them.
fn has_non_collinear_triple(distinct: &[Point]) -> bool {
    let a = distinct[0];
    let b = distinct[distinct.len() - 1];
    distinct[1..distinct.len() - 1]
        .iter()
        .any(|&c| orient2d(a, b, c) != 0.0)
}

/// The corners of a right triangle strictly enclosing `bounds`: the minima
/// shifted down by the margin, the spans then doubled past the maxima so the
/// hypotenuse clears the bounding box.
fn super_triangle_points(bounds: &Bounds) -> [Point; 3] {
    let lo_x = bounds.min_x - SUPER_MARGIN;
    let lo_y = bounds.min_y - SUPER_MARGIN;
    let hi_x = bounds.max_x + 2.0 * (bounds.max_x - lo_x);
    let hi_y = bounds.max_y + 2.0 * (bounds.max_y - lo_y);

    [
        Point::new(lo_x, lo_y),
        Point::new(lo_x, hi_y),
        Point::new(hi_x, lo_y),
    ]
}

/// Check the empty-circumcircle property: no vertex of the graph lies
/// strictly inside any face's circumcircle. Violations are logged.
pub fn is_delaunay(graph: &PlanarGraph) -> bool {
    let mut delaunay = true;

    for (fid, face) in graph.faces() {
        for (vid, vertex) in graph.vertices() {
            if face.has_corner(vid) {
                continue;
            }
            if circle_strictly_contains(&face.circumcircle(), vertex.point()) {
                log::error!(
                    "vertex {vid} at {} lies inside the circumcircle of face {fid}",
                    vertex.point()
                );
                delaunay = false;
            }
        }
    }

    delaunay
}

/// Check the empty-circumcircle property in parallel and return the fraction
/// of faces that satisfy it, `1.0` meaning fully Delaunay.
///
/// This can significantly reduce the runtime of the check on large graphs.
#[must_use]
pub fn is_delaunay_par(graph: &PlanarGraph) -> f64 {
    let faces: Vec<_> = graph.faces().collect();
    let vertices: Vec<_> = graph.vertices().collect();
    let num_faces = faces.len();
    if num_faces == 0 {
        return 1.0;
    }

    let num_violated: usize = faces
        .into_par_iter()
        .map(|(_, face)| {
            let violated = vertices.iter().any(|&(vid, vertex)| {
                !face.has_corner(vid)
                    && circle_strictly_contains(&face.circumcircle(), vertex.point())
            });
            usize::from(violated)
        })
        .sum();

    1.0 - num_violated as f64 / num_faces as f64
}
