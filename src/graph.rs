//! The planar-graph topology engine.
//!
//! A [PlanarGraph] exclusively owns its vertices, edges and faces in arenas
//! addressed by typed handles. Entities store handles, never references, so
//! the cyclic vertex/edge/face cross-references stay manageable while local
//! traversal remains O(1).
//!
//! All membership mutation goes through the add/remove operations below; each
//! one updates every reciprocal index so that the structural invariants hold
//! after every mutation:
//!
//! - an edge borders 0, 1 or 2 faces, and an edge bordering 0 faces is
//!   removed from the graph,
//! - a face has exactly 3 corners and 3 borders,
//! - cross-references are reciprocal (face corner <-> vertex touching face,
//!   and so on),
//! - a vertex touching 0 faces is removed from the graph,
//! - a face's cached circumcircle never changes after creation.

use crate::point::Point;
use crate::predicates::{circumcircle_contains, Circle};
use anyhow::Result;
use core::fmt;

/// Handle to a [Vertex] owned by a [PlanarGraph].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(usize);

/// Handle to an [Edge] owned by a [PlanarGraph].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(usize);

/// Handle to a [Face] owned by a [PlanarGraph].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(usize);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// A corner of the triangulation: one point plus the relational indexes that
/// make local traversal O(1). The index sets mirror the edge and face sides
/// of the same relations; they never own anything.
#[derive(Debug, Clone)]
pub struct Vertex {
    point: Point,
    touching_faces: Vec<FaceId>,
    incident_edges: Vec<EdgeId>,
    adjacent_vertices: Vec<VertexId>,
}

impl Vertex {
    pub const fn point(&self) -> Point {
        self.point
    }

    /// Faces that have this vertex as a corner.
    pub fn touching_faces(&self) -> &[FaceId] {
        &self.touching_faces
    }

    /// Edges that have this vertex as an endpoint.
    pub fn incident_edges(&self) -> &[EdgeId] {
        &self.incident_edges
    }

    /// Vertices reachable over the incident edges.
    pub fn adjacent_vertices(&self) -> &[VertexId] {
        &self.adjacent_vertices
    }
}

/// A segment between two vertices, bordering up to two faces.
#[derive(Debug, Clone)]
pub struct Edge {
    endpoints: [VertexId; 2],
    bordering_faces: Vec<FaceId>,
}

impl Edge {
    pub const fn endpoints(&self) -> [VertexId; 2] {
        self.endpoints
    }

    /// The faces this edge borders; between 0 and 2 at all times.
    pub fn bordering_faces(&self) -> &[FaceId] {
        &self.bordering_faces
    }

    pub fn other_endpoint(&self, v: VertexId) -> Option<VertexId> {
        if self.endpoints[0] == v {
            Some(self.endpoints[1])
        } else if self.endpoints[1] == v {
            Some(self.endpoints[0])
        } else {
            None
        }
    }
}

/// A triangle: 3 corners, 3 borders, the faces sharing a border, and the
/// circumcircle cached once at creation.
#[derive(Debug, Clone)]
pub struct Face {
    corners: [VertexId; 3],
    borders: [EdgeId; 3],
    neighbors: Vec<FaceId>,
    circumcircle: Circle,
}

impl Face {
    pub const fn corners(&self) -> [VertexId; 3] {
        self.corners
    }

    pub const fn borders(&self) -> [EdgeId; 3] {
        self.borders
    }

    /// Faces sharing an edge with this face.
    pub fn neighbors(&self) -> &[FaceId] {
        &self.neighbors
    }

    /// The circumcircle computed at creation; never recomputed.
    pub const fn circumcircle(&self) -> Circle {
        self.circumcircle
    }

    pub fn has_corner(&self, v: VertexId) -> bool {
        self.corners.contains(&v)
    }
}

/// Entities removed by a cascading face removal.
///
/// The triangulator needs the pruned vertices (with their points) to evict
/// stale entries from its per-run point lookup; the merger collects them as
/// points requiring re-insertion.
#[derive(Debug, Default)]
pub struct PruneReport {
    pub pruned_edges: Vec<EdgeId>,
    pub pruned_vertices: Vec<(VertexId, Point)>,
}

/// Slot arena with a free list; handles stay stable for an entity's lifetime,
/// freed slots are reused by later insertions.
#[derive(Debug, Clone)]
struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
}

impl<T> Arena<T> {
    const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    fn insert(&mut self, value: T) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(value);
                idx
            }
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            }
        }
    }

    fn remove(&mut self, idx: usize) -> Option<T> {
        let value = self.slots.get_mut(idx)?.take()?;
        self.free.push(idx);
        Some(value)
    }

    fn get(&self, idx: usize) -> Option<&T> {
        self.slots.get(idx)?.as_ref()
    }

    fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.slots.get_mut(idx)?.as_mut()
    }

    fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|value| (idx, value)))
    }
}

/// The planar graph: vertices, edges, faces and all bidirectional
/// cross-references, owned exclusively by this structure.
#[derive(Debug, Clone)]
pub struct PlanarGraph {
    vertices: Arena<Vertex>,
    edges: Arena<Edge>,
    faces: Arena<Face>,
}

impl Default for PlanarGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanarGraph {
    pub const fn new() -> Self {
        Self {
            vertices: Arena::new(),
            edges: Arena::new(),
            faces: Arena::new(),
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn vertex(&self, id: VertexId) -> Result<&Vertex> {
        self.vertices
            .get(id.0)
            .ok_or_else(|| anyhow::Error::msg(format!("No vertex {id} in the graph!")))
    }

    pub fn edge(&self, id: EdgeId) -> Result<&Edge> {
        self.edges
            .get(id.0)
            .ok_or_else(|| anyhow::Error::msg(format!("No edge {id} in the graph!")))
    }

    pub fn face(&self, id: FaceId) -> Result<&Face> {
        self.faces
            .get(id.0)
            .ok_or_else(|| anyhow::Error::msg(format!("No face {id} in the graph!")))
    }

    pub fn contains_face(&self, id: FaceId) -> bool {
        self.faces.get(id.0).is_some()
    }

    /// Read-only view over the live vertices.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices.iter().map(|(idx, v)| (VertexId(idx), v))
    }

    /// Read-only view over the live edges.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().map(|(idx, e)| (EdgeId(idx), e))
    }

    /// Read-only view over the live faces.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.faces.iter().map(|(idx, f)| (FaceId(idx), f))
    }

    /// Add an isolated vertex at `point`.
    pub fn add_vertex(&mut self, point: Point) -> VertexId {
        VertexId(self.vertices.insert(Vertex {
            point,
            touching_faces: Vec::new(),
            incident_edges: Vec::new(),
            adjacent_vertices: Vec::new(),
        }))
    }

    /// Add an edge between two existing vertices, wiring the incidence and
    /// adjacency indexes on both endpoints.
    ///
    /// At most one edge may connect a vertex pair; callers reuse an existing
    /// edge via [PlanarGraph::edge_between].
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> Result<EdgeId> {
        if a == b {
            return Err(anyhow::Error::msg(format!(
                "Cannot connect vertex {a} to itself!"
            )));
        }
        self.vertex(a)?;
        self.vertex(b)?;
        if self.edge_between(a, b).is_some() {
            return Err(anyhow::Error::msg(format!(
                "Vertices {a} and {b} are already connected!"
            )));
        }

        let id = EdgeId(self.edges.insert(Edge {
            endpoints: [a, b],
            bordering_faces: Vec::new(),
        }));

        for (this, other) in [(a, b), (b, a)] {
            let vertex = self.vertices.get_mut(this.0).expect("endpoint checked");
            vertex.incident_edges.push(id);
            if !vertex.adjacent_vertices.contains(&other) {
                vertex.adjacent_vertices.push(other);
            }
        }

        Ok(id)
    }

    /// Look up the edge connecting `a` and `b`, if any, by scanning the
    /// incident edges of `a`.
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        let vertex = self.vertices.get(a.0)?;
        for &eid in &vertex.incident_edges {
            let edge = self.edges.get(eid.0)?;
            if edge.other_endpoint(a) == Some(b) {
                return Some(eid);
            }
        }
        None
    }

    /// Add a face over existing corners and borders, caching `circumcircle`
    /// for its lifetime.
    ///
    /// Wires every reciprocal index: the face is recorded on its border
    /// edges and corner vertices, and neighbor links are exchanged with any
    /// face already bordering one of the edges.
    pub fn add_face(
        &mut self,
        corners: [VertexId; 3],
        borders: [EdgeId; 3],
        circumcircle: Circle,
    ) -> Result<FaceId> {
        if corners[0] == corners[1] || corners[1] == corners[2] || corners[0] == corners[2] {
            return Err(anyhow::Error::msg("Face corners must be distinct!"));
        }
        for &vid in &corners {
            self.vertex(vid)?;
        }
        for &eid in &borders {
            let edge = self.edge(eid)?;
            if edge.bordering_faces.len() >= 2 {
                return Err(anyhow::Error::msg(format!(
                    "Edge {eid} already borders two faces!"
                )));
            }
        }

        let id = FaceId(self.faces.insert(Face {
            corners,
            borders,
            neighbors: Vec::new(),
            circumcircle,
        }));

        let mut neighbors = Vec::new();
        for &eid in &borders {
            let edge = self.edges.get_mut(eid.0).expect("border checked");
            for &other in &edge.bordering_faces {
                if !neighbors.contains(&other) {
                    neighbors.push(other);
                }
            }
            edge.bordering_faces.push(id);
        }
        for &other in &neighbors {
            let face = self.faces.get_mut(other.0).expect("neighbor is live");
            face.neighbors.push(id);
        }
        self.faces.get_mut(id.0).expect("just inserted").neighbors = neighbors;

        for &vid in &corners {
            let vertex = self.vertices.get_mut(vid.0).expect("corner checked");
            vertex.touching_faces.push(id);
        }

        Ok(id)
    }

    /// Remove a face and cascade: detach it from its border edges, corner
    /// vertices and neighbors, then prune every border edge left with no
    /// bordering face (detaching it from its endpoints) and every corner
    /// vertex left touching no face.
    pub fn remove_face(&mut self, id: FaceId) -> Result<PruneReport> {
        let face = self
            .faces
            .remove(id.0)
            .ok_or_else(|| anyhow::Error::msg(format!("No face {id} in the graph!")))?;

        for &eid in &face.borders {
            if let Some(edge) = self.edges.get_mut(eid.0) {
                edge.bordering_faces.retain(|&f| f != id);
            }
        }
        for &vid in &face.corners {
            if let Some(vertex) = self.vertices.get_mut(vid.0) {
                vertex.touching_faces.retain(|&f| f != id);
            }
        }
        for &nid in &face.neighbors {
            if let Some(neighbor) = self.faces.get_mut(nid.0) {
                neighbor.neighbors.retain(|&f| f != id);
            }
        }

        let mut report = PruneReport::default();

        for &eid in &face.borders {
            let dead = self
                .edges
                .get(eid.0)
                .is_some_and(|e| e.bordering_faces.is_empty());
            if dead {
                let edge = self.edges.remove(eid.0).expect("checked live");
                self.detach_edge(eid, &edge);
                report.pruned_edges.push(eid);
            }
        }

        for &vid in &face.corners {
            let dead = self
                .vertices
                .get(vid.0)
                .is_some_and(|v| v.touching_faces.is_empty());
            if dead {
                let vertex = self.vertices.remove(vid.0).expect("checked live");
                log::trace!("pruned dead vertex {vid} at {}", vertex.point);
                report.pruned_vertices.push((vid, vertex.point));
            }
        }

        Ok(report)
    }

    /// Remove an edge that borders no face, detaching it from its endpoints.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<()> {
        let bordering = self.edge(id)?.bordering_faces.len();
        if bordering > 0 {
            return Err(anyhow::Error::msg(format!(
                "Edge {id} still borders {bordering} face(s)!"
            )));
        }
        let edge = self.edges.remove(id.0).expect("checked live");
        self.detach_edge(id, &edge);
        Ok(())
    }

    /// Remove a vertex that touches no face and has no incident edge.
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<()> {
        let vertex = self.vertex(id)?;
        if !vertex.touching_faces.is_empty() || !vertex.incident_edges.is_empty() {
            return Err(anyhow::Error::msg(format!(
                "Vertex {id} is still referenced by edges or faces!"
            )));
        }
        self.vertices.remove(id.0);
        Ok(())
    }

    fn detach_edge(&mut self, id: EdgeId, edge: &Edge) {
        let [a, b] = edge.endpoints;
        for (this, other) in [(a, b), (b, a)] {
            if let Some(vertex) = self.vertices.get_mut(this.0) {
                vertex.incident_edges.retain(|&e| e != id);
                vertex.adjacent_vertices.retain(|&v| v != other);
            }
        }
    }

    /// Whether `p` lies in the circumcircle of face `id` (see
    /// [circumcircle_contains]).
    pub fn face_circumcircle_contains(&self, id: FaceId, p: Point) -> Result<bool> {
        let face = self.face(id)?;
        let mut corners = [Point::new(0.0, 0.0); 3];
        for (slot, &vid) in corners.iter_mut().zip(&face.corners) {
            *slot = self.vertex(vid)?.point;
        }
        Ok(circumcircle_contains(&face.circumcircle, &corners, p))
    }

    /// Move every entity of `other` into this graph under fresh handles,
    /// preserving the topology. Used by the partition merger to union
    /// sub-graphs.
    pub fn absorb(&mut self, other: PlanarGraph) {
        use std::collections::HashMap;

        let mut vmap: HashMap<VertexId, VertexId> = HashMap::new();
        let mut emap: HashMap<EdgeId, EdgeId> = HashMap::new();
        let mut fmap: HashMap<FaceId, FaceId> = HashMap::new();

        // First pass: allocate slots so every handle has its remapping.
        for (idx, vertex) in other.vertices.iter() {
            vmap.insert(VertexId(idx), self.add_vertex(vertex.point));
        }
        for (idx, edge) in other.edges.iter() {
            let endpoints = edge.endpoints.map(|v| vmap[&v]);
            let new = EdgeId(self.edges.insert(Edge {
                endpoints,
                bordering_faces: Vec::new(),
            }));
            emap.insert(EdgeId(idx), new);
        }
        for (idx, face) in other.faces.iter() {
            let new = FaceId(self.faces.insert(Face {
                corners: face.corners.map(|v| vmap[&v]),
                borders: face.borders.map(|e| emap[&e]),
                neighbors: Vec::new(),
                circumcircle: face.circumcircle,
            }));
            fmap.insert(FaceId(idx), new);
        }

        // Second pass: carry over the relational indexes under new handles.
        for (idx, vertex) in other.vertices.iter() {
            let target = self
                .vertices
                .get_mut(vmap[&VertexId(idx)].0)
                .expect("allocated above");
            target.touching_faces = vertex.touching_faces.iter().map(|f| fmap[f]).collect();
            target.incident_edges = vertex.incident_edges.iter().map(|e| emap[e]).collect();
            target.adjacent_vertices = vertex.adjacent_vertices.iter().map(|v| vmap[v]).collect();
        }
        for (idx, edge) in other.edges.iter() {
            let target = self
                .edges
                .get_mut(emap[&EdgeId(idx)].0)
                .expect("allocated above");
            target.bordering_faces = edge.bordering_faces.iter().map(|f| fmap[f]).collect();
        }
        for (idx, face) in other.faces.iter() {
            let target = self
                .faces
                .get_mut(fmap[&FaceId(idx)].0)
                .expect("allocated above");
            target.neighbors = face.neighbors.iter().map(|f| fmap[f]).collect();
        }
    }

    /// Verify the structural invariants of a finished graph. Violations are
    /// logged and the check returns `false`.
    pub fn check_soundness(&self) -> bool {
        let mut sound = true;

        for (eid, edge) in self.edges.iter() {
            let eid = EdgeId(eid);
            let count = edge.bordering_faces.len();
            if count == 0 || count > 2 {
                log::error!("edge {eid} borders {count} faces");
                sound = false;
            }
            for &fid in &edge.bordering_faces {
                match self.faces.get(fid.0) {
                    Some(face) if face.borders.contains(&eid) => {}
                    _ => {
                        log::error!("edge {eid} lists face {fid}, which does not list it back");
                        sound = false;
                    }
                }
            }
            for &vid in &edge.endpoints {
                match self.vertices.get(vid.0) {
                    Some(vertex) if vertex.incident_edges.contains(&eid) => {}
                    _ => {
                        log::error!("edge {eid} endpoint {vid} does not list it back");
                        sound = false;
                    }
                }
            }
        }

        for (fid, face) in self.faces.iter() {
            let fid = FaceId(fid);
            for &vid in &face.corners {
                match self.vertices.get(vid.0) {
                    Some(vertex) if vertex.touching_faces.contains(&fid) => {}
                    _ => {
                        log::error!("face {fid} corner {vid} does not list it back");
                        sound = false;
                    }
                }
            }
            for &eid in &face.borders {
                match self.edges.get(eid.0) {
                    Some(edge) if edge.bordering_faces.contains(&fid) => {}
                    _ => {
                        log::error!("face {fid} border {eid} does not list it back");
                        sound = false;
                    }
                }
            }
            for &nid in &face.neighbors {
                match self.faces.get(nid.0) {
                    Some(neighbor) if neighbor.neighbors.contains(&fid) => {}
                    _ => {
                        log::error!("face {fid} neighbor {nid} does not list it back");
                        sound = false;
                    }
                }
            }
        }

        for (vid, vertex) in self.vertices.iter() {
            let vid = VertexId(vid);
            if vertex.touching_faces.is_empty() {
                log::error!("vertex {vid} touches no face");
                sound = false;
            }
            for &fid in &vertex.touching_faces {
                match self.faces.get(fid.0) {
                    Some(face) if face.corners.contains(&vid) => {}
                    _ => {
                        log::error!("vertex {vid} lists face {fid}, which does not list it back");
                        sound = false;
                    }
                }
            }
        }

        sound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates::circumcircle;

    fn triangle_graph() -> (PlanarGraph, [VertexId; 3], [EdgeId; 3], FaceId) {
        let mut graph = PlanarGraph::new();
        let (p0, p1, p2) = (
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.5),
            Point::new(2.0, 3.0),
        );

        let v0 = graph.add_vertex(p0);
        let v1 = graph.add_vertex(p1);
        let v2 = graph.add_vertex(p2);
        let e01 = graph.add_edge(v0, v1).unwrap();
        let e12 = graph.add_edge(v1, v2).unwrap();
        let e20 = graph.add_edge(v2, v0).unwrap();
        let f = graph
            .add_face([v0, v1, v2], [e01, e12, e20], circumcircle(p0, p1, p2))
            .unwrap();

        (graph, [v0, v1, v2], [e01, e12, e20], f)
    }

    #[test]
    fn test_add_face_wires_reciprocal_links() {
        let (graph, [v0, v1, v2], [e01, e12, e20], f) = triangle_graph();

        assert_eq!(graph.num_vertices(), 3);
        assert_eq!(graph.num_edges(), 3);
        assert_eq!(graph.num_faces(), 1);

        for vid in [v0, v1, v2] {
            let vertex = graph.vertex(vid).unwrap();
            assert_eq!(vertex.touching_faces(), &[f]);
            assert_eq!(vertex.incident_edges().len(), 2);
            assert_eq!(vertex.adjacent_vertices().len(), 2);
        }
        for eid in [e01, e12, e20] {
            assert_eq!(graph.edge(eid).unwrap().bordering_faces(), &[f]);
        }
        assert!(graph.check_soundness());
    }

    #[test]
    fn test_edge_between_lookup() {
        let (graph, [v0, v1, v2], [e01, _, e20], _) = triangle_graph();

        assert_eq!(graph.edge_between(v0, v1), Some(e01));
        assert_eq!(graph.edge_between(v1, v0), Some(e01));
        assert_eq!(graph.edge_between(v0, v2), Some(e20));
    }

    #[test]
    fn test_add_edge_rejects_duplicates_and_loops() {
        let (mut graph, [v0, v1, _, ], _, _) = triangle_graph();

        assert!(graph.add_edge(v0, v0).is_err());
        assert!(graph.add_edge(v0, v1).is_err());
    }

    #[test]
    fn test_remove_face_prunes_dead_entities() {
        let (mut graph, corners, _, f) = triangle_graph();

        let report = graph.remove_face(f).unwrap();

        // The lone face is gone; its edges bordered nothing afterwards, so
        // they are pruned, and the corners touched nothing, so they are too.
        assert_eq!(report.pruned_edges.len(), 3);
        assert_eq!(report.pruned_vertices.len(), 3);
        assert_eq!(graph.num_faces(), 0);
        assert_eq!(graph.num_edges(), 0);
        assert_eq!(graph.num_vertices(), 0);

        for vid in corners {
            assert!(graph.vertex(vid).is_err());
        }
    }

    #[test]
    fn test_shared_edge_survives_single_face_removal() {
        // Two faces over a shared diagonal.
        let mut graph = PlanarGraph::new();
        let (p0, p1, p2, p3) = (
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        );
        let v0 = graph.add_vertex(p0);
        let v1 = graph.add_vertex(p1);
        let v2 = graph.add_vertex(p2);
        let v3 = graph.add_vertex(p3);

        let e01 = graph.add_edge(v0, v1).unwrap();
        let e12 = graph.add_edge(v1, v2).unwrap();
        let e02 = graph.add_edge(v0, v2).unwrap();
        let e23 = graph.add_edge(v2, v3).unwrap();
        let e30 = graph.add_edge(v3, v0).unwrap();

        let f0 = graph
            .add_face([v0, v1, v2], [e01, e12, e02], circumcircle(p0, p1, p2))
            .unwrap();
        let f1 = graph
            .add_face([v0, v2, v3], [e02, e23, e30], circumcircle(p0, p2, p3))
            .unwrap();

        assert_eq!(graph.edge(e02).unwrap().bordering_faces(), &[f0, f1]);
        assert_eq!(graph.face(f1).unwrap().neighbors(), &[f0]);

        let report = graph.remove_face(f0).unwrap();

        // The diagonal still borders f1, so only the outer edges of f0 die;
        // v1 loses its last face and is pruned.
        assert_eq!(report.pruned_edges, vec![e01, e12]);
        assert_eq!(report.pruned_vertices.len(), 1);
        assert_eq!(report.pruned_vertices[0].0, v1);
        assert_eq!(graph.edge(e02).unwrap().bordering_faces(), &[f1]);
        assert!(graph.face(f1).unwrap().neighbors().is_empty());
        assert!(graph.check_soundness());
    }

    #[test]
    fn test_third_face_on_edge_is_rejected() {
        let (mut graph, [v0, v1, _], [e01, e12, e20], _) = triangle_graph();

        let p = Point::new(2.0, -3.0);
        let v3 = graph.add_vertex(p);
        let e03 = graph.add_edge(v0, v3).unwrap();
        let e13 = graph.add_edge(v1, v3).unwrap();
        graph
            .add_face(
                [v0, v1, v3],
                [e01, e13, e03],
                circumcircle(Point::new(0.0, 0.0), Point::new(4.0, 0.5), p),
            )
            .unwrap();

        let v4 = graph.add_vertex(Point::new(5.0, -1.0));
        let e04 = graph.add_edge(v0, v4).unwrap();
        let e14 = graph.add_edge(v1, v4).unwrap();
        let third = graph.add_face(
            [v0, v1, v4],
            [e01, e14, e04],
            circumcircle(Point::new(0.0, 0.0), Point::new(4.0, 0.5), Point::new(5.0, -1.0)),
        );

        assert!(third.is_err());
        let _ = (e12, e20);
    }

    #[test]
    fn test_absorb_preserves_topology() {
        let (mut graph, _, _, _) = triangle_graph();
        let (other, _, _, _) = triangle_graph();

        graph.absorb(other);

        assert_eq!(graph.num_vertices(), 6);
        assert_eq!(graph.num_edges(), 6);
        assert_eq!(graph.num_faces(), 2);
        assert!(graph.check_soundness());
    }

    #[test]
    fn test_handle_reuse_after_prune() {
        let (mut graph, _, _, f) = triangle_graph();
        graph.remove_face(f).unwrap();

        // Freed slots are reused; the graph stays consistent.
        let v = graph.add_vertex(Point::new(9.0, 9.0));
        assert!(graph.vertex(v).is_ok());
        assert_eq!(graph.num_vertices(), 1);
    }
}
