//! Continuous-Dijkstra window propagation.
//!
//! Windows are processed in order of their distance lower bound. Popping a
//! window unfolds the face across its edge and casts the window's interval
//! through it, giving at most one child on each of the face's other two
//! edges. Children are merged into the target edge's window list so that
//! every edge point keeps only its shortest window. Saddle and boundary
//! vertices reached by the wavefront become pseudo-sources of their own.

use hashbrown::HashSet;
use nalgebra::{Point3, Vector2};
use tracing::{debug, info, warn};

use crate::arena::{WindowArena, WindowId};
use crate::error::{GeodesicError, GeodesicResult};
use crate::field::DistanceField;
use crate::mesh::GeodesicMesh;
use crate::observer::{NoopObserver, PropagationEvent, PropagationObserver};
use crate::params::PropagationParams;
use crate::point::SurfacePoint;
use crate::queue::{Event, EventQueue};
use crate::stats::PropagationStats;
use crate::unfold::{place_apex, ray_segment_param, to_edge_frame, to_edge_frame_3d};
use crate::window::{PseudoSource, Window, partition_overlap};

/// Compute exact geodesic distances from `source` with default parameters.
///
/// # Errors
///
/// Returns [`GeodesicError::InvalidSource`] if the source does not lie on
/// the mesh.
///
/// # Example
///
/// ```
/// use mesh_geodesic::{GeodesicMesh, SurfacePoint, propagate};
///
/// let vertices = [
///     [0.0, 0.0, 0.0],
///     [1.0, 0.0, 0.0],
///     [1.0, 1.0, 0.0],
///     [0.0, 1.0, 0.0],
/// ];
/// let mesh = GeodesicMesh::build(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
/// let field = propagate(&mesh, &SurfacePoint::Vertex(0)).unwrap();
///
/// assert!((field.vertex_distance(2) - 2f64.sqrt()).abs() < 1e-9);
/// ```
pub fn propagate<'m>(
    mesh: &'m GeodesicMesh,
    source: &SurfacePoint,
) -> GeodesicResult<DistanceField<'m>> {
    propagate_with(mesh, source, &PropagationParams::default())
}

/// Compute exact geodesic distances from `source` with custom parameters.
///
/// # Errors
///
/// Returns [`GeodesicError::InvalidSource`] if the source does not lie on
/// the mesh.
pub fn propagate_with<'m>(
    mesh: &'m GeodesicMesh,
    source: &SurfacePoint,
    params: &PropagationParams,
) -> GeodesicResult<DistanceField<'m>> {
    propagate_with_observer(mesh, source, params, &mut NoopObserver)
}

/// Compute exact geodesic distances, reporting progress to `observer`.
///
/// # Errors
///
/// Returns [`GeodesicError::InvalidSource`] if the source does not lie on
/// the mesh.
pub fn propagate_with_observer<'m, O>(
    mesh: &'m GeodesicMesh,
    source: &SurfacePoint,
    params: &PropagationParams,
    observer: &mut O,
) -> GeodesicResult<DistanceField<'m>>
where
    O: PropagationObserver + ?Sized,
{
    let source = source
        .canonicalize(mesh)
        .map_err(GeodesicError::invalid_source)?;

    info!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        source = ?source,
        "Starting geodesic propagation"
    );

    let mut engine = Engine::new(mesh, params, observer);
    engine.seed(&source)?;
    engine.run();
    let (windows, stats, diagnostics) = engine.finish();

    info!(
        windows = stats.final_windows,
        propagated = stats.windows_propagated,
        vertex_sources = stats.vertex_sources,
        "Geodesic propagation complete"
    );

    Ok(DistanceField::new(
        mesh,
        source,
        params.clone(),
        windows,
        stats,
        diagnostics,
    ))
}

struct Engine<'m, 'a, O: ?Sized> {
    mesh: &'m GeodesicMesh,
    params: &'a PropagationParams,
    /// Absolute length/distance tolerance.
    tolerance: f64,
    arena: WindowArena,
    queue: EventQueue,
    /// Best distance seen at each vertex.
    vertex_distance: Vec<f64>,
    /// Distance at which each vertex last emitted windows.
    spawned_at: Vec<f64>,
    skipped_faces: HashSet<usize>,
    diagnostics: Vec<GeodesicError>,
    stats: PropagationStats,
    observer: &'a mut O,
}

impl<'m, 'a, O> Engine<'m, 'a, O>
where
    O: PropagationObserver + ?Sized,
{
    fn new(mesh: &'m GeodesicMesh, params: &'a PropagationParams, observer: &'a mut O) -> Self {
        Self {
            mesh,
            params,
            tolerance: params.epsilon.max(0.0) * mesh.mean_edge_length(),
            arena: WindowArena::new(mesh.edge_count()),
            queue: EventQueue::new(),
            vertex_distance: vec![f64::INFINITY; mesh.vertex_count()],
            spawned_at: vec![f64::INFINITY; mesh.vertex_count()],
            skipped_faces: HashSet::new(),
            diagnostics: Vec::new(),
            stats: PropagationStats::default(),
            observer,
        }
    }

    /// Place the initial windows around a canonical source point.
    fn seed(&mut self, source: &SurfacePoint) -> GeodesicResult<()> {
        let mesh = self.mesh;
        match *source {
            SurfacePoint::Vertex(v) => {
                self.vertex_distance[v] = 0.0;
                self.spawned_at[v] = 0.0;
                self.emit_from_vertex(v, 0.0, PseudoSource::Source);
            }
            SurfacePoint::Edge { edge, t } => {
                let length = mesh.edge_length(edge);
                self.insert_candidate(Window {
                    edge,
                    b0: 0.0,
                    b1: length,
                    source: Vector2::new(t * length, 0.0),
                    sigma: 0.0,
                    from_face: None,
                    pseudo_source: PseudoSource::Source,
                });
                let position = source
                    .position(mesh)
                    .map_err(GeodesicError::invalid_source)?;
                for face in mesh.edge(edge).faces.into_iter().flatten() {
                    for other in mesh.face_edges(face) {
                        if other != edge {
                            self.emit_across(other, face, &position, 0.0, PseudoSource::Source);
                        }
                    }
                }
            }
            SurfacePoint::Face { face, .. } => {
                let position = source
                    .position(mesh)
                    .map_err(GeodesicError::invalid_source)?;
                for edge in mesh.face_edges(face) {
                    self.emit_across(edge, face, &position, 0.0, PseudoSource::Source);
                }
            }
        }

        let windows = self.arena.live();
        debug!(windows, "Seeded source windows");
        self.observer
            .on_event(&PropagationEvent::Seeded { source, windows });
        Ok(())
    }

    fn run(&mut self) {
        while let Some((key, event)) = self.queue.pop() {
            match event {
                Event::Window(id) => self.process_window(id),
                Event::Vertex(v) => self.process_vertex(v, key),
            }
        }
    }

    fn finish(mut self) -> (Vec<Vec<Window>>, PropagationStats, Vec<GeodesicError>) {
        self.stats.degenerate_faces = self.skipped_faces.len();
        self.stats.peak_live_windows = self.arena.peak_live();
        self.stats.peak_queue_len = self.queue.peak_len();
        self.stats.final_windows = self.arena.live();
        self.observer
            .on_event(&PropagationEvent::Finished { stats: &self.stats });
        (self.arena.into_edge_windows(), self.stats, self.diagnostics)
    }

    fn process_window(&mut self, id: WindowId) {
        // Retired ids resolve to nothing
        let Some(window) = self.arena.get(id).cloned() else {
            return;
        };
        if self.arena.is_propagated(id) {
            return;
        }
        self.arena.mark_propagated(id);
        self.stats.windows_propagated += 1;
        self.propagate_window(&window);
    }

    fn process_vertex(&mut self, vertex: usize, key: f64) {
        let distance = self.vertex_distance[vertex];
        if key > distance + self.tolerance || self.spawned_at[vertex] <= distance + self.tolerance {
            return;
        }
        self.spawned_at[vertex] = distance;
        self.stats.vertex_sources += 1;

        debug!(vertex, distance, "Vertex became a pseudo-source");
        self.observer
            .on_event(&PropagationEvent::VertexSourceSpawned { vertex, distance });
        self.emit_from_vertex(vertex, distance, PseudoSource::Vertex(vertex));
    }

    /// Windows radiating from a vertex: along every incident edge and onto
    /// the far edge of every incident face.
    fn emit_from_vertex(&mut self, vertex: usize, sigma: f64, pseudo_source: PseudoSource) {
        let mesh = self.mesh;
        for &edge in mesh.vertex_edges(vertex) {
            let length = mesh.edge_length(edge);
            let x = if mesh.edge(edge).vertices[0] == vertex {
                0.0
            } else {
                length
            };
            self.insert_candidate(Window {
                edge,
                b0: 0.0,
                b1: length,
                source: Vector2::new(x, 0.0),
                sigma,
                from_face: None,
                pseudo_source,
            });
        }

        let position = mesh.position(vertex);
        for &face in mesh.vertex_faces(vertex) {
            if let Some(edge) = mesh.opposite_edge(face, vertex) {
                self.emit_across(edge, face, &position, sigma, pseudo_source);
            }
        }
    }

    /// A full-edge window seen from a point inside `face`.
    fn emit_across(
        &mut self,
        edge: usize,
        face: usize,
        position: &Point3<f64>,
        sigma: f64,
        pseudo_source: PseudoSource,
    ) {
        let mesh = self.mesh;
        let [a, b] = mesh.edge(edge).vertices;
        let source = to_edge_frame_3d(position, &mesh.position(a), &mesh.position(b));
        self.insert_candidate(Window {
            edge,
            b0: 0.0,
            b1: mesh.edge_length(edge),
            source,
            sigma,
            from_face: Some(face),
            pseudo_source,
        });
    }

    /// Cast a window through the face on the far side of its edge.
    fn propagate_window(&mut self, window: &Window) {
        let mesh = self.mesh;
        let tol = self.tolerance;
        let Some(from_face) = window.from_face else {
            return;
        };
        let record = mesh.edge(window.edge);
        let Some(face) = record.other_face(from_face) else {
            return;
        };
        let [a, b] = record.vertices;
        let Some(apex) = mesh.opposite_vertex(face, window.edge) else {
            return;
        };
        let (Some(left_edge), Some(right_edge)) =
            (mesh.edge_between(a, apex), mesh.edge_between(apex, b))
        else {
            return;
        };

        let length = mesh.edge_length(window.edge);
        let Some(placed) = place_apex(
            length,
            mesh.edge_length(left_edge),
            mesh.edge_length(right_edge),
            tol,
        ) else {
            self.skip_face(face, "apex cannot be placed against the shared edge");
            return;
        };

        // The face being entered lies below the edge, the pseudo-source above.
        let unfolded = Unfolded {
            vertices: [a, b, apex],
            points: [
                Vector2::zeros(),
                Vector2::new(length, 0.0),
                Vector2::new(placed.x, -placed.y),
            ],
        };
        let [corner_a, corner_b, corner_c] = unfolded.points;
        let p = window.source;
        if p.y <= tol {
            return;
        }

        // Rays left of `split` leave through A-C, the rest through C-B.
        let split = (corner_c.x - p.x).mul_add(p.y / (p.y - corner_c.y), p.x);
        let (lo, hi) = (window.b0, window.b1);

        let left_end = split.min(hi);
        if left_end - lo > tol {
            let start = (lo <= tol).then_some(corner_a);
            let end = (split <= hi).then_some(corner_c);
            if let (Some(h0), Some(h1)) = (
                exit_point(&p, lo, &corner_a, &corner_c, start),
                exit_point(&p, left_end, &corner_a, &corner_c, end),
            ) {
                self.add_child(window, face, left_edge, &unfolded, h0, h1);
            }
        }

        let right_start = split.max(lo);
        if hi - right_start > tol {
            let start = (split >= lo).then_some(corner_c);
            let end = (hi >= length - tol).then_some(corner_b);
            if let (Some(h0), Some(h1)) = (
                exit_point(&p, right_start, &corner_c, &corner_b, start),
                exit_point(&p, hi, &corner_c, &corner_b, end),
            ) {
                self.add_child(window, face, right_edge, &unfolded, h0, h1);
            }
        }
    }

    fn add_child(
        &mut self,
        parent: &Window,
        face: usize,
        edge: usize,
        unfolded: &Unfolded,
        h0: Vector2<f64>,
        h1: Vector2<f64>,
    ) {
        let mesh = self.mesh;
        let [v0, v1] = mesh.edge(edge).vertices;
        let q0 = unfolded.locate(v0);
        let q1 = unfolded.locate(v1);
        let t0 = (h0 - q0).norm();
        let t1 = (h1 - q0).norm();
        self.insert_candidate(Window {
            edge,
            b0: t0.min(t1),
            b1: t0.max(t1),
            source: to_edge_frame(&parent.source, &q0, &q1),
            sigma: parent.sigma,
            from_face: Some(face),
            pseudo_source: parent.pseudo_source,
        });
    }

    /// Merge a candidate into its edge, keeping the shortest window at every
    /// point. The incumbent keeps near-ties.
    fn insert_candidate(&mut self, mut candidate: Window) {
        let mesh = self.mesh;
        let tol = self.tolerance;
        let length = mesh.edge_length(candidate.edge);
        candidate.b0 = candidate.b0.max(0.0);
        candidate.b1 = candidate.b1.min(length);
        if candidate.length() <= tol {
            self.stats.windows_rejected += 1;
            return;
        }

        let overlapping: Vec<(WindowId, Window)> = self
            .arena
            .edge_windows(candidate.edge)
            .iter()
            .filter_map(|&id| self.arena.get(id).map(|w| (id, w.clone())))
            .filter(|(_, w)| w.b1 > candidate.b0 && w.b0 < candidate.b1)
            .collect();

        let mut pieces = vec![(candidate.b0, candidate.b1)];
        for (_, incumbent) in &overlapping {
            let lo = candidate.b0.max(incumbent.b0);
            let hi = candidate.b1.min(incumbent.b1);
            if hi - lo <= tol {
                pieces = subtract(&pieces, lo, hi);
                continue;
            }
            for (s0, s1, wins) in partition_overlap(&candidate, incumbent, lo, hi, tol) {
                if !wins {
                    pieces = subtract(&pieces, s0, s1);
                }
            }
        }
        pieces.retain(|&(p0, p1)| p1 - p0 > tol);
        if pieces.is_empty() {
            self.stats.windows_rejected += 1;
            return;
        }

        for (id, incumbent) in overlapping {
            if !pieces
                .iter()
                .any(|&(p0, p1)| p0 < incumbent.b1 && p1 > incumbent.b0)
            {
                continue;
            }
            let propagated = self.arena.is_propagated(id);
            self.arena.remove(id);

            let mut remaining = vec![(incumbent.b0, incumbent.b1)];
            for &(p0, p1) in &pieces {
                remaining = subtract(&remaining, p0, p1);
            }
            remaining.retain(|&(r0, r1)| r1 - r0 > tol);
            if remaining.is_empty() {
                self.stats.windows_retired += 1;
            }
            for (r0, r1) in remaining {
                let piece = incumbent.clipped(r0, r1);
                let key = piece.lower_bound();
                self.stats.windows_created += 1;
                let id = self.arena.insert(piece, propagated);
                if !propagated {
                    self.queue.push(key, Event::Window(id));
                }
            }
        }

        let record = mesh.edge(candidate.edge);
        let open = candidate
            .from_face
            .and_then(|face| record.other_face(face))
            .is_some();
        for (p0, p1) in pieces {
            let window = candidate.clipped(p0, p1);
            if p0 <= tol {
                self.relax_vertex(record.vertices[0], window.bounded_distance_at(0.0));
            }
            if p1 >= length - tol {
                self.relax_vertex(record.vertices[1], window.bounded_distance_at(length));
            }

            let key = window.lower_bound();
            let pending = open && !self.params.exceeds_cutoff(key);
            self.stats.windows_created += 1;
            let id = self.arena.insert(window, !pending);
            if pending {
                self.queue.push(key, Event::Window(id));
            }
        }
    }

    fn relax_vertex(&mut self, vertex: usize, distance: f64) {
        if distance + self.tolerance >= self.vertex_distance[vertex] {
            return;
        }
        self.vertex_distance[vertex] = distance;
        if self
            .mesh
            .is_saddle_or_boundary(vertex, self.params.saddle_angle_tolerance)
            && !self.params.exceeds_cutoff(distance)
        {
            self.queue.push(distance, Event::Vertex(vertex));
        }
    }

    fn skip_face(&mut self, face: usize, reason: &str) {
        if !self.skipped_faces.insert(face) {
            return;
        }
        warn!(face, reason, "Skipping face that cannot be unfolded");
        self.diagnostics.push(GeodesicError::NumericalDegenerate {
            face,
            reason: reason.to_string(),
        });
        if let Some(diagnostic) = self.diagnostics.last() {
            self.observer
                .on_event(&PropagationEvent::FaceSkipped { diagnostic });
        }
    }
}

/// A face laid out in the frame of the edge a window entered through.
struct Unfolded {
    vertices: [usize; 3],
    points: [Vector2<f64>; 3],
}

impl Unfolded {
    fn locate(&self, vertex: usize) -> Vector2<f64> {
        self.vertices
            .iter()
            .position(|&v| v == vertex)
            .map_or(self.points[2], |i| self.points[i])
    }
}

/// Where the ray from `origin` through the edge point `x` leaves the face
/// through `q0 → q1`; `snapped` overrides the result with an exact corner.
fn exit_point(
    origin: &Vector2<f64>,
    x: f64,
    q0: &Vector2<f64>,
    q1: &Vector2<f64>,
    snapped: Option<Vector2<f64>>,
) -> Option<Vector2<f64>> {
    if snapped.is_some() {
        return snapped;
    }
    let u = ray_segment_param(origin, &Vector2::new(x, 0.0), q0, q1)?.clamp(0.0, 1.0);
    Some(q0 + (q1 - q0) * u)
}

/// Remove `[lo, hi]` from a list of disjoint intervals.
fn subtract(pieces: &[(f64, f64)], lo: f64, hi: f64) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(pieces.len() + 1);
    for &(p0, p1) in pieces {
        if hi <= p0 || lo >= p1 {
            out.push((p0, p1));
            continue;
        }
        if p0 < lo {
            out.push((p0, lo));
        }
        if hi < p1 {
            out.push((hi, p1));
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn square() -> GeodesicMesh {
        let vertices = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        GeodesicMesh::build(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap()
    }

    #[test]
    fn subtract_intervals() {
        let pieces = vec![(0.0, 1.0), (2.0, 3.0)];
        assert_eq!(subtract(&pieces, 0.5, 2.5), vec![(0.0, 0.5), (2.5, 3.0)]);
        assert_eq!(subtract(&pieces, 0.2, 0.4), vec![(0.0, 0.2), (0.4, 1.0), (2.0, 3.0)]);
        assert!(subtract(&pieces, -1.0, 4.0).is_empty());
        assert_eq!(subtract(&pieces, 1.0, 2.0), pieces);
    }

    #[test]
    fn exit_point_snaps_and_intersects() {
        let origin = Vector2::new(0.5, 1.0);
        let q0 = Vector2::new(0.0, 0.0);
        let q1 = Vector2::new(1.0, -1.0);
        let corner = Vector2::new(7.0, 7.0);
        assert_eq!(exit_point(&origin, 0.2, &q0, &q1, Some(corner)), Some(corner));

        // Ray from (0.5, 1) through (0.5, 0) meets the diagonal at (0.5, -0.5)
        let hit = exit_point(&origin, 0.5, &q0, &q1, None).unwrap();
        assert_relative_eq!(hit, Vector2::new(0.5, -0.5), epsilon = 1e-12);
    }

    #[test]
    fn square_diagonal_is_straight() {
        let mesh = square();
        let field = propagate(&mesh, &SurfacePoint::Vertex(0)).unwrap();
        assert_relative_eq!(field.vertex_distance(0), 0.0);
        assert_relative_eq!(field.vertex_distance(1), 1.0, epsilon = 1e-9);
        assert_relative_eq!(field.vertex_distance(2), 2f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(field.vertex_distance(3), 1.0, epsilon = 1e-9);
        assert!(field.diagnostics().is_empty());
    }

    #[test]
    fn edge_source_reaches_both_faces() {
        let mesh = square();
        // Midpoint of the diagonal
        let source = SurfacePoint::on_edge_between(&mesh, 0, 2, 0.5).unwrap();
        let field = propagate(&mesh, &source).unwrap();
        let half_diagonal = 0.5 * 2f64.sqrt();
        for v in 0..4 {
            assert_relative_eq!(field.vertex_distance(v), half_diagonal, epsilon = 1e-9);
        }
    }

    #[test]
    fn face_source_reaches_all_vertices() {
        let mesh = square();
        let source = SurfacePoint::Face {
            face: 0,
            barycentric: [0.5, 0.25, 0.25],
        };
        let position = source.position(&mesh).unwrap();
        let field = propagate(&mesh, &source).unwrap();
        for v in 0..4 {
            let expected = (mesh.position(v) - position).norm();
            assert_relative_eq!(field.vertex_distance(v), expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn invalid_source_is_rejected() {
        let mesh = square();
        let err = propagate(&mesh, &SurfacePoint::Vertex(9)).unwrap_err();
        assert!(matches!(err, GeodesicError::InvalidSource { .. }));
    }

    #[test]
    fn stats_are_consistent() {
        let mesh = square();
        let field = propagate(&mesh, &SurfacePoint::Vertex(1)).unwrap();
        let stats = field.stats();
        assert_eq!(stats.final_windows, field.window_count());
        assert!(stats.windows_created >= stats.final_windows);
        assert!(stats.peak_live_windows >= stats.final_windows);
        assert_eq!(stats.degenerate_faces, 0);
    }
}
