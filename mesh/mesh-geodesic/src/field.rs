//! Distance field representation.
//!
//! Holds the finalized windows of a propagation run and answers distance
//! queries for any point on the surface. Per-vertex distances are resolved
//! once when the field is built.

use nalgebra::{Point3, Vector2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GeodesicError, GeodesicResult};
use crate::mesh::GeodesicMesh;
use crate::params::PropagationParams;
use crate::point::SurfacePoint;
use crate::stats::PropagationStats;
use crate::unfold::to_edge_frame_3d;
use crate::window::{PseudoSource, Window};

/// Result of a distance query.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BestSource {
    /// Geodesic distance from the source; `f64::INFINITY` if unreachable.
    pub distance: f64,
    /// Pseudo-source the shortest path leaves from last, if reachable.
    pub pseudo_source: Option<PseudoSource>,
}

impl BestSource {
    /// The answer for a point no window reaches.
    pub const UNREACHABLE: Self = Self {
        distance: f64::INFINITY,
        pseudo_source: None,
    };

    /// True if the point was reached.
    #[inline]
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.distance.is_finite()
    }

    fn offer(&mut self, distance: f64, pseudo_source: PseudoSource) {
        if distance < self.distance {
            self.distance = distance;
            self.pseudo_source = Some(pseudo_source);
        }
    }
}

/// Exact geodesic distances from one source over a mesh.
///
/// Produced by [`propagate`](crate::propagate). Borrows the mesh it was
/// computed on.
#[derive(Debug, Clone)]
pub struct DistanceField<'m> {
    mesh: &'m GeodesicMesh,
    source: SurfacePoint,
    params: PropagationParams,
    /// Finalized windows per edge, ordered along the edge.
    windows: Vec<Vec<Window>>,
    vertices: Vec<BestSource>,
    stats: PropagationStats,
    diagnostics: Vec<GeodesicError>,
}

impl<'m> DistanceField<'m> {
    pub(crate) fn new(
        mesh: &'m GeodesicMesh,
        source: SurfacePoint,
        params: PropagationParams,
        windows: Vec<Vec<Window>>,
        stats: PropagationStats,
        diagnostics: Vec<GeodesicError>,
    ) -> Self {
        let mut field = Self {
            mesh,
            source,
            params,
            windows,
            vertices: Vec::new(),
            stats,
            diagnostics,
        };
        let vertices = (0..mesh.vertex_count())
            .map(|v| field.scan_vertex(v))
            .collect();
        field.vertices = vertices;
        field
    }

    /// Distance and dominating pseudo-source for any point on the mesh.
    ///
    /// Unreached points (another connected component, or beyond the
    /// propagation cutoff) report [`BestSource::UNREACHABLE`].
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::OutOfDomain`] if the point cannot be located
    /// on the mesh.
    pub fn query(&self, point: &SurfacePoint) -> GeodesicResult<BestSource> {
        let point = point
            .canonicalize(self.mesh)
            .map_err(GeodesicError::out_of_domain)?;
        Ok(match point {
            SurfacePoint::Vertex(v) => self.vertices[v],
            SurfacePoint::Edge { edge, t } => self.scan_edge(edge, t),
            SurfacePoint::Face { face, .. } => {
                let position = point
                    .position(self.mesh)
                    .map_err(GeodesicError::out_of_domain)?;
                self.scan_face(face, &position)
            }
        })
    }

    /// Distance to any point on the mesh.
    ///
    /// # Errors
    ///
    /// See [`DistanceField::query`].
    pub fn distance(&self, point: &SurfacePoint) -> GeodesicResult<f64> {
        self.query(point).map(|best| best.distance)
    }

    /// Distance to a vertex.
    ///
    /// Returns `f64::INFINITY` if the vertex is unreachable or the index is
    /// out of bounds.
    #[inline]
    #[must_use]
    pub fn vertex_distance(&self, vertex: usize) -> f64 {
        self.vertices
            .get(vertex)
            .map_or(f64::INFINITY, |best| best.distance)
    }

    /// Pseudo-source the shortest path to a vertex leaves from last.
    #[must_use]
    pub fn vertex_source(&self, vertex: usize) -> Option<PseudoSource> {
        self.vertices.get(vertex).and_then(|best| best.pseudo_source)
    }

    /// One distance per vertex, in vertex order.
    #[must_use]
    pub fn vertex_distances(&self) -> Vec<f64> {
        self.vertices.iter().map(|best| best.distance).collect()
    }

    /// The (canonical) source point.
    #[must_use]
    pub const fn source(&self) -> &SurfacePoint {
        &self.source
    }

    /// The mesh the field was computed on.
    #[must_use]
    pub const fn mesh(&self) -> &'m GeodesicMesh {
        self.mesh
    }

    /// Parameters the field was computed with.
    #[must_use]
    pub const fn params(&self) -> &PropagationParams {
        &self.params
    }

    /// Counters from the propagation run.
    #[must_use]
    pub const fn stats(&self) -> &PropagationStats {
        &self.stats
    }

    /// Faces skipped during propagation, as
    /// [`GeodesicError::NumericalDegenerate`] values.
    #[must_use]
    pub fn diagnostics(&self) -> &[GeodesicError] {
        &self.diagnostics
    }

    /// Finalized windows on an edge, ordered along it.
    ///
    /// Returns an empty slice for an out-of-range edge.
    #[must_use]
    pub fn windows_on_edge(&self, edge: usize) -> &[Window] {
        self.windows
            .get(edge)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of finalized windows.
    #[must_use]
    pub fn window_count(&self) -> usize {
        self.windows.iter().map(Vec::len).sum()
    }

    /// Get the maximum finite vertex distance.
    #[must_use]
    pub fn max_distance(&self) -> f64 {
        self.iter_reachable()
            .map(|(_, d)| d)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Count the number of reachable vertices (finite distance).
    #[must_use]
    pub fn reachable_count(&self) -> usize {
        self.iter_reachable().count()
    }

    /// Count the number of unreachable vertices (infinite distance).
    #[must_use]
    pub fn unreachable_count(&self) -> usize {
        self.vertices.len() - self.reachable_count()
    }

    /// Iterate over (vertex index, distance) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, best)| (i, best.distance))
    }

    /// Iterate over reachable vertices only.
    pub fn iter_reachable(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.iter().filter(|(_, d)| d.is_finite())
    }

    /// Find the vertex with the maximum finite distance.
    ///
    /// Returns `None` if no vertices are reachable.
    #[must_use]
    pub fn farthest_vertex(&self) -> Option<(usize, f64)> {
        self.iter_reachable()
            .max_by(|(_, d1), (_, d2)| d1.total_cmp(d2))
    }

    /// Vertex distances scaled to `[0, 1]` by the maximum finite distance.
    ///
    /// Unreachable vertices remain at infinity.
    #[must_use]
    pub fn normalized_distances(&self) -> Vec<f64> {
        let max = self.max_distance();
        if max <= 0.0 || !max.is_finite() {
            return self.vertex_distances();
        }
        self.iter()
            .map(|(_, d)| if d.is_finite() { d / max } else { d })
            .collect()
    }

    fn within_cutoff(&self, best: BestSource) -> BestSource {
        if self.params.exceeds_cutoff(best.distance) {
            BestSource::UNREACHABLE
        } else {
            best
        }
    }

    fn scan_vertex(&self, vertex: usize) -> BestSource {
        if self.source == SurfacePoint::Vertex(vertex) {
            return BestSource {
                distance: 0.0,
                pseudo_source: Some(PseudoSource::Source),
            };
        }
        let mut best = BestSource::UNREACHABLE;
        for &edge in self.mesh.vertex_edges(vertex) {
            let x = if self.mesh.edge(edge).vertices[0] == vertex {
                0.0
            } else {
                self.mesh.edge_length(edge)
            };
            for window in &self.windows[edge] {
                best.offer(window.bounded_distance_at(x), window.pseudo_source);
            }
        }
        self.within_cutoff(best)
    }

    fn scan_edge(&self, edge: usize, t: f64) -> BestSource {
        let x = t * self.mesh.edge_length(edge);
        let mut best = BestSource::UNREACHABLE;
        for window in &self.windows[edge] {
            best.offer(window.bounded_distance_at(x), window.pseudo_source);
        }
        self.within_cutoff(best)
    }

    fn scan_face(&self, face: usize, position: &Point3<f64>) -> BestSource {
        let mesh = self.mesh;
        let mut best = BestSource::UNREACHABLE;

        if matches!(self.source, SurfacePoint::Face { face: home, .. } if home == face) {
            if let Ok(origin) = self.source.position(mesh) {
                best.offer((position - origin).norm(), PseudoSource::Source);
            }
        }

        // Windows entering this face through one of its edges
        for edge in mesh.face_edges(face) {
            let [a, b] = mesh.edge(edge).vertices;
            let local = to_edge_frame_3d(position, &mesh.position(a), &mesh.position(b));
            let target = Vector2::new(local.x, -local.y);
            for window in &self.windows[edge] {
                if window.from_face != Some(face) {
                    best.offer(window.distance_through(&target), window.pseudo_source);
                }
            }
        }

        // Paths that bend at a corner
        for corner in mesh.face(face) {
            let Some(pseudo_source) = self.vertex_pseudo_source(corner) else {
                continue;
            };
            let through = self.vertices[corner].distance + (position - mesh.position(corner)).norm();
            best.offer(through, pseudo_source);
        }

        self.within_cutoff(best)
    }

    /// How a corner would be reported if a path bends there.
    fn vertex_pseudo_source(&self, vertex: usize) -> Option<PseudoSource> {
        if self.source == SurfacePoint::Vertex(vertex) {
            Some(PseudoSource::Source)
        } else if self
            .mesh
            .is_saddle_or_boundary(vertex, self.params.saddle_angle_tolerance)
            && self.vertices[vertex].is_reachable()
        {
            Some(PseudoSource::Vertex(vertex))
        } else {
            None
        }
    }
}
