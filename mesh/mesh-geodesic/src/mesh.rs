//! Validated triangle mesh used by the propagation engine.

use std::f64::consts::TAU;

use nalgebra::Point3;

use crate::adjacency::{Adjacency, EdgeRecord};
use crate::error::{GeodesicResult, MeshDefect};

/// An immutable, validated triangle mesh with derived adjacency.
///
/// Construction rejects empty input, non-finite coordinates, out-of-range or
/// repeated face indices, zero-area faces and edges shared by more than two
/// faces. Everything the propagation engine needs (edge lengths, corner
/// angles, boundary and saddle classification) is computed once here.
///
/// # Example
///
/// ```
/// use mesh_geodesic::GeodesicMesh;
///
/// let vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
/// let mesh = GeodesicMesh::build(&vertices, &[[0, 1, 2]]).unwrap();
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.edge_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct GeodesicMesh {
    positions: Vec<Point3<f64>>,
    faces: Vec<[usize; 3]>,
    adjacency: Adjacency,
    edge_lengths: Vec<f64>,
    /// Interior angle at each face corner, ordered as the face's vertices.
    corner_angles: Vec<[f64; 3]>,
    /// Sum of incident corner angles per vertex.
    total_angles: Vec<f64>,
    boundary_vertices: Vec<bool>,
    mean_edge_length: f64,
}

impl GeodesicMesh {
    /// Build a mesh from vertex coordinates and 0-based face index triples.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::InvalidMesh`](crate::GeodesicError::InvalidMesh)
    /// describing the first defect found.
    pub fn build(vertices: &[[f64; 3]], faces: &[[u32; 3]]) -> GeodesicResult<Self> {
        let positions = vertices
            .iter()
            .map(|&[x, y, z]| Point3::new(x, y, z))
            .collect();
        Self::from_points(positions, faces)
    }

    /// Build a mesh from flat coordinate and index arrays.
    ///
    /// `positions` is `[x0, y0, z0, x1, ...]`, `indices` is
    /// `[a0, b0, c0, a1, ...]`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshDefect::Dimension`] if either array length is not a
    /// multiple of three, plus every defect [`GeodesicMesh::build`] reports.
    pub fn from_flat(positions: &[f64], indices: &[u32]) -> GeodesicResult<Self> {
        if positions.len() % 3 != 0 {
            return Err(MeshDefect::Dimension {
                what: "vertex",
                expected: 3,
                actual: positions.len(),
            }
            .into());
        }
        if indices.len() % 3 != 0 {
            return Err(MeshDefect::Dimension {
                what: "face",
                expected: 3,
                actual: indices.len(),
            }
            .into());
        }

        let points = positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        let faces: Vec<[u32; 3]> = indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Self::from_points(points, &faces)
    }

    /// Build a mesh from nalgebra points.
    ///
    /// # Errors
    ///
    /// See [`GeodesicMesh::build`].
    pub fn from_points(positions: Vec<Point3<f64>>, faces: &[[u32; 3]]) -> GeodesicResult<Self> {
        let vertex_count = positions.len();
        if vertex_count == 0 || faces.is_empty() {
            return Err(MeshDefect::Empty {
                vertex_count,
                face_count: faces.len(),
            }
            .into());
        }

        if let Some(vertex) = positions
            .iter()
            .position(|p| !p.coords.iter().all(|c| c.is_finite()))
        {
            return Err(MeshDefect::NonFiniteCoordinate { vertex }.into());
        }

        let mut checked = Vec::with_capacity(faces.len());
        for (face, tri) in faces.iter().enumerate() {
            let mut idx = [0usize; 3];
            for (slot, &raw) in idx.iter_mut().zip(tri) {
                let index = raw as usize;
                if index >= vertex_count {
                    return Err(MeshDefect::IndexOutOfRange {
                        face,
                        index,
                        vertex_count,
                    }
                    .into());
                }
                *slot = index;
            }
            if idx[0] == idx[1] || idx[1] == idx[2] || idx[2] == idx[0] {
                return Err(MeshDefect::RepeatedVertex { face }.into());
            }

            let [a, b, c] = idx.map(|i| positions[i]);
            let area = 0.5 * (b - a).cross(&(c - a)).norm();
            let longest = (b - a)
                .norm_squared()
                .max((c - b).norm_squared())
                .max((a - c).norm_squared());
            if area <= f64::EPSILON * longest {
                return Err(MeshDefect::DegenerateFace { face, area }.into());
            }
            checked.push(idx);
        }

        let adjacency = Adjacency::build(vertex_count, &checked)?;

        let edge_lengths: Vec<f64> = adjacency
            .edges()
            .iter()
            .map(|e| (positions[e.vertices[1]] - positions[e.vertices[0]]).norm())
            .collect();
        #[allow(clippy::cast_precision_loss)]
        let mean_edge_length = edge_lengths.iter().sum::<f64>() / edge_lengths.len() as f64;

        let mut total_angles = vec![0.0; vertex_count];
        let corner_angles: Vec<[f64; 3]> = checked
            .iter()
            .map(|face| {
                let mut angles = [0.0; 3];
                for (i, angle) in angles.iter_mut().enumerate() {
                    let at = positions[face[i]];
                    let u = positions[face[(i + 1) % 3]] - at;
                    let v = positions[face[(i + 2) % 3]] - at;
                    *angle = u.cross(&v).norm().atan2(u.dot(&v));
                    total_angles[face[i]] += *angle;
                }
                angles
            })
            .collect();

        let mut boundary_vertices = vec![false; vertex_count];
        for edge in adjacency.edges().iter().filter(|e| e.is_boundary()) {
            boundary_vertices[edge.vertices[0]] = true;
            boundary_vertices[edge.vertices[1]] = true;
        }

        Ok(Self {
            positions,
            faces: checked,
            adjacency,
            edge_lengths,
            corner_angles,
            total_angles,
            boundary_vertices,
            mean_edge_length,
        })
    }

    /// Number of vertices, including any not referenced by a face.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of faces.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of unique edges.
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_lengths.len()
    }

    /// Number of edges with a single incident face.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.adjacency.boundary_edge_count()
    }

    /// True if the surface has no boundary.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.boundary_edge_count() == 0
    }

    /// Position of a vertex.
    ///
    /// # Panics
    ///
    /// Panics if `vertex` is out of range.
    #[inline]
    #[must_use]
    pub fn position(&self, vertex: usize) -> Point3<f64> {
        self.positions[vertex]
    }

    /// All vertex positions.
    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Vertex indices of a face.
    #[inline]
    #[must_use]
    pub fn face(&self, face: usize) -> [usize; 3] {
        self.faces[face]
    }

    /// Edge indices of a face; entry `i` joins corner `i` to corner `i + 1`.
    #[inline]
    #[must_use]
    pub fn face_edges(&self, face: usize) -> [usize; 3] {
        self.adjacency.face_edges(face)
    }

    /// Edge record (endpoints and incident faces).
    #[inline]
    #[must_use]
    pub fn edge(&self, edge: usize) -> &EdgeRecord {
        &self.adjacency.edges()[edge]
    }

    /// Length of an edge.
    #[inline]
    #[must_use]
    pub fn edge_length(&self, edge: usize) -> f64 {
        self.edge_lengths[edge]
    }

    /// Edges incident to a vertex.
    #[inline]
    #[must_use]
    pub fn vertex_edges(&self, vertex: usize) -> &[usize] {
        self.adjacency.vertex_edges(vertex)
    }

    /// Faces incident to a vertex.
    #[inline]
    #[must_use]
    pub fn vertex_faces(&self, vertex: usize) -> &[usize] {
        self.adjacency.vertex_faces(vertex)
    }

    /// Interior angles at the three corners of a face.
    #[inline]
    #[must_use]
    pub fn corner_angles(&self, face: usize) -> [f64; 3] {
        self.corner_angles[face]
    }

    /// Sum of the corner angles around a vertex.
    #[inline]
    #[must_use]
    pub fn total_angle(&self, vertex: usize) -> f64 {
        self.total_angles[vertex]
    }

    /// True if the vertex touches a boundary edge.
    #[inline]
    #[must_use]
    pub fn is_boundary_vertex(&self, vertex: usize) -> bool {
        self.boundary_vertices[vertex]
    }

    /// True if shortest paths may bend at this vertex.
    ///
    /// That is the case on the boundary and wherever the total angle is at
    /// least `2π` (within `tolerance`). Paths never pass through the apex of
    /// a convex vertex.
    #[must_use]
    pub fn is_saddle_or_boundary(&self, vertex: usize, tolerance: f64) -> bool {
        self.boundary_vertices[vertex] || self.total_angles[vertex] > TAU - tolerance
    }

    /// Mean edge length, the scale for all numerical tolerances.
    #[inline]
    #[must_use]
    pub fn mean_edge_length(&self) -> f64 {
        self.mean_edge_length
    }

    /// Area of a face.
    #[must_use]
    pub fn face_area(&self, face: usize) -> f64 {
        let [a, b, c] = self.faces[face].map(|i| self.positions[i]);
        0.5 * (b - a).cross(&(c - a)).norm()
    }

    /// The edge joining two vertices, if one exists.
    #[must_use]
    pub fn edge_between(&self, v0: usize, v1: usize) -> Option<usize> {
        let key = if v0 < v1 { [v0, v1] } else { [v1, v0] };
        self.vertex_edges(v0)
            .iter()
            .copied()
            .find(|&e| self.edge(e).vertices == key)
    }

    /// The corner of `face` not on `edge`.
    ///
    /// Returns `None` if the edge does not belong to the face.
    #[must_use]
    pub fn opposite_vertex(&self, face: usize, edge: usize) -> Option<usize> {
        let slot = self.face_edges(face).iter().position(|&e| e == edge)?;
        Some(self.faces[face][(slot + 2) % 3])
    }

    /// The edge of `face` not touching `vertex`.
    ///
    /// Returns `None` if the vertex is not a corner of the face.
    #[must_use]
    pub fn opposite_edge(&self, face: usize, vertex: usize) -> Option<usize> {
        let slot = self.faces[face].iter().position(|&v| v == vertex)?;
        Some(self.face_edges(face)[(slot + 1) % 3])
    }
}
