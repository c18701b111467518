//! Mesh adjacency data structure.
//!
//! Derives the edge table of a triangle mesh together with the
//! edge-to-face, face-to-edge and vertex-to-edge/face incidence the
//! propagation engine walks.

use hashbrown::HashMap;

use crate::error::MeshDefect;

/// A mesh edge with its (at most two) incident faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRecord {
    /// Endpoints, smaller index first.
    pub vertices: [usize; 2],
    /// Incident faces. The second slot is `None` on boundary edges.
    pub faces: [Option<usize>; 2],
}

impl EdgeRecord {
    /// True if only one face uses this edge.
    #[inline]
    #[must_use]
    pub const fn is_boundary(&self) -> bool {
        self.faces[1].is_none()
    }

    /// The face on the other side of the edge from `face`.
    #[inline]
    #[must_use]
    pub fn other_face(&self, face: usize) -> Option<usize> {
        match self.faces {
            [Some(a), b] if a == face => b,
            [a, Some(b)] if b == face => a,
            _ => None,
        }
    }
}

/// Incidence tables for a manifold triangle mesh.
///
/// Edge indices are assigned in order of first appearance while walking the
/// faces, so two builds of the same input produce identical tables.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    edges: Vec<EdgeRecord>,
    /// `face_edges[f][i]` joins face corner `i` to corner `(i + 1) % 3`.
    face_edges: Vec<[usize; 3]>,
    vertex_edges: Vec<Vec<usize>>,
    vertex_faces: Vec<Vec<usize>>,
}

impl Adjacency {
    /// Build adjacency from face index triples.
    ///
    /// Indices must already be validated against `vertex_count`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshDefect::NonManifoldEdge`] if an edge is shared by more
    /// than two faces.
    pub fn build(vertex_count: usize, faces: &[[usize; 3]]) -> Result<Self, MeshDefect> {
        let mut lookup: HashMap<(usize, usize), usize> = HashMap::with_capacity(faces.len() * 2);
        let mut edges: Vec<EdgeRecord> = Vec::with_capacity(faces.len() * 3 / 2 + 1);
        let mut face_edges = Vec::with_capacity(faces.len());
        let mut vertex_edges = vec![Vec::new(); vertex_count];
        let mut vertex_faces = vec![Vec::new(); vertex_count];

        for (face_idx, face) in faces.iter().enumerate() {
            for &v in face {
                vertex_faces[v].push(face_idx);
            }

            let mut ids = [0usize; 3];
            for (i, id) in ids.iter_mut().enumerate() {
                let key = normalize_edge(face[i], face[(i + 1) % 3]);
                let edge_idx = *lookup.entry(key).or_insert_with(|| {
                    edges.push(EdgeRecord {
                        vertices: [key.0, key.1],
                        faces: [None, None],
                    });
                    let idx = edges.len() - 1;
                    vertex_edges[key.0].push(idx);
                    vertex_edges[key.1].push(idx);
                    idx
                });

                let record = &mut edges[edge_idx];
                match record.faces {
                    [None, _] => record.faces[0] = Some(face_idx),
                    [Some(_), None] => record.faces[1] = Some(face_idx),
                    [Some(_), Some(_)] => {
                        let face_count = 3 + faces[face_idx + 1..]
                            .iter()
                            .filter(|f| {
                                (0..3).any(|j| normalize_edge(f[j], f[(j + 1) % 3]) == key)
                            })
                            .count();
                        return Err(MeshDefect::NonManifoldEdge {
                            v0: key.0,
                            v1: key.1,
                            face_count,
                        });
                    }
                }
                *id = edge_idx;
            }
            face_edges.push(ids);
        }

        Ok(Self {
            edges,
            face_edges,
            vertex_edges,
            vertex_faces,
        })
    }

    /// All edges.
    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    /// Edges of a face, ordered as the face's corners.
    #[inline]
    #[must_use]
    pub fn face_edges(&self, face: usize) -> [usize; 3] {
        self.face_edges[face]
    }

    /// Edges incident to a vertex. Empty for unreferenced vertices.
    #[inline]
    #[must_use]
    pub fn vertex_edges(&self, vertex: usize) -> &[usize] {
        self.vertex_edges.get(vertex).map_or(&[], Vec::as_slice)
    }

    /// Faces incident to a vertex. Empty for unreferenced vertices.
    #[inline]
    #[must_use]
    pub fn vertex_faces(&self, vertex: usize) -> &[usize] {
        self.vertex_faces.get(vertex).map_or(&[], Vec::as_slice)
    }

    /// Count of boundary edges.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_boundary()).count()
    }
}

/// Normalize edge direction so v0 < v1.
#[inline]
fn normalize_edge(v0: usize, v1: usize) -> (usize, usize) {
    if v0 < v1 { (v0, v1) } else { (v1, v0) }
}
