//! Points located on the mesh surface.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::mesh::GeodesicMesh;

/// Slack allowed on edge parameters and barycentric coordinates.
const LOCATION_TOLERANCE: f64 = 1e-9;

/// A point on the mesh surface.
///
/// Edge parameters run from the edge's lower-indexed endpoint
/// (`t = 0`) to its higher-indexed endpoint (`t = 1`). Barycentric
/// coordinates are ordered as the face's vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SurfacePoint {
    /// A mesh vertex.
    Vertex(usize),
    /// A point on an edge at parameter `t` in `[0, 1]`.
    Edge {
        /// Edge index.
        edge: usize,
        /// Position along the edge.
        t: f64,
    },
    /// A point inside a face.
    Face {
        /// Face index.
        face: usize,
        /// Barycentric weights of the face's three vertices.
        barycentric: [f64; 3],
    },
}

impl SurfacePoint {
    /// A point on the edge joining `v0` and `v1`, at fraction `t` from `v0`.
    ///
    /// Returns `None` if the two vertices are not joined by an edge.
    #[must_use]
    pub fn on_edge_between(mesh: &GeodesicMesh, v0: usize, v1: usize, t: f64) -> Option<Self> {
        let edge = mesh.edge_between(v0, v1)?;
        let t = if mesh.edge(edge).vertices[0] == v0 {
            t
        } else {
            1.0 - t
        };
        Some(Self::Edge { edge, t })
    }

    /// The centroid of a face.
    #[must_use]
    pub const fn face_centroid(face: usize) -> Self {
        Self::Face {
            face,
            barycentric: [1.0 / 3.0; 3],
        }
    }

    /// Locate a 3-D position inside a face by barycentric projection.
    ///
    /// The position is projected onto the face plane first.
    #[must_use]
    pub fn in_face(mesh: &GeodesicMesh, face: usize, position: &Point3<f64>) -> Self {
        let [a, b, c] = mesh.face(face).map(|v| mesh.position(v));
        let v0 = b - a;
        let v1 = c - a;
        let v2 = position - a;
        let d00 = v0.dot(&v0);
        let d01 = v0.dot(&v1);
        let d11 = v1.dot(&v1);
        let d20 = v2.dot(&v0);
        let d21 = v2.dot(&v1);
        let denom = d00.mul_add(d11, -(d01 * d01));
        let v = d11.mul_add(d20, -(d01 * d21)) / denom;
        let w = d00.mul_add(d21, -(d01 * d20)) / denom;
        Self::Face {
            face,
            barycentric: [1.0 - v - w, v, w],
        }
    }

    /// Check the point against the mesh and snap it to its simplest form.
    ///
    /// An edge point at `t = 0` becomes a vertex; a face point with a zero
    /// weight becomes an edge point, and so on.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if an index is out of range or
    /// the coordinates do not describe a point of the referenced simplex.
    pub fn canonicalize(&self, mesh: &GeodesicMesh) -> Result<Self, String> {
        match *self {
            Self::Vertex(v) => {
                if v < mesh.vertex_count() {
                    Ok(*self)
                } else {
                    Err(format!(
                        "vertex {v} out of range (mesh has {} vertices)",
                        mesh.vertex_count()
                    ))
                }
            }
            Self::Edge { edge, t } => {
                if edge >= mesh.edge_count() {
                    return Err(format!(
                        "edge {edge} out of range (mesh has {} edges)",
                        mesh.edge_count()
                    ));
                }
                if !t.is_finite() || !(-LOCATION_TOLERANCE..=1.0 + LOCATION_TOLERANCE).contains(&t)
                {
                    return Err(format!("edge parameter {t} outside [0, 1]"));
                }
                let [v0, v1] = mesh.edge(edge).vertices;
                Ok(if t <= LOCATION_TOLERANCE {
                    Self::Vertex(v0)
                } else if t >= 1.0 - LOCATION_TOLERANCE {
                    Self::Vertex(v1)
                } else {
                    Self::Edge { edge, t }
                })
            }
            Self::Face { face, barycentric } => {
                if face >= mesh.face_count() {
                    return Err(format!(
                        "face {face} out of range (mesh has {} faces)",
                        mesh.face_count()
                    ));
                }
                if barycentric
                    .iter()
                    .any(|w| !w.is_finite() || *w < -LOCATION_TOLERANCE)
                {
                    return Err(format!(
                        "barycentric coordinates {barycentric:?} are not all non-negative"
                    ));
                }
                let sum: f64 = barycentric.iter().sum();
                if (sum - 1.0).abs() > LOCATION_TOLERANCE {
                    return Err(format!("barycentric coordinates sum to {sum}, not 1"));
                }
                Ok(Self::snap_face(mesh, face, barycentric.map(|w| w.max(0.0) / sum)))
            }
        }
    }

    fn snap_face(mesh: &GeodesicMesh, face: usize, weights: [f64; 3]) -> Self {
        let corners = mesh.face(face);
        let zero: Vec<usize> = (0..3).filter(|&i| weights[i] <= LOCATION_TOLERANCE).collect();
        match zero.as_slice() {
            [] => Self::Face {
                face,
                barycentric: weights,
            },
            [i] => {
                // Weight `i` vanishes: the point lies on the opposite edge.
                let a = corners[(i + 1) % 3];
                let b = corners[(i + 2) % 3];
                let wa = weights[(i + 1) % 3];
                let wb = weights[(i + 2) % 3];
                let t = wb / (wa + wb);
                Self::on_edge_between(mesh, a, b, t).unwrap_or(Self::Vertex(a))
            }
            _ => {
                let (best, _) = weights
                    .iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |acc, (i, &w)| {
                        if w > acc.1 { (i, w) } else { acc }
                    });
                Self::Vertex(corners[best])
            }
        }
    }

    /// The 3-D position of the point.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the point is not on the mesh.
    pub fn position(&self, mesh: &GeodesicMesh) -> Result<Point3<f64>, String> {
        Ok(match self.canonicalize(mesh)? {
            Self::Vertex(v) => mesh.position(v),
            Self::Edge { edge, t } => {
                let [v0, v1] = mesh.edge(edge).vertices;
                mesh.position(v0) + (mesh.position(v1) - mesh.position(v0)) * t
            }
            Self::Face { face, barycentric } => {
                let [a, b, c] = mesh.face(face).map(|v| mesh.position(v).coords);
                Point3::from(a * barycentric[0] + b * barycentric[1] + c * barycentric[2])
            }
        })
    }
}

impl From<usize> for SurfacePoint {
    fn from(vertex: usize) -> Self {
        Self::Vertex(vertex)
    }
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
    fn edge_point_orientation_follows_arguments() {
        let mesh = square();
        let p = SurfacePoint::on_edge_between(&mesh, 1, 0, 0.25).unwrap();
        let pos = p.position(&mesh).unwrap();
        assert_relative_eq!(pos.x, 0.75);
        assert_relative_eq!(pos.y, 0.0);

        assert!(SurfacePoint::on_edge_between(&mesh, 1, 3, 0.5).is_none());
    }

    #[test]
    fn face_centroid_position() {
        let mesh = square();
        let pos = SurfacePoint::face_centroid(0).position(&mesh).unwrap();
        assert_relative_eq!(pos.x, 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(pos.y, 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn in_face_round_trips_position() {
        let mesh = square();
        let target = Point3::new(0.6, 0.3, 0.0);
        let p = SurfacePoint::in_face(&mesh, 0, &target);
        let pos = p.position(&mesh).unwrap();
        assert_relative_eq!(pos, target, epsilon = 1e-12);
    }

    #[test]
    fn canonicalize_snaps_to_simpler_locations() {
        let mesh = square();
        let edge = mesh.edge_between(0, 1).unwrap();
        assert_eq!(
            SurfacePoint::Edge { edge, t: 0.0 }.canonicalize(&mesh),
            Ok(SurfacePoint::Vertex(0))
        );
        assert_eq!(
            SurfacePoint::Face {
                face: 0,
                barycentric: [0.0, 1.0, 0.0]
            }
            .canonicalize(&mesh),
            Ok(SurfacePoint::Vertex(1))
        );

        // Zero weight on corner 2 of face [0, 1, 2] leaves the edge 0-1.
        let snapped = SurfacePoint::Face {
            face: 0,
            barycentric: [0.25, 0.75, 0.0],
        }
        .canonicalize(&mesh)
        .unwrap();
        match snapped {
            SurfacePoint::Edge { edge: e, t } => {
                assert_eq!(e, edge);
                assert_relative_eq!(t, 0.75);
            }
            other => panic!("expected edge point, got {other:?}"),
        }
    }

    #[test]
    fn canonicalize_rejects_bad_locations() {
        let mesh = square();
        assert!(SurfacePoint::Vertex(4).canonicalize(&mesh).is_err());
        assert!(SurfacePoint::Edge { edge: 0, t: 1.5 }.canonicalize(&mesh).is_err());
        assert!(SurfacePoint::Edge { edge: 99, t: 0.5 }.canonicalize(&mesh).is_err());
        assert!(
            SurfacePoint::Face {
                face: 0,
                barycentric: [0.5, 0.5, 0.5]
            }
            .canonicalize(&mesh)
            .is_err()
        );
        assert!(
            SurfacePoint::Face {
                face: 0,
                barycentric: [1.2, -0.1, -0.1]
            }
            .canonicalize(&mesh)
            .is_err()
        );
        assert!(SurfacePoint::face_centroid(2).canonicalize(&mesh).is_err());
    }
}
