//! Flat-array entry points for host bindings.
//!
//! Hosts hand over coordinates as `[x0, y0, z0, x1, ...]` and faces as
//! `[a0, b0, c0, a1, ...]`; everything is validated before any propagation
//! work starts.

use tracing::debug;

use crate::error::GeodesicResult;
use crate::mesh::GeodesicMesh;
use crate::params::PropagationParams;
use crate::point::SurfacePoint;
use crate::propagate::propagate_with;

/// Geodesic distance from `source_vertex` to every vertex.
///
/// Unreachable vertices get `f64::INFINITY`.
///
/// # Errors
///
/// Returns [`GeodesicError::InvalidMesh`](crate::GeodesicError::InvalidMesh)
/// for malformed arrays or meshes and
/// [`GeodesicError::InvalidSource`](crate::GeodesicError::InvalidSource) for
/// an out-of-range source vertex.
///
/// # Example
///
/// ```
/// use mesh_geodesic::distance_map;
///
/// let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0];
/// let indices = [0, 1, 2, 0, 2, 3];
/// let distances = distance_map(&positions, &indices, 0).unwrap();
///
/// assert_eq!(distances.len(), 4);
/// assert!((distances[2] - 2f64.sqrt()).abs() < 1e-9);
/// ```
pub fn distance_map(
    positions: &[f64],
    indices: &[u32],
    source_vertex: usize,
) -> GeodesicResult<Vec<f64>> {
    distance_map_from(
        positions,
        indices,
        &SurfacePoint::Vertex(source_vertex),
        &PropagationParams::default(),
    )
}

/// Geodesic distance from an arbitrary surface point to every vertex.
///
/// # Errors
///
/// See [`distance_map`].
pub fn distance_map_from(
    positions: &[f64],
    indices: &[u32],
    source: &SurfacePoint,
    params: &PropagationParams,
) -> GeodesicResult<Vec<f64>> {
    let mesh = GeodesicMesh::from_flat(positions, indices)?;
    debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "Host mesh validated"
    );
    let field = propagate_with(&mesh, source, params)?;
    Ok(field.vertex_distances())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::{GeodesicError, MeshDefect};

    const SQUARE: [f64; 12] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0];

    #[test]
    fn wrong_stride_is_rejected() {
        let err = distance_map(&SQUARE[..11], &[0, 1, 2], 0).unwrap_err();
        assert!(matches!(
            err,
            GeodesicError::InvalidMesh(MeshDefect::Dimension { what: "vertex", .. })
        ));

        let err = distance_map(&SQUARE, &[0, 1, 2, 0], 0).unwrap_err();
        assert!(matches!(
            err,
            GeodesicError::InvalidMesh(MeshDefect::Dimension { what: "face", .. })
        ));
    }

    #[test]
    fn index_equal_to_vertex_count_is_rejected() {
        let err = distance_map(&SQUARE, &[0, 1, 4], 0).unwrap_err();
        assert!(matches!(
            err,
            GeodesicError::InvalidMesh(MeshDefect::IndexOutOfRange { index: 4, .. })
        ));
    }

    #[test]
    fn source_out_of_range() {
        let err = distance_map(&SQUARE, &[0, 1, 2, 0, 2, 3], 4).unwrap_err();
        assert!(matches!(err, GeodesicError::InvalidSource { .. }));
    }

    #[test]
    fn face_source() {
        let source = SurfacePoint::Face {
            face: 0,
            barycentric: [0.6, 0.2, 0.2],
        };
        let distances = distance_map_from(
            &SQUARE,
            &[0, 1, 2, 0, 2, 3],
            &source,
            &PropagationParams::default(),
        )
        .unwrap();
        // Source sits at (0.4, 0.2)
        assert!((distances[0] - 0.2f64.hypot(0.4)).abs() < 1e-9);
        assert!((distances[3] - 0.8f64.hypot(0.4)).abs() < 1e-9);
    }
}
