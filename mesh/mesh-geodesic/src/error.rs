//! Error types for geodesic distance computation.

use thiserror::Error;

/// Result type for geodesic operations.
pub type GeodesicResult<T> = Result<T, GeodesicError>;

/// Errors that can occur during geodesic computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeodesicError {
    /// The input mesh was rejected at construction time.
    #[error("invalid mesh: {0}")]
    InvalidMesh(#[from] MeshDefect),

    /// The propagation source cannot be placed on the mesh.
    #[error("invalid source: {reason}")]
    InvalidSource {
        /// Why the source was rejected.
        reason: String,
    },

    /// A face could not be unfolded during propagation.
    ///
    /// This is never returned from `propagate`; it is recorded as a
    /// diagnostic on the resulting distance field.
    #[error("face {face} could not be unfolded: {reason}")]
    NumericalDegenerate {
        /// Index of the skipped face.
        face: usize,
        /// Description of the degeneracy.
        reason: String,
    },

    /// A query point does not lie on the mesh.
    #[error("point is outside the mesh domain: {reason}")]
    OutOfDomain {
        /// Why the point could not be located.
        reason: String,
    },
}

impl GeodesicError {
    pub(crate) fn invalid_source(reason: impl Into<String>) -> Self {
        Self::InvalidSource {
            reason: reason.into(),
        }
    }

    pub(crate) fn out_of_domain(reason: impl Into<String>) -> Self {
        Self::OutOfDomain {
            reason: reason.into(),
        }
    }
}

/// Concrete reason a mesh failed validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshDefect {
    /// Mesh has no vertices or no faces.
    #[error("mesh is empty ({vertex_count} vertices, {face_count} faces)")]
    Empty {
        /// Number of vertices supplied.
        vertex_count: usize,
        /// Number of faces supplied.
        face_count: usize,
    },

    /// A flat input array does not have the expected shape.
    #[error("{what} array length {actual} is not a multiple of {expected}")]
    Dimension {
        /// Which array was malformed.
        what: &'static str,
        /// Required stride.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// A vertex coordinate is NaN or infinite.
    #[error("vertex {vertex} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// The offending vertex.
        vertex: usize,
    },

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index} (mesh has {vertex_count} vertices)")]
    IndexOutOfRange {
        /// The offending face.
        face: usize,
        /// The out-of-range index.
        index: usize,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A face uses the same vertex more than once.
    #[error("face {face} repeats a vertex")]
    RepeatedVertex {
        /// The offending face.
        face: usize,
    },

    /// A face has zero (or numerically zero) area.
    #[error("face {face} is degenerate (area {area:e})")]
    DegenerateFace {
        /// The offending face.
        face: usize,
        /// The computed area.
        area: f64,
    },

    /// An edge is shared by more than two faces.
    #[error("edge ({v0}, {v1}) is shared by {face_count} faces")]
    NonManifoldEdge {
        /// First endpoint.
        v0: usize,
        /// Second endpoint.
        v1: usize,
        /// Number of faces sharing the edge.
        face_count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defect_converts_into_invalid_mesh() {
        let err: GeodesicError = MeshDefect::RepeatedVertex { face: 3 }.into();
        assert!(matches!(
            err,
            GeodesicError::InvalidMesh(MeshDefect::RepeatedVertex { face: 3 })
        ));
    }

    #[test]
    fn messages_name_the_culprit() {
        let err = GeodesicError::from(MeshDefect::IndexOutOfRange {
            face: 1,
            index: 4,
            vertex_count: 4,
        });
        assert_eq!(
            err.to_string(),
            "invalid mesh: face 1 references vertex 4 (mesh has 4 vertices)"
        );

        let err = GeodesicError::invalid_source("vertex 9 out of range");
        assert_eq!(err.to_string(), "invalid source: vertex 9 out of range");
    }
}
