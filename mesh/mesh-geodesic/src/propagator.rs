//! Distance propagation as a swappable capability.
//!
//! Callers that only need "propagate from a source, then query" can be
//! written against [`DistancePropagator`] and [`DistanceQuery`]; the exact
//! window engine is one implementation.

use crate::error::GeodesicResult;
use crate::field::{BestSource, DistanceField};
use crate::mesh::GeodesicMesh;
use crate::params::PropagationParams;
use crate::point::SurfacePoint;
use crate::propagate::propagate_with;

/// Something that answers distance queries from a fixed source.
pub trait DistanceQuery {
    /// Distance and dominating pseudo-source for a surface point.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::OutOfDomain`](crate::GeodesicError::OutOfDomain)
    /// if the point is not on the mesh.
    fn query(&self, point: &SurfacePoint) -> GeodesicResult<BestSource>;

    /// One distance per mesh vertex, `f64::INFINITY` where unreachable.
    fn vertex_distances(&self) -> Vec<f64>;
}

/// A single-source geodesic distance algorithm.
pub trait DistancePropagator {
    /// Result of a propagation, borrowing the mesh.
    type Field<'m>: DistanceQuery;

    /// Propagate distances from `source` over `mesh`.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::InvalidSource`](crate::GeodesicError::InvalidSource)
    /// if the source is not on the mesh.
    fn propagate<'m>(
        &self,
        mesh: &'m GeodesicMesh,
        source: &SurfacePoint,
    ) -> GeodesicResult<Self::Field<'m>>;
}

/// Exact continuous-Dijkstra propagation.
///
/// # Example
///
/// ```
/// use mesh_geodesic::{DistancePropagator, DistanceQuery, ExactGeodesic, GeodesicMesh, SurfacePoint};
///
/// let vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
/// let mesh = GeodesicMesh::build(&vertices, &[[0, 1, 2]]).unwrap();
///
/// let field = ExactGeodesic::new().propagate(&mesh, &SurfacePoint::Vertex(0)).unwrap();
/// let distances = field.vertex_distances();
/// assert!((distances[1] - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExactGeodesic {
    params: PropagationParams,
}

impl ExactGeodesic {
    /// Exact propagation with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact propagation with custom parameters.
    #[must_use]
    pub const fn with_params(params: PropagationParams) -> Self {
        Self { params }
    }

    /// The parameters used for every run.
    #[must_use]
    pub const fn params(&self) -> &PropagationParams {
        &self.params
    }
}

impl DistancePropagator for ExactGeodesic {
    type Field<'m> = DistanceField<'m>;

    fn propagate<'m>(
        &self,
        mesh: &'m GeodesicMesh,
        source: &SurfacePoint,
    ) -> GeodesicResult<DistanceField<'m>> {
        propagate_with(mesh, source, &self.params)
    }
}

impl DistanceQuery for DistanceField<'_> {
    fn query(&self, point: &SurfacePoint) -> GeodesicResult<BestSource> {
        DistanceField::query(self, point)
    }

    fn vertex_distances(&self) -> Vec<f64> {
        DistanceField::vertex_distances(self)
    }
}
