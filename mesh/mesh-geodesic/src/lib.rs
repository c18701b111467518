//! Exact geodesic (surface) distances on triangle meshes.
//!
//! This crate computes, for a source point on a triangulated surface, the
//! length of the shortest path that stays on the surface to every other
//! point. Paths may cross face interiors and bend around saddle or boundary
//! vertices; they are not restricted to mesh edges.
//!
//! - **Mesh model** - [`GeodesicMesh`], validated once and immutable
//! - **Surface points** - [`SurfacePoint`] at a vertex, on an edge or in a face
//! - **Propagation** - [`propagate`], the continuous-Dijkstra window engine
//! - **Queries** - [`DistanceField::query`] for any surface point
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - CLI tools
//! - Web applications (WASM)
//! - Servers
//! - Python bindings (see [`distance_map`] for the flat-array entry point)
//!
//! # Algorithm
//!
//! The wavefront from the source is tracked as *windows*: intervals on mesh
//! edges, each carrying the unfolded position of the point its distances are
//! measured from. Windows are processed in order of the smallest distance
//! they can produce. Processing a window unfolds the next face flat against
//! its edge and casts the interval across it; where two windows cover the
//! same part of an edge only the shorter one survives. The result is exact
//! up to floating-point tolerance, unlike edge-graph Dijkstra which only
//! bounds the true distance from above.
//!
//! # Example
//!
//! ```
//! use mesh_geodesic::{GeodesicMesh, SurfacePoint, propagate};
//!
//! // Unit square split along its diagonal
//! let vertices = [
//!     [0.0, 0.0, 0.0],
//!     [1.0, 0.0, 0.0],
//!     [1.0, 1.0, 0.0],
//!     [0.0, 1.0, 0.0],
//! ];
//! let mesh = GeodesicMesh::build(&vertices, &[[0, 1, 3], [1, 2, 3]]).unwrap();
//!
//! let field = propagate(&mesh, &SurfacePoint::Vertex(0)).unwrap();
//!
//! assert!(field.vertex_distance(0) < 1e-10); // Distance to self is 0
//! assert!((field.vertex_distance(2) - 2f64.sqrt()).abs() < 1e-9); // Straight across
//! ```
//!
//! # Quality Standards
//!
//! This crate maintains A-grade standards:
//! - >=90% test coverage
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod adjacency;
mod arena;
mod error;
mod field;
mod host;
mod mesh;
mod observer;
mod params;
mod point;
mod propagate;
mod propagator;
mod queue;
mod stats;
mod unfold;
mod window;

pub use adjacency::EdgeRecord;
pub use error::{GeodesicError, GeodesicResult, MeshDefect};
pub use field::{BestSource, DistanceField};
pub use host::{distance_map, distance_map_from};
pub use mesh::GeodesicMesh;
pub use observer::{NoopObserver, PropagationEvent, PropagationObserver};
pub use params::PropagationParams;
pub use point::SurfacePoint;
pub use propagate::{propagate, propagate_with, propagate_with_observer};
pub use propagator::{DistancePropagator, DistanceQuery, ExactGeodesic};
pub use stats::PropagationStats;
pub use window::{PseudoSource, Window};
