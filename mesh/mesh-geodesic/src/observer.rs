//! Optional progress hook for propagation.

use crate::error::GeodesicError;
use crate::point::SurfacePoint;
use crate::stats::PropagationStats;

/// Something that happened during propagation.
#[derive(Debug, Clone, PartialEq)]
pub enum PropagationEvent<'a> {
    /// Initial windows were placed around the source.
    Seeded {
        /// The (canonical) source point.
        source: &'a SurfacePoint,
        /// Number of seed windows stored.
        windows: usize,
    },
    /// A saddle or boundary vertex started emitting windows.
    VertexSourceSpawned {
        /// The vertex.
        vertex: usize,
        /// Its geodesic distance from the source.
        distance: f64,
    },
    /// A face was skipped because it could not be unfolded.
    FaceSkipped {
        /// The diagnostic recorded for the face.
        diagnostic: &'a GeodesicError,
    },
    /// Propagation finished.
    Finished {
        /// Final counters.
        stats: &'a PropagationStats,
    },
}

/// Receiver for [`PropagationEvent`]s.
///
/// Implemented for any `FnMut(&PropagationEvent)` closure.
pub trait PropagationObserver {
    /// Called synchronously for each event.
    fn on_event(&mut self, event: &PropagationEvent<'_>);
}

impl<F> PropagationObserver for F
where
    F: FnMut(&PropagationEvent<'_>),
{
    fn on_event(&mut self, event: &PropagationEvent<'_>) {
        self(event);
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PropagationObserver for NoopObserver {
    fn on_event(&mut self, _event: &PropagationEvent<'_>) {}
}
