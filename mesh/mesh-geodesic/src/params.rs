//! Parameters for geodesic propagation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for exact geodesic propagation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PropagationParams {
    /// Relative numerical tolerance. Multiplied by the mesh's mean edge
    /// length to give the absolute tolerance for dominance tests, sliver
    /// removal and endpoint snapping. Default: 1e-10
    pub epsilon: f64,

    /// Stop propagating once the wavefront passes this distance. Points
    /// farther away are reported unreachable. Default: None (no cutoff)
    pub max_distance: Option<f64>,

    /// Angle slack (radians) when classifying saddle vertices: a vertex whose
    /// corner angles sum to more than `2π - saddle_angle_tolerance` can act as
    /// a pseudo-source. Default: 1e-5
    pub saddle_angle_tolerance: f64,
}

impl Default for PropagationParams {
    fn default() -> Self {
        Self {
            epsilon: 1e-10,
            max_distance: None,
            saddle_angle_tolerance: 1e-5,
        }
    }
}

impl PropagationParams {
    /// Create params that stop at `max_distance`.
    #[must_use]
    pub fn with_cutoff(max_distance: f64) -> Self {
        Self {
            max_distance: Some(max_distance),
            ..Default::default()
        }
    }

    /// Set the relative tolerance.
    #[must_use]
    pub const fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the propagation cutoff.
    #[must_use]
    pub const fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = Some(max_distance);
        self
    }

    /// Set the saddle classification slack.
    #[must_use]
    pub const fn with_saddle_angle_tolerance(mut self, tolerance: f64) -> Self {
        self.saddle_angle_tolerance = tolerance;
        self
    }

    /// True if `distance` is beyond the cutoff.
    #[inline]
    #[must_use]
    pub fn exceeds_cutoff(&self, distance: f64) -> bool {
        self.max_distance.is_some_and(|max| distance > max)
    }
}
