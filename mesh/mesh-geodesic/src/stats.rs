//! Statistics from a propagation run.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Counters collected while propagating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PropagationStats {
    /// Windows stored on an edge (including pieces produced by clipping).
    pub windows_created: usize,

    /// Windows that generated children.
    pub windows_propagated: usize,

    /// Candidate windows fully dominated before being stored.
    pub windows_rejected: usize,

    /// Stored windows later fully dominated and freed.
    pub windows_retired: usize,

    /// Saddle or boundary vertices that emitted windows.
    pub vertex_sources: usize,

    /// Faces skipped because they could not be unfolded.
    pub degenerate_faces: usize,

    /// Highest number of simultaneously live windows.
    pub peak_live_windows: usize,

    /// Highest priority queue length.
    pub peak_queue_len: usize,

    /// Windows in the finished distance field.
    pub final_windows: usize,
}

impl std::fmt::Display for PropagationStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Propagation: {} windows kept ({} created, {} propagated, {} rejected, {} retired), \
             {} vertex sources, peak {} live / {} queued",
            self.final_windows,
            self.windows_created,
            self.windows_propagated,
            self.windows_rejected,
            self.windows_retired,
            self.vertex_sources,
            self.peak_live_windows,
            self.peak_queue_len
        )?;
        if self.degenerate_faces > 0 {
            write!(f, ", {} degenerate faces skipped", self.degenerate_faces)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_summary() {
        let stats = PropagationStats {
            windows_created: 10,
            windows_propagated: 6,
            windows_rejected: 2,
            windows_retired: 3,
            vertex_sources: 1,
            degenerate_faces: 0,
            peak_live_windows: 8,
            peak_queue_len: 4,
            final_windows: 7,
        };
        let text = stats.to_string();
        assert!(text.starts_with("Propagation: 7 windows kept"));
        assert!(!text.contains("degenerate"));

        let degenerate = PropagationStats {
            degenerate_faces: 2,
            ..stats
        };
        assert!(degenerate.to_string().ends_with("2 degenerate faces skipped"));
    }
}
