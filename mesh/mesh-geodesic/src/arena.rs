//! Window storage: a generational arena plus per-edge ordered lists.
//!
//! Retired windows free their slot for reuse; the generation stamp makes any
//! id still sitting in the priority queue stale instead of aliasing the new
//! occupant.

use crate::window::Window;

/// Handle to a window in a [`WindowArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Debug, Clone)]
struct Entry {
    window: Window,
    propagated: bool,
}

/// Arena of live windows, indexed per edge in interval order.
#[derive(Debug, Clone)]
pub struct WindowArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    per_edge: Vec<Vec<WindowId>>,
    live: usize,
    peak_live: usize,
}

impl WindowArena {
    /// Empty arena for a mesh with `edge_count` edges.
    #[must_use]
    pub fn new(edge_count: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            per_edge: vec![Vec::new(); edge_count],
            live: 0,
            peak_live: 0,
        }
    }

    /// Store a window and splice it into its edge's list.
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: more than 4B simultaneously live windows is unsupported
    pub fn insert(&mut self, window: Window, propagated: bool) -> WindowId {
        let edge = window.edge;
        let b0 = window.b0;
        let entry = Entry { window, propagated };

        let id = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            WindowId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                entry: Some(entry),
            });
            WindowId {
                index: (self.slots.len() - 1) as u32,
                generation: 0,
            }
        };

        let list = &mut self.per_edge[edge];
        let at = list.partition_point(|other| {
            self.slots[other.index as usize]
                .entry
                .as_ref()
                .is_some_and(|e| e.window.b0 < b0)
        });
        list.insert(at, id);

        self.live += 1;
        self.peak_live = self.peak_live.max(self.live);
        id
    }

    /// Remove a window, returning it if the id was still live.
    pub fn remove(&mut self, id: WindowId) -> Option<Window> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);

        let list = &mut self.per_edge[entry.window.edge];
        if let Some(pos) = list.iter().position(|&other| other == id) {
            list.remove(pos);
        }
        self.live -= 1;
        Some(entry.window)
    }

    fn entry(&self, id: WindowId) -> Option<&Entry> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation == id.generation {
            slot.entry.as_ref()
        } else {
            None
        }
    }

    /// The window behind `id`, or `None` if it has been retired.
    #[must_use]
    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.entry(id).map(|e| &e.window)
    }

    /// Whether the window has already generated its children.
    #[must_use]
    pub fn is_propagated(&self, id: WindowId) -> bool {
        self.entry(id).is_some_and(|e| e.propagated)
    }

    /// Record that the window has generated its children.
    pub fn mark_propagated(&mut self, id: WindowId) {
        if let Some(slot) = self.slots.get_mut(id.index as usize) {
            if slot.generation == id.generation {
                if let Some(entry) = slot.entry.as_mut() {
                    entry.propagated = true;
                }
            }
        }
    }

    /// Ids of the windows on an edge, ordered along the edge.
    #[must_use]
    pub fn edge_windows(&self, edge: usize) -> &[WindowId] {
        &self.per_edge[edge]
    }

    /// Number of live windows.
    #[must_use]
    pub fn live(&self) -> usize {
        self.live
    }

    /// Highest number of simultaneously live windows.
    #[must_use]
    pub fn peak_live(&self) -> usize {
        self.peak_live
    }

    /// Consume the arena into ordered per-edge window lists.
    #[must_use]
    pub fn into_edge_windows(mut self) -> Vec<Vec<Window>> {
        let per_edge = std::mem::take(&mut self.per_edge);
        per_edge
            .into_iter()
            .map(|ids| {
                ids.into_iter()
                    .filter_map(|id| {
                        self.slots[id.index as usize]
                            .entry
                            .take()
                            .map(|e| e.window)
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use nalgebra::Vector2;

    use super::*;
    use crate::window::PseudoSource;

    fn window(edge: usize, b0: f64, b1: f64) -> Window {
        Window {
            edge,
            b0,
            b1,
            source: Vector2::new(0.0, 1.0),
            sigma: 0.0,
            from_face: None,
            pseudo_source: PseudoSource::Source,
        }
    }

    #[test]
    fn edge_lists_stay_ordered() {
        let mut arena = WindowArena::new(2);
        let c = arena.insert(window(0, 0.6, 1.0), false);
        let a = arena.insert(window(0, 0.0, 0.3), false);
        let b = arena.insert(window(0, 0.3, 0.6), true);
        arena.insert(window(1, 0.0, 1.0), false);

        assert_eq!(arena.edge_windows(0), &[a, b, c]);
        assert_eq!(arena.edge_windows(1).len(), 1);
        assert!(arena.is_propagated(b));
        assert!(!arena.is_propagated(a));
        assert_eq!(arena.live(), 4);
    }

    #[test]
    fn removed_ids_go_stale() {
        let mut arena = WindowArena::new(1);
        let a = arena.insert(window(0, 0.0, 0.5), false);
        assert!(arena.remove(a).is_some());
        assert!(arena.get(a).is_none());
        assert!(arena.remove(a).is_none());

        // Slot is reused under a new generation
        let b = arena.insert(window(0, 0.5, 1.0), false);
        assert_ne!(a, b);
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(b).unwrap().b0, 0.5);

        arena.mark_propagated(a);
        assert!(!arena.is_propagated(b));
        assert_eq!(arena.live(), 1);
        assert_eq!(arena.peak_live(), 1);
    }

    #[test]
    fn into_edge_windows_preserves_order() {
        let mut arena = WindowArena::new(1);
        arena.insert(window(0, 0.5, 1.0), true);
        let dead = arena.insert(window(0, 0.2, 0.4), false);
        arena.insert(window(0, 0.0, 0.2), true);
        arena.remove(dead);

        let edges = arena.into_edge_windows();
        let starts: Vec<f64> = edges[0].iter().map(|w| w.b0).collect();
        assert_eq!(starts, vec![0.0, 0.5]);
    }
}
