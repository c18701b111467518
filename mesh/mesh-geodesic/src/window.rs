//! Wavefront windows and their distance functions.
//!
//! A window covers an interval `[b0, b1]` of one edge, measured from the
//! edge's first endpoint. Its pseudo-source sits at `source` in the edge
//! frame (`source.y >= 0`, on the side of `from_face`), offset by `sigma`
//! from the true source. The geodesic distance of the edge point `x` is
//!
//! ```text
//! D(x) = sqrt((x - source.x)^2 + source.y^2) + sigma
//! ```

use nalgebra::Vector2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The point a window's distances are measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PseudoSource {
    /// The propagation source itself.
    Source,
    /// A saddle or boundary vertex the wavefront bent around.
    Vertex(usize),
}

/// A propagated wavefront interval on one edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    /// Edge the window lives on.
    pub edge: usize,
    /// Start of the covered interval.
    pub b0: f64,
    /// End of the covered interval.
    pub b1: f64,
    /// Unfolded pseudo-source position in the edge frame.
    pub source: Vector2<f64>,
    /// Geodesic distance from the true source to the pseudo-source.
    pub sigma: f64,
    /// Face the wavefront arrived through; it propagates into the other one.
    ///
    /// `None` when the pseudo-source lies on the edge itself, in which case
    /// the window only records distances along the edge.
    pub from_face: Option<usize>,
    /// Which pseudo-source generated the window.
    pub pseudo_source: PseudoSource,
}

impl Window {
    /// Length of the covered interval.
    #[inline]
    #[must_use]
    pub fn length(&self) -> f64 {
        self.b1 - self.b0
    }

    /// Distance to the edge point `x` along a straight unfolded ray.
    #[inline]
    #[must_use]
    pub fn distance_at(&self, x: f64) -> f64 {
        (x - self.source.x).hypot(self.source.y) + self.sigma
    }

    /// Distance at the interval start.
    #[inline]
    #[must_use]
    pub fn d0(&self) -> f64 {
        self.distance_at(self.b0)
    }

    /// Distance at the interval end.
    #[inline]
    #[must_use]
    pub fn d1(&self) -> f64 {
        self.distance_at(self.b1)
    }

    /// Distance to any edge point, walking along the edge from the nearest
    /// interval end when `x` is outside the window.
    ///
    /// Exact inside the interval and an upper bound outside it.
    #[must_use]
    pub fn bounded_distance_at(&self, x: f64) -> f64 {
        let c = x.clamp(self.b0, self.b1);
        self.distance_at(c) + (x - c).abs()
    }

    /// Smallest distance anywhere in the window; the queue priority.
    #[must_use]
    pub fn lower_bound(&self) -> f64 {
        self.distance_at(self.source.x.clamp(self.b0, self.b1))
    }

    /// Distance to a point on the far side of the edge.
    ///
    /// `target` is in the edge frame with `target.y <= 0`. When the straight
    /// line from the pseudo-source to the target crosses the edge inside the
    /// interval the result is exact; otherwise the path bends at the nearest
    /// interval end and the result is an upper bound.
    #[must_use]
    pub fn distance_through(&self, target: &Vector2<f64>) -> f64 {
        let p = self.source;
        let drop = p.y - target.y;
        if drop <= f64::EPSILON * (p.y.abs() + target.y.abs() + 1.0) {
            return self.bounded_distance_at(target.x);
        }
        let crossing = (target.x - p.x).mul_add(p.y / drop, p.x);
        if (self.b0..=self.b1).contains(&crossing) {
            (target - p).norm() + self.sigma
        } else {
            let c = crossing.clamp(self.b0, self.b1);
            self.distance_at(c) + (target - Vector2::new(c, 0.0)).norm()
        }
    }

    /// Copy of this window restricted to `[b0, b1]`.
    #[must_use]
    pub fn clipped(&self, b0: f64, b1: f64) -> Self {
        Self {
            b0,
            b1,
            ..self.clone()
        }
    }
}

/// Sub-interval of an overlap and whether the candidate wins it.
pub type Segment = (f64, f64, bool);

/// Split `[lo, hi]` by where `candidate` is strictly shorter than `incumbent`.
///
/// The two distance functions cross at most twice; the crossings are found
/// by squaring `D_c(x) = D_i(x)` into a quadratic, and each resulting piece
/// is decided at its midpoint. Near-ties (within `tolerance`) go to the
/// incumbent. Adjacent pieces with the same winner are merged.
#[must_use]
pub fn partition_overlap(
    candidate: &Window,
    incumbent: &Window,
    lo: f64,
    hi: f64,
    tolerance: f64,
) -> Vec<Segment> {
    let mut cuts = vec![lo];
    cuts.extend(
        crossings(candidate, incumbent)
            .into_iter()
            .filter(|&x| x > lo + tolerance && x < hi - tolerance),
    );
    cuts.push(hi);
    cuts.sort_by(f64::total_cmp);

    let mut segments: Vec<Segment> = Vec::with_capacity(cuts.len());
    for pair in cuts.windows(2) {
        let (s0, s1) = (pair[0], pair[1]);
        let mid = 0.5 * (s0 + s1);
        let wins = candidate.distance_at(mid) + tolerance < incumbent.distance_at(mid);
        match segments.last_mut() {
            Some(last) if last.2 == wins => last.1 = s1,
            _ => segments.push((s0, s1, wins)),
        }
    }
    segments
}

/// Candidate roots of `D_a(x) = D_b(x)`.
///
/// May include spurious roots introduced by squaring; callers decide each
/// resulting piece by evaluation.
fn crossings(a: &Window, b: &Window) -> Vec<f64> {
    let (p1, q1, s1) = (a.source.x, a.source.y, a.sigma);
    let (p2, q2, s2) = (b.source.x, b.source.y, b.sigma);
    let delta = s2 - s1;

    // sqrt(A1) - sqrt(A2) = delta  =>  alpha * x + beta = 2 * delta * sqrt(A2)
    let alpha = 2.0 * (p2 - p1);
    let beta = p1 * p1 - p2 * p2 + q1 * q1 - q2 * q2 - delta * delta;
    let scale = 1.0 + p1.abs() + p2.abs() + q1.abs() + q2.abs();

    if delta.abs() <= f64::EPSILON * scale {
        return if alpha.abs() > f64::EPSILON * scale {
            vec![-beta / alpha]
        } else {
            Vec::new()
        };
    }

    let d2 = 4.0 * delta * delta;
    let qa = alpha.mul_add(alpha, -d2);
    let qb = 2.0 * alpha * beta + 2.0 * d2 * p2;
    let qc = beta.mul_add(beta, -d2 * p2.mul_add(p2, q2 * q2));
    solve_quadratic(qa, qb, qc)
}

/// Real roots of `a x^2 + b x + c = 0`, degrading to the linear case.
fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    let magnitude = a.abs().max(b.abs()).max(c.abs());
    if magnitude == 0.0 {
        return Vec::new();
    }
    if a.abs() <= 1e-14 * magnitude {
        return if b.abs() > 1e-14 * magnitude {
            vec![-c / b]
        } else {
            Vec::new()
        };
    }
    let disc = b.mul_add(b, -4.0 * a * c);
    if disc < 0.0 {
        return if disc > -1e-12 * b * b {
            vec![-b / (2.0 * a)]
        } else {
            Vec::new()
        };
    }
    // Numerically stable pair
    let root = disc.sqrt();
    let q = -0.5 * (b + b.signum() * root);
    if q == 0.0 {
        return vec![0.0];
    }
    vec![q / a, c / q]
}
