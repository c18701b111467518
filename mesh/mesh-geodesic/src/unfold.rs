//! Planar unfolding helpers.
//!
//! Every window lives in the 2-D frame of its edge: the edge's first
//! endpoint at the origin, the second at `(length, 0)`. Faces are unfolded
//! into that frame by placing their third vertex from the known edge lengths.

use nalgebra::{Point3, Vector2};

/// 2-D cross product (z component of the 3-D cross product).
#[inline]
pub fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x.mul_add(b.y, -(a.y * b.x))
}

/// Place the apex of a triangle over a base on the x-axis.
///
/// The base runs from `(0, 0)` to `(base, 0)`; `left` and `right` are the
/// apex's distances to the two base endpoints. The apex is returned with a
/// positive y coordinate, or `None` if the triangle is flat within
/// `tolerance` (or the lengths violate the triangle inequality).
#[must_use]
pub fn place_apex(base: f64, left: f64, right: f64, tolerance: f64) -> Option<Vector2<f64>> {
    if base <= tolerance {
        return None;
    }
    let x = (left * left - right * right + base * base) / (2.0 * base);
    let h2 = left.mul_add(left, -(x * x));
    if !h2.is_finite() || h2 <= tolerance * tolerance {
        return None;
    }
    Some(Vector2::new(x, h2.sqrt()))
}

/// Where a ray leaving `origin` through `through` meets the line `q0 → q1`.
///
/// Returns the fraction along `q0 → q1` (unclamped), or `None` if the ray is
/// parallel to the segment.
#[must_use]
pub fn ray_segment_param(
    origin: &Vector2<f64>,
    through: &Vector2<f64>,
    q0: &Vector2<f64>,
    q1: &Vector2<f64>,
) -> Option<f64> {
    let r = through - origin;
    let s = q1 - q0;
    let denom = cross(&r, &s);
    if denom.abs() <= f64::EPSILON * r.norm() * s.norm() {
        return None;
    }
    Some(cross(&(q0 - origin), &r) / denom)
}

/// Coordinates of `point` in the frame of the directed segment `q0 → q1`.
///
/// The x coordinate is measured along the segment from `q0`; the y
/// coordinate is the unsigned distance from the segment's line.
#[must_use]
pub fn to_edge_frame(point: &Vector2<f64>, q0: &Vector2<f64>, q1: &Vector2<f64>) -> Vector2<f64> {
    let d = q1 - q0;
    let len = d.norm();
    let rel = point - q0;
    Vector2::new(rel.dot(&d) / len, cross(&d, &rel).abs() / len)
}

/// Coordinates of a 3-D point in the frame of the edge `a → b`.
///
/// The point is assumed to lie in a face containing the edge, so the
/// distance from the edge's line is also its in-plane height.
#[must_use]
pub fn to_edge_frame_3d(point: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> Vector2<f64> {
    let d = b - a;
    let len = d.norm();
    let rel = point - a;
    let x = rel.dot(&d) / len;
    let y = d.cross(&rel).norm() / len;
    Vector2::new(x, y)
}
