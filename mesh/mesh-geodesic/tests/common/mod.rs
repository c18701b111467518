//! Shared mesh builders and reference solvers for integration tests.

#![allow(
    dead_code,
    clippy::expect_used,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use mesh_geodesic::{GeodesicMesh, SurfacePoint};
use nalgebra::Point3;

// =============================================================================
// Mesh builders
// =============================================================================

/// Unit square split along the 0-2 diagonal.
pub fn square() -> GeodesicMesh {
    let vertices = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ];
    GeodesicMesh::build(&vertices, &[[0, 1, 2], [0, 2, 3]]).expect("valid square")
}

/// Surface of the unit cube `[0, 1]^3` (12 triangles).
///
/// Vertices 0..4 are the bottom ring (`z = 0`), 4..8 the top ring.
pub fn unit_cube() -> GeodesicMesh {
    let vertices = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];
    let faces = [
        [0, 1, 2],
        [0, 2, 3],
        [4, 6, 5],
        [4, 7, 6],
        [0, 4, 5],
        [0, 5, 1],
        [2, 6, 7],
        [2, 7, 3],
        [0, 3, 7],
        [0, 7, 4],
        [1, 5, 6],
        [1, 6, 2],
    ];
    GeodesicMesh::build(&vertices, &faces).expect("valid cube")
}

/// Regular tetrahedron with edge length `2 * sqrt(2)`.
pub fn regular_tetrahedron() -> GeodesicMesh {
    let vertices = [
        [1.0, 1.0, 1.0],
        [1.0, -1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
    ];
    let faces = [[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];
    GeodesicMesh::build(&vertices, &faces).expect("valid tetrahedron")
}

/// Vertex positions of an `n x n` cell grid over `[0, size]^2`, lifted by
/// `height(x, y)`.
pub fn grid_positions(n: usize, size: f64, height: impl Fn(f64, f64) -> f64) -> Vec<[f64; 3]> {
    let step = size / n as f64;
    let mut positions = Vec::with_capacity((n + 1) * (n + 1));
    for j in 0..=n {
        for i in 0..=n {
            let x = i as f64 * step;
            let y = j as f64 * step;
            positions.push([x, y, height(x, y)]);
        }
    }
    positions
}

/// Two triangles per grid cell, split along alternating diagonals.
pub fn grid_faces(n: usize) -> Vec<[u32; 3]> {
    let row = n + 1;
    let mut faces = Vec::with_capacity(2 * n * n);
    for j in 0..n {
        for i in 0..n {
            let v00 = (j * row + i) as u32;
            let v10 = v00 + 1;
            let v01 = v00 + row as u32;
            let v11 = v01 + 1;
            if (i + j) % 2 == 0 {
                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            } else {
                faces.push([v00, v10, v01]);
                faces.push([v10, v11, v01]);
            }
        }
    }
    faces
}

/// Flat `n x n` grid over `[0, size]^2` in the `z = 0` plane.
pub fn flat_grid(n: usize, size: f64) -> GeodesicMesh {
    GeodesicMesh::build(&grid_positions(n, size, |_, _| 0.0), &grid_faces(n))
        .expect("valid flat grid")
}

/// Grid over `[0, size]^2` with one height per vertex (row-major).
pub fn terrain(n: usize, size: f64, heights: &[f64]) -> GeodesicMesh {
    let row = n + 1;
    let positions = grid_positions(n, size, |x, y| {
        let i = (x / size * n as f64).round() as usize;
        let j = (y / size * n as f64).round() as usize;
        heights[j * row + i]
    });
    GeodesicMesh::build(&positions, &grid_faces(n)).expect("valid terrain")
}

/// Three unit squares forming an L with a reflex corner at `(1, 1)`.
///
/// ```text
/// 5---6
/// |   |
/// 2---3---4
/// |   |   |
/// 0---1---7
/// ```
pub fn l_shape() -> GeodesicMesh {
    let vertices = [
        [0.0, 0.0, 0.0], // 0
        [1.0, 0.0, 0.0], // 1
        [0.0, 1.0, 0.0], // 2
        [1.0, 1.0, 0.0], // 3 (reflex corner)
        [2.0, 1.0, 0.0], // 4
        [0.0, 2.0, 0.0], // 5
        [1.0, 2.0, 0.0], // 6
        [2.0, 0.0, 0.0], // 7
    ];
    let faces = [
        [0, 1, 3],
        [0, 3, 2],
        [1, 7, 4],
        [1, 4, 3],
        [2, 3, 6],
        [2, 6, 5],
    ];
    GeodesicMesh::build(&vertices, &faces).expect("valid L shape")
}

/// Two triangles that share no vertex.
pub fn disconnected_pair() -> GeodesicMesh {
    let vertices = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [3.0, 0.0, 0.0],
        [4.0, 0.0, 0.0],
        [3.0, 1.0, 0.0],
    ];
    GeodesicMesh::build(&vertices, &[[0, 1, 2], [3, 4, 5]]).expect("valid pair")
}

// =============================================================================
// Point helpers
// =============================================================================

/// Locate a 3-D position that lies on the mesh surface.
pub fn locate(mesh: &GeodesicMesh, position: [f64; 3]) -> SurfacePoint {
    let target = Point3::from(position);
    (0..mesh.face_count())
        .map(|face| SurfacePoint::in_face(mesh, face, &target))
        .find(|point| {
            let SurfacePoint::Face { barycentric, .. } = point else {
                return false;
            };
            barycentric.iter().all(|&w| w >= -1e-9)
                && point
                    .position(mesh)
                    .is_ok_and(|p| (p - target).norm() < 1e-9)
        })
        .expect("position lies on the mesh")
}

/// Euclidean distance between two surface points.
pub fn euclidean(mesh: &GeodesicMesh, a: &SurfacePoint, b: &SurfacePoint) -> f64 {
    let pa = a.position(mesh).expect("point on mesh");
    let pb = b.position(mesh).expect("point on mesh");
    (pa - pb).norm()
}

// =============================================================================
// Edge-graph reference
// =============================================================================

/// State for the priority queue in Dijkstra's algorithm.
#[derive(Debug, Clone, Copy)]
struct State {
    vertex: usize,
    distance: f64,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

/// Shortest distances along mesh edges only; an upper bound on the
/// geodesic distance.
pub fn edge_graph_distances(mesh: &GeodesicMesh, source: usize) -> Vec<f64> {
    let mut distances = vec![f64::INFINITY; mesh.vertex_count()];
    let mut heap = BinaryHeap::new();

    distances[source] = 0.0;
    heap.push(State {
        vertex: source,
        distance: 0.0,
    });

    while let Some(State { vertex, distance }) = heap.pop() {
        // Skip if we've already found a better path
        if distance > distances[vertex] {
            continue;
        }
        for &edge in mesh.vertex_edges(vertex) {
            let [a, b] = mesh.edge(edge).vertices;
            let neighbor = if a == vertex { b } else { a };
            let next = distance + mesh.edge_length(edge);
            if next < distances[neighbor] {
                distances[neighbor] = next;
                heap.push(State {
                    vertex: neighbor,
                    distance: next,
                });
            }
        }
    }

    distances
}
