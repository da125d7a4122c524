//! Small procedural meshes shared by the unit tests.

use glam::Vec3;

use crate::mesh::MeshStore;

/// Planar `n`×`n` vertex grid in the XY plane spanning `size` units.
///
/// Vertex `row * n + col` sits at `(col, row) * spacing`. Each cell is split
/// along its (row, col)–(row + 1, col + 1) diagonal.
pub(crate) fn grid(n: usize, size: f32) -> MeshStore {
    let spacing = size / (n - 1) as f32;
    let mut positions = Vec::with_capacity(n * n);
    for row in 0..n {
        for col in 0..n {
            positions.push(Vec3::new(col as f32 * spacing, row as f32 * spacing, 0.0));
        }
    }

    let mut faces = Vec::new();
    for row in 0..n - 1 {
        for col in 0..n - 1 {
            let a = (row * n + col) as u32;
            let b = a + 1;
            let c = a + n as u32;
            let d = c + 1;
            faces.push([a, b, d]);
            faces.push([a, d, c]);
        }
    }

    MeshStore::new(positions, faces).unwrap()
}

/// Two-row triangle strip along +X with `columns` vertices per row.
///
/// Bottom row vertices are `0..columns`, top row `columns..2 * columns`.
pub(crate) fn strip(columns: usize) -> MeshStore {
    let mut positions = Vec::with_capacity(columns * 2);
    for row in 0..2 {
        for col in 0..columns {
            positions.push(Vec3::new(col as f32, row as f32, 0.0));
        }
    }

    let n = columns as u32;
    let mut faces = Vec::new();
    for col in 0..n - 1 {
        faces.push([col, col + 1, n + col + 1]);
        faces.push([col, n + col + 1, n + col]);
    }

    MeshStore::new(positions, faces).unwrap()
}

/// Unit right triangle in the XY plane.
pub(crate) fn single_triangle() -> MeshStore {
    MeshStore::new(
        vec![Vec3::ZERO, Vec3::X, Vec3::Y],
        vec![[0, 1, 2]],
    )
    .unwrap()
}
