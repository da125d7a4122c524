//! Ray-mesh intersection for picking.
//!
//! Ray-triangle tests use the Moller-Trumbore algorithm and accept hits from
//! either side of a triangle. The engine only consumes the resulting hit
//! point; building rays from screen coordinates is the host camera's job.

use glam::Vec3;

use crate::constants::RAY_EPSILON;
use crate::mesh::MeshStore;
use crate::types::{Ray, VertexId};

/// Result of a ray-triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Distance along the ray to the intersection point
    pub t: f32,
    /// Barycentric coordinate u (weight for vertex 1)
    pub u: f32,
    /// Barycentric coordinate v (weight for vertex 2)
    pub v: f32,
}

/// Closest intersection of a ray with a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshHit {
    /// Intersection point in mesh space
    pub point: Vec3,
    /// Distance from the ray origin
    pub distance: f32,
    /// Index of the hit face
    pub face: usize,
    /// Barycentric weights (w, u, v) of the face corners
    pub barycentric: Vec3,
}

/// Moller-Trumbore ray-triangle intersection algorithm.
///
/// Returns the hit distance and barycentric coordinates if the ray intersects
/// the triangle in front of its origin.
pub fn ray_triangle_intersection(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let pvec = ray.direction().cross(edge2);
    let det = edge1.dot(pvec);

    // Ray parallel to the triangle plane
    if det.abs() < RAY_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = ray.origin() - v0;

    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray.direction().dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    if t < RAY_EPSILON {
        return None;
    }

    Some(TriangleHit { t, u, v })
}

/// Cast a ray against every triangle and return the closest hit.
///
/// On equal distances the lower face index wins.
pub fn raycast_mesh(ray: &Ray, mesh: &MeshStore) -> Option<MeshHit> {
    let positions = mesh.positions();
    let mut closest: Option<(TriangleHit, usize)> = None;

    // Brute force over all triangles
    for (face, tri) in mesh.faces().iter().enumerate() {
        let [v0, v1, v2] = tri.map(|i| positions[i as usize]);
        if let Some(hit) = ray_triangle_intersection(ray, v0, v1, v2) {
            let dominated = match &closest {
                Some((prev, _)) => hit.t >= prev.t,
                None => false,
            };
            if !dominated {
                closest = Some((hit, face));
            }
        }
    }

    closest.map(|(hit, face)| MeshHit {
        point: ray.at(hit.t),
        distance: hit.t,
        face,
        barycentric: Vec3::new(1.0 - hit.u - hit.v, hit.u, hit.v),
    })
}

/// Vertices within `radius` of the point where `ray` first hits the mesh.
///
/// `None` when the ray misses.
pub fn pick_vertices(ray: &Ray, mesh: &MeshStore, radius: f32) -> Option<Vec<VertexId>> {
    let hit = raycast_mesh(ray, mesh)?;
    Some(mesh.vertices_within(hit.point, radius))
}
