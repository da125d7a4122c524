//! Mesh storage and render stream generation.
//!
//! [`MeshStore`] owns the per-vertex arrays of an indexed triangle mesh and
//! regenerates the flattened per-triangle-corner streams consumed by a
//! renderer. Region membership is painted into the color stream.

use std::collections::HashMap;

use deform_config::RegionColors;
use glam::Vec3;

use crate::constants::WELD_SCALE;
use crate::region::RegionManager;
use crate::types::{MeshError, VertexClass, VertexId};

/// Indexed triangle mesh with per-vertex normals and colors.
///
/// Invariant: every per-vertex array has the same length, that length is
/// non-zero, and every face index is in range.
#[derive(Debug, Clone)]
pub struct MeshStore {
    positions: Vec<Vec3>,
    faces: Vec<[u32; 3]>,
    normals: Vec<Vec3>,
    colors: Vec<[u8; 4]>,
}

/// Flattened vertex streams, three entries per face in face order.
#[derive(Debug, Clone, Default)]
pub struct RenderStreams {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// RGBA in [0, 1]
    pub colors: Vec<[f32; 4]>,
}

impl RenderStreams {
    /// Number of emitted vertices (3 per triangle)
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }
}

impl MeshStore {
    /// Build a mesh from positions and triangle indices.
    ///
    /// Normals are computed from the faces and every vertex gets the default
    /// base color.
    pub fn new(positions: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Result<Self, MeshError> {
        if positions.is_empty() {
            return Err(MeshError::Empty);
        }
        check_finite(&positions)?;
        let len = positions.len();
        for (face, tri) in faces.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= len) {
                return Err(MeshError::FaceIndexOutOfRange { face, index, len });
            }
        }

        let mut mesh = Self {
            normals: vec![Vec3::Y; len],
            colors: vec![deform_config::DEFAULT_BASE_COLOR; len],
            positions,
            faces,
        };
        mesh.recompute_normals();
        Ok(mesh)
    }

    /// Build a mesh after merging positionally identical vertices.
    ///
    /// Duplicates collapse onto their first occurrence. Triangles that
    /// become degenerate after welding are dropped. Non-finite positions are
    /// rejected before quantizing.
    pub fn welded(positions: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Result<Self, MeshError> {
        check_finite(&positions)?;
        let quantize = |p: Vec3| -> [i64; 3] {
            [
                (p.x * WELD_SCALE).round() as i64,
                (p.y * WELD_SCALE).round() as i64,
                (p.z * WELD_SCALE).round() as i64,
            ]
        };

        let mut position_to_new: HashMap<[i64; 3], u32> = HashMap::new();
        let mut remap: Vec<u32> = Vec::with_capacity(positions.len());
        let mut welded_positions: Vec<Vec3> = Vec::new();

        for &pos in &positions {
            let new_index = *position_to_new.entry(quantize(pos)).or_insert_with(|| {
                welded_positions.push(pos);
                (welded_positions.len() - 1) as u32
            });
            remap.push(new_index);
        }

        let mut welded_faces = Vec::with_capacity(faces.len());
        for (face, tri) in faces.iter().enumerate() {
            let mut mapped = [0u32; 3];
            for (corner, &i) in tri.iter().enumerate() {
                let Some(&new_index) = remap.get(i as usize) else {
                    return Err(MeshError::FaceIndexOutOfRange {
                        face,
                        index: i,
                        len: positions.len(),
                    });
                };
                mapped[corner] = new_index;
            }
            if mapped[0] != mapped[1] && mapped[1] != mapped[2] && mapped[0] != mapped[2] {
                welded_faces.push(mapped);
            }
        }

        let merged = positions.len() - welded_positions.len();
        let dropped = faces.len() - welded_faces.len();
        if merged > 0 || dropped > 0 {
            tracing::debug!(
                "welded {} duplicate vertices ({} unique), dropped {} degenerate triangles",
                merged,
                welded_positions.len(),
                dropped
            );
        }

        Self::new(welded_positions, welded_faces)
    }

    /// Replace the per-vertex base colors.
    pub fn with_colors(mut self, colors: Vec<[u8; 4]>) -> Result<Self, MeshError> {
        if colors.len() != self.positions.len() {
            return Err(MeshError::AttributeLength {
                attribute: "color",
                found: colors.len(),
                expected: self.positions.len(),
            });
        }
        self.colors = colors;
        Ok(self)
    }

    /// Paint every vertex with one base color.
    pub fn fill_colors(&mut self, rgba: [u8; 4]) {
        self.colors.fill(rgba);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn colors(&self) -> &[[u8; 4]] {
        &self.colors
    }

    /// Position of a vertex, `None` when the id is out of range
    pub fn position(&self, id: VertexId) -> Option<Vec3> {
        self.positions.get(id.index()).copied()
    }

    /// Move a single vertex. Returns false when the id is out of range.
    pub fn set_position(&mut self, id: VertexId, position: Vec3) -> bool {
        match self.positions.get_mut(id.index()) {
            Some(p) => {
                *p = position;
                true
            }
            None => false,
        }
    }

    pub(crate) fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    /// Recompute area-weighted vertex normals from the current positions.
    ///
    /// Vertices with no incident area keep an up-facing normal.
    pub fn recompute_normals(&mut self) {
        let mut accumulated = vec![Vec3::ZERO; self.positions.len()];
        for tri in &self.faces {
            let [a, b, c] = tri.map(|i| self.positions[i as usize]);
            // Length is twice the triangle area
            let normal = (b - a).cross(c - a);
            for &i in tri {
                accumulated[i as usize] += normal;
            }
        }
        self.normals = accumulated
            .into_iter()
            .map(|n| n.normalize_or(Vec3::Y))
            .collect();
    }

    /// Vertex closest to `point`; the lowest index wins on ties.
    pub fn nearest_vertex(&self, point: Vec3) -> VertexId {
        let mut best = 0usize;
        let mut best_dist = f32::INFINITY;
        for (i, p) in self.positions.iter().enumerate() {
            let dist = p.distance_squared(point);
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        VertexId(best as u32)
    }

    /// All vertices strictly closer than `radius` to `center`, in index order.
    pub fn vertices_within(&self, center: Vec3, radius: f32) -> Vec<VertexId> {
        self.positions
            .iter()
            .enumerate()
            .filter(|(_, p)| p.distance(center) < radius)
            .map(|(i, _)| VertexId(i as u32))
            .collect()
    }

    /// Regenerate the flattened render streams from current positions and
    /// region membership. Fixed tint wins over deformable tint.
    pub fn rebuild(&self, regions: &RegionManager, colors: &RegionColors) -> RenderStreams {
        let corner_count = self.faces.len() * 3;
        let mut streams = RenderStreams {
            positions: Vec::with_capacity(corner_count),
            normals: Vec::with_capacity(corner_count),
            colors: Vec::with_capacity(corner_count),
        };

        for tri in &self.faces {
            for &i in tri {
                let i = i as usize;
                let rgba = match regions.classify(VertexId(i as u32)) {
                    VertexClass::Fixed => colors.fixed,
                    VertexClass::Deformable => colors.deformable,
                    VertexClass::Normal => self.colors[i],
                };
                streams.positions.push(self.positions[i]);
                streams.normals.push(self.normals[i]);
                streams.colors.push(rgba.map(|c| c as f32 / 255.0));
            }
        }

        streams
    }
}

fn check_finite(positions: &[Vec3]) -> Result<(), MeshError> {
    match positions.iter().position(|p| !p.is_finite()) {
        Some(vertex) => Err(MeshError::NonFinitePosition { vertex }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_meshes::{grid, single_triangle};

    #[test]
    fn test_empty_mesh_rejected() {
        let result = MeshStore::new(Vec::new(), Vec::new());
        assert!(matches!(result, Err(MeshError::Empty)));
    }

    #[test]
    fn test_out_of_range_face_rejected() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let result = MeshStore::new(positions, vec![[0, 1, 3]]);
        assert!(matches!(
            result,
            Err(MeshError::FaceIndexOutOfRange { face: 0, index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_non_finite_position_rejected() {
        let positions = vec![Vec3::ZERO, Vec3::new(f32::NAN, 0.0, 0.0), Vec3::Y];
        let result = MeshStore::new(positions.clone(), vec![[0, 1, 2]]);
        assert!(matches!(result, Err(MeshError::NonFinitePosition { vertex: 1 })));

        // Must not weld onto the vertex at the origin
        let result = MeshStore::welded(positions, vec![[0, 1, 2]]);
        assert!(matches!(result, Err(MeshError::NonFinitePosition { vertex: 1 })));

        let result = MeshStore::new(vec![Vec3::X, Vec3::splat(f32::INFINITY)], Vec::new());
        assert!(matches!(result, Err(MeshError::NonFinitePosition { vertex: 1 })));
    }

    #[test]
    fn test_faceless_mesh_allowed() {
        let mesh = MeshStore::new(vec![Vec3::ZERO], Vec::new()).unwrap();
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(mesh.normals()[0], Vec3::Y);
    }

    #[test]
    fn test_normals_of_planar_triangle() {
        let mesh = single_triangle();
        for n in mesh.normals() {
            assert!((*n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_welding_merges_duplicates() {
        // Two triangles sharing an edge, stored as a triangle soup
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [3, 4, 5]];
        let mesh = MeshStore::welded(positions, faces).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces(), &[[0, 1, 2], [1, 3, 2]]);
    }

    #[test]
    fn test_welding_drops_degenerate_triangles() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::X, Vec3::Y];
        let mesh = MeshStore::welded(positions, vec![[0, 1, 2], [0, 1, 3]]).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn test_nearest_vertex_tie_breaks_low() {
        let positions = vec![Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)];
        let mesh = MeshStore::new(positions, Vec::new()).unwrap();
        assert_eq!(mesh.nearest_vertex(Vec3::ZERO), VertexId(0));
        assert_eq!(mesh.nearest_vertex(Vec3::new(0.1, 0.0, 0.0)), VertexId(1));
    }

    #[test]
    fn test_vertices_within_radius() {
        let mesh = grid(3, 2.0);
        // Spacing is 1.0; the center vertex is 4
        let selected = mesh.vertices_within(Vec3::new(1.0, 1.0, 0.0), 1.0);
        assert_eq!(selected, vec![VertexId(4)]);

        let selected = mesh.vertices_within(Vec3::new(1.0, 1.0, 0.0), 1.01);
        assert_eq!(
            selected,
            vec![VertexId(1), VertexId(3), VertexId(4), VertexId(5), VertexId(7)]
        );
    }

    #[test]
    fn test_rebuild_flattens_and_tints() {
        let mesh = single_triangle();
        let mut regions = RegionManager::new(mesh.vertex_count());
        regions.add_fixed(&[VertexId(0)]).unwrap();
        regions.add_deformable(&[VertexId(0), VertexId(1)]).unwrap();

        let colors = RegionColors::default();
        let streams = mesh.rebuild(&regions, &colors);

        assert_eq!(streams.vertex_count(), 3);
        assert_eq!(streams.positions, mesh.positions().to_vec());
        // Fixed wins over deformable
        assert_eq!(streams.colors[0], [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(streams.colors[1], [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(streams.colors[2], [102.0 / 255.0, 102.0 / 255.0, 102.0 / 255.0, 1.0]);
        assert_eq!(streams.position_bytes().len(), 3 * 12);
        assert_eq!(streams.color_bytes().len(), 3 * 16);
    }

    #[test]
    fn test_color_length_checked() {
        let result = single_triangle().with_colors(vec![[0, 0, 0, 255]]);
        assert!(matches!(
            result,
            Err(MeshError::AttributeLength { found: 1, expected: 3, .. })
        ));
    }
}
