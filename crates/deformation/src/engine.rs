//! Handle-driven deformation.
//!
//! Selecting a handle runs the expensive shortest-path passes once and
//! freezes the result in a [`DistanceSnapshot`]. Every drag afterwards is a
//! linear blend: each deformable vertex moves by the handle shift scaled by
//!
//! ```text
//! w = d_fixed / (d_fixed + d_handle + epsilon)
//! ```
//!
//! which is 0 on the fixed boundary and approaches 1 at the handle.
//!
//! The surface graph is built once per mesh and is not rebuilt as vertices
//! move, so geodesic distances always refer to the loaded geometry.

use deform_config::{EditorConfig, RegionColors};
use glam::Vec3;
use tracing::{debug, trace, warn};

use crate::graph::SurfaceGraph;
use crate::mesh::{MeshStore, RenderStreams};
use crate::region::RegionManager;
use crate::shortest_path::{multi_source, single_source};
use crate::types::{EngineError, VertexId};

/// Blend weight for a vertex at the given geodesic distances.
///
/// `epsilon` keeps the result finite when both distances are zero.
pub fn blend_weight(dist_to_fixed: f32, dist_to_handle: f32, epsilon: f32) -> f32 {
    dist_to_fixed / (dist_to_fixed + dist_to_handle + epsilon)
}

/// The point being dragged and the vertex it was snapped to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Vertex identity fixed at selection time
    pub vertex: VertexId,
    /// Current handle position, updated on every drag
    pub position: Vec3,
}

/// Geodesic distances frozen at handle selection.
#[derive(Debug, Clone)]
pub struct DistanceSnapshot {
    pub handle: VertexId,
    /// Distance to the closest fixed vertex
    pub dist_to_fixed: Vec<f32>,
    /// Distance to the handle vertex
    pub dist_to_handle: Vec<f32>,
    /// Closest fixed vertex, `None` when no fixed vertex is reachable
    pub nearest_fixed: Vec<Option<VertexId>>,
    weights: Vec<f32>,
}

impl DistanceSnapshot {
    /// Blend weight of a vertex; 0 where either distance is infinite.
    pub fn weight(&self, id: VertexId) -> f32 {
        self.weights.get(id.index()).copied().unwrap_or(0.0)
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

/// Owns one editing session's mesh, surface graph, regions and snapshot.
#[derive(Debug, Clone)]
pub struct DeformationEngine {
    mesh: MeshStore,
    graph: SurfaceGraph,
    regions: RegionManager,
    snapshot: Option<DistanceSnapshot>,
    handle: Option<Handle>,
    weight_epsilon: f32,
}

impl DeformationEngine {
    /// Create an engine with the default blend epsilon.
    pub fn new(mesh: MeshStore) -> Self {
        Self::with_epsilon(mesh, deform_config::DEFAULT_WEIGHT_EPSILON)
    }

    pub fn with_config(mesh: MeshStore, config: &EditorConfig) -> Self {
        Self::with_epsilon(mesh, config.weight_epsilon)
    }

    fn with_epsilon(mesh: MeshStore, weight_epsilon: f32) -> Self {
        let graph = SurfaceGraph::build(&mesh);
        let regions = RegionManager::new(mesh.vertex_count());
        debug!(
            "deformation engine ready: {} vertices, {} faces",
            mesh.vertex_count(),
            mesh.face_count()
        );
        Self {
            mesh,
            graph,
            regions,
            snapshot: None,
            handle: None,
            weight_epsilon,
        }
    }

    /// Replace the mesh, rebuilding the graph and resetting all regions.
    pub fn load_mesh(&mut self, mesh: MeshStore) {
        *self = Self::with_epsilon(mesh, self.weight_epsilon);
    }

    pub fn mesh(&self) -> &MeshStore {
        &self.mesh
    }

    pub fn graph(&self) -> &SurfaceGraph {
        &self.graph
    }

    pub fn regions(&self) -> &RegionManager {
        &self.regions
    }

    /// Snapshot of the current handle selection, if still valid
    pub fn snapshot(&self) -> Option<&DistanceSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn handle(&self) -> Option<Handle> {
        self.handle
    }

    pub fn weight_epsilon(&self) -> f32 {
        self.weight_epsilon
    }

    /// Add vertices to the fixed region. Invalidates the current handle.
    pub fn add_fixed(&mut self, indices: &[VertexId]) -> Result<(), EngineError> {
        self.regions.add_fixed(indices)?;
        self.invalidate();
        Ok(())
    }

    /// Paint vertices into the deformable region for preview.
    pub fn add_deformable(&mut self, indices: &[VertexId]) -> Result<(), EngineError> {
        self.regions.add_deformable(indices)?;
        Ok(())
    }

    pub fn clear_deformable(&mut self) {
        self.regions.clear_deformable();
    }

    /// Clear the fixed region and drop the handle and its snapshot.
    pub fn clear_fixed_region(&mut self) {
        self.regions.clear_fixed();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        if self.snapshot.take().is_some() {
            debug!("distance snapshot invalidated");
        }
        self.handle = None;
    }

    /// Snap `pick_point` to its nearest vertex, make it the handle and
    /// compute the deformable region and blend weights.
    ///
    /// A vertex is deformable when it is geodesically closer to the handle
    /// than its nearest fixed vertex is. With no fixed region every vertex is
    /// unreachable and the deformable region stays empty.
    pub fn select_handle(&mut self, pick_point: Vec3) -> VertexId {
        let handle = self.mesh.nearest_vertex(pick_point);

        let fixed = self.regions.fixed_indices();
        let from_fixed = multi_source(&self.graph, &fixed);
        let dist_to_handle = single_source(&self.graph, handle.index()).distances;

        let deformable: Vec<bool> = (0..self.mesh.vertex_count())
            .map(|v| match from_fixed.nearest_source[v] {
                Some(anchor) => dist_to_handle[v] < dist_to_handle[anchor.index()],
                None => false,
            })
            .collect();

        let weights: Vec<f32> = from_fixed
            .distances
            .iter()
            .zip(&dist_to_handle)
            .map(|(&d_fixed, &d_handle)| {
                if d_fixed.is_finite() && d_handle.is_finite() {
                    blend_weight(d_fixed, d_handle, self.weight_epsilon)
                } else {
                    0.0
                }
            })
            .collect();

        let deformable_count = deformable.iter().filter(|&&d| d).count();
        if fixed.is_empty() {
            warn!("handle selected without a fixed region; nothing will deform");
        }
        debug!(
            "handle {:?}: {} fixed, {} deformable vertices",
            handle,
            fixed.len(),
            deformable_count
        );

        self.regions.set_deformable(deformable);
        self.snapshot = Some(DistanceSnapshot {
            handle,
            dist_to_fixed: from_fixed.distances,
            dist_to_handle,
            nearest_fixed: from_fixed.nearest_source,
            weights,
        });
        self.handle = Some(Handle {
            vertex: handle,
            position: pick_point,
        });

        handle
    }

    /// Move the deformable region by the handle shift `new - original`,
    /// scaled per vertex by its snapshot weight.
    ///
    /// Returns the number of vertices displaced. Fails with
    /// [`EngineError::StaleSnapshot`] without touching the mesh when no
    /// handle has been selected since the last region change or mesh load.
    pub fn deform(&mut self, handle_original: Vec3, handle_new: Vec3) -> Result<usize, EngineError> {
        let Some(snapshot) = &self.snapshot else {
            warn!("deform called without a valid distance snapshot");
            return Err(EngineError::StaleSnapshot);
        };

        let shift = handle_new - handle_original;
        if let Some(handle) = &mut self.handle {
            handle.position = handle_new;
        }
        if shift == Vec3::ZERO {
            return Ok(0);
        }

        let mut moved = 0;
        let positions = self.mesh.positions_mut();
        for (v, &deformable) in self.regions.deformable_mask().iter().enumerate() {
            if !deformable {
                continue;
            }
            positions[v] += snapshot.weights[v] * shift;
            moved += 1;
        }

        if moved > 0 {
            self.mesh.recompute_normals();
        }
        trace!("deform: shift={:?}, {} vertices moved", shift, moved);

        Ok(moved)
    }

    /// Flattened render streams tinted by region membership
    pub fn render_streams(&self, colors: &RegionColors) -> RenderStreams {
        self.mesh.rebuild(&self.regions, colors)
    }

    /// Consume the engine, returning the (possibly deformed) mesh
    pub fn into_mesh(self) -> MeshStore {
        self.mesh
    }
}
