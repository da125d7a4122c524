//! Interactive editing session.
//!
//! Maps the editor's pointer interactions onto engine calls:
//! 1. View mode: holding the secondary button paints the fixed region
//! 2. Select mode: the primary button picks the handle, holding the
//!    secondary button paints the deformable region for preview
//! 3. Deform mode: holding the secondary button drags the handle
//!
//! Rays come from the host camera. Picks that miss the mesh and drags
//! without a valid handle are logged and leave the mesh untouched.

use std::path::Path;

use deform_config::EditorConfig;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::DeformationEngine;
use crate::mesh::{MeshStore, RenderStreams};
use crate::obj_io;
use crate::raycast::{pick_vertices, raycast_mesh};
use crate::types::{EngineError, MeshError, Ray, VertexId};

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EditMode {
    /// Orbit the camera and paint the fixed region
    #[default]
    View,
    /// Pick the handle and preview-paint the deformable region
    Select,
    /// Drag the handle
    Deform,
}

/// One editing session over a single mesh.
#[derive(Debug, Clone)]
pub struct EditSession {
    engine: DeformationEngine,
    config: EditorConfig,
    mode: EditMode,
}

impl EditSession {
    /// Start a session; the mesh is painted with the configured base color.
    pub fn new(mut mesh: MeshStore, config: EditorConfig) -> Self {
        mesh.fill_colors(config.colors.base);
        Self {
            engine: DeformationEngine::with_config(mesh, &config),
            config,
            mode: EditMode::default(),
        }
    }

    /// Open a session on an OBJ file.
    pub fn open(path: impl AsRef<Path>, config: EditorConfig) -> Result<Self, MeshError> {
        Ok(Self::new(obj_io::load_obj(path)?, config))
    }

    /// Replace the mesh with one loaded from disk. On failure the current
    /// mesh and regions are kept.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), MeshError> {
        let mut mesh = obj_io::load_obj(path)?;
        mesh.fill_colors(self.config.colors.base);
        self.engine.load_mesh(mesh);
        Ok(())
    }

    /// Write the current (deformed) mesh to disk.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<(), MeshError> {
        obj_io::export_obj(self.engine.mesh(), path)
    }

    pub fn engine(&self) -> &DeformationEngine {
        &self.engine
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: EditMode) {
        if self.mode != mode {
            debug!("edit mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    pub fn brush_radius(&self) -> f32 {
        self.config.brush_radius
    }

    /// Set the brush radius, clamped to be non-negative
    pub fn set_brush_radius(&mut self, radius: f32) {
        self.config.set_brush_radius(radius);
    }

    /// Current handle position, if a handle is selected
    pub fn handle_position(&self) -> Option<Vec3> {
        self.engine.handle().map(|h| h.position)
    }

    /// Primary button pressed.
    ///
    /// Returns whether the mesh state changed.
    pub fn primary_pressed(&mut self, ray: &Ray) -> bool {
        match self.mode {
            EditMode::Select => self.select_handle(ray).is_some(),
            EditMode::View | EditMode::Deform => false,
        }
    }

    /// Secondary button held (called every frame while held).
    ///
    /// Returns whether the mesh state changed.
    pub fn secondary_held(&mut self, ray: &Ray) -> bool {
        match self.mode {
            EditMode::View => self.paint_fixed(ray),
            EditMode::Select => self.paint_deformable(ray),
            EditMode::Deform => self.drag_handle(ray),
        }
    }

    /// Add the vertices under the brush to the fixed region.
    pub fn paint_fixed(&mut self, ray: &Ray) -> bool {
        let Some(indices) = self.brush_pick(ray) else {
            return false;
        };
        self.apply_region(|engine| engine.add_fixed(&indices))
    }

    /// Add the vertices under the brush to the deformable region.
    pub fn paint_deformable(&mut self, ray: &Ray) -> bool {
        let Some(indices) = self.brush_pick(ray) else {
            return false;
        };
        self.apply_region(|engine| engine.add_deformable(&indices))
    }

    fn brush_pick(&self, ray: &Ray) -> Option<Vec<VertexId>> {
        let picked = pick_vertices(ray, self.engine.mesh(), self.config.brush_radius);
        if picked.is_none() {
            debug!("brush pick missed the mesh");
        }
        picked
    }

    fn apply_region(
        &mut self,
        op: impl FnOnce(&mut DeformationEngine) -> Result<(), EngineError>,
    ) -> bool {
        match op(&mut self.engine) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("region update rejected: {}", e);
                false
            }
        }
    }

    /// Select the handle where the ray hits the mesh.
    ///
    /// The handle keeps the exact hit point as its position and snaps to the
    /// nearest vertex for distance computation.
    pub fn select_handle(&mut self, ray: &Ray) -> Option<VertexId> {
        let Some(hit) = raycast_mesh(ray, self.engine.mesh()) else {
            debug!("handle pick missed the mesh");
            return None;
        };
        let vertex = self.engine.select_handle(hit.point);
        info!(
            "handle selected at {:?} (vertex {}), {} deformable vertices",
            hit.point,
            vertex.0,
            self.engine.regions().deformable_count()
        );
        Some(vertex)
    }

    /// Drag the handle onto `ray`, keeping its distance from the ray origin.
    pub fn drag_handle(&mut self, ray: &Ray) -> bool {
        let Some(original) = self.handle_position() else {
            return false;
        };
        let distance = original.distance(ray.origin());
        let target = ray.at(distance);
        match self.engine.deform(original, target) {
            Ok(moved) => moved > 0,
            Err(e) => {
                debug!("drag ignored: {}", e);
                false
            }
        }
    }

    /// Clear the fixed region; the handle must be selected again.
    pub fn clear_fixed_region(&mut self) {
        self.engine.clear_fixed_region();
    }

    /// Render streams tinted with the configured region colors
    pub fn render_streams(&self) -> RenderStreams {
        self.engine.render_streams(&self.config.colors)
    }
}
