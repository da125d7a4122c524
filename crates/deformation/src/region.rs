//! Fixed and deformable vertex regions.
//!
//! The deformable region only has meaning relative to a particular fixed
//! region and handle, so any change to the fixed region clears it.

use crate::types::{RegionError, VertexClass, VertexId};

/// Per-vertex membership masks for the fixed and deformable regions.
#[derive(Debug, Clone)]
pub struct RegionManager {
    fixed: Vec<bool>,
    deformable: Vec<bool>,
}

impl RegionManager {
    /// Create empty regions for a mesh with `vertex_count` vertices.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            fixed: vec![false; vertex_count],
            deformable: vec![false; vertex_count],
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.fixed.len()
    }

    /// Add vertices to the fixed region and clear the deformable region.
    ///
    /// The call is rejected as a whole if any index is out of range.
    pub fn add_fixed(&mut self, indices: &[VertexId]) -> Result<(), RegionError> {
        self.check_indices(indices)?;
        for id in indices {
            self.fixed[id.index()] = true;
        }
        self.clear_deformable();
        Ok(())
    }

    /// Paint vertices into the deformable region (manual preview).
    pub fn add_deformable(&mut self, indices: &[VertexId]) -> Result<(), RegionError> {
        self.check_indices(indices)?;
        for id in indices {
            self.deformable[id.index()] = true;
        }
        Ok(())
    }

    pub fn clear_fixed(&mut self) {
        self.fixed.fill(false);
        self.clear_deformable();
    }

    pub fn clear_deformable(&mut self) {
        self.deformable.fill(false);
    }

    /// Replace the deformable mask with a computed one.
    pub(crate) fn set_deformable(&mut self, mask: Vec<bool>) {
        debug_assert_eq!(mask.len(), self.deformable.len());
        self.deformable = mask;
    }

    pub fn is_fixed(&self, id: VertexId) -> bool {
        self.fixed.get(id.index()).copied().unwrap_or(false)
    }

    pub fn is_deformable(&self, id: VertexId) -> bool {
        self.deformable.get(id.index()).copied().unwrap_or(false)
    }

    /// Render classification; fixed wins if a vertex is in both regions.
    pub fn classify(&self, id: VertexId) -> VertexClass {
        if self.is_fixed(id) {
            VertexClass::Fixed
        } else if self.is_deformable(id) {
            VertexClass::Deformable
        } else {
            VertexClass::Normal
        }
    }

    pub fn fixed_mask(&self) -> &[bool] {
        &self.fixed
    }

    pub fn deformable_mask(&self) -> &[bool] {
        &self.deformable
    }

    /// Fixed vertices in index order
    pub fn fixed_indices(&self) -> Vec<VertexId> {
        mask_indices(&self.fixed)
    }

    /// Deformable vertices in index order
    pub fn deformable_indices(&self) -> Vec<VertexId> {
        mask_indices(&self.deformable)
    }

    pub fn fixed_count(&self) -> usize {
        self.fixed.iter().filter(|&&f| f).count()
    }

    pub fn deformable_count(&self) -> usize {
        self.deformable.iter().filter(|&&d| d).count()
    }

    fn check_indices(&self, indices: &[VertexId]) -> Result<(), RegionError> {
        let len = self.fixed.len();
        match indices.iter().find(|id| id.index() >= len) {
            Some(id) => Err(RegionError::IndexOutOfRange { index: id.0, len }),
            None => Ok(()),
        }
    }
}

fn mask_indices(mask: &[bool]) -> Vec<VertexId> {
    mask.iter()
        .enumerate()
        .filter(|(_, set)| **set)
        .map(|(i, _)| VertexId(i as u32))
        .collect()
}
