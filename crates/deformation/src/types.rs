//! Shared identifiers, classifications and error types.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Type-safe vertex identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub u32);

impl VertexId {
    /// Position of this vertex in the per-vertex arrays
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Render classification of a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum VertexClass {
    /// Not part of any region
    #[default]
    Normal = 0,
    /// Rigid anchor
    Fixed = 1,
    /// Moves with the handle
    Deformable = 2,
}

/// A pick ray in mesh space, supplied by the host camera.
///
/// The direction is always unit length (or zero for a degenerate input), so
/// `t` along the ray is a world-space distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Unit direction
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Point at distance `t` along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Errors raised while building or loading a mesh
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("Mesh has no vertices")]
    Empty,
    #[error("Vertex {vertex} has a non-finite position")]
    NonFinitePosition { vertex: usize },
    #[error("Face {face} references vertex {index} but mesh has {len} vertices")]
    FaceIndexOutOfRange { face: usize, index: u32, len: usize },
    #[error("{attribute} count {found} does not match vertex count {expected}")]
    AttributeLength {
        attribute: &'static str,
        found: usize,
        expected: usize,
    },
    #[error("Mesh I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("OBJ error: {0}")]
    Obj(#[from] obj::ObjError),
}

/// Errors raised by region mutation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegionError {
    #[error("Vertex index {index} out of range for {len} vertices")]
    IndexOutOfRange { index: u32, len: usize },
}

/// Errors raised by the deformation engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("No valid distance snapshot; select a handle first")]
    StaleSnapshot,
    #[error(transparent)]
    Region(#[from] RegionError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}
