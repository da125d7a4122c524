//! Handle-driven mesh deformation
//!
//! This crate deforms a triangle mesh by dragging a single handle point:
//! - [`mesh::MeshStore`] - Vertex positions, faces, normals and render streams
//! - [`graph::SurfaceGraph`] - Edge graph weighted by Euclidean edge length
//! - [`shortest_path`] - Dijkstra, including multi-source via a virtual node
//! - [`region::RegionManager`] - Fixed and deformable vertex regions
//! - [`engine::DeformationEngine`] - Handle selection and linear-blend deformation
//! - [`raycast`] - Ray picking against the mesh
//! - [`obj_io`] - Wavefront OBJ load and export
//! - [`session::EditSession`] - Mode-driven pointer interaction on top of the engine

pub mod constants;
pub mod engine;
pub mod graph;
pub mod mesh;
pub mod obj_io;
pub mod raycast;
pub mod region;
pub mod session;
pub mod shortest_path;
pub mod types;

#[cfg(test)]
mod test_meshes;

pub use constants::*;
pub use engine::*;
pub use graph::*;
pub use mesh::*;
pub use obj_io::*;
pub use raycast::*;
pub use region::*;
pub use session::*;
pub use shortest_path::*;
pub use types::*;

pub use deform_config::{EditorConfig, RegionColors};
