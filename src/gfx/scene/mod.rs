//! # Scene Geometry Module
//!
//! The scene is a single cube: [`cube`] holds its 36 hardcoded vertices and the
//! GPU buffer built from them, [`vertex`] the layout both pipelines read.

pub mod cube;
pub mod vertex;

// Re-export main types
pub use cube::{CubeMesh, DrawCube, CUBE_VERTICES};
pub use vertex::Vertex3D;
