// src/lib.rs
//! Block Scene
//!
//! A textured cube lit by two point lights, shadowed from the first, seen
//! through a keyboard-driven fly camera. Built on wgpu and winit.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::BlockSceneApp;
pub use config::SceneConfig;
pub use error::SceneError;
