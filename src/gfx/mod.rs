//! # Graphics Module
//!
//! Everything that turns the per-frame scene state into pixels.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Free-fly camera and its keyboard controller
//! - **Lighting** ([`lighting`]) - The two point lights and light 0's shadow projection
//! - **Frame State** ([`frame`]) - What one frame advances and the matrices derived from it
//! - **Rendering Pipeline** ([`rendering`]) - Depth pass, lit color pass, window and offscreen targets
//! - **Scene** ([`scene`]) - The cube mesh and its vertex layout
//! - **Resource Management** ([`resources`]) - Uniforms, textures and depth targets
//!
//! ## Usage
//!
//! ```no_run
//! use block_scene::config::SceneConfig;
//! use block_scene::gfx::{frame::FrameState, rendering::OffscreenRenderer};
//!
//! let config = SceneConfig::default();
//! let renderer = pollster::block_on(OffscreenRenderer::new(&config)).unwrap();
//! let image = renderer.render(&FrameState::new(&config)).unwrap();
//! ```

pub mod camera;
pub mod frame;
pub mod lighting;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::fly_camera::FlyCamera;
pub use rendering::render_engine::RenderEngine;
