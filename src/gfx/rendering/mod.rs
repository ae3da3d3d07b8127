// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Pipelines, the depth and lighting passes, window and offscreen targets, and
//! a CPU restatement of both passes.

pub mod offscreen;
pub mod pipeline_manager;
pub mod reference;
pub mod render_engine;
pub mod scene_renderer;

// Re-export main types
pub use offscreen::OffscreenRenderer;
pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::RenderEngine;
pub use scene_renderer::SceneRenderer;
