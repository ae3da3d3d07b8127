//! Error types for the block scene
//!
//! The variants carry three different severities: initialization errors are
//! fatal and bubble up to `main`, shader errors are logged where they happen and
//! rendering carries on, and texture decode errors are swallowed by the loader
//! in favour of a white fallback.

use std::path::PathBuf;

/// Errors produced while setting up or driving the scene
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Windowing, surface, adapter or device creation failed
    #[error("initialization failed: {0}")]
    Init(String),

    /// A WGSL module failed validation
    #[error("shader '{label}' failed to compile: {message}")]
    ShaderCompile { label: String, message: String },

    /// A render pipeline could not be built from its shader modules
    #[error("pipeline '{label}' failed to link: {message}")]
    ShaderLink { label: String, message: String },

    /// An image file could not be opened or decoded
    #[error("failed to decode texture {}: {source}", path.display())]
    TextureDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The swap chain could not hand out a frame and reconfiguring will not help
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// Reading a rendered frame back from the GPU failed
    #[error("frame readback failed: {0}")]
    Readback(String),
}

impl SceneError {
    pub fn init(message: impl std::fmt::Display) -> Self {
        SceneError::Init(message.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SceneError>;
