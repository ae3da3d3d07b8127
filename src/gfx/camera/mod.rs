pub mod camera_controller;
pub mod fly_camera;

// Re-export main types
pub use camera_controller::{CameraController, KeyboardState};
pub use fly_camera::{FlyCamera, OPENGL_TO_WGPU_MATRIX};
