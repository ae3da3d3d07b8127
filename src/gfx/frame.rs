//! Per-frame state owned by the frame driver
//!
//! The app handler owns `FrameState`, input mutates it and the renderer reads
//! it. `FrameTransforms` is derived from it fresh every frame.

use cgmath::{Matrix, Matrix4, SquareMatrix, Vector3, Zero};
use winit::{
    event::{ElementState, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::config::SceneConfig;
use crate::gfx::{
    camera::{CameraController, FlyCamera, KeyboardState},
    lighting::LightRig,
};

/// Lifecycle of the frame loop. `Closing` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Closing,
}

impl RunState {
    /// Moves to `Closing`; there is no way back
    pub fn request_close(&mut self) {
        *self = RunState::Closing;
    }

    pub fn is_running(self) -> bool {
        self == RunState::Running
    }
}

/// Window input that changes the loop state or the held keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key {
        key: PhysicalKey,
        state: ElementState,
    },
    FocusLost,
    CloseRequested,
}

impl InputEvent {
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => Some(Self::Key {
                key: event.physical_key,
                state: event.state,
            }),
            // key releases are not delivered while unfocused
            WindowEvent::Focused(false) => Some(Self::FocusLost),
            WindowEvent::CloseRequested => Some(Self::CloseRequested),
            _ => None,
        }
    }

    /// ESC presses and close requests move to `Closing`. ESC is never held.
    pub fn apply(self, run_state: &mut RunState, keys: &mut KeyboardState) {
        match self {
            Self::Key {
                key: PhysicalKey::Code(KeyCode::Escape),
                state,
            } => {
                if state == ElementState::Pressed {
                    run_state.request_close();
                }
            }
            Self::Key {
                key: PhysicalKey::Code(code),
                state,
            } => keys.set(code, state == ElementState::Pressed),
            Self::Key { .. } => {}
            Self::FocusLost => keys.clear(),
            Self::CloseRequested => run_state.request_close(),
        }
    }
}

/// Mutable scene state for one iteration of the loop
#[derive(Debug, Clone, Copy)]
pub struct FrameState {
    pub camera: FlyCamera,
    pub lights: LightRig,
    /// Seconds since the loop started
    pub elapsed: f32,
}

impl FrameState {
    /// Camera at (2, 2, 2) looking at the origin, clock at zero
    pub fn new(config: &SceneConfig) -> Self {
        let camera =
            FlyCamera::looking_at(Vector3::new(2.0, 2.0, 2.0), Vector3::zero(), config.aspect());
        Self {
            camera,
            lights: LightRig::for_frame(0.0, camera.position),
            elapsed: 0.0,
        }
    }

    /// Applies held keys to the camera, then places both lights
    ///
    /// Light 1 follows the camera position after this frame's movement.
    pub fn advance(&mut self, elapsed: f32, keys: &KeyboardState, controller: &CameraController) {
        controller.update_camera(keys, &mut self.camera);
        self.elapsed = elapsed;
        self.lights = LightRig::for_frame(elapsed, self.camera.position);
    }
}

/// Every matrix the two passes need, rebuilt each frame
#[derive(Debug, Clone, Copy)]
pub struct FrameTransforms {
    pub model: Matrix4<f32>,
    pub normal_matrix: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub light_space: Matrix4<f32>,
}

impl FrameTransforms {
    pub fn compute(frame: &FrameState, config: &SceneConfig) -> Self {
        // the cube never moves
        let model = Matrix4::identity();
        let normal_matrix = model
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or(model);

        Self {
            model,
            normal_matrix,
            view: frame.camera.view_matrix(),
            projection: frame.camera.projection_matrix(),
            light_space: frame.lights.light_space_matrix(&config.shadow),
        }
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, state: ElementState) -> InputEvent {
        InputEvent::Key {
            key: PhysicalKey::Code(code),
            state,
        }
    }

    #[test]
    fn test_close_is_terminal() {
        let mut state = RunState::Running;
        assert!(state.is_running());
        state.request_close();
        assert_eq!(state, RunState::Closing);
        state.request_close();
        assert!(!state.is_running());
    }

    #[test]
    fn test_escape_press_closes_without_holding_escape() {
        let mut run_state = RunState::Running;
        let mut keys = KeyboardState::new();

        key(KeyCode::Escape, ElementState::Pressed).apply(&mut run_state, &mut keys);

        assert_eq!(run_state, RunState::Closing);
        assert!(!keys.is_pressed(KeyCode::Escape));
    }

    #[test]
    fn test_escape_release_keeps_running() {
        let mut run_state = RunState::Running;
        let mut keys = KeyboardState::new();
        key(KeyCode::Escape, ElementState::Released).apply(&mut run_state, &mut keys);
        assert!(run_state.is_running());
    }

    #[test]
    fn test_close_request_closes() {
        let mut run_state = RunState::Running;
        let mut keys = KeyboardState::new();

        let input = InputEvent::from_window_event(&WindowEvent::CloseRequested).unwrap();
        input.apply(&mut run_state, &mut keys);

        assert_eq!(run_state, RunState::Closing);
    }

    #[test]
    fn test_movement_keys_are_held_until_released_or_unfocused() {
        let mut run_state = RunState::Running;
        let mut keys = KeyboardState::new();

        key(KeyCode::KeyW, ElementState::Pressed).apply(&mut run_state, &mut keys);
        key(KeyCode::KeyE, ElementState::Pressed).apply(&mut run_state, &mut keys);
        assert!(keys.is_pressed(KeyCode::KeyW));
        assert!(run_state.is_running());

        key(KeyCode::KeyW, ElementState::Released).apply(&mut run_state, &mut keys);
        assert!(!keys.is_pressed(KeyCode::KeyW));
        assert!(keys.is_pressed(KeyCode::KeyE));

        let focus_lost = InputEvent::from_window_event(&WindowEvent::Focused(false)).unwrap();
        focus_lost.apply(&mut run_state, &mut keys);
        assert!(!keys.is_pressed(KeyCode::KeyE));
        assert!(run_state.is_running());
    }

    #[test]
    fn test_advance_moves_camera_before_placing_lights() {
        let config = SceneConfig::default();
        let mut frame = FrameState::new(&config);
        let mut keys = KeyboardState::new();
        keys.set(KeyCode::KeyW, true);

        frame.advance(1.5, &keys, &CameraController::new(config.camera_speed));

        assert_eq!(frame.lights.positions[1], frame.camera.position);
        assert_ne!(frame.camera.position, Vector3::new(2.0, 2.0, 2.0));
        assert_eq!(frame.lights.positions[0], crate::gfx::lighting::orbit_position(1.5));
    }

    #[test]
    fn test_model_is_identity() {
        let config = SceneConfig::default();
        let transforms = FrameTransforms::compute(&FrameState::new(&config), &config);
        assert_eq!(transforms.model, Matrix4::identity());
        assert_eq!(transforms.normal_matrix, Matrix4::identity());
    }
}
