use std::collections::HashSet;

use cgmath::Rad;
use winit::keyboard::KeyCode;

use super::fly_camera::FlyCamera;

/// Keys currently held down, fed from window keyboard events
///
/// Lets the frame loop test key state once per frame the same way a polled
/// input API would.
#[derive(Debug, Default, Clone)]
pub struct KeyboardState {
    pressed: HashSet<KeyCode>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, code: KeyCode, pressed: bool) {
        if pressed {
            self.pressed.insert(code);
        } else {
            self.pressed.remove(&code);
        }
    }

    pub fn is_pressed(&self, code: KeyCode) -> bool {
        self.pressed.contains(&code)
    }

    /// Drops every held key, used when the window loses focus
    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

/// Applies fixed per-frame camera steps for each held key
///
/// Every check is independent, so opposite keys cancel and diagonal
/// movement adds up without normalization. Steps are per frame, not per
/// second.
pub struct CameraController {
    pub speed: f32,
}

impl CameraController {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    pub fn update_camera(&self, keys: &KeyboardState, camera: &mut FlyCamera) {
        let speed = self.speed;
        let turn = Rad(speed / 3.0);

        if keys.is_pressed(KeyCode::KeyW) {
            camera.translate(camera.forward * speed);
        }
        if keys.is_pressed(KeyCode::KeyS) {
            camera.translate(-camera.forward * speed);
        }
        if keys.is_pressed(KeyCode::KeyA) {
            if let Some(right) = camera.right() {
                camera.translate(-right * speed);
            }
        }
        if keys.is_pressed(KeyCode::KeyD) {
            if let Some(right) = camera.right() {
                camera.translate(right * speed);
            }
        }
        if keys.is_pressed(KeyCode::KeyQ) {
            camera.translate(camera.up * (speed / 3.0));
        }
        if keys.is_pressed(KeyCode::KeyE) {
            camera.translate(-camera.up * (speed / 3.0));
        }
        if keys.is_pressed(KeyCode::ArrowLeft) {
            camera.yaw(-turn);
        }
        if keys.is_pressed(KeyCode::ArrowRight) {
            camera.yaw(turn);
        }
        if keys.is_pressed(KeyCode::ArrowUp) {
            camera.pitch(-turn);
        }
        if keys.is_pressed(KeyCode::ArrowDown) {
            camera.pitch(turn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3, Zero};

    fn camera() -> FlyCamera {
        FlyCamera::looking_at(Vector3::new(2.0, 2.0, 2.0), Vector3::zero(), 4.0 / 3.0)
    }

    fn held(codes: &[KeyCode]) -> KeyboardState {
        let mut keys = KeyboardState::new();
        for code in codes {
            keys.set(*code, true);
        }
        keys
    }

    #[test]
    fn test_no_keys_leaves_camera_alone() {
        let mut cam = camera();
        let before = cam;
        CameraController::new(0.03).update_camera(&KeyboardState::new(), &mut cam);
        assert_eq!(cam.position, before.position);
        assert_eq!(cam.forward, before.forward);
    }

    #[test]
    fn test_forward_step_is_fixed_per_frame() {
        let mut cam = camera();
        let start = cam.position;
        CameraController::new(0.03).update_camera(&held(&[KeyCode::KeyW]), &mut cam);
        assert!(((cam.position - start).magnitude() - 0.03).abs() < 1e-6);
        assert!(((cam.position - start).normalize() - cam.forward).magnitude() < 1e-5);
    }

    #[test]
    fn test_diagonal_movement_is_not_normalized() {
        let mut cam = camera();
        let start = cam.position;
        CameraController::new(0.03)
            .update_camera(&held(&[KeyCode::KeyW, KeyCode::KeyD]), &mut cam);
        let moved = (cam.position - start).magnitude();
        assert!((moved - 0.03 * 2f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_vertical_moves_a_third_of_speed() {
        let mut cam = camera();
        let start = cam.position;
        CameraController::new(0.03).update_camera(&held(&[KeyCode::KeyQ]), &mut cam);
        assert!((cam.position.y - start.y - 0.01).abs() < 1e-6);
        assert_eq!(cam.position.x, start.x);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut cam = camera();
        let start = cam.position;
        CameraController::new(0.03)
            .update_camera(&held(&[KeyCode::KeyW, KeyCode::KeyS]), &mut cam);
        assert!((cam.position - start).magnitude() < 1e-6);
    }

    #[test]
    fn test_released_key_stops_applying() {
        let mut keys = held(&[KeyCode::ArrowLeft]);
        keys.set(KeyCode::ArrowLeft, false);
        assert!(!keys.is_pressed(KeyCode::ArrowLeft));
    }

    #[test]
    fn test_arrow_keys_keep_forward_normalized() {
        let mut cam = camera();
        let controller = CameraController::new(0.03);
        let keys = held(&[KeyCode::ArrowRight, KeyCode::ArrowDown]);
        for _ in 0..500 {
            controller.update_camera(&keys, &mut cam);
            assert!((cam.forward.magnitude() - 1.0).abs() < 1e-5);
        }
    }
}
