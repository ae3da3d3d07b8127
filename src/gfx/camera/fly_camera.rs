use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Free-fly camera: a position, a unit forward vector and a fixed world up
#[derive(Debug, Clone, Copy)]
pub struct FlyCamera {
    pub position: Vector3<f32>,
    pub forward: Vector3<f32>,
    pub up: Vector3<f32>,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl FlyCamera {
    /// Camera at `position` looking at `target`
    pub fn looking_at(position: Vector3<f32>, target: Vector3<f32>, aspect: f32) -> Self {
        Self {
            position,
            forward: (target - position).normalize(),
            up: Vector3::unit_y(),
            aspect,
            fovy: Deg(45.0).into(),
            znear: 0.1,
            zfar: 100.0,
        }
    }

    /// Normalized `forward × up`, or `None` when looking straight up or down
    pub fn right(&self) -> Option<Vector3<f32>> {
        let right = self.forward.cross(self.up);
        if right.magnitude2() <= f32::EPSILON {
            None
        } else {
            Some(right.normalize())
        }
    }

    pub fn translate(&mut self, delta: Vector3<f32>) {
        self.position += delta;
    }

    /// Rotates `forward` about world up. Positive angles turn left.
    pub fn yaw(&mut self, angle: Rad<f32>) {
        self.forward = rotate_about(self.forward, self.up, angle);
    }

    /// Rotates `forward` about the camera's right axis. Positive angles tilt up.
    pub fn pitch(&mut self, angle: Rad<f32>) {
        if let Some(right) = self.right() {
            self.forward = rotate_about(self.forward, right, angle);
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.position);
        Matrix4::look_at_rh(eye, eye + self.forward, self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

fn rotate_about(v: Vector3<f32>, axis: Vector3<f32>, angle: Rad<f32>) -> Vector3<f32> {
    (Matrix3::from_axis_angle(axis, angle) * v).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_camera() -> FlyCamera {
        FlyCamera::looking_at(Vector3::new(2.0, 2.0, 2.0), Vector3::zero(), 800.0 / 600.0)
    }

    #[test]
    fn test_depth_remapped_to_zero_one() {
        let near = OPENGL_TO_WGPU_MATRIX * Vector4::new(0.0, 0.0, -1.0, 1.0);
        let far = OPENGL_TO_WGPU_MATRIX * Vector4::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(near, Vector4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(far, Vector4::new(0.0, 0.0, 1.0, 1.0));

        let point = OPENGL_TO_WGPU_MATRIX * Vector4::new(0.3, -0.7, 0.0, 2.0);
        assert_eq!(point, Vector4::new(0.3, -0.7, 1.0, 2.0));
    }

    #[test]
    fn test_initial_forward_points_at_origin() {
        let camera = start_camera();
        let expected = Vector3::new(-1.0, -1.0, -1.0).normalize();
        assert!((camera.forward - expected).magnitude() < 1e-6);
    }

    #[test]
    fn test_forward_stays_unit_after_rotations() {
        let mut camera = start_camera();
        for i in 0..2000 {
            match i % 4 {
                0 => camera.yaw(Rad(0.01)),
                1 => camera.pitch(Rad(-0.01)),
                2 => camera.yaw(Rad(-0.037)),
                _ => camera.pitch(Rad(0.023)),
            }
            assert!((camera.forward.magnitude() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_yaw_keeps_height_component() {
        let mut camera = start_camera();
        let before = camera.forward.y;
        camera.yaw(Rad(0.5));
        assert!((camera.forward.y - before).abs() < 1e-6);
    }

    #[test]
    fn test_pitch_is_skipped_when_looking_straight_down() {
        let mut camera = start_camera();
        camera.forward = -Vector3::unit_y();
        assert!(camera.right().is_none());
        camera.pitch(Rad(0.1));
        assert_eq!(camera.forward, -Vector3::unit_y());
    }

    #[test]
    fn test_origin_projects_to_screen_center() {
        let camera = start_camera();
        let clip = camera.build_view_projection_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
        let depth = clip.z / clip.w;
        assert!(depth > 0.0 && depth < 1.0);
    }
}
