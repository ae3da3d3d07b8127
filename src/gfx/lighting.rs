//! The two point lights and the light-space transform used for shadows
//!
//! Light 0 orbits the cube and is the only shadow caster. Light 1 sits on the
//! camera. Both are white with unit intensity.

use cgmath::{ortho, Matrix4, Point3, Vector3};

use crate::config::ShadowConfig;
use crate::gfx::camera::OPENGL_TO_WGPU_MATRIX;

pub const LIGHT_COUNT: usize = 2;

const ORBIT_RADIUS: f32 = 3.0;
const ORBIT_HEIGHT: f32 = 2.0;

/// Position of the orbiting light `seconds` after start
pub fn orbit_position(seconds: f32) -> Vector3<f32> {
    Vector3::new(
        seconds.sin() * ORBIT_RADIUS,
        ORBIT_HEIGHT,
        seconds.cos() * ORBIT_RADIUS,
    )
}

/// Light positions for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub positions: [Vector3<f32>; LIGHT_COUNT],
}

impl LightRig {
    pub fn for_frame(seconds: f32, camera_position: Vector3<f32>) -> Self {
        Self {
            positions: [orbit_position(seconds), camera_position],
        }
    }

    /// The shadow-casting light
    pub fn shadow_caster(&self) -> Vector3<f32> {
        self.positions[0]
    }

    /// Orthographic projection times the view from light 0 toward the origin
    pub fn light_space_matrix(&self, shadow: &ShadowConfig) -> Matrix4<f32> {
        let e = shadow.ortho_extent;
        let projection = OPENGL_TO_WGPU_MATRIX * ortho(-e, e, -e, e, shadow.near, shadow.far);
        let caster = self.shadow_caster();
        let view = Matrix4::look_at_rh(
            Point3::new(caster.x, caster.y, caster.z),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::unit_y(),
        );
        projection * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector4};

    #[test]
    fn test_orbit_start_position() {
        assert_eq!(orbit_position(0.0), Vector3::new(0.0, 2.0, 3.0));
    }

    #[test]
    fn test_orbit_follows_sin_cos() {
        for t in [0.25f32, 1.0, 2.5, 10.0] {
            let p = orbit_position(t);
            assert_eq!(p, Vector3::new(t.sin() * 3.0, 2.0, t.cos() * 3.0));
            let horizontal = Vector3::new(p.x, 0.0, p.z).magnitude();
            assert!((horizontal - 3.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_second_light_tracks_camera() {
        let camera = Vector3::new(1.0, -4.0, 7.5);
        let rig = LightRig::for_frame(3.0, camera);
        assert_eq!(rig.positions[1], camera);
    }

    #[test]
    fn test_cube_fits_in_light_depth_range() {
        let rig = LightRig::for_frame(0.0, Vector3::new(2.0, 2.0, 2.0));
        let matrix = rig.light_space_matrix(&ShadowConfig::default());
        for x in [-0.5f32, 0.5] {
            for y in [-0.5f32, 0.5] {
                for z in [-0.5f32, 0.5] {
                    let clip = matrix * Vector4::new(x, y, z, 1.0);
                    let ndc = clip.truncate() / clip.w;
                    assert!(ndc.x.abs() < 1.0 && ndc.y.abs() < 1.0);
                    assert!(ndc.z > 0.0 && ndc.z < 1.0);
                }
            }
        }
    }
}
