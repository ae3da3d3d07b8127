//! CPU reference for the two render passes
//!
//! Restates what `depth_pass.wgsl` and `lighting.wgsl` compute so the shadow
//! test and the lighting sum can be checked without a GPU. The shadow map is
//! built by casting one orthographic ray per texel center against the cube,
//! which is what rasterizing the cube at texel centers produces.

use cgmath::{
    ElementWise, InnerSpace, Matrix4, SquareMatrix, Vector2, Vector3, Vector4, Zero,
};

use crate::config::SceneConfig;
use crate::gfx::{
    frame::{FrameState, FrameTransforms},
    lighting::LIGHT_COUNT,
    scene::cube::CUBE_HALF_EXTENT,
};

pub const AMBIENT: f32 = 0.2;
pub const SPECULAR_STRENGTH: f32 = 0.5;
pub const SHININESS: f32 = 32.0;

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vector3<f32>,
    /// Normalized
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Ray from the near plane to the far plane through a point in NDC
    ///
    /// `clip_to_world` is the inverse of a view-projection matrix whose depth
    /// range is [0, 1].
    pub fn through_ndc(clip_to_world: &Matrix4<f32>, ndc: Vector2<f32>) -> Self {
        let near = unproject(clip_to_world, Vector3::new(ndc.x, ndc.y, 0.0));
        let far = unproject(clip_to_world, Vector3::new(ndc.x, ndc.y, 1.0));
        Self::new(near, far - near)
    }

    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// Surface point where a ray enters the cube
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub distance: f32,
    pub position: Vector3<f32>,
    pub normal: Vector3<f32>,
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// The scene's cube at its identity model transform
    pub fn unit_cube() -> Self {
        let h = CUBE_HALF_EXTENT;
        Self::new(Vector3::new(-h, -h, -h), Vector3::new(h, h, h))
    }

    /// Nearest entry point in front of the ray origin, with the normal of the
    /// face it enters through
    pub fn intersect_ray(&self, ray: &Ray) -> Option<Hit> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if !(t_near <= t_far && t_near >= 0.0) {
            return None;
        }

        // the entry face is on the axis whose slab is entered last
        let axis = if t_near == t1.x {
            0
        } else if t_near == t1.y {
            1
        } else {
            2
        };
        let mut normal = Vector3::zero();
        normal[axis] = -ray.direction[axis].signum();

        Some(Hit {
            distance: t_near,
            position: ray.point_at(t_near),
            normal,
        })
    }
}

fn unproject(clip_to_world: &Matrix4<f32>, ndc: Vector3<f32>) -> Vector3<f32> {
    let world = clip_to_world * ndc.extend(1.0);
    world.truncate() / world.w
}

/// Light-space NDC of a world position: xy in [-1, 1], depth in [0, 1]
pub fn light_ndc(light_space: &Matrix4<f32>, world_position: Vector3<f32>) -> Vector3<f32> {
    let clip: Vector4<f32> = light_space * world_position.extend(1.0);
    clip.truncate() / clip.w
}

/// Maps light-space NDC xy to shadow-map texture coordinates, y pointing down
pub fn ndc_to_uv(ndc: Vector3<f32>) -> Vector2<f32> {
    Vector2::new(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5)
}

/// Depth map of the cube as seen from light 0
pub struct ReferenceShadowMap {
    size: u32,
    light_space: Matrix4<f32>,
    depths: Vec<f32>,
}

impl ReferenceShadowMap {
    /// Fills every texel with the nearest cube depth, 1.0 where the cube is
    /// not hit (the clear value)
    pub fn render(light_space: Matrix4<f32>, size: u32) -> Self {
        let cube = Aabb::unit_cube();
        let clip_to_world = light_space.invert().unwrap_or_else(Matrix4::identity);
        let mut depths = vec![1.0; (size * size) as usize];

        for y in 0..size {
            for x in 0..size {
                let ray = Ray::through_ndc(&clip_to_world, texel_center_ndc(x, y, size));
                if let Some(hit) = cube.intersect_ray(&ray) {
                    depths[(y * size + x) as usize] = light_ndc(&light_space, hit.position).z;
                }
            }
        }

        Self {
            size,
            light_space,
            depths,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn light_space(&self) -> Matrix4<f32> {
        self.light_space
    }

    /// Ray from light 0 through the center of texel (x, y)
    pub fn texel_ray(&self, x: u32, y: u32) -> Ray {
        let clip_to_world = self.light_space.invert().unwrap_or_else(Matrix4::identity);
        Ray::through_ndc(&clip_to_world, texel_center_ndc(x, y, self.size))
    }

    /// Nearest-texel lookup; coordinates outside [0, 1) read as 1.0
    pub fn sample(&self, uv: Vector2<f32>) -> f32 {
        if uv.x < 0.0 || uv.y < 0.0 || uv.x >= 1.0 || uv.y >= 1.0 {
            return 1.0;
        }
        let max = self.size as f32 - 1.0;
        let x = (uv.x * self.size as f32).floor().clamp(0.0, max) as u32;
        let y = (uv.y * self.size as f32).floor().clamp(0.0, max) as u32;
        self.depths[(y * self.size + x) as usize]
    }

    /// 1.0 when nothing sits between the point and light 0, 0.0 otherwise
    pub fn visibility(&self, world_position: Vector3<f32>, tolerance: f32) -> f32 {
        let ndc = light_ndc(&self.light_space, world_position);
        let closest = self.sample(ndc_to_uv(ndc));
        if closest < ndc.z - tolerance {
            0.0
        } else {
            1.0
        }
    }
}

fn texel_center_ndc(x: u32, y: u32, size: u32) -> Vector2<f32> {
    let u = (x as f32 + 0.5) / size as f32;
    let v = (y as f32 + 0.5) / size as f32;
    Vector2::new(u * 2.0 - 1.0, 1.0 - v * 2.0)
}

/// Inputs to the per-fragment lighting function
#[derive(Debug, Clone, Copy)]
pub struct Fragment {
    pub world_position: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub view_position: Vector3<f32>,
    pub base_color: Vector3<f32>,
}

/// Lit color of a fragment, exactly as `fs_main` computes it
pub fn shade_fragment(
    fragment: &Fragment,
    lights: &[Vector3<f32>; LIGHT_COUNT],
    visibility: f32,
) -> Vector3<f32> {
    let norm = fragment.normal.normalize();
    let view_dir = (fragment.view_position - fragment.world_position).normalize();

    let mut lit = 0.0;
    for &light in lights {
        let light_dir = (light - fragment.world_position).normalize();
        let diffuse = norm.dot(light_dir).max(0.0);
        let reflect_dir = reflect(-light_dir, norm);
        let specular = SPECULAR_STRENGTH * view_dir.dot(reflect_dir).max(0.0).powf(SHININESS);
        lit += diffuse + specular;
    }

    let ambient = Vector3::new(AMBIENT, AMBIENT, AMBIENT);
    (ambient + Vector3::new(lit, lit, lit) * visibility).mul_element_wise(fragment.base_color)
}

fn reflect(incident: Vector3<f32>, normal: Vector3<f32>) -> Vector3<f32> {
    incident - normal * (2.0 * normal.dot(incident))
}

/// Rec. 709 luma of a linear color
pub fn luminance(color: Vector3<f32>) -> f32 {
    0.2126 * color.x + 0.7152 * color.y + 0.0722 * color.z
}

/// Whole-frame CPU reference: shadow map plus per-pixel shading
pub struct ReferenceRenderer {
    config: SceneConfig,
    frame: FrameState,
    transforms: FrameTransforms,
    shadow_map: ReferenceShadowMap,
}

impl ReferenceRenderer {
    pub fn new(frame: FrameState, config: SceneConfig) -> Self {
        let transforms = FrameTransforms::compute(&frame, &config);
        let shadow_map = ReferenceShadowMap::render(transforms.light_space, config.shadow.map_size);
        Self {
            config,
            frame,
            transforms,
            shadow_map,
        }
    }

    pub fn shadow_map(&self) -> &ReferenceShadowMap {
        &self.shadow_map
    }

    /// Color of pixel (x, y) of the window, sampled at the pixel center. Pixels
    /// that miss the cube get the clear color. `base_color` stands in for the
    /// diffuse texture.
    pub fn shade_pixel(&self, x: u32, y: u32, base_color: Vector3<f32>) -> Vector3<f32> {
        let width = self.config.window.width as f32;
        let height = self.config.window.height as f32;
        let ndc = Vector2::new(
            (x as f32 + 0.5) / width * 2.0 - 1.0,
            1.0 - (y as f32 + 0.5) / height * 2.0,
        );

        let clip_to_world = self
            .transforms
            .view_projection()
            .invert()
            .unwrap_or_else(Matrix4::identity);
        let ray = Ray::through_ndc(&clip_to_world, ndc);

        match Aabb::unit_cube().intersect_ray(&ray) {
            Some(hit) => {
                let fragment = Fragment {
                    world_position: hit.position,
                    normal: hit.normal,
                    view_position: self.frame.camera.position,
                    base_color,
                };
                let visibility = self
                    .shadow_map
                    .visibility(hit.position, self.config.shadow.tolerance);
                shade_fragment(&fragment, &self.frame.lights.positions, visibility)
            }
            None => {
                let c = self.config.clear_color;
                Vector3::new(c.r as f32, c.g as f32, c.b as f32)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShadowConfig;
    use crate::gfx::lighting::LightRig;

    fn white() -> Vector3<f32> {
        Vector3::new(1.0, 1.0, 1.0)
    }

    fn start_light_space() -> Matrix4<f32> {
        let config = SceneConfig::default();
        LightRig::for_frame(0.0, Vector3::new(2.0, 2.0, 2.0)).light_space_matrix(&config.shadow)
    }

    #[test]
    fn test_ray_hits_cube_face_with_outward_normal() {
        let ray = Ray::new(Vector3::new(0.0, 0.1, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = Aabb::unit_cube().intersect_ray(&ray).unwrap();
        assert!((hit.distance - 4.5).abs() < 1e-5);
        assert_eq!(hit.normal, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_ray_missing_cube() {
        let ray = Ray::new(Vector3::new(2.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(Aabb::unit_cube().intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_lit_fragment_matches_its_shadow_map_depth() {
        let map = ReferenceShadowMap::render(start_light_space(), 1024);
        let hit = Aabb::unit_cube()
            .intersect_ray(&map.texel_ray(512, 512))
            .expect("center texel ray hits the cube");

        // the face seen first by the light faces it
        let to_light = (LightRig::for_frame(0.0, Vector3::zero()).shadow_caster() - hit.position)
            .normalize();
        assert!(hit.normal.dot(to_light) > 0.0);

        let ndc = light_ndc(&map.light_space(), hit.position);
        let stored = map.sample(ndc_to_uv(ndc));
        assert!((stored - ndc.z).abs() < 1e-4);
        assert_eq!(map.visibility(hit.position, 0.0), 1.0);
    }

    #[test]
    fn test_far_side_of_cube_is_self_shadowed() {
        let map = ReferenceShadowMap::render(start_light_space(), 1024);
        // back face, light 0 starts at (0, 2, 3)
        for point in [
            Vector3::new(0.0, 0.0, -0.5),
            Vector3::new(0.2, -0.2, -0.5),
            Vector3::new(-0.3, -0.5, 0.1),
        ] {
            assert_eq!(
                map.visibility(point, ShadowConfig::default().tolerance),
                0.0,
                "{:?}",
                point
            );
        }
    }

    #[test]
    fn test_default_comparison_has_no_bias() {
        let map = ReferenceShadowMap::render(start_light_space(), 1024);
        let ray = map.texel_ray(512, 512);
        let hit = Aabb::unit_cube().intersect_ray(&ray).unwrap();

        // a hair behind the lit surface, well inside any bias a renderer might add
        let behind = ray.point_at(hit.distance + 0.01);
        let ndc = light_ndc(&map.light_space(), behind);
        assert!(ndc.z - map.sample(ndc_to_uv(ndc)) < 0.005);
        assert_eq!(map.visibility(behind, ShadowConfig::default().tolerance), 0.0);
    }

    #[test]
    fn test_outside_the_map_reads_far_depth() {
        let map = ReferenceShadowMap::render(start_light_space(), 64);
        assert_eq!(map.sample(Vector2::new(-0.1, 0.5)), 1.0);
        assert_eq!(map.sample(Vector2::new(0.5, 1.0)), 1.0);
        // corners of the light frustum see no cube
        assert_eq!(map.sample(Vector2::new(0.01, 0.01)), 1.0);
    }

    #[test]
    fn test_shadowed_fragment_keeps_only_ambient() {
        let fragment = Fragment {
            world_position: Vector3::new(0.0, 0.5, 0.0),
            normal: Vector3::unit_y(),
            view_position: Vector3::new(0.0, 3.0, 0.0),
            base_color: white(),
        };
        let lights = [Vector3::new(0.0, 2.0, 0.0), Vector3::new(0.0, 3.0, 0.0)];
        let shadowed = shade_fragment(&fragment, &lights, 0.0);
        assert!((shadowed - Vector3::new(0.2, 0.2, 0.2)).magnitude() < 1e-6);

        // both lights overhead: diffuse 1 + specular 0.5 each
        let lit = shade_fragment(&fragment, &lights, 1.0);
        assert!((lit.x - (0.2 + 2.0 * 1.5)).abs() < 1e-5);
    }

    #[test]
    fn test_texture_modulates_final_color() {
        let fragment = Fragment {
            world_position: Vector3::new(0.0, 0.5, 0.0),
            normal: Vector3::unit_y(),
            view_position: Vector3::new(0.0, 3.0, 0.0),
            base_color: Vector3::new(0.5, 0.0, 1.0),
        };
        let lights = [Vector3::new(0.0, -2.0, 0.0), Vector3::new(0.0, -3.0, 0.0)];
        let color = shade_fragment(&fragment, &lights, 1.0);
        assert!((color - Vector3::new(0.1, 0.0, 0.2)).magnitude() < 1e-6);
    }

    #[test]
    fn test_start_frame_top_face_is_brighter_than_ambient() {
        let config = SceneConfig::default();
        let frame = FrameState::new(&config);
        let renderer = ReferenceRenderer::new(frame, config.clone());

        // the exact center is the cube corner nearest the camera; the pixel
        // right of it lands on the +x face, which faces away from light 0.
        // 20 px up is the top face, lit by both lights.
        let (cx, cy) = (config.window.width / 2, config.window.height / 2 - 20);

        // strict comparison acne shadows some texels, not a whole window
        let brightest = (cx - 4..=cx + 4)
            .flat_map(|x| (cy - 4..=cy + 4).map(move |y| (x, y)))
            .map(|(x, y)| luminance(renderer.shade_pixel(x, y, white())))
            .fold(0.0f32, f32::max);
        assert!(brightest > AMBIENT, "top face luminance {}", brightest);

        let c = config.clear_color;
        let corner = renderer.shade_pixel(0, 0, white());
        assert!((corner.x - c.r as f32).abs() < 1e-6);
    }
}
