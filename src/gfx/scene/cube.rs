//! The hardcoded cube mesh
//!
//! A unit cube centered at the origin, 6 faces of 2 triangles each, no index
//! buffer. Texture coordinates run 0..1 across every face.

use wgpu::util::DeviceExt;

use super::vertex::Vertex3D;

pub const CUBE_VERTEX_COUNT: u32 = 36;

const fn v(p: [f32; 3], n: [f32; 3], t: [f32; 2]) -> Vertex3D {
    Vertex3D::new(p, n, t)
}

#[rustfmt::skip]
pub const CUBE_VERTICES: [Vertex3D; CUBE_VERTEX_COUNT as usize] = [
    // Back face (-Z)
    v([-0.5, -0.5, -0.5], [ 0.0,  0.0, -1.0], [0.0, 0.0]),
    v([ 0.5, -0.5, -0.5], [ 0.0,  0.0, -1.0], [1.0, 0.0]),
    v([ 0.5,  0.5, -0.5], [ 0.0,  0.0, -1.0], [1.0, 1.0]),
    v([ 0.5,  0.5, -0.5], [ 0.0,  0.0, -1.0], [1.0, 1.0]),
    v([-0.5,  0.5, -0.5], [ 0.0,  0.0, -1.0], [0.0, 1.0]),
    v([-0.5, -0.5, -0.5], [ 0.0,  0.0, -1.0], [0.0, 0.0]),
    // Front face (+Z)
    v([-0.5, -0.5,  0.5], [ 0.0,  0.0,  1.0], [0.0, 0.0]),
    v([ 0.5, -0.5,  0.5], [ 0.0,  0.0,  1.0], [1.0, 0.0]),
    v([ 0.5,  0.5,  0.5], [ 0.0,  0.0,  1.0], [1.0, 1.0]),
    v([ 0.5,  0.5,  0.5], [ 0.0,  0.0,  1.0], [1.0, 1.0]),
    v([-0.5,  0.5,  0.5], [ 0.0,  0.0,  1.0], [0.0, 1.0]),
    v([-0.5, -0.5,  0.5], [ 0.0,  0.0,  1.0], [0.0, 0.0]),
    // Left face (-X)
    v([-0.5,  0.5,  0.5], [-1.0,  0.0,  0.0], [1.0, 0.0]),
    v([-0.5,  0.5, -0.5], [-1.0,  0.0,  0.0], [1.0, 1.0]),
    v([-0.5, -0.5, -0.5], [-1.0,  0.0,  0.0], [0.0, 1.0]),
    v([-0.5, -0.5, -0.5], [-1.0,  0.0,  0.0], [0.0, 1.0]),
    v([-0.5, -0.5,  0.5], [-1.0,  0.0,  0.0], [0.0, 0.0]),
    v([-0.5,  0.5,  0.5], [-1.0,  0.0,  0.0], [1.0, 0.0]),
    // Right face (+X)
    v([ 0.5,  0.5,  0.5], [ 1.0,  0.0,  0.0], [1.0, 0.0]),
    v([ 0.5,  0.5, -0.5], [ 1.0,  0.0,  0.0], [1.0, 1.0]),
    v([ 0.5, -0.5, -0.5], [ 1.0,  0.0,  0.0], [0.0, 1.0]),
    v([ 0.5, -0.5, -0.5], [ 1.0,  0.0,  0.0], [0.0, 1.0]),
    v([ 0.5, -0.5,  0.5], [ 1.0,  0.0,  0.0], [0.0, 0.0]),
    v([ 0.5,  0.5,  0.5], [ 1.0,  0.0,  0.0], [1.0, 0.0]),
    // Bottom face (-Y)
    v([-0.5, -0.5, -0.5], [ 0.0, -1.0,  0.0], [0.0, 1.0]),
    v([ 0.5, -0.5, -0.5], [ 0.0, -1.0,  0.0], [1.0, 1.0]),
    v([ 0.5, -0.5,  0.5], [ 0.0, -1.0,  0.0], [1.0, 0.0]),
    v([ 0.5, -0.5,  0.5], [ 0.0, -1.0,  0.0], [1.0, 0.0]),
    v([-0.5, -0.5,  0.5], [ 0.0, -1.0,  0.0], [0.0, 0.0]),
    v([-0.5, -0.5, -0.5], [ 0.0, -1.0,  0.0], [0.0, 1.0]),
    // Top face (+Y)
    v([-0.5,  0.5, -0.5], [ 0.0,  1.0,  0.0], [0.0, 1.0]),
    v([ 0.5,  0.5, -0.5], [ 0.0,  1.0,  0.0], [1.0, 1.0]),
    v([ 0.5,  0.5,  0.5], [ 0.0,  1.0,  0.0], [1.0, 0.0]),
    v([ 0.5,  0.5,  0.5], [ 0.0,  1.0,  0.0], [1.0, 0.0]),
    v([-0.5,  0.5,  0.5], [ 0.0,  1.0,  0.0], [0.0, 0.0]),
    v([-0.5,  0.5, -0.5], [ 0.0,  1.0,  0.0], [0.0, 1.0]),
];

/// Half edge length of the cube, for CPU-side intersection tests
pub const CUBE_HALF_EXTENT: f32 = 0.5;

/// GPU vertex buffer holding the cube, uploaded once
pub struct CubeMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

impl CubeMesh {
    pub fn new(device: &wgpu::Device) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Vertex Buffer"),
            contents: bytemuck::cast_slice(&CUBE_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            vertex_buffer,
            vertex_count: CUBE_VERTEX_COUNT,
        }
    }
}

/// Binds the cube's vertex buffer and issues its draw
pub trait DrawCube {
    fn draw_cube(&mut self, mesh: &CubeMesh);
}

impl DrawCube for wgpu::RenderPass<'_> {
    fn draw_cube(&mut self, mesh: &CubeMesh) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.draw(0..mesh.vertex_count, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3};

    #[test]
    fn test_cube_has_twelve_triangles() {
        assert_eq!(CUBE_VERTICES.len(), 36);
        assert_eq!(CUBE_VERTICES.len() / 3, 12);
    }

    #[test]
    fn test_normals_are_unit_and_face_outward() {
        for vertex in CUBE_VERTICES.iter() {
            let normal = Vector3::from(vertex.normal);
            let position = Vector3::from(vertex.position);
            assert!((normal.magnitude() - 1.0).abs() < 1e-6);
            // every vertex sits on the face plane its normal points out of
            assert!((position.dot(normal) - CUBE_HALF_EXTENT).abs() < 1e-6);
        }
    }

    #[test]
    fn test_texture_coordinates_cover_unit_square() {
        for vertex in CUBE_VERTICES.iter() {
            for c in vertex.tex_coords {
                assert!(c == 0.0 || c == 1.0);
            }
        }
    }
}
