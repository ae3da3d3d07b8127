//! Global uniform bindings for camera, light and shadow data
//!
//! One uniform buffer shared by the depth pass and the lighting pass, bound to
//! slot 0 in both pipelines. Rewritten from scratch every frame.

use crate::{
    config::ShadowConfig,
    gfx::{
        frame::{FrameState, FrameTransforms},
        lighting::LIGHT_COUNT,
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Per-frame uniform content.
/// MUST match the SceneUniform struct in both WGSL shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub light_space: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub view_position: [f32; 4],
    pub light_positions: [[f32; 4]; LIGHT_COUNT],
    /// x: shadow comparison tolerance, yzw unused
    pub shadow_params: [f32; 4],
}
// Total: 4 * 64 + 16 + 2 * 16 + 16 = 320 bytes

impl SceneUniform {
    pub fn new(frame: &FrameState, transforms: &FrameTransforms, shadow: &ShadowConfig) -> Self {
        let eye = frame.camera.position;
        let light_positions = frame.lights.positions.map(|p| [p.x, p.y, p.z, 1.0]);

        Self {
            view_proj: transforms.view_projection().into(),
            light_space: transforms.light_space.into(),
            model: transforms.model.into(),
            normal_matrix: transforms.normal_matrix.into(),
            view_position: [eye.x, eye.y, eye.z, 1.0],
            light_positions,
            shadow_params: [shadow.tolerance, 0.0, 0.0, 0.0],
        }
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<SceneUniform>;

/// Bind group layout and bind group for the scene uniform
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");

        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Global Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
