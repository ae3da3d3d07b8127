//! The two-pass cube renderer
//!
//! Records the depth pass from light 0 into the shadow map, then the lit color
//! pass into whatever color and depth views it is handed. Owning no surface, it
//! renders to the window and to offscreen targets alike.

use std::sync::Arc;

use crate::{
    config::{SceneConfig, ShadowConfig},
    gfx::{
        frame::{FrameState, FrameTransforms},
        resources::{
            global_bindings::{GlobalBindings, GlobalUBO, SceneUniform},
            texture_image::TextureImage,
            texture_resource::{DepthTexture, TextureResource},
        },
        scene::cube::{CubeMesh, DrawCube},
    },
    wgpu_utils::{binding_types, BindGroupBuilder, BindGroupLayoutBuilder},
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

pub const DEPTH_PIPELINE: &str = "Depth";
pub const LIGHTING_PIPELINE: &str = "Lighting";

const DEPTH_SHADER: &str = include_str!("shaders/depth_pass.wgsl");
const LIGHTING_SHADER: &str = include_str!("shaders/lighting.wgsl");

pub struct SceneRenderer {
    queue: Arc<wgpu::Queue>,
    pipeline_manager: PipelineManager,
    cube: CubeMesh,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,

    shadow_map: DepthTexture,
    shadow_bind_group: wgpu::BindGroup,

    _block_texture: TextureResource,
    texture_bind_group: wgpu::BindGroup,
    // loaded at startup, never drawn
    _floor_texture: TextureResource,

    shadow: ShadowConfig,
    clear_color: wgpu::Color,
}

impl SceneRenderer {
    /// Uploads the cube and textures and builds both pipelines
    ///
    /// Shader failures are logged and leave the affected pipeline out; the
    /// matching pass then records nothing.
    pub async fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        color_format: wgpu::TextureFormat,
        config: &SceneConfig,
    ) -> Self {
        let cube = CubeMesh::new(&device);

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);

        let max_dimension = device.limits().max_texture_dimension_2d;
        let block_image =
            TextureImage::open_or_white(&config.assets.block_path()).fit_within(max_dimension);
        let floor_image =
            TextureImage::open_or_white(&config.assets.floor_path()).fit_within(max_dimension);
        let block_texture = TextureResource::from_image(&device, &queue, &block_image, "Block");
        let floor_texture = TextureResource::from_image(&device, &queue, &floor_image, "Floor");

        let texture_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(&device, "Diffuse Texture Bind Group Layout");
        let texture_bind_group = BindGroupBuilder::new(&texture_layout)
            .texture(&block_texture.view)
            .sampler(&block_texture.sampler)
            .create(&device, "Diffuse Texture Bind Group");

        let shadow_map = DepthTexture::create_shadow_map(&device, config.shadow.map_size);
        let shadow_sampler = DepthTexture::create_shadow_sampler(&device);
        let shadow_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_depth_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Comparison))
            .create(&device, "Shadow Map Bind Group Layout");
        let shadow_bind_group = BindGroupBuilder::new(&shadow_layout)
            .texture(&shadow_map.view)
            .sampler(&shadow_sampler)
            .create(&device, "Shadow Map Bind Group");

        let mut pipeline_manager = PipelineManager::new(device.clone());
        for (name, source) in [("depth_pass", DEPTH_SHADER), ("lighting", LIGHTING_SHADER)] {
            if let Err(e) = pipeline_manager.load_shader(name, source).await {
                log::error!("{}", e);
            }
        }

        pipeline_manager.register_pipeline(
            DEPTH_PIPELINE,
            PipelineConfig::default_with_shader("depth_pass")
                .with_label("Depth Pass Pipeline")
                .with_bind_group_layouts(vec![global_bindings.bind_group_layout().clone()])
                .with_vertex_only()
                .with_depth_stencil(DepthTexture::DEPTH_FORMAT),
        );
        pipeline_manager.register_pipeline(
            LIGHTING_PIPELINE,
            PipelineConfig::default_with_shader("lighting")
                .with_label("Lighting Pipeline")
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    texture_layout.layout.clone(),
                    shadow_layout.layout.clone(),
                ])
                .with_color_format(color_format)
                .with_depth_stencil(DepthTexture::DEPTH_FORMAT),
        );

        if let Err(errors) = pipeline_manager.create_all_pipelines().await {
            for e in errors {
                log::error!("{}", e);
            }
        }

        Self {
            queue,
            pipeline_manager,
            cube,
            global_ubo,
            global_bindings,
            shadow_map,
            shadow_bind_group,
            _block_texture: block_texture,
            texture_bind_group,
            _floor_texture: floor_texture,
            shadow: config.shadow,
            clear_color: config.clear_color,
        }
    }

    /// Writes this frame's matrices, eye and light positions
    pub fn update(&self, frame: &FrameState, transforms: &FrameTransforms) {
        let uniform = SceneUniform::new(frame, transforms, &self.shadow);
        self.global_ubo.update_content(&self.queue, uniform);
    }

    /// Records the depth pass followed by the color pass
    ///
    /// `depth_view` must be [`DepthTexture::DEPTH_FORMAT`] and match the size
    /// of `color_view`.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
    ) {
        // PASS 1: scene depth from light 0
        {
            let mut depth_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Depth Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(DEPTH_PIPELINE) {
                depth_pass.set_pipeline(pipeline);
                depth_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
                depth_pass.draw_cube(&self.cube);
            }
        }

        // PASS 2: lit, textured, shadowed cube
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(LIGHTING_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
                render_pass.set_bind_group(1, &self.texture_bind_group, &[]);
                render_pass.set_bind_group(2, &self.shadow_bind_group, &[]);
                render_pass.draw_cube(&self.cube);
            }
        }
    }

    /// True when both pipelines were built
    pub fn is_complete(&self) -> bool {
        self.pipeline_manager.has_pipeline(DEPTH_PIPELINE)
            && self.pipeline_manager.has_pipeline(LIGHTING_PIPELINE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_lookup_uses_comparison_sampler() {
        assert!(LIGHTING_SHADER.contains("var shadow_sampler: sampler_comparison"));
        assert!(LIGHTING_SHADER.contains("textureSampleCompare(shadow_map, shadow_sampler"));
        assert!(!LIGHTING_SHADER.contains("textureLoad"));
    }
}
