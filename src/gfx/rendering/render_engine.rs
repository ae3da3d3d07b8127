//! WGPU-based rendering engine for the block scene
//!
//! Owns the window surface and its depth buffer and hands both to the
//! [`SceneRenderer`] every frame.

use std::sync::Arc;

use winit::dpi::PhysicalSize;

use crate::{
    config::SceneConfig,
    error::SceneError,
    gfx::{
        frame::{FrameState, FrameTransforms},
        resources::texture_resource::DepthTexture,
    },
};

use super::scene_renderer::SceneRenderer;

/// Downlevel limits, raised to the adapter's texture size limit so full-size
/// images upload
pub fn required_limits(adapter_limits: &wgpu::Limits) -> wgpu::Limits {
    wgpu::Limits {
        max_texture_dimension_2d: adapter_limits.max_texture_dimension_2d,
        ..wgpu::Limits::downlevel_defaults()
    }
}

/// Surface extent for a window's physical inner size, at least 1x1
pub fn surface_size(inner_size: PhysicalSize<u32>) -> (u32, u32) {
    (inner_size.width.max(1), inner_size.height.max(1))
}

/// Requests a device and queue from `adapter` and routes uncaptured validation
/// errors to the log instead of panicking
pub async fn request_device(
    adapter: &wgpu::Adapter,
) -> Result<(Arc<wgpu::Device>, Arc<wgpu::Queue>), SceneError> {
    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("WGPU Device"),
            required_features: wgpu::Features::default(),
            required_limits: required_limits(&adapter.limits()),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::Off,
        })
        .await
        .map_err(SceneError::init)?;

    device.on_uncaptured_error(Box::new(|error| {
        log::error!("wgpu: {}", error);
    }));

    Ok((Arc::new(device), Arc::new(queue)))
}

/// Core rendering engine managing the surface and per-frame submission
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: DepthTexture,
    scene: SceneRenderer,
}

impl RenderEngine {
    /// Creates a render engine drawing into `window`, whose surface is
    /// `width` x `height` physical pixels
    ///
    /// Fails when no surface, adapter or device can be created. Shader
    /// problems are not failures here; see [`SceneRenderer::new`].
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        scene_config: &SceneConfig,
    ) -> Result<RenderEngine, SceneError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(SceneError::init)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(SceneError::init)?;
        log::info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = request_device(&adapter).await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| SceneError::init("surface reports no texture formats"))?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: if scene_config.window.vsync {
                wgpu::PresentMode::Fifo
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = DepthTexture::create_depth_texture(
            &device,
            config.width,
            config.height,
            "depth_texture",
        );

        let scene = SceneRenderer::new(device.clone(), queue.clone(), format, scene_config).await;

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            scene,
        })
    }

    /// Uploads this frame's uniforms
    pub fn update(&self, frame: &FrameState, transforms: &FrameTransforms) {
        self.scene.update(frame, transforms);
    }

    /// Renders and presents one frame
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped, as is
    /// a timed-out acquire. Anything else is returned.
    pub fn render_frame(&mut self) -> Result<(), SceneError> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring the next frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.scene
            .encode(&mut encoder, &surface_texture_view, &self.depth_texture.view);

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::LogicalSize;

    #[test]
    fn test_surface_uses_physical_pixels() {
        let physical = LogicalSize::new(800u32, 600u32).to_physical::<u32>(2.0);
        assert_eq!(surface_size(physical), (1600, 1200));
        assert_eq!(surface_size(PhysicalSize::new(800, 600)), (800, 600));
    }

    #[test]
    fn test_minimized_window_keeps_a_valid_surface() {
        assert_eq!(surface_size(PhysicalSize::new(0, 0)), (1, 1));
    }

    #[test]
    fn test_texture_limit_follows_adapter() {
        let adapter = wgpu::Limits {
            max_texture_dimension_2d: 16384,
            ..wgpu::Limits::default()
        };
        let limits = required_limits(&adapter);
        assert_eq!(limits.max_texture_dimension_2d, 16384);
        assert_eq!(
            limits.max_bind_groups,
            wgpu::Limits::downlevel_defaults().max_bind_groups
        );
    }
}
