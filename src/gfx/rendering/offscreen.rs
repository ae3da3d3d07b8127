//! Headless rendering into a texture with CPU readback
//!
//! Same passes as the window path, but the color target is an
//! `Rgba8Unorm` texture that gets copied into a mappable buffer after the frame.

use std::sync::Arc;

use image::RgbaImage;

use crate::{
    config::SceneConfig,
    error::SceneError,
    gfx::{
        frame::{FrameState, FrameTransforms},
        resources::texture_resource::DepthTexture,
    },
};

use super::{render_engine::request_device, scene_renderer::SceneRenderer};

pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Bytes per row of a texture-to-buffer copy, padded to
/// `COPY_BYTES_PER_ROW_ALIGNMENT`
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

pub struct OffscreenRenderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    width: u32,
    height: u32,
    color_texture: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_texture: DepthTexture,
    readback_buffer: wgpu::Buffer,
    config: SceneConfig,
    scene: SceneRenderer,
}

impl OffscreenRenderer {
    /// Creates a renderer on any available adapter, window-sized per `config`
    pub async fn new(config: &SceneConfig) -> Result<Self, SceneError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(SceneError::init)?;

        let (device, queue) = request_device(&adapter).await?;
        let (width, height) = (config.window.width, config.window.height);

        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Color Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_texture =
            DepthTexture::create_depth_texture(&device, width, height, "Offscreen Depth");

        let readback_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Offscreen Readback Buffer"),
            size: (padded_bytes_per_row(width) * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let scene =
            SceneRenderer::new(device.clone(), queue.clone(), OFFSCREEN_FORMAT, config).await;

        Ok(Self {
            device,
            queue,
            width,
            height,
            color_texture,
            color_view,
            depth_texture,
            readback_buffer,
            config: config.clone(),
            scene,
        })
    }

    pub fn scene(&self) -> &SceneRenderer {
        &self.scene
    }

    /// Renders `frame` and returns the color target as tightly packed RGBA8
    pub fn render(&self, frame: &FrameState) -> Result<RgbaImage, SceneError> {
        let transforms = FrameTransforms::compute(frame, &self.config);
        self.scene.update(frame, &transforms);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Offscreen Encoder"),
            });
        self.scene
            .encode(&mut encoder, &self.color_view, &self.depth_texture.view);

        let padded_row = padded_bytes_per_row(self.width);
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = self.readback_buffer.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        let _ = self.device.poll(wgpu::PollType::Wait);

        match futures::executor::block_on(rx) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(SceneError::Readback(e.to_string())),
            Err(_) => return Err(SceneError::Readback("map callback dropped".to_string())),
        }

        let row_bytes = (self.width * 4) as usize;
        let mut pixels = Vec::with_capacity(row_bytes * self.height as usize);
        {
            let mapped = slice.get_mapped_range();
            for row in mapped.chunks(padded_row as usize) {
                pixels.extend_from_slice(&row[..row_bytes]);
            }
        }
        self.readback_buffer.unmap();

        RgbaImage::from_raw(self.width, self.height, pixels)
            .ok_or_else(|| SceneError::Readback("pixel buffer size mismatch".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::rendering::reference::AMBIENT;

    fn test_config() -> SceneConfig {
        SceneConfig::default().with_asset_dir(std::env::temp_dir().join("block-scene-no-assets"))
    }

    fn renderer() -> Option<OffscreenRenderer> {
        match pollster::block_on(OffscreenRenderer::new(&test_config())) {
            Ok(renderer) => Some(renderer),
            Err(e) => {
                eprintln!("skipping GPU test: {}", e);
                None
            }
        }
    }

    #[test]
    fn test_row_padding() {
        assert_eq!(padded_bytes_per_row(800), 3328);
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(1), 256);
    }

    #[test]
    fn test_shaders_build_on_available_adapter() {
        let Some(renderer) = renderer() else { return };
        assert!(renderer.scene().is_complete());
    }

    fn luma(pixel: [u8; 4]) -> f32 {
        (0.2126 * pixel[0] as f32 + 0.7152 * pixel[1] as f32 + 0.0722 * pixel[2] as f32) / 255.0
    }

    #[test]
    fn test_start_frame_top_face_is_lit() {
        let Some(renderer) = renderer() else { return };
        let frame = FrameState::new(&test_config());

        let image = renderer.render(&frame).unwrap();
        assert_eq!(image.dimensions(), (800, 600));

        // no texture files in the asset directory, so the texture is white.
        // 20 px above the center corner is the top face, lit by both lights;
        // strict comparison acne shadows some texels, not a whole window
        let (cx, cy) = (400, 280);
        let brightest = (cx - 4..=cx + 4)
            .flat_map(|x| (cy - 4..=cy + 4).map(move |y| (x, y)))
            .map(|(x, y)| luma(image.get_pixel(x, y).0))
            .fold(0.0f32, f32::max);
        assert!(brightest > AMBIENT + 0.05, "top face luminance {}", brightest);

        // corners show the clear color
        let corner = image.get_pixel(0, 0).0;
        assert!((corner[0] as i32 - 26).abs() <= 1, "corner {:?}", corner);
    }
}
