//! Decoded texture images with a white fallback
//!
//! Decoding happens on the CPU before anything touches the GPU, so missing or
//! broken image files can be handled (and tested) without a device.

use std::path::Path;

use image::{imageops::FilterType, RgbaImage};

use crate::error::SceneError;

/// RGBA8 pixels for every mip level, largest first
#[derive(Debug, Clone)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub mip_levels: Vec<RgbaImage>,
}

impl TextureImage {
    /// A single opaque white texel
    pub fn white() -> Self {
        let pixel = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        Self {
            width: 1,
            height: 1,
            mip_levels: vec![pixel],
        }
    }

    /// Decodes the file at `path`, any channel layout converted to RGBA8
    pub fn open(path: &Path) -> Result<Self, SceneError> {
        let decoded = image::open(path).map_err(|source| SceneError::TextureDecode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_rgba(decoded.to_rgba8()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, image::ImageError> {
        Ok(Self::from_rgba(image::load_from_memory(bytes)?.to_rgba8()))
    }

    /// Loads `path`, silently substituting [`TextureImage::white`] on failure
    pub fn open_or_white(path: &Path) -> Self {
        Self::open(path).unwrap_or_else(|err| {
            log::debug!("{}; using white texture", err);
            Self::white()
        })
    }

    pub fn from_rgba(base: RgbaImage) -> Self {
        let (width, height) = base.dimensions();
        let mut mip_levels = vec![base];

        let (mut w, mut h) = (width, height);
        while w > 1 || h > 1 {
            w = (w / 2).max(1);
            h = (h / 2).max(1);
            let previous = &mip_levels[mip_levels.len() - 1];
            let level = image::imageops::resize(previous, w, h, FilterType::Triangle);
            mip_levels.push(level);
        }

        Self {
            width,
            height,
            mip_levels,
        }
    }

    /// Downscales so neither side exceeds `max_dimension`, keeping the aspect
    /// ratio and rebuilding the mip chain. Images that fit are returned as is.
    pub fn fit_within(self, max_dimension: u32) -> Self {
        let longest = self.width.max(self.height);
        if longest <= max_dimension {
            return self;
        }

        let scale = |side: u32| ((side as u64 * max_dimension as u64) / longest as u64).max(1) as u32;
        let (width, height) = (scale(self.width), scale(self.height));
        log::warn!(
            "texture is {}x{}, larger than the device limit of {}; downscaling to {}x{}",
            self.width,
            self.height,
            max_dimension,
            width,
            height
        );

        let base = image::imageops::resize(&self.mip_levels[0], width, height, FilterType::Triangle);
        Self::from_rgba(base)
    }

    pub fn mip_level_count(&self) -> u32 {
        self.mip_levels.len() as u32
    }

    pub fn is_flat_white(&self) -> bool {
        self.mip_levels
            .iter()
            .all(|level| level.pixels().all(|p| p.0 == [255, 255, 255, 255]))
    }
}
