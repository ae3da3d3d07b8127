//! Scene configuration
//!
//! Every constant the scene needs lives here with its default value. There are
//! no command line flags; `from_env` only lets the asset directory be moved.

use std::path::{Path, PathBuf};

/// Environment variable naming the directory that holds the texture files
pub const ASSETS_ENV: &str = "BLOCK_SCENE_ASSETS";

/// Window properties. The window is fixed-size and not resizable.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// FIFO presentation, so the frame loop blocks on the swap
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Block Scene".to_string(),
            vsync: true,
        }
    }
}

/// Shadow map and light-space projection parameters
#[derive(Debug, Clone, Copy)]
pub struct ShadowConfig {
    pub map_size: u32,
    /// Orthographic half extent of the light frustum on x and y
    pub ortho_extent: f32,
    pub near: f32,
    pub far: f32,
    /// Depth difference still counted as unoccluded. Zero gives the strict
    /// `sample < depth` test.
    pub tolerance: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 1024,
            ortho_extent: 10.0,
            near: 1.0,
            far: 7.5,
            tolerance: 0.0,
        }
    }
}

/// Texture files read at startup
#[derive(Debug, Clone)]
pub struct AssetConfig {
    pub directory: PathBuf,
    pub block_texture: String,
    /// Loaded but never bound
    pub floor_texture: String,
}

impl AssetConfig {
    pub fn block_path(&self) -> PathBuf {
        self.directory.join(&self.block_texture)
    }

    pub fn floor_path(&self) -> PathBuf {
        self.directory.join(&self.floor_texture)
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::new(),
            block_texture: "block.jpg".to_string(),
            floor_texture: "floor.jpg".to_string(),
        }
    }
}

/// Top-level configuration for the scene
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub shadow: ShadowConfig,
    pub assets: AssetConfig,
    /// World units per frame; rotations use a third of it in radians
    pub camera_speed: f32,
    pub clear_color: wgpu::Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            shadow: ShadowConfig::default(),
            assets: AssetConfig::default(),
            camera_speed: 0.03,
            clear_color: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.1,
                a: 1.0,
            },
        }
    }
}

impl SceneConfig {
    /// Default configuration with the asset directory taken from
    /// `BLOCK_SCENE_ASSETS` when it is set
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var_os(ASSETS_ENV) {
            Some(dir) => config.with_asset_dir(dir),
            None => config,
        }
    }

    pub fn with_asset_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.assets.directory = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_shadow_tolerance(mut self, tolerance: f32) -> Self {
        self.shadow.tolerance = tolerance;
        self
    }

    pub fn aspect(&self) -> f32 {
        self.window.width as f32 / self.window.height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_scene() {
        let config = SceneConfig::default();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.shadow.map_size, 1024);
        assert_eq!(config.shadow.tolerance, 0.0);
        assert_eq!(config.window.title, "Block Scene");
        assert_eq!(config.camera_speed, 0.03);
        assert_eq!(config.assets.block_path(), PathBuf::from("block.jpg"));
        assert_eq!(config.assets.floor_path(), PathBuf::from("floor.jpg"));
    }

    #[test]
    fn test_asset_dir_prefixes_both_textures() {
        let config = SceneConfig::default().with_asset_dir("assets");
        assert_eq!(config.assets.block_path(), Path::new("assets").join("block.jpg"));
        assert_eq!(config.assets.floor_path(), Path::new("assets").join("floor.jpg"));
    }
}
