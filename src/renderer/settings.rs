//! Renderer Settings
//!
//! [`RendererSettings`] is consumed once when the GPU context is created.
//! [`RendererConfig`] is its serializable subset, loaded as part of
//! [`TerrainConfig`](crate::config::TerrainConfig).
//!
//! ```rust,ignore
//! let settings = RendererSettings {
//!     vsync: false,
//!     power_preference: wgpu::PowerPreference::LowPower,
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

/// GPU adapter selection, as written in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerMode {
    #[default]
    HighPerformance,
    LowPower,
}

impl From<PowerMode> for wgpu::PowerPreference {
    fn from(mode: PowerMode) -> Self {
        match mode {
            PowerMode::HighPerformance => wgpu::PowerPreference::HighPerformance,
            PowerMode::LowPower => wgpu::PowerPreference::LowPower,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub vsync: bool,
    pub power: PowerMode,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            vsync: true,
            power: PowerMode::HighPerformance,
        }
    }
}

/// Global configuration for GPU context creation.
///
/// | Field               | Default           |
/// |---------------------|-------------------|
/// | `vsync`             | `true`            |
/// | `power_preference`  | `HighPerformance` |
/// | `force_fallback`    | `false`           |
/// | `required_features` | empty             |
/// | `required_limits`   | downlevel WebGL2 defaults raised to the adapter |
/// | `depth_format`      | `Depth32Float`    |
#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// Cap the frame rate to the display refresh.
    pub vsync: bool,

    pub power_preference: wgpu::PowerPreference,

    /// Use the software fallback adapter (headless CI).
    pub force_fallback: bool,

    pub required_features: wgpu::Features,

    /// `None` uses the adapter's own limits.
    pub required_limits: Option<wgpu::Limits>,

    /// Format of the z-buffers of the scene and depth passes.
    pub depth_format: wgpu::TextureFormat,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            vsync: true,
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback: false,
            required_features: wgpu::Features::empty(),
            required_limits: None,
            depth_format: wgpu::TextureFormat::Depth32Float,
        }
    }
}

impl From<&RendererConfig> for RendererSettings {
    fn from(config: &RendererConfig) -> Self {
        Self {
            vsync: config.vsync,
            power_preference: config.power.into(),
            ..Default::default()
        }
    }
}
