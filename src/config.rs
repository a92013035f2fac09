//! Configuration
//!
//! All construction-time tunables in one serde struct. Every field has a
//! default, so a JSON override file only needs the values it changes:
//!
//! ```json
//! {
//!   "terrain": { "elevation": 1.5, "variant": "additive" },
//!   "bokeh": { "maxblur": 0.01 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::renderer::settings::RendererConfig;
use crate::resources::bokeh::BokehSettings;
use crate::resources::stripe_texture::StripeTextureSettings;
use crate::scene::camera::CameraSettings;
use crate::scene::mesh::TerrainSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub texture: StripeTextureSettings,
    pub terrain: TerrainSettings,
    pub bokeh: BokehSettings,
    pub camera: CameraSettings,
    /// Background color, sRGB.
    pub clear_color: [u8; 3],
    pub renderer: RendererConfig,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            texture: StripeTextureSettings::default(),
            terrain: TerrainSettings::default(),
            bokeh: BokehSettings::default(),
            camera: CameraSettings::default(),
            clear_color: [0x11, 0x11, 0x11],
            renderer: RendererConfig::default(),
        }
    }
}

impl TerrainConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loading config from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    /// Checks every parameter domain. Nothing is clamped.
    pub fn validate(&self) -> Result<()> {
        self.texture.validate()?;
        self.terrain.validate()?;
        self.bokeh.validate()?;
        self.camera.validate()?;
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
