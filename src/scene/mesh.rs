use std::sync::Arc;

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::errors::{BokehError, Result};
use crate::resources::geometry::Geometry;
use crate::resources::material::TerrainVariant;
use crate::resources::primitives::{MAX_PLANE_SEGMENTS, PlaneOptions, create_plane};
use crate::resources::uniforms::{TerrainUniformSet, UniformName, UniformValue};
use crate::resources::{MaterialHandle, TextureHandle};
use crate::scene::transform::Transform;

/// Terrain tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    pub elevation: f32,
    pub texture_frequency: f32,
    /// Edge length of the unscaled plane.
    pub size: f32,
    /// Subdivisions per side.
    pub segments: u32,
    /// Uniform scale applied through the mesh transform.
    pub scale: f32,
    pub variant: TerrainVariant,
    /// Color under the stripes, sRGB.
    pub base_color: [u8; 3],
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            elevation: 2.0,
            texture_frequency: 10.0,
            size: 1.0,
            segments: 1000,
            scale: 10.0,
            variant: TerrainVariant::DepthSynchronized,
            base_color: [0x11, 0x11, 0x11],
        }
    }
}

impl TerrainSettings {
    pub fn validate(&self) -> Result<()> {
        let finite = |name: &str, v: f32| {
            if v.is_finite() {
                Ok(())
            } else {
                Err(BokehError::InvalidTerrainParams(format!("{name} must be finite, got {v}")))
            }
        };
        finite("elevation", self.elevation)?;
        finite("texture_frequency", self.texture_frequency)?;
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(BokehError::InvalidTerrainParams(format!(
                "size must be positive, got {}",
                self.size
            )));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(BokehError::InvalidTerrainParams(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        if self.segments == 0 || self.segments > MAX_PLANE_SEGMENTS {
            return Err(BokehError::InvalidTerrainParams(format!(
                "segments must lie in 1..={MAX_PLANE_SEGMENTS}, got {}",
                self.segments
            )));
        }
        Ok(())
    }

    /// Horizontal grid geometry for these settings.
    pub fn build_geometry(&self) -> Result<Geometry> {
        create_plane(PlaneOptions {
            width: self.size,
            height: self.size,
            width_segments: self.segments,
            height_segments: self.segments,
        })
    }

    /// Base color in linear space.
    #[must_use]
    pub fn base_color_linear(&self) -> Vec4 {
        crate::utils::color::srgb_u8_to_linear(self.base_color).extend(1.0)
    }
}

/// The terrain mesh: geometry, visual material, transform and the uniform
/// set shared by its visual and depth programs.
///
/// The depth material is not referenced from here; the scene keeps that
/// association in a side table.
#[derive(Debug, Clone)]
pub struct TerrainMesh {
    pub name: String,
    pub geometry: Arc<Geometry>,
    pub material: MaterialHandle,
    pub transform: Transform,
    pub visible: bool,

    uniforms: TerrainUniformSet,
}

impl TerrainMesh {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        geometry: Arc<Geometry>,
        material: MaterialHandle,
        stripe_texture: TextureHandle,
        settings: &TerrainSettings,
    ) -> Self {
        let mut transform = Transform::new();
        transform.set_uniform_scale(settings.scale);
        Self {
            name: name.into(),
            geometry,
            material,
            transform,
            visible: true,
            uniforms: TerrainUniformSet::new(
                stripe_texture,
                settings.elevation,
                settings.texture_frequency,
            ),
        }
    }

    /// Writes one entry of the shared uniform set. Both programs observe it
    /// on the next render call.
    pub fn set_uniform(&mut self, value: UniformValue) {
        self.uniforms.set(value);
    }

    #[must_use]
    pub fn uniform(&self, name: UniformName) -> UniformValue {
        self.uniforms.get(name)
    }

    #[inline]
    #[must_use]
    pub fn uniforms(&self) -> &TerrainUniformSet {
        &self.uniforms
    }

    /// Current uniform scale (x component).
    #[inline]
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.transform.scale.x
    }

    #[inline]
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }
}
