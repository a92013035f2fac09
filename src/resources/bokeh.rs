use serde::{Deserialize, Serialize};

use crate::errors::{BokehError, Result};
use crate::resources::uniforms::BokehUniforms;

/// Depth-of-field parameters.
///
/// Distances are camera-space distances in world units. `maxblur` is a
/// radius in normalized screen units (fraction of the output width).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BokehSettings {
    /// Distance of the focal plane from the camera.
    pub focus: f32,
    /// Blur growth per unit of defocus.
    pub aperture: f32,
    /// Upper bound of the blur radius.
    pub maxblur: f32,
}

impl Default for BokehSettings {
    fn default() -> Self {
        Self {
            focus: 1.0,
            aperture: 0.015,
            maxblur: 0.008,
        }
    }
}

impl BokehSettings {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("focus", self.focus),
            ("aperture", self.aperture),
            ("maxblur", self.maxblur),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(BokehError::InvalidBokehParams(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Blur radius for a pixel at `distance` from the camera.
    ///
    /// Zero on the focal plane, non-decreasing in `|distance - focus|`,
    /// clamped at `maxblur`. `bokeh.wgsl` evaluates the same expression.
    #[must_use]
    pub fn blur_radius(&self, distance: f32) -> f32 {
        ((distance - self.focus).abs() * self.aperture).min(self.maxblur)
    }

    /// Packs the settings for the blur pass.
    #[must_use]
    pub fn to_uniforms(&self, aspect: f32, near: f32, far: f32) -> BokehUniforms {
        BokehUniforms {
            focus: self.focus,
            aperture: self.aperture,
            max_blur: self.maxblur,
            aspect,
            near,
            far,
            ..Default::default()
        }
    }
}
