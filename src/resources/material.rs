//! Terrain materials.
//!
//! Materials here only carry fixed-function state and constants. The
//! displacement uniforms live in the mesh's [`TerrainUniformSet`], which both
//! programs read by reference.
//!
//! [`TerrainUniformSet`]: crate::resources::uniforms::TerrainUniformSet

use glam::Vec4;
use serde::{Deserialize, Serialize};

/// Which of the two terrain pipelines to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainVariant {
    /// Visual and depth programs share one uniform set; the compositor's
    /// depth pass renders the displaced terrain.
    #[default]
    DepthSynchronized,
    /// Additive blending and no depth association. The depth pass falls back
    /// to the generic undisplaced depth program, so blur follows the flat
    /// plane rather than the visible terrain.
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Blending {
    /// Straight alpha over the destination.
    #[default]
    Normal,
    /// `src * alpha + dst`.
    Additive,
}

impl Blending {
    #[must_use]
    pub fn blend_state(self) -> wgpu::BlendState {
        match self {
            Self::Normal => wgpu::BlendState::ALPHA_BLENDING,
            Self::Additive => wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::Zero,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    Front,
    Back,
    #[default]
    Double,
}

impl Side {
    #[must_use]
    pub fn cull_mode(self) -> Option<wgpu::Face> {
        match self {
            Self::Front => Some(wgpu::Face::Back),
            Self::Back => Some(wgpu::Face::Front),
            Self::Double => None,
        }
    }
}

/// Visual program state.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainMaterial {
    pub blending: Blending,
    pub side: Side,
    pub transparent: bool,
    /// Color under the stripes, linear RGBA.
    pub base_color: Vec4,
}

impl TerrainMaterial {
    /// Material matching the given pipeline variant.
    #[must_use]
    pub fn for_variant(variant: TerrainVariant, base_color: Vec4) -> Self {
        match variant {
            TerrainVariant::DepthSynchronized => Self {
                blending: Blending::Normal,
                side: Side::Double,
                transparent: false,
                base_color,
            },
            TerrainVariant::Additive => Self {
                blending: Blending::Additive,
                side: Side::Double,
                transparent: true,
                base_color,
            },
        }
    }

    /// Transparent surfaces test against depth but never write it.
    #[must_use]
    pub fn depth_write(&self) -> bool {
        !self.transparent
    }
}

/// Depth program state.
///
/// Has no blending state: packed depth always overwrites the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerrainDepthMaterial {
    pub side: Side,
}

/// A registered material.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Terrain(TerrainMaterial),
    TerrainDepth(TerrainDepthMaterial),
}

impl Material {
    #[must_use]
    pub fn as_terrain(&self) -> Option<&TerrainMaterial> {
        match self {
            Self::Terrain(m) => Some(m),
            Self::TerrainDepth(_) => None,
        }
    }

    #[must_use]
    pub fn as_depth(&self) -> Option<&TerrainDepthMaterial> {
        match self {
            Self::TerrainDepth(m) => Some(m),
            Self::Terrain(_) => None,
        }
    }
}

impl From<TerrainMaterial> for Material {
    fn from(m: TerrainMaterial) -> Self {
        Self::Terrain(m)
    }
}

impl From<TerrainDepthMaterial> for Material {
    fn from(m: TerrainDepthMaterial) -> Self {
        Self::TerrainDepth(m)
    }
}
