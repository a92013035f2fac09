//! Core resource definitions
//!
//! Pure CPU-side data, independent of any GPU implementation:
//! - Stripe texture: the procedural raster driving the terrain
//! - Uniforms: uniform blocks and the shared terrain uniform set
//! - Geometry: terrain vertices and indices
//! - Material: visual and depth program state
//! - Bokeh: depth-of-field parameters

pub mod bokeh;
pub mod geometry;
pub mod material;
pub mod primitives;
pub mod stripe_texture;
pub mod uniforms;
pub mod version_tracker;

use slotmap::new_key_type;

new_key_type! {
    pub struct TextureHandle;
    pub struct MaterialHandle;
}

pub use bokeh::BokehSettings;
pub use geometry::{Geometry, TerrainVertex};
pub use material::{
    Blending, Material, Side, TerrainDepthMaterial, TerrainMaterial, TerrainVariant,
};
pub use stripe_texture::{RasterBuffer, StripeLayout, StripeTexture, StripeTextureSettings};
pub use uniforms::{TerrainUniformSet, UniformName, UniformValue, WgslStruct, WgslType};
pub use version_tracker::ChangeTracker;
