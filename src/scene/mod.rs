//! Scene module
//!
//! - Scene: container for meshes, materials, textures and the camera
//! - TerrainMesh: the displaced grid and its shared uniform set
//! - Transform: position, rotation, scale
//! - PerspectiveCamera
//! - Viewport: logical size and clamped pixel ratio

pub mod camera;
pub mod mesh;
pub mod scene;
pub mod transform;
pub mod viewport;

pub use camera::{CameraSettings, PerspectiveCamera};
pub use mesh::{TerrainMesh, TerrainSettings};
pub use scene::Scene;
pub use transform::Transform;
pub use viewport::{MAX_PIXEL_RATIO, Viewport};

use slotmap::new_key_type;

new_key_type! {
    pub struct MeshKey;
}
