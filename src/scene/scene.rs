use std::sync::Arc;

use slotmap::{SecondaryMap, SlotMap};

use crate::config::TerrainConfig;
use crate::errors::{BokehError, Result};
use crate::resources::material::{Material, TerrainDepthMaterial, TerrainMaterial, TerrainVariant};
use crate::resources::stripe_texture::StripeTexture;
use crate::resources::uniforms::UniformValue;
use crate::resources::{MaterialHandle, TextureHandle};
use crate::scene::MeshKey;
use crate::scene::camera::PerspectiveCamera;
use crate::scene::mesh::TerrainMesh;
use crate::utils::color::clear_color_from_srgb;

/// Scene container.
///
/// Owns meshes, materials, stripe textures and the camera. The association
/// from a mesh to its depth material lives in a secondary map: it is a
/// lookup used by the depth pass only and owns nothing. Removing a mesh
/// drops its entry; removing the association never touches either side.
pub struct Scene {
    meshes: SlotMap<MeshKey, TerrainMesh>,
    materials: SlotMap<MaterialHandle, Material>,
    textures: SlotMap<TextureHandle, StripeTexture>,
    depth_materials: SecondaryMap<MeshKey, MaterialHandle>,

    pub camera: PerspectiveCamera,
    /// Linear clear color of the scene pass.
    pub clear_color: wgpu::Color,
}

impl Scene {
    #[must_use]
    pub fn new(camera: PerspectiveCamera) -> Self {
        Self {
            meshes: SlotMap::with_key(),
            materials: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            depth_materials: SecondaryMap::new(),
            camera,
            clear_color: wgpu::Color::BLACK,
        }
    }

    /// Builds the terrain scene described by `config`.
    ///
    /// With [`TerrainVariant::DepthSynchronized`] the terrain gets a depth
    /// material association. With [`TerrainVariant::Additive`] it gets none
    /// and the depth pass falls back to undisplaced depth.
    pub fn from_config(config: &TerrainConfig, aspect: f32) -> Result<(Self, MeshKey)> {
        config.validate()?;

        let camera = PerspectiveCamera::from_settings(&config.camera, aspect);
        let mut scene = Self::new(camera);
        scene.clear_color = clear_color_from_srgb(config.clear_color);

        let texture = scene.add_texture(StripeTexture::new(config.texture.clone())?);

        let terrain = &config.terrain;
        let material = scene.add_material(
            TerrainMaterial::for_variant(terrain.variant, terrain.base_color_linear()).into(),
        );
        let geometry = Arc::new(terrain.build_geometry()?);
        let mesh = scene.add_mesh(TerrainMesh::new("terrain", geometry, material, texture, terrain));

        match terrain.variant {
            TerrainVariant::DepthSynchronized => {
                let depth = scene.add_material(TerrainDepthMaterial::default().into());
                scene.set_depth_material(mesh, depth)?;
            }
            TerrainVariant::Additive => {
                log::warn!(
                    "Terrain uses the additive variant: no depth material is attached, \
                     blur follows undisplaced depth"
                );
            }
        }

        log::info!(
            "Terrain scene built: {} segments, scale {}, variant {:?}",
            terrain.segments,
            terrain.scale,
            terrain.variant
        );
        Ok((scene, mesh))
    }

    pub fn add_texture(&mut self, texture: StripeTexture) -> TextureHandle {
        self.textures.insert(texture)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        self.materials.insert(material)
    }

    pub fn add_mesh(&mut self, mesh: TerrainMesh) -> MeshKey {
        self.meshes.insert(mesh)
    }

    /// Removes a mesh together with its depth association. Materials stay.
    pub fn remove_mesh(&mut self, key: MeshKey) -> Option<TerrainMesh> {
        self.depth_materials.remove(key);
        self.meshes.remove(key)
    }

    /// Associates `mesh` with a depth material.
    pub fn set_depth_material(&mut self, mesh: MeshKey, material: MaterialHandle) -> Result<()> {
        if !self.meshes.contains_key(mesh) {
            return Err(BokehError::MeshNotFound(format!("{mesh:?}")));
        }
        match self.materials.get(material) {
            Some(Material::TerrainDepth(_)) => {
                self.depth_materials.insert(mesh, material);
                Ok(())
            }
            Some(Material::Terrain(_)) => Err(BokehError::MaterialNotFound(format!(
                "{material:?} is not a depth material"
            ))),
            None => Err(BokehError::MaterialNotFound(format!("{material:?}"))),
        }
    }

    pub fn clear_depth_material(&mut self, mesh: MeshKey) -> Option<MaterialHandle> {
        self.depth_materials.remove(mesh)
    }

    /// The depth material the depth pass substitutes for `mesh`, if any.
    #[must_use]
    pub fn depth_material_for(&self, mesh: MeshKey) -> Option<MaterialHandle> {
        self.depth_materials.get(mesh).copied()
    }

    #[must_use]
    pub fn mesh(&self, key: MeshKey) -> Option<&TerrainMesh> {
        self.meshes.get(key)
    }

    pub fn mesh_mut(&mut self, key: MeshKey) -> Option<&mut TerrainMesh> {
        self.meshes.get_mut(key)
    }

    pub fn meshes(&self) -> impl Iterator<Item = (MeshKey, &TerrainMesh)> {
        self.meshes.iter()
    }

    #[must_use]
    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle)
    }

    #[must_use]
    pub fn texture(&self, handle: TextureHandle) -> Option<&StripeTexture> {
        self.textures.get(handle)
    }

    pub fn texture_mut(&mut self, handle: TextureHandle) -> Option<&mut StripeTexture> {
        self.textures.get_mut(handle)
    }

    pub fn textures(&self) -> impl Iterator<Item = (TextureHandle, &StripeTexture)> {
        self.textures.iter()
    }

    /// Writes elapsed seconds into the `time` uniform of every mesh.
    pub fn set_time(&mut self, elapsed: f32) {
        for mesh in self.meshes.values_mut() {
            mesh.set_uniform(UniformValue::Time(elapsed));
        }
    }

    /// Refreshes cached matrices before rendering.
    pub fn update(&mut self) {
        for mesh in self.meshes.values_mut() {
            mesh.transform.update_matrix();
        }
        self.camera.update_matrices();
    }
}
