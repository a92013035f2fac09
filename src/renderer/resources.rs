//! GPU Resource Manager
//!
//! Mirrors CPU scene data on the GPU. Called once per frame before any pass
//! runs, so every pass of a frame reads the same uploaded state.

use slotmap::SecondaryMap;
use wgpu::util::DeviceExt;

use crate::errors::{BokehError, Result};
use crate::renderer::context::WgpuContext;
use crate::renderer::gpu_mesh::GpuTerrainMesh;
use crate::renderer::gpu_texture::GpuStripeTexture;
use crate::renderer::terrain_programs::TerrainPrograms;
use crate::resources::TextureHandle;
use crate::resources::material::Material;
use crate::resources::uniforms::{FrameUniforms, TerrainMaterialUniforms};
use crate::scene::{MeshKey, Scene};

pub struct GpuResources {
    frame_buffer: wgpu::Buffer,
    pub frame_bind_group: wgpu::BindGroup,
    textures: SecondaryMap<TextureHandle, GpuStripeTexture>,
    meshes: SecondaryMap<MeshKey, GpuTerrainMesh>,
}

impl GpuResources {
    #[must_use]
    pub fn new(device: &wgpu::Device, programs: &TerrainPrograms) -> Self {
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniforms"),
            contents: bytemuck::bytes_of(&FrameUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame BindGroup"),
            layout: &programs.frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        Self {
            frame_buffer,
            frame_bind_group,
            textures: SecondaryMap::new(),
            meshes: SecondaryMap::new(),
        }
    }

    /// Uploads everything the passes of this frame will read.
    pub fn prepare(&mut self, ctx: &WgpuContext, programs: &TerrainPrograms, scene: &Scene) -> Result<()> {
        let device = &ctx.device;
        let queue = &ctx.queue;

        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&scene.camera.frame_uniforms()));

        for (handle, texture) in scene.textures() {
            match self.textures.get_mut(handle) {
                Some(gpu) => {
                    gpu.sync(device, queue, texture);
                }
                None => {
                    self.textures.insert(handle, GpuStripeTexture::new(device, queue, texture));
                }
            }
        }
        self.textures.retain(|handle, _| scene.texture(handle).is_some());

        for (key, mesh) in scene.meshes() {
            let handle = mesh.uniforms().stripe_texture();
            let texture = self
                .textures
                .get(handle)
                .ok_or_else(|| BokehError::TextureNotFound(format!("{handle:?} of mesh '{}'", mesh.name)))?;

            let material = match scene.material(mesh.material) {
                Some(Material::Terrain(m)) => TerrainMaterialUniforms {
                    base_color: m.base_color,
                },
                _ => {
                    return Err(BokehError::MaterialNotFound(format!(
                        "visual material of mesh '{}'",
                        mesh.name
                    )));
                }
            };

            match self.meshes.get_mut(key) {
                Some(gpu) => gpu.sync(device, queue, programs, mesh, &material, texture),
                None => {
                    let mut gpu = GpuTerrainMesh::new(device, programs, mesh, texture);
                    gpu.sync(device, queue, programs, mesh, &material, texture);
                    self.meshes.insert(key, gpu);
                }
            }
        }
        self.meshes.retain(|key, _| scene.mesh(key).is_some());

        Ok(())
    }

    #[must_use]
    pub fn mesh(&self, key: MeshKey) -> Option<&GpuTerrainMesh> {
        self.meshes.get(key)
    }

    #[must_use]
    pub fn texture(&self, handle: TextureHandle) -> Option<&GpuStripeTexture> {
        self.textures.get(handle)
    }
}
