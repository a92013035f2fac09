use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::renderer::gpu_texture::GpuStripeTexture;
use crate::renderer::terrain_programs::TerrainPrograms;
use crate::resources::TextureHandle;
use crate::resources::geometry::Geometry;
use crate::resources::uniforms::{ObjectUniforms, TerrainMaterialUniforms, TerrainUniformSet};
use crate::scene::mesh::TerrainMesh;

/// GPU side of one [`TerrainMesh`].
///
/// `terrain_buffer` holds the mesh's [`TerrainUniformSet`]; `terrain_bind_group`
/// is the one group both the visual and the depth pipeline bind at group 2.
#[derive(Debug)]
pub struct GpuTerrainMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    /// Geometry the vertex and index buffers were built from.
    geometry: Arc<Geometry>,

    object_buffer: wgpu::Buffer,
    pub object_bind_group: wgpu::BindGroup,

    terrain_buffer: wgpu::Buffer,
    pub terrain_bind_group: wgpu::BindGroup,
    terrain_version: u64,
    /// Texture the bind group was built against, with its GPU generation.
    bound_texture: (TextureHandle, u64),

    material_buffer: wgpu::Buffer,
    pub material_bind_group: wgpu::BindGroup,
}

impl GpuTerrainMesh {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        programs: &TerrainPrograms,
        mesh: &TerrainMesh,
        texture: &GpuStripeTexture,
    ) -> Self {
        let (vertex_buffer, index_buffer) = create_geometry_buffers(device, &mesh.geometry);

        let object_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Object Uniforms"),
            contents: bytemuck::bytes_of(&ObjectUniforms {
                model: mesh.transform().matrix_as_mat4(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object BindGroup"),
            layout: &programs.object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: object_buffer.as_entire_binding(),
            }],
        });

        let uniforms = mesh.uniforms();
        let terrain_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Uniform Set"),
            contents: bytemuck::bytes_of(uniforms.data()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let terrain_bind_group =
            create_terrain_bind_group(device, programs, &terrain_buffer, texture);

        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Material Uniforms"),
            contents: bytemuck::bytes_of(&TerrainMaterialUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Terrain Material BindGroup"),
            layout: &programs.material_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: material_buffer.as_entire_binding(),
            }],
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.geometry.index_count(),
            geometry: Arc::clone(&mesh.geometry),
            object_buffer,
            object_bind_group,
            terrain_buffer,
            terrain_bind_group,
            terrain_version: uniforms.version(),
            bound_texture: (uniforms.stripe_texture(), texture.generation()),
            material_buffer,
            material_bind_group,
        }
    }

    /// Uploads the transform and, when its version moved, the uniform set.
    /// Rebuilds the geometry buffers when the mesh points at another
    /// geometry, and the terrain bind group when the bound texture changed.
    pub fn sync(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        programs: &TerrainPrograms,
        mesh: &TerrainMesh,
        material: &TerrainMaterialUniforms,
        texture: &GpuStripeTexture,
    ) {
        if !Arc::ptr_eq(&self.geometry, &mesh.geometry) {
            let (vertex_buffer, index_buffer) = create_geometry_buffers(device, &mesh.geometry);
            self.vertex_buffer = vertex_buffer;
            self.index_buffer = index_buffer;
            self.index_count = mesh.geometry.index_count();
            self.geometry = Arc::clone(&mesh.geometry);
            log::debug!("Rebuilt geometry buffers of mesh '{}'", mesh.name);
        }

        queue.write_buffer(
            &self.object_buffer,
            0,
            bytemuck::bytes_of(&ObjectUniforms {
                model: mesh.transform().matrix_as_mat4(),
            }),
        );
        queue.write_buffer(&self.material_buffer, 0, bytemuck::bytes_of(material));

        let uniforms: &TerrainUniformSet = mesh.uniforms();
        if self.terrain_version != uniforms.version() {
            queue.write_buffer(&self.terrain_buffer, 0, bytemuck::bytes_of(uniforms.data()));
            self.terrain_version = uniforms.version();
        }

        let bound = (uniforms.stripe_texture(), texture.generation());
        if self.bound_texture != bound {
            self.terrain_bind_group =
                create_terrain_bind_group(device, programs, &self.terrain_buffer, texture);
            self.bound_texture = bound;
        }
    }

    /// Version of the uniform set last uploaded.
    #[inline]
    #[must_use]
    pub fn uploaded_version(&self) -> u64 {
        self.terrain_version
    }
}

fn create_geometry_buffers(device: &wgpu::Device, geometry: &Geometry) -> (wgpu::Buffer, wgpu::Buffer) {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Terrain Vertices"),
        contents: bytemuck::cast_slice(geometry.vertices()),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Terrain Indices"),
        contents: bytemuck::cast_slice(geometry.indices()),
        usage: wgpu::BufferUsages::INDEX,
    });
    (vertex_buffer, index_buffer)
}

fn create_terrain_bind_group(
    device: &wgpu::Device,
    programs: &TerrainPrograms,
    buffer: &wgpu::Buffer,
    texture: &GpuStripeTexture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Terrain Uniform Set BindGroup"),
        layout: &programs.terrain_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&programs.linear_sampler),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::Sampler(&programs.nearest_sampler),
            },
        ],
    })
}
