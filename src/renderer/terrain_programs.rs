//! Terrain Shader Programs
//!
//! Bind group layouts, samplers and the render pipeline cache for the three
//! mesh programs:
//!
//! | Program        | Groups                                  | Output            |
//! |----------------|-----------------------------------------|-------------------|
//! | `Terrain`      | frame, object, terrain, material        | scene color       |
//! | `TerrainDepth` | frame, object, terrain                  | packed distance   |
//! | `SceneDepth`   | frame, object                           | packed distance   |
//!
//! `Terrain` and `TerrainDepth` use the same terrain layout, and each mesh
//! owns a single terrain bind group over a single uniform buffer. Both
//! pipelines bind that same group, so they always read identical
//! `elevation`, `texture_frequency` and `time` values.

use rustc_hash::FxHashMap;

use crate::errors::Result;
use crate::renderer::context::build_program;
use crate::renderer::shader_manager::{ShaderManager, ShaderProgram};
use crate::resources::geometry::TerrainVertex;
use crate::resources::material::{Blending, Side};

/// Cache key of a mesh pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub program: ShaderProgram,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    /// `None` replaces the destination.
    pub blending: Option<Blending>,
    pub side: Side,
    pub depth_write: bool,
}

impl PipelineKey {
    /// Key of a depth program. Depth output never blends and always writes z.
    #[must_use]
    pub fn depth(
        program: ShaderProgram,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        side: Side,
    ) -> Self {
        Self {
            program,
            color_format,
            depth_format,
            blending: None,
            side,
            depth_write: true,
        }
    }
}

/// Attachment formats the default pipelines are built for.
#[derive(Debug, Clone, Copy)]
pub struct DefaultFormats {
    pub scene_color: wgpu::TextureFormat,
    pub packed_depth: wgpu::TextureFormat,
    pub depth: wgpu::TextureFormat,
}

pub struct TerrainPrograms {
    pub frame_layout: wgpu::BindGroupLayout,
    pub object_layout: wgpu::BindGroupLayout,
    pub terrain_layout: wgpu::BindGroupLayout,
    pub material_layout: wgpu::BindGroupLayout,

    /// Vertex-stage sampler: linear, repeat.
    pub linear_sampler: wgpu::Sampler,
    /// Fragment-stage sampler: nearest magnification, repeat.
    pub nearest_sampler: wgpu::Sampler,

    pipelines: FxHashMap<PipelineKey, wgpu::RenderPipeline>,
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl TerrainPrograms {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let vertex_fragment = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame BindGroup Layout"),
            entries: &[uniform_entry(0, vertex_fragment)],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object BindGroup Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });

        let terrain_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Terrain Uniform Set Layout"),
            entries: &[
                uniform_entry(0, vertex_fragment),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: vertex_fragment,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: vertex_fragment,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: vertex_fragment,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Terrain Material Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
        });

        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Stripe Linear Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let nearest_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Stripe Nearest Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            frame_layout,
            object_layout,
            terrain_layout,
            material_layout,
            linear_sampler,
            nearest_sampler,
            pipelines: FxHashMap::default(),
        }
    }

    /// Bind group layouts of a program, in group order.
    #[must_use]
    pub fn layouts(&self, program: ShaderProgram) -> Vec<&wgpu::BindGroupLayout> {
        match program {
            ShaderProgram::Terrain => vec![
                &self.frame_layout,
                &self.object_layout,
                &self.terrain_layout,
                &self.material_layout,
            ],
            ShaderProgram::TerrainDepth => {
                vec![&self.frame_layout, &self.object_layout, &self.terrain_layout]
            }
            ShaderProgram::SceneDepth => vec![&self.frame_layout, &self.object_layout],
            ShaderProgram::Bokeh => Vec::new(),
        }
    }

    /// Returns the pipeline for `key`, building it on first use.
    pub fn get_or_create(
        &mut self,
        device: &wgpu::Device,
        shaders: &mut ShaderManager,
        key: PipelineKey,
    ) -> Result<&wgpu::RenderPipeline> {
        if !self.pipelines.contains_key(&key) {
            let pipeline = self.create_pipeline(device, shaders, &key)?;
            self.pipelines.insert(key, pipeline);
        }
        Ok(&self.pipelines[&key])
    }

    /// Builds the pipelines of the default materials: the opaque terrain
    /// program and both depth programs.
    pub fn build_defaults(
        &mut self,
        device: &wgpu::Device,
        shaders: &mut ShaderManager,
        formats: DefaultFormats,
    ) -> Result<()> {
        let terrain = PipelineKey {
            program: ShaderProgram::Terrain,
            color_format: formats.scene_color,
            depth_format: formats.depth,
            blending: None,
            side: Side::Double,
            depth_write: true,
        };
        let keys = [
            terrain,
            PipelineKey::depth(ShaderProgram::TerrainDepth, formats.packed_depth, formats.depth, Side::Double),
            PipelineKey::depth(ShaderProgram::SceneDepth, formats.packed_depth, formats.depth, Side::Double),
        ];
        for key in keys {
            self.get_or_create(device, shaders, key)?;
        }
        log::info!("Built {} terrain pipelines", self.pipelines.len());
        Ok(())
    }

    /// A previously built pipeline.
    #[must_use]
    pub fn pipeline(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(key)
    }

    fn create_pipeline(
        &self,
        device: &wgpu::Device,
        shaders: &mut ShaderManager,
        key: &PipelineKey,
    ) -> Result<wgpu::RenderPipeline> {
        log::debug!("Creating pipeline {key:?}");

        let module = shaders.get_or_compile(device, key.program)?;
        let layouts = self.layouts(key.program);

        build_program(device, key.program.template_name(), || {
            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(key.program.template_name()),
                bind_group_layouts: &layouts,
                immediate_size: 0,
            });

            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(key.program.template_name()),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some("vs_main"),
                    buffers: &[TerrainVertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: key.color_format,
                        blend: key.blending.map(Blending::blend_state),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: key.side.cull_mode(),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: key.depth_format,
                    depth_write_enabled: key.depth_write,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        })
    }
}
