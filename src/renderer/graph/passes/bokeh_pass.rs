//! Bokeh Pass
//!
//! Fullscreen depth-of-field blur. Reads the scene color and the packed
//! depth written by the two previous passes and writes the final image to
//! the output view.
//!
//! # Data Flow
//!
//! ```text
//! ScenePass ─ scene color ──┐
//!                           ├─ BokehPass → surface / offscreen output
//! DepthPass ─ packed depth ─┘
//! ```
//!
//! The bind group samples compositor targets, so it is rebuilt whenever the
//! target set is reallocated.

use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use crate::errors::Result;
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::node::RenderNode;
use crate::renderer::graph::targets::TargetSlot;
use crate::renderer::context::build_program;
use crate::renderer::shader_manager::{ShaderManager, ShaderProgram};
use crate::resources::uniforms::BokehUniforms;

pub struct BokehPass {
    layout: wgpu::BindGroupLayout,
    linear_sampler: wgpu::Sampler,
    nearest_sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,

    /// Pipelines by output format. One entry in practice.
    pipelines: FxHashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,

    current_format: Option<wgpu::TextureFormat>,
    /// Bind group with the target generation it samples.
    bind_group: Option<(u64, wgpu::BindGroup)>,
}

impl BokehPass {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bokeh BindGroup Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1),
                texture_entry(2),
                sampler_entry(3),
                sampler_entry(4),
            ],
        });

        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Bokeh Color Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        // Packed depth must never be interpolated between texels.
        let nearest_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Bokeh Depth Sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bokeh Uniforms"),
            contents: bytemuck::bytes_of(&BokehUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            layout,
            linear_sampler,
            nearest_sampler,
            uniform_buffer,
            pipelines: FxHashMap::default(),
            current_format: None,
            bind_group: None,
        }
    }

    /// Builds the pipeline for `format` unless it is already cached.
    pub fn build_pipeline(
        &mut self,
        device: &wgpu::Device,
        shaders: &mut ShaderManager,
        format: wgpu::TextureFormat,
    ) -> Result<()> {
        if self.pipelines.contains_key(&format) {
            return Ok(());
        }
        log::debug!("Compiling bokeh pipeline for {format:?}");

        let module = shaders.get_or_compile(device, ShaderProgram::Bokeh)?;
        let pipeline = build_program(device, "Bokeh Pipeline", || {
            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Bokeh Pipeline Layout"),
                bind_group_layouts: &[&self.layout],
                immediate_size: 0,
            });

            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Bokeh Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        })?;
        self.pipelines.insert(format, pipeline);
        Ok(())
    }
}

impl RenderNode for BokehPass {
    fn name(&self) -> &'static str {
        "Bokeh Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) -> Result<()> {
        // 1. Pipeline for the current output format
        let format = ctx.output_format;
        self.build_pipeline(&ctx.wgpu_ctx.device, ctx.shaders, format)?;
        self.current_format = Some(format);

        // 2. Uniforms
        let (width, height) = ctx.targets.size();
        let camera = &ctx.scene.camera;
        let uniforms = ctx
            .bokeh
            .to_uniforms(width as f32 / height as f32, camera.near, camera.far);
        ctx.wgpu_ctx
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        // 3. Bind group over the current targets
        let generation = ctx.targets.generation();
        if self.bind_group.as_ref().is_none_or(|(g, _)| *g != generation) {
            let color = ctx.targets.require(TargetSlot::SceneColor)?;
            let depth = ctx.targets.require(TargetSlot::BokehDepth)?;
            let bind_group = ctx.wgpu_ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Bokeh BindGroup"),
                layout: &self.layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&color.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&depth.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(&self.linear_sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: wgpu::BindingResource::Sampler(&self.nearest_sampler),
                    },
                ],
            });
            self.bind_group = Some((generation, bind_group));
        }
        Ok(())
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let Some(pipeline) = self.current_format.and_then(|f| self.pipelines.get(&f)) else {
            return;
        };
        let Some((_, bind_group)) = &self.bind_group else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Bokeh Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: ctx.output_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
