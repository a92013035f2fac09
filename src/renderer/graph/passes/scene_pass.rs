//! Scene Pass
//!
//! Renders every visible mesh with its visual program into the scene color
//! target. The result is the sharp image the blur pass samples.

use crate::errors::{BokehError, Result};
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::node::RenderNode;
use crate::renderer::graph::targets::{SCENE_COLOR_FORMAT, TargetSlot};
use crate::renderer::shader_manager::ShaderProgram;
use crate::renderer::terrain_programs::PipelineKey;
use crate::scene::MeshKey;

#[derive(Default)]
pub struct ScenePass {
    draws: Vec<(MeshKey, PipelineKey)>,
    clear_color: wgpu::Color,
}

impl ScenePass {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderNode for ScenePass {
    fn name(&self) -> &'static str {
        "Scene Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) -> Result<()> {
        self.draws.clear();
        self.clear_color = ctx.scene.clear_color;

        let depth_format = ctx.targets.require(TargetSlot::SceneDepth)?.format;

        for (key, mesh) in ctx.scene.meshes() {
            if !mesh.visible {
                continue;
            }
            let material = ctx
                .scene
                .material(mesh.material)
                .and_then(|m| m.as_terrain())
                .ok_or_else(|| {
                    BokehError::MaterialNotFound(format!("visual material of mesh '{}'", mesh.name))
                })?;

            let pipeline_key = PipelineKey {
                program: ShaderProgram::Terrain,
                color_format: SCENE_COLOR_FORMAT,
                depth_format,
                blending: material.transparent.then_some(material.blending),
                side: material.side,
                depth_write: material.depth_write(),
            };
            ctx.programs
                .get_or_create(&ctx.wgpu_ctx.device, ctx.shaders, pipeline_key)?;
            self.draws.push((key, pipeline_key));
        }
        Ok(())
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let (Some(color), Some(depth)) = (
            ctx.targets.get(TargetSlot::SceneColor),
            ctx.targets.get(TargetSlot::SceneDepth),
        ) else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &color.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        pass.set_bind_group(0, &ctx.resources.frame_bind_group, &[]);

        for (key, pipeline_key) in &self.draws {
            let (Some(pipeline), Some(gpu)) = (
                ctx.programs.pipeline(pipeline_key),
                ctx.resources.mesh(*key),
            ) else {
                continue;
            };
            pass.set_pipeline(pipeline);
            pass.set_bind_group(1, &gpu.object_bind_group, &[]);
            pass.set_bind_group(2, &gpu.terrain_bind_group, &[]);
            pass.set_bind_group(3, &gpu.material_bind_group, &[]);
            pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
            pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..gpu.index_count, 0, 0..1);
        }
    }
}
