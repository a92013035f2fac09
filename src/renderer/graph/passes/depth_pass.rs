//! Depth Pass
//!
//! Writes the packed camera distance the blur pass reads. A mesh with an
//! associated depth material is drawn with the displaced `TerrainDepth`
//! program, bound to the same terrain group as its visual program. Any
//! other mesh falls back to the generic `SceneDepth` program, which ignores
//! displacement.
//!
//! The target is cleared to white, which unpacks to the far plane.

use rustc_hash::FxHashSet;

use crate::errors::{BokehError, Result};
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::node::RenderNode;
use crate::renderer::graph::targets::{PACKED_DEPTH_FORMAT, TargetSlot};
use crate::renderer::shader_manager::ShaderProgram;
use crate::renderer::terrain_programs::PipelineKey;
use crate::resources::material::Side;
use crate::scene::MeshKey;

#[derive(Default)]
pub struct DepthPass {
    draws: Vec<(MeshKey, PipelineKey)>,
    /// Meshes already reported as using the fallback program.
    warned: FxHashSet<MeshKey>,
}

impl DepthPass {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Program the pass used for `mesh` in the last prepared frame.
    #[must_use]
    pub fn program_for(&self, mesh: MeshKey) -> Option<ShaderProgram> {
        self.draws
            .iter()
            .find(|(key, _)| *key == mesh)
            .map(|(_, pipeline)| pipeline.program)
    }
}

impl RenderNode for DepthPass {
    fn name(&self) -> &'static str {
        "Depth Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) -> Result<()> {
        self.draws.clear();

        let depth_format = ctx.targets.require(TargetSlot::BokehDepthZ)?.format;

        for (key, mesh) in ctx.scene.meshes() {
            if !mesh.visible {
                continue;
            }

            let pipeline_key = match ctx.scene.depth_material_for(key) {
                Some(handle) => {
                    let material = ctx
                        .scene
                        .material(handle)
                        .and_then(|m| m.as_depth())
                        .ok_or_else(|| {
                            BokehError::MaterialNotFound(format!("depth material of mesh '{}'", mesh.name))
                        })?;
                    PipelineKey::depth(
                        ShaderProgram::TerrainDepth,
                        PACKED_DEPTH_FORMAT,
                        depth_format,
                        material.side,
                    )
                }
                None => {
                    if self.warned.insert(key) {
                        log::warn!(
                            "Mesh '{}' has no depth material; blur follows its undisplaced geometry",
                            mesh.name
                        );
                    }
                    PipelineKey::depth(ShaderProgram::SceneDepth, PACKED_DEPTH_FORMAT, depth_format, Side::Double)
                }
            };

            ctx.programs
                .get_or_create(&ctx.wgpu_ctx.device, ctx.shaders, pipeline_key)?;
            self.draws.push((key, pipeline_key));
        }

        self.warned.retain(|key| ctx.scene.mesh(*key).is_some());
        Ok(())
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let (Some(color), Some(depth)) = (
            ctx.targets.get(TargetSlot::BokehDepth),
            ctx.targets.get(TargetSlot::BokehDepthZ),
        ) else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Depth Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &color.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
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
            if pipeline_key.program == ShaderProgram::TerrainDepth {
                pass.set_bind_group(2, &gpu.terrain_bind_group, &[]);
            }
            pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
            pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..gpu.index_count, 0, 0..1);
        }
    }
}
