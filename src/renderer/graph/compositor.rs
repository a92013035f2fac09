//! Compositor
//!
//! Owns the render targets and the three passes and runs them in a fixed
//! order every frame:
//!
//! 1. [`ScenePass`]: sharp color image
//! 2. [`DepthPass`]: packed camera distance
//! 3. [`BokehPass`]: blur to the output
//!
//! All passes are prepared before any command is recorded, so a failure in
//! any of them leaves the frame unsubmitted.

use crate::errors::Result;
use crate::renderer::context::WgpuContext;
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::node::RenderNode;
use crate::renderer::graph::passes::{BokehPass, DepthPass, ScenePass};
use crate::renderer::graph::targets::{
    PACKED_DEPTH_FORMAT, RenderTargets, SCENE_COLOR_FORMAT, TargetPlan, TargetSlot,
};
use crate::renderer::resources::GpuResources;
use crate::renderer::shader_manager::ShaderManager;
use crate::renderer::terrain_programs::{DefaultFormats, TerrainPrograms};
use crate::resources::bokeh::BokehSettings;
use crate::scene::Scene;
use crate::scene::viewport::Viewport;

/// Everything a frame reads besides the compositor itself.
pub struct FrameInputs<'a> {
    pub wgpu_ctx: &'a WgpuContext,
    pub shaders: &'a mut ShaderManager,
    pub programs: &'a mut TerrainPrograms,
    pub resources: &'a GpuResources,
    pub scene: &'a Scene,
    pub bokeh: &'a BokehSettings,
}

pub struct Compositor {
    scene_pass: ScenePass,
    depth_pass: DepthPass,
    bokeh_pass: BokehPass,
    targets: RenderTargets,
    /// Format of the offscreen output, `None` when presenting to a surface.
    offscreen_format: Option<wgpu::TextureFormat>,
}

impl Compositor {
    /// Allocates targets for `viewport`, creates the passes and builds the
    /// pipelines of the default materials and of the blur. A program the
    /// device rejects fails here, before any frame is rendered.
    pub fn new(
        wgpu_ctx: &WgpuContext,
        shaders: &mut ShaderManager,
        programs: &mut TerrainPrograms,
        viewport: &Viewport,
        offscreen_format: Option<wgpu::TextureFormat>,
    ) -> Result<Self> {
        let device = &wgpu_ctx.device;
        let plan = TargetPlan::new(viewport, wgpu_ctx.depth_format, offscreen_format);
        let targets = RenderTargets::allocate(device, &plan, 0)?;

        programs.build_defaults(
            device,
            shaders,
            DefaultFormats {
                scene_color: SCENE_COLOR_FORMAT,
                packed_depth: PACKED_DEPTH_FORMAT,
                depth: wgpu_ctx.depth_format,
            },
        )?;
        let mut bokeh_pass = BokehPass::new(device);
        bokeh_pass.build_pipeline(device, shaders, offscreen_format.unwrap_or(wgpu_ctx.output_format()))?;

        Ok(Self {
            scene_pass: ScenePass::new(),
            depth_pass: DepthPass::new(),
            bokeh_pass,
            targets,
            offscreen_format,
        })
    }

    /// Pass names in execution order.
    #[must_use]
    pub fn pass_names(&self) -> [&'static str; 3] {
        [
            self.scene_pass.name(),
            self.depth_pass.name(),
            self.bokeh_pass.name(),
        ]
    }

    /// Reallocates every target for `viewport`.
    ///
    /// The new set replaces the current one only after all of it has been
    /// created; on error the current targets stay in use.
    pub fn resize(&mut self, wgpu_ctx: &WgpuContext, viewport: &Viewport) -> Result<()> {
        let plan = TargetPlan::new(viewport, wgpu_ctx.depth_format, self.offscreen_format);
        let targets = RenderTargets::allocate(&wgpu_ctx.device, &plan, self.targets.generation() + 1)?;
        self.targets = targets;
        Ok(())
    }

    /// Prepares and records all passes, then submits.
    ///
    /// `surface` is the acquired surface view with its format; `None` writes
    /// to the offscreen output target.
    pub fn render(
        &mut self,
        inputs: FrameInputs,
        surface: Option<(&wgpu::TextureView, wgpu::TextureFormat)>,
    ) -> Result<()> {
        let FrameInputs {
            wgpu_ctx,
            shaders,
            programs,
            resources,
            scene,
            bokeh,
        } = inputs;

        let output_format = match surface {
            Some((_, format)) => format,
            None => self.targets.require(TargetSlot::Output)?.format,
        };

        // 1. Prepare
        {
            let mut ctx = PrepareContext {
                wgpu_ctx,
                shaders: &mut *shaders,
                programs: &mut *programs,
                scene,
                targets: &self.targets,
                bokeh,
                output_format,
            };
            let nodes: [&mut dyn RenderNode; 3] =
                [&mut self.scene_pass, &mut self.depth_pass, &mut self.bokeh_pass];
            for node in nodes {
                node.prepare(&mut ctx)?;
            }
        }

        // 2. Execute
        let output_view = match surface {
            Some((view, _)) => view,
            None => &self.targets.require(TargetSlot::Output)?.view,
        };
        let ctx = ExecuteContext {
            wgpu_ctx,
            programs,
            resources,
            targets: &self.targets,
            output_view,
        };

        let mut encoder = wgpu_ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Compositor Encoder"),
            });
        let nodes: [&dyn RenderNode; 3] = [&self.scene_pass, &self.depth_pass, &self.bokeh_pass];
        for node in nodes {
            encoder.push_debug_group(node.name());
            node.run(&ctx, &mut encoder);
            encoder.pop_debug_group();
        }
        wgpu_ctx.queue.submit(Some(encoder.finish()));
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn targets(&self) -> &RenderTargets {
        &self.targets
    }

    #[inline]
    #[must_use]
    pub fn depth_pass(&self) -> &DepthPass {
        &self.depth_pass
    }
}
