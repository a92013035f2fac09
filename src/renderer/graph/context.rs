//! Pass Contexts
//!
//! Two phase-separated views of the renderer handed to every [`RenderNode`]:
//!
//! - [`PrepareContext`]: mutable access to the shader and pipeline caches.
//!   Passes build pipelines, upload their uniforms and rebuild bind groups.
//! - [`ExecuteContext`]: read-only. Passes record commands.
//!
//! Both borrow individual renderer fields so the borrow checker can split
//! them, e.g. `programs` mutably next to `scene` immutably.
//!
//! [`RenderNode`]: super::node::RenderNode

use crate::renderer::context::WgpuContext;
use crate::renderer::graph::targets::RenderTargets;
use crate::renderer::resources::GpuResources;
use crate::renderer::shader_manager::ShaderManager;
use crate::renderer::terrain_programs::TerrainPrograms;
use crate::resources::bokeh::BokehSettings;
use crate::scene::Scene;

pub struct PrepareContext<'a> {
    pub wgpu_ctx: &'a WgpuContext,
    pub shaders: &'a mut ShaderManager,
    pub programs: &'a mut TerrainPrograms,
    pub scene: &'a Scene,
    pub targets: &'a RenderTargets,
    pub bokeh: &'a BokehSettings,
    /// Format of the view the final pass writes to.
    pub output_format: wgpu::TextureFormat,
}

pub struct ExecuteContext<'a> {
    pub wgpu_ctx: &'a WgpuContext,
    pub programs: &'a TerrainPrograms,
    pub resources: &'a GpuResources,
    pub targets: &'a RenderTargets,
    /// Surface view, or the offscreen output in headless mode.
    pub output_view: &'a wgpu::TextureView,
}
