use super::context::{ExecuteContext, PrepareContext};
use crate::errors::Result;

/// One pass of the compositor.
///
/// `prepare` does every mutable step (pipelines, uniforms, bind groups) and
/// may fail; `run` only records commands.
pub trait RenderNode {
    fn name(&self) -> &'static str;

    fn prepare(&mut self, _ctx: &mut PrepareContext) -> Result<()> {
        Ok(())
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder);
}
