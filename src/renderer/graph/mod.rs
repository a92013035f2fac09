//! Pass Graph
//!
//! - [`RenderNode`]: pass interface with separate prepare and run phases
//! - [`PrepareContext`] / [`ExecuteContext`]: per-phase views of the renderer
//! - [`RenderTargets`]: off-screen buffers shared by the passes
//! - [`Compositor`]: runs scene, depth and bokeh passes in that order

pub mod compositor;
pub mod context;
pub mod node;
pub mod passes;
pub mod targets;

pub use compositor::Compositor;
pub use context::{ExecuteContext, PrepareContext};
pub use node::RenderNode;
pub use targets::{RenderTarget, RenderTargets, TargetPlan, TargetSlot, TargetSpec};
