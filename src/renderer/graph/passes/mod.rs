//! Compositor passes, in execution order.

mod bokeh_pass;
mod depth_pass;
mod scene_pass;

pub use bokeh_pass::BokehPass;
pub use depth_pass::DepthPass;
pub use scene_pass::ScenePass;
