//! # Bokeh Terrain
//!
//! An animated, displaced terrain plane rendered with wgpu and composited
//! through a depth-of-field (bokeh) blur.
//!
//! - [`resources`]: CPU data (stripe texture, uniform blocks, geometry,
//!   materials, bokeh parameters)
//! - [`scene`]: terrain mesh, camera, viewport and the depth material
//!   association
//! - [`renderer`]: GPU context, shader templates, pipelines and the
//!   scene → depth → bokeh compositor
//! - [`driver`]: per-frame clock, time uniform and camera control
//! - [`engine`]: the scene plus renderer with the central resize handler
//! - [`app`]: winit frontend (feature `winit`)
//!
//! ```rust,ignore
//! use bokeh_terrain::{Engine, FrameDriver, TerrainConfig, Timer, Viewport};
//!
//! let viewport = Viewport::new(800, 600, 1.0)?;
//! let mut engine = pollster::block_on(Engine::new_headless(TerrainConfig::default(), viewport))?;
//! let mut driver = FrameDriver::new(Timer::new());
//! driver.tick(&mut engine, None)?;
//! let image = engine.renderer().capture_output()?;
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

#[cfg(feature = "winit")]
pub mod app;
pub mod config;
pub mod driver;
pub mod engine;
pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod utils;

#[cfg(feature = "winit")]
pub use app::App;
pub use config::TerrainConfig;
pub use driver::{CameraControl, Clock, FrameDriver, FrameTarget};
pub use engine::Engine;
pub use errors::{BokehError, Result};
pub use renderer::{FrameOutcome, Renderer, RendererSettings};
pub use resources::{
    BokehSettings, StripeTexture, StripeTextureSettings, TerrainVariant, UniformName, UniformValue,
};
pub use scene::{MeshKey, PerspectiveCamera, Scene, TerrainMesh, TerrainSettings, Viewport};
pub use utils::{OrbitControls, Timer};
