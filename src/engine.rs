//! Engine Core Module
//!
//! [`Engine`] owns the terrain [`Scene`], the [`Renderer`] and the current
//! [`Viewport`]. It has no window management of its own, so it can be driven
//! by the winit frontend or run headless.
//!
//! # Resize
//!
//! [`Engine::resize`] is the single place where viewport state changes. It
//! reallocates the compositor targets first; the camera aspect and the
//! stored viewport are only updated once that succeeded, so a failed resize
//! leaves every sized resource at the previous viewport.
//!
//! # Example
//!
//! ```rust,ignore
//! use bokeh_terrain::{Engine, FrameDriver, TerrainConfig, Timer, Viewport};
//!
//! let viewport = Viewport::new(800, 600, 1.0)?;
//! let mut engine = pollster::block_on(Engine::new_headless(TerrainConfig::default(), viewport))?;
//! let mut driver = FrameDriver::new(Timer::new());
//! driver.tick(&mut engine, None)?;
//! ```

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::config::TerrainConfig;
use crate::driver::FrameTarget;
use crate::errors::{BokehError, Result};
use crate::renderer::context::WgpuContext;
use crate::renderer::settings::RendererSettings;
use crate::renderer::{FrameOutcome, Renderer};
use crate::resources::uniforms::UniformValue;
use crate::scene::camera::PerspectiveCamera;
use crate::scene::viewport::Viewport;
use crate::scene::{MeshKey, Scene};

pub struct Engine {
    scene: Scene,
    renderer: Renderer,
    viewport: Viewport,
    terrain: MeshKey,
    config: TerrainConfig,
}

impl Engine {
    /// Builds the scene and a renderer presenting to `window`.
    ///
    /// `surface_size` is the window's physical size; compositor targets are
    /// sized from `viewport` with its clamped pixel ratio.
    pub async fn with_window<W>(
        window: W,
        config: TerrainConfig,
        viewport: Viewport,
        surface_size: (u32, u32),
    ) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        config.validate()?;
        let settings = RendererSettings::from(&config.renderer);
        let ctx = WgpuContext::new(window, &settings, surface_size.0, surface_size.1).await?;
        Self::build(ctx, config, viewport)
    }

    /// Builds the scene and a renderer writing to an offscreen output.
    pub async fn new_headless(config: TerrainConfig, viewport: Viewport) -> Result<Self> {
        config.validate()?;
        let settings = RendererSettings::from(&config.renderer);
        let (width, height) = viewport.physical_extent();
        let ctx = WgpuContext::new_headless(&settings, width, height).await?;
        Self::build(ctx, config, viewport)
    }

    fn build(ctx: WgpuContext, config: TerrainConfig, viewport: Viewport) -> Result<Self> {
        let (scene, terrain) = Scene::from_config(&config, viewport.aspect())?;
        let renderer = Renderer::new(ctx, &viewport, config.bokeh)?;

        let (width, height) = viewport.physical_extent();
        log::info!(
            "Engine ready: viewport {}x{} @ {} -> {width}x{height}",
            viewport.width(),
            viewport.height(),
            viewport.pixel_ratio()
        );

        Ok(Self {
            scene,
            renderer,
            viewport,
            terrain,
            config,
        })
    }

    /// Applies a new viewport to every sized resource.
    pub fn resize(&mut self, viewport: Viewport, surface_size: (u32, u32)) -> Result<()> {
        self.renderer.resize(&viewport, surface_size)?;
        self.scene.camera.set_aspect(viewport.aspect());
        self.viewport = viewport;

        let (width, height) = viewport.physical_extent();
        log::info!(
            "Resized to {}x{} @ {} -> {width}x{height}",
            viewport.width(),
            viewport.height(),
            viewport.pixel_ratio()
        );
        Ok(())
    }

    /// Sets a uniform of the terrain's shared set. Both terrain programs
    /// read the new value from the next frame on.
    pub fn set_terrain_uniform(&mut self, value: UniformValue) -> Result<()> {
        let mesh = self
            .scene
            .mesh_mut(self.terrain)
            .ok_or_else(|| BokehError::MeshNotFound("terrain".to_string()))?;
        mesh.set_uniform(value);
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    #[inline]
    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    #[inline]
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Key of the terrain mesh.
    #[inline]
    #[must_use]
    pub fn terrain(&self) -> MeshKey {
        self.terrain
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }
}

impl FrameTarget for Engine {
    fn set_time(&mut self, elapsed: f32) {
        self.scene.set_time(elapsed);
    }

    fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.scene.camera
    }

    fn render_frame(&mut self) -> Result<FrameOutcome> {
        self.scene.update();
        self.renderer.render(&self.scene)
    }
}
