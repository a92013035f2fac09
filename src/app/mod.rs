//! Winit Frontend
//!
//! Opens a window, builds an [`Engine`] for it and drives one
//! [`FrameDriver::tick`] per redraw. Window resize and scale-factor changes
//! go through [`Engine::resize`]; pointer input feeds the orbit controls.
//!
//! ```rust,ignore
//! use bokeh_terrain::app::App;
//! use bokeh_terrain::TerrainConfig;
//!
//! fn main() -> bokeh_terrain::errors::Result<()> {
//!     env_logger::init();
//!     App::new(TerrainConfig::default()).with_title("Terrain").run()
//! }
//! ```

pub mod input_adapter;

use std::sync::Arc;

use glam::Vec3;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::TerrainConfig;
use crate::driver::FrameDriver;
use crate::engine::Engine;
use crate::errors::Result;
use crate::renderer::FrameOutcome;
use crate::scene::viewport::Viewport;
use crate::utils::orbit_control::OrbitControls;
use crate::utils::time::Timer;

/// Application builder.
pub struct App {
    title: String,
    config: TerrainConfig,
    initial_size: (f64, f64),
}

impl App {
    #[must_use]
    pub fn new(config: TerrainConfig) -> Self {
        Self {
            title: "Bokeh Terrain".into(),
            config,
            initial_size: (1280.0, 720.0),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Initial logical window size.
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.initial_size = (width, height);
        self
    }

    /// Runs the event loop until the window closes.
    pub fn run(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner {
            app: self,
            window: None,
            engine: None,
            controls: None,
            driver: FrameDriver::new(Timer::new()),
        };
        event_loop.run_app(&mut runner)?;
        Ok(())
    }
}

struct AppRunner {
    app: App,
    window: Option<Arc<Window>>,
    engine: Option<Engine>,
    controls: Option<OrbitControls>,
    driver: FrameDriver<Timer>,
}

impl AppRunner {
    fn init(&mut self, window: &Arc<Window>) -> Result<()> {
        let size = window.inner_size();
        let viewport = Viewport::from_physical(size.width, size.height, window.scale_factor())?;

        let engine = pollster::block_on(Engine::with_window(
            window.clone(),
            self.app.config.clone(),
            viewport,
            (size.width, size.height),
        ))?;

        let camera = &self.app.config.camera;
        let mut controls = OrbitControls::looking_at(
            Vec3::from_array(camera.position),
            Vec3::from_array(camera.target),
            camera.damping,
        );
        controls.input.handle_resize(size.width, size.height);

        self.engine = Some(engine);
        self.controls = Some(controls);
        self.driver = FrameDriver::new(Timer::new());
        Ok(())
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) -> Result<()> {
        // Minimized: keep the previous targets until a real size arrives.
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        let Some(engine) = &mut self.engine else {
            return Ok(());
        };
        let viewport = Viewport::from_physical(size.width, size.height, scale_factor)?;
        engine.resize(viewport, (size.width, size.height))
    }

    fn redraw(&mut self) -> Result<()> {
        let Some(engine) = &mut self.engine else {
            return Ok(());
        };
        let control = self.controls.as_mut().map(|c| c as &mut dyn crate::driver::CameraControl);
        if self.driver.tick(engine, control)? == FrameOutcome::Skipped {
            log::debug!("Frame {} skipped", self.driver.frames());
        }
        Ok(())
    }
}

impl ApplicationHandler for AppRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = self.app.initial_size;
        let attributes = Window::default_attributes()
            .with_title(&self.app.title)
            .with_inner_size(LogicalSize::new(width, height));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        log::info!("Initializing renderer");
        if let Err(e) = self.init(&window) {
            log::error!("Fatal renderer error: {e}");
            event_loop.exit();
            return;
        }
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        if let Some(controls) = &mut self.controls {
            input_adapter::process_window_event(&mut controls.input, &event);
        }

        let result = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                Ok(())
            }
            WindowEvent::Resized(size) => self.handle_resize(size, window.scale_factor()),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.handle_resize(window.inner_size(), scale_factor)
            }
            WindowEvent::RedrawRequested => {
                let result = self.redraw();
                window.request_redraw();
                result
            }
            _ => Ok(()),
        };

        if let Err(e) = result {
            log::error!("Fatal frame error: {e}");
            event_loop.exit();
        }
    }
}
