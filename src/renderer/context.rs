//! wgpu Context
//!
//! [`WgpuContext`] holds the core GPU handles: device, queue, and (when
//! rendering to a window) the surface and its configuration. Without a
//! surface the context renders into an offscreen output texture owned by
//! the compositor.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::errors::{BokehError, Result};
use crate::renderer::settings::RendererSettings;

/// Format of the offscreen output when there is no surface.
pub const HEADLESS_OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

pub struct WgpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    /// `None` in headless mode.
    pub surface: Option<wgpu::Surface<'static>>,
    /// Surface configuration. In headless mode only `format`, `width` and
    /// `height` are meaningful.
    pub config: wgpu::SurfaceConfiguration,
    pub depth_format: wgpu::TextureFormat,
}

impl WgpuContext {
    /// Creates a context presenting to `window`.
    pub async fn new<W>(window: W, settings: &RendererSettings, width: u32, height: u32) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(|e| BokehError::SurfaceError(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: settings.force_fallback,
            })
            .await
            .map_err(|e| BokehError::AdapterRequestFailed(e.to_string()))?;

        let (device, queue) = request_device(&adapter, settings).await?;

        let mut config = surface
            .get_default_config(&adapter, width.max(1), height.max(1))
            .ok_or_else(|| BokehError::SurfaceError("Surface not supported by adapter".to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        if let Some(srgb) = caps.formats.iter().copied().find(wgpu::TextureFormat::is_srgb) {
            config.format = srgb;
        } else {
            log::warn!("No sRGB surface format available, output will not be gamma encoded");
        }
        config.present_mode = if settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        surface.configure(&device, &config);

        log::info!(
            "GPU context ready: {} ({:?}), surface {:?} {}x{}",
            adapter.get_info().name,
            adapter.get_info().backend,
            config.format,
            config.width,
            config.height
        );

        Ok(Self {
            device,
            queue,
            surface: Some(surface),
            config,
            depth_format: settings.depth_format,
        })
    }

    /// Creates a context without a surface.
    pub async fn new_headless(settings: &RendererSettings, width: u32, height: u32) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: None,
                force_fallback_adapter: settings.force_fallback,
            })
            .await
            .map_err(|e| BokehError::AdapterRequestFailed(e.to_string()))?;

        let (device, queue) = request_device(&adapter, settings).await?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: HEADLESS_OUTPUT_FORMAT,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
        };

        log::info!(
            "Headless GPU context ready: {} ({:?})",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        Ok(Self {
            device,
            queue,
            surface: None,
            config,
            depth_format: settings.depth_format,
        })
    }

    /// Reconfigures the surface to a new physical window size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        if let Some(surface) = &self.surface {
            surface.configure(&self.device, &self.config);
        }
    }

    /// Re-applies the current configuration, used after `Lost`/`Outdated`.
    pub fn reconfigure(&self) {
        if let Some(surface) = &self.surface {
            surface.configure(&self.device, &self.config);
        }
    }

    /// Format of the final output attachment.
    #[inline]
    #[must_use]
    pub fn output_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    #[inline]
    #[must_use]
    pub fn is_headless(&self) -> bool {
        self.surface.is_none()
    }
}

async fn request_device(
    adapter: &wgpu::Adapter,
    settings: &RendererSettings,
) -> Result<(wgpu::Device, wgpu::Queue)> {
    let required_limits = settings
        .required_limits
        .clone()
        .unwrap_or_else(|| wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()));

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("Bokeh Terrain Device"),
            required_features: settings.required_features,
            required_limits,
            memory_hints: wgpu::MemoryHints::Performance,
            ..Default::default()
        })
        .await?;
    Ok((device, queue))
}

/// Runs `build` inside a validation error scope and turns a captured error
/// into [`BokehError::ProgramBuildFailed`].
pub(crate) fn build_program<T>(device: &wgpu::Device, label: &str, build: impl FnOnce() -> T) -> Result<T> {
    #[cfg(not(target_arch = "wasm32"))]
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

    let built = build();

    #[cfg(not(target_arch = "wasm32"))]
    if let Some(err) = pollster::block_on(scope.pop()) {
        log::error!("Program '{label}' rejected by the device: {err}");
        return Err(BokehError::ProgramBuildFailed {
            label: label.to_string(),
            message: err.to_string(),
        });
    }

    #[cfg(target_arch = "wasm32")]
    let _ = (device, label);

    Ok(built)
}
