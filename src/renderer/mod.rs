//! Rendering System
//!
//! [`Renderer`] ties the GPU context, the shader and pipeline caches, the
//! GPU mirror of the scene and the [`Compositor`] together.
//!
//! # Frame
//!
//! 1. Upload scene state ([`GpuResources::prepare`])
//! 2. Acquire the surface texture (skipped in headless mode)
//! 3. Scene pass, depth pass, bokeh pass
//! 4. Present
//!
//! # Resize
//!
//! [`Renderer::resize`] allocates a complete new target set before the
//! surface is reconfigured. If allocation fails nothing changes and the
//! error is returned.

pub mod context;
pub mod gpu_mesh;
pub mod gpu_texture;
pub mod graph;
pub mod resources;
pub mod settings;
pub mod shader_manager;
pub mod terrain_programs;

use crate::errors::{BokehError, Result};
use crate::resources::bokeh::BokehSettings;
use crate::scene::Scene;
use crate::scene::viewport::Viewport;

use self::context::{HEADLESS_OUTPUT_FORMAT, WgpuContext};
use self::graph::compositor::FrameInputs;
use self::graph::{Compositor, RenderTargets, TargetSlot};
use self::resources::GpuResources;
use self::shader_manager::ShaderManager;
use self::terrain_programs::TerrainPrograms;

pub use self::settings::{PowerMode, RendererConfig, RendererSettings};

/// Result of [`Renderer::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented,
    /// The surface was lost, outdated or timed out. It has been
    /// reconfigured where possible; the next frame should succeed.
    Skipped,
}

pub struct Renderer {
    ctx: WgpuContext,
    shaders: ShaderManager,
    programs: TerrainPrograms,
    resources: GpuResources,
    compositor: Compositor,
    bokeh: BokehSettings,
}

impl Renderer {
    /// Builds every GPU object and allocates targets for `viewport`.
    pub fn new(ctx: WgpuContext, viewport: &Viewport, bokeh: BokehSettings) -> Result<Self> {
        bokeh.validate()?;

        let mut shaders = ShaderManager::new()?;
        let mut programs = TerrainPrograms::new(&ctx.device);
        let resources = GpuResources::new(&ctx.device, &programs);
        let offscreen = ctx.is_headless().then_some(HEADLESS_OUTPUT_FORMAT);
        let compositor = Compositor::new(&ctx, &mut shaders, &mut programs, viewport, offscreen)?;

        Ok(Self {
            ctx,
            shaders,
            programs,
            resources,
            compositor,
            bokeh,
        })
    }

    /// Resizes the compositor targets to `viewport` and the surface to
    /// `surface_size` (physical window pixels).
    pub fn resize(&mut self, viewport: &Viewport, surface_size: (u32, u32)) -> Result<()> {
        self.compositor.resize(&self.ctx, viewport)?;
        self.ctx.resize(surface_size.0, surface_size.1);
        Ok(())
    }

    /// Renders one frame of `scene`.
    pub fn render(&mut self, scene: &Scene) -> Result<FrameOutcome> {
        self.resources.prepare(&self.ctx, &self.programs, scene)?;

        let inputs = FrameInputs {
            wgpu_ctx: &self.ctx,
            shaders: &mut self.shaders,
            programs: &mut self.programs,
            resources: &self.resources,
            scene,
            bokeh: &self.bokeh,
        };

        let Some(surface) = &self.ctx.surface else {
            self.compositor.render(inputs, None)?;
            return Ok(FrameOutcome::Presented);
        };

        let output = match surface.get_current_texture() {
            Ok(output) => output,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::warn!("Surface {e}, reconfiguring and skipping frame");
                self.ctx.reconfigure();
                return Ok(FrameOutcome::Skipped);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface acquire timed out, skipping frame");
                return Ok(FrameOutcome::Skipped);
            }
            Err(e) => return Err(BokehError::SurfaceAcquire(e.to_string())),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.compositor
            .render(inputs, Some((&view, self.ctx.output_format())))?;
        output.present();

        Ok(FrameOutcome::Presented)
    }

    /// Copies the offscreen output of the last frame into an image.
    ///
    /// Only available in headless mode.
    pub fn capture_output(&self) -> Result<image::RgbaImage> {
        let target = self.compositor.targets().require(TargetSlot::Output)?;
        let (width, height) = self.compositor.targets().size();
        let device = &self.ctx.device;

        let row_bytes = width as usize * 4;
        let padded_row_bytes = row_bytes.next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Output Readback"),
            size: (padded_row_bytes * height as usize) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Output Readback"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row_bytes as u32),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.ctx.queue.submit(Some(encoder.finish()));

        let slice = buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| BokehError::ReadbackFailed(e.to_string()))?;
        receiver
            .recv()
            .map_err(|e| BokehError::ReadbackFailed(e.to_string()))?
            .map_err(|e| BokehError::ReadbackFailed(e.to_string()))?;

        let mut pixels = Vec::with_capacity(row_bytes * height as usize);
        {
            let mapped = slice.get_mapped_range();
            for row in mapped.chunks_exact(padded_row_bytes) {
                pixels.extend_from_slice(&row[..row_bytes]);
            }
        }
        buffer.unmap();

        image::RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| BokehError::ReadbackFailed("pixel buffer size mismatch".to_string()))
    }

    /// Replaces the depth-of-field parameters.
    pub fn set_bokeh(&mut self, bokeh: BokehSettings) -> Result<()> {
        bokeh.validate()?;
        self.bokeh = bokeh;
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn bokeh(&self) -> &BokehSettings {
        &self.bokeh
    }

    #[inline]
    #[must_use]
    pub fn targets(&self) -> &RenderTargets {
        self.compositor.targets()
    }

    #[inline]
    #[must_use]
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    #[inline]
    #[must_use]
    pub fn resources(&self) -> &GpuResources {
        &self.resources
    }

    #[inline]
    #[must_use]
    pub fn context(&self) -> &WgpuContext {
        &self.ctx
    }
}
