//! Compositor Render Targets
//!
//! Every off-screen buffer of the pass graph is described by a
//! [`TargetSpec`] and sized from one [`Viewport`]:
//!
//! ```text
//! scene color  ─┐
//! scene z      ─┤ ScenePass
//! bokeh depth  ─┐
//! bokeh z      ─┤ DepthPass
//! output       ─  BokehPass (headless only; otherwise the surface)
//! ```
//!
//! Allocation is transactional. A [`TargetPlan`] is validated against the
//! device limits and formats first, then the whole set is created. The
//! caller swaps the new [`RenderTargets`] in only when every buffer exists,
//! so a failed resize leaves the previous set untouched.

use crate::errors::{BokehError, Result};
use crate::scene::viewport::Viewport;

/// Color format of the scene pass.
pub const SCENE_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Packed camera distance. Must be linear: the bytes are the encoding.
pub const PACKED_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Identifies one buffer of the pass graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetSlot {
    SceneColor,
    SceneDepth,
    BokehDepth,
    BokehDepthZ,
    Output,
}

impl TargetSlot {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SceneColor => "Scene Color",
            Self::SceneDepth => "Scene Z",
            Self::BokehDepth => "Bokeh Packed Depth",
            Self::BokehDepthZ => "Bokeh Z",
            Self::Output => "Offscreen Output",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSpec {
    pub slot: TargetSlot,
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
}

/// The full set of buffers for one viewport state, before allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetPlan {
    pub width: u32,
    pub height: u32,
    pub specs: Vec<TargetSpec>,
}

impl TargetPlan {
    /// Plans every buffer at `viewport.physical_extent()`.
    ///
    /// `output_format` adds an offscreen output target (headless rendering).
    #[must_use]
    pub fn new(
        viewport: &Viewport,
        depth_format: wgpu::TextureFormat,
        output_format: Option<wgpu::TextureFormat>,
    ) -> Self {
        let (width, height) = viewport.physical_extent();
        let sampled = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;

        let mut specs = vec![
            TargetSpec {
                slot: TargetSlot::SceneColor,
                format: SCENE_COLOR_FORMAT,
                usage: sampled,
            },
            TargetSpec {
                slot: TargetSlot::SceneDepth,
                format: depth_format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            },
            TargetSpec {
                slot: TargetSlot::BokehDepth,
                format: PACKED_DEPTH_FORMAT,
                usage: sampled,
            },
            TargetSpec {
                slot: TargetSlot::BokehDepthZ,
                format: depth_format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            },
        ];
        if let Some(format) = output_format {
            specs.push(TargetSpec {
                slot: TargetSlot::Output,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            });
        }

        Self { width, height, specs }
    }

    /// Checks every buffer against the device before anything is allocated.
    pub fn validate(&self, max_dimension: u32, features: wgpu::Features) -> Result<()> {
        for spec in &self.specs {
            if self.width == 0
                || self.height == 0
                || self.width > max_dimension
                || self.height > max_dimension
            {
                return Err(BokehError::InvalidTargetExtent {
                    label: spec.slot.label(),
                    width: self.width,
                    height: self.height,
                    max: max_dimension,
                });
            }

            let expects_depth = matches!(spec.slot, TargetSlot::SceneDepth | TargetSlot::BokehDepthZ);
            let allowed = spec.format.guaranteed_format_features(features).allowed_usages;
            if spec.format.is_depth_stencil_format() != expects_depth || !allowed.contains(spec.usage) {
                return Err(BokehError::UnsupportedTargetFormat {
                    label: spec.slot.label(),
                    format: spec.format,
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn spec(&self, slot: TargetSlot) -> Option<&TargetSpec> {
        self.specs.iter().find(|s| s.slot == slot)
    }
}

/// An allocated buffer.
#[derive(Debug)]
pub struct RenderTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
}

/// The allocated buffers of the pass graph, all of one size.
#[derive(Debug)]
pub struct RenderTargets {
    width: u32,
    height: u32,
    generation: u64,
    scene_color: RenderTarget,
    scene_depth: RenderTarget,
    bokeh_depth: RenderTarget,
    bokeh_depth_z: RenderTarget,
    output: Option<RenderTarget>,
}

impl RenderTargets {
    /// Validates `plan` and allocates every buffer it describes.
    pub fn allocate(device: &wgpu::Device, plan: &TargetPlan, generation: u64) -> Result<Self> {
        plan.validate(device.limits().max_texture_dimension_2d, device.features())?;

        let spec = |slot: TargetSlot| plan.spec(slot).ok_or(BokehError::MissingTarget(slot.label()));
        let scene_color = spec(TargetSlot::SceneColor)?;
        let scene_depth = spec(TargetSlot::SceneDepth)?;
        let bokeh_depth = spec(TargetSlot::BokehDepth)?;
        let bokeh_depth_z = spec(TargetSlot::BokehDepthZ)?;
        let output = plan.spec(TargetSlot::Output);

        let create = |spec: &TargetSpec| -> RenderTarget {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(spec.slot.label()),
                size: wgpu::Extent3d {
                    width: plan.width,
                    height: plan.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: spec.format,
                usage: spec.usage,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            RenderTarget {
                texture,
                view,
                format: spec.format,
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        let oom_scope = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        let targets = Self {
            width: plan.width,
            height: plan.height,
            generation,
            scene_color: create(scene_color),
            scene_depth: create(scene_depth),
            bokeh_depth: create(bokeh_depth),
            bokeh_depth_z: create(bokeh_depth_z),
            output: output.map(create),
        };

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(err) = pollster::block_on(oom_scope.pop()) {
            return Err(BokehError::TargetAllocationFailed(err.to_string()));
        }

        log::info!(
            "Allocated compositor targets {}x{} (generation {generation})",
            plan.width,
            plan.height
        );
        Ok(targets)
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bumped on every reallocation; bind groups sampling these targets
    /// are rebuilt when it changes.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn get(&self, slot: TargetSlot) -> Option<&RenderTarget> {
        match slot {
            TargetSlot::SceneColor => Some(&self.scene_color),
            TargetSlot::SceneDepth => Some(&self.scene_depth),
            TargetSlot::BokehDepth => Some(&self.bokeh_depth),
            TargetSlot::BokehDepthZ => Some(&self.bokeh_depth_z),
            TargetSlot::Output => self.output.as_ref(),
        }
    }

    /// Like [`get`](Self::get), but a missing buffer is an error.
    pub fn require(&self, slot: TargetSlot) -> Result<&RenderTarget> {
        self.get(slot).ok_or(BokehError::MissingTarget(slot.label()))
    }

    /// Sizes of every allocated buffer, in slot order.
    #[must_use]
    pub fn allocated_sizes(&self) -> Vec<(TargetSlot, u32, u32)> {
        [
            TargetSlot::SceneColor,
            TargetSlot::SceneDepth,
            TargetSlot::BokehDepth,
            TargetSlot::BokehDepthZ,
            TargetSlot::Output,
        ]
        .into_iter()
        .filter_map(|slot| {
            self.get(slot).map(|t| {
                let size = t.texture.size();
                (slot, size.width, size.height)
            })
        })
        .collect()
    }
}
