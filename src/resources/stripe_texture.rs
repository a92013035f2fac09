//! Procedural Stripe Texture
//!
//! Generates the small RGBA raster that drives terrain coloring and
//! displacement: one opaque "big" line across the top band, followed by
//! `lines_count - 1` translucent "small" lines spread evenly over the
//! remaining height.
//!
//! ```text
//!  row 0 ┌──────────────┐
//!        │██████████████│  big line (primary, opaque)
//!  bigPx ├──────────────┤
//!        │              │
//!        │▒▒▒▒▒▒▒▒▒▒▒▒▒▒│  small line 1 (secondary, alpha)
//!        │              │
//!        │▒▒▒▒▒▒▒▒▒▒▒▒▒▒│  small line 2
//!        │     ...      │
//!  H     └──────────────┘
//! ```
//!
//! The raster is regenerated on demand, never per frame. Regeneration
//! bumps the texture version; the renderer re-uploads the GPU copy on the
//! next frame when it sees a newer version.
//!
//! The texture is sampled with repeat wrapping on both axes, so the raster
//! must stay tileable: every band spans the full width.

use std::ops::Range;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{BokehError, Result};
use crate::resources::version_tracker::ChangeTracker;

/// Upper bound for either raster dimension.
pub const MAX_STRIPE_TEXTURE_SIZE: u32 = 4096;

/// Bytes per pixel of the raster (RGBA8, straight alpha).
pub const BYTES_PER_PIXEL: usize = 4;

/// Construction-time parameters of the stripe texture.
///
/// Line widths are fractions of the texture height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripeTextureSettings {
    /// Total number of lines including the big one. Must be at least 1.
    pub lines_count: u32,
    /// Height of the big line, as a fraction of the texture height.
    pub big_line_width: f32,
    /// Height of each small line, as a fraction of the texture height.
    pub small_line_width: f32,
    /// Opacity of the small lines, in `[0, 1]`.
    pub small_line_alpha: f32,
    pub width: u32,
    pub height: u32,
    /// Color of the big line.
    pub primary_color: [u8; 3],
    /// Color of the small lines.
    pub secondary_color: [u8; 3],
}

impl Default for StripeTextureSettings {
    fn default() -> Self {
        Self {
            lines_count: 5,
            big_line_width: 0.04,
            small_line_width: 0.01,
            small_line_alpha: 0.5,
            width: 32,
            height: 128,
            primary_color: [0, 0, 255],
            secondary_color: [255, 255, 255],
        }
    }
}

impl StripeTextureSettings {
    /// Checks every parameter domain.
    ///
    /// Out-of-domain parameters are rejected rather than clamped, so a
    /// raster is only ever produced from parameters that mean something.
    pub fn validate(&self) -> Result<()> {
        if self.lines_count == 0 {
            return Err(BokehError::InvalidTextureParams(
                "lines_count must be at least 1".into(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(BokehError::InvalidTextureParams(format!(
                "texture size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > MAX_STRIPE_TEXTURE_SIZE || self.height > MAX_STRIPE_TEXTURE_SIZE {
            return Err(BokehError::InvalidTextureParams(format!(
                "texture size {}x{} exceeds {MAX_STRIPE_TEXTURE_SIZE}",
                self.width, self.height
            )));
        }
        check_unit("big_line_width", self.big_line_width)?;
        check_unit("small_line_width", self.small_line_width)?;
        check_unit("small_line_alpha", self.small_line_alpha)?;
        Ok(())
    }

    /// Computes the row bands of every line.
    ///
    /// Bands are clipped to the texture height; a small line whose offset
    /// falls past the bottom edge is dropped.
    #[must_use]
    pub fn layout(&self) -> StripeLayout {
        let height = f64::from(self.height);
        let big_px = round_px(height * f64::from(self.big_line_width)).min(self.height);
        let small_px = round_px(height * f64::from(self.small_line_width));

        let spacing = (height - f64::from(big_px)) / f64::from(self.lines_count.max(1));
        let small_lines = self.lines_count.saturating_sub(1);

        let small_bands = (0..small_lines)
            .filter_map(|i| {
                let start = big_px + round_px(spacing * f64::from(i + 1));
                if start >= self.height {
                    return None;
                }
                let end = start.saturating_add(small_px).min(self.height);
                Some(start..end)
            })
            .collect();

        StripeLayout {
            big_band: 0..big_px,
            small_bands,
        }
    }
}

fn check_unit(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(BokehError::InvalidTextureParams(format!(
            "{name} must lie in [0, 1], got {value}"
        )))
    }
}

fn round_px(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

/// Row ranges occupied by the lines of a stripe texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripeLayout {
    pub big_band: Range<u32>,
    pub small_bands: Vec<Range<u32>>,
}

/// A plain RGBA8 raster, row-major, row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterBuffer {
    /// Creates a fully transparent raster.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
        }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the RGBA value of one pixel.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Resets every pixel to transparent black, reallocating only when the
    /// size changed.
    fn clear(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data
            .resize(width as usize * height as usize * BYTES_PER_PIXEL, 0);
    }

    /// Composites a solid color over the given rows with source-over
    /// blending.
    fn fill_rows(&mut self, rows: Range<u32>, color: [u8; 3], alpha: f32) {
        for y in rows {
            for x in 0..self.width {
                let i = self.offset(x, y);
                let dst = [
                    self.data[i],
                    self.data[i + 1],
                    self.data[i + 2],
                    self.data[i + 3],
                ];
                let out = source_over(color, alpha, dst);
                self.data[i..i + BYTES_PER_PIXEL].copy_from_slice(&out);
            }
        }
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }
}

/// Straight-alpha source-over compositing of a solid color onto `dst`.
fn source_over(src: [u8; 3], src_alpha: f32, dst: [u8; 4]) -> [u8; 4] {
    let sa = src_alpha.clamp(0.0, 1.0);
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }

    let channel = |s: u8, d: u8| -> u8 {
        let c = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };

    [
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}

/// Generates a fresh raster from the given settings.
pub fn generate(settings: &StripeTextureSettings) -> Result<RasterBuffer> {
    let mut raster = RasterBuffer::new(settings.width, settings.height);
    generate_into(settings, &mut raster)?;
    Ok(raster)
}

fn generate_into(settings: &StripeTextureSettings, raster: &mut RasterBuffer) -> Result<()> {
    settings.validate()?;
    raster.clear(settings.width, settings.height);

    let layout = settings.layout();
    raster.fill_rows(layout.big_band.clone(), settings.primary_color, 1.0);
    for band in layout.small_bands {
        raster.fill_rows(band, settings.secondary_color, settings.small_line_alpha);
    }
    Ok(())
}

/// The stripe texture as owned by the scene: settings, a persistent
/// raster, and a version the GPU mirror compares against.
#[derive(Debug, Clone)]
pub struct StripeTexture {
    settings: StripeTextureSettings,
    raster: RasterBuffer,
    tracker: ChangeTracker,
}

impl StripeTexture {
    /// Validates the settings and generates the initial raster.
    pub fn new(settings: StripeTextureSettings) -> Result<Self> {
        let raster = generate(&settings)?;
        log::debug!(
            "Generated stripe texture {}x{} with {} lines",
            settings.width,
            settings.height,
            settings.lines_count
        );
        Ok(Self {
            settings,
            raster,
            tracker: ChangeTracker::new(),
        })
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &StripeTextureSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn raster(&self) -> &RasterBuffer {
        &self.raster
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.tracker.version()
    }

    /// Replaces the settings and regenerates the raster in place.
    ///
    /// On error the previous settings and raster are kept untouched.
    pub fn set_settings(&mut self, settings: StripeTextureSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        self.regenerate()
    }

    /// Regenerates the raster from the current settings.
    ///
    /// The GPU copy is not touched here; it is re-uploaded by the renderer
    /// on the next frame because the version changed.
    pub fn regenerate(&mut self) -> Result<()> {
        generate_into(&self.settings, &mut self.raster)?;
        self.tracker.changed();
        Ok(())
    }

    /// Writes the raster to a PNG file for inspection.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        image::save_buffer(
            path.as_ref(),
            self.raster.data(),
            self.raster.width(),
            self.raster.height(),
            image::ExtendedColorType::Rgba8,
        )?;
        log::info!("Stripe texture written to {}", path.as_ref().display());
        Ok(())
    }
}
