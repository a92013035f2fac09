use crate::errors::{BokehError, Result};

/// Largest device pixel ratio any sized resource is allocated for.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Logical viewport size plus the effective (clamped) pixel ratio.
///
/// Every sized resource reads its dimensions from here: the camera aspect,
/// the compositor buffers and the blur pass depth target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    pixel_ratio: f32,
}

impl Viewport {
    /// Creates a viewport from a logical size and the device pixel ratio
    /// reported by the platform. The ratio is clamped to [`MAX_PIXEL_RATIO`].
    pub fn new(width: u32, height: u32, device_pixel_ratio: f32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BokehError::InvalidViewport(format!(
                "viewport size must be non-zero, got {width}x{height}"
            )));
        }
        if !device_pixel_ratio.is_finite() || device_pixel_ratio <= 0.0 {
            return Err(BokehError::InvalidViewport(format!(
                "device pixel ratio must be finite and positive, got {device_pixel_ratio}"
            )));
        }
        Ok(Self {
            width,
            height,
            pixel_ratio: device_pixel_ratio.min(MAX_PIXEL_RATIO),
        })
    }

    /// Creates a viewport from a window's physical size and scale factor,
    /// as reported by winit. A non-zero physical size never maps to a zero
    /// logical size.
    pub fn from_physical(physical_width: u32, physical_height: u32, scale_factor: f64) -> Result<Self> {
        if !scale_factor.is_finite() || scale_factor <= 0.0 {
            return Err(BokehError::InvalidViewport(format!(
                "scale factor must be finite and positive, got {scale_factor}"
            )));
        }
        let logical = |px: u32| ((f64::from(px) / scale_factor).round() as u32).max(px.min(1));
        Self::new(
            logical(physical_width),
            logical(physical_height),
            scale_factor as f32,
        )
    }

    /// Logical width.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Logical height.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Clamped pixel ratio.
    #[inline]
    #[must_use]
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Size every compositor buffer is allocated with:
    /// `(width * ratio, height * ratio)`, rounded, at least 1.
    #[must_use]
    pub fn physical_extent(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f32 * self.pixel_ratio).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }

    #[inline]
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_clamped() {
        let vp = Viewport::new(1920, 1080, 3.0).unwrap();
        assert_eq!(vp.pixel_ratio(), 2.0);
        assert_eq!(vp.physical_extent(), (3840, 2160));
    }

    #[test]
    fn fractional_ratio_rounds() {
        let vp = Viewport::new(101, 33, 1.5).unwrap();
        assert_eq!(vp.physical_extent(), (152, 50));
    }

    #[test]
    fn from_physical_recovers_logical_size() {
        let vp = Viewport::from_physical(5760, 3240, 3.0).unwrap();
        assert_eq!((vp.width(), vp.height()), (1920, 1080));
        assert_eq!(vp.physical_extent(), (3840, 2160));
    }

    #[test]
    fn sub_pixel_window_keeps_one_logical_pixel() {
        let vp = Viewport::from_physical(1, 1, 3.0).unwrap();
        assert_eq!((vp.width(), vp.height()), (1, 1));
        assert_eq!(vp.physical_extent(), (2, 2));

        assert!(Viewport::from_physical(0, 1, 3.0).is_err());
    }

    #[test]
    fn degenerate_input_is_rejected() {
        assert!(Viewport::new(0, 600, 1.0).is_err());
        assert!(Viewport::new(800, 600, 0.0).is_err());
        assert!(Viewport::new(800, 600, f32::NAN).is_err());
        assert!(Viewport::from_physical(800, 600, -1.0).is_err());
    }
}
