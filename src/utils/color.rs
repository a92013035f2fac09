use glam::Vec3;

/// sRGB transfer function, one channel in `[0, 1]`.
#[inline]
#[must_use]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Converts an 8-bit sRGB color to linear floats.
#[must_use]
pub fn srgb_u8_to_linear(rgb: [u8; 3]) -> Vec3 {
    Vec3::new(
        srgb_to_linear(f32::from(rgb[0]) / 255.0),
        srgb_to_linear(f32::from(rgb[1]) / 255.0),
        srgb_to_linear(f32::from(rgb[2]) / 255.0),
    )
}

/// Linear clear color for wgpu from an 8-bit sRGB color.
#[must_use]
pub fn clear_color_from_srgb(rgb: [u8; 3]) -> wgpu::Color {
    let c = srgb_u8_to_linear(rgb);
    wgpu::Color {
        r: f64::from(c.x),
        g: f64::from(c.y),
        b: f64::from(c.z),
        a: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_preserved() {
        assert_eq!(srgb_u8_to_linear([0, 0, 0]), Vec3::ZERO);
        assert!((srgb_u8_to_linear([255, 255, 255]) - Vec3::ONE).abs().max_element() < 1e-6);
    }

    #[test]
    fn mid_grey_is_darker_in_linear() {
        let c = srgb_u8_to_linear([0x11, 0x11, 0x11]);
        assert!(c.x > 0.0 && c.x < 0x11 as f32 / 255.0);
    }
}
