use crate::errors::{BokehError, Result};
use crate::resources::geometry::{Geometry, TerrainVertex};

/// Largest segment count per side whose vertex indices still fit in `u32`.
pub const MAX_PLANE_SEGMENTS: u32 = 16_384;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneOptions {
    pub width: f32,
    pub height: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for PlaneOptions {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            width_segments: 1,
            height_segments: 1,
        }
    }
}

/// Builds a subdivided grid lying in the XZ plane, facing +Y.
///
/// Row `iy = 0` sits at `z = -height / 2` (far edge), matching a vertical
/// plane rotated by -90° around X. The UV `v` axis runs from 1 at the far
/// edge to 0 at the near edge.
pub fn create_plane(options: PlaneOptions) -> Result<Geometry> {
    if !(options.width.is_finite() && options.width > 0.0)
        || !(options.height.is_finite() && options.height > 0.0)
    {
        return Err(BokehError::InvalidTerrainParams(format!(
            "plane size must be positive, got {}x{}",
            options.width, options.height
        )));
    }
    let grid_x = options.width_segments;
    let grid_y = options.height_segments;
    if grid_x == 0 || grid_y == 0 || grid_x > MAX_PLANE_SEGMENTS || grid_y > MAX_PLANE_SEGMENTS {
        return Err(BokehError::InvalidTerrainParams(format!(
            "plane segments must lie in 1..={MAX_PLANE_SEGMENTS}, got {grid_x}x{grid_y}"
        )));
    }

    let width_half = options.width / 2.0;
    let height_half = options.height / 2.0;

    let grid_x1 = grid_x + 1;
    let grid_y1 = grid_y + 1;

    let segment_width = options.width / grid_x as f32;
    let segment_height = options.height / grid_y as f32;

    let mut vertices = Vec::with_capacity((grid_x1 * grid_y1) as usize);
    let mut indices = Vec::with_capacity((grid_x * grid_y * 6) as usize);

    for iy in 0..grid_y1 {
        let z = iy as f32 * segment_height - height_half;
        for ix in 0..grid_x1 {
            let x = ix as f32 * segment_width - width_half;
            vertices.push(TerrainVertex {
                position: [x, 0.0, z],
                normal: [0.0, 1.0, 0.0],
                uv: [ix as f32 / grid_x as f32, 1.0 - (iy as f32 / grid_y as f32)],
            });
        }
    }

    for iy in 0..grid_y {
        for ix in 0..grid_x {
            let a = ix + grid_x1 * iy;
            let b = ix + grid_x1 * (iy + 1);
            let c = (ix + 1) + grid_x1 * (iy + 1);
            let d = (ix + 1) + grid_x1 * iy;

            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    Ok(Geometry::new(vertices, indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_is_horizontal_and_counter_clockwise_from_above() {
        let geo = create_plane(PlaneOptions {
            width_segments: 2,
            height_segments: 3,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(geo.vertices().len(), 3 * 4);
        assert_eq!(geo.indices().len(), 2 * 3 * 6);
        assert!(geo.vertices().iter().all(|v| v.position[1] == 0.0));

        // First triangle (a, b, d) must face +Y.
        let p = |i: u32| glam::Vec3::from_array(geo.vertices()[i as usize].position);
        let [a, b, d] = [geo.indices()[0], geo.indices()[1], geo.indices()[2]];
        let n = (p(b) - p(a)).cross(p(d) - p(a));
        assert!(n.y > 0.0);
    }

    #[test]
    fn zero_segments_are_rejected() {
        let err = create_plane(PlaneOptions {
            width_segments: 0,
            ..Default::default()
        });
        assert!(err.is_err());
    }
}
