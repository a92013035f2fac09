use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::errors::{BokehError, Result};
use crate::resources::uniforms::FrameUniforms;
use crate::scene::transform::Transform;

/// Construction parameters of the perspective camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Vertical field of view, in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Orbit damping factor, in `(0, 1]`.
    pub damping: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_y: 75.0,
            near: 0.1,
            far: 100.0,
            position: [1.0, 1.0, 1.0],
            target: [0.0, 0.0, 0.0],
            damping: 0.05,
        }
    }
}

impl CameraSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.fov_y > 0.0 && self.fov_y < 180.0) {
            return Err(BokehError::InvalidCameraParams(format!(
                "camera fov_y must lie in (0, 180), got {}",
                self.fov_y
            )));
        }
        if !(self.near > 0.0 && self.far > self.near && self.far.is_finite()) {
            return Err(BokehError::InvalidCameraParams(format!(
                "camera clip planes must satisfy 0 < near < far, got {} / {}",
                self.near, self.far
            )));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(BokehError::InvalidCameraParams(format!(
                "camera damping must lie in (0, 1], got {}",
                self.damping
            )));
        }
        Ok(())
    }
}

/// Perspective camera.
///
/// Projection uses the standard `[0, 1]` depth range with depth cleared to 1.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub transform: Transform,
    /// Vertical field of view, in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub(crate) view_matrix: Mat4,
    pub(crate) projection_matrix: Mat4,
    pub(crate) view_projection_matrix: Mat4,
}

impl PerspectiveCamera {
    /// `fov` is in degrees.
    #[must_use]
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            transform: Transform::new(),
            fov: fov.to_radians(),
            aspect,
            near,
            far,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }

    #[must_use]
    pub fn from_settings(settings: &CameraSettings, aspect: f32) -> Self {
        let mut cam = Self::new(settings.fov_y, aspect, settings.near, settings.far);
        cam.transform.position = Vec3::from_array(settings.position);
        cam.transform.look_at(Vec3::from_array(settings.target), Vec3::Y);
        cam.update_matrices();
        cam
    }

    /// Changes the aspect ratio and rebuilds the projection.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far);
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
    }

    /// Refreshes the view matrix from the transform.
    pub fn update_matrices(&mut self) {
        self.transform.update_matrix();
        self.view_matrix = self.transform.matrix_as_mat4().inverse();
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    #[inline]
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    #[inline]
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    #[inline]
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_projection_matrix
    }

    /// Packs the per-frame camera block.
    #[must_use]
    pub fn frame_uniforms(&self) -> FrameUniforms {
        FrameUniforms {
            view_projection: self.view_projection_matrix,
            view: self.view_matrix,
            camera_position: self.transform.position,
            near: self.near,
            far: self.far,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_at_target() {
        let cam = PerspectiveCamera::from_settings(&CameraSettings::default(), 1.0);
        let origin = cam.view_matrix().transform_point3(Vec3::ZERO);
        // In view space the target lies straight ahead on -Z.
        assert!(origin.x.abs() < 1e-5);
        assert!(origin.y.abs() < 1e-5);
        assert!((origin.z + 3.0_f32.sqrt()).abs() < 1e-5);
    }
}
