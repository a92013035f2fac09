use glam::{Affine3A, Mat3, Mat4, Quat, Vec3};

/// Position, rotation and scale with a cached model matrix.
///
/// The scene is flat (no parent links), so the cached matrix is also the
/// world matrix.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    matrix: Affine3A,
    /// TRS the cached matrix was built from; `None` until the first update.
    built_from: Option<(Vec3, Quat, Vec3)>,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            matrix: Affine3A::IDENTITY,
            built_from: None,
        }
    }

    /// Rebuilds the cached matrix when position, rotation or scale moved
    /// since the last call. Returns whether it was rebuilt.
    pub fn update_matrix(&mut self) -> bool {
        let trs = (self.position, self.rotation, self.scale);
        if self.built_from == Some(trs) {
            return false;
        }
        self.matrix = Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position);
        self.built_from = Some(trs);
        true
    }

    pub fn set_uniform_scale(&mut self, s: f32) {
        self.scale = Vec3::splat(s);
    }

    #[inline]
    #[must_use]
    pub fn matrix_as_mat4(&self) -> Mat4 {
        Mat4::from(self.matrix)
    }

    /// Turns -Z towards `target`. Leaves the rotation alone when `target`
    /// coincides with the position or lies along `up`.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        let right = forward.cross(up);
        if right.length_squared() < 1e-8 {
            return;
        }
        let right = right.normalize();
        let up = right.cross(forward);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, up, -forward));
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
