use glam::{Vec2, Vec3};

use crate::driver::CameraControl;
use crate::scene::camera::PerspectiveCamera;
use crate::utils::input::{Input, PointerButton};

const POLAR_EPS: f32 = 0.0001;

/// Damped orbit around a target point.
///
/// Pointer input accumulates in [`input`](Self::input) between frames.
/// Each [`update`](CameraControl::update) applies a `damping_factor` share
/// of the pending rotation and keeps the rest for later frames, so motion
/// eases out after the pointer stops.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub min_distance: f32,
    pub max_distance: f32,

    pub center: Vec3,
    pub radius: f32,
    /// Azimuth around +Y, measured from +Z.
    pub theta: f32,
    /// Polar angle from +Y.
    pub phi: f32,

    pub input: Input,
    rotate_delta: Vec2,
}

impl OrbitControls {
    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            pan_speed: 1.0,
            damping_factor: 0.05,
            enable_damping: true,
            min_distance: 0.1,
            max_distance: 1000.0,

            center,
            radius,
            theta: 0.0,
            phi: std::f32::consts::FRAC_PI_2,

            input: Input::new(),
            rotate_delta: Vec2::ZERO,
        }
    }

    /// Orbit that reproduces the current `position` looking at `target`.
    #[must_use]
    pub fn looking_at(position: Vec3, target: Vec3, damping_factor: f32) -> Self {
        let offset = position - target;
        let radius = offset.length().max(POLAR_EPS);
        let mut controls = Self::new(target, radius);
        controls.theta = offset.x.atan2(offset.z);
        controls.phi = (offset.y / radius).clamp(-1.0, 1.0).acos();
        controls.damping_factor = damping_factor;
        controls.enable_damping = damping_factor > 0.0;
        controls
    }

    fn offset(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta) * self.radius
    }

    /// Rotation still waiting to be applied.
    #[must_use]
    pub fn pending_rotation(&self) -> Vec2 {
        self.rotate_delta
    }
}

impl CameraControl for OrbitControls {
    fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let screen_height = self.input.screen_size.y.max(1.0);

        if self.input.is_pressed(PointerButton::Primary) {
            let rotate_per_pixel = std::f32::consts::TAU / screen_height;
            self.rotate_delta -= self.input.cursor_delta * rotate_per_pixel * self.rotate_speed;
        }

        if self.enable_damping {
            let applied = self.rotate_delta * self.damping_factor;
            self.theta += applied.x;
            self.phi += applied.y;
            self.rotate_delta -= applied;
        } else {
            self.theta += self.rotate_delta.x;
            self.phi += self.rotate_delta.y;
            self.rotate_delta = Vec2::ZERO;
        }
        self.phi = self.phi.clamp(POLAR_EPS, std::f32::consts::PI - POLAR_EPS);

        let scroll = self.input.scroll_delta;
        if scroll != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(scroll.abs());
            if scroll > 0.0 {
                self.radius *= scale;
            } else {
                self.radius /= scale;
            }
            self.radius = self.radius.clamp(self.min_distance, self.max_distance);
        }

        if self.input.is_pressed(PointerButton::Secondary) {
            let world_height = 2.0 * self.radius * (camera.fov / 2.0).tan();
            let pixels_to_world = world_height / screen_height;

            let forward = -self.offset().normalize_or_zero();
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward).normalize_or_zero();

            let delta = self.input.cursor_delta;
            self.center += (right * -delta.x + up * delta.y) * pixels_to_world * self.pan_speed;
        }

        self.input.end_frame();

        let position = self.center + self.offset();
        let moved = !position.abs_diff_eq(camera.transform.position, 1e-7);
        camera.transform.position = position;
        camera.transform.look_at(self.center, Vec3::Y);
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(position: Vec3) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0);
        camera.transform.position = position;
        camera.transform.look_at(Vec3::ZERO, Vec3::Y);
        camera
    }

    #[test]
    fn idle_controls_keep_the_camera_in_place() {
        let start = Vec3::ONE;
        let mut camera = camera_at(start);
        let mut controls = OrbitControls::looking_at(start, Vec3::ZERO, 0.05);

        controls.update(&mut camera);
        assert!(camera.transform.position.abs_diff_eq(start, 1e-5));
    }

    #[test]
    fn damping_spreads_rotation_over_frames() {
        let start = Vec3::new(0.0, 0.0, 2.0);
        let mut camera = camera_at(start);
        let mut controls = OrbitControls::looking_at(start, Vec3::ZERO, 0.05);
        controls.input.handle_resize(100, 100);

        controls.input.handle_button(PointerButton::Primary, true);
        controls.input.handle_cursor_move(50.0, 50.0);
        controls.input.handle_cursor_move(40.0, 50.0);
        controls.update(&mut camera);
        controls.input.handle_button(PointerButton::Primary, false);

        let after_first = controls.theta;
        assert!(after_first > 0.0);
        assert!(controls.pending_rotation().x > 0.0);

        for _ in 0..10 {
            controls.update(&mut camera);
        }
        assert!(controls.theta > after_first);
        assert!((camera.transform.position.length() - 2.0).abs() < 1e-4);
    }
}
