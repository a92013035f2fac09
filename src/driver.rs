//! Frame Driver
//!
//! One [`FrameDriver::tick`] per display refresh:
//!
//! 1. read the monotonic clock
//! 2. record the delta since the previous tick
//! 3. write elapsed seconds into the terrain `time` uniform
//! 4. advance camera control
//! 5. render all passes
//!
//! Rescheduling is the caller's business (the winit frontend requests the
//! next redraw). The driver keeps no state besides the clock and the last
//! elapsed value; `time` is written before anything is rendered, so both
//! terrain programs see the same value within a frame.

use crate::errors::Result;
use crate::renderer::FrameOutcome;
use crate::scene::camera::PerspectiveCamera;

/// Monotonic time source.
pub trait Clock {
    /// Seconds since the clock started. Never decreases.
    fn elapsed_seconds(&mut self) -> f32;
}

/// Per-frame camera integration, e.g. damped orbit controls.
pub trait CameraControl {
    /// Mutates the camera in place. Returns whether it moved.
    fn update(&mut self, camera: &mut PerspectiveCamera) -> bool;
}

/// What the driver advances each tick.
pub trait FrameTarget {
    fn set_time(&mut self, elapsed: f32);
    fn camera_mut(&mut self) -> &mut PerspectiveCamera;
    fn render_frame(&mut self) -> Result<FrameOutcome>;
}

#[derive(Debug)]
pub struct FrameDriver<C: Clock> {
    clock: C,
    last_elapsed: f32,
    delta: f32,
    frames: u64,
}

impl<C: Clock> FrameDriver<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            last_elapsed: 0.0,
            delta: 0.0,
            frames: 0,
        }
    }

    /// Runs one frame. A render error aborts the frame and is returned.
    pub fn tick<T: FrameTarget + ?Sized>(
        &mut self,
        target: &mut T,
        control: Option<&mut dyn CameraControl>,
    ) -> Result<FrameOutcome> {
        let elapsed = self.clock.elapsed_seconds();
        self.delta = elapsed - self.last_elapsed;
        self.last_elapsed = elapsed;

        target.set_time(elapsed);
        if let Some(control) = control {
            control.update(target.camera_mut());
        }

        let outcome = target.render_frame()?;
        self.frames += 1;
        Ok(outcome)
    }

    /// Elapsed seconds read by the last tick.
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.last_elapsed
    }

    /// Seconds between the last two ticks. Recorded, not consumed.
    #[inline]
    #[must_use]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Frames rendered so far.
    #[inline]
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
