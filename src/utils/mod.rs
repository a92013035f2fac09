//! Utility Module
//!
//! - [`Timer`]: monotonic clock for the frame driver
//! - [`OrbitControls`]: damped orbit camera control
//! - [`Input`]: pointer state fed by the windowing frontend
//! - [`color`]: sRGB helpers

pub mod color;
pub mod input;
pub mod orbit_control;
pub mod time;

pub use input::{Input, PointerButton};
pub use orbit_control::OrbitControls;
pub use time::Timer;
