pub mod plane;

pub use plane::{MAX_PLANE_SEGMENTS, PlaneOptions, create_plane};
