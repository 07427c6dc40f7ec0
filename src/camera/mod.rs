//! Camera for the viewer: a fixed-direction perspective camera whose
//! distance is the zoom.

/// Core camera struct, zoom bounds and GPU uniform types.
pub mod core;

pub use self::core::{Camera, CameraUniform, ZOOM_MAX, ZOOM_MIN};
