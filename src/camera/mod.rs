//! Camera placement and projection.
//!
//! Defaults follow the usual creative-coding WEBGL conventions: the origin
//! sits at the canvas center, +y points down the screen, and the default
//! camera makes one world unit cover one pixel at z = 0.

/// Camera, perspective and orthographic projection types.
pub mod core;

pub use self::core::{default_eye_z, Camera, Ortho, Perspective, Projection};
