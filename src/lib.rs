// Lint policy lives in Cargo.toml under [lints].

//! Color-ID object picking for immediate-mode 3D scenes.
//!
//! Mirrorpick pairs a visible canvas with a hidden render target that
//! replays every transform and primitive, filling each primitive with a flat
//! color that encodes a 24-bit object ID. Reading a single pixel of the
//! hidden target answers "which object is under this point?" with correct
//! depth occlusion and no geometric intersection math.
//!
//! # Key entry points
//!
//! - [`picking::PickingOverlay`] - the mirrored canvas pair and its queries
//! - [`picking::ObjectId`] - a validated, encodable object ID
//! - [`canvas::Canvas`] / [`canvas::HiddenTarget`] - the drawing contracts
//!   both sides implement
//! - [`gpu::GpuPickingTarget`] - an off-screen wgpu hidden target
//! - [`options::PickerOptions`] - TOML-backed overlay configuration
//!
//! # Frame lifecycle
//!
//! [`PickingOverlay::begin_frame`] clears both targets and resets the model
//! stacks. Transforms and draws then go to both sides in lockstep, and
//! [`PickingOverlay::query_object_at`] reads back whatever has been drawn so
//! far. Camera and projection settings persist across frames.

pub mod camera;
pub mod canvas;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod options;
pub mod picking;
pub mod transform;

pub use canvas::{Canvas, Color, HiddenTarget, SoftwareCanvas};
pub use error::PickError;
pub use picking::{ObjectId, PickTarget, PickingOverlay};
