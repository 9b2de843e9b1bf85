//! Color-ID picking.
//!
//! Every object is drawn a second time onto a hidden target, flat-filled
//! with a color that encodes its 24-bit ID. Reading one pixel of that target
//! back recovers the ID of the nearest object at that point; black (ID 0)
//! means nothing is there.

/// 24-bit object IDs and their color encoding.
pub mod id;
/// The visible/hidden canvas pair.
pub mod overlay;
/// Typed query results.
pub mod target;

pub use id::{decode, encode, ObjectId, MAX_OBJECT_ID};
pub use overlay::PickingOverlay;
pub use target::PickTarget;
