//! GPU resource management for the wgpu picking target.
//!
//! Headless device setup, off-screen attachments, a growable vertex
//! stream, and the flat-color picking pass.

/// Off-screen wgpu target implementing the hidden-target contract.
pub mod picking_target;
/// Headless wgpu device and queue initialization.
pub mod render_context;
/// Color and depth attachment textures.
pub mod texture;
/// Growable typed vertex buffer.
pub mod vertex_stream;

pub use picking_target::GpuPickingTarget;
pub use render_context::{RenderContext, RenderContextError};
