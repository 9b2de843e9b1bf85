//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the mirrorpick crate.
#[derive(Debug)]
pub enum PickError {
    /// A canvas or render target was requested with a zero dimension.
    InvalidDimensions {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// The visible canvas and hidden target disagree on size.
    DimensionMismatch {
        /// Visible canvas size.
        visible: (u32, u32),
        /// Hidden target size.
        hidden: (u32, u32),
    },
    /// Object ID 0 is reserved for "no object".
    ReservedId,
    /// Object ID does not fit in a 24-bit RGB color.
    IdOutOfRange(u32),
    /// A model transform or draw was issued before `begin_frame`.
    FrameNotStarted,
    /// `pop` was issued without a matching `push`.
    StackUnderflow,
    /// Pixel readback from the hidden target failed.
    Readback(String),
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
}

impl fmt::Display for PickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid canvas dimensions {width}x{height}")
            }
            Self::DimensionMismatch { visible, hidden } => write!(
                f,
                "visible canvas is {}x{} but hidden target is {}x{}",
                visible.0, visible.1, hidden.0, hidden.1
            ),
            Self::ReservedId => {
                write!(f, "object ID 0 is reserved for empty space")
            }
            Self::IdOutOfRange(id) => {
                write!(f, "object ID {id} does not fit in 24 bits")
            }
            Self::FrameNotStarted => {
                write!(f, "begin_frame must be called before drawing")
            }
            Self::StackUnderflow => {
                write!(f, "pop called without a matching push")
            }
            Self::Readback(msg) => write!(f, "pixel readback failed: {msg}"),
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for PickError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for PickError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for PickError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
