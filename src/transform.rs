//! Transform operations and the per-target transform stack.
//!
//! Each target keeps its own [`TransformStack`]; the picking overlay feeds
//! the same [`TransformOp`] sequence to both so their matrices stay equal.

use glam::{Mat4, Vec3};

use crate::camera::{Camera, Ortho, Perspective, Projection};
use crate::error::PickError;

/// One transform-mutating call.
///
/// Model ops post-multiply the current model matrix, so the last op issued
/// is the first one applied to a primitive's vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    /// Translate by `(x, y, z)`.
    Translate {
        /// X offset.
        x: f32,
        /// Y offset.
        y: f32,
        /// Z offset.
        z: f32,
    },
    /// Rotate about the x axis by `angle` radians.
    RotateX {
        /// Angle in radians.
        angle: f32,
    },
    /// Rotate about the y axis by `angle` radians.
    RotateY {
        /// Angle in radians.
        angle: f32,
    },
    /// Rotate about the z axis by `angle` radians.
    RotateZ {
        /// Angle in radians.
        angle: f32,
    },
    /// Rotate about an arbitrary axis by `angle` radians.
    Rotate {
        /// Angle in radians.
        angle: f32,
        /// Rotation axis; need not be normalized.
        axis: Vec3,
    },
    /// Non-uniform scale.
    Scale {
        /// X factor.
        x: f32,
        /// Y factor.
        y: f32,
        /// Z factor.
        z: f32,
    },
    /// Save the current model matrix.
    Push,
    /// Restore the most recently saved model matrix.
    Pop,
    /// Reset the model matrix to identity and drop saved matrices.
    Reset,
    /// Replace the camera.
    SetCamera(Camera),
    /// Switch to an orthographic projection.
    SetOrtho(Ortho),
    /// Switch to a perspective projection.
    SetPerspective(Perspective),
}

impl TransformOp {
    /// Rotation about +z, the 2D-style `rotate(angle)`.
    #[must_use]
    pub fn rotate(angle: f32) -> Self {
        Self::Rotate {
            angle,
            axis: Vec3::Z,
        }
    }

    /// Uniform scale.
    #[must_use]
    pub fn scale_uniform(s: f32) -> Self {
        Self::Scale { x: s, y: s, z: s }
    }

    /// Camera and projection state outlives a frame; everything else is
    /// model state that `begin_frame` wipes.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(
            self,
            Self::SetCamera(_) | Self::SetOrtho(_) | Self::SetPerspective(_)
        )
    }
}

/// Model matrix stack plus the view and projection in effect.
#[derive(Debug, Clone)]
pub struct TransformStack {
    model: Mat4,
    saved: Vec<Mat4>,
    camera: Camera,
    projection: Projection,
}

impl TransformStack {
    /// Identity model, default camera and default perspective for a
    /// `width × height` canvas.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            model: Mat4::IDENTITY,
            saved: Vec::new(),
            camera: Camera::default_for(height),
            projection: Projection::Perspective(Perspective::default_for(
                width, height,
            )),
        }
    }

    /// Apply one op.
    ///
    /// # Errors
    ///
    /// [`PickError::StackUnderflow`] when popping an empty stack; the
    /// stack is left unchanged.
    pub fn apply(&mut self, op: &TransformOp) -> Result<(), PickError> {
        match *op {
            TransformOp::Translate { x, y, z } => {
                self.model *= Mat4::from_translation(Vec3::new(x, y, z));
            }
            TransformOp::RotateX { angle } => {
                self.model *= Mat4::from_rotation_x(angle);
            }
            TransformOp::RotateY { angle } => {
                self.model *= Mat4::from_rotation_y(angle);
            }
            TransformOp::RotateZ { angle } => {
                self.model *= Mat4::from_rotation_z(angle);
            }
            TransformOp::Rotate { angle, axis } => {
                if let Some(axis) = axis.try_normalize() {
                    self.model *= Mat4::from_axis_angle(axis, angle);
                } else {
                    log::warn!("ignoring rotation about zero-length axis");
                }
            }
            TransformOp::Scale { x, y, z } => {
                self.model *= Mat4::from_scale(Vec3::new(x, y, z));
            }
            TransformOp::Push => self.saved.push(self.model),
            TransformOp::Pop => {
                self.model = self.saved.pop().ok_or(PickError::StackUnderflow)?;
            }
            TransformOp::Reset => self.reset(),
            TransformOp::SetCamera(camera) => self.camera = camera,
            TransformOp::SetOrtho(ortho) => {
                self.projection = Projection::Ortho(ortho);
            }
            TransformOp::SetPerspective(perspective) => {
                self.projection = Projection::Perspective(perspective);
            }
        }
        Ok(())
    }

    /// Identity model matrix, empty push stack. Camera and projection are
    /// kept.
    pub fn reset(&mut self) {
        self.model = Mat4::IDENTITY;
        self.saved.clear();
    }

    /// Number of unmatched pushes.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Current model matrix.
    #[must_use]
    pub fn model(&self) -> Mat4 {
        self.model
    }

    /// Current camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Current projection.
    #[must_use]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Combined model-view-projection matrix.
    #[must_use]
    pub fn model_view_projection(&self) -> Mat4 {
        self.projection.matrix() * self.camera.view_matrix() * self.model
    }
}
