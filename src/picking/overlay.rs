//! The mirrored visible/hidden canvas pair.

use glam::Vec3;

use super::id::{decode, ObjectId};
use super::target::PickTarget;
use crate::camera::{Camera, Ortho, Perspective};
use crate::canvas::{Canvas, Color, HiddenTarget, PixelRegion, SoftwareCanvas};
use crate::error::PickError;
use crate::geometry::Shape;
use crate::gpu::{GpuPickingTarget, RenderContext};
use crate::options::{PickerOptions, ReadbackMode};
use crate::transform::TransformOp;

/// A visible canvas shadowed by a hidden, per-object-colored replica.
///
/// Every transform goes to both targets in the same order, and every
/// primitive is drawn twice: with the caller's material on the visible
/// canvas and with its ID color on the hidden one. The two canvases are
/// only reachable by shared reference, so nothing outside the overlay can
/// push them out of sync.
///
/// Per frame: [`begin_frame`](Self::begin_frame), then transforms and
/// draws, then queries. A query issued mid-frame sees only what has been
/// drawn so far.
pub struct PickingOverlay<V, H> {
    visible: V,
    hidden: H,
    width: u32,
    height: u32,
    readback: ReadbackMode,
    frame_started: bool,
    frame_count: u64,
    depth: usize,
    /// Last pointer position over the canvas.
    pointer: Option<(f32, f32)>,
}

impl PickingOverlay<SoftwareCanvas, SoftwareCanvas> {
    /// Software visible canvas and software hidden target, both
    /// `width × height`.
    ///
    /// # Errors
    ///
    /// [`PickError::InvalidDimensions`] if either dimension is zero.
    pub fn initialize(width: u32, height: u32) -> Result<Self, PickError> {
        let visible = SoftwareCanvas::new(width, height)?;
        let hidden = SoftwareCanvas::new(width, height)?;
        Self::from_parts(visible, hidden)
    }

    /// Software pair sized and configured from `options`.
    ///
    /// # Errors
    ///
    /// [`PickError::InvalidDimensions`] if the configured size has a zero
    /// dimension.
    pub fn from_options(options: &PickerOptions) -> Result<Self, PickError> {
        let (width, height) = (options.canvas.width, options.canvas.height);
        Ok(Self::initialize(width, height)?
            .with_readback(options.picking.readback))
    }
}

impl PickingOverlay<SoftwareCanvas, GpuPickingTarget> {
    /// Software visible canvas with a wgpu hidden target on a headless
    /// device.
    ///
    /// # Errors
    ///
    /// [`PickError::Gpu`] if no adapter or device is available,
    /// [`PickError::InvalidDimensions`] for a zero-sized canvas.
    pub async fn headless_gpu(width: u32, height: u32) -> Result<Self, PickError> {
        let context = RenderContext::headless().await?;
        let visible = SoftwareCanvas::new(width, height)?;
        let hidden = GpuPickingTarget::new(context, width, height)?;
        Self::from_parts(visible, hidden)
    }
}

impl<V, H> PickingOverlay<V, H>
where
    V: Canvas,
    H: HiddenTarget,
{
    /// Pair an existing visible canvas with a hidden target and force both
    /// to pixel density 1, so that readback coordinates match logical
    /// coordinates.
    ///
    /// # Errors
    ///
    /// [`PickError::InvalidDimensions`] for a zero-sized canvas,
    /// [`PickError::DimensionMismatch`] if the two sizes differ.
    pub fn from_parts(mut visible: V, mut hidden: H) -> Result<Self, PickError> {
        let (width, height) = visible.size();
        if width == 0 || height == 0 {
            return Err(PickError::InvalidDimensions { width, height });
        }
        if hidden.size() != (width, height) {
            return Err(PickError::DimensionMismatch {
                visible: (width, height),
                hidden: hidden.size(),
            });
        }
        visible.set_pixel_density(1.0);
        hidden.set_pixel_density(1.0);
        if hidden.drawing_buffer_size() != (width, height) {
            log::warn!(
                "hidden drawing buffer is {:?} for a {width}x{height} canvas; \
                 picks may be offset",
                hidden.drawing_buffer_size()
            );
        }
        log::debug!("picking overlay initialized at {width}x{height}");

        Ok(Self {
            visible,
            hidden,
            width,
            height,
            readback: ReadbackMode::default(),
            frame_started: false,
            frame_count: 0,
            depth: 0,
            pointer: None,
        })
    }

    /// Choose how queries read the hidden target.
    #[must_use]
    pub fn with_readback(mut self, readback: ReadbackMode) -> Self {
        self.readback = readback;
        self
    }

    /// Canvas width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Active readback strategy.
    #[must_use]
    pub fn readback(&self) -> ReadbackMode {
        self.readback
    }

    /// Frames begun so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The visible canvas, for presenting.
    #[must_use]
    pub fn visible(&self) -> &V {
        &self.visible
    }

    /// The hidden target.
    #[must_use]
    pub fn hidden(&self) -> &H {
        &self.hidden
    }

    /// Last pointer position recorded by
    /// [`pointer_moved`](Self::pointer_moved), `None` once it has left.
    #[must_use]
    pub fn pointer(&self) -> Option<(f32, f32)> {
        self.pointer
    }

    /// Give both canvases back.
    #[must_use]
    pub fn into_parts(self) -> (V, H) {
        (self.visible, self.hidden)
    }

    /// Clear the visible canvas to `background` and the hidden target to
    /// black, and reset both model stacks. Camera and projection persist.
    pub fn begin_frame(&mut self, background: Color) {
        self.visible.background(background);
        self.hidden.background(Color::BLACK);
        self.visible.apply_transform(&TransformOp::Reset);
        self.hidden.apply_transform(&TransformOp::Reset);
        self.depth = 0;
        self.frame_started = true;
        self.frame_count += 1;
    }

    /// Apply `op` to both canvases.
    ///
    /// # Errors
    ///
    /// [`PickError::FrameNotStarted`] for a model op before the first
    /// [`begin_frame`](Self::begin_frame); [`PickError::StackUnderflow`]
    /// for a `Pop` with no matching `Push`. Neither canvas is touched when
    /// an error is returned.
    pub fn apply(&mut self, op: TransformOp) -> Result<(), PickError> {
        if !op.is_persistent() && !self.frame_started {
            return Err(PickError::FrameNotStarted);
        }
        match op {
            TransformOp::Push => self.depth += 1,
            TransformOp::Pop => {
                self.depth = self
                    .depth
                    .checked_sub(1)
                    .ok_or(PickError::StackUnderflow)?;
            }
            TransformOp::Reset => self.depth = 0,
            _ => {}
        }
        self.visible.apply_transform(&op);
        self.hidden.apply_transform(&op);
        Ok(())
    }

    /// Translate both canvases.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn translate(&mut self, x: f32, y: f32, z: f32) -> Result<(), PickError> {
        self.apply(TransformOp::Translate { x, y, z })
    }

    /// Rotate both canvases about x by `angle` radians.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn rotate_x(&mut self, angle: f32) -> Result<(), PickError> {
        self.apply(TransformOp::RotateX { angle })
    }

    /// Rotate both canvases about y by `angle` radians.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn rotate_y(&mut self, angle: f32) -> Result<(), PickError> {
        self.apply(TransformOp::RotateY { angle })
    }

    /// Rotate both canvases about z by `angle` radians.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn rotate_z(&mut self, angle: f32) -> Result<(), PickError> {
        self.apply(TransformOp::RotateZ { angle })
    }

    /// Rotate both canvases about `axis` by `angle` radians.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn rotate(&mut self, angle: f32, axis: Vec3) -> Result<(), PickError> {
        self.apply(TransformOp::Rotate { angle, axis })
    }

    /// Scale both canvases.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn scale(&mut self, x: f32, y: f32, z: f32) -> Result<(), PickError> {
        self.apply(TransformOp::Scale { x, y, z })
    }

    /// Save the model matrix on both canvases.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn push(&mut self) -> Result<(), PickError> {
        self.apply(TransformOp::Push)
    }

    /// Restore the model matrix on both canvases.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn pop(&mut self) -> Result<(), PickError> {
        self.apply(TransformOp::Pop)
    }

    /// Reset the model matrix on both canvases mid-frame.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn reset_matrix(&mut self) -> Result<(), PickError> {
        self.apply(TransformOp::Reset)
    }

    /// Move the camera on both canvases.
    ///
    /// # Errors
    ///
    /// Never fails; camera ops are allowed before the first frame.
    pub fn set_camera(&mut self, camera: Camera) -> Result<(), PickError> {
        self.apply(TransformOp::SetCamera(camera))
    }

    /// Switch both canvases to an orthographic projection.
    ///
    /// # Errors
    ///
    /// Never fails; projection ops are allowed before the first frame.
    pub fn set_ortho(&mut self, ortho: Ortho) -> Result<(), PickError> {
        self.apply(TransformOp::SetOrtho(ortho))
    }

    /// Switch both canvases to a perspective projection.
    ///
    /// # Errors
    ///
    /// Never fails; projection ops are allowed before the first frame.
    pub fn set_perspective(
        &mut self,
        perspective: Perspective,
    ) -> Result<(), PickError> {
        self.apply(TransformOp::SetPerspective(perspective))
    }

    /// Make `material` active on the visible canvas only.
    pub fn set_visible_material(&mut self, material: &V::Material) {
        self.visible.set_material(material);
    }

    /// Draw `shape` on the visible canvas with its current material and on
    /// the hidden target filled with `id`'s color.
    ///
    /// # Errors
    ///
    /// [`PickError::FrameNotStarted`] before the first
    /// [`begin_frame`](Self::begin_frame).
    pub fn draw(&mut self, id: ObjectId, shape: &Shape) -> Result<(), PickError> {
        if !self.frame_started {
            return Err(PickError::FrameNotStarted);
        }
        self.visible.draw_shape(shape);
        self.hidden.set_material(&id.to_color());
        self.hidden.draw_shape(shape);
        Ok(())
    }

    /// [`draw`](Self::draw) with an unvalidated integer ID.
    ///
    /// # Errors
    ///
    /// [`PickError::ReservedId`] / [`PickError::IdOutOfRange`] for IDs that
    /// cannot be encoded, otherwise as [`draw`](Self::draw).
    pub fn draw_primitive(
        &mut self,
        raw_id: u32,
        shape: &Shape,
    ) -> Result<(), PickError> {
        self.draw(ObjectId::new(raw_id)?, shape)
    }

    /// Draw a box.
    ///
    /// # Errors
    ///
    /// See [`draw`](Self::draw).
    pub fn draw_box(
        &mut self,
        id: ObjectId,
        width: f32,
        height: f32,
        depth: f32,
    ) -> Result<(), PickError> {
        self.draw(
            id,
            &Shape::Box {
                width,
                height,
                depth,
            },
        )
    }

    /// Draw a plane.
    ///
    /// # Errors
    ///
    /// See [`draw`](Self::draw).
    pub fn draw_plane(
        &mut self,
        id: ObjectId,
        width: f32,
        height: f32,
    ) -> Result<(), PickError> {
        self.draw(id, &Shape::Plane { width, height })
    }

    /// Draw a sphere.
    ///
    /// # Errors
    ///
    /// See [`draw`](Self::draw).
    pub fn draw_sphere(&mut self, id: ObjectId, radius: f32) -> Result<(), PickError> {
        self.draw(id, &Shape::sphere(radius))
    }

    /// Draw a capped cylinder.
    ///
    /// # Errors
    ///
    /// See [`draw`](Self::draw).
    pub fn draw_cylinder(
        &mut self,
        id: ObjectId,
        radius: f32,
        height: f32,
    ) -> Result<(), PickError> {
        self.draw(id, &Shape::cylinder(radius, height))
    }

    /// Draw a capped cone.
    ///
    /// # Errors
    ///
    /// See [`draw`](Self::draw).
    pub fn draw_cone(
        &mut self,
        id: ObjectId,
        radius: f32,
        height: f32,
    ) -> Result<(), PickError> {
        self.draw(id, &Shape::cone(radius, height))
    }

    /// Draw an ellipsoid.
    ///
    /// # Errors
    ///
    /// See [`draw`](Self::draw).
    pub fn draw_ellipsoid(
        &mut self,
        id: ObjectId,
        radius_x: f32,
        radius_y: f32,
        radius_z: f32,
    ) -> Result<(), PickError> {
        self.draw(id, &Shape::ellipsoid(radius_x, radius_y, radius_z))
    }

    /// Draw a torus.
    ///
    /// # Errors
    ///
    /// See [`draw`](Self::draw).
    pub fn draw_torus(
        &mut self,
        id: ObjectId,
        radius: f32,
        tube_radius: f32,
    ) -> Result<(), PickError> {
        self.draw(id, &Shape::torus(radius, tube_radius))
    }

    /// ID of the nearest object at canvas point `(x, y)`, 0 for none.
    ///
    /// Points outside `[0, width) × [0, height)` (and NaN) return 0 without
    /// touching the hidden target.
    ///
    /// # Errors
    ///
    /// [`PickError::Readback`] if the hidden target fails to deliver
    /// pixels.
    pub fn try_query_object_at(&mut self, x: f32, y: f32) -> Result<u32, PickError> {
        let in_bounds = x >= 0.0
            && y >= 0.0
            && x < self.width as f32
            && y < self.height as f32;
        if !in_bounds {
            return Ok(0);
        }
        let (col, row_from_top) = (x.floor() as u32, y.floor() as u32);
        let (buffer_width, buffer_height) = self.hidden.drawing_buffer_size();
        if col >= buffer_width || row_from_top >= buffer_height {
            return Ok(0);
        }
        // Readback rows are bottom-up; canvas rows are top-down.
        let row = buffer_height - 1 - row_from_top;
        let region = match self.readback {
            ReadbackMode::FullBuffer => {
                PixelRegion::full(buffer_width, buffer_height)
            }
            ReadbackMode::SinglePixel => PixelRegion::pixel(col, row),
        };
        let pixels = self.hidden.read_pixels(region)?;
        let id = pixels
            .rgba_at(col, row)
            .map_or(0, |c| decode([c.r, c.g, c.b]));
        log::trace!("pick ({x}, {y}) -> {id}");
        Ok(id)
    }

    /// [`try_query_object_at`](Self::try_query_object_at), degrading
    /// readback failures to 0 ("no object") after logging them.
    pub fn query_object_at(&mut self, x: f32, y: f32) -> u32 {
        self.try_query_object_at(x, y).unwrap_or_else(|e| {
            log::error!("picking readback at ({x}, {y}) failed: {e}");
            0
        })
    }

    /// Typed result of [`query_object_at`](Self::query_object_at).
    pub fn pick(&mut self, x: f32, y: f32) -> PickTarget {
        PickTarget::resolve(self.query_object_at(x, y))
    }

    /// Record a pointer move over the canvas.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer = Some((x, y));
    }

    /// Record the pointer leaving the canvas.
    pub fn pointer_left(&mut self) {
        self.pointer = None;
    }

    /// ID under the pointer, 0 if none or the pointer is off-canvas.
    pub fn object_at_pointer(&mut self) -> u32 {
        match self.pointer {
            Some((x, y)) => self.query_object_at(x, y),
            None => 0,
        }
    }
}
