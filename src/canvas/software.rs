//! CPU canvas backed by the flat-fill rasterizer.

use super::raster::Raster;
use super::{Canvas, Color, HiddenTarget, PixelBuffer, PixelRegion};
use crate::error::PickError;
use crate::geometry::Shape;
use crate::transform::{TransformOp, TransformStack};

/// In-memory canvas with a color buffer, a depth buffer and a transform
/// stack.
///
/// Works both as a hidden picking target and as a stand-in visible canvas
/// (its material is a flat [`Color`]). Like `push()` in creative-coding
/// APIs, pushing the transform also saves the active material.
pub struct SoftwareCanvas {
    width: u32,
    height: u32,
    density: f32,
    raster: Raster,
    stack: TransformStack,
    material: Color,
    saved_materials: Vec<Color>,
}

impl SoftwareCanvas {
    /// Create a `width × height` canvas at pixel density 1.
    ///
    /// # Errors
    ///
    /// [`PickError::InvalidDimensions`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, PickError> {
        if width == 0 || height == 0 {
            return Err(PickError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            density: 1.0,
            raster: Raster::new(width, height),
            stack: TransformStack::new(width, height),
            material: Color::WHITE,
            saved_materials: Vec::new(),
        })
    }

    /// Current transform state.
    #[must_use]
    pub fn transform(&self) -> &TransformStack {
        &self.stack
    }

    /// Active material.
    #[must_use]
    pub fn material(&self) -> Color {
        self.material
    }

    /// Drawing-buffer pixel at `(x, y)`, top-down.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.raster.pixel(x, y)
    }
}

impl Canvas for SoftwareCanvas {
    type Material = Color;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn pixel_density(&self) -> f32 {
        self.density
    }

    fn set_pixel_density(&mut self, density: f32) {
        if !(density.is_finite() && density > 0.0) {
            log::warn!("ignoring invalid pixel density {density}");
            return;
        }
        if density == self.density {
            return;
        }
        self.density = density;
        let scaled = |v: u32| ((v as f32 * density).round() as u32).max(1);
        self.raster = Raster::new(scaled(self.width), scaled(self.height));
        log::debug!(
            "software canvas drawing buffer now {:?}",
            self.raster.size()
        );
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        self.raster.size()
    }

    fn background(&mut self, color: Color) {
        self.raster.clear(color);
    }

    fn apply_transform(&mut self, op: &TransformOp) {
        if let Err(e) = self.stack.apply(op) {
            log::warn!("software canvas ignored {op:?}: {e}");
            return;
        }
        match op {
            TransformOp::Push => self.saved_materials.push(self.material),
            TransformOp::Pop => {
                if let Some(material) = self.saved_materials.pop() {
                    self.material = material;
                }
            }
            TransformOp::Reset => self.saved_materials.clear(),
            _ => {}
        }
    }

    fn set_material(&mut self, material: &Color) {
        self.material = *material;
    }

    fn draw_shape(&mut self, shape: &Shape) {
        let mvp = self.stack.model_view_projection();
        let mesh = shape.tessellate();
        for [a, b, c] in mesh.triangles() {
            self.raster.draw_triangle(
                [mvp * a.extend(1.0), mvp * b.extend(1.0), mvp * c.extend(1.0)],
                self.material,
            );
        }
    }
}

impl HiddenTarget for SoftwareCanvas {
    fn read_pixels(
        &mut self,
        region: PixelRegion,
    ) -> Result<PixelBuffer, PickError> {
        self.raster.read(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(
            SoftwareCanvas::new(0, 10),
            Err(PickError::InvalidDimensions {
                width: 0,
                height: 10
            })
        ));
    }

    #[test]
    fn density_scales_drawing_buffer() {
        let mut canvas = SoftwareCanvas::new(100, 50).unwrap();
        canvas.set_pixel_density(2.0);
        assert_eq!(canvas.size(), (100, 50));
        assert_eq!(canvas.drawing_buffer_size(), (200, 100));
        canvas.set_pixel_density(-1.0);
        assert_eq!(canvas.pixel_density(), 2.0);
    }

    #[test]
    fn cube_at_origin_covers_center_pixel() {
        let mut canvas = SoftwareCanvas::new(200, 100).unwrap();
        canvas.background(Color::gray(40));
        canvas.set_material(&Color::rgb(10, 20, 30));
        canvas.draw_shape(&Shape::cube(20.0));
        assert_eq!(canvas.pixel(100, 50), Some(Color::rgb(10, 20, 30)));
        assert_eq!(canvas.pixel(0, 0), Some(Color::gray(40)));
    }

    #[test]
    fn push_pop_restores_material() {
        let mut canvas = SoftwareCanvas::new(10, 10).unwrap();
        canvas.set_material(&Color::rgb(1, 2, 3));
        canvas.apply_transform(&TransformOp::Push);
        canvas.set_material(&Color::rgb(4, 5, 6));
        canvas.apply_transform(&TransformOp::Pop);
        assert_eq!(canvas.material(), Color::rgb(1, 2, 3));
    }

    #[test]
    fn unmatched_pop_is_ignored() {
        let mut canvas = SoftwareCanvas::new(10, 10).unwrap();
        canvas.apply_transform(&TransformOp::Pop);
        assert_eq!(canvas.transform().depth(), 0);
    }

    #[test]
    fn translated_shape_moves_on_screen() {
        let mut canvas = SoftwareCanvas::new(200, 200).unwrap();
        canvas.background(Color::BLACK);
        canvas.apply_transform(&TransformOp::Translate {
            x: 50.0,
            y: 50.0,
            z: 0.0,
        });
        canvas.draw_shape(&Shape::square(20.0));
        // +x is right and +y is down at one unit per pixel.
        assert_eq!(canvas.pixel(150, 150), Some(Color::WHITE));
        assert_eq!(canvas.pixel(100, 100), Some(Color::BLACK));
    }
}
