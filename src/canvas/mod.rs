//! Render-target abstraction shared by the visible canvas and the hidden
//! picking target.
//!
//! A [`Canvas`] is anything that keeps a transform stack and draws
//! [`Shape`]s. A [`HiddenTarget`] is a canvas whose material is a flat
//! [`Color`] and whose pixels can be read back.

mod raster;
mod software;

pub use software::SoftwareCanvas;

use crate::error::PickError;
use crate::geometry::Shape;
use crate::transform::TransformOp;

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque black, the hidden target's "no object" color.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with explicit alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque gray.
    #[must_use]
    pub const fn gray(v: u8) -> Self {
        Self::rgb(v, v, v)
    }

    /// Channels as a byte array.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Build from a byte array.
    #[must_use]
    pub const fn from_array([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Rectangle of a drawing buffer in bottom-up coordinates: `y = 0` is the
/// bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    /// Leftmost column.
    pub x: u32,
    /// Bottom row.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRegion {
    /// The whole `width × height` buffer.
    #[must_use]
    pub const fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// A single pixel.
    #[must_use]
    pub const fn pixel(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            width: 1,
            height: 1,
        }
    }

    /// Whether the region lies inside a `width × height` buffer.
    #[must_use]
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x.checked_add(self.width).is_some_and(|right| right <= width)
            && self
                .y
                .checked_add(self.height)
                .is_some_and(|top| top <= height)
    }

    /// Whether the region contains buffer pixel `(x, y)`.
    #[must_use]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x
            && y >= self.y
            && x - self.x < self.width
            && y - self.y < self.height
    }
}

/// RGBA8 pixels read back from a drawing buffer, row-major with the bottom
/// row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Region of the drawing buffer these pixels cover.
    pub region: PixelRegion,
    /// `4 × width × height` bytes.
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Color at buffer pixel `(x, y)` (bottom-up), if inside the region.
    #[must_use]
    pub fn rgba_at(&self, x: u32, y: u32) -> Option<Color> {
        if !self.region.contains(x, y) {
            return None;
        }
        let local_x = (x - self.region.x) as usize;
        let local_y = (y - self.region.y) as usize;
        let index = 4 * (local_y * self.region.width as usize + local_x);
        let px = self.data.get(index..index + 4)?;
        Some(Color::rgba(px[0], px[1], px[2], px[3]))
    }
}

/// A 3D drawing surface with its own transform stack.
pub trait Canvas {
    /// Whatever the canvas accepts as the active material for subsequent
    /// shapes.
    type Material;

    /// Logical size in CSS-style pixels.
    fn size(&self) -> (u32, u32);

    /// Ratio of drawing-buffer pixels to logical pixels.
    fn pixel_density(&self) -> f32;

    /// Change the pixel density, reallocating the drawing buffer.
    fn set_pixel_density(&mut self, density: f32);

    /// Size of the drawing buffer in device pixels.
    fn drawing_buffer_size(&self) -> (u32, u32);

    /// Clear color and depth.
    fn background(&mut self, color: Color);

    /// Apply one transform op to this canvas's stack.
    fn apply_transform(&mut self, op: &TransformOp);

    /// Make `material` active for subsequent shapes.
    fn set_material(&mut self, material: &Self::Material);

    /// Draw `shape` with the active material under the current transform.
    fn draw_shape(&mut self, shape: &Shape);
}

/// An off-screen canvas drawn with flat colors and read back for picking.
pub trait HiddenTarget: Canvas<Material = Color> {
    /// Read `region` of the drawing buffer as bottom-up RGBA8 rows.
    ///
    /// # Errors
    ///
    /// [`PickError::Readback`] if the region falls outside the drawing
    /// buffer or the backend fails to deliver the pixels.
    fn read_pixels(
        &mut self,
        region: PixelRegion,
    ) -> Result<PixelBuffer, PickError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_bounds() {
        assert!(PixelRegion::full(4, 3).fits_within(4, 3));
        assert!(!PixelRegion::pixel(4, 0).fits_within(4, 3));
        assert!(!PixelRegion::pixel(0, u32::MAX).fits_within(4, 3));
        assert!(PixelRegion::pixel(2, 1).contains(2, 1));
        assert!(!PixelRegion::pixel(2, 1).contains(1, 1));
    }

    #[test]
    fn pixel_buffer_indexes_bottom_up_rows() {
        // 2x2 buffer, bottom row first: (0,0) red, (1,0) green,
        // (0,1) blue, (1,1) white.
        let buffer = PixelBuffer {
            region: PixelRegion::full(2, 2),
            data: vec![
                255, 0, 0, 255, 0, 255, 0, 255, //
                0, 0, 255, 255, 255, 255, 255, 255,
            ],
        };
        assert_eq!(buffer.rgba_at(0, 0), Some(Color::rgb(255, 0, 0)));
        assert_eq!(buffer.rgba_at(1, 0), Some(Color::rgb(0, 255, 0)));
        assert_eq!(buffer.rgba_at(0, 1), Some(Color::rgb(0, 0, 255)));
        assert_eq!(buffer.rgba_at(1, 1), Some(Color::WHITE));
        assert_eq!(buffer.rgba_at(2, 0), None);
    }

    #[test]
    fn sub_region_uses_local_offsets() {
        let buffer = PixelBuffer {
            region: PixelRegion::pixel(5, 7),
            data: vec![1, 2, 3, 4],
        };
        assert_eq!(buffer.rgba_at(5, 7), Some(Color::rgba(1, 2, 3, 4)));
        assert_eq!(buffer.rgba_at(0, 0), None);
    }
}
