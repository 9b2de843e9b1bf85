//! Depth-tested flat-fill triangle rasterizer.
//!
//! Storage is top-down (row 0 is the top of the image); readback converts
//! to the bottom-up order that pixel-readback APIs return.

use glam::{Vec3, Vec4, Vec4Swizzles};

use super::{Color, PixelBuffer, PixelRegion};
use crate::error::PickError;

/// Clip-space triangles smaller than this (in squared pixels) are dropped.
const MIN_AREA: f32 = 1e-8;

pub(super) struct Raster {
    width: u32,
    height: u32,
    color: Vec<[u8; 4]>,
    depth: Vec<f32>,
}

impl Raster {
    pub(super) fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            color: vec![Color::BLACK.to_array(); len],
            depth: vec![1.0; len],
        }
    }

    pub(super) fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(super) fn clear(&mut self, color: Color) {
        self.color.fill(color.to_array());
        self.depth.fill(1.0);
    }

    /// Top-down pixel lookup.
    pub(super) fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.color.get(index).copied().map(Color::from_array)
    }

    /// Rasterize a clip-space triangle, clipping against the near plane.
    pub(super) fn draw_triangle(&mut self, clip: [Vec4; 3], color: Color) {
        let polygon = clip_near(clip);
        if polygon.len() < 3 {
            return;
        }
        let screen: Vec<Vec3> =
            polygon.iter().map(|&v| self.to_screen(v)).collect();
        for i in 1..screen.len() - 1 {
            self.fill([screen[0], screen[i], screen[i + 1]], color);
        }
    }

    pub(super) fn read(
        &self,
        region: PixelRegion,
    ) -> Result<PixelBuffer, PickError> {
        if !region.fits_within(self.width, self.height) {
            return Err(PickError::Readback(format!(
                "region {region:?} outside {}x{} buffer",
                self.width, self.height
            )));
        }
        let mut data =
            Vec::with_capacity(4 * region.width as usize * region.height as usize);
        for row in region.y..region.y + region.height {
            let top_down = (self.height - 1 - row) as usize;
            let start = top_down * self.width as usize + region.x as usize;
            for px in &self.color[start..start + region.width as usize] {
                data.extend_from_slice(px);
            }
        }
        Ok(PixelBuffer { region, data })
    }

    /// Clip space to `(pixel x, pixel y, depth)` with y growing downward.
    fn to_screen(&self, v: Vec4) -> Vec3 {
        let ndc = v.xyz() / v.w;
        Vec3::new(
            (ndc.x + 1.0) * 0.5 * self.width as f32,
            (1.0 - ndc.y) * 0.5 * self.height as f32,
            ndc.z,
        )
    }

    fn fill(&mut self, [a, b, c]: [Vec3; 3], color: Color) {
        let area = edge(a, b, c);
        if area.abs() < MIN_AREA || !area.is_finite() {
            return;
        }
        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as u32;
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as u32;
        let max_x = (a.x.max(b.x).max(c.x).ceil() as u32).min(self.width);
        let max_y = (a.y.max(b.y).max(c.y).ceil() as u32).min(self.height);

        let rgba = color.to_array();
        for py in min_y..max_y {
            for px in min_x..max_x {
                let p = Vec3::new(px as f32 + 0.5, py as f32 + 0.5, 0.0);
                let w0 = edge(b, c, p) / area;
                let w1 = edge(c, a, p) / area;
                let w2 = edge(a, b, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let z = w0 * a.z + w1 * b.z + w2 * c.z;
                if !(0.0..=1.0).contains(&z) {
                    continue;
                }
                let index = py as usize * self.width as usize + px as usize;
                if z < self.depth[index] {
                    self.depth[index] = z;
                    self.color[index] = rgba;
                }
            }
        }
    }
}

/// Twice the signed area of `(a, b, p)` in screen space.
fn edge(a: Vec3, b: Vec3, p: Vec3) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Sutherland–Hodgman against `z >= 0`, the near plane for `[0, 1]` depth.
fn clip_near(tri: [Vec4; 3]) -> Vec<Vec4> {
    let inside = |v: Vec4| v.z >= 0.0 && v.w > 0.0;
    let mut out = Vec::with_capacity(4);
    for i in 0..3 {
        let cur = tri[i];
        let next = tri[(i + 1) % 3];
        match (inside(cur), inside(next)) {
            (true, true) => out.push(next),
            (true, false) => out.push(intersect(cur, next)),
            (false, true) => {
                out.push(intersect(cur, next));
                out.push(next);
            }
            (false, false) => {}
        }
    }
    out
}

fn intersect(a: Vec4, b: Vec4) -> Vec4 {
    let t = a.z / (a.z - b.z);
    a.lerp(b, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    /// Triangle in NDC at depth `z` covering the whole viewport.
    fn full_screen(z: f32) -> [Vec4; 3] {
        [
            Vec4::new(-1.0, -1.0, z, 1.0),
            Vec4::new(3.0, -1.0, z, 1.0),
            Vec4::new(-1.0, 3.0, z, 1.0),
        ]
    }

    #[test]
    fn nearer_triangle_wins_regardless_of_order() {
        let mut raster = Raster::new(8, 8);
        raster.draw_triangle(full_screen(0.2), RED);
        raster.draw_triangle(full_screen(0.6), BLUE);
        assert_eq!(raster.pixel(4, 4), Some(RED));

        raster.clear(Color::BLACK);
        raster.draw_triangle(full_screen(0.6), BLUE);
        raster.draw_triangle(full_screen(0.2), RED);
        assert_eq!(raster.pixel(4, 4), Some(RED));
    }

    #[test]
    fn triangle_behind_near_plane_is_dropped() {
        let mut raster = Raster::new(4, 4);
        raster.draw_triangle(full_screen(-0.5), RED);
        assert_eq!(raster.pixel(1, 1), Some(Color::BLACK));
    }

    #[test]
    fn partially_clipped_triangle_still_draws_visible_part() {
        let mut raster = Raster::new(4, 4);
        let mut tri = full_screen(0.5);
        tri[2].z = -0.5;
        raster.draw_triangle(tri, RED);
        assert_eq!(raster.pixel(0, 3), Some(RED));
    }

    #[test]
    fn upper_half_triangle_lands_in_top_rows() {
        let mut raster = Raster::new(4, 4);
        // Covers NDC y in [0, 1] only, i.e. the top two rows.
        raster.draw_triangle(
            [
                Vec4::new(-1.0, 0.0, 0.5, 1.0),
                Vec4::new(3.0, 0.0, 0.5, 1.0),
                Vec4::new(-1.0, 2.0, 0.5, 1.0),
            ],
            RED,
        );
        assert_eq!(raster.pixel(0, 0), Some(RED));
        assert_eq!(raster.pixel(0, 3), Some(Color::BLACK));

        // Readback is bottom-up, so the top row is the last one.
        let buffer = raster.read(PixelRegion::full(4, 4)).unwrap();
        assert_eq!(buffer.rgba_at(0, 3), Some(RED));
        assert_eq!(buffer.rgba_at(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn read_outside_buffer_fails() {
        let raster = Raster::new(4, 4);
        assert!(matches!(
            raster.read(PixelRegion::pixel(4, 0)),
            Err(PickError::Readback(_))
        ));
    }
}
