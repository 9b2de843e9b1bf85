use std::f32::consts::FRAC_PI_6;

use glam::{Mat4, Vec3};

/// Camera placement: eye position, look-at center, and up direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye (camera) position in world space.
    pub eye: Vec3,
    /// Look-at target position.
    pub center: Vec3,
    /// Up direction vector.
    pub up: Vec3,
}

impl Camera {
    /// Camera looking down -z at the origin from the distance where a
    /// `height`-tall slab at z = 0 exactly fills a 60° vertical field of
    /// view.
    #[must_use]
    pub fn default_for(height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, default_eye_z(height)),
            center: Vec3::ZERO,
            up: Vec3::Y,
        }
    }

    /// World-to-view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.center, self.up)
    }
}

/// Distance of the default camera from the origin for a canvas `height`.
#[must_use]
pub fn default_eye_z(height: u32) -> f32 {
    (height as f32 / 2.0) / FRAC_PI_6.tan()
}

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perspective {
    /// Vertical field of view in radians.
    pub fovy: f32,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Near clipping plane distance.
    pub near: f32,
    /// Far clipping plane distance.
    pub far: f32,
}

impl Perspective {
    /// 60° field of view with near/far at a tenth and ten times the
    /// default eye distance.
    #[must_use]
    pub fn default_for(width: u32, height: u32) -> Self {
        let eye_z = default_eye_z(height);
        Self {
            fovy: 2.0 * FRAC_PI_6,
            aspect: width as f32 / height.max(1) as f32,
            near: eye_z / 10.0,
            far: eye_z * 10.0,
        }
    }
}

/// Orthographic projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ortho {
    /// Left clipping plane.
    pub left: f32,
    /// Right clipping plane.
    pub right: f32,
    /// Bottom clipping plane.
    pub bottom: f32,
    /// Top clipping plane.
    pub top: f32,
    /// Near clipping plane distance.
    pub near: f32,
    /// Far clipping plane distance.
    pub far: f32,
}

impl Ortho {
    /// One world unit per pixel, depth range `0..max(width, height)`.
    #[must_use]
    pub fn default_for(width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        Self {
            left: -w / 2.0,
            right: w / 2.0,
            bottom: -h / 2.0,
            top: h / 2.0,
            near: 0.0,
            far: w.max(h),
        }
    }
}

/// Active projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective frustum.
    Perspective(Perspective),
    /// Orthographic box.
    Ortho(Ortho),
}

impl Projection {
    /// View-to-clip matrix with `[0, 1]` depth and +y pointing down the
    /// screen.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        let base = match *self {
            Self::Perspective(p) => {
                Mat4::perspective_rh(p.fovy, p.aspect, p.near, p.far)
            }
            Self::Ortho(o) => Mat4::orthographic_rh(
                o.left, o.right, o.bottom, o.top, o.near, o.far,
            ),
        };
        Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0)) * base
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4Swizzles;

    use super::*;

    #[test]
    fn default_eye_distance_matches_sixty_degree_fov() {
        let eye_z = default_eye_z(600);
        assert!((eye_z - 519.615_2).abs() < 1e-2);
        let camera = Camera::default_for(600);
        assert_eq!(camera.eye, Vec3::new(0.0, 0.0, eye_z));
    }

    #[test]
    fn positive_y_projects_below_center() {
        let camera = Camera::default_for(600);
        let proj = Projection::Perspective(Perspective::default_for(800, 600));
        let vp = proj.matrix() * camera.view_matrix();
        let clip = vp * Vec3::new(0.0, 100.0, 0.0).extend(1.0);
        let ndc = clip.xyz() / clip.w;
        assert!(ndc.y < 0.0);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn default_perspective_maps_half_height_to_edge() {
        let camera = Camera::default_for(600);
        let proj = Projection::Perspective(Perspective::default_for(800, 600));
        let vp = proj.matrix() * camera.view_matrix();
        let clip = vp * Vec3::new(400.0, -300.0, 0.0).extend(1.0);
        let ndc = clip.xyz() / clip.w;
        assert!((ndc.x - 1.0).abs() < 1e-4);
        assert!((ndc.y - 1.0).abs() < 1e-4);
    }

    #[test]
    fn default_ortho_is_one_unit_per_pixel() {
        let camera = Camera::default_for(600);
        let proj = Projection::Ortho(Ortho::default_for(800, 600));
        let vp = proj.matrix() * camera.view_matrix();
        let clip = vp * Vec3::new(200.0, 0.0, 0.0).extend(1.0);
        assert!((clip.x / clip.w - 0.5).abs() < 1e-5);
    }
}
