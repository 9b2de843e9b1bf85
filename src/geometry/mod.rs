//! Primitive shapes and their triangle tessellation.
//!
//! Shapes are described in their local frame, centered at the origin;
//! placement comes entirely from the transform stack. Tessellation only
//! needs positions because both backends draw flat fills.

mod primitives;

use glam::Vec3;

/// Default edge length / radius used by the shorthand constructors.
pub const DEFAULT_SIZE: f32 = 50.0;
/// Default tube radius of a torus.
pub const DEFAULT_TUBE_RADIUS: f32 = 10.0;
/// Default number of segments around a curved shape.
pub const DEFAULT_DETAIL_X: u32 = 24;
/// Default number of segments along a curved shape.
pub const DEFAULT_DETAIL_Y: u32 = 16;

/// A 3D primitive with its shape parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned box.
    Box {
        /// Extent along x.
        width: f32,
        /// Extent along y.
        height: f32,
        /// Extent along z.
        depth: f32,
    },
    /// Rectangle in the XY plane.
    Plane {
        /// Extent along x.
        width: f32,
        /// Extent along y.
        height: f32,
    },
    /// Sphere.
    Sphere {
        /// Radius.
        radius: f32,
        /// Segments around the y axis.
        detail_x: u32,
        /// Segments from pole to pole.
        detail_y: u32,
    },
    /// Cylinder along the y axis.
    Cylinder {
        /// Radius.
        radius: f32,
        /// Extent along y.
        height: f32,
        /// Segments around the y axis.
        detail_x: u32,
        /// Close the -y end.
        bottom_cap: bool,
        /// Close the +y end.
        top_cap: bool,
    },
    /// Cone along the y axis, apex toward -y.
    Cone {
        /// Base radius.
        radius: f32,
        /// Extent along y.
        height: f32,
        /// Segments around the y axis.
        detail_x: u32,
        /// Close the base.
        cap: bool,
    },
    /// Ellipsoid with independent radii.
    Ellipsoid {
        /// Radius along x.
        radius_x: f32,
        /// Radius along y.
        radius_y: f32,
        /// Radius along z.
        radius_z: f32,
        /// Segments around the y axis.
        detail_x: u32,
        /// Segments from pole to pole.
        detail_y: u32,
    },
    /// Torus lying in the XY plane.
    Torus {
        /// Distance from the center to the middle of the tube.
        radius: f32,
        /// Tube radius.
        tube_radius: f32,
        /// Segments around the ring.
        detail_x: u32,
        /// Segments around the tube.
        detail_y: u32,
    },
}

impl Shape {
    /// Cube with edge length `size`.
    #[must_use]
    pub fn cube(size: f32) -> Self {
        Self::Box {
            width: size,
            height: size,
            depth: size,
        }
    }

    /// Square plane with edge length `size`.
    #[must_use]
    pub fn square(size: f32) -> Self {
        Self::Plane {
            width: size,
            height: size,
        }
    }

    /// Sphere with default detail.
    #[must_use]
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere {
            radius,
            detail_x: DEFAULT_DETAIL_X,
            detail_y: DEFAULT_DETAIL_Y,
        }
    }

    /// Capped cylinder with default detail.
    #[must_use]
    pub fn cylinder(radius: f32, height: f32) -> Self {
        Self::Cylinder {
            radius,
            height,
            detail_x: DEFAULT_DETAIL_X,
            bottom_cap: true,
            top_cap: true,
        }
    }

    /// Capped cone with default detail.
    #[must_use]
    pub fn cone(radius: f32, height: f32) -> Self {
        Self::Cone {
            radius,
            height,
            detail_x: DEFAULT_DETAIL_X,
            cap: true,
        }
    }

    /// Ellipsoid with default detail.
    #[must_use]
    pub fn ellipsoid(radius_x: f32, radius_y: f32, radius_z: f32) -> Self {
        Self::Ellipsoid {
            radius_x,
            radius_y,
            radius_z,
            detail_x: DEFAULT_DETAIL_X,
            detail_y: DEFAULT_DETAIL_Y,
        }
    }

    /// Torus with default detail.
    #[must_use]
    pub fn torus(radius: f32, tube_radius: f32) -> Self {
        Self::Torus {
            radius,
            tube_radius,
            detail_x: DEFAULT_DETAIL_X,
            detail_y: DEFAULT_DETAIL_Y,
        }
    }

    /// `DEFAULT_SIZE` cube.
    #[must_use]
    pub fn default_box() -> Self {
        Self::cube(DEFAULT_SIZE)
    }

    /// `DEFAULT_SIZE` square plane.
    #[must_use]
    pub fn default_plane() -> Self {
        Self::square(DEFAULT_SIZE)
    }

    /// Sphere of radius `DEFAULT_SIZE`.
    #[must_use]
    pub fn default_sphere() -> Self {
        Self::sphere(DEFAULT_SIZE)
    }

    /// Cylinder with radius and height `DEFAULT_SIZE`.
    #[must_use]
    pub fn default_cylinder() -> Self {
        Self::cylinder(DEFAULT_SIZE, DEFAULT_SIZE)
    }

    /// Cone with radius and height `DEFAULT_SIZE`.
    #[must_use]
    pub fn default_cone() -> Self {
        Self::cone(DEFAULT_SIZE, DEFAULT_SIZE)
    }

    /// Ellipsoid with all three radii `DEFAULT_SIZE`.
    #[must_use]
    pub fn default_ellipsoid() -> Self {
        Self::ellipsoid(DEFAULT_SIZE, DEFAULT_SIZE, DEFAULT_SIZE)
    }

    /// Torus of radius `DEFAULT_SIZE` and tube `DEFAULT_TUBE_RADIUS`.
    #[must_use]
    pub fn default_torus() -> Self {
        Self::torus(DEFAULT_SIZE, DEFAULT_TUBE_RADIUS)
    }

    /// Build the triangle mesh for this shape.
    #[must_use]
    pub fn tessellate(&self) -> Mesh {
        match *self {
            Self::Box {
                width,
                height,
                depth,
            } => primitives::cuboid(Vec3::new(width, height, depth) / 2.0),
            Self::Plane { width, height } => {
                primitives::plane(width / 2.0, height / 2.0)
            }
            Self::Sphere {
                radius,
                detail_x,
                detail_y,
            } => primitives::ellipsoid(Vec3::splat(radius), detail_x, detail_y),
            Self::Cylinder {
                radius,
                height,
                detail_x,
                bottom_cap,
                top_cap,
            } => primitives::frustum(
                radius,
                radius,
                height,
                detail_x,
                (bottom_cap, top_cap),
            ),
            Self::Cone {
                radius,
                height,
                detail_x,
                cap,
            } => primitives::frustum(0.0, radius, height, detail_x, (false, cap)),
            Self::Ellipsoid {
                radius_x,
                radius_y,
                radius_z,
                detail_x,
                detail_y,
            } => primitives::ellipsoid(
                Vec3::new(radius_x, radius_y, radius_z),
                detail_x,
                detail_y,
            ),
            Self::Torus {
                radius,
                tube_radius,
                detail_x,
                detail_y,
            } => primitives::torus(radius, tube_radius, detail_x, detail_y),
        }
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions in the shape's local frame.
    pub positions: Vec<Vec3>,
    /// Three indices per triangle.
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as position triples. Triangles referencing
    /// out-of-range vertices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            Some([
                *self.positions.get(tri[0] as usize)?,
                *self.positions.get(tri[1] as usize)?,
                *self.positions.get(tri[2] as usize)?,
            ])
        })
    }

    fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    fn push_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.push_triangle(a, b, c);
        self.push_triangle(a, c, d);
    }

    fn push_vertex(&mut self, p: Vec3) -> u32 {
        self.positions.push(p);
        (self.positions.len() - 1) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(mesh: &Mesh) -> (Vec3, Vec3) {
        mesh.positions.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(lo, hi), &p| (lo.min(p), hi.max(p)),
        )
    }

    #[test]
    fn cube_has_twelve_triangles_and_correct_extent() {
        let mesh = Shape::cube(100.0).tessellate();
        assert_eq!(mesh.triangle_count(), 12);
        let (lo, hi) = bounds(&mesh);
        assert_eq!(lo, Vec3::splat(-50.0));
        assert_eq!(hi, Vec3::splat(50.0));
    }

    #[test]
    fn plane_is_flat() {
        let mesh = Shape::square(10.0).tessellate();
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.positions.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = Shape::sphere(30.0).tessellate();
        assert!(mesh.triangle_count() > 0);
        for p in &mesh.positions {
            assert!((p.length() - 30.0).abs() < 1e-3);
        }
    }

    #[test]
    fn ellipsoid_respects_each_radius() {
        let mesh = Shape::ellipsoid(10.0, 20.0, 30.0).tessellate();
        let (lo, hi) = bounds(&mesh);
        assert!((hi.y - 20.0).abs() < 1e-3);
        assert!((lo.y + 20.0).abs() < 1e-3);
        assert!(hi.x <= 10.0 + 1e-3);
        assert!(hi.z <= 30.0 + 1e-3);
    }

    #[test]
    fn uncapped_cylinder_has_fewer_triangles() {
        let capped = Shape::cylinder(10.0, 20.0).tessellate();
        let open = Shape::Cylinder {
            radius: 10.0,
            height: 20.0,
            detail_x: DEFAULT_DETAIL_X,
            bottom_cap: false,
            top_cap: false,
        }
        .tessellate();
        assert_eq!(
            capped.triangle_count(),
            open.triangle_count() + 2 * DEFAULT_DETAIL_X as usize
        );
    }

    #[test]
    fn cone_apex_points_to_negative_y() {
        let mesh = Shape::cone(10.0, 40.0).tessellate();
        let (lo, hi) = bounds(&mesh);
        assert!((lo.y + 20.0).abs() < 1e-4);
        assert!((hi.y - 20.0).abs() < 1e-4);
        let apex_ring: Vec<_> = mesh
            .positions
            .iter()
            .filter(|p| (p.y + 20.0).abs() < 1e-4)
            .collect();
        assert!(apex_ring.iter().all(|p| p.x.hypot(p.z) < 1e-4));
    }

    #[test]
    fn torus_stays_within_outer_radius() {
        let mesh = Shape::torus(50.0, 10.0).tessellate();
        let (lo, hi) = bounds(&mesh);
        assert!(hi.x <= 60.0 + 1e-3 && lo.x >= -60.0 - 1e-3);
        assert!(hi.z <= 10.0 + 1e-3 && lo.z >= -10.0 - 1e-3);
    }

    fn assert_extent(shape: Shape, half: Vec3) {
        let (lo, hi) = bounds(&shape.tessellate());
        assert!((hi - half).abs().max_element() < 1e-3, "{shape:?}: {hi}");
        assert!((lo + half).abs().max_element() < 1e-3, "{shape:?}: {lo}");
    }

    #[test]
    fn default_shapes_use_default_sizes() {
        assert_extent(Shape::default_box(), Vec3::splat(25.0));
        assert_extent(Shape::default_plane(), Vec3::new(25.0, 25.0, 0.0));
        assert_extent(Shape::default_sphere(), Vec3::splat(50.0));
        assert_extent(Shape::default_ellipsoid(), Vec3::splat(50.0));
        assert_extent(Shape::default_cylinder(), Vec3::new(50.0, 25.0, 50.0));
        assert_extent(Shape::default_cone(), Vec3::new(50.0, 25.0, 50.0));
        assert_extent(Shape::default_torus(), Vec3::new(60.0, 60.0, 10.0));
        assert_eq!(
            Shape::default_sphere(),
            Shape::Sphere {
                radius: 50.0,
                detail_x: DEFAULT_DETAIL_X,
                detail_y: DEFAULT_DETAIL_Y,
            }
        );
    }

    #[test]
    fn low_detail_is_clamped() {
        let mesh = Shape::Sphere {
            radius: 1.0,
            detail_x: 0,
            detail_y: 0,
        }
        .tessellate();
        assert!(mesh.triangle_count() >= 6);
    }
}
