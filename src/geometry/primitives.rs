use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::Mesh;

const MIN_DETAIL_X: u32 = 3;
const MIN_DETAIL_Y: u32 = 2;

pub(super) fn cuboid(half: Vec3) -> Mesh {
    let mut mesh = Mesh::default();
    for corner in 0..8u32 {
        let sign = |bit: u32| if corner & bit == 0 { -1.0 } else { 1.0 };
        let _ = mesh.push_vertex(half * Vec3::new(sign(1), sign(2), sign(4)));
    }
    // Corner index bits: 1 = +x, 2 = +y, 4 = +z.
    mesh.push_quad(0, 2, 3, 1); // -z
    mesh.push_quad(4, 5, 7, 6); // +z
    mesh.push_quad(0, 4, 6, 2); // -x
    mesh.push_quad(1, 3, 7, 5); // +x
    mesh.push_quad(0, 1, 5, 4); // -y
    mesh.push_quad(2, 6, 7, 3); // +y
    mesh
}

pub(super) fn plane(half_width: f32, half_height: f32) -> Mesh {
    let mut mesh = Mesh::default();
    let a = mesh.push_vertex(Vec3::new(-half_width, -half_height, 0.0));
    let b = mesh.push_vertex(Vec3::new(half_width, -half_height, 0.0));
    let c = mesh.push_vertex(Vec3::new(half_width, half_height, 0.0));
    let d = mesh.push_vertex(Vec3::new(-half_width, half_height, 0.0));
    mesh.push_quad(a, b, c, d);
    mesh
}

/// Latitude/longitude grid; poles produce degenerate triangles, which the
/// rasterizers drop.
pub(super) fn ellipsoid(radii: Vec3, detail_x: u32, detail_y: u32) -> Mesh {
    let detail_x = detail_x.max(MIN_DETAIL_X);
    let detail_y = detail_y.max(MIN_DETAIL_Y);
    let mut mesh = Mesh::default();
    for j in 0..=detail_y {
        let theta = PI * j as f32 / detail_y as f32;
        for i in 0..=detail_x {
            let phi = TAU * i as f32 / detail_x as f32;
            let unit = Vec3::new(
                theta.sin() * phi.cos(),
                theta.cos(),
                theta.sin() * phi.sin(),
            );
            let _ = mesh.push_vertex(unit * radii);
        }
    }
    push_grid(&mut mesh, detail_x, detail_y);
    mesh
}

/// Truncated cone along y. A zero radius collapses that end to a point.
pub(super) fn frustum(
    radius_neg_y: f32,
    radius_pos_y: f32,
    height: f32,
    detail_x: u32,
    (cap_neg_y, cap_pos_y): (bool, bool),
) -> Mesh {
    let detail_x = detail_x.max(MIN_DETAIL_X);
    let half = height / 2.0;
    let mut mesh = Mesh::default();

    let ring = |mesh: &mut Mesh, radius: f32, y: f32| -> u32 {
        let start = mesh.positions.len() as u32;
        for i in 0..detail_x {
            let phi = TAU * i as f32 / detail_x as f32;
            let _ = mesh.push_vertex(Vec3::new(
                radius * phi.cos(),
                y,
                radius * phi.sin(),
            ));
        }
        start
    };
    let neg = ring(&mut mesh, radius_neg_y, -half);
    let pos = ring(&mut mesh, radius_pos_y, half);

    for i in 0..detail_x {
        let next = (i + 1) % detail_x;
        mesh.push_quad(neg + i, neg + next, pos + next, pos + i);
    }

    for (cap, start, y) in [(cap_neg_y, neg, -half), (cap_pos_y, pos, half)] {
        if !cap {
            continue;
        }
        let center = mesh.push_vertex(Vec3::new(0.0, y, 0.0));
        for i in 0..detail_x {
            let next = (i + 1) % detail_x;
            mesh.push_triangle(center, start + next, start + i);
        }
    }
    mesh
}

pub(super) fn torus(
    radius: f32,
    tube_radius: f32,
    detail_x: u32,
    detail_y: u32,
) -> Mesh {
    let detail_x = detail_x.max(MIN_DETAIL_X);
    let detail_y = detail_y.max(MIN_DETAIL_X);
    let mut mesh = Mesh::default();
    for j in 0..=detail_y {
        let v = TAU * j as f32 / detail_y as f32;
        let ring = radius + tube_radius * v.cos();
        for i in 0..=detail_x {
            let u = TAU * i as f32 / detail_x as f32;
            let _ = mesh.push_vertex(Vec3::new(
                ring * u.cos(),
                ring * u.sin(),
                tube_radius * v.sin(),
            ));
        }
    }
    push_grid(&mut mesh, detail_x, detail_y);
    mesh
}

/// Quads over a `(detail_y + 1) × (detail_x + 1)` vertex grid.
fn push_grid(mesh: &mut Mesh, detail_x: u32, detail_y: u32) {
    let stride = detail_x + 1;
    for j in 0..detail_y {
        for i in 0..detail_x {
            let a = j * stride + i;
            mesh.push_quad(a, a + stride, a + stride + 1, a + 1);
        }
    }
}
