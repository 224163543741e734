//! Projected area estimates used by small-object culling

use crate::foundation::math::{Mat4, Vec3, Vec4};

use super::AABB;

/// Clip-space `w` below which a corner counts as behind the eye
const MIN_CLIP_W: f32 = 1e-6;

/// Area of the box projected orthographically along `view_dir`
///
/// `view_dir` is expected to be normalized. Each face pair contributes its
/// area scaled by how squarely it faces the viewer.
pub fn ortho_area(view_dir: &Vec3, aabb: &AABB) -> f32 {
    let size = aabb.size();
    view_dir.abs().dot(&Vec3::new(
        size.y * size.z,
        size.z * size.x,
        size.x * size.y,
    ))
}

/// Fraction of the viewport covered by the projected box
///
/// The silhouette of a box under projection is the convex hull of its eight
/// projected corners; its area is measured in viewport units where the full
/// screen is 1. A box with any corner at or behind the eye plane returns
/// `f32::INFINITY`, so it can never be rejected as small.
pub fn perspective_area(view_proj: &Mat4, aabb: &AABB) -> f32 {
    let mut points = [(0.0_f32, 0.0_f32); 8];
    for (point, corner) in points.iter_mut().zip(aabb.corners()) {
        let clip = view_proj * Vec4::new(corner.x, corner.y, corner.z, 1.0);
        if clip.w <= MIN_CLIP_W {
            return f32::INFINITY;
        }
        *point = (clip.x / clip.w * 0.5 + 0.5, clip.y / clip.w * 0.5 + 0.5);
    }

    polygon_area(&convex_hull(&mut points))
}

/// Twice the signed area of the triangle `o a b`; positive when counter-clockwise
fn cross(o: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// One monotone chain of the hull, turning counter-clockwise
fn half_hull<'a>(points: impl Iterator<Item = &'a (f32, f32)>) -> Vec<(f32, f32)> {
    let mut chain: Vec<(f32, f32)> = Vec::with_capacity(8);
    for &p in points {
        while chain.len() >= 2 && cross(chain[chain.len() - 2], chain[chain.len() - 1], p) <= 0.0 {
            chain.pop();
        }
        chain.push(p);
    }
    chain
}

/// Counter-clockwise hull of `points` (Andrew's monotone chain), collinear
/// and duplicate points dropped
fn convex_hull(points: &mut [(f32, f32)]) -> Vec<(f32, f32)> {
    points.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut lower = half_hull(points.iter());
    let mut upper = half_hull(points.iter().rev());
    // Each chain ends where the other starts
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Shoelace area of a simple polygon
fn polygon_area(polygon: &[(f32, f32)]) -> f32 {
    let doubled: f32 = polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .map(|(a, b)| a.0 * b.1 - b.0 * a.1)
        .sum();
    doubled.abs() * 0.5
}
