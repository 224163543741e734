//! View frustum and planes

use crate::foundation::math::{Mat4, Vec3, Vec4};

use super::{BoundOverlap, BoundingSphere, AABB, OBB};

/// Plane defined by normal and distance from origin
///
/// Points with a non-negative signed distance are on the inner side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (normalized)
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from normal and distance
    pub fn new(normal: Vec3, distance: f32) -> Self {
        let length = normal.magnitude();
        Self { normal: normal / length, distance: distance / length }
    }

    /// Plane from the raw `(a, b, c, d)` coefficients of `ax + by + cz + d = 0`
    fn from_coefficients(coefficients: Vec4) -> Self {
        Self::new(coefficients.xyz(), coefficients.w)
    }

    /// Calculate signed distance from plane to point
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.distance
    }
}

/// Frustum for visibility culling
///
/// Six planes (left, right, bottom, top, near, far) whose normals point into
/// the enclosed volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Six planes defining the frustum (left, right, bottom, top, near, far)
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six planes
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix
    ///
    /// Gribb-Hartmann extraction for a clip space with `-w <= x, y <= w` and
    /// `0 <= z <= w`, which is what [`crate::CullCamera`] produces.
    pub fn from_view_projection(view_proj: &Mat4) -> Self {
        let row = |i: usize| {
            Vec4::new(
                view_proj[(i, 0)],
                view_proj[(i, 1)],
                view_proj[(i, 2)],
                view_proj[(i, 3)],
            )
        };
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        Self {
            planes: [
                Plane::from_coefficients(r3 + r0),
                Plane::from_coefficients(r3 - r0),
                Plane::from_coefficients(r3 + r1),
                Plane::from_coefficients(r3 - r1),
                Plane::from_coefficients(r2),
                Plane::from_coefficients(r3 - r2),
            ],
        }
    }

    /// Box-shaped view volume, as used by orthographic shadow cascades
    pub fn from_aabb(aabb: &AABB) -> Self {
        Self {
            planes: [
                Plane::new(Vec3::new(1.0, 0.0, 0.0), -aabb.min.x),
                Plane::new(Vec3::new(-1.0, 0.0, 0.0), aabb.max.x),
                Plane::new(Vec3::new(0.0, 1.0, 0.0), -aabb.min.y),
                Plane::new(Vec3::new(0.0, -1.0, 0.0), aabb.max.y),
                Plane::new(Vec3::new(0.0, 0.0, 1.0), -aabb.min.z),
                Plane::new(Vec3::new(0.0, 0.0, -1.0), aabb.max.z),
            ],
        }
    }

    /// Test if a point is inside the frustum
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|plane| plane.distance_to_point(point) >= 0.0)
    }

    /// Classify an axis-aligned box against the frustum
    pub fn intersect_aabb(&self, aabb: &AABB) -> BoundOverlap {
        let mut intersect = false;
        for plane in &self.planes {
            // Corner furthest along the normal, and its diagonal opposite
            let positive = Vec3::new(
                if plane.normal.x < 0.0 { aabb.min.x } else { aabb.max.x },
                if plane.normal.y < 0.0 { aabb.min.y } else { aabb.max.y },
                if plane.normal.z < 0.0 { aabb.min.z } else { aabb.max.z },
            );
            let negative = Vec3::new(
                if plane.normal.x < 0.0 { aabb.max.x } else { aabb.min.x },
                if plane.normal.y < 0.0 { aabb.max.y } else { aabb.min.y },
                if plane.normal.z < 0.0 { aabb.max.z } else { aabb.min.z },
            );

            if plane.distance_to_point(positive) < 0.0 {
                return BoundOverlap::No;
            }
            if plane.distance_to_point(negative) < 0.0 {
                intersect = true;
            }
        }

        if intersect { BoundOverlap::Partial } else { BoundOverlap::Yes }
    }

    /// Classify an oriented box against the frustum
    pub fn intersect_obb(&self, obb: &OBB) -> BoundOverlap {
        let mut intersect = false;
        for plane in &self.planes {
            let distance = plane.distance_to_point(obb.center);
            let radius = obb.projected_radius(&plane.normal);

            if distance + radius < 0.0 {
                return BoundOverlap::No;
            }
            if distance - radius < 0.0 {
                intersect = true;
            }
        }

        if intersect { BoundOverlap::Partial } else { BoundOverlap::Yes }
    }

    /// Classify a sphere against the frustum
    pub fn intersect_sphere(&self, sphere: &BoundingSphere) -> BoundOverlap {
        let mut intersect = false;
        for plane in &self.planes {
            let distance = plane.distance_to_point(sphere.center);

            if distance < -sphere.radius {
                return BoundOverlap::No;
            }
            if distance < sphere.radius {
                intersect = true;
            }
        }

        if intersect { BoundOverlap::Partial } else { BoundOverlap::Yes }
    }
}
