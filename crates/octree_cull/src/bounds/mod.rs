//! Bounding volumes and intersection primitives
//!
//! Pure-function collaborators of the culling passes: axis-aligned boxes,
//! oriented boxes, spheres and the view frustum they are tested against.
//! Frustum tests are tri-state so hierarchical passes can stop descending
//! once a region is known to be fully inside or fully outside.

mod aabb;
mod obb;
mod sphere;
mod frustum;
mod area;

pub use aabb::AABB;
pub use obb::OBB;
pub use sphere::BoundingSphere;
pub use frustum::{Frustum, Plane};
pub use area::{ortho_area, perspective_area};

/// Result of classifying a bound against a view volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundOverlap {
    /// Entirely outside
    No,
    /// Straddles at least one plane
    Partial,
    /// Entirely inside
    Yes,
}

impl BoundOverlap {
    /// True unless the bound was proven to be outside
    pub fn is_visible(self) -> bool {
        self != Self::No
    }
}

/// A bounding volume that can be tested against boxes and frusta
///
/// Implemented by every volume the ad-hoc visibility queries accept, so the
/// octree descent can be written once for all of them.
pub trait Bound {
    /// Test whether this volume overlaps an axis-aligned box
    fn overlaps_aabb(&self, aabb: &AABB) -> bool;

    /// Classify this volume against a frustum
    fn frustum_overlap(&self, frustum: &Frustum) -> BoundOverlap;
}

impl Bound for AABB {
    fn overlaps_aabb(&self, aabb: &AABB) -> bool {
        self.intersects(aabb)
    }

    fn frustum_overlap(&self, frustum: &Frustum) -> BoundOverlap {
        frustum.intersect_aabb(self)
    }
}

impl Bound for OBB {
    fn overlaps_aabb(&self, aabb: &AABB) -> bool {
        self.intersects_aabb(aabb)
    }

    fn frustum_overlap(&self, frustum: &Frustum) -> BoundOverlap {
        frustum.intersect_obb(self)
    }
}

impl Bound for BoundingSphere {
    fn overlaps_aabb(&self, aabb: &AABB) -> bool {
        self.intersects_aabb(aabb)
    }

    fn frustum_overlap(&self, frustum: &Frustum) -> BoundOverlap {
        frustum.intersect_sphere(self)
    }
}
