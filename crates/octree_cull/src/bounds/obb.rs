//! Oriented bounding box

use crate::foundation::math::{Quat, Vec3};

use super::AABB;

/// Tolerance added to the rotation terms so near-parallel edges do not
/// produce a degenerate cross-product axis
const PARALLEL_EPSILON: f32 = 1e-6;

/// Oriented bounding box: a center, three orthonormal axes and the half size
/// along each axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OBB {
    /// Center in world space
    pub center: Vec3,
    /// Local X, Y and Z axes in world space (orthonormal)
    pub axes: [Vec3; 3],
    /// Half size along each local axis
    pub half_size: Vec3,
}

impl OBB {
    /// Create an OBB from a center, rotation and half size
    pub fn new(center: Vec3, rotation: Quat, half_size: Vec3) -> Self {
        Self {
            center,
            axes: [
                rotation * Vec3::x(),
                rotation * Vec3::y(),
                rotation * Vec3::z(),
            ],
            half_size,
        }
    }

    /// Axis-aligned box viewed as an OBB
    pub fn from_aabb(aabb: &AABB) -> Self {
        Self {
            center: aabb.center(),
            axes: [Vec3::x(), Vec3::y(), Vec3::z()],
            half_size: aabb.extents(),
        }
    }

    /// Radius of this box projected onto `direction`
    pub fn projected_radius(&self, direction: &Vec3) -> f32 {
        self.axes
            .iter()
            .zip(self.half_size.iter())
            .map(|(axis, half)| axis.dot(direction).abs() * half)
            .sum()
    }

    /// Axis-aligned box enclosing this OBB
    pub fn enclosing_aabb(&self) -> AABB {
        let extents = Vec3::new(
            self.projected_radius(&Vec3::x()),
            self.projected_radius(&Vec3::y()),
            self.projected_radius(&Vec3::z()),
        );
        AABB::from_center_extents(self.center, extents)
    }

    /// Separating-axis test against an axis-aligned box
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.intersects(&OBB::from_aabb(aabb))
    }

    /// Separating-axis test against another OBB (15 candidate axes)
    ///
    /// After Ericson, Real-Time Collision Detection, 4.4.1.
    pub fn intersects(&self, other: &OBB) -> bool {
        let a = self;
        let b = other;

        // Rotation of b expressed in a's frame
        let mut r = [[0.0_f32; 3]; 3];
        let mut abs_r = [[0.0_f32; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                r[i][j] = a.axes[i].dot(&b.axes[j]);
                abs_r[i][j] = r[i][j].abs() + PARALLEL_EPSILON;
            }
        }

        let offset = b.center - a.center;
        let t = [
            offset.dot(&a.axes[0]),
            offset.dot(&a.axes[1]),
            offset.dot(&a.axes[2]),
        ];

        // L = A0, A1, A2
        for i in 0..3 {
            let ra = a.half_size[i];
            let rb = b.half_size[0] * abs_r[i][0]
                + b.half_size[1] * abs_r[i][1]
                + b.half_size[2] * abs_r[i][2];
            if t[i].abs() > ra + rb {
                return false;
            }
        }

        // L = B0, B1, B2
        for j in 0..3 {
            let ra = a.half_size[0] * abs_r[0][j]
                + a.half_size[1] * abs_r[1][j]
                + a.half_size[2] * abs_r[2][j];
            let rb = b.half_size[j];
            let tl = t[0] * r[0][j] + t[1] * r[1][j] + t[2] * r[2][j];
            if tl.abs() > ra + rb {
                return false;
            }
        }

        // L = Ai x Bj
        for i in 0..3 {
            let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
            for j in 0..3 {
                let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
                let ra = a.half_size[i1] * abs_r[i2][j] + a.half_size[i2] * abs_r[i1][j];
                let rb = b.half_size[j1] * abs_r[i][j2] + b.half_size[j2] * abs_r[i][j1];
                let tl = t[i2] * r[i1][j] - t[i1] * r[i2][j];
                if tl.abs() > ra + rb {
                    return false;
                }
            }
        }

        true
    }
}
