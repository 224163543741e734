//! # Culling Camera
//!
//! Perspective camera that supplies the view volume for a culling pass.
//!
//! View space is right-handed and Y-up. The clip-space flip is applied
//! between view and projection, so the combined matrix is `P × X × V` and the
//! resulting clip volume is `-w ≤ x, y ≤ w`, `0 ≤ z ≤ w`.

use crate::bounds::Frustum;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Camera whose view volume drives [`crate::scene::SceneManager::clip_scene`]
#[derive(Debug, Clone)]
pub struct CullCamera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Vertical field of view in radians
    pub fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,

    /// Sees in every direction (e.g. cube-map capture); disables frustum culling
    pub omnidirectional: bool,
}

impl CullCamera {
    /// Create a perspective camera looking at the origin
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: utils::deg_to_rad(fov_degrees),
            aspect,
            near,
            far,
            omnidirectional: false,
        }
    }

    /// Update camera position in world space
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Update camera target (look-at point)
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        log::trace!("Camera target updated to: {:?}", target);
    }

    /// Switch omnidirectional mode on or off
    pub fn set_omnidirectional(&mut self, omnidirectional: bool) {
        self.omnidirectional = omnidirectional;
        log::trace!("Camera omnidirectional: {}", omnidirectional);
    }

    /// Normalized viewing direction
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// World-to-view transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    /// Perspective projection with a `[0, 1]` depth range
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov, self.aspect, self.near, self.far)
    }

    /// Combined `P × X × V` transform
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * Mat4::clip_space_flip() * self.view_matrix()
    }

    /// World-space view volume
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection_matrix())
    }
}

impl Default for CullCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 3.0, 3.0),
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::FRAC_PI_4,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            omnidirectional: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::{BoundOverlap, AABB};
    use crate::foundation::math::Vec4;
    use approx::assert_relative_eq;

    #[test]
    fn test_view_projection_depth_range() {
        let camera = CullCamera::perspective(Vec3::new(0.0, 0.0, 10.0), 60.0, 1.0, 1.0, 100.0);
        let view_proj = camera.view_projection_matrix();

        let near = view_proj * Vec4::new(0.0, 0.0, 9.0, 1.0);
        let far = view_proj * Vec4::new(0.0, 0.0, -90.0, 1.0);
        assert_relative_eq!(near.z / near.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_frustum_classifies_scene() {
        let camera = CullCamera::perspective(Vec3::new(0.0, 0.0, 10.0), 60.0, 1.0, 1.0, 100.0);
        let frustum = camera.frustum();
        let unit = Vec3::new(0.5, 0.5, 0.5);

        assert_eq!(frustum.intersect_aabb(&AABB::from_center_extents(Vec3::zeros(), unit)), BoundOverlap::Yes);
        assert_eq!(
            frustum.intersect_aabb(&AABB::from_center_extents(Vec3::new(0.0, 0.0, 20.0), unit)),
            BoundOverlap::No
        );
        assert_eq!(
            frustum.intersect_aabb(&AABB::from_center_extents(Vec3::new(0.0, 40.0, 0.0), unit)),
            BoundOverlap::No
        );
    }

    #[test]
    fn test_forward_points_at_target() {
        let mut camera = CullCamera::default();
        camera.set_position(Vec3::new(5.0, 0.0, 0.0));
        camera.set_target(Vec3::new(5.0, 0.0, -3.0));
        assert_relative_eq!(camera.forward(), Vec3::new(0.0, 0.0, -1.0));
    }
}
