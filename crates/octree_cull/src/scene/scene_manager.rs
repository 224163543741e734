//! # Scene Manager
//!
//! Facade over the object registry and the active culling strategy. Every
//! registry mutation is forwarded to the culler before the call returns, so
//! cached indices never drift from the registry.

use crate::bounds::{ortho_area, perspective_area, BoundingSphere, AABB, OBB};
use crate::camera::CullCamera;
use crate::config::{CullerKind, CullingConfig};
use crate::spatial::OctreeCuller;

use super::{BruteForceCuller, ObjectAttrib, SceneCuller, SceneObject, SceneObjectRegistry};

/// Errors from scene mutations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// No object at the given index
    #[error("object index {index} out of range (scene holds {len} objects)")]
    ObjectIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Registry length at the time of the call
        len: usize,
    },
}

/// Owns the scene objects and produces per-frame visibility marks
pub struct SceneManager {
    registry: SceneObjectRegistry,

    culler: Box<dyn SceneCuller>,

    /// One entry per registry index, valid after the last clip
    visible_marks: Vec<bool>,

    small_object_threshold: f32,

    num_objects_visible: usize,
}

impl SceneManager {
    /// Create a scene manager with default configuration
    pub fn new() -> Self {
        Self::with_config(&CullingConfig::default())
    }

    /// Create a scene manager with custom configuration
    pub fn with_config(config: &CullingConfig) -> Self {
        let culler: Box<dyn SceneCuller> = match config.culler {
            CullerKind::Octree => Box::new(OctreeCuller::new(config.clamped_tree_depth())),
            CullerKind::BruteForce => Box::new(BruteForceCuller::new()),
        };
        log::debug!("Scene manager using {} culler", culler.name());

        Self::with_culler(culler, config.small_object_threshold)
    }

    /// Create a scene manager around an existing culler
    pub fn with_culler(culler: Box<dyn SceneCuller>, small_object_threshold: f32) -> Self {
        Self {
            registry: SceneObjectRegistry::new(),
            culler,
            visible_marks: Vec::new(),
            small_object_threshold,
            num_objects_visible: 0,
        }
    }

    /// Register an object and return its index
    pub fn add_object(&mut self, object: SceneObject) -> usize {
        let index = self.registry.add(object);
        self.culler.on_add_object(index, &self.registry.as_slice()[index]);
        index
    }

    /// Erase the object at `index`; every later index shifts down by one
    pub fn del_object(&mut self, index: usize) -> Result<SceneObject, SceneError> {
        let len = self.registry.len();
        let object = self
            .registry
            .remove(index)
            .ok_or(SceneError::ObjectIndexOutOfRange { index, len })?;

        self.culler.on_del_object(index, &object);
        if index < self.visible_marks.len() {
            self.visible_marks.remove(index);
        }
        Ok(object)
    }

    /// Show or hide an object regardless of culling
    pub fn set_object_visible(&mut self, index: usize, visible: bool) -> Result<(), SceneError> {
        self.modify_object(index, |object| object.visible = visible)
    }

    /// Replace an object's world bounds
    pub fn set_object_bounds(&mut self, index: usize, bounds: AABB) -> Result<(), SceneError> {
        self.modify_object(index, |object| object.bounds = bounds)
    }

    /// Replace an object's attribute flags
    pub fn set_object_attrib(&mut self, index: usize, attrib: ObjectAttrib) -> Result<(), SceneError> {
        self.modify_object(index, |object| object.attrib = attrib)
    }

    fn modify_object(
        &mut self,
        index: usize,
        modify: impl FnOnce(&mut SceneObject),
    ) -> Result<(), SceneError> {
        let len = self.registry.len();
        let object = self
            .registry
            .get_mut(index)
            .ok_or(SceneError::ObjectIndexOutOfRange { index, len })?;

        let old = object.clone();
        modify(object);
        let new = object.clone();
        self.culler.on_object_changed(index, &old, &new);
        Ok(())
    }

    /// Remove every object and reset the culler
    pub fn clear_objects(&mut self) {
        self.registry.clear();
        self.culler.clear();
        self.visible_marks.clear();
        self.num_objects_visible = 0;
    }

    /// Compute this frame's visibility marks for `camera`
    pub fn clip_scene(&mut self, camera: &CullCamera) -> &[bool] {
        let objects = self.registry.as_slice();
        self.visible_marks.clear();
        self.visible_marks.resize(objects.len(), false);

        let frustum = camera.frustum();
        self.culler
            .clip_scene(objects, &frustum, camera.omnidirectional, &mut self.visible_marks);

        if self.small_object_threshold > 0.0 && !camera.omnidirectional {
            let view_dir = camera.forward();
            let view_proj = camera.view_projection_matrix();
            let threshold = self.small_object_threshold;

            for (mark, object) in self.visible_marks.iter_mut().zip(objects) {
                let small_cullable = *mark
                    && object.attrib.contains(ObjectAttrib::CULLABLE)
                    && !object.attrib.contains(ObjectAttrib::OVERLAY);
                if small_cullable
                    && (ortho_area(&view_dir, &object.bounds) <= threshold
                        || perspective_area(&view_proj, &object.bounds) <= threshold)
                {
                    *mark = false;
                }
            }
        }

        self.num_objects_visible = self.visible_marks.iter().filter(|&&visible| visible).count();
        log::trace!(
            "Clipped scene: {}/{} objects visible",
            self.num_objects_visible,
            objects.len()
        );

        &self.visible_marks
    }

    /// Could an axis-aligned box be visible in the last clipped frame
    pub fn aabb_visible(&self, aabb: &AABB) -> bool {
        self.culler.aabb_visible(aabb)
    }

    /// Could an oriented box be visible in the last clipped frame
    pub fn obb_visible(&self, obb: &OBB) -> bool {
        self.culler.obb_visible(obb)
    }

    /// Could a sphere be visible in the last clipped frame
    pub fn sphere_visible(&self, sphere: &BoundingSphere) -> bool {
        self.culler.sphere_visible(sphere)
    }

    /// Marks from the last [`SceneManager::clip_scene`]
    pub fn visible_marks(&self) -> &[bool] {
        &self.visible_marks
    }

    /// Number of objects marked visible by the last clip
    pub fn num_objects_visible(&self) -> usize {
        self.num_objects_visible
    }

    /// All registered objects
    pub fn objects(&self) -> &[SceneObject] {
        self.registry.as_slice()
    }

    /// Object at `index`
    pub fn object(&self, index: usize) -> Option<&SceneObject> {
        self.registry.get(index)
    }

    /// Projected area threshold for small-object culling
    pub fn small_object_threshold(&self) -> f32 {
        self.small_object_threshold
    }

    /// Set the projected area threshold; 0 disables small-object culling
    pub fn set_small_object_threshold(&mut self, threshold: f32) {
        self.small_object_threshold = threshold.max(0.0);
    }

    /// Name of the active culler
    pub fn culler_name(&self) -> &'static str {
        self.culler.name()
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;

    fn cube(center: Vec3, half: f32) -> AABB {
        AABB::from_center_extents(center, Vec3::new(half, half, half))
    }

    fn camera() -> CullCamera {
        CullCamera::perspective(Vec3::new(0.0, 0.0, 20.0), 60.0, 1.0, 0.5, 100.0)
    }

    fn populated(config: &CullingConfig) -> SceneManager {
        let mut scene = SceneManager::with_config(config);
        scene.add_object(SceneObject::static_cullable(cube(Vec3::zeros(), 1.0)));
        scene.add_object(SceneObject::static_cullable(cube(Vec3::new(0.0, 0.0, 50.0), 1.0)));
        scene.add_object(SceneObject::moveable(cube(Vec3::new(2.0, 0.0, 0.0), 1.0)));
        scene.add_object(SceneObject::overlay(cube(Vec3::new(0.0, 500.0, 0.0), 1.0)));
        scene.add_object(SceneObject::static_cullable(cube(Vec3::new(-3.0, 1.0, -5.0), 1.0)));
        scene
    }

    #[test]
    fn test_clip_scene_per_culler() {
        for culler in [CullerKind::Octree, CullerKind::BruteForce] {
            let mut scene = populated(&CullingConfig { culler, ..Default::default() });

            let marks = scene.clip_scene(&camera()).to_vec();

            assert_eq!(marks, vec![true, false, true, true, true], "{culler:?}");
            assert_eq!(scene.num_objects_visible(), 4);
        }
    }

    #[test]
    fn test_del_object_keeps_marks_aligned() {
        let mut scene = populated(&CullingConfig::default());
        scene.clip_scene(&camera());

        // Moving object: the octree repairs its indices in place
        let removed = scene.del_object(2).unwrap();
        assert!(removed.attrib.contains(ObjectAttrib::MOVEABLE));
        assert_eq!(scene.visible_marks().len(), 4);
        assert_eq!(scene.clip_scene(&camera()), &[true, false, true, true]);

        // Static object: forces a rebuild
        scene.del_object(0).unwrap();
        assert_eq!(scene.clip_scene(&camera()), &[false, true, true]);
    }

    #[test]
    fn test_invalid_index_is_reported() {
        let mut scene = populated(&CullingConfig::default());

        assert_eq!(
            scene.del_object(9),
            Err(SceneError::ObjectIndexOutOfRange { index: 9, len: 5 })
        );
        assert!(scene.set_object_visible(5, false).is_err());
        assert!(scene.set_object_bounds(7, cube(Vec3::zeros(), 1.0)).is_err());
    }

    #[test]
    fn test_user_hidden_and_moved_objects() {
        let mut scene = populated(&CullingConfig::default());
        scene.clip_scene(&camera());

        scene.set_object_visible(0, false).unwrap();
        scene.set_object_bounds(1, cube(Vec3::new(0.0, 0.0, -10.0), 1.0)).unwrap();

        assert_eq!(scene.clip_scene(&camera()), &[false, true, true, true, true]);
    }

    #[test]
    fn test_omnidirectional_camera_skips_culling() {
        let mut scene = populated(&CullingConfig::default());
        scene.set_object_visible(4, false).unwrap();
        let mut camera = camera();
        camera.set_omnidirectional(true);

        assert_eq!(scene.clip_scene(&camera), &[true, true, true, false, false]);
    }

    #[test]
    fn test_small_object_threshold() {
        let mut scene = SceneManager::new();
        scene.add_object(SceneObject::static_cullable(cube(Vec3::zeros(), 0.01)));
        scene.add_object(SceneObject::static_cullable(cube(Vec3::zeros(), 3.0)));
        scene.add_object(SceneObject::overlay(cube(Vec3::zeros(), 0.01)));
        scene.set_small_object_threshold(0.01);

        assert_eq!(scene.clip_scene(&camera()), &[false, true, true]);

        scene.set_small_object_threshold(0.0);
        assert_eq!(scene.clip_scene(&camera()), &[true, true, true]);
    }

    #[test]
    fn test_bound_queries_after_clip() {
        let mut scene = populated(&CullingConfig::default());
        scene.clip_scene(&camera());

        assert!(scene.aabb_visible(&cube(Vec3::new(1.0, 1.0, 0.0), 0.5)));
        assert!(!scene.sphere_visible(&BoundingSphere::new(Vec3::new(0.0, 0.0, 40.0), 1.0)));
        assert!(!scene.obb_visible(&OBB::from_aabb(&cube(Vec3::new(0.0, 300.0, 0.0), 1.0))));
    }

    #[test]
    fn test_clear_objects() {
        let mut scene = populated(&CullingConfig::default());
        scene.clip_scene(&camera());

        scene.clear_objects();

        assert!(scene.objects().is_empty());
        assert!(scene.clip_scene(&camera()).is_empty());
        assert_eq!(scene.num_objects_visible(), 0);
    }
}
