//! Culling strategy trait and the linear implementation
//!
//! A [`SceneCuller`] decides, once per frame, which registry entries are
//! visible. The scene manager owns one behind a trait object so the strategy
//! can be swapped (octree, brute force) without changing its API.

use crate::bounds::{Bound, BoundingSphere, Frustum, AABB, OBB};

use super::SceneObject;

/// Pluggable visibility culling for the scene manager
///
/// Notifications must be delivered synchronously, before the next
/// [`SceneCuller::clip_scene`], or any cached indices go stale.
pub trait SceneCuller: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// An object was appended to the registry at `index`
    fn on_add_object(&mut self, index: usize, object: &SceneObject);

    /// The object at `index` was erased from the registry
    fn on_del_object(&mut self, index: usize, object: &SceneObject);

    /// The bounds or attributes of the object at `index` changed
    fn on_object_changed(&mut self, index: usize, old: &SceneObject, new: &SceneObject);

    /// Compute the visibility of every object for this frame
    ///
    /// `marks` has one entry per registry index and is fully overwritten.
    /// After an omnidirectional frame the bound queries reject nothing.
    fn clip_scene(
        &mut self,
        objects: &[SceneObject],
        frustum: &Frustum,
        omnidirectional: bool,
        marks: &mut [bool],
    );

    /// Could an axis-aligned box be visible this frame
    fn aabb_visible(&self, aabb: &AABB) -> bool;

    /// Could an oriented box be visible this frame
    fn obb_visible(&self, obb: &OBB) -> bool;

    /// Could a sphere be visible this frame
    fn sphere_visible(&self, sphere: &BoundingSphere) -> bool;

    /// Forget all cached state
    fn clear(&mut self);
}

/// Direct test of `bound` against the active frustum; `true` when none is set
pub(crate) fn frustum_visible<B: Bound>(frustum: Option<&Frustum>, bound: &B) -> bool {
    frustum.map_or(true, |frustum| bound.frustum_overlap(frustum).is_visible())
}

/// Omnidirectional cameras see every direction: skip all frustum work
pub(crate) fn mark_omnidirectional(objects: &[SceneObject], marks: &mut [bool]) {
    for (mark, object) in marks.iter_mut().zip(objects) {
        *mark = object.visible && !object.attrib.contains(super::ObjectAttrib::OVERLAY);
    }
}

/// Visibility of an object that is not stored in any spatial structure
///
/// Overlay and non-cullable objects cannot be rejected; moving cullable
/// objects get one precise test.
pub(crate) fn direct_object_visible(object: &SceneObject, frustum: &Frustum) -> bool {
    use super::ObjectAttrib;

    if !object.visible {
        return false;
    }
    if object.attrib.contains(ObjectAttrib::OVERLAY) || !object.attrib.contains(ObjectAttrib::CULLABLE) {
        return true;
    }
    frustum.intersect_aabb(&object.bounds).is_visible()
}

/// Tests every object individually against the frustum
///
/// Sufficient for small scenes, and the reference the octree is checked
/// against.
#[derive(Debug, Default)]
pub struct BruteForceCuller {
    frustum: Option<Frustum>,
}

impl BruteForceCuller {
    /// Create a culler with no active frustum
    pub fn new() -> Self {
        Self::default()
    }
}

impl SceneCuller for BruteForceCuller {
    fn name(&self) -> &'static str {
        "brute_force"
    }

    fn on_add_object(&mut self, _index: usize, _object: &SceneObject) {}

    fn on_del_object(&mut self, _index: usize, _object: &SceneObject) {}

    fn on_object_changed(&mut self, _index: usize, _old: &SceneObject, _new: &SceneObject) {}

    fn clip_scene(
        &mut self,
        objects: &[SceneObject],
        frustum: &Frustum,
        omnidirectional: bool,
        marks: &mut [bool],
    ) {
        debug_assert_eq!(objects.len(), marks.len(), "one mark per object");

        if omnidirectional {
            self.frustum = None;
            mark_omnidirectional(objects, marks);
            return;
        }
        self.frustum = Some(*frustum);

        for (mark, object) in marks.iter_mut().zip(objects) {
            *mark = direct_object_visible(object, frustum);
        }
    }

    fn aabb_visible(&self, aabb: &AABB) -> bool {
        frustum_visible(self.frustum.as_ref(), aabb)
    }

    fn obb_visible(&self, obb: &OBB) -> bool {
        frustum_visible(self.frustum.as_ref(), obb)
    }

    fn sphere_visible(&self, sphere: &BoundingSphere) -> bool {
        frustum_visible(self.frustum.as_ref(), sphere)
    }

    fn clear(&mut self) {
        self.frustum = None;
    }
}
