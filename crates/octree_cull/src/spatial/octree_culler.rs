//! Octree-backed scene culler with lazy rebuild
//!
//! The tree is rebuilt only when a query arrives after a structural change.
//! Deleting an object that never lived in the tree is repaired in place.

use crate::bounds::{Bound, BoundingSphere, Frustum, AABB, OBB};
use crate::scene::culler::{direct_object_visible, frustum_visible, mark_omnidirectional};
use crate::scene::{SceneCuller, SceneObject};

use super::{Octree, MAX_TREE_DEPTH};

/// Counters from the most recent [`SceneCuller::clip_scene`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CullStats {
    /// Objects indexed by the tree
    pub tree_objects: usize,
    /// Precise object tests run inside the tree traversal
    pub tree_tests: usize,
    /// Objects outside the tree tested directly
    pub direct_tests: usize,
    /// Whether this pass had to rebuild the tree
    pub rebuilt: bool,
}

/// Scene culler that indexes static objects in an [`Octree`]
#[derive(Debug)]
pub struct OctreeCuller {
    octree: Octree,
    dirty: bool,
    max_tree_depth: u8,
    frustum: Option<Frustum>,
    stats: CullStats,
}

impl Default for OctreeCuller {
    fn default() -> Self {
        Self::new(4)
    }
}

impl OctreeCuller {
    /// Create a culler; the tree is built on the first query
    pub fn new(max_tree_depth: u8) -> Self {
        Self {
            octree: Octree::default(),
            dirty: true,
            max_tree_depth: max_tree_depth.min(MAX_TREE_DEPTH),
            frustum: None,
            stats: CullStats::default(),
        }
    }

    /// Depth limit used by the next rebuild
    pub fn max_tree_depth(&self) -> u8 {
        self.max_tree_depth
    }

    /// Set the depth limit, silently clamped to [`MAX_TREE_DEPTH`]
    pub fn set_max_tree_depth(&mut self, depth: u32) {
        let depth = depth.min(u32::from(MAX_TREE_DEPTH)) as u8;
        if depth != self.max_tree_depth {
            self.max_tree_depth = depth;
            self.mark_dirty();
        }
    }

    /// Force a full rebuild on the next query
    pub fn mark_dirty(&mut self) {
        if !self.dirty {
            log::debug!("Octree marked dirty");
        }
        self.dirty = true;
    }

    /// Whether the tree is stale
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The current tree, possibly stale
    pub fn octree(&self) -> &Octree {
        &self.octree
    }

    /// Counters from the last frame
    pub fn stats(&self) -> CullStats {
        self.stats
    }

    /// Rebuild from the tree-resident objects if anything changed
    pub fn ensure_built(&mut self, objects: &[SceneObject]) {
        if !self.dirty {
            return;
        }

        let resident: Vec<(usize, AABB)> = objects
            .iter()
            .enumerate()
            .filter(|(_, object)| object.is_tree_resident())
            .map(|(index, object)| (index, object.bounds))
            .collect();

        self.octree = Octree::build(&resident, self.max_tree_depth);
        self.dirty = false;
        self.stats.rebuilt = true;

        log::info!(
            "Rebuilt octree: {} objects, {} nodes, depth {}",
            self.octree.object_count(),
            self.octree.nodes().len(),
            self.max_tree_depth
        );
    }

    /// Tree-side part of a bound query; a stale tree cannot reject anything
    fn tree_visible<B: Bound>(&self, bound: &B) -> bool {
        self.dirty || self.octree.bound_visible(bound)
    }

    fn bound_visible<B: Bound>(&self, bound: &B) -> bool {
        self.tree_visible(bound) && frustum_visible(self.frustum.as_ref(), bound)
    }
}

impl SceneCuller for OctreeCuller {
    fn name(&self) -> &'static str {
        "octree"
    }

    fn on_add_object(&mut self, _index: usize, object: &SceneObject) {
        if object.is_tree_resident() {
            self.mark_dirty();
        }
    }

    fn on_del_object(&mut self, index: usize, object: &SceneObject) {
        if object.is_tree_resident() {
            self.mark_dirty();
        } else if !self.dirty {
            log::trace!("Adjusting octree indices after erasing {index}");
            self.octree.adjust_indices(index);
        }
    }

    fn on_object_changed(&mut self, _index: usize, old: &SceneObject, new: &SceneObject) {
        let moved = old.bounds != new.bounds || old.attrib != new.attrib;
        if moved && (old.is_tree_resident() || new.is_tree_resident()) {
            self.mark_dirty();
        }
    }

    fn clip_scene(
        &mut self,
        objects: &[SceneObject],
        frustum: &Frustum,
        omnidirectional: bool,
        marks: &mut [bool],
    ) {
        debug_assert_eq!(objects.len(), marks.len(), "one mark per object");
        marks.fill(false);
        self.stats = CullStats::default();

        if omnidirectional {
            // Nothing may be rejected by a classification from an earlier frame
            self.frustum = None;
            self.octree.reset_classification();
            mark_omnidirectional(objects, marks);
            return;
        }
        self.frustum = Some(*frustum);

        self.ensure_built(objects);
        self.octree.classify(frustum);
        self.stats.tree_objects = self.octree.object_count();
        self.stats.tree_tests = self.octree.mark_objects(objects, frustum, marks);

        for (mark, object) in marks.iter_mut().zip(objects) {
            if !object.is_tree_resident() {
                *mark = direct_object_visible(object, frustum);
                self.stats.direct_tests += 1;
            }
        }

        log::trace!("Octree clip: {:?}", self.stats);
    }

    fn aabb_visible(&self, aabb: &AABB) -> bool {
        self.bound_visible(aabb)
    }

    fn obb_visible(&self, obb: &OBB) -> bool {
        self.bound_visible(obb)
    }

    fn sphere_visible(&self, sphere: &BoundingSphere) -> bool {
        self.bound_visible(sphere)
    }

    fn clear(&mut self) {
        self.octree = Octree::default();
        self.frustum = None;
        self.dirty = true;
    }
}
