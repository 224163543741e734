//! Octree spatial partitioning structure
//!
//! Static scene objects are indexed in a flat array of nodes, level by level.
//! A node that owns more than one object is split into 8 octants about its
//! center; an object is copied into every octant its box reaches, so objects
//! straddling a split plane live in several siblings. The level table
//! (`base_address`) records where each depth starts in the flat array.
//!
//! Per frame the tree is classified top-down against the frustum and the
//! classification is turned into per-object visibility marks. Nodes are only
//! descended while they straddle the frustum; fully inside subtrees are
//! marked by forcing, fully outside subtrees are skipped.

use crate::bounds::{Bound, BoundOverlap, Frustum, AABB};
use crate::scene::SceneObject;

/// Deepest level the builder will ever create
pub const MAX_TREE_DEPTH: u8 = 16;

/// Per-frame classification of a node against the frustum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeVisibility {
    /// Not visited by the current classification pass
    #[default]
    Unclassified,
    /// Entirely inside the frustum
    Yes,
    /// Entirely outside the frustum
    No,
    /// Straddles the frustum
    Partial,
}

impl From<BoundOverlap> for NodeVisibility {
    fn from(overlap: BoundOverlap) -> Self {
        match overlap {
            BoundOverlap::Yes => Self::Yes,
            BoundOverlap::No => Self::No,
            BoundOverlap::Partial => Self::Partial,
        }
    }
}

/// Single node in the flat octree array
#[derive(Debug, Clone)]
pub struct OctreeNode {
    /// World-space bounds of this node
    pub bbox: AABB,

    /// Index of the first of 8 consecutive children, None for a leaf
    pub first_child_index: Option<usize>,

    /// Registry indices owned by this node (only ever non-empty on leaves)
    pub object_indices: Vec<usize>,

    /// Classification from the current frame
    pub visibility: NodeVisibility,
}

impl OctreeNode {
    fn new(bbox: AABB) -> Self {
        Self {
            bbox,
            first_child_index: None,
            object_indices: Vec::new(),
            visibility: NodeVisibility::Unclassified,
        }
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.first_child_index.is_none()
    }

    /// Flat indices of the 8 children, empty for a leaf
    pub fn children(&self) -> std::ops::Range<usize> {
        self.first_child_index.map_or(0..0, |first| first..first + 8)
    }
}

/// Which halves of a split axis an object reaches
///
/// Anything at or above the split value belongs to the positive half, so a
/// box touching the plane only from above lands on one side.
fn axis_halves(min: f32, max: f32, split: f32) -> (bool, bool) {
    (min < split, max >= split)
}

/// Octants (bit 0 = +X, bit 1 = +Y, bit 2 = +Z) reached by `object` when
/// `parent` is split about its center
fn overlapped_octants(parent: &AABB, object: &AABB) -> impl Iterator<Item = usize> {
    let center = parent.center();
    let x = axis_halves(object.min.x, object.max.x, center.x);
    let y = axis_halves(object.min.y, object.max.y, center.y);
    let z = axis_halves(object.min.z, object.max.z, center.z);
    let reaches = |(negative, positive): (bool, bool), bit: usize, octant: usize| {
        if octant & bit != 0 { positive } else { negative }
    };

    (0..8).filter(move |&octant| {
        reaches(x, 1, octant) && reaches(y, 2, octant) && reaches(z, 4, octant)
    })
}

/// Flat-array octree over static scene objects
#[derive(Debug, Clone)]
pub struct Octree {
    nodes: Vec<OctreeNode>,

    /// Starting flat index of each depth level, `max_depth + 2` entries
    base_address: Vec<usize>,

    max_depth: u8,

    /// Distinct objects indexed by the last build
    object_count: usize,
}

impl Default for Octree {
    fn default() -> Self {
        Self::build(&[], 0)
    }
}

impl Octree {
    /// Build the tree from `(registry index, world bounds)` pairs
    ///
    /// `max_depth` is clamped to [`MAX_TREE_DEPTH`]. The result depends only on
    /// the order and contents of `objects`.
    pub fn build(objects: &[(usize, AABB)], max_depth: u8) -> Self {
        let max_depth = max_depth.min(MAX_TREE_DEPTH);
        let root_bbox = AABB::union_all(objects.iter().map(|(_, bbox)| bbox)).unwrap_or_default();

        // While building, nodes hold positions into `objects`
        let mut nodes = vec![OctreeNode::new(root_bbox)];
        nodes[0].object_indices = (0..objects.len()).collect();

        let mut base_address = vec![0, 1];
        for depth in 1..=usize::from(max_depth) {
            for parent in base_address[depth - 1]..base_address[depth] {
                if nodes[parent].object_indices.len() <= 1 {
                    continue;
                }

                let parent_bbox = nodes[parent].bbox;
                let first_child = nodes.len();
                nodes.extend((0..8).map(|octant| OctreeNode::new(parent_bbox.octant(octant))));

                for position in std::mem::take(&mut nodes[parent].object_indices) {
                    for octant in overlapped_octants(&parent_bbox, &objects[position].1) {
                        nodes[first_child + octant].object_indices.push(position);
                    }
                }
                nodes[parent].first_child_index = Some(first_child);
            }
            base_address.push(nodes.len());
        }

        for node in &mut nodes {
            for entry in &mut node.object_indices {
                *entry = objects[*entry].0;
            }
        }

        Self {
            nodes,
            base_address,
            max_depth,
            object_count: objects.len(),
        }
    }

    /// All nodes, root first, level by level
    pub fn nodes(&self) -> &[OctreeNode] {
        &self.nodes
    }

    /// The root node
    pub fn root(&self) -> &OctreeNode {
        &self.nodes[0]
    }

    /// Starting flat index of each depth level
    pub fn base_address(&self) -> &[usize] {
        &self.base_address
    }

    /// Depth limit this tree was built with
    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// Number of distinct objects indexed by the last build
    pub fn object_count(&self) -> usize {
        self.object_count
    }

    /// Whether the tree indexes no objects
    pub fn is_empty(&self) -> bool {
        self.object_count == 0
    }

    /// Depth of the node at `index`, found through the level table
    pub fn depth_of(&self, index: usize) -> usize {
        debug_assert!(index < self.nodes.len(), "node {index} out of range");
        self.base_address
            .windows(2)
            .position(|level| index < level[1])
            .unwrap_or(self.base_address.len() - 2)
    }

    /// Classify every reachable node against `frustum`
    ///
    /// All nodes are first reset to [`NodeVisibility::Unclassified`]; only
    /// children of `Partial` nodes are visited afterwards.
    pub fn classify(&mut self, frustum: &Frustum) {
        self.reset_classification();

        if self.is_empty() {
            self.nodes[0].visibility = NodeVisibility::No;
        } else {
            self.classify_node(0, frustum);
        }
    }

    /// Forget the current classification; bound queries then reject nothing
    pub fn reset_classification(&mut self) {
        for node in &mut self.nodes {
            node.visibility = NodeVisibility::Unclassified;
        }
    }

    fn classify_node(&mut self, index: usize, frustum: &Frustum) {
        let node = &mut self.nodes[index];
        let overlap = frustum.intersect_aabb(&node.bbox);
        node.visibility = overlap.into();

        if overlap == BoundOverlap::Partial {
            for child in node.children() {
                self.classify_node(child, frustum);
            }
        }
    }

    /// Turn the current classification into per-object visibility marks
    ///
    /// Marks are only ever raised: an object already marked by one node is
    /// not retested by a sibling that also owns it. Objects hidden by the
    /// user are skipped. Returns the number of precise object tests run.
    pub fn mark_objects(&self, objects: &[SceneObject], frustum: &Frustum, marks: &mut [bool]) -> usize {
        let mut tests = 0;
        self.mark_node(0, false, objects, frustum, marks, &mut tests);
        tests
    }

    fn mark_node(
        &self,
        index: usize,
        force: bool,
        objects: &[SceneObject],
        frustum: &Frustum,
        marks: &mut [bool],
        tests: &mut usize,
    ) {
        let node = &self.nodes[index];
        if node.visibility == NodeVisibility::No && !force {
            return;
        }

        for &object_index in &node.object_indices {
            debug_assert!(object_index < objects.len(), "stale object index {object_index}");
            let object = &objects[object_index];
            if !marks[object_index] && object.visible {
                marks[object_index] = frustum.intersect_aabb(&object.bounds).is_visible();
                *tests += 1;
            }
        }

        let force = force || node.visibility == NodeVisibility::Yes;
        for child in node.children() {
            self.mark_node(child, force, objects, frustum, marks, tests);
        }
    }

    /// Repair stored indices after registry entry `removed` was erased
    ///
    /// Entries equal to `removed` are dropped and larger entries shift down
    /// by one, mirroring the registry's own compaction.
    pub fn adjust_indices(&mut self, removed: usize) {
        for node in &mut self.nodes {
            node.object_indices.retain(|&index| index != removed);
            for index in &mut node.object_indices {
                if *index > removed {
                    *index -= 1;
                }
            }
        }
    }

    /// Conservative tree-side answer to "could this bound be visible"
    ///
    /// Uses the classification from the last [`Octree::classify`]. Bounds
    /// outside the root box, and any query on an empty tree, answer `true`
    /// so that nothing the tree knows nothing about is ever rejected here.
    pub fn bound_visible<B: Bound>(&self, bound: &B) -> bool {
        if self.is_empty() || !bound.overlaps_aabb(&self.root().bbox) {
            return true;
        }
        self.bound_visible_node(0, bound)
    }

    fn bound_visible_node<B: Bound>(&self, index: usize, bound: &B) -> bool {
        let node = &self.nodes[index];
        if !bound.overlaps_aabb(&node.bbox) {
            return false;
        }

        match node.visibility {
            NodeVisibility::Yes | NodeVisibility::Unclassified => true,
            NodeVisibility::No => false,
            NodeVisibility::Partial => {
                node.is_leaf() || node.children().any(|child| self.bound_visible_node(child, bound))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use std::collections::BTreeSet;

    fn point(x: f32, y: f32, z: f32) -> AABB {
        let p = Vec3::new(x, y, z);
        AABB::new(p, p)
    }

    /// The 8 corners of the unit cube (indexed like octants) plus its center
    fn corners_and_center() -> Vec<(usize, AABB)> {
        let cube = AABB::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let mut objects: Vec<(usize, AABB)> = (0..8)
            .map(|i| {
                let c = cube.corner(i);
                (i, point(c.x, c.y, c.z))
            })
            .collect();
        objects.push((8, point(0.5, 0.5, 0.5)));
        objects
    }

    fn stored_indices(octree: &Octree) -> BTreeSet<usize> {
        octree.nodes().iter().flat_map(|n| n.object_indices.iter().copied()).collect()
    }

    fn scene_objects(objects: &[(usize, AABB)]) -> Vec<SceneObject> {
        objects.iter().map(|(_, bbox)| SceneObject::static_cullable(*bbox)).collect()
    }

    #[test]
    fn test_empty_build() {
        let mut octree = Octree::build(&[], 4);

        assert_eq!(octree.nodes().len(), 1);
        assert!(octree.root().is_leaf());
        assert_eq!(octree.root().bbox, AABB::zero());
        assert_eq!(octree.base_address(), &[0, 1, 1, 1, 1, 1]);

        // Always outside, even for a frustum enclosing the origin
        let frustum = Frustum::from_aabb(&AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0)));
        octree.classify(&frustum);
        assert_eq!(octree.root().visibility, NodeVisibility::No);
    }

    #[test]
    fn test_single_object_never_splits() {
        let octree = Octree::build(&[(3, point(1.0, 2.0, 3.0))], 16);

        assert_eq!(octree.nodes().len(), 1);
        assert_eq!(octree.root().object_indices, vec![3]);
        assert_eq!(octree.base_address().len(), 18);
    }

    #[test]
    fn test_depth_is_clamped() {
        let octree = Octree::build(&corners_and_center(), 200);

        assert_eq!(octree.max_depth(), MAX_TREE_DEPTH);
        assert_eq!(octree.base_address().len(), usize::from(MAX_TREE_DEPTH) + 2);
    }

    #[test]
    fn test_corners_and_center_split() {
        let octree = Octree::build(&corners_and_center(), 2);
        let nodes = octree.nodes();

        // Root splits once
        assert_eq!(octree.base_address(), &[0, 1, 9, 17]);
        assert_eq!(nodes[0].first_child_index, Some(1));
        assert!(nodes[0].object_indices.is_empty());

        // Octants 0..6 each keep their own corner; the center sits exactly on
        // every split plane and therefore goes to the all-positive octant
        for octant in 0..7 {
            let child = &nodes[1 + octant];
            assert!(child.is_leaf());
            assert_eq!(child.object_indices, vec![octant]);
        }

        // Octant 7 holds corner 7 plus the center and splits at depth 2
        let high = &nodes[8];
        assert_eq!(high.first_child_index, Some(9));
        let grandchildren = &nodes[9..17];
        assert_eq!(grandchildren[0].object_indices, vec![8]);
        assert_eq!(grandchildren[7].object_indices, vec![7]);
        assert!(grandchildren[1..7].iter().all(|n| n.object_indices.is_empty()));
    }

    #[test]
    fn test_rebuild_completeness_and_depth_bound() {
        let objects: Vec<(usize, AABB)> = (0..40)
            .map(|i| {
                let f = i as f32;
                let center = Vec3::new((f * 7.3) % 20.0, (f * 3.1) % 20.0, (f * 5.7) % 20.0);
                (i, AABB::from_center_extents(center, Vec3::new(0.8, 0.8, 0.8)))
            })
            .collect();
        let octree = Octree::build(&objects, 3);

        let expected: BTreeSet<usize> = (0..40).collect();
        assert_eq!(stored_indices(&octree), expected);

        assert_eq!(octree.base_address().len(), 5);
        assert_eq!(*octree.base_address().last().unwrap(), octree.nodes().len());
        for (index, node) in octree.nodes().iter().enumerate() {
            let depth = octree.depth_of(index);
            assert!(depth <= 3, "node {index} at depth {depth}");
            if depth == 3 {
                assert!(node.is_leaf());
            }
            if !node.is_leaf() {
                assert!(node.object_indices.is_empty());
            }
        }
    }

    #[test]
    fn test_straddling_object_is_duplicated() {
        let objects = vec![
            (0, AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0))),
            (1, AABB::new(Vec3::new(3.0, 3.0, 3.0), Vec3::new(4.0, 4.0, 4.0))),
            // Spans the x split plane at 2.0
            (2, AABB::new(Vec3::new(1.5, 0.0, 0.0), Vec3::new(2.5, 0.5, 0.5))),
        ];
        let octree = Octree::build(&objects, 1);

        let holders: Vec<usize> = octree
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, n)| n.object_indices.contains(&2))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(holders, vec![1, 2]);
    }

    #[test]
    fn test_classify_stops_at_definite_nodes() {
        let mut octree = Octree::build(&corners_and_center(), 2);
        // Encloses octant 7 exactly
        let frustum = Frustum::from_aabb(&AABB::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 1.0, 1.0)));
        octree.classify(&frustum);
        let nodes = octree.nodes();

        assert_eq!(nodes[0].visibility, NodeVisibility::Partial);
        assert_eq!(nodes[8].visibility, NodeVisibility::Yes);
        // Children of a definite node are left alone
        assert!(nodes[9..17].iter().all(|n| n.visibility == NodeVisibility::Unclassified));
        // Octant 0 only touches the frustum at a corner, which is not a rejection
        assert_eq!(nodes[1].visibility, NodeVisibility::Partial);
    }

    #[test]
    fn test_mark_enclosed_octant_only() {
        let objects = corners_and_center();
        let mut octree = Octree::build(&objects, 2);
        let scene = scene_objects(&objects);
        let frustum = Frustum::from_aabb(&AABB::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 1.0, 1.0)));

        octree.classify(&frustum);
        let mut marks = vec![false; scene.len()];
        octree.mark_objects(&scene, &frustum, &mut marks);

        for corner in 0..7 {
            assert!(!marks[corner], "corner {corner} should be culled");
        }
        assert!(marks[7]);
        assert!(marks[8]);
    }

    #[test]
    fn test_marks_merge_with_or() {
        let objects = corners_and_center();
        let mut octree = Octree::build(&objects, 2);
        let scene = scene_objects(&objects);
        let frustum = Frustum::from_aabb(&AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(0.1, 0.1, 0.1)));

        octree.classify(&frustum);
        // A mark raised elsewhere earlier in the frame survives the pass
        let mut marks = vec![false; scene.len()];
        marks[7] = true;
        octree.mark_objects(&scene, &frustum, &mut marks);

        assert!(marks[0]);
        assert!(marks[7]);
        assert!(!marks[8]);
    }

    #[test]
    fn test_hidden_objects_are_not_marked() {
        let objects = corners_and_center();
        let mut octree = Octree::build(&objects, 2);
        let mut scene = scene_objects(&objects);
        scene[0].visible = false;
        let frustum = Frustum::from_aabb(&AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(2.0, 2.0, 2.0)));

        octree.classify(&frustum);
        let mut marks = vec![false; scene.len()];
        octree.mark_objects(&scene, &frustum, &mut marks);

        assert!(!marks[0]);
        assert!(marks[1..].iter().all(|&m| m));
    }

    #[test]
    fn test_adjust_indices() {
        // Registry indices 0, 2, 4, ... are static; the odd ones live outside the tree
        let objects: Vec<(usize, AABB)> = corners_and_center()
            .into_iter()
            .map(|(i, bbox)| (i * 2, bbox))
            .collect();
        let mut octree = Octree::build(&objects, 2);
        let before: Vec<Vec<usize>> = octree.nodes().iter().map(|n| n.object_indices.clone()).collect();

        octree.adjust_indices(5);

        for (node, old) in octree.nodes().iter().zip(&before) {
            let expected: Vec<usize> = old.iter().map(|&i| if i > 5 { i - 1 } else { i }).collect();
            assert_eq!(node.object_indices, expected);
        }
        // Old index 6 now occupies 5; nothing stored was equal to 5
        let expected: BTreeSet<usize> = [0, 2, 4, 5, 7, 9, 11, 13, 15].into_iter().collect();
        assert_eq!(stored_indices(&octree), expected);

        // Erasing a stored index drops it, and the one above slides into its place
        octree.adjust_indices(4);
        let expected: BTreeSet<usize> = [0, 2, 4, 6, 8, 10, 12, 14].into_iter().collect();
        assert_eq!(stored_indices(&octree), expected);
    }

    #[test]
    fn test_bound_visible_outside_root_is_conservative() {
        let mut octree = Octree::build(&corners_and_center(), 2);
        let frustum = Frustum::from_aabb(&AABB::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 1.0, 1.0)));
        octree.classify(&frustum);

        let far_away = AABB::new(Vec3::new(10.0, 10.0, 10.0), Vec3::new(11.0, 11.0, 11.0));
        assert!(octree.bound_visible(&far_away));
    }

    #[test]
    fn test_bound_visible_follows_classification() {
        let mut octree = Octree::build(&corners_and_center(), 2);
        let frustum = Frustum::from_aabb(&AABB::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 1.0, 1.0)));
        octree.classify(&frustum);

        // Inside the Yes octant
        let inside = AABB::new(Vec3::new(0.7, 0.7, 0.7), Vec3::new(0.8, 0.8, 0.8));
        assert!(octree.bound_visible(&inside));

        // Deep in octant 0: a Partial leaf, so still conservatively visible
        let low = AABB::new(Vec3::new(0.1, 0.1, 0.1), Vec3::new(0.2, 0.2, 0.2));
        assert!(octree.bound_visible(&low));
    }

    #[test]
    fn test_bound_visible_rejects_no_nodes() {
        let objects = corners_and_center();
        let mut octree = Octree::build(&objects, 2);
        let frustum = Frustum::from_aabb(&AABB::new(Vec3::new(0.6, 0.6, 0.6), Vec3::new(0.9, 0.9, 0.9)));
        octree.classify(&frustum);

        // Octant 0 does not touch [0.6, 0.9]³ at all
        assert_eq!(octree.nodes()[1].visibility, NodeVisibility::No);
        let low = AABB::new(Vec3::new(0.1, 0.1, 0.1), Vec3::new(0.2, 0.2, 0.2));
        assert!(!octree.bound_visible(&low));
    }
}
