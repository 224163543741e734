//! Scene objects as seen by the culling passes

use bitflags::bitflags;

use crate::bounds::AABB;

bitflags! {
    /// Capability flags evaluated once when an object is registered
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectAttrib: u32 {
        /// May be rejected by frustum culling
        const CULLABLE = 1 << 0;
        /// Drawn in the overlay pass (HUD, UI); never spatially indexed
        const OVERLAY = 1 << 1;
        /// Moves every frame; tested individually instead of stored in the tree
        const MOVEABLE = 1 << 2;
    }
}

impl ObjectAttrib {
    /// Whether an object with these flags belongs in the spatial tree
    ///
    /// Only static, cullable, non-overlay objects are indexed.
    pub fn is_tree_resident(self) -> bool {
        self.contains(Self::CULLABLE) && !self.intersects(Self::OVERLAY | Self::MOVEABLE)
    }
}

impl Default for ObjectAttrib {
    fn default() -> Self {
        Self::CULLABLE
    }
}

/// A scene object's world bounds, attributes and user visibility
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// World-space bounding box
    pub bounds: AABB,
    /// Capability flags
    pub attrib: ObjectAttrib,
    /// Set by the application; hidden objects are never marked visible
    pub visible: bool,
}

impl SceneObject {
    /// Visible object with the given bounds and flags
    pub fn new(bounds: AABB, attrib: ObjectAttrib) -> Self {
        Self { bounds, attrib, visible: true }
    }

    /// Static cullable object, the kind stored in the octree
    pub fn static_cullable(bounds: AABB) -> Self {
        Self::new(bounds, ObjectAttrib::CULLABLE)
    }

    /// Moving cullable object, tested individually every frame
    pub fn moveable(bounds: AABB) -> Self {
        Self::new(bounds, ObjectAttrib::CULLABLE | ObjectAttrib::MOVEABLE)
    }

    /// Overlay object, drawn whenever it is visible to the user
    pub fn overlay(bounds: AABB) -> Self {
        Self::new(bounds, ObjectAttrib::CULLABLE | ObjectAttrib::OVERLAY)
    }

    /// Builder-style setter for the user visibility flag
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Shorthand for [`ObjectAttrib::is_tree_resident`]
    pub fn is_tree_resident(&self) -> bool {
        self.attrib.is_tree_resident()
    }
}
