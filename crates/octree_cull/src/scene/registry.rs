//! Ordered object registry
//!
//! Objects are addressed by their position. Erasing shifts every later
//! object down by one, so any cache of indices must be repaired by whoever
//! owns it (see [`crate::scene::SceneManager::del_object`]).

use super::SceneObject;

/// Owns the authoritative, ordered list of scene objects
#[derive(Debug, Default, Clone)]
pub struct SceneObjectRegistry {
    objects: Vec<SceneObject>,
}

impl SceneObjectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an object and return its index
    pub fn add(&mut self, object: SceneObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Erase the object at `index`, compacting the indices after it
    pub fn remove(&mut self, index: usize) -> Option<SceneObject> {
        (index < self.objects.len()).then(|| self.objects.remove(index))
    }

    /// Object at `index`
    pub fn get(&self, index: usize) -> Option<&SceneObject> {
        self.objects.get(index)
    }

    /// Mutable object at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut SceneObject> {
        self.objects.get_mut(index)
    }

    /// All objects in index order
    pub fn as_slice(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Iterate objects in index order
    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    /// Number of registered objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the registry holds no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Remove every object
    pub fn clear(&mut self) {
        self.objects.clear();
    }
}
