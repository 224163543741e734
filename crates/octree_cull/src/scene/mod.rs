//! Scene objects, the object registry and the culling facade

mod object;
mod registry;
mod scene_manager;
pub(crate) mod culler;

pub use object::{ObjectAttrib, SceneObject};
pub use registry::SceneObjectRegistry;
pub use culler::{BruteForceCuller, SceneCuller};
pub use scene_manager::{SceneError, SceneManager};
