//! # Octree Cull
//!
//! Frustum visibility culling for scenes of mostly static objects.
//!
//! ## Features
//!
//! - **Flat-array octree**: static cullable objects indexed level by level
//! - **Tri-state classification**: subtrees fully inside or outside are never descended
//! - **Lazy rebuild**: structural changes only mark the tree dirty
//! - **Incremental reindexing**: erasing an object outside the tree repairs indices in place
//! - **Bound queries**: conservative AABB / OBB / sphere visibility checks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use octree_cull::prelude::*;
//!
//! let mut scene = SceneManager::new();
//! scene.add_object(SceneObject::static_cullable(AABB::from_center_extents(
//!     Vec3::zeros(),
//!     Vec3::new(1.0, 1.0, 1.0),
//! )));
//!
//! let camera = CullCamera::perspective(Vec3::new(0.0, 2.0, 10.0), 60.0, 16.0 / 9.0, 0.1, 500.0);
//! let visible = scene.clip_scene(&camera);
//! assert!(visible[0]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::cast_possible_truncation)]

pub mod foundation;
pub mod bounds;
pub mod scene;
pub mod spatial;
pub mod config;

mod camera;

pub use camera::CullCamera;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        CullCamera,
        bounds::{Bound, BoundOverlap, BoundingSphere, Frustum, AABB, OBB},
        config::{Config, CullerKind, CullingConfig},
        foundation::math::{Mat4, Quat, Vec3},
        scene::{BruteForceCuller, ObjectAttrib, SceneCuller, SceneError, SceneManager, SceneObject},
        spatial::{Octree, OctreeCuller},
    };
}
