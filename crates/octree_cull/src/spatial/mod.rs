//! Spatial partitioning for visibility culling

mod octree;
mod octree_culler;

pub use octree::{NodeVisibility, Octree, OctreeNode, MAX_TREE_DEPTH};
pub use octree_culler::{CullStats, OctreeCuller};
