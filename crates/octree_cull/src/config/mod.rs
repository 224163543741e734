//! Configuration system

pub use serde::{Deserialize, Serialize};

use crate::spatial::MAX_TREE_DEPTH;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a `.toml` or `.ron` file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration, choosing the format from the extension
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Which culling strategy the scene manager uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CullerKind {
    /// Static objects indexed in an octree
    #[default]
    Octree,
    /// Every object tested individually
    BruteForce,
}

/// Culling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullingConfig {
    /// Culling strategy
    pub culler: CullerKind,

    /// Octree depth limit, clamped to 16
    pub max_tree_depth: u32,

    /// Projected area at or below which cullable objects are hidden; 0 disables
    pub small_object_threshold: f32,
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self {
            culler: CullerKind::Octree,
            max_tree_depth: 4,
            small_object_threshold: 0.0,
        }
    }
}

impl CullingConfig {
    /// Depth limit after clamping
    pub fn clamped_tree_depth(&self) -> u8 {
        self.max_tree_depth.min(u32::from(MAX_TREE_DEPTH)) as u8
    }
}

impl Config for CullingConfig {}
