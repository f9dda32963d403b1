//! Octree build parameters.

use serde::{Deserialize, Serialize};

use crate::error::{OctreeError, Result};

/// Deepest subdivision a config may request.
///
/// Coplanar duplicate faces never separate, so every level can multiply
/// the node count by about four along their plane.
pub const MAX_DEPTH_LIMIT: u32 = 8;

/// Parameters controlling octree subdivision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// A node holding more triangles than this is split (unless at max depth).
    pub max_triangles_per_node: usize,
    /// Maximum depth below the root.
    pub max_depth: u32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_triangles_per_node: 16,
            max_depth: 8,
        }
    }
}

impl OctreeConfig {
    /// Config with the given leaf capacity and the default depth of 8.
    pub fn new(max_triangles_per_node: usize) -> Self {
        Self {
            max_triangles_per_node,
            ..Self::default()
        }
    }

    /// Same config with a different maximum depth.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.max_triangles_per_node == 0 {
            return Err(OctreeError::InvalidConfig(
                "max_triangles_per_node must be at least 1".into(),
            ));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(OctreeError::InvalidConfig(format!(
                "max_depth must be at most {MAX_DEPTH_LIMIT}, got {}",
                self.max_depth
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = OctreeConfig::default();
        assert_eq!(config.max_depth, MAX_DEPTH_LIMIT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = OctreeConfig::new(0).validate().unwrap_err();
        assert!(matches!(err, OctreeError::InvalidConfig(_)));
    }

    #[test]
    fn test_depth_limit() {
        assert!(OctreeConfig::new(4).with_max_depth(MAX_DEPTH_LIMIT).validate().is_ok());
        assert!(OctreeConfig::new(4)
            .with_max_depth(MAX_DEPTH_LIMIT + 1)
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: OctreeConfig = serde_json::from_str(r#"{"max_triangles_per_node": 4}"#).unwrap();
        assert_eq!(config, OctreeConfig::new(4));
    }
}
