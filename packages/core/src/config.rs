//! Runtime store configuration
//!
//! `StoreConfig` is built once at startup, usually from environment variables, and
//! handed to `JsonFileStore::from_config` and `TreeService::with_config`.
//!
//! # Environment Variables
//!
//! - `NAVTREE_DATA_DIR`: Directory holding the snapshot (default: `data`)
//! - `NAVTREE_RESOURCE_KEY`: Snapshot file name (default: `treeData.json`)
//! - `NAVTREE_DELETE_TIMEOUT_SECS`: Time budget for a delete (default: 60)

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_RESOURCE_KEY: &str = "treeData.json";
pub const DEFAULT_DELETE_TIMEOUT_SECS: u64 = 60;

/// Deepest nesting level a node may be placed at (top-level nodes are level 1).
///
/// Each level costs two JSON nesting levels in the snapshot (the node object and its
/// `subList` array) and `serde_json` refuses documents nested deeper than 128. The
/// remaining headroom is left for nested metadata such as `permissionListJson`.
pub const MAX_TREE_DEPTH: usize = 48;

/// Where the snapshot lives and how long deletes may take
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding the snapshot file
    pub data_dir: PathBuf,

    /// Fixed key (file name) of the snapshot resource
    pub resource_key: String,

    /// Upper bound for load + content cleanup + splice during a delete
    pub delete_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            resource_key: DEFAULT_RESOURCE_KEY.to_string(),
            delete_timeout: Duration::from_secs(DEFAULT_DELETE_TIMEOUT_SECS),
        }
    }
}

impl StoreConfig {
    /// Read configuration from the process environment, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unset, empty or unparsable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let data_dir = non_empty("NAVTREE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let resource_key = non_empty("NAVTREE_RESOURCE_KEY").unwrap_or(defaults.resource_key);

        let delete_timeout = non_empty("NAVTREE_DELETE_TIMEOUT_SECS")
            .and_then(|secs| secs.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.delete_timeout);

        Self {
            data_dir,
            resource_key,
            delete_timeout,
        }
    }

    /// Full path of the snapshot file
    pub fn resource_path(&self) -> PathBuf {
        self.data_dir.join(&self.resource_key)
    }
}
