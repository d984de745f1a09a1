//! Storage configuration boundary.
//!
//! The hosting archive framework supplies settings once at startup. The only
//! key this backend consumes is the storage root directory; when it is
//! absent, the default is installed back into the settings value so the
//! effective configuration is visible to the host.
//!
//! The root is deliberately not validated here. A malformed or unusable root
//! only manifests as I/O failures on later store operations.

use std::path::PathBuf;

use crate::constants::DEFAULT_ROOT_DIR;

/// Settings consumed by the storage backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StorageSettings {
    /// Directory under which all derived instance paths are resolved.
    #[serde(default)]
    pub root_dir: Option<PathBuf>,
}

impl StorageSettings {
    /// Returns the configured storage root, installing and returning the
    /// default when none is set.
    pub fn resolve_root_dir(&mut self) -> PathBuf {
        self.root_dir
            .get_or_insert_with(|| PathBuf::from(DEFAULT_ROOT_DIR))
            .clone()
    }
}
