//! Shared constants for the storage backend.

/// URI scheme under which this backend is registered.
pub const FILE_SCHEME: &str = "file";

/// Storage root used when the hosting configuration supplies none.
pub const DEFAULT_ROOT_DIR: &str = "/data";

/// Extension given to every stored instance file.
pub const DCM_EXTENSION: &str = "dcm";
