//! Scheme-qualified storage locations.
//!
//! A [`StorageLocation`] is the identifier handed back by a store operation
//! and accepted by locate/remove. It is a plain value: a scheme plus a
//! filesystem path, with no identity beyond its `scheme:path` string form.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::constants::FILE_SCHEME;

/// A `scheme:path` identifier for a stored file or a directory subtree.
///
/// Locations produced by this backend always carry the `file` scheme;
/// locations with other schemes can be represented (they arrive from the
/// hosting framework) and are treated as "nothing to do" by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageLocation {
    scheme: String,
    path: PathBuf,
}

impl StorageLocation {
    /// Creates a location with an explicit scheme.
    pub fn new(scheme: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            scheme: scheme.into(),
            path: path.into(),
        }
    }

    /// Creates a `file`-scheme location.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(FILE_SCHEME, path)
    }

    /// Returns the scheme component.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the path component.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when this location carries the `file` scheme.
    pub fn is_file_scheme(&self) -> bool {
        self.scheme == FILE_SCHEME
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.path.display())
    }
}

/// Error parsing a `scheme:path` string.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LocationParseError {
    /// The input had no `:` separating scheme from path
    #[error("location has no scheme separator: {0}")]
    MissingScheme(String),
    /// The scheme or path component was empty
    #[error("location has an empty scheme or path: {0}")]
    EmptyComponent(String),
}

impl FromStr for StorageLocation {
    type Err = LocationParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (scheme, path) = input
            .split_once(':')
            .ok_or_else(|| LocationParseError::MissingScheme(input.to_string()))?;

        if scheme.is_empty() || path.is_empty() {
            return Err(LocationParseError::EmptyComponent(input.to_string()));
        }

        Ok(Self::new(scheme, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trip() {
        let location = StorageLocation::file("/data/UN_IN/CT/UN_DATE/ACC1/1.2.dcm");
        let rendered = location.to_string();

        assert_eq!(rendered, "file:/data/UN_IN/CT/UN_DATE/ACC1/1.2.dcm");
        assert_eq!(rendered.parse::<StorageLocation>().unwrap(), location);
    }

    #[test]
    fn test_file_scheme_detection() {
        assert!(StorageLocation::file("/data").is_file_scheme());
        assert!(!StorageLocation::new("http", "/data").is_file_scheme());
    }

    #[test]
    fn test_parse_rejects_missing_scheme() {
        assert_eq!(
            "/data/file.dcm".parse::<StorageLocation>(),
            Err(LocationParseError::MissingScheme("/data/file.dcm".into()))
        );
    }

    #[test]
    fn test_parse_rejects_empty_components() {
        assert!(matches!(
            ":/data".parse::<StorageLocation>(),
            Err(LocationParseError::EmptyComponent(_))
        ));
        assert!(matches!(
            "file:".parse::<StorageLocation>(),
            Err(LocationParseError::EmptyComponent(_))
        ));
    }
}
