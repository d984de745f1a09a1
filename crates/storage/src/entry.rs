//! Lazy enumeration of stored instances.
//!
//! [`Enumeration`] is the single-pass iterator returned by
//! [`FileStorage::at`](crate::FileStorage::at). It wraps a depth-first
//! [`walkdir`] walk and yields one [`StoredEntry`] per regular file as the
//! consumer advances; nothing is materialised up front and the underlying
//! file is opened only when the caller asks for its byte stream.
//!
//! Enumeration observes whatever is on disk at walk time. A file seen during
//! the walk may have vanished by the time its stream is opened; that failure
//! surfaces from [`StoredEntry::open`], independent of the rest of the
//! sequence.

use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use dicom_object::DefaultDicomObject;
use tracing::warn;

use crate::{StorageError, StorageLocation, StorageResult};

/// A single stored instance resolved during enumeration.
///
/// Carries the file's location and size; the byte stream is opened on
/// demand. Valid only as long as the underlying file exists.
#[derive(Debug)]
pub struct StoredEntry {
    path: PathBuf,
    size: u64,
}

impl StoredEntry {
    pub(crate) fn new(path: PathBuf) -> Self {
        // Size is best-effort: a file that vanished between walk and stat
        // reports zero and fails later at open time instead.
        let size = fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0);
        Self { path, size }
    }

    /// Returns the `file`-scheme location of this entry.
    pub fn location(&self) -> StorageLocation {
        StorageLocation::file(&self.path)
    }

    /// Returns the filesystem path of this entry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the file size in bytes as observed at enumeration time.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Opens a buffered byte stream over the stored file.
    pub fn open(&self) -> StorageResult<BufReader<fs::File>> {
        let file = fs::File::open(&self.path).map_err(StorageError::FileOpen)?;
        Ok(BufReader::new(file))
    }

    /// Decodes the stored file back into a DICOM object.
    pub fn read_object(&self) -> StorageResult<DefaultDicomObject> {
        Ok(dicom_object::open_file(&self.path)?)
    }
}

/// Lazy, finite, single-pass sequence of [`StoredEntry`] values.
///
/// Produced by [`FileStorage::at`](crate::FileStorage::at); a fresh call is
/// needed to re-enumerate. Iteration order within a directory is
/// filesystem-dependent.
#[derive(Debug)]
pub struct Enumeration {
    inner: Inner,
}

#[derive(Debug)]
enum Inner {
    Empty,
    Single(Option<PathBuf>),
    Walk(walkdir::IntoIter),
}

impl Enumeration {
    /// An enumeration that yields nothing (scheme mismatch).
    pub(crate) fn empty() -> Self {
        Self {
            inner: Inner::Empty,
        }
    }

    /// An enumeration over exactly one file path.
    ///
    /// The path is not checked for existence; a missing file fails when the
    /// consumer opens its stream.
    pub(crate) fn single(path: PathBuf) -> Self {
        Self {
            inner: Inner::Single(Some(path)),
        }
    }

    /// A recursive depth-first walk over a directory subtree.
    pub(crate) fn walk(directory: PathBuf) -> Self {
        Self {
            inner: Inner::Walk(walkdir::WalkDir::new(directory).into_iter()),
        }
    }
}

impl Iterator for Enumeration {
    type Item = StoredEntry;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Empty => None,
            Inner::Single(slot) => slot.take().map(StoredEntry::new),
            Inner::Walk(walk) => {
                for entry in walk {
                    match entry {
                        Ok(entry) if entry.file_type().is_file() => {
                            return Some(StoredEntry::new(entry.into_path()));
                        }
                        Ok(_) => continue,
                        Err(error) => {
                            warn!("skipping unreadable entry during enumeration: {error}");
                            continue;
                        }
                    }
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    #[test]
    fn test_walk_yields_only_regular_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b")).unwrap();
        fs::write(temp.path().join("a/one.dcm"), b"one").unwrap();
        fs::write(temp.path().join("a/b/two.dcm"), b"second").unwrap();

        let names: BTreeSet<String> = Enumeration::walk(temp.path().to_path_buf())
            .map(|entry| {
                entry
                    .path()
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();

        assert_eq!(
            names,
            BTreeSet::from(["one.dcm".to_string(), "two.dcm".to_string()])
        );
    }

    #[test]
    fn test_entry_size_and_stream() {
        use std::io::Read;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("instance.dcm");
        fs::write(&path, b"payload").unwrap();

        let entry = Enumeration::single(path).next().unwrap();
        assert_eq!(entry.size(), 7);
        assert!(entry.location().to_string().starts_with("file:"));

        let mut contents = Vec::new();
        entry.open().unwrap().read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"payload");
    }

    #[test]
    fn test_single_missing_file_fails_only_at_open() {
        let temp = TempDir::new().unwrap();
        let entry = Enumeration::single(temp.path().join("gone.dcm"))
            .next()
            .unwrap();

        assert_eq!(entry.size(), 0);
        assert!(matches!(entry.open(), Err(StorageError::FileOpen(_))));
    }

    #[test]
    fn test_empty_enumeration() {
        assert!(Enumeration::empty().next().is_none());
    }

    #[test]
    fn test_walk_of_missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let mut walk = Enumeration::walk(temp.path().join("absent"));
        assert!(walk.next().is_none());
    }
}
