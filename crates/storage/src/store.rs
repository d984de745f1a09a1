//! The filesystem storage backend.
//!
//! [`FileStorage`] binds the pure path derivation in [`crate::layout`] to an
//! actual directory tree and provides the store / locate / remove surface the
//! hosting archive framework consumes, described by the [`StorageInterface`]
//! trait.
//!
//! # Concurrency
//!
//! The backend performs no locking. Directory-creation races are tolerated
//! (`create_dir_all` on an existing directory succeeds) and two concurrent
//! stores of the same SOPInstanceUID interleave at the OS level with no
//! defined winner. The enable flag is a relaxed atomic: a reader may observe
//! a stale value arbitrarily close to a concurrent toggle.

use std::fs;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use dicom_object::DefaultDicomObject;
use tracing::{debug, error};

use crate::constants::FILE_SCHEME;
use crate::{layout, Enumeration, StorageError, StorageLocation, StorageResult, StorageSettings};

/// The storage surface exposed to the hosting archive framework.
///
/// Implementations are registered under a fixed URI scheme. While disabled,
/// store and remove are silent no-ops; enumeration is always permitted.
pub trait StorageInterface {
    /// The URI scheme this backend answers to.
    fn scheme(&self) -> &'static str;

    /// Enables writes. Idempotent.
    fn enable(&self);

    /// Disables writes. Idempotent.
    fn disable(&self);

    /// Returns the current state of the write gate.
    fn is_enabled(&self) -> bool;

    /// Stores an instance at its derived path.
    ///
    /// Returns `Ok(None)` while the store is disabled (a no-op, not an
    /// error) and `Ok(Some(location))` on success. On an I/O failure any
    /// partially written file is left on disk; there is no rollback.
    fn store(&self, object: &DefaultDicomObject) -> StorageResult<Option<StorageLocation>>;

    /// Fully decodes an instance from a byte source, then stores it.
    ///
    /// The source may or may not begin with the 128-byte file preamble.
    fn store_stream(&self, source: &mut dyn Read) -> StorageResult<Option<StorageLocation>>;

    /// Deletes the file at a location.
    ///
    /// A no-op while disabled, on a scheme mismatch, or when the file does
    /// not exist.
    fn remove(&self, location: &StorageLocation);

    /// Enumerates stored instances under a location.
    ///
    /// Yields nothing on a scheme mismatch; one entry per regular file under
    /// a directory subtree; exactly one entry for a file path. Independent
    /// of the enable gate.
    fn at(&self, location: &StorageLocation) -> Enumeration;
}

/// Filesystem-backed storage rooted at a configured directory.
///
/// Constructed disabled; the hosting framework enables it after
/// registration. The root is not validated up front - an unusable root
/// surfaces as I/O failures on store.
#[derive(Debug)]
pub struct FileStorage {
    root_dir: PathBuf,
    enabled: AtomicBool,
}

impl FileStorage {
    /// Creates a storage backend rooted at `root_dir`, initially disabled.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            enabled: AtomicBool::new(false),
        }
    }

    /// Creates a storage backend from host-supplied settings, installing the
    /// default root into the settings when none is configured.
    pub fn from_settings(settings: &mut StorageSettings) -> Self {
        Self::new(settings.resolve_root_dir())
    }

    /// Returns the configured storage root.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Returns the `file`-scheme location of the storage root, suitable for
    /// enumerating every stored instance.
    pub fn root_location(&self) -> StorageLocation {
        StorageLocation::file(&self.root_dir)
    }

    fn write_object(
        &self,
        object: &DefaultDicomObject,
        destination: &Path,
    ) -> StorageResult<()> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(StorageError::DirCreation)?;
        }

        let file = fs::File::create(destination).map_err(StorageError::FileCreate)?;
        let mut writer = BufWriter::new(file);
        object.write_all(&mut writer)?;
        writer.flush().map_err(StorageError::FileFlush)?;
        Ok(())
    }
}

impl StorageInterface for FileStorage {
    fn scheme(&self) -> &'static str {
        FILE_SCHEME
    }

    fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn store(&self, object: &DefaultDicomObject) -> StorageResult<Option<StorageLocation>> {
        if !self.is_enabled() {
            debug!("store requested while disabled; nothing written");
            return Ok(None);
        }

        let instance = layout::derive_path(object);
        let destination = self
            .root_dir
            .join(instance.directory())
            .join(instance.file_name());
        debug!(destination = %destination.display(), "storing instance");

        if let Err(err) = self.write_object(object, &destination) {
            error!(destination = %destination.display(), "failed to store instance: {err}");
            return Err(err);
        }

        Ok(Some(StorageLocation::file(destination)))
    }

    fn store_stream(&self, source: &mut dyn Read) -> StorageResult<Option<StorageLocation>> {
        if !self.is_enabled() {
            debug!("store requested while disabled; nothing written");
            return Ok(None);
        }

        let object = decode_object(source)?;
        self.store(&object)
    }

    fn remove(&self, location: &StorageLocation) {
        if !self.is_enabled() {
            return;
        }
        if !location.is_file_scheme() {
            return;
        }

        match fs::remove_file(location.path()) {
            Ok(()) => debug!(location = %location, "removed stored instance"),
            // Removing something that is already gone is not an error.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => error!(location = %location, "failed to remove instance: {err}"),
        }
    }

    fn at(&self, location: &StorageLocation) -> Enumeration {
        if !location.is_file_scheme() {
            return Enumeration::empty();
        }

        let path = location.path().to_path_buf();
        if path.is_dir() {
            Enumeration::walk(path)
        } else {
            Enumeration::single(path)
        }
    }
}

/// Decodes a DICOM object from an arbitrary byte source.
///
/// Accepts input with or without the 128-byte file preamble by looking for
/// the `DICM` magic code at offset 128.
fn decode_object(source: &mut dyn Read) -> StorageResult<DefaultDicomObject> {
    let mut raw = Vec::new();
    source
        .read_to_end(&mut raw)
        .map_err(StorageError::StreamRead)?;

    let encoded = match raw.get(128..132) {
        Some(magic) if magic == b"DICM" => &raw[128..],
        _ => &raw[..],
    };

    Ok(dicom_object::from_reader(encoded)?)
}
