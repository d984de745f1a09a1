//! PACS File Storage
//!
//! This crate provides the filesystem storage backend for a DICOM imaging
//! archive. Given a DICOM instance, it derives a deterministic directory
//! hierarchy from the instance's metadata, persists the encoded instance
//! there, and supports retrieval, enumeration, and deletion of stored
//! instances addressed by a `file:`-scheme location.
//!
//! ## Design Principles
//!
//! - Path derivation is pure: the same metadata always yields the same path,
//!   so re-stored instances overwrite rather than duplicate
//! - Incomplete metadata never blocks ingestion: every missing or malformed
//!   attribute degrades to a documented sentinel segment
//! - Enumeration is lazy: directory trees are walked on demand and file
//!   handles are opened only when the caller asks for a byte stream
//! - The DICOM encoding itself is opaque: this crate reads named attributes
//!   and moves encoded bytes, nothing more
//!
//! ## Storage Layout
//!
//! ```text
//! <root>/
//! └── <institution>/
//!     └── <modality>/
//!         └── <YYYY>/<MM>/<DD>/        # or UN_DATE/
//!             └── <accession-or-fallback>/
//!                 └── <sop-instance-uid>.dcm
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use pacs_storage::{FileStorage, StorageInterface};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = FileStorage::new("/data");
//! storage.enable();
//!
//! let object = dicom_object::open_file("incoming/instance.dcm")?;
//! if let Some(location) = storage.store(&object)? {
//!     for entry in storage.at(&location) {
//!         println!("{} ({} bytes)", entry.location(), entry.size());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod constants;
mod entry;
pub mod layout;
mod location;
mod store;

pub use config::StorageSettings;
pub use constants::{DCM_EXTENSION, DEFAULT_ROOT_DIR, FILE_SCHEME};
pub use entry::{Enumeration, StoredEntry};
pub use layout::InstancePath;
pub use location::StorageLocation;
pub use store::{FileStorage, StorageInterface};

/// Errors that can occur while storing or reading instances
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Creating a parent directory under the storage root failed
    #[error("failed to create storage directory: {0}")]
    DirCreation(std::io::Error),

    /// Opening the destination file for writing failed
    #[error("failed to create destination file: {0}")]
    FileCreate(std::io::Error),

    /// Flushing buffered output to the destination file failed
    #[error("failed to flush destination file: {0}")]
    FileFlush(std::io::Error),

    /// Encoding the DICOM object into the destination failed
    #[error("failed to write DICOM object: {0}")]
    ObjectWrite(#[from] dicom_object::WriteError),

    /// Decoding a DICOM object from a byte source failed
    #[error("failed to read DICOM object: {0}")]
    ObjectRead(#[from] dicom_object::ReadError),

    /// Reading raw bytes from a source stream failed
    #[error("failed to read source stream: {0}")]
    StreamRead(std::io::Error),

    /// Opening a stored file for reading failed
    #[error("failed to open stored file: {0}")]
    FileOpen(std::io::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;
