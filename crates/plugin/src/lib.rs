//! Archive-framework registration surface for the PACS file storage backend.
//!
//! The hosting archive framework discovers storage backends through a plugin
//! set: a named bundle that owns one ready-to-use storage backend. This
//! crate wires [`pacs_storage::FileStorage`] into that shape - it resolves
//! the storage root from host-supplied settings (installing the default when
//! absent), constructs the backend, and enables it so the host can start
//! routing stores immediately.
//!
//! Lifecycle beyond registration (pausing writes, re-enabling) goes through
//! the [`StorageInterface`] surface on the backend itself.

use pacs_storage::{FileStorage, StorageInterface, StorageSettings};
use tracing::info;

/// Human-readable name under which the backend is registered.
pub const PLUGIN_NAME: &str = "pacs-file-storage";

/// A plugin set bundling one enabled file storage backend.
#[derive(Debug)]
pub struct StoragePluginSet {
    storage: FileStorage,
}

impl StoragePluginSet {
    /// Builds the plugin set from host settings.
    ///
    /// Missing settings keys are filled in with defaults and written back so
    /// the host sees the effective configuration. The storage backend is
    /// enabled before registration.
    pub fn new(settings: &mut StorageSettings) -> Self {
        let storage = FileStorage::from_settings(settings);
        storage.enable();
        info!(
            name = PLUGIN_NAME,
            root = %storage.root_dir().display(),
            "registered file storage backend"
        );

        Self { storage }
    }

    /// Returns the fixed registration name.
    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    /// Returns the storage backend owned by this plugin set.
    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::{DataElement, PrimitiveValue, VR};
    use dicom_dictionary_std::tags;
    use dicom_object::meta::FileMetaTableBuilder;
    use dicom_object::{DefaultDicomObject, InMemDicomObject};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn minimal_object(sop_uid: &str) -> DefaultDicomObject {
        const SECONDARY_CAPTURE: &str = "1.2.840.10008.5.1.4.1.1.7";

        let mut object = InMemDicomObject::new_empty();
        object.put(DataElement::new(
            tags::SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(SECONDARY_CAPTURE),
        ));
        object.put(DataElement::new(
            tags::SOP_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(sop_uid),
        ));
        object.put(DataElement::new(
            tags::MODALITY,
            VR::CS,
            PrimitiveValue::from("CT"),
        ));

        object
            .with_meta(
                FileMetaTableBuilder::new()
                    .media_storage_sop_class_uid(SECONDARY_CAPTURE)
                    .media_storage_sop_instance_uid(sop_uid)
                    .transfer_syntax("1.2.840.10008.1.2.1"),
            )
            .expect("valid file meta")
    }

    #[test]
    fn test_plugin_set_is_enabled_on_construction() {
        let temp = TempDir::new().unwrap();
        let mut settings = StorageSettings {
            root_dir: Some(temp.path().to_path_buf()),
        };

        let plugin_set = StoragePluginSet::new(&mut settings);

        assert_eq!(plugin_set.name(), "pacs-file-storage");
        assert!(plugin_set.storage().is_enabled());
        assert_eq!(plugin_set.storage().root_dir(), temp.path());
    }

    #[test]
    fn test_missing_root_is_written_back_as_default() {
        let mut settings = StorageSettings::default();
        let plugin_set = StoragePluginSet::new(&mut settings);

        assert_eq!(settings.root_dir, Some(PathBuf::from("/data")));
        assert_eq!(plugin_set.storage().root_dir(), Path::new("/data"));
    }

    #[test]
    fn test_plugin_storage_stores_instances() {
        let temp = TempDir::new().unwrap();
        let mut settings = StorageSettings {
            root_dir: Some(temp.path().to_path_buf()),
        };

        let plugin_set = StoragePluginSet::new(&mut settings);
        let location = plugin_set
            .storage()
            .store(&minimal_object("1.2.840.99.300"))
            .unwrap()
            .expect("plugin storage is enabled");

        assert!(location.path().is_file());
        assert_eq!(plugin_set.storage().at(&location).count(), 1);
    }
}
