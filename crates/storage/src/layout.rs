//! On-disk path derivation for DICOM instances.
//!
//! This module maps an instance's metadata attributes to a relative directory
//! and a file name. It contains **no I/O** - only pure path construction, so
//! that the layout invariants are defined in exactly one place.
//!
//! # Path Structure
//!
//! Each instance is stored under:
//! ```text
//! <institution>/
//!     <modality>/
//!         <YYYY>/<MM>/<DD>/           # UN_DATE when StudyDate is unusable
//!             <case>/
//!                 <sop-instance-uid>.dcm
//! ```
//!
//! Where `<case>` is the AccessionNumber, falling back to PatientName, then
//! StudyInstanceUID, then a sentinel. Instances that share clinical context
//! therefore co-locate, and identical metadata always produces an identical
//! path.
//!
//! # Fail-open metadata handling
//!
//! Missing or malformed attributes never fail path derivation. Every segment
//! degrades to a fixed sentinel so that ingestion is never blocked by
//! incomplete metadata. Segments derived from free-text attributes are
//! scrubbed of path separators and control characters so the resulting path
//! is always relative and filesystem-safe.

use std::path::PathBuf;

use dicom_dictionary_std::tags;
use dicom_object::DefaultDicomObject;

use crate::constants::DCM_EXTENSION;

/// Sentinel segment for a missing or empty InstitutionName.
pub const UNKNOWN_INSTITUTION: &str = "UN_IN";

/// Sentinel segment for a missing or empty Modality.
pub const UNKNOWN_MODALITY: &str = "UN_MODALITY";

/// Sentinel segment for a missing or unusable StudyDate.
pub const UNKNOWN_DATE: &str = "UN_DATE";

/// Sentinel segment when AccessionNumber, PatientName, and StudyInstanceUID
/// are all missing or empty.
pub const UNKNOWN_ACCESSION: &str = "UN_ACC";

/// Sentinel file stem for a missing SOPInstanceUID.
///
/// A missing SOPInstanceUID means the file name no longer identifies the
/// instance, and two such instances will overwrite each other. Conforming
/// sources always send the attribute; the sentinel only keeps derivation
/// total.
pub const UNKNOWN_SOP: &str = "UN_SOP";

/// Relative on-disk destination for a single DICOM instance.
///
/// This represents **where an instance lives**, not what the instance *is*.
/// The directory is relative to the storage root and must be resolved by the
/// store before filesystem access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstancePath {
    directory: PathBuf,
    file_name: String,
}

impl InstancePath {
    /// Returns the relative directory for the instance.
    pub fn directory(&self) -> &PathBuf {
        &self.directory
    }

    /// Returns the file name for the instance (`<sop-instance-uid>.dcm`).
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Derives the relative storage path for a DICOM instance.
///
/// Reads InstitutionName, Modality, StudyDate, AccessionNumber, PatientName,
/// StudyInstanceUID, and SOPInstanceUID from the object and composes the
/// segments described in the module documentation. Never fails: unusable
/// attributes degrade to their sentinels.
pub fn derive_path(object: &DefaultDicomObject) -> InstancePath {
    let directory = directory_for(
        attribute(object, tags::INSTITUTION_NAME).as_deref(),
        attribute(object, tags::MODALITY).as_deref(),
        attribute(object, tags::STUDY_DATE).as_deref(),
        attribute(object, tags::ACCESSION_NUMBER).as_deref(),
        attribute(object, tags::PATIENT_NAME).as_deref(),
        attribute(object, tags::STUDY_INSTANCE_UID).as_deref(),
    );
    let file_name = file_name_for(attribute(object, tags::SOP_INSTANCE_UID).as_deref());

    InstancePath {
        directory,
        file_name,
    }
}

/// Composes the relative directory from raw attribute values.
///
/// Exposed separately from [`derive_path`] so the segment rules can be
/// exercised without constructing DICOM objects.
pub fn directory_for(
    institution: Option<&str>,
    modality: Option<&str>,
    study_date: Option<&str>,
    accession: Option<&str>,
    patient_name: Option<&str>,
    study_uid: Option<&str>,
) -> PathBuf {
    let mut directory = PathBuf::from(institution_segment(institution));
    directory.push(modality_segment(modality));
    for segment in date_segments(study_date) {
        directory.push(segment);
    }
    directory.push(case_segment(accession, patient_name, study_uid));
    directory
}

/// Returns the file name for an instance: `<sop-instance-uid>.dcm`.
pub fn file_name_for(sop_instance_uid: Option<&str>) -> String {
    let stem = match non_empty(sop_instance_uid) {
        Some(uid) => scrub_unsafe(uid),
        None => String::new(),
    };
    if stem.is_empty() {
        format!("{}.{}", UNKNOWN_SOP, DCM_EXTENSION)
    } else {
        format!("{}.{}", stem, DCM_EXTENSION)
    }
}

/// Institution segment: trimmed, stripped of spaces, periods, and
/// ampersands; sentinel when nothing usable remains.
pub fn institution_segment(institution: Option<&str>) -> String {
    match non_empty(institution) {
        Some(name) => fallback_if_empty(strip_name_noise(name), UNKNOWN_INSTITUTION),
        None => UNKNOWN_INSTITUTION.to_string(),
    }
}

/// Modality segment: used verbatim apart from safety scrubbing.
pub fn modality_segment(modality: Option<&str>) -> String {
    match non_empty(modality) {
        Some(modality) => fallback_if_empty(scrub_unsafe(modality), UNKNOWN_MODALITY),
        None => UNKNOWN_MODALITY.to_string(),
    }
}

/// Date segments: a `YYYYMMDD` StudyDate expands to three nested segments,
/// anything else degrades to a single [`UNKNOWN_DATE`] segment.
pub fn date_segments(study_date: Option<&str>) -> Vec<String> {
    let Some(date) = non_empty(study_date) else {
        return vec![UNKNOWN_DATE.to_string()];
    };

    match (date.get(0..4), date.get(4..6), date.get(6..8)) {
        (Some(year), Some(month), Some(day))
            if date.as_bytes()[..8].iter().all(u8::is_ascii_digit) =>
        {
            vec![year.to_string(), month.to_string(), day.to_string()]
        }
        _ => vec![UNKNOWN_DATE.to_string()],
    }
}

/// Case segment: AccessionNumber, falling back to PatientName (stripped like
/// the institution), then StudyInstanceUID, then [`UNKNOWN_ACCESSION`].
pub fn case_segment(
    accession: Option<&str>,
    patient_name: Option<&str>,
    study_uid: Option<&str>,
) -> String {
    if let Some(accession) = non_empty(accession) {
        let scrubbed = scrub_unsafe(accession);
        if !scrubbed.is_empty() {
            return scrubbed;
        }
    }

    if let Some(name) = non_empty(patient_name) {
        let stripped = strip_name_noise(name);
        if !stripped.is_empty() {
            return stripped;
        }
    }

    if let Some(uid) = non_empty(study_uid) {
        let scrubbed = scrub_unsafe(uid);
        if !scrubbed.is_empty() {
            return scrubbed;
        }
    }

    UNKNOWN_ACCESSION.to_string()
}

/// Reads a single attribute as a trimmed string, `None` when absent or when
/// the value cannot be rendered as text.
fn attribute(object: &DefaultDicomObject, tag: dicom_core::Tag) -> Option<String> {
    object
        .element(tag)
        .ok()
        .and_then(|element| element.to_str().ok())
        .map(|value| value.trim().to_string())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Removes spaces, periods, and ampersands, then everything [`scrub_unsafe`]
/// removes. Applied to institution and patient-name segments.
fn strip_name_noise(value: &str) -> String {
    let stripped: String = value
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | '&'))
        .collect();
    scrub_unsafe(&stripped)
}

/// Removes characters that are unsafe inside a single path segment: path
/// separators, drive/scheme colons, and ASCII control characters. A segment
/// that loses everything falls back to its sentinel at the call site.
fn scrub_unsafe(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':') && !c.is_ascii_control())
        .collect()
}

fn fallback_if_empty(value: String, sentinel: &str) -> String {
    if value.is_empty() {
        sentinel.to_string()
    } else {
        value
    }
}
