//! Segmentation object serialization
//!
//! Objects are fully assembled in memory, then written in one go with
//! Explicit VR Little Endian.

mod dataset;
mod paths;
mod uid;

pub use dataset::{ContentInfo, ObjectIdentifiers, SegmentationObject};
pub use paths::{output_path, segmentation_dir};
pub use uid::UidGenerator;

use crate::error::{Result, SegError};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Persists segmentation objects
pub struct ObjectWriter;

impl ObjectWriter {
    /// Writes an object to an explicit path, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns [`SegError::Write`] if the directory or file cannot be
    /// created, or [`SegError::DicomError`] if the object cannot be encoded
    pub fn write(object: &SegmentationObject, path: &Path) -> Result<()> {
        let file_object = object.to_file_object()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SegError::Write {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }

        file_object
            .write_to_file(path)
            .map_err(|e| SegError::Write {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        info!(
            "Wrote {} object with {} segments and {} frames to {}",
            object.mode,
            object.metadata.segments.len(),
            object.frame_count(),
            path.display()
        );
        Ok(())
    }

    /// Writes an object under the study layout rooted at `out_root`
    ///
    /// Returns the path written.
    pub fn write_under(object: &SegmentationObject, out_root: &Path) -> Result<PathBuf> {
        let path = output_path(out_root, &object.context, object.mode);
        Self::write(object, &path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::EncodedSegment;
    use crate::reference::fixtures::axial_series;
    use crate::tags::{get_string_value, SOP_INSTANCE_UID};
    use crate::types::{EncoderConfig, EncodingMode, SegmentClass};
    use chrono::NaiveDate;
    use dicom_object::open_file;
    use ndarray::Array3;
    use tempfile::TempDir;

    fn object() -> SegmentationObject {
        let series = axial_series(3, 2, 2);
        let created = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let mut uids = UidGenerator::new(created, Some(5));
        let identifiers = ObjectIdentifiers {
            sop_instance_uid: uids.generate(),
            series_instance_uid: uids.generate(),
            frame_of_reference_uid: uids.generate(),
            dimension_organization_uid: uids.generate(),
        };
        let segment = EncodedSegment::full(SegmentClass::Tz, 1, Array3::from_elem((3, 2, 2), true));

        SegmentationObject::build(
            EncodingMode::Single(SegmentClass::Tz),
            &series,
            &[segment],
            &EncoderConfig::default(),
            identifiers,
            created,
        )
    }

    #[test]
    fn test_write_under_study_layout() {
        let temp_dir = TempDir::new().unwrap();
        let object = object();

        let path = ObjectWriter::write_under(&object, temp_dir.path()).unwrap();

        assert_eq!(
            path,
            temp_dir.path().join("PAT-001/1.2.3/segmentations/tz.dcm")
        );
        let reopened = open_file(&path).unwrap();
        assert_eq!(
            get_string_value(&reopened, SOP_INSTANCE_UID).unwrap(),
            object.sop_instance_uid()
        );
    }

    #[test]
    fn test_write_to_unwritable_destination() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not a directory").unwrap();

        let err = ObjectWriter::write(&object(), &blocker.join("out.dcm")).unwrap_err();
        assert!(matches!(err, SegError::Write { .. }));
    }
}
