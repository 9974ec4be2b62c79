use crate::types::SegmentClass;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for segmentation encoding operations
pub type Result<T> = std::result::Result<T, SegError>;

/// Error types for segmentation encoding operations
#[derive(Error, Debug)]
pub enum SegError {
    /// The reference series is missing, malformed or ambiguous
    #[error("Reference series error: {0}")]
    ReferenceSeries(String),

    /// No class carries a single positive voxel
    #[error("No segmentation found in {0}")]
    EmptySegmentation(String),

    /// Class tag outside the segment catalog
    #[error("Unknown segmentation class: {0}")]
    UnknownClass(String),

    /// Mask volume does not line up with the reference geometry
    #[error("Mask for {class} has shape {found:?}, expected {expected:?}")]
    MaskShape {
        class: SegmentClass,
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },

    /// Mask volume could not be decoded
    #[error("Failed to read mask for {class}: {message}")]
    MaskRead { class: SegmentClass, message: String },

    /// Output could not be created or written
    #[error("Failed to write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    /// DICOM encoding or decoding error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// Failure tied to one case of a batch
    #[error("Case {case}: {source}")]
    Case {
        case: String,
        #[source]
        source: Box<SegError>,
    },

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SegError {
    /// Attaches a case key to the error
    pub fn in_case(self, case: impl Into<String>) -> Self {
        SegError::Case {
            case: case.into(),
            source: Box::new(self),
        }
    }

    /// Returns true when the case simply had nothing to encode
    ///
    /// Batch drivers treat this as a skip rather than a failure.
    pub fn is_empty_segmentation(&self) -> bool {
        match self {
            SegError::EmptySegmentation(_) => true,
            SegError::Case { source, .. } => source.is_empty_segmentation(),
            _ => false,
        }
    }
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for SegError {
    fn from(e: dicom_object::ReadError) -> Self {
        SegError::DicomError(format!("{}", e))
    }
}

impl From<dicom_core::value::ConvertValueError> for SegError {
    fn from(e: dicom_core::value::ConvertValueError) -> Self {
        SegError::ReferenceSeries(format!("{}", e))
    }
}
