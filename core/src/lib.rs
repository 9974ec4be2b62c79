//! Encodes per-class prostate zone masks (whole gland, peripheral zone,
//! transition zone) as multi-frame binary DICOM Segmentation objects linked
//! to the reference image series they were derived from.

pub mod api;
pub mod batch;
pub mod catalog;
pub mod cli;
pub mod error;
pub mod mask;
pub mod metadata;
pub mod pixel;
pub mod reference;
pub mod tags;
pub mod types;
pub mod writer;

pub use api::{EncodedCase, SegmentationEncoder};
pub use batch::{encode_batch, process_case, CaseInput, CaseOutcome, CaseStatus};
pub use catalog::{SegmentCatalog, SegmentDescriptor};
pub use cli::report::TextReport;
pub use error::{Result, SegError};
pub use mask::{MaskIngestor, MaskSet, NpyDirectory, VolumeSource};
pub use reference::{ReferenceSeries, ReferenceSeriesLoader};
pub use types::*;
pub use writer::{ObjectWriter, SegmentationObject};
