//! Reference series loading
//!
//! Reads the per-slice image series a segmentation is derived from and puts
//! it in spatial order along the slice normal.

mod files;
mod slice;

pub use files::{collect_dicom_files, is_dicom_file};
pub use slice::{ReferenceSlice, StudyContext};

use crate::error::{Result, SegError};
use dicom_object::{open_file, InMemDicomObject};
use log::{debug, warn};
use std::cmp::Ordering;
use std::path::Path;

/// Minimum through-plane gap (mm) for two slices to count as distinct
const POSITION_TOLERANCE: f64 = 1e-4;

/// Spatially ordered reference series
///
/// Slices are sorted by strictly increasing position along the slice normal
/// and share a single study and series. Immutable once built.
#[derive(Debug, Clone)]
pub struct ReferenceSeries {
    slices: Vec<ReferenceSlice>,
    context: StudyContext,
}

impl ReferenceSeries {
    /// Builds a series from unordered slices
    ///
    /// # Errors
    ///
    /// Returns [`SegError::ReferenceSeries`] if `slices` is empty, if the
    /// slices span more than one study or series, if their in-plane size
    /// differs, or if two slices share a position
    pub fn new(mut slices: Vec<ReferenceSlice>, context: StudyContext) -> Result<Self> {
        if slices.is_empty() {
            return Err(SegError::ReferenceSeries(
                "no valid reference slices found".to_string(),
            ));
        }

        Self::validate_identity(&slices)?;

        slices.sort_by(|a, b| {
            a.through_plane_position()
                .partial_cmp(&b.through_plane_position())
                .unwrap_or(Ordering::Equal)
        });

        for pair in slices.windows(2) {
            let gap = pair[1].through_plane_position() - pair[0].through_plane_position();
            if gap < POSITION_TOLERANCE {
                return Err(SegError::ReferenceSeries(format!(
                    "slices {} and {} share through-plane position {:.4}",
                    pair[0].sop_instance_uid,
                    pair[1].sop_instance_uid,
                    pair[0].through_plane_position()
                )));
            }
        }

        Ok(Self { slices, context })
    }

    fn validate_identity(slices: &[ReferenceSlice]) -> Result<()> {
        let first = &slices[0];
        for slice in &slices[1..] {
            if slice.series_instance_uid != first.series_instance_uid {
                return Err(SegError::ReferenceSeries(format!(
                    "slices span multiple series: {} and {}",
                    first.series_instance_uid, slice.series_instance_uid
                )));
            }
            if slice.study_instance_uid != first.study_instance_uid {
                return Err(SegError::ReferenceSeries(format!(
                    "slices span multiple studies: {} and {}",
                    first.study_instance_uid, slice.study_instance_uid
                )));
            }
            if (slice.rows, slice.columns) != (first.rows, first.columns) {
                return Err(SegError::ReferenceSeries(format!(
                    "inconsistent slice dimensions: {}x{} and {}x{}",
                    first.rows, first.columns, slice.rows, slice.columns
                )));
            }
        }
        Ok(())
    }

    /// Slices in spatial order
    pub fn slices(&self) -> &[ReferenceSlice] {
        &self.slices
    }

    /// First slice in spatial order
    pub fn first(&self) -> &ReferenceSlice {
        &self.slices[0]
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn context(&self) -> &StudyContext {
        &self.context
    }

    pub fn series_instance_uid(&self) -> &str {
        &self.first().series_instance_uid
    }

    /// Volume shape a mask must have: (slices, rows, columns)
    pub fn shape(&self) -> (usize, usize, usize) {
        let first = self.first();
        (self.len(), first.rows as usize, first.columns as usize)
    }

    /// Distance between adjacent slice centers
    ///
    /// Uses SpacingBetweenSlices of the first slice when recorded, else the
    /// gap between the first two slices, else the slice thickness.
    pub fn spacing_between_slices(&self) -> f64 {
        let first = self.first();
        first
            .spacing_between_slices
            .or_else(|| {
                self.slices.get(1).map(|second| {
                    second.through_plane_position() - first.through_plane_position()
                })
            })
            .unwrap_or(first.slice_thickness)
    }
}

/// Loads reference series from DICOM files
pub struct ReferenceSeriesLoader;

impl ReferenceSeriesLoader {
    /// Load a series from DICOM objects
    ///
    /// Objects that do not describe a single-frame slice are skipped with a
    /// warning. The study context comes from the first slice in spatial order.
    ///
    /// # Errors
    ///
    /// Returns [`SegError::ReferenceSeries`] if no object yields a valid
    /// slice, or if the slices do not form one consistent series
    pub fn load_from_dicom_objects(objects: &[InMemDicomObject]) -> Result<ReferenceSeries> {
        let mut with_slices: Vec<(ReferenceSlice, &InMemDicomObject)> = objects
            .iter()
            .filter_map(|dcm| match ReferenceSlice::from_dicom(dcm) {
                Ok(slice) => Some((slice, dcm)),
                Err(e) => {
                    warn!("Skipping reference object: {}", e);
                    None
                }
            })
            .collect();

        with_slices.sort_by(|a, b| {
            a.0.through_plane_position()
                .partial_cmp(&b.0.through_plane_position())
                .unwrap_or(Ordering::Equal)
        });

        let context = match with_slices.first() {
            Some((_, dcm)) => StudyContext::from_dicom(dcm)?,
            None => {
                return Err(SegError::ReferenceSeries(
                    "no valid reference slices found".to_string(),
                ))
            }
        };

        let slices = with_slices.into_iter().map(|(slice, _)| slice).collect();
        let series = ReferenceSeries::new(slices, context)?;
        debug!(
            "Loaded reference series {} with {} slices",
            series.series_instance_uid(),
            series.len()
        );
        Ok(series)
    }

    /// Load a series from file paths
    ///
    /// Files that cannot be parsed as DICOM are skipped with a warning.
    pub fn load_from_file_paths(paths: &[impl AsRef<Path>]) -> Result<ReferenceSeries> {
        let objects: Vec<InMemDicomObject> = paths
            .iter()
            .filter_map(|path| match open_file(path.as_ref()) {
                Ok(obj) => Some(obj.into_inner()),
                Err(e) => {
                    warn!("Skipping {}: {}", path.as_ref().display(), e);
                    None
                }
            })
            .collect();

        Self::load_from_dicom_objects(&objects)
    }

    /// Load a series from a directory of DICOM files
    pub fn load_from_directory(path: impl AsRef<Path>) -> Result<ReferenceSeries> {
        let path = path.as_ref();
        let files = collect_dicom_files(path).map_err(|e| {
            SegError::ReferenceSeries(format!("cannot read {}: {}", path.display(), e))
        })?;

        if files.is_empty() {
            return Err(SegError::ReferenceSeries(format!(
                "no DICOM files found in {}",
                path.display()
            )));
        }

        debug!("Found {} DICOM files in {}", files.len(), path.display());
        Self::load_from_file_paths(&files)
    }
}
