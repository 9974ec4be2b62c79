//! Mask ingestion, overlap resolution and sparse frame reduction
//!
//! Masks arrive as `(slices, rows, columns)` u8 volumes aligned
//! index-for-index with the reference series. Any nonzero voxel is set.

mod overlap;
mod sparse;
mod source;

pub use overlap::OverlapResolver;
pub use sparse::{EncodedSegment, SparseFrameReducer};
pub use source::{NpyDirectory, VolumeSource};

use crate::error::{Result, SegError};
use crate::reference::ReferenceSeries;
use crate::types::SegmentClass;
use log::{debug, warn};
use ndarray::Array3;

/// Binary mask of one class that passed ingestion
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMask {
    pub class: SegmentClass,

    /// Dense 1-based segment number in the combined object
    pub label: u16,

    /// Raw volume as delivered, (slices, rows, columns)
    pub raw: Array3<bool>,
}

impl ClassMask {
    /// Number of set voxels
    pub fn voxel_count(&self) -> usize {
        self.raw.iter().filter(|&&v| v).count()
    }
}

/// Non-empty class masks of one case, in priority order
#[derive(Debug, Clone, PartialEq)]
pub struct MaskSet {
    masks: Vec<ClassMask>,
}

impl MaskSet {
    /// Masks in priority order (wg, pz, tz)
    pub fn iter(&self) -> std::slice::Iter<'_, ClassMask> {
        self.masks.iter()
    }

    pub fn get(&self, class: SegmentClass) -> Option<&ClassMask> {
        self.masks.iter().find(|mask| mask.class == class)
    }

    pub fn contains(&self, class: SegmentClass) -> bool {
        self.get(class).is_some()
    }

    /// Present classes in priority order
    pub fn classes(&self) -> Vec<SegmentClass> {
        self.masks.iter().map(|mask| mask.class).collect()
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }
}

/// Loads per-class volumes and drops classes without a set voxel
pub struct MaskIngestor;

impl MaskIngestor {
    /// Ingests every class the source provides
    ///
    /// Labels are assigned densely in priority order, skipping classes that
    /// are missing or empty.
    ///
    /// # Errors
    ///
    /// - [`SegError::MaskShape`] if a volume does not match `series.shape()`
    /// - [`SegError::EmptySegmentation`] if no class has a set voxel
    pub fn ingest(source: &dyn VolumeSource, series: &ReferenceSeries) -> Result<MaskSet> {
        Self::ingest_with_shape(source, series.shape())
    }

    /// Ingests against an explicit `(slices, rows, columns)` shape
    pub fn ingest_with_shape(
        source: &dyn VolumeSource,
        expected: (usize, usize, usize),
    ) -> Result<MaskSet> {
        let mut masks = Vec::new();

        for class in SegmentClass::ALL {
            let volume = match source.load(class)? {
                Some(volume) => volume,
                None => {
                    debug!("No {} mask in {}", class, source.describe());
                    continue;
                }
            };

            if volume.dim() != expected {
                return Err(SegError::MaskShape {
                    class,
                    expected,
                    found: volume.dim(),
                });
            }

            if !volume.iter().any(|&v| v != 0) {
                warn!("{} mask in {} is empty, excluding it", class, source.describe());
                continue;
            }

            let mask = ClassMask {
                class,
                label: masks.len() as u16 + 1,
                raw: volume.mapv(|v| v != 0),
            };
            debug!(
                "Ingested {} as segment {} ({} voxels)",
                class,
                mask.label,
                mask.voxel_count()
            );
            masks.push(mask);
        }

        if masks.is_empty() {
            return Err(SegError::EmptySegmentation(source.describe()));
        }

        Ok(MaskSet { masks })
    }
}
