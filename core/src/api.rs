use crate::error::{Result, SegError};
use crate::mask::{
    EncodedSegment, MaskIngestor, MaskSet, OverlapResolver, SparseFrameReducer, VolumeSource,
};
use crate::reference::ReferenceSeries;
use crate::types::{EncoderConfig, EncodingMode, SegmentClass};
use crate::writer::{ObjectIdentifiers, ObjectWriter, SegmentationObject, UidGenerator};
use chrono::{Local, NaiveDateTime};
use log::{info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Encodes prostate zone masks into DICOM Segmentation objects
///
/// Every case yields one combined object holding all non-empty classes with
/// overlaps resolved and empty slices dropped, plus one object per
/// configured single class holding that class's raw mask on every slice.
///
/// # Example
///
/// ```
/// use dicomseg_core::{EncoderConfig, SegmentationEncoder};
///
/// let encoder = SegmentationEncoder::new(EncoderConfig::combined_only());
/// assert!(encoder.config().single_classes.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SegmentationEncoder {
    config: EncoderConfig,
}

impl SegmentationEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Ingests masks from a volume source and encodes them
    ///
    /// # Errors
    ///
    /// - [`SegError::MaskShape`] if a volume does not match the series
    /// - [`SegError::EmptySegmentation`] if no class has a set voxel
    pub fn encode_case(
        &self,
        series: &ReferenceSeries,
        source: &dyn VolumeSource,
    ) -> Result<EncodedCase> {
        let masks = MaskIngestor::ingest(source, series)?;
        self.encode(series, &masks)
    }

    /// Encodes ingested masks, stamping objects with the current local time
    pub fn encode(&self, series: &ReferenceSeries, masks: &MaskSet) -> Result<EncodedCase> {
        self.encode_at(series, masks, Local::now().naive_local())
    }

    /// Encodes ingested masks at a fixed point in time
    ///
    /// With a UID seed configured, the result depends only on the inputs
    /// and `now`.
    ///
    /// # Errors
    ///
    /// - [`SegError::EmptySegmentation`] if `masks` is empty
    /// - [`SegError::MaskShape`] if the masks do not match the series
    pub fn encode_at(
        &self,
        series: &ReferenceSeries,
        masks: &MaskSet,
        now: NaiveDateTime,
    ) -> Result<EncodedCase> {
        Self::check_shape(series, masks)?;

        let mut uids = UidGenerator::new(now, self.config.uid_seed);
        let frame_of_reference_uid = Self::frame_of_reference_uid(series, &mut uids);

        let combined = self.build_mode(
            EncodingMode::Combined,
            series,
            masks,
            &frame_of_reference_uid,
            &mut uids,
            now,
        )?;

        let mut per_class = BTreeMap::new();
        for &class in &self.config.single_classes {
            if !masks.contains(class) {
                warn!("No {} mask to encode as a single-class object, skipping", class);
                continue;
            }

            let object = self.build_mode(
                EncodingMode::Single(class),
                series,
                masks,
                &frame_of_reference_uid,
                &mut uids,
                now,
            )?;
            per_class.insert(class, object);
        }

        Ok(EncodedCase {
            combined,
            per_class,
        })
    }

    /// Encodes one object in a given mode
    ///
    /// In single-class mode the raw mask of the class is emitted on every
    /// slice as segment 1, without overlap resolution.
    ///
    /// # Errors
    ///
    /// - [`SegError::EmptySegmentation`] if the requested class has no mask
    /// - [`SegError::MaskShape`] if the masks do not match the series
    pub fn encode_mode(
        &self,
        series: &ReferenceSeries,
        masks: &MaskSet,
        mode: EncodingMode,
        now: NaiveDateTime,
    ) -> Result<SegmentationObject> {
        Self::check_shape(series, masks)?;

        let mut uids = UidGenerator::new(now, self.config.uid_seed);
        let frame_of_reference_uid = Self::frame_of_reference_uid(series, &mut uids);
        self.build_mode(mode, series, masks, &frame_of_reference_uid, &mut uids, now)
    }

    /// Writes every object of an encoded case under `out_root`
    ///
    /// Objects land in `<out_root>/<PatientID>/<StudyInstanceUID>/segmentations/`.
    /// Returns the written paths, combined object first.
    pub fn write_case(
        &self,
        case: &EncodedCase,
        out_root: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>> {
        case.objects()
            .map(|object| ObjectWriter::write_under(object, out_root.as_ref()))
            .collect()
    }

    fn check_shape(series: &ReferenceSeries, masks: &MaskSet) -> Result<()> {
        if masks.is_empty() {
            return Err(SegError::EmptySegmentation(format!(
                "series {}",
                series.series_instance_uid()
            )));
        }

        let expected = series.shape();
        match masks.iter().find(|mask| mask.raw.dim() != expected) {
            Some(mask) => Err(SegError::MaskShape {
                class: mask.class,
                expected,
                found: mask.raw.dim(),
            }),
            None => Ok(()),
        }
    }

    /// Resolves overlaps and drops empty slices, keeping segment order
    fn combined_segments(masks: &MaskSet) -> Vec<EncodedSegment> {
        let resolved = OverlapResolver::resolve(masks);
        masks
            .iter()
            .filter_map(|mask| {
                resolved
                    .get(&mask.class)
                    .map(|volume| SparseFrameReducer::reduce(mask.class, mask.label, volume))
            })
            .collect()
    }

    /// Inherited from the reference series, or generated for the case
    fn frame_of_reference_uid(series: &ReferenceSeries, uids: &mut UidGenerator) -> String {
        series
            .context()
            .frame_of_reference_uid
            .clone()
            .unwrap_or_else(|| uids.generate())
    }

    fn build_mode(
        &self,
        mode: EncodingMode,
        series: &ReferenceSeries,
        masks: &MaskSet,
        frame_of_reference_uid: &str,
        uids: &mut UidGenerator,
        now: NaiveDateTime,
    ) -> Result<SegmentationObject> {
        let segments = match mode {
            EncodingMode::Combined => Self::combined_segments(masks),
            EncodingMode::Single(class) => {
                let mask = masks.get(class).ok_or_else(|| {
                    SegError::EmptySegmentation(format!("{} mask", class))
                })?;
                vec![EncodedSegment::full(class, 1, mask.raw.clone())]
            }
        };

        Ok(self.build_object(mode, series, &segments, frame_of_reference_uid, uids, now))
    }

    fn build_object(
        &self,
        mode: EncodingMode,
        series: &ReferenceSeries,
        segments: &[EncodedSegment],
        frame_of_reference_uid: &str,
        uids: &mut UidGenerator,
        now: NaiveDateTime,
    ) -> SegmentationObject {
        let identifiers = ObjectIdentifiers {
            sop_instance_uid: uids.generate(),
            series_instance_uid: uids.generate(),
            frame_of_reference_uid: frame_of_reference_uid.to_string(),
            dimension_organization_uid: uids.generate(),
        };

        let object =
            SegmentationObject::build(mode, series, segments, &self.config, identifiers, now);
        info!(
            "Encoded {} object: segments [{}], {} frames",
            mode,
            object
                .classes()
                .iter()
                .map(|class| class.tag())
                .collect::<Vec<_>>()
                .join(", "),
            object.frame_count()
        );
        object
    }
}

/// All objects produced for one case
#[derive(Debug, Clone)]
pub struct EncodedCase {
    pub combined: SegmentationObject,
    pub per_class: BTreeMap<SegmentClass, SegmentationObject>,
}

impl EncodedCase {
    /// Combined object first, then single-class objects in class order
    pub fn objects(&self) -> impl Iterator<Item = &SegmentationObject> {
        std::iter::once(&self.combined).chain(self.per_class.values())
    }

    pub fn object_count(&self) -> usize {
        1 + self.per_class.len()
    }

    pub fn single(&self, class: SegmentClass) -> Option<&SegmentationObject> {
        self.per_class.get(&class)
    }
}
