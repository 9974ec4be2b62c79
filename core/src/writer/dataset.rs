use crate::error::{Result, SegError};
use crate::mask::EncodedSegment;
use crate::metadata::{MetadataAssembler, SegmentationMetadata};
use crate::pixel::{pack_segments, PackedPixels};
use crate::reference::{ReferenceSeries, StudyContext};
use crate::tags::{
    ACCESSION_NUMBER, BITS_ALLOCATED, BITS_STORED, COLUMNS, CONTENT_CREATOR_NAME, CONTENT_DATE,
    CONTENT_DESCRIPTION, CONTENT_LABEL, CONTENT_QUALIFICATION, CONTENT_TIME, DEVICE_SERIAL_NUMBER,
    FRAME_OF_REFERENCE_UID, HIGH_BIT, IMAGE_TYPE, INSTANCE_NUMBER, INSTITUTION_NAME,
    LOSSY_IMAGE_COMPRESSION, MANUFACTURER, MANUFACTURER_MODEL_NAME, MODALITY, NUMBER_OF_FRAMES,
    PATIENT_BIRTH_DATE, PATIENT_ID, PATIENT_NAME, PATIENT_SEX, PHOTOMETRIC_INTERPRETATION,
    PIXEL_DATA, PIXEL_REPRESENTATION, POSITION_REFERENCE_INDICATOR, REFERRING_PHYSICIAN_NAME,
    ROWS, SAMPLES_PER_PIXEL, SEGMENTATION_TYPE, SERIES_DATE, SERIES_DESCRIPTION,
    SERIES_INSTANCE_UID, SERIES_NUMBER, SERIES_TIME, SOFTWARE_VERSIONS, SOP_CLASS_UID,
    SOP_INSTANCE_UID, STUDY_DATE, STUDY_DESCRIPTION, STUDY_ID, STUDY_INSTANCE_UID, STUDY_TIME,
};
use crate::types::{EncoderConfig, EncodingMode, SegmentClass};
use chrono::NaiveDateTime;
use dicom_core::value::PrimitiveValue;
use dicom_core::{DataElement, Tag, VR};
use dicom_dictionary_std::uids::{EXPLICIT_VR_LITTLE_ENDIAN, SEGMENTATION_STORAGE};
use dicom_object::{FileDicomObject, FileMetaTableBuilder, InMemDicomObject};

const DEVICE_SERIAL: &str = "1";

/// Identifiers generated for one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectIdentifiers {
    pub sop_instance_uid: String,
    pub series_instance_uid: String,
    pub frame_of_reference_uid: String,
    pub dimension_organization_uid: String,
}

/// Descriptive attributes taken from the encoder configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentInfo {
    pub institution_name: String,
    pub manufacturer: String,
    pub content_creator: String,
    pub content_description: String,
}

impl From<&EncoderConfig> for ContentInfo {
    fn from(config: &EncoderConfig) -> Self {
        Self {
            institution_name: config.institution_name.clone(),
            manufacturer: config.manufacturer.clone(),
            content_creator: config.content_creator.clone(),
            content_description: config.content_description.clone(),
        }
    }
}

/// A fully assembled segmentation object, ready to be serialized
#[derive(Debug, Clone)]
pub struct SegmentationObject {
    pub mode: EncodingMode,
    pub metadata: SegmentationMetadata,
    pub pixels: PackedPixels,
    pub context: StudyContext,
    pub identifiers: ObjectIdentifiers,
    pub content: ContentInfo,
    pub created: NaiveDateTime,
    pub rows: u16,
    pub columns: u16,
}

impl SegmentationObject {
    /// Assembles metadata and pixel data of encoded segments
    ///
    /// Segments must already be in their final order. Both the per-frame
    /// records and the packed frames follow it.
    pub fn build(
        mode: EncodingMode,
        series: &ReferenceSeries,
        segments: &[EncodedSegment],
        config: &EncoderConfig,
        identifiers: ObjectIdentifiers,
        created: NaiveDateTime,
    ) -> Self {
        let (_, rows, columns) = series.shape();
        let metadata = MetadataAssembler::assemble(
            series,
            segments,
            &config.algorithm_name,
            &identifiers.dimension_organization_uid,
        );
        let pixels = pack_segments(segments, rows, columns);
        debug_assert_eq!(metadata.frame_count(), pixels.frames);

        Self {
            mode,
            metadata,
            pixels,
            context: series.context().clone(),
            identifiers,
            content: ContentInfo::from(config),
            created,
            rows: series.first().rows,
            columns: series.first().columns,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.pixels.frames
    }

    /// Classes of the included segments, in segment order
    pub fn classes(&self) -> Vec<SegmentClass> {
        self.metadata.segments.iter().map(|segment| segment.class()).collect()
    }

    pub fn sop_instance_uid(&self) -> &str {
        &self.identifiers.sop_instance_uid
    }

    /// Renders the object as a DICOM dataset
    pub fn to_dicom(&self) -> InMemDicomObject {
        let mut obj = InMemDicomObject::new_empty();
        let date = self.created.format("%Y%m%d").to_string();
        let time = self.created.format("%H%M%S").to_string();

        // SOP common
        put_str(&mut obj, SOP_CLASS_UID, VR::UI, SEGMENTATION_STORAGE);
        put_str(&mut obj, SOP_INSTANCE_UID, VR::UI, &self.identifiers.sop_instance_uid);
        put_strs(&mut obj, IMAGE_TYPE, VR::CS, &["DERIVED", "PRIMARY"]);
        put_str(&mut obj, INSTANCE_NUMBER, VR::IS, &self.mode.instance_number().to_string());
        put_str(&mut obj, CONTENT_DATE, VR::DA, &date);
        put_str(&mut obj, CONTENT_TIME, VR::TM, &time);

        self.put_patient_and_study(&mut obj);

        // Series and equipment
        put_str(&mut obj, MODALITY, VR::CS, "SEG");
        put_str(&mut obj, SERIES_INSTANCE_UID, VR::UI, &self.identifiers.series_instance_uid);
        put_str(&mut obj, SERIES_NUMBER, VR::IS, &self.mode.series_number().to_string());
        put_str(&mut obj, SERIES_DESCRIPTION, VR::LO, self.mode.series_description());
        put_str(&mut obj, SERIES_DATE, VR::DA, &date);
        put_str(&mut obj, SERIES_TIME, VR::TM, &time);
        put_str(&mut obj, INSTITUTION_NAME, VR::LO, &self.content.institution_name);
        put_str(&mut obj, MANUFACTURER, VR::LO, &self.content.manufacturer);
        put_str(&mut obj, MANUFACTURER_MODEL_NAME, VR::LO, &self.content.manufacturer);
        put_str(&mut obj, DEVICE_SERIAL_NUMBER, VR::LO, DEVICE_SERIAL);
        put_str(&mut obj, SOFTWARE_VERSIONS, VR::LO, env!("CARGO_PKG_VERSION"));

        // Frame of reference
        put_str(
            &mut obj,
            FRAME_OF_REFERENCE_UID,
            VR::UI,
            &self.identifiers.frame_of_reference_uid,
        );
        put_str(&mut obj, POSITION_REFERENCE_INDICATOR, VR::LO, "");

        // Content identification
        put_str(&mut obj, CONTENT_LABEL, VR::CS, "SEGMENTATION");
        put_str(&mut obj, CONTENT_DESCRIPTION, VR::LO, &self.content.content_description);
        put_str(&mut obj, CONTENT_CREATOR_NAME, VR::PN, &self.content.content_creator);

        // Image pixel
        put_u16(&mut obj, SAMPLES_PER_PIXEL, 1);
        put_str(&mut obj, PHOTOMETRIC_INTERPRETATION, VR::CS, "MONOCHROME2");
        put_u16(&mut obj, ROWS, self.rows);
        put_u16(&mut obj, COLUMNS, self.columns);
        put_u16(&mut obj, BITS_ALLOCATED, 1);
        put_u16(&mut obj, BITS_STORED, 1);
        put_u16(&mut obj, HIGH_BIT, 0);
        put_u16(&mut obj, PIXEL_REPRESENTATION, 0);
        put_str(&mut obj, LOSSY_IMAGE_COMPRESSION, VR::CS, "00");

        // Segmentation image
        put_str(&mut obj, SEGMENTATION_TYPE, VR::CS, "BINARY");
        put_str(&mut obj, CONTENT_QUALIFICATION, VR::CS, "RESEARCH");
        put_str(&mut obj, NUMBER_OF_FRAMES, VR::IS, &self.pixels.number_of_frames());

        for element in self.metadata.to_elements() {
            obj.put(element);
        }

        let mut bytes = self.pixels.bytes.clone();
        if bytes.len() % 2 != 0 {
            bytes.push(0);
        }
        obj.put(DataElement::new(PIXEL_DATA, VR::OB, PrimitiveValue::from(bytes)));

        obj
    }

    /// Wraps the dataset with an Explicit VR Little Endian file meta group
    ///
    /// # Errors
    ///
    /// Returns [`SegError::DicomError`] if the meta group cannot be built
    pub fn to_file_object(&self) -> Result<FileDicomObject<InMemDicomObject>> {
        self.to_dicom()
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN)
                    .media_storage_sop_class_uid(SEGMENTATION_STORAGE)
                    .media_storage_sop_instance_uid(self.identifiers.sop_instance_uid.as_str()),
            )
            .map_err(|e| SegError::DicomError(e.to_string()))
    }

    fn put_patient_and_study(&self, obj: &mut InMemDicomObject) {
        let context = &self.context;

        put_str(obj, PATIENT_NAME, VR::PN, &context.patient_name);
        put_str(obj, PATIENT_ID, VR::LO, &context.patient_id);

        // Type 2: present even when unknown, overwritten by inherited values
        put_str(obj, PATIENT_BIRTH_DATE, VR::DA, "");
        put_str(obj, PATIENT_SEX, VR::CS, "");
        put_str(obj, REFERRING_PHYSICIAN_NAME, VR::PN, "");
        put_str(obj, ACCESSION_NUMBER, VR::SH, "");
        for element in &context.inherited {
            obj.put(element.clone());
        }

        put_str(obj, STUDY_INSTANCE_UID, VR::UI, &context.study_instance_uid);
        put_str(obj, STUDY_ID, VR::SH, &context.study_id);
        put_str(obj, STUDY_DATE, VR::DA, context.study_date.as_deref().unwrap_or(""));
        put_str(obj, STUDY_TIME, VR::TM, context.study_time.as_deref().unwrap_or(""));
        if let Some(description) = &context.study_description {
            put_str(obj, STUDY_DESCRIPTION, VR::LO, description);
        }
    }
}

fn put_str(obj: &mut InMemDicomObject, tag: Tag, vr: VR, value: &str) {
    obj.put(DataElement::new(tag, vr, PrimitiveValue::from(value)));
}

fn put_strs(obj: &mut InMemDicomObject, tag: Tag, vr: VR, values: &[&str]) {
    let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    obj.put(DataElement::new(tag, vr, PrimitiveValue::Strs(values.into())));
}

fn put_u16(obj: &mut InMemDicomObject, tag: Tag, value: u16) {
    obj.put(DataElement::new(tag, VR::US, PrimitiveValue::from(value)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::fixtures::axial_series;
    use crate::tags::{get_string_value, get_u16_value, PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE};
    use chrono::NaiveDate;
    use ndarray::Array3;

    fn identifiers() -> ObjectIdentifiers {
        ObjectIdentifiers {
            sop_instance_uid: "2.8.846.0.1".to_string(),
            series_instance_uid: "2.8.846.0.2".to_string(),
            frame_of_reference_uid: "1.2.3.5".to_string(),
            dimension_organization_uid: "2.8.846.0.3".to_string(),
        }
    }

    fn created() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 3)
            .unwrap()
    }

    fn object(mode: EncodingMode, segments: &[EncodedSegment]) -> SegmentationObject {
        let series = axial_series(5, 3, 3);
        SegmentationObject::build(
            mode,
            &series,
            segments,
            &EncoderConfig::default(),
            identifiers(),
            created(),
        )
    }

    fn segment(class: SegmentClass, label: u16, slice_indices: Vec<usize>) -> EncodedSegment {
        EncodedSegment {
            class,
            label,
            frames: Array3::from_elem((slice_indices.len(), 3, 3), true),
            slice_indices,
        }
    }

    #[test]
    fn test_fixed_template() {
        let obj = object(
            EncodingMode::Combined,
            &[segment(SegmentClass::Wg, 1, vec![0, 1]), segment(SegmentClass::Pz, 2, vec![3])],
        )
        .to_dicom();

        assert_eq!(get_string_value(&obj, SOP_CLASS_UID).unwrap(), SEGMENTATION_STORAGE);
        assert_eq!(get_string_value(&obj, MODALITY).unwrap(), "SEG");
        assert_eq!(get_string_value(&obj, SEGMENTATION_TYPE).unwrap(), "BINARY");
        assert_eq!(get_string_value(&obj, PHOTOMETRIC_INTERPRETATION).unwrap(), "MONOCHROME2");
        assert_eq!(get_string_value(&obj, LOSSY_IMAGE_COMPRESSION).unwrap(), "00");
        assert_eq!(get_string_value(&obj, CONTENT_QUALIFICATION).unwrap(), "RESEARCH");
        assert_eq!(get_u16_value(&obj, BITS_ALLOCATED), Some(1));
        assert_eq!(get_u16_value(&obj, HIGH_BIT), Some(0));
        assert_eq!(get_u16_value(&obj, ROWS), Some(3));
        assert_eq!(get_u16_value(&obj, COLUMNS), Some(3));
        assert_eq!(
            obj.element(IMAGE_TYPE).unwrap().to_multi_str().unwrap().to_vec(),
            vec!["DERIVED".to_string(), "PRIMARY".to_string()]
        );
    }

    #[test]
    fn test_frame_count_matches_per_frame_items() {
        let obj = object(
            EncodingMode::Combined,
            &[segment(SegmentClass::Wg, 1, vec![0, 1]), segment(SegmentClass::Pz, 2, vec![3])],
        )
        .to_dicom();

        assert_eq!(get_string_value(&obj, NUMBER_OF_FRAMES).unwrap(), "3");
        let per_frame = obj
            .element(PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE)
            .unwrap()
            .items()
            .unwrap();
        assert_eq!(per_frame.len(), 3);

        // 3 frames of 9 pixels: 27 bits, 4 bytes, no padding needed
        let pixel_data = obj.element(PIXEL_DATA).unwrap().to_bytes().unwrap();
        assert_eq!(pixel_data.len(), 4);
    }

    #[test]
    fn test_pixel_data_is_padded_to_even_length() {
        let obj = object(
            EncodingMode::Single(SegmentClass::Tz),
            &[segment(SegmentClass::Tz, 1, vec![2])],
        )
        .to_dicom();

        // 9 bits pack into 2 bytes; 1 frame of 3x3 needs 2 bytes already
        let pixel_data = obj.element(PIXEL_DATA).unwrap().to_bytes().unwrap();
        assert_eq!(pixel_data.len() % 2, 0);

        let obj = object(
            EncodingMode::Combined,
            &[segment(SegmentClass::Wg, 1, vec![0, 1, 2, 3, 4])],
        )
        .to_dicom();
        // 45 bits pack into 6 bytes
        let pixel_data = obj.element(PIXEL_DATA).unwrap().to_bytes().unwrap();
        assert_eq!(pixel_data.len(), 6);

        let obj = object(
            EncodingMode::Combined,
            &[segment(SegmentClass::Wg, 1, vec![0, 1, 2, 3])],
        )
        .to_dicom();
        // 36 bits pack into 5 bytes, padded to 6
        let pixel_data = obj.element(PIXEL_DATA).unwrap().to_bytes().unwrap();
        assert_eq!(pixel_data.len(), 6);
    }

    #[test]
    fn test_identity_and_numbering() {
        let obj = object(
            EncodingMode::Single(SegmentClass::Pz),
            &[segment(SegmentClass::Pz, 1, vec![0, 1, 2, 3, 4])],
        )
        .to_dicom();

        assert_eq!(get_string_value(&obj, PATIENT_ID).unwrap(), "PAT-001");
        assert_eq!(get_string_value(&obj, PATIENT_NAME).unwrap(), "Doe^Jane");
        assert_eq!(get_string_value(&obj, STUDY_INSTANCE_UID).unwrap(), "1.2.3");
        assert_eq!(get_string_value(&obj, STUDY_ID).unwrap(), "S1");
        assert_eq!(get_string_value(&obj, STUDY_DATE).unwrap(), "20240307");
        assert!(get_string_value(&obj, STUDY_TIME).is_none());
        assert_eq!(get_string_value(&obj, SERIES_NUMBER).unwrap(), "102");
        assert_eq!(get_string_value(&obj, INSTANCE_NUMBER).unwrap(), "202");
        assert_eq!(
            get_string_value(&obj, SERIES_DESCRIPTION).unwrap(),
            "Prostate Peripheral Zone"
        );
        assert_eq!(get_string_value(&obj, CONTENT_DATE).unwrap(), "20240307");
        assert_eq!(get_string_value(&obj, CONTENT_TIME).unwrap(), "090503");
        assert_eq!(get_string_value(&obj, FRAME_OF_REFERENCE_UID).unwrap(), "1.2.3.5");
    }

    #[test]
    fn test_type2_attributes_present_when_reference_lacks_them() {
        let obj = object(
            EncodingMode::Combined,
            &[segment(SegmentClass::Wg, 1, vec![0])],
        )
        .to_dicom();

        for tag in [
            ACCESSION_NUMBER,
            STUDY_TIME,
            PATIENT_BIRTH_DATE,
            PATIENT_SEX,
            REFERRING_PHYSICIAN_NAME,
        ] {
            assert!(obj.element(tag).is_ok(), "missing {}", tag);
            assert!(get_string_value(&obj, tag).is_none());
        }
        assert_eq!(get_string_value(&obj, DEVICE_SERIAL_NUMBER).unwrap(), "1");
    }

    #[test]
    fn test_inherited_values_replace_empty_type2_attributes() {
        let mut seg = object(
            EncodingMode::Combined,
            &[segment(SegmentClass::Wg, 1, vec![0])],
        );
        seg.context.inherited = vec![
            DataElement::new(ACCESSION_NUMBER, VR::SH, PrimitiveValue::from("ACC-42")),
            DataElement::new(PATIENT_SEX, VR::CS, PrimitiveValue::from("M")),
        ];
        let obj = seg.to_dicom();

        assert_eq!(get_string_value(&obj, ACCESSION_NUMBER).unwrap(), "ACC-42");
        assert_eq!(get_string_value(&obj, PATIENT_SEX).unwrap(), "M");
        assert!(obj.element(PATIENT_BIRTH_DATE).is_ok());
    }

    #[test]
    fn test_to_file_object_sets_meta() {
        let file_object = object(
            EncodingMode::Combined,
            &[segment(SegmentClass::Wg, 1, vec![0])],
        )
        .to_file_object()
        .unwrap();

        let meta = file_object.meta();
        assert_eq!(
            meta.media_storage_sop_instance_uid().trim_end_matches('\0'),
            "2.8.846.0.1"
        );
        assert_eq!(
            meta.transfer_syntax().trim_end_matches('\0'),
            EXPLICIT_VR_LITTLE_ENDIAN
        );
    }
}
