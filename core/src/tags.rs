use crate::types::pixel_spacing::parse_decimals;
use dicom_core::Tag;
use dicom_object::InMemDicomObject;

// SOP Common / General Image Tags
pub const SOP_CLASS_UID: Tag = Tag(0x0008, 0x0016);
pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
pub const IMAGE_TYPE: Tag = Tag(0x0008, 0x0008);
pub const INSTANCE_NUMBER: Tag = Tag(0x0020, 0x0013);
pub const CONTENT_DATE: Tag = Tag(0x0008, 0x0023);
pub const CONTENT_TIME: Tag = Tag(0x0008, 0x0033);
pub const LOSSY_IMAGE_COMPRESSION: Tag = Tag(0x0028, 0x2110);

// Patient Tags
pub const PATIENT_NAME: Tag = Tag(0x0010, 0x0010);
pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
pub const PATIENT_BIRTH_DATE: Tag = Tag(0x0010, 0x0030);
pub const PATIENT_SEX: Tag = Tag(0x0010, 0x0040);
pub const PATIENT_AGE: Tag = Tag(0x0010, 0x1010);
pub const PATIENT_WEIGHT: Tag = Tag(0x0010, 0x1030);
pub const PATIENT_IDENTITY_REMOVED: Tag = Tag(0x0012, 0x0062);

// Study Tags
pub const STUDY_INSTANCE_UID: Tag = Tag(0x0020, 0x000D);
pub const STUDY_ID: Tag = Tag(0x0020, 0x0010);
pub const STUDY_DATE: Tag = Tag(0x0008, 0x0020);
pub const STUDY_TIME: Tag = Tag(0x0008, 0x0030);
pub const STUDY_DESCRIPTION: Tag = Tag(0x0008, 0x1030);
pub const ACCESSION_NUMBER: Tag = Tag(0x0008, 0x0050);
pub const REFERRING_PHYSICIAN_NAME: Tag = Tag(0x0008, 0x0090);

// Series Tags
pub const SERIES_INSTANCE_UID: Tag = Tag(0x0020, 0x000E);
pub const SERIES_NUMBER: Tag = Tag(0x0020, 0x0011);
pub const SERIES_DATE: Tag = Tag(0x0008, 0x0021);
pub const SERIES_TIME: Tag = Tag(0x0008, 0x0031);
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);
pub const MODALITY: Tag = Tag(0x0008, 0x0060);

// Equipment Tags
pub const INSTITUTION_NAME: Tag = Tag(0x0008, 0x0080);
pub const MANUFACTURER: Tag = Tag(0x0008, 0x0070);
pub const MANUFACTURER_MODEL_NAME: Tag = Tag(0x0008, 0x1090);
pub const DEVICE_SERIAL_NUMBER: Tag = Tag(0x0018, 0x1000);
pub const SOFTWARE_VERSIONS: Tag = Tag(0x0018, 0x1020);

// Frame of Reference Tags
pub const FRAME_OF_REFERENCE_UID: Tag = Tag(0x0020, 0x0052);
pub const POSITION_REFERENCE_INDICATOR: Tag = Tag(0x0020, 0x1040);

// Image Geometry Tags
pub const IMAGE_POSITION_PATIENT: Tag = Tag(0x0020, 0x0032);
pub const IMAGE_ORIENTATION_PATIENT: Tag = Tag(0x0020, 0x0037);
pub const PIXEL_SPACING: Tag = Tag(0x0028, 0x0030);
pub const SLICE_THICKNESS: Tag = Tag(0x0018, 0x0050);
pub const SPACING_BETWEEN_SLICES: Tag = Tag(0x0018, 0x0088);
pub const ROWS: Tag = Tag(0x0028, 0x0010);
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);

// Image Pixel Tags
pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
pub const PHOTOMETRIC_INTERPRETATION: Tag = Tag(0x0028, 0x0004);
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
pub const BITS_STORED: Tag = Tag(0x0028, 0x0101);
pub const HIGH_BIT: Tag = Tag(0x0028, 0x0102);
pub const PIXEL_REPRESENTATION: Tag = Tag(0x0028, 0x0103);
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

// Content Identification Tags
pub const CONTENT_LABEL: Tag = Tag(0x0070, 0x0080);
pub const CONTENT_DESCRIPTION: Tag = Tag(0x0070, 0x0081);
pub const CONTENT_CREATOR_NAME: Tag = Tag(0x0070, 0x0084);
pub const CONTENT_QUALIFICATION: Tag = Tag(0x0018, 0x9004);

// Segmentation Tags
pub const SEGMENTATION_TYPE: Tag = Tag(0x0062, 0x0001);
pub const SEGMENT_SEQUENCE: Tag = Tag(0x0062, 0x0002);
pub const SEGMENTED_PROPERTY_CATEGORY_CODE_SEQUENCE: Tag = Tag(0x0062, 0x0003);
pub const SEGMENT_NUMBER: Tag = Tag(0x0062, 0x0004);
pub const SEGMENT_LABEL: Tag = Tag(0x0062, 0x0005);
pub const SEGMENT_DESCRIPTION: Tag = Tag(0x0062, 0x0006);
pub const SEGMENT_ALGORITHM_TYPE: Tag = Tag(0x0062, 0x0008);
pub const SEGMENT_ALGORITHM_NAME: Tag = Tag(0x0062, 0x0009);
pub const SEGMENT_IDENTIFICATION_SEQUENCE: Tag = Tag(0x0062, 0x000A);
pub const REFERENCED_SEGMENT_NUMBER: Tag = Tag(0x0062, 0x000B);
pub const RECOMMENDED_DISPLAY_CIELAB_VALUE: Tag = Tag(0x0062, 0x000D);
pub const SEGMENTED_PROPERTY_TYPE_CODE_SEQUENCE: Tag = Tag(0x0062, 0x000F);

// Code Sequence Item Tags
pub const CODE_VALUE: Tag = Tag(0x0008, 0x0100);
pub const CODING_SCHEME_DESIGNATOR: Tag = Tag(0x0008, 0x0102);
pub const CODE_MEANING: Tag = Tag(0x0008, 0x0104);

// Multi-frame Functional Group Tags
pub const SHARED_FUNCTIONAL_GROUPS_SEQUENCE: Tag = Tag(0x5200, 0x9229);
pub const PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE: Tag = Tag(0x5200, 0x9230);
pub const PLANE_ORIENTATION_SEQUENCE: Tag = Tag(0x0020, 0x9116);
pub const PIXEL_MEASURES_SEQUENCE: Tag = Tag(0x0028, 0x9110);
pub const PLANE_POSITION_SEQUENCE: Tag = Tag(0x0020, 0x9113);
pub const FRAME_CONTENT_SEQUENCE: Tag = Tag(0x0020, 0x9111);
pub const DIMENSION_INDEX_VALUES: Tag = Tag(0x0020, 0x9157);
pub const DERIVATION_IMAGE_SEQUENCE: Tag = Tag(0x0008, 0x9124);
pub const SOURCE_IMAGE_SEQUENCE: Tag = Tag(0x0008, 0x2112);
pub const DERIVATION_CODE_SEQUENCE: Tag = Tag(0x0008, 0x9215);
pub const PURPOSE_OF_REFERENCE_CODE_SEQUENCE: Tag = Tag(0x0040, 0xA170);

// Multi-frame Dimension Tags
pub const DIMENSION_ORGANIZATION_SEQUENCE: Tag = Tag(0x0020, 0x9221);
pub const DIMENSION_ORGANIZATION_UID: Tag = Tag(0x0020, 0x9164);
pub const DIMENSION_INDEX_SEQUENCE: Tag = Tag(0x0020, 0x9222);
pub const DIMENSION_INDEX_POINTER: Tag = Tag(0x0020, 0x9165);
pub const FUNCTIONAL_GROUP_POINTER: Tag = Tag(0x0020, 0x9167);
pub const DIMENSION_DESCRIPTION_LABEL: Tag = Tag(0x0020, 0x9421);

// Referenced Series / Instance Tags
pub const REFERENCED_SERIES_SEQUENCE: Tag = Tag(0x0008, 0x1115);
pub const REFERENCED_INSTANCE_SEQUENCE: Tag = Tag(0x0008, 0x114A);
pub const REFERENCED_SOP_CLASS_UID: Tag = Tag(0x0008, 0x1150);
pub const REFERENCED_SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x1155);

/// Helper to get string value from DICOM tag
///
/// Returns `None` if the tag is not present, cannot be converted to string,
/// or holds only padding
pub fn get_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim_matches(|c: char| c.is_whitespace() || c == '\0').to_string())
        .filter(|s| !s.is_empty())
}

/// Helper to get u16 value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to u16
pub fn get_u16_value(dcm: &InMemDicomObject, tag: Tag) -> Option<u16> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<u16>().ok())
}

/// Helper to get a multi-valued decimal attribute from DICOM tag
///
/// Falls back to loose string parsing when the value is not a clean
/// backslash-separated decimal string.
pub fn get_multi_float_value(dcm: &InMemDicomObject, tag: Tag) -> Option<Vec<f64>> {
    let elem = dcm.element(tag).ok()?;
    if let Ok(values) = elem.to_multi_float64() {
        return Some(values);
    }
    elem.to_str()
        .ok()
        .map(|s| parse_decimals(&s))
        .filter(|values| !values.is_empty())
}

/// Helper to get a single decimal value from DICOM tag
pub fn get_float_value(dcm: &InMemDicomObject, tag: Tag) -> Option<f64> {
    get_multi_float_value(dcm, tag).and_then(|values| values.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::{DataElement, PrimitiveValue, VR};

    #[test]
    fn test_tag_values() {
        assert_eq!(SEGMENT_SEQUENCE, Tag(0x0062, 0x0002));
        assert_eq!(PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE, Tag(0x5200, 0x9230));
        assert_eq!(DIMENSION_INDEX_VALUES, Tag(0x0020, 0x9157));
        assert_eq!(PIXEL_DATA, Tag(0x7FE0, 0x0010));
    }

    #[test]
    fn test_get_multi_float_value_backslash() {
        let dcm = InMemDicomObject::from_element_iter([DataElement::new(
            IMAGE_POSITION_PATIENT,
            VR::DS,
            PrimitiveValue::from("-120.5\\-98.25\\12"),
        )]);
        assert_eq!(
            get_multi_float_value(&dcm, IMAGE_POSITION_PATIENT),
            Some(vec![-120.5, -98.25, 12.0])
        );
    }

    #[test]
    fn test_get_float_value_missing() {
        let dcm = InMemDicomObject::new_empty();
        assert_eq!(get_float_value(&dcm, SLICE_THICKNESS), None);
    }

    #[test]
    fn test_get_string_value_strips_padding() {
        let dcm = InMemDicomObject::from_element_iter([DataElement::new(
            SERIES_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from("1.2.3\0"),
        )]);
        assert_eq!(
            get_string_value(&dcm, SERIES_INSTANCE_UID),
            Some("1.2.3".to_string())
        );
    }
}
