use crate::error::{Result, SegError};
use crate::tags::{
    get_float_value, get_multi_float_value, get_string_value, get_u16_value, ACCESSION_NUMBER,
    COLUMNS,
    FRAME_OF_REFERENCE_UID, IMAGE_ORIENTATION_PATIENT, IMAGE_POSITION_PATIENT, NUMBER_OF_FRAMES,
    PATIENT_AGE, PATIENT_BIRTH_DATE, PATIENT_ID, PATIENT_IDENTITY_REMOVED, PATIENT_NAME,
    PATIENT_SEX, PATIENT_WEIGHT, PIXEL_SPACING, REFERRING_PHYSICIAN_NAME, ROWS,
    SERIES_INSTANCE_UID, SLICE_THICKNESS, SOP_CLASS_UID, SOP_INSTANCE_UID,
    SPACING_BETWEEN_SLICES, STUDY_DATE, STUDY_DESCRIPTION, STUDY_ID, STUDY_INSTANCE_UID,
    STUDY_TIME,
};
use crate::types::PixelSpacing;
use dicom_core::Tag;
use dicom_object::mem::InMemElement;
use dicom_object::InMemDicomObject;

/// Patient and study attributes copied verbatim when present
const INHERITED_TAGS: [Tag; 7] = [
    ACCESSION_NUMBER,
    PATIENT_BIRTH_DATE,
    PATIENT_WEIGHT,
    PATIENT_SEX,
    PATIENT_AGE,
    REFERRING_PHYSICIAN_NAME,
    PATIENT_IDENTITY_REMOVED,
];

/// One 2-D slice of the reference series
///
/// Holds the geometry and identifiers needed to link segmentation frames
/// back to the image they were derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSlice {
    /// ImagePositionPatient: center of the first transmitted pixel, in mm
    pub position: [f64; 3],

    /// ImageOrientationPatient: row then column direction cosines
    pub orientation: [f64; 6],

    pub pixel_spacing: PixelSpacing,

    pub slice_thickness: f64,

    /// SpacingBetweenSlices, when the modality records it
    pub spacing_between_slices: Option<f64>,

    pub rows: u16,

    pub columns: u16,

    pub sop_class_uid: String,

    pub sop_instance_uid: String,

    pub series_instance_uid: String,

    /// StudyInstanceUID, or StudyID when the UID is absent
    pub study_instance_uid: String,

    pub frame_of_reference_uid: Option<String>,
}

impl ReferenceSlice {
    /// Extracts a reference slice from a DICOM object
    ///
    /// # Errors
    ///
    /// Returns [`SegError::ReferenceSeries`] if a geometry attribute or
    /// identifier is missing, or if the object holds more than one frame
    pub fn from_dicom(dcm: &InMemDicomObject) -> Result<Self> {
        if let Some(frames) = get_string_value(dcm, NUMBER_OF_FRAMES)
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|&n| n > 1)
        {
            return Err(SegError::ReferenceSeries(format!(
                "multi-frame source images are not supported ({} frames)",
                frames
            )));
        }

        let position = fixed_values::<3>(dcm, IMAGE_POSITION_PATIENT, "ImagePositionPatient")?;
        let orientation =
            fixed_values::<6>(dcm, IMAGE_ORIENTATION_PATIENT, "ImageOrientationPatient")?;
        let [row_spacing, col_spacing] = fixed_values::<2>(dcm, PIXEL_SPACING, "PixelSpacing")?;

        Ok(Self {
            position,
            orientation,
            pixel_spacing: PixelSpacing::new(row_spacing, col_spacing),
            slice_thickness: get_float_value(dcm, SLICE_THICKNESS)
                .ok_or_else(|| missing("SliceThickness"))?,
            spacing_between_slices: get_float_value(dcm, SPACING_BETWEEN_SLICES),
            rows: get_u16_value(dcm, ROWS).ok_or_else(|| missing("Rows"))?,
            columns: get_u16_value(dcm, COLUMNS).ok_or_else(|| missing("Columns"))?,
            sop_class_uid: required_string(dcm, SOP_CLASS_UID, "SOPClassUID")?,
            sop_instance_uid: required_string(dcm, SOP_INSTANCE_UID, "SOPInstanceUID")?,
            series_instance_uid: required_string(dcm, SERIES_INSTANCE_UID, "SeriesInstanceUID")?,
            study_instance_uid: get_string_value(dcm, STUDY_INSTANCE_UID)
                .or_else(|| get_string_value(dcm, STUDY_ID))
                .ok_or_else(|| missing("StudyInstanceUID"))?,
            frame_of_reference_uid: get_string_value(dcm, FRAME_OF_REFERENCE_UID),
        })
    }

    /// Unit normal of the slice plane (row cosines x column cosines)
    pub fn normal(&self) -> [f64; 3] {
        let [rx, ry, rz, cx, cy, cz] = self.orientation;
        [ry * cz - rz * cy, rz * cx - rx * cz, rx * cy - ry * cx]
    }

    /// Position of the slice along the through-plane axis, in mm
    pub fn through_plane_position(&self) -> f64 {
        let n = self.normal();
        n[0] * self.position[0] + n[1] * self.position[1] + n[2] * self.position[2]
    }
}

/// Patient and study identity shared by every slice of a series
///
/// Taken from the first slice in spatial order and carried unchanged into
/// every generated object.
#[derive(Debug, Clone)]
pub struct StudyContext {
    pub patient_id: String,
    pub patient_name: String,
    pub study_instance_uid: String,
    pub study_id: String,
    pub study_date: Option<String>,
    pub study_time: Option<String>,
    pub study_description: Option<String>,
    pub frame_of_reference_uid: Option<String>,

    /// Demographic elements copied as-is (birth date, sex, age, ...)
    pub inherited: Vec<InMemElement>,
}

impl StudyContext {
    /// Extracts the study context from a reference DICOM object
    ///
    /// PatientID and PatientName stand in for each other when only one is
    /// present; the same holds for StudyInstanceUID and StudyID.
    ///
    /// # Errors
    ///
    /// Returns [`SegError::ReferenceSeries`] if neither patient identifier
    /// or neither study identifier is present
    pub fn from_dicom(dcm: &InMemDicomObject) -> Result<Self> {
        let patient_id = get_string_value(dcm, PATIENT_ID);
        let patient_name = get_string_value(dcm, PATIENT_NAME);
        let (patient_id, patient_name) = match (patient_id, patient_name) {
            (Some(id), Some(name)) => (id, name),
            (Some(id), None) => (id.clone(), id),
            (None, Some(name)) => (name.clone(), name),
            (None, None) => return Err(missing("PatientID")),
        };

        let study_uid = get_string_value(dcm, STUDY_INSTANCE_UID);
        let study_id = get_string_value(dcm, STUDY_ID);
        let (study_instance_uid, study_id) = match (study_uid, study_id) {
            (Some(uid), Some(id)) => (uid, id),
            (Some(uid), None) => (uid.clone(), uid),
            (None, Some(id)) => (id.clone(), id),
            (None, None) => return Err(missing("StudyInstanceUID")),
        };

        let inherited = INHERITED_TAGS
            .iter()
            .filter_map(|&tag| dcm.element(tag).ok().cloned())
            .collect();

        Ok(Self {
            patient_id,
            patient_name,
            study_instance_uid,
            study_id,
            study_date: get_string_value(dcm, STUDY_DATE),
            study_time: get_string_value(dcm, STUDY_TIME),
            study_description: get_string_value(dcm, STUDY_DESCRIPTION),
            frame_of_reference_uid: get_string_value(dcm, FRAME_OF_REFERENCE_UID),
            inherited,
        })
    }
}

fn missing(name: &str) -> SegError {
    SegError::ReferenceSeries(format!("missing {}", name))
}

fn required_string(dcm: &InMemDicomObject, tag: Tag, name: &str) -> Result<String> {
    get_string_value(dcm, tag).ok_or_else(|| missing(name))
}

fn fixed_values<const N: usize>(
    dcm: &InMemDicomObject,
    tag: Tag,
    name: &str,
) -> Result<[f64; N]> {
    let values = get_multi_float_value(dcm, tag).ok_or_else(|| missing(name))?;
    values.get(..N).and_then(|v| v.try_into().ok()).ok_or_else(|| {
        SegError::ReferenceSeries(format!(
            "{} has {} values, expected {}",
            name,
            values.len(),
            N
        ))
    })
}
