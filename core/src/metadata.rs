//! Segmentation metadata assembly
//!
//! Functional groups, segment sequence, source references and dimension
//! organization are modeled as small immutable records. Each record renders
//! itself into a DICOM item, so the nested sequences are built bottom-up.

use crate::catalog::{
    CodedConcept, SegmentCatalog, SegmentDescriptor, SEGMENTATION_DERIVATION, SOURCE_IMAGE_PURPOSE,
};
use crate::mask::EncodedSegment;
use crate::reference::ReferenceSeries;
use crate::tags::{
    CODE_MEANING, CODE_VALUE, CODING_SCHEME_DESIGNATOR, DERIVATION_CODE_SEQUENCE,
    DERIVATION_IMAGE_SEQUENCE, DIMENSION_DESCRIPTION_LABEL, DIMENSION_INDEX_POINTER,
    DIMENSION_INDEX_SEQUENCE, DIMENSION_INDEX_VALUES, DIMENSION_ORGANIZATION_SEQUENCE,
    DIMENSION_ORGANIZATION_UID, FRAME_CONTENT_SEQUENCE, FUNCTIONAL_GROUP_POINTER,
    IMAGE_ORIENTATION_PATIENT, IMAGE_POSITION_PATIENT, PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE,
    PIXEL_MEASURES_SEQUENCE, PIXEL_SPACING, PLANE_ORIENTATION_SEQUENCE, PLANE_POSITION_SEQUENCE,
    PURPOSE_OF_REFERENCE_CODE_SEQUENCE, RECOMMENDED_DISPLAY_CIELAB_VALUE,
    REFERENCED_INSTANCE_SEQUENCE, REFERENCED_SEGMENT_NUMBER, REFERENCED_SERIES_SEQUENCE,
    REFERENCED_SOP_CLASS_UID, REFERENCED_SOP_INSTANCE_UID,
    SEGMENTED_PROPERTY_CATEGORY_CODE_SEQUENCE,
    SEGMENTED_PROPERTY_TYPE_CODE_SEQUENCE, SEGMENT_ALGORITHM_NAME, SEGMENT_ALGORITHM_TYPE,
    SEGMENT_DESCRIPTION, SEGMENT_IDENTIFICATION_SEQUENCE, SEGMENT_LABEL, SEGMENT_NUMBER,
    SEGMENT_SEQUENCE, SERIES_INSTANCE_UID, SHARED_FUNCTIONAL_GROUPS_SEQUENCE, SLICE_THICKNESS,
    SOURCE_IMAGE_SEQUENCE, SPACING_BETWEEN_SLICES,
};
use crate::types::{PixelSpacing, SegmentClass};
use dicom_core::value::{DataSetSequence, PrimitiveValue};
use dicom_core::{DataElement, Tag, VR};
use dicom_object::mem::InMemElement;
use dicom_object::InMemDicomObject;

/// Maximum length of a DS value
const DS_MAX_LEN: usize = 16;

/// Formats a decimal so that it fits a DS value
pub(crate) fn decimal_string(value: f64) -> String {
    let plain = value.to_string();
    if plain.len() <= DS_MAX_LEN {
        return plain;
    }

    for precision in (0..DS_MAX_LEN).rev() {
        let fixed = format!("{:.*}", precision, value);
        let fixed = if fixed.contains('.') {
            fixed.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            fixed
        };
        if fixed.len() <= DS_MAX_LEN {
            return fixed;
        }
    }

    format!("{:.6e}", value)
}

/// Builds a multi-valued DS primitive
pub(crate) fn decimals(values: &[f64]) -> PrimitiveValue {
    let strings: Vec<String> = values.iter().map(|&v| decimal_string(v)).collect();
    PrimitiveValue::Strs(strings.into())
}

/// Wraps items into a sequence element
pub(crate) fn sequence(tag: Tag, items: Vec<InMemDicomObject>) -> InMemElement {
    DataElement::new(tag, VR::SQ, DataSetSequence::from(items))
}

fn code_item(concept: &CodedConcept) -> InMemDicomObject {
    InMemDicomObject::from_element_iter([
        DataElement::new(CODE_VALUE, VR::SH, PrimitiveValue::from(concept.value)),
        DataElement::new(
            CODING_SCHEME_DESIGNATOR,
            VR::SH,
            PrimitiveValue::from(concept.scheme),
        ),
        DataElement::new(CODE_MEANING, VR::LO, PrimitiveValue::from(concept.meaning)),
    ])
}

/// Geometry common to every frame
#[derive(Debug, Clone, PartialEq)]
pub struct SharedGroup {
    pub orientation: [f64; 6],
    pub pixel_spacing: PixelSpacing,
    pub slice_thickness: f64,
    pub spacing_between_slices: f64,
}

impl SharedGroup {
    /// Takes the geometry of the first slice as valid for the whole series
    pub fn from_series(series: &ReferenceSeries) -> Self {
        let first = series.first();
        Self {
            orientation: first.orientation,
            pixel_spacing: first.pixel_spacing,
            slice_thickness: first.slice_thickness,
            spacing_between_slices: series.spacing_between_slices(),
        }
    }

    pub fn to_item(&self) -> InMemDicomObject {
        let orientation = InMemDicomObject::from_element_iter([DataElement::new(
            IMAGE_ORIENTATION_PATIENT,
            VR::DS,
            decimals(&self.orientation),
        )]);
        let measures = InMemDicomObject::from_element_iter([
            DataElement::new(
                SLICE_THICKNESS,
                VR::DS,
                decimals(&[self.slice_thickness]),
            ),
            DataElement::new(
                SPACING_BETWEEN_SLICES,
                VR::DS,
                decimals(&[self.spacing_between_slices]),
            ),
            DataElement::new(
                PIXEL_SPACING,
                VR::DS,
                decimals(&self.pixel_spacing.to_array()),
            ),
        ]);

        InMemDicomObject::from_element_iter([
            sequence(PLANE_ORIENTATION_SEQUENCE, vec![orientation]),
            sequence(PIXEL_MEASURES_SEQUENCE, vec![measures]),
        ])
    }
}

/// Entry of the SegmentSequence
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentItem {
    pub label: u16,
    pub descriptor: &'static SegmentDescriptor,
    pub algorithm_name: String,
}

impl SegmentItem {
    pub fn new(class: SegmentClass, label: u16, algorithm_name: &str) -> Self {
        Self {
            label,
            descriptor: SegmentCatalog::descriptor(class),
            algorithm_name: algorithm_name.to_string(),
        }
    }

    pub fn class(&self) -> SegmentClass {
        self.descriptor.class
    }

    pub fn to_item(&self) -> InMemDicomObject {
        let descriptor = self.descriptor;
        InMemDicomObject::from_element_iter([
            DataElement::new(SEGMENT_NUMBER, VR::US, PrimitiveValue::from(self.label)),
            DataElement::new(
                SEGMENT_LABEL,
                VR::LO,
                PrimitiveValue::from(descriptor.class.label()),
            ),
            DataElement::new(
                SEGMENT_DESCRIPTION,
                VR::ST,
                PrimitiveValue::from(descriptor.description),
            ),
            DataElement::new(SEGMENT_ALGORITHM_TYPE, VR::CS, PrimitiveValue::from("AUTOMATIC")),
            DataElement::new(
                SEGMENT_ALGORITHM_NAME,
                VR::LO,
                PrimitiveValue::from(self.algorithm_name.as_str()),
            ),
            sequence(
                SEGMENTED_PROPERTY_CATEGORY_CODE_SEQUENCE,
                vec![code_item(&descriptor.category)],
            ),
            sequence(
                SEGMENTED_PROPERTY_TYPE_CODE_SEQUENCE,
                vec![code_item(&descriptor.property_type)],
            ),
            DataElement::new(
                RECOMMENDED_DISPLAY_CIELAB_VALUE,
                VR::US,
                PrimitiveValue::U16(descriptor.color.to_vec().into()),
            ),
        ])
    }
}

/// Per-frame functional group of one encoded frame
#[derive(Debug, Clone, PartialEq)]
pub struct PerFrameRecord {
    pub label: u16,

    /// 0-based index of the source slice in spatial order
    pub slice_index: usize,

    pub position: [f64; 3],
    pub source_sop_class_uid: String,
    pub source_sop_instance_uid: String,
}

impl PerFrameRecord {
    /// DimensionIndexValues: segment number, then 1-based slice index
    pub fn dimension_index_values(&self) -> [u32; 2] {
        [u32::from(self.label), self.slice_index as u32 + 1]
    }

    pub fn to_item(&self) -> InMemDicomObject {
        let frame_content = InMemDicomObject::from_element_iter([DataElement::new(
            DIMENSION_INDEX_VALUES,
            VR::UL,
            PrimitiveValue::U32(self.dimension_index_values().to_vec().into()),
        )]);
        let plane_position = InMemDicomObject::from_element_iter([DataElement::new(
            IMAGE_POSITION_PATIENT,
            VR::DS,
            decimals(&self.position),
        )]);
        let segment_identification = InMemDicomObject::from_element_iter([DataElement::new(
            REFERENCED_SEGMENT_NUMBER,
            VR::US,
            PrimitiveValue::from(self.label),
        )]);

        let source_image = InMemDicomObject::from_element_iter([
            DataElement::new(
                REFERENCED_SOP_CLASS_UID,
                VR::UI,
                PrimitiveValue::from(self.source_sop_class_uid.as_str()),
            ),
            DataElement::new(
                REFERENCED_SOP_INSTANCE_UID,
                VR::UI,
                PrimitiveValue::from(self.source_sop_instance_uid.as_str()),
            ),
            sequence(
                PURPOSE_OF_REFERENCE_CODE_SEQUENCE,
                vec![code_item(&SOURCE_IMAGE_PURPOSE)],
            ),
        ]);
        let derivation_image = InMemDicomObject::from_element_iter([
            sequence(SOURCE_IMAGE_SEQUENCE, vec![source_image]),
            sequence(
                DERIVATION_CODE_SEQUENCE,
                vec![code_item(&SEGMENTATION_DERIVATION)],
            ),
        ]);

        InMemDicomObject::from_element_iter([
            sequence(FRAME_CONTENT_SEQUENCE, vec![frame_content]),
            sequence(PLANE_POSITION_SEQUENCE, vec![plane_position]),
            sequence(SEGMENT_IDENTIFICATION_SEQUENCE, vec![segment_identification]),
            sequence(DERIVATION_IMAGE_SEQUENCE, vec![derivation_image]),
        ])
    }
}

/// SOP reference of one reference slice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencedInstance {
    pub sop_class_uid: String,
    pub sop_instance_uid: String,
}

/// The source series with every one of its instances
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencedSeries {
    pub series_instance_uid: String,
    pub instances: Vec<ReferencedInstance>,
}

impl ReferencedSeries {
    pub fn from_series(series: &ReferenceSeries) -> Self {
        Self {
            series_instance_uid: series.series_instance_uid().to_string(),
            instances: series
                .slices()
                .iter()
                .map(|slice| ReferencedInstance {
                    sop_class_uid: slice.sop_class_uid.clone(),
                    sop_instance_uid: slice.sop_instance_uid.clone(),
                })
                .collect(),
        }
    }

    pub fn to_item(&self) -> InMemDicomObject {
        let instances = self
            .instances
            .iter()
            .map(|instance| {
                InMemDicomObject::from_element_iter([
                    DataElement::new(
                        REFERENCED_SOP_CLASS_UID,
                        VR::UI,
                        PrimitiveValue::from(instance.sop_class_uid.as_str()),
                    ),
                    DataElement::new(
                        REFERENCED_SOP_INSTANCE_UID,
                        VR::UI,
                        PrimitiveValue::from(instance.sop_instance_uid.as_str()),
                    ),
                ])
            })
            .collect();

        InMemDicomObject::from_element_iter([
            DataElement::new(
                SERIES_INSTANCE_UID,
                VR::UI,
                PrimitiveValue::from(self.series_instance_uid.as_str()),
            ),
            sequence(REFERENCED_INSTANCE_SEQUENCE, instances),
        ])
    }
}

/// Frames are indexed by segment number, then by plane position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionOrganization {
    pub uid: String,
}

impl DimensionOrganization {
    /// (index pointer, functional group pointer, label) of each dimension
    const DIMENSIONS: [(Tag, Tag, &'static str); 2] = [
        (
            REFERENCED_SEGMENT_NUMBER,
            SEGMENT_IDENTIFICATION_SEQUENCE,
            "ReferencedSegmentNumber",
        ),
        (
            IMAGE_POSITION_PATIENT,
            PLANE_POSITION_SEQUENCE,
            "ImagePositionPatient",
        ),
    ];

    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }

    pub fn to_elements(&self) -> Vec<InMemElement> {
        let organization = InMemDicomObject::from_element_iter([DataElement::new(
            DIMENSION_ORGANIZATION_UID,
            VR::UI,
            PrimitiveValue::from(self.uid.as_str()),
        )]);

        let indices = Self::DIMENSIONS
            .iter()
            .map(|&(pointer, group, label)| {
                InMemDicomObject::from_element_iter([
                    DataElement::new(
                        DIMENSION_ORGANIZATION_UID,
                        VR::UI,
                        PrimitiveValue::from(self.uid.as_str()),
                    ),
                    DataElement::new(
                        DIMENSION_INDEX_POINTER,
                        VR::AT,
                        PrimitiveValue::Tags(vec![pointer].into()),
                    ),
                    DataElement::new(
                        FUNCTIONAL_GROUP_POINTER,
                        VR::AT,
                        PrimitiveValue::Tags(vec![group].into()),
                    ),
                    DataElement::new(
                        DIMENSION_DESCRIPTION_LABEL,
                        VR::LO,
                        PrimitiveValue::from(label),
                    ),
                ])
            })
            .collect();

        vec![
            sequence(DIMENSION_ORGANIZATION_SEQUENCE, vec![organization]),
            sequence(DIMENSION_INDEX_SEQUENCE, indices),
        ]
    }
}

/// All structured metadata of one segmentation object
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationMetadata {
    pub shared: SharedGroup,
    pub segments: Vec<SegmentItem>,
    pub per_frame: Vec<PerFrameRecord>,
    pub referenced_series: ReferencedSeries,
    pub dimensions: DimensionOrganization,
}

impl SegmentationMetadata {
    pub fn frame_count(&self) -> usize {
        self.per_frame.len()
    }

    /// Renders every sequence attribute of the object
    pub fn to_elements(&self) -> Vec<InMemElement> {
        let mut elements = vec![
            sequence(
                SEGMENT_SEQUENCE,
                self.segments.iter().map(SegmentItem::to_item).collect(),
            ),
            sequence(SHARED_FUNCTIONAL_GROUPS_SEQUENCE, vec![self.shared.to_item()]),
            sequence(
                PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE,
                self.per_frame.iter().map(PerFrameRecord::to_item).collect(),
            ),
            sequence(
                REFERENCED_SERIES_SEQUENCE,
                vec![self.referenced_series.to_item()],
            ),
        ];
        elements.extend(self.dimensions.to_elements());
        elements
    }
}

/// Builds the metadata records of one object
pub struct MetadataAssembler;

impl MetadataAssembler {
    /// Assembles metadata for segments in their final order
    ///
    /// Per-frame records follow segment order, then the kept slices of each
    /// segment in ascending order, which is the order the pixel packer
    /// writes frames in.
    pub fn assemble(
        series: &ReferenceSeries,
        segments: &[EncodedSegment],
        algorithm_name: &str,
        dimension_organization_uid: &str,
    ) -> SegmentationMetadata {
        let slices = series.slices();

        let per_frame = segments
            .iter()
            .flat_map(|segment| {
                segment.slice_indices.iter().map(move |&index| {
                    let slice = &slices[index];
                    PerFrameRecord {
                        label: segment.label,
                        slice_index: index,
                        position: slice.position,
                        source_sop_class_uid: slice.sop_class_uid.clone(),
                        source_sop_instance_uid: slice.sop_instance_uid.clone(),
                    }
                })
            })
            .collect();

        SegmentationMetadata {
            shared: SharedGroup::from_series(series),
            segments: segments
                .iter()
                .map(|segment| SegmentItem::new(segment.class, segment.label, algorithm_name))
                .collect(),
            per_frame,
            referenced_series: ReferencedSeries::from_series(series),
            dimensions: DimensionOrganization::new(dimension_organization_uid),
        }
    }
}
