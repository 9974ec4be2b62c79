//! Segment catalog
//!
//! Static coding and display metadata for each anatomical class. The table
//! is a plain constant, so it can be shared freely across worker threads.

use crate::error::Result;
use crate::types::SegmentClass;

/// A coded concept (code value, coding scheme, meaning)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodedConcept {
    pub value: &'static str,
    pub scheme: &'static str,
    pub meaning: &'static str,
}

impl CodedConcept {
    pub const fn new(value: &'static str, scheme: &'static str, meaning: &'static str) -> Self {
        Self {
            value,
            scheme,
            meaning,
        }
    }
}

/// SegmentedPropertyCategoryCodeSequence shared by every class
pub const ANATOMICAL_STRUCTURE: CodedConcept =
    CodedConcept::new("T-D000A", "SRT", "Anatomical Structure");

/// PurposeOfReferenceCodeSequence of every source image reference
pub const SOURCE_IMAGE_PURPOSE: CodedConcept =
    CodedConcept::new("121322", "DCM", "Source image for image processing operation");

/// DerivationCodeSequence of every frame
pub const SEGMENTATION_DERIVATION: CodedConcept =
    CodedConcept::new("113076", "DCM", "Segmentation");

/// Catalog entry for one class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentDescriptor {
    pub class: SegmentClass,

    /// SegmentDescription
    pub description: &'static str,

    /// SegmentedPropertyCategoryCodeSequence
    pub category: CodedConcept,

    /// SegmentedPropertyTypeCodeSequence
    pub property_type: CodedConcept,

    /// RecommendedDisplayCIELabValue
    pub color: [u16; 3],
}

const CATALOG: [SegmentDescriptor; 3] = [
    SegmentDescriptor {
        class: SegmentClass::Wg,
        description: "Whole gland of the prostate",
        category: ANATOMICAL_STRUCTURE,
        property_type: CodedConcept::new("T-92000", "SRT", "Prostate"),
        color: [42318, 26448, 26367],
    },
    SegmentDescriptor {
        class: SegmentClass::Pz,
        description: "Peripheral zone of the prostate",
        category: ANATOMICAL_STRUCTURE,
        property_type: CodedConcept::new("T-D05E4", "SRT", "Prostate peripheral zone"),
        color: [34340, 40315, 27406],
    },
    SegmentDescriptor {
        class: SegmentClass::Tz,
        description: "Transition zone of the prostate",
        category: ANATOMICAL_STRUCTURE,
        property_type: CodedConcept::new("T-D0823", "SRT", "Prostate transition zone"),
        color: [58366, 30737, 53006],
    },
];

/// Read-only lookup over the segment catalog
pub struct SegmentCatalog;

impl SegmentCatalog {
    /// Returns the descriptor of a class
    pub fn descriptor(class: SegmentClass) -> &'static SegmentDescriptor {
        match class {
            SegmentClass::Wg => &CATALOG[0],
            SegmentClass::Pz => &CATALOG[1],
            SegmentClass::Tz => &CATALOG[2],
        }
    }

    /// Looks up a descriptor by class tag
    ///
    /// # Errors
    ///
    /// Returns [`crate::SegError::UnknownClass`] for an unrecognized tag
    pub fn lookup(tag: &str) -> Result<&'static SegmentDescriptor> {
        SegmentClass::from_tag(tag).map(Self::descriptor)
    }

    /// All descriptors in priority order
    pub fn all() -> &'static [SegmentDescriptor] {
        &CATALOG
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SegError;

    #[test]
    fn test_descriptor_matches_class() {
        for class in SegmentClass::ALL {
            assert_eq!(SegmentCatalog::descriptor(class).class, class);
        }
    }

    #[test]
    fn test_lookup_by_tag() {
        let pz = SegmentCatalog::lookup("pz").unwrap();
        assert_eq!(pz.property_type.value, "T-D05E4");
        assert_eq!(pz.property_type.meaning, "Prostate peripheral zone");
        assert_eq!(pz.category, ANATOMICAL_STRUCTURE);
    }

    #[test]
    fn test_lookup_unknown() {
        assert!(matches!(
            SegmentCatalog::lookup("bladder"),
            Err(SegError::UnknownClass(_))
        ));
    }

    #[test]
    fn test_all_in_priority_order() {
        let classes: Vec<_> = SegmentCatalog::all().iter().map(|d| d.class).collect();
        assert_eq!(classes, SegmentClass::ALL.to_vec());
    }
}
