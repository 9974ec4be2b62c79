use crate::types::SegmentClass;

/// Configuration for encoding a case into segmentation objects
///
/// Controls the descriptive attributes written into every object and which
/// single-class objects accompany the combined one.
///
/// # Example
///
/// ```
/// use dicomseg_core::{EncoderConfig, SegmentClass};
///
/// let config = EncoderConfig::default()
///     .with_institution_name("Radiology Lab")
///     .with_single_classes(vec![SegmentClass::Wg])
///     .with_uid_seed(7);
///
/// assert_eq!(config.institution_name, "Radiology Lab");
/// assert_eq!(config.single_classes, vec![SegmentClass::Wg]);
/// assert_eq!(config.uid_seed, Some(7));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct EncoderConfig {
    /// InstitutionName of the generated objects
    pub institution_name: String,

    /// Manufacturer and ManufacturerModelName
    pub manufacturer: String,

    /// SegmentAlgorithmName of every segment
    pub algorithm_name: String,

    /// ContentCreatorName
    pub content_creator: String,

    /// ContentDescription
    pub content_description: String,

    /// Classes that also get a standalone object.
    /// Classes without a positive voxel are skipped.
    pub single_classes: Vec<SegmentClass>,

    /// Fixed seed for the UID suffixes, for reproducible output.
    /// If None, suffixes come from OS entropy.
    pub uid_seed: Option<u64>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            institution_name: "ICS-FORTH".to_string(),
            manufacturer: "Unspecified".to_string(),
            algorithm_name: "nnU-Net".to_string(),
            content_creator: "Automatic^Segmentation".to_string(),
            content_description: "nnU-Net Prostate Zone Segmentation".to_string(),
            single_classes: SegmentClass::ALL.to_vec(),
            uid_seed: None,
        }
    }
}

impl EncoderConfig {
    /// Creates a configuration that only writes the combined object
    ///
    /// # Example
    ///
    /// ```
    /// use dicomseg_core::EncoderConfig;
    ///
    /// let config = EncoderConfig::combined_only();
    /// assert!(config.single_classes.is_empty());
    /// ```
    pub fn combined_only() -> Self {
        Self {
            single_classes: Vec::new(),
            ..Self::default()
        }
    }

    /// Builder: Set the institution name
    pub fn with_institution_name(mut self, name: impl Into<String>) -> Self {
        self.institution_name = name.into();
        self
    }

    /// Builder: Set the manufacturer
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = manufacturer.into();
        self
    }

    /// Builder: Set the segment algorithm name
    pub fn with_algorithm_name(mut self, name: impl Into<String>) -> Self {
        self.algorithm_name = name.into();
        self
    }

    /// Builder: Set the content creator
    pub fn with_content_creator(mut self, creator: impl Into<String>) -> Self {
        self.content_creator = creator.into();
        self
    }

    /// Builder: Set the classes that get a standalone object
    ///
    /// Duplicates are removed and the list is kept in priority order.
    ///
    /// # Example
    ///
    /// ```
    /// use dicomseg_core::{EncoderConfig, SegmentClass};
    ///
    /// let config = EncoderConfig::default()
    ///     .with_single_classes(vec![SegmentClass::Tz, SegmentClass::Wg, SegmentClass::Tz]);
    /// assert_eq!(config.single_classes, vec![SegmentClass::Wg, SegmentClass::Tz]);
    /// ```
    pub fn with_single_classes(mut self, mut classes: Vec<SegmentClass>) -> Self {
        classes.sort();
        classes.dedup();
        self.single_classes = classes;
        self
    }

    /// Builder: Fix the UID seed
    pub fn with_uid_seed(mut self, seed: u64) -> Self {
        self.uid_seed = Some(seed);
        self
    }
}
