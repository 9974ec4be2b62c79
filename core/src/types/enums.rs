use crate::error::SegError;
use std::fmt;
use std::str::FromStr;

/// Anatomical class carried by a mask
///
/// Variants are declared in overlap priority order: `Wg` claims contested
/// voxels last, `Tz` keeps everything. The derived `Ord` follows this order,
/// which is also the segment numbering and frame order of combined objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum SegmentClass {
    /// Whole gland
    Wg,
    /// Peripheral zone
    Pz,
    /// Transition zone
    Tz,
}

impl SegmentClass {
    /// All classes in priority order
    pub const ALL: [SegmentClass; 3] = [SegmentClass::Wg, SegmentClass::Pz, SegmentClass::Tz];

    /// Returns the short lowercase tag ("wg", "pz", "tz")
    pub fn tag(&self) -> &'static str {
        match self {
            SegmentClass::Wg => "wg",
            SegmentClass::Pz => "pz",
            SegmentClass::Tz => "tz",
        }
    }

    /// Parses a class tag, case-insensitively
    ///
    /// # Errors
    ///
    /// Returns [`SegError::UnknownClass`] for anything but wg, pz or tz
    pub fn from_tag(tag: &str) -> Result<Self, SegError> {
        match tag.trim().to_lowercase().as_str() {
            "wg" => Ok(SegmentClass::Wg),
            "pz" => Ok(SegmentClass::Pz),
            "tz" => Ok(SegmentClass::Tz),
            _ => Err(SegError::UnknownClass(tag.to_string())),
        }
    }

    /// Segment label written to the SegmentSequence
    pub fn label(&self) -> String {
        self.tag().to_uppercase()
    }
}

impl FromStr for SegmentClass {
    type Err = SegError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

impl fmt::Display for SegmentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Which object is being built for a case
///
/// A combined object carries every present class with overlaps resolved and
/// empty frames dropped. A single-class object carries one class, raw and
/// unreduced, always as segment number 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum EncodingMode {
    Combined,
    Single(SegmentClass),
}

impl EncodingMode {
    /// Series number, fixed per mode so viewers list the objects predictably
    pub fn series_number(&self) -> u32 {
        match self {
            EncodingMode::Combined => 100,
            EncodingMode::Single(SegmentClass::Wg) => 101,
            EncodingMode::Single(SegmentClass::Pz) => 102,
            EncodingMode::Single(SegmentClass::Tz) => 103,
        }
    }

    /// Instance number, fixed per mode
    pub fn instance_number(&self) -> u32 {
        self.series_number() + 100
    }

    pub fn series_description(&self) -> &'static str {
        match self {
            EncodingMode::Combined => "Segmentation WG+PZ+TZ",
            EncodingMode::Single(SegmentClass::Wg) => "Prostate Whole Gland",
            EncodingMode::Single(SegmentClass::Pz) => "Prostate Peripheral Zone",
            EncodingMode::Single(SegmentClass::Tz) => "Prostate Transition Zone",
        }
    }

    /// Output file name inside the case's segmentation directory
    pub fn file_name(&self) -> String {
        match self {
            EncodingMode::Combined => "prostate_zones.dcm".to_string(),
            EncodingMode::Single(class) => format!("{}.dcm", class.tag()),
        }
    }

    pub fn is_combined(&self) -> bool {
        matches!(self, EncodingMode::Combined)
    }
}

impl fmt::Display for EncodingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingMode::Combined => write!(f, "combined"),
            EncodingMode::Single(class) => write!(f, "single-{}", class),
        }
    }
}
