//! Core type definitions for segmentation encoding
//!
//! This module provides the fundamental types used throughout the library:
//! - [`SegmentClass`]: Anatomical classes (whole gland, peripheral zone, transition zone)
//! - [`EncodingMode`]: Combined multi-class object or single-class object
//! - [`PixelSpacing`]: In-plane spacing of the reference slices
//! - [`EncoderConfig`]: Descriptive attributes and output selection for a case

mod config;
mod enums;
pub(crate) mod pixel_spacing;

pub use config::EncoderConfig;
pub use enums::{EncodingMode, SegmentClass};
pub use pixel_spacing::PixelSpacing;
