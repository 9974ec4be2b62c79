pub mod report;

use crate::types::{EncoderConfig, SegmentClass};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for dicomseg
#[derive(Parser, Debug)]
#[command(name = "dicomseg")]
#[command(about = "Encode prostate zone masks as DICOM Segmentation objects")]
#[command(version)]
pub struct Cli {
    /// Directory containing the reference DICOM series
    #[arg(value_name = "REFERENCE_DIR")]
    pub reference_dir: PathBuf,

    /// Directory containing <class>_binary.npy masks
    #[arg(value_name = "MASK_DIR")]
    pub mask_dir: PathBuf,

    /// Output root; objects go to <OUT>/<PatientID>/<StudyInstanceUID>/segmentations
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Classes that also get a single-class object (default: all)
    #[arg(short, long = "class", value_name = "CLASS")]
    pub classes: Vec<SegmentClass>,

    /// Only write the combined object
    #[arg(long, conflicts_with = "classes")]
    pub no_single: bool,

    /// Seed for reproducible UIDs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Encoder configuration selected by the flags
    pub fn config(&self) -> EncoderConfig {
        let mut config = if self.no_single {
            EncoderConfig::combined_only()
        } else if self.classes.is_empty() {
            EncoderConfig::default()
        } else {
            EncoderConfig::default().with_single_classes(self.classes.clone())
        };

        if let Some(seed) = self.seed {
            config = config.with_uid_seed(seed);
        }
        config
    }
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}
