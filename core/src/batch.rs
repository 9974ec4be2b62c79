//! Multi-case driver
//!
//! Cases share nothing but the read-only segment catalog, so they are
//! spread over the rayon pool. A failing case is logged and reported in its
//! outcome; it never stops the others.

use crate::api::SegmentationEncoder;
use crate::error::{Result, SegError};
use crate::mask::NpyDirectory;
use crate::reference::ReferenceSeriesLoader;
use log::{error, info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// One case to encode: a reference series and its mask directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseInput {
    /// Identifier used in logs and error messages
    pub key: String,
    pub reference_dir: PathBuf,
    pub mask_dir: PathBuf,
}

impl CaseInput {
    pub fn new(
        key: impl Into<String>,
        reference_dir: impl Into<PathBuf>,
        mask_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            key: key.into(),
            reference_dir: reference_dir.into(),
            mask_dir: mask_dir.into(),
        }
    }
}

/// What happened to a case
#[derive(Debug)]
pub enum CaseStatus {
    /// Objects written, combined object first
    Written(Vec<PathBuf>),

    /// Nothing to encode
    Skipped(SegError),

    Failed(SegError),
}

#[derive(Debug)]
pub struct CaseOutcome {
    pub key: String,
    pub status: CaseStatus,
}

impl CaseOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self.status, CaseStatus::Written(_))
    }

    pub fn paths(&self) -> &[PathBuf] {
        match &self.status {
            CaseStatus::Written(paths) => paths,
            _ => &[],
        }
    }
}

/// Loads, encodes and writes a single case
///
/// # Errors
///
/// Any failure, wrapped with the case key
pub fn process_case(
    encoder: &SegmentationEncoder,
    case: &CaseInput,
    out_root: &Path,
) -> Result<Vec<PathBuf>> {
    let run = || -> Result<Vec<PathBuf>> {
        let series = ReferenceSeriesLoader::load_from_directory(&case.reference_dir)?;
        let source = NpyDirectory::new(&case.mask_dir);
        let encoded = encoder.encode_case(&series, &source)?;
        encoder.write_case(&encoded, out_root)
    };

    run().map_err(|e| e.in_case(case.key.as_str()))
}

/// Encodes many cases in parallel
///
/// With a UID seed configured, case `i` uses `seed + i` so that cases
/// encoded within the same second still get distinct UIDs. Outcomes are
/// returned in input order.
pub fn encode_batch(
    encoder: &SegmentationEncoder,
    cases: &[CaseInput],
    out_root: &Path,
) -> Vec<CaseOutcome> {
    info!("Encoding {} cases", cases.len());

    let outcomes: Vec<CaseOutcome> = cases
        .par_iter()
        .enumerate()
        .map(|(index, case)| {
            let encoder = match encoder.config().uid_seed {
                Some(seed) => SegmentationEncoder::new(
                    encoder
                        .config()
                        .clone()
                        .with_uid_seed(seed.wrapping_add(index as u64)),
                ),
                None => encoder.clone(),
            };

            let status = match process_case(&encoder, case, out_root) {
                Ok(paths) => CaseStatus::Written(paths),
                Err(e) if e.is_empty_segmentation() => {
                    warn!("{}", e);
                    CaseStatus::Skipped(e)
                }
                Err(e) => {
                    error!("{}", e);
                    CaseStatus::Failed(e)
                }
            };

            CaseOutcome {
                key: case.key.clone(),
                status,
            }
        })
        .collect();

    let written = outcomes.iter().filter(|outcome| outcome.is_written()).count();
    info!("Encoded {} of {} cases", written, cases.len());
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EncoderConfig;
    use tempfile::TempDir;

    #[test]
    fn test_missing_reference_fails_with_case_key() {
        let temp_dir = TempDir::new().unwrap();
        let encoder = SegmentationEncoder::new(EncoderConfig::default().with_uid_seed(3));
        let cases = vec![
            CaseInput::new("case-a", temp_dir.path().join("missing-a"), temp_dir.path()),
            CaseInput::new("case-b", temp_dir.path().join("missing-b"), temp_dir.path()),
        ];

        let outcomes = encode_batch(&encoder, &cases, temp_dir.path());

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].key, "case-a");
        assert_eq!(outcomes[1].key, "case-b");
        for outcome in &outcomes {
            assert!(!outcome.is_written());
            assert!(outcome.paths().is_empty());
            match &outcome.status {
                CaseStatus::Failed(err) => {
                    assert!(err.to_string().starts_with(&format!("Case {}", outcome.key)))
                }
                other => panic!("unexpected status {:?}", other),
            }
        }
    }
}
