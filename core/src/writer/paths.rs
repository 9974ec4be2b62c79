use crate::reference::StudyContext;
use crate::types::EncodingMode;
use std::path::{Path, PathBuf};

/// Directory holding every object of a study
///
/// `<out_root>/<PatientID>/<StudyInstanceUID>/segmentations`
pub fn segmentation_dir(out_root: &Path, context: &StudyContext) -> PathBuf {
    out_root
        .join(path_component(&context.patient_id))
        .join(path_component(&context.study_instance_uid))
        .join("segmentations")
}

/// Destination of one object
pub fn output_path(out_root: &Path, context: &StudyContext, mode: EncodingMode) -> PathBuf {
    segmentation_dir(out_root, context).join(mode.file_name())
}

/// Makes an identifier safe to use as a single path component
fn path_component(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}
