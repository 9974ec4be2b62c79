use crate::api::EncodedCase;
use crate::reference::ReferenceSeries;
use crate::writer::SegmentationObject;
use std::fmt;
use std::path::PathBuf;

/// Summary of one written object
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ObjectSummary {
    pub mode: String,
    pub path: Option<PathBuf>,
    pub sop_instance_uid: String,
    pub series_instance_uid: String,
    pub series_number: u32,
    pub segments: Vec<String>,
    pub frames: usize,
}

impl ObjectSummary {
    pub fn new(object: &SegmentationObject, path: Option<PathBuf>) -> Self {
        Self {
            mode: object.mode.to_string(),
            path,
            sop_instance_uid: object.identifiers.sop_instance_uid.clone(),
            series_instance_uid: object.identifiers.series_instance_uid.clone(),
            series_number: object.mode.series_number(),
            segments: object
                .classes()
                .iter()
                .map(|class| class.tag().to_string())
                .collect(),
            frames: object.frame_count(),
        }
    }
}

/// Summary of an encoded case
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct CaseReport {
    pub patient_id: String,
    pub study_instance_uid: String,
    pub reference_series_uid: String,
    pub slices: usize,
    pub objects: Vec<ObjectSummary>,
}

impl CaseReport {
    /// Pairs every object with the path it was written to, if any
    pub fn new(series: &ReferenceSeries, case: &EncodedCase, paths: &[PathBuf]) -> Self {
        let objects = case
            .objects()
            .enumerate()
            .map(|(index, object)| ObjectSummary::new(object, paths.get(index).cloned()))
            .collect();

        Self {
            patient_id: series.context().patient_id.clone(),
            study_instance_uid: series.context().study_instance_uid.clone(),
            reference_series_uid: series.series_instance_uid().to_string(),
            slices: series.len(),
            objects,
        }
    }

    /// Serializes the report as pretty-printed JSON
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Text report formatter for an encoded case
pub struct TextReport<'a> {
    report: &'a CaseReport,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(report: &'a CaseReport) -> Self {
        Self { report }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Segmentation Export")?;
        writeln!(f, "===================")?;
        writeln!(f)?;
        writeln!(f, "Patient:          {}", self.report.patient_id)?;
        writeln!(f, "Study:            {}", self.report.study_instance_uid)?;
        writeln!(f, "Reference Series: {}", self.report.reference_series_uid)?;
        writeln!(f, "Slices:           {}", self.report.slices)?;

        for object in &self.report.objects {
            writeln!(f)?;
            writeln!(f, "{} (series {})", object.mode, object.series_number)?;
            writeln!(f, "------------------")?;
            writeln!(f, "Segments:     {}", object.segments.join(", "))?;
            writeln!(f, "Frames:       {}", object.frames)?;
            writeln!(f, "SOP Instance: {}", object.sop_instance_uid)?;
            match &object.path {
                Some(path) => writeln!(f, "Written to:   {}", path.display())?,
                None => writeln!(f, "Written to:   (not written)")?,
            }
        }

        Ok(())
    }
}
