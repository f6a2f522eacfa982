//! Clinical summary document model.
//!
//! The report itself is laid out by an external renderer (PDF in the
//! product); this module fixes the fields every renderer must receive and
//! the file naming convention.

use crate::adapters::ReportRenderer;
use ocora_core::{
    AnalysisAudit, Gender, PatientRecord, RadiomicFeature, Resectability, Result, TreatmentPlan,
    TumorGrade, TumorPhenotype,
};
use serde::Serialize;

pub const REPORT_TITLE: &str = "Ocora Clinical Summary";
pub const SUITE_LABEL: &str = "Neuro-Oncology AI Suite v2.4.1";
const DISCLAIMER: &str =
    "Generated by a research prototype pending regulatory review. Not for clinical use.";

/// Number of radiomic features included in the report
pub const TOP_FEATURE_COUNT: usize = 6;

/// Everything a renderer needs to lay out the summary document.
#[derive(Debug, Clone, Serialize)]
pub struct ClinicalReport {
    pub title: String,
    pub suite_label: String,
    pub generated_at: String,
    pub patient_id: String,
    pub patient_name: String,
    pub age: u32,
    pub gender: Gender,
    pub diagnosis: String,
    pub grade: TumorGrade,
    pub resectability: Resectability,
    pub scan_date: String,
    pub phenotype: Option<TumorPhenotype>,
    pub top_features: Vec<RadiomicFeature>,
    pub selected_plan: TreatmentPlan,
    pub audit: Option<AnalysisAudit>,
    pub disclaimer: String,
}

impl ClinicalReport {
    pub fn build(record: &PatientRecord, plan: &TreatmentPlan) -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
            suite_label: SUITE_LABEL.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            patient_id: record.id.clone(),
            patient_name: record.name.clone(),
            age: record.age,
            gender: record.gender,
            diagnosis: record.diagnosis.clone(),
            grade: record.grade,
            resectability: record.resectability,
            scan_date: record.scan_date.clone(),
            phenotype: record.phenotype.clone(),
            top_features: record
                .radiomics
                .iter()
                .take(TOP_FEATURE_COUNT)
                .cloned()
                .collect(),
            selected_plan: plan.clone(),
            audit: record.audit.clone(),
            disclaimer: DISCLAIMER.to_string(),
        }
    }

    /// Download name, keyed by patient identifier.
    pub fn file_name(&self) -> String {
        format!("{}_Clinical_Summary.pdf", self.patient_id)
    }
}

/// Renderer producing a machine-readable report; the PDF layout lives in
/// the frontend bundle.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportRenderer;

impl ReportRenderer for JsonReportRenderer {
    fn render(&self, report: &ClinicalReport) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocora_core::mock;

    #[test]
    fn test_build_caps_feature_count() {
        let mut record = mock::default_patient();
        record
            .radiomics
            .extend(mock::default_patient().radiomics);
        let plan = mock::fallback_treatments().remove(0);
        let report = ClinicalReport::build(&record, &plan);
        assert_eq!(report.top_features.len(), TOP_FEATURE_COUNT);
        assert_eq!(report.selected_plan.name, plan.name);
    }

    #[test]
    fn test_file_name_keyed_by_patient_id() {
        let record = mock::default_patient();
        let plan = mock::fallback_treatments().remove(0);
        let report = ClinicalReport::build(&record, &plan);
        assert_eq!(report.file_name(), "PT-2024-883_Clinical_Summary.pdf");
    }

    #[test]
    fn test_json_renderer_emits_expected_fields() {
        let record = mock::default_patient();
        let plan = mock::fallback_treatments().remove(1);
        let report = ClinicalReport::build(&record, &plan);
        let bytes = JsonReportRenderer.render(&report).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["title"], REPORT_TITLE);
        assert_eq!(value["patient_id"], "PT-2024-883");
        assert_eq!(
            value["selected_plan"]["name"],
            "Hypofractionated RT + Bevacizumab"
        );
        assert!(value["disclaimer"].as_str().unwrap().contains("Not for clinical use"));
    }
}
