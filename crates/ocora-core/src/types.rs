//! Domain types for the patient view-model.
//!
//! Field renames follow the backend wire contract (camelCase keys) so the
//! same structs serve both the gateway payloads and the in-memory model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// WHO-derived tumor grade bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TumorGrade {
    #[serde(rename = "HGG")]
    Hgg,
    #[serde(rename = "LGG")]
    Lgg,
}

impl fmt::Display for TumorGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TumorGrade::Hgg => write!(f, "HGG"),
            TumorGrade::Lgg => write!(f, "LGG"),
        }
    }
}

/// Surgical resectability assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resectability {
    Resectable,
    #[serde(rename = "Non-Resectable")]
    NonResectable,
}

impl fmt::Display for Resectability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resectability::Resectable => write!(f, "Resectable"),
            Resectability::NonResectable => write!(f, "Non-Resectable"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "M"),
            Gender::Female => write!(f, "F"),
        }
    }
}

/// A single quantitative imaging descriptor, normalized for chart display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiomicFeature {
    pub name: String,
    /// Chart-space value, always within [0, 1]
    pub normalized_value: f64,
    /// Human-readable rendition of the underlying measurement
    pub display_value: String,
}

impl RadiomicFeature {
    /// Build a feature, clamping the normalized value into [0, 1].
    pub fn new(
        name: impl Into<String>,
        normalized_value: f64,
        display_value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            normalized_value: normalized_value.clamp(0.0, 1.0),
            display_value: display_value.into(),
        }
    }
}

/// Volumetric segmentation summary returned by the extraction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TumorPhenotype {
    pub volume_cm3: f64,
    pub midline_shift_mm: f64,
    /// Intended to sum to ~100 with `non_enhancing_percentage`; not enforced
    pub enhancing_percentage: f64,
    pub non_enhancing_percentage: f64,
    pub edema_volume_cm3: f64,
    pub necrosis_volume_cm3: f64,
    /// Score in [0, 100]
    pub resectability_score: f64,
}

/// Provenance stamp written once when a record is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisAudit {
    pub analysis_timestamp: String,
    pub model_version: String,
    pub segmentation_confidence: f64,
    pub prediction_confidence: f64,
    pub execution_id: String,
}

/// The active patient record. Replaced wholesale on every completed upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub diagnosis: String,
    pub grade: TumorGrade,
    pub resectability: Resectability,
    /// ISO date (YYYY-MM-DD) of the analyzed scan
    pub scan_date: String,
    pub radiomics: Vec<RadiomicFeature>,
    /// Numeric encoding consumed by the policy and simulation services
    pub feature_vector: Option<Vec<f64>>,
    pub phenotype: Option<TumorPhenotype>,
    pub audit: Option<AnalysisAudit>,
    /// Display reference for the analyzed slice, when the backend provides one
    pub scan_image: Option<String>,
}

/// One candidate treatment from the policy service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentPlan {
    /// Unique key within a candidate list
    pub name: String,
    /// Recommendation score in [0, 1]; not a calibrated probability
    pub probability: f64,
    pub description: String,
    #[serde(rename = "sideEffects", default)]
    pub side_effects: Vec<String>,
    #[serde(rename = "expectedSurvival", default)]
    pub expected_survival_months: f64,
}

/// One step of a simulated tumor trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwinSimulationStep {
    /// Month index; non-negative and strictly increasing, not necessarily
    /// contiguous
    pub month: u32,
    #[serde(rename = "tumorVolume")]
    pub tumor_volume_cm3: f64,
    #[serde(rename = "healthyTissueImpact")]
    pub healthy_tissue_impact_percent: f64,
}

/// Ordered simulation steps for one protocol over the modeled horizon
pub type SimulationTrajectory = Vec<TwinSimulationStep>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_clamps_normalized_value() {
        let high = RadiomicFeature::new("Entropy", 1.7, "7.42 bits");
        assert_eq!(high.normalized_value, 1.0);
        let low = RadiomicFeature::new("Contrast", -0.2, "0.0");
        assert_eq!(low.normalized_value, 0.0);
        let mid = RadiomicFeature::new("Sphericity", 0.51, "0.508");
        assert_eq!(mid.normalized_value, 0.51);
    }

    #[test]
    fn test_treatment_plan_wire_names() {
        let json = r#"{
            "name": "Radiotherapy",
            "probability": 0.303,
            "description": "Focal irradiation",
            "sideEffects": ["Scalp Erythema"],
            "expectedSurvival": 59.16
        }"#;
        let plan: TreatmentPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.side_effects, vec!["Scalp Erythema"]);
        assert_eq!(plan.expected_survival_months, 59.16);
    }

    #[test]
    fn test_simulation_step_wire_names() {
        let json = r#"{"month": 3, "tumorVolume": 32.2, "healthyTissueImpact": 8.0}"#;
        let step: TwinSimulationStep = serde_json::from_str(json).unwrap();
        assert_eq!(step.month, 3);
        assert_eq!(step.tumor_volume_cm3, 32.2);
    }

    #[test]
    fn test_phenotype_camel_case() {
        let json = r#"{
            "volumeCm3": 111.72,
            "midlineShiftMm": 10.04,
            "enhancingPercentage": 28.5,
            "nonEnhancingPercentage": 71.5,
            "edemaVolumeCm3": 42.3,
            "necrosisVolumeCm3": 15.8,
            "resectabilityScore": 88.5
        }"#;
        let phenotype: TumorPhenotype = serde_json::from_str(json).unwrap();
        assert_eq!(phenotype.volume_cm3, 111.72);
        assert!((phenotype.enhancing_percentage + phenotype.non_enhancing_percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_grade_round_trip() {
        let json = serde_json::to_string(&TumorGrade::Hgg).unwrap();
        assert_eq!(json, "\"HGG\"");
        let grade: TumorGrade = serde_json::from_str("\"LGG\"").unwrap();
        assert_eq!(grade, TumorGrade::Lgg);
    }
}
