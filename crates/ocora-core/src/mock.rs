//! Hardcoded demo payloads served when the inference backend is unreachable.
//!
//! All data in this module is fictional or derived from the public
//! BraTS19_2013_10 case. No external systems are contacted. These fixtures
//! stand in for the live radiomics and policy services during demos and
//! offline development.

use crate::decode::{ExtractionResponse, PolicyResponse, RawFeature};
use crate::types::{
    AnalysisAudit, Gender, PatientRecord, RadiomicFeature, Resectability, SimulationTrajectory,
    TreatmentPlan, TumorGrade, TumorPhenotype, TwinSimulationStep,
};
use serde_json::json;

fn raw_feature(name: &str, value: f64, display: &str) -> RawFeature {
    RawFeature {
        name: name.to_string(),
        value: Some(json!(value)),
        value_normalized: None,
        value_display: Some(display.to_string()),
    }
}

/// Canned `/radiomics` result for the BraTS19_2013_10 demo case.
pub fn extraction_fixture() -> ExtractionResponse {
    ExtractionResponse {
        radiomics: Some(vec![
            raw_feature("Sphericity", 0.51, "0.508 (Irregular)"),
            raw_feature("Surface Area", 0.85, "22,046 mm²"),
            raw_feature("Mean Intensity", 0.60, "597.56"),
            raw_feature("Entropy", 0.40, "2.98 bits"),
            raw_feature("Contrast", 0.35, "1.76 (GLCM)"),
            raw_feature("Homogeneity", 0.99, "0.993 (High)"),
            raw_feature("Max Diameter", 0.75, "99.88 mm"),
        ]),
        vector: vec![0.508, 22046.0, 2.98, 1.76, 0.993, 597.55, 99.88],
        image: Some(
            "https://upload.wikimedia.org/wikipedia/commons/a/a2/Glioblastoma_macro.jpg"
                .to_string(),
        ),
        phenotype: Some(TumorPhenotype {
            volume_cm3: 111.72,
            midline_shift_mm: 10.04,
            enhancing_percentage: 28.5,
            non_enhancing_percentage: 71.5,
            edema_volume_cm3: 42.3,
            necrosis_volume_cm3: 15.8,
            resectability_score: 88.5,
        }),
        audit: Some(AnalysisAudit {
            analysis_timestamp: chrono::Utc::now().to_rfc3339(),
            model_version: "Ocora-MAML-v2.4.1 (FDA-Pending)".to_string(),
            segmentation_confidence: 0.964,
            prediction_confidence: 0.928,
            execution_id: "EXEC-8842-BRAIN-29".to_string(),
        }),
    }
}

/// Canned `/policy` result: four GBM protocol candidates.
pub fn policy_fixture() -> PolicyResponse {
    PolicyResponse {
        treatments: vec![
            TreatmentPlan {
                name: "Radiotherapy".to_string(),
                probability: 0.303,
                description: "• Focal irradiation (60 Gy in 30 fractions)\n\
                              • Targets tumor bed + 2cm margin\n\
                              • Recommended due to high local control probability"
                    .to_string(),
                side_effects: vec![
                    "Scalp Erythema".to_string(),
                    "Cognitive Fatigue".to_string(),
                    "Local Edema".to_string(),
                ],
                expected_survival_months: 59.16,
            },
            TreatmentPlan {
                name: "Chemoradiation (TMZ + RT)".to_string(),
                probability: 0.145,
                description: "• Concurrent Temozolomide (75 mg/m² daily)\n\
                              • Adjuvant TMZ (150-200 mg/m²)\n\
                              • Standard Stupp protocol approach"
                    .to_string(),
                side_effects: vec![
                    "Thrombocytopenia".to_string(),
                    "Nausea".to_string(),
                    "Fatigue".to_string(),
                ],
                expected_survival_months: 58.69,
            },
            TreatmentPlan {
                name: "TMZ Chemotherapy".to_string(),
                probability: 0.344,
                description: "• Monotherapy Temozolomide\n\
                              • Indicated if RT tolerance is low\n\
                              • MGMT promoter methylation status dependent"
                    .to_string(),
                side_effects: vec!["Myelosuppression".to_string(), "Liver Toxicity".to_string()],
                expected_survival_months: 58.38,
            },
            TreatmentPlan {
                name: "No Treatment".to_string(),
                probability: 0.208,
                description: "• Best Supportive Care\n\
                              • Symptom management only\n\
                              • Corticosteroids for edema control"
                    .to_string(),
                side_effects: vec![
                    "Rapid Progression".to_string(),
                    "Neurological Decline".to_string(),
                ],
                expected_survival_months: 58.43,
            },
        ],
        probability: None,
    }
}

/// Built-in candidate list shown before any policy response has arrived.
/// Survival gains are expressed in months over best supportive care.
pub fn fallback_treatments() -> Vec<TreatmentPlan> {
    vec![
        TreatmentPlan {
            name: "Stupp Protocol + TTFields".to_string(),
            probability: 0.88,
            description: "Standard radiochemotherapy with TMZ followed by adjuvant TMZ and \
                          Tumor Treating Fields."
                .to_string(),
            side_effects: vec![
                "Fatigue".to_string(),
                "Skin Irritation".to_string(),
                "Nausea".to_string(),
                "Thrombocytopenia".to_string(),
            ],
            expected_survival_months: 14.0,
        },
        TreatmentPlan {
            name: "Hypofractionated RT + Bevacizumab".to_string(),
            probability: 0.65,
            description: "Targeted radiation therapy combined with anti-angiogenic therapy."
                .to_string(),
            side_effects: vec![
                "Hypertension".to_string(),
                "Wound Healing Complications".to_string(),
                "Fatigue".to_string(),
            ],
            expected_survival_months: 8.0,
        },
        TreatmentPlan {
            name: "Lomustine (CCNU) Monotherapy".to_string(),
            probability: 0.42,
            description: "Alkylating nitrosourea used for recurrent GBM.".to_string(),
            side_effects: vec![
                "Myelosuppression".to_string(),
                "Pulmonary Fibrosis".to_string(),
                "Nausea".to_string(),
            ],
            expected_survival_months: 4.0,
        },
    ]
}

/// Placeholder patient shown before the first upload completes. Any field the
/// backend omits on upload falls back to this record's value.
pub fn default_patient() -> PatientRecord {
    PatientRecord {
        id: "PT-2024-883".to_string(),
        name: "Subject 883 (Waiting for Data)".to_string(),
        age: 54,
        gender: Gender::Male,
        diagnosis: "Glioblastoma Multiforme (WHO Grade IV)".to_string(),
        grade: TumorGrade::Hgg,
        resectability: Resectability::Resectable,
        scan_date: "2024-05-15".to_string(),
        radiomics: vec![
            RadiomicFeature::new("Sphericity", 0.65, "0.65 (Irregular)"),
            RadiomicFeature::new("Contrast", 0.8, "High Heterogeneity"),
            RadiomicFeature::new("Entropy", 0.9, "7.42 bits"),
            RadiomicFeature::new("Correlation", 0.4, "0.38 (Low)"),
            RadiomicFeature::new("Coarseness", 0.3, "Fine Texture"),
            RadiomicFeature::new("Homogeneity", 0.2, "0.18 (Low)"),
        ],
        feature_vector: None,
        phenotype: None,
        audit: None,
        scan_image: None,
    }
}

/// Precomputed demo trajectory for the Stupp protocol, used as the twin
/// screen's baseline before any fetch has happened.
pub fn baseline_trajectory() -> SimulationTrajectory {
    let points = [
        (0, 45.2, 0.0),
        (1, 42.1, 2.0),
        (2, 38.5, 5.0),
        (3, 32.2, 8.0),
        (4, 24.8, 10.0),
        (5, 18.5, 11.0),
        (6, 15.2, 12.0),
        (9, 12.1, 11.0),
        (12, 10.5, 10.0),
    ];
    points
        .iter()
        .map(|&(month, volume, impact)| TwinSimulationStep {
            month,
            tumor_volume_cm3: volume,
            healthy_tissue_impact_percent: impact,
        })
        .collect()
}

/// Protocol the baseline trajectory was computed for
pub const BASELINE_PROTOCOL: &str = "Stupp Protocol + TTFields";
