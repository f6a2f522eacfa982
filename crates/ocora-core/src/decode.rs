//! Total decoding of loosely-shaped backend payloads.
//!
//! The inference backend is under active development and its responses vary:
//! feature lists arrive bare or wrapped under `features`/`radiomics`, value
//! fields may be numbers or preformatted strings, and whole sections can be
//! missing. Everything here maps those shapes onto the domain types with an
//! explicit fallback order instead of failing the upload.

use crate::types::{
    AnalysisAudit, RadiomicFeature, SimulationTrajectory, TreatmentPlan, TumorPhenotype,
};
use serde::Deserialize;
use serde_json::Value;

/// Substituted normalized value when a feature arrives without a usable one
pub const DEFAULT_NORMALIZED_PLACEHOLDER: f64 = 0.5;

/// Strategy for filling in a missing or unparseable normalized value.
///
/// The constant default keeps decoding deterministic; `PseudoRandom`
/// reproduces the scatter of the original prototype for demo sessions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissingValuePolicy {
    Constant(f64),
    PseudoRandom,
}

impl Default for MissingValuePolicy {
    fn default() -> Self {
        Self::Constant(DEFAULT_NORMALIZED_PLACEHOLDER)
    }
}

impl MissingValuePolicy {
    pub fn placeholder(&self) -> f64 {
        match self {
            Self::Constant(value) => value.clamp(0.0, 1.0),
            Self::PseudoRandom => rand::random::<f64>(),
        }
    }
}

/// One feature entry as the backend sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFeature {
    pub name: String,
    /// Raw measurement; number, preformatted string, or absent
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default, rename = "valueNormalized")]
    pub value_normalized: Option<f64>,
    #[serde(default, rename = "valueDisplay")]
    pub value_display: Option<String>,
}

impl RawFeature {
    /// Map onto the domain type.
    ///
    /// Normalized value: explicit `valueNormalized`, else the numeric raw
    /// value clamped into [0, 1], else the policy placeholder. Display value:
    /// explicit display string, else raw string value, else numeric raw value
    /// to 2 decimals, else the stringified raw, else the normalized value.
    pub fn normalize(self, policy: MissingValuePolicy) -> RadiomicFeature {
        let numeric = self.value.as_ref().and_then(Value::as_f64);
        let normalized = match self.value_normalized.or(numeric) {
            Some(value) => value.clamp(0.0, 1.0),
            None => {
                log::debug!(
                    "feature {:?} arrived without a numeric value, substituting placeholder",
                    self.name
                );
                policy.placeholder()
            }
        };
        let display = match (self.value_display, self.value) {
            (Some(display), _) => display,
            (None, Some(Value::String(raw))) => raw,
            (None, Some(raw)) => match raw.as_f64() {
                Some(number) => format!("{number:.2}"),
                None => raw.to_string(),
            },
            (None, None) => format!("{normalized:.2}"),
        };
        RadiomicFeature::new(self.name, normalized, display)
    }
}

/// Decode a raw feature list with one shared policy.
pub fn normalize_features(raw: Vec<RawFeature>, policy: MissingValuePolicy) -> Vec<RadiomicFeature> {
    raw.into_iter().map(|f| f.normalize(policy)).collect()
}

/// `/radiomics` response body. `features` is accepted as an alias for the
/// canonical `radiomics` key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionResponse {
    #[serde(default, alias = "features")]
    pub radiomics: Option<Vec<RawFeature>>,
    #[serde(default)]
    pub vector: Vec<f64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub phenotype: Option<TumorPhenotype>,
    #[serde(default)]
    pub audit: Option<AnalysisAudit>,
}

/// `/radiomics` wire shape: either the structured response or a bare feature
/// list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExtractionPayload {
    Structured(ExtractionResponse),
    Bare(Vec<RawFeature>),
}

impl ExtractionPayload {
    pub fn into_response(self) -> ExtractionResponse {
        match self {
            Self::Structured(response) => response,
            Self::Bare(features) => ExtractionResponse {
                radiomics: Some(features),
                ..ExtractionResponse::default()
            },
        }
    }
}

/// `/policy` response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyResponse {
    #[serde(default)]
    pub treatments: Vec<TreatmentPlan>,
    /// Overall agent confidence, when the live backend reports one
    #[serde(default)]
    pub probability: Option<f64>,
}

/// `/simulate` wire shape: wrapped trajectory or a bare step list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SimulationPayload {
    Wrapped { trajectory: SimulationTrajectory },
    Bare(SimulationTrajectory),
}

impl SimulationPayload {
    pub fn into_trajectory(self) -> SimulationTrajectory {
        match self {
            Self::Wrapped { trajectory } => trajectory,
            Self::Bare(trajectory) => trajectory,
        }
    }
}
