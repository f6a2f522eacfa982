//! # Ocora Core
//!
//! Domain model and pure computation for the Ocora oncology decision-support
//! dashboard: patient records and radiomic features, total decoding of the
//! inference backend's wire payloads, the hardcoded demo fixtures, and the
//! deterministic digital-twin trajectory generator.
//!
//! No I/O happens in this crate; the network and state orchestration live in
//! `ocora-engine`.

pub mod decode;
pub mod errors;
pub mod mock;
pub mod sim;
pub mod types;

pub use decode::{
    ExtractionPayload, ExtractionResponse, MissingValuePolicy, PolicyResponse, RawFeature,
    SimulationPayload,
};
pub use errors::{OcoraError, Result};
pub use sim::{generate_trajectory, TreatmentCategory};
pub use types::{
    AnalysisAudit, Gender, PatientRecord, RadiomicFeature, Resectability, SimulationTrajectory,
    TreatmentPlan, TumorGrade, TumorPhenotype, TwinSimulationStep,
};
