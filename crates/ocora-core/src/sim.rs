//! Deterministic tumor growth simulation.
//!
//! Pure stand-in for the `/simulate` service: a 12-month volume trajectory
//! derived from the treatment label alone, with per-category growth and
//! response constants tuned to clinical expectations for GBM.

use crate::types::{SimulationTrajectory, TwinSimulationStep};

/// Tumor volume at month 0, before any treatment effect
pub const BASELINE_VOLUME_CM3: f64 = 45.0;
/// Number of monthly steps produced
pub const HORIZON_MONTHS: u32 = 12;
/// Volume clamp bounds, chosen to keep chart scales readable
pub const VOLUME_FLOOR_CM3: f64 = 5.0;
pub const VOLUME_CEILING_CM3: f64 = 100.0;

/// Treatment bucket resolved by case-insensitive substring match on the
/// protocol label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreatmentCategory {
    NoTreatment,
    Radiotherapy,
    Chemoradiation,
    Temozolomide,
    Unspecified,
}

impl TreatmentCategory {
    pub fn classify(label: &str) -> Self {
        let label = label.to_lowercase();
        // "chemoradiation" labels usually also contain "tmz", so the
        // combined bucket must win over the monotherapy one
        if label.contains("no treatment") {
            Self::NoTreatment
        } else if label.contains("radiotherapy") {
            Self::Radiotherapy
        } else if label.contains("chemoradiation") {
            Self::Chemoradiation
        } else if label.contains("tmz") {
            Self::Temozolomide
        } else {
            Self::Unspecified
        }
    }

    /// Monthly multiplicative volume change
    fn growth_rate(self) -> f64 {
        match self {
            Self::NoTreatment => 1.15,
            Self::Radiotherapy => 0.95,
            Self::Chemoradiation => 0.92,
            Self::Temozolomide => 0.98,
            Self::Unspecified => 1.0,
        }
    }

    /// Response term subtracted as `response_factor / month` from month 1 on
    fn response_factor(self) -> f64 {
        match self {
            Self::NoTreatment => 0.0,
            Self::Radiotherapy => 0.8,
            Self::Chemoradiation => 1.2,
            Self::Temozolomide => 0.5,
            Self::Unspecified => 0.1,
        }
    }

    /// Healthy-tissue toxicity accrued per month, in percent
    fn tissue_impact_per_month(self) -> f64 {
        match self {
            Self::Chemoradiation => 3.0,
            Self::Radiotherapy => 2.0,
            _ => 0.5,
        }
    }
}

/// Generate the 12-month trajectory for a protocol label.
///
/// Untreated tumors compound from month 0; treated tumors hold the baseline
/// at month 0 and respond from month 1. Volumes clamp to
/// [`VOLUME_FLOOR_CM3`, `VOLUME_CEILING_CM3`] and round to 2 decimals.
pub fn generate_trajectory(treatment_label: &str) -> SimulationTrajectory {
    let category = TreatmentCategory::classify(treatment_label);
    let growth = category.growth_rate();
    let response = category.response_factor();
    let impact = category.tissue_impact_per_month();

    let mut volume = BASELINE_VOLUME_CM3;
    let mut trajectory = Vec::with_capacity(HORIZON_MONTHS as usize);
    for month in 0..HORIZON_MONTHS {
        match category {
            TreatmentCategory::NoTreatment => volume *= growth,
            _ if month > 0 => volume = volume * growth - response / f64::from(month),
            _ => {}
        }
        volume = volume.clamp(VOLUME_FLOOR_CM3, VOLUME_CEILING_CM3);
        trajectory.push(TwinSimulationStep {
            month,
            tumor_volume_cm3: round2(volume),
            healthy_tissue_impact_percent: round2(f64::from(month) * impact),
        });
    }
    trajectory
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
