//! Patient view-model store.
//!
//! Single source of truth for the active patient record, the treatment
//! candidate list, and the current selection. The record is replaced
//! wholesale on every completed upload; fields the backend omits fall back
//! to the previous record's values rather than to empty, which keeps the UI
//! coherent against a partially implemented backend.
//!
//! An atomic upload generation guards against out-of-order responses: a
//! slow policy fetch belonging to a superseded upload is discarded instead
//! of overwriting the newer upload's candidates.

use crate::events::{EventBus, SessionEvent};
use crate::gateway::{RemoteGateway, ScanUpload};
use ocora_core::decode::{normalize_features, ExtractionResponse, PolicyResponse};
use ocora_core::{mock, MissingValuePolicy, OcoraError, PatientRecord, Result, TreatmentPlan};
use parking_lot::RwLock;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the store for rendering
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub record: PatientRecord,
    pub has_data: bool,
    pub candidates: Vec<TreatmentPlan>,
    pub selected: Option<TreatmentPlan>,
    pub last_error: Option<String>,
}

struct StoreInner {
    record: PatientRecord,
    has_data: bool,
    candidates: Vec<TreatmentPlan>,
    /// Name of the selected plan; always present in `candidates`
    selected: Option<String>,
    last_error: Option<String>,
}

pub struct PatientStore {
    inner: RwLock<StoreInner>,
    generation: AtomicU64,
    missing_value_policy: MissingValuePolicy,
    events: EventBus,
}

impl PatientStore {
    /// Create a store seeded with the placeholder patient and the built-in
    /// candidate list.
    pub fn new(events: EventBus) -> Self {
        let candidates = mock::fallback_treatments();
        let selected = candidates.first().map(|plan| plan.name.clone());
        Self {
            inner: RwLock::new(StoreInner {
                record: mock::default_patient(),
                has_data: false,
                candidates,
                selected,
                last_error: None,
            }),
            generation: AtomicU64::new(0),
            missing_value_policy: MissingValuePolicy::default(),
            events,
        }
    }

    pub fn with_missing_value_policy(mut self, policy: MissingValuePolicy) -> Self {
        self.missing_value_policy = policy;
        self
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let inner = self.inner.read();
        StoreSnapshot {
            record: inner.record.clone(),
            has_data: inner.has_data,
            candidates: inner.candidates.clone(),
            selected: Self::selected_of(&inner),
            last_error: inner.last_error.clone(),
        }
    }

    pub fn has_data(&self) -> bool {
        self.inner.read().has_data
    }

    pub fn feature_vector(&self) -> Option<Vec<f64>> {
        self.inner.read().record.feature_vector.clone()
    }

    pub fn selected_treatment(&self) -> Option<TreatmentPlan> {
        Self::selected_of(&self.inner.read())
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.read().last_error.clone()
    }

    /// Run a full upload: extraction, record replacement, then a policy
    /// refresh when the backend returned a feature vector.
    ///
    /// Extraction failure (strict mode) leaves the store untouched and
    /// propagates. A failed policy refresh keeps the previous candidates and
    /// is surfaced only through `last_error` and the event bus, matching the
    /// silent-degradation contract of the dashboard.
    pub async fn complete_upload(
        &self,
        upload: &ScanUpload,
        gateway: &RemoteGateway,
    ) -> Result<PatientRecord> {
        self.events.publish(SessionEvent::UploadStarted {
            file_name: upload.file_name.clone(),
        });
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let response = match gateway.extract_features(upload).await {
            Ok(response) => response,
            Err(err) => {
                let message = err.to_string();
                self.inner.write().last_error = Some(message.clone());
                self.events.publish(SessionEvent::UploadFailed { message });
                return Err(err);
            }
        };

        let record = self.build_record(upload, response);
        {
            let mut inner = self.inner.write();
            if self.generation.load(Ordering::SeqCst) != generation {
                log::debug!("extraction result from superseded upload discarded");
                return Ok(record);
            }
            inner.record = record.clone();
            inner.has_data = true;
            inner.last_error = None;
        }
        self.events.publish(SessionEvent::UploadCompleted {
            patient_id: record.id.clone(),
            feature_count: record.radiomics.len(),
        });

        if let Some(vector) = record.feature_vector.as_ref().filter(|v| !v.is_empty()) {
            if let Err(err) = self.refresh_policy_for(generation, vector, gateway).await {
                log::warn!("policy refresh after upload failed: {err}");
                let message = err.to_string();
                self.inner.write().last_error = Some(message.clone());
                self.events
                    .publish(SessionEvent::PolicyRefreshFailed { message });
            }
        }
        Ok(record)
    }

    /// Re-fetch the treatment candidates for the current record. Idempotent;
    /// a no-op when no feature vector is loaded.
    pub async fn refresh_policy(&self, gateway: &RemoteGateway) -> Result<()> {
        let Some(vector) = self.feature_vector().filter(|v| !v.is_empty()) else {
            log::debug!("no feature vector loaded, skipping policy refresh");
            return Ok(());
        };
        let generation = self.generation.load(Ordering::SeqCst);
        self.refresh_policy_for(generation, &vector, gateway).await
    }

    async fn refresh_policy_for(
        &self,
        generation: u64,
        vector: &[f64],
        gateway: &RemoteGateway,
    ) -> Result<()> {
        let response = gateway.fetch_policy(vector).await?;
        self.apply_policy(generation, response);
        Ok(())
    }

    /// Apply a policy response belonging to the given upload generation.
    /// Returns false when the response was stale or empty and the candidate
    /// set was left untouched.
    pub(crate) fn apply_policy(&self, generation: u64, response: PolicyResponse) -> bool {
        if self.generation.load(Ordering::SeqCst) != generation {
            log::debug!("discarding policy response from superseded upload (generation {generation})");
            self.events
                .publish(SessionEvent::PolicyResponseDiscarded { generation });
            return false;
        }
        if response.treatments.is_empty() {
            log::warn!("policy response carried no treatments, keeping previous candidates");
            return false;
        }
        let selected_name;
        {
            let mut inner = self.inner.write();
            inner.candidates = response.treatments;
            selected_name = inner.candidates[0].name.clone();
            inner.selected = Some(selected_name.clone());
        }
        self.events.publish(SessionEvent::PolicyReplaced {
            candidate_count: self.inner.read().candidates.len(),
            selected: selected_name,
        });
        true
    }

    /// Select a plan by name from the current candidate set.
    pub fn select_treatment(&self, name: &str) -> Result<TreatmentPlan> {
        let plan = {
            let mut inner = self.inner.write();
            let plan = inner
                .candidates
                .iter()
                .find(|plan| plan.name == name)
                .cloned()
                .ok_or_else(|| {
                    OcoraError::validation(format!(
                        "treatment {name:?} is not among the current candidates"
                    ))
                })?;
            inner.selected = Some(plan.name.clone());
            plan
        };
        self.events.publish(SessionEvent::TreatmentSelected {
            name: plan.name.clone(),
        });
        Ok(plan)
    }

    /// Replace the candidate set wholesale and select the first entry.
    pub fn replace_treatment_candidates(&self, candidates: Vec<TreatmentPlan>) {
        let selected_name;
        let count;
        {
            let mut inner = self.inner.write();
            inner.selected = candidates.first().map(|plan| plan.name.clone());
            inner.candidates = candidates;
            selected_name = inner.selected.clone();
            count = inner.candidates.len();
        }
        if let Some(selected) = selected_name {
            self.events.publish(SessionEvent::PolicyReplaced {
                candidate_count: count,
                selected,
            });
        }
    }

    #[cfg(test)]
    pub(crate) fn begin_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn selected_of(inner: &StoreInner) -> Option<TreatmentPlan> {
        let name = inner.selected.as_deref()?;
        inner
            .candidates
            .iter()
            .find(|plan| plan.name == name)
            .cloned()
    }

    /// Build the next record, falling back to the current record's value for
    /// every field the backend omitted.
    fn build_record(&self, upload: &ScanUpload, response: ExtractionResponse) -> PatientRecord {
        let defaults = self.inner.read().record.clone();
        let radiomics = match response.radiomics {
            Some(raw) if !raw.is_empty() => normalize_features(raw, self.missing_value_policy),
            _ => {
                log::warn!("no radiomics in extraction response, keeping previous features");
                defaults.radiomics
            }
        };
        PatientRecord {
            id: new_patient_id(),
            name: upload.display_name(),
            age: defaults.age,
            gender: defaults.gender,
            diagnosis: defaults.diagnosis,
            grade: defaults.grade,
            resectability: defaults.resectability,
            scan_date: chrono::Utc::now().format("%Y-%m-%d").to_string(),
            radiomics,
            feature_vector: if response.vector.is_empty() {
                defaults.feature_vector
            } else {
                Some(response.vector)
            },
            phenotype: response.phenotype.or(defaults.phenotype),
            audit: response.audit.or(defaults.audit),
            scan_image: response.image.or(defaults.scan_image),
        }
    }
}

fn new_patient_id() -> String {
    format!("PT-{:04}", rand::thread_rng().gen_range(0..10_000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocora_core::decode::RawFeature;

    fn store() -> PatientStore {
        PatientStore::new(EventBus::default())
    }

    fn policy_with(names: &[&str]) -> PolicyResponse {
        PolicyResponse {
            treatments: names
                .iter()
                .map(|name| TreatmentPlan {
                    name: name.to_string(),
                    probability: 0.5,
                    description: String::new(),
                    side_effects: vec![],
                    expected_survival_months: 12.0,
                })
                .collect(),
            probability: None,
        }
    }

    #[test]
    fn test_starts_with_placeholder_patient() {
        let store = store();
        let snapshot = store.snapshot();
        assert!(!snapshot.has_data);
        assert_eq!(snapshot.record.id, "PT-2024-883");
        assert_eq!(snapshot.candidates.len(), 3);
        assert_eq!(
            snapshot.selected.unwrap().name,
            "Stupp Protocol + TTFields"
        );
    }

    #[test]
    fn test_stale_policy_response_is_discarded() {
        let store = store();
        let first = store.begin_generation();
        let second = store.begin_generation();

        // the older upload's response arrives last but must not win
        assert!(store.apply_policy(second, policy_with(&["Second Upload Plan"])));
        assert!(!store.apply_policy(first, policy_with(&["First Upload Plan"])));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.candidates[0].name, "Second Upload Plan");
        assert_eq!(snapshot.selected.unwrap().name, "Second Upload Plan");
    }

    #[test]
    fn test_empty_policy_keeps_previous_candidates() {
        let store = store();
        let generation = store.begin_generation();
        assert!(!store.apply_policy(generation, PolicyResponse::default()));
        assert_eq!(store.snapshot().candidates.len(), 3);
    }

    #[test]
    fn test_select_treatment_rejects_unknown_plan() {
        let store = store();
        let err = store.select_treatment("Imaginary Protocol").unwrap_err();
        assert!(matches!(err, OcoraError::Validation(_)));
        // selection unchanged
        assert_eq!(
            store.selected_treatment().unwrap().name,
            "Stupp Protocol + TTFields"
        );
    }

    #[test]
    fn test_select_treatment_updates_selection() {
        let store = store();
        let plan = store
            .select_treatment("Lomustine (CCNU) Monotherapy")
            .unwrap();
        assert_eq!(plan.probability, 0.42);
        assert_eq!(
            store.selected_treatment().unwrap().name,
            "Lomustine (CCNU) Monotherapy"
        );
    }

    #[test]
    fn test_replace_candidates_selects_first() {
        let store = store();
        store.replace_treatment_candidates(policy_with(&["A", "B"]).treatments);
        assert_eq!(store.selected_treatment().unwrap().name, "A");
    }

    #[test]
    fn test_build_record_falls_back_to_defaults() {
        let store = store();
        let upload = ScanUpload::new("subject_71_t1.nii", vec![0u8; 4]);
        let record = store.build_record(&upload, ExtractionResponse::default());

        assert_eq!(record.name, "subject 71 t1");
        assert!(record.id.starts_with("PT-"));
        // everything the backend omitted comes from the placeholder record
        assert_eq!(record.age, 54);
        assert_eq!(record.radiomics.len(), 6);
        assert!(record.feature_vector.is_none());
        assert!(record.phenotype.is_none());
    }

    #[test]
    fn test_build_record_takes_backend_fields_when_present() {
        let store = store();
        let upload = ScanUpload::new("scan.nii", vec![]);
        let response = ExtractionResponse {
            radiomics: Some(vec![RawFeature {
                name: "Entropy".to_string(),
                value: Some(serde_json::json!(0.4)),
                value_normalized: None,
                value_display: Some("2.98 bits".to_string()),
            }]),
            vector: vec![0.4],
            ..ExtractionResponse::default()
        };
        let record = store.build_record(&upload, response);
        assert_eq!(record.radiomics.len(), 1);
        assert_eq!(record.feature_vector, Some(vec![0.4]));
    }
}
