//! Capability seams for the reasoning/chat service and the report renderer.
//!
//! The dashboard treats text generation as an opaque remote capability: it
//! hands over the current patient snapshot and gets prose back. The traits
//! here are that boundary; [`OfflineReasoning`] is the canned implementation
//! used in demos and tests.

use crate::report::ClinicalReport;
use ocora_core::{PatientRecord, Result, TreatmentPlan};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

/// Ordered conversation history handed to the reasoning service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatTranscript {
    turns: Vec<ChatTurn>,
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript seeded with the twin's opening line.
    pub fn for_twin_session() -> Self {
        let mut transcript = Self::new();
        transcript.push_model(
            "I am the Digital Twin of the tumor. I have simulated the response to the \
             treatment. Ask me about my resistance mechanisms or growth patterns.",
        );
        transcript
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(ChatTurn {
            role: ChatRole::User,
            text: text.into(),
        });
    }

    pub fn push_model(&mut self, text: impl Into<String>) {
        self.turns.push(ChatTurn {
            role: ChatRole::Model,
            text: text.into(),
        });
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn last_reply(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.role == ChatRole::Model)
            .map(|turn| turn.text.as_str())
    }
}

/// Text-generation capability: clinical reasoning for a selected plan and
/// the twin chat. No behavioral contract beyond eventually returning text
/// or failing.
#[allow(async_fn_in_trait)]
pub trait ReasoningService {
    async fn generate_reasoning(
        &self,
        record: &PatientRecord,
        plan: &TreatmentPlan,
    ) -> Result<String>;

    async fn chat(&self, transcript: &ChatTranscript, message: &str) -> Result<String>;
}

/// Canned reasoning used when no LLM backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineReasoning;

impl ReasoningService for OfflineReasoning {
    async fn generate_reasoning(
        &self,
        record: &PatientRecord,
        plan: &TreatmentPlan,
    ) -> Result<String> {
        Ok(format!(
            "{} was ranked highest for {} ({}, {}) with a recommendation score of {:.0}%. \
             Expected survival under this protocol is {:.1} months. Key side effects: {}.",
            plan.name,
            record.name,
            record.diagnosis,
            record.grade,
            plan.probability * 100.0,
            plan.expected_survival_months,
            if plan.side_effects.is_empty() {
                "none reported".to_string()
            } else {
                plan.side_effects.join(", ")
            }
        ))
    }

    async fn chat(&self, _transcript: &ChatTranscript, message: &str) -> Result<String> {
        Ok(format!(
            "Simulation context unavailable offline. You asked: {message:?}. \
             Connect a reasoning backend in settings for live twin responses."
        ))
    }
}

/// Document-generation capability. The layout engine is external; the core
/// only defines the fields it must receive.
pub trait ReportRenderer {
    fn render(&self, report: &ClinicalReport) -> Result<Vec<u8>>;
}
