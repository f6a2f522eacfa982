//! # Ocora Engine
//!
//! Orchestration layer of the Ocora oncology decision-support dashboard:
//! the remote gateway with mock fallback, the patient view-model store, the
//! screen controller, digital-twin playback, and the adapter seams for
//! reasoning and report generation.
//!
//! The flow mirrors the dashboard: a scan upload goes through
//! [`gateway::RemoteGateway`] into [`store::PatientStore`], the
//! [`screen::ScreenController`] resolves what to render against the store,
//! and [`twin::TwinSession`] plays back whichever trajectory is loaded.

pub mod adapters;
pub mod config;
pub mod events;
pub mod gateway;
pub mod report;
pub mod screen;
pub mod store;
pub mod twin;

pub use adapters::{ChatTranscript, OfflineReasoning, ReasoningService, ReportRenderer};
pub use config::{FallbackMode, GatewayConfig};
pub use events::{EventBus, SessionEvent, SessionLog};
pub use gateway::{RemoteGateway, ScanUpload};
pub use ocora_core::{OcoraError, Result};
pub use report::ClinicalReport;
pub use screen::{Screen, ScreenController, View};
pub use store::{PatientStore, StoreSnapshot};
pub use twin::{AnimationDriver, TwinSession, ANIMATION_TICK};
