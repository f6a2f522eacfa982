//! Remote gateway to the inference backend.
//!
//! Three POST operations against a runtime-configurable base URL. Every call
//! is deadline-bounded; on failure the configured fallback mode decides
//! between serving the demo fixture after an artificial delay (lenient) and
//! propagating the error (strict). A degraded flag tracks whether the most
//! recent call had to fall back, which the UI surfaces as an offline badge.

use crate::config::{FallbackMode, GatewayConfig};
use crate::events::{EventBus, SessionEvent};
use ocora_core::decode::{ExtractionPayload, ExtractionResponse, PolicyResponse, SimulationPayload};
use ocora_core::{generate_trajectory, mock, OcoraError, Result, SimulationTrajectory};
use parking_lot::RwLock;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub const EXTRACTION_ENDPOINT: &str = "radiomics";
pub const POLICY_ENDPOINT: &str = "policy";
pub const SIMULATION_ENDPOINT: &str = "simulate";

// Skips the interstitial warning page some tunnel providers inject
const TUNNEL_BYPASS_HEADER: &str = "ngrok-skip-browser-warning";
const TUNNEL_BYPASS_VALUE: &str = "69420";

/// A scan file handed over by the upload screen.
#[derive(Debug, Clone)]
pub struct ScanUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ScanUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Patient display name derived from the file name: extension dropped,
    /// underscores turned into spaces.
    pub fn display_name(&self) -> String {
        let stem = self
            .file_name
            .rsplit_once('.')
            .map_or(self.file_name.as_str(), |(stem, _)| stem);
        stem.replace('_', " ")
    }
}

#[derive(Debug, Serialize)]
struct PolicyRequest<'a> {
    state: &'a [f64],
}

#[derive(Debug, Serialize)]
struct SimulateRequest<'a> {
    treatment: &'a str,
    state: &'a [f64],
}

pub struct RemoteGateway {
    client: reqwest::Client,
    config: RwLock<GatewayConfig>,
    degraded: AtomicBool,
    events: EventBus,
}

impl RemoteGateway {
    pub fn new(config: GatewayConfig, events: EventBus) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| OcoraError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: RwLock::new(config),
            degraded: AtomicBool::new(false),
            events,
        })
    }

    /// Point the gateway at a new backend. Calls already in flight keep the
    /// URL they captured at call start.
    pub fn set_base_url(&self, url: &str) {
        let mut config = self.config.write();
        config.set_base_url(url);
        log::info!("gateway base URL set to {:?}", config.base_url());
    }

    pub fn set_mode(&self, mode: FallbackMode) {
        self.config.write().mode = mode;
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> GatewayConfig {
        self.config.read().clone()
    }

    /// Whether the most recent backend call degraded to a fixture
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    /// `POST /radiomics` with the scan as a multipart file field.
    pub async fn extract_features(&self, upload: &ScanUpload) -> Result<ExtractionResponse> {
        let config = self.config();
        let form = multipart::Form::new().part(
            "file",
            multipart::Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone()),
        );
        let request = self
            .client
            .post(config.endpoint_url(EXTRACTION_ENDPOINT))
            .header(TUNNEL_BYPASS_HEADER, TUNNEL_BYPASS_VALUE)
            .multipart(form);

        match self
            .dispatch::<ExtractionPayload>(&config, EXTRACTION_ENDPOINT, request)
            .await
        {
            Ok(payload) => {
                self.mark_recovered(EXTRACTION_ENDPOINT);
                Ok(payload.into_response())
            }
            Err(err) => {
                self.fall_back(
                    &config,
                    EXTRACTION_ENDPOINT,
                    config.extraction_fallback_delay_ms,
                    err,
                    mock::extraction_fixture,
                )
                .await
            }
        }
    }

    /// `POST /policy` with the patient's feature vector.
    pub async fn fetch_policy(&self, vector: &[f64]) -> Result<PolicyResponse> {
        let config = self.config();
        let request = self
            .client
            .post(config.endpoint_url(POLICY_ENDPOINT))
            .header(TUNNEL_BYPASS_HEADER, TUNNEL_BYPASS_VALUE)
            .json(&PolicyRequest { state: vector });

        match self
            .dispatch::<PolicyResponse>(&config, POLICY_ENDPOINT, request)
            .await
        {
            Ok(response) => {
                self.mark_recovered(POLICY_ENDPOINT);
                Ok(response)
            }
            Err(err) => {
                self.fall_back(
                    &config,
                    POLICY_ENDPOINT,
                    config.policy_fallback_delay_ms,
                    err,
                    mock::policy_fixture,
                )
                .await
            }
        }
    }

    /// `POST /simulate` for one protocol. Falls back to the deterministic
    /// local generator.
    pub async fn fetch_trajectory(
        &self,
        treatment_label: &str,
        vector: &[f64],
    ) -> Result<SimulationTrajectory> {
        let config = self.config();
        let request = self
            .client
            .post(config.endpoint_url(SIMULATION_ENDPOINT))
            .header(TUNNEL_BYPASS_HEADER, TUNNEL_BYPASS_VALUE)
            .json(&SimulateRequest {
                treatment: treatment_label,
                state: vector,
            });

        match self
            .dispatch::<SimulationPayload>(&config, SIMULATION_ENDPOINT, request)
            .await
        {
            Ok(payload) => {
                self.mark_recovered(SIMULATION_ENDPOINT);
                Ok(payload.into_trajectory())
            }
            Err(err) => {
                self.fall_back(
                    &config,
                    SIMULATION_ENDPOINT,
                    config.simulation_fallback_delay_ms,
                    err,
                    || generate_trajectory(treatment_label),
                )
                .await
            }
        }
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        config: &GatewayConfig,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let send = async {
            let response = request
                .send()
                .await
                .map_err(|e| OcoraError::gateway(endpoint, &e))?
                .error_for_status()
                .map_err(|e| OcoraError::gateway(endpoint, &e))?;
            response
                .json::<T>()
                .await
                .map_err(|e| OcoraError::decode(format!("{endpoint}: {e}")))
        };
        match tokio::time::timeout(config.request_timeout(), send).await {
            Ok(result) => result,
            Err(_) => Err(OcoraError::timeout(endpoint, config.request_timeout_ms)),
        }
    }

    async fn fall_back<T>(
        &self,
        config: &GatewayConfig,
        endpoint: &str,
        delay_ms: u64,
        err: OcoraError,
        fixture: impl FnOnce() -> T,
    ) -> Result<T> {
        match config.mode {
            FallbackMode::Strict => {
                log::error!("{endpoint} request failed in strict mode: {err}");
                Err(err)
            }
            FallbackMode::Lenient => {
                log::warn!("{endpoint} request failed ({err}), serving demo fixture");
                self.degraded.store(true, Ordering::SeqCst);
                self.events.publish(SessionEvent::GatewayDegraded {
                    endpoint: endpoint.to_string(),
                    reason: err.to_string(),
                });
                if delay_ms > 0 {
                    // keep the processing overlay believable in demos
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Ok(fixture())
            }
        }
    }

    fn mark_recovered(&self, endpoint: &str) {
        if self.degraded.swap(false, Ordering::SeqCst) {
            self.events.publish(SessionEvent::GatewayRecovered {
                endpoint: endpoint.to_string(),
            });
        }
    }
}
