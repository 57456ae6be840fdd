//! REST client for the engine service.
//!
//! Every route takes a JSON body and answers with JSON:
//!
//! | Route | Body | Reply |
//! |-------|------|-------|
//! | `POST /circuit_visual` | `{n, method}` | `{num_qubits, steps}` |
//! | `POST /build_circuit` | `{n, method}` | `{n, method, num_qubits, theoretical, svg}` |
//! | `POST /roll` | `{n, method}` | `{raw_value}` |
//! | `POST /roll_multiple` | `{n, method, shots}` | `{counts_raw}` |

use std::time::Duration;

use reqwest::Client;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use qdice_view::{
    BatchRollRequest, BatchRollResponse, CircuitStep, EngineConfig, RollParams, RollResponse,
};

use crate::error::{HttpEngineError, HttpEngineResult};

/// Reply of `POST /circuit_visual`.
#[derive(Debug, Clone, Deserialize)]
pub struct VisualResponse {
    pub num_qubits: u32,
    #[serde(default)]
    pub steps: Vec<CircuitStep>,
}

/// Reply of `POST /build_circuit`.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildResponse {
    pub num_qubits: u32,
    #[serde(default)]
    pub theoretical: FxHashMap<String, f64>,
    /// Server-rendered circuit drawing; unused here.
    #[serde(default)]
    pub svg: Option<String>,
}

/// Engine service REST client.
pub struct EngineClient {
    /// HTTP client with timeouts configured.
    client: Client,
    /// Service base URL (without trailing slash).
    base_url: String,
}

impl std::fmt::Debug for EngineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl EngineClient {
    /// Create a client from connection settings.
    pub fn new(config: &EngineConfig) -> HttpEngineResult<Self> {
        let base_url = config.base_url.trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(HttpEngineError::InvalidUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Perform a POST request with a JSON body, returning the deserialized JSON body.
    async fn post<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> HttpEngineResult<T> {
        let url = self.url(path);
        debug!("POST {}", url);

        let resp = self.client.post(&url).json(body).send().await?;
        self.handle_response(resp).await
    }

    /// Handle HTTP response: deserialize JSON or return an error.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> HttpEngineResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            Ok(serde_json::from_str(&text)?)
        } else {
            Err(HttpEngineError::ApiError {
                status: status.as_u16(),
                message: text,
            })
        }
    }

    /// Step-by-step trace of the circuit for `params`.
    #[instrument(skip(self))]
    pub async fn circuit_visual(&self, params: &RollParams) -> HttpEngineResult<VisualResponse> {
        self.post("circuit_visual", params).await
    }

    /// Theoretical outcome distribution for `params`.
    #[instrument(skip(self))]
    pub async fn build_circuit(&self, params: &RollParams) -> HttpEngineResult<BuildResponse> {
        self.post("build_circuit", params).await
    }

    /// One sample.
    #[instrument(skip(self))]
    pub async fn roll(&self, params: &RollParams) -> HttpEngineResult<RollResponse> {
        self.post("roll", params).await
    }

    /// `request.shots` samples, aggregated.
    #[instrument(skip(self))]
    pub async fn roll_multiple(
        &self,
        request: &BatchRollRequest,
    ) -> HttpEngineResult<BatchRollResponse> {
        self.post("roll_multiple", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> EngineConfig {
        EngineConfig {
            base_url: url.to_string(),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = EngineClient::new(&config("http://localhost:8000/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/roll"), "http://localhost:8000/roll");
    }

    #[test]
    fn test_non_http_url_is_rejected() {
        let err = EngineClient::new(&config("localhost:8000")).unwrap_err();
        assert!(matches!(err, HttpEngineError::InvalidUrl(_)));
    }

    #[test]
    fn test_visual_response_parsing() {
        let json = r#"{
            "num_qubits": 1,
            "steps": [{
                "gate": "h",
                "params": [],
                "qubits": [0],
                "description": "H on qubits [0] with params []",
                "statevector": [[0.7071067811865476, 0.0], [0.7071067811865476, 0.0]],
                "probabilities": [0.5, 0.5]
            }]
        }"#;
        let resp: VisualResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.num_qubits, 1);
        assert_eq!(resp.steps[0].gate_id, "h");
        assert_eq!(resp.steps[0].amplitudes.len(), 2);
    }

    #[test]
    fn test_build_response_ignores_extra_fields() {
        let json = r#"{"n": 6, "method": "rejection", "num_qubits": 3,
                       "svg": "<svg/>", "theoretical": {"0": 0.125}}"#;
        let resp: BuildResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.num_qubits, 3);
        assert_eq!(resp.theoretical["0"], 0.125);
    }
}
