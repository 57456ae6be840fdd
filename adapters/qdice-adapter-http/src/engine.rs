//! [`Engine`] implementation over the REST client.

use async_trait::async_trait;
use tracing::{debug, instrument};

use qdice_view::{
    BatchRollRequest, BatchRollResponse, Engine, EngineConfig, RollParams, RollResponse,
    TraceResponse, ViewError, ViewResult,
};

use crate::api::{BuildResponse, EngineClient, VisualResponse};
use crate::error::HttpEngineResult;

/// Engine reached over HTTP.
///
/// A trace is assembled from two calls: the step trace from
/// `/circuit_visual` and the theoretical table from `/build_circuit`. The
/// two are issued concurrently. No call is retried.
#[derive(Debug)]
pub struct HttpEngine {
    client: EngineClient,
}

impl HttpEngine {
    /// Create an engine for the service described by `config`.
    pub fn new(config: &EngineConfig) -> HttpEngineResult<Self> {
        Ok(Self {
            client: EngineClient::new(config)?,
        })
    }

    pub fn client(&self) -> &EngineClient {
        &self.client
    }
}

/// Merge the two halves of a trace.
///
/// Both replies must agree on the qubit count.
pub fn combine(visual: VisualResponse, build: BuildResponse) -> ViewResult<TraceResponse> {
    if visual.num_qubits != build.num_qubits {
        return Err(ViewError::shape(format!(
            "step trace has {} qubits but theoretical table was built for {}",
            visual.num_qubits, build.num_qubits
        )));
    }

    Ok(TraceResponse {
        num_qubits: visual.num_qubits,
        steps: visual.steps,
        theoretical: build.theoretical,
    })
}

#[async_trait]
impl Engine for HttpEngine {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self))]
    async fn build_trace(&self, params: &RollParams) -> ViewResult<TraceResponse> {
        let (visual, build) = futures::join!(
            self.client.circuit_visual(params),
            self.client.build_circuit(params),
        );
        let trace = combine(visual?, build?)?;
        debug!(
            "Trace for n={} has {} steps on {} qubits",
            params.n,
            trace.steps.len(),
            trace.num_qubits
        );
        Ok(trace)
    }

    #[instrument(skip(self))]
    async fn roll_once(&self, params: &RollParams) -> ViewResult<RollResponse> {
        Ok(self.client.roll(params).await?)
    }

    #[instrument(skip(self))]
    async fn roll_batch(&self, request: &BatchRollRequest) -> ViewResult<BatchRollResponse> {
        Ok(self.client.roll_multiple(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn visual(num_qubits: u32) -> VisualResponse {
        VisualResponse {
            num_qubits,
            steps: vec![],
        }
    }

    fn build(num_qubits: u32) -> BuildResponse {
        let states = 1u32 << num_qubits;
        BuildResponse {
            num_qubits,
            theoretical: (0..states)
                .map(|i| (i.to_string(), 1.0 / f64::from(states)))
                .collect::<FxHashMap<_, _>>(),
            svg: None,
        }
    }

    #[test]
    fn test_combine_merges_halves() {
        let trace = combine(visual(2), build(2)).unwrap();
        assert_eq!(trace.num_qubits, 2);
        assert_eq!(trace.theoretical.len(), 4);
    }

    #[test]
    fn test_combine_rejects_disagreeing_qubit_counts() {
        let err = combine(visual(2), build(3)).unwrap_err();
        assert!(err.is_rejection());
    }

    #[test]
    fn test_engine_name() {
        let engine = HttpEngine::new(&EngineConfig::default()).unwrap();
        assert_eq!(engine.name(), "http");
        assert_eq!(engine.client().base_url(), "http://127.0.0.1:8000");
    }
}
