//! Boundary to the external numerical engine.
//!
//! The engine builds circuits, evolves amplitudes and samples outcomes.
//! This crate only consumes its replies; implementations of [`Engine`]
//! live in adapter crates.
//!
//! | Call | Request | Reply |
//! |------|---------|-------|
//! | [`Engine::build_trace`] | [`RollParams`] | [`TraceResponse`] |
//! | [`Engine::roll_once`] | [`RollParams`] | [`RollResponse`] |
//! | [`Engine::roll_batch`] | [`BatchRollRequest`] | [`BatchRollResponse`] |
//!
//! Outcome keys arrive as decimal text and are parsed here.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::distribution::{Counts, Probabilities};
use crate::error::{ViewError, ViewResult};
use crate::trace::{CircuitStep, CircuitTrace};

/// Smallest outcome count the engine accepts.
pub const MIN_OUTCOMES: u32 = 2;
/// Largest outcome count the engine accepts.
pub const MAX_OUTCOMES: u32 = 20;

/// Clamp a requested outcome count into the engine's supported range.
pub fn clamp_outcome_count(n: u32) -> u32 {
    n.clamp(MIN_OUTCOMES, MAX_OUTCOMES)
}

/// Qubits needed to cover `n` outcomes: `max(1, ceil(log2 n))`.
pub fn num_qubits_for(n: u32) -> u32 {
    if n <= 2 {
        1
    } else {
        u32::BITS - (n - 1).leading_zeros()
    }
}

/// Strategy the engine uses to produce a uniform outcome over `n` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Sample `2^k` states and discard outcomes `>= n`.
    #[default]
    Rejection,
    /// Prepare an exact uniform superposition over `n` states.
    Exact,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Rejection => write!(f, "rejection"),
            Method::Exact => write!(f, "exact"),
        }
    }
}

impl FromStr for Method {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rejection" => Ok(Method::Rejection),
            "exact" => Ok(Method::Exact),
            other => Err(ViewError::Configuration(format!(
                "unknown method '{other}' (expected rejection or exact)"
            ))),
        }
    }
}

/// Parameters identifying one circuit: outcome count and method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RollParams {
    /// Number of outcomes (dice sides).
    pub n: u32,
    pub method: Method,
}

impl RollParams {
    /// Parameters with `n` clamped into the supported range.
    pub fn new(n: u32, method: Method) -> Self {
        Self {
            n: clamp_outcome_count(n),
            method,
        }
    }

    pub fn num_qubits(&self) -> u32 {
        num_qubits_for(self.n)
    }
}

impl Default for RollParams {
    fn default() -> Self {
        Self::new(6, Method::default())
    }
}

/// Request for a step trace.
pub type TraceRequest = RollParams;

/// Request for a single sample.
pub type RollRequest = RollParams;

/// Request for several samples in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRollRequest {
    #[serde(flatten)]
    pub params: RollParams,
    pub shots: u32,
}

/// Step trace plus theoretical distribution for one [`RollParams`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceResponse {
    pub num_qubits: u32,
    #[serde(default)]
    pub steps: Vec<CircuitStep>,
    /// Outcome (decimal text) → probability.
    #[serde(default)]
    pub theoretical: FxHashMap<String, f64>,
}

impl TraceResponse {
    /// Split into the trace and a parsed theoretical table.
    pub fn into_parts(self) -> ViewResult<(CircuitTrace, Probabilities)> {
        let theoretical = parse_probabilities(&self.theoretical)?;
        Ok((CircuitTrace::new(self.num_qubits, self.steps), theoretical))
    }
}

/// A single sampled outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResponse {
    /// Measured basis value, possibly `>= n` under rejection sampling.
    pub raw_value: u32,
    /// Present in some engine replies; not consumed by the view layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_value: Option<u32>,
}

/// Counts from a batch of samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRollResponse {
    /// Outcome (decimal text) → count.
    pub counts_raw: FxHashMap<String, u64>,
}

impl BatchRollResponse {
    pub fn counts(&self) -> ViewResult<Counts> {
        parse_counts(&self.counts_raw)
    }
}

/// Parse a decimal outcome key.
pub fn parse_outcome(key: &str) -> ViewResult<u32> {
    key.trim()
        .parse::<u32>()
        .map_err(|_| ViewError::InvalidOutcome(key.to_string()))
}

/// Parse a text-keyed count table.
pub fn parse_counts(raw: &FxHashMap<String, u64>) -> ViewResult<Counts> {
    let mut counts = Counts::default();
    for (key, &count) in raw {
        *counts.entry(parse_outcome(key)?).or_insert(0) += count;
    }
    Ok(counts)
}

/// Parse a text-keyed probability table, rejecting values outside `[0, 1]`.
pub fn parse_probabilities(raw: &FxHashMap<String, f64>) -> ViewResult<Probabilities> {
    raw.iter()
        .map(|(key, &p)| {
            if !(0.0..=1.0).contains(&p) {
                return Err(ViewError::shape(format!(
                    "theoretical probability {p} for outcome '{key}' is outside [0, 1]"
                )));
            }
            Ok((parse_outcome(key)?, p))
        })
        .collect()
}

/// The external numerical engine.
///
/// Failures surface as [`ViewError::Transport`]. Implementations perform
/// no retries.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Build the step trace and theoretical distribution.
    async fn build_trace(&self, params: &RollParams) -> ViewResult<TraceResponse>;

    /// Sample one outcome.
    async fn roll_once(&self, params: &RollParams) -> ViewResult<RollResponse>;

    /// Sample `shots` outcomes.
    async fn roll_batch(&self, request: &BatchRollRequest) -> ViewResult<BatchRollResponse>;
}
