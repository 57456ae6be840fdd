//! Circuit traces: the per-step state snapshots supplied by the engine.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::basis::state_count;
use crate::error::{ViewError, ViewResult};
use crate::gate::{GateKind, INIT_GATE_ID};

/// Default tolerance on `|sum(probabilities) - 1|`.
pub const DEFAULT_PROBABILITY_TOLERANCE: f64 = 1e-6;

/// One instant in the measurement process.
///
/// Field names on the wire follow the engine (`gate`, `qubits`,
/// `statevector`). Every field defaults when absent so that missing data
/// surfaces as a shape mismatch during validation instead of a decode
/// failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitStep {
    /// Gate identifier; empty for a no-op step.
    #[serde(rename = "gate", default)]
    pub gate_id: String,
    /// Gate parameters (rotation angles).
    #[serde(default)]
    pub params: Vec<f64>,
    /// Qubits acted on. For controlled gates the last entry is the target.
    #[serde(default)]
    pub qubits: Vec<u32>,
    /// Human-readable description from the engine.
    #[serde(default)]
    pub description: String,
    /// State amplitudes indexed by native basis index.
    #[serde(rename = "statevector", default)]
    pub amplitudes: Vec<Complex64>,
    /// Measurement probabilities, index-aligned with `amplitudes`.
    #[serde(default)]
    pub probabilities: Vec<f64>,
}

impl CircuitStep {
    /// The all-zero basis state before any gate is applied.
    pub fn initial(num_qubits: u32) -> Self {
        let states = state_count(num_qubits);
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); states];
        let mut probabilities = vec![0.0; states];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        probabilities[0] = 1.0;

        Self {
            gate_id: INIT_GATE_ID.to_string(),
            params: Vec::new(),
            qubits: Vec::new(),
            description: format!("Initial state |{}⟩", "0".repeat(num_qubits as usize)),
            amplitudes,
            probabilities,
        }
    }

    /// Resolve the gate identifier.
    pub fn kind(&self) -> GateKind {
        GateKind::from_id(&self.gate_id)
    }

    /// Sum of the probability column.
    pub fn probability_sum(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    fn validate(&self, index: usize, num_qubits: u32, tolerance: f64) -> ViewResult<()> {
        let expected = state_count(num_qubits);

        if self.amplitudes.len() != expected {
            return Err(ViewError::step_shape(
                index,
                format!(
                    "expected {expected} amplitudes, got {}",
                    self.amplitudes.len()
                ),
            ));
        }
        if self.probabilities.len() != expected {
            return Err(ViewError::step_shape(
                index,
                format!(
                    "expected {expected} probabilities, got {}",
                    self.probabilities.len()
                ),
            ));
        }
        if let Some(bad) = self.probabilities.iter().find(|p| !p.is_finite()) {
            return Err(ViewError::step_shape(
                index,
                format!("non-finite probability {bad}"),
            ));
        }

        let sum = self.probability_sum();
        if (sum - 1.0).abs() >= tolerance {
            return Err(ViewError::step_shape(
                index,
                format!("probabilities sum to {sum}, expected 1"),
            ));
        }

        Ok(())
    }
}

/// An ordered sequence of steps for one (outcome count, method) request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitTrace {
    /// Number of qubits in the circuit.
    pub num_qubits: u32,
    /// Steps in execution order.
    #[serde(default)]
    pub steps: Vec<CircuitStep>,
}

impl CircuitTrace {
    /// Create a trace from engine data.
    pub fn new(num_qubits: u32, steps: Vec<CircuitStep>) -> Self {
        Self { num_qubits, steps }
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the trace has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether the first step is already the synthesized initial state.
    pub fn has_initial_step(&self) -> bool {
        self.steps
            .first()
            .is_some_and(|s| s.kind() == GateKind::Init)
    }

    /// Prepend the all-zero initial step unless one is already present.
    pub fn prepend_initial_step(&mut self) {
        if !self.has_initial_step() && self.num_qubits >= 1 {
            self.steps.insert(0, CircuitStep::initial(self.num_qubits));
        }
    }

    /// Check the shape invariants of every step.
    ///
    /// The whole trace is rejected on the first violation.
    pub fn validate(&self, max_qubits: u32, tolerance: f64) -> ViewResult<()> {
        if self.num_qubits == 0 {
            return Err(ViewError::shape("trace must have at least one qubit"));
        }
        if self.num_qubits > max_qubits {
            return Err(ViewError::shape(format!(
                "{} qubits exceeds the display limit of {max_qubits}",
                self.num_qubits
            )));
        }
        if self.steps.is_empty() {
            return Err(ViewError::shape("trace has no steps"));
        }

        for (index, step) in self.steps.iter().enumerate() {
            step.validate(index, self.num_qubits, tolerance)?;
        }

        Ok(())
    }
}
