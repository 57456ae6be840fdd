//! Step timeline and its bounded cursor.
//!
//! ```text
//!         retreat()              advance()
//!   ┌──────────────────┐  ┌──────────────────┐
//!   ▼                  │  │                  ▼
//!  [0] ──── ... ──── [cursor] ──── ... ──── [N-1]
//!   ▲                                        ▲
//!   └── load() in Interactive mode           └── load() in ViewOnly mode
//! ```
//!
//! Moves past either end are silent no-ops.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ViewError, ViewResult};
use crate::trace::{CircuitStep, CircuitTrace, DEFAULT_PROBABILITY_TOLERANCE};

/// How a timeline is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    /// Step-by-step: cursor starts at the first step, current step highlighted.
    #[default]
    Interactive,
    /// Static view: cursor parked on the last step, no highlighting.
    ViewOnly,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Interactive => write!(f, "interactive"),
            ViewMode::ViewOnly => write!(f, "view-only"),
        }
    }
}

impl FromStr for ViewMode {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "interactive" | "step-by-step" => Ok(ViewMode::Interactive),
            "view-only" | "view_only" | "viewonly" => Ok(ViewMode::ViewOnly),
            other => Err(ViewError::Configuration(format!(
                "unknown view mode '{other}' (expected interactive or view-only)"
            ))),
        }
    }
}

/// Cursor over a non-empty step sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepCursor {
    index: usize,
}

impl StepCursor {
    /// Cursor at the start position for `mode` over `len` steps.
    pub fn reset_for(mode: ViewMode, len: usize) -> Self {
        let index = match mode {
            ViewMode::Interactive => 0,
            ViewMode::ViewOnly => len.saturating_sub(1),
        };
        Self { index }
    }

    /// Current index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move forward by one, clamped to `len - 1`. Returns whether it moved.
    pub fn advance(&mut self, len: usize) -> bool {
        if self.index + 1 < len {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Move back by one, clamped to 0. Returns whether it moved.
    pub fn retreat(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }
}

/// Owns the active trace and the cursor over it.
#[derive(Debug, Clone)]
pub struct StepTimeline {
    trace: Option<CircuitTrace>,
    cursor: StepCursor,
    mode: ViewMode,
    prepend_initial: bool,
    max_qubits: u32,
    tolerance: f64,
}

impl StepTimeline {
    /// Empty timeline with default limits.
    pub fn new(mode: ViewMode) -> Self {
        Self {
            trace: None,
            cursor: StepCursor::default(),
            mode,
            prepend_initial: true,
            max_qubits: 20,
            tolerance: DEFAULT_PROBABILITY_TOLERANCE,
        }
    }

    /// Set whether loaded traces get the synthesized initial step.
    pub fn with_initial_step(mut self, prepend: bool) -> Self {
        self.prepend_initial = prepend;
        self
    }

    /// Set validation limits applied on load.
    pub fn with_limits(mut self, max_qubits: u32, tolerance: f64) -> Self {
        self.max_qubits = max_qubits;
        self.tolerance = tolerance;
        self
    }

    /// Replace the active trace.
    ///
    /// On a shape mismatch the previous trace and cursor are kept and the
    /// error is returned.
    pub fn load(&mut self, mut trace: CircuitTrace) -> ViewResult<()> {
        if self.prepend_initial && trace.num_qubits <= self.max_qubits {
            trace.prepend_initial_step();
        }

        if let Err(e) = trace.validate(self.max_qubits, self.tolerance) {
            warn!("Rejecting trace: {}", e);
            return Err(e);
        }

        self.cursor = StepCursor::reset_for(self.mode, trace.len());
        info!(
            "Loaded trace: {} qubits, {} steps, cursor at {}",
            trace.num_qubits,
            trace.len(),
            self.cursor.index()
        );
        self.trace = Some(trace);
        Ok(())
    }

    /// Drop the active trace.
    pub fn clear(&mut self) {
        self.trace = None;
        self.cursor = StepCursor::default();
    }

    /// Move the cursor forward by one step.
    pub fn advance(&mut self) {
        let len = self.len();
        if self.cursor.advance(len) {
            debug!("Cursor advanced to {}", self.cursor.index());
        }
    }

    /// Move the cursor back by one step.
    pub fn retreat(&mut self) {
        if self.cursor.retreat() {
            debug!("Cursor retreated to {}", self.cursor.index());
        }
    }

    /// The step at the cursor, if a trace is loaded.
    pub fn current(&self) -> Option<&CircuitStep> {
        self.trace
            .as_ref()
            .and_then(|t| t.steps.get(self.cursor.index()))
    }

    /// Cursor index.
    pub fn cursor(&self) -> usize {
        self.cursor.index()
    }

    /// Presentation mode.
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn trace(&self) -> Option<&CircuitTrace> {
        self.trace.as_ref()
    }

    pub fn steps(&self) -> &[CircuitStep] {
        self.trace.as_ref().map_or(&[], |t| t.steps.as_slice())
    }

    /// Number of qubits of the active trace (0 when none is loaded).
    pub fn num_qubits(&self) -> u32 {
        self.trace.as_ref().map_or(0, |t| t.num_qubits)
    }

    /// Number of steps, including the initial step.
    pub fn len(&self) -> usize {
        self.steps().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trace.is_none()
    }

    /// "Step i/N-1" label for the navigation bar.
    pub fn position_label(&self) -> String {
        format!("Step {}/{}", self.cursor(), self.len().saturating_sub(1))
    }
}

impl Default for StepTimeline {
    fn default() -> Self {
        Self::new(ViewMode::default())
    }
}
