//! qdice Circuit Step and Distribution View
//!
//! This crate turns the replies of an external quantum-dice engine into
//! renderable state: a navigable timeline of circuit steps, the geometry of
//! the circuit diagram with the current step highlighted, a canonical
//! amplitude/probability table, and a histogram comparing sampled outcomes
//! with the theoretical distribution.
//!
//! # Overview
//!
//! Nothing here simulates quantum mechanics. The engine (see [`Engine`])
//! builds the circuit, evolves the amplitudes and samples outcomes; this
//! crate validates what comes back and derives everything a renderer needs.
//!
//! # Core Components
//!
//! - **Basis indices**: [`basis`] maps engine (little-endian) indices to
//!   big-endian display bitstrings and a canonical ordering
//! - **Timeline**: [`StepTimeline`] owns a validated [`CircuitTrace`] and a
//!   clamped cursor
//! - **Layout**: [`CircuitLayoutEngine`] produces diagram primitives from a
//!   timeline
//! - **Distribution**: [`OutcomeDistribution`] merges sample counts and
//!   derives a [`RenderSeries`]
//! - **Session**: [`Session`] is the single mutator, dropping replies that
//!   belong to superseded parameters
//!
//! # Example: Stepping Through a Trace
//!
//! ```rust
//! use qdice_view::{CircuitTrace, StepTimeline, ViewMode};
//!
//! let mut timeline = StepTimeline::new(ViewMode::Interactive);
//! timeline.load(CircuitTrace::new(2, vec![])).unwrap();
//!
//! // The all-zero initial state is prepended.
//! assert_eq!(timeline.len(), 1);
//! assert_eq!(timeline.position_label(), "Step 0/0");
//!
//! timeline.advance();
//! assert_eq!(timeline.cursor(), 0);
//! ```
//!
//! # Example: Aggregating Samples
//!
//! ```rust
//! use qdice_view::distribution::{Counts, OutcomeDistribution};
//!
//! let mut dist = OutcomeDistribution::new(2);
//! let batch: Counts = [(0, 30), (1, 20), (3, 5)].into_iter().collect();
//! dist.merge_samples(&batch);
//!
//! let series = dist.series();
//! assert_eq!(series.points.len(), 4);
//! assert_eq!(series.rejected_samples(), 5);
//! ```

pub mod basis;
pub mod config;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod gate;
pub mod layout;
pub mod session;
pub mod table;
pub mod timeline;
pub mod trace;

pub use config::{EngineConfig, ViewConfig};
pub use distribution::{OutcomeDistribution, RenderSeries, SeriesPoint};
pub use engine::{
    BatchRollRequest, BatchRollResponse, Engine, Method, RollParams, RollResponse, TraceResponse,
};
pub use error::{ViewError, ViewResult};
pub use gate::{Color, GateKind};
pub use layout::{CircuitLayoutEngine, DiagramLayout, LayoutConfig, StepLayout};
pub use session::{Applied, LastRoll, Session, Ticket, TraceStatus};
pub use table::StateRow;
pub use timeline::{StepTimeline, ViewMode};
pub use trace::{CircuitStep, CircuitTrace};
