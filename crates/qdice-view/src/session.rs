//! The single mutator of view state.
//!
//! Every engine request is issued under a [`Ticket`] captured when the
//! request starts. Changing the parameters bumps the session epoch, so a
//! reply that arrives after the user moved on is recognised by its ticket
//! and dropped instead of overwriting newer state.

use tracing::{debug, info, warn};

use crate::basis::state_count;
use crate::config::ViewConfig;
use crate::distribution::{OutcomeDistribution, RenderSeries};
use crate::engine::{
    BatchRollRequest, BatchRollResponse, Engine, Method, RollParams, RollResponse, TraceResponse,
};
use crate::error::{ViewError, ViewResult};
use crate::layout::{CircuitLayoutEngine, DiagramLayout};
use crate::table::{StateRow, state_rows};
use crate::timeline::StepTimeline;

/// Request context captured when an engine call is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    params: RollParams,
}

impl Ticket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn params(&self) -> RollParams {
        self.params
    }
}

/// What happened to an engine reply handed to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The reply changed the view state.
    Applied,
    /// The reply belonged to an earlier epoch and was dropped.
    Stale,
    /// The reply was well-formed on the wire but its content was rejected.
    Rejected,
    /// The engine could not be reached or answered garbage.
    Unavailable,
}

/// Availability of the step trace, for the placeholder shown instead of
/// the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceStatus {
    /// Nothing requested yet.
    #[default]
    Empty,
    /// A trace request for the current epoch is in flight.
    Loading,
    /// A trace is loaded.
    Ready,
    /// The last trace request failed.
    Unavailable,
}

/// The most recent single roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastRoll {
    pub raw_value: u32,
    /// `raw_value < n`; rejection sampling may produce larger values.
    pub is_valid: bool,
}

/// Timeline, distribution and last roll for one parameter set at a time.
#[derive(Debug)]
pub struct Session {
    config: ViewConfig,
    params: RollParams,
    epoch: u64,
    timeline: StepTimeline,
    distribution: OutcomeDistribution,
    series: RenderSeries,
    series_revision: u64,
    last_roll: Option<LastRoll>,
    status: TraceStatus,
    layout: CircuitLayoutEngine,
}

impl Session {
    /// Create a session with default parameters.
    pub fn new(config: ViewConfig) -> Self {
        let params = RollParams::default();
        let timeline = StepTimeline::new(config.mode)
            .with_initial_step(config.prepend_initial_step)
            .with_limits(config.max_qubits, config.probability_tolerance);
        let layout = CircuitLayoutEngine::new(config.layout);

        Self {
            config,
            params,
            epoch: 0,
            timeline,
            distribution: OutcomeDistribution::new(params.n),
            series: RenderSeries::empty(),
            series_revision: 0,
            last_roll: None,
            status: TraceStatus::Empty,
            layout,
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn params(&self) -> RollParams {
        self.params
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Ticket for a request issued now.
    pub fn ticket(&self) -> Ticket {
        Ticket {
            epoch: self.epoch,
            params: self.params,
        }
    }

    /// Switch to a new parameter set.
    ///
    /// Clears the trace, samples, theoretical data and last roll, and
    /// invalidates every outstanding ticket. Returns the ticket for the
    /// trace request that should follow.
    pub fn set_params(&mut self, n: u32, method: Method) -> Ticket {
        self.params = RollParams::new(n, method);
        self.epoch += 1;
        self.timeline.clear();
        self.distribution.clear(self.params.n);
        self.last_roll = None;
        self.status = TraceStatus::Loading;
        self.refresh_series();

        info!(
            "Parameters set to n={} method={} (epoch {})",
            self.params.n, self.params.method, self.epoch
        );
        self.ticket()
    }

    /// Apply the reply to a trace request.
    pub fn apply_trace(&mut self, ticket: Ticket, reply: ViewResult<TraceResponse>) -> Applied {
        if self.is_stale(ticket, "trace") {
            return Applied::Stale;
        }

        let loaded = reply
            .and_then(TraceResponse::into_parts)
            .and_then(|(trace, theoretical)| {
                self.timeline.load(trace)?;
                Ok(theoretical)
            });

        match loaded {
            Ok(theoretical) => {
                self.distribution
                    .replace_theoretical(theoretical, self.params.n);
                self.status = TraceStatus::Ready;
                self.refresh_series();
                Applied::Applied
            }
            Err(e) => {
                let outcome = self.on_failure("trace", &e);
                self.status = if outcome == Applied::Rejected && !self.timeline.is_empty() {
                    TraceStatus::Ready
                } else {
                    TraceStatus::Unavailable
                };
                outcome
            }
        }
    }

    /// Apply the reply to a single roll.
    pub fn apply_roll(&mut self, ticket: Ticket, reply: ViewResult<RollResponse>) -> Applied {
        if self.is_stale(ticket, "roll") {
            return Applied::Stale;
        }

        match reply.and_then(|roll| self.check_outcome(roll.raw_value).map(|()| roll)) {
            Ok(roll) => {
                let is_valid = roll.raw_value < self.params.n;
                self.distribution.record(roll.raw_value);
                self.last_roll = Some(LastRoll {
                    raw_value: roll.raw_value,
                    is_valid,
                });
                debug!("Rolled {} (valid: {})", roll.raw_value, is_valid);
                self.refresh_series();
                Applied::Applied
            }
            Err(e) => self.on_failure("roll", &e),
        }
    }

    /// Apply the reply to a batch roll. Batches of one epoch may arrive in
    /// any order.
    pub fn apply_batch(&mut self, ticket: Ticket, reply: ViewResult<BatchRollResponse>) -> Applied {
        if self.is_stale(ticket, "batch") {
            return Applied::Stale;
        }

        let counts = reply.and_then(|batch| batch.counts()).and_then(|counts| {
            counts
                .keys()
                .try_for_each(|&outcome| self.check_outcome(outcome))
                .map(|()| counts)
        });
        match counts {
            Ok(counts) => {
                self.distribution.merge_samples(&counts);
                self.refresh_series();
                Applied::Applied
            }
            Err(e) => self.on_failure("batch", &e),
        }
    }

    /// Clear samples and the last roll; the theoretical table stays.
    pub fn reset_samples(&mut self) {
        self.distribution.reset();
        self.last_roll = None;
        self.refresh_series();
    }

    pub fn advance(&mut self) {
        self.timeline.advance();
    }

    pub fn retreat(&mut self) {
        self.timeline.retreat();
    }

    /// Fetch and apply the trace for the current parameters.
    pub async fn refresh(&mut self, engine: &dyn Engine) -> Applied {
        let ticket = self.ticket();
        self.status = TraceStatus::Loading;
        let reply = engine.build_trace(&ticket.params).await;
        self.apply_trace(ticket, reply)
    }

    /// Roll once and apply the result.
    pub async fn roll_once(&mut self, engine: &dyn Engine) -> Applied {
        let ticket = self.ticket();
        let reply = engine.roll_once(&ticket.params).await;
        self.apply_roll(ticket, reply)
    }

    /// Roll a batch of the configured size and apply the result.
    pub async fn roll_batch(&mut self, engine: &dyn Engine) -> Applied {
        let ticket = self.ticket();
        let request = self.batch_request();
        let reply = engine.roll_batch(&request).await;
        self.apply_batch(ticket, reply)
    }

    /// Batch request for the current parameters.
    pub fn batch_request(&self) -> BatchRollRequest {
        BatchRollRequest {
            params: self.params,
            shots: self.config.batch_shots,
        }
    }

    /// Current render series. Recomputed once per change of samples or
    /// theoretical data.
    pub fn series(&self) -> &RenderSeries {
        &self.series
    }

    /// Number of times the series has been recomputed.
    pub fn series_revision(&self) -> u64 {
        self.series_revision
    }

    pub fn timeline(&self) -> &StepTimeline {
        &self.timeline
    }

    pub fn distribution(&self) -> &OutcomeDistribution {
        &self.distribution
    }

    pub fn last_roll(&self) -> Option<LastRoll> {
        self.last_roll
    }

    pub fn status(&self) -> TraceStatus {
        self.status
    }

    /// Diagram primitives for the active trace.
    pub fn diagram(&self) -> DiagramLayout {
        self.layout.layout_diagram(&self.timeline)
    }

    /// State table for the step at the cursor.
    pub fn state_rows(&self) -> Vec<StateRow> {
        self.timeline
            .current()
            .map(|step| state_rows(step, self.timeline.num_qubits()))
            .unwrap_or_default()
    }

    /// Outcomes must index a basis state of the requested circuit, or of
    /// the loaded trace when it is wider.
    fn check_outcome(&self, outcome: u32) -> ViewResult<()> {
        let num_qubits = self.params.num_qubits().max(self.timeline.num_qubits());
        let states = state_count(num_qubits);
        if usize::try_from(outcome).map_or(true, |o| o >= states) {
            debug!("Outcome {} outside {} basis states", outcome, states);
            return Err(ViewError::InvalidOutcome(outcome.to_string()));
        }
        Ok(())
    }

    fn is_stale(&self, ticket: Ticket, what: &str) -> bool {
        if ticket.epoch == self.epoch {
            return false;
        }
        debug!(
            "Dropping stale {} reply (epoch {}, current {})",
            what, ticket.epoch, self.epoch
        );
        true
    }

    fn on_failure(&self, what: &str, error: &ViewError) -> Applied {
        warn!("{} reply not applied: {}", what, error);
        if error.is_rejection() {
            Applied::Rejected
        } else {
            Applied::Unavailable
        }
    }

    fn refresh_series(&mut self) {
        self.series = self.distribution.series();
        self.series_revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::tests::sample_trace;

    fn trace_reply(n: u32) -> TraceResponse {
        let num_qubits = crate::engine::num_qubits_for(n);
        let trace = sample_trace(num_qubits, 2);
        let p = 1.0 / n as f64;
        TraceResponse {
            num_qubits,
            steps: trace.steps,
            theoretical: (0..n).map(|i| (i.to_string(), p)).collect(),
        }
    }

    #[test]
    fn test_set_params_clears_state() {
        let mut session = Session::new(ViewConfig::default());
        let ticket = session.ticket();
        assert_eq!(session.apply_trace(ticket, Ok(trace_reply(6))), Applied::Applied);
        session.apply_roll(ticket, Ok(RollResponse { raw_value: 2, mapped_value: None }));
        assert!(session.last_roll().is_some());

        session.set_params(4, Method::Exact);
        assert!(session.timeline().is_empty());
        assert!(session.last_roll().is_none());
        assert!(session.series().is_empty());
        assert_eq!(session.status(), TraceStatus::Loading);
        assert_eq!(session.params().n, 4);
    }

    #[test]
    fn test_stale_ticket_is_dropped() {
        let mut session = Session::new(ViewConfig::default());
        let old = session.ticket();
        session.set_params(8, Method::Rejection);

        assert_eq!(session.apply_trace(old, Ok(trace_reply(6))), Applied::Stale);
        assert!(session.timeline().is_empty());
    }

    #[test]
    fn test_invalid_roll_is_flagged() {
        let mut session = Session::new(ViewConfig::default());
        let ticket = session.ticket();
        session.apply_roll(ticket, Ok(RollResponse { raw_value: 7, mapped_value: None }));
        let last = session.last_roll().unwrap();
        assert_eq!(last.raw_value, 7);
        assert!(!last.is_valid);
        assert_eq!(session.series().rejected_samples(), 1);
    }

    #[test]
    fn test_reset_samples_clears_last_roll() {
        let mut session = Session::new(ViewConfig::default());
        let ticket = session.ticket();
        session.apply_trace(ticket, Ok(trace_reply(6)));
        session.apply_roll(ticket, Ok(RollResponse { raw_value: 1, mapped_value: None }));

        session.reset_samples();
        assert!(session.last_roll().is_none());
        assert_eq!(session.series().total_samples, 0);
        assert_eq!(session.series().points.len(), 6);
    }

    #[test]
    fn test_series_recomputed_once_per_change() {
        let mut session = Session::new(ViewConfig::default());
        let ticket = session.ticket();
        let before = session.series_revision();
        session.apply_trace(ticket, Ok(trace_reply(6)));
        assert_eq!(session.series_revision(), before + 1);

        session.advance();
        session.retreat();
        assert_eq!(session.series_revision(), before + 1);
    }

    #[test]
    fn test_transport_failure_marks_unavailable() {
        let mut session = Session::new(ViewConfig::default());
        let ticket = session.ticket();
        let outcome = session.apply_trace(ticket, Err(ViewError::Transport("refused".into())));
        assert_eq!(outcome, Applied::Unavailable);
        assert_eq!(session.status(), TraceStatus::Unavailable);
    }

    #[test]
    fn test_state_rows_follow_cursor() {
        let mut session = Session::new(ViewConfig::default());
        assert!(session.state_rows().is_empty());
        let ticket = session.ticket();
        session.apply_trace(ticket, Ok(trace_reply(6)));
        let rows = session.state_rows();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0].probability, 1.0);
    }
}
