//! Outcome distributions: empirical sample counts against theory.
//!
//! Sample counts only ever grow through [`merge`], which is plain key-wise
//! addition. Addition is associative and commutative, so replies from
//! several in-flight roll requests can be merged in whatever order they
//! arrive.

use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::debug;

/// Outcome → sample count.
pub type Counts = FxHashMap<u32, u64>;

/// Outcome → theoretical probability in `[0, 1]`.
pub type Probabilities = FxHashMap<u32, f64>;

/// Lower bound of the chart's value axis, in percent.
pub const MIN_AXIS_SCALE: f64 = 10.0;

/// Key-wise sum of two count tables.
pub fn merge(existing: &Counts, delta: &Counts) -> Counts {
    let mut merged = existing.clone();
    merge_into(&mut merged, delta);
    merged
}

/// In-place form of [`merge`].
pub fn merge_into(existing: &mut Counts, delta: &Counts) {
    for (&outcome, &count) in delta {
        *existing.entry(outcome).or_insert(0) += count;
    }
}

/// `max(key) + 1` over both tables, or 0 when both are empty.
pub fn domain_size(sample_counts: &Counts, theoretical: &Probabilities) -> usize {
    sample_counts
        .keys()
        .chain(theoretical.keys())
        .max()
        .map_or(0, |&max| max as usize + 1)
}

/// One bar group of the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub outcome: u32,
    pub sample_count: u64,
    pub sample_percent: f64,
    pub theoretical_percent: f64,
    /// Outcome lies in `[0, valid_bound)`.
    pub is_valid: bool,
}

/// Renderable series over `0..domain_size`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSeries {
    pub points: Vec<SeriesPoint>,
    /// Upper bound of the value axis, in percent. Never below
    /// [`MIN_AXIS_SCALE`].
    pub axis_scale: f64,
    pub total_samples: u64,
}

impl RenderSeries {
    /// Series with no points, as shown before any data arrives.
    pub fn empty() -> Self {
        Self {
            points: Vec::new(),
            axis_scale: MIN_AXIS_SCALE,
            total_samples: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Samples that landed on invalid outcomes.
    pub fn rejected_samples(&self) -> u64 {
        self.points
            .iter()
            .filter(|p| !p.is_valid)
            .map(|p| p.sample_count)
            .sum()
    }

    pub fn point(&self, outcome: u32) -> Option<&SeriesPoint> {
        self.points.get(outcome as usize)
    }
}

impl Default for RenderSeries {
    fn default() -> Self {
        Self::empty()
    }
}

/// Build the render series.
pub fn recompute(
    sample_counts: &Counts,
    theoretical: &Probabilities,
    domain_size: usize,
    valid_bound: u32,
) -> RenderSeries {
    let total_samples: u64 = sample_counts.values().sum();

    let points: Vec<SeriesPoint> = (0..domain_size)
        .map(|i| {
            let outcome = i as u32;
            let sample_count = sample_counts.get(&outcome).copied().unwrap_or(0);
            let sample_percent = if total_samples == 0 {
                0.0
            } else {
                100.0 * sample_count as f64 / total_samples as f64
            };
            SeriesPoint {
                outcome,
                sample_count,
                sample_percent,
                theoretical_percent: 100.0 * theoretical.get(&outcome).copied().unwrap_or(0.0),
                is_valid: outcome < valid_bound,
            }
        })
        .collect();

    let axis_scale = points
        .iter()
        .map(|p| p.sample_percent)
        .fold(MIN_AXIS_SCALE, f64::max);

    RenderSeries {
        points,
        axis_scale,
        total_samples,
    }
}

/// Accumulated samples plus the theoretical table for one parameter set.
#[derive(Debug, Clone, Default)]
pub struct OutcomeDistribution {
    sample_counts: Counts,
    theoretical: Probabilities,
    valid_bound: u32,
}

impl OutcomeDistribution {
    pub fn new(valid_bound: u32) -> Self {
        Self {
            valid_bound,
            ..Default::default()
        }
    }

    pub fn sample_counts(&self) -> &Counts {
        &self.sample_counts
    }

    pub fn theoretical(&self) -> &Probabilities {
        &self.theoretical
    }

    pub fn valid_bound(&self) -> u32 {
        self.valid_bound
    }

    pub fn total_samples(&self) -> u64 {
        self.sample_counts.values().sum()
    }

    pub fn domain_size(&self) -> usize {
        domain_size(&self.sample_counts, &self.theoretical)
    }

    /// Merge a batch of new samples.
    pub fn merge_samples(&mut self, delta: &Counts) {
        merge_into(&mut self.sample_counts, delta);
        debug!(
            "Merged {} outcomes, total samples {}",
            delta.len(),
            self.total_samples()
        );
    }

    /// Record a single sample.
    pub fn record(&mut self, outcome: u32) {
        *self.sample_counts.entry(outcome).or_insert(0) += 1;
    }

    /// Replace the theoretical table wholesale.
    pub fn replace_theoretical(&mut self, theoretical: Probabilities, valid_bound: u32) {
        self.theoretical = theoretical;
        self.valid_bound = valid_bound;
    }

    /// Drop the samples; the theoretical table is kept.
    pub fn reset(&mut self) {
        self.sample_counts.clear();
    }

    /// Drop samples and theory, e.g. when the parameters change.
    pub fn clear(&mut self, valid_bound: u32) {
        self.sample_counts.clear();
        self.theoretical.clear();
        self.valid_bound = valid_bound;
    }

    /// Derive the render series from the current state.
    pub fn series(&self) -> RenderSeries {
        recompute(
            &self.sample_counts,
            &self.theoretical,
            self.domain_size(),
            self.valid_bound,
        )
    }
}
