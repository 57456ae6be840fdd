//! Histogram command implementation.

use anyhow::Result;
use console::style;

use qdice_view::OutcomeDistribution;
use qdice_view::distribution::Probabilities;

use super::common::{load_counts, load_probabilities, print_series};

/// Execute the histogram command.
pub fn execute(samples: &str, theoretical: Option<&str>, valid_bound: u32) -> Result<()> {
    println!(
        "{} Charting {} (valid outcomes: 0..{})",
        style("→").cyan().bold(),
        style(samples).green(),
        valid_bound
    );

    let counts = load_counts(samples)?;
    let theory = match theoretical {
        Some(path) => load_probabilities(path)?,
        None => Probabilities::default(),
    };

    let mut distribution = OutcomeDistribution::new(valid_bound);
    distribution.replace_theoretical(theory, valid_bound);
    distribution.merge_samples(&counts);

    print_series(&distribution.series());
    Ok(())
}
