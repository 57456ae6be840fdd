//! Steps command implementation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use qdice_view::table::state_rows;
use qdice_view::{CircuitLayoutEngine, StepTimeline, ViewMode};

use super::common::{load_config, load_trace, print_state_table};
use super::render::{svg, text_diagram};

/// Execute the steps command.
pub fn execute(
    config_path: Option<&Path>,
    input: &str,
    step: usize,
    view_only: bool,
    no_init: bool,
    svg_output: Option<&str>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let mode = if view_only {
        ViewMode::ViewOnly
    } else {
        config.mode
    };

    println!(
        "{} Stepping through {} ({})",
        style("→").cyan().bold(),
        style(input).green(),
        style(mode).yellow()
    );

    let trace = load_trace(input)?;
    let mut timeline = StepTimeline::new(mode)
        .with_initial_step(config.prepend_initial_step && !no_init)
        .with_limits(config.max_qubits, config.probability_tolerance);
    timeline
        .load(trace)
        .with_context(|| format!("Rejected trace: {input}"))?;

    for _ in 0..step {
        timeline.advance();
    }

    let diagram = CircuitLayoutEngine::new(config.layout).layout_diagram(&timeline);
    println!();
    for line in text_diagram(&diagram) {
        println!("  {line}");
    }

    if let Some(path) = svg_output {
        let document = svg(&diagram).context("Failed to render SVG")?;
        fs::write(path, document).with_context(|| format!("Failed to write {path}"))?;
        println!("\n  SVG written to {}", style(path).green());
    }

    let Some(current) = timeline.current() else {
        return Ok(());
    };

    println!(
        "\n{} {}: {}",
        style("✓").green().bold(),
        timeline.position_label(),
        if current.description.is_empty() {
            current.kind().label()
        } else {
            current.description.clone()
        }
    );
    print_state_table(&state_rows(current, timeline.num_qubits()));

    Ok(())
}
