//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use qdice_view::distribution::{Counts, Probabilities};
use qdice_view::engine::{parse_counts, parse_probabilities};
use qdice_view::{CircuitStep, CircuitTrace, RenderSeries, StateRow, ViewConfig};

/// Width of a full-scale histogram bar, in characters.
const BAR_WIDTH: f64 = 40.0;

/// Load the view configuration with env > file > defaults precedence.
pub fn load_config(path: Option<&Path>) -> Result<ViewConfig> {
    ViewConfig::load(path).context("Failed to load configuration")
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &str) -> Result<T> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    serde_json::from_str(&source).with_context(|| format!("Failed to parse JSON: {path}"))
}

/// Trace file layout, matching the engine's `/circuit_visual` reply.
#[derive(Deserialize)]
struct TraceFile {
    num_qubits: u32,
    #[serde(default)]
    steps: Vec<CircuitStep>,
}

/// Load a step trace from a JSON file.
pub fn load_trace(path: &str) -> Result<CircuitTrace> {
    let file: TraceFile = read_json(path)?;
    Ok(CircuitTrace::new(file.num_qubits, file.steps))
}

/// Load a text-keyed count table.
pub fn load_counts(path: &str) -> Result<Counts> {
    let raw: FxHashMap<String, u64> = read_json(path)?;
    parse_counts(&raw).with_context(|| format!("Invalid counts in {path}"))
}

/// Load a text-keyed probability table.
pub fn load_probabilities(path: &str) -> Result<Probabilities> {
    let raw: FxHashMap<String, f64> = read_json(path)?;
    parse_probabilities(&raw).with_context(|| format!("Invalid distribution in {path}"))
}

/// Histogram bar for `percent` against `axis_scale`.
pub fn bar(percent: f64, axis_scale: f64) -> String {
    let len = (percent / axis_scale * BAR_WIDTH).round() as usize;
    "█".repeat(len)
}

/// Print the render series as a horizontal bar chart.
pub fn print_series(series: &RenderSeries) {
    if series.is_empty() {
        println!("  {}", style("No data").dim());
        return;
    }

    println!(
        "\n{} Distribution ({} samples, axis {:.1}%):",
        style("✓").green().bold(),
        series.total_samples,
        series.axis_scale
    );

    for point in &series.points {
        let bar = bar(point.sample_percent, series.axis_scale);
        let bar = if point.is_valid {
            style(bar).green()
        } else {
            style(bar).red()
        };
        println!(
            "  {:>3}: {:>6} ({:>5.2}%, theory {:>5.2}%) {}",
            style(point.outcome).cyan(),
            point.sample_count,
            point.sample_percent,
            point.theoretical_percent,
            bar
        );
    }

    let rejected = series.rejected_samples();
    if rejected > 0 {
        println!(
            "  {} {} samples landed on invalid outcomes",
            style("!").red().bold(),
            rejected
        );
    }
}

/// Print the amplitude/probability table in display order.
pub fn print_state_table(rows: &[StateRow]) {
    for row in rows {
        let line = row.to_string();
        if row.probability > 0.0 {
            println!("  {}", style(line).cyan());
        } else {
            println!("  {}", style(line).dim());
        }
    }
}
