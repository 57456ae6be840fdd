//! Roll command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use qdice_adapter_http::HttpEngine;
use qdice_view::{Applied, Engine, Method, Session, TraceStatus};

use super::common::{load_config, print_series};

/// Execute the roll command.
pub async fn execute(
    config_path: Option<&Path>,
    sides: u32,
    method: &str,
    batches: u32,
    shots: Option<u32>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(shots) = shots {
        anyhow::ensure!(shots > 0, "--shots must be positive");
        config.batch_shots = shots;
    }
    let method: Method = method.parse()?;

    let engine = HttpEngine::new(&config.engine).context("Failed to create engine client")?;
    println!(
        "{} Rolling a {}-sided die ({}) on {}",
        style("→").cyan().bold(),
        sides,
        style(method).yellow(),
        style(engine.client().base_url()).green()
    );

    let mut session = Session::new(config);
    session.set_params(sides, method);
    let params = session.params();
    if params.n != sides {
        println!("  Sides clamped to {}", params.n);
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    spinner.set_message("Fetching circuit trace...");
    session.refresh(&engine).await;
    if session.status() != TraceStatus::Ready {
        spinner.finish_and_clear();
        anyhow::bail!("Engine at {} did not return a usable trace", engine.client().base_url());
    }

    spinner.set_message("Rolling once...");
    session.roll_once(&engine).await;

    spinner.set_message(format!("Rolling {batches} batches..."));
    let ticket = session.ticket();
    let request = session.batch_request();
    let mut inflight: FuturesUnordered<_> =
        (0..batches).map(|_| engine.roll_batch(&request)).collect();

    let mut failed = 0;
    while let Some(reply) = inflight.next().await {
        if session.apply_batch(ticket, reply) != Applied::Applied {
            failed += 1;
        }
    }
    spinner.finish_and_clear();
    info!("{} of {} batches applied", batches - failed, batches);

    println!(
        "  Circuit: {} qubits, {} steps",
        session.timeline().num_qubits(),
        session.timeline().len()
    );
    if let Some(last) = session.last_roll() {
        let value = if last.is_valid {
            style(last.raw_value).green().bold()
        } else {
            style(last.raw_value).red().bold()
        };
        println!("  Rolled: {value}");
    }
    if failed > 0 {
        println!(
            "  {} {} batches failed",
            style("!").red().bold(),
            failed
        );
    }

    print_series(session.series());
    Ok(())
}
