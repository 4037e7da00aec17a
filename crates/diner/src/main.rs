//! Diner CLI - dining tables with deadlock recovery by migration
//!
//! Binary name: `diner`

use std::process;

use anyhow::{Context, Result};
use diner_core::{load_config, Simulation, StopReason};
use tracing_subscriber::EnvFilter;

mod cli;
mod render;

use cli::{build_cli, Options};
use render::Renderer;

#[tokio::main]
async fn main() {
    let options = Options::from_matches(&build_cli().get_matches());
    init_tracing(options.verbose);

    let code = match run(options).await {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Error: {err:#}");
            }
            1
        }
    };

    #[allow(clippy::exit)]
    process::exit(code);
}

/// `RUST_LOG` wins unless `-v` was given
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(options: Options) -> Result<StopReason> {
    let config = load_config(options.config.as_deref(), options.overrides)
        .context("Failed to load configuration")?;
    tracing::info!(?config, "configuration loaded");

    let simulation = Simulation::new(config).context("Failed to set up simulation")?;
    let renderer = Renderer::new(options.json, options.quiet);
    let printer = tokio::spawn(renderer.follow(simulation.subscribe()));

    let termination = simulation.termination();
    let interrupt = tokio::spawn(async move {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    tracing::info!("Received SIGINT, stopping simulation");
                    termination.declare(StopReason::Interrupted);
                }
                Err(e) => tracing::warn!(error = %e, "cannot listen for Ctrl-C"),
            },
            () = termination.cancelled() => {}
        }
    });

    let result = simulation.run().await;
    interrupt.abort();
    printer.await.context("Event printer stopped unexpectedly")??;

    let summary = result.context("Simulation failed")?;
    renderer.summary(&summary)?;
    Ok(summary.outcome)
}
