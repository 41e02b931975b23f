//! backlay - seeded betting exchange simulation.
//!
//! ```bash
//! backlay --config backlay.toml --seed 7
//! RUST_LOG=backlay=trace backlay --trace
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use backlay::config::Config;
use backlay::engine::{MatchObserver, RecordingObserver, TracingObserver};
use backlay::ledger::Exchange;
use backlay::simulation::{Simulation, SimulationParams, SimulationReport};
use backlay::types::odds::{from_capital, from_fixed_trimmed};

/// backlay - two-sided betting exchange simulator.
#[derive(Parser, Debug)]
#[command(name = "backlay")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the simulation seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Record every matching step and log the count per run
    #[arg(long)]
    trace: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    config.init_logging();

    let mut params = SimulationParams::from_config(&config.simulation)
        .context("invalid simulation parameters")?;
    if let Some(seed) = cli.seed {
        params = params.with_seed(seed);
    }

    if cli.trace {
        let exchange = Exchange::with_observer(RecordingObserver::new());
        let (report, exchange) = simulate(exchange, &config, params)?;
        info!(
            steps = exchange.engine().observer().steps().len(),
            "recorded matching steps"
        );
        summarize(&report, &exchange);
    } else {
        let exchange = Exchange::with_observer(TracingObserver);
        let (report, exchange) = simulate(exchange, &config, params)?;
        summarize(&report, &exchange);
    }

    Ok(())
}

fn simulate<O: MatchObserver>(
    exchange: Exchange<O>,
    config: &Config,
    params: SimulationParams,
) -> Result<(SimulationReport, Exchange<O>)> {
    let mut exchange = exchange.with_book_capacity(config.book.capacity);
    let report = Simulation::new(params)
        .run(&mut exchange)
        .with_context(|| format!("simulation with seed {} failed", params.seed))?;
    Ok((report, exchange))
}

fn summarize<O: MatchObserver>(report: &SimulationReport, exchange: &Exchange<O>) {
    for event in &report.events {
        let result = &event.result;
        let odds = |o: Option<u64>| o.map_or_else(|| "unset".to_string(), from_fixed_trimmed);
        info!(
            event_id = result.event_id,
            status = ?result.status,
            bettor_odds = %odds(result.bettor_odds),
            layer_odds = %odds(result.layer_odds),
            matched = result.matched_back.len() + result.matched_lay.len(),
            outcome = ?event.outcome,
            state_root = %result.receipt().state_root_hex(),
            "event summary"
        );
    }

    for agent in exchange.agents() {
        info!(
            agent_id = agent.id(),
            capital = %from_capital(agent.capital()),
            orders = agent.open_orders().len(),
            "agent summary"
        );
    }

    info!(
        seed = report.seed,
        orders = report.orders_issued,
        matched = report.matched_orders(),
        payout = %from_fixed_trimmed(report.total_payout()),
        "simulation summary"
    );
}
