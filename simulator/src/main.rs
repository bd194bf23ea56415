use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use drawhouse_simulator::api::SimulateResponse;
use drawhouse_simulator::{run_monte_carlo, Api, ApiState, AutoBalancer, Simulator};
use drawhouse_types::{
    OptimizationObjective, PayoutStrategy, SimulationConfig, DEFAULT_ROUNDS_PER_RUN,
    HIGH_EDGE_THRESHOLD, LOW_EDGE_THRESHOLD,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Rounds per simulated batch
    #[arg(long, default_value_t = DEFAULT_ROUNDS_PER_RUN)]
    rounds: u64,

    /// Master seed; a run is fully determined by (config, seed)
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// JSON configuration file; omitted fields take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Payout strategy override: fixed | percentage | logarithmic | progressive
    #[arg(long)]
    strategy: Option<String>,

    /// Run the balancing loop when the measured edge misses the target band
    #[arg(long)]
    balance: bool,

    /// Append a Monte Carlo summary over this many independent runs
    #[arg(long, value_name = "RUNS")]
    monte_carlo: Option<usize>,

    /// Serve the HTTP API instead of a one-shot simulation
    #[arg(long)]
    serve: bool,

    #[arg(short, long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&raw).context("failed to parse configuration")?
        }
        None => SimulationConfig::default(),
    };
    if let Some(strategy) = &args.strategy {
        config.payout_strategy = parse_strategy(strategy, &config)?;
    }
    config.validate().context("invalid configuration")?;

    if args.serve {
        let api = Api::new(ApiState {
            config,
            rounds: args.rounds,
            seed: args.seed,
        });
        let addr = format!("0.0.0.0:{}", args.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        info!("Listening on {}", addr);
        axum::serve(listener, api.router())
            .await
            .context("axum server error")?;
        return Ok(());
    }

    let simulator = Simulator::new(config.clone(), args.seed);
    let mut report = simulator.run(args.rounds).context("simulation failed")?;

    if let Some(runs) = args.monte_carlo {
        report.monte_carlo = Some(
            run_monte_carlo(&config, runs, args.rounds, args.seed)
                .context("monte carlo failed")?,
        );
    }

    let edge = report.analysis.house_edge;
    let balanced = if args.balance
        && !(LOW_EDGE_THRESHOLD..=HIGH_EDGE_THRESHOLD).contains(&edge)
    {
        info!(edge, "edge outside target band, balancing");
        let balancer = AutoBalancer::new(OptimizationObjective::default());
        Some(
            balancer
                .run(config, args.seed)
                .context("balancing failed")?,
        )
    } else {
        None
    };

    let response = SimulateResponse { report, balanced };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn parse_strategy(name: &str, config: &SimulationConfig) -> anyhow::Result<PayoutStrategy> {
    match name {
        "fixed" => Ok(PayoutStrategy::Fixed),
        "percentage" => Ok(PayoutStrategy::Percentage { rate: 0.25 }),
        "logarithmic" => Ok(PayoutStrategy::Logarithmic { base: 5.0 }),
        // The progressive ramp threshold comes from the configuration.
        "progressive" => Ok(PayoutStrategy::Progressive {
            threshold: config.bonus_payout_threshold,
        }),
        other => anyhow::bail!("unknown payout strategy '{other}'"),
    }
}
