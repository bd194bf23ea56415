//! Monte Carlo driver: run-to-run variance of the measured house edge.
//!
//! Each run is independent: its own configuration snapshot, fresh ledger,
//! tube, and registry state, and a seed derived from the master seed and
//! run index. Runs execute in parallel on the rayon pool; results are
//! reduced only after every run completes.

use rayon::prelude::*;
use tracing::info;

use drawhouse_engine::{EngineError, SimulationRun};
use drawhouse_types::{
    MonteCarloSummary, SimulationConfig, CONFIDENCE_Z, STABLE_EDGE_STDDEV,
};

/// Per-run seed spacing; any odd constant works, this one scatters well.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Simulate `runs` independent batches of `rounds_per_run` rounds each and
/// summarize the distribution of the measured house edge.
pub fn run_monte_carlo(
    config: &SimulationConfig,
    runs: usize,
    rounds_per_run: u64,
    seed: u64,
) -> Result<MonteCarloSummary, EngineError> {
    let edges: Vec<f64> = (0..runs)
        .into_par_iter()
        .map(|i| {
            let run_seed = seed.wrapping_add(SEED_STRIDE.wrapping_mul(i as u64 + 1));
            let mut run = SimulationRun::new(config.clone(), run_seed)?;
            for _ in 0..rounds_per_run {
                run.play_round()?;
            }
            Ok(run.ledger().analyze().house_edge)
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    let n = edges.len() as f64;
    let mean_edge = edges.iter().sum::<f64>() / n;
    let variance = edges
        .iter()
        .map(|e| {
            let d = e - mean_edge;
            d * d
        })
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();
    let min_edge = edges.iter().copied().fold(f64::INFINITY, f64::min);
    let max_edge = edges.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let confidence_95 = CONFIDENCE_Z * std_dev / n.sqrt();
    let stable = std_dev < STABLE_EDGE_STDDEV;

    info!(
        runs,
        rounds_per_run, mean_edge, std_dev, stable, "monte carlo summary"
    );

    Ok(MonteCarloSummary {
        runs,
        rounds_per_run,
        mean_edge,
        variance,
        std_dev,
        min_edge,
        max_edge,
        confidence_95,
        stable,
    })
}
