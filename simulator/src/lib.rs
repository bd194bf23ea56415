//! Batch driver for the drawhouse simulation core.
//!
//! Runs fixed-configuration batches of rounds, folds the results into the
//! metric snapshot the balancer consumes, and hosts the auto-balancer,
//! the Monte Carlo driver, and the HTTP API around the engine.

pub mod api;
pub mod balancer;
pub mod montecarlo;

pub use api::{Api, ApiState};
pub use balancer::AutoBalancer;
pub use montecarlo::run_monte_carlo;

use drawhouse_engine::holds::HtRegistry;
use drawhouse_engine::{EngineError, SimulationRun};
use drawhouse_types::{
    BatchReport, HtRuleMetrics, LedgerAnalysis, SimulationConfig, SimulationMetrics,
    DEFAULT_MAX_EXPLOIT_EV, EXPLOIT_USAGE_THRESHOLD,
};

/// Result of one simulated batch: the metric snapshot, the ledger
/// analytics, and the registry carrying that batch's statistics.
pub struct BatchOutcome {
    pub metrics: SimulationMetrics,
    pub analysis: LedgerAnalysis,
    pub registry: HtRegistry,
}

/// Run `rounds` rounds with a fixed configuration and the given registry.
///
/// The registry is moved in and handed back with the batch's statistics so
/// callers (the balancer) can inspect empirical rule EVs and carry
/// enable/disable decisions into the next batch.
pub fn run_batch(
    config: &SimulationConfig,
    registry: HtRegistry,
    rounds: u64,
    seed: u64,
    max_exploit_ev: f64,
) -> Result<BatchOutcome, EngineError> {
    let mut run = SimulationRun::with_registry(config.clone(), registry, seed)?;
    let mut player_net: i64 = 0;
    for _ in 0..rounds {
        let result = run.play_round()?;
        for outcome in &result.outcomes {
            player_net += outcome.total_returned() as i64;
            player_net -= (outcome.wagered + outcome.bust_penalty) as i64;
        }
    }
    Ok(collect(run, player_net, max_exploit_ev))
}

fn collect(run: SimulationRun, player_net: i64, max_exploit_ev: f64) -> BatchOutcome {
    let analysis = run.ledger().analyze();
    let rounds = run.ledger().rounds();

    // Volatility: population stddev of per-round house net, normalized by
    // the per-round ante intake so it is dimensionless.
    let intake = (run.config().ante * run.config().players as u64) as f64;
    let history = run.ledger().round_net_history();
    let volatility = if history.is_empty() || intake == 0.0 {
        0.0
    } else {
        let mean = history.iter().sum::<i64>() as f64 / history.len() as f64;
        let variance = history
            .iter()
            .map(|&net| {
                let d = net as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / history.len() as f64;
        variance.sqrt() / intake
    };

    let ht_rules: Vec<HtRuleMetrics> = run
        .registry()
        .entries()
        .map(|(rule, stats)| {
            let usage = stats.usage;
            let rate = |n: u64| if usage == 0 { 0.0 } else { n as f64 / usage as f64 };
            HtRuleMetrics {
                rule_id: rule.id,
                usage,
                wins: stats.wins,
                losses: stats.losses,
                busts: stats.busts,
                win_rate: rate(stats.wins),
                loss_rate: rate(stats.losses),
                bust_rate: rate(stats.busts),
                calculated_ev: stats.calculated_ev(),
                exploitable: usage > EXPLOIT_USAGE_THRESHOLD
                    && stats.calculated_ev() > max_exploit_ev,
                enabled: rule.enabled,
            }
        })
        .collect();

    let tubes = run.tubes().metrics(rounds);
    let avg_tube_drain = run.tubes().avg_drain_rate();

    let metrics = SimulationMetrics {
        rounds,
        house_edge: analysis.house_edge,
        house_net_profit: analysis.net_profit,
        player_net,
        volatility,
        avg_tube_drain,
        ht_rules,
        tubes,
    };
    let (_, _, registry) = run.into_parts();
    BatchOutcome {
        metrics,
        analysis,
        registry,
    }
}

/// Convenience wrapper owning a configuration and seed.
#[derive(Clone)]
pub struct Simulator {
    config: SimulationConfig,
    seed: u64,
}

impl Simulator {
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        Self { config, seed }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// One batch with the standard rule table, reported for hosts.
    pub fn run(&self, rounds: u64) -> Result<BatchReport, EngineError> {
        let outcome = run_batch(
            &self.config,
            HtRegistry::standard(),
            rounds,
            self.seed,
            DEFAULT_MAX_EXPLOIT_EV,
        )?;
        Ok(BatchReport {
            metrics: outcome.metrics,
            analysis: outcome.analysis,
            monte_carlo: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_produces_consistent_metrics() {
        let config = SimulationConfig::default();
        let outcome = run_batch(
            &config,
            HtRegistry::standard(),
            2_000,
            42,
            DEFAULT_MAX_EXPLOIT_EV,
        )
        .expect("batch runs");
        let metrics = &outcome.metrics;
        assert_eq!(metrics.rounds, 2_000);
        assert_eq!(metrics.house_net_profit, outcome.analysis.net_profit);
        assert!(metrics.volatility >= 0.0);
        assert_eq!(metrics.tubes.len(), 5);
        assert_eq!(metrics.ht_rules.len(), 13);
        let usage: u64 = metrics.ht_rules.iter().map(|r| r.usage).sum();
        assert_eq!(usage, 2_000 * config.players as u64);
    }

    #[test]
    fn test_batch_is_reproducible() {
        let config = SimulationConfig::default();
        let a = run_batch(&config, HtRegistry::standard(), 500, 7, DEFAULT_MAX_EXPLOIT_EV)
            .unwrap();
        let b = run_batch(&config, HtRegistry::standard(), 500, 7, DEFAULT_MAX_EXPLOIT_EV)
            .unwrap();
        assert_eq!(a.metrics, b.metrics);
    }

    #[test]
    fn test_simulator_report_serializes() {
        let simulator = Simulator::new(SimulationConfig::default(), 1);
        let report = simulator.run(200).expect("batch runs");
        let json = serde_json::to_string(&report).expect("report is serializable");
        assert!(json.contains("house_edge"));
    }
}
