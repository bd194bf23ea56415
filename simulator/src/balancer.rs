//! The auto-balancing feedback loop.
//!
//! A state machine over configurations, not rounds: propose a
//! configuration, simulate a batch, score the metrics against the
//! objective, and either accept or adjust and repeat. The adjustment is a
//! single proportional step per parameter per iteration, not a trained
//! optimizer.

use tracing::{debug, info, warn};

use drawhouse_engine::holds::HtRegistry;
use drawhouse_engine::EngineError;
use drawhouse_types::{
    BalanceIssue, IssueKind, IssueSeverity, OptimizationObjective, OptimizationResult,
    SimulationConfig, SimulationMetrics, CRITICAL_HIGH_EDGE, CRITICAL_LOW_EDGE,
    DRAIN_ADJUST_THRESHOLD, DRAIN_CRITICAL_THRESHOLD, DRAIN_WARN_THRESHOLD, HIGH_EDGE_THRESHOLD,
    LOW_EDGE_THRESHOLD, MAX_BUST_PENALTY_MULTIPLIER, MAX_OPTIMIZATION_ITERATIONS,
    MAX_REFILL_AMOUNT, MIN_BUST_PENALTY_MULTIPLIER,
};

use crate::run_batch;

pub struct AutoBalancer {
    objective: OptimizationObjective,
    rounds_per_batch: u64,
}

impl AutoBalancer {
    pub fn new(objective: OptimizationObjective) -> Self {
        Self {
            objective,
            rounds_per_batch: 10_000,
        }
    }

    pub fn with_rounds_per_batch(mut self, rounds: u64) -> Self {
        self.rounds_per_batch = rounds;
        self
    }

    pub fn objective(&self) -> &OptimizationObjective {
        &self.objective
    }

    /// Iterate {simulate, score, adjust} until the objective is met or the
    /// iteration cap is reached. Returns the best configuration seen.
    pub fn run(
        &self,
        initial: SimulationConfig,
        seed: u64,
    ) -> Result<OptimizationResult, EngineError> {
        let mut config = initial;
        let mut registry = HtRegistry::standard();
        let mut best: Option<(f64, SimulationConfig, SimulationMetrics)> = None;
        let mut iterations = 0;
        let mut converged = false;

        for iteration in 0..MAX_OPTIMIZATION_ITERATIONS {
            iterations = iteration + 1;
            registry.reset_stats();
            let batch = run_batch(
                &config,
                registry,
                self.rounds_per_batch,
                seed.wrapping_add(iteration as u64),
                self.objective.max_exploit_ev,
            )?;
            registry = batch.registry;
            let metrics = batch.metrics;
            let score = self.score(&metrics);
            debug!(
                iteration,
                score,
                edge = metrics.house_edge,
                volatility = metrics.volatility,
                "balancing iteration"
            );

            let improved = best.as_ref().map_or(true, |(s, _, _)| score < *s);
            if improved {
                best = Some((score, config.clone(), metrics.clone()));
            }

            if self.is_optimal(&metrics) {
                converged = true;
                info!(iteration, edge = metrics.house_edge, "objective met");
                break;
            }

            self.mitigate_exploits(&mut registry);
            self.adjust(&mut config, &metrics);
        }

        let (score, config, metrics) =
            best.expect("at least one iteration ran");
        let issues = self.identify_issues(&metrics);
        Ok(OptimizationResult {
            config,
            score,
            iterations,
            converged,
            issues,
            metrics,
        })
    }

    /// Weighted penalty score; lower is better.
    pub fn score(&self, metrics: &SimulationMetrics) -> f64 {
        let o = &self.objective;
        let edge_term = (metrics.house_edge - o.target_edge).abs();
        let volatility_term = (metrics.volatility - o.max_volatility).max(0.0);
        let drain_term = (metrics.avg_tube_drain - DRAIN_ADJUST_THRESHOLD).max(0.0);
        let exploit_term: f64 = metrics
            .ht_rules
            .iter()
            .filter(|r| r.exploitable)
            .map(|r| r.calculated_ev - o.max_exploit_ev)
            .sum();
        o.edge_weight * edge_term
            + o.volatility_weight * volatility_term
            + o.drain_weight * drain_term
            + o.exploit_weight * exploit_term
    }

    /// Termination predicate: edge within tolerance, volatility under the
    /// ceiling, and no rule over the exploit EV ceiling.
    pub fn is_optimal(&self, metrics: &SimulationMetrics) -> bool {
        let o = &self.objective;
        (metrics.house_edge - o.target_edge).abs() <= o.edge_tolerance
            && metrics.volatility <= o.max_volatility
            && metrics.ht_rules.iter().all(|r| !r.exploitable)
    }

    /// Disable any rule whose empirical EV exceeds twice the ceiling.
    /// Destructive for the remainder of the run; logged as an event.
    pub fn mitigate_exploits(&self, registry: &mut HtRegistry) -> Vec<&'static str> {
        let mut disabled = Vec::new();
        for flag in registry.exploitable_hts(2.0 * self.objective.max_exploit_ev) {
            warn!(
                rule_id = flag.rule_id,
                ev = flag.calculated_ev,
                usage = flag.usage,
                "disabling exploitable hold rule"
            );
            if registry.set_enabled(flag.rule_id, false).is_ok() {
                disabled.push(flag.rule_id);
            }
        }
        disabled
    }

    /// The proportional adjustment step, applied only when not optimal.
    fn adjust(&self, config: &mut SimulationConfig, metrics: &SimulationMetrics) {
        let o = &self.objective;
        let factor = 1.0 + o.learning_rate * 10.0 * (o.target_edge - metrics.house_edge);
        config.bust_penalty_multiplier = (config.bust_penalty_multiplier * factor)
            .clamp(MIN_BUST_PENALTY_MULTIPLIER, MAX_BUST_PENALTY_MULTIPLIER);

        for tube_metrics in &metrics.tubes {
            if tube_metrics.drain_rate > DRAIN_ADJUST_THRESHOLD {
                let tube = config.tube_mut(tube_metrics.tube);
                tube.initial =
                    ((tube.initial as f64) * (1.0 + 0.5 * tube_metrics.drain_rate)).floor() as u64;
                // Keep the funding invariant intact as initial grows.
                tube.max = tube.max.max(tube.initial);
            }
        }

        if metrics.avg_tube_drain > DRAIN_WARN_THRESHOLD {
            config.refill_amount = (config.refill_amount + 1).min(MAX_REFILL_AMOUNT);
        }
    }

    /// Diagnostics for the operator. Never mutates state; issues are
    /// advisories, not failures.
    pub fn identify_issues(&self, metrics: &SimulationMetrics) -> Vec<BalanceIssue> {
        let mut issues = Vec::new();
        let edge = metrics.house_edge;
        if edge < LOW_EDGE_THRESHOLD {
            issues.push(BalanceIssue {
                kind: IssueKind::LowEdge,
                severity: if edge < CRITICAL_LOW_EDGE {
                    IssueSeverity::Critical
                } else {
                    IssueSeverity::Warning
                },
                message: format!(
                    "house edge {:.2}% below the {:.0}% floor",
                    edge * 100.0,
                    LOW_EDGE_THRESHOLD * 100.0
                ),
            });
        } else if edge > HIGH_EDGE_THRESHOLD {
            issues.push(BalanceIssue {
                kind: IssueKind::HighEdge,
                severity: if edge > CRITICAL_HIGH_EDGE {
                    IssueSeverity::Critical
                } else {
                    IssueSeverity::Warning
                },
                message: format!(
                    "house edge {:.2}% above the {:.0}% ceiling",
                    edge * 100.0,
                    HIGH_EDGE_THRESHOLD * 100.0
                ),
            });
        }
        if metrics.volatility > self.objective.max_volatility {
            issues.push(BalanceIssue {
                kind: IssueKind::HighVolatility,
                severity: IssueSeverity::Warning,
                message: format!(
                    "volatility {:.3} exceeds ceiling {:.3}",
                    metrics.volatility, self.objective.max_volatility
                ),
            });
        }
        for rule in metrics.ht_rules.iter().filter(|r| r.exploitable) {
            issues.push(BalanceIssue {
                kind: IssueKind::ExploitableRule,
                severity: IssueSeverity::Warning,
                message: format!(
                    "rule {} EV {:+.3} over ceiling {:+.3} ({} samples)",
                    rule.rule_id, rule.calculated_ev, self.objective.max_exploit_ev, rule.usage
                ),
            });
        }
        for tube in metrics
            .tubes
            .iter()
            .filter(|t| t.drain_rate > DRAIN_WARN_THRESHOLD)
        {
            issues.push(BalanceIssue {
                kind: IssueKind::TubeInstability,
                severity: if tube.drain_rate > DRAIN_CRITICAL_THRESHOLD {
                    IssueSeverity::Critical
                } else {
                    IssueSeverity::Warning
                },
                message: format!(
                    "tube {} drain rate {:.2} ({} depletions)",
                    tube.tube.code(),
                    tube.drain_rate,
                    tube.depletions
                ),
            });
        }
        issues
    }
}
