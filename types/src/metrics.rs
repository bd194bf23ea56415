use serde::{Deserialize, Serialize};

use crate::{
    SimulationConfig, TubeType, DEFAULT_EDGE_TOLERANCE, DEFAULT_LEARNING_RATE,
    DEFAULT_MAX_EXPLOIT_EV, DEFAULT_MAX_VOLATILITY, DEFAULT_TARGET_EDGE, HIGH_EDGE_THRESHOLD,
    LOW_EDGE_THRESHOLD,
};

/// Operator-facing health banding for the measured house edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerHealth {
    LowEdge,
    Optimal,
    HighEdge,
}

impl LedgerHealth {
    pub fn from_edge(edge: f64) -> Self {
        if edge < LOW_EDGE_THRESHOLD {
            LedgerHealth::LowEdge
        } else if edge > HIGH_EDGE_THRESHOLD {
            LedgerHealth::HighEdge
        } else {
            LedgerHealth::Optimal
        }
    }
}

/// Edge and profitability analytics derived from the ledger totals.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LedgerAnalysis {
    pub house_edge: f64,
    pub net_profit: i64,
    pub total_collected: u64,
    pub total_paid: u64,
    pub health: LedgerHealth,
}

/// Per-rule aggregate reported after a batch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HtRuleMetrics {
    pub rule_id: &'static str,
    pub usage: u64,
    pub wins: u64,
    pub losses: u64,
    pub busts: u64,
    pub win_rate: f64,
    pub loss_rate: f64,
    pub bust_rate: f64,
    /// Empirical return per unit wagered, minus one
    pub calculated_ev: f64,
    pub exploitable: bool,
    pub enabled: bool,
}

/// Per-tube aggregate reported after a batch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TubeMetrics {
    pub tube: TubeType,
    pub avg_balance: f64,
    pub max_balance: u64,
    /// Initial funding plus every refill credited
    pub total_funded: u64,
    /// Total drained by qualifying wins
    pub total_paid: u64,
    /// Rounds that found this tube empty
    pub depletions: u64,
    pub depletion_frequency: f64,
    /// `total_paid / total_funded`, clamped to [0, 1]
    pub drain_rate: f64,
}

/// Snapshot of one simulated batch, consumed by the balancing engine.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationMetrics {
    pub rounds: u64,
    pub house_edge: f64,
    pub house_net_profit: i64,
    /// Aggregate player net over the batch (negative when the house wins)
    pub player_net: i64,
    /// Stddev of per-round house net, normalized by per-round ante intake
    pub volatility: f64,
    pub avg_tube_drain: f64,
    pub ht_rules: Vec<HtRuleMetrics>,
    pub tubes: Vec<TubeMetrics>,
}

/// Operator-supplied target state for the balancing loop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationObjective {
    pub target_edge: f64,
    pub edge_tolerance: f64,
    pub max_volatility: f64,
    pub max_exploit_ev: f64,
    pub learning_rate: f64,
    pub edge_weight: f64,
    pub volatility_weight: f64,
    pub drain_weight: f64,
    pub exploit_weight: f64,
}

impl Default for OptimizationObjective {
    fn default() -> Self {
        Self {
            target_edge: DEFAULT_TARGET_EDGE,
            edge_tolerance: DEFAULT_EDGE_TOLERANCE,
            max_volatility: DEFAULT_MAX_VOLATILITY,
            max_exploit_ev: DEFAULT_MAX_EXPLOIT_EV,
            learning_rate: DEFAULT_LEARNING_RATE,
            edge_weight: 10.0,
            volatility_weight: 5.0,
            drain_weight: 2.0,
            exploit_weight: 20.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Warning,
    Critical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    LowEdge,
    HighEdge,
    HighVolatility,
    ExploitableRule,
    TubeInstability,
}

/// Human-readable diagnostic produced by the balancer. Advisory only:
/// issues never halt simulation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BalanceIssue {
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    pub message: String,
}

/// Outcome of a balancing run: the best configuration found, its score,
/// and the diagnostics that remained.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub config: SimulationConfig,
    pub score: f64,
    pub iterations: u32,
    pub converged: bool,
    pub issues: Vec<BalanceIssue>,
    pub metrics: SimulationMetrics,
}

/// Distribution of measured house edge across independent repeated runs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MonteCarloSummary {
    pub runs: usize,
    pub rounds_per_run: u64,
    pub mean_edge: f64,
    /// Population variance
    pub variance: f64,
    pub std_dev: f64,
    pub min_edge: f64,
    pub max_edge: f64,
    /// Half-width of the 95% interval: `1.96 * stddev / sqrt(runs)`
    pub confidence_95: f64,
    pub stable: bool,
}

/// Required aggregate outputs for one batch, serializable for hosts.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatchReport {
    pub metrics: SimulationMetrics,
    pub analysis: LedgerAnalysis,
    pub monte_carlo: Option<MonteCarloSummary>,
}
