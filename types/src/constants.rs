/// Default number of seated players (dealer excluded)
pub const DEFAULT_PLAYERS: usize = 4;

/// Default ante contributed by every participant each round
pub const DEFAULT_ANTE: u64 = 5;

/// Default multiplier applied to the ante when an empty tube converts a win
/// into a bust
pub const DEFAULT_BUST_PENALTY_MULTIPLIER: f64 = 1.0;

/// Non-tube wins return stake plus an equal profit
pub const WIN_PAYOUT_MULTIPLIER: u64 = 2;

/// Default per-round tube refill amount
pub const DEFAULT_REFILL_AMOUNT: u64 = 2;

/// Ceiling the balancer never raises the refill amount above
pub const MAX_REFILL_AMOUNT: u64 = 5;

/// Balance at or below which a tube reports a stack trigger
pub const DEFAULT_AUTO_REFILL_THRESHOLD: u64 = 5;

/// Fill ratio above which bonus payout strategies scale up
pub const DEFAULT_BONUS_PAYOUT_THRESHOLD: f64 = 0.9;

/// Samples required before a rule's empirical EV is trusted
pub const EXPLOIT_USAGE_THRESHOLD: u64 = 100;

/// Iteration cap for the balancing loop
pub const MAX_OPTIMIZATION_ITERATIONS: u32 = 100;

/// Default number of independent Monte Carlo runs
pub const DEFAULT_MONTE_CARLO_RUNS: usize = 100;

/// Default rounds simulated per Monte Carlo run
pub const DEFAULT_ROUNDS_PER_RUN: u64 = 20_000;

/// z-score for the 95% confidence interval
pub const CONFIDENCE_Z: f64 = 1.96;

/// A configuration is "stable" when edge stddev across runs is below this
pub const STABLE_EDGE_STDDEV: f64 = 0.01;

/// House edge band: below this the house is underperforming
pub const LOW_EDGE_THRESHOLD: f64 = 0.03;

/// House edge band: above this players are being squeezed
pub const HIGH_EDGE_THRESHOLD: f64 = 0.07;

/// Severity escalates once the edge leaves these outer bounds
pub const CRITICAL_LOW_EDGE: f64 = 0.01;
pub const CRITICAL_HIGH_EDGE: f64 = 0.12;

/// Default balancing objective parameters
pub const DEFAULT_TARGET_EDGE: f64 = 0.05;
pub const DEFAULT_EDGE_TOLERANCE: f64 = 0.02;
pub const DEFAULT_MAX_VOLATILITY: f64 = 0.50;
pub const DEFAULT_MAX_EXPLOIT_EV: f64 = 0.02;
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// Tube drain-rate thresholds used by the balancer and issue reporting
pub const DRAIN_ADJUST_THRESHOLD: f64 = 0.3;
pub const DRAIN_WARN_THRESHOLD: f64 = 0.4;
pub const DRAIN_CRITICAL_THRESHOLD: f64 = 0.6;

/// Bust penalty multiplier clamp applied by the balancer
pub const MIN_BUST_PENALTY_MULTIPLIER: f64 = 0.5;
pub const MAX_BUST_PENALTY_MULTIPLIER: f64 = 2.0;
