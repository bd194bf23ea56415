use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    TubeType, DEFAULT_ANTE, DEFAULT_AUTO_REFILL_THRESHOLD, DEFAULT_BONUS_PAYOUT_THRESHOLD,
    DEFAULT_BUST_PENALTY_MULTIPLIER, DEFAULT_PLAYERS, DEFAULT_REFILL_AMOUNT,
};

/// Funding bounds for a single tube.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TubeConfig {
    pub initial: u64,
    pub max: u64,
}

/// Pluggable payout formula, selected by configuration.
///
/// Each variant is a pure function of `(current, initial, max)`. The engine
/// clamps the result to the tube's current balance; the formulas themselves
/// never inspect engine state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayoutStrategy {
    /// Always pays the tube's initial funding. Lowest volatility.
    Fixed,
    /// Pays `floor(current * rate)`, draining proportionally.
    Percentage { rate: f64 },
    /// Pays `floor(base + 2 * ln(current + 1))`, damping large balances.
    Logarithmic { base: f64 },
    /// Pays `floor(initial * m)` where `m` ramps above the fill threshold.
    /// Highest volatility: near-full tubes pay disproportionately.
    Progressive { threshold: f64 },
}

impl Default for PayoutStrategy {
    fn default() -> Self {
        PayoutStrategy::Percentage { rate: 0.25 }
    }
}

impl PayoutStrategy {
    pub fn calculate(&self, current: u64, initial: u64, max: u64) -> u64 {
        match self {
            PayoutStrategy::Fixed => initial,
            PayoutStrategy::Percentage { rate } => (current as f64 * rate).floor() as u64,
            PayoutStrategy::Logarithmic { base } => {
                if current == 0 {
                    0
                } else {
                    (base + 2.0 * ((current + 1) as f64).ln()).floor() as u64
                }
            }
            PayoutStrategy::Progressive { threshold } => {
                let fill = if max == 0 {
                    0.0
                } else {
                    current as f64 / max as f64
                };
                let multiplier = if fill <= *threshold {
                    1.0
                } else {
                    1.0 + 2.0 * (fill - threshold)
                };
                (initial as f64 * multiplier).floor() as u64
            }
        }
    }
}

/// Full configuration for one simulation run. Every field is overridable;
/// `Default` carries the documented table defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seated players, dealer excluded
    pub players: usize,
    /// Ante contributed by every participant including the dealer
    pub ante: u64,
    /// Whether the dealer draws replacement cards at all
    pub dealer_draws: bool,
    /// Whether a dealer left with only high card forfeits to every player
    pub dealer_busts: bool,
    /// Whether a tied showdown goes to the dealer
    pub dealer_wins_ties: bool,
    /// Probability the dealer follows its hold decision rather than
    /// standing pat, in [0, 1]
    pub dealer_aggression: f64,
    /// Penalty multiplier applied to the ante on an empty-tube bust
    pub bust_penalty_multiplier: f64,
    /// Funding bounds per tube, indexed by `TubeType as usize`
    pub tubes: [TubeConfig; 5],
    /// Payout formula used for every tube drain
    pub payout_strategy: PayoutStrategy,
    /// Whether the per-round refill pass runs
    pub refill_enabled: bool,
    /// Amount added to each under-max tube per round
    pub refill_amount: u64,
    /// Balance at or below which a tube reports a stack trigger
    pub auto_refill_threshold: u64,
    /// Fill ratio above which bonus-scaled strategies ramp up
    pub bonus_payout_threshold: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            players: DEFAULT_PLAYERS,
            ante: DEFAULT_ANTE,
            dealer_draws: true,
            dealer_busts: false,
            dealer_wins_ties: false,
            dealer_aggression: 0.5,
            bust_penalty_multiplier: DEFAULT_BUST_PENALTY_MULTIPLIER,
            tubes: [
                TubeConfig {
                    initial: 40,
                    max: 80,
                }, // ST
                TubeConfig {
                    initial: 35,
                    max: 70,
                }, // FL
                TubeConfig {
                    initial: 30,
                    max: 60,
                }, // FH
                TubeConfig {
                    initial: 25,
                    max: 50,
                }, // SF
                TubeConfig {
                    initial: 25,
                    max: 50,
                }, // RF
            ],
            payout_strategy: PayoutStrategy::default(),
            refill_enabled: true,
            refill_amount: DEFAULT_REFILL_AMOUNT,
            auto_refill_threshold: DEFAULT_AUTO_REFILL_THRESHOLD,
            bonus_payout_threshold: DEFAULT_BONUS_PAYOUT_THRESHOLD,
        }
    }
}

impl SimulationConfig {
    pub fn tube(&self, tube: TubeType) -> TubeConfig {
        self.tubes[tube as usize]
    }

    pub fn tube_mut(&mut self, tube: TubeType) -> &mut TubeConfig {
        &mut self.tubes[tube as usize]
    }

    /// Reject configurations the engine cannot run. Contract errors, not
    /// game conditions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players == 0 {
            return Err(ConfigError::NoPlayers);
        }
        // 5 cards each for players plus dealer, from one 52-card deck
        if (self.players + 1) * 10 > 52 {
            return Err(ConfigError::TooManyPlayers(self.players));
        }
        if self.ante == 0 {
            return Err(ConfigError::ZeroAnte);
        }
        if !(0.0..=1.0).contains(&self.dealer_aggression) {
            return Err(ConfigError::AggressionOutOfRange(self.dealer_aggression));
        }
        if self.bust_penalty_multiplier <= 0.0 {
            return Err(ConfigError::InvalidBustMultiplier(
                self.bust_penalty_multiplier,
            ));
        }
        for tube in TubeType::ALL {
            let cfg = self.tube(tube);
            if cfg.max == 0 || cfg.initial > cfg.max {
                return Err(ConfigError::InvalidTubeBounds {
                    tube,
                    initial: cfg.initial,
                    max: cfg.max,
                });
            }
        }
        match self.payout_strategy {
            PayoutStrategy::Percentage { rate } if !(0.0..=1.0).contains(&rate) || rate == 0.0 => {
                return Err(ConfigError::InvalidStrategyParameter(rate))
            }
            PayoutStrategy::Logarithmic { base } if base < 0.0 => {
                return Err(ConfigError::InvalidStrategyParameter(base))
            }
            PayoutStrategy::Progressive { threshold } if !(0.0..=1.0).contains(&threshold) => {
                return Err(ConfigError::InvalidStrategyParameter(threshold))
            }
            _ => {}
        }
        Ok(())
    }
}

/// Configuration rejection reasons.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("at least one player is required")]
    NoPlayers,
    #[error("{0} players plus a dealer cannot be dealt from a 52-card deck")]
    TooManyPlayers(usize),
    #[error("ante must be greater than zero")]
    ZeroAnte,
    #[error("dealer aggression {0} outside [0, 1]")]
    AggressionOutOfRange(f64),
    #[error("bust penalty multiplier {0} must be positive")]
    InvalidBustMultiplier(f64),
    #[error("tube {tube:?} bounds invalid: initial {initial}, max {max}")]
    InvalidTubeBounds {
        tube: TubeType,
        initial: u64,
        max: u64,
    },
    #[error("payout strategy parameter {0} out of range")]
    InvalidStrategyParameter(f64),
}
