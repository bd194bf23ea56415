//! Deterministic simulation core for the drawhouse five-card-draw variant.
//!
//! This crate contains the engine modules:
//! - `deck`: seeded RNG and deck handling
//! - `cards`: hand classification and comparison
//! - `holds`: the Hold-Type (HT) decision engine and rule registry
//! - `tubes`: the five shared reward pools and payout formulas
//! - `ledger`: house credit-flow accounting
//! - `round`: single-round resolution tying the above together
//!
//! Everything here is pure, single-threaded computation: no I/O, no async,
//! no wall clock. A run is a function of `(config, seed)`.

pub mod cards;
pub mod deck;
pub mod holds;
pub mod ledger;
pub mod round;
pub mod tubes;

#[cfg(test)]
mod tests;

use drawhouse_types::ConfigError;
use thiserror::Error;

pub use round::{RoundResult, SimulationRun};

/// Contract violations. These abort the current operation loudly; expected
/// game-state edge cases (an empty tube on a qualifying win) are handled
/// in-band and never surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("expected exactly 5 cards, got {0}")]
    InvalidHandSize(usize),
    #[error("duplicate rule priority {0}")]
    DuplicateRulePriority(u8),
    #[error("registry has no enabled unconditional rule at priority 0")]
    MissingFallbackRule,
    #[error("unknown rule id {0}")]
    UnknownRule(String),
    #[error("deck exhausted during draw")]
    DeckExhausted,
    #[error(transparent)]
    Config(#[from] ConfigError),
}
