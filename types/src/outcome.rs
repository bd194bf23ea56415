use serde::Serialize;

use crate::{HandRank, TubeType};

/// How one participant's round resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Win,
    Lose,
    Tie,
    Bust,
}

/// Immutable record of one participant's result for one round.
///
/// Produced once per active participant after resolution and appended to
/// round history; never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParticipantOutcome {
    /// Seat index, 0-based (the dealer has no outcome record)
    pub seat: usize,
    pub kind: OutcomeKind,
    /// The hold rule that drove this participant's draw
    pub rule_id: &'static str,
    /// Final hand rank after the draw
    pub hand_rank: HandRank,
    /// Ante wagered this round
    pub wagered: u64,
    /// Non-tube payout from the house (stake included)
    pub payout: u64,
    /// Payout drained from a tube, if the win qualified
    pub tube_payout: u64,
    /// Which tube paid, when `tube_payout > 0` or the bust came from one
    pub tube: Option<TubeType>,
    /// Penalty debited when an empty tube converted the win to a bust
    pub bust_penalty: u64,
}

impl ParticipantOutcome {
    /// Total credits returned to the participant this round.
    pub fn total_returned(&self) -> u64 {
        self.payout.saturating_add(self.tube_payout)
    }
}
