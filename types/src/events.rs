use serde::Serialize;

use crate::{HandRank, OutcomeKind, TubeType};

/// Notification emitted by the round engine for an observing host.
///
/// Events are pure notifications: observers may not mutate engine state.
/// The core has no wall clock, so ordering is carried by the round number
/// plus a per-round sequence number.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Event {
    pub round: u64,
    pub seq: u64,
    pub kind: EventKind,
}

/// Structured event payloads, one per observable phase of a round.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    RoundStart {
        participants: usize,
    },
    AnteCollected {
        amount: u64,
        participants: usize,
    },
    CardsDealt {
        seat: usize,
        cards: [u8; 5],
    },
    HtDecided {
        seat: usize,
        rule_id: &'static str,
        holds: Vec<usize>,
    },
    CardsDrawn {
        seat: usize,
        drawn: usize,
    },
    HandsEvaluated {
        seat: usize,
        rank: HandRank,
    },
    Showdown {
        seat: usize,
        kind: OutcomeKind,
    },
    TubeDrained {
        tube: TubeType,
        amount: u64,
        remaining: u64,
    },
    TubeRefilled {
        tube: TubeType,
        amount: u64,
        balance: u64,
    },
    BustTriggered {
        seat: usize,
        tube: TubeType,
        penalty: u64,
    },
    StackTrigger {
        tube: TubeType,
        balance: u64,
    },
    RoundComplete {
        house_net: i64,
    },
}
