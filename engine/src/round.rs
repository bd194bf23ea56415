//! Single-round resolution: deal, hold decisions, draw, showdown,
//! economy, ledger.
//!
//! A `SimulationRun` exclusively owns its registry, tube bank, and ledger;
//! nothing here is shared across runs. Round effects are applied
//! atomically: the full `ParticipantOutcome` set is computed against
//! working copies before any shared state mutates, so an abandoned round
//! can never leave the ledger or tubes half-applied.

use std::cmp::Ordering;

use drawhouse_types::{
    Event, EventKind, OutcomeKind, ParticipantOutcome, SimulationConfig, TubeType,
    WIN_PAYOUT_MULTIPLIER,
};

use crate::cards::{classify, compare_hands};
use crate::deck::GameRng;
use crate::holds::{HtDecision, HtRegistry};
use crate::ledger::HouseLedger;
use crate::tubes::{self, TubeBank, TubePayout};
use crate::EngineError;

/// Everything produced by one resolved round.
#[derive(Clone, Debug)]
pub struct RoundResult {
    pub round: u64,
    pub outcomes: Vec<ParticipantOutcome>,
    pub events: Vec<Event>,
}

/// Sequenced event collection for one round.
struct EventLog {
    round: u64,
    seq: u64,
    events: Vec<Event>,
}

impl EventLog {
    fn new(round: u64) -> Self {
        Self {
            round,
            seq: 0,
            events: Vec::new(),
        }
    }

    fn push(&mut self, kind: EventKind) {
        self.events.push(Event {
            round: self.round,
            seq: self.seq,
            kind,
        });
        self.seq += 1;
    }
}

/// One simulation run: a table configuration plus the state it owns.
pub struct SimulationRun {
    config: SimulationConfig,
    registry: HtRegistry,
    tubes: TubeBank,
    ledger: HouseLedger,
    seed: u64,
    round: u64,
}

impl SimulationRun {
    /// New run with the standard rule table.
    pub fn new(config: SimulationConfig, seed: u64) -> Result<Self, EngineError> {
        Self::with_registry(config, HtRegistry::standard(), seed)
    }

    /// New run with an explicit, caller-owned registry.
    pub fn with_registry(
        config: SimulationConfig,
        registry: HtRegistry,
        seed: u64,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let tubes = TubeBank::new(&config);
        Ok(Self {
            config,
            registry,
            tubes,
            ledger: HouseLedger::new(),
            seed,
            round: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn ledger(&self) -> &HouseLedger {
        &self.ledger
    }

    pub fn tubes(&self) -> &TubeBank {
        &self.tubes
    }

    pub fn registry(&self) -> &HtRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut HtRegistry {
        &mut self.registry
    }

    pub fn rounds_played(&self) -> u64 {
        self.round
    }

    /// Decompose the run into the state it owned.
    pub fn into_parts(self) -> (HouseLedger, TubeBank, HtRegistry) {
        (self.ledger, self.tubes, self.registry)
    }

    /// Play one full round: deal, hold decisions, draw, showdown,
    /// resolution, ledger, refill.
    pub fn play_round(&mut self) -> Result<RoundResult, EngineError> {
        let round = self.round + 1;
        let mut rng = GameRng::new(self.seed, round);
        let mut log = EventLog::new(round);

        let players = self.config.players;
        let participants = players + 1;
        let dealer_seat = players;
        log.push(EventKind::RoundStart { participants });

        // Players ante into the house. The dealer antes at the table but
        // the amount is a house-internal transfer and is never booked.
        let ante = self.config.ante;
        let ante_collected = ante * players as u64;
        log.push(EventKind::AnteCollected {
            amount: ante_collected,
            participants: players,
        });

        // Deal five cards to every seat from a single deck.
        let mut deck = rng.create_deck();
        let mut hands: Vec<[u8; 5]> = Vec::with_capacity(participants);
        for seat in 0..participants {
            let mut hand = [0u8; 5];
            for slot in &mut hand {
                *slot = rng.draw_card(&mut deck).ok_or(EngineError::DeckExhausted)?;
            }
            log.push(EventKind::CardsDealt { seat, cards: hand });
            hands.push(hand);
        }

        // Player hold decisions and draws.
        let mut decisions: Vec<HtDecision> = Vec::with_capacity(players);
        for seat in 0..players {
            let decision = self.registry.decide(&hands[seat])?;
            log.push(EventKind::HtDecided {
                seat,
                rule_id: decision.rule_id,
                holds: decision.hold_positions.clone(),
            });
            let drawn =
                draw_replacements(&mut hands[seat], &decision.hold_positions, &mut deck, &mut rng)?;
            log.push(EventKind::CardsDrawn { seat, drawn });
            decisions.push(decision);
        }

        // The dealer follows its own hold decision with probability
        // `dealer_aggression`, otherwise it stands pat.
        if self.config.dealer_draws && rng.next_f64() < self.config.dealer_aggression {
            let decision = self.registry.decide(&hands[dealer_seat])?;
            log.push(EventKind::HtDecided {
                seat: dealer_seat,
                rule_id: decision.rule_id,
                holds: decision.hold_positions.clone(),
            });
            let drawn = draw_replacements(
                &mut hands[dealer_seat],
                &decision.hold_positions,
                &mut deck,
                &mut rng,
            )?;
            log.push(EventKind::CardsDrawn {
                seat: dealer_seat,
                drawn,
            });
        }

        let dealer_class = classify(&hands[dealer_seat]);
        log.push(EventKind::HandsEvaluated {
            seat: dealer_seat,
            rank: dealer_class.rank,
        });
        let dealer_busted =
            self.config.dealer_busts && dealer_class.rank == drawhouse_types::HandRank::HighCard;

        // Resolution against working copies: tube balances advance locally
        // so a later seat sees an earlier seat's drain, but nothing shared
        // mutates until the full outcome set exists.
        let mut balances = self.tubes.balances();
        let mut outcomes: Vec<ParticipantOutcome> = Vec::with_capacity(players);
        let mut drains: Vec<(usize, TubeType, TubePayout)> = Vec::new();
        for seat in 0..players {
            let class = classify(&hands[seat]);
            log.push(EventKind::HandsEvaluated {
                seat,
                rank: class.rank,
            });
            let cmp = if dealer_busted {
                Ordering::Greater
            } else {
                compare_hands(&class, &dealer_class)
            };
            let (kind, payout, tube_payout, tube, bust_penalty) = match cmp {
                Ordering::Less => (OutcomeKind::Lose, 0, 0, None, 0),
                Ordering::Equal => {
                    if self.config.dealer_wins_ties {
                        (OutcomeKind::Lose, 0, 0, None, 0)
                    } else {
                        // Refund shaped like a payout; the outcome stays a tie.
                        (OutcomeKind::Tie, ante, 0, None, 0)
                    }
                }
                Ordering::Greater => {
                    if let Some(tube) = TubeType::from_hand_rank(class.rank) {
                        let cfg = self.config.tube(tube);
                        let result = tubes::payout(
                            balances[tube as usize],
                            cfg.initial,
                            cfg.max,
                            &self.config.payout_strategy,
                        );
                        balances[tube as usize] = result.new_balance;
                        drains.push((seat, tube, result));
                        if result.triggers_bust {
                            let penalty =
                                (ante as f64 * self.config.bust_penalty_multiplier).round() as u64;
                            (OutcomeKind::Bust, 0, 0, Some(tube), penalty)
                        } else {
                            (OutcomeKind::Win, 0, result.payout, Some(tube), 0)
                        }
                    } else {
                        (
                            OutcomeKind::Win,
                            ante * WIN_PAYOUT_MULTIPLIER,
                            0,
                            None,
                            0,
                        )
                    }
                }
            };
            log.push(EventKind::Showdown { seat, kind });
            outcomes.push(ParticipantOutcome {
                seat,
                kind,
                rule_id: decisions[seat].rule_id,
                hand_rank: class.rank,
                wagered: ante,
                payout,
                tube_payout,
                tube,
                bust_penalty,
            });
        }
        // Commit phase: tubes, then ledger, then strategy statistics.
        for (seat, tube, result) in &drains {
            self.tubes.apply_drain(*tube, result);
            if result.triggers_bust {
                log.push(EventKind::BustTriggered {
                    seat: *seat,
                    tube: *tube,
                    penalty: outcomes[*seat].bust_penalty,
                });
            } else {
                log.push(EventKind::TubeDrained {
                    tube: *tube,
                    amount: result.payout,
                    remaining: result.new_balance,
                });
            }
        }
        self.ledger.process_round_outcomes(ante_collected, &outcomes);
        for outcome in &outcomes {
            self.registry.record_outcome(
                outcome.rule_id,
                outcome.kind,
                outcome.wagered,
                outcome.total_returned(),
                outcome.tube.filter(|_| outcome.tube_payout > 0),
            )?;
        }

        // Refill pass and informational stack triggers.
        let (refills, triggers) = self.tubes.refill_pass(&self.config);
        for refill in refills {
            log.push(EventKind::TubeRefilled {
                tube: refill.tube,
                amount: refill.added,
                balance: refill.balance,
            });
        }
        for tube in triggers {
            log.push(EventKind::StackTrigger {
                tube,
                balance: self.tubes.tube(tube).balance,
            });
        }
        self.tubes.sample_balances();

        let house_net = self.ledger.round_net_history().last().copied().unwrap_or(0);
        log.push(EventKind::RoundComplete { house_net });

        self.round = round;
        Ok(RoundResult {
            round,
            outcomes,
            events: log.events,
        })
    }
}

/// Replace every non-held card from the deck. Returns how many were drawn.
fn draw_replacements(
    hand: &mut [u8; 5],
    holds: &[usize],
    deck: &mut Vec<u8>,
    rng: &mut GameRng,
) -> Result<usize, EngineError> {
    let mut drawn = 0;
    for i in 0..5 {
        if !holds.contains(&i) {
            hand[i] = rng.draw_card(deck).ok_or(EngineError::DeckExhausted)?;
            drawn += 1;
        }
    }
    Ok(drawn)
}
