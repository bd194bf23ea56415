//! The Hold-Type (HT) decision engine.
//!
//! An `HtRegistry` is an ordered table of strategy rules. Given a dealt
//! 5-card hand it deterministically selects exactly one rule and returns
//! which positions to hold. Matchers are data (`RuleKind`), not closures,
//! so the table is inspectable and serializable.
//!
//! The registry is a plain value owned by its simulation run; there is no
//! shared global table. Monte Carlo workers each construct their own.

use serde::Serialize;
use tracing::warn;

use drawhouse_types::{HandRank, OutcomeKind, TubeType, EXPLOIT_USAGE_THRESHOLD};

use crate::cards::{self, HandClass};
use crate::EngineError;

/// Strategy intent bands, highest-value first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    MadeHand,
    StrongDraw,
    MediumDraw,
    HighCard,
    Fallback,
}

/// Data-encoded matcher: evaluated against `(hand, classification)` to
/// either a set of positions to hold or "does not apply".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Hold all five when the hand classifies exactly as this rank
    MadeHand(HandRank),
    /// Hold four cards of one suit
    FlushDraw,
    /// Hold four cards within a five-value window
    StraightDraw,
    /// Hold the triplet of a three-of-a-kind hand
    HoldTriplet,
    /// Hold both pairs of a two-pair hand
    HoldTwoPair,
    /// Hold the pair of a one-pair hand
    HoldPair,
    /// Hold a lone ace or king in an otherwise unclassified hand
    HoldHighCard,
    /// Hold nothing; always matches
    DrawAll,
}

impl RuleKind {
    fn matches(&self, cards: &[u8; 5], class: &HandClass) -> Option<Vec<usize>> {
        match self {
            RuleKind::MadeHand(rank) => (class.rank == *rank).then(|| (0..5).collect()),
            RuleKind::FlushDraw => cards::four_to_flush(cards),
            RuleKind::StraightDraw => cards::four_to_straight(cards),
            RuleKind::HoldTriplet => {
                (class.rank == HandRank::ThreeOfAKind).then(|| positions_with_count(cards, 3))
            }
            RuleKind::HoldTwoPair => {
                (class.rank == HandRank::TwoPair).then(|| positions_with_count(cards, 2))
            }
            RuleKind::HoldPair => {
                (class.rank == HandRank::Pair).then(|| positions_with_count(cards, 2))
            }
            RuleKind::HoldHighCard => {
                if class.rank != HandRank::HighCard {
                    return None;
                }
                // Ace outranks king when both are present.
                for value in [1u8, 13] {
                    if let Some(pos) = (0..5).find(|&i| cards::card_rank(cards[i]) == value) {
                        return Some(vec![pos]);
                    }
                }
                None
            }
            RuleKind::DrawAll => Some(Vec::new()),
        }
    }
}

/// Positions of every card whose rank occurs exactly `count` times.
fn positions_with_count(cards: &[u8; 5], count: u8) -> Vec<usize> {
    let mut rank_counts = [0u8; 14];
    for &card in cards {
        rank_counts[cards::card_rank(card) as usize] += 1;
    }
    (0..5)
        .filter(|&i| rank_counts[cards::card_rank(cards[i]) as usize] == count)
        .collect()
}

/// A named, prioritized strategy rule.
///
/// Registered once at engine initialization; only `enabled` changes
/// afterwards (exploit mitigation may clear it).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HtRule {
    pub id: &'static str,
    /// Unique; higher priorities are evaluated first
    pub priority: u8,
    pub category: RuleCategory,
    /// Whether this rule's target rank can route through an empty tube
    pub bust_risk: bool,
    pub theoretical_ev: f64,
    pub enabled: bool,
    pub kind: RuleKind,
}

/// Per-rule running counters, mutated exactly once per resolved
/// participant outcome.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HtStats {
    pub usage: u64,
    pub wins: u64,
    pub losses: u64,
    pub busts: u64,
    pub total_wagered: u64,
    pub total_returned: u64,
    /// Hits per tube, indexed by `TubeType as usize`
    pub tube_hits: [u64; 5],
}

impl HtStats {
    /// Empirical return per unit wagered, minus one. Zero before any wager.
    pub fn calculated_ev(&self) -> f64 {
        if self.total_wagered == 0 {
            0.0
        } else {
            self.total_returned as f64 / self.total_wagered as f64 - 1.0
        }
    }
}

/// The decision returned for one dealt hand.
#[derive(Clone, Debug, PartialEq)]
pub struct HtDecision {
    pub rule_id: &'static str,
    pub hold_positions: Vec<usize>,
    pub expected_value: f64,
    pub bust_potential: bool,
}

/// A rule flagged by the exploit query.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ExploitFlag {
    pub rule_id: &'static str,
    pub calculated_ev: f64,
    pub usage: u64,
}

/// Ordered rule table plus its running statistics.
#[derive(Clone, Debug)]
pub struct HtRegistry {
    /// Sorted by descending priority at construction
    rules: Vec<HtRule>,
    stats: Vec<HtStats>,
}

impl HtRegistry {
    /// Build a registry from an explicit rule set.
    ///
    /// Duplicate priorities are a configuration error: registration order
    /// must never decide a tie. A registry without an enabled priority-0
    /// unconditional rule cannot guarantee totality and is rejected.
    pub fn new(mut rules: Vec<HtRule>) -> Result<Self, EngineError> {
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        for pair in rules.windows(2) {
            if pair[0].priority == pair[1].priority {
                return Err(EngineError::DuplicateRulePriority(pair[0].priority));
            }
        }
        let has_fallback = rules
            .iter()
            .any(|r| r.enabled && r.priority == 0 && r.kind == RuleKind::DrawAll);
        if !has_fallback {
            return Err(EngineError::MissingFallbackRule);
        }
        let stats = vec![HtStats::default(); rules.len()];
        Ok(Self { rules, stats })
    }

    /// The standard five-card-draw rule table.
    pub fn standard() -> Self {
        let rule = |id, priority, category, bust_risk, theoretical_ev, kind| HtRule {
            id,
            priority,
            category,
            bust_risk,
            theoretical_ev,
            enabled: true,
            kind,
        };
        let rules = vec![
            rule(
                "H5.RF",
                100,
                RuleCategory::MadeHand,
                true,
                4.0,
                RuleKind::MadeHand(HandRank::RoyalFlush),
            ),
            rule(
                "H5.SF",
                95,
                RuleCategory::MadeHand,
                true,
                3.0,
                RuleKind::MadeHand(HandRank::StraightFlush),
            ),
            rule(
                "H5.4K",
                90,
                RuleCategory::MadeHand,
                false,
                1.0,
                RuleKind::MadeHand(HandRank::FourOfAKind),
            ),
            rule(
                "H5.FH",
                85,
                RuleCategory::MadeHand,
                true,
                0.9,
                RuleKind::MadeHand(HandRank::FullHouse),
            ),
            rule(
                "H5.FL",
                80,
                RuleCategory::MadeHand,
                true,
                0.8,
                RuleKind::MadeHand(HandRank::Flush),
            ),
            rule(
                "H5.ST",
                75,
                RuleCategory::MadeHand,
                true,
                0.7,
                RuleKind::MadeHand(HandRank::Straight),
            ),
            rule(
                "H4.FD",
                60,
                RuleCategory::StrongDraw,
                true,
                -0.10,
                RuleKind::FlushDraw,
            ),
            rule(
                "H4.SD",
                55,
                RuleCategory::StrongDraw,
                true,
                -0.20,
                RuleKind::StraightDraw,
            ),
            rule(
                "H3.TK",
                50,
                RuleCategory::MediumDraw,
                false,
                0.35,
                RuleKind::HoldTriplet,
            ),
            rule(
                "H2.2P",
                40,
                RuleCategory::MediumDraw,
                false,
                0.20,
                RuleKind::HoldTwoPair,
            ),
            rule(
                "H2.PR",
                35,
                RuleCategory::MediumDraw,
                false,
                -0.05,
                RuleKind::HoldPair,
            ),
            rule(
                "H1.HC",
                20,
                RuleCategory::HighCard,
                false,
                -0.35,
                RuleKind::HoldHighCard,
            ),
            rule(
                "H0.DA",
                0,
                RuleCategory::Fallback,
                false,
                -0.50,
                RuleKind::DrawAll,
            ),
        ];
        Self::new(rules).expect("standard rule table is valid")
    }

    /// Select the hold decision for a dealt hand.
    ///
    /// Errors only on contract violations: a slice that is not exactly 5
    /// cards, or a registry whose fallback has been removed. Never errors
    /// on any actual 5-card hand.
    pub fn decide(&self, hand: &[u8]) -> Result<HtDecision, EngineError> {
        let cards: &[u8; 5] = hand
            .try_into()
            .map_err(|_| EngineError::InvalidHandSize(hand.len()))?;
        let class = cards::classify(cards);
        for rule in &self.rules {
            if !rule.enabled {
                continue;
            }
            if let Some(hold_positions) = rule.kind.matches(cards, &class) {
                return Ok(HtDecision {
                    rule_id: rule.id,
                    hold_positions,
                    expected_value: rule.theoretical_ev,
                    bust_potential: rule.bust_risk,
                });
            }
        }
        Err(EngineError::MissingFallbackRule)
    }

    /// Fold one resolved participant outcome into the rule's statistics.
    /// The only mutation path for strategy statistics; callers invoke it
    /// exactly once per resolved participant per round.
    pub fn record_outcome(
        &mut self,
        rule_id: &str,
        outcome: OutcomeKind,
        wagered: u64,
        returned: u64,
        tube_hit: Option<TubeType>,
    ) -> Result<(), EngineError> {
        let idx = self
            .rules
            .iter()
            .position(|r| r.id == rule_id)
            .ok_or_else(|| EngineError::UnknownRule(rule_id.to_string()))?;
        let stats = &mut self.stats[idx];
        stats.usage += 1;
        match outcome {
            // A tie refund is win-shaped at the stats layer.
            OutcomeKind::Win | OutcomeKind::Tie => stats.wins += 1,
            OutcomeKind::Lose => stats.losses += 1,
            OutcomeKind::Bust => stats.busts += 1,
        }
        stats.total_wagered += wagered;
        stats.total_returned += returned;
        if let Some(tube) = tube_hit {
            stats.tube_hits[tube as usize] += 1;
        }
        Ok(())
    }

    /// Rules whose sample size exceeds the usage threshold and whose
    /// empirical EV exceeds `max_ev`. Read-only.
    pub fn exploitable_hts(&self, max_ev: f64) -> Vec<ExploitFlag> {
        self.rules
            .iter()
            .zip(&self.stats)
            .filter(|(_, stats)| stats.usage > EXPLOIT_USAGE_THRESHOLD)
            .filter(|(_, stats)| stats.calculated_ev() > max_ev)
            .map(|(rule, stats)| ExploitFlag {
                rule_id: rule.id,
                calculated_ev: stats.calculated_ev(),
                usage: stats.usage,
            })
            .collect()
    }

    /// Toggle a rule. Disabling is how exploit mitigation throttles a
    /// strategy; the priority-0 fallback is refused to preserve totality.
    pub fn set_enabled(&mut self, rule_id: &str, enabled: bool) -> Result<(), EngineError> {
        let idx = self
            .rules
            .iter()
            .position(|r| r.id == rule_id)
            .ok_or_else(|| EngineError::UnknownRule(rule_id.to_string()))?;
        if !enabled && self.rules[idx].kind == RuleKind::DrawAll {
            warn!(rule_id, "refusing to disable the fallback rule");
            return Ok(());
        }
        if !enabled && self.rules[idx].enabled {
            warn!(rule_id, "hold rule disabled");
        }
        self.rules[idx].enabled = enabled;
        Ok(())
    }

    pub fn is_enabled(&self, rule_id: &str) -> bool {
        self.rules
            .iter()
            .any(|r| r.id == rule_id && r.enabled)
    }

    /// Rules paired with their statistics, in priority order.
    pub fn entries(&self) -> impl Iterator<Item = (&HtRule, &HtStats)> {
        self.rules.iter().zip(&self.stats)
    }

    pub fn rules(&self) -> &[HtRule] {
        &self.rules
    }

    /// Clone of the current statistics, in priority order.
    pub fn stats_snapshot(&self) -> Vec<HtStats> {
        self.stats.clone()
    }

    /// Explicit reset; statistics never decrement otherwise.
    pub fn reset_stats(&mut self) {
        for stats in &mut self.stats {
            *stats = HtStats::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_rejects_wrong_card_count() {
        let registry = HtRegistry::standard();
        assert!(matches!(
            registry.decide(&[0, 1, 2, 3]),
            Err(EngineError::InvalidHandSize(4))
        ));
        assert!(matches!(
            registry.decide(&[0, 1, 2, 3, 4, 5]),
            Err(EngineError::InvalidHandSize(6))
        ));
    }

    #[test]
    fn test_totality_over_sampled_hands() {
        let registry = HtRegistry::standard();
        // A structured sweep: every 5-card window of every rotation of the
        // deck ordering, plus a few adversarial shapes.
        for offset in 0..52u8 {
            let hand: Vec<u8> = (0..5).map(|i| (offset + i * 7) % 52).collect();
            let mut dedup = hand.clone();
            dedup.sort_unstable();
            dedup.dedup();
            if dedup.len() < 5 {
                continue;
            }
            registry.decide(&hand).expect("every hand gets a decision");
        }
    }

    #[test]
    fn test_royal_flush_selects_h5_rf() {
        let registry = HtRegistry::standard();
        let decision = registry.decide(&[9, 10, 11, 12, 0]).unwrap();
        assert_eq!(decision.rule_id, "H5.RF");
        assert_eq!(decision.hold_positions, vec![0, 1, 2, 3, 4]);
        assert!(decision.bust_potential);
    }

    #[test]
    fn test_made_flush_outranks_draw_rules() {
        // A flush that is also a 4-card straight-draw superset must select
        // the made-hand rule, never a draw.
        let cards = [4, 5, 6, 7, 11]; // 5-6-7-8-Q of spades
        let registry = HtRegistry::standard();
        let decision = registry.decide(&cards).unwrap();
        assert_eq!(decision.rule_id, "H5.FL");
        assert_eq!(decision.hold_positions, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_flush_draw_selected_over_pair() {
        // Pair of fives with four spades: the draw band outranks pairs.
        let cards = [4, 17, 6, 8, 10]; // 5s-5h-7s-9s-Js
        let registry = HtRegistry::standard();
        let decision = registry.decide(&cards).unwrap();
        assert_eq!(decision.rule_id, "H4.FD");
        assert_eq!(decision.hold_positions, vec![0, 2, 3, 4]);
    }

    #[test]
    fn test_triplet_hold() {
        let registry = HtRegistry::standard();
        let decision = registry.decide(&[0, 13, 26, 1, 2]).unwrap(); // A-A-A-2-3
        assert_eq!(decision.rule_id, "H3.TK");
        assert_eq!(decision.hold_positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_two_pair_holds_both_pairs() {
        let registry = HtRegistry::standard();
        let decision = registry.decide(&[0, 13, 1, 14, 2]).unwrap(); // A-A-2-2-3
        assert_eq!(decision.rule_id, "H2.2P");
        assert_eq!(decision.hold_positions, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_lone_ace_held() {
        let registry = HtRegistry::standard();
        // A-3-5-7-9 mixed suits, no draw: hold the ace only.
        let decision = registry.decide(&[0, 15, 4, 32, 9]).unwrap();
        assert_eq!(decision.rule_id, "H1.HC");
        assert_eq!(decision.hold_positions, vec![0]);
    }

    #[test]
    fn test_fallback_draws_all() {
        let registry = HtRegistry::standard();
        // 2-4-7-9-J mixed suits: nothing to hold.
        let decision = registry.decide(&[1, 16, 6, 34, 23]).unwrap();
        assert_eq!(decision.rule_id, "H0.DA");
        assert!(decision.hold_positions.is_empty());
    }

    #[test]
    fn test_duplicate_priority_rejected() {
        let mut rules = HtRegistry::standard().rules().to_vec();
        rules[1].priority = rules[0].priority;
        assert!(matches!(
            HtRegistry::new(rules),
            Err(EngineError::DuplicateRulePriority(_))
        ));
    }

    #[test]
    fn test_registry_requires_fallback() {
        let rules: Vec<HtRule> = HtRegistry::standard()
            .rules()
            .iter()
            .filter(|r| r.kind != RuleKind::DrawAll)
            .cloned()
            .collect();
        assert!(matches!(
            HtRegistry::new(rules),
            Err(EngineError::MissingFallbackRule)
        ));
    }

    #[test]
    fn test_disabled_rule_skipped() {
        let mut registry = HtRegistry::standard();
        registry.set_enabled("H3.TK", false).unwrap();
        // Pair rules require an exact pair classification, so a trips hand
        // falls through to the fallback.
        let decision = registry.decide(&[0, 13, 26, 1, 2]).unwrap();
        assert_eq!(decision.rule_id, "H0.DA");
    }

    #[test]
    fn test_fallback_cannot_be_disabled() {
        let mut registry = HtRegistry::standard();
        registry.set_enabled("H0.DA", false).unwrap();
        assert!(registry.is_enabled("H0.DA"));
    }

    #[test]
    fn test_record_outcome_accumulates() {
        let mut registry = HtRegistry::standard();
        registry
            .record_outcome(
                "H2.PR",
                OutcomeKind::Win,
                5,
                10,
                None,
            )
            .unwrap();
        registry
            .record_outcome("H2.PR", OutcomeKind::Lose, 5, 0, None)
            .unwrap();
        registry
            .record_outcome("H2.PR", OutcomeKind::Tie, 5, 5, None)
            .unwrap();
        let (_, stats) = registry
            .entries()
            .find(|(r, _)| r.id == "H2.PR")
            .unwrap();
        assert_eq!(stats.usage, 3);
        // Ties count as wins at the stats layer.
        assert_eq!(stats.wins, 2);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.total_wagered, 15);
        assert_eq!(stats.total_returned, 15);
        assert!((stats.calculated_ev() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_rule_is_loud() {
        let mut registry = HtRegistry::standard();
        assert!(matches!(
            registry.record_outcome("H9.XX", OutcomeKind::Win, 5, 10, None),
            Err(EngineError::UnknownRule(_))
        ));
    }

    #[test]
    fn test_exploitable_requires_sample_size() {
        let mut registry = HtRegistry::standard();
        // 50 uses at EV +0.5: above the ceiling but under the sample bar.
        for _ in 0..50 {
            registry
                .record_outcome("H1.HC", OutcomeKind::Win, 10, 15, None)
                .unwrap();
        }
        assert!(registry.exploitable_hts(0.02).is_empty());
        // 51 more pushes usage past the threshold.
        for _ in 0..51 {
            registry
                .record_outcome("H1.HC", OutcomeKind::Win, 10, 15, None)
                .unwrap();
        }
        let flags = registry.exploitable_hts(0.02);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].rule_id, "H1.HC");
        assert!((flags[0].calculated_ev - 0.5).abs() < 1e-9);
    }
}
