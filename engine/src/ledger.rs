//! House ledger: the running accumulator of all credit flows.
//!
//! Four mutation entry points, each appending to its history and
//! recomputing `net_profit` so the derived total can never drift from the
//! recorded flows.

use drawhouse_types::{LedgerAnalysis, LedgerHealth, ParticipantOutcome};

#[derive(Clone, Debug, Default)]
pub struct HouseLedger {
    total_ante: u64,
    total_payouts: u64,
    total_tube_payouts: u64,
    total_bust_penalties: u64,
    ante_history: Vec<u64>,
    payout_history: Vec<u64>,
    bust_history: Vec<u64>,
    /// Per-round house net, appended once per processed round
    round_net_history: Vec<i64>,
    net_profit: i64,
    rounds: u64,
}

impl HouseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn recompute_net(&mut self) {
        self.net_profit = self.total_ante as i64 + self.total_bust_penalties as i64
            - self.total_payouts as i64;
    }

    pub fn record_ante(&mut self, amount: u64) {
        self.total_ante += amount;
        self.ante_history.push(amount);
        self.recompute_net();
    }

    pub fn record_payout(&mut self, amount: u64) {
        self.total_payouts += amount;
        self.payout_history.push(amount);
        self.recompute_net();
    }

    /// Tube payouts count as payouts for the edge formula but are also
    /// totaled separately.
    pub fn record_tube_payout(&mut self, amount: u64) {
        self.total_tube_payouts += amount;
        self.total_payouts += amount;
        self.payout_history.push(amount);
        self.recompute_net();
    }

    pub fn record_bust_penalty(&mut self, amount: u64) {
        self.total_bust_penalties += amount;
        self.bust_history.push(amount);
        self.recompute_net();
    }

    /// Fold one fully resolved round into the ledger: ante intake first,
    /// then tube payouts, then bust penalties, then non-tube payouts, then
    /// the round counter. The order fixes history ordering only; the
    /// totals are associative sums.
    pub fn process_round_outcomes(&mut self, ante_collected: u64, outcomes: &[ParticipantOutcome]) {
        let net_before = self.net_profit;
        self.record_ante(ante_collected);
        for outcome in outcomes {
            if outcome.tube_payout > 0 {
                self.record_tube_payout(outcome.tube_payout);
            }
        }
        for outcome in outcomes {
            if outcome.bust_penalty > 0 {
                self.record_bust_penalty(outcome.bust_penalty);
            }
        }
        for outcome in outcomes {
            if outcome.payout > 0 {
                self.record_payout(outcome.payout);
            }
        }
        self.rounds += 1;
        self.round_net_history.push(self.net_profit - net_before);
    }

    pub fn total_ante(&self) -> u64 {
        self.total_ante
    }

    pub fn total_payouts(&self) -> u64 {
        self.total_payouts
    }

    pub fn total_tube_payouts(&self) -> u64 {
        self.total_tube_payouts
    }

    pub fn total_bust_penalties(&self) -> u64 {
        self.total_bust_penalties
    }

    pub fn net_profit(&self) -> i64 {
        self.net_profit
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    pub fn round_net_history(&self) -> &[i64] {
        &self.round_net_history
    }

    /// Edge and profitability analytics.
    ///
    /// `house_edge = (ante + bust - payouts) / (ante + bust)`, defined as 0
    /// when nothing has been collected.
    pub fn analyze(&self) -> LedgerAnalysis {
        let collected = self.total_ante + self.total_bust_penalties;
        let house_edge = if collected == 0 {
            0.0
        } else {
            self.net_profit as f64 / collected as f64
        };
        LedgerAnalysis {
            house_edge,
            net_profit: self.net_profit,
            total_collected: collected,
            total_paid: self.total_payouts,
            health: LedgerHealth::from_edge(house_edge),
        }
    }
}
