//! The five shared reward pools and their payout/refill economics.
//!
//! A tube never pays more than it holds, and an empty tube converts the
//! qualifying win into a bust event for the participant. The payout
//! formulas themselves live on `PayoutStrategy` in the types crate; this
//! module applies the clamp and tracks funding statistics.

use drawhouse_types::{PayoutStrategy, SimulationConfig, TubeMetrics, TubeType};

/// One reward pool. `0 <= balance <= max` always.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tube {
    pub tube_type: TubeType,
    pub balance: u64,
    pub initial: u64,
    pub max: u64,
}

impl Tube {
    pub fn is_empty(&self) -> bool {
        self.balance == 0
    }
}

/// Result of one payout request against a tube.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TubePayout {
    pub payout: u64,
    pub new_balance: u64,
    pub was_empty: bool,
    pub triggers_bust: bool,
}

/// Pure payout computation: strategy output clamped to the balance, or a
/// bust conversion when the tube is already empty.
pub fn payout(balance: u64, initial: u64, max: u64, strategy: &PayoutStrategy) -> TubePayout {
    if balance == 0 {
        return TubePayout {
            payout: 0,
            new_balance: 0,
            was_empty: true,
            triggers_bust: true,
        };
    }
    let raw = strategy.calculate(balance, initial, max);
    let actual = raw.min(balance);
    TubePayout {
        payout: actual,
        new_balance: balance - actual,
        was_empty: false,
        triggers_bust: false,
    }
}

/// A refill applied to one tube during the round-end pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Refill {
    pub tube: TubeType,
    pub added: u64,
    pub balance: u64,
}

/// All five tubes plus the funding statistics reported per batch.
pub struct TubeBank {
    tubes: [Tube; 5],
    total_funded: [u64; 5],
    total_paid: [u64; 5],
    depletions: [u64; 5],
    max_seen: [u64; 5],
    balance_samples: [u128; 5],
    samples: u64,
}

impl TubeBank {
    pub fn new(config: &SimulationConfig) -> Self {
        let tubes = TubeType::ALL.map(|tube_type| {
            let cfg = config.tube(tube_type);
            Tube {
                tube_type,
                balance: cfg.initial,
                initial: cfg.initial,
                max: cfg.max,
            }
        });
        let total_funded = TubeType::ALL.map(|t| config.tube(t).initial);
        let max_seen = total_funded;
        Self {
            tubes,
            total_funded,
            total_paid: [0; 5],
            depletions: [0; 5],
            max_seen,
            balance_samples: [0; 5],
            samples: 0,
        }
    }

    pub fn tube(&self, tube: TubeType) -> &Tube {
        &self.tubes[tube as usize]
    }

    pub fn balances(&self) -> [u64; 5] {
        self.tubes.map(|t| t.balance)
    }

    /// Apply a committed drain computed during round resolution.
    /// `was_empty` drains carry no payout but count as depletions.
    pub fn apply_drain(&mut self, tube: TubeType, result: &TubePayout) {
        let idx = tube as usize;
        if result.was_empty {
            self.depletions[idx] += 1;
            return;
        }
        debug_assert!(result.payout <= self.tubes[idx].balance);
        self.tubes[idx].balance = result.new_balance;
        self.total_paid[idx] += result.payout;
    }

    /// Round-end refill pass. Returns the refills applied and the tubes
    /// whose balance sits at or below the stack-trigger threshold. The
    /// trigger is informational and independent of whether a refill ran.
    pub fn refill_pass(&mut self, config: &SimulationConfig) -> (Vec<Refill>, Vec<TubeType>) {
        let mut refills = Vec::new();
        let mut triggers = Vec::new();
        for tube in TubeType::ALL {
            let idx = tube as usize;
            if config.refill_enabled && self.tubes[idx].balance < self.tubes[idx].max {
                let added =
                    config.refill_amount.min(self.tubes[idx].max - self.tubes[idx].balance);
                if added > 0 {
                    self.tubes[idx].balance += added;
                    self.total_funded[idx] += added;
                    refills.push(Refill {
                        tube,
                        added,
                        balance: self.tubes[idx].balance,
                    });
                }
            }
            if self.tubes[idx].balance <= config.auto_refill_threshold {
                triggers.push(tube);
            }
        }
        (refills, triggers)
    }

    /// Record one per-round balance sample for the avg/max report columns.
    pub fn sample_balances(&mut self) {
        for (idx, tube) in self.tubes.iter().enumerate() {
            self.balance_samples[idx] += tube.balance as u128;
            self.max_seen[idx] = self.max_seen[idx].max(tube.balance);
        }
        self.samples += 1;
    }

    /// Per-tube aggregates for the batch report.
    pub fn metrics(&self, rounds: u64) -> Vec<TubeMetrics> {
        TubeType::ALL
            .iter()
            .map(|&tube| {
                let idx = tube as usize;
                let avg_balance = if self.samples == 0 {
                    self.tubes[idx].balance as f64
                } else {
                    self.balance_samples[idx] as f64 / self.samples as f64
                };
                let drain_rate = if self.total_funded[idx] == 0 {
                    0.0
                } else {
                    (self.total_paid[idx] as f64 / self.total_funded[idx] as f64).clamp(0.0, 1.0)
                };
                TubeMetrics {
                    tube,
                    avg_balance,
                    max_balance: self.max_seen[idx],
                    total_funded: self.total_funded[idx],
                    total_paid: self.total_paid[idx],
                    depletions: self.depletions[idx],
                    depletion_frequency: if rounds == 0 {
                        0.0
                    } else {
                        self.depletions[idx] as f64 / rounds as f64
                    },
                    drain_rate,
                }
            })
            .collect()
    }

    /// Average drain rate across all five tubes.
    pub fn avg_drain_rate(&self) -> f64 {
        let metrics = self.metrics(self.samples.max(1));
        metrics.iter().map(|m| m.drain_rate).sum::<f64>() / metrics.len() as f64
    }
}
