//! Seeded RNG and deck handling.
//!
//! Cards are `0..52`: `suit = card / 13`, `rank = card % 13 + 1` (ace = 1).
//! Every round derives its own RNG stream from the run seed and round
//! number, so a whole run replays exactly from `(config, seed)`.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic random number generator for one round.
#[derive(Clone)]
pub struct GameRng {
    inner: ChaCha8Rng,
}

impl GameRng {
    /// Create the RNG for `round` of the run identified by `seed`.
    pub fn new(seed: u64, round: u64) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(seed);
        inner.set_stream(round);
        Self { inner }
    }

    /// Uniform value in `[0, max)`.
    pub fn next_bounded(&mut self, max: usize) -> usize {
        self.inner.gen_range(0..max)
    }

    /// Uniform value in `[0.0, 1.0)`.
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Create a shuffled deck of 52 cards.
    pub fn create_deck(&mut self) -> Vec<u8> {
        let mut deck: Vec<u8> = (0..52).collect();
        deck.shuffle(&mut self.inner);
        deck
    }

    /// Draw a card from the deck without replacement.
    pub fn draw_card(&mut self, deck: &mut Vec<u8>) -> Option<u8> {
        if deck.is_empty() {
            return None;
        }
        let idx = self.next_bounded(deck.len());
        Some(deck.swap_remove(idx))
    }
}
