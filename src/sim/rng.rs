//! Random outcome generator
//!
//! Holds one raw draw per reel. The game loop refreshes every draw on every
//! frame, whatever the phase, so the outcome captured when a spin starts
//! depends on exactly which frame the player pressed the button.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::symbols::Symbol;
use crate::consts::{RAW_DRAW_RANGE, REEL_COUNT};

#[derive(Debug, Clone)]
pub struct OutcomeGenerator {
    rng: Pcg32,
    draws: [u8; REEL_COUNT],
}

impl OutcomeGenerator {
    pub fn new(seed: u64) -> Self {
        let mut generator = Self {
            rng: Pcg32::seed_from_u64(seed),
            draws: [0; REEL_COUNT],
        };
        generator.refresh();
        generator
    }

    /// Draw a fresh raw value in [0, 40) for every reel
    pub fn refresh(&mut self) {
        for draw in &mut self.draws {
            *draw = self.rng.random_range(0..RAW_DRAW_RANGE);
        }
    }

    /// Most recent raw draw for a reel
    pub fn raw(&self, reel: usize) -> u8 {
        self.draws[reel]
    }

    /// Symbol the most recent draw buckets into for a reel
    pub fn bucket(&self, reel: usize) -> Symbol {
        Symbol::from_draw(self.draws[reel])
    }

    #[cfg(test)]
    pub(crate) fn force_draws(&mut self, draws: [u8; REEL_COUNT]) {
        self.draws = draws;
    }
}
