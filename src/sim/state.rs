//! Game state and core simulation types
//!
//! Everything the frame loop mutates lives in `GameState`. The presentation
//! layer only reads it.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::coins::{AttractCoin, Coin};
use super::reel::Reel;
use super::rng::OutcomeGenerator;
use super::symbols::Symbol;
use crate::consts::REEL_COUNT;

/// Salt for the cosmetic RNG so it never shares a sequence with outcomes
const FX_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Current phase of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to press start
    #[default]
    Idle,
    /// Capturing outcomes and arming the reels
    Preparing,
    /// Reels turning until each lands
    Spinning,
    /// All reels stopped, checking the paytable
    Evaluating,
    /// Won: spawning the coin shower
    Paying,
    /// Coins in flight
    Animating,
}

/// Things that happened during the last tick, for the HUD and logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    SpinStarted { game: u64, targets: [Symbol; REEL_COUNT] },
    ReelLanded { reel: usize, symbol: Symbol },
    SpinLost,
    PayoutAwarded { credits: u32 },
    CoinSpawned { id: u32 },
    CoinRemoved { id: u32 },
    CreditsWon { credits: u32, total: u64 },
}

/// Session counters, never persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub games_played: u64,
    pub credits_won: u64,
}

/// Complete machine state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seconds since the session started
    pub elapsed: f64,
    pub phase: GamePhase,
    pub reels: [Reel; REEL_COUNT],
    pub outcomes: OutcomeGenerator,
    /// Coin speeds and spins (visual only)
    pub fx_rng: Pcg32,
    /// Coins of the current win (empty outside Animating)
    pub coins: Vec<Coin>,
    /// Credits being paid out by the current coin shower
    pub pending_payout: u32,
    pub counters: Counters,
    pub attract: AttractCoin,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self {
            elapsed: 0.0,
            phase: GamePhase::Idle,
            reels: [Reel::new(), Reel::new(), Reel::new()],
            outcomes: OutcomeGenerator::new(seed),
            fx_rng: Pcg32::seed_from_u64(seed ^ FX_SEED_SALT),
            coins: Vec::new(),
            pending_payout: 0,
            counters: Counters::default(),
            attract: AttractCoin::default(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Segments the reels are set to stop on
    pub fn stop_segments(&self) -> [u8; REEL_COUNT] {
        [
            self.reels[0].stop_segment,
            self.reels[1].stop_segment,
            self.reels[2].stop_segment,
        ]
    }

    pub fn all_reels_landed(&self) -> bool {
        self.reels.iter().all(|r| r.landed)
    }

    /// Coins still on screen
    pub fn visible_coins(&self) -> impl Iterator<Item = &Coin> {
        self.coins.iter().filter(|c| !c.removed)
    }
}
