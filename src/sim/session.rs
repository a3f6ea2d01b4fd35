//! Headless play sessions
//!
//! Drives the state machine without a renderer, pressing start whenever the
//! machine is idle. Used by the native binary to measure returns.

use super::state::{GameEvent, GamePhase, GameState};
use super::tick::{TickInput, tick};

/// Safety cap on frames per game (a full game takes well under 1000)
const MAX_FRAMES_PER_GAME: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session stalled after {frames} frames with {played} of {requested} games played")]
    Stalled {
        frames: u64,
        played: u64,
        requested: u64,
        totals: SessionTotals,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionTotals {
    pub games: u64,
    pub wins: u64,
    pub credits: u64,
    pub frames: u64,
}

impl SessionTotals {
    /// Average credits returned per game played
    pub fn return_per_game(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.credits as f64 / self.games as f64
        }
    }
}

/// Play `games` complete games from `seed` at a fixed step of `dt`.
/// Fails if the machine stops making progress before every game finishes.
pub fn run_session(seed: u64, games: u64, dt: f32) -> Result<SessionTotals, SessionError> {
    let mut state = GameState::new(seed);
    let mut totals = SessionTotals::default();
    let frame_cap = games.saturating_mul(MAX_FRAMES_PER_GAME);

    loop {
        let idle = state.phase == GamePhase::Idle;
        if idle && state.counters.games_played >= games {
            break;
        }
        if totals.frames >= frame_cap {
            totals.games = state.counters.games_played;
            totals.credits = state.counters.credits_won;
            return Err(SessionError::Stalled {
                frames: totals.frames,
                played: totals.games,
                requested: games,
                totals,
            });
        }

        let input = TickInput {
            spin_requested: idle,
            reels_ready: true,
            attract: false,
        };
        tick(&mut state, &input, dt);
        totals.frames += 1;

        for event in &state.events {
            match event {
                GameEvent::SpinStarted { game, targets } => {
                    log::debug!("Game {}: {:?}", game, targets);
                }
                GameEvent::PayoutAwarded { credits } => {
                    totals.wins += 1;
                    log::debug!("Win: {} credits", credits);
                }
                _ => {}
            }
        }
    }

    totals.games = state.counters.games_played;
    totals.credits = state.counters.credits_won;
    Ok(totals)
}
