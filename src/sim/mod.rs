//! Deterministic slot machine simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Time only via the `dt` handed to `tick`
//! - No rendering or platform dependencies

pub mod coins;
pub mod paytable;
pub mod reel;
pub mod rng;
pub mod session;
pub mod state;
pub mod symbols;
pub mod tick;

pub use coins::{AttractCoin, Coin, coin_arc};
pub use paytable::{PAYTABLE, payout};
pub use reel::Reel;
pub use rng::OutcomeGenerator;
pub use session::{SessionError, SessionTotals, run_session};
pub use state::{Counters, GameEvent, GamePhase, GameState};
pub use symbols::Symbol;
pub use tick::{TickInput, tick};
