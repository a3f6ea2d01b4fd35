//! Per-frame state machine
//!
//! Runs one phase arm per frame and then refreshes the outcome draws.

use super::coins::Coin;
use super::paytable::payout;
use super::state::{GameEvent, GamePhase, GameState};
use super::symbols::Symbol;
use crate::consts::REEL_COUNT;

/// Inputs for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Start pressed this frame (one-shot, cleared by the driver)
    pub spin_requested: bool,
    /// Reel assets finished loading
    pub reels_ready: bool,
    /// Bounce the attract coin while idle
    pub attract: bool,
}

/// Advance the machine by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();
    state.elapsed += f64::from(dt);

    if input.reels_ready {
        step_phase(state, input, dt);
    }

    // Refreshed every frame regardless of phase, so the captured outcome
    // depends on the exact frame start was pressed.
    state.outcomes.refresh();
}

fn step_phase(state: &mut GameState, input: &TickInput, dt: f32) {
    match state.phase {
        GamePhase::Idle => {
            if input.attract {
                state.attract.advance(dt);
            }
            if input.spin_requested {
                state.phase = GamePhase::Preparing;
            }
        }

        GamePhase::Preparing => {
            let now = state.elapsed;
            let mut targets = [Symbol::Seven; REEL_COUNT];
            for (lane, reel) in state.reels.iter_mut().enumerate() {
                let symbol = state.outcomes.bucket(lane);
                reel.begin_spin(lane, symbol, now);
                targets[lane] = symbol;
            }
            state.counters.games_played += 1;
            state.events.push(GameEvent::SpinStarted {
                game: state.counters.games_played,
                targets,
            });
            log::info!(
                "Game {} started: {} {} {}",
                state.counters.games_played,
                targets[0].name(),
                targets[1].name(),
                targets[2].name()
            );
            state.phase = GamePhase::Spinning;
        }

        GamePhase::Spinning => {
            let now = state.elapsed;
            for (lane, reel) in state.reels.iter_mut().enumerate() {
                if reel.advance(dt, now) {
                    let symbol = reel.target;
                    log::debug!("Reel {} landed on {}", lane, symbol.name());
                    state.events.push(GameEvent::ReelLanded { reel: lane, symbol });
                }
            }
            if state.all_reels_landed() {
                state.phase = GamePhase::Evaluating;
            }
        }

        GamePhase::Evaluating => {
            let credits = payout(state.stop_segments());
            if credits > 0 {
                state.pending_payout = credits;
                state.events.push(GameEvent::PayoutAwarded { credits });
                log::info!("Winner! {} credits", credits);
                state.phase = GamePhase::Paying;
            } else {
                state.events.push(GameEvent::SpinLost);
                state.phase = GamePhase::Idle;
            }
        }

        GamePhase::Paying => {
            let count = state.pending_payout;
            state.coins.clear();
            for index in 0..count {
                let id = state.next_entity_id();
                let coin = Coin::new(id, index, count, &mut state.fx_rng);
                state.coins.push(coin);
                state.events.push(GameEvent::CoinSpawned { id });
            }
            state.phase = GamePhase::Animating;
        }

        GamePhase::Animating => {
            for coin in &mut state.coins {
                if coin.advance(dt) {
                    state.events.push(GameEvent::CoinRemoved { id: coin.id });
                }
            }
            let removed = state.coins.iter().filter(|c| c.removed).count();
            log::trace!("{}/{} coins done", removed, state.coins.len());

            if state.coins.iter().all(|c| c.removed) {
                let credits = state.pending_payout;
                state.counters.credits_won += u64::from(credits);
                state.events.push(GameEvent::CreditsWon {
                    credits,
                    total: state.counters.credits_won,
                });
                log::info!(
                    "Paid {} credits ({} total)",
                    credits,
                    state.counters.credits_won
                );
                state.pending_payout = 0;
                state.coins.clear();
                state.phase = GamePhase::Idle;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn ready() -> TickInput {
        TickInput {
            reels_ready: true,
            ..Default::default()
        }
    }

    fn spin() -> TickInput {
        TickInput {
            spin_requested: true,
            reels_ready: true,
            ..Default::default()
        }
    }

    /// Run frames until `phase` is reached, returning the number of frames
    fn run_until(state: &mut GameState, phase: GamePhase, max_frames: usize) -> usize {
        for frame in 0..max_frames {
            if state.phase == phase {
                return frame;
            }
            tick(state, &ready(), DT);
        }
        panic!("never reached {:?}, stuck in {:?}", phase, state.phase);
    }

    /// Start a game whose reels stop on the given draws
    fn start_with_draws(state: &mut GameState, draws: [u8; REEL_COUNT]) {
        tick(state, &spin(), DT);
        assert_eq!(state.phase, GamePhase::Preparing);
        state.outcomes.force_draws(draws);
        tick(state, &ready(), DT);
        assert_eq!(state.phase, GamePhase::Spinning);
    }

    #[test]
    fn test_idle_without_request_stays_idle() {
        let mut state = GameState::new(1);
        for _ in 0..100 {
            tick(&mut state, &ready(), DT);
        }
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.counters.games_played, 0);
    }

    #[test]
    fn test_preparing_captures_targets() {
        let mut state = GameState::new(1);
        start_with_draws(&mut state, [3, 10, 25]);
        assert_eq!(state.stop_segments(), [0, 3, 6]);
        assert_eq!(state.counters.games_played, 1);
        assert!(matches!(
            state.events.as_slice(),
            [GameEvent::SpinStarted {
                game: 1,
                targets: [Symbol::Seven, Symbol::Bar, Symbol::Cherry]
            }]
        ));

        let now = state.elapsed;
        for (lane, secs) in [3.0, 5.0, 7.0].into_iter().enumerate() {
            assert!((state.reels[lane].spin_deadline - (now + secs)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_spin_request_ignored_while_busy() {
        let mut state = GameState::new(1);
        start_with_draws(&mut state, [0, 0, 0]);
        let targets = state.stop_segments();
        let deadlines: Vec<f64> = state.reels.iter().map(|r| r.spin_deadline).collect();

        for _ in 0..30 {
            tick(&mut state, &spin(), DT);
        }
        assert_eq!(state.phase, GamePhase::Spinning);
        assert_eq!(state.stop_segments(), targets);
        let after: Vec<f64> = state.reels.iter().map(|r| r.spin_deadline).collect();
        assert_eq!(deadlines, after);
        assert_eq!(state.counters.games_played, 1);
    }

    #[test]
    fn test_double_request_counts_once() {
        let mut state = GameState::new(1);
        tick(&mut state, &spin(), DT);
        tick(&mut state, &spin(), DT);
        tick(&mut state, &spin(), DT);
        assert_eq!(state.phase, GamePhase::Spinning);
        assert_eq!(state.counters.games_played, 1);
    }

    #[test]
    fn test_not_ready_skips_phase_logic() {
        let mut state = GameState::new(1);
        let input = TickInput {
            spin_requested: true,
            reels_ready: false,
            attract: true,
        };
        for _ in 0..10 {
            tick(&mut state, &input, DT);
        }
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.counters.games_played, 0);
        assert!(state.elapsed > 0.0);
    }

    #[test]
    fn test_rng_refreshes_in_every_phase() {
        let mut state = GameState::new(77);
        let mut changed = 0;
        let mut last = [0u8; REEL_COUNT];
        for frame in 0..200 {
            let input = if frame == 0 { spin() } else { ready() };
            tick(&mut state, &input, DT);
            let draws = [
                state.outcomes.raw(0),
                state.outcomes.raw(1),
                state.outcomes.raw(2),
            ];
            if draws != last {
                changed += 1;
            }
            last = draws;
        }
        assert_eq!(state.phase, GamePhase::Spinning);
        // Three fresh draws repeating exactly is 1 in 64000
        assert!(changed >= 195);
    }

    #[test]
    fn test_losing_game_returns_to_idle() {
        let mut state = GameState::new(1);
        // Seven, Orange, Plum
        start_with_draws(&mut state, [0, 5, 6]);
        run_until(&mut state, GamePhase::Evaluating, 2000);
        tick(&mut state, &ready(), DT);
        assert_eq!(state.phase, GamePhase::Idle);
        assert!(state.events.contains(&GameEvent::SpinLost));
        assert!(state.coins.is_empty());
        assert_eq!(state.counters.credits_won, 0);
        assert_eq!(state.counters.games_played, 1);
    }

    #[test]
    fn test_reels_land_after_deadlines() {
        let mut state = GameState::new(1);
        start_with_draws(&mut state, [10, 10, 10]);
        let deadlines: Vec<f64> = state.reels.iter().map(|r| r.spin_deadline).collect();
        run_until(&mut state, GamePhase::Evaluating, 2000);

        assert!(state.elapsed >= deadlines[2]);
        for reel in &state.reels {
            assert!(reel.landed);
            assert_eq!(reel.current_segment, 3);
        }
    }

    #[test]
    fn test_reels_land_late_in_session() {
        let mut state = GameState::new(1);
        state.elapsed = 600_000.0;
        start_with_draws(&mut state, [25, 25, 25]);
        let deadlines: Vec<f64> = state.reels.iter().map(|r| r.spin_deadline).collect();
        assert!((deadlines[2] - deadlines[0] - 4.0).abs() < 1e-6);

        run_until(&mut state, GamePhase::Evaluating, 2000);
        assert!(state.elapsed >= deadlines[2]);
        assert_eq!(state.stop_segments(), [6, 6, 6]);

        // Cherry line pays out as usual
        tick(&mut state, &ready(), DT);
        assert_eq!(state.pending_payout, 5);
    }

    #[test]
    fn test_landed_events_carry_targets() {
        let mut state = GameState::new(1);
        start_with_draws(&mut state, [0, 10, 39]);
        let mut landed = Vec::new();
        for _ in 0..2000 {
            tick(&mut state, &ready(), DT);
            for event in &state.events {
                if let GameEvent::ReelLanded { reel, symbol } = event {
                    landed.push((*reel, *symbol));
                }
            }
            if state.phase != GamePhase::Spinning {
                break;
            }
        }
        assert_eq!(
            landed,
            vec![(0, Symbol::Seven), (1, Symbol::Bar), (2, Symbol::Lemon)]
        );
    }

    #[test]
    fn test_jackpot_end_to_end() {
        let mut state = GameState::new(1);
        start_with_draws(&mut state, [0, 1, 4]);
        assert_eq!(state.stop_segments(), [0, 0, 0]);

        run_until(&mut state, GamePhase::Evaluating, 2000);
        tick(&mut state, &ready(), DT);
        assert_eq!(state.phase, GamePhase::Paying);
        assert_eq!(state.pending_payout, 30);

        tick(&mut state, &ready(), DT);
        assert_eq!(state.phase, GamePhase::Animating);
        assert_eq!(state.coins.len(), 30);
        let spawned = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::CoinSpawned { .. }))
            .count();
        assert_eq!(spawned, 30);
        assert_eq!(state.counters.credits_won, 0);

        let frames = run_until(&mut state, GamePhase::Idle, 1000);
        // Slowest coin needs π seconds to fall
        assert!(frames as f32 * DT <= std::f32::consts::PI + 0.1);
        assert_eq!(state.counters.credits_won, 30);
        assert_eq!(state.counters.games_played, 1);
        assert!(state.coins.is_empty());
        assert_eq!(state.pending_payout, 0);
    }

    #[test]
    fn test_credits_accumulate_across_games() {
        let mut state = GameState::new(1);
        for (draws, credits) in [([25, 30, 38], 5u64), ([7, 12, 17], 10), ([25, 20, 21], 5)] {
            start_with_draws(&mut state, draws);
            run_until(&mut state, GamePhase::Evaluating, 2000);
            tick(&mut state, &ready(), DT);
            let before = state.counters.credits_won;
            run_until(&mut state, GamePhase::Idle, 2000);
            assert_eq!(state.counters.credits_won - before, credits);
        }
        assert_eq!(state.counters.games_played, 3);
        assert_eq!(state.counters.credits_won, 20);
    }

    #[test]
    fn test_attract_coin_is_cosmetic() {
        let mut state = GameState::new(1);
        let input = TickInput {
            reels_ready: true,
            attract: true,
            ..Default::default()
        };
        let start = state.attract.phase;
        for _ in 0..100 {
            tick(&mut state, &input, DT);
        }
        assert_ne!(state.attract.phase, start);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.counters, Default::default());
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(4242);
        let mut b = GameState::new(4242);
        for frame in 0..3000 {
            let input = if frame % 700 == 0 { spin() } else { ready() };
            tick(&mut a, &input, DT);
            tick(&mut b, &input, DT);
            assert_eq!(a.phase, b.phase);
            assert_eq!(a.events, b.events);
        }
        assert_eq!(a.counters, b.counters);
    }
}
