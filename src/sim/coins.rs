//! Win coin shower and idle attract coin

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use crate::consts::*;

/// A coin arcing out of the machine after a win
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    /// Lateral position, fixed for the whole fall
    pub x: f32,
    /// Arc phase: starts at π, done past 2π
    pub fall_phase: f32,
    /// Phase radians per second
    pub fall_speed: f32,
    /// Roll around the coin's face normal (radians)
    pub spin: f32,
    pub removed: bool,
}

impl Coin {
    /// Coin `index` of `count`, evenly spaced across the machine
    pub fn new<R: Rng + ?Sized>(id: u32, index: u32, count: u32, rng: &mut R) -> Self {
        let spacing = COIN_SPREAD / count.max(1) as f32;
        Self {
            id,
            x: (index as f32 + 0.5) * spacing - COIN_SPREAD / 2.0,
            fall_phase: PI,
            fall_speed: COIN_MIN_SPEED + rng.random::<f32>() * COIN_SPEED_JITTER,
            spin: rng.random::<f32>() * 50.0,
            removed: false,
        }
    }

    /// Still travelling along its arc
    pub fn is_falling(&self) -> bool {
        self.fall_phase < TAU
    }

    /// Advance one frame. Returns true on the frame the coin is removed.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.is_falling() {
            self.fall_phase += dt * self.fall_speed;
            self.spin += dt;
            false
        } else if !self.removed {
            self.removed = true;
            true
        } else {
            false
        }
    }

    pub fn position(&self) -> Vec3 {
        coin_arc(self.x, self.fall_phase)
    }
}

/// Point on the coin bounce arc for a phase
pub fn coin_arc(x: f32, phase: f32) -> Vec3 {
    Vec3::new(
        x,
        COIN_Y_BASE + COIN_Y_SWING * phase.sin().abs(),
        COIN_Z_BASE + COIN_Z_SWING * phase.cos(),
    )
}

/// Cosmetic coin that keeps bouncing while the machine is idle.
/// Never touches counters or game flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttractCoin {
    pub phase: f32,
    pub spin: f32,
}

impl Default for AttractCoin {
    fn default() -> Self {
        Self {
            phase: PI,
            spin: 0.0,
        }
    }
}

impl AttractCoin {
    pub fn advance(&mut self, dt: f32) {
        // Loop over the same π..2π arc as a win coin
        self.phase = PI + (self.phase - PI + dt * ATTRACT_SPEED).rem_euclid(PI);
        self.spin += dt;
    }

    pub fn position(&self) -> Vec3 {
        coin_arc(0.0, self.phase)
    }
}
