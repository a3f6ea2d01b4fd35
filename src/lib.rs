//! Virtual Slots - a three-reel 3D slot machine
//!
//! Core modules:
//! - `sim`: Deterministic game loop (reels, outcomes, payouts, coin shower)
//! - `renderer`: WebGPU raymarched scene
//! - `camera`: Orbit camera and picking rays
//! - `input`: Spin keys and start button hit testing
//! - `assets`: Reel strip loading and readiness signal
//! - `settings`: Player preferences

pub mod assets;
pub mod camera;
pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{QualityPreset, Settings};

use std::f32::consts::TAU;

/// Game configuration constants
pub mod consts {
    use std::f32::consts::PI;

    /// Number of reels on the machine
    pub const REEL_COUNT: usize = 3;
    /// Symbols (and segments) per reel
    pub const SEGMENT_COUNT: u8 = 8;
    /// Angular size of one reel segment (45°)
    pub const WHEEL_SEGMENT: f32 = PI / 4.0;
    /// Reel spin speed (radians per second)
    pub const SPIN_SPEED: f32 = 3.0;
    /// Visual offset so the landed segment sits between the line bars
    pub const REEL_VISUAL_OFFSET: f32 = 0.20;
    /// Minimum spin time for the first reel (seconds)
    pub const MIN_SPIN_SECS: f32 = 3.0;
    /// Extra spin time per reel lane, so reels stop left to right
    pub const LANE_STAGGER_SECS: f32 = 2.0;

    /// Raw outcome draws are uniform in [0, RAW_DRAW_RANGE)
    pub const RAW_DRAW_RANGE: u8 = 40;

    /// Coins are spread across this width (world units), centred on x = 0
    pub const COIN_SPREAD: f32 = 40.0;
    /// Coin fall speed range (phase radians per second)
    pub const COIN_MIN_SPEED: f32 = 1.0;
    pub const COIN_SPEED_JITTER: f32 = 0.5;
    /// Coin arc: z = COIN_Z_BASE + COIN_Z_SWING * cos(phase)
    pub const COIN_Z_BASE: f32 = 24.0;
    pub const COIN_Z_SWING: f32 = 12.0;
    /// Coin arc: y = COIN_Y_BASE + COIN_Y_SWING * |sin(phase)|
    pub const COIN_Y_BASE: f32 = -4.0;
    pub const COIN_Y_SWING: f32 = 20.0;
    /// Attract coin bounce speed while idle
    pub const ATTRACT_SPEED: f32 = 1.25;
}

/// Wrap an angle into [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Reel segment shown for an angular position (always in 0..SEGMENT_COUNT)
#[inline]
pub fn segment_for_angle(angle: f32) -> u8 {
    let segment = (wrap_angle(angle) / consts::WHEEL_SEGMENT).floor() as i32;
    segment.clamp(0, consts::SEGMENT_COUNT as i32 - 1) as u8
}
