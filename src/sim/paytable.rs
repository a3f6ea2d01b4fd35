//! Fixed paytable

use super::symbols::Symbol;
use crate::consts::REEL_COUNT;

/// Winning lines: three of a symbol and the credits they pay
pub const PAYTABLE: [(Symbol, u32); 3] = [
    (Symbol::Cherry, 5),
    (Symbol::Bar, 10),
    (Symbol::Seven, 30),
];

/// Credits won for the segments the reels stopped on (0 for a loss)
pub fn payout(stop_segments: [u8; REEL_COUNT]) -> u32 {
    let [first, rest @ ..] = stop_segments;
    if rest.iter().any(|&s| s != first) {
        return 0;
    }
    PAYTABLE
        .iter()
        .find(|(symbol, _)| symbol.segment() == first)
        .map(|&(_, credits)| credits)
        .unwrap_or(0)
}
