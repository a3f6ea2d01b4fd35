//! Reel symbols and raw-draw bucketing

use serde::{Deserialize, Serialize};

use crate::consts::RAW_DRAW_RANGE;

/// Symbols on a reel strip, in segment order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Symbol {
    #[default]
    Seven,
    Orange,
    Plum,
    Bar,
    Banana,
    Melon,
    Cherry,
    Lemon,
}

impl Symbol {
    /// All symbols in segment order
    pub const ALL: [Symbol; 8] = [
        Symbol::Seven,
        Symbol::Orange,
        Symbol::Plum,
        Symbol::Bar,
        Symbol::Banana,
        Symbol::Melon,
        Symbol::Cherry,
        Symbol::Lemon,
    ];

    /// Bucket a raw draw in [0, 40) into a symbol.
    ///
    /// The ranges are deliberately uneven: Cherry and Bar dominate, Seven is
    /// uncommon, and the four fruit fillers are one draw each.
    pub fn from_draw(draw: u8) -> Self {
        debug_assert!(draw < RAW_DRAW_RANGE, "raw draw {draw} out of range");
        match draw {
            0..=4 => Symbol::Seven,
            5 => Symbol::Orange,
            6 => Symbol::Plum,
            7..=17 => Symbol::Bar,
            18 => Symbol::Banana,
            19 => Symbol::Melon,
            20..=38 => Symbol::Cherry,
            39..=u8::MAX => Symbol::Lemon,
        }
    }

    /// Symbol printed on a reel segment
    pub fn from_segment(segment: u8) -> Option<Self> {
        Self::ALL.get(segment as usize).copied()
    }

    /// Reel segment carrying this symbol
    pub fn segment(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Symbol::Seven => "Seven",
            Symbol::Orange => "Orange",
            Symbol::Plum => "Plum",
            Symbol::Bar => "Bar",
            Symbol::Banana => "Banana",
            Symbol::Melon => "Melon",
            Symbol::Cherry => "Cherry",
            Symbol::Lemon => "Lemon",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bucket_table() {
        let mut counts = [0u32; 8];
        for draw in 0..RAW_DRAW_RANGE {
            counts[Symbol::from_draw(draw).segment() as usize] += 1;
        }
        // Seven, Orange, Plum, Bar, Banana, Melon, Cherry, Lemon
        assert_eq!(counts, [5, 1, 1, 11, 1, 1, 19, 1]);
    }

    #[test]
    fn test_bucket_edges() {
        assert_eq!(Symbol::from_draw(0), Symbol::Seven);
        assert_eq!(Symbol::from_draw(4), Symbol::Seven);
        assert_eq!(Symbol::from_draw(5), Symbol::Orange);
        assert_eq!(Symbol::from_draw(6), Symbol::Plum);
        assert_eq!(Symbol::from_draw(7), Symbol::Bar);
        assert_eq!(Symbol::from_draw(17), Symbol::Bar);
        assert_eq!(Symbol::from_draw(18), Symbol::Banana);
        assert_eq!(Symbol::from_draw(19), Symbol::Melon);
        assert_eq!(Symbol::from_draw(20), Symbol::Cherry);
        assert_eq!(Symbol::from_draw(38), Symbol::Cherry);
        assert_eq!(Symbol::from_draw(39), Symbol::Lemon);
    }

    #[test]
    fn test_segment_roundtrip() {
        for (i, symbol) in Symbol::ALL.iter().enumerate() {
            assert_eq!(symbol.segment() as usize, i);
            assert_eq!(Symbol::from_segment(i as u8), Some(*symbol));
        }
        assert_eq!(Symbol::from_segment(8), None);
    }

    proptest! {
        #[test]
        fn bucketing_is_deterministic(draw in 0u8..RAW_DRAW_RANGE) {
            prop_assert_eq!(Symbol::from_draw(draw), Symbol::from_draw(draw));
            prop_assert!(Symbol::from_draw(draw).segment() < 8);
        }
    }
}
