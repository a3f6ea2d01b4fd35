//! Reel spin controller

use serde::{Deserialize, Serialize};

use super::symbols::Symbol;
use crate::consts::*;
use crate::{segment_for_angle, wrap_angle};

/// One spinning reel
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reel {
    /// Spin position in [0, 2π)
    pub angular_position: f32,
    /// Segment under the pay line, derived from `angular_position`
    pub current_segment: u8,
    /// Symbol this spin must land on
    pub target: Symbol,
    /// Segment of `target`
    pub stop_segment: u8,
    /// Elapsed time (seconds) before which the reel may not land
    pub spin_deadline: f64,
    /// Rotation handed to the renderer
    pub display_angle: f32,
    /// Landed during the current game
    pub landed: bool,
}

impl Reel {
    pub fn new() -> Self {
        Self {
            display_angle: -REEL_VISUAL_OFFSET,
            ..Default::default()
        }
    }

    /// Arm the reel for a new spin. Lanes further right spin longer.
    pub fn begin_spin(&mut self, lane: usize, target: Symbol, now: f64) {
        self.target = target;
        self.stop_segment = target.segment();
        self.spin_deadline =
            now + lane as f64 * f64::from(LANE_STAGGER_SECS) + f64::from(MIN_SPIN_SECS);
        self.landed = false;
    }

    /// Both the target segment and the minimum spin time are required
    pub fn can_land(&self, now: f64) -> bool {
        self.current_segment == self.stop_segment && now >= self.spin_deadline
    }

    /// Advance one frame. Returns true on the frame the reel lands.
    pub fn advance(&mut self, dt: f32, now: f64) -> bool {
        if self.landed {
            return false;
        }
        if self.can_land(now) {
            self.landed = true;
            self.display_angle = self.stop_segment as f32 * WHEEL_SEGMENT - REEL_VISUAL_OFFSET;
            return true;
        }

        self.angular_position = wrap_angle(self.angular_position + SPIN_SPEED * dt);
        self.current_segment = segment_for_angle(self.angular_position);
        self.display_angle = self.angular_position - REEL_VISUAL_OFFSET;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_deadline_staggered_by_lane() {
        let mut reels = [Reel::new(), Reel::new(), Reel::new()];
        for (lane, reel) in reels.iter_mut().enumerate() {
            reel.begin_spin(lane, Symbol::Seven, 10.0);
        }
        assert_eq!(reels[0].spin_deadline, 13.0);
        assert_eq!(reels[1].spin_deadline, 15.0);
        assert_eq!(reels[2].spin_deadline, 17.0);
    }

    #[test]
    fn test_begin_spin_records_target() {
        let mut reel = Reel::new();
        reel.begin_spin(1, Symbol::Cherry, 0.0);
        assert_eq!(reel.target, Symbol::Cherry);
        assert_eq!(reel.stop_segment, 6);
        assert!(!reel.landed);
    }

    #[test]
    fn test_deadline_reached_late_in_session() {
        // Six days of uptime; frame steps must still move the clock
        let start = 600_000.0f64;
        let mut reel = Reel::new();
        reel.begin_spin(2, Symbol::Banana, start);

        let mut now = start;
        let mut frames = 0;
        while !reel.advance(DT, now) {
            now += f64::from(DT);
            frames += 1;
            assert!(frames < 2000, "reel never landed");
        }
        assert!(now >= start + 7.0);
        assert_eq!(reel.current_segment, 4);
    }

    #[test]
    fn test_matching_segment_before_deadline_keeps_spinning() {
        let mut reel = Reel::new();
        reel.begin_spin(0, Symbol::Seven, 0.0);
        assert_eq!(reel.current_segment, reel.stop_segment);

        let before = reel.angular_position;
        assert!(!reel.advance(DT, 1.0));
        assert!(!reel.landed);
        assert!(reel.angular_position > before);
    }

    #[test]
    fn test_deadline_without_segment_keeps_spinning() {
        let mut reel = Reel::new();
        reel.begin_spin(0, Symbol::Melon, 0.0);
        assert!(!reel.advance(DT, 100.0));
        assert!(!reel.landed);
    }

    #[test]
    fn test_lands_and_snaps() {
        let mut reel = Reel::new();
        reel.begin_spin(0, Symbol::Plum, 0.0);

        let mut now = 0.0f64;
        let mut landed_at = None;
        for frame in 0..2000 {
            now += f64::from(DT);
            if reel.advance(DT, now) {
                landed_at = Some(frame);
                break;
            }
        }
        assert!(landed_at.is_some());
        assert!(now >= reel.spin_deadline);
        assert_eq!(reel.current_segment, 2);
        let expected = 2.0 * WHEEL_SEGMENT - REEL_VISUAL_OFFSET;
        assert!((reel.display_angle - expected).abs() < 1e-6);

        // Frozen once landed
        let position = reel.angular_position;
        assert!(!reel.advance(DT, now + 1.0));
        assert_eq!(reel.angular_position, position);
    }

    #[test]
    fn test_multiple_revolutions_before_deadline() {
        let mut reel = Reel::new();
        reel.begin_spin(2, Symbol::Seven, 0.0);

        let mut now = 0.0f64;
        let mut passes = 0;
        let mut was_on_target = reel.current_segment == 0;
        while !reel.landed {
            now += f64::from(DT);
            reel.advance(DT, now);
            let on_target = reel.current_segment == 0;
            if on_target && !was_on_target {
                passes += 1;
            }
            was_on_target = on_target;
        }
        // A 7 s minimum at 3 rad/s is more than three full turns
        assert!(passes >= 3);
    }

    proptest! {
        #[test]
        fn segment_tracks_position(steps in 1usize..2000, dt in 0.001f32..0.2) {
            let mut reel = Reel::new();
            reel.begin_spin(0, Symbol::Lemon, 0.0);
            for _ in 0..steps {
                // Deadline never reached, so the reel always spins
                reel.advance(dt, -1.0);
                prop_assert!(reel.angular_position >= 0.0);
                prop_assert!(reel.angular_position < std::f32::consts::TAU);
                prop_assert!(reel.current_segment < SEGMENT_COUNT);
                prop_assert_eq!(reel.current_segment, segment_for_angle(reel.angular_position));
            }
        }
    }
}
