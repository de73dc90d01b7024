use crate::config::TrackerConfig;
use crate::history::{TrackHistory, TrackPoint};
use crate::locator::Detection;

/// Sentinel floor for the cooldown counter; only its sign is ever read
const COOLDOWN_ELAPSED: i32 = -1;

/// Where the detector is in its reversal-hunting cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// History too short to infer a direction
    WarmingUp,
    /// Direction known, cooldown still counting down
    Tracking,
    /// Cooldown elapsed, ready to accept a reversal as a bounce
    Cooled,
}

/// A detected wall hit, located at the observation just before the reversal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceEvent {
    pub location: (f32, f32),
}

/// Infers wall bounces from the apparent-radius history.
///
/// A shrinking radius means the ball is flying toward the wall, a growing one
/// means it is coming back; the instant the trend flips is the bounce. The
/// `diminishing` counter suppresses the radius jitter a single real bounce
/// produces across several frames, so at most one event fires per cooldown
/// window.
pub struct BounceDetector {
    history: TrackHistory,
    diminishing: i32,
    was_returning: bool,
    phase: Phase,
    max_diminish: i32,
    cool_off_override: bool,
}

impl BounceDetector {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            history: TrackHistory::new(config.buffer_size),
            diminishing: config.max_diminish,
            was_returning: false,
            phase: Phase::WarmingUp,
            max_diminish: config.max_diminish,
            cool_off_override: config.cool_off_override,
        }
    }

    /// Advances the state machine by one frame.
    ///
    /// Absent detections reset the whole session. Duplicate-radius readings
    /// are dropped without evaluating direction. Emits at most one
    /// `BounceEvent` per accepted reversal.
    pub fn step(&mut self, detection: Option<&Detection>) -> Option<BounceEvent> {
        let Some(detection) = detection else {
            self.reset();
            return None;
        };

        if !self.history.push_unique(detection.center, detection.radius) {
            return None;
        }
        self.diminishing = (self.diminishing - 1).max(COOLDOWN_ELAPSED);

        let observed = self.history.len();
        let warmed = (self.cool_off_override && observed > 2) || observed > 5;
        if !warmed {
            self.phase = Phase::WarmingUp;
            return None;
        }

        let (Some(newest), Some(previous)) = (self.history.get(0), self.history.get(1)) else {
            return None;
        };
        let now_returning = newest.radius > previous.radius;
        let direction_changed = now_returning != self.was_returning;

        if direction_changed && self.diminishing < 0 {
            // The newest point already reflects the post-bounce trajectory;
            // the one before it is where the wall was hit.
            let location = previous.center;
            self.was_returning = true;
            self.diminishing = self.max_diminish;
            self.phase = Phase::Tracking;
            return Some(BounceEvent { location });
        }

        self.phase = if self.diminishing < 0 {
            Phase::Cooled
        } else {
            Phase::Tracking
        };
        None
    }

    /// Clears the session: empty history, full cooldown, outgoing direction
    fn reset(&mut self) {
        self.history.clear();
        self.diminishing = self.max_diminish;
        self.was_returning = false;
        self.phase = Phase::WarmingUp;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Tracked points newest-first, for trail rendering
    pub fn trail(&self) -> impl Iterator<Item = &TrackPoint> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(buffer: usize, max_diminish: i32, cool_off_override: bool) -> TrackerConfig {
        TrackerConfig {
            frame_width: 600,
            hsv_lower: [0, 88, 91],
            hsv_upper: [56, 255, 255],
            bullseye: (300.0, 180.0),
            buffer_size: buffer,
            max_diminish,
            cool_off_override,
        }
    }

    fn detection(x: f32, radius: f32) -> Detection {
        Detection {
            center: (x, 100.0),
            radius,
        }
    }

    /// Feeds a radius sequence, returning every emitted event with the frame
    /// index it fired on
    fn feed(detector: &mut BounceDetector, radii: &[f32]) -> Vec<(usize, BounceEvent)> {
        radii
            .iter()
            .enumerate()
            .filter_map(|(i, &r)| {
                detector
                    .step(Some(&detection(i as f32, r)))
                    .map(|e| (i, e))
            })
            .collect()
    }

    #[test]
    fn test_warm_up_emits_nothing() {
        let mut detector = BounceDetector::new(&config(64, 10, true));
        // Two entries: below even the overridden warm-up threshold
        assert!(feed(&mut detector, &[30.0, 25.0]).is_empty());
        assert_eq!(detector.phase(), Phase::WarmingUp);
    }

    #[test]
    fn test_longer_warm_up_without_override() {
        let mut detector = BounceDetector::new(&config(64, 0, false));
        // Five entries stay in warm-up when the override is off
        assert!(feed(&mut detector, &[30.0, 28.0, 26.0, 24.0, 22.0]).is_empty());
        assert_eq!(detector.phase(), Phase::WarmingUp);

        let mut overridden = BounceDetector::new(&config(64, 0, true));
        feed(&mut overridden, &[30.0, 28.0, 26.0]);
        assert_ne!(overridden.phase(), Phase::WarmingUp);
    }

    #[test]
    fn test_shrink_then_grow_emits_one_bounce_at_pre_growth_point() {
        let mut detector = BounceDetector::new(&config(64, 10, true));
        // Eleven unique approach observations take the cooldown below zero
        let approach = [
            60.0, 55.0, 50.0, 45.0, 40.0, 35.0, 30.0, 25.0, 20.0, 15.0, 10.0,
        ];
        assert!(feed(&mut detector, &approach).is_empty());
        assert_eq!(detector.phase(), Phase::Cooled);

        // Radius starts growing: exactly one event, at the point recorded
        // immediately before the growth began (the x=10 radius-10 sample)
        let events = feed(&mut detector, &[15.0, 20.0, 25.0]);
        assert_eq!(events.len(), 1);
        let (frame_index, event) = events[0];
        assert_eq!(frame_index, 0);
        assert_eq!(event.location, (10.0, 100.0));
    }

    #[test]
    fn test_reversal_during_cooldown_is_suppressed() {
        let mut detector = BounceDetector::new(&config(64, 10, true));
        // Only 4 unique observations: diminishing is 10 - 4 = 6, still >= 0
        let events = feed(&mut detector, &[30.0, 25.0, 20.0, 26.0]);
        assert!(events.is_empty());
        assert_eq!(detector.phase(), Phase::Tracking);
    }

    #[test]
    fn test_at_most_one_event_per_cooldown_window() {
        let mut detector = BounceDetector::new(&config(64, 10, true));
        let approach: Vec<f32> = (0..12).map(|i| 90.0 - 5.0 * i as f32).collect();
        feed(&mut detector, &approach);

        // Oscillating radii flip direction every frame; the cooldown admits
        // only the first reversal
        let oscillation = [35.0, 30.0, 36.0, 31.0, 37.0, 32.0, 38.0, 33.0];
        let events = feed(&mut detector, &oscillation);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_second_bounce_after_cooldown_elapses() {
        let mut detector = BounceDetector::new(&config(64, 3, true));
        let approach: Vec<f32> = (0..6).map(|i| 90.0 - 5.0 * i as f32).collect();
        feed(&mut detector, &approach);

        // Growth at index 0 fires immediately (cooldown already elapsed);
        // the turn back toward the wall at index 3 is suppressed until the
        // refreshed cooldown runs out, then fires at index 4
        let events = feed(
            &mut detector,
            &[70.0, 72.0, 74.0, 50.0, 45.0, 40.0, 35.0, 30.0, 41.0],
        );
        let indices: Vec<usize> = events.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 4]);
    }

    #[test]
    fn test_absent_run_resets_session() {
        let mut detector = BounceDetector::new(&config(64, 10, true));
        let approach: Vec<f32> = (0..12).map(|i| 90.0 - 5.0 * i as f32).collect();
        feed(&mut detector, &approach);
        assert_eq!(detector.phase(), Phase::Cooled);

        // Detection lost for three frames mid-tracking
        for _ in 0..3 {
            assert!(detector.step(None).is_none());
        }
        assert_eq!(detector.history_len(), 0);
        assert_eq!(detector.phase(), Phase::WarmingUp);

        // A pending reversal must not survive the reset: growth right after
        // reacquisition stays silent through the fresh warm-up and cooldown
        let events = feed(&mut detector, &[35.0, 40.0, 45.0, 50.0]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_duplicate_radius_does_not_advance_state() {
        let mut detector = BounceDetector::new(&config(64, 10, true));
        feed(&mut detector, &[30.0, 25.0, 20.0]);
        let before = detector.history_len();
        for _ in 0..5 {
            assert!(detector.step(Some(&detection(99.0, 20.0))).is_none());
        }
        assert_eq!(detector.history_len(), before);
    }

    #[test]
    fn test_history_respects_buffer_capacity() {
        let mut detector = BounceDetector::new(&config(4, 10, true));
        let radii: Vec<f32> = (0..10).map(|i| 50.0 - i as f32).collect();
        feed(&mut detector, &radii);
        assert_eq!(detector.history_len(), 4);
    }
}
