use crate::bounce::BounceDetector;
use crate::config::TrackerConfig;
use crate::locator::Detection;
use crate::overlay;
use crate::scorer::ShotScore;
use image::RgbImage;
use std::env;

/// Helper function to check if debug logging is enabled
pub fn is_debug_enabled() -> bool {
    env::var("RUST_LOG")
        .map(|val| val.to_lowercase() == "debug")
        .unwrap_or(false)
}

/// Debug print function that only prints when RUST_LOG=debug
pub fn debug_println(args: std::fmt::Arguments) {
    if is_debug_enabled() {
        println!("{}", args);
    }
}

/// Renders the full overlay for one frame: bullseye, detection, trail and,
/// once a shot has been scored, the rating marker
pub fn annotate_frame(
    frame: &mut RgbImage,
    config: &TrackerConfig,
    detection: Option<&Detection>,
    detector: &BounceDetector,
    last_shot: Option<&ShotScore>,
) {
    overlay::draw_bullseye(frame, config.bullseye);
    if let Some(detection) = detection {
        overlay::draw_detection(frame, detection);
    }
    overlay::draw_trail(frame, detector.trail(), config.buffer_size);
    if let Some(shot) = last_shot {
        overlay::draw_rating_marker(frame, shot.rating);
    }
}

/// Prints the per-frame diagnostic state
pub fn print_frame_debug_info(detection: Option<&Detection>, detector: &BounceDetector) {
    debug_println(format_args!("--------------------------------"));
    debug_println(format_args!("detection: {:?}", detection));
    debug_println(format_args!("phase: {:?}", detector.phase()));
    debug_println(format_args!("history length: {}", detector.history_len()));
}
