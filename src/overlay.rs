use crate::history::TrackPoint;
use crate::locator::Detection;
use crate::scorer::Rating;
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_line_segment_mut,
};
use imageproc::rect::Rect;

const BULLSEYE_COLOR: Rgb<u8> = Rgb([100, 0, 100]);
const BALL_OUTLINE_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const CENTROID_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const TRAIL_COLOR: Rgb<u8> = Rgb([0, 255, 255]);

/// Screen position of the rating marker, where the original put its banner
const MARKER_POS: (i32, i32) = (200, 250);
const MARKER_SIZE: (u32, u32) = (60, 12);

/// Draws the fixed target ring
pub fn draw_bullseye(frame: &mut RgbImage, bullseye: (f32, f32)) {
    draw_hollow_circle_mut(
        frame,
        (bullseye.0 as i32, bullseye.1 as i32),
        10,
        BULLSEYE_COLOR,
    );
}

/// Outlines the detected ball and marks its center
pub fn draw_detection(frame: &mut RgbImage, detection: &Detection) {
    let center = (detection.center.0 as i32, detection.center.1 as i32);
    draw_hollow_circle_mut(frame, center, detection.radius as i32, BALL_OUTLINE_COLOR);
    draw_filled_circle_mut(frame, center, 5, CENTROID_COLOR);
}

/// Draws the tracked trail newest-first, thinning with age
pub fn draw_trail<'a>(
    frame: &mut RgbImage,
    trail: impl Iterator<Item = &'a TrackPoint>,
    buffer_size: usize,
) {
    let points: Vec<&TrackPoint> = trail.collect();
    for (i, pair) in points.windows(2).enumerate() {
        let thickness = ((buffer_size as f32 / (i + 1) as f32).sqrt() * 2.5) as i32;
        draw_thick_line(frame, pair[0].center, pair[1].center, thickness, TRAIL_COLOR);
    }
}

/// Colored marker standing in for the original's on-frame score text
pub fn draw_rating_marker(frame: &mut RgbImage, rating: Rating) {
    let rect = Rect::at(MARKER_POS.0, MARKER_POS.1).of_size(MARKER_SIZE.0, MARKER_SIZE.1);
    draw_filled_rect_mut(frame, rect, rating.color());
}

/// A line segment with width, stamped as discs along its length
fn draw_thick_line(
    frame: &mut RgbImage,
    start: (f32, f32),
    end: (f32, f32),
    thickness: i32,
    color: Rgb<u8>,
) {
    if thickness <= 1 {
        draw_line_segment_mut(frame, start, end, color);
        return;
    }
    let length = crate::geometry::distance(start, end);
    let steps = (length.ceil() as i32).max(1);
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let x = start.0 + (end.0 - start.0) * t;
        let y = start.1 + (end.1 - start.1) * t;
        draw_filled_circle_mut(frame, (x as i32, y as i32), thickness / 2, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullseye_ring_is_painted() {
        let mut frame = RgbImage::new(400, 300);
        draw_bullseye(&mut frame, (300.0, 180.0));
        assert_eq!(*frame.get_pixel(310, 180), BULLSEYE_COLOR);
    }

    #[test]
    fn test_trail_paints_between_points() {
        let mut frame = RgbImage::new(200, 200);
        let points = [
            TrackPoint {
                center: (50.0, 100.0),
                radius: 12.0,
            },
            TrackPoint {
                center: (150.0, 100.0),
                radius: 10.0,
            },
        ];
        draw_trail(&mut frame, points.iter(), 64);
        assert_eq!(*frame.get_pixel(100, 100), TRAIL_COLOR);
    }

    #[test]
    fn test_rating_marker_uses_rating_color() {
        let mut frame = RgbImage::new(400, 300);
        draw_rating_marker(&mut frame, Rating::Perfect);
        assert_eq!(*frame.get_pixel(210, 255), Rating::Perfect.color());
    }

    #[test]
    fn test_offscreen_detection_does_not_panic() {
        let mut frame = RgbImage::new(100, 100);
        let detection = Detection {
            center: (95.0, 95.0),
            radius: 30.0,
        };
        draw_detection(&mut frame, &detection);
    }
}
