use crate::geometry;
use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{BorderType, find_contours};
use imageproc::distance_transform::Norm;
use imageproc::geometry::convex_hull;
use imageproc::morphology::{dilate, erode};
use imageproc::point::Point;

/// Iterations of 3x3 erosion and dilation applied to the color mask
const MORPH_ITERATIONS: u8 = 2;

/// A single-frame ball observation in resized-frame coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub center: (f32, f32),
    pub radius: f32,
}

/// Finds the ball in a preprocessed HSV frame.
///
/// Thresholds the frame against the configured color bounds, cleans the mask
/// with erosion and dilation, and fits the minimum enclosing circle of the
/// largest external contour. Returns `None` when no ball-colored region
/// survives, including the degenerate zero-area case.
pub fn locate_ball(hsv: &RgbImage, lower: [u8; 3], upper: [u8; 3]) -> Option<Detection> {
    let mask = in_range(hsv, lower, upper);
    let mask = erode(&mask, Norm::LInf, MORPH_ITERATIONS);
    let mask = dilate(&mask, Norm::LInf, MORPH_ITERATIONS);

    let contour = largest_external_contour(&mask)?;
    let hull = convex_hull(contour.as_slice());
    let hull_points: Vec<(f32, f32)> = hull
        .iter()
        .map(|p| (p.x as f32, p.y as f32))
        .collect();

    let circle = geometry::min_enclosing_circle(&hull_points)?;
    Some(Detection {
        center: circle.center,
        radius: circle.radius,
    })
}

/// Binary mask of pixels inside the inclusive HSV bounds
fn in_range(hsv: &RgbImage, lower: [u8; 3], upper: [u8; 3]) -> GrayImage {
    let mut mask = GrayImage::new(hsv.width(), hsv.height());
    for (dst, src) in mask.pixels_mut().zip(hsv.pixels()) {
        let inside = src
            .0
            .iter()
            .zip(lower.iter().zip(upper.iter()))
            .all(|(&c, (&lo, &hi))| c >= lo && c <= hi);
        *dst = Luma([if inside { 255 } else { 0 }]);
    }
    mask
}

/// The largest external contour by enclosed area, first-found winning ties.
/// A degenerate zero-area winner counts as no detection.
fn largest_external_contour(mask: &GrayImage) -> Option<Vec<Point<i32>>> {
    let contours = find_contours::<i32>(mask);
    let mut best: Option<(f32, &Vec<Point<i32>>)> = None;
    for contour in &contours {
        if contour.border_type != BorderType::Outer || contour.parent.is_some() {
            continue;
        }
        let outline: Vec<(f32, f32)> = contour
            .points
            .iter()
            .map(|p| (p.x as f32, p.y as f32))
            .collect();
        let area = geometry::polygon_area(&outline);
        if best.as_ref().is_none_or(|(best_area, _)| area > *best_area) {
            best = Some((area, &contour.points));
        }
    }
    match best {
        Some((area, points)) if area > 0.0 => Some(points.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::to_hsv;
    use image::Rgb;

    const BALL_ORANGE: Rgb<u8> = Rgb([255, 140, 0]);
    const LOWER: [u8; 3] = [0, 88, 91];
    const UPPER: [u8; 3] = [56, 255, 255];

    /// Paints a filled disc on a black frame
    fn draw_ball_frame(w: u32, h: u32, center: (f32, f32), radius: f32) -> RgbImage {
        let mut frame = RgbImage::new(w, h);
        paint_disc(&mut frame, center, radius);
        frame
    }

    fn paint_disc(frame: &mut RgbImage, center: (f32, f32), radius: f32) {
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                let dx = x as f32 - center.0;
                let dy = y as f32 - center.1;
                if (dx * dx + dy * dy).sqrt() <= radius {
                    frame.put_pixel(x, y, BALL_ORANGE);
                }
            }
        }
    }

    #[test]
    fn test_locates_synthetic_ball() {
        let frame = draw_ball_frame(200, 150, (80.0, 60.0), 20.0);
        let detection = locate_ball(&to_hsv(&frame), LOWER, UPPER).unwrap();
        assert!((detection.center.0 - 80.0).abs() < 3.0);
        assert!((detection.center.1 - 60.0).abs() < 3.0);
        assert!((detection.radius - 20.0).abs() < 4.0);
    }

    #[test]
    fn test_empty_frame_yields_absent() {
        let frame = RgbImage::new(200, 150);
        assert!(locate_ball(&to_hsv(&frame), LOWER, UPPER).is_none());
    }

    #[test]
    fn test_largest_blob_wins() {
        let mut frame = draw_ball_frame(200, 150, (60.0, 80.0), 22.0);
        paint_disc(&mut frame, (160.0, 40.0), 8.0);
        let detection = locate_ball(&to_hsv(&frame), LOWER, UPPER).unwrap();
        assert!((detection.center.0 - 60.0).abs() < 3.0);
        assert!((detection.center.1 - 80.0).abs() < 3.0);
    }

    #[test]
    fn test_isolated_noise_is_removed() {
        let mut frame = RgbImage::new(200, 150);
        for &(x, y) in &[(10u32, 10u32), (50, 90), (120, 30), (190, 140)] {
            frame.put_pixel(x, y, BALL_ORANGE);
        }
        assert!(locate_ball(&to_hsv(&frame), LOWER, UPPER).is_none());
    }

    #[test]
    fn test_detection_is_deterministic() {
        let frame = draw_ball_frame(200, 150, (100.0, 75.0), 15.0);
        let hsv = to_hsv(&frame);
        assert_eq!(
            locate_ball(&hsv, LOWER, UPPER),
            locate_ball(&hsv, LOWER, UPPER)
        );
    }

    #[test]
    fn test_in_range_bounds_are_inclusive() {
        let mut hsv = RgbImage::new(1, 1);
        hsv.put_pixel(0, 0, Rgb([56, 88, 91]));
        let mask = in_range(&hsv, LOWER, UPPER);
        assert_eq!(mask.get_pixel(0, 0)[0], 255);

        hsv.put_pixel(0, 0, Rgb([57, 88, 91]));
        let mask = in_range(&hsv, LOWER, UPPER);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
    }
}
