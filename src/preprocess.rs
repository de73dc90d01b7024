use image::{Rgb, RgbImage, imageops::FilterType, imageops::resize};

/// Blur strength matching an 11x11 Gaussian kernel
const BLUR_SIGMA: f32 = 2.0;

/// Resizes a raw frame to the working width (aspect-preserving) and smooths
/// sensor noise with a Gaussian blur. Pure function of its input.
pub fn normalize(frame: &RgbImage, target_width: u32) -> RgbImage {
    let scaled = if frame.width() == target_width {
        frame.clone()
    } else {
        let target_height = ((frame.height() as f32 * target_width as f32
            / frame.width() as f32) as u32)
            .max(1);
        resize(frame, target_width, target_height, FilterType::Triangle)
    };
    imageproc::filter::gaussian_blur_f32(&scaled, BLUR_SIGMA)
}

/// Converts an RGB frame into HSV stored channel-for-channel in an `RgbImage`.
///
/// Channel ranges follow OpenCV's 8-bit convention (H in 0..=180, S and V in
/// 0..=255) so the familiar orange thresholds apply unchanged.
pub fn to_hsv(frame: &RgbImage) -> RgbImage {
    let mut hsv = RgbImage::new(frame.width(), frame.height());
    for (dst, src) in hsv.pixels_mut().zip(frame.pixels()) {
        let Rgb([r, g, b]) = *src;
        let (h, s, v) = rgb_to_hsv(r, g, b);
        *dst = Rgb([h, s, v]);
    }
    hsv
}

/// Converts a single RGB sample to OpenCV-scaled HSV
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let diff = max - min;

    let v = max;
    let s = if max == 0.0 { 0.0 } else { 255.0 * diff / max };

    let mut h_deg = if diff == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / diff
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / diff
    } else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    if h_deg < 0.0 {
        h_deg += 360.0;
    }

    (
        (h_deg / 2.0).round() as u8,
        s.round() as u8,
        v.round() as u8,
    )
}
