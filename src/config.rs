use crate::cli::Args;
use anyhow::{Context, Result};

/// Immutable tracker settings, resolved once at startup
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Width frames are resized to before any detection work
    pub frame_width: u32,
    /// Lower HSV bound of what counts as ball-colored (OpenCV ranges, H 0..=180)
    pub hsv_lower: [u8; 3],
    /// Upper HSV bound of what counts as ball-colored
    pub hsv_upper: [u8; 3],
    /// Fixed target point shots are scored against, in resized-frame pixels
    pub bullseye: (f32, f32),
    /// Capacity of the tracking history
    pub buffer_size: usize,
    /// Unique observations to wait before another reversal may count as a bounce
    pub max_diminish: i32,
    /// Allow direction evaluation after 3 unique observations instead of 6
    pub cool_off_override: bool,
}

/// Builds the tracker configuration from command line arguments
pub fn build_config(args: &Args) -> Result<TrackerConfig> {
    let hsv_lower = parse_hsv_triple(&args.hsv_lower)
        .with_context(|| format!("invalid --hsv-lower value: {}", args.hsv_lower))?;
    let hsv_upper = parse_hsv_triple(&args.hsv_upper)
        .with_context(|| format!("invalid --hsv-upper value: {}", args.hsv_upper))?;

    if args.buffer == 0 {
        anyhow::bail!("--buffer must be at least 1");
    }

    Ok(TrackerConfig {
        frame_width: args.width,
        hsv_lower,
        hsv_upper,
        bullseye: (args.target_x, args.target_y),
        buffer_size: args.buffer,
        max_diminish: args.max_diminish,
        cool_off_override: !args.no_cool_off_override,
    })
}

/// Parses an "h,s,v" string into a channel triple
fn parse_hsv_triple(value: &str) -> Result<[u8; 3]> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        anyhow::bail!("expected three comma-separated components, got {}", parts.len());
    }
    let mut triple = [0u8; 3];
    for (slot, part) in triple.iter_mut().zip(&parts) {
        *slot = part
            .parse::<u8>()
            .with_context(|| format!("component {:?} is not in 0..=255", part))?;
    }
    // Hue tops out at 180 in OpenCV's 8-bit HSV encoding
    if triple[0] > 180 {
        anyhow::bail!("hue component {} exceeds 180", triple[0]);
    }
    Ok(triple)
}
