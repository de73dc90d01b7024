use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;

/// Progress reporting for a frame-processing run
pub struct FrameProgress {
    bar: ProgressBar,
    started: Instant,
    total_frames: Option<u64>,
    frame_rate: f64,
    processed: u64,
}

impl FrameProgress {
    /// Creates a tracker; renders a bar when the frame count is known and a
    /// spinner otherwise
    pub fn new(total_frames: Option<u64>, frame_rate: f64) -> Self {
        let bar = match total_frames {
            Some(total) => {
                let bar = ProgressBar::new(total);
                let style = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({percent}%) | {msg}")
                    .unwrap()
                    .progress_chars("#>-");
                bar.set_style(style);
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                let style = ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {pos} frames | {msg}")
                    .unwrap();
                bar.set_style(style);
                bar
            }
        };

        Self {
            bar,
            started: Instant::now(),
            total_frames,
            frame_rate,
            processed: 0,
        }
    }

    /// Advances by one frame and refreshes the status message
    pub fn update_frame(&mut self) {
        self.processed += 1;
        self.bar.inc(1);
        self.bar.set_message(self.message());
    }

    fn message(&self) -> String {
        let elapsed = self.started.elapsed().as_secs_f64();
        let fps = if elapsed > 0.0 {
            self.processed as f64 / elapsed
        } else {
            0.0
        };
        let position = format_duration(self.processed as f64 / self.frame_rate);
        match self.total_frames {
            Some(total) if fps > 0.0 => {
                let remaining = total.saturating_sub(self.processed);
                format!(
                    "{} | Speed: {:.1} fps | ETA: {}",
                    position,
                    fps,
                    format_duration(remaining as f64 / fps)
                )
            }
            _ => format!("{} | Speed: {:.1} fps", position, fps),
        }
    }

    /// Finishes the bar with a run summary line
    pub fn finish(&self, bounces: usize) {
        let elapsed = self.started.elapsed().as_secs_f64();
        let avg_fps = if elapsed > 0.0 {
            self.processed as f64 / elapsed
        } else {
            0.0
        };
        self.bar.finish_with_message(format!(
            "Completed! Frames: {} | Bounces: {} | Processing: {} | Avg FPS: {:.1}",
            self.processed,
            bounces,
            format_duration(elapsed),
            avg_fps
        ));
    }

    pub fn processed_frames(&self) -> u64 {
        self.processed
    }
}

/// Formats a duration in seconds to h:mm:ss format
fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
