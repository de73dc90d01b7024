use crate::audio::AudioFeedback;
use crate::bounce::BounceDetector;
use crate::config::TrackerConfig;
use crate::locator;
use crate::preprocess;
use crate::processor_utils;
use crate::progress::FrameProgress;
use crate::scorer::{self, ShotScore};
use crate::video::{FrameSource, VideoWriter};
use anyhow::Result;
use image::RgbImage;
use std::sync::atomic::{AtomicBool, Ordering};

/// A bounce that has been located and scored
#[derive(Debug, Clone, Copy)]
pub struct ScoredBounce {
    pub location: (f32, f32),
    pub shot: ShotScore,
}

/// What a full run produced
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub frames: u64,
    pub bounces: usize,
    pub best_accuracy: Option<f32>,
}

/// Runs the frame-driven pipeline: preprocess, locate, advance the bounce
/// state machine, score, annotate
pub struct BounceProcessor {
    config: TrackerConfig,
    detector: BounceDetector,
    last_shot: Option<ShotScore>,
    bounces: usize,
    best_accuracy: Option<f32>,
}

impl BounceProcessor {
    pub fn new(config: TrackerConfig) -> Self {
        let detector = BounceDetector::new(&config);
        Self {
            config,
            detector,
            last_shot: None,
            bounces: 0,
            best_accuracy: None,
        }
    }

    /// Consumes one raw frame and returns the annotated frame plus the
    /// bounce scored on it, if any
    pub fn process_frame(&mut self, frame: &RgbImage) -> (RgbImage, Option<ScoredBounce>) {
        let normalized = preprocess::normalize(frame, self.config.frame_width);
        let hsv = preprocess::to_hsv(&normalized);
        let detection = locator::locate_ball(&hsv, self.config.hsv_lower, self.config.hsv_upper);

        let event = self.detector.step(detection.as_ref());
        processor_utils::print_frame_debug_info(detection.as_ref(), &self.detector);

        let bounce = event.map(|event| {
            let shot = scorer::rate_shot(event.location, self.config.bullseye);
            self.bounces += 1;
            self.best_accuracy = Some(match self.best_accuracy {
                Some(best) => best.min(shot.accuracy),
                None => shot.accuracy,
            });
            self.last_shot = Some(shot);
            ScoredBounce {
                location: event.location,
                shot,
            }
        });

        let mut annotated = normalized;
        processor_utils::annotate_frame(
            &mut annotated,
            &self.config,
            detection.as_ref(),
            &self.detector,
            self.last_shot.as_ref(),
        );
        (annotated, bounce)
    }

    /// Drives the source to the end of its stream, or until the stop flag is
    /// raised. One frame per iteration, pipeline run to completion before
    /// the next frame is requested.
    pub fn process_video(
        &mut self,
        source: &mut dyn FrameSource,
        audio: &AudioFeedback,
        record_path: Option<&str>,
        stop: &AtomicBool,
    ) -> Result<RunSummary> {
        let mut progress = FrameProgress::new(source.total_frames(), source.frame_rate());
        let mut writer: Option<VideoWriter> = None;

        while let Some(frame) = source.next_frame()? {
            let (annotated, bounce) = self.process_frame(&frame);

            if let Some(bounce) = bounce {
                println!(
                    "Wall hit at ({:.0}, {:.0}) | accuracy {:.1} | {}",
                    bounce.location.0,
                    bounce.location.1,
                    bounce.shot.accuracy,
                    bounce.shot.rating.label()
                );
                audio.play(bounce.shot.rating);
            }

            if let Some(path) = record_path {
                if writer.is_none() {
                    writer = Some(VideoWriter::new(
                        path,
                        annotated.width(),
                        annotated.height(),
                        source.frame_rate(),
                    )?);
                }
                if let Some(writer) = writer.as_mut() {
                    writer.write_frame(&annotated)?;
                }
            }

            progress.update_frame();
            if stop.load(Ordering::SeqCst) {
                processor_utils::debug_println(format_args!("stop requested, ending run"));
                break;
            }
        }

        if let Some(writer) = writer {
            writer.finish()?;
        }
        progress.finish(self.bounces);

        Ok(RunSummary {
            frames: progress.processed_frames(),
            bounces: self.bounces,
            best_accuracy: self.best_accuracy,
        })
    }
}
