use crate::processor_utils;
use crate::scorer::Rating;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Checks if ffplay is installed and available in the system
pub fn check_ffplay_installed() -> Result<()> {
    let status = Command::new("ffplay")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .context("Failed to execute ffplay. Is ffmpeg installed?")?;

    if !status.success() {
        anyhow::bail!("ffplay is not properly installed");
    }

    Ok(())
}

/// Plays the cue matching each shot rating, fire-and-forget
pub struct AudioFeedback {
    sounds_dir: PathBuf,
    muted: bool,
}

impl AudioFeedback {
    pub fn new(sounds_dir: &str, muted: bool) -> Self {
        Self {
            sounds_dir: PathBuf::from(sounds_dir),
            muted,
        }
    }

    /// Spawns the player on the rating's cue file. Playback failures are
    /// logged and swallowed; feedback must never stall the frame loop.
    pub fn play(&self, rating: Rating) {
        if self.muted {
            return;
        }
        let cue = self.sounds_dir.join(rating.cue_file());
        let spawned = Command::new("ffplay")
            .args(["-nodisp", "-autoexit", "-loglevel", "quiet"])
            .arg(&cue)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(mut child) => {
                // Reap off the frame loop so finished players don't linger
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            Err(err) => {
                processor_utils::debug_println(format_args!(
                    "audio cue {} failed to start: {}",
                    cue.display(),
                    err
                ));
            }
        }
    }
}
