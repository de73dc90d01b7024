use anyhow::Result;
use chrono::Local;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use wallball::{audio, cli, config, processor, video};

/// Creates a timestamped output directory and returns its path
fn create_output_dir() -> Result<String> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let output_dir = format!("./runs/{}", timestamp);
    fs::create_dir_all(&output_dir)?;
    Ok(output_dir)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: cli::Args = argh::from_env();
    let tracker_config = config::build_config(&args)?;

    // Verify the external tools we shell out to are present
    video::check_ffmpeg_installed()?;
    if !args.mute {
        audio::check_ffplay_installed()?;
    }

    let record_path = if args.record {
        let output_dir = create_output_dir()?;
        println!("Created output directory: {}", output_dir);
        Some(format!("{}/processed_video.mp4", output_dir))
    } else {
        None
    };

    // Cooperative cancellation: ctrl-c raises the flag, the frame loop polls
    // it at the end of each iteration
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stop.store(true, Ordering::SeqCst);
            }
        });
    }

    let mut source = video::open_source(&args.source)?;
    let feedback = audio::AudioFeedback::new(&args.sounds, args.mute);
    let mut processor = processor::BounceProcessor::new(tracker_config);

    let summary = processor.process_video(
        source.as_mut(),
        &feedback,
        record_path.as_deref(),
        &stop,
    )?;

    println!(
        "Processed {} frames, {} bounces detected",
        summary.frames, summary.bounces
    );
    if let Some(best) = summary.best_accuracy {
        println!("Best accuracy: {:.1}", best);
    }

    if let Some(recorded) = record_path {
        println!("Processed video saved to: {}", recorded);

        // Move processed video to output_filepath if specified
        if !args.output_filepath.is_empty() {
            println!("Moving processed video to: {}", args.output_filepath);
            fs::rename(&recorded, &args.output_filepath)?;
            println!("Processed video moved successfully to: {}", args.output_filepath);
        }
    }

    Ok(())
}
