use crate::processor_utils;
use anyhow::{Context, Result};
use image::RgbImage;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

/// Frame rate assumed for image sequences, which carry no timing metadata
const FALLBACK_FRAME_RATE: f64 = 30.0;

/// Checks if ffmpeg and ffprobe are installed and available in the system
pub fn check_ffmpeg_installed() -> Result<()> {
    for tool in ["ffmpeg", "ffprobe"] {
        let status = Command::new(tool)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("Failed to execute {}. Is ffmpeg installed?", tool))?;
        if !status.success() {
            anyhow::bail!("{} is not properly installed", tool);
        }
    }
    Ok(())
}

/// The capture seam: one frame per call, `Ok(None)` at end of stream,
/// `Err` on a fatal read failure
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
    fn frame_rate(&self) -> f64;
    fn total_frames(&self) -> Option<u64>;
}

/// Opens the right source for a path: a directory of stills or a video file
pub fn open_source(path: &str) -> Result<Box<dyn FrameSource>> {
    if Path::new(path).is_dir() {
        Ok(Box::new(ImageFolderSource::new(path)?))
    } else {
        Ok(Box::new(VideoFileSource::new(path)?))
    }
}

/// Stream metadata reported by ffprobe
#[derive(Debug, PartialEq)]
struct ProbeInfo {
    width: u32,
    height: u32,
    frame_rate: f64,
    total_frames: Option<u64>,
}

fn probe_video(path: &str) -> Result<ProbeInfo> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate,nb_frames",
            "-of",
            "default=noprint_wrappers=1",
            path,
        ])
        .output()
        .context("Failed to execute ffprobe")?;

    if !output.status.success() {
        anyhow::bail!("ffprobe failed for {}: {}", path, output.status);
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
}

/// Parses ffprobe `key=value` lines into stream metadata
fn parse_probe_output(text: &str) -> Result<ProbeInfo> {
    let mut width = None;
    let mut height = None;
    let mut frame_rate = None;
    let mut total_frames = None;

    for line in text.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key.trim() {
            "width" => width = value.trim().parse::<u32>().ok(),
            "height" => height = value.trim().parse::<u32>().ok(),
            "r_frame_rate" => frame_rate = parse_frame_rate(value.trim()),
            "nb_frames" => total_frames = value.trim().parse::<u64>().ok(),
            _ => {}
        }
    }

    Ok(ProbeInfo {
        width: width.context("ffprobe reported no stream width")?,
        height: height.context("ffprobe reported no stream height")?,
        frame_rate: frame_rate.unwrap_or(FALLBACK_FRAME_RATE),
        total_frames,
    })
}

/// Parses ffprobe's fractional rate notation, e.g. "30000/1001"
fn parse_frame_rate(value: &str) -> Option<f64> {
    let (num, den) = value.split_once('/')?;
    let num: f64 = num.parse().ok()?;
    let den: f64 = den.parse().ok()?;
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}

/// Video-file frame source: ffprobe for metadata, ffmpeg decoding the stream
/// to an rgb24 pipe read one frame at a time
pub struct VideoFileSource {
    decoder: Child,
    stdout: ChildStdout,
    width: u32,
    height: u32,
    frame_rate: f64,
    total_frames: Option<u64>,
}

impl VideoFileSource {
    pub fn new(path: &str) -> Result<Self> {
        let probe = probe_video(path)?;
        let mut decoder = Command::new("ffmpeg")
            .args(["-v", "error", "-i", path, "-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .context("Failed to execute ffmpeg to decode video")?;
        let stdout = decoder
            .stdout
            .take()
            .context("ffmpeg decoder produced no stdout pipe")?;

        Ok(Self {
            decoder,
            stdout,
            width: probe.width,
            height: probe.height,
            frame_rate: probe.frame_rate,
            total_frames: probe.total_frames,
        })
    }
}

impl FrameSource for VideoFileSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let mut buf = vec![0u8; self.width as usize * self.height as usize * 3];
        match self.stdout.read_exact(&mut buf) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                let _ = self.decoder.wait();
                return Ok(None);
            }
            Err(err) => return Err(err).context("reading decoded frame from ffmpeg"),
        }
        let frame = RgbImage::from_raw(self.width, self.height, buf)
            .context("decoded frame did not match probed dimensions")?;
        Ok(Some(frame))
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn total_frames(&self) -> Option<u64> {
        self.total_frames
    }
}

impl Drop for VideoFileSource {
    fn drop(&mut self) {
        let _ = self.decoder.kill();
        let _ = self.decoder.wait();
    }
}

/// Frame source over a directory of stills, in lexicographic order
pub struct ImageFolderSource {
    files: Vec<PathBuf>,
    index: usize,
}

impl ImageFolderSource {
    pub fn new(dir: &str) -> Result<Self> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read frame directory {}", dir))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("png") | Some("jpg") | Some("jpeg") | Some("bmp")
                )
            })
            .collect();
        files.sort();
        if files.is_empty() {
            anyhow::bail!("no image frames found in {}", dir);
        }
        Ok(Self { files, index: 0 })
    }
}

impl FrameSource for ImageFolderSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(path) = self.files.get(self.index) else {
            return Ok(None);
        };
        self.index += 1;
        let frame = image::open(path)
            .with_context(|| format!("Failed to read frame {}", path.display()))?
            .to_rgb8();
        Ok(Some(frame))
    }

    fn frame_rate(&self) -> f64 {
        FALLBACK_FRAME_RATE
    }

    fn total_frames(&self) -> Option<u64> {
        Some(self.files.len() as u64)
    }
}

/// Encodes annotated frames to a video file through an ffmpeg stdin pipe
pub struct VideoWriter {
    encoder: Child,
    stdin: Option<ChildStdin>,
    width: u32,
    height: u32,
}

impl VideoWriter {
    pub fn new(path: &str, width: u32, height: u32, frame_rate: f64) -> Result<Self> {
        let mut encoder = Command::new("ffmpeg")
            .args([
                "-v",
                "error",
                "-y",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-s",
                &format!("{}x{}", width, height),
                "-r",
                &format!("{}", frame_rate),
                "-i",
                "pipe:0",
                // Encoders want even dimensions
                "-vf",
                "pad=ceil(iw/2)*2:ceil(ih/2)*2",
                "-pix_fmt",
                "yuv420p",
                path,
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("Failed to execute ffmpeg to encode video")?;
        let stdin = encoder
            .stdin
            .take()
            .context("ffmpeg encoder accepted no stdin pipe")?;

        Ok(Self {
            encoder,
            stdin: Some(stdin),
            width,
            height,
        })
    }

    pub fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        if frame.dimensions() != (self.width, self.height) {
            anyhow::bail!(
                "frame size {:?} does not match writer size {:?}",
                frame.dimensions(),
                (self.width, self.height)
            );
        }
        let stdin = self
            .stdin
            .as_mut()
            .context("video writer already finished")?;
        stdin
            .write_all(frame.as_raw())
            .context("writing frame to ffmpeg encoder")?;
        Ok(())
    }

    /// Closes the pipe and waits for the encoder to flush the file
    pub fn finish(mut self) -> Result<()> {
        drop(self.stdin.take());
        let status = self
            .encoder
            .wait()
            .context("waiting for ffmpeg encoder")?;
        if !status.success() {
            anyhow::bail!("ffmpeg encoder failed with status: {}", status);
        }
        Ok(())
    }
}

impl Drop for VideoWriter {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Ok(None) = self.encoder.try_wait() {
            processor_utils::debug_println(format_args!("reaping unfinished video encoder"));
            let _ = self.encoder.wait();
        }
    }
}
