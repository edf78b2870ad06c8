use crate::encode::sink::{FrameGuard, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{TypingError, TypingResult};
use crate::foundation::math::flatten_premul_over_bg_to_opaque_rgba8;
use crate::render::frame::Frame;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::time::Duration;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Constant output frame rate. Variable frame durations are expressed by repeating frames.
    pub fps: Fps,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path` at 24 fps.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            fps: Fps { num: 24, den: 1 },
        }
    }
}

/// Turns variable frame durations into whole output ticks.
///
/// Rounding is applied to the running total so that drift never accumulates; every frame still
/// gets at least one tick.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TickClock {
    fps: Fps,
    elapsed: Duration,
    emitted: u64,
}

impl TickClock {
    pub(crate) fn new(fps: Fps) -> Self {
        Self {
            fps,
            elapsed: Duration::ZERO,
            emitted: 0,
        }
    }

    /// Number of ticks the next frame of length `d` occupies.
    pub(crate) fn advance(&mut self, d: Duration) -> u64 {
        self.elapsed += d;
        let target = self.fps.duration_to_ticks_round(self.elapsed);
        let n = target.saturating_sub(self.emitted).max(1);
        self.emitted += n;
        n
    }

    pub(crate) fn emitted(&self) -> u64 {
        self.emitted
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    bg_rgba: [u8; 4],
    guard: FrameGuard,
    clock: TickClock,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        let clock = TickClock::new(opts.fps);
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            bg_rgba: [0, 0, 0, 255],
            guard: FrameGuard::default(),
            clock,
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> TypingResult<()> {
        if self.opts.fps.num == 0 || self.opts.fps.den == 0 {
            return Err(TypingError::validation("fps must be non-zero"));
        }
        let canvas = cfg.canvas;
        if !canvas.width.is_multiple_of(2) || !canvas.height.is_multiple_of(2) {
            return Err(TypingError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        self.guard.begin(canvas)?;

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(TypingError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(TypingError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        // Frames are flattened to opaque RGBA in push_frame; ffmpeg has no notion of premul.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", canvas.width, canvas.height),
        ]);
        push_input_fps(&mut cmd, self.opts.fps);
        cmd.args(["-i", "pipe:0"]);
        cmd.args([
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&self.opts.out_path);

        tracing::debug!(out = %self.opts.out_path.display(), "spawning ffmpeg");
        let mut child = cmd.spawn().map_err(|e| {
            TypingError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TypingError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| TypingError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (canvas.width as usize) * (canvas.height as usize) * 4];
        self.bg_rgba = cfg.bg_rgba;
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.clock = TickClock::new(self.opts.fps);
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> TypingResult<()> {
        self.guard.check(idx, frame)?;

        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.image.data, self.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(TypingError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        let ticks = self.clock.advance(frame.duration);
        for _ in 0..ticks {
            stdin.write_all(&self.scratch).map_err(|e| {
                TypingError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
            })?;
        }
        Ok(())
    }

    fn end(&mut self) -> TypingResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| TypingError::encode("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            TypingError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| TypingError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| TypingError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(TypingError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        tracing::debug!(ticks = self.clock.emitted(), "ffmpeg finished");
        self.guard.finish()
    }

    fn creates_output_on_begin(&self) -> bool {
        true
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // An aborted render must not leave a zombie encoder behind.
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> TypingResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
