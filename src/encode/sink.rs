use std::time::Duration;

use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{TypingError, TypingResult};
use crate::render::frame::Frame;

/// Longest on-screen time a single frame may request.
pub const MAX_FRAME_DURATION: Duration = Duration::from_secs(60 * 60);

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame dimensions; every pushed frame must match.
    pub canvas: Canvas,
    /// Background used to flatten alpha (straight RGBA8).
    pub bg_rgba: [u8; 4],
}

/// Sink contract for consuming rendered frames in output order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> TypingResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> TypingResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> TypingResult<()>;

    /// Return `true` when a successful `begin` has already created or truncated the output.
    ///
    /// Sinks that only write in `end` keep the default.
    fn creates_output_on_begin(&self) -> bool {
        false
    }
}

/// Shared ordering and size checks for sinks.
#[derive(Debug, Default)]
pub(crate) struct FrameGuard {
    canvas: Option<Canvas>,
    last_idx: Option<FrameIndex>,
}

impl FrameGuard {
    pub(crate) fn begin(&mut self, canvas: Canvas) -> TypingResult<()> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(TypingError::validation(
                "sink width/height must be non-zero",
            ));
        }
        self.canvas = Some(canvas);
        self.last_idx = None;
        Ok(())
    }

    pub(crate) fn check(&mut self, idx: FrameIndex, frame: &Frame) -> TypingResult<()> {
        let canvas = self
            .canvas
            .ok_or_else(|| TypingError::encode("sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(TypingError::encode("sink received out-of-order frame index"));
        }
        self.last_idx = Some(idx);

        let img = &frame.image;
        if img.width != canvas.width || img.height != canvas.height {
            return Err(TypingError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                img.width, img.height, canvas.width, canvas.height
            )));
        }
        if img.data.len() != (canvas.width as usize) * (canvas.height as usize) * 4 {
            return Err(TypingError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }
        if frame.duration > MAX_FRAME_DURATION {
            return Err(TypingError::validation(format!(
                "frame duration {:?} exceeds {:?}",
                frame.duration, MAX_FRAME_DURATION
            )));
        }
        Ok(())
    }

    pub(crate) fn finish(&mut self) -> TypingResult<()> {
        self.canvas
            .take()
            .map(|_| ())
            .ok_or_else(|| TypingError::encode("sink not started"))
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    guard: FrameGuard,
    frames: Vec<(FrameIndex, Frame)>,
    finished: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, Frame)] {
        &self.frames
    }

    /// Return `true` once `end` succeeded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> TypingResult<()> {
        self.guard.begin(cfg.canvas)?;
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> TypingResult<()> {
        self.guard.check(idx, frame)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> TypingResult<()> {
        self.guard.finish()?;
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
