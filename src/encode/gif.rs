use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context as _;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, RgbaImage};

use crate::encode::ffmpeg::{TickClock, ensure_parent_dir};
use crate::encode::sink::{FrameGuard, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{TypingError, TypingResult};
use crate::foundation::math::flatten_premul_over_bg_to_opaque_rgba8;
use crate::render::frame::Frame;

/// GIF frame delays are stored in hundredths of a second.
const GIF_TICKS: Fps = Fps { num: 100, den: 1 };

/// Options for [`GifSink`].
#[derive(Clone, Debug)]
pub struct GifSinkOpts {
    /// Output GIF file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Quantizer speed, 1 (best) to 30 (fastest).
    pub speed: i32,
}

impl GifSinkOpts {
    /// Create options for outputting a looping GIF to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            speed: 10,
        }
    }
}

/// Compressed bytes shared between the encoder and the sink.
#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Sink that encodes an infinitely looping animated GIF.
///
/// The animation is assembled in memory and written to `out_path` only once `end` succeeds, so a
/// failed render never leaves a truncated GIF behind.
pub struct GifSink {
    opts: GifSinkOpts,
    buf: SharedBuf,
    encoder: Option<GifEncoder<SharedBuf>>,
    scratch: Vec<u8>,
    bg_rgba: [u8; 4],
    guard: FrameGuard,
    clock: TickClock,
}

impl GifSink {
    /// Create a new GIF sink.
    pub fn new(opts: GifSinkOpts) -> Self {
        Self {
            opts,
            buf: SharedBuf::default(),
            encoder: None,
            scratch: Vec::new(),
            bg_rgba: [0, 0, 0, 255],
            guard: FrameGuard::default(),
            clock: TickClock::new(GIF_TICKS),
        }
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> TypingResult<()> {
        if cfg.canvas.width > u32::from(u16::MAX) || cfg.canvas.height > u32::from(u16::MAX) {
            return Err(TypingError::validation(
                "gif width/height must fit in 16 bits",
            ));
        }
        self.guard.begin(cfg.canvas)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(TypingError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        self.buf = SharedBuf::default();
        let mut encoder = GifEncoder::new_with_speed(self.buf.clone(), self.opts.speed.clamp(1, 30));
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| TypingError::encode(format!("gif: {e}")))?;

        self.encoder = Some(encoder);
        self.scratch =
            vec![0u8; (cfg.canvas.width as usize) * (cfg.canvas.height as usize) * 4];
        self.bg_rgba = cfg.bg_rgba;
        self.clock = TickClock::new(GIF_TICKS);
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> TypingResult<()> {
        self.guard.check(idx, frame)?;
        let Some(encoder) = self.encoder.as_mut() else {
            return Err(TypingError::encode("gif sink is already finalized"));
        };

        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.image.data, self.bg_rgba)?;
        let image = RgbaImage::from_raw(frame.image.width, frame.image.height, self.scratch.clone())
            .ok_or_else(|| TypingError::encode("gif: frame buffer does not match its size"))?;

        let centis = self.clock.advance(frame.duration);
        let centis = u32::try_from(centis)
            .map_err(|_| TypingError::validation("gif frame duration is too long"))?;
        let delay = Delay::from_numer_denom_ms(centis.saturating_mul(10), 1);

        encoder
            .encode_frame(image::Frame::from_parts(image, 0, 0, delay))
            .map_err(|e| TypingError::encode(format!("gif: {e}")))?;
        Ok(())
    }

    fn end(&mut self) -> TypingResult<()> {
        self.guard.finish()?;
        // Dropping the encoder writes the GIF trailer.
        drop(self.encoder.take());
        let bytes = self.buf.0.take();

        ensure_parent_dir(&self.opts.out_path)?;
        std::fs::write(&self.opts.out_path, &bytes)
            .with_context(|| format!("failed to write '{}'", self.opts.out_path.display()))?;
        tracing::debug!(bytes = bytes.len(), centis = self.clock.emitted(), "gif written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
