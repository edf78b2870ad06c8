use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::encode::sink::{FrameSink, MAX_FRAME_DURATION, SinkConfig};
use crate::encode::{OutputFormat, create_sink};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{TypingError, TypingResult};
use crate::keystroke::compiler::{CompileOptions, UnsupportedPolicy, compile_text};
use crate::layout::model::Layout;
use crate::render::frame::Frame;
use crate::render::raster::{SvgRasterizer, check_canvas};
use crate::render::renderer::{FrameRenderer, RendererOptions};
use crate::render::scene::{DisplayMode, KeyboardScene};
use crate::theme::model::Theme;

/// Everything needed to turn a text into a typing animation.
#[derive(Clone, Debug)]
pub struct RenderRequest {
    /// Text to type.
    pub text: String,
    /// Output file; the extension selects the container.
    pub out_path: PathBuf,
    /// Built-in layout name or path to a layout JSON document.
    pub layout: String,
    /// Built-in theme name or path to a theme JSON document.
    pub theme: String,
    /// Keystroke events per second.
    pub speed: f64,
    /// MP4 frame rate.
    pub fps: u32,
    /// Unsupported-character policy.
    pub policy: UnsupportedPolicy,
    /// Show the typed-text display above the keyboard.
    pub display: bool,
    /// Invert the colors of every frame.
    pub invert_colors: bool,
    /// Lowercase the text before compiling it.
    pub force_lowercase: bool,
    /// Extra time the last frame stays on screen.
    pub end_hold: Duration,
    /// Additional font directories for key legends and the display.
    pub font_dirs: Vec<PathBuf>,
    /// Replace an existing output file.
    pub overwrite: bool,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            text: String::new(),
            out_path: PathBuf::from("output.mp4"),
            layout: "en".to_string(),
            theme: "light".to_string(),
            speed: 5.0,
            fps: 24,
            policy: UnsupportedPolicy::Fail,
            display: true,
            invert_colors: false,
            force_lowercase: false,
            end_hold: Duration::ZERO,
            font_dirs: Vec::new(),
            overwrite: true,
        }
    }
}

impl RenderRequest {
    /// Time between two keystroke events.
    pub fn interval(&self) -> TypingResult<Duration> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(TypingError::validation(format!(
                "speed must be a positive number, got {}",
                self.speed
            )));
        }
        let interval = Duration::try_from_secs_f64(1.0 / self.speed)
            .map_err(|e| TypingError::validation(format!("speed {}: {e}", self.speed)))?;
        if interval.is_zero() {
            return Err(TypingError::validation(format!(
                "speed {} is too high",
                self.speed
            )));
        }
        if interval > MAX_FRAME_DURATION {
            return Err(TypingError::validation(format!(
                "speed {} is too low",
                self.speed
            )));
        }
        Ok(interval)
    }

    /// Duration of the last frame: one interval plus the end hold.
    pub fn final_frame_duration(&self) -> TypingResult<Duration> {
        let tail = self.interval()?.saturating_add(self.end_hold);
        if tail > MAX_FRAME_DURATION {
            return Err(TypingError::validation(format!(
                "end hold {:?} is too long (the last frame may last at most {:?})",
                self.end_hold, MAX_FRAME_DURATION
            )));
        }
        Ok(tail)
    }
}

/// Summary of a finished render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderStats {
    /// Output container.
    pub format: Option<OutputFormat>,
    /// Frame dimensions.
    pub canvas: Canvas,
    /// Keystroke events compiled from the text.
    pub events: u64,
    /// Frames handed to the sink.
    pub frames: u64,
    /// Frames that were rasterized (the rest came from the cache).
    pub rasterized: u64,
    /// Characters dropped under [`UnsupportedPolicy::Skip`].
    pub skipped: u64,
    /// Total clip length.
    pub duration: Duration,
}

/// Render `req` to `req.out_path`, picking the encoder from its extension.
///
/// The output format, layout, theme and text are all validated before a sink is started, so
/// those failures never touch the file system. If encoding fails after the sink started, the
/// partial output file is removed.
#[tracing::instrument(skip_all, fields(out = %req.out_path.display()))]
pub fn render_video(req: &RenderRequest) -> TypingResult<RenderStats> {
    let format = OutputFormat::from_path(&req.out_path)?;
    let fps = Fps::new(req.fps, 1)?;
    let sink = create_sink(format, &req.out_path, fps, req.overwrite);
    let mut sink = CleanupOnFailure::new(sink, &req.out_path);

    let mut stats = render_to_sink(req, &mut sink)?;
    stats.format = Some(format);
    Ok(stats)
}

/// Render `req` into an arbitrary sink. `req.out_path` is ignored.
#[tracing::instrument(skip_all, fields(layout = %req.layout, theme = %req.theme))]
pub fn render_to_sink(req: &RenderRequest, sink: &mut dyn FrameSink) -> TypingResult<RenderStats> {
    let interval = req.interval()?;
    req.final_frame_duration()?;
    let layout = Layout::resolve(&req.layout)?;
    let theme = Theme::resolve(&req.theme)?;
    tracing::info!(layout = layout.name(), theme = %theme.name, "resolved assets");

    let text = if req.force_lowercase {
        req.text.to_lowercase()
    } else {
        req.text.clone()
    };
    let seq = compile_text(
        &text,
        &layout,
        &CompileOptions {
            policy: req.policy,
            interval,
        },
    )?;
    tracing::info!(events = seq.len(), skipped = seq.skipped.len(), "compiled text");

    let display = DisplayMode::for_layout(&layout, req.display);
    let scene = KeyboardScene::new(&layout, &theme, display);
    let rasterizer = SvgRasterizer::new(&theme.font_family, &req.font_dirs);
    let mut renderer = FrameRenderer::new(
        scene,
        rasterizer,
        RendererOptions {
            invert_colors: req.invert_colors,
            interval,
            end_hold: req.end_hold,
        },
    );

    let canvas = renderer.canvas();
    check_canvas(canvas)?;
    sink.begin(SinkConfig {
        canvas,
        bg_rgba: background_rgba(&theme, req.invert_colors),
    })?;

    let mut duration = Duration::ZERO;
    renderer.render_sequence(&seq, |idx, frame| {
        duration += frame.duration;
        sink.push_frame(idx, &frame)
    })?;
    sink.end()?;

    let r = renderer.stats();
    tracing::info!(
        frames = r.frames,
        rasterized = r.rasterized,
        cache_hits = r.cache_hits,
        "rendered frames"
    );

    Ok(RenderStats {
        format: None,
        canvas,
        events: seq.len() as u64,
        frames: r.frames,
        rasterized: r.rasterized,
        skipped: seq.skipped.len() as u64,
        duration,
    })
}

fn background_rgba(theme: &Theme, invert: bool) -> [u8; 4] {
    let [r, g, b, _] = theme.background.to_rgba8();
    if invert {
        [255 - r, 255 - g, 255 - b, 255]
    } else {
        [r, g, b, 255]
    }
}

/// Removes the output file when a started sink does not finish cleanly.
struct CleanupOnFailure<'a> {
    inner: Option<Box<dyn FrameSink>>,
    path: &'a Path,
    armed: bool,
}

impl<'a> CleanupOnFailure<'a> {
    fn new(inner: Box<dyn FrameSink>, path: &'a Path) -> Self {
        Self {
            inner: Some(inner),
            path,
            armed: false,
        }
    }

    fn inner(&mut self) -> TypingResult<&mut dyn FrameSink> {
        match self.inner.as_mut() {
            Some(sink) => Ok(sink.as_mut()),
            None => Err(TypingError::encode("sink already released")),
        }
    }
}

impl FrameSink for CleanupOnFailure<'_> {
    fn begin(&mut self, cfg: SinkConfig) -> TypingResult<()> {
        let sink = self.inner()?;
        sink.begin(cfg)?;
        let created = sink.creates_output_on_begin();
        self.armed = created;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> TypingResult<()> {
        self.inner()?.push_frame(idx, frame)
    }

    fn end(&mut self) -> TypingResult<()> {
        // From here on every sink may be writing the file.
        self.armed = true;
        self.inner()?.end()?;
        self.armed = false;
        Ok(())
    }

    fn creates_output_on_begin(&self) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|sink| sink.creates_output_on_begin())
    }
}

impl Drop for CleanupOnFailure<'_> {
    fn drop(&mut self) {
        // Release the encoder (and its open file) first.
        drop(self.inner.take());
        if self.armed && self.path.exists() {
            tracing::warn!(path = %self.path.display(), "removing partial output");
            let _ = std::fs::remove_file(self.path);
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
