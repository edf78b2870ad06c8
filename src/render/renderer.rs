use std::collections::HashMap;
use std::time::Duration;

use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::TypingResult;
use crate::foundation::math::invert_premul_rgba8_in_place;
use crate::keystroke::compiler::KeystrokeSequence;
use crate::render::fingerprint::{FrameFingerprint, fingerprint_svg};
use crate::render::frame::{Frame, FrameRGBA};
use crate::render::raster::SvgRasterizer;
use crate::render::scene::{FrameState, KeyboardScene};
use crate::render::state::PressedKeys;

const MAX_CACHED_FRAMES: usize = 64;

/// Post-processing and timing options for [`FrameRenderer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RendererOptions {
    /// Invert RGB channels of every frame.
    pub invert_colors: bool,
    /// Duration of the last frame (and of the idle frame for an empty sequence).
    pub interval: Duration,
    /// Extra time the final frame stays on screen.
    pub end_hold: Duration,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            invert_colors: false,
            interval: Duration::from_millis(200),
            end_hold: Duration::ZERO,
        }
    }
}

/// Counters collected while rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RendererStats {
    /// Frames emitted.
    pub frames: u64,
    /// Frames that went through SVG parsing and rasterization.
    pub rasterized: u64,
    /// Frames served from the cache.
    pub cache_hits: u64,
}

/// Turns keyboard states into frames.
///
/// Rendering is deterministic: identical states produce byte-identical images, which is also
/// what makes the fingerprint cache sound.
#[derive(Debug)]
pub struct FrameRenderer {
    scene: KeyboardScene,
    rasterizer: SvgRasterizer,
    opts: RendererOptions,
    cache: HashMap<FrameFingerprint, FrameRGBA>,
    stats: RendererStats,
}

impl FrameRenderer {
    /// Create a renderer for `scene`.
    pub fn new(scene: KeyboardScene, rasterizer: SvgRasterizer, opts: RendererOptions) -> Self {
        Self {
            scene,
            rasterizer,
            opts,
            cache: HashMap::new(),
            stats: RendererStats::default(),
        }
    }

    /// Output canvas size.
    pub fn canvas(&self) -> Canvas {
        self.scene.canvas()
    }

    /// Scene being rendered.
    pub fn scene(&self) -> &KeyboardScene {
        &self.scene
    }

    /// Counters so far.
    pub fn stats(&self) -> RendererStats {
        self.stats
    }

    /// Compose the image for one keyboard state.
    pub fn render_state(&mut self, state: &FrameState<'_>) -> TypingResult<FrameRGBA> {
        let svg = self.scene.svg_document(state);
        let fp = fingerprint_svg(&svg, self.opts.invert_colors);
        if let Some(hit) = self.cache.get(&fp) {
            self.stats.cache_hits += 1;
            return Ok(hit.clone());
        }

        let mut frame = self.rasterizer.rasterize(&svg, self.scene.canvas())?;
        if self.opts.invert_colors {
            invert_premul_rgba8_in_place(&mut frame.data);
        }
        self.stats.rasterized += 1;

        if self.cache.len() < MAX_CACHED_FRAMES {
            self.cache.insert(fp, frame.clone());
        }
        Ok(frame)
    }

    /// Render one frame per event of `seq`, in order, handing each to `emit`.
    ///
    /// A frame lasts until the next event; the last frame lasts `interval + end_hold`. An empty
    /// sequence yields a single idle frame so that the output is never an empty clip.
    #[tracing::instrument(skip_all, fields(events = seq.len()))]
    pub fn render_sequence(
        &mut self,
        seq: &KeystrokeSequence,
        mut emit: impl FnMut(FrameIndex, Frame) -> TypingResult<()>,
    ) -> TypingResult<()> {
        let mut pressed = PressedKeys::new();
        let tail = self.opts.interval + self.opts.end_hold;

        if seq.is_empty() {
            let caption = self.scene.caption("");
            let image = self.render_state(&FrameState {
                pressed: &pressed,
                caption: caption.as_ref(),
            })?;
            self.stats.frames += 1;
            return emit(
                FrameIndex(0),
                Frame {
                    image,
                    duration: tail,
                },
            );
        }

        for (i, event) in seq.events.iter().enumerate() {
            pressed.apply(event);
            let caption = self.scene.caption(&seq.typed_prefix(event.typed_len));
            let image = self.render_state(&FrameState {
                pressed: &pressed,
                caption: caption.as_ref(),
            })?;

            let duration = match seq.events.get(i + 1) {
                Some(next) => next.offset.saturating_sub(event.offset),
                None => tail,
            };
            tracing::debug!(frame = i, key = %event.key, action = ?event.action, "rendered frame");

            self.stats.frames += 1;
            emit(FrameIndex(i as u64), Frame { image, duration })?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
