//! typingvid renders typing animations on an on-screen keyboard.
//!
//! A text is compiled into press/release events against a keyboard [`Layout`], every event
//! becomes one frame of a themed keyboard drawn as SVG, and the frames are encoded to MP4 (via
//! the system `ffmpeg`) or to an animated GIF:
//!
//! - Resolve a [`Layout`] and a [`Theme`] (built-in name or JSON path)
//! - Compile text with [`compile_text`]
//! - Render a [`RenderRequest`] with [`render_video`], or stream into any [`FrameSink`] with
//!   [`render_to_sink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Encoding sinks.
pub mod encode;
/// Keystroke compilation.
pub mod keystroke;
/// Keyboard layouts.
pub mod layout;
/// End-to-end rendering.
pub mod pipeline;
/// Frame rendering.
pub mod render;
/// Visual themes.
pub mod theme;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rect, Size};
pub use crate::foundation::error::{TypingError, TypingResult};

pub use crate::encode::OutputFormat;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::gif::{GifSink, GifSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::keystroke::compiler::{
    CompileOptions, KeyAction, KeystrokeEvent, KeystrokeSequence, UnsupportedPolicy, compile_text,
};
pub use crate::layout::model::{KeyId, Layout, builtin_layout_names};
pub use crate::pipeline::{RenderRequest, RenderStats, render_to_sink, render_video};
pub use crate::render::frame::{Frame, FrameRGBA};
pub use crate::theme::model::{Theme, builtin_theme_names};
