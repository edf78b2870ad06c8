//! Encoding sinks.
//!
//! Sinks consume rendered frames in output order. The container is picked from the output file
//! extension by [`OutputFormat::from_path`] and built by [`create_sink`].

/// `ffmpeg`-based sinks (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Animated GIF output via the `image` crate.
pub mod gif;
/// Generic frame sink trait and built-in sinks.
pub mod sink;

use std::path::Path;

use crate::foundation::core::Fps;
use crate::foundation::error::{TypingError, TypingResult};

/// Output container, chosen from the output file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// H.264 in an MP4 container, encoded by the system `ffmpeg`.
    Mp4,
    /// Infinitely looping animated GIF.
    Gif,
}

impl OutputFormat {
    /// Pick a format from `path`'s extension (case-insensitive).
    pub fn from_path(path: &Path) -> TypingResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("mp4") => Ok(Self::Mp4),
            Some("gif") => Ok(Self::Gif),
            Some(other) => Err(TypingError::unsupported_format(format!(
                "'.{other}' in '{}' (expected .mp4 or .gif)",
                path.display()
            ))),
            None => Err(TypingError::unsupported_format(format!(
                "'{}' has no file extension (expected .mp4 or .gif)",
                path.display()
            ))),
        }
    }

    /// Canonical file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Gif => "gif",
        }
    }
}

/// Build the sink for `format` writing to `out_path`.
pub fn create_sink(
    format: OutputFormat,
    out_path: &Path,
    fps: Fps,
    overwrite: bool,
) -> Box<dyn sink::FrameSink> {
    match format {
        OutputFormat::Mp4 => {
            let mut opts = ffmpeg::FfmpegSinkOpts::new(out_path);
            opts.fps = fps;
            opts.overwrite = overwrite;
            Box::new(ffmpeg::FfmpegSink::new(opts))
        }
        OutputFormat::Gif => {
            let mut opts = gif::GifSinkOpts::new(out_path);
            opts.overwrite = overwrite;
            Box::new(gif::GifSink::new(opts))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/mod.rs"]
mod tests;
