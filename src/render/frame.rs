use std::time::Duration;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**. The `premultiplied` flag makes this explicit at API
/// boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// A frame image and how long it stays on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Composed keyboard image.
    pub image: FrameRGBA,
    /// Display duration.
    pub duration: Duration,
}
