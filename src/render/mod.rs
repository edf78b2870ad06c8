//! Keyboard frame rendering: scene to SVG, SVG to premultiplied RGBA8.

pub(crate) mod fingerprint;
/// Frame image types.
pub mod frame;
/// `usvg`/`resvg` rasterization.
pub mod raster;
/// Stateful renderer turning keystroke sequences into timed frames.
pub mod renderer;
/// Keyboard geometry and SVG generation.
pub mod scene;
/// Pressed-key tracking.
pub mod state;
