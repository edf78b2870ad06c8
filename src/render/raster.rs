use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::core::Canvas;
use crate::foundation::error::{TypingError, TypingResult};
use crate::render::frame::FrameRGBA;

const MAX_DIM: u32 = 16_384;

/// Parses SVG documents and rasterizes them into premultiplied RGBA8 frames.
///
/// The font database is loaded once at construction: system fonts first, then any extra font
/// directories in order.
pub struct SvgRasterizer {
    opts: usvg::Options<'static>,
}

impl std::fmt::Debug for SvgRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgRasterizer")
            .field("font_faces", &self.font_face_count())
            .finish()
    }
}

impl SvgRasterizer {
    /// Build a rasterizer with system fonts plus fonts found in `font_dirs`.
    pub fn new(font_family: &str, font_dirs: &[PathBuf]) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        for dir in font_dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.faces().count(), "loaded font database");

        let opts = usvg::Options {
            font_family: font_family.to_string(),
            fontdb: Arc::new(db),
            ..Default::default()
        };
        Self { opts }
    }

    /// Number of font faces available to SVG text.
    pub fn font_face_count(&self) -> usize {
        self.opts.fontdb.faces().count()
    }

    /// Parse `svg` and rasterize it at exactly `canvas` pixels.
    pub fn rasterize(&self, svg: &str, canvas: Canvas) -> TypingResult<FrameRGBA> {
        check_canvas(canvas)?;

        let tree = usvg::Tree::from_str(svg, &self.opts).context("parse keyboard svg")?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
            .ok_or_else(|| TypingError::render("failed to allocate frame pixmap"))?;

        let sx = (canvas.width as f32) / tree.size().width();
        let sy = (canvas.height as f32) / tree.size().height();
        let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

        resvg::render(&tree, xform, &mut pixmap.as_mut());

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.take(),
            premultiplied: true,
        })
    }
}

/// Reject canvases the rasterizer cannot allocate.
pub(crate) fn check_canvas(canvas: Canvas) -> TypingResult<()> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(TypingError::render("canvas width/height must be non-zero"));
    }
    if canvas.width > MAX_DIM || canvas.height > MAX_DIM {
        return Err(TypingError::render(format!(
            "canvas too large: {}x{} (max {MAX_DIM}x{MAX_DIM})",
            canvas.width, canvas.height
        )));
    }
    Ok(())
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to load font");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
