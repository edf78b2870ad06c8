use std::fmt::Write as _;

use crate::foundation::core::{Canvas, Rect, Size};
use crate::layout::model::{KeyId, Layout, Legend};
use crate::render::state::PressedKeys;
use crate::theme::color::Color;
use crate::theme::model::Theme;

const PROMPT: &str = "> ";
const CURSOR: char = '|';
const ELLIPSIS: char = '…';
// Advance of one narrow glyph relative to the font size (monospace faces sit around 0.6).
const MONO_ADVANCE: f64 = 0.62;
const LINE_HEIGHT: f64 = 1.6;

/// Which text display panels sit above the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    /// Keyboard only.
    Hidden,
    /// One line with the typed text.
    Single,
    /// Typed text plus its secondary-script transliteration.
    Dual,
}

impl DisplayMode {
    /// Pick the display mode for `layout`: dual when it carries a secondary script.
    pub fn for_layout(layout: &Layout, enabled: bool) -> Self {
        match (enabled, layout.has_secondary_script()) {
            (false, _) => Self::Hidden,
            (true, false) => Self::Single,
            (true, true) => Self::Dual,
        }
    }

    fn lines(self) -> usize {
        match self {
            Self::Hidden => 0,
            Self::Single => 1,
            Self::Dual => 2,
        }
    }
}

/// Text shown in the display panel for one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caption {
    /// Typed text as entered.
    pub primary: String,
    /// Typed text in the layout's secondary script.
    pub secondary: Option<String>,
}

/// Everything that varies between frames.
#[derive(Clone, Copy, Debug)]
pub struct FrameState<'a> {
    /// Keys held at this instant.
    pub pressed: &'a PressedKeys,
    /// Display text, ignored when the display is hidden.
    pub caption: Option<&'a Caption>,
}

#[derive(Clone, Debug)]
struct PlacedKey {
    id: KeyId,
    rect: Rect,
    legend: Legend,
    alt: Option<String>,
}

/// Precomputed keyboard geometry for one layout and theme.
///
/// [`KeyboardScene::svg_document`] is a pure function of the scene and the frame state.
#[derive(Clone, Debug)]
pub struct KeyboardScene {
    layout: Layout,
    theme: Theme,
    display: DisplayMode,
    canvas: Canvas,
    plate: Rect,
    panel: Option<Rect>,
    keys: Vec<PlacedKey>,
    primary_font: String,
    secondary_font: String,
}

impl KeyboardScene {
    /// Lay out `layout` with `theme` metrics.
    pub fn new(layout: &Layout, theme: &Theme, display: DisplayMode) -> Self {
        let unit = theme.key_unit;
        let gap = theme.key_gap;
        let pad = theme.padding;

        let row_units = layout
            .rows()
            .iter()
            .map(|row| row.iter().map(|k| k.width).sum::<f64>())
            .fold(0.0_f64, f64::max);
        let board_w = row_units * unit;
        let board_h = layout.rows().len() as f64 * unit;

        let panel = (display.lines() > 0).then(|| {
            let h = display.lines() as f64 * theme.display_font_size * LINE_HEIGHT
                + theme.display_font_size * 0.8;
            Rect::new(pad, pad, pad + board_w, pad + h)
        });
        let board_top = panel.map_or(pad, |p| p.y1 + pad);

        let mut keys = Vec::new();
        for (row_idx, row) in layout.rows().iter().enumerate() {
            let y0 = board_top + row_idx as f64 * unit;
            let mut x_units = 0.0;
            for key in row {
                let x0 = pad + x_units * unit;
                let rect = Rect::new(
                    x0 + gap / 2.0,
                    y0 + gap / 2.0,
                    x0 + key.width * unit - gap / 2.0,
                    y0 + unit - gap / 2.0,
                );
                keys.push(PlacedKey {
                    id: KeyId::new(&key.id),
                    rect,
                    legend: key.legend(),
                    alt: key.alt_legend(),
                });
                x_units += key.width;
            }
        }

        let plate = Rect::new(
            pad / 2.0,
            board_top - pad / 2.0,
            pad + board_w + pad / 2.0,
            board_top + board_h + pad / 2.0,
        );
        let canvas = Canvas::covering_even(Size::new(
            board_w + 2.0 * pad,
            board_top + board_h + pad,
        ));

        let primary_font = layout
            .fonts()
            .first()
            .cloned()
            .unwrap_or_else(|| theme.font_family.clone());
        let secondary_font = layout
            .fonts()
            .get(1)
            .cloned()
            .unwrap_or_else(|| primary_font.clone());

        Self {
            layout: layout.clone(),
            theme: theme.clone(),
            display,
            canvas,
            plate,
            panel,
            keys,
            primary_font,
            secondary_font,
        }
    }

    /// Output canvas size (always even).
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Display mode the scene was laid out for.
    pub fn display(&self) -> DisplayMode {
        self.display
    }

    /// Theme used by the scene.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Bounding box of `key`, if the layout has it.
    pub fn key_rect(&self, key: &KeyId) -> Option<Rect> {
        self.keys.iter().find(|k| &k.id == key).map(|k| k.rect)
    }

    /// Caption for `typed`, or `None` when the display is hidden.
    pub fn caption(&self, typed: &str) -> Option<Caption> {
        match self.display {
            DisplayMode::Hidden => None,
            DisplayMode::Single => Some(Caption {
                primary: typed.to_string(),
                secondary: None,
            }),
            DisplayMode::Dual => Some(Caption {
                primary: typed.to_string(),
                secondary: Some(self.layout.remap(typed)),
            }),
        }
    }

    /// Compose the SVG document for one frame.
    pub fn svg_document(&self, state: &FrameState<'_>) -> String {
        let t = &self.theme;
        let (w, h) = (self.canvas.width, self.canvas.height);
        let mut svg = String::with_capacity(16 * 1024);

        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        let _ = write!(
            svg,
            r#"<rect x="0" y="0" width="{w}" height="{h}" {}/>"#,
            fill_attrs(t.background)
        );

        if let (Some(panel), Some(caption)) = (self.panel, state.caption) {
            self.write_display(&mut svg, panel, caption);
        }

        let _ = write!(
            svg,
            r#"<rect {} rx="{}" {}/>"#,
            rect_attrs(self.plate),
            num(t.corner_radius * 1.5),
            fill_attrs(t.keyboard_fill)
        );

        for key in &self.keys {
            self.write_key(&mut svg, key, state.pressed.contains(&key.id));
        }

        svg.push_str("</svg>");
        svg
    }

    fn write_display(&self, svg: &mut String, panel: Rect, caption: &Caption) {
        let t = &self.theme;
        let size = t.display_font_size;
        let _ = write!(
            svg,
            r#"<rect {} rx="{}" {} {}/>"#,
            rect_attrs(panel),
            num(t.corner_radius),
            fill_attrs(t.display_fill),
            stroke_attrs(t.display_stroke, t.key_stroke_width)
        );

        let inner_pad = size * 0.5;
        let budget = ((panel.width() - 2.0 * inner_pad) / (size * MONO_ADVANCE)).floor() as usize;

        let mut lines = vec![(caption.primary.as_str(), &self.primary_font)];
        if let Some(secondary) = caption.secondary.as_deref() {
            lines.push((secondary, &self.secondary_font));
        }

        for (i, (text, font)) in lines.into_iter().enumerate() {
            let baseline = panel.y0 + size * 0.4 + (i as f64 + 0.5) * size * LINE_HEIGHT + size * 0.35;
            let _ = write!(
                svg,
                r#"<text x="{}" y="{}" font-family="{}" font-size="{}" {} xml:space="preserve">{}</text>"#,
                num(panel.x0 + inner_pad),
                num(baseline),
                font_list(&[font.as_str(), t.font_family.as_str()]),
                num(size),
                fill_attrs(t.display_text),
                escape_xml(&prompt_line(text, budget))
            );
        }
    }

    fn write_key(&self, svg: &mut String, key: &PlacedKey, pressed: bool) {
        let t = &self.theme;
        let r = key.rect;

        let _ = write!(
            svg,
            r#"<g id="key-{}""#,
            escape_xml(&visible_text(key.id.as_str()))
        );
        if pressed && t.key_pressed_offset > 0.0 {
            let _ = write!(
                svg,
                r#" transform="translate(0 {})""#,
                num(t.key_pressed_offset)
            );
        }
        svg.push('>');

        let _ = write!(
            svg,
            r#"<rect {} rx="{}" {} {}/>"#,
            rect_attrs(r),
            num(t.corner_radius),
            fill_attrs(t.key_fill),
            stroke_attrs(t.key_stroke, t.key_stroke_width)
        );
        if pressed && !t.key_pressed_fill.is_transparent() {
            let _ = write!(
                svg,
                r#"<rect {} rx="{}" {}/>"#,
                rect_attrs(r),
                num(t.corner_radius),
                fill_attrs(t.key_pressed_fill)
            );
        }

        let label_font = font_list(&[t.font_family.as_str(), self.primary_font.as_str()]);
        let size = t.label_font_size;
        let (cx, cy) = (r.center().x, r.center().y);

        match (&key.legend, key.alt.as_deref()) {
            (Legend::Single(label), None) => {
                let size = if label.chars().count() > 2 { size * 0.7 } else { size };
                write_text(svg, cx, cy + size * 0.35, "middle", &label_font, size, t.label_color, label);
            }
            (Legend::Single(label), Some(_)) => {
                let size = if label.chars().count() > 2 { size * 0.7 } else { size };
                let x = r.x0 + size * 0.45;
                let y = r.y0 + size * 1.15;
                write_text(svg, x, y, "start", &label_font, size, t.label_color, label);
            }
            (Legend::Stacked { top, bottom }, alt) => {
                let size = size * 0.85;
                let x = if alt.is_some() { r.x0 + size * 0.5 } else { cx };
                let anchor = if alt.is_some() { "start" } else { "middle" };
                let top_y = r.y0 + r.height() * 0.38 + size * 0.35;
                let bottom_y = r.y0 + r.height() * 0.74 + size * 0.35;
                write_text(svg, x, top_y, anchor, &label_font, size, t.label_color, top);
                write_text(svg, x, bottom_y, anchor, &label_font, size, t.label_color, bottom);
            }
        }

        if let Some(alt) = key.alt.as_deref() {
            let size = size * 0.8;
            let font = font_list(&[self.secondary_font.as_str(), t.font_family.as_str()]);
            let x = r.x1 - size * 0.4;
            let y = r.y1 - size * 0.45;
            write_text(svg, x, y, "end", &font, size, t.alt_label_color, alt);
        }

        svg.push_str("</g>");
    }
}

#[allow(clippy::too_many_arguments)]
fn write_text(
    svg: &mut String,
    x: f64,
    y: f64,
    anchor: &str,
    font: &str,
    size: f64,
    color: Color,
    text: &str,
) {
    let _ = write!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="{anchor}" font-family="{font}" font-size="{}" {}>{}</text>"#,
        num(x),
        num(y),
        num(size),
        fill_attrs(color),
        escape_xml(&visible_text(text))
    );
}

/// `> text|`, keeping the tail that fits in `budget` narrow-glyph cells.
fn prompt_line(text: &str, budget: usize) -> String {
    let visible: Vec<char> = text.chars().map(visible_char).collect();
    let fixed = PROMPT.chars().count() + 1;
    let room = budget.saturating_sub(fixed);

    let total: usize = visible.iter().map(|c| cell_width(*c)).sum();
    let mut out = String::from(PROMPT);
    if total <= room {
        out.extend(visible.iter());
    } else {
        let room = room.saturating_sub(1);
        let mut used = 0;
        let mut start = visible.len();
        while start > 0 && used + cell_width(visible[start - 1]) <= room {
            start -= 1;
            used += cell_width(visible[start]);
        }
        out.push(ELLIPSIS);
        out.extend(visible[start..].iter());
    }
    out.push(CURSOR);
    out
}

fn visible_text(text: &str) -> String {
    text.chars().map(visible_char).collect()
}

fn visible_char(c: char) -> char {
    match c {
        '\n' => '↵',
        '\t' => '⇥',
        c if c.is_control() => '·',
        c => c,
    }
}

fn cell_width(c: char) -> usize {
    let wide = matches!(u32::from(c),
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6);
    if wide { 2 } else { 1 }
}

fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn rect_attrs(r: Rect) -> String {
    format!(
        r#"x="{}" y="{}" width="{}" height="{}""#,
        num(r.x0),
        num(r.y0),
        num(r.width()),
        num(r.height())
    )
}

fn fill_attrs(c: Color) -> String {
    format!(r#"fill="{}" fill-opacity="{}""#, c.svg_hex(), c.svg_opacity())
}

fn stroke_attrs(c: Color, width: f64) -> String {
    if width <= 0.0 || c.is_transparent() {
        return r#"stroke="none""#.to_string();
    }
    format!(
        r#"stroke="{}" stroke-opacity="{}" stroke-width="{}""#,
        c.svg_hex(),
        c.svg_opacity(),
        num(width)
    )
}

fn font_list(families: &[&str]) -> String {
    let mut out = String::new();
    for family in families {
        if out.contains(&format!("'{family}'")) {
            continue;
        }
        let _ = write!(out, "'{}', ", family.replace('\'', ""));
    }
    out.push_str("monospace");
    escape_xml(&out)
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/scene.rs"]
mod tests;
