use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{TypingError, TypingResult};
use crate::theme::color::Color;

const BUILTIN_THEMES: &[(&str, &str)] = &[
    ("light", include_str!("../../assets/themes/light.json")),
    ("dark", include_str!("../../assets/themes/dark.json")),
    ("terminal", include_str!("../../assets/themes/terminal.json")),
];

const DEFAULT_BASE: &str = "light";

/// Visual parameters used to generate keyboard artwork.
///
/// A theme document may set `"base": "<builtin>"` and override only some fields; missing
/// fields come from the base theme (`light` when unspecified).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Theme {
    /// Theme name.
    pub name: String,
    /// Canvas background.
    pub background: Color,
    /// Plate drawn behind the keys.
    pub keyboard_fill: Color,
    /// Key cap fill in the released state.
    pub key_fill: Color,
    /// Key cap outline.
    pub key_stroke: Color,
    /// Key cap outline width in pixels.
    pub key_stroke_width: f64,
    /// Overlay painted on top of a pressed key cap.
    pub key_pressed_fill: Color,
    /// Downward shift of a pressed key cap, in pixels.
    pub key_pressed_offset: f64,
    /// Primary legend color.
    pub label_color: Color,
    /// Secondary-script legend color.
    pub alt_label_color: Color,
    /// Text display panel fill.
    pub display_fill: Color,
    /// Text display panel outline.
    pub display_stroke: Color,
    /// Text display panel text color.
    pub display_text: Color,
    /// Font family for legends and the display.
    pub font_family: String,
    /// Legend font size in pixels.
    pub label_font_size: f64,
    /// Display font size in pixels.
    pub display_font_size: f64,
    /// Size of a 1u key (including the gap), in pixels.
    pub key_unit: f64,
    /// Gap between adjacent keys, in pixels.
    pub key_gap: f64,
    /// Key cap corner radius, in pixels.
    pub corner_radius: f64,
    /// Outer padding around the keyboard and display, in pixels.
    pub padding: f64,
}

impl Theme {
    /// Look up an embedded theme by name.
    pub fn builtin(name: &str) -> TypingResult<Self> {
        let json = builtin_json(name).ok_or_else(|| {
            TypingError::theme(format!(
                "unknown theme '{name}' (available: {})",
                builtin_theme_names().join(", ")
            ))
        })?;
        let theme: Theme = serde_json::from_str(json)
            .map_err(|e| TypingError::theme(format!("parse builtin theme '{name}': {e}")))?;
        theme.validate()?;
        Ok(theme)
    }

    /// Parse a theme document, filling missing fields from its base theme.
    pub fn from_json_str(json: &str) -> TypingResult<Self> {
        let overrides: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| TypingError::theme(format!("parse theme JSON: {e}")))?;
        let serde_json::Value::Object(mut overrides) = overrides else {
            return Err(TypingError::theme("theme JSON must be an object"));
        };

        let base_name = match overrides.remove("base") {
            None => DEFAULT_BASE.to_string(),
            Some(serde_json::Value::String(s)) => s,
            Some(_) => return Err(TypingError::theme("theme \"base\" must be a string")),
        };
        let base_json = builtin_json(&base_name).ok_or_else(|| {
            TypingError::theme(format!("unknown base theme '{base_name}'"))
        })?;
        let mut merged: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(base_json)
                .map_err(|e| TypingError::theme(format!("parse base theme '{base_name}': {e}")))?;
        merged.extend(overrides);

        let theme: Theme = serde_json::from_value(serde_json::Value::Object(merged))
            .map_err(|e| TypingError::theme(format!("invalid theme: {e}")))?;
        theme.validate()?;
        Ok(theme)
    }

    /// Parse a theme document from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> TypingResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            TypingError::theme(format!("open theme JSON '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// Resolve a builtin name, or fall back to a path to a JSON document.
    pub fn resolve(name_or_path: &str) -> TypingResult<Self> {
        if builtin_json(name_or_path).is_some() {
            return Self::builtin(name_or_path);
        }
        let path = Path::new(name_or_path);
        if path.is_file() {
            return Self::from_path(path);
        }
        Err(TypingError::theme(format!(
            "unknown theme '{name_or_path}' (available: {}; or pass a path to a JSON file)",
            builtin_theme_names().join(", ")
        )))
    }

    /// Check numeric fields and font settings.
    pub fn validate(&self) -> TypingResult<()> {
        fn positive(name: &str, v: f64) -> TypingResult<()> {
            if !v.is_finite() || v <= 0.0 {
                return Err(TypingError::theme(format!("{name} must be finite and > 0")));
            }
            Ok(())
        }
        fn non_negative(name: &str, v: f64) -> TypingResult<()> {
            if !v.is_finite() || v < 0.0 {
                return Err(TypingError::theme(format!("{name} must be finite and >= 0")));
            }
            Ok(())
        }

        if self.name.trim().is_empty() {
            return Err(TypingError::theme("theme name must be non-empty"));
        }
        if self.font_family.trim().is_empty() {
            return Err(TypingError::theme("font_family must be non-empty"));
        }
        positive("key_unit", self.key_unit)?;
        positive("label_font_size", self.label_font_size)?;
        positive("display_font_size", self.display_font_size)?;
        non_negative("key_gap", self.key_gap)?;
        non_negative("key_stroke_width", self.key_stroke_width)?;
        non_negative("key_pressed_offset", self.key_pressed_offset)?;
        non_negative("corner_radius", self.corner_radius)?;
        non_negative("padding", self.padding)?;
        if self.key_gap >= self.key_unit {
            return Err(TypingError::theme("key_gap must be smaller than key_unit"));
        }
        Ok(())
    }
}

fn builtin_json(name: &str) -> Option<&'static str> {
    BUILTIN_THEMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, json)| *json)
}

/// Names of the embedded themes, in display order.
pub fn builtin_theme_names() -> Vec<&'static str> {
    BUILTIN_THEMES.iter().map(|(n, _)| *n).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/theme/model.rs"]
mod tests;
