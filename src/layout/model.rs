use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{TypingError, TypingResult};

const BUILTIN_LAYOUTS: &[(&str, &str)] = &[
    ("en", include_str!("../../assets/layouts/en.json")),
    ("el", include_str!("../../assets/layouts/el.json")),
    ("jp", include_str!("../../assets/layouts/jp.json")),
];

/// Identifier of a physical key (`"A"`, `"Space"`, `"ShiftLeft"`, ...).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyId(Arc<str>);

impl KeyId {
    /// Create a key id.
    pub fn new(id: &str) -> Self {
        Self(Arc::from(id))
    }

    /// Borrow the id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One physical key as declared in a layout document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyDef {
    /// Unique key id.
    pub id: String,
    /// Typed characters: `[unshifted, shifted]`, either may be absent.
    #[serde(default)]
    pub keys: String,
    /// Secondary-script characters on the same key and shift levels.
    #[serde(default)]
    pub alt_keys: String,
    /// Legend override.
    #[serde(default)]
    pub label: Option<String>,
    /// Width in key units.
    #[serde(default = "default_width")]
    pub width: f64,
}

fn default_width() -> f64 {
    1.0
}

fn default_shift_key() -> String {
    "ShiftLeft".to_string()
}

/// How a key's primary legend is printed on the cap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Legend {
    /// One centered legend.
    Single(String),
    /// Shifted character on top, unshifted below.
    Stacked {
        /// Shifted character.
        top: String,
        /// Unshifted character.
        bottom: String,
    },
}

impl KeyDef {
    /// Primary legend derived from `label` or `keys`.
    pub fn legend(&self) -> Legend {
        if let Some(label) = &self.label {
            return Legend::Single(label.clone());
        }
        let chars: Vec<char> = self.keys.chars().collect();
        match chars.as_slice() {
            [base, shifted] if base.to_uppercase().eq(std::iter::once(*shifted)) => {
                Legend::Single(shifted.to_string())
            }
            [base, shifted] => Legend::Stacked {
                top: shifted.to_string(),
                bottom: base.to_string(),
            },
            [c] if !c.is_control() => Legend::Single(c.to_string()),
            _ => Legend::Single(self.id.clone()),
        }
    }

    /// Secondary-script legend, if the key has one.
    pub fn alt_legend(&self) -> Option<String> {
        let chars: Vec<char> = self.alt_keys.chars().collect();
        match chars.as_slice() {
            [] => None,
            [base, shifted] if base.to_uppercase().eq(std::iter::once(*shifted)) => {
                Some(shifted.to_string())
            }
            [base, ..] => Some(base.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutDef {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_shift_key")]
    shift_key: String,
    #[serde(default)]
    fonts: Vec<String>,
    rows: Vec<Vec<KeyDef>>,
}

/// The key (and modifier state) that types one character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyStroke {
    /// Physical key.
    pub key: KeyId,
    /// Whether the shift key must be held.
    pub shift: bool,
}

/// Immutable layout table: character lookup plus key geometry.
#[derive(Clone, Debug)]
pub struct Layout {
    name: String,
    description: String,
    fonts: Vec<String>,
    rows: Vec<Vec<KeyDef>>,
    shift_key: KeyId,
    strokes: HashMap<char, KeyStroke>,
    alt: HashMap<char, char>,
}

impl Layout {
    /// Look up an embedded layout by name.
    pub fn builtin(name: &str) -> TypingResult<Self> {
        let json = builtin_json(name).ok_or_else(|| {
            TypingError::layout(format!(
                "unknown layout '{name}' (available: {})",
                builtin_layout_names().join(", ")
            ))
        })?;
        Self::from_json_str(json)
    }

    /// Parse and validate a layout document.
    pub fn from_json_str(json: &str) -> TypingResult<Self> {
        let def: LayoutDef = serde_json::from_str(json)
            .map_err(|e| TypingError::layout(format!("parse layout JSON: {e}")))?;
        Self::from_def(def)
    }

    /// Parse and validate a layout document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> TypingResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            TypingError::layout(format!("open layout JSON '{}': {e}", path.display()))
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
        Err(TypingError::layout(format!(
            "unknown layout '{name_or_path}' (available: {}; or pass a path to a JSON file)",
            builtin_layout_names().join(", ")
        )))
    }

    fn from_def(def: LayoutDef) -> TypingResult<Self> {
        if def.name.trim().is_empty() {
            return Err(TypingError::layout("layout name must be non-empty"));
        }
        if def.rows.is_empty() || def.rows.iter().any(Vec::is_empty) {
            return Err(TypingError::layout(format!(
                "layout '{}' must have at least one row and no empty rows",
                def.name
            )));
        }

        let mut ids = HashSet::new();
        let mut strokes = HashMap::new();
        for key in def.rows.iter().flatten() {
            if key.id.trim().is_empty() {
                return Err(TypingError::layout("key id must be non-empty"));
            }
            if !ids.insert(key.id.as_str()) {
                return Err(TypingError::layout(format!("duplicate key id '{}'", key.id)));
            }
            if !key.width.is_finite() || key.width <= 0.0 {
                return Err(TypingError::layout(format!(
                    "key '{}' width must be finite and > 0",
                    key.id
                )));
            }
            if key.keys.chars().count() > 2 || key.alt_keys.chars().count() > 2 {
                return Err(TypingError::layout(format!(
                    "key '{}' may declare at most two characters per script",
                    key.id
                )));
            }

            for (level, c) in key.keys.chars().enumerate() {
                let stroke = KeyStroke {
                    key: KeyId::new(&key.id),
                    shift: level == 1,
                };
                if let Some(prev) = strokes.insert(c, stroke) {
                    return Err(TypingError::layout(format!(
                        "character {c:?} is mapped by both '{}' and '{}'",
                        prev.key, key.id
                    )));
                }
            }
        }

        if !ids.contains(def.shift_key.as_str()) {
            return Err(TypingError::layout(format!(
                "shift_key '{}' is not a key of layout '{}'",
                def.shift_key, def.name
            )));
        }

        // Secondary-script characters are typable too, unless a primary legend already claims
        // the character.
        let mut alt = HashMap::new();
        for key in def.rows.iter().flatten() {
            let base: Vec<char> = key.keys.chars().collect();
            for (level, c) in key.alt_keys.chars().enumerate() {
                strokes.entry(c).or_insert_with(|| KeyStroke {
                    key: KeyId::new(&key.id),
                    shift: level == 1,
                });
                if let Some(&b) = base.get(level) {
                    alt.insert(b, c);
                }
            }
        }

        Ok(Self {
            shift_key: KeyId::new(&def.shift_key),
            name: def.name,
            description: def.description,
            fonts: def.fonts,
            rows: def.rows,
            strokes,
            alt,
        })
    }

    /// Layout name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Preferred display fonts: primary script first, then secondary script.
    pub fn fonts(&self) -> &[String] {
        &self.fonts
    }

    /// Key rows, top to bottom.
    pub fn rows(&self) -> &[Vec<KeyDef>] {
        &self.rows
    }

    /// Modifier pressed for shifted characters.
    pub fn shift_key(&self) -> &KeyId {
        &self.shift_key
    }

    /// Key and modifier state that types `c`, if the layout supports it.
    pub fn lookup(&self, c: char) -> Option<&KeyStroke> {
        self.strokes.get(&c)
    }

    /// Every typable character, sorted.
    pub fn supported_chars(&self) -> Vec<char> {
        let mut chars: Vec<char> = self.strokes.keys().copied().collect();
        chars.sort_unstable();
        chars
    }

    /// Return `true` when keys carry secondary-script legends.
    pub fn has_secondary_script(&self) -> bool {
        !self.alt.is_empty()
    }

    /// Transliterate `text` through the secondary-script legends.
    ///
    /// Characters without a secondary legend pass through unchanged.
    pub fn remap(&self, text: &str) -> String {
        text.chars()
            .map(|c| self.alt.get(&c).copied().unwrap_or(c))
            .collect()
    }
}

fn builtin_json(name: &str) -> Option<&'static str> {
    BUILTIN_LAYOUTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, json)| *json)
}

/// Names of the embedded layouts, in display order.
pub fn builtin_layout_names() -> Vec<&'static str> {
    BUILTIN_LAYOUTS.iter().map(|(n, _)| *n).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/layout/model.rs"]
mod tests;
