use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{TypingError, TypingResult};
use crate::layout::model::{KeyId, Layout};

/// What to do with characters the active layout cannot type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedPolicy {
    /// Abort with [`TypingError::UnsupportedCharacter`] at the first unsupported character.
    #[default]
    Fail,
    /// Drop the character: it produces no events and is never shown as typed.
    Skip,
}

/// Press or release of a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Key goes down.
    Press,
    /// Key comes up.
    Release,
}

/// One discrete key transition in simulated time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeystrokeEvent {
    /// Key being pressed or released.
    pub key: KeyId,
    /// Transition kind.
    pub action: KeyAction,
    /// Offset from the start of the clip.
    pub offset: Duration,
    /// Number of accepted input characters visibly typed once this event is shown.
    pub typed_len: usize,
}

/// A character dropped under [`UnsupportedPolicy::Skip`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkippedChar {
    /// Dropped character.
    pub ch: char,
    /// 0-based character position in the input.
    pub position: usize,
}

/// Options for [`compile_text`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    /// Unsupported-character policy.
    pub policy: UnsupportedPolicy,
    /// Time between consecutive events; must be non-zero.
    pub interval: Duration,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            policy: UnsupportedPolicy::Fail,
            interval: Duration::from_millis(200),
        }
    }
}

/// Ordered keystroke events for one input text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeystrokeSequence {
    /// Events in simulated-time order.
    pub events: Vec<KeystrokeEvent>,
    /// Accepted input characters, in order.
    pub typed: Vec<char>,
    /// Characters dropped under [`UnsupportedPolicy::Skip`].
    pub skipped: Vec<SkippedChar>,
}

impl KeystrokeSequence {
    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` when there are no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The first `n` accepted characters as a string.
    pub fn typed_prefix(&self, n: usize) -> String {
        self.typed.iter().take(n).collect()
    }
}

struct EventWriter {
    events: Vec<KeystrokeEvent>,
    interval: Duration,
    next_offset: Duration,
}

impl EventWriter {
    fn push(&mut self, key: &KeyId, action: KeyAction, typed_len: usize) {
        self.events.push(KeystrokeEvent {
            key: key.clone(),
            action,
            offset: self.next_offset,
            typed_len,
        });
        self.next_offset += self.interval;
    }
}

/// Compile `text` into press/release events on `layout`.
///
/// Every character becomes `press(key), release(key)`; shifted characters are wrapped in
/// `press(shift) ... release(shift)`. Modifiers are not held across characters.
#[tracing::instrument(skip(text, layout, opts), fields(layout = layout.name(), chars = text.chars().count()))]
pub fn compile_text(
    text: &str,
    layout: &Layout,
    opts: &CompileOptions,
) -> TypingResult<KeystrokeSequence> {
    if opts.interval.is_zero() {
        return Err(TypingError::validation("keystroke interval must be non-zero"));
    }

    let mut out = EventWriter {
        events: Vec::new(),
        interval: opts.interval,
        next_offset: Duration::ZERO,
    };
    let mut typed = Vec::new();
    let mut skipped = Vec::new();

    for (position, ch) in text.chars().enumerate() {
        let Some(stroke) = layout.lookup(ch) else {
            match opts.policy {
                UnsupportedPolicy::Fail => {
                    return Err(TypingError::UnsupportedCharacter {
                        ch,
                        position,
                        layout: layout.name().to_string(),
                    });
                }
                UnsupportedPolicy::Skip => {
                    tracing::warn!(?ch, position, "skipping unsupported character");
                    skipped.push(SkippedChar { ch, position });
                    continue;
                }
            }
        };

        let before = typed.len();
        typed.push(ch);
        let after = typed.len();

        if stroke.shift {
            out.push(layout.shift_key(), KeyAction::Press, before);
        }
        out.push(&stroke.key, KeyAction::Press, after);
        out.push(&stroke.key, KeyAction::Release, after);
        if stroke.shift {
            out.push(layout.shift_key(), KeyAction::Release, after);
        }
    }

    tracing::debug!(
        events = out.events.len(),
        skipped = skipped.len(),
        "compiled keystrokes"
    );

    Ok(KeystrokeSequence {
        events: out.events,
        typed,
        skipped,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/keystroke/compiler.rs"]
mod tests;
