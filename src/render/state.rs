use std::collections::BTreeSet;

use crate::keystroke::compiler::{KeyAction, KeystrokeEvent};
use crate::layout::model::KeyId;

/// Keys currently held down, in a stable order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PressedKeys(BTreeSet<KeyId>);

impl PressedKeys {
    /// No keys held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one press/release transition.
    pub fn apply(&mut self, event: &KeystrokeEvent) {
        match event.action {
            KeyAction::Press => {
                self.0.insert(event.key.clone());
            }
            KeyAction::Release => {
                self.0.remove(&event.key);
            }
        }
    }

    /// Hold `key`.
    pub fn press(&mut self, key: KeyId) {
        self.0.insert(key);
    }

    /// Return `true` when `key` is held.
    pub fn contains(&self, key: &KeyId) -> bool {
        self.0.contains(key)
    }

    /// Number of held keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` when nothing is held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Held keys in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &KeyId> {
        self.0.iter()
    }
}

impl FromIterator<KeyId> for PressedKeys {
    fn from_iter<T: IntoIterator<Item = KeyId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/state.rs"]
mod tests;
