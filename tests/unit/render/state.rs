use std::time::Duration;

use super::*;

fn event(key: &str, action: KeyAction) -> KeystrokeEvent {
    KeystrokeEvent {
        key: KeyId::new(key),
        action,
        offset: Duration::ZERO,
        typed_len: 0,
    }
}

#[test]
fn press_and_release_track_held_keys_in_order() {
    let mut keys = PressedKeys::new();
    assert!(keys.is_empty());

    keys.press(KeyId::new("ShiftLeft"));
    keys.apply(&event("A", KeyAction::Press));
    keys.press(KeyId::new("A"));
    assert_eq!(keys.len(), 2);
    let held: Vec<&str> = keys.iter().map(KeyId::as_str).collect();
    assert_eq!(held, vec!["A", "ShiftLeft"]);

    keys.apply(&event("A", KeyAction::Release));
    assert!(!keys.contains(&KeyId::new("A")));
    assert!(keys.contains(&KeyId::new("ShiftLeft")));

    // Releasing a key that is not held is a no-op.
    keys.apply(&event("B", KeyAction::Release));
    assert_eq!(keys.len(), 1);
}

#[test]
fn collected_sets_compare_by_contents() {
    let a: PressedKeys = [KeyId::new("B"), KeyId::new("A")].into_iter().collect();
    let mut b = PressedKeys::new();
    b.press(KeyId::new("A"));
    b.press(KeyId::new("B"));
    assert_eq!(a, b);
}
