use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TypingError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(TypingError::layout("x").to_string().contains("layout error:"));
    assert!(TypingError::theme("x").to_string().contains("theme error:"));
    assert!(
        TypingError::unsupported_format("x")
            .to_string()
            .contains("unsupported output format:")
    );
    assert!(TypingError::render("x").to_string().contains("render error:"));
    assert!(TypingError::encode("x").to_string().contains("encode error:"));
}

#[test]
fn unsupported_character_names_char_position_and_layout() {
    let err = TypingError::UnsupportedCharacter {
        ch: '€',
        position: 3,
        layout: "en".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("'€'"));
    assert!(msg.contains("position 3"));
    assert!(msg.contains("'en'"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TypingError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
