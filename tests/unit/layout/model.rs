use super::*;

#[test]
fn all_builtin_layouts_parse() {
    for name in builtin_layout_names() {
        let layout = Layout::builtin(name).unwrap();
        assert_eq!(layout.name(), name);
        assert_eq!(layout.shift_key().as_str(), "ShiftLeft");
        assert!(!layout.fonts().is_empty());
    }
}

#[test]
fn en_maps_letters_digits_and_punctuation() {
    let en = Layout::builtin("en").unwrap();

    assert_eq!(
        en.lookup('h'),
        Some(&KeyStroke {
            key: KeyId::new("H"),
            shift: false
        })
    );
    assert_eq!(
        en.lookup('H'),
        Some(&KeyStroke {
            key: KeyId::new("H"),
            shift: true
        })
    );
    assert_eq!(en.lookup(' ').unwrap().key.as_str(), "Space");
    assert_eq!(en.lookup('\n').unwrap().key.as_str(), "Enter");
    assert_eq!(en.lookup('`').unwrap().key.as_str(), "backtick");
    assert_eq!(en.lookup('/').unwrap().key.as_str(), "forwardslash");
    assert_eq!(en.lookup('"').unwrap().key.as_str(), "tick");
    assert!(en.lookup('"').unwrap().shift);
    assert!(en.lookup('€').is_none());
    assert!(!en.has_secondary_script());
}

#[test]
fn el_types_greek_and_remaps_latin() {
    let el = Layout::builtin("el").unwrap();
    assert!(el.has_secondary_script());

    let alpha = el.lookup('α').unwrap();
    assert_eq!(alpha.key.as_str(), "A");
    assert!(!alpha.shift);
    assert!(el.lookup('Ω').unwrap().shift);

    // ';' stays on the semicolon key even though the Greek Q legend is ';'.
    assert_eq!(el.lookup(';').unwrap().key.as_str(), "semicolon");

    assert_eq!(el.remap("Hello"), "Ηελλο");
    assert_eq!(el.remap("a b!"), "α β!");
}

#[test]
fn jp_remaps_to_kana() {
    let jp = Layout::builtin("jp").unwrap();
    assert_eq!(jp.remap("byte"), "こんかい");
    assert_eq!(jp.lookup('ち').unwrap().key.as_str(), "A");
}

#[test]
fn legends_are_derived_from_keys() {
    let en = Layout::builtin("en").unwrap();
    let keys: Vec<&KeyDef> = en.rows().iter().flatten().collect();
    let find = |id: &str| keys.iter().find(|k| k.id == id).copied().unwrap();

    assert_eq!(find("Q").legend(), Legend::Single("Q".to_string()));
    assert_eq!(
        find("1").legend(),
        Legend::Stacked {
            top: "!".to_string(),
            bottom: "1".to_string()
        }
    );
    assert_eq!(find("Enter").legend(), Legend::Single("↵".to_string()));
    assert_eq!(find("Q").alt_legend(), None);

    let el = Layout::builtin("el").unwrap();
    let a = el.rows().iter().flatten().find(|k| k.id == "A").unwrap();
    assert_eq!(a.alt_legend(), Some("Α".to_string()));
}

#[test]
fn rejects_invalid_documents() {
    let dup_id = r#"{ "name": "x", "rows": [[{ "id": "A", "keys": "a" }, { "id": "A" }]], "shift_key": "A" }"#;
    assert!(Layout::from_json_str(dup_id).is_err());

    let dup_char = r#"{ "name": "x", "rows": [[{ "id": "A", "keys": "a" }, { "id": "B", "keys": "a" }]], "shift_key": "A" }"#;
    assert!(Layout::from_json_str(dup_char).is_err());

    let no_shift = r#"{ "name": "x", "rows": [[{ "id": "A", "keys": "a" }]] }"#;
    let err = Layout::from_json_str(no_shift).unwrap_err().to_string();
    assert!(err.contains("shift_key 'ShiftLeft'"));

    let bad_width = r#"{ "name": "x", "rows": [[{ "id": "A", "width": 0 }]], "shift_key": "A" }"#;
    assert!(Layout::from_json_str(bad_width).is_err());

    let three_chars = r#"{ "name": "x", "rows": [[{ "id": "A", "keys": "abc" }]], "shift_key": "A" }"#;
    assert!(Layout::from_json_str(three_chars).is_err());

    assert!(Layout::from_json_str(r#"{ "name": "x", "rows": [] }"#).is_err());
    assert!(Layout::from_json_str("not json").is_err());
}

#[test]
fn resolve_prefers_builtins_then_files() {
    assert_eq!(Layout::resolve("en").unwrap().name(), "en");

    let dir = std::path::PathBuf::from("target").join("layout_resolve");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("tiny.json");
    std::fs::write(
        &path,
        r#"{ "name": "tiny", "shift_key": "S", "rows": [[{ "id": "S", "label": "Shift" }, { "id": "X", "keys": "xX" }]] }"#,
    )
    .unwrap();
    let tiny = Layout::resolve(path.to_str().unwrap()).unwrap();
    assert_eq!(tiny.name(), "tiny");
    assert_eq!(tiny.supported_chars(), vec!['X', 'x']);

    let err = Layout::resolve("klingon").unwrap_err().to_string();
    assert!(err.contains("layout error:"));
    assert!(err.contains("en, el, jp"));
}
