use super::*;

fn en_scene(display: DisplayMode) -> KeyboardScene {
    let layout = Layout::builtin("en").unwrap();
    let theme = Theme::builtin("light").unwrap();
    KeyboardScene::new(&layout, &theme, display)
}

#[test]
fn canvas_is_even_and_grows_with_display() {
    let bare = en_scene(DisplayMode::Hidden).canvas();
    let single = en_scene(DisplayMode::Single).canvas();
    assert_eq!(bare.width % 2, 0);
    assert_eq!(bare.height % 2, 0);
    assert_eq!(bare.width, single.width);
    assert!(single.height > bare.height);

    // 15 key units of 60px plus 24px padding on both sides.
    assert_eq!(bare.width, 948);
}

#[test]
fn keys_do_not_overlap_within_a_row() {
    let scene = en_scene(DisplayMode::Hidden);
    let q = scene.key_rect(&KeyId::new("Q")).unwrap();
    let w = scene.key_rect(&KeyId::new("W")).unwrap();
    let tab = scene.key_rect(&KeyId::new("Tab")).unwrap();
    assert!(tab.x1 < q.x0);
    assert!(q.x1 < w.x0);
    assert_eq!(q.y0, w.y0);
    assert!(scene.key_rect(&KeyId::new("Nope")).is_none());
}

#[test]
fn display_mode_follows_layout_script() {
    let en = Layout::builtin("en").unwrap();
    let jp = Layout::builtin("jp").unwrap();
    assert_eq!(DisplayMode::for_layout(&en, true), DisplayMode::Single);
    assert_eq!(DisplayMode::for_layout(&jp, true), DisplayMode::Dual);
    assert_eq!(DisplayMode::for_layout(&jp, false), DisplayMode::Hidden);
}

#[test]
fn captions_follow_display_mode() {
    assert_eq!(en_scene(DisplayMode::Hidden).caption("hi"), None);
    assert_eq!(
        en_scene(DisplayMode::Single).caption("hi"),
        Some(Caption {
            primary: "hi".to_string(),
            secondary: None
        })
    );

    let el = Layout::builtin("el").unwrap();
    let theme = Theme::builtin("dark").unwrap();
    let scene = KeyboardScene::new(&el, &theme, DisplayMode::Dual);
    let caption = scene.caption("abc").unwrap();
    assert_eq!(caption.secondary.as_deref(), Some("αβψ"));
}

#[test]
fn svg_marks_only_pressed_keys() {
    let scene = en_scene(DisplayMode::Hidden);
    let idle = scene.svg_document(&FrameState {
        pressed: &PressedKeys::new(),
        caption: None,
    });
    let pressed: PressedKeys = [KeyId::new("H")].into_iter().collect();
    let held = scene.svg_document(&FrameState {
        pressed: &pressed,
        caption: None,
    });

    assert_ne!(idle, held);
    assert!(idle.starts_with("<svg"));
    assert!(idle.ends_with("</svg>"));
    assert!(held.contains(r#"<g id="key-H">"#));
    // The pressed overlay uses the theme's translucent black.
    assert!(held.contains(r##"fill="#000000" fill-opacity="0.200""##));
    assert!(!idle.contains(r##"fill="#000000" fill-opacity="0.200""##));
}

#[test]
fn svg_escapes_legends_and_caption() {
    let scene = en_scene(DisplayMode::Single);
    let caption = scene.caption("<a & 'b'>").unwrap();
    let svg = scene.svg_document(&FrameState {
        pressed: &PressedKeys::new(),
        caption: Some(&caption),
    });
    assert!(svg.contains("&gt; &lt;a &amp; &apos;b&apos;&gt;|"));
    assert!(svg.contains(">&amp;<") || svg.contains("&amp;</text>"));
    assert!(usvg::Tree::from_str(&svg, &usvg::Options::default()).is_ok());
}

#[test]
fn prompt_line_keeps_tail_that_fits() {
    assert_eq!(prompt_line("", 10), "> |");
    assert_eq!(prompt_line("hi\n", 10), "> hi↵|");
    assert_eq!(prompt_line("abcdefghijkl", 10), "> …ghijkl|");
    // Wide glyphs take two cells.
    assert_eq!(prompt_line("こんかいです", 10), "> …いです|");
}

#[test]
fn numbers_are_compact() {
    assert_eq!(num(12.0), "12");
    assert_eq!(num(100.0), "100");
    assert_eq!(num(0.5), "0.5");
    assert_eq!(num(-0.0), "0");
    assert_eq!(num(1.239), "1.24");
}

#[test]
fn control_characters_in_user_legends_stay_valid_xml() {
    let json = r#"{
        "name": "ctl",
        "rows": [[
            { "id": "X", "keys": "x\u0002" },
            { "id": "Bell", "label": "\u0007" },
            { "id": "Z\u0003" },
            { "id": "ShiftLeft", "label": "Shift" }
        ]],
        "shift_key": "ShiftLeft"
    }"#;
    let layout = Layout::from_json_str(json).unwrap();
    let theme = Theme::builtin("light").unwrap();
    let scene = KeyboardScene::new(&layout, &theme, DisplayMode::Hidden);
    assert_eq!(scene.display(), DisplayMode::Hidden);
    assert_eq!(scene.theme(), &theme);

    let pressed: PressedKeys = [KeyId::new("X")].into_iter().collect();
    let svg = scene.svg_document(&FrameState {
        pressed: &pressed,
        caption: None,
    });
    assert!(!svg.chars().any(|c| c.is_control() && c != '\n'));
    assert!(svg.contains(r#"id="key-Z·""#));
    assert!(usvg::Tree::from_str(&svg, &usvg::Options::default()).is_ok());
}
