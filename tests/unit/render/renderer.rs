use super::*;
use crate::keystroke::compiler::{CompileOptions, compile_text};
use crate::layout::model::{KeyId, Layout};
use crate::render::scene::DisplayMode;
use crate::theme::model::Theme;

fn renderer(display: DisplayMode, opts: RendererOptions) -> (Layout, FrameRenderer) {
    let layout = Layout::builtin("en").unwrap();
    let theme = Theme::builtin("light").unwrap();
    let scene = KeyboardScene::new(&layout, &theme, display);
    let raster = SvgRasterizer::new(&theme.font_family, &[]);
    (layout, FrameRenderer::new(scene, raster, opts))
}

#[test]
fn identical_pressed_sets_render_byte_identical_images() {
    let (_, mut r1) = renderer(DisplayMode::Hidden, RendererOptions::default());
    let (_, mut r2) = renderer(DisplayMode::Hidden, RendererOptions::default());
    let pressed: PressedKeys = [KeyId::new("A"), KeyId::new("ShiftLeft")]
        .into_iter()
        .collect();
    let state = FrameState {
        pressed: &pressed,
        caption: None,
    };

    let a = r1.render_state(&state).unwrap();
    let b = r2.render_state(&state).unwrap();
    assert_eq!(a, b);

    let idle = r1
        .render_state(&FrameState {
            pressed: &PressedKeys::new(),
            caption: None,
        })
        .unwrap();
    assert_ne!(a.data, idle.data);
}

#[test]
fn repeated_states_hit_the_cache() {
    let (_, mut r) = renderer(DisplayMode::Hidden, RendererOptions::default());
    let state = FrameState {
        pressed: &PressedKeys::new(),
        caption: None,
    };
    let first = r.render_state(&state).unwrap();
    let second = r.render_state(&state).unwrap();
    assert_eq!(first, second);
    assert_eq!(r.stats().rasterized, 1);
    assert_eq!(r.stats().cache_hits, 1);
}

#[test]
fn one_frame_per_event_with_event_spacing_as_duration() {
    let opts = RendererOptions {
        interval: Duration::from_millis(100),
        end_hold: Duration::from_millis(900),
        ..RendererOptions::default()
    };
    let (layout, mut r) = renderer(DisplayMode::Single, opts);
    let seq = compile_text(
        "hi",
        &layout,
        &CompileOptions {
            interval: Duration::from_millis(100),
            ..CompileOptions::default()
        },
    )
    .unwrap();

    let mut frames = Vec::new();
    r.render_sequence(&seq, |idx, frame| {
        frames.push((idx, frame));
        Ok(())
    })
    .unwrap();

    assert_eq!(frames.len(), seq.len());
    assert_eq!(frames.len(), 4);
    let indices: Vec<u64> = frames.iter().map(|(i, _)| i.0).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    let durations: Vec<u128> = frames.iter().map(|(_, f)| f.duration.as_millis()).collect();
    assert_eq!(durations, vec![100, 100, 100, 1000]);
    assert_eq!(r.stats().frames, 4);
}

#[test]
fn empty_sequence_renders_one_idle_frame() {
    let (layout, mut r) = renderer(DisplayMode::Hidden, RendererOptions::default());
    let seq = compile_text("", &layout, &CompileOptions::default()).unwrap();
    let mut count = 0;
    r.render_sequence(&seq, |_, frame| {
        assert_eq!(frame.duration, Duration::from_millis(200));
        count += 1;
        Ok(())
    })
    .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn invert_colors_flips_the_background() {
    let opts = RendererOptions {
        invert_colors: true,
        ..RendererOptions::default()
    };
    let (_, mut r) = renderer(DisplayMode::Hidden, opts);
    let frame = r
        .render_state(&FrameState {
            pressed: &PressedKeys::new(),
            caption: None,
        })
        .unwrap();
    // Top-left pixel is the light theme's white background.
    assert_eq!(&frame.data[0..4], &[0, 0, 0, 255]);
}

#[test]
fn emit_errors_stop_rendering() {
    let (layout, mut r) = renderer(DisplayMode::Hidden, RendererOptions::default());
    let seq = compile_text("ab", &layout, &CompileOptions::default()).unwrap();
    let mut calls = 0;
    let res = r.render_sequence(&seq, |_, _| {
        calls += 1;
        Err(crate::foundation::error::TypingError::encode("sink closed"))
    });
    assert!(res.is_err());
    assert_eq!(calls, 1);
}

#[test]
fn renderer_exposes_its_scene() {
    let (_, r) = renderer(DisplayMode::Single, RendererOptions::default());
    assert_eq!(r.scene().display(), DisplayMode::Single);
    assert_eq!(r.scene().canvas(), r.canvas());
}
