use std::time::Duration;

use image::AnimationDecoder as _;
use image::codecs::gif::GifDecoder;

use super::*;
use crate::foundation::core::Canvas;
use crate::render::frame::FrameRGBA;

fn solid(rgba: [u8; 4], ms: u64) -> Frame {
    Frame {
        image: FrameRGBA {
            width: 4,
            height: 2,
            data: rgba.repeat(8),
            premultiplied: true,
        },
        duration: Duration::from_millis(ms),
    }
}

fn cfg() -> SinkConfig {
    SinkConfig {
        canvas: Canvas {
            width: 4,
            height: 2,
        },
        bg_rgba: [0, 0, 255, 255],
    }
}

#[test]
fn writes_a_looping_gif_with_one_frame_per_push() {
    let dir = std::path::Path::new("target/typingvid-tests/gif-unit");
    let out = dir.join("three.gif");
    let _ = std::fs::remove_file(&out);

    let mut sink = GifSink::new(GifSinkOpts::new(&out));
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &solid([255, 0, 0, 255], 200))
        .unwrap();
    sink.push_frame(FrameIndex(1), &solid([0, 255, 0, 255], 200))
        .unwrap();
    // Fully transparent pixels are flattened over the background.
    sink.push_frame(FrameIndex(2), &solid([0, 0, 0, 0], 1000))
        .unwrap();
    assert!(!out.exists());
    sink.end().unwrap();

    let bytes = std::fs::read(&out).unwrap();
    let frames = GifDecoder::new(std::io::Cursor::new(bytes))
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap();
    assert_eq!(frames.len(), 3);

    let (num, den) = frames[0].delay().numer_denom_ms();
    assert_eq!(num / den, 200);
    let (num, den) = frames[2].delay().numer_denom_ms();
    assert_eq!(num / den, 1000);

    let px = frames[2].buffer().get_pixel(0, 0).0;
    assert_eq!(px, [0, 0, 255, 255]);
}

#[test]
fn no_overwrite_refuses_existing_file() {
    let dir = std::path::Path::new("target/typingvid-tests/gif-unit");
    std::fs::create_dir_all(dir).unwrap();
    let out = dir.join("exists.gif");
    std::fs::write(&out, b"x").unwrap();

    let mut opts = GifSinkOpts::new(&out);
    opts.overwrite = false;
    let err = GifSink::new(opts).begin(cfg()).unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[test]
fn frames_after_end_are_rejected() {
    let out = std::path::Path::new("target/typingvid-tests/gif-unit/closed.gif");
    let mut sink = GifSink::new(GifSinkOpts::new(out));
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &solid([1, 2, 3, 255], 100))
        .unwrap();
    sink.end().unwrap();
    assert!(
        sink.push_frame(FrameIndex(1), &solid([1, 2, 3, 255], 100))
            .is_err()
    );
}

#[test]
fn output_is_only_created_by_end() {
    let out = std::path::Path::new("target/typingvid-tests/gif-unit/late.gif");
    let _ = std::fs::remove_file(out);
    let mut sink = GifSink::new(GifSinkOpts::new(out));
    assert!(!sink.creates_output_on_begin());
    sink.begin(cfg()).unwrap();
    assert!(!out.exists());
}
