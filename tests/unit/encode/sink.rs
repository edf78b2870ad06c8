use std::time::Duration;

use super::*;
use crate::render::frame::FrameRGBA;

fn frame(w: u32, h: u32) -> Frame {
    Frame {
        image: FrameRGBA {
            width: w,
            height: h,
            data: vec![255; (w * h * 4) as usize],
            premultiplied: true,
        },
        duration: Duration::from_millis(200),
    }
}

fn cfg(w: u32, h: u32) -> SinkConfig {
    SinkConfig {
        canvas: Canvas {
            width: w,
            height: h,
        },
        bg_rgba: [0, 0, 0, 255],
    }
}

#[test]
fn in_memory_sink_records_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(2, 2)).unwrap();
    sink.end().unwrap();

    assert!(sink.is_finished());
    assert_eq!(sink.config(), Some(cfg(2, 2)));
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.frames()[1].0, FrameIndex(1));
}

#[test]
fn out_of_order_and_mismatched_frames_are_rejected() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(2, 2)).unwrap();
    assert!(sink.push_frame(FrameIndex(1), &frame(2, 2)).is_err());
    assert!(sink.push_frame(FrameIndex(2), &frame(4, 2)).is_err());
}

#[test]
fn push_before_begin_fails() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_frame(FrameIndex(0), &frame(2, 2)).is_err());
    assert!(sink.end().is_err());
    assert!(sink.begin(cfg(0, 2)).is_err());
}

#[test]
fn frames_longer_than_the_limit_are_rejected() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 2)).unwrap();
    let mut long = frame(2, 2);
    long.duration = MAX_FRAME_DURATION + Duration::from_millis(1);
    assert!(sink.push_frame(FrameIndex(0), &long).is_err());
    assert!(!sink.creates_output_on_begin());
}
