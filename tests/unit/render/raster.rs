use super::*;

const RED_SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4" viewBox="0 0 4 4"><rect x="0" y="0" width="4" height="4" fill="#ff0000"/></svg>"##;

#[test]
fn rasterizes_to_premultiplied_rgba_at_canvas_size() {
    let r = SvgRasterizer::new("monospace", &[]);
    let frame = r
        .rasterize(RED_SQUARE, Canvas { width: 8, height: 6 })
        .unwrap();
    assert_eq!(frame.width, 8);
    assert_eq!(frame.height, 6);
    assert!(frame.premultiplied);
    assert_eq!(frame.data.len(), 8 * 6 * 4);
    assert_eq!(&frame.data[0..4], &[255, 0, 0, 255]);
}

#[test]
fn rejects_bad_svg_and_bad_canvas() {
    let r = SvgRasterizer::new("monospace", &[]);
    assert!(r.rasterize("<svg", Canvas { width: 4, height: 4 }).is_err());
    assert!(r.rasterize(RED_SQUARE, Canvas { width: 0, height: 4 }).is_err());
    assert!(
        r.rasterize(RED_SQUARE, Canvas { width: 20_000, height: 4 })
            .is_err()
    );
}

#[test]
fn missing_font_dir_is_not_fatal() {
    let r = SvgRasterizer::new("monospace", &[PathBuf::from("target/no-such-font-dir")]);
    assert!(r.rasterize(RED_SQUARE, Canvas { width: 4, height: 4 }).is_ok());
}
