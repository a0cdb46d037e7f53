use super::*;
use crate::foundation::core::Viewport;

#[test]
fn flatten_transparent_returns_background() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_opaque_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn odd_sizes_are_rejected_before_spawning() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(std::env::temp_dir().join("odd.mp4")));
    let err = sink
        .begin(SinkConfig {
            width: 3,
            height: 2,
            fps: 30,
        })
        .unwrap_err();
    assert!(matches!(err, SmokeError::Validation(_)));
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("unused.mp4"));
    let frame = Surface::new(Viewport::new(2, 2).unwrap());
    assert!(sink.push_frame(0, &frame).is_err());
    assert!(sink.end().is_err());
}
