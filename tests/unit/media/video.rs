use super::*;

fn info(fps_num: u32, fps_den: u32) -> VideoSourceInfo {
    VideoSourceInfo {
        source_path: PathBuf::from("clip.mp4"),
        width: 4,
        height: 4,
        fps_num,
        fps_den,
        duration_sec: 2.0,
    }
}

#[test]
fn ff_ratio_parses_and_rejects_zero_denominator() {
    assert_eq!(parse_ff_ratio("30000/1001"), Some((30000, 1001)));
    assert_eq!(parse_ff_ratio("25/0"), None);
    assert_eq!(parse_ff_ratio("abc"), None);
}

#[test]
fn frame_time_snaps_to_frame_start() {
    let i = info(10, 1);
    assert!((i.frame_time(0.37) - 0.3).abs() < 1e-12);
    assert_eq!(i.frame_time(-1.0), 0.0);
    assert_eq!(info(0, 1).frame_time(0.37), 0.37);
    assert_eq!(info(30, 0).source_fps(), 0.0);
}

#[cfg(not(feature = "media-ffmpeg"))]
#[test]
fn video_requires_ffmpeg_feature() {
    let err = VideoSource::open(Path::new("clip.mp4"), true).unwrap_err();
    assert!(err.to_string().contains("media-ffmpeg"));
}
