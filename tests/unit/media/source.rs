use super::*;

#[test]
fn looping_playback_wraps() {
    let mut p = Playback::new(Some(2.0), true);
    p.advance(1.5);
    p.advance(1.0);
    assert!((p.time() - 0.5).abs() < 1e-12);
    assert_eq!(p.state(), PlaybackState::Playing);
}

#[test]
fn non_looping_playback_ends_and_stays() {
    let mut p = Playback::new(Some(1.0), false);
    p.advance(3.0);
    assert_eq!(p.state(), PlaybackState::Ended);
    assert_eq!(p.time(), 1.0);
    p.advance(1.0);
    assert_eq!(p.time(), 1.0);

    p.seek(0.25);
    assert_eq!(p.state(), PlaybackState::Playing);
}

#[test]
fn paused_playback_does_not_move() {
    let mut p = Playback::new(None, true);
    p.set_paused(true);
    p.advance(1.0);
    assert_eq!(p.time(), 0.0);
    assert_eq!(p.state(), PlaybackState::Paused);
    p.set_paused(false);
    p.advance(-1.0);
    assert_eq!(p.time(), 0.0);
}

#[test]
fn base_name_takes_last_segment_before_first_dot() {
    assert_eq!(media_base_name("videos/clip.mp4"), "clip");
    assert_eq!(media_base_name("https://x.org/a/b/sea.waves.webm?t=3"), "sea");
    assert_eq!(media_base_name("C:\\media\\run.mov"), "run");
    assert_eq!(media_base_name("plain"), "plain");
}

#[test]
fn solid_spec_opens_with_optional_size() {
    let mut s = open_source("solid:#ff0000@8x4", true).unwrap();
    let frame = s.current_frame().unwrap();
    assert_eq!(frame.dimensions(), (8, 4));
    assert_eq!(frame.get_pixel(3, 2).0, [255, 0, 0, 255]);
    assert_eq!(s.name(), "solid_ff0000");

    let s = open_source("solid:00ff00", true).unwrap();
    assert_eq!(s.timestamp_sec(), 0.0);
    assert!(open_source("solid:#zz", true).is_err());
}

#[test]
fn missing_file_is_a_media_error() {
    let err = open_source("does/not/exist.png", true).unwrap_err();
    assert!(matches!(err, SmokeError::Media(_)));
}

#[test]
fn image_source_reads_png() {
    let dir = std::env::temp_dir().join(format!("smokesim_source_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("still.png");
    image::RgbaImage::from_pixel(5, 3, image::Rgba([1, 2, 3, 255]))
        .save(&path)
        .unwrap();

    let mut src = open_source(path.to_str().unwrap(), true).unwrap();
    src.advance(10.0);
    assert_eq!(src.timestamp_sec(), 10.0);
    assert_eq!(src.current_frame().unwrap().dimensions(), (5, 3));
    assert_eq!(media_base_name(src.name()), "still");
    let _ = std::fs::remove_dir_all(&dir);
}
