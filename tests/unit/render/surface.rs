use super::*;

fn vp(w: u32, h: u32) -> Viewport {
    Viewport::new(w, h).unwrap()
}

#[test]
fn resize_always_clears() {
    let mut s = Surface::new(vp(4, 4));
    s.fill([10, 20, 30, 255]);
    s.resize(vp(4, 4));
    assert!(s.data().iter().all(|&b| b == 0));

    s.fill([10, 20, 30, 255]);
    s.resize(vp(8, 2));
    assert_eq!(s.data().len(), 8 * 2 * 4);
    assert!(s.data().iter().all(|&b| b == 0));
}

#[test]
fn alpha_guard_restores_previous_value() {
    let mut s = Surface::new(vp(2, 2));
    s.set_global_alpha(0.8);
    {
        let g = s.with_global_alpha(0.25);
        assert_eq!(g.global_alpha(), 0.25);
    }
    assert_eq!(s.global_alpha(), 0.8);
}

#[test]
fn draw_image_stretches_to_destination() {
    let mut src = Surface::new(vp(2, 2));
    src.fill([0, 255, 0, 255]);
    let mut dst = Surface::new(vp(6, 4));
    dst.draw_image(&src).unwrap();
    for y in 0..4 {
        for x in 0..6 {
            assert_eq!(dst.pixel(x, y), Some([0, 255, 0, 255]));
        }
    }
}

#[test]
fn load_image_premultiplies() {
    let img = image::RgbaImage::from_pixel(3, 3, image::Rgba([200, 100, 0, 128]));
    let mut s = Surface::new(vp(3, 3));
    s.load_image(&img).unwrap();
    assert_eq!(s.pixel(1, 1), Some([100, 50, 0, 128]));

    let back = s.to_rgba_image().unwrap();
    let px = back.get_pixel(1, 1).0;
    assert!((i16::from(px[0]) - 200).abs() <= 2);
    assert_eq!(px[3], 128);
}

#[test]
fn prepare_sizes_every_surface() {
    let mut surfaces = Surfaces::new(vp(800, 600));
    surfaces.effect.fill([1, 1, 1, 1]);
    surfaces.prepare(vp(1920, 1080));
    assert_eq!(surfaces.viewport(), vp(1920, 1080));
    assert_eq!(surfaces.raw_frame.viewport(), vp(1920, 1080));
    assert_eq!(surfaces.effect.viewport(), vp(1920, 1080));
    assert!(surfaces.effect.data().iter().all(|&b| b == 0));
}

#[test]
fn save_png_writes_straight_alpha() {
    let dir = std::env::temp_dir().join(format!("smokesim_surface_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("out.png");

    let mut s = Surface::new(vp(2, 1));
    s.fill([255, 0, 0, 255]);
    s.save_png(&path).unwrap();

    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (2, 1));
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    let _ = std::fs::remove_dir_all(&dir);
}
