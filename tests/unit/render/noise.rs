use super::*;

#[test]
fn perlin_is_zero_on_lattice_points() {
    for (x, y) in [(0.0, 0.0), (3.0, -2.0), (17.0, 5.0)] {
        assert!(perlin2(7, x, y).abs() < 1e-12);
    }
}

#[test]
fn cloud_mask_is_deterministic_per_seed() {
    let p = CloudParams::default();
    let a = cloud_mask(32, 32, &p, 100);
    let b = cloud_mask(32, 32, &p, 100);
    let c = cloud_mask(32, 32, &p, 101);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.len(), 32 * 32);
}

#[test]
fn cloud_mask_fades_to_the_corner() {
    let p = CloudParams {
        octaves: 3,
        ..CloudParams::default()
    };
    let m = cloud_mask(20, 20, &p, 1);
    assert_eq!(m[0], 0);
    assert!(m[10 * 20 + 10] >= 5);
}

#[test]
fn sprite_uses_mask_as_alpha() {
    let rgba = cloud_sprite_premul(&[0, 255, 128], Rgb8::new(200, 100, 50));
    assert_eq!(&rgba[0..4], &[0, 0, 0, 0]);
    assert_eq!(&rgba[4..8], &[200, 100, 50, 255]);
    assert_eq!(&rgba[8..12], &[100, 50, 25, 128]);
}
