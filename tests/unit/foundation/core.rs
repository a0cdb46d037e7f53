use super::*;

#[test]
fn viewport_rejects_zero_and_oversized() {
    assert!(Viewport::new(0, 10).is_err());
    assert!(Viewport::new(10, 0).is_err());
    assert!(Viewport::new(70_000, 10).is_err());
    let v = Viewport::new(10, 4).unwrap();
    assert_eq!(v.byte_len(), 160);
}

#[test]
fn viewport_parses_wxh() {
    let v: Viewport = "1920x1080".parse().unwrap();
    assert_eq!(v, Viewport::new(1920, 1080).unwrap());
    assert!("1920".parse::<Viewport>().is_err());
    assert!("ax10".parse::<Viewport>().is_err());
}

#[test]
fn value_range_swaps_inverted_bounds() {
    let r = ValueRange::new(4.0, -2.0).normalized_or(ValueRange::fixed(0.0));
    assert_eq!(r, ValueRange::new(-2.0, 4.0));
}

#[test]
fn value_range_non_finite_bounds_collapse() {
    let fb = ValueRange::new(1.0, 2.0);
    assert_eq!(
        ValueRange::new(f64::NAN, 3.0).normalized_or(fb),
        ValueRange::fixed(3.0)
    );
    assert_eq!(
        ValueRange::new(f64::NAN, f64::INFINITY).normalized_or(fb),
        fb
    );
}

#[test]
fn premul_with_alpha_scales_channels() {
    let c = Rgb8::new(255, 128, 0);
    assert_eq!(c.premul_with_alpha(1.0), [255, 128, 0, 255]);
    assert_eq!(c.premul_with_alpha(0.0), [0, 0, 0, 0]);
    let half = c.premul_with_alpha(0.5);
    assert_eq!(half[3], 128);
    assert_eq!(half[0], 128);
}
