use super::*;
use serde_json::json;

#[test]
fn parses_hex_with_and_without_hash() {
    assert_eq!(Rgb8::from_hex("#182e30").unwrap(), Rgb8::new(24, 46, 48));
    assert_eq!(Rgb8::from_hex("FF0000").unwrap(), Rgb8::new(255, 0, 0));
    assert_eq!(Rgb8::from_hex("#0000ff80").unwrap(), Rgb8::new(0, 0, 255));
}

#[test]
fn rejects_malformed_hex() {
    assert!(Rgb8::from_hex("#fff").is_err());
    assert!(Rgb8::from_hex("#gg0000").is_err());
    assert!(Rgb8::from_hex("").is_err());
}

#[test]
fn serde_accepts_hex_and_array() {
    let c: Rgb8 = serde_json::from_value(json!("#a7a7a7")).unwrap();
    assert_eq!(c, Rgb8::new(167, 167, 167));

    let c: Rgb8 = serde_json::from_value(json!([24, 46, 300])).unwrap();
    assert_eq!(c, Rgb8::new(24, 46, 255));

    assert!(serde_json::from_value::<Rgb8>(json!([1, 2])).is_err());
    assert_eq!(serde_json::to_value(Rgb8::new(24, 46, 48)).unwrap(), json!("#182e30"));
}
