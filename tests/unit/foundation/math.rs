use super::*;

#[test]
fn mul_div255_endpoints() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(0, 255), 0);
    assert_eq!(mul_div255_u8(255, 128), 128);
}

#[test]
fn lattice_hash_is_deterministic_and_seed_sensitive() {
    assert_eq!(hash_lattice(7, 3, -4), hash_lattice(7, 3, -4));
    assert_ne!(hash_lattice(7, 3, -4), hash_lattice(8, 3, -4));
    assert_ne!(hash_lattice(7, 3, -4), hash_lattice(7, -4, 3));
}

#[test]
fn opacity_to_u8_clamps() {
    assert_eq!(opacity_to_u8(-1.0), 0);
    assert_eq!(opacity_to_u8(2.0), 255);
    assert_eq!(opacity_to_u8(0.5), 128);
}
