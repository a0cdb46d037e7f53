use super::*;
use crate::foundation::core::{Point, Vec2};

fn particle(x: f64, lifetime: f64) -> Particle {
    Particle::new(Point::new(x, 0.0), Vec2::new(1.0, 2.0), 10.0, 10.0, lifetime)
}

#[test]
fn update_decrements_remaining_and_drops_expired() {
    let mut store = ParticleStore::default();
    store.add([particle(0.0, 1.0), particle(1.0, 5.0), particle(2.0, 0.25)]);

    let removed = store.update(0.5);
    assert_eq!(removed, 1);
    assert_eq!(store.count(), 2);
    let remaining: Vec<f64> = store.particles().iter().map(|p| p.remaining).collect();
    assert_eq!(remaining, vec![0.5, 4.5]);
    assert!(store.particles().iter().all(|p| p.remaining > 0.0));
}

#[test]
fn non_positive_or_non_finite_dt_is_a_noop() {
    let mut store = ParticleStore::default();
    store.add([particle(3.0, 2.0)]);
    let before = store.particles().to_vec();

    for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert_eq!(store.update(dt), 0);
        assert_eq!(store.particles(), before.as_slice());
    }
}

#[test]
fn everything_expires_when_dt_exceeds_every_lifetime() {
    let mut store = ParticleStore::default();
    store.add((0..100).map(|i| particle(i as f64, 1.0 + (i as f64) / 100.0)));
    assert_eq!(store.count(), 100);

    store.update(3.0);
    assert_eq!(store.count(), 0);
}

#[test]
fn cap_evicts_oldest_first() {
    let mut store = ParticleStore::with_capacity_limit(3);
    assert_eq!(store.add((0..2).map(|i| particle(i as f64, 1.0))), 0);
    assert_eq!(store.add((2..5).map(|i| particle(i as f64, 1.0))), 2);

    let xs: Vec<f64> = store.particles().iter().map(|p| p.position.x).collect();
    assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    assert_eq!(store.evicted_total(), 2);

    assert_eq!(store.set_max_particles(1), 2);
    assert_eq!(store.particles()[0].position.x, 4.0);
}

#[test]
fn clear_empties() {
    let mut store = ParticleStore::default();
    store.add([particle(0.0, 1.0)]);
    store.clear();
    assert!(store.is_empty());
}
