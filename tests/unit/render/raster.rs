use super::*;
use crate::foundation::core::{Point, Vec2, Viewport};

fn disc_look() -> ParticleLook {
    ParticleLook {
        color: Rgb8::new(255, 255, 255),
        alpha: 1.0,
        shape: SpriteShape::Disc,
        sprite_size: 20,
        seed: 1,
    }
}

fn particle_at(x: f64, y: f64, scale: f64) -> Particle {
    Particle::new(Point::new(x, y), Vec2::ZERO, scale, scale, 1.0)
}

#[test]
fn disc_covers_its_centre_only() {
    let mut layer = Surface::new(Viewport::new(40, 40).unwrap());
    let mut raster = ParticleRaster::new();
    let drawn = raster
        .draw(&[particle_at(20.0, 20.0, 10.0)], &disc_look(), &mut layer)
        .unwrap();

    assert_eq!(drawn, 1);
    assert_eq!(layer.pixel(20, 20), Some([255, 255, 255, 255]));
    assert_eq!(layer.pixel(2, 2), Some([0, 0, 0, 0]));
}

#[test]
fn expired_and_zero_alpha_particles_are_skipped() {
    let mut layer = Surface::new(Viewport::new(16, 16).unwrap());
    let mut raster = ParticleRaster::new();

    let mut dead = particle_at(8.0, 8.0, 6.0);
    dead.remaining = 0.0;
    let drawn = raster.draw(&[dead], &disc_look(), &mut layer).unwrap();
    assert_eq!(drawn, 0);

    let look = ParticleLook {
        alpha: 0.0,
        ..disc_look()
    };
    let drawn = raster
        .draw(&[particle_at(8.0, 8.0, 6.0)], &look, &mut layer)
        .unwrap();
    assert_eq!(drawn, 0);
    assert!(layer.data().iter().all(|&b| b == 0));
}

#[test]
fn cloud_sprite_paints_translucent_smoke() {
    let mut layer = Surface::new(Viewport::new(64, 64).unwrap());
    let mut raster = ParticleRaster::new();
    let look = ParticleLook::default();
    let drawn = raster
        .draw(&[particle_at(32.0, 32.0, 40.0)], &look, &mut layer)
        .unwrap();

    assert_eq!(drawn, 1);
    let centre = layer.pixel(32, 32).unwrap();
    assert!(centre[3] > 0);
    assert_eq!(layer.pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn oversized_and_offscreen_particles_stay_cheap() {
    let mut layer = Surface::new(Viewport::new(16, 16).unwrap());
    let mut raster = ParticleRaster::new();
    let huge = particle_at(8.0, 8.0, 1e12);
    let offscreen = particle_at(-500.0, 8.0, 10.0);

    let start = std::time::Instant::now();
    let drawn = raster
        .draw(&[huge, offscreen], &disc_look(), &mut layer)
        .unwrap();
    assert!(start.elapsed() < std::time::Duration::from_secs(1));

    assert_eq!(drawn, 1);
    assert_eq!(layer.pixel(0, 0), Some([255, 255, 255, 255]));
    assert_eq!(layer.pixel(15, 15), Some([255, 255, 255, 255]));
}
