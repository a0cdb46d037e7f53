use super::*;
use crate::config::controls::{Control, Controls};
use crate::config::sim::EmitterConfig;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::{Rect, Rgb8};
use crate::media::source::SolidSource;

fn vp(w: u32, h: u32) -> Viewport {
    Viewport::new(w, h).unwrap()
}

fn red_session(opts: SessionOpts) -> Session<Controls> {
    let source = SolidSource::new(Rgb8::new(255, 0, 0), 16, 16).unwrap();
    Session::new(Controls::default(), Box::new(source), opts)
}

#[test]
fn first_tick_emits_from_bottom_center_and_composites() {
    let mut s = red_session(SessionOpts::new(vp(32, 24)));
    let outcome = s.tick(1.0 / 30.0).unwrap();

    let TickOutcome::Rendered(report) = outcome else {
        panic!("expected a rendered tick, got {outcome:?}");
    };
    assert_eq!(report.spawned, 10);
    assert!(s
        .machine()
        .store()
        .particles()
        .iter()
        .all(|p| (p.position.x - 16.0).abs() < 40.0));
    assert_eq!(s.surfaces().composite.viewport(), vp(32, 24));
    assert_eq!(s.surfaces().raw_frame.pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(s.surfaces().composite.global_alpha(), 1.0);
}

#[test]
fn paused_or_ended_source_halts_the_tick() {
    let mut s = red_session(SessionOpts::new(vp(8, 8)));
    s.source_mut().set_paused(true);
    assert_eq!(
        s.tick(0.1).unwrap(),
        TickOutcome::Halted(PlaybackState::Paused)
    );
    assert_eq!(s.ticks(), 0);
    assert_eq!(s.machine().count(), 0);

    s.source_mut().set_paused(false);
    assert!(matches!(s.tick(0.1).unwrap(), TickOutcome::Rendered(_)));
}

#[test]
fn viewport_change_resizes_without_stale_content() {
    let mut s = red_session(SessionOpts::new(vp(800, 600)));
    s.tick(0.016).unwrap();
    s.set_viewport(vp(1920, 1080));
    s.tick(0.016).unwrap();

    let surfaces = s.surfaces();
    assert_eq!(surfaces.composite.viewport(), vp(1920, 1080));
    assert_eq!(surfaces.effect.viewport(), vp(1920, 1080));
    // Corners are far from the emitter, so only the red frame shows there.
    assert_eq!(surfaces.composite.pixel(1919, 0), Some([255, 0, 0, 255]));
    assert_eq!(surfaces.effect.pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn control_change_resets_particles_but_opacity_does_not() {
    let mut s = red_session(SessionOpts::new(vp(64, 64)));
    s.tick(0.05).unwrap();
    s.tick(0.05).unwrap();
    assert_eq!(s.machine().count(), 20);

    s.controls_mut().set(Control::Opacity, "40");
    s.tick(0.05).unwrap();
    assert_eq!(s.machine().count(), 30);
    assert_eq!(s.config().blend_opacity, 0.4);

    s.controls_mut().set(Control::ParticleCount, "3");
    s.tick(0.05).unwrap();
    assert_eq!(s.machine().count(), 3);
}

#[test]
fn pointer_click_and_clear() {
    let mut s = red_session(SessionOpts {
        emit_from_bottom_center: false,
        ..SessionOpts::new(vp(100, 100))
    });
    let mapper = InteractionMapper::new(Rect::new(0.0, 0.0, 200.0, 200.0), vp(100, 100))
        .with_clear_button(Rect::new(300.0, 0.0, 340.0, 20.0));

    let hover = s.handle_pointer(&mapper, PointerEvent::Move(Point::new(50.0, 50.0)));
    assert_eq!(hover, Interaction::Hover(Point::new(25.0, 25.0)));
    assert_eq!(s.machine().count(), 10);

    s.handle_pointer(&mapper, PointerEvent::Click(Point::new(100.0, 100.0)));
    s.tick(0.01).unwrap();
    assert_eq!(s.machine().count(), 20);
    assert!(s
        .machine()
        .store()
        .particles()
        .iter()
        .skip(10)
        .all(|p| (p.position.y - 50.0).abs() < 5.0));

    s.handle_pointer(&mapper, PointerEvent::Click(Point::new(320.0, 10.0)));
    s.tick(0.01).unwrap();
    assert_eq!(s.machine().count(), 0);
    s.tick(0.01).unwrap();
    assert_eq!(s.machine().count(), 0);
}

#[test]
fn hover_uses_particle_count_set_since_last_tick() {
    let mut s = red_session(SessionOpts {
        emit_from_bottom_center: false,
        ..SessionOpts::new(vp(100, 100))
    });
    s.tick(0.01).unwrap();
    let mapper = InteractionMapper::new(Rect::new(0.0, 0.0, 100.0, 100.0), vp(100, 100));

    s.controls_mut().set(Control::ParticleCount, "4");
    s.handle_pointer(&mapper, PointerEvent::Move(Point::new(10.0, 10.0)));
    assert_eq!(s.machine().count(), 4);
}

#[test]
fn config_emitters_survive_control_rebuilds() {
    let cfg = SimulationConfig {
        emitters: vec![
            EmitterConfig::at(Point::new(10.0, 60.0), 2),
            EmitterConfig::at(Point::new(50.0, 60.0), 3),
        ],
        ..SimulationConfig::default()
    };
    let source = SolidSource::new(Rgb8::new(255, 0, 0), 16, 16).unwrap();
    let mut s = Session::new(
        Controls::new(cfg),
        Box::new(source),
        SessionOpts {
            emit_from_bottom_center: false,
            ..SessionOpts::new(vp(64, 64))
        },
    );
    assert_eq!(s.machine().emitters().len(), 2);

    s.controls_mut().set(Control::MaxLife, "9");
    let TickOutcome::Rendered(report) = s.tick(0.01).unwrap() else {
        panic!("source should be playing");
    };
    assert_eq!(report.emitters, 2);
    // Initial burst of the rebuilt machine plus one tick of emission.
    assert_eq!(s.machine().count(), 10);
}

#[test]
fn snapshot_files_use_media_name_and_time() {
    let dir = std::env::temp_dir().join(format!("smokesim_session_{}", std::process::id()));
    let mut s = red_session(SessionOpts::new(vp(16, 16)));
    s.tick(0.5).unwrap();
    s.tick(0.5).unwrap();

    let paths = s.write_snapshot(&dir).unwrap();
    assert!(paths.effect.ends_with("smoke_solid_ff0000_ts_0.5.png"));
    assert!(paths.blended.ends_with("blended_solid_ff0000_ts_0.5.png"));
    assert!(paths.frame.ends_with("solid_ff0000_ts_0.5.png"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn render_range_feeds_both_sinks() {
    let mut s = red_session(SessionOpts::new(vp(8, 6)));
    let mut video = InMemorySink::new();
    let mut mask = InMemorySink::new();
    let stats = s.render_range(5, 30, &mut video, Some(&mut mask)).unwrap();

    assert_eq!(stats.frames, 5);
    assert!(!stats.halted_early);
    assert_eq!(video.frames.len(), 5);
    assert_eq!(mask.frames.len(), 5);
    assert!(video.is_ended() && mask.is_ended());
    assert_eq!(video.config().map(|c| (c.width, c.height)), Some((8, 6)));
}

#[test]
fn augment_returns_image_and_mask() {
    let mut s = red_session(SessionOpts::new(vp(200, 200)));
    let out = s.augment(3, 0.1).unwrap();
    assert_eq!(out.image.dimensions(), (200, 200));
    assert_eq!(out.mask.dimensions(), (200, 200));
    assert_eq!(out.mask.get_pixel(0, 0).0, [0, 0, 0, 255]);
    assert!(s.augment(0, 0.1).is_err());
}
