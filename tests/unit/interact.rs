use super::*;

fn mapper() -> InteractionMapper {
    InteractionMapper::new(
        Rect::new(100.0, 50.0, 500.0, 350.0),
        Viewport::new(800, 600).unwrap(),
    )
    .with_clear_button(Rect::new(600.0, 10.0, 680.0, 40.0))
}

#[test]
fn pointer_maps_proportionally_into_viewport() {
    let m = mapper().pointer;
    assert_eq!(m.map(Point::new(100.0, 50.0)), Some(Point::new(0.0, 0.0)));
    assert_eq!(m.map(Point::new(300.0, 200.0)), Some(Point::new(400.0, 300.0)));
    assert_eq!(m.map(Point::new(500.0, 350.0)), Some(Point::new(800.0, 600.0)));
    assert_eq!(m.map(Point::new(99.9, 200.0)), None);
    assert_eq!(m.map(Point::new(f64::NAN, 200.0)), None);
}

#[test]
fn degenerate_area_maps_nothing() {
    let m = PointerMapper::new(
        Rect::new(10.0, 10.0, 10.0, 90.0),
        Viewport::new(100, 100).unwrap(),
    );
    assert_eq!(m.map(Point::new(10.0, 20.0)), None);
}

#[test]
fn events_become_interactions() {
    let m = mapper();
    assert_eq!(
        m.interpret(PointerEvent::Move(Point::new(300.0, 200.0))),
        Interaction::Hover(Point::new(400.0, 300.0))
    );
    assert_eq!(
        m.interpret(PointerEvent::Click(Point::new(100.0, 50.0))),
        Interaction::InstallSpawn(Point::ZERO)
    );
    assert_eq!(
        m.interpret(PointerEvent::Click(Point::new(640.0, 20.0))),
        Interaction::Clear
    );
    assert_eq!(
        m.interpret(PointerEvent::Move(Point::new(640.0, 20.0))),
        Interaction::None
    );
    assert_eq!(
        m.interpret(PointerEvent::Click(Point::new(5.0, 5.0))),
        Interaction::None
    );
}
