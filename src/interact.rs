//! Maps pointer events in display coordinates onto simulation actions.

use crate::foundation::core::{Point, Rect, Viewport};

/// Converts display-space pointer positions into logical viewport coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerMapper {
    /// Where the composite is shown, in display coordinates.
    pub area: Rect,
    pub viewport: Viewport,
}

impl PointerMapper {
    pub fn new(area: Rect, viewport: Viewport) -> Self {
        Self { area, viewport }
    }

    /// Logical position for `pointer`, or `None` when it falls outside the area (bounds are
    /// inclusive) or the area has no extent.
    pub fn map(&self, pointer: Point) -> Option<Point> {
        let r = self.area;
        if !pointer.is_finite() || !(r.width() > 0.0) || !(r.height() > 0.0) {
            return None;
        }
        if pointer.x < r.x0 || pointer.x > r.x1 || pointer.y < r.y0 || pointer.y > r.y1 {
            return None;
        }
        Some(Point::new(
            f64::from(self.viewport.width) * (pointer.x - r.x0) / r.width(),
            f64::from(self.viewport.height) * (pointer.y - r.y0) / r.height(),
        ))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Move(Point),
    Click(Point),
}

/// What the session should do in response to a pointer event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Interaction {
    None,
    /// Spawn once at this logical point.
    Hover(Point),
    /// Replace the spawn policy with a point emitter here.
    InstallSpawn(Point),
    /// Clear the particles and stop emitting.
    Clear,
}

/// Hit-tests pointer events against the composite area and the clear control.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionMapper {
    pub pointer: PointerMapper,
    pub clear_button: Option<Rect>,
}

impl InteractionMapper {
    pub fn new(area: Rect, viewport: Viewport) -> Self {
        Self {
            pointer: PointerMapper::new(area, viewport),
            clear_button: None,
        }
    }

    pub fn with_clear_button(mut self, rect: Rect) -> Self {
        self.clear_button = Some(rect);
        self
    }

    /// Clicks on the composite area win over an overlapping clear control.
    pub fn interpret(&self, event: PointerEvent) -> Interaction {
        match event {
            PointerEvent::Move(p) => self
                .pointer
                .map(p)
                .map_or(Interaction::None, Interaction::Hover),
            PointerEvent::Click(p) => {
                if let Some(logical) = self.pointer.map(p) {
                    return Interaction::InstallSpawn(logical);
                }
                match self.clear_button {
                    Some(r) if contains_inclusive(r, p) => Interaction::Clear,
                    _ => Interaction::None,
                }
            }
        }
    }
}

fn contains_inclusive(r: Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}

#[cfg(test)]
#[path = "../tests/unit/interact.rs"]
mod tests;
