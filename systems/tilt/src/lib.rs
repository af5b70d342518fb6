#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pointer-driven parallax tilt applied to the planet container.

use terraform_core::{RunPhase, ScreenPoint, Viewport};

const TILT_DIVISOR: f32 = 25.0;
const HOVER_LIFT: f32 = -5.0;

/// Rotation applied to the planet container.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tilt {
    /// Rotation around the horizontal axis, in degrees.
    pub rotate_x_degrees: f32,
    /// Rotation around the vertical axis, in degrees.
    pub rotate_y_degrees: f32,
    /// Vertical translation in pixels; negative values lift the planet.
    pub lift: f32,
}

impl Tilt {
    /// Untilted resting pose.
    pub const REST: Self = Self {
        rotate_x_degrees: 0.0,
        rotate_y_degrees: 0.0,
        lift: 0.0,
    };
}

/// Tracks the pointer and derives the container tilt from it.
#[derive(Debug, Default)]
pub struct TiltTracker {
    tilt: Tilt,
}

impl TiltTracker {
    /// Current tilt.
    #[must_use]
    pub const fn tilt(&self) -> Tilt {
        self.tilt
    }

    /// Follows the pointer unless a run is animating. Returns whether the tilt changed.
    pub fn pointer_moved(
        &mut self,
        position: ScreenPoint,
        viewport: Viewport,
        phase: RunPhase,
    ) -> bool {
        if phase == RunPhase::Animating {
            return false;
        }

        let center = viewport.center();
        let next = Tilt {
            rotate_x_degrees: (center.y - position.y) / TILT_DIVISOR,
            rotate_y_degrees: (center.x - position.x) / TILT_DIVISOR,
            lift: HOVER_LIFT,
        };
        let changed = next != self.tilt;
        self.tilt = next;
        changed
    }

    /// Returns the container to rest once the pointer leaves the surface.
    pub fn pointer_left(&mut self) -> bool {
        let changed = self.tilt != Tilt::REST;
        self.tilt = Tilt::REST;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport::new(1000.0, 800.0);

    #[test]
    fn pointer_left_of_centre_rotates_positively_around_y() {
        let mut tracker = TiltTracker::default();
        assert!(tracker.pointer_moved(ScreenPoint::new(250.0, 400.0), VIEWPORT, RunPhase::Idle));

        let tilt = tracker.tilt();
        assert!((tilt.rotate_y_degrees - 10.0).abs() < 1e-4);
        assert!(tilt.rotate_x_degrees.abs() < 1e-4);
        assert!((tilt.lift + 5.0).abs() < 1e-4);
    }

    #[test]
    fn tilt_is_frozen_while_animating() {
        let mut tracker = TiltTracker::default();
        let _ = tracker.pointer_moved(ScreenPoint::new(0.0, 0.0), VIEWPORT, RunPhase::Idle);
        let before = tracker.tilt();

        assert!(!tracker.pointer_moved(
            ScreenPoint::new(900.0, 700.0),
            VIEWPORT,
            RunPhase::Animating
        ));
        assert_eq!(tracker.tilt(), before);
    }

    #[test]
    fn leaving_resets_to_rest() {
        let mut tracker = TiltTracker::default();
        let _ = tracker.pointer_moved(ScreenPoint::new(10.0, 10.0), VIEWPORT, RunPhase::Idle);

        assert!(tracker.pointer_left());
        assert_eq!(tracker.tilt(), Tilt::REST);
        assert!(!tracker.pointer_left());
    }
}
