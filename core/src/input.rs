use crate::*;

/// Minimum travel along an axis before a touch counts as a swipe.
pub const DEFAULT_SWIPE_SENSITIVITY: f32 = 3.0;

/// A completed touch gesture in screen coordinates (`y` grows downward).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Swipe {
    pub start: (f32, f32),
    pub end: (f32, f32),
}

impl Swipe {
    pub const fn new(start: (f32, f32), end: (f32, f32)) -> Self {
        Self { start, end }
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction_with_sensitivity(DEFAULT_SWIPE_SENSITIVITY)
    }

    /// Dominant axis decides, a gesture shorter than `sensitivity` on both axes is a tap.
    pub fn direction_with_sensitivity(&self, sensitivity: f32) -> Option<Direction> {
        let delta_x = self.start.0 - self.end.0;
        let delta_y = self.start.1 - self.end.1;
        let (abs_x, abs_y) = (delta_x.abs(), delta_y.abs());

        if abs_x < sensitivity && abs_y < sensitivity {
            return None;
        }

        Some(if abs_x > abs_y {
            if delta_x > 0.0 {
                Direction::Left
            } else {
                Direction::Right
            }
        } else if delta_y > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        })
    }
}
