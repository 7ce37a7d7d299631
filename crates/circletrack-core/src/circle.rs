use serde::{Deserialize, Serialize};

/// A detected circular target in integer pixel coordinates.
///
/// Circles carry no identity beyond their coordinates: two circles are the
/// same target iff `x`, `y` and `r` are all equal.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Circle {
    pub x: i32,
    pub y: i32,
    pub r: i32,
}

impl Circle {
    pub const fn new(x: i32, y: i32, r: i32) -> Self {
        Self { x, y, r }
    }

    /// Round a sub-pixel detector output to the integer circle model.
    pub fn from_subpixel(x: f32, y: f32, r: f32) -> Self {
        Self {
            x: x.round() as i32,
            y: y.round() as i32,
            r: r.round() as i32,
        }
    }

    /// Bounding box `[x0, y0, x1, y1)` clipped to a `width x height` frame.
    ///
    /// Returns `None` when the clipped box is empty.
    pub fn clipped_bounds(&self, width: u32, height: u32) -> Option<[u32; 4]> {
        let x0 = (self.x - self.r).max(0);
        let y0 = (self.y - self.r).max(0);
        let x1 = (self.x + self.r).min(width as i32);
        let y1 = (self.y + self.r).min(height as i32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some([x0 as u32, y0 as u32, x1 as u32, y1 as u32])
    }

    /// Signed offset of this circle's center from the frame center.
    pub fn error_from_center(&self, width: u32, height: u32) -> PositionalError {
        let (cx, cy) = frame_center(width, height);
        PositionalError {
            x: self.x - cx,
            y: self.y - cy,
        }
    }
}

/// Signed pixel offset `(errorX, errorY)` of a target from the frame center.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PositionalError {
    pub x: i32,
    pub y: i32,
}

/// Frame center using integer division, `(width / 2, height / 2)`.
pub fn frame_center(width: u32, height: u32) -> (i32, i32) {
    ((width / 2) as i32, (height / 2) as i32)
}
