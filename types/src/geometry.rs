//! Screen-space rectangles used by sampling regions.

use serde::{Deserialize, Serialize};

/// An axis-aligned screen rectangle in pixel coordinates.
///
/// `(x1, y1)` is the top-left corner, `(x2, y2)` the bottom-right.
/// Definitions store regions exactly as the user drew them; validity is
/// checked at evaluation time, not at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Region {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Region {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// A region with zero or negative extent cannot be sampled.
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Split into `count` equal-width vertical slices, left to right.
    ///
    /// Used by health-bar estimation. Remainder pixels are absorbed by the
    /// last slice so the union always covers the full region.
    pub fn vertical_slices(&self, count: u32) -> Vec<Region> {
        if count == 0 || self.is_degenerate() {
            return Vec::new();
        }
        let count = count as i32;
        let step = self.width() / count;
        if step == 0 {
            // Narrower than the slice count: treat the whole bar as one slice.
            return vec![*self];
        }
        (0..count)
            .map(|i| {
                let x1 = self.x1 + i * step;
                let x2 = if i == count - 1 { self.x2 } else { x1 + step };
                Region::new(x1, self.y1, x2, self.y2)
            })
            .collect()
    }
}
