//! Box placement representation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single placed box.
///
/// `(x, y)` is the center of the box in pallet coordinates. `rotated` is
/// `true` iff the box occupies `w × l` instead of `l × w`, i.e. its `l`-side
/// runs along the pallet's width axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    /// Center x-coordinate.
    pub x: f64,
    /// Center y-coordinate.
    pub y: f64,
    /// Whether the box is rotated by 90 degrees.
    pub rotated: bool,
}

impl Placement {
    /// Creates a new placement.
    pub fn new(x: f64, y: f64, rotated: bool) -> Self {
        Self { x, y, rotated }
    }

    /// Returns the axis-aligned extent `(width, height)` of this box given
    /// the box dimensions `(l, w)`.
    pub fn extent(&self, l: i32, w: i32) -> (f64, f64) {
        if self.rotated {
            (w as f64, l as f64)
        } else {
            (l as f64, w as f64)
        }
    }

    /// Returns the corners `(x0, y0, x1, y1)` of this box given the box
    /// dimensions `(l, w)`.
    pub fn corners(&self, l: i32, w: i32) -> (f64, f64, f64, f64) {
        let (dx, dy) = self.extent(l, w);
        (
            self.x - dx / 2.0,
            self.y - dy / 2.0,
            self.x + dx / 2.0,
            self.y + dy / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_follows_rotation() {
        let p = Placement::new(3.5, 1.5, false);
        assert_eq!(p.extent(7, 3), (7.0, 3.0));

        let r = Placement::new(1.5, 3.5, true);
        assert_eq!(r.extent(7, 3), (3.0, 7.0));
    }

    #[test]
    fn test_corners() {
        let p = Placement::new(3.5, 1.5, false);
        assert_eq!(p.corners(7, 3), (0.0, 0.0, 7.0, 3.0));
    }
}
