use crate::error::RegionError;

/// A pixel coordinate: column `x`, row `y`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for Point {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// The defective rectangle
///
/// `(x0, y0)` is the top-left corner and `(x1, y1)` the bottom-right one.
/// The pixels that get repaired are the half-open interior
/// `[x0, x1) x [y0, y1)`; the right column `x1` and bottom row `y1` are
/// valid pixels that some rules copy from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Rect {
    /// Build a rectangle from its top-left and bottom-right corners
    pub fn new(from: (u32, u32), to: (u32, u32)) -> Result<Self, RegionError> {
        let (x0, y0) = from;
        let (x1, y1) = to;

        if x0 > x1 || y0 > y1 {
            return Err(RegionError::InvalidRectangle { x0, y0, x1, y1 });
        }

        Ok(Self { x0, y0, x1, y1 })
    }

    /// Midpoint of the two corners, rounded up on each axis
    pub fn reference(&self) -> Point {
        Point {
            x: ceil_midpoint(self.x0, self.x1),
            y: ceil_midpoint(self.y0, self.y1),
        }
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    /// True when the interior holds no pixels
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Whether `(x, y)` lies in the repaired interior
    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.x0..self.x1).contains(&x) && (self.y0..self.y1).contains(&y)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    /// Interior coordinates, outer loop over columns and inner loop over rows
    pub fn interior_column_major(&self) -> impl Iterator<Item = Point> {
        let (y0, y1) = (self.y0, self.y1);
        (self.x0..self.x1).flat_map(move |x| (y0..y1).map(move |y| Point::new(x, y)))
    }

    /// Check the rectangle and its right/bottom source edge fit in a frame
    pub fn check_fits(&self, width: u32, height: u32) -> Result<(), RegionError> {
        if self.x1 >= width || self.y1 >= height {
            return Err(RegionError::OutOfBounds {
                x1: self.x1,
                y1: self.y1,
                width,
                height,
            });
        }
        Ok(())
    }
}

fn ceil_midpoint(a: u32, b: u32) -> u32 {
    ((a as u64 + b as u64 + 1) / 2) as u32
}
