//! Page-space rectangles.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in page space.
///
/// Origin is the top-left corner of the page and y grows downward, so
/// `y0` is the top edge and `y1` the bottom edge. Serialized as
/// `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Create a rectangle from its edges.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Build from the first four components of a slice.
    ///
    /// Returns `None` when fewer than four values are present.
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        match values {
            [x0, y0, x1, y1, ..] => Some(Self::new(*x0, *y0, *x1, *y1)),
            _ => None,
        }
    }

    /// Smallest rectangle covering every point.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        let mut iter = points.into_iter();
        let (x, y) = iter.next()?;
        let mut rect = Self::new(x, y, x, y);
        for (x, y) in iter {
            rect.x0 = rect.x0.min(x);
            rect.y0 = rect.y0.min(y);
            rect.x1 = rect.x1.max(x);
            rect.y1 = rect.y1.max(y);
        }
        Some(rect)
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// True when the two rectangles share some vertical extent.
    pub fn overlaps_vertically(&self, other: &BBox) -> bool {
        self.y1 > other.y0 && self.y0 < other.y1
    }

    /// Grow the rectangle by `amount` on every side.
    pub fn expand(&self, amount: f32) -> Self {
        Self::new(
            self.x0 - amount,
            self.y0 - amount,
            self.x1 + amount,
            self.y1 + amount,
        )
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &BBox) -> Self {
        Self::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }

    /// Round every coordinate to two decimals.
    pub fn rounded(&self) -> Self {
        Self::new(
            round2(self.x0),
            round2(self.y0),
            round2(self.x1),
            round2(self.y1),
        )
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.x0, self.y0, self.x1, self.y1]
    }
}

impl From<[f32; 4]> for BBox {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f32; 4] {
    fn from(b: BBox) -> Self {
        b.to_array()
    }
}

/// Round to two decimal places.
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
