//! Page-level types.

use serde::{Deserialize, Serialize};

/// Geometry of a single template page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Page index (0-based)
    pub index: usize,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Lower-left corner of the MediaBox in PDF user space
    #[serde(default)]
    pub origin_x: f32,

    #[serde(default)]
    pub origin_y: f32,
}

impl PageInfo {
    /// Create page geometry with a MediaBox rooted at (0, 0).
    pub fn new(index: usize, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter(index: usize) -> Self {
        Self::new(index, 612.0, 792.0) // 8.5 * 72, 11 * 72
    }

    /// Build from a MediaBox `[llx, lly, urx, ury]`, tolerating swapped corners.
    pub fn from_media_box(index: usize, media_box: [f32; 4]) -> Self {
        let [ax, ay, bx, by] = media_box;
        Self {
            index,
            width: (bx - ax).abs(),
            height: (by - ay).abs(),
            origin_x: ax.min(bx),
            origin_y: ay.min(by),
        }
    }

    /// Whether the MediaBox is offset from the user-space origin.
    pub fn has_offset_origin(&self) -> bool {
        self.origin_x != 0.0 || self.origin_y != 0.0
    }

    /// Convert a PDF user-space point to top-left page space.
    pub fn to_page_space(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.origin_x, self.origin_y + self.height - y)
    }
}
