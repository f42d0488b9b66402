//! Rendered overlay output.

/// Overlay drawing for one template page.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPage {
    /// Page index (0-based)
    pub page: usize,
    pub width: f32,
    pub height: f32,
    pub content: OverlayContent,
}

/// Either nothing to draw, or an encoded content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayContent {
    Empty,
    /// Uncompressed content-stream bytes using the overlay font resources
    Rendered(Vec<u8>),
}

impl OverlayPage {
    pub fn empty(page: usize, width: f32, height: f32) -> Self {
        Self {
            page,
            width,
            height,
            content: OverlayContent::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.content, OverlayContent::Empty)
    }

    /// Content-stream bytes, if anything was drawn.
    pub fn content_bytes(&self) -> Option<&[u8]> {
        match &self.content {
            OverlayContent::Empty => None,
            OverlayContent::Rendered(bytes) => Some(bytes),
        }
    }
}
