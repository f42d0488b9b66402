//! Detected regions and text blocks.

use super::BBox;
use serde::{Deserialize, Serialize};

/// Guessed input type of a drawn region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionKind {
    /// Single-line text input (underline or wide short box)
    #[serde(rename = "text")]
    TextLine,
    /// Small near-square box
    #[serde(rename = "checkbox")]
    Checkbox,
    /// Tall box for wrapped text
    #[serde(rename = "multiline")]
    MultilineBox,
}

impl RegionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionKind::TextLine => "text",
            RegionKind::Checkbox => "checkbox",
            RegionKind::MultilineBox => "multiline",
        }
    }
}

impl std::fmt::Display for RegionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A drawn rectangle believed to be a fill-in area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldRegion {
    /// Page index (0-based)
    pub page: usize,
    pub bbox: BBox,
    pub kind: RegionKind,
}

/// A run of page text grouped into one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Page index (0-based)
    pub page: usize,
    pub bbox: BBox,
    /// Trimmed text with line breaks collapsed to spaces
    pub text: String,
}

impl TextBlock {
    pub fn new(page: usize, bbox: BBox, text: impl Into<String>) -> Self {
        Self {
            page,
            bbox,
            text: text.into(),
        }
    }
}
