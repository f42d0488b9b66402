//! Rendering options and page selection.

use crate::error::{Error, Result};
use std::ops::RangeInclusive;

/// Smallest font size the shrink-to-fit loops will go down to.
pub const MIN_FONT_SIZE: f32 = 4.0;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Font size for fields that do not set one.
pub const DEFAULT_FONT_SIZE: f32 = 10.0;

/// Options for rendering overlays and merging them into the template.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Floor for shrink-to-fit
    pub min_font_size: f32,

    /// Line height factor for multiline fields
    pub line_height: f32,

    /// Starting font size when a field does not specify one
    pub default_font_size: f32,

    /// Flate-compress overlay content streams in the output
    pub compress: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shrink-to-fit floor.
    pub fn with_min_font_size(mut self, size: f32) -> Self {
        self.min_font_size = size.max(1.0);
        self
    }

    /// Set the multiline line-height factor.
    pub fn with_line_height(mut self, factor: f32) -> Self {
        self.line_height = factor.max(1.0);
        self
    }

    /// Set the default starting font size.
    pub fn with_default_font_size(mut self, size: f32) -> Self {
        self.default_font_size = size;
        self
    }

    /// Enable or disable overlay stream compression.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            min_font_size: MIN_FONT_SIZE,
            line_height: LINE_HEIGHT_FACTOR,
            default_font_size: DEFAULT_FONT_SIZE,
            compress: true,
        }
    }
}

/// Page selection (1-indexed, as users write page numbers).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Check a 0-based page index.
    pub fn includes_index(&self, index: usize) -> bool {
        u32::try_from(index + 1)
            .map(|page| self.includes(page))
            .unwrap_or(false)
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        let invalid = || Error::InvalidPageRange(s.to_string());

        // Simple range (e.g., "1-10")
        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start: u32 = start.trim().parse().map_err(|_| invalid())?;
                let end: u32 = end.trim().parse().map_err(|_| invalid())?;
                if start == 0 || start > end {
                    return Err(invalid());
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        // Comma-separated list with possible ranges
        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            let (start, end) = match part.split_once('-') {
                Some((start, end)) => (
                    start.trim().parse::<u32>().map_err(|_| invalid())?,
                    end.trim().parse::<u32>().map_err(|_| invalid())?,
                ),
                None => {
                    let p = part.parse::<u32>().map_err(|_| invalid())?;
                    (p, p)
                }
            };
            if start == 0 || start > end {
                return Err(invalid());
            }
            for p in start..=end {
                if !pages.contains(&p) {
                    pages.push(p);
                }
            }
        }

        pages.sort();
        Ok(PageSelection::Pages(pages))
    }
}
