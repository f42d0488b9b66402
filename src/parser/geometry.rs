//! Candidate input regions from drawn rectangles.

use super::backend::{ContentOp, PdfBackend};
use super::graphics::{extract_paths, DrawingPath};
use crate::model::{BBox, FieldRegion, PageInfo, RegionKind};

/// Rectangles narrower or shorter than this are noise.
const MIN_EXTENT: f32 = 2.0;

/// Classify a rectangle by its size and aspect ratio.
///
/// Rules are evaluated in order; the first match wins:
///
/// | Rule | Kind |
/// |---|---|
/// | width < 2 or height < 2 | discarded |
/// | height ≤ 8 and width ≥ 30 | text line (underline) |
/// | 5 ≤ width ≤ 30, 5 ≤ height ≤ 30, 0.5 ≤ h/w ≤ 2 | checkbox |
/// | width ≥ 10 and height ≥ 8 | multiline if 1.5 < h/w < 4, else text line |
/// | anything else | discarded |
pub fn classify(rect: &BBox) -> Option<RegionKind> {
    let w = rect.width();
    let h = rect.height();

    if w < MIN_EXTENT || h < MIN_EXTENT {
        return None;
    }
    if h <= 8.0 && w >= 30.0 {
        return Some(RegionKind::TextLine);
    }

    let aspect = h / w;
    if (5.0..=30.0).contains(&w) && (5.0..=30.0).contains(&h) && (0.5..=2.0).contains(&aspect) {
        return Some(RegionKind::Checkbox);
    }
    if w >= 10.0 && h >= 8.0 {
        if aspect > 1.5 && aspect < 4.0 {
            return Some(RegionKind::MultilineBox);
        }
        return Some(RegionKind::TextLine);
    }
    None
}

/// Classified regions of one page, in drawing order.
pub fn regions_from_paths(paths: &[DrawingPath], page: &PageInfo) -> Vec<FieldRegion> {
    paths
        .iter()
        .filter_map(|path| {
            let kind = classify(&path.rect)?;
            Some(FieldRegion {
                page: page.index,
                bbox: path.rect,
                kind,
            })
        })
        .collect()
}

/// Finds fill-in regions among a page's vector drawings.
pub struct PageGeometryExtractor;

impl PageGeometryExtractor {
    /// Regions of one page; unreadable drawing data yields none.
    pub fn extract<B: PdfBackend + ?Sized>(backend: &B, page: &PageInfo) -> Vec<FieldRegion> {
        match backend.page_operations(page.index) {
            Ok(ops) => Self::from_operations(&ops, page),
            Err(e) => {
                log::warn!("Page {}: drawings unreadable: {}", page.index, e);
                Vec::new()
            }
        }
    }

    /// Regions from already-decoded content operations.
    pub fn from_operations(ops: &[ContentOp], page: &PageInfo) -> Vec<FieldRegion> {
        regions_from_paths(&extract_paths(ops, page), page)
    }
}
