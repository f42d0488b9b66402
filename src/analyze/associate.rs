//! Nearest-label association.
//!
//! Form labels sit to the left of their field on the same row, or above
//! it. A label clearly to the right of and below a field's top-left
//! corner is never considered.

use crate::model::{round2, Association, BBox, FieldRegion, TextBlock};

/// A label's right edge may extend this far past the field's left edge.
pub const RIGHT_TOLERANCE: f32 = 50.0;

/// A label's bottom edge may extend this far past the field's top edge.
pub const BELOW_TOLERANCE: f32 = 20.0;

/// Distance at which confidence reaches zero.
pub const CONFIDENCE_DISTANCE: f32 = 200.0;

/// Weight of vertical separation for labels below the field.
const BELOW_PENALTY: f32 = 10.0;

/// Whether `label` may name the field at `field`.
pub fn is_eligible(label: &BBox, field: &BBox) -> bool {
    !(label.x1 > field.x0 + RIGHT_TOLERANCE && label.y1 > field.y0 + BELOW_TOLERANCE)
}

/// Distance score between a label and a field; lower is closer.
///
/// Same-row labels score their horizontal gap. Labels entirely above the
/// field score the squared distance between the label's bottom-right and
/// the field's top-left. Anything else scores the horizontal gap plus a
/// heavily weighted vertical separation.
pub fn label_distance(label: &BBox, field: &BBox) -> f32 {
    if label.overlaps_vertically(field) {
        return (field.x0 - label.x1).max(0.0);
    }
    if label.y1 <= field.y0 {
        let dx = field.x0 - label.x1;
        let dy = field.y0 - label.y1;
        return dx * dx + dy * dy;
    }
    (field.x0 - label.x1).max(0.0) + BELOW_PENALTY * (label.y0 - field.y1).max(0.0)
}

/// Confidence for a label at `distance`; zero when there is no label text.
pub fn confidence(label_text: &str, distance: f32) -> f32 {
    if label_text.is_empty() {
        return 0.0;
    }
    round2((1.0 - distance / CONFIDENCE_DISTANCE).clamp(0.0, 1.0))
}

/// Pairs each region with the closest eligible text block.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelFieldAssociator;

impl LabelFieldAssociator {
    pub fn new() -> Self {
        Self
    }

    /// Associate one region with its best label among `blocks`.
    ///
    /// Ties keep the block encountered first. `None` when no block is
    /// eligible.
    pub fn associate(&self, region: &FieldRegion, blocks: &[TextBlock]) -> Option<Association> {
        let mut best: Option<(&TextBlock, f32)> = None;

        for block in blocks {
            if !is_eligible(&block.bbox, &region.bbox) {
                continue;
            }
            let d = label_distance(&block.bbox, &region.bbox);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((block, d)),
            }
        }

        best.map(|(block, distance)| Association {
            region: *region,
            label_text: block.text.clone(),
            label_bbox: block.bbox,
            distance,
            confidence: confidence(&block.text, distance),
        })
    }

    /// Associate every region of a page, preserving region order.
    ///
    /// Regions without an eligible label are dropped.
    pub fn associate_all(&self, regions: &[FieldRegion], blocks: &[TextBlock]) -> Vec<Association> {
        regions
            .iter()
            .filter_map(|region| {
                let assoc = self.associate(region, blocks);
                if assoc.is_none() {
                    log::debug!(
                        "Page {}: no label for region {:?}, dropping",
                        region.page,
                        region.bbox.to_array()
                    );
                }
                assoc
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RegionKind;

    fn region(bbox: BBox) -> FieldRegion {
        FieldRegion {
            page: 0,
            bbox,
            kind: RegionKind::TextLine,
        }
    }

    fn block(text: &str, bbox: BBox) -> TextBlock {
        TextBlock::new(0, bbox, text)
    }

    #[test]
    fn test_same_row_label() {
        let field = region(BBox::new(150.0, 100.0, 350.0, 118.0));
        let blocks = vec![block("Name:", BBox::new(100.0, 100.0, 140.0, 112.0))];
        let assoc = LabelFieldAssociator::new()
            .associate(&field, &blocks)
            .unwrap();
        assert_eq!(assoc.label_text, "Name:");
        assert_eq!(assoc.distance, 10.0);
        assert_eq!(assoc.confidence, 0.95);
    }

    #[test]
    fn test_label_above_uses_squared_distance() {
        let field = BBox::new(100.0, 130.0, 300.0, 148.0);
        let label = BBox::new(100.0, 110.0, 160.0, 120.0);
        // dx = -60, dy = 10
        assert_eq!(label_distance(&label, &field), 3700.0);
        assert_eq!(confidence("Address", 3700.0), 0.0);
    }

    #[test]
    fn test_label_below_is_penalized() {
        let field = BBox::new(100.0, 100.0, 300.0, 118.0);
        let label = BBox::new(40.0, 125.0, 90.0, 135.0);
        // gap 10 + 10 * (125 - 118)
        assert_eq!(label_distance(&label, &field), 80.0);
    }

    #[test]
    fn test_label_left_and_below_scores_its_top_edge() {
        let field = BBox::new(100.0, 100.0, 300.0, 118.0);
        // Separation is measured from the field's bottom to the label's top
        let near = BBox::new(20.0, 120.0, 90.0, 130.0);
        let far = BBox::new(20.0, 140.0, 90.0, 150.0);
        assert_eq!(label_distance(&near, &field), 10.0 + 10.0 * 2.0);
        assert_eq!(label_distance(&far, &field), 10.0 + 10.0 * 22.0);

        let blocks = vec![block("Far", far), block("Near", near)];
        let assoc = LabelFieldAssociator::new()
            .associate(&region(field), &blocks)
            .unwrap();
        assert_eq!(assoc.label_text, "Near");
        assert_eq!(assoc.distance, 30.0);
        assert_eq!(assoc.confidence, 0.85);
    }

    #[test]
    fn test_eligibility() {
        let field = BBox::new(100.0, 100.0, 300.0, 118.0);
        // Far right and below: excluded
        assert!(!is_eligible(&BBox::new(200.0, 130.0, 260.0, 140.0), &field));
        // Far right but same row: allowed
        assert!(is_eligible(&BBox::new(310.0, 100.0, 360.0, 110.0), &field));
        // Below but to the left: allowed
        assert!(is_eligible(&BBox::new(20.0, 150.0, 90.0, 160.0), &field));
    }

    #[test]
    fn test_no_eligible_label() {
        let field = region(BBox::new(100.0, 100.0, 300.0, 118.0));
        let blocks = vec![block("Footer", BBox::new(200.0, 500.0, 400.0, 510.0))];
        let associator = LabelFieldAssociator::new();
        assert!(associator.associate(&field, &blocks).is_none());
        assert!(associator.associate_all(&[field], &blocks).is_empty());
    }

    #[test]
    fn test_tie_keeps_first() {
        let field = region(BBox::new(150.0, 100.0, 350.0, 118.0));
        let blocks = vec![
            block("First", BBox::new(100.0, 100.0, 140.0, 112.0)),
            block("Second", BBox::new(100.0, 104.0, 140.0, 116.0)),
        ];
        let assoc = LabelFieldAssociator::new()
            .associate(&field, &blocks)
            .unwrap();
        assert_eq!(assoc.label_text, "First");
    }

    #[test]
    fn test_closer_label_wins() {
        let field = region(BBox::new(150.0, 100.0, 350.0, 118.0));
        let blocks = vec![
            block("Far", BBox::new(20.0, 100.0, 60.0, 112.0)),
            block("Near", BBox::new(100.0, 100.0, 146.0, 112.0)),
        ];
        let assoc = LabelFieldAssociator::new()
            .associate(&field, &blocks)
            .unwrap();
        assert_eq!(assoc.label_text, "Near");
        assert_eq!(assoc.confidence, 0.98);
    }

    #[test]
    fn test_confidence_bounds() {
        assert_eq!(confidence("x", 0.0), 1.0);
        assert_eq!(confidence("x", 500.0), 0.0);
        assert_eq!(confidence("", 0.0), 0.0);
        assert_eq!(confidence("x", 30.0), 0.85);
    }
}
