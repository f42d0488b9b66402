//! Analysis output types.

use super::{BBox, FieldRegion, RegionKind};
use serde::{Deserialize, Serialize};

/// A region paired with its nearest label.
#[derive(Debug, Clone, PartialEq)]
pub struct Association {
    pub region: FieldRegion,
    pub label_text: String,
    pub label_bbox: BBox,
    pub distance: f32,
    /// In [0, 1], two decimals
    pub confidence: f32,
}

impl Association {
    /// Flatten into the serialized candidate shape.
    pub fn into_candidate(self) -> Candidate {
        Candidate {
            page: self.region.page,
            label_text: self.label_text,
            label_bbox: self.label_bbox,
            field_bbox: self.region.bbox,
            guess_type: self.region.kind,
            confidence: self.confidence,
        }
    }
}

/// One detected field in the analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub page: usize,
    pub label_text: String,
    pub label_bbox: BBox,
    pub field_bbox: BBox,
    pub guess_type: RegionKind,
    pub confidence: f32,
}

/// Full analysis of one template document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// SHA-256 of the template bytes, lowercase hex
    pub content_hash: String,
    pub page_count: usize,
    pub candidates: Vec<Candidate>,
}

impl AnalysisResult {
    /// Candidates detected on one page, in detection order.
    pub fn candidates_on_page(&self, page: usize) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(move |c| c.page == page)
    }

    /// Serialize to JSON.
    pub fn to_json(&self, pretty: bool) -> crate::Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}
