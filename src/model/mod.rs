//! Data model shared by analysis and rendering.
//!
//! All rectangles are in page space: origin at the top-left corner of the
//! page, y growing downward, units in points. Pages are indexed from 0.

mod analysis;
mod field;
mod geometry;
mod overlay;
mod page;
mod region;

pub use analysis::{AnalysisResult, Association, Candidate};
pub use field::{FieldDefinition, FieldKind, TemplateConfig};
pub use geometry::{round2, BBox};
pub use overlay::{OverlayContent, OverlayPage};
pub use page::PageInfo;
pub use region::{FieldRegion, RegionKind, TextBlock};
