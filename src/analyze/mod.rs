//! Template analysis: regions, labels and candidates.

pub mod analyzer;
pub mod associate;
pub mod cache;
mod options;

pub use analyzer::{content_hash, TemplateAnalyzer};
pub use associate::LabelFieldAssociator;
pub use cache::AnalysisCache;
pub use options::AnalyzeOptions;
