//! Caller-owned analysis cache.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::analyzer::{content_hash, TemplateAnalyzer};
use crate::error::Result;
use crate::model::AnalysisResult;

/// Analysis results keyed by template content hash.
///
/// Identical template bytes always analyze identically, so a hit can be
/// returned without reading the document again.
#[derive(Debug, Default)]
pub struct AnalysisCache {
    entries: HashMap<String, AnalysisResult>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for a content hash.
    pub fn get(&self, content_hash: &str) -> Option<&AnalysisResult> {
        self.entries.get(content_hash)
    }

    /// Store a result under its own content hash.
    pub fn insert(&mut self, result: AnalysisResult) {
        self.entries.insert(result.content_hash.clone(), result);
    }

    /// Return the cached analysis of `data`, analyzing on a miss.
    pub fn get_or_analyze(
        &mut self,
        data: &[u8],
        analyzer: &TemplateAnalyzer,
    ) -> Result<&AnalysisResult> {
        let entry = match self.entries.entry(content_hash(data)) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                log::debug!("Analysis cache miss for {}", entry.key());
                entry.insert(analyzer.analyze_bytes(data)?)
            }
        };
        Ok(&*entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
