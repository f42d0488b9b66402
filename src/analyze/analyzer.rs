//! Whole-document template analysis.

use std::path::Path;

use rayon::prelude::*;
use sha2::{Digest, Sha256};

use super::associate::LabelFieldAssociator;
use super::options::AnalyzeOptions;
use crate::error::Result;
use crate::model::{AnalysisResult, Candidate, PageInfo, TextBlock};
use crate::parser::geometry::regions_from_paths;
use crate::parser::graphics::{extract_paths, DrawingPath};
use crate::parser::{LopdfBackend, PdfBackend, TextBlockExtractor};

/// SHA-256 of `bytes` as lowercase hex.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Everything read from one page before classification.
#[derive(Debug)]
struct PageExtraction {
    info: PageInfo,
    paths: Vec<DrawingPath>,
    blocks: Vec<TextBlock>,
}

/// Runs region detection, text grouping and label association over a
/// whole document.
///
/// Reading the document is sequential; classification and association
/// work on plain extracted data and may run on the rayon pool. Output
/// order is page order, then drawing order within a page, in both modes.
#[derive(Debug, Clone, Default)]
pub struct TemplateAnalyzer {
    options: AnalyzeOptions,
    associator: LabelFieldAssociator,
}

impl TemplateAnalyzer {
    /// Create an analyzer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with the given options.
    pub fn with_options(options: AnalyzeOptions) -> Self {
        Self {
            options,
            associator: LabelFieldAssociator::new(),
        }
    }

    /// Current options.
    pub fn options(&self) -> &AnalyzeOptions {
        &self.options
    }

    /// Analyze a template held in memory.
    ///
    /// Fails only when the bytes are not a readable PDF.
    pub fn analyze_bytes(&self, data: &[u8]) -> Result<AnalysisResult> {
        let backend = LopdfBackend::load_bytes(data)?;
        Ok(self.analyze(&backend))
    }

    /// Analyze a template file.
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P) -> Result<AnalysisResult> {
        let backend = LopdfBackend::load_file(path)?;
        Ok(self.analyze(&backend))
    }

    /// Analyze an opened document.
    ///
    /// Pages whose content cannot be read contribute no candidates.
    pub fn analyze<B: PdfBackend + ?Sized>(&self, backend: &B) -> AnalysisResult {
        let page_count = backend.page_count();

        let pages: Vec<PageExtraction> = (0..page_count)
            .filter(|i| self.options.pages.includes_index(*i))
            .map(|i| self.extract_page(backend, i))
            .collect();

        let per_page: Vec<Vec<Candidate>> = if self.options.parallel && pages.len() > 1 {
            pages.par_iter().map(|p| self.page_candidates(p)).collect()
        } else {
            pages.iter().map(|p| self.page_candidates(p)).collect()
        };

        let candidates: Vec<Candidate> = per_page.into_iter().flatten().collect();
        log::debug!(
            "Analyzed {} pages, {} candidates",
            page_count,
            candidates.len()
        );

        AnalysisResult {
            content_hash: content_hash(backend.raw_bytes()),
            page_count,
            candidates,
        }
    }

    fn extract_page<B: PdfBackend + ?Sized>(&self, backend: &B, index: usize) -> PageExtraction {
        let info = backend.page_info(index).unwrap_or_else(|e| {
            log::warn!("Page {}: {}, assuming Letter", index, e);
            PageInfo::letter(index)
        });

        match backend.page_operations(index) {
            Ok(ops) => PageExtraction {
                info,
                paths: extract_paths(&ops, &info),
                blocks: TextBlockExtractor::from_operations(backend, &ops, &info),
            },
            Err(e) => {
                log::warn!("Page {}: content unreadable, skipping: {}", index, e);
                PageExtraction {
                    info,
                    paths: Vec::new(),
                    blocks: Vec::new(),
                }
            }
        }
    }

    fn page_candidates(&self, page: &PageExtraction) -> Vec<Candidate> {
        let regions = regions_from_paths(&page.paths, &page.info);
        log::debug!(
            "Page {}: {} paths, {} regions, {} text blocks",
            page.info.index,
            page.paths.len(),
            regions.len(),
            page.blocks.len()
        );

        self.associator
            .associate_all(&regions, &page.blocks)
            .into_iter()
            .map(|a| a.into_candidate())
            .collect()
    }
}
