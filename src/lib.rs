//! # flatfill
//!
//! Field detection and value filling for flat (non-interactive) PDF forms.
//!
//! Flat forms have no AcroForm widgets: their "fields" are just drawn
//! boxes and underlines next to printed labels. This library finds those
//! regions, guesses which label belongs to each, and fills a template by
//! drawing values on top of the original pages.
//!
//! ## Quick Start
//!
//! ```no_run
//! use flatfill::{analyze_file, fill_file, TemplateConfig};
//!
//! fn main() -> flatfill::Result<()> {
//!     // Find candidate fields on a blank template
//!     let analysis = analyze_file("subscription.pdf")?;
//!     println!("{} candidate fields", analysis.candidates.len());
//!
//!     // Fill it using a hand-edited field configuration
//!     let config = TemplateConfig::from_file("template_config.json")?;
//!     let data = serde_json::json!({"investor": {"legal_name": "Acme Capital LLC"}});
//!     fill_file("subscription.pdf", &config, &data, "filled.pdf")?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Region detection**: text lines, checkboxes and multiline boxes from vector drawings
//! - **Label association**: directional nearest-label matching with confidence scores
//! - **Shrink-to-fit rendering**: single-line and word-wrapped text, checkbox marks
//! - **Non-destructive merge**: overlays are composited above the original content
//! - **Parallel analysis**: uses Rayon for multi-page documents
//! - **Background jobs**: fill on a worker thread with a non-blocking progress stream

pub mod analyze;
pub mod detect;
pub mod error;
pub mod fill;
pub mod model;
pub mod parser;
pub mod render;
pub mod values;
pub mod worker;

// Re-export commonly used types
pub use analyze::{content_hash, AnalysisCache, AnalyzeOptions, TemplateAnalyzer};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use fill::{FillOptions, FillOutput, Filler};
pub use model::{
    AnalysisResult, BBox, Candidate, FieldDefinition, FieldKind, FieldRegion, OverlayPage,
    PageInfo, RegionKind, TemplateConfig, TextBlock,
};
pub use render::{
    progress_channel, OverlayRenderer, PageMerger, PageSelection, ProgressEvent, ProgressObserver,
    RenderOptions,
};
pub use values::{DefaultFormatter, DisplayFormatter, ValueSource};
pub use worker::{spawn_fill, FillJob, FillRequest};

use std::path::Path;

/// Analyze a template file for candidate fields.
///
/// # Arguments
///
/// * `path` - Path to the PDF template
///
/// # Example
///
/// ```no_run
/// use flatfill::analyze_file;
///
/// let analysis = analyze_file("form.pdf").unwrap();
/// for c in &analysis.candidates {
///     println!("{} -> {:?} ({})", c.label_text, c.field_bbox, c.confidence);
/// }
/// ```
pub fn analyze_file<P: AsRef<Path>>(path: P) -> Result<AnalysisResult> {
    TemplateAnalyzer::new().analyze_file(path)
}

/// Analyze a template held in memory.
///
/// # Example
///
/// ```no_run
/// use flatfill::analyze_bytes;
///
/// let data = std::fs::read("form.pdf").unwrap();
/// let analysis = analyze_bytes(&data).unwrap();
/// println!("{}", analysis.content_hash);
/// ```
pub fn analyze_bytes(data: &[u8]) -> Result<AnalysisResult> {
    TemplateAnalyzer::new().analyze_bytes(data)
}

/// Fill a template held in memory and return the filled document bytes.
///
/// # Example
///
/// ```no_run
/// use flatfill::{fill_bytes, TemplateConfig};
///
/// let template = std::fs::read("form.pdf").unwrap();
/// let config = TemplateConfig::from_file("template_config.json").unwrap();
/// let filled = fill_bytes(&template, &config, &serde_json::json!({"name": "Ann"})).unwrap();
/// std::fs::write("filled.pdf", filled).unwrap();
/// ```
pub fn fill_bytes<V: ValueSource + ?Sized>(
    template: &[u8],
    config: &TemplateConfig,
    values: &V,
) -> Result<Vec<u8>> {
    Ok(Filler::new().fill(template, config, values)?.document)
}

/// Fill a template file and write the result to `output`.
pub fn fill_file<P, Q, V>(template: P, config: &TemplateConfig, values: &V, output: Q) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    V: ValueSource + ?Sized,
{
    let data = std::fs::read(template)?;
    Filler::new().fill(&data, config, values)?.save(output)
}

/// Builder for analyzing and filling templates.
///
/// # Example
///
/// ```no_run
/// use flatfill::{Flatfill, TemplateConfig};
///
/// let template = std::fs::read("form.pdf")?;
/// let config = TemplateConfig::from_file("template_config.json")?;
/// let output = Flatfill::new()
///     .sequential()
///     .with_min_font_size(5.0)
///     .fill(&template, &config, &serde_json::json!({}))?;
/// println!("{} pages filled", output.pages_filled);
/// # Ok::<(), flatfill::Error>(())
/// ```
pub struct Flatfill {
    analyze_options: AnalyzeOptions,
    render_options: RenderOptions,
}

impl Flatfill {
    /// Create a new Flatfill builder.
    pub fn new() -> Self {
        Self {
            analyze_options: AnalyzeOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Disable parallel analysis.
    pub fn sequential(mut self) -> Self {
        self.analyze_options = self.analyze_options.sequential();
        self
    }

    /// Restrict analysis to some pages.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.analyze_options = self.analyze_options.with_pages(pages);
        self
    }

    /// Set the shrink-to-fit floor.
    pub fn with_min_font_size(mut self, size: f32) -> Self {
        self.render_options = self.render_options.with_min_font_size(size);
        self
    }

    /// Set the font size for fields that do not specify one.
    pub fn with_default_font_size(mut self, size: f32) -> Self {
        self.render_options = self.render_options.with_default_font_size(size);
        self
    }

    /// Enable or disable overlay stream compression.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.render_options = self.render_options.with_compression(compress);
        self
    }

    /// Analyze a template file.
    pub fn analyze<P: AsRef<Path>>(&self, path: P) -> Result<AnalysisResult> {
        TemplateAnalyzer::with_options(self.analyze_options.clone()).analyze_file(path)
    }

    /// Analyze template bytes.
    pub fn analyze_bytes(&self, data: &[u8]) -> Result<AnalysisResult> {
        TemplateAnalyzer::with_options(self.analyze_options.clone()).analyze_bytes(data)
    }

    /// Fill template bytes.
    pub fn fill<V: ValueSource + ?Sized>(
        &self,
        template: &[u8],
        config: &TemplateConfig,
        values: &V,
    ) -> Result<FillOutput> {
        self.filler().fill(template, config, values)
    }

    /// Build the configured [`Filler`].
    pub fn filler(&self) -> Filler {
        Filler::with_options(FillOptions {
            analyze: self.analyze_options.clone(),
            render: self.render_options.clone(),
        })
    }
}

impl Default for Flatfill {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatfill_builder() {
        let builder = Flatfill::new()
            .sequential()
            .with_min_font_size(6.0)
            .with_compression(false);

        assert!(!builder.analyze_options.parallel);
        assert_eq!(builder.render_options.min_font_size, 6.0);
        assert!(!builder.render_options.compress);
    }

    #[test]
    fn test_flatfill_builder_default() {
        let builder = Flatfill::default();
        assert!(builder.analyze_options.parallel);
        assert_eq!(builder.render_options, RenderOptions::default());
    }

    #[test]
    fn test_flatfill_builder_with_pages() {
        let builder = Flatfill::new().with_pages(PageSelection::Range(1..=5));
        assert!(matches!(
            builder.analyze_options.pages,
            PageSelection::Range(_)
        ));
    }

    #[test]
    fn test_filler_carries_options() {
        let filler = Flatfill::new().with_default_font_size(12.0).filler();
        assert_eq!(filler.options().render.default_font_size, 12.0);
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_analyze_bytes_empty_data() {
        let data: [u8; 0] = [];
        assert!(matches!(analyze_bytes(&data), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_analyze_bytes_unknown_magic() {
        let data = [0xFF, 0xFE, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        assert!(analyze_bytes(&data).is_err());
    }

    #[test]
    fn test_analyze_bytes_truncated() {
        // Valid header, no body
        let result = analyze_bytes(b"%PDF-1.7\n%test");
        assert!(result.is_err());
    }

    #[test]
    fn test_fill_bytes_empty_config() {
        let config = TemplateConfig::default();
        let result = fill_bytes(b"%PDF-1.7", &config, &serde_json::json!({}));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_analyze_file_missing() {
        let result = analyze_file("/nonexistent/form.pdf");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
