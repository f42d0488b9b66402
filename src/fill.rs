//! Analyze-render-merge pipeline for one template.

use std::path::Path;

use crate::analyze::{AnalyzeOptions, TemplateAnalyzer};
use crate::error::Result;
use crate::model::{AnalysisResult, TemplateConfig};
use crate::parser::LopdfBackend;
use crate::render::{FillStep, OverlayRenderer, PageMerger, ProgressEvent, RenderOptions};
use crate::values::{DisplayFormatter, ValueSource};

/// Options for a fill run.
#[derive(Debug, Clone, Default)]
pub struct FillOptions {
    /// Analysis options
    pub analyze: AnalyzeOptions,

    /// Rendering and merge options
    pub render: RenderOptions,
}

impl FillOptions {
    /// Create new fill options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set analysis options.
    pub fn with_analyze_options(mut self, options: AnalyzeOptions) -> Self {
        self.analyze = options;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }
}

/// Result of a fill run.
#[derive(Debug, Clone)]
pub struct FillOutput {
    /// Analysis of the template the fill ran against
    pub analysis: AnalysisResult,

    /// The filled document
    pub document: Vec<u8>,

    /// Pages that received drawn content
    pub pages_filled: usize,
}

impl FillOutput {
    /// Write the filled document to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, &self.document)?;
        Ok(())
    }
}

/// Fills flat templates.
///
/// # Example
///
/// ```no_run
/// use flatfill::{Filler, TemplateConfig};
///
/// let template = std::fs::read("subscription.pdf")?;
/// let config = TemplateConfig::from_file("template_config.json")?;
/// let data = serde_json::json!({"investor": {"legal_name": "Acme Capital LLC"}});
///
/// let output = Filler::new().fill(&template, &config, &data)?;
/// output.save("filled.pdf")?;
/// # Ok::<(), flatfill::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Filler {
    options: FillOptions,
    renderer: OverlayRenderer,
}

impl Filler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FillOptions) -> Self {
        Self {
            renderer: OverlayRenderer::with_options(options.render.clone()),
            options,
        }
    }

    /// Replace the display formatter used for text fields.
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: DisplayFormatter + Send + Sync + 'static,
    {
        self.renderer = self.renderer.with_formatter(formatter);
        self
    }

    pub fn options(&self) -> &FillOptions {
        &self.options
    }

    /// Fill `template` with `values`.
    pub fn fill<V: ValueSource + ?Sized>(
        &self,
        template: &[u8],
        config: &TemplateConfig,
        values: &V,
    ) -> Result<FillOutput> {
        self.fill_with_events(template, config, values, |_| {})
    }

    /// Fill, reporting each pipeline step and every drawn field to `on_event`.
    ///
    /// Configuration errors surface before the template is read.
    pub fn fill_with_events<V, F>(
        &self,
        template: &[u8],
        config: &TemplateConfig,
        values: &V,
        mut on_event: F,
    ) -> Result<FillOutput>
    where
        V: ValueSource + ?Sized,
        F: FnMut(ProgressEvent),
    {
        let fields = config.fields()?;

        on_event(ProgressEvent::new(FillStep::Analyze, 0.0, "Reading template"));
        let backend = LopdfBackend::load_bytes(template)?;
        let analysis = TemplateAnalyzer::with_options(self.options.analyze.clone()).analyze(&backend);
        if let Some(expected) = &config.content_hash {
            if *expected != analysis.content_hash {
                log::warn!(
                    "Template hash {} does not match configured {}",
                    analysis.content_hash,
                    expected
                );
            }
        }
        on_event(ProgressEvent::new(
            FillStep::Analyze,
            100.0,
            format!("{} candidate fields", analysis.candidates.len()),
        ));

        let pages = backend.pages();
        let overlays = self.renderer.render_with_progress(
            fields,
            &pages,
            values,
            &mut |done: usize, total: usize| on_event(ProgressEvent::fields(done, total)),
        )?;

        on_event(ProgressEvent::new(FillStep::Merge, 0.0, "Merging overlays"));
        let mut doc = backend.into_document();
        let pages_filled = PageMerger::with_options(&self.options.render).merge(&mut doc, &overlays)?;
        let mut document = Vec::new();
        doc.save_to(&mut document)?;
        on_event(ProgressEvent::new(
            FillStep::Done,
            100.0,
            format!("Filled {} pages", pages_filled),
        ));

        Ok(FillOutput {
            analysis,
            document,
            pages_filled,
        })
    }
}
