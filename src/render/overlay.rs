//! Overlay rendering: field values drawn into page-sized content streams.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::canvas::OverlayCanvas;
use super::layout::{place_checkbox, place_multiline, place_text, Placement};
use super::options::RenderOptions;
use super::progress::ProgressObserver;
use crate::error::{Error, Result};
use crate::model::{BBox, FieldDefinition, FieldKind, OverlayPage, PageInfo, TemplateConfig};
use crate::values::{format_date, is_checked, DefaultFormatter, DisplayFormatter, ValueSource};

/// A field that will be drawn (or left blank) on a page.
struct BoundField<'a> {
    field: &'a FieldDefinition,
    path: &'a str,
    bbox: BBox,
}

/// Draws field values onto blank overlays, one per template page.
///
/// Overlays come back in page order with exactly one entry per page,
/// ready for [`PageMerger`](super::PageMerger). Pages without anything to
/// draw get an empty overlay.
#[derive(Clone)]
pub struct OverlayRenderer {
    options: RenderOptions,
    formatter: Arc<dyn DisplayFormatter + Send + Sync>,
}

impl fmt::Debug for OverlayRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayRenderer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::with_options(RenderOptions::default())
    }
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RenderOptions) -> Self {
        Self {
            options,
            formatter: Arc::new(DefaultFormatter::new()),
        }
    }

    /// Replace the display formatter.
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: DisplayFormatter + Send + Sync + 'static,
    {
        self.formatter = Arc::new(formatter);
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render every field of a template configuration.
    pub fn render_config<V: ValueSource + ?Sized>(
        &self,
        config: &TemplateConfig,
        pages: &[PageInfo],
        values: &V,
    ) -> Result<Vec<OverlayPage>> {
        self.render(config.fields()?, pages, values)
    }

    /// Render without progress reporting.
    pub fn render<V: ValueSource + ?Sized>(
        &self,
        fields: &[FieldDefinition],
        pages: &[PageInfo],
        values: &V,
    ) -> Result<Vec<OverlayPage>> {
        self.render_with_progress(fields, pages, values, &mut |_: usize, _: usize| {})
    }

    /// Render, reporting `(done, total)` after each bound field.
    ///
    /// `total` counts fields that have a data path, a usable bbox and a
    /// page inside the document; fields whose value is missing still count
    /// once they have been visited. An empty field list is a configuration
    /// error raised before anything is drawn.
    pub fn render_with_progress<V, O>(
        &self,
        fields: &[FieldDefinition],
        pages: &[PageInfo],
        values: &V,
        observer: &mut O,
    ) -> Result<Vec<OverlayPage>>
    where
        V: ValueSource + ?Sized,
        O: ProgressObserver + ?Sized,
    {
        if fields.is_empty() {
            return Err(Error::Configuration(
                "template has no field definitions; add fields with the template builder"
                    .to_string(),
            ));
        }

        let by_page = group_by_page(fields, pages.len());
        let total: usize = by_page.values().map(Vec::len).sum();
        log::debug!(
            "Rendering {} of {} fields across {} pages",
            total,
            fields.len(),
            pages.len()
        );

        let mut done = 0;
        let mut overlays = Vec::with_capacity(pages.len());
        for page in pages {
            let mut canvas = OverlayCanvas::new(*page);
            for bound in by_page.get(&page.index).into_iter().flatten() {
                if let Some(placement) = self.place(bound, page, values) {
                    canvas.draw(&placement);
                }
                done += 1;
                observer.on_progress(done, total);
            }
            overlays.push(canvas.finish()?);
        }
        Ok(overlays)
    }

    fn place<V: ValueSource + ?Sized>(
        &self,
        bound: &BoundField<'_>,
        page: &PageInfo,
        values: &V,
    ) -> Option<Placement> {
        let value = values.resolve(bound.path);
        let field = bound.field;

        if field.kind == FieldKind::Checkbox {
            return is_checked(field, value.as_ref())
                .then(|| place_checkbox(&bound.bbox, page.height));
        }

        let value = match value {
            Some(v) => v,
            None => {
                log::debug!("No value for {}, leaving blank", bound.path);
                return None;
            }
        };

        let mut text = self.formatter.format(&value, bound.path);
        if field.kind == FieldKind::Date {
            if let Some(date) = format_date(&text) {
                text = date;
            }
        }

        let size = field
            .font_size
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(self.options.default_font_size);

        match field.kind {
            FieldKind::Multiline => {
                place_multiline(&text, &bound.bbox, page.height, size, &self.options)
            }
            _ => place_text(&text, &bound.bbox, page.height, size, &self.options),
        }
    }
}

/// Drawable fields per page index, in configuration order.
fn group_by_page(fields: &[FieldDefinition], page_count: usize) -> BTreeMap<usize, Vec<BoundField<'_>>> {
    let mut by_page: BTreeMap<usize, Vec<BoundField<'_>>> = BTreeMap::new();

    for field in fields {
        let path = match field.binding() {
            Some(path) => path,
            None => continue,
        };
        let bbox = match field.bbox() {
            Some(bbox) => bbox,
            None => {
                let err = Error::MalformedField(format!(
                    "{}: bbox needs 4 numbers, got {}",
                    path,
                    field.bbox.len()
                ));
                log::warn!("Skipping field: {}", err);
                continue;
            }
        };
        if field.page >= page_count {
            log::warn!(
                "Skipping field {}: page {} is outside the document ({} pages)",
                path,
                field.page,
                page_count
            );
            continue;
        }
        by_page
            .entry(field.page)
            .or_default()
            .push(BoundField { field, path, bbox });
    }
    by_page
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Content;
    use serde_json::{json, Value};

    fn letter_pages(n: usize) -> Vec<PageInfo> {
        (0..n).map(PageInfo::letter).collect()
    }

    fn operators(page: &OverlayPage) -> Vec<String> {
        Content::decode(page.content_bytes().unwrap())
            .unwrap()
            .operations
            .into_iter()
            .map(|op| op.operator)
            .collect()
    }

    fn content_text(page: &OverlayPage) -> String {
        String::from_utf8_lossy(page.content_bytes().unwrap()).to_string()
    }

    #[test]
    fn test_empty_fields_is_configuration_error() {
        let mut calls = 0;
        let result = OverlayRenderer::new().render_with_progress(
            &[],
            &letter_pages(1),
            &json!({}),
            &mut |_: usize, _: usize| calls += 1,
        );
        assert!(matches!(result, Err(Error::Configuration(_))));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_one_overlay_per_page() {
        let fields = vec![FieldDefinition::text(
            1,
            BBox::new(100.0, 700.0, 300.0, 720.0),
            "borrower.name",
        )];
        let data = json!({"borrower": {"name": "Acme Capital LLC"}});
        let overlays = OverlayRenderer::new()
            .render(&fields, &letter_pages(3), &data)
            .unwrap();

        assert_eq!(overlays.len(), 3);
        assert!(overlays[0].is_empty());
        assert!(!overlays[1].is_empty());
        assert!(overlays[2].is_empty());
        assert_eq!(overlays[1].page, 1);
        assert!(content_text(&overlays[1]).contains("(Acme Capital LLC)"));
    }

    #[test]
    fn test_skips_unbound_malformed_and_missing() {
        let mut malformed = FieldDefinition::text(0, BBox::new(0.0, 0.0, 10.0, 10.0), "a");
        malformed.bbox = vec![1.0, 2.0, 3.0];
        let mut unbound = FieldDefinition::text(0, BBox::new(0.0, 0.0, 10.0, 10.0), "b");
        unbound.schema_path = Some("  ".to_string());
        let fields = vec![
            malformed,
            unbound,
            FieldDefinition::text(0, BBox::new(10.0, 10.0, 200.0, 30.0), "missing.path"),
            FieldDefinition::text(5, BBox::new(10.0, 10.0, 200.0, 30.0), "a"),
        ];

        let mut progress = Vec::new();
        let overlays = OverlayRenderer::new()
            .render_with_progress(
                &fields,
                &letter_pages(1),
                &json!({"a": "x", "b": "y"}),
                &mut |done: usize, total: usize| progress.push((done, total)),
            )
            .unwrap();

        assert_eq!(overlays.len(), 1);
        assert!(overlays[0].is_empty());
        assert_eq!(progress, vec![(1, 1)]);
    }

    #[test]
    fn test_progress_is_page_then_field_order() {
        let fields = vec![
            FieldDefinition::text(1, BBox::new(10.0, 10.0, 200.0, 30.0), "c"),
            FieldDefinition::text(0, BBox::new(10.0, 10.0, 200.0, 30.0), "a"),
            FieldDefinition::text(0, BBox::new(10.0, 40.0, 200.0, 60.0), "b"),
        ];
        let data = json!({"a": "1", "b": "2", "c": "3"});
        let mut drawn = Vec::new();
        let mut progress = Vec::new();

        let overlays = OverlayRenderer::new()
            .with_formatter(|v: &Value, path: &str| format!("{}={}", path, v.as_str().unwrap_or("")))
            .render_with_progress(&fields, &letter_pages(2), &data, &mut |done: usize, total: usize| {
                progress.push((done, total))
            })
            .unwrap();
        for overlay in &overlays {
            drawn.push(content_text(overlay));
        }

        assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
        let a = drawn[0].find("(a=1)").unwrap();
        let b = drawn[0].find("(b=2)").unwrap();
        assert!(a < b);
        assert!(drawn[1].contains("(c=3)"));
    }

    #[test]
    fn test_checkbox_drawn_only_when_checked() {
        let bbox = BBox::new(100.0, 100.0, 110.0, 110.0);
        let fields = vec![
            FieldDefinition::new(FieldKind::Checkbox, 0, bbox, "accredited")
                .with_checked_when_equals("Yes"),
        ];
        let renderer = OverlayRenderer::new();

        let checked = renderer
            .render(&fields, &letter_pages(1), &json!({"accredited": "Yes"}))
            .unwrap();
        assert_eq!(
            operators(&checked[0]),
            vec!["q", "BT", "Tf", "rg", "Td", "Tj", "ET", "Q"]
        );

        let unchecked = renderer
            .render(&fields, &letter_pages(1), &json!({"accredited": "yes"}))
            .unwrap();
        assert!(unchecked[0].is_empty());
    }

    #[test]
    fn test_date_kind_normalized() {
        let fields = vec![FieldDefinition::new(
            FieldKind::Date,
            0,
            BBox::new(10.0, 10.0, 200.0, 30.0),
            "signatures[0].signed_on",
        )];
        let data = json!({"signatures": [{"signed_on": "2024-01-31"}]});
        let overlays = OverlayRenderer::new()
            .render(&fields, &letter_pages(1), &data)
            .unwrap();
        assert!(content_text(&overlays[0]).contains("(01/31/2024)"));
    }

    #[test]
    fn test_multiline_wraps_into_several_runs() {
        let text = vec!["word"; 40].join(" ");
        let fields = vec![FieldDefinition::new(
            FieldKind::Multiline,
            0,
            BBox::new(50.0, 50.0, 250.0, 110.0),
            "notes",
        )];
        let overlays = OverlayRenderer::new()
            .render(&fields, &letter_pages(1), &json!({ "notes": text }))
            .unwrap();
        let ops = operators(&overlays[0]);
        assert!(ops.iter().filter(|op| *op == "Tj").count() > 1);
    }

    #[test]
    fn test_render_config_requires_fields() {
        let config = TemplateConfig::default();
        let result = OverlayRenderer::new().render_config(&config, &letter_pages(1), &json!({}));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
