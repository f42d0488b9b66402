//! Compositing overlays onto template pages.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use super::metrics::StandardFont;
use super::options::RenderOptions;
use crate::error::{Error, Result};
use crate::model::OverlayPage;
use crate::parser::LopdfBackend;

const MAX_INHERIT_DEPTH: usize = 32;

/// Draws overlays on top of the original page content.
///
/// The original content streams are kept as they are and bracketed with
/// `q`/`Q` so any graphics state they leave behind cannot leak into the
/// overlay. Pages with an empty overlay are not touched, and no page's
/// boxes are changed.
#[derive(Debug, Clone, Copy)]
pub struct PageMerger {
    compress: bool,
}

impl Default for PageMerger {
    fn default() -> Self {
        Self { compress: true }
    }
}

impl PageMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: &RenderOptions) -> Self {
        Self {
            compress: options.compress,
        }
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Merge overlays into template bytes and serialize the result.
    pub fn merge_bytes(&self, template: &[u8], overlays: &[OverlayPage]) -> Result<Vec<u8>> {
        let mut doc = LopdfBackend::load_bytes(template)?.into_document();
        self.merge(&mut doc, overlays)?;
        let mut out = Vec::new();
        doc.save_to(&mut out)?;
        Ok(out)
    }

    /// Merge overlays into an open document.
    ///
    /// `overlays` must hold one entry per page, in page order. Returns the
    /// number of pages that received content.
    pub fn merge(&self, doc: &mut Document, overlays: &[OverlayPage]) -> Result<usize> {
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if overlays.len() != page_ids.len() {
            return Err(Error::Render(format!(
                "{} overlays for a {}-page document",
                overlays.len(),
                page_ids.len()
            )));
        }
        if overlays.iter().all(OverlayPage::is_empty) {
            return Ok(0);
        }

        let fonts = add_fonts(doc);
        let mut merged = 0;
        for (page_id, overlay) in page_ids.into_iter().zip(overlays) {
            let content = match overlay.content_bytes() {
                Some(content) => content,
                None => continue,
            };
            self.merge_page(doc, page_id, content, &fonts)?;
            merged += 1;
        }
        log::debug!("Merged overlays into {} pages", merged);
        Ok(merged)
    }

    fn merge_page(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        content: &[u8],
        fonts: &[(StandardFont, ObjectId)],
    ) -> Result<()> {
        let original = doc
            .get_dictionary(page_id)?
            .get(b"Contents")
            .ok()
            .cloned();
        let original: Vec<Object> = match original {
            Some(Object::Array(items)) => items,
            Some(Object::Reference(id)) => match doc.get_object(id) {
                // An indirect array of streams
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(id)],
            },
            Some(other) => vec![other],
            None => Vec::new(),
        };

        let mut resources = inherited_dict(doc, page_id, b"Resources").unwrap_or_default();
        let mut font_dict = resources
            .get(b"Font")
            .ok()
            .and_then(|obj| dict_of(doc, obj))
            .unwrap_or_default();
        for (font, id) in fonts {
            font_dict.set(font.resource_name(), Object::Reference(*id));
        }
        resources.set("Font", Object::Dictionary(font_dict));

        let save_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
        let restore_id = doc.add_object(Stream::new(dictionary! {}, b"\nQ\n".to_vec()));
        let overlay_id = doc.add_object(self.overlay_stream(content)?);

        let mut contents = Vec::with_capacity(original.len() + 3);
        contents.push(Object::Reference(save_id));
        contents.extend(original);
        contents.push(Object::Reference(restore_id));
        contents.push(Object::Reference(overlay_id));

        let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
        page.set("Contents", Object::Array(contents));
        page.set("Resources", Object::Dictionary(resources));
        Ok(())
    }

    fn overlay_stream(&self, content: &[u8]) -> Result<Stream> {
        if !self.compress {
            return Ok(Stream::new(dictionary! {}, content.to_vec()));
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content)?;
        let compressed = encoder.finish()?;
        Ok(Stream::new(
            dictionary! { "Filter" => "FlateDecode" },
            compressed,
        ))
    }
}

/// Add the overlay font dictionaries once per document.
fn add_fonts(doc: &mut Document) -> Vec<(StandardFont, ObjectId)> {
    StandardFont::ALL
        .iter()
        .map(|font| {
            let id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            (*font, id)
        })
        .collect()
}

/// A dictionary given inline or by reference, copied out.
fn dict_of(doc: &Document, obj: &Object) -> Option<Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict.clone()),
        Object::Reference(id) => doc.get_dictionary(*id).ok().cloned(),
        _ => None,
    }
}

/// A page dictionary entry, inherited through `/Parent` when absent.
fn inherited_dict(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Dictionary> {
    let mut id = page_id;
    for _ in 0..MAX_INHERIT_DEPTH {
        let node = doc.get_dictionary(id).ok()?;
        if let Ok(value) = node.get(key) {
            return dict_of(doc, value);
        }
        id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}
