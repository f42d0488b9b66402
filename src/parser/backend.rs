//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for PDF operations, isolating
//! the concrete PDF library (lopdf) from region and text extraction.

use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};
use crate::model::PageInfo;

/// Parent chains deeper than this are treated as cyclic.
const MAX_INHERIT_DEPTH: usize = 32;

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    pub fn new(operator: &str, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.to_string(),
            operands,
        }
    }

    /// Operand `i` as a number.
    pub fn number(&self, i: usize) -> Option<f32> {
        self.operands.get(i).and_then(get_number_from_value)
    }

    /// All operands as numbers, or `None` if any is not numeric or fewer
    /// than `n` are present.
    pub fn numbers(&self, n: usize) -> Option<Vec<f32>> {
        if self.operands.len() < n {
            return None;
        }
        self.operands[self.operands.len() - n..]
            .iter()
            .map(get_number_from_value)
            .collect()
    }
}

/// Abstract interface for paged PDF access.
///
/// Pages are addressed by 0-based index. Implementations must be
/// read-only; the same backend can serve analysis and rendering.
pub trait PdfBackend {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Page dimensions; falls back to US Letter when the MediaBox is unusable.
    fn page_info(&self, index: usize) -> Result<PageInfo>;

    /// Decoded content-stream operations of a page.
    fn page_operations(&self, index: usize) -> Result<Vec<ContentOp>>;

    /// Decode a text byte sequence using the font's encoding on the given page.
    /// Falls back to simple decoding if the font or encoding is unavailable.
    fn decode_text(&self, index: usize, font_name: &[u8], bytes: &[u8]) -> String;

    /// The bytes the document was loaded from.
    fn raw_bytes(&self) -> &[u8];
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // Try UTF-16BE first (BOM marker)
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    // Try UTF-8
    if let Ok(s) = String::from_utf8(bytes.to_vec()) {
        return s;
    }

    // Fallback: Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// LopdfBackend: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    page_ids: Vec<ObjectId>,
    bytes: Vec<u8>,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_vec(data)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        Self::from_vec(data.to_vec())
    }

    /// Load from owned bytes.
    pub fn from_vec(data: Vec<u8>) -> Result<Self> {
        detect_format_from_bytes(&data)?;
        let doc = LopdfDocument::load_mem(&data)?;
        let page_ids = doc.get_pages().into_values().collect();
        Ok(Self {
            doc,
            page_ids,
            bytes: data,
        })
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Take the parsed document, e.g. to merge overlays into it.
    pub fn into_document(self) -> LopdfDocument {
        self.doc
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Geometry of every page, in order.
    pub fn pages(&self) -> Vec<PageInfo> {
        (0..self.page_count())
            .map(|i| self.page_info(i).unwrap_or_else(|_| PageInfo::letter(i)))
            .collect()
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or(Error::PageOutOfRange(index as u32 + 1, self.page_ids.len() as u32))
    }

    /// Look up a page attribute, following the `/Parent` chain.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut id = page_id;
        for _ in 0..MAX_INHERIT_DEPTH {
            let dict = self.doc.get_dictionary(id).ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(resolve(&self.doc, value));
            }
            id = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
        }
        None
    }

    fn stream_bytes(&self, obj: &Object, out: &mut Vec<u8>) {
        match resolve(&self.doc, obj) {
            Object::Stream(s) => {
                let data = s.decompressed_content().unwrap_or_else(|_| s.content.clone());
                out.extend_from_slice(&data);
                out.push(b' ');
            }
            Object::Array(arr) => {
                for item in arr {
                    if let Object::Reference(_) | Object::Stream(_) = item {
                        self.stream_bytes(item, out);
                    }
                }
            }
            _ => {}
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_info(&self, index: usize) -> Result<PageInfo> {
        let page_id = self.page_id(index)?;
        let media_box = self
            .inherited(page_id, b"MediaBox")
            .and_then(|obj| rect_from_object(&self.doc, obj));

        Ok(match media_box {
            Some(rect) => {
                let info = PageInfo::from_media_box(index, rect);
                if info.width > 0.0 && info.height > 0.0 {
                    info
                } else {
                    log::warn!("Page {} has an empty MediaBox, assuming Letter", index);
                    PageInfo::letter(index)
                }
            }
            None => PageInfo::letter(index),
        })
    }

    fn page_operations(&self, index: usize) -> Result<Vec<ContentOp>> {
        let page_id = self.page_id(index)?;
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            Err(_) => return Ok(Vec::new()),
        };

        let mut data = Vec::new();
        self.stream_bytes(contents, &mut data);
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let content =
            lopdf::content::Content::decode(&data).map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, index: usize, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(page_id) = self.page_id(index) {
            if let Ok(fonts) = self.doc.get_page_fonts(page_id) {
                if let Some(font_dict) = fonts.get(font_name) {
                    if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                        if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                            return text;
                        }
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }

    fn raw_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Follow a single indirect reference.
fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

fn number_of(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Read a `[llx lly urx ury]` array.
fn rect_from_object(doc: &LopdfDocument, obj: &Object) -> Option<[f32; 4]> {
    let arr = resolve(doc, obj).as_array().ok()?;
    if arr.len() < 4 {
        return None;
    }
    let mut rect = [0.0; 4];
    for (slot, item) in rect.iter_mut().zip(arr) {
        *slot = number_of(resolve(doc, item))?;
    }
    Some(rect)
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

/// Helper: extract a number from a [`PdfValue`].
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}
