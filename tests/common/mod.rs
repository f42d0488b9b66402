//! In-memory template builders shared by the integration tests.

#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, Stream};

/// Builds a small PDF with one Helvetica font resource (`/F1`).
pub struct FormBuilder {
    pages: Vec<(String, [i64; 4])>,
}

impl FormBuilder {
    pub fn new() -> Self {
        Self { pages: Vec::new() }
    }

    /// Add a Letter page with raw content-stream text.
    pub fn page(self, content: &str) -> Self {
        self.page_with_media_box(content, [0, 0, 612, 792])
    }

    pub fn page_with_media_box(mut self, content: &str, media_box: [i64; 4]) -> Self {
        self.pages.push((content.to_string(), media_box));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for (content, media_box) in &self.pages {
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => media_box.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }
}

/// A stroked rectangle given in top-left page space on a Letter page.
pub fn boxed(x0: f32, y0: f32, x1: f32, y1: f32) -> String {
    format!(
        "1 w {} {} {} {} re S\n",
        x0,
        792.0 - y1,
        x1 - x0,
        y1 - y0
    )
}

/// A text label whose baseline sits at top-left `y`.
pub fn label(text: &str, x: f32, y: f32) -> String {
    format!("BT /F1 10 Tf {} {} Td ({}) Tj ET\n", x, 792.0 - y, text)
}

/// Subscription-style first page: a name line, a checkbox and a notes box.
pub fn subscription_page() -> String {
    let mut content = String::new();
    content.push_str(&label("Legal Name:", 72.0, 112.0));
    content.push_str(&boxed(150.0, 100.0, 450.0, 118.0));
    content.push_str(&label("Accredited", 72.0, 208.0));
    content.push_str(&boxed(150.0, 200.0, 160.0, 210.0));
    content.push_str(&label("Notes", 72.0, 300.0));
    content.push_str(&boxed(72.0, 310.0, 152.0, 510.0));
    content
}

/// Decoded content of a 1-based page.
pub fn page_content(pdf: &[u8], page_number: u32) -> String {
    let doc = Document::load_mem(pdf).unwrap();
    let page_id = doc.get_pages()[&page_number];
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).to_string()
}
