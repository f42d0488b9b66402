//! Content-stream builder for one overlay page.

use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};

use super::layout::Placement;
use super::metrics::encode_win_ansi;
use crate::error::{Error, Result};
use crate::model::{OverlayContent, OverlayPage, PageInfo};

/// Collects text drawing for a page and encodes it as a content stream.
///
/// Output is wrapped in `q`/`Q` and, for pages whose MediaBox does not
/// start at the origin, translated so placements stay page-relative.
#[derive(Debug)]
pub struct OverlayCanvas {
    page: PageInfo,
    operations: Vec<Operation>,
}

impl OverlayCanvas {
    pub fn new(page: PageInfo) -> Self {
        Self {
            page,
            operations: Vec::new(),
        }
    }

    /// Draw every run of a placement in black.
    pub fn draw(&mut self, placement: &Placement) {
        for run in &placement.runs {
            self.operations.push(Operation::new("BT", vec![]));
            self.operations.push(Operation::new(
                "Tf",
                vec![
                    Object::Name(placement.font.resource_name().as_bytes().to_vec()),
                    Object::Real(placement.font_size),
                ],
            ));
            self.operations.push(Operation::new(
                "rg",
                vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
            ));
            self.operations.push(Operation::new(
                "Td",
                vec![Object::Real(run.x), Object::Real(run.y)],
            ));
            self.operations.push(Operation::new(
                "Tj",
                vec![Object::String(
                    encode_win_ansi(&run.text),
                    StringFormat::Literal,
                )],
            ));
            self.operations.push(Operation::new("ET", vec![]));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Encode the page; an untouched canvas yields an empty overlay.
    pub fn finish(self) -> Result<OverlayPage> {
        let page = self.page;
        if self.operations.is_empty() {
            return Ok(OverlayPage::empty(page.index, page.width, page.height));
        }

        let mut operations = Vec::with_capacity(self.operations.len() + 3);
        operations.push(Operation::new("q", vec![]));
        if page.has_offset_origin() {
            operations.push(Operation::new(
                "cm",
                vec![
                    Object::Integer(1),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(1),
                    Object::Real(page.origin_x),
                    Object::Real(page.origin_y),
                ],
            ));
        }
        operations.extend(self.operations);
        operations.push(Operation::new("Q", vec![]));

        let bytes = Content { operations }
            .encode()
            .map_err(|e| Error::Render(format!("page {}: {}", page.index, e)))?;

        Ok(OverlayPage {
            page: page.index,
            width: page.width,
            height: page.height,
            content: OverlayContent::Rendered(bytes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;
    use crate::render::layout::place_checkbox;

    fn decoded(page: &OverlayPage) -> Vec<String> {
        let bytes = page.content_bytes().unwrap();
        Content::decode(bytes)
            .unwrap()
            .operations
            .into_iter()
            .map(|op| op.operator)
            .collect()
    }

    #[test]
    fn test_empty_canvas() {
        let canvas = OverlayCanvas::new(PageInfo::letter(2));
        assert!(canvas.is_empty());
        let page = canvas.finish().unwrap();
        assert!(page.is_empty());
        assert_eq!(page.page, 2);
    }

    #[test]
    fn test_draw_checkbox() {
        let mut canvas = OverlayCanvas::new(PageInfo::letter(0));
        canvas.draw(&place_checkbox(&BBox::new(10.0, 10.0, 20.0, 20.0), 792.0));
        let page = canvas.finish().unwrap();
        assert_eq!(
            decoded(&page),
            vec!["q", "BT", "Tf", "rg", "Td", "Tj", "ET", "Q"]
        );
        let text = String::from_utf8_lossy(page.content_bytes().unwrap()).to_string();
        assert!(text.contains("/FfHelvB"));
        assert!(text.contains("(X)"));
    }

    #[test]
    fn test_offset_origin_translates() {
        let mut page = PageInfo::letter(0);
        page.origin_x = 10.0;
        page.origin_y = 20.0;
        let mut canvas = OverlayCanvas::new(page);
        canvas.draw(&place_checkbox(&BBox::new(10.0, 10.0, 20.0, 20.0), 792.0));
        let ops = decoded(&canvas.finish().unwrap());
        assert_eq!(ops[0], "q");
        assert_eq!(ops[1], "cm");
    }
}
