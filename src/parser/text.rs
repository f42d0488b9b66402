//! Text extraction and block grouping.
//!
//! Spans are positioned by interpreting the text operators of a page's
//! content stream, then grouped into lines by baseline and into blocks by
//! spacing, font size and left alignment. Labels on forms are short and
//! often share a baseline with other labels, so a line is also split at
//! wide horizontal gaps before block grouping.

use unicode_normalization::UnicodeNormalization;

use super::backend::{get_number_from_value, ContentOp, PdfBackend, PdfValue};
use super::graphics::Matrix;
use crate::model::{BBox, PageInfo, TextBlock};
use crate::render::metrics::StandardFont;

/// TJ adjustments beyond this (in 1/1000 em) read as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Fallback leading when `TL` was never set.
const DEFAULT_LEADING: f32 = 12.0;

/// A line splits where the gap exceeds this many font sizes.
const SEGMENT_GAP_FACTOR: f32 = 2.0;

/// Lines further apart than this many font sizes never share a block.
const MAX_LEADING_FACTOR: f32 = 2.0;

/// A text span with position information, in PDF user space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Width of the text
    pub width: f32,
    /// Effective font size in points
    pub font_size: f32,
}

impl TextSpan {
    /// Create a span, measuring its width with Helvetica metrics.
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32) -> Self {
        let text = text.into();
        let width = StandardFont::Helvetica.string_width(&text, font_size);
        Self {
            text,
            x,
            y,
            width,
            font_size,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the bottom Y coordinate (approximate, based on font size).
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2 // Approximate descender
    }

    /// Get the top Y coordinate (approximate, based on font size).
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8 // Approximate ascender
    }
}

/// Spans sharing a baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline)
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
    /// Dominant font size in this line
    pub font_size: f32,
}

impl TextLine {
    /// Create a new text line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        if spans.is_empty() {
            return Self {
                spans: vec![],
                y: 0.0,
                x: 0.0,
                font_size: 0.0,
            };
        }

        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

        // Dominant font size, weighted by text length
        let total_chars: usize = spans.iter().map(|s| s.text.len()).sum();
        let weighted_size: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.len() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted_size / total_chars as f32
        } else {
            spans[0].font_size
        };

        let y = spans[0].y;
        let x = spans[0].x;

        Self {
            spans,
            y,
            x,
            font_size,
        }
    }

    /// Get the combined text of all spans with appropriate spacing.
    ///
    /// Inserts spaces between spans based on their X coordinate gaps.
    /// For CJK characters, no space is inserted between adjacent characters.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i == 0 {
                result.push_str(&span.text);
                continue;
            }

            let prev_span = &self.spans[i - 1];
            let gap = span.x - prev_span.right();

            let char_count = span.text.chars().count();
            let avg_char_width = if char_count > 0 && span.width > 0.0 {
                span.width / char_count as f32
            } else {
                span.font_size * 0.5
            };

            let should_insert_space = gap > avg_char_width * 0.2 && {
                let prev_is_cjk = prev_span
                    .text
                    .chars()
                    .last()
                    .map(is_spaceless_script_char)
                    .unwrap_or(false);
                let curr_is_cjk = span
                    .text
                    .chars()
                    .next()
                    .map(is_spaceless_script_char)
                    .unwrap_or(false);
                !(prev_is_cjk && curr_is_cjk)
            };

            let prev_ends_with_space =
                prev_span.text.ends_with(' ') || prev_span.text.ends_with('\u{00A0}');
            let curr_starts_with_space =
                span.text.starts_with(' ') || span.text.starts_with('\u{00A0}');

            if should_insert_space && !prev_ends_with_space && !curr_starts_with_space {
                result.push(' ');
            }

            result.push_str(&span.text);
        }

        result
    }

    /// Split where consecutive spans are far apart horizontally.
    fn into_segments(self) -> Vec<TextLine> {
        let limit = self.font_size * SEGMENT_GAP_FACTOR;
        let mut segments = Vec::new();
        let mut current: Vec<TextSpan> = Vec::new();

        for span in self.spans {
            if let Some(prev) = current.last() {
                if span.x - prev.right() > limit {
                    segments.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
            }
            current.push(span);
        }
        if !current.is_empty() {
            segments.push(TextLine::from_spans(current));
        }
        segments
    }
}

#[derive(Debug, Clone, Copy)]
struct TextState {
    ctm: Matrix,
    font_size: f32,
    leading: f32,
    char_spacing: f32,
    word_spacing: f32,
    /// `Tz` as a fraction
    horizontal_scaling: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: Matrix::identity(),
            font_size: 12.0,
            leading: DEFAULT_LEADING,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
        }
    }
}

/// Content-stream interpreter for text-showing operators.
pub struct SpanExtractor<'a, B: PdfBackend + ?Sized> {
    backend: &'a B,
    page: usize,
    state: TextState,
    stack: Vec<TextState>,
    font_name: Vec<u8>,
    tm: Matrix,
    tlm: Matrix,
    in_text: bool,
    spans: Vec<TextSpan>,
}

impl<'a, B: PdfBackend + ?Sized> SpanExtractor<'a, B> {
    pub fn new(backend: &'a B, page: usize) -> Self {
        Self {
            backend,
            page,
            state: TextState::default(),
            stack: Vec::new(),
            font_name: Vec::new(),
            tm: Matrix::identity(),
            tlm: Matrix::identity(),
            in_text: false,
            spans: Vec::new(),
        }
    }

    /// Interpret `ops` and return visible spans in user space.
    pub fn run(mut self, ops: &[ContentOp]) -> Vec<TextSpan> {
        for op in ops {
            self.step(op);
        }
        self.spans
    }

    fn step(&mut self, op: &ContentOp) {
        match op.operator.as_str() {
            // The font survives q/Q along with the rest of the text state.
            "q" => self.stack.push(self.state),
            "Q" => {
                if let Some(state) = self.stack.pop() {
                    self.state = state;
                }
            }
            "cm" => {
                if let Some(m) = op.numbers(6).as_deref().and_then(Matrix::from_slice) {
                    self.state.ctm = m.multiply(&self.state.ctm);
                }
            }
            "BT" => {
                self.in_text = true;
                self.tm = Matrix::identity();
                self.tlm = Matrix::identity();
            }
            "ET" => self.in_text = false,
            "Tf" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    self.font_name = name.clone();
                }
                if let Some(size) = op.number(1) {
                    self.state.font_size = size;
                }
            }
            "TL" => {
                if let Some(l) = op.number(0) {
                    self.state.leading = l;
                }
            }
            "Tc" => {
                if let Some(v) = op.number(0) {
                    self.state.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = op.number(0) {
                    self.state.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = op.number(0) {
                    self.state.horizontal_scaling = v / 100.0;
                }
            }
            "Td" => {
                if let Some(v) = op.numbers(2) {
                    self.move_line(v[0], v[1]);
                }
            }
            "TD" => {
                if let Some(v) = op.numbers(2) {
                    self.state.leading = -v[1];
                    self.move_line(v[0], v[1]);
                }
            }
            "Tm" => {
                if let Some(m) = op.numbers(6).as_deref().and_then(Matrix::from_slice) {
                    self.tm = m;
                    self.tlm = m;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    self.show(&[PdfValue::Str(bytes.clone())]);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    self.show(items);
                }
            }
            "'" => {
                self.next_line();
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    self.show(&[PdfValue::Str(bytes.clone())]);
                }
            }
            "\"" => {
                if let (Some(tw), Some(tc)) = (op.number(0), op.number(1)) {
                    self.state.word_spacing = tw;
                    self.state.char_spacing = tc;
                }
                self.next_line();
                if let Some(PdfValue::Str(bytes)) = op.operands.get(2) {
                    self.show(&[PdfValue::Str(bytes.clone())]);
                }
            }
            _ => {}
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translate(tx, ty).multiply(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        let leading = self.state.leading;
        self.move_line(0.0, -leading);
    }

    /// Show strings and TJ adjustments as one span.
    fn show(&mut self, items: &[PdfValue]) {
        if !self.in_text {
            return;
        }

        let trm = self.tm.multiply(&self.state.ctm);
        let (x, y) = trm.apply(0.0, 0.0);
        let size = self.state.font_size;
        let th = self.state.horizontal_scaling;

        let mut text = String::new();
        let mut advance = 0.0;

        for item in items {
            match item {
                PdfValue::Str(bytes) => {
                    let decoded = self.backend.decode_text(self.page, &self.font_name, bytes);
                    let chars = decoded.chars().count() as f32;
                    let spaces = decoded.chars().filter(|c| *c == ' ').count() as f32;
                    advance += (StandardFont::Helvetica.string_width(&decoded, size)
                        + self.state.char_spacing * chars
                        + self.state.word_spacing * spaces)
                        * th;
                    text.push_str(&decoded);
                }
                other => {
                    let Some(n) = get_number_from_value(other) else {
                        continue;
                    };
                    advance -= n / 1000.0 * size * th;
                    if -n > TJ_SPACE_THRESHOLD
                        && !text.is_empty()
                        && !text.ends_with(' ')
                        && !text.ends_with('\u{00A0}')
                        && !text.chars().last().map(is_spaceless_script_char).unwrap_or(false)
                    {
                        text.push(' ');
                    }
                }
            }
        }

        self.tm = Matrix::translate(advance, 0.0).multiply(&self.tm);

        if text.trim().is_empty() {
            return;
        }

        let effective_size = size * trm.vertical_scale();
        let width = advance * trm.horizontal_scale();
        self.spans.push(TextSpan {
            text,
            x,
            y,
            width: width.max(0.0),
            font_size: effective_size,
        });
    }
}

/// Visible text spans of a page, in content-stream order.
pub fn extract_spans<B: PdfBackend + ?Sized>(
    backend: &B,
    page: usize,
    ops: &[ContentOp],
) -> Vec<TextSpan> {
    SpanExtractor::new(backend, page).run(ops)
}

/// Group spans into lines by baseline proximity.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    if spans.is_empty() {
        return vec![];
    }

    // Sort spans by Y (descending, since PDF Y is bottom-up) then X
    spans.sort_by(|a, b| {
        let y_cmp = b.y.partial_cmp(&a.y).unwrap_or(std::cmp::Ordering::Equal);
        if y_cmp == std::cmp::Ordering::Equal {
            a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal)
        } else {
            y_cmp
        }
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current_line_spans: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3; // Allow 30% of font size variance

        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => current_line_spans.push(span),
            _ => {
                if !current_line_spans.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(
                        &mut current_line_spans,
                    )));
                }
                current_y = Some(span.y);
                current_line_spans.push(span);
            }
        }
    }

    if !current_line_spans.is_empty() {
        lines.push(TextLine::from_spans(current_line_spans));
    }

    lines
}

/// Calculate average line spacing.
fn calculate_avg_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1) // Filter out very small spacings
        .collect();

    if spacings.is_empty() {
        return DEFAULT_LEADING;
    }

    spacings.iter().sum::<f32>() / spacings.len() as f32
}

/// Whether `next` continues the block ending in `prev`.
fn continues_block(prev: &TextLine, next: &TextLine, avg_spacing: f32) -> bool {
    let spacing = (prev.y - next.y).abs();
    spacing > 0.1
        && spacing <= avg_spacing * 1.5
        && spacing <= prev.font_size.max(next.font_size) * MAX_LEADING_FACTOR
        && (prev.font_size - next.font_size).abs() <= 1.0
        && (prev.x - next.x).abs() <= 20.0
}

/// Group spans into text blocks in page space, in reading order.
pub fn group_blocks(spans: Vec<TextSpan>, page: &PageInfo) -> Vec<TextBlock> {
    let lines = group_spans_into_lines(spans);
    let avg_spacing = calculate_avg_line_spacing(&lines);

    let mut finished: Vec<Vec<TextLine>> = Vec::new();
    let mut open: Vec<Vec<TextLine>> = Vec::new();

    for line in lines {
        let mut next_open: Vec<Vec<TextLine>> = Vec::new();
        for segment in line.into_segments() {
            let target = open.iter().position(|block| {
                block
                    .last()
                    .map(|prev| continues_block(prev, &segment, avg_spacing))
                    .unwrap_or(false)
            });
            match target {
                Some(i) => {
                    let mut block = open.remove(i);
                    block.push(segment);
                    next_open.push(block);
                }
                None => next_open.push(vec![segment]),
            }
        }
        finished.append(&mut open);
        open = next_open;
    }
    finished.append(&mut open);

    let mut blocks: Vec<TextBlock> = finished
        .into_iter()
        .filter_map(|segments| build_block(&segments, page))
        .collect();

    blocks.sort_by(|a, b| {
        a.bbox
            .y0
            .partial_cmp(&b.bbox.y0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                a.bbox
                    .x0
                    .partial_cmp(&b.bbox.x0)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });
    blocks
}

fn build_block(segments: &[TextLine], page: &PageInfo) -> Option<TextBlock> {
    let raw = segments
        .iter()
        .map(TextLine::text)
        .collect::<Vec<_>>()
        .join(" ");
    let text = normalize_block_text(&raw);
    if text.is_empty() {
        return None;
    }

    let spans = segments.iter().flat_map(|s| s.spans.iter());
    let (mut left, mut right) = (f32::MAX, f32::MIN);
    let (mut top, mut bottom) = (f32::MIN, f32::MAX);
    for span in spans {
        left = left.min(span.x);
        right = right.max(span.right());
        top = top.max(span.top());
        bottom = bottom.min(span.bottom());
    }

    let (x0, y0) = page.to_page_space(left, top);
    let (x1, y1) = page.to_page_space(right, bottom);
    Some(TextBlock::new(
        page.index,
        BBox::new(x0, y0, x1, y1).rounded(),
        text,
    ))
}

/// Collapse line breaks to spaces, trim, and NFC-normalize.
pub fn normalize_block_text(raw: &str) -> String {
    raw.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .nfc()
        .collect()
}

/// Groups page text into positioned blocks.
pub struct TextBlockExtractor;

impl TextBlockExtractor {
    /// Text blocks of one page; unreadable text yields none.
    pub fn extract<B: PdfBackend + ?Sized>(backend: &B, page: &PageInfo) -> Vec<TextBlock> {
        match backend.page_operations(page.index) {
            Ok(ops) => Self::from_operations(backend, &ops, page),
            Err(e) => {
                log::warn!("Page {}: text unreadable: {}", page.index, e);
                Vec::new()
            }
        }
    }

    /// Blocks from already-decoded content operations.
    pub fn from_operations<B: PdfBackend + ?Sized>(
        backend: &B,
        ops: &[ContentOp],
        page: &PageInfo,
    ) -> Vec<TextBlock> {
        group_blocks(extract_spans(backend, page.index, ops), page)
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // CJK Unified Ideographs Extension B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana and Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}
