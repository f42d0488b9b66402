//! Text placement inside field boxes.
//!
//! Boxes arrive in top-left-origin page space; every placement here is in
//! bottom-left-origin PDF space relative to the page origin, so a box's
//! bottom edge sits at `page_height - bbox.y1`.

use super::metrics::StandardFont;
use super::options::RenderOptions;
use crate::model::BBox;

/// Largest start size the shrink loops consider.
pub const MAX_FONT_SIZE: f32 = 1000.0;

/// One string drawn at a baseline position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// Everything needed to draw one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub font: StandardFont,
    pub font_size: f32,
    pub runs: Vec<PlacedRun>,
}

/// Largest whole-point step below `start` that is at most `cap`.
///
/// `start` is returned unchanged when it is already within `cap`. When
/// `start` is too large for whole-point steps to be exact in `f32`, `cap`
/// itself is returned.
fn step_down_to(start: f32, cap: f32) -> f32 {
    if start <= cap {
        return start;
    }
    let stepped = start - (start - cap).ceil();
    if stepped <= cap && stepped > cap - 1.0 {
        stepped
    } else {
        cap
    }
}

/// Largest whole-point size from `start` downward whose width fits `max_width`.
///
/// Stops at `floor` when nothing fits; a `start` already below the floor
/// is used as given. Width grows linearly with size, so steps that cannot
/// fit are skipped rather than measured.
pub fn fit_font_size(text: &str, font: StandardFont, start: f32, max_width: f32, floor: f32) -> f32 {
    let unit_width = font.string_width(text, 1.0);
    let widest = if unit_width > 0.0 {
        max_width / unit_width
    } else {
        MAX_FONT_SIZE
    };
    let mut size = step_down_to(start, widest.max(floor + 1.0).min(MAX_FONT_SIZE));
    while size >= floor {
        if font.string_width(text, size) <= max_width {
            return size;
        }
        if size - 1.0 < floor {
            break;
        }
        size -= 1.0;
    }
    size
}

/// Greedy word wrap.
///
/// A word joins the current line when the line plus a space and the word
/// still fits; the first word of a line is always taken, so a single
/// overlong word overflows rather than looping.
pub fn wrap_lines(text: &str, font: StandardFont, size: f32, max_width: f32) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if max_width <= 0.0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            current_width = font.string_width(word, size);
            continue;
        }
        let segment_width = font.string_width(" ", size) + font.string_width(word, size);
        if current_width + segment_width <= max_width {
            current.push(' ');
            current.push_str(word);
            current_width += segment_width;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_width = font.string_width(word, size);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Single-line text, shrunk to the box width and left-aligned.
pub fn place_text(
    text: &str,
    bbox: &BBox,
    page_height: f32,
    start_size: f32,
    options: &RenderOptions,
) -> Option<Placement> {
    let text: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if text.is_empty() {
        return None;
    }

    let font = StandardFont::Helvetica;
    let size = fit_font_size(&text, font, start_size, bbox.width(), options.min_font_size);
    let offset = ((bbox.height() - size) / 2.0).min(2.0);

    Some(Placement {
        font,
        font_size: size,
        runs: vec![PlacedRun {
            text,
            x: bbox.x0,
            y: page_height - bbox.y1 + offset,
        }],
    })
}

/// Wrapped text, shrunk until the block fits the box height.
///
/// Lines stack downward from the top of a vertically centred block. Text
/// that still overflows at the floor size is drawn anyway.
pub fn place_multiline(
    text: &str,
    bbox: &BBox,
    page_height: f32,
    start_size: f32,
    options: &RenderOptions,
) -> Option<Placement> {
    let font = StandardFont::Helvetica;
    let box_width = bbox.width();
    let box_height = bbox.height();

    // One line at a larger size already overflows the box
    let tallest = (box_height / options.line_height)
        .max(options.min_font_size + 1.0)
        .min(MAX_FONT_SIZE);
    let mut size = step_down_to(start_size, tallest);
    let mut lines = wrap_lines(text, font, size, box_width);
    if lines.is_empty() {
        return None;
    }

    let block_height = |count: usize, size: f32| count as f32 * size * options.line_height;
    while block_height(lines.len(), size) > box_height && size - 1.0 >= options.min_font_size {
        size -= 1.0;
        lines = wrap_lines(text, font, size, box_width);
    }
    if block_height(lines.len(), size) > box_height {
        log::debug!(
            "{} lines overflow a {:.1}pt box at {}pt",
            lines.len(),
            box_height,
            size
        );
    }

    let line_height = size * options.line_height;
    let count = lines.len();
    let baseline =
        page_height - bbox.y1 + (box_height - count as f32 * line_height) / 2.0 + size * 0.3;

    let runs = lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| PlacedRun {
            text,
            x: bbox.x0,
            y: baseline + (count - 1 - i) as f32 * line_height,
        })
        .collect();

    Some(Placement {
        font,
        font_size: size,
        runs,
    })
}

/// A bold `X` centred in the box, sized to 80% of its height within 6..=12pt.
pub fn place_checkbox(bbox: &BBox, page_height: f32) -> Placement {
    let font = StandardFont::HelveticaBold;
    let size = (bbox.height() * 0.8).clamp(6.0, 12.0);
    let mark_width = font.string_width("X", size);

    Placement {
        font,
        font_size: size,
        runs: vec![PlacedRun {
            text: "X".to_string(),
            x: bbox.center_x() - mark_width / 2.0,
            y: page_height - bbox.y1 + (bbox.height() - size) / 2.0,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELV: StandardFont = StandardFont::Helvetica;

    fn lorem(words: usize) -> String {
        (0..words)
            .map(|i| ["alpha", "bravo", "charlie", "delta", "echo"][i % 5])
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_fit_keeps_start_when_it_fits() {
        assert_eq!(fit_font_size("Acme Capital LLC", HELV, 10.0, 200.0, 4.0), 10.0);
    }

    #[test]
    fn test_fit_largest_size_that_fits() {
        let text = "A fairly long company name, Incorporated";
        let size = fit_font_size(text, HELV, 12.0, 120.0, 4.0);
        assert!(HELV.string_width(text, size) <= 120.0);
        assert!(HELV.string_width(text, size + 1.0) > 120.0);
        assert!(size < 12.0);
    }

    #[test]
    fn test_fit_stops_at_floor() {
        let text = lorem(50);
        assert_eq!(fit_font_size(&text, HELV, 10.0, 20.0, 4.0), 4.0);
        // Starting below the floor
        assert_eq!(fit_font_size(&text, HELV, 3.0, 20.0, 4.0), 3.0);
    }

    #[test]
    fn test_fit_huge_start_terminates() {
        let size = fit_font_size("Acme Capital LLC", HELV, 1e9, 200.0, 4.0);
        assert!(size >= 4.0);
        assert!(HELV.string_width("Acme Capital LLC", size) <= 200.0);
        assert!(HELV.string_width("Acme Capital LLC", size + 1.0) > 200.0);

        // Whole-point steps from the start are kept
        let size = fit_font_size("Acme Capital LLC", HELV, 1e6 + 0.5, 200.0, 4.0);
        assert_eq!(size.fract(), 0.5);

        assert_eq!(fit_font_size(&lorem(50), HELV, 3.4e7, 20.0, 4.0), 4.0);
        assert_eq!(fit_font_size("", HELV, 1e9, 200.0, 4.0), MAX_FONT_SIZE);
    }

    #[test]
    fn test_step_down_to() {
        assert_eq!(step_down_to(10.0, 20.0), 10.0);
        assert_eq!(step_down_to(12.5, 10.2), 9.5);
        assert_eq!(step_down_to(12.0, 10.0), 10.0);
        // No exact whole-point steps at this magnitude
        assert_eq!(step_down_to(1e9, 4.0), 4.0);
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap_lines(&lorem(20), HELV, 10.0, 100.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(HELV.string_width(line, 10.0) <= 100.0, "{} too wide", line);
        }
        assert_eq!(lines.join(" "), lorem(20));
    }

    #[test]
    fn test_wrap_long_word_takes_own_line() {
        let lines = wrap_lines("a supercalifragilistic b", HELV, 10.0, 30.0);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
        assert!(wrap_lines("   ", HELV, 10.0, 30.0).is_empty());
        assert_eq!(wrap_lines("x y", HELV, 10.0, 0.0), vec!["x y"]);
    }

    #[test]
    fn test_text_baseline() {
        let bbox = BBox::new(100.0, 700.0, 300.0, 720.0);
        let placement =
            place_text("Acme Capital LLC", &bbox, 792.0, 10.0, &RenderOptions::default()).unwrap();
        assert_eq!(placement.font_size, 10.0);
        let run = &placement.runs[0];
        assert_eq!(run.x, 100.0);
        // min(2, (20 - 10) / 2)
        assert_eq!(run.y, 792.0 - 720.0 + 2.0);
    }

    #[test]
    fn test_text_in_short_box() {
        let bbox = BBox::new(0.0, 100.0, 200.0, 106.0);
        let placement = place_text("abc", &bbox, 792.0, 10.0, &RenderOptions::default()).unwrap();
        // (6 - 10) / 2 = -2
        assert_eq!(placement.runs[0].y, 792.0 - 106.0 - 2.0);
        assert!(place_text("", &bbox, 792.0, 10.0, &RenderOptions::default()).is_none());
    }

    #[test]
    fn test_multiline_shrinks_to_fit() {
        let bbox = BBox::new(50.0, 50.0, 250.0, 110.0);
        let text = lorem(40);
        let options = RenderOptions::default();
        let placement = place_multiline(&text, &bbox, 792.0, 10.0, &options).unwrap();

        assert!(placement.runs.len() > 1);
        assert!(placement.font_size < 10.0);
        assert!(placement.font_size >= 4.0);
        let height = placement.runs.len() as f32 * placement.font_size * 1.2;
        assert!(height <= 60.0);
        // First line is the highest
        assert!(placement.runs[0].y > placement.runs[1].y);
    }

    #[test]
    fn test_multiline_overflow_at_floor() {
        let bbox = BBox::new(0.0, 0.0, 40.0, 10.0);
        let placement =
            place_multiline(&lorem(60), &bbox, 792.0, 10.0, &RenderOptions::default()).unwrap();
        assert_eq!(placement.font_size, 4.0);
        assert!(placement.runs.len() > 2);
    }

    #[test]
    fn test_multiline_huge_start_terminates() {
        let bbox = BBox::new(50.0, 50.0, 250.0, 110.0);
        let options = RenderOptions::default();
        for start in [1e6, 3.4e7, 1e9] {
            let placement = place_multiline(&lorem(40), &bbox, 792.0, start, &options).unwrap();
            assert!(placement.font_size >= 4.0);
            let height = placement.runs.len() as f32 * placement.font_size * 1.2;
            assert!(height <= 60.0, "{} overflows at start {}", height, start);
        }

        let tiny = BBox::new(0.0, 0.0, 40.0, 2.0);
        let placement = place_multiline(&lorem(10), &tiny, 792.0, 1e9, &options).unwrap();
        assert!(placement.font_size >= 4.0 && placement.font_size < 5.0);
    }

    #[test]
    fn test_multiline_single_line_centred() {
        let bbox = BBox::new(0.0, 0.0, 300.0, 60.0);
        let placement =
            place_multiline("short", &bbox, 100.0, 10.0, &RenderOptions::default()).unwrap();
        assert_eq!(placement.runs.len(), 1);
        assert_eq!(placement.font_size, 10.0);
        // 100 - 60 + (60 - 12) / 2 + 3
        assert!((placement.runs[0].y - 67.0).abs() < 1e-4);
    }

    #[test]
    fn test_checkbox_mark() {
        let bbox = BBox::new(100.0, 100.0, 110.0, 110.0);
        let placement = place_checkbox(&bbox, 792.0);
        assert_eq!(placement.font, StandardFont::HelveticaBold);
        assert_eq!(placement.font_size, 8.0);
        let run = &placement.runs[0];
        assert_eq!(run.text, "X");
        // X is 667 units wide in Helvetica-Bold
        assert!((run.x - (105.0 - 0.667 * 8.0 / 2.0)).abs() < 1e-4);
        assert_eq!(run.y, 792.0 - 110.0 + 1.0);

        assert_eq!(place_checkbox(&BBox::new(0.0, 0.0, 30.0, 30.0), 792.0).font_size, 12.0);
        assert_eq!(place_checkbox(&BBox::new(0.0, 0.0, 5.0, 5.0), 792.0).font_size, 6.0);
    }
}
