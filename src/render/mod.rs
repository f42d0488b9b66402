//! Overlay rendering: layout, drawing, progress and page merging.

mod canvas;
mod layout;
mod merge;
pub mod metrics;
mod options;
mod overlay;
pub mod progress;

pub use canvas::OverlayCanvas;
pub use layout::{
    fit_font_size, place_checkbox, place_multiline, place_text, wrap_lines, PlacedRun, Placement,
};
pub use merge::PageMerger;
pub use metrics::{encode_win_ansi, StandardFont};
pub use options::{
    PageSelection, RenderOptions, DEFAULT_FONT_SIZE, LINE_HEIGHT_FACTOR, MIN_FONT_SIZE,
};
pub use overlay::OverlayRenderer;
pub use progress::{
    progress_channel, FillStep, ProgressEvent, ProgressObserver, ProgressPublisher,
    ProgressReceiver,
};
