//! Value collaborators: where field values come from and how they print.

mod format;
mod path;

pub use format::{
    display_string, format_amount, format_date, is_checked, DefaultFormatter, DisplayFormatter,
};
pub use path::{parse_path, resolve_path, PathSegment, ValueSource};
