//! Page content extraction.
//!
//! The backend exposes decoded content-stream operations; the graphics and
//! text interpreters turn those into drawn rectangles and text blocks.

pub mod backend;
pub mod geometry;
pub mod graphics;
pub mod text;

pub use backend::{ContentOp, LopdfBackend, PdfBackend, PdfValue};
pub use geometry::{classify, PageGeometryExtractor};
pub use graphics::{extract_paths, DrawingPath, Matrix};
pub use text::{TextBlockExtractor, TextLine, TextSpan};
