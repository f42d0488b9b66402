//! Vector path interpretation.
//!
//! Walks a page's content stream tracking the graphics state and turns
//! every painted path into an axis-aligned rectangle in page space. Only
//! the bounds of each path matter for region detection, so curves
//! contribute their control points.

use super::backend::ContentOp;
use crate::model::{BBox, PageInfo};

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translate(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Build from six operands.
    pub fn from_slice(v: &[f32]) -> Option<Self> {
        match v {
            [a, b, c, d, e, f] => Some(Self::new(*a, *b, *c, *d, *e, *f)),
            _ => None,
        }
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Length of the transformed unit x vector.
    pub fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    /// Length of the transformed unit y vector.
    pub fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    /// Geometric mean scale, used for line widths.
    pub fn mean_scale(&self) -> f32 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }
}

/// A painted path reduced to its bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawingPath {
    /// Bounds in page space (top-left origin)
    pub rect: BBox,
    pub stroked: bool,
    pub filled: bool,
}

#[derive(Debug, Clone, Copy)]
struct GraphicsState {
    ctm: Matrix,
    line_width: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::identity(),
            line_width: 1.0,
        }
    }
}

/// Content-stream interpreter for path construction and painting.
#[derive(Debug, Default)]
pub struct PathInterpreter {
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    /// Current path points in device space
    points: Vec<(f32, f32)>,
    /// Current point in user space (for `v`)
    current: (f32, f32),
    paths: Vec<DrawingPath>,
}

impl PathInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret `ops` and return painted paths in page space.
    pub fn run(mut self, ops: &[ContentOp], page: &PageInfo) -> Vec<DrawingPath> {
        for op in ops {
            self.step(op, page);
        }
        self.paths
    }

    fn step(&mut self, op: &ContentOp, page: &PageInfo) {
        match op.operator.as_str() {
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
            "w" => {
                if let Some(w) = op.number(0) {
                    self.state.line_width = w.max(0.0);
                }
            }
            "m" | "l" => {
                if let Some(v) = op.numbers(2) {
                    self.push_point(v[0], v[1]);
                }
            }
            "c" => {
                if let Some(v) = op.numbers(6) {
                    self.push_point(v[0], v[1]);
                    self.push_point(v[2], v[3]);
                    self.push_point(v[4], v[5]);
                }
            }
            "v" => {
                if let Some(v) = op.numbers(4) {
                    let (cx, cy) = self.current;
                    self.push_point(cx, cy);
                    self.push_point(v[0], v[1]);
                    self.push_point(v[2], v[3]);
                }
            }
            "y" => {
                if let Some(v) = op.numbers(4) {
                    self.push_point(v[0], v[1]);
                    self.push_point(v[2], v[3]);
                }
            }
            "re" => {
                if let Some(v) = op.numbers(4) {
                    let (x, y, w, h) = (v[0], v[1], v[2], v[3]);
                    self.push_point(x, y);
                    self.push_point(x + w, y);
                    self.push_point(x + w, y + h);
                    self.push_point(x, y + h);
                    self.current = (x, y);
                }
            }
            "S" | "s" => self.paint(true, false, page),
            "f" | "F" | "f*" => self.paint(false, true, page),
            "B" | "B*" | "b" | "b*" => self.paint(true, true, page),
            "n" => self.points.clear(),
            _ => {}
        }
    }

    fn push_point(&mut self, x: f32, y: f32) {
        self.current = (x, y);
        self.points.push(self.state.ctm.apply(x, y));
    }

    fn paint(&mut self, stroked: bool, filled: bool, page: &PageInfo) {
        let points = std::mem::take(&mut self.points);
        let Some(bounds) = BBox::from_points(
            points
                .into_iter()
                .map(|(x, y)| page.to_page_space(x, y)),
        ) else {
            return;
        };
        if !bounds.to_array().iter().all(|v| v.is_finite()) {
            return;
        }

        let rect = if stroked {
            bounds.expand(self.state.line_width * self.state.ctm.mean_scale() / 2.0)
        } else {
            bounds
        };

        self.paths.push(DrawingPath {
            rect: rect.rounded(),
            stroked,
            filled,
        });
    }
}

/// Painted paths of a page, in content-stream order.
pub fn extract_paths(ops: &[ContentOp], page: &PageInfo) -> Vec<DrawingPath> {
    PathInterpreter::new().run(ops, page)
}
