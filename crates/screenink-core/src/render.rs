//! Abstract immediate-mode 2D canvas contract.
//!
//! The core never rasterizes anything itself: elements replay their style,
//! transform and path against this trait, and any backend implementing it
//! (a GPU scene builder, a PDF writer, a test recorder) produces the actual
//! output. Repaint is a pure read of the model.

use crate::style::{Color, FillRule, FontDescriptor, LineCap, LineJoin};
use kurbo::{Affine, Point, Rect};

/// Compositing operator for paint operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeOp {
    /// Normal painting.
    #[default]
    Over,
    /// Erase: painted areas become transparent.
    Clear,
}

/// Immediate-mode drawing surface an element renders into.
pub trait RenderBackend {
    /// Push the current transform and style state.
    fn save(&mut self);
    /// Pop back to the previously saved state.
    fn restore(&mut self);
    /// Append an affine onto the current transform.
    fn transform(&mut self, affine: Affine);

    fn set_color(&mut self, color: &Color);
    fn set_line_width(&mut self, width: f64);
    fn set_line_cap(&mut self, cap: LineCap);
    fn set_line_join(&mut self, join: LineJoin);
    /// Dash segment lengths and offset; an empty slice disables dashing.
    fn set_dash(&mut self, segments: &[f64], offset: f64);
    fn set_operator(&mut self, op: CompositeOp);

    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, p: Point);
    fn quad_to(&mut self, ctrl: Point, p: Point);
    fn curve_to(&mut self, c1: Point, c2: Point, p: Point);
    fn rect(&mut self, rect: Rect);
    /// Circular arc around `center`, radians, counter-clockwise.
    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64);
    fn close_path(&mut self);

    /// Fill the current path, keeping it for a following stroke.
    fn fill_preserve(&mut self, rule: FillRule);
    /// Stroke and clear the current path.
    fn stroke(&mut self);

    fn draw_text(&mut self, text: &str, origin: Point, size: f64, font: &FontDescriptor);
    /// Draw encoded image bytes into the destination rectangle.
    fn draw_image(&mut self, data: &[u8], dest: Rect);
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOp {
    Save,
    Restore,
    Transform(Affine),
    SetColor(Color),
    SetLineWidth(f64),
    SetLineCap(LineCap),
    SetLineJoin(LineJoin),
    SetDash(Vec<f64>, f64),
    SetOperator(CompositeOp),
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CurveTo(Point, Point, Point),
    Rect(Rect),
    Arc(Point, f64, f64, f64),
    ClosePath,
    FillPreserve(FillRule),
    Stroke,
    DrawText(String, Point, f64),
    DrawImage(usize, Rect),
}

/// Backend that records every call it receives. Used by tests and as a
/// debugging aid for backend authors.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub ops: Vec<RenderOp>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of recorded operations matching the predicate.
    pub fn count(&self, pred: impl Fn(&RenderOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

impl RenderBackend for RecordingBackend {
    fn save(&mut self) {
        self.ops.push(RenderOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(RenderOp::Restore);
    }

    fn transform(&mut self, affine: Affine) {
        self.ops.push(RenderOp::Transform(affine));
    }

    fn set_color(&mut self, color: &Color) {
        self.ops.push(RenderOp::SetColor(color.clone()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.ops.push(RenderOp::SetLineWidth(width));
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.ops.push(RenderOp::SetLineCap(cap));
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.ops.push(RenderOp::SetLineJoin(join));
    }

    fn set_dash(&mut self, segments: &[f64], offset: f64) {
        self.ops.push(RenderOp::SetDash(segments.to_vec(), offset));
    }

    fn set_operator(&mut self, op: CompositeOp) {
        self.ops.push(RenderOp::SetOperator(op));
    }

    fn move_to(&mut self, p: Point) {
        self.ops.push(RenderOp::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        self.ops.push(RenderOp::LineTo(p));
    }

    fn quad_to(&mut self, ctrl: Point, p: Point) {
        self.ops.push(RenderOp::QuadTo(ctrl, p));
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.ops.push(RenderOp::CurveTo(c1, c2, p));
    }

    fn rect(&mut self, rect: Rect) {
        self.ops.push(RenderOp::Rect(rect));
    }

    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64) {
        self.ops.push(RenderOp::Arc(center, radius, start, end));
    }

    fn close_path(&mut self) {
        self.ops.push(RenderOp::ClosePath);
    }

    fn fill_preserve(&mut self, rule: FillRule) {
        self.ops.push(RenderOp::FillPreserve(rule));
    }

    fn stroke(&mut self) {
        self.ops.push(RenderOp::Stroke);
    }

    fn draw_text(&mut self, text: &str, origin: Point, size: f64, _font: &FontDescriptor) {
        self.ops
            .push(RenderOp::DrawText(text.to_string(), origin, size));
    }

    fn draw_image(&mut self, data: &[u8], dest: Rect) {
        self.ops.push(RenderOp::DrawImage(data.len(), dest));
    }
}
