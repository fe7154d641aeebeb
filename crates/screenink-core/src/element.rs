//! The drawing element: one committed shape, stroke, text or image.

use crate::geometry::{distance, midpoint, point_to_polyline_dist, point_to_segment_dist};
use crate::render::{CompositeOp, RenderBackend};
use crate::style::{ElementStyle, FillRule, FontDescriptor};
use crate::transform::{Transformation, compose};
use kurbo::{Affine, BezPath, Circle, ParamCurveNearest, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flattening tolerance used when converting analytic shapes to paths.
const PATH_TOLERANCE: f64 = 0.1;

/// Approximate advance width per character, as a fraction of the font size.
const CHAR_WIDTH_FACTOR: f64 = 0.55;

/// Shape variants an element can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    FreeDrawing,
    Line,
    Ellipse,
    Rectangle,
    Text,
    Polygon,
    Polyline,
    Image,
}

impl ShapeKind {
    /// Minimum number of points below which the element is never committed.
    pub fn min_points(&self) -> usize {
        match self {
            ShapeKind::FreeDrawing => 1,
            ShapeKind::Polygon => 3,
            _ => 2,
        }
    }

    /// Whether a fill makes sense for this shape.
    pub fn fillable(&self) -> bool {
        !matches!(self, ShapeKind::Text | ShapeKind::Image)
    }
}

/// Text-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPayload {
    pub content: String,
    /// Cursor position in characters.
    pub cursor: usize,
    pub font: FontDescriptor,
    /// Lineage index: text elements split off by a "new line" share a base
    /// and count up from it.
    #[serde(default)]
    pub line_index: u32,
}

impl TextPayload {
    pub fn new(font: FontDescriptor) -> Self {
        Self {
            content: String::new(),
            cursor: 0,
            font,
            line_index: 0,
        }
    }
}

/// Encoded format of an embedded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Some(ImageFormat::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }
}

/// Image-specific payload. Bytes are kept base64-encoded so the element
/// serializes to plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub data_base64: String,
    pub format: ImageFormat,
    /// Keep original colors; when false the backend may recolor the bitmap
    /// with the element's stroke color.
    pub colored: bool,
}

impl ImagePayload {
    pub fn new(data: &[u8], format: ImageFormat) -> Self {
        use base64::{Engine, engine::general_purpose::STANDARD};
        Self {
            data_base64: STANDARD.encode(data),
            format,
            colored: true,
        }
    }

    /// Raw image bytes, decoded from base64.
    pub fn data(&self) -> Option<Vec<u8>> {
        use base64::{Engine, engine::general_purpose::STANDARD};
        STANDARD.decode(&self.data_base64).ok()
    }
}

/// One shape/stroke/text/image instance in the drawing.
///
/// Geometry is an ordered point list whose meaning depends on `shape`
/// (two corners for a rectangle, freehand samples, polygon vertices...).
/// Applied edits accumulate in `transformations` and are replayed every
/// time the element renders or hit-tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingElement {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub shape: ShapeKind,
    /// Serialized as `[x, y]` pairs so point lists stay compact on disk.
    #[serde(with = "point_pairs")]
    pub points: Vec<Point>,
    pub style: ElementStyle,
    /// Draw with the clear operator instead of painting.
    #[serde(default)]
    pub eraser: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImagePayload>,
    #[serde(default)]
    pub transformations: Vec<Transformation>,
}

impl DrawingElement {
    /// Create an empty element of the given shape with the session style.
    pub fn new(shape: ShapeKind, style: ElementStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            shape,
            points: Vec::new(),
            style,
            eraser: false,
            text: None,
            image: None,
            transformations: Vec::new(),
        }
    }

    /// Attach a text payload (Text elements).
    pub fn with_text(mut self, payload: TextPayload) -> Self {
        self.text = Some(payload);
        self
    }

    /// Attach an image payload (Image elements).
    pub fn with_image(mut self, payload: ImagePayload) -> Self {
        self.image = Some(payload);
        self
    }

    /// Seed the first point of a pointer gesture.
    pub fn start_drawing(&mut self, point: Point) {
        self.points.clear();
        self.points.push(point);
    }

    /// Shape-dependent point update while the pointer drags.
    ///
    /// FreeDrawing appends a sample; every other shape moves its trailing
    /// point (the second corner, or the tentative vertex of a polygon or
    /// polyline awaiting [`DrawingElement::add_vertex`]).
    pub fn update_pointer(&mut self, point: Point) {
        match self.shape {
            ShapeKind::FreeDrawing => self.points.push(point),
            _ => {
                if self.points.len() < 2 {
                    self.points.push(point);
                } else if let Some(last) = self.points.last_mut() {
                    *last = point;
                }
            }
        }
    }

    /// Commit the tentative point and open a new one.
    ///
    /// For polygons and polylines this fixes a vertex; for a straight line
    /// the third point bends it into a quadratic curve.
    pub fn add_vertex(&mut self) {
        match self.shape {
            ShapeKind::Polygon | ShapeKind::Polyline => {
                if let Some(&last) = self.points.last() {
                    self.points.push(last);
                }
            }
            ShapeKind::Line => {
                if self.points.len() == 2 {
                    let last = self.points[1];
                    self.points.push(last);
                }
            }
            _ => {}
        }
    }

    /// Replace point `i-1` with the midpoint of its neighbors.
    pub fn smooth_point(&mut self, i: usize) {
        if i >= 2 && i < self.points.len() {
            self.points[i - 1] = midpoint(self.points[i - 2], self.points[i]);
        }
    }

    /// Corner-cutting pass over the whole point sequence.
    pub fn smooth_all(&mut self) {
        for i in 2..self.points.len() {
            self.smooth_point(i);
        }
    }

    /// Smooth the most recent sample, for live smoothing during freehand
    /// drawing.
    pub fn smooth_latest(&mut self) {
        let len = self.points.len();
        if len >= 3 {
            self.smooth_point(len - 1);
        }
    }

    /// The composed render transform of all applied records.
    pub fn transform_affine(&self) -> Affine {
        compose(&self.transformations)
    }

    /// Straight-line distance covered by the initial drag.
    pub fn drag_distance(&self) -> f64 {
        match (self.points.first(), self.points.get(1)) {
            (Some(&a), Some(&b)) => distance(a, b),
            _ => 0.0,
        }
    }

    /// Whether the element has enough geometry (and content) to be pushed
    /// onto the stack. Sub-minimum elements are silently discarded, an
    /// expected cancellation path rather than an error.
    pub fn is_committable(&self, min_drag: f64) -> bool {
        if self.points.len() < self.shape.min_points() {
            return false;
        }
        match self.shape {
            // A single dot is a valid freehand stroke.
            ShapeKind::FreeDrawing => true,
            ShapeKind::Text => self
                .text
                .as_ref()
                .map(|t| !t.content.is_empty())
                .unwrap_or(false),
            ShapeKind::Polygon | ShapeKind::Polyline => {
                self.points.windows(2).any(|w| distance(w[0], w[1]) > min_drag)
            }
            _ => self.drag_distance() > min_drag,
        }
    }

    /// Untransformed outline path, per the shape table.
    pub fn build_path(&self) -> BezPath {
        let mut path = BezPath::new();
        match self.shape {
            ShapeKind::FreeDrawing | ShapeKind::Polyline | ShapeKind::Polygon => {
                if let Some((&first, rest)) = self.points.split_first() {
                    path.move_to(first);
                    for &p in rest {
                        path.line_to(p);
                    }
                    if self.shape == ShapeKind::Polygon {
                        path.close_path();
                    }
                }
            }
            ShapeKind::Line => match self.points.as_slice() {
                [a, b] => {
                    path.move_to(*a);
                    path.line_to(*b);
                }
                [a, b, c] => {
                    // The third point is the control anchor bending the
                    // segment from a to b.
                    path.move_to(*a);
                    path.quad_to(*c, *b);
                }
                [a] => path.move_to(*a),
                _ => {}
            },
            ShapeKind::Rectangle | ShapeKind::Image => {
                if let Some(rect) = self.corner_rect() {
                    path = rect.to_path(PATH_TOLERANCE);
                }
            }
            ShapeKind::Ellipse => {
                if let (Some(&center), Some(&edge)) = (self.points.first(), self.points.get(1)) {
                    let circle = Circle::new(center, distance(center, edge));
                    path = circle.to_path(PATH_TOLERANCE);
                }
            }
            ShapeKind::Text => {
                if let Some(rect) = self.text_rect() {
                    path = rect.to_path(PATH_TOLERANCE);
                }
            }
        }
        path
    }

    /// Axis-aligned rectangle from the two corner points.
    pub fn corner_rect(&self) -> Option<Rect> {
        match (self.points.first(), self.points.get(1)) {
            (Some(&a), Some(&b)) => Some(Rect::from_points(a, b)),
            _ => None,
        }
    }

    /// Font size derived from the drag corners.
    pub fn font_size(&self) -> f64 {
        match (self.points.first(), self.points.get(1)) {
            (Some(a), Some(b)) => (b.y - a.y).abs().max(1.0),
            _ => 1.0,
        }
    }

    /// Baseline anchor of a text element.
    pub fn text_anchor(&self) -> Point {
        let (a, b) = match (self.points.first(), self.points.get(1)) {
            (Some(&a), Some(&b)) => (a, b),
            _ => return Point::ZERO,
        };
        let right_aligned = self
            .text
            .as_ref()
            .map(|t| t.font.right_aligned)
            .unwrap_or(false);
        let x = if right_aligned {
            a.x.max(b.x)
        } else {
            a.x.min(b.x)
        };
        Point::new(x, a.y.max(b.y))
    }

    /// Approximate bounding box of the rendered text, used for hit testing
    /// while the real layout lives in the backend.
    fn text_rect(&self) -> Option<Rect> {
        let payload = self.text.as_ref()?;
        if self.points.len() < 2 {
            return None;
        }
        let size = self.font_size();
        let anchor = self.text_anchor();
        let width = (payload.content.chars().count().max(1) as f64) * size * CHAR_WIDTH_FACTOR;
        let rect = if payload.font.right_aligned {
            Rect::new(anchor.x - width, anchor.y - size, anchor.x, anchor.y)
        } else {
            Rect::new(anchor.x, anchor.y - size, anchor.x + width, anchor.y)
        };
        Some(rect)
    }

    /// Bounding box in drawing coordinates, transformations applied.
    pub fn bounds(&self) -> Rect {
        let mut path = self.build_path();
        if path.elements().is_empty() {
            if let Some(&p) = self.points.first() {
                return Rect::from_points(p, p);
            }
            return Rect::ZERO;
        }
        path.apply_affine(self.transform_affine());
        path.bounding_box()
    }

    /// Center the transform engine anchors rotation and scaling on.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Hit test against the element's built path, transform-aware.
    ///
    /// Filled shapes test winding; outlines test distance to the stroked
    /// path; text and images test their bounding box.
    pub fn contains_point(&self, point: Point, tolerance: f64) -> bool {
        let affine = self.transform_affine();
        if affine.determinant().abs() < 1e-12 {
            return false;
        }
        let local = affine.inverse() * point;

        match self.shape {
            ShapeKind::Text | ShapeKind::Image => {
                let rect = match self.shape {
                    ShapeKind::Text => self.text_rect(),
                    _ => self.corner_rect(),
                };
                rect.map(|r| r.inflate(tolerance, tolerance).contains(local))
                    .unwrap_or(false)
            }
            _ => {
                let path = self.build_path();
                if path.elements().is_empty() {
                    return false;
                }
                // Interior hits count whether or not the element fills, the
                // same way in-path and in-stroke tests are combined by
                // canvas hit testing.
                let winding = path.winding(local);
                let inside = match self.style.fill_rule {
                    FillRule::NonZero => winding != 0,
                    FillRule::EvenOdd => winding % 2 != 0,
                };
                if inside {
                    return true;
                }
                let reach = tolerance + self.style.line_width / 2.0;
                match self.shape {
                    ShapeKind::FreeDrawing | ShapeKind::Polyline | ShapeKind::Polygon => {
                        let mut dist = point_to_polyline_dist(local, &self.points);
                        if self.shape == ShapeKind::Polygon && self.points.len() >= 3 {
                            let closing = point_to_segment_dist(
                                local,
                                self.points[self.points.len() - 1],
                                self.points[0],
                            );
                            dist = dist.min(closing);
                        }
                        dist <= reach
                    }
                    _ => path
                        .segments()
                        .any(|seg| seg.nearest(local, 1e-3).distance_sq.sqrt() <= reach),
                }
            }
        }
    }

    /// Replay style, transformations and path construction into a backend,
    /// then fill (when active and meaningful) and stroke.
    pub fn render(&self, backend: &mut dyn RenderBackend) {
        self.render_with_cursor(backend, false);
    }

    /// Render, optionally appending the text cursor glyph (Writing mode).
    pub fn render_with_cursor(&self, backend: &mut dyn RenderBackend, show_cursor: bool) {
        backend.save();

        let affine = self.transform_affine();
        if affine != Affine::IDENTITY {
            backend.transform(affine);
        }

        backend.set_operator(if self.eraser {
            CompositeOp::Clear
        } else {
            CompositeOp::Over
        });
        backend.set_color(&self.style.color);
        backend.set_line_width(self.style.line_width);
        backend.set_line_cap(self.style.line_cap);
        backend.set_line_join(self.style.line_join);
        backend.set_dash(&self.style.dash.segments(), self.style.dash.offset);

        match self.shape {
            ShapeKind::Text => self.render_text(backend, show_cursor),
            ShapeKind::Image => self.render_image(backend),
            _ => self.render_outline(backend),
        }

        backend.restore();
    }

    fn render_outline(&self, backend: &mut dyn RenderBackend) {
        match self.shape {
            ShapeKind::FreeDrawing | ShapeKind::Polyline | ShapeKind::Polygon => {
                if let Some((&first, rest)) = self.points.split_first() {
                    backend.move_to(first);
                    for &p in rest {
                        backend.line_to(p);
                    }
                    if self.shape == ShapeKind::Polygon {
                        backend.close_path();
                    }
                }
            }
            ShapeKind::Line => match self.points.as_slice() {
                [a, b] => {
                    backend.move_to(*a);
                    backend.line_to(*b);
                }
                [a, b, c] => {
                    backend.move_to(*a);
                    backend.quad_to(*c, *b);
                }
                _ => {}
            },
            ShapeKind::Rectangle => {
                if let Some(rect) = self.corner_rect() {
                    backend.rect(rect);
                }
            }
            ShapeKind::Ellipse => {
                if let (Some(&center), Some(&edge)) = (self.points.first(), self.points.get(1)) {
                    backend.arc(
                        center,
                        distance(center, edge),
                        0.0,
                        std::f64::consts::TAU,
                    );
                }
            }
            ShapeKind::Text | ShapeKind::Image => return,
        }

        if self.style.fill && self.fill_applies() {
            backend.fill_preserve(self.style.fill_rule);
        }
        backend.stroke();
    }

    /// Fill precedes stroke unless the shape degenerates to a straight line.
    fn fill_applies(&self) -> bool {
        match self.shape {
            ShapeKind::Line => self.points.len() >= 3,
            ShapeKind::Polyline | ShapeKind::Polygon | ShapeKind::FreeDrawing => {
                self.points.len() >= 3
            }
            _ => self.shape.fillable(),
        }
    }

    fn render_text(&self, backend: &mut dyn RenderBackend, show_cursor: bool) {
        let Some(payload) = self.text.as_ref() else {
            return;
        };
        if self.points.len() < 2 {
            return;
        }
        let mut content = payload.content.clone();
        if show_cursor {
            let at = payload.cursor.min(content.chars().count());
            let byte_at = content
                .char_indices()
                .nth(at)
                .map(|(i, _)| i)
                .unwrap_or(content.len());
            content.insert(byte_at, '|');
        }
        backend.draw_text(&content, self.text_anchor(), self.font_size(), &payload.font);
    }

    fn render_image(&self, backend: &mut dyn RenderBackend) {
        let (Some(payload), Some(rect)) = (self.image.as_ref(), self.corner_rect()) else {
            return;
        };
        if let Some(data) = payload.data() {
            backend.draw_image(&data, rect);
        }
    }

    /// Copy with coordinates rounded to 2 decimal places, the precision the
    /// document codec persists.
    pub fn rounded(&self) -> Self {
        let mut e = self.clone();
        for p in &mut e.points {
            *p = round_point(*p);
        }
        for t in &mut e.transformations {
            match t {
                Transformation::Translation { dx, dy } => {
                    *dx = round2(*dx);
                    *dy = round2(*dy);
                }
                Transformation::Rotation { center, .. }
                | Transformation::Scale { center, .. }
                | Transformation::Stretch { center, .. }
                | Transformation::Reflection { center, .. }
                | Transformation::Inversion { center } => {
                    *center = round_point(*center);
                }
            }
        }
        e
    }
}

mod point_pairs {
    use kurbo::Point;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(points: &[Point], s: S) -> Result<S::Ok, S::Error> {
        let pairs: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        pairs.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Point>, D::Error> {
        let pairs = Vec::<[f64; 2]>::deserialize(d)?;
        Ok(pairs.into_iter().map(|[x, y]| Point::new(x, y)).collect())
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round_point(p: Point) -> Point {
    Point::new(round2(p.x), round2(p.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RecordingBackend, RenderOp};

    fn element(shape: ShapeKind) -> DrawingElement {
        DrawingElement::new(shape, ElementStyle::default())
    }

    #[test]
    fn test_freehand_appends_samples() {
        let mut e = element(ShapeKind::FreeDrawing);
        e.start_drawing(Point::new(0.0, 0.0));
        e.update_pointer(Point::new(1.0, 1.0));
        e.update_pointer(Point::new(2.0, 0.0));
        assert_eq!(e.points.len(), 3);
    }

    #[test]
    fn test_two_point_shapes_move_second_corner() {
        let mut e = element(ShapeKind::Rectangle);
        e.start_drawing(Point::new(0.0, 0.0));
        e.update_pointer(Point::new(10.0, 10.0));
        e.update_pointer(Point::new(50.0, 30.0));
        assert_eq!(e.points.len(), 2);
        assert_eq!(e.points[1], Point::new(50.0, 30.0));
    }

    #[test]
    fn test_polygon_tentative_vertex() {
        let mut e = element(ShapeKind::Polygon);
        e.start_drawing(Point::new(0.0, 0.0));
        e.update_pointer(Point::new(10.0, 0.0));
        e.add_vertex();
        e.update_pointer(Point::new(10.0, 10.0));
        assert_eq!(e.points.len(), 3);
        assert_eq!(e.points[1], Point::new(10.0, 0.0));
        assert_eq!(e.points[2], Point::new(10.0, 10.0));
    }

    #[test]
    fn test_line_third_point_becomes_curve() {
        let mut e = element(ShapeKind::Line);
        e.start_drawing(Point::new(0.0, 0.0));
        e.update_pointer(Point::new(100.0, 0.0));
        e.add_vertex();
        e.update_pointer(Point::new(50.0, 40.0));

        let mut backend = RecordingBackend::new();
        e.render(&mut backend);
        assert_eq!(
            backend.count(|op| matches!(op, RenderOp::QuadTo(..))),
            1
        );
    }

    #[test]
    fn test_min_size_rejection() {
        let mut e = element(ShapeKind::Rectangle);
        e.start_drawing(Point::new(10.0, 10.0));
        e.update_pointer(Point::new(11.0, 11.0));
        assert!(!e.is_committable(3.0));

        e.update_pointer(Point::new(50.0, 10.0));
        assert!(e.is_committable(3.0));
    }

    #[test]
    fn test_polygon_min_vertices() {
        let mut e = element(ShapeKind::Polygon);
        e.start_drawing(Point::new(0.0, 0.0));
        e.update_pointer(Point::new(50.0, 0.0));
        assert!(!e.is_committable(3.0));

        e.add_vertex();
        e.update_pointer(Point::new(50.0, 50.0));
        assert!(e.is_committable(3.0));
    }

    #[test]
    fn test_freehand_dot_commits() {
        let mut e = element(ShapeKind::FreeDrawing);
        e.start_drawing(Point::new(5.0, 5.0));
        assert!(e.is_committable(3.0));
    }

    #[test]
    fn test_empty_text_rejected() {
        let mut e = element(ShapeKind::Text).with_text(TextPayload::new(FontDescriptor::default()));
        e.start_drawing(Point::new(0.0, 0.0));
        e.update_pointer(Point::new(0.0, 24.0));
        assert!(!e.is_committable(3.0));

        e.text.as_mut().unwrap().content.push_str("hi");
        assert!(e.is_committable(3.0));
    }

    #[test]
    fn test_smoothing_stays_in_neighbor_hull() {
        let original = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 20.0),
            Point::new(20.0, -5.0),
            Point::new(30.0, 15.0),
            Point::new(40.0, 0.0),
        ];
        let mut e = element(ShapeKind::FreeDrawing);
        e.points = original.clone();

        // Repeated smoothing must stay bounded: each point remains within
        // the bounding box of its original 2-neighborhood.
        for _ in 0..50 {
            e.smooth_all();
        }
        for (i, p) in e.points.iter().enumerate() {
            let lo = i.saturating_sub(2);
            let hi = (i + 2).min(original.len() - 1);
            let hull = original[lo..=hi]
                .iter()
                .fold(Rect::from_points(original[lo], original[lo]), |r, q| {
                    r.union_pt(*q)
                });
            assert!(hull.inflate(1e-9, 1e-9).contains(*p), "point {} escaped", i);
        }
    }

    #[test]
    fn test_contains_point_stroke() {
        let mut e = element(ShapeKind::Line);
        e.start_drawing(Point::new(0.0, 0.0));
        e.update_pointer(Point::new(100.0, 0.0));
        assert!(e.contains_point(Point::new(50.0, 1.0), 1.0));
        assert!(!e.contains_point(Point::new(50.0, 30.0), 1.0));
    }

    #[test]
    fn test_contains_point_filled() {
        let mut e = element(ShapeKind::Rectangle);
        e.style.fill = true;
        e.start_drawing(Point::new(0.0, 0.0));
        e.update_pointer(Point::new(100.0, 100.0));
        assert!(e.contains_point(Point::new(50.0, 50.0), 0.0));
        assert!(!e.contains_point(Point::new(150.0, 50.0), 0.0));
    }

    #[test]
    fn test_contains_point_follows_transform() {
        let mut e = element(ShapeKind::Rectangle);
        e.style.fill = true;
        e.start_drawing(Point::new(0.0, 0.0));
        e.update_pointer(Point::new(10.0, 10.0));
        e.transformations.push(Transformation::Translation {
            dx: 100.0,
            dy: 0.0,
        });
        assert!(e.contains_point(Point::new(105.0, 5.0), 0.0));
        assert!(!e.contains_point(Point::new(5.0, 5.0), 0.0));
    }

    #[test]
    fn test_eraser_uses_clear_operator() {
        let mut e = element(ShapeKind::FreeDrawing);
        e.eraser = true;
        e.start_drawing(Point::new(0.0, 0.0));
        e.update_pointer(Point::new(10.0, 0.0));

        let mut backend = RecordingBackend::new();
        e.render(&mut backend);
        assert_eq!(
            backend.count(|op| matches!(op, RenderOp::SetOperator(CompositeOp::Clear))),
            1
        );
    }

    #[test]
    fn test_fill_precedes_stroke() {
        let mut e = element(ShapeKind::Rectangle);
        e.style.fill = true;
        e.start_drawing(Point::new(0.0, 0.0));
        e.update_pointer(Point::new(10.0, 10.0));

        let mut backend = RecordingBackend::new();
        e.render(&mut backend);
        let fill_at = backend
            .ops
            .iter()
            .position(|op| matches!(op, RenderOp::FillPreserve(_)))
            .expect("fill emitted");
        let stroke_at = backend
            .ops
            .iter()
            .position(|op| matches!(op, RenderOp::Stroke))
            .expect("stroke emitted");
        assert!(fill_at < stroke_at);
    }

    #[test]
    fn test_straight_line_never_fills() {
        let mut e = element(ShapeKind::Line);
        e.style.fill = true;
        e.start_drawing(Point::new(0.0, 0.0));
        e.update_pointer(Point::new(10.0, 0.0));

        let mut backend = RecordingBackend::new();
        e.render(&mut backend);
        assert_eq!(
            backend.count(|op| matches!(op, RenderOp::FillPreserve(_))),
            0
        );
    }

    #[test]
    fn test_cursor_glyph_insertion() {
        let mut payload = TextPayload::new(FontDescriptor::default());
        payload.content = "abc".to_string();
        payload.cursor = 1;
        let mut e = element(ShapeKind::Text).with_text(payload);
        e.start_drawing(Point::new(0.0, 0.0));
        e.update_pointer(Point::new(0.0, 20.0));

        let mut backend = RecordingBackend::new();
        e.render_with_cursor(&mut backend, true);
        let text = backend.ops.iter().find_map(|op| match op {
            RenderOp::DrawText(s, _, _) => Some(s.clone()),
            _ => None,
        });
        assert_eq!(text.as_deref(), Some("a|bc"));
    }

    #[test]
    fn test_serde_round_trip() {
        let mut e = element(ShapeKind::Ellipse);
        e.start_drawing(Point::new(10.0, 20.0));
        e.update_pointer(Point::new(40.0, 20.0));
        e.transformations.push(Transformation::Rotation {
            center: Point::new(10.0, 20.0),
            angle: 0.5,
        });

        let json = serde_json::to_string(&e).unwrap();
        let back: DrawingElement = serde_json::from_str(&json).unwrap();
        assert_eq!(e, back);
    }

    #[test]
    fn test_rounding_precision() {
        let mut e = element(ShapeKind::Line);
        e.start_drawing(Point::new(1.23456, 2.34567));
        e.update_pointer(Point::new(3.45678, 4.56789));
        let r = e.rounded();
        assert_eq!(r.points[0], Point::new(1.23, 2.35));
        assert_eq!(r.points[1], Point::new(3.46, 4.57));
    }
}
