//! The drawing document: an ordered element list with a JSON round trip
//! and SVG export.

use crate::element::DrawingElement;
use crate::style::Color;
use crate::svg;
use kurbo::Size;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A persistable drawing: elements in bottom-to-top paint order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Drawing {
    pub elements: Vec<DrawingElement>,
}

impl Drawing {
    pub fn new(elements: Vec<DrawingElement>) -> Self {
        Self { elements }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Serialize to the document format: a pretty-printed JSON array with
    /// coordinates rounded to 2 decimals and numeric point arrays kept on
    /// one line.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let rounded = Drawing::new(self.elements.iter().map(|e| e.rounded()).collect());
        let value = serde_json::to_value(&rounded)?;
        let mut out = String::new();
        write_value(&mut out, &value, 0);
        out.push('\n');
        Ok(out)
    }

    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Tolerant load: a corrupt document yields an empty drawing rather
    /// than preventing the surface from opening.
    pub fn from_json_or_empty(input: &str) -> Self {
        match Self::from_json(input) {
            Ok(drawing) => drawing,
            Err(err) => {
                warn!("discarding malformed drawing document: {}", err);
                Drawing::default()
            }
        }
    }

    /// Export as a standalone SVG document.
    pub fn to_svg(&self, size: Size, background: Option<&Color>) -> String {
        svg::document(&self.elements, size, background)
    }
}

/// Pretty-print with 2-space indentation, inlining arrays that hold only
/// numbers so point lists stay compact.
fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
            } else if items.iter().all(Value::is_number) {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&item.to_string());
                }
                out.push(']');
            } else {
                out.push_str("[\n");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(",\n");
                    }
                    indent(out, depth + 1);
                    write_value(out, item, depth + 1);
                }
                out.push('\n');
                indent(out, depth);
                out.push(']');
            }
        }
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
            } else {
                out.push_str("{\n");
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push_str(",\n");
                    }
                    indent(out, depth + 1);
                    out.push_str(&Value::String(key.clone()).to_string());
                    out.push_str(": ");
                    write_value(out, item, depth + 1);
                }
                out.push('\n');
                indent(out, depth);
                out.push('}');
            }
        }
        other => out.push_str(&other.to_string()),
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{DrawingElement, ShapeKind};
    use crate::style::ElementStyle;
    use crate::transform::Transformation;
    use kurbo::Point;

    fn sample_drawing() -> Drawing {
        let mut line = DrawingElement::new(ShapeKind::Line, ElementStyle::default());
        line.start_drawing(Point::new(1.234567, 2.0));
        line.update_pointer(Point::new(30.0, 40.0));
        line.transformations.push(Transformation::Rotation {
            center: Point::new(15.0, 21.0),
            angle: 0.5,
        });

        let mut rect = DrawingElement::new(ShapeKind::Rectangle, ElementStyle::default());
        rect.style.fill = true;
        rect.start_drawing(Point::new(0.0, 0.0));
        rect.update_pointer(Point::new(100.0, 50.0));

        Drawing::new(vec![line, rect])
    }

    #[test]
    fn test_round_trip() {
        let drawing = sample_drawing();
        let json = drawing.to_json().unwrap();
        let back = Drawing::from_json(&json).unwrap();
        // Exact modulo the 2-decimal rounding applied on write.
        let rounded = Drawing::new(drawing.elements.iter().map(|e| e.rounded()).collect());
        assert_eq!(back, rounded);
    }

    #[test]
    fn test_point_arrays_stay_inline() {
        let json = sample_drawing().to_json().unwrap();
        assert!(json.contains("[1.23, 2.0]") || json.contains("[1.23, 2]"));
        // The element list itself is pretty-printed.
        assert!(json.starts_with("[\n"));
        assert!(json.contains("  {"));
    }

    #[test]
    fn test_malformed_document_yields_empty() {
        assert!(Drawing::from_json_or_empty("{not json").is_empty());
        assert!(Drawing::from_json_or_empty("{\"elements\": 3}").is_empty());
    }

    #[test]
    fn test_empty_round_trip() {
        let json = Drawing::default().to_json().unwrap();
        assert_eq!(json.trim(), "[]");
        assert!(Drawing::from_json(&json).unwrap().is_empty());
    }

    #[test]
    fn test_svg_export_delegates() {
        let svg = sample_drawing().to_svg(Size::new(200.0, 100.0), None);
        assert!(svg.contains("viewBox=\"0 0 200 100\""));
        assert!(svg.contains("<rect"));
        assert!(svg.contains("<path"));
    }
}
