//! SVG export: per-element markup fragments and document assembly.

use crate::element::{DrawingElement, ShapeKind};
use crate::geometry::distance;
use crate::style::Color;
use kurbo::{Affine, Size};
use std::fmt::Write;

/// Assemble a standalone SVG document from an element list.
///
/// The background, when given, is painted as a full-size rect and doubles
/// as the substitute paint for eraser elements, since SVG has no clear
/// compositing.
pub fn document(elements: &[DrawingElement], size: Size, background: Option<&Color>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" viewBox=\"0 0 {} {}\">",
        fmt(size.width),
        fmt(size.height)
    );
    if let Some(bg) = background {
        let _ = writeln!(
            out,
            "  <rect width=\"100%\" height=\"100%\" fill=\"{}\"{}/>",
            bg.to_hex(),
            opacity_attr("fill-opacity", bg)
        );
    }
    for element in elements {
        let fragment = element.to_svg_fragment(background);
        if !fragment.is_empty() {
            let _ = writeln!(out, "  {}", fragment);
        }
    }
    out.push_str("</svg>\n");
    out
}

impl DrawingElement {
    /// Shape-specific SVG markup for this element.
    ///
    /// Returns an empty string when the element has too little geometry to
    /// draw anything.
    pub fn to_svg_fragment(&self, background: Option<&Color>) -> String {
        if self.points.len() < self.shape.min_points() {
            return String::new();
        }
        let body = match self.shape {
            ShapeKind::FreeDrawing | ShapeKind::Polyline | ShapeKind::Polygon => self.path_body(),
            ShapeKind::Line => self.line_body(),
            ShapeKind::Rectangle => self.rect_body(),
            ShapeKind::Ellipse => self.circle_body(),
            ShapeKind::Text => self.text_body(background),
            ShapeKind::Image => self.image_body(),
        };
        let Some(mut body) = body else {
            return String::new();
        };

        if self.shape != ShapeKind::Text && self.shape != ShapeKind::Image {
            body.push_str(&self.paint_attrs(background));
        }
        body.push_str(&self.transform_attr());
        body.push_str("/>");
        if self.shape == ShapeKind::Text {
            // Text carries its content as element body, re-open the tag.
            return self.reopen_text(body);
        }
        body
    }

    /// Stroke paint, eraser elements substituting the background color.
    fn paint_color<'a>(&'a self, background: Option<&'a Color>) -> &'a Color {
        if self.eraser {
            background.unwrap_or(&self.style.color)
        } else {
            &self.style.color
        }
    }

    fn paint_attrs(&self, background: Option<&Color>) -> String {
        let color = self.paint_color(background);
        let mut out = format!(
            " stroke=\"{}\"{} stroke-width=\"{}\" stroke-linecap=\"{}\" stroke-linejoin=\"{}\"",
            color.to_hex(),
            opacity_attr("stroke-opacity", color),
            fmt(self.style.line_width),
            self.style.line_cap.svg_name(),
            self.style.line_join.svg_name(),
        );
        if self.style.fill {
            let _ = write!(
                out,
                " fill=\"{}\"{} fill-rule=\"{}\"",
                color.to_hex(),
                opacity_attr("fill-opacity", color),
                self.style.fill_rule.svg_name()
            );
        } else {
            out.push_str(" fill=\"none\"");
        }
        if self.style.dash.active {
            let segments: Vec<String> = self
                .style
                .dash
                .segments()
                .iter()
                .map(|v| fmt(*v))
                .collect();
            let _ = write!(
                out,
                " stroke-dasharray=\"{}\" stroke-dashoffset=\"{}\"",
                segments.join(","),
                fmt(self.style.dash.offset)
            );
        }
        out
    }

    fn transform_attr(&self) -> String {
        let affine = self.transform_affine();
        if affine == Affine::IDENTITY {
            return String::new();
        }
        let [a, b, c, d, e, f] = affine.as_coeffs();
        format!(
            " transform=\"matrix({},{},{},{},{},{})\"",
            fmt(a),
            fmt(b),
            fmt(c),
            fmt(d),
            fmt(e),
            fmt(f)
        )
    }

    fn path_body(&self) -> Option<String> {
        let (&first, rest) = self.points.split_first()?;
        let mut d = format!("M {} {}", fmt(first.x), fmt(first.y));
        for p in rest {
            let _ = write!(d, " L {} {}", fmt(p.x), fmt(p.y));
        }
        if self.shape == ShapeKind::Polygon {
            d.push_str(" Z");
        }
        Some(format!("<path d=\"{}\"", d))
    }

    fn line_body(&self) -> Option<String> {
        match self.points.as_slice() {
            [a, b] => Some(format!(
                "<path d=\"M {} {} L {} {}\"",
                fmt(a.x),
                fmt(a.y),
                fmt(b.x),
                fmt(b.y)
            )),
            [a, b, c] => Some(format!(
                "<path d=\"M {} {} Q {} {} {} {}\"",
                fmt(a.x),
                fmt(a.y),
                fmt(c.x),
                fmt(c.y),
                fmt(b.x),
                fmt(b.y)
            )),
            _ => None,
        }
    }

    fn rect_body(&self) -> Option<String> {
        let rect = self.corner_rect()?;
        Some(format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
            fmt(rect.x0),
            fmt(rect.y0),
            fmt(rect.width()),
            fmt(rect.height())
        ))
    }

    fn circle_body(&self) -> Option<String> {
        let center = *self.points.first()?;
        let edge = *self.points.get(1)?;
        Some(format!(
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"",
            fmt(center.x),
            fmt(center.y),
            fmt(distance(center, edge))
        ))
    }

    fn text_body(&self, background: Option<&Color>) -> Option<String> {
        let payload = self.text.as_ref()?;
        let color = self.paint_color(background);
        let anchor = self.text_anchor();
        let mut attrs = String::new();
        if payload.font.weight != crate::style::FontWeight::Normal {
            let _ = write!(attrs, " font-weight=\"{}\"", payload.font.weight.svg_name());
        }
        if payload.font.style != crate::style::FontStyle::Normal {
            let _ = write!(attrs, " font-style=\"{}\"", payload.font.style.svg_name());
        }
        if payload.font.right_aligned {
            attrs.push_str(" text-anchor=\"end\"");
        }
        Some(format!(
            "<text x=\"{}\" y=\"{}\" font-size=\"{}\" font-family=\"{}\"{} fill=\"{}\"{}",
            fmt(anchor.x),
            fmt(anchor.y),
            fmt(self.font_size()),
            escape(&payload.font.family),
            attrs,
            color.to_hex(),
            opacity_attr("fill-opacity", color),
        ))
    }

    fn reopen_text(&self, mut open_tag: String) -> String {
        let content = self
            .text
            .as_ref()
            .map(|t| escape(&t.content))
            .unwrap_or_default();
        // Swap the self-closing tail for real element content.
        open_tag.truncate(open_tag.len() - 2);
        format!("{}>{}</text>", open_tag, content)
    }

    fn image_body(&self) -> Option<String> {
        let payload = self.image.as_ref()?;
        let rect = self.corner_rect()?;
        Some(format!(
            "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" xlink:href=\"data:{};base64,{}\"",
            fmt(rect.x0),
            fmt(rect.y0),
            fmt(rect.width()),
            fmt(rect.height()),
            payload.format.mime_type(),
            payload.data_base64
        ))
    }
}

/// Two-decimal coordinate formatting, trailing zeros trimmed.
fn fmt(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    // -0.0 prints as "-0" otherwise.
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{}", rounded)
}

fn opacity_attr(attr: &str, color: &Color) -> String {
    if color.a == u8::MAX {
        String::new()
    } else {
        format!(" {}=\"{}\"", attr, fmt(f64::from(color.a) / 255.0))
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
