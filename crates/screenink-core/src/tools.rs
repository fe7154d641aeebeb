//! The tool palette: what pointer gestures create or edit.

use crate::element::ShapeKind;
use crate::transform::TransformKind;
use serde::{Deserialize, Serialize};

/// Active mode determining what a pointer gesture does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolKind {
    Pen,
    Line,
    Ellipse,
    Rectangle,
    Text,
    Polygon,
    Polyline,
    Image,
    /// Translate (modifier: rotate) an existing element.
    Move,
    /// Scale (modifier: stretch) an existing element.
    Resize,
    /// Reflect (modifier: invert) an existing element across a locked axis.
    Mirror,
}

impl ToolKind {
    /// The shape a drawing tool instantiates, `None` for manipulation tools.
    pub fn shape(&self) -> Option<ShapeKind> {
        match self {
            ToolKind::Pen => Some(ShapeKind::FreeDrawing),
            ToolKind::Line => Some(ShapeKind::Line),
            ToolKind::Ellipse => Some(ShapeKind::Ellipse),
            ToolKind::Rectangle => Some(ShapeKind::Rectangle),
            ToolKind::Text => Some(ShapeKind::Text),
            ToolKind::Polygon => Some(ShapeKind::Polygon),
            ToolKind::Polyline => Some(ShapeKind::Polyline),
            ToolKind::Image => Some(ShapeKind::Image),
            ToolKind::Move | ToolKind::Resize | ToolKind::Mirror => None,
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.shape().is_some()
    }

    /// The transform kind a manipulation tool starts with (before any
    /// modifier toggle).
    pub fn transform_kind(&self) -> Option<TransformKind> {
        match self {
            ToolKind::Move => Some(TransformKind::Translation),
            ToolKind::Resize => Some(TransformKind::Scale),
            ToolKind::Mirror => Some(TransformKind::Reflection),
            _ => None,
        }
    }

    /// Whether the tool builds vertex-by-vertex with repeated clicks.
    pub fn is_multi_click(&self) -> bool {
        matches!(self, ToolKind::Polygon | ToolKind::Polyline)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ToolKind::Pen => "Pen",
            ToolKind::Line => "Line",
            ToolKind::Ellipse => "Ellipse",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Text => "Text",
            ToolKind::Polygon => "Polygon",
            ToolKind::Polyline => "Polyline",
            ToolKind::Image => "Image",
            ToolKind::Move => "Move",
            ToolKind::Resize => "Resize",
            ToolKind::Mirror => "Mirror",
        }
    }
}

impl Default for ToolKind {
    fn default() -> Self {
        ToolKind::Pen
    }
}
