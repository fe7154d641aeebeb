//! ScreenInk Core Library
//!
//! Platform-agnostic model and interaction logic for the ScreenInk
//! screen-annotation overlay: the drawing-element stack, the pointer
//! driven interaction state machine, the transformation engine, and the
//! JSON/SVG document codecs.

pub mod document;
pub mod element;
pub mod geometry;
pub mod palette;
pub mod render;
pub mod session;
pub mod storage;
pub mod style;
pub mod svg;
pub mod tools;
pub mod transform;

pub use document::Drawing;
pub use element::{DrawingElement, ImageFormat, ImagePayload, ShapeKind, TextPayload};
pub use palette::Palette;
pub use render::{CompositeOp, RecordingBackend, RenderBackend};
pub use session::{
    DrawingSession, EventSink, KeyInput, Notification, SessionConfig, SessionState, Viewport,
    BLINK_INTERVAL, MIN_DRAG_DISTANCE,
};
pub use storage::{MemoryStorage, Storage, StorageError, StorageResult};
pub use style::{
    Color, DashPattern, ElementStyle, FillRule, FontDescriptor, FontStyle, FontWeight, LineCap,
    LineJoin,
};
pub use tools::ToolKind;
pub use transform::{TransformKind, TransformSession, Transformation};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
