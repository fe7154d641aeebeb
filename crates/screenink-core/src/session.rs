//! Session-level interaction: tools, the element stack and the pointer
//! driven state machine that creates, edits and commits elements.

use crate::element::{DrawingElement, ImagePayload, ShapeKind, TextPayload};
use crate::render::RenderBackend;
use crate::style::{Color, ElementStyle, FontDescriptor};
use crate::tools::ToolKind;
use crate::transform::TransformSession;
use kurbo::{Point, Vec2};
use log::debug;
use std::time::Duration;

/// Drags shorter than this are treated as accidental and discarded.
pub const MIN_DRAG_DISTANCE: f64 = 3.0;

/// Hit-test slack when grabbing an element, in drawing units.
const GRAB_TOLERANCE: f64 = 4.0;

/// Default cursor blink interval while writing text.
pub const BLINK_INTERVAL: Duration = Duration::from_millis(600);

/// Mapping between host screen coordinates and local drawing coordinates.
/// The host overlay may be scaled or offset, so the identity mapping is
/// never assumed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub offset: Vec2,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn to_local(&self, screen: Point) -> Point {
        ((screen.to_vec2() - self.offset) / self.scale).to_point()
    }

    pub fn to_screen(&self, local: Point) -> Point {
        (local.to_vec2() * self.scale + self.offset).to_point()
    }
}

/// Mutable session configuration, consumed when a new element is
/// instantiated. Updated through explicit setters on the session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub tool: ToolKind,
    pub style: ElementStyle,
    pub font: FontDescriptor,
    /// Draw with the clear operator instead of painting.
    pub eraser: bool,
    /// Corner-cut freehand samples as they arrive.
    pub live_smoothing: bool,
    pub min_drag: f64,
    pub blink_interval: Duration,
    /// Backdrop used by the SVG exporter and as eraser substitute paint.
    pub background: Option<Color>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tool: ToolKind::default(),
            style: ElementStyle::default(),
            font: FontDescriptor::default(),
            eraser: false,
            live_smoothing: false,
            min_drag: MIN_DRAG_DISTANCE,
            blink_interval: BLINK_INTERVAL,
            background: None,
        }
    }
}

/// Transient on-screen feedback event.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub icon: &'static str,
    pub text: String,
    pub secondary_text: Option<String>,
    /// A level (0..=1) or width for gauge-style displays.
    pub level: Option<f64>,
    pub long: bool,
}

impl Notification {
    pub fn brief(icon: &'static str, text: impl Into<String>) -> Self {
        Self {
            icon,
            text: text.into(),
            secondary_text: None,
            level: None,
            long: false,
        }
    }
}

/// Observer interface through which the session surfaces side effects.
/// The session never paints or presents anything itself.
pub trait EventSink {
    /// The model changed; the surface should repaint.
    fn request_redraw(&mut self);
    /// Transient user feedback (tool change, undo, export result...).
    fn notify(&mut self, event: &Notification);
}

/// Where the session currently is in an interaction life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// A new element is under pointer construction.
    Drawing,
    /// A text element is capturing keyboard input.
    Writing,
    /// An existing element is grabbed by a transform gesture.
    Transforming,
}

/// Keyboard input relevant to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Enter,
    /// Split the text being written onto a new line.
    NewLine,
    Escape,
}

/// One overlay activation: the committed element stack, the undo stack,
/// the element in progress and the active tool/style.
pub struct DrawingSession {
    config: SessionConfig,
    state: SessionState,
    elements: Vec<DrawingElement>,
    undone: Vec<DrawingElement>,
    current: Option<DrawingElement>,
    transform: Option<TransformSession>,
    grabbed: Option<usize>,
    /// First click of the two-phase mirror gesture.
    mirror_anchor: Option<Point>,
    /// Payload the next Image gesture will place.
    pending_image: Option<ImagePayload>,
    modifier_down: bool,
    cursor_visible: bool,
    /// Set whenever the cursor is forced visible; the host consumes it
    /// through `take_blink_restart` to re-phase its blink timer.
    blink_restart: bool,
    sink: Box<dyn EventSink>,
}

impl DrawingSession {
    pub fn new(config: SessionConfig, sink: Box<dyn EventSink>) -> Self {
        Self {
            config,
            state: SessionState::Idle,
            elements: Vec::new(),
            undone: Vec::new(),
            current: None,
            transform: None,
            grabbed: None,
            mirror_anchor: None,
            pending_image: None,
            modifier_down: false,
            cursor_visible: false,
            blink_restart: false,
            sink,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn elements(&self) -> &[DrawingElement] {
        &self.elements
    }

    /// Element currently being drawn or written, if any.
    pub fn current(&self) -> Option<&DrawingElement> {
        self.current.as_ref()
    }

    /// Replace the committed stack, e.g. when hydrating from a persisted
    /// document. Clears any in-progress work.
    pub fn replace_elements(&mut self, elements: Vec<DrawingElement>) {
        self.force_stop();
        self.elements = elements;
        self.undone.clear();
        self.sink.request_redraw();
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.force_stop();
        self.config.tool = tool;
        self.mirror_anchor = None;
        self.sink
            .notify(&Notification::brief("tool-symbolic", tool.display_name()));
        self.sink.request_redraw();
    }

    pub fn set_style(&mut self, style: ElementStyle) {
        self.config.style = style;
    }

    pub fn set_color(&mut self, color: Color) {
        let name = color.display_name();
        self.config.style.color = color;
        self.sink
            .notify(&Notification::brief("color-symbolic", name));
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.config.style.line_width = width.max(0.0);
        let mut event = Notification::brief("width-symbolic", format!("{} px", width));
        event.level = Some(width);
        self.sink.notify(&event);
    }

    pub fn set_font(&mut self, font: FontDescriptor) {
        self.config.font = font;
    }

    pub fn set_eraser(&mut self, eraser: bool) {
        self.config.eraser = eraser;
        self.sink.notify(&Notification::brief(
            "eraser-symbolic",
            if eraser { "Eraser on" } else { "Eraser off" },
        ));
    }

    pub fn set_live_smoothing(&mut self, smoothing: bool) {
        self.config.live_smoothing = smoothing;
    }

    pub fn set_background(&mut self, background: Option<Color>) {
        self.config.background = background;
        self.sink.request_redraw();
    }

    /// Stage an image for the next Image-tool gesture.
    pub fn set_pending_image(&mut self, image: ImagePayload) {
        self.pending_image = Some(image);
    }

    // -- pointer protocol ---------------------------------------------------

    pub fn pointer_down(&mut self, point: Point, modifier: bool) {
        self.modifier_down = modifier;
        match self.state {
            SessionState::Writing => {
                // Focus loss commits whatever was written, then the press
                // is handled from Idle.
                self.commit_text();
                self.pointer_down(point, modifier);
            }
            SessionState::Drawing => {
                if self.config.tool.is_multi_click() {
                    if let Some(current) = self.current.as_mut() {
                        current.add_vertex();
                        current.update_pointer(point);
                        self.sink.request_redraw();
                    }
                }
            }
            SessionState::Transforming => {}
            SessionState::Idle => {
                if self.config.tool.is_drawing() {
                    self.begin_drawing(point);
                } else {
                    self.begin_transform(point, modifier);
                }
            }
        }
    }

    pub fn pointer_move(&mut self, point: Point, modifier: bool) {
        match self.state {
            SessionState::Drawing => {
                if let Some(current) = self.current.as_mut() {
                    current.update_pointer(point);
                    if current.shape == ShapeKind::FreeDrawing && self.config.live_smoothing {
                        current.smooth_latest();
                    }
                    self.sink.request_redraw();
                }
            }
            SessionState::Transforming => {
                let (Some(session), Some(index)) = (self.transform.as_mut(), self.grabbed)
                else {
                    return;
                };
                let element = &mut self.elements[index];
                if modifier != self.modifier_down {
                    session.switch_kind(element, point);
                    self.modifier_down = modifier;
                } else {
                    session.update(element, point);
                }
                self.sink.request_redraw();
            }
            SessionState::Idle | SessionState::Writing => {}
        }
    }

    pub fn pointer_up(&mut self, point: Point) {
        match self.state {
            SessionState::Drawing => {
                if self.config.tool.is_multi_click() {
                    // Vertices are committed by subsequent presses; the
                    // gesture ends through `finish_gesture`.
                    self.sink.request_redraw();
                    return;
                }
                if let Some(current) = self.current.as_mut() {
                    current.update_pointer(point);
                }
                if self.config.tool == ToolKind::Text {
                    self.enter_writing();
                } else {
                    self.commit_current();
                }
            }
            SessionState::Transforming => self.finish_transform(),
            SessionState::Idle | SessionState::Writing => {}
        }
    }

    /// Commit the tentative vertex of the element in progress. For a
    /// straight line this opens the curve control point.
    pub fn add_vertex(&mut self) {
        if self.state != SessionState::Drawing {
            return;
        }
        if let Some(current) = self.current.as_mut() {
            current.add_vertex();
            self.sink.request_redraw();
        }
    }

    /// End a multi-click gesture (polygon/polyline) and commit the result.
    pub fn finish_gesture(&mut self) {
        if self.state != SessionState::Drawing {
            return;
        }
        if let Some(current) = self.current.as_mut() {
            // Drop the trailing tentative vertex when it never moved off
            // its committed twin.
            if current.points.len() >= 2
                && current.points[current.points.len() - 1]
                    == current.points[current.points.len() - 2]
            {
                current.points.pop();
            }
        }
        self.commit_current();
    }

    // -- keyboard protocol --------------------------------------------------

    pub fn key_input(&mut self, key: KeyInput) {
        match self.state {
            SessionState::Writing => self.writing_key(key),
            SessionState::Drawing => match key {
                KeyInput::Escape => self.abort_current(),
                KeyInput::Enter => {
                    if self.config.tool.is_multi_click() {
                        self.finish_gesture();
                    } else {
                        self.commit_current();
                    }
                }
                _ => {}
            },
            SessionState::Transforming => {
                if key == KeyInput::Escape {
                    self.abort_transform();
                }
            }
            SessionState::Idle => {
                if key == KeyInput::Escape {
                    self.mirror_anchor = None;
                    self.sink.request_redraw();
                }
            }
        }
    }

    fn writing_key(&mut self, key: KeyInput) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        let Some(text) = current.text.as_mut() else {
            return;
        };
        match key {
            KeyInput::Char(c) => {
                let at = byte_index(&text.content, text.cursor);
                text.content.insert(at, c);
                text.cursor += 1;
            }
            KeyInput::Backspace => {
                if text.cursor > 0 {
                    text.cursor -= 1;
                    let at = byte_index(&text.content, text.cursor);
                    text.content.remove(at);
                }
            }
            KeyInput::Delete => {
                if text.cursor < text.content.chars().count() {
                    let at = byte_index(&text.content, text.cursor);
                    text.content.remove(at);
                }
            }
            KeyInput::Left => text.cursor = text.cursor.saturating_sub(1),
            KeyInput::Right => {
                text.cursor = (text.cursor + 1).min(text.content.chars().count());
            }
            KeyInput::Enter | KeyInput::Escape => {
                self.commit_text();
                return;
            }
            KeyInput::NewLine => {
                self.new_line();
                return;
            }
        }
        // Typing restarts the blink cycle with the cursor shown.
        self.show_cursor();
    }

    // -- stack operations ---------------------------------------------------

    /// Pop the last committed element onto the redo stack.
    pub fn undo(&mut self) {
        if let Some(element) = self.elements.pop() {
            self.undone.push(element);
            self.sink.notify(&Notification::brief("undo-symbolic", "Undo"));
            self.sink.request_redraw();
        }
    }

    /// Replay the most recently undone element.
    pub fn redo(&mut self) {
        if let Some(element) = self.undone.pop() {
            self.elements.push(element);
            self.sink.notify(&Notification::brief("redo-symbolic", "Redo"));
            self.sink.request_redraw();
        }
    }

    /// Clear the drawing and its history.
    pub fn erase(&mut self) {
        self.force_stop();
        self.elements.clear();
        self.undone.clear();
        self.sink
            .notify(&Notification::brief("erase-symbolic", "Erased"));
        self.sink.request_redraw();
    }

    /// Corner-cut the most recently committed stroke.
    pub fn smooth_last(&mut self) {
        if let Some(element) = self.elements.last_mut() {
            element.smooth_all();
            self.sink
                .notify(&Notification::brief("smooth-symbolic", "Smoothed"));
            self.sink.request_redraw();
        }
    }

    // -- cursor blink -------------------------------------------------------

    /// Whether the host should be running the blink timer.
    pub fn blink_active(&self) -> bool {
        self.state == SessionState::Writing
    }

    /// True once after every point where the cursor was forced visible
    /// (entering writing, typing, a new line). The host restarts its
    /// blink timer phase so the cursor does not blink off mid-typing.
    pub fn take_blink_restart(&mut self) -> bool {
        std::mem::take(&mut self.blink_restart)
    }

    fn show_cursor(&mut self) {
        self.cursor_visible = true;
        self.blink_restart = true;
        self.sink.request_redraw();
    }

    /// Timer tick: toggle cursor visibility.
    pub fn tick_blink(&mut self) {
        if self.state == SessionState::Writing {
            self.cursor_visible = !self.cursor_visible;
            self.sink.request_redraw();
        }
    }

    // -- life cycle ---------------------------------------------------------

    /// Forcibly end any live gesture, e.g. when the overlay is hidden.
    /// Committable work is committed, the rest discarded; no dangling
    /// gesture survives.
    pub fn force_stop(&mut self) {
        match self.state {
            SessionState::Idle => {}
            SessionState::Drawing => {
                debug!("force stop: ending drawing gesture");
                self.commit_current();
            }
            SessionState::Writing => {
                debug!("force stop: committing text");
                self.commit_text();
            }
            SessionState::Transforming => {
                debug!("force stop: ending transform gesture");
                self.finish_transform();
            }
        }
        self.mirror_anchor = None;
        self.state = SessionState::Idle;
    }

    /// Replay the whole drawing into a backend. Pure read.
    pub fn render(&self, backend: &mut dyn RenderBackend) {
        for element in &self.elements {
            element.render(backend);
        }
        if let Some(current) = &self.current {
            let show_cursor = self.state == SessionState::Writing && self.cursor_visible;
            current.render_with_cursor(backend, show_cursor);
        }
    }

    // -- internals ----------------------------------------------------------

    fn begin_drawing(&mut self, point: Point) {
        let Some(shape) = self.config.tool.shape() else {
            return;
        };
        let mut element = DrawingElement::new(shape, self.config.style.clone());
        element.eraser = self.config.eraser;
        match shape {
            ShapeKind::Text => {
                element = element.with_text(TextPayload::new(self.config.font.clone()));
            }
            ShapeKind::Image => {
                let Some(image) = self.pending_image.clone() else {
                    self.sink.notify(&Notification::brief(
                        "image-symbolic",
                        "No image to insert",
                    ));
                    return;
                };
                element = element.with_image(image);
            }
            _ => {}
        }
        element.start_drawing(point);
        self.current = Some(element);
        self.state = SessionState::Drawing;
        self.sink.request_redraw();
    }

    fn begin_transform(&mut self, point: Point, modifier: bool) {
        let Some(base_kind) = self.config.tool.transform_kind() else {
            return;
        };

        // Mirror is two-phase: the first press locks the axis point, only
        // the second grabs an element.
        if self.config.tool == ToolKind::Mirror && self.mirror_anchor.is_none() {
            self.mirror_anchor = Some(point);
            self.sink
                .notify(&Notification::brief("mirror-symbolic", "Mirror axis set"));
            self.sink.request_redraw();
            return;
        }

        let Some(index) = self.hit_element(point) else {
            return;
        };
        let kind = if modifier {
            base_kind.modifier_alternate()
        } else {
            base_kind
        };
        let element = &mut self.elements[index];
        let session = match self.mirror_anchor.take() {
            Some(anchor) => TransformSession::start_anchored(element, point, kind, anchor),
            None => TransformSession::start(element, point, kind),
        };
        self.transform = Some(session);
        self.grabbed = Some(index);
        self.state = SessionState::Transforming;
        self.sink.request_redraw();
    }

    fn finish_transform(&mut self) {
        if let (Some(session), Some(index)) = (self.transform.take(), self.grabbed.take()) {
            session.stop(&mut self.elements[index]);
        }
        // Transforms mutate in place; the redo stack stays intact.
        self.state = SessionState::Idle;
        self.sink.request_redraw();
    }

    fn abort_transform(&mut self) {
        if let (Some(_), Some(index)) = (self.transform.take(), self.grabbed.take()) {
            self.elements[index].transformations.pop();
        }
        self.state = SessionState::Idle;
        self.sink.request_redraw();
    }

    fn enter_writing(&mut self) {
        let committable = self
            .current
            .as_ref()
            .map(|e| e.points.len() >= 2 && e.drag_distance() > self.config.min_drag)
            .unwrap_or(false);
        if committable {
            self.state = SessionState::Writing;
            self.show_cursor();
        } else {
            self.abort_current();
        }
    }

    fn commit_current(&mut self) {
        self.state = SessionState::Idle;
        let Some(element) = self.current.take() else {
            return;
        };
        if element.is_committable(self.config.min_drag) {
            debug!("commit {:?} element", element.shape);
            self.elements.push(element);
            // New commits invalidate the redo history.
            self.undone.clear();
        }
        self.sink.request_redraw();
    }

    fn commit_text(&mut self) {
        self.state = SessionState::Idle;
        let Some(element) = self.current.take() else {
            return;
        };
        if element.is_committable(self.config.min_drag) {
            self.elements.push(element);
            self.undone.clear();
        }
        self.sink.request_redraw();
    }

    /// Commit the current line and continue writing one line below, keeping
    /// the lineage index so split lines stay related.
    fn new_line(&mut self) {
        let Some(element) = self.current.take() else {
            self.state = SessionState::Idle;
            return;
        };
        let line_height = element.font_size();
        let mut next = element.clone();
        next.id = uuid::Uuid::new_v4();
        next.transformations.clear();
        for p in &mut next.points {
            p.y += line_height;
        }
        if let Some(text) = next.text.as_mut() {
            text.content.clear();
            text.cursor = 0;
            text.line_index += 1;
        }

        if element.is_committable(self.config.min_drag) {
            self.elements.push(element);
            self.undone.clear();
        }
        self.current = Some(next);
        self.show_cursor();
    }

    fn abort_current(&mut self) {
        self.current = None;
        self.state = SessionState::Idle;
        self.sink.request_redraw();
    }

    fn hit_element(&self, point: Point) -> Option<usize> {
        self.elements
            .iter()
            .enumerate()
            .rev()
            .find(|(_, e)| e.contains_point(point, GRAB_TOLERANCE))
            .map(|(i, _)| i)
    }
}

/// Byte offset of the `cursor`-th character.
fn byte_index(s: &str, cursor: usize) -> usize {
    s.char_indices()
        .nth(cursor)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transformation;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct SinkLog {
        redraws: usize,
        notes: Vec<Notification>,
    }

    #[derive(Clone, Default)]
    struct TestSink(Rc<RefCell<SinkLog>>);

    impl EventSink for TestSink {
        fn request_redraw(&mut self) {
            self.0.borrow_mut().redraws += 1;
        }

        fn notify(&mut self, event: &Notification) {
            self.0.borrow_mut().notes.push(event.clone());
        }
    }

    fn session_with(tool: ToolKind) -> (DrawingSession, TestSink) {
        let sink = TestSink::default();
        let mut config = SessionConfig::default();
        config.tool = tool;
        let session = DrawingSession::new(config, Box::new(sink.clone()));
        (session, sink)
    }

    fn drag(session: &mut DrawingSession, from: Point, to: Point) {
        session.pointer_down(from, false);
        session.pointer_move(to, false);
        session.pointer_up(to);
    }

    #[test]
    fn test_draw_commit_flow() {
        let (mut session, sink) = session_with(ToolKind::Rectangle);
        drag(
            &mut session,
            Point::new(10.0, 10.0),
            Point::new(60.0, 40.0),
        );
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.elements().len(), 1);
        assert!(sink.0.borrow().redraws > 0);
    }

    #[test]
    fn test_tiny_drag_discarded() {
        let (mut session, _) = session_with(ToolKind::Rectangle);
        drag(
            &mut session,
            Point::new(10.0, 10.0),
            Point::new(11.0, 11.0),
        );
        assert!(session.elements().is_empty());
    }

    #[test]
    fn test_undo_redo_inverse() {
        let (mut session, _) = session_with(ToolKind::Pen);
        drag(&mut session, Point::new(0.0, 0.0), Point::new(20.0, 0.0));
        drag(&mut session, Point::new(0.0, 10.0), Point::new(20.0, 10.0));
        let before = session.elements().to_vec();

        session.undo();
        assert_eq!(session.elements().len(), 1);
        session.redo();
        assert_eq!(session.elements(), &before[..]);
    }

    #[test]
    fn test_commit_clears_redo_history() {
        let (mut session, _) = session_with(ToolKind::Pen);
        drag(&mut session, Point::new(0.0, 0.0), Point::new(20.0, 0.0));
        session.undo();
        drag(&mut session, Point::new(0.0, 10.0), Point::new(20.0, 10.0));
        session.redo();
        // The undone stroke was invalidated by the new commit.
        assert_eq!(session.elements().len(), 1);
    }

    #[test]
    fn test_transform_keeps_redo_history() {
        let (mut session, _) = session_with(ToolKind::Rectangle);
        drag(&mut session, Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        drag(
            &mut session,
            Point::new(100.0, 100.0),
            Point::new(150.0, 150.0),
        );
        session.undo();

        session.set_tool(ToolKind::Move);
        session.pointer_down(Point::new(25.0, 25.0), false);
        assert_eq!(session.state(), SessionState::Transforming);
        session.pointer_move(Point::new(40.0, 25.0), false);
        session.pointer_up(Point::new(40.0, 25.0));

        session.redo();
        assert_eq!(session.elements().len(), 2);
    }

    #[test]
    fn test_move_gesture_translates_element() {
        let (mut session, _) = session_with(ToolKind::Rectangle);
        drag(&mut session, Point::new(0.0, 0.0), Point::new(50.0, 50.0));

        session.set_tool(ToolKind::Move);
        session.pointer_down(Point::new(25.0, 25.0), false);
        session.pointer_move(Point::new(55.0, 45.0), false);
        session.pointer_up(Point::new(55.0, 45.0));

        assert_eq!(
            session.elements()[0].transformations,
            vec![Transformation::Translation { dx: 30.0, dy: 20.0 }]
        );
    }

    #[test]
    fn test_modifier_switches_kind_mid_gesture() {
        let (mut session, _) = session_with(ToolKind::Rectangle);
        drag(&mut session, Point::new(0.0, 0.0), Point::new(50.0, 50.0));

        session.set_tool(ToolKind::Move);
        session.pointer_down(Point::new(25.0, 25.0), false);
        session.pointer_move(Point::new(40.0, 25.0), false);
        session.pointer_move(Point::new(40.0, 40.0), true);
        session.pointer_move(Point::new(10.0, 40.0), true);
        session.pointer_up(Point::new(10.0, 40.0));

        let transformations = &session.elements()[0].transformations;
        assert_eq!(transformations.len(), 1);
        assert!(matches!(transformations[0], Transformation::Rotation { .. }));
    }

    #[test]
    fn test_mirror_two_phase() {
        let (mut session, sink) = session_with(ToolKind::Rectangle);
        drag(&mut session, Point::new(0.0, 0.0), Point::new(50.0, 50.0));

        session.set_tool(ToolKind::Mirror);
        // First press locks the axis point, no element grabbed yet.
        session.pointer_down(Point::new(80.0, 25.0), false);
        session.pointer_up(Point::new(80.0, 25.0));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.elements()[0].transformations.is_empty());

        session.pointer_down(Point::new(25.0, 25.0), false);
        assert_eq!(session.state(), SessionState::Transforming);
        session.pointer_move(Point::new(80.0, 60.0), false);
        session.pointer_up(Point::new(80.0, 60.0));

        match session.elements()[0].transformations[0] {
            Transformation::Reflection { center, .. } => {
                assert_eq!(center, Point::new(80.0, 25.0));
            }
            ref other => panic!("expected reflection, got {:?}", other),
        }
        assert!(sink
            .0
            .borrow()
            .notes
            .iter()
            .any(|n| n.text == "Mirror axis set"));
    }

    #[test]
    fn test_polygon_multi_click() {
        let (mut session, _) = session_with(ToolKind::Polygon);
        session.pointer_down(Point::new(0.0, 0.0), false);
        session.pointer_move(Point::new(50.0, 0.0), false);
        session.pointer_up(Point::new(50.0, 0.0));
        assert_eq!(session.state(), SessionState::Drawing);

        session.pointer_down(Point::new(50.0, 0.0), false);
        session.pointer_move(Point::new(50.0, 50.0), false);
        session.pointer_up(Point::new(50.0, 50.0));
        session.finish_gesture();

        assert_eq!(session.elements().len(), 1);
        assert_eq!(session.elements()[0].points.len(), 3);
    }

    #[test]
    fn test_text_writing_flow() {
        let (mut session, _) = session_with(ToolKind::Text);
        session.pointer_down(Point::new(10.0, 10.0), false);
        session.pointer_move(Point::new(10.0, 40.0), false);
        session.pointer_up(Point::new(10.0, 40.0));
        assert_eq!(session.state(), SessionState::Writing);

        for c in "hello".chars() {
            session.key_input(KeyInput::Char(c));
        }
        session.key_input(KeyInput::Enter);

        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.elements().len(), 1);
        assert_eq!(
            session.elements()[0].text.as_ref().unwrap().content,
            "hello"
        );
    }

    #[test]
    fn test_empty_text_discarded() {
        let (mut session, _) = session_with(ToolKind::Text);
        session.pointer_down(Point::new(10.0, 10.0), false);
        session.pointer_move(Point::new(10.0, 40.0), false);
        session.pointer_up(Point::new(10.0, 40.0));
        session.key_input(KeyInput::Enter);
        assert!(session.elements().is_empty());
    }

    #[test]
    fn test_new_line_lineage() {
        let (mut session, _) = session_with(ToolKind::Text);
        session.pointer_down(Point::new(10.0, 10.0), false);
        session.pointer_move(Point::new(10.0, 40.0), false);
        session.pointer_up(Point::new(10.0, 40.0));

        session.key_input(KeyInput::Char('a'));
        session.key_input(KeyInput::NewLine);
        assert_eq!(session.state(), SessionState::Writing);
        session.key_input(KeyInput::Char('b'));
        session.key_input(KeyInput::Enter);

        assert_eq!(session.elements().len(), 2);
        let first = session.elements()[0].text.as_ref().unwrap();
        let second = session.elements()[1].text.as_ref().unwrap();
        assert_eq!(first.line_index, 0);
        assert_eq!(second.line_index, 1);
        // The second line sits one line height below the first.
        let offset = session.elements()[1].points[0].y - session.elements()[0].points[0].y;
        assert!((offset - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_cursor_editing() {
        let (mut session, _) = session_with(ToolKind::Text);
        session.pointer_down(Point::new(10.0, 10.0), false);
        session.pointer_move(Point::new(10.0, 40.0), false);
        session.pointer_up(Point::new(10.0, 40.0));

        for c in "ac".chars() {
            session.key_input(KeyInput::Char(c));
        }
        session.key_input(KeyInput::Left);
        session.key_input(KeyInput::Char('b'));
        session.key_input(KeyInput::Enter);

        assert_eq!(session.elements()[0].text.as_ref().unwrap().content, "abc");
    }

    #[test]
    fn test_escape_aborts_drawing() {
        let (mut session, _) = session_with(ToolKind::Rectangle);
        session.pointer_down(Point::new(10.0, 10.0), false);
        session.pointer_move(Point::new(60.0, 40.0), false);
        session.key_input(KeyInput::Escape);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.elements().is_empty());
    }

    #[test]
    fn test_escape_commits_written_text() {
        let (mut session, _) = session_with(ToolKind::Text);
        session.pointer_down(Point::new(10.0, 10.0), false);
        session.pointer_move(Point::new(10.0, 40.0), false);
        session.pointer_up(Point::new(10.0, 40.0));
        session.key_input(KeyInput::Char('x'));
        session.key_input(KeyInput::Escape);
        assert_eq!(session.elements().len(), 1);
    }

    #[test]
    fn test_typing_restarts_blink_phase() {
        let (mut session, _) = session_with(ToolKind::Text);
        session.pointer_down(Point::new(10.0, 10.0), false);
        session.pointer_move(Point::new(10.0, 40.0), false);
        session.pointer_up(Point::new(10.0, 40.0));
        // Entering writing shows the cursor and flags a timer restart.
        assert!(session.take_blink_restart());
        assert!(!session.take_blink_restart());

        // A tick may have just hidden the cursor when a key arrives.
        session.tick_blink();
        session.key_input(KeyInput::Char('a'));
        assert!(session.take_blink_restart());

        session.key_input(KeyInput::NewLine);
        assert!(session.take_blink_restart());
    }

    #[test]
    fn test_blink_only_while_writing() {
        let (mut session, sink) = session_with(ToolKind::Pen);
        assert!(!session.blink_active());
        let before = sink.0.borrow().redraws;
        session.tick_blink();
        assert_eq!(sink.0.borrow().redraws, before);
    }

    #[test]
    fn test_force_stop_cancels_gesture() {
        let (mut session, _) = session_with(ToolKind::Rectangle);
        session.pointer_down(Point::new(10.0, 10.0), false);
        session.pointer_move(Point::new(60.0, 40.0), false);
        session.force_stop();
        assert_eq!(session.state(), SessionState::Idle);
        // The committable drag was preserved rather than lost.
        assert_eq!(session.elements().len(), 1);
    }

    #[test]
    fn test_erase_clears_everything() {
        let (mut session, _) = session_with(ToolKind::Pen);
        drag(&mut session, Point::new(0.0, 0.0), Point::new(20.0, 0.0));
        session.undo();
        drag(&mut session, Point::new(0.0, 5.0), Point::new(20.0, 5.0));
        session.erase();
        assert!(session.elements().is_empty());
        session.redo();
        assert!(session.elements().is_empty());
    }

    #[test]
    fn test_viewport_round_trip() {
        let viewport = Viewport {
            offset: Vec2::new(10.0, -4.0),
            scale: 2.0,
        };
        let screen = Point::new(30.0, 16.0);
        let local = viewport.to_local(screen);
        assert_eq!(viewport.to_screen(local), screen);
    }
}
