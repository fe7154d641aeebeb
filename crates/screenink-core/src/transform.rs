//! Geometric transformations applied to elements, and the gesture engine
//! that drives them.
//!
//! Every applied edit is stored as a [`Transformation`] record on the
//! element and replayed at render time. The history is append/pop only:
//! switching the kind of a live gesture replaces the last record, it never
//! mutates the tag in place.

use crate::element::DrawingElement;
use crate::geometry::{angle_between, direction_angle, scale_ratio};
use kurbo::{Affine, Point};
use serde::{Deserialize, Serialize};

/// One applied geometric edit, replayed in order at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transformation {
    /// Slide by a fixed offset.
    Translation { dx: f64, dy: f64 },
    /// Rotate around a center.
    Rotation { center: Point, angle: f64 },
    /// Uniform scale about a center (aspect ratio preserved).
    Scale { center: Point, ratio: f64 },
    /// Scale along one axis through the center, at the given direction angle.
    Stretch {
        center: Point,
        angle: f64,
        ratio: f64,
    },
    /// Mirror across the line through `center` at direction `angle`.
    Reflection { center: Point, angle: f64 },
    /// Point reflection through `center`.
    Inversion { center: Point },
}

impl Transformation {
    /// A fresh identity record of the given kind, anchored at `center`.
    pub fn identity(kind: TransformKind, center: Point) -> Self {
        match kind {
            TransformKind::Translation => Transformation::Translation { dx: 0.0, dy: 0.0 },
            TransformKind::Rotation => Transformation::Rotation { center, angle: 0.0 },
            TransformKind::Scale => Transformation::Scale { center, ratio: 1.0 },
            TransformKind::Stretch => Transformation::Stretch {
                center,
                angle: 0.0,
                ratio: 1.0,
            },
            TransformKind::Reflection => Transformation::Reflection { center, angle: 0.0 },
            TransformKind::Inversion => Transformation::Inversion { center },
        }
    }

    /// The kind tag of this record.
    pub fn kind(&self) -> TransformKind {
        match self {
            Transformation::Translation { .. } => TransformKind::Translation,
            Transformation::Rotation { .. } => TransformKind::Rotation,
            Transformation::Scale { .. } => TransformKind::Scale,
            Transformation::Stretch { .. } => TransformKind::Stretch,
            Transformation::Reflection { .. } => TransformKind::Reflection,
            Transformation::Inversion { .. } => TransformKind::Inversion,
        }
    }

    /// The affine this record contributes to the element's render transform.
    ///
    /// Identity parameters (angle 0, ratio 1) produce `Affine::IDENTITY`
    /// exactly, so untouched records introduce no rounding drift.
    pub fn to_affine(&self) -> Affine {
        match *self {
            Transformation::Translation { dx, dy } => {
                if dx == 0.0 && dy == 0.0 {
                    Affine::IDENTITY
                } else {
                    Affine::translate((dx, dy))
                }
            }
            Transformation::Rotation { center, angle } => {
                if angle == 0.0 {
                    Affine::IDENTITY
                } else {
                    about(center, Affine::rotate(angle))
                }
            }
            Transformation::Scale { center, ratio } => {
                if ratio == 1.0 {
                    Affine::IDENTITY
                } else {
                    about(center, Affine::scale(ratio))
                }
            }
            Transformation::Stretch {
                center,
                angle,
                ratio,
            } => {
                if ratio == 1.0 {
                    Affine::IDENTITY
                } else {
                    about(
                        center,
                        Affine::rotate(angle)
                            * Affine::scale_non_uniform(ratio, 1.0)
                            * Affine::rotate(-angle),
                    )
                }
            }
            Transformation::Reflection { center, angle } => about(
                center,
                Affine::rotate(angle) * Affine::scale_non_uniform(1.0, -1.0) * Affine::rotate(-angle),
            ),
            Transformation::Inversion { center } => about(center, Affine::scale(-1.0)),
        }
    }
}

/// Conjugate a transform so it acts about `center` instead of the origin.
fn about(center: Point, inner: Affine) -> Affine {
    Affine::translate(center.to_vec2()) * inner * Affine::translate(-center.to_vec2())
}

/// Compose a transformation list into one affine, later records outermost.
pub fn compose(transformations: &[Transformation]) -> Affine {
    transformations
        .iter()
        .fold(Affine::IDENTITY, |acc, t| t.to_affine() * acc)
}

/// The kind of transform a gesture is currently performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformKind {
    Translation,
    Rotation,
    Scale,
    Stretch,
    Reflection,
    Inversion,
}

impl TransformKind {
    /// The kind this one swaps with when the modifier key toggles
    /// mid-gesture.
    pub fn modifier_alternate(self) -> TransformKind {
        match self {
            TransformKind::Translation => TransformKind::Rotation,
            TransformKind::Rotation => TransformKind::Translation,
            TransformKind::Scale => TransformKind::Stretch,
            TransformKind::Stretch => TransformKind::Scale,
            TransformKind::Reflection => TransformKind::Inversion,
            TransformKind::Inversion => TransformKind::Reflection,
        }
    }

    /// Whether the gesture anchor is the element center (as opposed to the
    /// pointer position that started the gesture).
    fn anchors_at_center(self) -> bool {
        matches!(
            self,
            TransformKind::Rotation
                | TransformKind::Scale
                | TransformKind::Stretch
                | TransformKind::Inversion
        )
    }
}

/// The active transform gesture on one grabbed element.
///
/// `start` pushes an identity record onto the element; `update` rewrites
/// that record from the current pointer; `stop` leaves it permanently in
/// the element's transformation list.
#[derive(Debug, Clone)]
pub struct TransformSession {
    kind: TransformKind,
    /// Fixed point of the transform.
    anchor: Point,
    /// The anchor was supplied by the caller (mirror axis point) and must
    /// survive kind switches.
    pinned_anchor: bool,
    /// Pointer position when the current gesture segment started.
    origin: Point,
}

impl TransformSession {
    /// Begin a gesture of `kind` at `pointer` on `element`.
    pub fn start(element: &mut DrawingElement, pointer: Point, kind: TransformKind) -> Self {
        let anchor = if kind.anchors_at_center() {
            element.center()
        } else {
            pointer
        };
        Self::begin(element, pointer, kind, anchor, false)
    }

    /// Begin a gesture with an explicit anchor (the mirror tool supplies
    /// the locked axis point here).
    pub fn start_anchored(
        element: &mut DrawingElement,
        pointer: Point,
        kind: TransformKind,
        anchor: Point,
    ) -> Self {
        Self::begin(element, pointer, kind, anchor, true)
    }

    fn begin(
        element: &mut DrawingElement,
        pointer: Point,
        kind: TransformKind,
        anchor: Point,
        pinned_anchor: bool,
    ) -> Self {
        element
            .transformations
            .push(Transformation::identity(kind, anchor));
        let session = Self {
            kind,
            anchor,
            pinned_anchor,
            origin: pointer,
        };
        session.write_record(element, pointer);
        session
    }

    /// Recompute the live record from the current pointer position.
    pub fn update(&self, element: &mut DrawingElement, pointer: Point) {
        self.write_record(element, pointer);
    }

    /// Swap the live gesture to its modifier alternate without losing the
    /// anchor: the just-pushed record is popped and the new kind starts at
    /// the current pointer position.
    pub fn switch_kind(&mut self, element: &mut DrawingElement, pointer: Point) {
        let new_kind = self.kind.modifier_alternate();
        element.transformations.pop();
        self.kind = new_kind;
        if new_kind.anchors_at_center() && !self.pinned_anchor {
            self.anchor = element.center();
        }
        self.origin = pointer;
        element
            .transformations
            .push(Transformation::identity(new_kind, self.anchor));
        self.write_record(element, pointer);
    }

    /// Finalize the gesture. The record stays on the element.
    pub fn stop(self, element: &mut DrawingElement) {
        // A gesture that never moved leaves an identity record; drop it so
        // the history only holds real edits.
        if let Some(last) = element.transformations.last() {
            if last.to_affine() == Affine::IDENTITY
                && !matches!(
                    last,
                    Transformation::Reflection { .. } | Transformation::Inversion { .. }
                )
            {
                element.transformations.pop();
            }
        }
    }

    /// The kind currently being performed.
    pub fn kind(&self) -> TransformKind {
        self.kind
    }

    /// The fixed point established for this gesture.
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    fn write_record(&self, element: &mut DrawingElement, pointer: Point) {
        let record = match self.kind {
            TransformKind::Translation => Transformation::Translation {
                dx: pointer.x - self.origin.x,
                dy: pointer.y - self.origin.y,
            },
            TransformKind::Rotation => Transformation::Rotation {
                center: self.anchor,
                angle: angle_between(self.anchor, self.origin, pointer),
            },
            TransformKind::Scale => Transformation::Scale {
                center: self.anchor,
                ratio: scale_ratio(self.anchor, self.origin, pointer),
            },
            TransformKind::Stretch => Transformation::Stretch {
                center: self.anchor,
                angle: direction_angle(self.anchor, self.origin),
                ratio: scale_ratio(self.anchor, self.origin, pointer),
            },
            TransformKind::Reflection => Transformation::Reflection {
                center: self.anchor,
                angle: direction_angle(self.anchor, pointer),
            },
            // One-shot: the anchor is everything.
            TransformKind::Inversion => Transformation::Inversion {
                center: self.anchor,
            },
        };
        if let Some(last) = element.transformations.last_mut() {
            *last = record;
        }
    }
}
