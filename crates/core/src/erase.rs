//! Erase engine
//!
//! A path is hit when the eraser point falls inside the outline obtained by
//! stroking the path at the eraser width with round caps and joins. Self
//! intersecting strokes can produce outlines whose inside depends on the fill
//! rule, so a point counts as inside if either rule says so.

use crate::annotation::{Annotation, AnnotationBody, InkPath};
use kurbo::{BezPath, Cap, Circle, Join, Point, Shape, Stroke, StrokeOpts};
use tracing::trace;

/// Default eraser diameter in page points
pub const DEFAULT_ERASE_WIDTH: f64 = 10.0;

/// Flattening tolerance used when stroking the outline
const OUTLINE_TOLERANCE: f64 = 0.1;

/// Rule deciding which side of an outline is inside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillRule {
    EvenOdd,
    NonZero,
}

impl FillRule {
    /// Whether a winding number counts as inside under this rule
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            FillRule::EvenOdd => winding % 2 != 0,
            FillRule::NonZero => winding != 0,
        }
    }
}

/// Result of erasing at one point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseOutcome {
    /// Nothing under the point
    Untouched,
    /// Some paths were removed; the annotation keeps the rest
    PathsRemoved(usize),
    /// Nothing is left, the annotation should leave the page
    FullyErased,
}

/// Outline of a stroked path
#[derive(Debug, Clone)]
pub enum Outline {
    /// Round cap disc of a path that never left its first point
    Dot(Circle),
    Stroked(BezPath),
}

impl Outline {
    pub fn winding(&self, point: Point) -> i32 {
        match self {
            Outline::Dot(circle) => circle.winding(point),
            Outline::Stroked(path) => path.winding(point),
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        let winding = self.winding(point);
        FillRule::EvenOdd.is_inside(winding) || FillRule::NonZero.is_inside(winding)
    }
}

/// Point eraser with a fixed width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eraser {
    width: f64,
}

impl Default for Eraser {
    fn default() -> Self {
        Self::new(DEFAULT_ERASE_WIDTH)
    }
}

impl Eraser {
    pub fn new(width: f64) -> Self {
        Self { width }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Outline of `path` stroked at the eraser width
    pub fn outline(&self, path: &InkPath) -> Outline {
        if path.is_degenerate() {
            let center = path.points().first().copied().unwrap_or(Point::ZERO);
            return Outline::Dot(Circle::new(center, self.width / 2.0));
        }
        let style = Stroke::new(self.width)
            .with_caps(Cap::Round)
            .with_join(Join::Round);
        let centerline = path.to_bez_path();
        Outline::Stroked(kurbo::stroke(
            centerline.iter(),
            &style,
            &StrokeOpts::default(),
            OUTLINE_TOLERANCE,
        ))
    }

    /// Whether `point` lies on `path` within the eraser width
    pub fn path_hit(&self, path: &InkPath, point: Point) -> bool {
        let reach = self.width / 2.0;
        if !path.bounding_box().inflate(reach, reach).contains(point) {
            return false;
        }
        self.outline(path).contains(point)
    }

    /// Erase whatever lies under `point` in `annotation`
    ///
    /// Ink loses every path under the point. A text box is erased whole when
    /// the point is inside its bounds.
    pub fn erase(&self, annotation: &mut Annotation, point: Point) -> EraseOutcome {
        let id = annotation.id();
        let outcome = match annotation.body_mut() {
            AnnotationBody::Ink(ink) => {
                let removed = ink.remove_paths_where(|path| self.path_hit(path, point));
                if removed == 0 {
                    EraseOutcome::Untouched
                } else if ink.is_empty() {
                    EraseOutcome::FullyErased
                } else {
                    EraseOutcome::PathsRemoved(removed)
                }
            }
            AnnotationBody::Text(text) => {
                if text.bounds().contains(point) {
                    EraseOutcome::FullyErased
                } else {
                    EraseOutcome::Untouched
                }
            }
        };
        if outcome != EraseOutcome::Untouched {
            trace!(%id, x = point.x, y = point.y, ?outcome, "erased");
        }
        outcome
    }
}
