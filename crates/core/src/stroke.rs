//! Stroke path builder
//!
//! Turns a touch-down and the samples that follow it into a growing ink path.

use crate::annotation::{Annotation, InkAnnotation, InkPath};
use crate::config::DrawSettings;
use kurbo::{Point, Rect};
use tracing::trace;

/// Builds ink annotations from pen samples
pub struct StrokeBuilder;

impl StrokeBuilder {
    /// Start a stroke at `point`
    ///
    /// The new annotation covers `page_bounds` and carries a single
    /// one-vertex path with the session's color, width and alpha.
    pub fn begin(point: Point, page_bounds: Rect, settings: &DrawSettings) -> Annotation {
        let mut ink = InkAnnotation::new(
            page_bounds,
            settings.color(),
            settings.alpha(),
            settings.width(),
        );
        ink.add_path(InkPath::begin(point, settings.width()));
        let annotation = Annotation::ink(ink);
        trace!(id = %annotation.id(), x = point.x, y = point.y, "stroke began");
        annotation
    }

    /// Append `point` to the last path of `ink`
    ///
    /// The last path is swapped for a copy with one more vertex. Returns
    /// false when the annotation has no path to extend.
    pub fn extend(ink: &mut InkAnnotation, point: Point) -> bool {
        let Some(extended) = ink.last_path().map(|path| path.with_point(point)) else {
            return false;
        };
        trace!(x = point.x, y = point.y, vertices = extended.len(), "stroke extended");
        ink.replace_last_path(extended).is_some()
    }
}
