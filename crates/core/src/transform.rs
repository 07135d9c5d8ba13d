//! Text box transform controller
//!
//! Moves and resizes the current text box under two-finger gestures. Each
//! update takes the box off the page, changes its bounds and puts it back so
//! the host redraws it on top.

use crate::annotation::{AnnotationId, PageIndex};
use crate::gesture::GesturePhase;
use crate::store::AnnotationStore;
use kurbo::{Point, Rect, Size, Vec2};
use tracing::debug;

/// Touch spread ratio above which a pinch only resizes horizontally
const HORIZONTAL_RATIO: f64 = 2.0;
/// Touch spread ratio below which a pinch only resizes vertically
const VERTICAL_RATIO: f64 = 0.5;

/// Axes a pinch is allowed to resize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisLock {
    Horizontal,
    Vertical,
    Both,
}

/// Decide the resize axes from the positions of the two touches
///
/// Touches spread mostly sideways lock to the horizontal axis, mostly
/// upright to the vertical one. Coincident touches satisfy both tests and
/// resize freely.
pub fn axis_lock(first: Point, second: Point) -> AxisLock {
    let dx = (first.x - second.x).abs();
    let dy = (first.y - second.y).abs();
    let ratio = dx / dy;
    let horizontal = dy == 0.0 || ratio > HORIZONTAL_RATIO;
    let vertical = dx == 0.0 || ratio < VERTICAL_RATIO;
    match (horizontal, vertical) {
        (true, false) => AxisLock::Horizontal,
        (false, true) => AxisLock::Vertical,
        _ => AxisLock::Both,
    }
}

/// Grow `size` to at least `min` on each axis
pub fn clamp_size(size: Size, min: Size) -> Size {
    Size::new(size.width.max(min.width), size.height.max(min.height))
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CurrentText {
    page: PageIndex,
    id: AnnotationId,
    min_size: Size,
}

/// Tracks the text box being positioned and applies pan/pinch to it
#[derive(Debug, Clone)]
pub struct TextBoxController {
    current: Option<CurrentText>,
    last_scale: f64,
}

impl Default for TextBoxController {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBoxController {
    pub fn new() -> Self {
        Self { current: None, last_scale: 1.0 }
    }

    /// Make the text box `id` on `page` current
    pub fn begin(&mut self, page: PageIndex, id: AnnotationId, min_size: Size) {
        self.current = Some(CurrentText { page, id, min_size });
        self.last_scale = 1.0;
    }

    /// Page and id of the current text box
    pub fn current(&self) -> Option<(PageIndex, AnnotationId)> {
        self.current.map(|c| (c.page, c.id))
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn min_size(&self) -> Option<Size> {
        self.current.map(|c| c.min_size)
    }

    /// Forget the current text box without touching the page
    pub fn clear(&mut self) {
        self.current = None;
        self.last_scale = 1.0;
    }

    /// Move the current box by a screen-space `translation`
    ///
    /// Screen y grows downward while page y grows upward, so the vertical
    /// component is flipped. Returns true if the box moved.
    pub fn pan<S: AnnotationStore + ?Sized>(
        &mut self,
        store: &mut S,
        phase: GesturePhase,
        translation: Vec2,
    ) -> bool {
        if phase.is_finished() {
            return false;
        }
        self.update_bounds(store, |bounds| bounds + Vec2::new(translation.x, -translation.y))
    }

    /// Resize the current box by a cumulative pinch `scale`
    ///
    /// Needs at least two touches; their layout picks the axes that resize.
    /// The box keeps its origin and never shrinks below its minimum size.
    pub fn pinch<S: AnnotationStore + ?Sized>(
        &mut self,
        store: &mut S,
        phase: GesturePhase,
        scale: f64,
        touches: &[Point],
    ) -> bool {
        if phase == GesturePhase::Began {
            self.last_scale = 1.0;
        }
        if phase.is_finished() {
            self.last_scale = 1.0;
            return false;
        }
        let [first, second, ..] = touches else {
            return false;
        };
        if !(scale > 0.0) || !(self.last_scale > 0.0) {
            return false;
        }

        let factor = scale / self.last_scale;
        self.last_scale = scale;
        let lock = axis_lock(*first, *second);
        let Some(min_size) = self.min_size() else {
            return false;
        };

        self.update_bounds(store, |bounds| {
            let mut size = bounds.size();
            match lock {
                AxisLock::Horizontal => size.width *= factor,
                AxisLock::Vertical => size.height *= factor,
                AxisLock::Both => size = size * factor,
            }
            Rect::from_origin_size(bounds.origin(), clamp_size(size, min_size))
        })
    }

    /// Give the current box its final appearance and release it
    pub fn commit<S: AnnotationStore + ?Sized>(&mut self, store: &mut S) {
        let Some(current) = self.current.take() else {
            return;
        };
        self.last_scale = 1.0;
        if let Some(mut annotation) = store.remove_annotation(current.page, current.id) {
            if let Some(text) = annotation.as_text_mut() {
                text.commit();
            }
            store.add_annotation(current.page, annotation);
            debug!(id = %current.id, page = current.page, "text box committed");
        }
    }

    fn update_bounds<S: AnnotationStore + ?Sized>(
        &mut self,
        store: &mut S,
        update: impl FnOnce(Rect) -> Rect,
    ) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        let Some(mut annotation) = store.remove_annotation(current.page, current.id) else {
            self.clear();
            return false;
        };
        if let Some(text) = annotation.as_text_mut() {
            let bounds = update(text.bounds());
            text.set_bounds(bounds);
        }
        store.add_annotation(current.page, annotation);
        true
    }
}
