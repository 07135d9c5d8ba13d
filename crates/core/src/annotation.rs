//! Annotation data model
//!
//! Ink strokes and floating text boxes attached to a page. All coordinates
//! are stored in page-local coordinate space.

use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Unique identifier for an annotation
///
/// Identity of an annotation across removal and restoration: the undo stack
/// and the store compare annotations by this id, never by value.
pub type AnnotationId = uuid::Uuid;

/// Index of a page within the host document
pub type PageIndex = u16;

/// RGBA color with normalized channels (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create a new color
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create an opaque gray with the given white level
    pub fn gray(white: f32) -> Self {
        Self::rgb(white, white, white)
    }

    /// Same color with a different alpha component
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Convert to 8-bit RGBA values
    pub fn to_rgba8(&self) -> [u8; 4] {
        let quantize = |channel: f32| (channel.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b), quantize(self.a)]
    }
}

/// Common instrument and drawing colors
impl Color {
    pub const RED: Color = Color { r: 1.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const LIGHT_GRAY: Color = Color { r: 2.0 / 3.0, g: 2.0 / 3.0, b: 2.0 / 3.0, a: 1.0 };
}

/// One continuous pen gesture
///
/// Immutable once built. Extending a path produces a new value with one more
/// vertex; the points are shared behind an `Arc` so a reader holding the
/// previous value keeps a valid, unchanged path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InkPath {
    points: Arc<[Point]>,
    width: f64,
}

impl InkPath {
    /// Start a zero-length path at the touch-down location
    pub fn begin(point: Point, width: f64) -> Self {
        Self { points: Arc::from(vec![point]), width }
    }

    /// Copy of this path with `point` appended
    pub fn with_point(&self, point: Point) -> Self {
        let mut points = Vec::with_capacity(self.points.len() + 1);
        points.extend_from_slice(&self.points);
        points.push(point);
        Self { points: points.into(), width: self.width }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Number of vertices (always at least one)
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when every vertex sits on the touch-down point
    pub fn is_degenerate(&self) -> bool {
        match self.points.first() {
            Some(first) => self.points.iter().all(|p| p == first),
            None => true,
        }
    }

    /// Polyline through the vertices
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.points.iter();
        if let Some(first) = points.next() {
            path.move_to(*first);
            for point in points {
                path.line_to(*point);
            }
        }
        path
    }

    /// Bounding box of the vertices (stroke width not included)
    pub fn bounding_box(&self) -> Rect {
        let mut points = self.points.iter();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(*first, *first), |rect, p| rect.union_pt(*p))
    }
}

/// Freehand ink owning one or more strokes with shared color, alpha and width
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InkAnnotation {
    /// Annotation bounds (the page bounds at creation time)
    pub bounds: Rect,
    /// Stroke color (alpha carried separately)
    pub color: Color,
    pub alpha: f32,
    /// Stroke width in points
    pub width: f64,
    paths: Vec<InkPath>,
}

impl InkAnnotation {
    /// Create an ink annotation with no strokes yet
    pub fn new(bounds: Rect, color: Color, alpha: f32, width: f64) -> Self {
        Self { bounds, color, alpha, width, paths: Vec::new() }
    }

    pub fn paths(&self) -> &[InkPath] {
        &self.paths
    }

    pub fn last_path(&self) -> Option<&InkPath> {
        self.paths.last()
    }

    pub fn add_path(&mut self, path: InkPath) {
        self.paths.push(path);
    }

    /// Swap the last stroke for `path`, returning the stroke it replaced
    pub fn replace_last_path(&mut self, path: InkPath) -> Option<InkPath> {
        let last = self.paths.last_mut()?;
        Some(std::mem::replace(last, path))
    }

    /// Drop every stroke matching `predicate`, returning how many went
    pub fn remove_paths_where(&mut self, mut predicate: impl FnMut(&InkPath) -> bool) -> usize {
        let before = self.paths.len();
        self.paths.retain(|path| !predicate(path));
        before - self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Appearance of a text box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TextAppearance {
    /// Being positioned or resized: outlined and tinted
    Active { border: Color, background: Color },
    /// Final persisted appearance
    Committed,
}

/// Resizable, movable rectangular text field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    /// Form field name, unique per text box
    pub field_name: String,
    bounds: Rect,
    pub font_size: f64,
    pub color: Color,
    pub alpha: f32,
    /// Free-form value, editable by the host
    pub text: String,
    pub multiline: bool,
    pub border_width: f64,
    appearance: TextAppearance,
}

impl TextAnnotation {
    /// Create an active text box
    ///
    /// The active appearance outlines the box in `color` and fills it with
    /// `color` at `background_alpha`.
    pub fn new(
        bounds: Rect,
        font_size: f64,
        color: Color,
        alpha: f32,
        text: impl Into<String>,
        background_alpha: f32,
    ) -> Self {
        Self {
            field_name: uuid::Uuid::new_v4().to_string(),
            bounds,
            font_size,
            color,
            alpha,
            text: text.into(),
            multiline: true,
            border_width: 1.0,
            appearance: TextAppearance::Active {
                border: color,
                background: color.with_alpha(background_alpha),
            },
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn appearance(&self) -> TextAppearance {
        self.appearance
    }

    pub fn is_active(&self) -> bool {
        matches!(self.appearance, TextAppearance::Active { .. })
    }

    /// Replace the transient appearance with the final one
    pub fn commit(&mut self) {
        self.appearance = TextAppearance::Committed;
    }

    /// Font color as drawn, with the annotation alpha applied
    pub fn font_color(&self) -> Color {
        self.color.with_alpha(self.alpha)
    }
}

/// Kind of annotation, as reported to hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationKind {
    Ink,
    /// Form widget carrying a text box
    Widget,
}

/// Annotation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnnotationBody {
    Ink(InkAnnotation),
    Text(TextAnnotation),
}

/// Page-attached annotation with a stable identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    id: AnnotationId,
    body: AnnotationBody,
}

impl Annotation {
    /// Create a new annotation with generated ID
    pub fn new(body: AnnotationBody) -> Self {
        Self { id: AnnotationId::new_v4(), body }
    }

    pub fn ink(ink: InkAnnotation) -> Self {
        Self::new(AnnotationBody::Ink(ink))
    }

    pub fn text(text: TextAnnotation) -> Self {
        Self::new(AnnotationBody::Text(text))
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn body(&self) -> &AnnotationBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut AnnotationBody {
        &mut self.body
    }

    pub fn kind(&self) -> AnnotationKind {
        match self.body {
            AnnotationBody::Ink(_) => AnnotationKind::Ink,
            AnnotationBody::Text(_) => AnnotationKind::Widget,
        }
    }

    pub fn as_ink(&self) -> Option<&InkAnnotation> {
        match &self.body {
            AnnotationBody::Ink(ink) => Some(ink),
            AnnotationBody::Text(_) => None,
        }
    }

    pub fn as_ink_mut(&mut self) -> Option<&mut InkAnnotation> {
        match &mut self.body {
            AnnotationBody::Ink(ink) => Some(ink),
            AnnotationBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextAnnotation> {
        match &self.body {
            AnnotationBody::Text(text) => Some(text),
            AnnotationBody::Ink(_) => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextAnnotation> {
        match &mut self.body {
            AnnotationBody::Text(text) => Some(text),
            AnnotationBody::Ink(_) => None,
        }
    }

    /// Bounds in page coordinates
    pub fn bounds(&self) -> Rect {
        match &self.body {
            AnnotationBody::Ink(ink) => ink.bounds,
            AnnotationBody::Text(text) => text.bounds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_to_rgba8() {
        assert_eq!(Color::RED.to_rgba8(), [255, 0, 0, 255]);
        assert_eq!(Color::gray(0.5).with_alpha(0.0).to_rgba8(), [128, 128, 128, 0]);
    }

    #[test]
    fn test_extend_leaves_previous_path_untouched() {
        let first = InkPath::begin(Point::new(10.0, 10.0), 15.0);
        let second = first.with_point(Point::new(10.0, 20.0));

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
        assert_eq!(second.points()[0], Point::new(10.0, 10.0));
        assert_eq!(second.width(), 15.0);
    }

    #[test]
    fn test_degenerate_path() {
        let path = InkPath::begin(Point::new(5.0, 5.0), 2.0);
        assert!(path.is_degenerate());
        assert!(path.with_point(Point::new(5.0, 5.0)).is_degenerate());
        assert!(!path.with_point(Point::new(6.0, 5.0)).is_degenerate());
    }

    #[test]
    fn test_path_bounding_box() {
        let path = InkPath::begin(Point::new(10.0, 20.0), 1.0)
            .with_point(Point::new(50.0, 80.0))
            .with_point(Point::new(30.0, 5.0));
        assert_eq!(path.bounding_box(), Rect::new(10.0, 5.0, 50.0, 80.0));
    }

    #[test]
    fn test_replace_last_path() {
        let mut ink = InkAnnotation::new(Rect::new(0.0, 0.0, 100.0, 100.0), Color::RED, 1.0, 3.0);
        assert!(ink.replace_last_path(InkPath::begin(Point::ZERO, 3.0)).is_none());

        ink.add_path(InkPath::begin(Point::ZERO, 3.0));
        let old = ink.replace_last_path(InkPath::begin(Point::new(1.0, 1.0), 3.0));
        assert_eq!(old.map(|p| p.points()[0]), Some(Point::ZERO));
        assert_eq!(ink.paths().len(), 1);
    }

    #[test]
    fn test_text_commit() {
        let mut text = TextAnnotation::new(
            Rect::new(0.0, 0.0, 150.0, 23.0),
            15.0,
            Color::RED,
            0.5,
            "Text here...",
            0.1,
        );
        assert!(text.is_active());
        assert_eq!(
            text.appearance(),
            TextAppearance::Active { border: Color::RED, background: Color::RED.with_alpha(0.1) }
        );
        assert_eq!(text.font_color(), Color::RED.with_alpha(0.5));

        text.commit();
        assert!(!text.is_active());
    }

    #[test]
    fn test_annotation_kind_and_identity() {
        let ink = Annotation::ink(InkAnnotation::new(Rect::ZERO, Color::BLACK, 1.0, 1.0));
        let copy = ink.clone();
        let other = Annotation::ink(InkAnnotation::new(Rect::ZERO, Color::BLACK, 1.0, 1.0));

        assert_eq!(ink.kind(), AnnotationKind::Ink);
        assert_eq!(ink.id(), copy.id());
        assert_ne!(ink.id(), other.id());
    }

    #[test]
    fn test_annotation_serializes_with_type_tag() {
        let mut ink = InkAnnotation::new(Rect::ZERO, Color::BLACK, 1.0, 2.0);
        ink.add_path(InkPath::begin(Point::new(1.0, 2.0), 2.0));
        let annotation = Annotation::ink(ink);

        let value = serde_json::to_value(&annotation).unwrap();
        assert_eq!(value["body"]["type"], "ink");

        let parsed: Annotation = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, annotation);
    }
}
