//! Annotation editor
//!
//! [`Editor`] receives gestures and instrument commands from the host and
//! applies them to the page store through the stroke builder, the eraser and
//! the text box controller.

use crate::annotation::{Annotation, AnnotationId, Color, PageIndex, TextAnnotation};
use crate::config::{DrawSettings, EditorConfig};
use crate::erase::{EraseOutcome, Eraser};
use crate::error::EditorResult;
use crate::gesture::{DrawSample, DrawingRecognizer, GestureWiring, PanEvent, PinchEvent, TouchEvent};
use crate::history::RemovalStack;
use crate::store::AnnotationStore;
use crate::stroke::StrokeBuilder;
use crate::tool::{
    Command, InstrumentId, InstrumentViewModel, Selection, SubscriptionId, Tool, ToolEvent,
    ToolStateMachine,
};
use crate::transform::TextBoxController;
use kurbo::{Point, Rect, Size};
use tracing::{debug, trace, warn};

/// Whether a document is open, and on which page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentState {
    #[default]
    NoDocument,
    DocumentAt(PageIndex),
}

impl DocumentState {
    pub fn page(self) -> Option<PageIndex> {
        match self {
            DocumentState::NoDocument => None,
            DocumentState::DocumentAt(page) => Some(page),
        }
    }
}

/// Touch-driven annotation editor over a host store
pub struct Editor<S: AnnotationStore> {
    store: S,
    config: EditorConfig,
    settings: DrawSettings,
    eraser: Eraser,
    document: DocumentState,
    tools: ToolStateMachine,
    removed: RemovalStack,
    text_box: TextBoxController,
    recognizer: DrawingRecognizer,
    active_stroke: Option<(PageIndex, AnnotationId)>,
}

impl<S: AnnotationStore> std::fmt::Debug for Editor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("document", &self.document)
            .field("tool", &self.tools.tool())
            .field("settings", &self.settings)
            .field("removed", &self.removed.len())
            .field("text_box", &self.text_box.current())
            .finish()
    }
}

impl<S: AnnotationStore> Editor<S> {
    /// Create an editor with the default configuration
    pub fn new(store: S) -> Self {
        let config = EditorConfig::default();
        Self::build(store, config)
    }

    /// Create an editor with a validated configuration
    pub fn with_config(store: S, config: EditorConfig) -> EditorResult<Self> {
        config.validate()?;
        Ok(Self::build(store, config))
    }

    fn build(store: S, config: EditorConfig) -> Self {
        Self {
            store,
            settings: config.initial_settings(),
            eraser: Eraser::new(config.erase_width),
            config,
            document: DocumentState::NoDocument,
            tools: ToolStateMachine::new(),
            removed: RemovalStack::new(),
            text_box: TextBoxController::new(),
            recognizer: DrawingRecognizer::new(),
            active_stroke: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct store access for the host; the editor's own bookkeeping
    /// (current text box, active stroke) is not updated
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn settings(&self) -> &DrawSettings {
        &self.settings
    }

    pub fn document_state(&self) -> DocumentState {
        self.document
    }

    pub fn current_page(&self) -> Option<PageIndex> {
        self.document.page()
    }

    pub fn tool(&self) -> Tool {
        self.tools.tool()
    }

    pub fn removal_stack(&self) -> &RemovalStack {
        &self.removed
    }

    pub fn can_redo(&self) -> bool {
        self.removed.can_redo()
    }

    /// Page and id of the text box being positioned
    pub fn current_text(&self) -> Option<(PageIndex, AnnotationId)> {
        self.text_box.current()
    }

    /// Recognizers the host should attach to the page
    pub fn gesture_wiring(&self) -> GestureWiring {
        if self.document == DocumentState::NoDocument {
            return GestureWiring::Idle;
        }
        GestureWiring::for_state(self.tools.tool(), self.text_box.is_active())
    }

    pub fn instruments(&self) -> Vec<InstrumentViewModel> {
        self.tools.instruments(self.removed.can_redo(), self.settings.color())
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&ToolEvent) + 'static) -> SubscriptionId {
        self.tools.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.tools.unsubscribe(id)
    }

    // Document lifecycle

    /// Open a document showing `page`
    pub fn open_document(&mut self, page: PageIndex) {
        self.reset_session();
        self.show(page);
        debug!(page, "document opened");
        self.publish();
    }

    /// Show another page: commits the current text box, forgets the undo
    /// history and turns the tool off
    pub fn go_to_page(&mut self, page: PageIndex) {
        if self.document == DocumentState::DocumentAt(page) {
            return;
        }
        self.reset_session();
        self.show(page);
        debug!(page, "page changed");
        self.publish();
    }

    pub fn close_document(&mut self) {
        self.reset_session();
        self.document = DocumentState::NoDocument;
        debug!("document closed");
        self.publish();
    }

    fn show(&mut self, page: PageIndex) {
        if !self.store.show_page(page) {
            warn!(page, "store cannot show page, touches will be ignored");
        }
        self.document = DocumentState::DocumentAt(page);
    }

    /// Map a screen point onto the current page; touches landing on any
    /// other page are dropped
    fn locate(&self, location: Point) -> Option<(PageIndex, Point)> {
        let current = self.current_page()?;
        let (page, point) = self.store.point_to_page(location)?;
        (page == current).then_some((page, point))
    }

    fn reset_session(&mut self) {
        self.removed.clear();
        self.tools.set_tool(Tool::Disabled);
        self.finish_interaction();
    }

    /// Commit any current text box and drop the in-progress stroke
    fn finish_interaction(&mut self) {
        self.text_box.commit(&mut self.store);
        self.recognizer.reset();
        self.active_stroke = None;
    }

    // Instruments

    /// Select an instrument from the instrument bar
    pub fn select_instrument(&mut self, instrument: InstrumentId) {
        let selection = self.tools.select(instrument);
        self.apply(selection);
    }

    pub fn deselect_instrument(&mut self, instrument: InstrumentId) {
        let selection = self.tools.deselect(instrument);
        self.apply(selection);
    }

    pub fn undo(&mut self) {
        self.apply(Selection::Command(Command::Undo));
    }

    pub fn redo(&mut self) {
        self.apply(Selection::Command(Command::Redo));
    }

    pub fn trash(&mut self) {
        self.apply(Selection::Command(Command::Trash));
    }

    fn apply(&mut self, selection: Selection) {
        match selection {
            Selection::ToolChanged { to, .. } => {
                self.finish_interaction();
                if to.is_drawing() {
                    self.removed.clear();
                }
            }
            Selection::Command(command) => {
                self.finish_interaction();
                self.run(command);
            }
            Selection::Unchanged => return,
        }
        self.publish();
    }

    fn run(&mut self, command: Command) {
        debug!(?command, page = ?self.current_page(), "command");
        match command {
            Command::Undo => self.run_undo(),
            Command::Redo => self.run_redo(),
            Command::Trash => self.run_trash(),
            Command::ColorPick => self.tools.emit(&ToolEvent::DrawConfigurationRequested),
        }
    }

    fn run_undo(&mut self) {
        let Some(page) = self.current_page() else {
            return;
        };
        let Some(id) = self.store.last_annotation(page).map(Annotation::id) else {
            return;
        };
        if let Some(annotation) = self.store.remove_annotation(page, id) {
            self.removed.push(annotation);
        }
    }

    fn run_redo(&mut self) {
        let Some(page) = self.current_page() else {
            return;
        };
        if let Some(annotation) = self.removed.pop() {
            self.store.add_annotation(page, annotation);
        }
    }

    fn run_trash(&mut self) {
        let Some(page) = self.current_page() else {
            return;
        };
        let ids: Vec<AnnotationId> = self.store.annotations(page).iter().map(Annotation::id).collect();
        if ids.is_empty() {
            return;
        }
        self.removed.clear();
        for id in ids.into_iter().rev() {
            if let Some(annotation) = self.store.remove_annotation(page, id) {
                self.removed.push(annotation);
            }
        }
    }

    fn publish(&mut self) {
        let instruments = self.instruments();
        self.tools.publish(instruments);
    }

    // Drawing settings

    /// Set the drawing color; alpha is controlled separately
    pub fn set_color(&mut self, color: Color) {
        self.settings.set_color(color);
        self.publish();
    }

    pub fn set_stroke_width(&mut self, width: f64) -> EditorResult<()> {
        self.settings.set_width(width)
    }

    /// Set the width from a slider position in 0..=1
    pub fn set_width_fraction(&mut self, fraction: f64) -> EditorResult<()> {
        self.settings.set_width(fraction * self.config.width_slider_scale)
    }

    /// Slider position matching the current width
    pub fn width_fraction(&self) -> f64 {
        self.settings.width() / self.config.width_slider_scale
    }

    pub fn set_alpha(&mut self, alpha: f32) -> EditorResult<()> {
        self.settings.set_alpha(alpha)
    }

    // Gestures

    /// Feed a single-touch sample to the active tool
    pub fn handle_touch(&mut self, event: &TouchEvent) {
        if self.gesture_wiring() != GestureWiring::Drawing {
            return;
        }
        let Some(sample) = self.recognizer.handle(event) else {
            return;
        };
        match (self.tools.tool(), sample) {
            (Tool::Pen, DrawSample::Down(location)) => self.begin_stroke(location),
            (Tool::Pen, DrawSample::Move(location)) => self.extend_stroke(location),
            (Tool::Pen, DrawSample::Up(location)) => {
                self.extend_stroke(location);
                self.active_stroke = None;
            }
            (Tool::Eraser, DrawSample::Move(location) | DrawSample::Up(location)) => {
                if let Some((page, point)) = self.locate(location) {
                    self.erase_at(page, point);
                }
            }
            (Tool::Text, DrawSample::Up(location)) => self.create_text_box(location),
            (_, DrawSample::Cancel) => {
                trace!("stroke cancelled, partial stroke kept");
                self.active_stroke = None;
            }
            _ => {}
        }
    }

    /// Move the current text box
    pub fn handle_pan(&mut self, event: &PanEvent) -> bool {
        self.text_box.pan(&mut self.store, event.phase, event.translation)
    }

    /// Resize the current text box
    pub fn handle_pinch(&mut self, event: &PinchEvent) -> bool {
        self.text_box.pinch(&mut self.store, event.phase, event.scale, &event.touches)
    }

    /// Erase at `point` (page space) across every annotation on `page`
    ///
    /// Returns how many annotations were changed or removed. Erasing is not
    /// recorded for undo.
    pub fn erase_at(&mut self, page: PageIndex, point: Point) -> usize {
        let ids: Vec<AnnotationId> = self.store.annotations(page).iter().map(Annotation::id).collect();
        let mut touched = 0;
        for id in ids {
            let Some(mut annotation) = self.store.find_annotation(page, id).cloned() else {
                continue;
            };
            match self.eraser.erase(&mut annotation, point) {
                EraseOutcome::Untouched => continue,
                EraseOutcome::PathsRemoved(_) => {
                    self.store.replace_annotation(page, annotation);
                }
                EraseOutcome::FullyErased => {
                    self.store.remove_annotation(page, id);
                    if self.text_box.current() == Some((page, id)) {
                        self.text_box.clear();
                    }
                    if self.active_stroke == Some((page, id)) {
                        self.active_stroke = None;
                    }
                }
            }
            touched += 1;
        }
        touched
    }

    fn begin_stroke(&mut self, location: Point) {
        let Some((page, point)) = self.locate(location) else {
            return;
        };
        let Some(bounds) = self.store.page_bounds(page) else {
            return;
        };
        let annotation = StrokeBuilder::begin(point, bounds, &self.settings);
        self.active_stroke = Some((page, annotation.id()));
        self.store.add_annotation(page, annotation);
    }

    fn extend_stroke(&mut self, location: Point) {
        let Some((page, id)) = self.active_stroke else {
            return;
        };
        let Some((touch_page, point)) = self.locate(location) else {
            return;
        };
        if touch_page != page {
            return;
        }
        let Some(mut annotation) = self.store.find_annotation(page, id).cloned() else {
            self.active_stroke = None;
            return;
        };
        let extended = annotation
            .as_ink_mut()
            .is_some_and(|ink| StrokeBuilder::extend(ink, point));
        if extended {
            self.store.replace_annotation(page, annotation);
        }
    }

    fn create_text_box(&mut self, location: Point) {
        let Some((page, point)) = self.locate(location) else {
            return;
        };
        let min_size = Size::new(
            self.config.text_min_width,
            self.settings.width() + self.config.text_height_padding,
        );
        let text = TextAnnotation::new(
            Rect::from_origin_size(point, min_size),
            self.settings.width(),
            self.settings.color(),
            self.settings.alpha(),
            self.config.text_placeholder.clone(),
            self.config.text_background_alpha,
        );
        let annotation = Annotation::text(text);
        let id = annotation.id();
        self.store.add_annotation(page, annotation);
        self.removed.clear();
        self.text_box.begin(page, id, min_size);
        self.recognizer.reset();
        debug!(%id, page, "text box created");
        self.publish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotationKind, TextAppearance};
    use crate::gesture::{GesturePhase, TouchPhase};
    use crate::store::MemoryDocument;
    use kurbo::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn editor() -> Editor<MemoryDocument> {
        let mut editor = Editor::new(MemoryDocument::new(3, Rect::new(0.0, 0.0, 612.0, 792.0)));
        editor.open_document(0);
        editor
    }

    fn touch(editor: &mut Editor<MemoryDocument>, phase: TouchPhase, x: f64, y: f64) {
        editor.handle_touch(&TouchEvent::new(phase, Point::new(x, y)));
    }

    fn stroke(editor: &mut Editor<MemoryDocument>, points: &[(f64, f64)]) {
        let last = points.len() - 1;
        for (i, &(x, y)) in points.iter().enumerate() {
            let phase = match i {
                0 => TouchPhase::Began,
                i if i == last => TouchPhase::Ended,
                _ => TouchPhase::Moved,
            };
            touch(editor, phase, x, y);
        }
    }

    fn page_ids(editor: &Editor<MemoryDocument>, page: PageIndex) -> Vec<AnnotationId> {
        editor.store().annotations(page).iter().map(Annotation::id).collect()
    }

    #[test]
    fn test_pen_stroke_grows_one_path() {
        let mut editor = editor();
        editor.select_instrument(InstrumentId::Pencil);
        stroke(&mut editor, &[(10.0, 10.0), (10.0, 20.0), (10.0, 30.0)]);

        let annotations = editor.store().annotations(0);
        assert_eq!(annotations.len(), 1);
        let ink = annotations[0].as_ink().unwrap();
        assert_eq!(ink.paths().len(), 1);
        assert_eq!(
            ink.paths()[0].points(),
            &[Point::new(10.0, 10.0), Point::new(10.0, 20.0), Point::new(10.0, 30.0)]
        );
        assert_eq!(ink.width, 15.0);
        assert_eq!(ink.color, Color::RED);
        assert_eq!(ink.bounds, Rect::new(0.0, 0.0, 612.0, 792.0));
    }

    #[test]
    fn test_pen_erase_trash_scenario() {
        let mut editor = editor();
        editor.select_instrument(InstrumentId::Pencil);
        stroke(&mut editor, &[(10.0, 10.0), (10.0, 20.0), (10.0, 30.0)]);
        stroke(&mut editor, &[(200.0, 200.0), (250.0, 200.0)]);
        stroke(&mut editor, &[(300.0, 400.0), (300.0, 450.0)]);
        let ids = page_ids(&editor, 0);
        assert_eq!(ids.len(), 3);

        editor.select_instrument(InstrumentId::Erase);
        assert_eq!(editor.tool(), Tool::Eraser);
        assert_eq!(editor.erase_at(0, Point::new(10.0, 20.0)), 1);
        assert_eq!(page_ids(&editor, 0), vec![ids[1], ids[2]]);
        assert!(!editor.can_redo());

        editor.select_instrument(InstrumentId::Trash);
        assert!(editor.store().annotations(0).is_empty());
        let stacked: Vec<_> = editor.removal_stack().iter().map(Annotation::id).collect();
        assert_eq!(stacked, vec![ids[2], ids[1]]);
        assert_eq!(editor.tool(), Tool::Eraser);

        editor.redo();
        editor.redo();
        assert_eq!(page_ids(&editor, 0), vec![ids[1], ids[2]]);
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_eraser_touch_erases_on_move_not_down() {
        let mut editor = editor();
        editor.select_instrument(InstrumentId::Pencil);
        stroke(&mut editor, &[(100.0, 100.0), (200.0, 100.0)]);

        editor.select_instrument(InstrumentId::Erase);
        touch(&mut editor, TouchPhase::Began, 150.0, 100.0);
        assert_eq!(editor.store().annotations(0).len(), 1);
        touch(&mut editor, TouchPhase::Moved, 150.0, 101.0);
        assert!(editor.store().annotations(0).is_empty());
        touch(&mut editor, TouchPhase::Ended, 150.0, 101.0);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut editor = editor();
        editor.select_instrument(InstrumentId::Pencil);
        stroke(&mut editor, &[(10.0, 10.0), (20.0, 20.0)]);
        stroke(&mut editor, &[(30.0, 30.0), (40.0, 40.0)]);
        let before = page_ids(&editor, 0);

        editor.undo();
        assert_eq!(page_ids(&editor, 0), vec![before[0]]);
        assert!(editor.can_redo());
        assert_eq!(editor.tool(), Tool::Pen);

        editor.redo();
        assert_eq!(page_ids(&editor, 0), before);
        assert!(!editor.can_redo());

        // Nothing left to redo: no-op.
        editor.redo();
        assert_eq!(page_ids(&editor, 0), before);
    }

    #[test]
    fn test_selecting_tool_clears_history() {
        let mut editor = editor();
        editor.select_instrument(InstrumentId::Pencil);
        stroke(&mut editor, &[(10.0, 10.0), (20.0, 20.0)]);
        editor.undo();
        assert!(editor.can_redo());

        editor.select_instrument(InstrumentId::Erase);
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_page_change_resets_session() {
        let mut editor = editor();
        editor.select_instrument(InstrumentId::Pencil);
        stroke(&mut editor, &[(10.0, 10.0), (20.0, 20.0)]);
        editor.undo();

        editor.go_to_page(1);
        assert_eq!(editor.document_state(), DocumentState::DocumentAt(1));
        assert_eq!(editor.tool(), Tool::Disabled);
        assert!(!editor.can_redo());
        assert_eq!(editor.gesture_wiring(), GestureWiring::Idle);
    }

    #[test]
    fn test_page_change_moves_drawing_and_undo_together() {
        let mut editor = editor();
        editor.go_to_page(1);
        editor.select_instrument(InstrumentId::Pencil);
        stroke(&mut editor, &[(10.0, 10.0), (10.0, 30.0)]);

        assert_eq!(editor.store().visible_page(), 1);
        assert!(editor.store().annotations(0).is_empty());
        assert_eq!(editor.store().annotations(1).len(), 1);

        editor.undo();
        assert!(editor.store().annotations(1).is_empty());
        assert!(editor.can_redo());

        editor.redo();
        assert_eq!(editor.store().annotations(1).len(), 1);
        assert!(editor.store().annotations(0).is_empty());
    }

    #[test]
    fn test_touches_on_other_page_are_ignored() {
        let mut editor = editor();
        editor.go_to_page(2);
        editor.select_instrument(InstrumentId::Pencil);
        // Host scrolled away without telling the editor.
        editor.store_mut().show_page(0);
        stroke(&mut editor, &[(10.0, 10.0), (10.0, 30.0)]);
        assert_eq!(editor.store().annotation_count(), 0);

        editor.select_instrument(InstrumentId::Text);
        stroke(&mut editor, &[(100.0, 100.0), (100.0, 100.0)]);
        assert!(editor.current_text().is_none());
        assert_eq!(editor.store().annotation_count(), 0);
    }

    #[test]
    fn test_text_creation_clears_history() {
        let mut editor = editor();
        editor.select_instrument(InstrumentId::Text);
        stroke(&mut editor, &[(100.0, 100.0), (100.0, 100.0)]);
        editor.undo();
        assert!(editor.can_redo());
        assert_eq!(editor.tool(), Tool::Text);

        stroke(&mut editor, &[(200.0, 200.0), (200.0, 200.0)]);
        assert!(editor.current_text().is_some());
        assert!(!editor.can_redo());
        assert_eq!(editor.store().annotations(0).len(), 1);
    }

    #[test]
    fn test_no_document_is_a_no_op() {
        let mut editor = Editor::new(MemoryDocument::new(1, Rect::new(0.0, 0.0, 100.0, 100.0)));
        editor.select_instrument(InstrumentId::Pencil);
        stroke(&mut editor, &[(10.0, 10.0), (20.0, 20.0)]);
        editor.undo();
        editor.trash();

        assert_eq!(editor.document_state(), DocumentState::NoDocument);
        assert_eq!(editor.store().annotation_count(), 0);
        assert_eq!(editor.gesture_wiring(), GestureWiring::Idle);
    }

    #[test]
    fn test_text_box_lifecycle() {
        let mut editor = editor();
        editor.select_instrument(InstrumentId::Text);
        stroke(&mut editor, &[(100.0, 100.0), (100.0, 100.0)]);

        let (page, id) = editor.current_text().unwrap();
        assert_eq!(page, 0);
        assert_eq!(editor.gesture_wiring(), GestureWiring::Transform);

        let annotation = editor.store().find_annotation(0, id).unwrap();
        assert_eq!(annotation.kind(), AnnotationKind::Widget);
        let text = annotation.as_text().unwrap();
        assert_eq!(text.bounds(), Rect::new(100.0, 100.0, 250.0, 123.0));
        assert_eq!(text.text, "Text here...");
        assert_eq!(text.font_size, 15.0);
        assert!(text.is_active());

        // Touches are ignored while the box is current.
        stroke(&mut editor, &[(300.0, 300.0), (300.0, 300.0)]);
        assert_eq!(editor.store().annotations(0).len(), 1);

        editor.handle_pan(&PanEvent {
            phase: GesturePhase::Changed,
            location: Point::new(120.0, 110.0),
            translation: Vec2::new(5.0, 10.0),
        });
        editor.handle_pinch(&PinchEvent {
            phase: GesturePhase::Began,
            location: Point::new(120.0, 110.0),
            scale: 1.0,
            touches: vec![Point::new(0.0, 50.0), Point::new(200.0, 52.0)],
        });
        editor.handle_pinch(&PinchEvent {
            phase: GesturePhase::Changed,
            location: Point::new(120.0, 110.0),
            scale: 2.0,
            touches: vec![Point::new(0.0, 50.0), Point::new(200.0, 52.0)],
        });
        let bounds = editor.store().find_annotation(0, id).unwrap().bounds();
        assert_eq!(bounds, Rect::new(105.0, 90.0, 405.0, 113.0));

        editor.deselect_instrument(InstrumentId::Text);
        assert!(editor.current_text().is_none());
        let text = editor.store().find_annotation(0, id).unwrap().as_text().unwrap();
        assert_eq!(text.appearance(), TextAppearance::Committed);
    }

    #[test]
    fn test_command_commits_text_and_keeps_tool() {
        let mut editor = editor();
        editor.select_instrument(InstrumentId::Text);
        stroke(&mut editor, &[(100.0, 100.0), (100.0, 100.0)]);
        let (_, id) = editor.current_text().unwrap();

        editor.undo();
        assert!(editor.current_text().is_none());
        assert_eq!(editor.tool(), Tool::Text);
        let undone = editor.removal_stack().iter().last().unwrap();
        assert_eq!(undone.id(), id);
        assert!(!undone.as_text().unwrap().is_active());
    }

    #[test]
    fn test_erasing_current_text_releases_it() {
        let mut editor = editor();
        editor.select_instrument(InstrumentId::Text);
        stroke(&mut editor, &[(100.0, 100.0), (100.0, 100.0)]);

        assert_eq!(editor.erase_at(0, Point::new(110.0, 110.0)), 1);
        assert!(editor.current_text().is_none());
        assert_eq!(editor.gesture_wiring(), GestureWiring::Drawing);
    }

    #[test]
    fn test_cancelled_stroke_is_kept() {
        let mut editor = editor();
        editor.select_instrument(InstrumentId::Pencil);
        touch(&mut editor, TouchPhase::Began, 10.0, 10.0);
        touch(&mut editor, TouchPhase::Moved, 20.0, 20.0);
        touch(&mut editor, TouchPhase::Cancelled, 30.0, 30.0);
        touch(&mut editor, TouchPhase::Moved, 40.0, 40.0);

        let ink = editor.store().annotations(0)[0].as_ink().unwrap();
        assert_eq!(ink.paths()[0].len(), 2);
    }

    #[test]
    fn test_multi_touch_down_draws_nothing() {
        let mut editor = editor();
        editor.select_instrument(InstrumentId::Pencil);
        editor.handle_touch(&TouchEvent::new(TouchPhase::Began, Point::new(10.0, 10.0)).with_touch_count(2));
        touch(&mut editor, TouchPhase::Moved, 20.0, 20.0);
        touch(&mut editor, TouchPhase::Ended, 20.0, 20.0);
        assert!(editor.store().annotations(0).is_empty());
    }

    #[test]
    fn test_settings() {
        let mut editor = editor();
        editor.set_width_fraction(0.5).unwrap();
        assert_eq!(editor.settings().width(), 25.0);
        assert_eq!(editor.width_fraction(), 0.5);
        assert!(editor.set_stroke_width(0.0).is_err());
        assert!(editor.set_alpha(1.5).is_err());
        assert_eq!(editor.settings().width(), 25.0);

        editor.set_alpha(0.4).unwrap();
        editor.select_instrument(InstrumentId::Pencil);
        stroke(&mut editor, &[(10.0, 10.0), (20.0, 20.0)]);
        let ink = editor.store().annotations(0)[0].as_ink().unwrap();
        assert_eq!(ink.alpha, 0.4);
        assert_eq!(ink.width, 25.0);
    }

    #[test]
    fn test_notifications() {
        let mut editor = editor();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        editor.subscribe(move |event: &ToolEvent| sink.borrow_mut().push(event.clone()));

        editor.select_instrument(InstrumentId::Pencil);
        stroke(&mut editor, &[(10.0, 10.0), (20.0, 20.0)]);
        editor.undo();
        editor.set_color(Color::BLACK);
        editor.select_instrument(InstrumentId::ColorPick);

        let events = events.borrow();
        let bars: Vec<&Vec<InstrumentViewModel>> = events
            .iter()
            .filter_map(|e| match e {
                ToolEvent::SelectionChanged(bar) => Some(bar),
                ToolEvent::DrawConfigurationRequested => None,
            })
            .collect();
        assert_eq!(bars.len(), 3);
        assert!(bars[0][0].selected);
        assert_eq!(bars[1][4].tint, Color::BLACK);
        assert_eq!(bars[2][5].tint, Color::BLACK);
        assert_eq!(events.last(), Some(&ToolEvent::DrawConfigurationRequested));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = EditorConfig::default().with_erase_width(-1.0);
        let doc = MemoryDocument::new(1, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(Editor::with_config(doc, config).is_err());
    }
}
