//! PDF Ink Core Library
//!
//! Touch-driven annotation engine for PDF pages: freehand ink, erasing,
//! movable text boxes and undo/redo, layered over a host page store.

pub mod annotation;
pub mod color;
pub mod config;
pub mod editor;
pub mod erase;
pub mod error;
pub mod gesture;
pub mod history;
pub mod store;
pub mod stroke;
pub mod tool;
pub mod transform;

pub use annotation::{
    Annotation, AnnotationBody, AnnotationId, AnnotationKind, Color, InkAnnotation, InkPath,
    PageIndex, TextAnnotation, TextAppearance,
};
pub use color::{Hsb, Palette, Swatch};
pub use config::{DrawSettings, EditorConfig};
pub use editor::{DocumentState, Editor};
pub use erase::{EraseOutcome, Eraser, FillRule, Outline, DEFAULT_ERASE_WIDTH};
pub use error::{EditorError, EditorResult};
pub use gesture::{
    DrawSample, DrawingRecognizer, GesturePhase, GestureWiring, PanEvent, PinchEvent, TouchEvent,
    TouchPhase,
};
pub use history::RemovalStack;
pub use store::{AnnotationStore, MemoryDocument, MemoryPage};
pub use stroke::StrokeBuilder;
pub use tool::{
    Command, InstrumentId, InstrumentViewModel, Selection, SubscriptionId, Tool, ToolEvent,
    ToolStateMachine,
};
pub use transform::{axis_lock, clamp_size, AxisLock, TextBoxController};
