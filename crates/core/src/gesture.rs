//! Gesture events and the single-touch drawing recognizer
//!
//! Locations are in screen space; the editor maps them onto the page.

use crate::tool::Tool;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Phase of a raw touch sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

/// Raw touch sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub location: Point,
    /// Number of touches carried by the sample
    #[serde(default = "single_touch")]
    pub touch_count: usize,
}

fn single_touch() -> usize {
    1
}

impl TouchEvent {
    pub fn new(phase: TouchPhase, location: Point) -> Self {
        Self { phase, location, touch_count: 1 }
    }

    pub fn with_touch_count(mut self, touch_count: usize) -> Self {
        self.touch_count = touch_count;
        self
    }
}

/// Phase of a continuous two-finger gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

impl GesturePhase {
    pub fn is_finished(self) -> bool {
        matches!(self, GesturePhase::Ended | GesturePhase::Cancelled)
    }
}

/// Pan update; `translation` is the movement since the previous update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanEvent {
    pub phase: GesturePhase,
    pub location: Point,
    pub translation: Vec2,
}

/// Pinch update; `scale` is cumulative since the gesture began
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinchEvent {
    pub phase: GesturePhase,
    pub location: Point,
    pub scale: f64,
    /// Locations of the individual touches
    pub touches: Vec<Point>,
}

/// Drawing input recognized from raw touches
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawSample {
    Down(Point),
    Move(Point),
    Up(Point),
    /// The stroke was interrupted; whatever was drawn stays
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum RecognizerState {
    #[default]
    Possible,
    Tracking,
    Failed,
}

/// Recognizes single-finger drawing
///
/// A touch-down carrying more than one touch fails the recognizer until all
/// touches lift, leaving the touches to the pan and pinch recognizers.
#[derive(Debug, Clone, Default)]
pub struct DrawingRecognizer {
    state: RecognizerState,
}

impl DrawingRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracking(&self) -> bool {
        self.state == RecognizerState::Tracking
    }

    pub fn is_failed(&self) -> bool {
        self.state == RecognizerState::Failed
    }

    pub fn reset(&mut self) {
        self.state = RecognizerState::Possible;
    }

    /// Feed one touch sample, yielding the drawing input it produces
    pub fn handle(&mut self, event: &TouchEvent) -> Option<DrawSample> {
        use RecognizerState::*;

        match (self.state, event.phase) {
            (Possible, TouchPhase::Began) if event.touch_count > 1 => {
                trace!(touches = event.touch_count, "drawing recognizer failed");
                self.state = Failed;
                None
            }
            (Possible, TouchPhase::Began) => {
                self.state = Tracking;
                Some(DrawSample::Down(event.location))
            }
            (Tracking, TouchPhase::Began) if event.touch_count > 1 => {
                trace!(touches = event.touch_count, "stroke interrupted");
                self.state = Failed;
                Some(DrawSample::Cancel)
            }
            (Tracking, TouchPhase::Began | TouchPhase::Moved) => {
                Some(DrawSample::Move(event.location))
            }
            (Tracking, TouchPhase::Ended) => {
                self.state = Possible;
                Some(DrawSample::Up(event.location))
            }
            (Tracking, TouchPhase::Cancelled) => {
                self.state = Possible;
                Some(DrawSample::Cancel)
            }
            (Failed, TouchPhase::Ended | TouchPhase::Cancelled) => {
                self.state = Possible;
                None
            }
            _ => None,
        }
    }
}

/// Which recognizers are attached to the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureWiring {
    /// No annotation tool active
    Idle,
    /// Single-touch drawing drives the active tool
    Drawing,
    /// A text box is current: pan and pinch move and resize it
    Transform,
}

impl GestureWiring {
    pub fn for_state(tool: Tool, text_box_active: bool) -> Self {
        if text_box_active {
            GestureWiring::Transform
        } else if tool.is_drawing() {
            GestureWiring::Drawing
        } else {
            GestureWiring::Idle
        }
    }
}
