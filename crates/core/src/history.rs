//! Undo/redo stack
//!
//! Undo takes the newest annotation off the page and parks it here; redo puts
//! it back. Annotations keep their id across the round trip.

use crate::annotation::Annotation;

/// LIFO of annotations removed from the current page
#[derive(Debug, Clone, Default)]
pub struct RemovalStack {
    removed: Vec<Annotation>,
}

impl RemovalStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, annotation: Annotation) {
        self.removed.push(annotation);
    }

    /// Most recently removed annotation
    pub fn pop(&mut self) -> Option<Annotation> {
        self.removed.pop()
    }

    pub fn clear(&mut self) {
        self.removed.clear();
    }

    pub fn len(&self) -> usize {
        self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }

    /// Whether a redo would restore anything
    pub fn can_redo(&self) -> bool {
        !self.removed.is_empty()
    }

    /// Removed annotations, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.removed.iter()
    }
}
