//! Annotation store adapter
//!
//! The host owns pages and their annotations. The editor only asks it to add,
//! remove and replace annotations, and to map screen points onto a page.
//! [`MemoryDocument`] is an in-process implementation used by the command
//! line tool and by tests.

use crate::annotation::{Annotation, AnnotationId, PageIndex};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// Page and annotation storage provided by the host
pub trait AnnotationStore {
    /// Annotations on `page` in insertion order (empty for unknown pages)
    fn annotations(&self, page: PageIndex) -> &[Annotation];

    /// Append `annotation` to `page`
    fn add_annotation(&mut self, page: PageIndex, annotation: Annotation);

    /// Remove the annotation with `id` from `page`
    fn remove_annotation(&mut self, page: PageIndex, id: AnnotationId) -> Option<Annotation>;

    /// Swap the stored annotation sharing `annotation`'s id, keeping its
    /// position on the page. Returns false if no such annotation exists.
    fn replace_annotation(&mut self, page: PageIndex, annotation: Annotation) -> bool;

    /// Bounds of `page` in page space
    fn page_bounds(&self, page: PageIndex) -> Option<Rect>;

    /// Page under a screen point, with the point converted to page space
    fn point_to_page(&self, screen: Point) -> Option<(PageIndex, Point)>;

    /// Bring `page` on screen so later touches map onto it. Returns false
    /// if the page does not exist.
    fn show_page(&mut self, page: PageIndex) -> bool;

    fn find_annotation(&self, page: PageIndex, id: AnnotationId) -> Option<&Annotation> {
        self.annotations(page).iter().find(|a| a.id() == id)
    }

    /// Most recently added annotation on `page`
    fn last_annotation(&self, page: PageIndex) -> Option<&Annotation> {
        self.annotations(page).last()
    }
}

impl<T: AnnotationStore + ?Sized> AnnotationStore for &mut T {
    fn annotations(&self, page: PageIndex) -> &[Annotation] {
        (**self).annotations(page)
    }

    fn add_annotation(&mut self, page: PageIndex, annotation: Annotation) {
        (**self).add_annotation(page, annotation)
    }

    fn remove_annotation(&mut self, page: PageIndex, id: AnnotationId) -> Option<Annotation> {
        (**self).remove_annotation(page, id)
    }

    fn replace_annotation(&mut self, page: PageIndex, annotation: Annotation) -> bool {
        (**self).replace_annotation(page, annotation)
    }

    fn page_bounds(&self, page: PageIndex) -> Option<Rect> {
        (**self).page_bounds(page)
    }

    fn point_to_page(&self, screen: Point) -> Option<(PageIndex, Point)> {
        (**self).point_to_page(screen)
    }

    fn show_page(&mut self, page: PageIndex) -> bool {
        (**self).show_page(page)
    }
}

/// One page of a [`MemoryDocument`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPage {
    pub bounds: Rect,
    pub annotations: Vec<Annotation>,
}

impl MemoryPage {
    pub fn new(bounds: Rect) -> Self {
        Self { bounds, annotations: Vec::new() }
    }
}

/// In-memory document with a single visible page
///
/// Screen points map to the visible page through the inverse of the view
/// transform (page space to screen space).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryDocument {
    pages: Vec<MemoryPage>,
    visible_page: PageIndex,
    view: Affine,
}

impl MemoryDocument {
    /// Create a document of `page_count` pages sharing `page_bounds`
    pub fn new(page_count: usize, page_bounds: Rect) -> Self {
        Self::from_pages(vec![page_bounds; page_count])
    }

    pub fn from_pages(bounds: Vec<Rect>) -> Self {
        Self {
            pages: bounds.into_iter().map(MemoryPage::new).collect(),
            visible_page: 0,
            view: Affine::IDENTITY,
        }
    }

    /// Set the page-to-screen transform
    pub fn with_view(mut self, view: Affine) -> Self {
        self.view = view;
        self
    }

    pub fn visible_page(&self) -> PageIndex {
        self.visible_page
    }

    pub fn page(&self, page: PageIndex) -> Option<&MemoryPage> {
        self.pages.get(usize::from(page))
    }

    pub fn pages(&self) -> &[MemoryPage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total annotations across all pages
    pub fn annotation_count(&self) -> usize {
        self.pages.iter().map(|p| p.annotations.len()).sum()
    }

    fn page_mut(&mut self, page: PageIndex) -> Option<&mut MemoryPage> {
        self.pages.get_mut(usize::from(page))
    }
}

impl AnnotationStore for MemoryDocument {
    fn annotations(&self, page: PageIndex) -> &[Annotation] {
        self.page(page).map(|p| p.annotations.as_slice()).unwrap_or(&[])
    }

    fn add_annotation(&mut self, page: PageIndex, annotation: Annotation) {
        if let Some(page) = self.page_mut(page) {
            page.annotations.push(annotation);
        }
    }

    fn remove_annotation(&mut self, page: PageIndex, id: AnnotationId) -> Option<Annotation> {
        let annotations = &mut self.page_mut(page)?.annotations;
        let index = annotations.iter().position(|a| a.id() == id)?;
        Some(annotations.remove(index))
    }

    fn replace_annotation(&mut self, page: PageIndex, annotation: Annotation) -> bool {
        let Some(page) = self.page_mut(page) else {
            return false;
        };
        match page.annotations.iter_mut().find(|a| a.id() == annotation.id()) {
            Some(slot) => {
                *slot = annotation;
                true
            }
            None => false,
        }
    }

    fn page_bounds(&self, page: PageIndex) -> Option<Rect> {
        self.page(page).map(|p| p.bounds)
    }

    fn point_to_page(&self, screen: Point) -> Option<(PageIndex, Point)> {
        self.page(self.visible_page)?;
        if self.view.determinant() == 0.0 {
            return None;
        }
        Some((self.visible_page, self.view.inverse() * screen))
    }

    fn show_page(&mut self, page: PageIndex) -> bool {
        if self.page(page).is_none() {
            return false;
        }
        self.visible_page = page;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Color, InkAnnotation};
    use kurbo::Vec2;

    fn letter() -> Rect {
        Rect::new(0.0, 0.0, 612.0, 792.0)
    }

    fn ink() -> Annotation {
        Annotation::ink(InkAnnotation::new(letter(), Color::RED, 1.0, 15.0))
    }

    #[test]
    fn test_add_and_remove_keep_order() {
        let mut doc = MemoryDocument::new(2, letter());
        let a = ink();
        let b = ink();
        let c = ink();
        let (a_id, b_id, c_id) = (a.id(), b.id(), c.id());

        doc.add_annotation(0, a);
        doc.add_annotation(0, b);
        doc.add_annotation(0, c);
        assert_eq!(doc.last_annotation(0).map(Annotation::id), Some(c_id));

        let removed = doc.remove_annotation(0, b_id).unwrap();
        assert_eq!(removed.id(), b_id);
        let ids: Vec<_> = doc.annotations(0).iter().map(Annotation::id).collect();
        assert_eq!(ids, vec![a_id, c_id]);
        assert!(doc.annotations(1).is_empty());
    }

    #[test]
    fn test_unknown_page_and_id() {
        let mut doc = MemoryDocument::new(1, letter());
        doc.add_annotation(5, ink());
        assert_eq!(doc.annotation_count(), 0);
        assert!(doc.annotations(5).is_empty());
        assert!(doc.remove_annotation(0, AnnotationId::new_v4()).is_none());
        assert!(!doc.replace_annotation(0, ink()));
        assert!(doc.page_bounds(3).is_none());
    }

    #[test]
    fn test_replace_in_place() {
        let mut doc = MemoryDocument::new(1, letter());
        let first = ink();
        let second = ink();
        let id = first.id();
        doc.add_annotation(0, first.clone());
        doc.add_annotation(0, second);

        let mut updated = first;
        updated.as_ink_mut().unwrap().width = 3.0;
        assert!(doc.replace_annotation(0, updated));

        assert_eq!(doc.annotations(0)[0].id(), id);
        assert_eq!(doc.annotations(0)[0].as_ink().unwrap().width, 3.0);
        assert_eq!(doc.find_annotation(0, id).map(Annotation::id), Some(id));
    }

    #[test]
    fn test_point_to_page_inverts_view() {
        let doc = MemoryDocument::new(3, letter())
            .with_view(Affine::translate(Vec2::new(10.0, 20.0)) * Affine::scale(2.0));
        let (page, point) = doc.point_to_page(Point::new(30.0, 60.0)).unwrap();
        assert_eq!(page, 0);
        assert!((point - Point::new(10.0, 20.0)).hypot() < 1e-9);
    }

    #[test]
    fn test_visible_page() {
        let mut doc = MemoryDocument::new(2, letter());
        assert!(doc.show_page(1));
        assert!(!doc.show_page(2));
        assert_eq!(doc.visible_page(), 1);
        assert_eq!(doc.point_to_page(Point::ZERO).map(|(p, _)| p), Some(1));
    }

    #[test]
    fn test_store_through_mut_reference() {
        fn add_one(mut store: impl AnnotationStore) {
            store.add_annotation(0, ink());
        }

        let mut doc = MemoryDocument::new(1, letter());
        add_one(&mut doc);
        add_one(&mut doc);
        assert_eq!(doc.annotations(0).len(), 2);
    }
}
