//! Page-anchored annotation model
//!
//! Signatures, field placeholders and removal regions share one positional
//! contract (id, page, box) and differ only in payload. Geometry size and
//! payload are fixed at creation; only the position moves afterwards.
//! Page-number labels live alongside the annotations because they are
//! anchored to pages the same way and follow the same reindex rule.

use crate::document::PageRef;
use crate::error::{OverlayError, OverlayResult};
use crate::geometry::PageRect;
use crate::numbering::PageLabel;
use crate::scope::ApplyScope;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Unique identifier for an annotation
///
/// Generated using UUID v4, never reused.
pub type AnnotationId = uuid::Uuid;

/// How a signature image was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureSource {
    Draw,
    Type,
    Upload,
}

/// Signature image plus the style it was produced with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePayload {
    pub source: SignatureSource,
    /// Opaque image data, typically a data URL
    pub data: String,
    pub color: Option<String>,
    pub font_family: Option<String>,
    /// 0 (invisible) to 100 (opaque)
    pub transparency: u8,
}

impl SignaturePayload {
    pub fn new(source: SignatureSource, data: impl Into<String>) -> Self {
        Self { source, data: data.into(), color: None, font_family: None, transparency: 100 }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_font_family(mut self, font_family: impl Into<String>) -> Self {
        self.font_family = Some(font_family.into());
        self
    }

    pub fn with_transparency(mut self, transparency: u8) -> Self {
        self.transparency = transparency.min(100);
        self
    }
}

/// Kinds of placeholder fields on the palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Signature,
    Initials,
    Name,
    Date,
    Text,
    Stamp,
}

impl FieldKind {
    pub const ALL: [FieldKind; 6] = [
        FieldKind::Signature,
        FieldKind::Initials,
        FieldKind::Name,
        FieldKind::Date,
        FieldKind::Text,
        FieldKind::Stamp,
    ];

    /// Label drawn inside the placeholder
    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Signature => "Signature",
            FieldKind::Initials => "Initials",
            FieldKind::Name => "Name",
            FieldKind::Date => "Date",
            FieldKind::Text => "Text",
            FieldKind::Stamp => "Company Stamp",
        }
    }
}

/// Placeholder field payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPayload {
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldPayload {
    /// Signature fields are required, everything else optional
    pub fn for_kind(kind: FieldKind) -> Self {
        Self { kind, required: kind == FieldKind::Signature }
    }
}

/// Variant-specific part of an annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum AnnotationKind {
    Signature(SignaturePayload),
    Field(FieldPayload),
    /// Area to remove or redact; the box is the whole payload
    Region,
}

impl AnnotationKind {
    pub fn is_region(&self) -> bool {
        matches!(self, AnnotationKind::Region)
    }
}

/// Page-anchored overlay object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    id: AnnotationId,
    page: PageRef,
    bounds: PageRect,
    kind: AnnotationKind,
    scope: ApplyScope,
}

impl Annotation {
    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn page(&self) -> PageRef {
        self.page
    }

    pub fn bounds(&self) -> PageRect {
        self.bounds
    }

    pub fn kind(&self) -> &AnnotationKind {
        &self.kind
    }

    /// Scope captured when the annotation was created
    pub fn scope(&self) -> ApplyScope {
        self.scope
    }
}

/// Insertion-ordered collection of annotations for every page of every document
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    labels: BTreeMap<PageRef, PageLabel>,
    selected: Option<AnnotationId>,
    max_annotations: usize,
    min_size: f32,
}

impl AnnotationStore {
    /// Create a store holding at most `max_annotations`, discarding boxes under `min_size`
    pub fn new(max_annotations: usize, min_size: f32) -> Self {
        Self {
            annotations: Vec::new(),
            labels: BTreeMap::new(),
            selected: None,
            max_annotations,
            min_size,
        }
    }

    pub fn min_size(&self) -> f32 {
        self.min_size
    }

    pub fn max_annotations(&self) -> usize {
        self.max_annotations
    }

    /// Store a new annotation with the default `Current` scope.
    ///
    /// Boxes under the minimum size are discarded and yield `Ok(None)`.
    pub fn create(
        &mut self,
        page: PageRef,
        bounds: PageRect,
        kind: AnnotationKind,
    ) -> OverlayResult<Option<AnnotationId>> {
        self.create_scoped(page, bounds, kind, ApplyScope::Current)
    }

    /// Store a new annotation remembering the scope it was committed with
    pub fn create_scoped(
        &mut self,
        page: PageRef,
        bounds: PageRect,
        kind: AnnotationKind,
        scope: ApplyScope,
    ) -> OverlayResult<Option<AnnotationId>> {
        if !bounds.meets_minimum(self.min_size) {
            debug!(
                ?page,
                width = bounds.width,
                height = bounds.height,
                "undersized annotation discarded"
            );
            return Ok(None);
        }
        if self.annotations.len() >= self.max_annotations {
            warn!(limit = self.max_annotations, "annotation limit reached");
            return Err(OverlayError::AnnotationCapacityExceeded { limit: self.max_annotations });
        }

        let id = AnnotationId::new_v4();
        self.annotations.push(Annotation { id, page, bounds, kind, scope });
        debug!(%id, ?page, "annotation created");
        Ok(Some(id))
    }

    /// Move an annotation's top-left corner. No clamping to the page is applied.
    pub fn move_to(&mut self, id: AnnotationId, x: f32, y: f32) -> bool {
        match self.annotations.iter_mut().find(|annotation| annotation.id == id) {
            Some(annotation) => {
                annotation.bounds = annotation.bounds.with_origin(x, y);
                trace!(%id, x, y, "annotation moved");
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|annotation| annotation.id == id)
    }

    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let position = self.annotations.iter().position(|annotation| annotation.id == id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(self.annotations.remove(position))
    }

    /// Remove every annotation on one page
    pub fn remove_all_on(&mut self, page: PageRef) -> usize {
        let before = self.annotations.len();
        self.annotations.retain(|annotation| annotation.page != page);
        self.drop_stale_selection();
        before - self.annotations.len()
    }

    /// Remove every annotation and label
    pub fn clear(&mut self) -> usize {
        let removed = self.annotations.len();
        self.annotations.clear();
        self.labels.clear();
        self.selected = None;
        removed
    }

    /// Annotations on one page in insertion order
    pub fn list_for(&self, page: PageRef) -> Vec<&Annotation> {
        self.annotations.iter().filter(|annotation| annotation.page == page).collect()
    }

    /// All annotations in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn count_for_document(&self, document_index: usize) -> usize {
        self.annotations
            .iter()
            .filter(|annotation| annotation.page.document_index == document_index)
            .count()
    }

    pub fn select(&mut self, id: Option<AnnotationId>) {
        self.selected = id.filter(|id| self.get(*id).is_some());
    }

    pub fn selected(&self) -> Option<AnnotationId> {
        self.selected
    }

    /// Delete the selected annotation, if any
    pub fn delete_selected(&mut self) -> Option<Annotation> {
        let id = self.selected.take()?;
        self.remove(id)
    }

    /// Set or replace the page-number label of a page
    pub fn set_label(&mut self, label: PageLabel) {
        self.labels.insert(label.page, label);
    }

    pub fn label_for(&self, page: PageRef) -> Option<&PageLabel> {
        self.labels.get(&page)
    }

    /// Labels in flattened page order
    pub fn labels(&self) -> impl Iterator<Item = &PageLabel> {
        self.labels.values()
    }

    pub fn clear_labels(&mut self) {
        self.labels.clear();
    }

    /// Apply the document-removal rule to every page-anchored object.
    ///
    /// Objects on `removed_index` are deleted, those on later documents move
    /// down one index, earlier ones are untouched. Returns the number of
    /// annotations deleted.
    pub fn reindex_after_document_removal(&mut self, removed_index: usize) -> usize {
        let before = self.annotations.len();
        self.annotations.retain_mut(|annotation| {
            match annotation.page.after_document_removal(removed_index) {
                Some(shifted) => {
                    annotation.page = shifted;
                    true
                }
                None => false,
            }
        });
        self.drop_stale_selection();

        self.labels = std::mem::take(&mut self.labels)
            .into_values()
            .filter_map(|mut label| {
                label.page = label.page.after_document_removal(removed_index)?;
                Some((label.page, label))
            })
            .collect();

        before - self.annotations.len()
    }

    fn drop_stale_selection(&mut self) {
        if let Some(id) = self.selected {
            if self.get(id).is_none() {
                self.selected = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numbering::NumberPosition;

    fn store() -> AnnotationStore {
        AnnotationStore::new(100, 10.0)
    }

    fn rect(x: f32, y: f32) -> PageRect {
        PageRect::new(x, y, 40.0, 20.0)
    }

    fn region(store: &mut AnnotationStore, page: PageRef) -> AnnotationId {
        store.create(page, rect(0.0, 0.0), AnnotationKind::Region).unwrap().expect("region kept")
    }

    #[test]
    fn undersized_boxes_are_never_listed() {
        let mut store = store();
        let page = PageRef::new(0, 1);

        let created = store.create(page, PageRect::new(5.0, 5.0, 8.0, 8.0), AnnotationKind::Region);

        assert_eq!(created, Ok(None));
        assert!(store.list_for(page).is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn list_for_keeps_insertion_order() {
        let mut store = store();
        let page = PageRef::new(0, 1);
        let first = store.create(page, rect(300.0, 0.0), AnnotationKind::Region).unwrap().unwrap();
        store.create(PageRef::new(0, 2), rect(0.0, 0.0), AnnotationKind::Region).unwrap();
        let second = store.create(page, rect(0.0, 0.0), AnnotationKind::Region).unwrap().unwrap();

        let ids: Vec<AnnotationId> = store.list_for(page).iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut store = AnnotationStore::new(1, 10.0);
        let page = PageRef::new(0, 1);
        store.create(page, rect(0.0, 0.0), AnnotationKind::Region).unwrap();

        let result = store.create(page, rect(0.0, 0.0), AnnotationKind::Region);
        assert_eq!(result, Err(OverlayError::AnnotationCapacityExceeded { limit: 1 }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn move_changes_position_only_and_is_unbounded() {
        let mut store = store();
        let kind = AnnotationKind::Field(FieldPayload::for_kind(FieldKind::Date));
        let id = store.create(PageRef::new(0, 1), rect(10.0, 10.0), kind.clone()).unwrap().unwrap();

        assert!(store.move_to(id, -50.0, 5000.0));

        let annotation = store.get(id).expect("annotation exists");
        assert_eq!(annotation.bounds(), PageRect::new(-50.0, 5000.0, 40.0, 20.0));
        assert_eq!(annotation.kind(), &kind);
        assert!(!store.move_to(AnnotationId::new_v4(), 0.0, 0.0));
    }

    #[test]
    fn scoped_removal() {
        let mut store = store();
        let page = PageRef::new(0, 1);
        store.create(page, rect(0.0, 0.0), AnnotationKind::Region).unwrap();
        store.create(page, rect(0.0, 0.0), AnnotationKind::Region).unwrap();
        let other = region(&mut store, PageRef::new(1, 1));

        assert_eq!(store.remove_all_on(page), 2);
        assert_eq!(store.len(), 1);
        assert!(store.remove(other).is_some());
        assert!(store.remove(other).is_none());
        assert_eq!(store.clear(), 0);
    }

    #[test]
    fn removing_the_selected_annotation_clears_selection() {
        let mut store = store();
        let page = PageRef::new(0, 1);
        let id = store.create(page, rect(0.0, 0.0), AnnotationKind::Region).unwrap().unwrap();

        store.select(Some(id));
        assert_eq!(store.selected(), Some(id));
        assert!(store.delete_selected().is_some());
        assert_eq!(store.selected(), None);
        assert!(store.delete_selected().is_none());

        store.select(Some(AnnotationId::new_v4()));
        assert_eq!(store.selected(), None, "unknown ids cannot be selected");
    }

    #[test]
    fn reindex_deletes_and_shifts() {
        let mut store = store();
        let keep = region(&mut store, PageRef::new(0, 2));
        let gone = region(&mut store, PageRef::new(1, 1));
        let shifted = region(&mut store, PageRef::new(3, 4));
        store.select(Some(gone));

        assert_eq!(store.reindex_after_document_removal(1), 1);

        assert_eq!(store.get(keep).map(|a| a.page()), Some(PageRef::new(0, 2)));
        assert!(store.get(gone).is_none());
        assert_eq!(store.get(shifted).map(|a| a.page()), Some(PageRef::new(2, 4)));
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn labels_follow_document_removal() {
        let mut store = store();
        for document_index in 0..3 {
            store.set_label(PageLabel {
                page: PageRef::new(document_index, 1),
                text: format!("{document_index}"),
                position: NumberPosition::BottomCenter,
            });
        }

        store.reindex_after_document_removal(0);

        let pages: Vec<PageRef> = store.labels().map(|label| label.page).collect();
        assert_eq!(pages, vec![PageRef::new(0, 1), PageRef::new(1, 1)]);
        assert_eq!(store.label_for(PageRef::new(0, 1)).map(|l| l.text.as_str()), Some("1"));
    }

    #[test]
    fn signature_fields_are_required() {
        assert!(FieldPayload::for_kind(FieldKind::Signature).required);
        assert!(!FieldPayload::for_kind(FieldKind::Initials).required);
        assert_eq!(FieldKind::Stamp.label(), "Company Stamp");
    }

    #[test]
    fn transparency_is_capped() {
        let payload = SignaturePayload::new(SignatureSource::Type, "data:image/png;base64,AAAA")
            .with_transparency(250);
        assert_eq!(payload.transparency, 100);
    }
}
