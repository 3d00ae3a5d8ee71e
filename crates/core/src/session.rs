//! Editing session facade
//!
//! `EditorSession` is the single owner of the document set, the annotation
//! store and the interaction controller. The upload UI, page renderer and
//! settings panel talk to the overlay model only through it, so every
//! mutation happens on one thread through one `&mut` borrow.

use crate::annotation::{
    Annotation, AnnotationId, AnnotationKind, AnnotationStore, FieldKind, FieldPayload,
    SignaturePayload,
};
use crate::config::EditorConfig;
use crate::coordinate::{CoordinateSpace, ViewportPoint};
use crate::document::{
    Document, DocumentId, DocumentSet, FileDescriptor, Page, PageRef, RotateDirection, Rotation,
};
use crate::error::OverlayResult;
use crate::geometry::{PageRect, Size};
use crate::interaction::{InteractionController, InteractionState, PointerEvent, SurfaceContext};
use crate::numbering::{PageLabel, PageNumbering};
use crate::placement::Placement;
use crate::scope::{self, ApplyScope};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Read-only projection of an annotation for renderers and the processing plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationView {
    pub id: AnnotationId,
    pub page: PageRef,
    pub bounds: PageRect,
    #[serde(flatten)]
    pub kind: AnnotationKind,
    pub scope: ApplyScope,
}

impl From<&Annotation> for AnnotationView {
    fn from(annotation: &Annotation) -> Self {
        Self {
            id: annotation.id(),
            page: annotation.page(),
            bounds: annotation.bounds(),
            kind: annotation.kind().clone(),
            scope: annotation.scope(),
        }
    }
}

/// Operation replicated across the pages of a scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum ScopedOperation {
    /// One signature per target page at a preset placement
    StampSignature { payload: SignaturePayload, placement: Placement },
    /// One placeholder field per target page
    PlaceField { kind: FieldKind, bounds: PageRect },
    /// Copy the current page's regions onto every other target page
    ReplicateRegions,
    /// Label every target page
    NumberPages(PageNumbering),
}

/// Outcome of a scoped commit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopedCommit {
    pub targets: Vec<PageRef>,
    pub created: Vec<AnnotationId>,
    pub labels: Vec<PageLabel>,
}

/// One page in the processing plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePlan {
    pub page: PageRef,
    pub rotation: u16,
    pub annotations: Vec<AnnotationView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<PageLabel>,
}

/// One document in the processing plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPlan {
    pub id: DocumentId,
    pub name: String,
    pub size: u64,
    pub pages: Vec<PagePlan>,
}

/// Snapshot handed to the external processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingPlan {
    pub documents: Vec<DocumentPlan>,
    pub total_size: u64,
    pub annotation_count: usize,
}

impl ProcessingPlan {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Overlay editing session over a set of uploaded documents
#[derive(Debug, Clone)]
pub struct EditorSession {
    config: EditorConfig,
    documents: DocumentSet,
    annotations: AnnotationStore,
    interaction: InteractionController,
    current_page: Option<PageRef>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        let space = CoordinateSpace::with_zoom(config.zoom);
        let interaction = InteractionController::new(space, config.default_field_size);
        Self {
            documents: DocumentSet::new(config.max_documents),
            annotations: AnnotationStore::new(config.max_annotations, config.min_region_size),
            interaction,
            current_page: None,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn documents(&self) -> &DocumentSet {
        &self.documents
    }

    pub fn annotation_store(&self) -> &AnnotationStore {
        &self.annotations
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.interaction.state()
    }

    /// Live box of an in-progress draw gesture
    pub fn draw_preview(&self) -> Option<(PageRef, PageRect)> {
        self.interaction.preview()
    }

    /// Change the preview zoom for subsequent pointer events
    pub fn set_zoom(&mut self, zoom: f32) {
        self.interaction.set_coordinate_space(CoordinateSpace::with_zoom(zoom));
    }

    /// Accept validated files; see [`DocumentSet::add_documents`] for the overflow rule
    pub fn on_documents_added<I>(&mut self, files: I) -> OverlayResult<Vec<DocumentId>>
    where
        I: IntoIterator<Item = FileDescriptor>,
    {
        let result = self.documents.add_documents(files);
        if self.current_page.is_none() {
            self.anchor_to_active_document();
        }
        result
    }

    /// Page count became known for a document added without one
    pub fn on_pages_derived(&mut self, document_index: usize, page_count: u32) -> Vec<PageRef> {
        let derived = self.documents.derive_pages(document_index, page_count);
        if self.current_page.is_none() {
            self.anchor_to_active_document();
        }
        derived
    }

    /// Remove a document and everything anchored to it
    pub fn on_document_removed(&mut self, index: usize) -> Option<Document> {
        let removed = self.documents.remove_document(index, &mut self.annotations)?;
        if !self.interaction.is_idle() {
            self.interaction.reset();
        }
        match self.current_page.and_then(|page| page.after_document_removal(index)) {
            Some(page) => {
                self.current_page = Some(page);
                self.documents.set_active_document(page.document_index);
            }
            None => self.anchor_to_active_document(),
        }
        info!(
            name = %removed.name,
            remaining = self.documents.len(),
            "document removed from session"
        );
        Some(removed)
    }

    /// Drop every document, annotation and label
    pub fn clear_documents(&mut self) {
        self.documents.clear(&mut self.annotations);
        self.interaction.reset();
        self.current_page = None;
    }

    /// Flattened page list in document order
    pub fn pages(&self) -> Vec<PageRef> {
        self.documents.page_refs()
    }

    pub fn page(&self, page_ref: PageRef) -> Option<&Page> {
        self.documents.page(page_ref)
    }

    /// Annotations of one page in insertion order
    pub fn annotations(&self, page: PageRef) -> Vec<AnnotationView> {
        self.annotations.list_for(page).into_iter().map(AnnotationView::from).collect()
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<AnnotationView> {
        self.annotations.get(id).map(AnnotationView::from)
    }

    pub fn current_page(&self) -> Option<PageRef> {
        self.current_page
    }

    pub fn active_document(&self) -> Option<usize> {
        self.documents.active_document()
    }

    /// Make an existing page current; unknown pages are ignored
    pub fn go_to_page(&mut self, page: PageRef) -> bool {
        if !self.documents.contains_page(page) {
            debug!(?page, "go_to_page ignored: no such page");
            return false;
        }
        self.documents.set_active_document(page.document_index);
        self.current_page = Some(page);
        true
    }

    pub fn next_page(&mut self) -> Option<PageRef> {
        let next = self.documents.next_page(self.current_page?)?;
        self.go_to_page(next);
        Some(next)
    }

    pub fn previous_page(&mut self) -> Option<PageRef> {
        let previous = self.documents.previous_page(self.current_page?)?;
        self.go_to_page(previous);
        Some(previous)
    }

    /// Make a document active and jump to its first page
    pub fn set_active_document(&mut self, index: usize) -> bool {
        if !self.documents.set_active_document(index) {
            return false;
        }
        self.current_page = self.documents.first_page_of(index);
        true
    }

    pub fn next_document(&mut self) -> Option<usize> {
        let next = self.documents.active_document()? + 1;
        self.set_active_document(next).then_some(next)
    }

    pub fn previous_document(&mut self) -> Option<usize> {
        let previous = self.documents.active_document()?.checked_sub(1)?;
        self.set_active_document(previous).then_some(previous)
    }

    fn anchor_to_active_document(&mut self) {
        self.current_page =
            self.documents.active_document().and_then(|index| self.documents.first_page_of(index));
        debug!(current = ?self.current_page, "current page re-anchored");
    }

    pub fn rotate_page(&mut self, page: PageRef, direction: RotateDirection) -> Option<Rotation> {
        self.documents.rotate_page(page, direction)
    }

    pub fn rotate_current_page(&mut self, direction: RotateDirection) -> Option<Rotation> {
        let page = self.current_page?;
        self.rotate_page(page, direction)
    }

    pub fn rotate_document(&mut self, document_index: usize, direction: RotateDirection) -> usize {
        self.documents.rotate_document(document_index, direction)
    }

    pub fn on_pointer_down(&mut self, event: PointerEvent, context: &SurfaceContext) {
        if !self.documents.contains_page(context.page) {
            debug!(page = ?context.page, "pointer down on unknown page ignored");
            return;
        }
        self.go_to_page(context.page);
        self.interaction.pointer_down(event, context, &mut self.annotations);
    }

    pub fn on_pointer_move(
        &mut self,
        event: PointerEvent,
        context: &SurfaceContext,
    ) -> Option<PageRect> {
        self.interaction.pointer_move(event, context, &mut self.annotations)
    }

    pub fn on_pointer_up(
        &mut self,
        event: PointerEvent,
        context: &SurfaceContext,
    ) -> OverlayResult<Option<AnnotationId>> {
        self.interaction.pointer_up(event, context, &mut self.annotations)
    }

    /// Pointer left the surface; a draw in progress is finished where it stood
    pub fn on_pointer_leave(&mut self) -> OverlayResult<Option<AnnotationId>> {
        self.interaction.pointer_leave(&mut self.annotations)
    }

    pub fn on_field_drag_started(&mut self, field: FieldKind) {
        self.interaction.begin_field_drag(field);
    }

    pub fn on_field_drag_cancelled(&mut self) {
        self.interaction.cancel_field_drag();
    }

    /// Turn a palette drop into a field annotation on the page under the pointer
    pub fn on_field_dropped(
        &mut self,
        field: FieldKind,
        drop_point: ViewportPoint,
        context: &SurfaceContext,
    ) -> OverlayResult<Option<AnnotationId>> {
        if !self.documents.contains_page(context.page) {
            self.interaction.cancel_field_drag();
            debug!(page = ?context.page, "field dropped on unknown page");
            return Ok(None);
        }
        self.interaction.drop_field(field, drop_point, context, &mut self.annotations)
    }

    pub fn select(&mut self, id: Option<AnnotationId>) {
        self.annotations.select(id);
    }

    pub fn selected(&self) -> Option<AnnotationId> {
        self.annotations.selected()
    }

    pub fn delete_selected(&mut self) -> Option<AnnotationView> {
        self.annotations.delete_selected().as_ref().map(AnnotationView::from)
    }

    pub fn delete_annotation(&mut self, id: AnnotationId) -> Option<AnnotationView> {
        self.annotations.remove(id).as_ref().map(AnnotationView::from)
    }

    /// Remove every annotation on the current page
    pub fn clear_current_page(&mut self) -> usize {
        match self.current_page {
            Some(page) => self.annotations.remove_all_on(page),
            None => 0,
        }
    }

    /// Remove every annotation and label while keeping the documents
    pub fn clear_annotations(&mut self) -> usize {
        self.annotations.clear()
    }

    /// Apply an operation to every page the scope resolves to.
    ///
    /// The scope is resolved against the current page's document. Boxes are
    /// shifted to lie on the configured page surface. When the
    /// annotation limit is hit part-way, the annotations created so far stay
    /// in the store and the capacity error is returned.
    pub fn commit_scoped_operation(
        &mut self,
        scope: ApplyScope,
        operation: ScopedOperation,
    ) -> OverlayResult<ScopedCommit> {
        let Some(current) = self.current_page else {
            debug!("scoped commit ignored: no current page");
            return Ok(ScopedCommit::default());
        };

        let page_count = self.documents.page_count(current.document_index);
        let targets = scope::resolve(scope, current, page_count);
        let mut commit = ScopedCommit { targets: targets.clone(), ..ScopedCommit::default() };

        match operation {
            ScopedOperation::StampSignature { payload, placement } => {
                let bounds = self.on_page(placement.resolve(&self.config.signature_sizes));
                for &page in &targets {
                    let kind = AnnotationKind::Signature(payload.clone());
                    let created = self.annotations.create_scoped(page, bounds, kind, scope)?;
                    commit.created.extend(created);
                }
            }
            ScopedOperation::PlaceField { kind, bounds } => {
                let bounds = self.on_page(bounds);
                for &page in &targets {
                    let field = AnnotationKind::Field(FieldPayload::for_kind(kind));
                    let created = self.annotations.create_scoped(page, bounds, field, scope)?;
                    commit.created.extend(created);
                }
            }
            ScopedOperation::ReplicateRegions => {
                let regions: Vec<PageRect> = self
                    .annotations
                    .list_for(current)
                    .into_iter()
                    .filter(|annotation| annotation.kind().is_region())
                    .map(|annotation| self.on_page(annotation.bounds()))
                    .collect();
                for &page in targets.iter().filter(|&&page| page != current) {
                    for &bounds in &regions {
                        let kind = AnnotationKind::Region;
                        let created = self.annotations.create_scoped(page, bounds, kind, scope)?;
                        commit.created.extend(created);
                    }
                }
            }
            ScopedOperation::NumberPages(numbering) => {
                for &page in &targets {
                    if let Some(label) = numbering.label_for(page) {
                        self.annotations.set_label(label.clone());
                        commit.labels.push(label);
                    }
                }
            }
        }

        debug!(
            ?scope,
            targets = commit.targets.len(),
            created = commit.created.len(),
            labels = commit.labels.len(),
            "scoped operation committed"
        );
        Ok(commit)
    }

    fn on_page(&self, bounds: PageRect) -> PageRect {
        bounds.shifted_inside(self.config.page_size)
    }

    /// Default size of a box created from a palette drop
    pub fn default_field_size(&self) -> Size {
        self.config.default_field_size
    }

    /// Per-document snapshot of pages, rotations, annotations and labels
    pub fn processing_plan(&self) -> ProcessingPlan {
        let documents = self
            .documents
            .documents()
            .iter()
            .enumerate()
            .map(|(index, document)| DocumentPlan {
                id: document.id,
                name: document.name.clone(),
                size: document.size,
                pages: self
                    .documents
                    .pages_for(index)
                    .iter()
                    .map(|page| PagePlan {
                        page: page.page_ref,
                        rotation: page.rotation.degrees(),
                        annotations: self.annotations(page.page_ref),
                        label: self.annotations.label_for(page.page_ref).cloned(),
                    })
                    .collect(),
            })
            .collect();

        ProcessingPlan {
            documents,
            total_size: self.documents.total_size(),
            annotation_count: self.annotations.len(),
        }
    }
}
