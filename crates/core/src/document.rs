//! Source documents and the flattened page list derived from them
//!
//! Documents are addressed by their positional index in upload order. The
//! index is not a permanent identity: removing a document shifts every later
//! document down by one, and every page and annotation keyed on a later index
//! follows in the same call.

use crate::annotation::AnnotationStore;
use crate::error::{OverlayError, OverlayResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Stable opaque identifier for an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub u64);

/// What the upload layer hands over once a file has been validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    pub size: u64,
    /// Zero when validation failed; such a document contributes no pages.
    pub page_count: u32,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, size: u64, page_count: u32) -> Self {
        Self { name: name.into(), size, page_count }
    }
}

/// An uploaded source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub size: u64,
    pub page_count: u32,
}

/// Address of one page: document position plus 1-based page number.
///
/// The derived ordering matches the flattened page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageRef {
    pub document_index: usize,
    pub page_number: u32,
}

impl PageRef {
    pub fn new(document_index: usize, page_number: u32) -> Self {
        Self { document_index, page_number }
    }

    /// Where this reference points after the document at `removed_index` is gone.
    ///
    /// `None` when it belonged to the removed document.
    pub fn after_document_removal(self, removed_index: usize) -> Option<PageRef> {
        match self.document_index {
            i if i == removed_index => None,
            i if i > removed_index => Some(PageRef::new(i - 1, self.page_number)),
            _ => Some(self),
        }
    }
}

/// Page rotation in quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

/// Direction for a quarter-turn rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotateDirection {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Normalize any multiple of 90 (negative values wrap)
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            _ => Some(Rotation::Deg270),
        }
    }

    pub fn rotated(self, direction: RotateDirection) -> Self {
        let delta = match direction {
            RotateDirection::Clockwise => 90,
            RotateDirection::CounterClockwise => -90,
        };
        Self::from_degrees(i32::from(self.degrees()) + delta).unwrap_or_default()
    }
}

/// One page of one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page_ref: PageRef,
    pub rotation: Rotation,
    /// Owning document's display name, for labels only
    pub document_name: String,
}

/// Ordered documents plus their flattened pages
#[derive(Debug, Clone)]
pub struct DocumentSet {
    documents: Vec<Document>,
    pages: Vec<Page>,
    active: usize,
    max_documents: usize,
    next_id: u64,
}

impl DocumentSet {
    /// Create an empty set accepting at most `max_documents` documents
    pub fn new(max_documents: usize) -> Self {
        Self { documents: Vec::new(), pages: Vec::new(), active: 0, max_documents, next_id: 1 }
    }

    pub fn max_documents(&self) -> usize {
        self.max_documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    /// Current positional index of a document
    pub fn index_of(&self, id: DocumentId) -> Option<usize> {
        self.documents.iter().position(|document| document.id == id)
    }

    /// Sum of all document sizes in bytes
    pub fn total_size(&self) -> u64 {
        self.documents.iter().map(|document| document.size).sum()
    }

    /// Append documents in order, deriving their pages.
    ///
    /// When the result would exceed the limit, the prefix that fits is still
    /// added and the error reports both the accepted ids and the dropped count.
    pub fn add_documents<I>(&mut self, files: I) -> OverlayResult<Vec<DocumentId>>
    where
        I: IntoIterator<Item = FileDescriptor>,
    {
        let mut accepted = Vec::new();
        let mut dropped = 0;

        for file in files {
            if self.documents.len() >= self.max_documents {
                dropped += 1;
                continue;
            }

            let id = DocumentId(self.next_id);
            self.next_id += 1;

            let index = self.documents.len();
            self.documents.push(Document { id, name: file.name, size: file.size, page_count: 0 });
            self.derive_pages(index, file.page_count);
            accepted.push(id);
        }

        debug!(added = accepted.len(), dropped, total = self.documents.len(), "documents added");

        if dropped > 0 {
            warn!(limit = self.max_documents, dropped, "document limit reached");
            return Err(OverlayError::DocumentCapacityExceeded {
                limit: self.max_documents,
                accepted,
                dropped,
            });
        }

        Ok(accepted)
    }

    /// Generate pages `1..=page_count` for a document that has none yet.
    ///
    /// Pages land in document order within the flattened list. Returns the new
    /// page references; a document that already has pages is left untouched.
    pub fn derive_pages(&mut self, document_index: usize, page_count: u32) -> Vec<PageRef> {
        let Some(document) = self.documents.get_mut(document_index) else {
            warn!(document_index, "derive_pages ignored: no such document");
            return Vec::new();
        };
        if document.page_count > 0 || page_count == 0 {
            return Vec::new();
        }

        document.page_count = page_count;
        let name = document.name.clone();

        let insert_at =
            self.pages.partition_point(|page| page.page_ref.document_index <= document_index);
        let new_pages: Vec<Page> = (1..=page_count)
            .map(|page_number| Page {
                page_ref: PageRef::new(document_index, page_number),
                rotation: Rotation::Deg0,
                document_name: name.clone(),
            })
            .collect();
        let refs = new_pages.iter().map(|page| page.page_ref).collect();

        self.pages.splice(insert_at..insert_at, new_pages);
        refs
    }

    /// Remove the document at `index` together with everything anchored to it.
    ///
    /// Pages and annotations of the removed document are deleted; those of
    /// later documents shift down by one index. Both collections are updated
    /// inside this call, so no caller ever sees them disagree.
    pub fn remove_document(
        &mut self,
        index: usize,
        annotations: &mut AnnotationStore,
    ) -> Option<Document> {
        if index >= self.documents.len() {
            warn!(index, len = self.documents.len(), "remove_document ignored: out of range");
            return None;
        }

        let removed = self.documents.remove(index);

        self.pages.retain_mut(|page| match page.page_ref.after_document_removal(index) {
            Some(shifted) => {
                page.page_ref = shifted;
                true
            }
            None => false,
        });
        let dropped_annotations = annotations.reindex_after_document_removal(index);

        if self.active >= index {
            self.active = self.active.saturating_sub(1);
        }
        if self.active >= self.documents.len() {
            self.active = self.documents.len().saturating_sub(1);
        }

        debug!(
            index,
            name = %removed.name,
            dropped_annotations,
            remaining = self.documents.len(),
            "document removed"
        );
        Some(removed)
    }

    /// Remove every document and page
    pub fn clear(&mut self, annotations: &mut AnnotationStore) {
        self.documents.clear();
        self.pages.clear();
        self.active = 0;
        annotations.clear();
    }

    /// Index of the document being edited, `None` when the set is empty
    pub fn active_document(&self) -> Option<usize> {
        (!self.documents.is_empty()).then_some(self.active)
    }

    /// Select the document being edited; out-of-range indices are ignored
    pub fn set_active_document(&mut self, index: usize) -> bool {
        if index < self.documents.len() {
            self.active = index;
            true
        } else {
            false
        }
    }

    /// Flattened pages in document order
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_refs(&self) -> Vec<PageRef> {
        self.pages.iter().map(|page| page.page_ref).collect()
    }

    pub fn page(&self, page_ref: PageRef) -> Option<&Page> {
        self.position_of(page_ref).map(|position| &self.pages[position])
    }

    pub fn contains_page(&self, page_ref: PageRef) -> bool {
        self.position_of(page_ref).is_some()
    }

    /// Pages of one document in page-number order
    pub fn pages_for(&self, document_index: usize) -> &[Page] {
        let start =
            self.pages.partition_point(|page| page.page_ref.document_index < document_index);
        let end =
            self.pages.partition_point(|page| page.page_ref.document_index <= document_index);
        &self.pages[start..end]
    }

    /// Number of pages derived for a document (0 when unknown)
    pub fn page_count(&self, document_index: usize) -> u32 {
        self.documents.get(document_index).map_or(0, |document| document.page_count)
    }

    pub fn first_page_of(&self, document_index: usize) -> Option<PageRef> {
        self.pages_for(document_index).first().map(|page| page.page_ref)
    }

    pub fn last_page_of(&self, document_index: usize) -> Option<PageRef> {
        self.pages_for(document_index).last().map(|page| page.page_ref)
    }

    /// Page after `current` in flattened order, crossing into the next document
    pub fn next_page(&self, current: PageRef) -> Option<PageRef> {
        let position = self.position_of(current)?;
        self.pages.get(position + 1).map(|page| page.page_ref)
    }

    /// Page before `current` in flattened order, crossing into the previous document
    pub fn previous_page(&self, current: PageRef) -> Option<PageRef> {
        let position = self.position_of(current)?;
        position.checked_sub(1).map(|previous| self.pages[previous].page_ref)
    }

    /// Rotate one page a quarter turn
    pub fn rotate_page(
        &mut self,
        page_ref: PageRef,
        direction: RotateDirection,
    ) -> Option<Rotation> {
        let position = self.position_of(page_ref)?;
        let page = &mut self.pages[position];
        page.rotation = page.rotation.rotated(direction);
        Some(page.rotation)
    }

    /// Rotate every page of a document; returns how many pages turned
    pub fn rotate_document(&mut self, document_index: usize, direction: RotateDirection) -> usize {
        let mut rotated = 0;
        let pages =
            self.pages.iter_mut().filter(|page| page.page_ref.document_index == document_index);
        for page in pages {
            page.rotation = page.rotation.rotated(direction);
            rotated += 1;
        }
        rotated
    }

    fn position_of(&self, page_ref: PageRef) -> Option<usize> {
        self.pages.binary_search_by(|page| page.page_ref.cmp(&page_ref)).ok()
    }
}
