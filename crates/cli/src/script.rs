//! Session event scripts
//!
//! A script is a JSON document listing the events a UI would deliver to an
//! `EditorSession`. Annotations are referred to by creation order (`0` is the
//! first annotation the script created) because their ids are random.

use anyhow::{bail, Result};
use pagemark_core::{
    AnnotationId, ApplyScope, EditorSession, FieldKind, FileDescriptor, OverlayResult, PageRef,
    PointerEvent, ProcessingPlan, RotateDirection, ScopedOperation, SurfaceBounds,
    SurfaceContext, ViewportPoint,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Surface used by pointer events that do not carry their own
    #[serde(default = "default_surface")]
    pub surface: SurfaceBounds,
    pub events: Vec<Event>,
}

fn default_surface() -> SurfaceBounds {
    SurfaceBounds::new(0.0, 0.0, 600.0, 800.0)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    AddDocuments { files: Vec<FileDescriptor> },
    PagesDerived { document_index: usize, page_count: u32 },
    RemoveDocument { index: usize },
    ClearDocuments,
    GoToPage { page: PageRef },
    NextPage,
    PreviousPage,
    NextDocument,
    PreviousDocument,
    SetActiveDocument { index: usize },
    SetZoom { zoom: f32 },
    PointerDown {
        x: f32,
        y: f32,
        #[serde(default)]
        page: Option<PageRef>,
        /// Creation-order index of the annotation under the pointer
        #[serde(default)]
        annotation: Option<usize>,
    },
    PointerMove {
        x: f32,
        y: f32,
        #[serde(default)]
        page: Option<PageRef>,
    },
    PointerUp {
        x: f32,
        y: f32,
        #[serde(default)]
        page: Option<PageRef>,
    },
    PointerLeave,
    FieldDragStarted { field: FieldKind },
    FieldDragCancelled,
    FieldDropped {
        field: FieldKind,
        x: f32,
        y: f32,
        #[serde(default)]
        page: Option<PageRef>,
    },
    Select { annotation: usize },
    DeleteSelected,
    ClearPage,
    ClearAnnotations,
    RotatePage {
        direction: RotateDirection,
        #[serde(default)]
        page: Option<PageRef>,
    },
    RotateDocument { index: usize, direction: RotateDirection },
    Commit {
        #[serde(default)]
        scope: ApplyScope,
        operation: ScopedOperation,
    },
}

/// Capacity error surfaced while replaying
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub step: usize,
    pub message: String,
}

/// Final state after a replay
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub current_page: Option<PageRef>,
    pub selected: Option<AnnotationId>,
    pub notices: Vec<Notice>,
    pub plan: ProcessingPlan,
}

/// Executes script events against one session
pub struct Replay {
    session: EditorSession,
    surface: SurfaceBounds,
    created: Vec<AnnotationId>,
    notices: Vec<Notice>,
    strict: bool,
}

impl Replay {
    pub fn new(session: EditorSession, surface: SurfaceBounds) -> Self {
        Self { session, surface, created: Vec::new(), notices: Vec::new(), strict: false }
    }

    /// Abort on the first capacity error instead of recording it
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn run(mut self, events: Vec<Event>) -> Result<ReplayReport> {
        for (step, event) in events.into_iter().enumerate() {
            debug!(step, ?event, "replaying event");
            self.apply(step, event)?;
        }

        Ok(ReplayReport {
            current_page: self.session.current_page(),
            selected: self.session.selected(),
            notices: self.notices,
            plan: self.session.processing_plan(),
        })
    }

    fn apply(&mut self, step: usize, event: Event) -> Result<()> {
        match event {
            Event::AddDocuments { files } => {
                let result = self.session.on_documents_added(files).map(|_| ());
                self.record(step, result)?;
            }
            Event::PagesDerived { document_index, page_count } => {
                self.session.on_pages_derived(document_index, page_count);
            }
            Event::RemoveDocument { index } => {
                self.session.on_document_removed(index);
            }
            Event::ClearDocuments => self.session.clear_documents(),
            Event::GoToPage { page } => {
                self.session.go_to_page(page);
            }
            Event::NextPage => {
                self.session.next_page();
            }
            Event::PreviousPage => {
                self.session.previous_page();
            }
            Event::NextDocument => {
                self.session.next_document();
            }
            Event::PreviousDocument => {
                self.session.previous_document();
            }
            Event::SetActiveDocument { index } => {
                self.session.set_active_document(index);
            }
            Event::SetZoom { zoom } => self.session.set_zoom(zoom),
            Event::PointerDown { x, y, page, annotation } => {
                let Some(context) = self.context(page) else { return Ok(()) };
                let event = match annotation {
                    Some(index) => PointerEvent::on_annotation(self.annotation(step, index)?, x, y),
                    None => PointerEvent::on_surface(x, y),
                };
                self.session.on_pointer_down(event, &context);
            }
            Event::PointerMove { x, y, page } => {
                let Some(context) = self.context(page) else { return Ok(()) };
                self.session.on_pointer_move(PointerEvent::on_surface(x, y), &context);
            }
            Event::PointerUp { x, y, page } => {
                let Some(context) = self.context(page) else { return Ok(()) };
                let result = self.session.on_pointer_up(PointerEvent::on_surface(x, y), &context);
                self.record_created(step, result)?;
            }
            Event::PointerLeave => {
                let result = self.session.on_pointer_leave();
                self.record_created(step, result)?;
            }
            Event::FieldDragStarted { field } => self.session.on_field_drag_started(field),
            Event::FieldDragCancelled => self.session.on_field_drag_cancelled(),
            Event::FieldDropped { field, x, y, page } => {
                let Some(context) = self.context(page) else { return Ok(()) };
                let point = ViewportPoint::new(x, y);
                let result = self.session.on_field_dropped(field, point, &context);
                self.record_created(step, result)?;
            }
            Event::Select { annotation } => {
                let id = self.annotation(step, annotation)?;
                self.session.select(Some(id));
            }
            Event::DeleteSelected => {
                self.session.delete_selected();
            }
            Event::ClearPage => {
                self.session.clear_current_page();
            }
            Event::ClearAnnotations => {
                self.session.clear_annotations();
            }
            Event::RotatePage { direction, page } => {
                match page.or(self.session.current_page()) {
                    Some(page) => {
                        self.session.rotate_page(page, direction);
                    }
                    None => debug!(step, "rotate ignored: no page"),
                }
            }
            Event::RotateDocument { index, direction } => {
                self.session.rotate_document(index, direction);
            }
            Event::Commit { scope, operation } => {
                match self.session.commit_scoped_operation(scope, operation) {
                    Ok(commit) => self.created.extend(commit.created),
                    Err(error) => {
                        // annotations created before the overflow are kept but their ids are lost
                        self.resync_created();
                        self.record(step, Err(error))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn context(&self, page: Option<PageRef>) -> Option<SurfaceContext> {
        let page = page.or(self.session.current_page())?;
        Some(SurfaceContext::new(page, self.surface))
    }

    fn annotation(&self, step: usize, index: usize) -> Result<AnnotationId> {
        match self.created.get(index) {
            Some(id) => Ok(*id),
            None => bail!("step {step}: annotation #{index} has not been created"),
        }
    }

    fn record_created(
        &mut self,
        step: usize,
        result: OverlayResult<Option<AnnotationId>>,
    ) -> Result<()> {
        match result {
            Ok(created) => {
                self.created.extend(created);
                Ok(())
            }
            Err(error) => self.record(step, Err(error)),
        }
    }

    fn record(&mut self, step: usize, result: OverlayResult<()>) -> Result<()> {
        let Err(error) = result else { return Ok(()) };
        if self.strict {
            bail!("step {step}: {error}");
        }
        self.notices.push(Notice { step, message: error.to_string() });
        Ok(())
    }

    // Append ids present in the store but not yet known, in store order
    fn resync_created(&mut self) {
        let known = &self.created;
        let missing: Vec<AnnotationId> = self
            .session
            .annotation_store()
            .iter()
            .map(|annotation| annotation.id())
            .filter(|id| !known.contains(id))
            .collect();
        self.created.extend(missing);
    }
}
