//! Pointer-driven interaction state machine
//!
//! Turns raw pointer and drag-and-drop events on a page surface into
//! annotation store mutations:
//!
//! - `Idle → Drawing → Idle`: press on empty surface, drag, release creates a
//!   region if the box is large enough
//! - `Idle → Dragging → Idle`: press on an annotation, every move repositions it
//! - `Idle → AwaitingDrop → Idle`: a palette field is in flight until dropped
//!   or cancelled
//!
//! Leaving the surface ends any draw or drag gesture, so the machine can never
//! be stranded mid-gesture. A draw that leaves is finished like a release at
//! its last point. Invalid gestures are dropped without an error.

use crate::annotation::{AnnotationId, AnnotationKind, AnnotationStore, FieldKind, FieldPayload};
use crate::coordinate::{normalize_rect, CoordinateSpace, SurfaceBounds, ViewportPoint};
use crate::document::PageRef;
use crate::error::OverlayResult;
use crate::geometry::{PageCoordinate, PageRect, Size};
use tracing::{debug, trace};

/// What the pointer went down on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty page surface
    Surface,
    /// Drag handle of an existing annotation
    Annotation(AnnotationId),
}

/// Raw pointer event from the rendering layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: ViewportPoint,
    pub target: PointerTarget,
}

impl PointerEvent {
    pub fn on_surface(x: f32, y: f32) -> Self {
        Self { position: ViewportPoint::new(x, y), target: PointerTarget::Surface }
    }

    pub fn on_annotation(id: AnnotationId, x: f32, y: f32) -> Self {
        Self { position: ViewportPoint::new(x, y), target: PointerTarget::Annotation(id) }
    }
}

/// The page surface an event happened on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceContext {
    pub page: PageRef,
    pub bounds: SurfaceBounds,
}

impl SurfaceContext {
    pub fn new(page: PageRef, bounds: SurfaceBounds) -> Self {
        Self { page, bounds }
    }
}

/// Gesture currently in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    Idle,
    Drawing { page: PageRef, start: PageCoordinate, current: PageCoordinate },
    Dragging { id: AnnotationId, offset: PageCoordinate },
    AwaitingDrop { field: FieldKind },
}

/// Pointer state machine feeding an [`AnnotationStore`]
#[derive(Debug, Clone)]
pub struct InteractionController {
    state: InteractionState,
    space: CoordinateSpace,
    field_size: Size,
}

impl InteractionController {
    pub fn new(space: CoordinateSpace, field_size: Size) -> Self {
        Self { state: InteractionState::Idle, space, field_size }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == InteractionState::Idle
    }

    pub fn coordinate_space(&self) -> CoordinateSpace {
        self.space
    }

    pub fn set_coordinate_space(&mut self, space: CoordinateSpace) {
        self.space = space;
    }

    /// Box being drawn, for live preview
    pub fn preview(&self) -> Option<(PageRef, PageRect)> {
        match self.state {
            InteractionState::Drawing { page, start, current } => {
                Some((page, normalize_rect(start, current)))
            }
            _ => None,
        }
    }

    /// Start a draw or drag gesture
    pub fn pointer_down(
        &mut self,
        event: PointerEvent,
        context: &SurfaceContext,
        store: &mut AnnotationStore,
    ) {
        if let InteractionState::AwaitingDrop { .. } = self.state {
            trace!("pointer down ignored while a field is in flight");
            return;
        }

        let point = self.space.to_page_relative(event.position, &context.bounds);

        match event.target {
            PointerTarget::Annotation(id) => {
                let Some(annotation) = store.get(id) else {
                    debug!(%id, "pointer down on unknown annotation ignored");
                    return;
                };
                let offset = point.offset_from(&annotation.bounds().origin());
                store.select(Some(id));
                self.transition(InteractionState::Dragging { id, offset });
            }
            PointerTarget::Surface => {
                if !context.bounds.contains(event.position) {
                    return;
                }
                store.select(None);
                self.transition(InteractionState::Drawing {
                    page: context.page,
                    start: point,
                    current: point,
                });
            }
        }
    }

    /// Update the gesture in progress.
    ///
    /// Returns the live preview box while drawing.
    pub fn pointer_move(
        &mut self,
        event: PointerEvent,
        context: &SurfaceContext,
        store: &mut AnnotationStore,
    ) -> Option<PageRect> {
        match self.state {
            InteractionState::Drawing { page, start, .. } => {
                let point = self.space.to_page_relative(event.position, &context.bounds);
                let current = self.space.clamp_to_surface(point, &context.bounds);
                self.state = InteractionState::Drawing { page, start, current };
                Some(normalize_rect(start, current))
            }
            InteractionState::Dragging { id, offset } => {
                let point = self.space.to_page_relative(event.position, &context.bounds);
                if !store.move_to(id, point.x - offset.x, point.y - offset.y) {
                    debug!(%id, "dragged annotation disappeared");
                    self.transition(InteractionState::Idle);
                }
                None
            }
            InteractionState::Idle | InteractionState::AwaitingDrop { .. } => None,
        }
    }

    /// Finish the gesture in progress.
    ///
    /// A draw gesture creates a region when its box meets the store's minimum
    /// size; the id of the new region is returned.
    pub fn pointer_up(
        &mut self,
        event: PointerEvent,
        context: &SurfaceContext,
        store: &mut AnnotationStore,
    ) -> OverlayResult<Option<AnnotationId>> {
        match self.state {
            InteractionState::Drawing { page, start, current } => {
                self.transition(InteractionState::Idle);

                let released = if context.page == page {
                    let point = self.space.to_page_relative(event.position, &context.bounds);
                    self.space.clamp_to_surface(point, &context.bounds)
                } else {
                    current
                };
                store.create(page, normalize_rect(start, released), AnnotationKind::Region)
            }
            InteractionState::Dragging { .. } => {
                self.transition(InteractionState::Idle);
                Ok(None)
            }
            InteractionState::Idle | InteractionState::AwaitingDrop { .. } => Ok(None),
        }
    }

    /// Pointer left the surface: end any draw or drag gesture.
    ///
    /// A draw is finished at its last clamped point, exactly as a release
    /// there would; a drag simply stops.
    pub fn pointer_leave(
        &mut self,
        store: &mut AnnotationStore,
    ) -> OverlayResult<Option<AnnotationId>> {
        match self.state {
            InteractionState::Drawing { page, start, current } => {
                self.transition(InteractionState::Idle);
                store.create(page, normalize_rect(start, current), AnnotationKind::Region)
            }
            InteractionState::Dragging { .. } => {
                self.transition(InteractionState::Idle);
                Ok(None)
            }
            InteractionState::Idle | InteractionState::AwaitingDrop { .. } => Ok(None),
        }
    }

    /// A palette field started being dragged toward the page
    pub fn begin_field_drag(&mut self, field: FieldKind) {
        self.transition(InteractionState::AwaitingDrop { field });
    }

    /// The palette drag ended without a drop
    pub fn cancel_field_drag(&mut self) {
        if let InteractionState::AwaitingDrop { .. } = self.state {
            self.transition(InteractionState::Idle);
        }
    }

    /// Drop a palette field at a viewport position.
    ///
    /// A default-sized box is centered on the drop point and shifted to lie
    /// on the surface. Drops outside the surface, or during a draw or drag
    /// gesture, create nothing.
    pub fn drop_field(
        &mut self,
        field: FieldKind,
        position: ViewportPoint,
        context: &SurfaceContext,
        store: &mut AnnotationStore,
    ) -> OverlayResult<Option<AnnotationId>> {
        match self.state {
            InteractionState::Drawing { .. } | InteractionState::Dragging { .. } => return Ok(None),
            InteractionState::Idle | InteractionState::AwaitingDrop { .. } => {
                self.transition(InteractionState::Idle);
            }
        }

        if !context.bounds.contains(position) {
            debug!(?field, "field dropped outside the page surface");
            return Ok(None);
        }

        let point = self.space.to_page_relative(position, &context.bounds);
        let surface = self.space.page_size(&context.bounds);
        let bounds = PageRect::centered_on(point, self.field_size).shifted_inside(surface);
        let kind = AnnotationKind::Field(FieldPayload::for_kind(field));
        let created = store.create(context.page, bounds, kind)?;
        if created.is_some() {
            store.select(created);
        }
        Ok(created)
    }

    /// Return to `Idle` without touching the store
    pub fn reset(&mut self) {
        self.transition(InteractionState::Idle);
    }

    fn transition(&mut self, next: InteractionState) {
        if std::mem::discriminant(&self.state) != std::mem::discriminant(&next) {
            debug!(from = ?self.state, to = ?next, "interaction state change");
        }
        self.state = next;
    }
}
