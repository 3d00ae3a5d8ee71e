//! Pagemark Core Library
//!
//! Multi-document page and annotation overlay model: uploaded documents,
//! their flattened pages, page-anchored annotations and the pointer state
//! machine that creates and moves them.

pub mod annotation;
pub mod config;
pub mod coordinate;
pub mod document;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod numbering;
pub mod placement;
pub mod scope;
pub mod session;

pub use annotation::{
    Annotation, AnnotationId, AnnotationKind, AnnotationStore, FieldKind, FieldPayload,
    SignaturePayload, SignatureSource,
};
pub use config::{EditorConfig, SignatureSizes};
pub use coordinate::{normalize_rect, CoordinateSpace, SurfaceBounds, ViewportPoint};
pub use document::{
    Document, DocumentId, DocumentSet, FileDescriptor, Page, PageRef, RotateDirection, Rotation,
};
pub use error::{OverlayError, OverlayResult};
pub use geometry::{PageCoordinate, PageRect, Size};
pub use interaction::{
    InteractionController, InteractionState, PointerEvent, PointerTarget, SurfaceContext,
};
pub use numbering::{NumberFormat, NumberPosition, PageLabel, PageNumbering};
pub use placement::{Placement, PositionPreset, SizePreset};
pub use scope::ApplyScope;
pub use session::{
    AnnotationView, DocumentPlan, EditorSession, PagePlan, ProcessingPlan, ScopedCommit,
    ScopedOperation,
};
