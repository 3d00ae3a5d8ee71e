//! Error taxonomy for the overlay model
//!
//! Capacity limits are the only condition surfaced to callers. Degenerate
//! gestures, out-of-range page numbers and drops outside a page surface are
//! normalized or ignored where they happen.

use crate::document::DocumentId;

/// Errors surfaced by the overlay model
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverlayError {
    /// Adding documents would exceed the configured maximum.
    ///
    /// The prefix that fit was still added; its ids are in `accepted`.
    #[error("document limit of {limit} reached: {dropped} file(s) dropped")]
    DocumentCapacityExceeded { limit: usize, accepted: Vec<DocumentId>, dropped: usize },

    /// The annotation store is full
    #[error("annotation limit of {limit} reached")]
    AnnotationCapacityExceeded { limit: usize },
}

impl OverlayError {
    /// Whether this is a capacity error (currently always true)
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(
            self,
            OverlayError::DocumentCapacityExceeded { .. }
                | OverlayError::AnnotationCapacityExceeded { .. }
        )
    }
}

/// Result type for overlay operations
pub type OverlayResult<T> = Result<T, OverlayError>;
