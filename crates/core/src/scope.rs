//! Expansion of a user-chosen scope into concrete target pages
//!
//! Stateless: consulted only when an operation is committed across pages.

use crate::document::PageRef;
use serde::{Deserialize, Serialize};

/// Which pages of the current document an action applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum ApplyScope {
    /// Only the page being edited
    #[default]
    Current,
    /// Every page of the current page's document
    All,
    /// 1-based page range within the current page's document, as typed
    Range { start: u32, end: u32 },
}

/// Resolve a scope against the current page and its document's page count.
///
/// Range inputs are normalized rather than rejected: a reversed pair covers
/// the pages from `end` up to the page before `start`, then both ends are
/// clamped so that `1 <= start <= end <= page_count`. An empty document
/// yields no targets for `All` and `Range`.
pub fn resolve(scope: ApplyScope, current: PageRef, page_count: u32) -> Vec<PageRef> {
    let document_index = current.document_index;
    let pages = |start: u32, end: u32| -> Vec<PageRef> {
        (start..=end).map(|page_number| PageRef::new(document_index, page_number)).collect()
    };

    match scope {
        ApplyScope::Current => vec![current],
        ApplyScope::All if page_count == 0 => Vec::new(),
        ApplyScope::All => pages(1, page_count),
        ApplyScope::Range { .. } if page_count == 0 => Vec::new(),
        ApplyScope::Range { start, end } => {
            let (start, end) = normalize_range(start, end);
            let start = start.clamp(1, page_count);
            let end = end.clamp(start, page_count);
            pages(start, end)
        }
    }
}

fn normalize_range(start: u32, end: u32) -> (u32, u32) {
    if start > end {
        (end, start - 1)
    } else {
        (start, end)
    }
}
