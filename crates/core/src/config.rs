//! Editor limits and defaults
//!
//! One serializable struct covers every tunable of the overlay model so it
//! can be loaded from a preferences file or built programmatically.

use crate::geometry::Size;
use crate::placement::SizePreset;
use serde::{Deserialize, Serialize};

/// Signature box sizes per preset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignatureSizes {
    pub small: Size,
    pub medium: Size,
    pub large: Size,
}

impl Default for SignatureSizes {
    fn default() -> Self {
        Self {
            small: Size::new(150.0, 50.0),
            medium: Size::new(200.0, 60.0),
            large: Size::new(250.0, 75.0),
        }
    }
}

impl SignatureSizes {
    pub fn get(&self, preset: SizePreset) -> Size {
        match preset {
            SizePreset::Small => self.small,
            SizePreset::Medium => self.medium,
            SizePreset::Large => self.large,
        }
    }
}

/// Configuration for an editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of uploaded documents
    pub max_documents: usize,
    /// Maximum number of annotations across all documents
    pub max_annotations: usize,
    /// Drawn boxes narrower or shorter than this are discarded
    pub min_region_size: f32,
    /// Box synthesized around a dropped palette field
    pub default_field_size: Size,
    pub signature_sizes: SignatureSizes,
    /// Page surface that scoped commits keep their boxes on
    pub page_size: Size,
    /// Preview zoom; 1.0 maps one viewport pixel to one page unit
    pub zoom: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_documents: 10,
            max_annotations: 500,
            min_region_size: 10.0,
            default_field_size: Size::new(200.0, 60.0),
            signature_sizes: SignatureSizes::default(),
            page_size: Size::new(600.0, 800.0),
            zoom: 1.0,
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document limit.
    pub fn with_max_documents(mut self, max_documents: usize) -> Self {
        self.max_documents = max_documents;
        self
    }

    /// Sets the annotation limit.
    pub fn with_max_annotations(mut self, max_annotations: usize) -> Self {
        self.max_annotations = max_annotations;
        self
    }

    /// Sets the minimum width/height of a drawn box.
    pub fn with_min_region_size(mut self, min_region_size: f32) -> Self {
        self.min_region_size = min_region_size;
        self
    }

    /// Sets the size of boxes created by palette drops.
    pub fn with_default_field_size(mut self, size: Size) -> Self {
        self.default_field_size = size;
        self
    }

    /// Sets the page surface used by scoped commits.
    pub fn with_page_size(mut self, size: Size) -> Self {
        self.page_size = size;
        self
    }

    /// Sets the preview zoom.
    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }
}
