//! Preset placement for stamped signatures

use crate::config::SignatureSizes;
use crate::geometry::{PageCoordinate, PageRect};
use serde::{Deserialize, Serialize};

/// Signature box size preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizePreset {
    Small,
    #[default]
    Medium,
    Large,
}

/// Where a stamped signature's top-left corner goes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositionPreset {
    #[default]
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Custom { x: f32, y: f32 },
}

impl PositionPreset {
    /// Top-left corner for this preset on the standard preview surface
    pub fn origin(self) -> PageCoordinate {
        match self {
            PositionPreset::Center => PageCoordinate::new(250.0, 300.0),
            PositionPreset::TopLeft => PageCoordinate::new(50.0, 50.0),
            PositionPreset::TopRight => PageCoordinate::new(450.0, 50.0),
            PositionPreset::BottomLeft => PageCoordinate::new(50.0, 500.0),
            PositionPreset::BottomRight => PageCoordinate::new(450.0, 500.0),
            PositionPreset::Custom { x, y } => PageCoordinate::new(x, y),
        }
    }
}

/// Size and position chosen in the signature panel
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    pub size: SizePreset,
    pub position: PositionPreset,
}

impl Placement {
    pub fn new(size: SizePreset, position: PositionPreset) -> Self {
        Self { size, position }
    }

    pub fn resolve(&self, sizes: &SignatureSizes) -> PageRect {
        let origin = self.position.origin();
        let size = sizes.get(self.size);
        PageRect::new(origin.x, origin.y, size.width, size.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_resolves_to_box() {
        let placement = Placement::new(SizePreset::Small, PositionPreset::TopRight);
        let rect = placement.resolve(&SignatureSizes::default());
        assert_eq!(rect, PageRect::new(450.0, 50.0, 150.0, 50.0));
    }

    #[test]
    fn default_is_medium_centered() {
        let rect = Placement::default().resolve(&SignatureSizes::default());
        assert_eq!(rect, PageRect::new(250.0, 300.0, 200.0, 60.0));
    }
}
