//! Geometry record for a single element.

use super::identifiers::ItemId;
use crate::geometry::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// The three element categories the layout knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A regular cell.
    Cell,
    /// A section header.
    Header,
    /// A section footer.
    Footer,
}

impl ItemKind {
    /// Headers and footers are supplementary views in the host's terms.
    pub fn is_supplementary(&self) -> bool {
        matches!(self, ItemKind::Header | ItemKind::Footer)
    }
}

/// Size intent supplied by the delegate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSize {
    /// Use the layout's estimated item size and measure later.
    #[default]
    Auto,
    /// Start from this size and measure later.
    Estimated(Size),
    /// The final size; no measurement needed.
    Exact(Size),
}

/// Horizontal placement of an element inside the layout frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemAlignment {
    /// Against the left inset.
    Leading,
    /// Centered in the available width.
    Center,
    /// Against the right inset.
    Trailing,
    /// Stretched across the available width.
    #[default]
    FullWidth,
}

/// Where an element sticks while its section scrolls through the viewport.
///
/// Pinning is relative to the owning section: a pinned element never leaves
/// its section's vertical extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemPinning {
    /// Scrolls with the content.
    #[default]
    None,
    /// Sticks to the top of the visible area (usual for headers).
    Top,
    /// Sticks to the bottom of the visible area (usual for footers).
    Bottom,
}

/// Everything needed to create an [`Item`], resolved from delegate answers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemConfiguration {
    /// Starting size.
    pub preferred_size: Size,
    /// Known final size, if the delegate returned an exact one.
    pub calculated_size: Option<Size>,
    /// Horizontal placement.
    pub alignment: ItemAlignment,
    /// Pinning behavior.
    pub pinning: ItemPinning,
}

impl ItemConfiguration {
    /// Configuration with the given preferred size and default placement.
    pub fn with_size(preferred_size: Size) -> Self {
        Self {
            preferred_size,
            calculated_size: None,
            alignment: ItemAlignment::default(),
            pinning: ItemPinning::default(),
        }
    }
}

/// One laid-out element: cell, header or footer.
///
/// `offset_y` is relative to the owning section's top edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    id: ItemId,
    /// Size supplied before measurement.
    pub preferred_size: Size,
    /// Measured size; `None` until the host reports one.
    pub calculated_size: Option<Size>,
    /// Whether a measurement has ever been stored.
    pub calculated_once: bool,
    /// Horizontal placement.
    pub alignment: ItemAlignment,
    /// Pinning behavior.
    pub pinning: ItemPinning,
    /// Vertical position inside the section.
    pub offset_y: f64,
}

impl Item {
    /// Create an item with a freshly allocated id.
    pub fn new(configuration: ItemConfiguration) -> Self {
        Self::with_id(ItemId::next(), configuration)
    }

    /// Create an item that carries an existing identity.
    pub fn with_id(id: ItemId, configuration: ItemConfiguration) -> Self {
        Self {
            id,
            preferred_size: configuration.preferred_size,
            calculated_size: configuration.calculated_size,
            calculated_once: configuration.calculated_size.is_some(),
            alignment: configuration.alignment,
            pinning: configuration.pinning,
            offset_y: 0.0,
        }
    }

    /// Stable identity.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Measured size when available, preferred size otherwise.
    pub fn size(&self) -> Size {
        self.calculated_size.unwrap_or(self.preferred_size)
    }

    /// Height of [`size`](Self::size).
    pub fn height(&self) -> f64 {
        self.size().height
    }

    /// Bottom edge inside the section.
    pub fn location_height(&self) -> f64 {
        self.offset_y + self.height()
    }

    /// Frame relative to the section, before horizontal alignment.
    pub fn frame(&self) -> Rect {
        Rect::from_origin_size(Point::new(0.0, self.offset_y), self.size())
    }

    /// Whether the item takes part in pinning.
    pub fn is_pinned(&self) -> bool {
        self.pinning != ItemPinning::None
    }

    /// Forget the measured size but keep it as the new starting point.
    ///
    /// The real size is measured again on the next self-sizing pass; until
    /// then the element keeps its previous frame (e.g. across rotation).
    pub fn reset_size(&mut self) {
        if let Some(old_size) = self.calculated_size.take() {
            self.preferred_size = old_size;
        }
    }
}
