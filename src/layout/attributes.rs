//! Per-element output of the layout.

use crate::geometry::{AffineTransform, EdgeInsets, Rect, Size};
use crate::model::{ItemAlignment, ItemId, ItemKind, ItemPath};
use serde::Serialize;

/// Z-index of regular cells.
pub const CELL_Z_INDEX: i32 = 0;
/// Z-index of headers and footers, above cells.
pub const SUPPLEMENTARY_Z_INDEX: i32 = 10;
/// Z-index of elements currently displaced by pinning, above everything.
pub const PINNED_Z_INDEX: i32 = 20;

/// Geometry and presentation of one element, as handed to the host.
///
/// Besides the frame, every record carries copies of the container-wide
/// values (insets, view size, layout frame) so the rendering side can finish
/// its own constrained layout without querying the layout again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutAttributes {
    /// Element kind.
    pub kind: ItemKind,
    /// Position in the snapshot the record was produced from.
    pub index_path: ItemPath,
    /// Stable identity of the element.
    pub item_id: ItemId,
    /// Frame in content coordinates (presented frame for pinned elements).
    pub frame: Rect,
    /// Opacity, `1.0` unless adjusted for an appearance animation.
    pub alpha: f64,
    /// Transform applied on top of `frame`.
    pub transform: AffineTransform,
    /// Stacking order.
    pub z_index: i32,
    /// Horizontal alignment the frame was computed with.
    pub alignment: ItemAlignment,
    /// Whether the element takes part in pinning: pinning is enabled and
    /// the element pins to an edge. Set even while it rests at its natural
    /// position.
    pub pinned: bool,
    /// Settings' additional insets.
    pub additional_insets: EdgeInsets,
    /// Host view size.
    pub view_size: Size,
    /// Host's adjusted content insets.
    pub adjusted_content_insets: EdgeInsets,
    /// Area elements are laid out in: view minus additional insets.
    pub layout_frame: Rect,
}

impl LayoutAttributes {
    /// Size of `frame`.
    pub fn size(&self) -> Size {
        self.frame.size
    }

    /// Default z-index for an element of `kind`.
    pub fn z_index_for(kind: ItemKind, pinned: bool) -> i32 {
        if pinned {
            PINNED_Z_INDEX
        } else if kind.is_supplementary() {
            SUPPLEMENTARY_Z_INDEX
        } else {
            CELL_Z_INDEX
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_elements_stack_above_supplementary() {
        assert!(LayoutAttributes::z_index_for(ItemKind::Cell, true) > SUPPLEMENTARY_Z_INDEX);
        assert_eq!(LayoutAttributes::z_index_for(ItemKind::Header, false), SUPPLEMENTARY_Z_INDEX);
        assert_eq!(LayoutAttributes::z_index_for(ItemKind::Cell, false), CELL_Z_INDEX);
    }
}
