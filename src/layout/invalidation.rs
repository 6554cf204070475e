//! Description of what a layout invalidation affects.

use crate::geometry::{Point, Size};
use crate::model::{ItemKind, ItemPath};

/// What the next layout pass must recompute.
///
/// The cheap path for pure scrolling sets only
/// [`invalidate_for_pinning`](Self::invalidate_for_pinning): pinned elements
/// are repositioned and nothing else changes.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidationContext {
    /// Rebuild the whole model from the data source.
    pub invalidate_everything: bool,
    /// Section or cell counts changed.
    pub invalidate_data_source_counts: bool,
    /// Measured sizes are stale (width or content size category changed).
    pub invalidate_layout_metrics: bool,
    /// Only pinned elements need to move.
    pub invalidate_for_pinning: bool,
    /// Elements whose attributes must be fetched again.
    pub invalidated_items: Vec<(ItemKind, ItemPath)>,
    /// Change of the content size.
    pub content_size_adjustment: Size,
    /// Change of the content offset.
    pub content_offset_adjustment: Point,
}

impl Default for InvalidationContext {
    fn default() -> Self {
        Self {
            invalidate_everything: false,
            invalidate_data_source_counts: false,
            invalidate_layout_metrics: true,
            invalidate_for_pinning: false,
            invalidated_items: Vec::new(),
            content_size_adjustment: Size::ZERO,
            content_offset_adjustment: Point::ZERO,
        }
    }
}

impl InvalidationContext {
    /// Full rebuild, as after a data reload.
    pub fn everything() -> Self {
        Self {
            invalidate_everything: true,
            ..Self::default()
        }
    }

    /// Counts changed outside a batch update.
    pub fn data_source_counts() -> Self {
        Self {
            invalidate_data_source_counts: true,
            ..Self::default()
        }
    }

    /// Scroll-only invalidation that moves pinned elements.
    pub fn pinning() -> Self {
        Self {
            invalidate_layout_metrics: false,
            invalidate_for_pinning: true,
            ..Self::default()
        }
    }

    /// Targeted invalidation of individual elements; metrics are kept.
    pub fn items(items: Vec<(ItemKind, ItemPath)>) -> Self {
        Self {
            invalidate_layout_metrics: false,
            invalidated_items: items,
            ..Self::default()
        }
    }

    /// Whether the section models must be rebuilt.
    pub fn requires_rebuild(&self) -> bool {
        self.invalidate_everything || self.invalidate_data_source_counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_invalidates_metrics() {
        let context = InvalidationContext::default();
        assert!(context.invalidate_layout_metrics);
        assert!(!context.invalidate_for_pinning);
        assert!(!context.requires_rebuild());
    }

    #[test]
    fn pinning_context_keeps_metrics() {
        let context = InvalidationContext::pinning();
        assert!(context.invalidate_for_pinning);
        assert!(!context.invalidate_layout_metrics);
        assert!(context.invalidated_items.is_empty());
    }

    #[test]
    fn everything_requires_rebuild() {
        assert!(InvalidationContext::everything().requires_rebuild());
        assert!(InvalidationContext::data_source_counts().requires_rebuild());
    }
}
