//! The host-facing seam the state controller depends on.

use crate::config::LayoutSettings;
use crate::geometry::{EdgeInsets, Rect, Size};
use crate::model::{ItemConfiguration, ItemKind, ItemPath};
use serde::Serialize;

/// Which snapshot a query addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ModelState {
    /// The committed model (the only one outside a batch update).
    BeforeUpdate,
    /// The model being animated to during a batch update.
    AfterUpdate,
}

/// Everything the state controller needs to know about its host.
///
/// Implemented by the layout driver over a borrowed host view and delegate;
/// the controller never learns about either directly.
pub trait LayoutRepresentation {
    /// Global settings.
    fn settings(&self) -> &LayoutSettings;

    /// Number of sections the host currently reports.
    fn number_of_sections(&self) -> usize;

    /// Number of cells in `section`.
    fn number_of_items(&self, section: usize) -> usize;

    /// Whether `section` presents a header.
    fn should_present_header(&self, section: usize) -> bool;

    /// Whether `section` presents a footer.
    fn should_present_footer(&self, section: usize) -> bool;

    /// Resolved size, alignment and pinning for one element.
    fn configuration(&self, kind: ItemKind, path: ItemPath) -> ItemConfiguration;

    /// Currently visible rectangle in content coordinates.
    fn visible_bounds(&self) -> Rect;

    /// Insets the host applies around its content (safe area, bars).
    fn adjusted_content_insets(&self) -> EdgeInsets;

    /// Size of the host view.
    fn view_size(&self) -> Size {
        self.visible_bounds().size
    }

    /// Width available to elements: visible width minus additional insets.
    fn layout_frame_width(&self) -> f64 {
        let insets = self.settings().additional_insets;
        (self.visible_bounds().width() - insets.horizontal()).max(0.0)
    }
}
