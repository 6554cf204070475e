//! Layout settings consumed by the core.

use crate::geometry::{EdgeInsets, Size};
use serde::Serialize;

/// Global layout settings.
///
/// All spacing values are in points. Pinning is opt-in: with it enabled the
/// layout is invalidated on every scroll delta so pinned elements can be
/// repositioned.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LayoutSettings {
    /// Starting size for items whose delegate answers `ItemSize::Auto`.
    /// When `None`, the layout frame width and a height of 40 are used.
    pub estimated_item_size: Option<Size>,
    /// Space above the first section.
    pub space_above_first_item: f64,
    /// Space between consecutive items of a section.
    pub inter_item_spacing: f64,
    /// Space below the last section.
    pub space_below_last_item: f64,
    /// Space between sections.
    pub inter_section_spacing: f64,
    /// Extra insets around the content, on top of the host's insets.
    pub additional_insets: EdgeInsets,
    /// Whether pinned elements are repositioned while scrolling.
    pub allow_pinning: bool,
    /// Keep the viewport glued to the bottom across batch updates when it
    /// was at the bottom before the update (chat behavior).
    pub keep_content_offset_at_bottom_on_batch_updates: bool,
}

impl LayoutSettings {
    /// Height used for `Auto` items when no estimate is configured.
    pub const FALLBACK_ESTIMATED_HEIGHT: f64 = 40.0;
}
