//! Presentation-only placement of pinned elements.
//!
//! Pinned elements keep their natural `offset_y`; while their section crosses
//! the visible edges they are drawn at a displaced position instead.

use crate::model::{Item, ItemKind, ItemPinning, Section};

/// Where one pinned element is drawn, in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinnedPlacement {
    /// Element kind.
    pub kind: ItemKind,
    /// Cell index inside the section; `0` for header and footer.
    pub index: usize,
    /// Presented top edge.
    pub y: f64,
}

/// Compute the presented position of every pinned element in `section`.
///
/// `visible_top` and `visible_bottom` delimit the visible area after the
/// host's content insets. Top-pinned elements stack downwards from the
/// visible top in section order; bottom-pinned elements stack upwards from
/// the visible bottom in reverse section order. Each stack is clamped as a
/// whole to the section's vertical extent, so its order is kept.
pub fn pinned_placements(section: &Section, visible_top: f64, visible_bottom: f64) -> Vec<PinnedPlacement> {
    let section_top = section.offset_y;
    let section_bottom = section.location_height();

    let mut ordered: Vec<(ItemKind, usize, &Item)> = Vec::with_capacity(section.pinned_item_indexes().len() + 2);
    if let Some(header) = section.header() {
        ordered.push((ItemKind::Header, 0, header));
    }
    for &index in section.pinned_item_indexes() {
        if let Some(item) = section.item(index) {
            ordered.push((ItemKind::Cell, index, item));
        }
    }
    if let Some(footer) = section.footer() {
        ordered.push((ItemKind::Footer, 0, footer));
    }

    let stack_height = |pinning: ItemPinning| -> f64 {
        ordered
            .iter()
            .filter(|(_, _, item)| item.pinning == pinning)
            .map(|(_, _, item)| item.height())
            .sum()
    };

    let mut placements = Vec::new();

    // Stacks are clamped as a whole against the section edges.
    let mut above = 0.0;
    let mut below = stack_height(ItemPinning::Top);
    for &(kind, index, item) in ordered.iter().filter(|(_, _, item)| item.pinning == ItemPinning::Top) {
        let natural = section_top + item.offset_y;
        let height = item.height();
        below -= height;
        let y = natural.max(visible_top + above).min(section_bottom - below - height);
        placements.push(PinnedPlacement { kind, index, y });
        above += height;
    }

    let mut below = 0.0;
    let mut above = stack_height(ItemPinning::Bottom);
    for &(kind, index, item) in ordered.iter().rev().filter(|(_, _, item)| item.pinning == ItemPinning::Bottom) {
        let natural = section_top + item.offset_y;
        let height = item.height();
        above -= height;
        let y = natural.min(visible_bottom - below - height).max(section_top + above);
        placements.push(PinnedPlacement { kind, index, y });
        below += height;
    }

    placements
}

/// Presented top edge of one element, if it is pinned.
pub fn pinned_y(
    section: &Section,
    kind: ItemKind,
    index: usize,
    visible_top: f64,
    visible_bottom: f64,
) -> Option<f64> {
    let index = if kind.is_supplementary() { 0 } else { index };
    pinned_placements(section, visible_top, visible_bottom)
        .into_iter()
        .find(|p| p.kind == kind && p.index == index)
        .map(|p| p.y)
}
