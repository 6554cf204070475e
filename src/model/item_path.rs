//! Section/item addressing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of an element inside a snapshot.
///
/// Ordered section-major, so a sorted list of paths follows the visual
/// top-to-bottom order. Headers and footers are addressed with `item == 0`
/// together with their [`ItemKind`](super::item::ItemKind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ItemPath {
    /// Section index.
    pub section: usize,
    /// Item index within the section.
    pub item: usize,
}

impl ItemPath {
    /// Create a new path.
    pub fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }

    /// Path used for a section's header or footer.
    pub fn supplementary(section: usize) -> Self {
        Self { section, item: 0 }
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_section_major() {
        let a = ItemPath::new(0, 10);
        let b = ItemPath::new(1, 0);
        let c = ItemPath::new(1, 1);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn supplementary_uses_item_zero() {
        assert_eq!(ItemPath::supplementary(3), ItemPath::new(3, 0));
    }

    #[test]
    fn display_formats_like_index_path() {
        assert_eq!(ItemPath::new(2, 5).to_string(), "[2, 5]");
    }
}
