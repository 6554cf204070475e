//! Structural operations of a batch update.

use crate::model::ItemPath;
use std::cmp::Ordering;

/// One structural change reported by the host inside a batch update.
///
/// Paths of deletes, reloads and move sources refer to the model *before*
/// the update; paths of inserts and move destinations refer to the model
/// *after* it, matching the host's batch-update contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeItem {
    /// A section appears at `section` (after-update index).
    SectionInsert {
        /// After-update index.
        section: usize,
    },
    /// A cell appears at `path` (after-update path).
    ItemInsert {
        /// After-update path.
        path: ItemPath,
    },
    /// The section at `section` (before-update index) disappears.
    SectionDelete {
        /// Before-update index.
        section: usize,
    },
    /// The cell at `path` (before-update path) disappears.
    ItemDelete {
        /// Before-update path.
        path: ItemPath,
    },
    /// The section at `section` (before-update index) is rebuilt in place.
    SectionReload {
        /// Before-update index.
        section: usize,
    },
    /// The cell at `path` (before-update path) is reconfigured in place.
    ItemReload {
        /// Before-update path.
        path: ItemPath,
    },
    /// A section moves from `from` (before) to `to` (after).
    SectionMove {
        /// Before-update index.
        from: usize,
        /// After-update index.
        to: usize,
    },
    /// A cell moves from `from` (before) to `to` (after).
    ItemMove {
        /// Before-update path.
        from: ItemPath,
        /// After-update path.
        to: ItemPath,
    },
}

impl ChangeItem {
    /// Processing rank: reloads, deletes, inserts, moves; sections before items.
    fn rank(&self) -> u8 {
        match self {
            ChangeItem::SectionReload { .. } => 0,
            ChangeItem::ItemReload { .. } => 1,
            ChangeItem::SectionDelete { .. } => 2,
            ChangeItem::ItemDelete { .. } => 3,
            ChangeItem::SectionInsert { .. } => 4,
            ChangeItem::ItemInsert { .. } => 5,
            ChangeItem::SectionMove { .. } => 6,
            ChangeItem::ItemMove { .. } => 7,
        }
    }

    fn sort_key(&self) -> (u8, ItemPath, ItemPath) {
        let zero = ItemPath::default();
        match *self {
            ChangeItem::SectionInsert { section }
            | ChangeItem::SectionDelete { section }
            | ChangeItem::SectionReload { section } => (self.rank(), ItemPath::supplementary(section), zero),
            ChangeItem::ItemInsert { path } | ChangeItem::ItemDelete { path } | ChangeItem::ItemReload { path } => {
                (self.rank(), path, zero)
            }
            ChangeItem::SectionMove { from, to } => {
                (self.rank(), ItemPath::supplementary(from), ItemPath::supplementary(to))
            }
            ChangeItem::ItemMove { from, to } => (self.rank(), from, to),
        }
    }
}

impl PartialOrd for ChangeItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChangeItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}
