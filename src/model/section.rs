//! Section geometry: a run of items framed by an optional header and footer.

use super::error::ModelError;
use super::identifiers::{ItemId, SectionId};
use super::item::Item;
use crate::geometry::Rect;

/// A contiguous run of items with an optional header and footer.
///
/// Offsets of the header, items and footer are relative to the section top;
/// `offset_y` places the section inside the whole content.
///
/// # Invariants (after [`assemble_layout`](Self::assemble_layout))
/// - `static_item_indexes` and `pinned_item_indexes` are both sorted ascending
/// - their intersection is empty
/// - their union is `0..items.len()`
///
/// The set-and-assemble methods keep these invariants incrementally.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    id: SectionId,
    header: Option<Item>,
    footer: Option<Item>,
    items: Vec<Item>,
    static_item_indexes: Vec<usize>,
    pinned_item_indexes: Vec<usize>,
    /// Spacing used by the last full assembly; needed to place a footer
    /// that appears without a reassembly.
    inter_item_spacing: f64,
    /// Vertical position of the section inside the content.
    pub offset_y: f64,
}

impl Section {
    /// Create a section with a freshly allocated id. Call
    /// [`assemble_layout`](Self::assemble_layout) before reading offsets.
    pub fn new(header: Option<Item>, footer: Option<Item>, items: Vec<Item>) -> Self {
        Self::with_id(SectionId::next(), header, footer, items)
    }

    /// Create a section that carries an existing identity.
    pub fn with_id(id: SectionId, header: Option<Item>, footer: Option<Item>, items: Vec<Item>) -> Self {
        Self {
            id,
            header,
            footer,
            items,
            static_item_indexes: Vec::new(),
            pinned_item_indexes: Vec::new(),
            inter_item_spacing: 0.0,
            offset_y: 0.0,
        }
    }

    /// Stable identity.
    pub fn id(&self) -> SectionId {
        self.id
    }

    /// Header, if presented.
    pub fn header(&self) -> Option<&Item> {
        self.header.as_ref()
    }

    /// Footer, if presented.
    pub fn footer(&self) -> Option<&Item> {
        self.footer.as_ref()
    }

    /// All cells in order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Cell at `index`.
    pub fn item(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Number of cells.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Whether the section has no cells.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Indexes of cells that scroll with the content, ascending.
    pub fn static_item_indexes(&self) -> &[usize] {
        &self.static_item_indexes
    }

    /// Indexes of pinned cells, ascending.
    pub fn pinned_item_indexes(&self) -> &[usize] {
        &self.pinned_item_indexes
    }

    /// Footer bottom if present, else last item bottom, else header bottom, else zero.
    pub fn height(&self) -> f64 {
        if let Some(footer) = &self.footer {
            return footer.frame().max_y();
        }
        match self.items.last() {
            Some(last) => last.location_height(),
            None => self.header.as_ref().map_or(0.0, |h| h.frame().max_y()),
        }
    }

    /// Bottom edge inside the content.
    pub fn location_height(&self) -> f64 {
        self.offset_y + self.height()
    }

    /// Frame inside the content for the given content width.
    pub fn frame(&self, content_width: f64) -> Rect {
        Rect::new(0.0, self.offset_y, content_width, self.height())
    }

    /// Recompute every offset from the top of the section and rebuild the
    /// static/pinned partition. O(n).
    ///
    /// Call after any structural change. Single in-place size edits use the
    /// incremental set-and-assemble path instead.
    pub fn assemble_layout(&mut self, inter_item_spacing: f64) {
        self.inter_item_spacing = inter_item_spacing;
        let mut offset_y = 0.0;

        if let Some(header) = &mut self.header {
            header.offset_y = 0.0;
            offset_y += header.height();
        }

        self.static_item_indexes.clear();
        self.pinned_item_indexes.clear();
        self.static_item_indexes.reserve(self.items.len());

        for (index, item) in self.items.iter_mut().enumerate() {
            item.offset_y = offset_y;
            offset_y += item.height() + inter_item_spacing;
            if item.is_pinned() {
                self.pinned_item_indexes.push(index);
            } else {
                self.static_item_indexes.push(index);
            }
        }

        if let Some(footer) = &mut self.footer {
            footer.offset_y = offset_y;
        }
    }

    /// Replace the header by identity and shift everything below by the
    /// height difference.
    ///
    /// When the section had no header, the new one is placed at the top and
    /// everything moves down by its full height.
    pub fn set_and_assemble_header(&mut self, mut header: Item) -> Result<(), ModelError> {
        header.offset_y = 0.0;
        let height_diff = match &self.header {
            None => header.height(),
            Some(old) => {
                check_identity(old.id(), header.id())?;
                header.height() - old.height()
            }
        };
        self.header = Some(header);
        self.offset_everything_below(None, height_diff);
        Ok(())
    }

    /// Replace the item at `index` by identity and shift the items after it
    /// and the footer by the height difference. O(k) in the number of items
    /// after `index`.
    pub fn set_and_assemble_item(&mut self, mut item: Item, index: usize) -> Result<(), ModelError> {
        let Some(old) = self.items.get(index) else {
            return Err(contract_violation(ModelError::IndexOutOfRange {
                index,
                len: self.items.len(),
            }));
        };
        check_identity(old.id(), item.id())?;

        let was_pinned = old.is_pinned();
        let height_diff = item.height() - old.height();
        item.offset_y = old.offset_y;
        let is_pinned = item.is_pinned();
        self.items[index] = item;

        self.offset_everything_below(Some(index), height_diff);

        if was_pinned && !is_pinned {
            move_index(&mut self.pinned_item_indexes, &mut self.static_item_indexes, index);
        } else if !was_pinned && is_pinned {
            move_index(&mut self.static_item_indexes, &mut self.pinned_item_indexes, index);
        }
        Ok(())
    }

    /// Replace the footer by identity. The footer is the last element, so
    /// nothing else moves.
    pub fn set_and_assemble_footer(&mut self, mut footer: Item) -> Result<(), ModelError> {
        footer.offset_y = match &self.footer {
            Some(old) => {
                check_identity(old.id(), footer.id())?;
                old.offset_y
            }
            None => self.footer_anchor(),
        };
        self.footer = Some(footer);
        Ok(())
    }

    /// Replace the header without touching offsets.
    pub fn set_header(&mut self, header: Option<Item>) {
        self.header = header;
    }

    /// Replace the footer without touching offsets.
    pub fn set_footer(&mut self, footer: Option<Item>) {
        self.footer = footer;
    }

    /// Replace all items without touching offsets.
    pub fn set_items(&mut self, items: Vec<Item>) {
        self.items = items;
    }

    /// Insert an item at `index` (`index <= count`). Requires a following
    /// [`assemble_layout`](Self::assemble_layout).
    pub fn insert(&mut self, item: Item, index: usize) -> Result<(), ModelError> {
        if index > self.items.len() {
            return Err(contract_violation(ModelError::IndexOutOfRange {
                index,
                len: self.items.len(),
            }));
        }
        self.items.insert(index, item);
        Ok(())
    }

    /// Replace the item at `index` with a possibly different logical item.
    /// Requires a following [`assemble_layout`](Self::assemble_layout).
    pub fn replace(&mut self, item: Item, index: usize) -> Result<(), ModelError> {
        let len = self.items.len();
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = item;
                Ok(())
            }
            None => Err(contract_violation(ModelError::IndexOutOfRange { index, len })),
        }
    }

    /// Remove and return the item at `index`. Requires a following
    /// [`assemble_layout`](Self::assemble_layout).
    pub fn remove(&mut self, index: usize) -> Result<Item, ModelError> {
        if index >= self.items.len() {
            return Err(contract_violation(ModelError::IndexOutOfRange {
                index,
                len: self.items.len(),
            }));
        }
        Ok(self.items.remove(index))
    }

    /// Index of the item with the given identity.
    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Where a footer sits when it follows the current items.
    fn footer_anchor(&self) -> f64 {
        match self.items.last() {
            Some(last) => last.location_height() + self.inter_item_spacing,
            None => self.header.as_ref().map_or(0.0, |h| h.frame().max_y()),
        }
    }

    /// Shift items after `index` (all items when `None`) and the footer.
    fn offset_everything_below(&mut self, index: Option<usize>, height_diff: f64) {
        if height_diff == 0.0 {
            return;
        }
        let start = index.map_or(0, |i| i + 1);
        if let Some(rest) = self.items.get_mut(start..) {
            for item in rest {
                item.offset_y += height_diff;
            }
        }
        if let Some(footer) = &mut self.footer {
            footer.offset_y += height_diff;
        }
    }
}

/// Moves `index` from one sorted index list into another, keeping both sorted.
fn move_index(from: &mut Vec<usize>, to: &mut Vec<usize>, index: usize) {
    if let Ok(position) = from.binary_search(&index) {
        from.remove(position);
    }
    if let Err(position) = to.binary_search(&index) {
        to.insert(position, index);
    }
}

fn check_identity(expected: ItemId, found: ItemId) -> Result<(), ModelError> {
    if expected == found {
        Ok(())
    } else {
        Err(contract_violation(ModelError::IdentityMismatch { expected, found }))
    }
}

/// Contract violations are caller bugs: fatal in debug builds, logged and
/// returned in release builds.
fn contract_violation(error: ModelError) -> ModelError {
    if cfg!(debug_assertions) {
        panic!("Internal inconsistency: {error}");
    }
    tracing::warn!(%error, "section edit rejected");
    error
}

#[cfg(test)]
#[path = "section_tests.rs"]
mod tests;
