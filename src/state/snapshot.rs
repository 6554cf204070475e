//! One complete, internally consistent model of all sections.

use crate::config::LayoutSettings;
use crate::model::{Item, ItemId, ItemKind, ItemPath, LayoutError, Section, SectionId};
use std::collections::HashMap;
use std::ops::Range;

/// An ordered sequence of sections with identity lookups.
///
/// A snapshot handed to queries is always fully assembled: every section is
/// assembled, section offsets are accumulated top to bottom, and the identity
/// caches match the current positions.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    sections: Vec<Section>,
    section_index_by_id: HashMap<SectionId, usize>,
    item_path_by_id: HashMap<(ItemKind, ItemId), ItemPath>,
}

impl Snapshot {
    /// Wrap sections without assembling them.
    pub fn new(sections: Vec<Section>) -> Self {
        Self {
            sections,
            section_index_by_id: HashMap::new(),
            item_path_by_id: HashMap::new(),
        }
    }

    /// All sections in order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Section at `index`.
    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the snapshot has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Assemble every section, then the section offsets.
    pub fn assemble_all(&mut self, settings: &LayoutSettings) {
        for section in &mut self.sections {
            section.assemble_layout(settings.inter_item_spacing);
        }
        self.assemble_layout(settings);
    }

    /// Accumulate section offsets top to bottom and rebuild the identity
    /// caches. Sections must already be assembled.
    pub fn assemble_layout(&mut self, settings: &LayoutSettings) {
        let mut offset_y = settings.additional_insets.top + settings.space_above_first_item;

        self.section_index_by_id.clear();
        self.item_path_by_id.clear();
        self.section_index_by_id.reserve(self.sections.len());

        for (section_index, section) in self.sections.iter_mut().enumerate() {
            section.offset_y = offset_y;
            offset_y += section.height() + settings.inter_section_spacing;

            self.section_index_by_id.insert(section.id(), section_index);
            let supplementary = ItemPath::supplementary(section_index);
            if let Some(header) = section.header() {
                self.item_path_by_id.insert((ItemKind::Header, header.id()), supplementary);
            }
            if let Some(footer) = section.footer() {
                self.item_path_by_id.insert((ItemKind::Footer, footer.id()), supplementary);
            }
            for (item_index, item) in section.items().iter().enumerate() {
                self.item_path_by_id
                    .insert((ItemKind::Cell, item.id()), ItemPath::new(section_index, item_index));
            }
        }
    }

    /// Bottom edge of the last section plus trailing space and insets;
    /// zero for an empty snapshot.
    pub fn content_height(&self, settings: &LayoutSettings) -> f64 {
        match self.sections.last() {
            Some(last) => {
                last.location_height() + settings.space_below_last_item + settings.additional_insets.bottom
            }
            None => 0.0,
        }
    }

    /// Element of `kind` at `path`.
    pub fn item(&self, path: ItemPath, kind: ItemKind) -> Option<&Item> {
        let section = self.sections.get(path.section)?;
        match kind {
            ItemKind::Cell => section.item(path.item),
            ItemKind::Header => section.header(),
            ItemKind::Footer => section.footer(),
        }
    }

    /// Current path of the element with this identity.
    pub fn item_path(&self, id: ItemId, kind: ItemKind) -> Option<ItemPath> {
        self.item_path_by_id.get(&(kind, id)).copied()
    }

    /// Current index of the section with this identity.
    pub fn section_index(&self, id: SectionId) -> Option<usize> {
        self.section_index_by_id.get(&id).copied()
    }

    /// Identity of the element at `path`.
    pub fn item_identifier(&self, path: ItemPath, kind: ItemKind) -> Option<ItemId> {
        self.item(path, kind).map(Item::id)
    }

    /// Identity of the section at `index`.
    pub fn section_identifier(&self, index: usize) -> Option<SectionId> {
        self.sections.get(index).map(Section::id)
    }

    /// Sections whose vertical extent overlaps `[min_y, max_y)`. O(log n).
    pub fn sections_intersecting(&self, min_y: f64, max_y: f64) -> Range<usize> {
        let start = self.sections.partition_point(|s| s.location_height() < min_y);
        let end = self.sections.partition_point(|s| s.offset_y < max_y);
        start..end.max(start)
    }

    /// Replace one element by identity and move every later section by the
    /// resulting change in section height.
    ///
    /// Returns the section height delta.
    pub fn set_and_assemble(&mut self, kind: ItemKind, path: ItemPath, item: Item) -> Result<f64, LayoutError> {
        let count = self.sections.len();
        let section = self
            .sections
            .get_mut(path.section)
            .ok_or(LayoutError::SectionOutOfRange {
                index: path.section,
                count,
            })?;

        let old_height = section.height();
        match kind {
            ItemKind::Header => section.set_and_assemble_header(item)?,
            ItemKind::Cell => section.set_and_assemble_item(item, path.item)?,
            ItemKind::Footer => section.set_and_assemble_footer(item)?,
        }
        let delta = section.height() - old_height;

        if delta != 0.0 {
            for later in &mut self.sections[path.section + 1..] {
                later.offset_y += delta;
            }
        }
        Ok(delta)
    }

    /// Mutable access for whole-model rewrites (size resets, batch updates).
    /// Callers must reassemble afterwards.
    pub(crate) fn sections_mut(&mut self) -> &mut Vec<Section> {
        &mut self.sections
    }

    /// Remove the section with this identity, returning its old index.
    ///
    /// Linear scan: identity caches are stale while a batch is being applied.
    pub(crate) fn remove_section_by_id(&mut self, id: SectionId) -> Option<(usize, Section)> {
        let index = self.sections.iter().position(|s| s.id() == id)?;
        Some((index, self.sections.remove(index)))
    }

    /// Remove the cell with this identity, returning its old path.
    ///
    /// Linear scan: identity caches are stale while a batch is being applied.
    pub(crate) fn remove_item_by_id(&mut self, id: ItemId) -> Option<(ItemPath, Item)> {
        self.sections.iter_mut().enumerate().find_map(|(section_index, section)| {
            let item_index = section.index_of(id)?;
            let item = section.remove(item_index).ok()?;
            Some((ItemPath::new(section_index, item_index), item))
        })
    }

    /// Current path of a cell, found by linear scan.
    pub(crate) fn find_item(&self, id: ItemId) -> Option<ItemPath> {
        self.sections.iter().enumerate().find_map(|(section_index, section)| {
            section.index_of(id).map(|item_index| ItemPath::new(section_index, item_index))
        })
    }

    /// Current index of a section, found by linear scan.
    pub(crate) fn find_section(&self, id: SectionId) -> Option<usize> {
        self.sections.iter().position(|s| s.id() == id)
    }
}
