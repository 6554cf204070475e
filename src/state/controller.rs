//! State controller: owns the model snapshots and answers every layout query.
//!
//! Outside a batch update there is a single committed snapshot. Between
//! [`StateController::process_updates`] and [`StateController::commit_updates`]
//! a second, fully assembled snapshot describes the model the host is
//! animating to, together with the bookkeeping needed to synthesize
//! appearance and disappearance attributes.

use super::change_item::ChangeItem;
use super::pinning::{pinned_placements, pinned_y, PinnedPlacement};
use super::representation::{LayoutRepresentation, ModelState};
use super::snapshot::Snapshot;
use crate::config::LayoutSettings;
use crate::geometry::{EdgeInsets, Rect, Size, EPSILON};
use crate::layout::attributes::LayoutAttributes;
use crate::model::{
    Item, ItemAlignment, ItemId, ItemKind, ItemPath, LayoutError, ModelError, Section, SectionId,
};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, trace};

/// Outcome of pushing a measured size into the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeUpdate {
    /// Natural frame before the change.
    pub previous_frame: Rect,
    /// Natural frame after the change.
    pub new_frame: Rect,
    /// Whether any other element inside the visible area moved.
    pub others_shifted: bool,
}

impl SizeUpdate {
    /// Height change of the element.
    pub fn height_delta(&self) -> f64 {
        self.new_frame.height() - self.previous_frame.height()
    }
}

/// Structural changes of the open transaction.
///
/// Inserted paths refer to the after-update model; deleted, reloaded and
/// move-source paths refer to the before-update model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSet {
    /// Inserted section indexes (after).
    pub inserted_sections: BTreeSet<usize>,
    /// Inserted cell paths (after).
    pub inserted_items: BTreeSet<ItemPath>,
    /// Deleted section indexes (before).
    pub deleted_sections: BTreeSet<usize>,
    /// Deleted cell paths (before).
    pub deleted_items: BTreeSet<ItemPath>,
    /// Reloaded section indexes (before).
    pub reloaded_sections: BTreeSet<usize>,
    /// Reloaded cell paths (before).
    pub reloaded_items: BTreeSet<ItemPath>,
    /// Moved sections, before index to after index.
    pub moved_sections: BTreeMap<usize, usize>,
    /// Moved cells, before path to after path.
    pub moved_items: BTreeMap<ItemPath, ItemPath>,
}

impl UpdateSet {
    fn record(&mut self, change: ChangeItem) {
        match change {
            ChangeItem::SectionInsert { section } => {
                self.inserted_sections.insert(section);
            }
            ChangeItem::ItemInsert { path } => {
                self.inserted_items.insert(path);
            }
            ChangeItem::SectionDelete { section } => {
                self.deleted_sections.insert(section);
            }
            ChangeItem::ItemDelete { path } => {
                self.deleted_items.insert(path);
            }
            ChangeItem::SectionReload { section } => {
                self.reloaded_sections.insert(section);
            }
            ChangeItem::ItemReload { path } => {
                self.reloaded_items.insert(path);
            }
            ChangeItem::SectionMove { from, to } => {
                self.moved_sections.insert(from, to);
            }
            ChangeItem::ItemMove { from, to } => {
                self.moved_items.insert(from, to);
            }
        }
    }

    /// Whether the transaction carries no structural change.
    pub fn is_empty(&self) -> bool {
        self.inserted_sections.is_empty()
            && self.inserted_items.is_empty()
            && self.deleted_sections.is_empty()
            && self.deleted_items.is_empty()
            && self.reloaded_sections.is_empty()
            && self.reloaded_items.is_empty()
            && self.moved_sections.is_empty()
            && self.moved_items.is_empty()
    }
}

#[derive(Debug, Clone)]
struct PendingUpdate {
    after: Snapshot,
    changes: UpdateSet,
    proposed_compensating_offset: f64,
}

/// Container-wide values resolved once per query.
struct QueryContext {
    settings: LayoutSettings,
    visible: Rect,
    layout_width: f64,
    view_size: Size,
    adjusted_content_insets: EdgeInsets,
    layout_frame: Rect,
}

impl QueryContext {
    fn new(repr: &impl LayoutRepresentation) -> Self {
        let settings = repr.settings().clone();
        let visible = repr.visible_bounds();
        let insets = settings.additional_insets;
        let layout_width = repr.layout_frame_width();
        let layout_frame = Rect::new(
            insets.left,
            insets.top,
            layout_width,
            (visible.height() - insets.vertical()).max(0.0),
        );
        Self {
            visible,
            layout_width,
            view_size: repr.view_size(),
            adjusted_content_insets: repr.adjusted_content_insets(),
            layout_frame,
            settings,
        }
    }

    /// Visible edges used for pinning, when pinning is enabled.
    fn pin_edges(&self) -> Option<(f64, f64)> {
        self.settings
            .allow_pinning
            .then(|| (self.visible.min_y(), self.visible.max_y()))
    }

    /// Frame of `item` at presented top `y`, with horizontal alignment applied.
    fn aligned_frame(&self, item: &Item, y: f64) -> Rect {
        let insets = self.settings.additional_insets;
        let size = item.size();
        let (x, width) = match item.alignment {
            ItemAlignment::Leading => (insets.left, size.width),
            ItemAlignment::Trailing => (self.visible.width() - insets.right - size.width, size.width),
            ItemAlignment::Center => (insets.left + (self.layout_width - size.width) / 2.0, size.width),
            ItemAlignment::FullWidth => (insets.left, self.layout_width),
        };
        Rect::new(x, y, width, size.height)
    }

    fn attributes(&self, element: &Element<'_>) -> LayoutAttributes {
        let pinned = self.settings.allow_pinning && element.item.is_pinned();
        LayoutAttributes {
            kind: element.kind,
            index_path: element.path,
            item_id: element.item.id(),
            frame: self.aligned_frame(element.item, element.y),
            alpha: 1.0,
            transform: Default::default(),
            z_index: LayoutAttributes::z_index_for(element.kind, pinned),
            alignment: element.item.alignment,
            pinned,
            additional_insets: self.settings.additional_insets,
            view_size: self.view_size,
            adjusted_content_insets: self.adjusted_content_insets,
            layout_frame: self.layout_frame,
        }
    }
}

/// One element located by a vertical query.
#[derive(Debug, Clone, Copy)]
struct Element<'a> {
    kind: ItemKind,
    path: ItemPath,
    item: &'a Item,
    /// Presented top edge in content coordinates.
    y: f64,
}

/// Vertical half-open overlap with the same conventions as [`Rect::intersects`].
fn overlaps(top: f64, height: f64, min_y: f64, max_y: f64) -> bool {
    top < max_y && min_y < (top + height).max(top + EPSILON)
}

/// Elements of `snapshot` overlapping `[min_y, max_y)`, in section/item order.
///
/// With `pin_edges`, pinned elements are tested and reported at their
/// presented position. Sections are located by binary search over section
/// offsets, static cells by binary search over cell offsets.
fn elements_in(snapshot: &Snapshot, min_y: f64, max_y: f64, pin_edges: Option<(f64, f64)>) -> Vec<Element<'_>> {
    let max_y = max_y.max(min_y + EPSILON);
    let mut found = Vec::new();

    for section_index in snapshot.sections_intersecting(min_y, max_y) {
        let Some(section) = snapshot.section(section_index) else {
            continue;
        };
        let placements: Vec<PinnedPlacement> = match pin_edges {
            Some((top, bottom)) => pinned_placements(section, top, bottom),
            None => Vec::new(),
        };
        let presented = |kind: ItemKind, index: usize, item: &Item| -> f64 {
            placements
                .iter()
                .find(|p| p.kind == kind && p.index == index)
                .map_or(section.offset_y + item.offset_y, |p| p.y)
        };
        let supplementary = ItemPath::supplementary(section_index);

        if let Some(header) = section.header() {
            let y = presented(ItemKind::Header, 0, header);
            if overlaps(y, header.height(), min_y, max_y) {
                found.push(Element {
                    kind: ItemKind::Header,
                    path: supplementary,
                    item: header,
                    y,
                });
            }
        }

        let local_min = min_y - section.offset_y;
        let local_max = max_y - section.offset_y;
        let items = section.items();
        let statics = section.static_item_indexes();
        let start = statics.partition_point(|&i| items[i].location_height() < local_min);
        let mut indexes: Vec<usize> = statics[start..]
            .iter()
            .copied()
            .take_while(|&i| items[i].offset_y < local_max)
            .filter(|&i| overlaps(items[i].offset_y, items[i].height(), local_min, local_max))
            .collect();
        let before_pinned = indexes.len();
        indexes.extend(section.pinned_item_indexes().iter().copied().filter(|&i| {
            let y = presented(ItemKind::Cell, i, &items[i]);
            overlaps(y, items[i].height(), min_y, max_y)
        }));
        if indexes.len() != before_pinned {
            indexes.sort_unstable();
        }
        for index in indexes {
            let item = &items[index];
            found.push(Element {
                kind: ItemKind::Cell,
                path: ItemPath::new(section_index, index),
                item,
                y: presented(ItemKind::Cell, index, item),
            });
        }

        if let Some(footer) = section.footer() {
            let y = presented(ItemKind::Footer, 0, footer);
            if overlaps(y, footer.height(), min_y, max_y) {
                found.push(Element {
                    kind: ItemKind::Footer,
                    path: supplementary,
                    item: footer,
                    y,
                });
            }
        }
    }
    found
}

/// Locate one element, reporting it at its presented position.
fn element_at(
    snapshot: &Snapshot,
    path: ItemPath,
    kind: ItemKind,
    pin_edges: Option<(f64, f64)>,
) -> Result<Element<'_>, LayoutError> {
    let not_found = LayoutError::ItemNotFound { kind, path };
    let section = snapshot.section(path.section).ok_or(not_found.clone())?;
    let item = snapshot.item(path, kind).ok_or(not_found)?;
    let path = if kind.is_supplementary() {
        ItemPath::supplementary(path.section)
    } else {
        path
    };
    let natural = section.offset_y + item.offset_y;
    let y = match pin_edges {
        Some((top, bottom)) if item.is_pinned() => {
            pinned_y(section, kind, path.item, top, bottom).unwrap_or(natural)
        }
        _ => natural,
    };
    Ok(Element { kind, path, item, y })
}

/// Top edge of an element in content coordinates, ignoring pinning.
fn natural_y(snapshot: &Snapshot, path: ItemPath, kind: ItemKind) -> Option<f64> {
    let section = snapshot.section(path.section)?;
    let item = snapshot.item(path, kind)?;
    Some(section.offset_y + item.offset_y)
}

/// Build one element from the representation, reusing a previous occupant's
/// identity (and, lacking an exact size, its last frame) on reload.
fn build_item(repr: &impl LayoutRepresentation, kind: ItemKind, path: ItemPath, previous: Option<&Item>) -> Item {
    let configuration = repr.configuration(kind, path);
    match previous {
        None => Item::new(configuration),
        Some(old) => {
            let mut item = Item::with_id(old.id(), configuration);
            if configuration.calculated_size.is_none() {
                item.preferred_size = old.size();
            }
            item
        }
    }
}

/// Build the section at `index` from the representation. With `previous`,
/// the section keeps its identity and its elements keep theirs by position.
fn build_section(repr: &impl LayoutRepresentation, index: usize, previous: Option<&Section>) -> Section {
    let supplementary = ItemPath::supplementary(index);
    let header = repr.should_present_header(index).then(|| {
        build_item(repr, ItemKind::Header, supplementary, previous.and_then(Section::header))
    });
    let footer = repr.should_present_footer(index).then(|| {
        build_item(repr, ItemKind::Footer, supplementary, previous.and_then(Section::footer))
    });
    let items = (0..repr.number_of_items(index))
        .map(|item| {
            let old = previous.and_then(|s| s.item(item));
            build_item(repr, ItemKind::Cell, ItemPath::new(index, item), old)
        })
        .collect();
    match previous {
        Some(old) => Section::with_id(old.id(), header, footer, items),
        None => Section::new(header, footer, items),
    }
}

/// Identity of an element resolved against the before-update model.
#[derive(Debug, Clone, Copy)]
enum Resolved {
    SectionInsert(usize),
    ItemInsert(ItemPath),
    SectionDelete(SectionId),
    ItemDelete(ItemId),
    SectionReload(SectionId),
    ItemReload(ItemId),
    SectionMove(SectionId, usize),
    ItemMove(ItemId, ItemPath),
}

/// Owner of the committed model and, during a batch update, the target model.
#[derive(Debug, Clone, Default)]
pub struct StateController {
    before: Snapshot,
    pending: Option<PendingUpdate>,
}

impl StateController {
    /// Controller with an empty committed model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a batch update is open.
    pub fn is_updating(&self) -> bool {
        self.pending.is_some()
    }

    /// The snapshot for `state`.
    pub fn snapshot(&self, state: ModelState) -> Result<&Snapshot, LayoutError> {
        match state {
            ModelState::BeforeUpdate => Ok(&self.before),
            ModelState::AfterUpdate => self
                .pending
                .as_ref()
                .map(|p| &p.after)
                .ok_or(LayoutError::SnapshotUnavailable(state)),
        }
    }

    fn snapshot_mut(&mut self, state: ModelState) -> Result<&mut Snapshot, LayoutError> {
        match state {
            ModelState::BeforeUpdate => Ok(&mut self.before),
            ModelState::AfterUpdate => self
                .pending
                .as_mut()
                .map(|p| &mut p.after)
                .ok_or(LayoutError::SnapshotUnavailable(state)),
        }
    }

    /// Build fresh sections for everything the representation reports.
    pub fn build_sections(&self, repr: &impl LayoutRepresentation) -> Vec<Section> {
        let count = repr.number_of_sections();
        debug!(sections = count, "Building section models");
        (0..count).map(|index| build_section(repr, index, None)).collect()
    }

    /// Replace the sections of `state` and assemble them.
    pub fn set_sections(
        &mut self,
        sections: Vec<Section>,
        state: ModelState,
        settings: &LayoutSettings,
    ) -> Result<(), LayoutError> {
        let snapshot = self.snapshot_mut(state)?;
        *snapshot = Snapshot::new(sections);
        snapshot.assemble_all(settings);
        Ok(())
    }

    /// Forget every measured size of `state` (keeping it as the starting
    /// size) and reassemble. Used when layout metrics change.
    pub fn reset_sizes(&mut self, state: ModelState, settings: &LayoutSettings) -> Result<(), LayoutError> {
        let snapshot = self.snapshot_mut(state)?;
        for section in snapshot.sections_mut().iter_mut() {
            let mut header = section.header().cloned();
            let mut footer = section.footer().cloned();
            let mut items = section.items().to_vec();
            header.iter_mut().chain(footer.iter_mut()).chain(items.iter_mut()).for_each(Item::reset_size);
            section.set_header(header);
            section.set_footer(footer);
            section.set_items(items);
        }
        snapshot.assemble_all(settings);
        debug!(?state, "Reset measured sizes");
        Ok(())
    }

    /// Total content height of `state`; zero for an empty model.
    pub fn content_height(&self, state: ModelState, settings: &LayoutSettings) -> Result<f64, LayoutError> {
        Ok(self.snapshot(state)?.content_height(settings))
    }

    /// Attributes of every element intersecting `rect`, in section/item order.
    pub fn layout_attributes_for_elements(
        &self,
        rect: Rect,
        state: ModelState,
        repr: &impl LayoutRepresentation,
    ) -> Result<Vec<LayoutAttributes>, LayoutError> {
        let snapshot = self.snapshot(state)?;
        let context = QueryContext::new(repr);
        let elements = elements_in(snapshot, rect.min_y(), rect.max_y(), context.pin_edges());
        let attributes: Vec<LayoutAttributes> = elements
            .iter()
            .map(|element| context.attributes(element))
            .filter(|attributes| attributes.frame.intersects(&rect))
            .collect();
        trace!(?rect, ?state, count = attributes.len(), "Attributes in rect");
        Ok(attributes)
    }

    /// Attributes of one element.
    pub fn item_attributes(
        &self,
        path: ItemPath,
        kind: ItemKind,
        state: ModelState,
        repr: &impl LayoutRepresentation,
    ) -> Result<LayoutAttributes, LayoutError> {
        let snapshot = self.snapshot(state)?;
        let context = QueryContext::new(repr);
        let element = element_at(snapshot, path, kind, context.pin_edges())?;
        Ok(context.attributes(&element))
    }

    /// Frame of one element, as presented.
    pub fn item_frame(
        &self,
        path: ItemPath,
        kind: ItemKind,
        state: ModelState,
        repr: &impl LayoutRepresentation,
    ) -> Result<Rect, LayoutError> {
        self.item_attributes(path, kind, state, repr).map(|attributes| attributes.frame)
    }

    /// Positions of every element whose natural frame overlaps `rect`
    /// vertically.
    pub fn element_paths_in(&self, rect: Rect, state: ModelState) -> Result<Vec<(ItemKind, ItemPath)>, LayoutError> {
        let snapshot = self.snapshot(state)?;
        Ok(elements_in(snapshot, rect.min_y(), rect.max_y(), None)
            .into_iter()
            .map(|element| (element.kind, element.path))
            .collect())
    }

    /// Store a measured size for one element.
    ///
    /// Returns `None` when the element already carries this measurement and
    /// alignment. Otherwise the element and everything below it are moved
    /// and the frames before and after the change are reported.
    pub fn update_preferred_size(
        &mut self,
        path: ItemPath,
        kind: ItemKind,
        size: Size,
        alignment: ItemAlignment,
        state: ModelState,
        repr: &impl LayoutRepresentation,
    ) -> Result<Option<SizeUpdate>, LayoutError> {
        let context = QueryContext::new(repr);
        let snapshot = self.snapshot(state)?;
        let current = element_at(snapshot, path, kind, None)?;
        let unchanged = current.item.calculated_size.is_some_and(|c| c.approx_eq(&size))
            && current.item.alignment == alignment;
        if unchanged {
            return Ok(None);
        }

        let previous_frame = context.aligned_frame(current.item, current.y);
        let height_delta = size.height - current.item.height();
        let others_shifted = height_delta.abs() >= EPSILON && {
            let top = previous_frame.max_y().max(context.visible.min_y());
            let bottom = context.visible.max_y();
            top < bottom
                && elements_in(snapshot, top, bottom, None)
                    .iter()
                    .any(|e| !(e.kind == kind && e.path == current.path))
        };

        let mut item = current.item.clone();
        let path = current.path;
        item.calculated_size = Some(size);
        item.calculated_once = true;
        item.alignment = alignment;

        let snapshot = self.snapshot_mut(state)?;
        snapshot.set_and_assemble(kind, path, item)?;
        let updated = element_at(snapshot, path, kind, None)?;
        let new_frame = context.aligned_frame(updated.item, updated.y);

        trace!(%path, ?kind, ?state, height_delta, others_shifted, "Stored measured size");
        Ok(Some(SizeUpdate {
            previous_frame,
            new_frame,
            others_shifted,
        }))
    }

    /// Open a batch update: apply `changes` to a copy of the committed model.
    ///
    /// Changes are processed reloads first, then deletes, inserts and moves,
    /// sections before cells and ascending within a kind. Removals are
    /// matched by identity so their order never shifts another removal.
    /// Nothing is modified when any path is invalid.
    pub fn process_updates(
        &mut self,
        changes: &[ChangeItem],
        repr: &impl LayoutRepresentation,
    ) -> Result<(), LayoutError> {
        if self.pending.is_some() {
            return Err(LayoutError::TransactionInProgress);
        }
        let settings = repr.settings().clone();

        let mut sorted = changes.to_vec();
        sorted.sort();
        let resolved = sorted
            .iter()
            .map(|change| self.resolve(*change))
            .collect::<Result<Vec<_>, _>>()?;

        let mut after = self.before.clone();

        // Removals: cells first so cells of removed sections are still found.
        let mut moved_items: Vec<(ItemPath, Item)> = Vec::new();
        for change in &resolved {
            match *change {
                Resolved::ItemDelete(id) => {
                    if after.remove_item_by_id(id).is_none() {
                        trace!(%id, "Deleted cell already gone with its section");
                    }
                }
                Resolved::ItemMove(id, to) => match after.remove_item_by_id(id) {
                    Some((_, item)) => moved_items.push((to, item)),
                    None => trace!(%id, "Moved cell already gone with its section"),
                },
                _ => {}
            }
        }
        let mut moved_sections: Vec<(usize, Section)> = Vec::new();
        for change in &resolved {
            match *change {
                Resolved::SectionDelete(id) => {
                    after.remove_section_by_id(id);
                }
                Resolved::SectionMove(id, to) => {
                    if let Some((_, section)) = after.remove_section_by_id(id) {
                        moved_sections.push((to, section));
                    }
                }
                _ => {}
            }
        }

        // Section insertions, ascending by final index.
        let mut section_inserts: Vec<(usize, Option<Section>)> = resolved
            .iter()
            .filter_map(|change| match change {
                Resolved::SectionInsert(index) => Some((*index, None)),
                _ => None,
            })
            .chain(moved_sections.into_iter().map(|(to, section)| (to, Some(section))))
            .collect();
        section_inserts.sort_by_key(|(index, _)| *index);
        let mut built_sections = HashSet::new();
        for (index, section) in section_inserts {
            let sections = after.sections_mut();
            if index > sections.len() {
                return Err(LayoutError::SectionOutOfRange {
                    index,
                    count: sections.len(),
                });
            }
            let section = match section {
                Some(section) => section,
                None => {
                    built_sections.insert(index);
                    build_section(repr, index, None)
                }
            };
            sections.insert(index, section);
        }

        // Cell insertions, ascending by final path.
        let mut item_inserts: Vec<(ItemPath, Option<Item>)> = resolved
            .iter()
            .filter_map(|change| match change {
                Resolved::ItemInsert(path) if !built_sections.contains(&path.section) => Some((*path, None)),
                _ => None,
            })
            .chain(moved_items.into_iter().map(|(to, item)| (to, Some(item))))
            .collect();
        item_inserts.sort_by_key(|(path, _)| *path);
        for (path, item) in item_inserts {
            let count = after.len();
            let section = after
                .sections_mut()
                .get_mut(path.section)
                .ok_or(LayoutError::SectionOutOfRange {
                    index: path.section,
                    count,
                })?;
            let item = item.unwrap_or_else(|| build_item(repr, ItemKind::Cell, path, None));
            if built_sections.contains(&path.section) && path.item < section.count() {
                // The freshly built section already has an element here.
                section.replace(item, path.item)?;
            } else if path.item <= section.count() {
                section.insert(item, path.item)?;
            } else {
                return Err(ModelError::IndexOutOfRange {
                    index: path.item,
                    len: section.count(),
                }
                .into());
            }
        }

        // Reloads re-query the representation at the element's final position.
        for change in &resolved {
            match *change {
                Resolved::SectionReload(id) => {
                    let Some(index) = after.find_section(id) else {
                        continue;
                    };
                    let sections = after.sections_mut();
                    let rebuilt = build_section(repr, index, Some(&sections[index]));
                    sections[index] = rebuilt;
                }
                Resolved::ItemReload(id) => {
                    let Some(path) = after.find_item(id) else {
                        continue;
                    };
                    let section = &mut after.sections_mut()[path.section];
                    let rebuilt = build_item(repr, ItemKind::Cell, path, section.item(path.item));
                    section.replace(rebuilt, path.item)?;
                }
                _ => {}
            }
        }

        after.assemble_all(&settings);

        let mut bookkeeping = UpdateSet::default();
        for change in &sorted {
            bookkeeping.record(*change);
        }
        let proposed_compensating_offset = anchor_compensation(&self.before, &after, repr.visible_bounds());

        debug!(
            changes = changes.len(),
            sections_before = self.before.len(),
            sections_after = after.len(),
            proposed_compensating_offset,
            "Batch update opened"
        );
        self.pending = Some(PendingUpdate {
            after,
            changes: bookkeeping,
            proposed_compensating_offset,
        });
        Ok(())
    }

    fn resolve(&self, change: ChangeItem) -> Result<Resolved, LayoutError> {
        let section_id = |index: usize| {
            self.before
                .section_identifier(index)
                .ok_or(LayoutError::SectionOutOfRange {
                    index,
                    count: self.before.len(),
                })
        };
        let item_id = |path: ItemPath| {
            self.before
                .item_identifier(path, ItemKind::Cell)
                .ok_or(LayoutError::ItemNotFound {
                    kind: ItemKind::Cell,
                    path,
                })
        };
        Ok(match change {
            ChangeItem::SectionInsert { section } => Resolved::SectionInsert(section),
            ChangeItem::ItemInsert { path } => Resolved::ItemInsert(path),
            ChangeItem::SectionDelete { section } => Resolved::SectionDelete(section_id(section)?),
            ChangeItem::ItemDelete { path } => Resolved::ItemDelete(item_id(path)?),
            ChangeItem::SectionReload { section } => Resolved::SectionReload(section_id(section)?),
            ChangeItem::ItemReload { path } => Resolved::ItemReload(item_id(path)?),
            ChangeItem::SectionMove { from, to } => Resolved::SectionMove(section_id(from)?, to),
            ChangeItem::ItemMove { from, to } => Resolved::ItemMove(item_id(from)?, to),
        })
    }

    /// Close the batch update: the target model becomes the committed one.
    pub fn commit_updates(&mut self) {
        match self.pending.take() {
            Some(pending) => {
                self.before = pending.after;
                debug!(sections = self.before.len(), "Batch update committed");
            }
            None => debug!("Commit without an open batch update ignored"),
        }
    }

    /// Structural changes of the open batch update.
    pub fn changes(&self) -> Option<&UpdateSet> {
        self.pending.as_ref().map(|p| &p.changes)
    }

    /// How far the first visible surviving element moved during the open
    /// batch update; zero outside one.
    pub fn proposed_compensating_offset(&self) -> f64 {
        self.pending.as_ref().map_or(0.0, |p| p.proposed_compensating_offset)
    }

    /// Position in the other snapshot of the element at `path` in `state`.
    ///
    /// `None` means the element exists only in `state` (inserted or
    /// deleted). Requires an open batch update.
    pub fn counterpart_path(
        &self,
        kind: ItemKind,
        path: ItemPath,
        state: ModelState,
    ) -> Result<Option<ItemPath>, LayoutError> {
        let other = match state {
            ModelState::BeforeUpdate => ModelState::AfterUpdate,
            ModelState::AfterUpdate => ModelState::BeforeUpdate,
        };
        let id = self
            .snapshot(state)?
            .item_identifier(path, kind)
            .ok_or(LayoutError::ItemNotFound { kind, path })?;
        Ok(self.snapshot(other)?.item_path(id, kind))
    }

    /// Identity of the element at `path`.
    pub fn item_identifier(&self, path: ItemPath, kind: ItemKind, state: ModelState) -> Result<Option<ItemId>, LayoutError> {
        Ok(self.snapshot(state)?.item_identifier(path, kind))
    }

    /// Position of the element with this identity.
    pub fn item_path(&self, id: ItemId, kind: ItemKind, state: ModelState) -> Result<Option<ItemPath>, LayoutError> {
        Ok(self.snapshot(state)?.item_path(id, kind))
    }

    /// Identity of the section at `index`.
    pub fn section_identifier(&self, index: usize, state: ModelState) -> Result<Option<SectionId>, LayoutError> {
        Ok(self.snapshot(state)?.section_identifier(index))
    }

    /// Index of the section with this identity.
    pub fn section_index(&self, id: SectionId, state: ModelState) -> Result<Option<usize>, LayoutError> {
        Ok(self.snapshot(state)?.section_index(id))
    }

    /// Number of sections.
    pub fn number_of_sections(&self, state: ModelState) -> Result<usize, LayoutError> {
        Ok(self.snapshot(state)?.len())
    }

    /// Number of cells in `section`.
    pub fn number_of_items(&self, section: usize, state: ModelState) -> Result<usize, LayoutError> {
        let snapshot = self.snapshot(state)?;
        snapshot
            .section(section)
            .map(Section::count)
            .ok_or(LayoutError::SectionOutOfRange {
                index: section,
                count: snapshot.len(),
            })
    }

    /// The element at `path`.
    pub fn item(&self, path: ItemPath, kind: ItemKind, state: ModelState) -> Result<&Item, LayoutError> {
        self.snapshot(state)?
            .item(path, kind)
            .ok_or(LayoutError::ItemNotFound { kind, path })
    }
}

/// Movement of the first element visible in `before` that survives into
/// `after`; zero when none does.
fn anchor_compensation(before: &Snapshot, after: &Snapshot, visible: Rect) -> f64 {
    elements_in(before, visible.min_y(), visible.max_y(), None)
        .iter()
        .find_map(|element| {
            let path = after.item_path(element.item.id(), element.kind)?;
            let after_y = natural_y(after, path, element.kind)?;
            Some(after_y - element.y)
        })
        .unwrap_or(0.0)
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
