//! Tests for the layout driver.

use super::*;
use crate::geometry::EdgeInsets;
use crate::model::{ItemAlignment, ItemPinning, ItemSize};
use crate::test_harness::{MockElement, MockHost, MockSection};
use std::cell::RefCell;

const WIDTH: f64 = 300.0;

fn layout_for(host: &MockHost) -> TableLayout {
    let mut layout = TableLayout::new(host.settings.clone());
    layout.prepare(host, host).expect("initial prepare");
    layout
}

fn estimated_host(count: usize) -> MockHost {
    MockHost::new(WIDTH, 100.0).with_section(MockSection {
        header: None,
        footer: None,
        items: (0..count).map(|_| MockElement::estimated(WIDTH, 40.0)).collect(),
    })
}

fn resized(attributes: &LayoutAttributes, height: f64) -> LayoutAttributes {
    let mut preferred = attributes.clone();
    preferred.frame.size.height = height;
    preferred
}

/// Delegate that records the phases it is asked to adjust inserted elements in.
struct RecordingDelegate<'a> {
    inner: &'a MockHost,
    phases: RefCell<Vec<InitialAttributesRequestType>>,
}

impl LayoutDelegate for RecordingDelegate<'_> {
    fn should_present_header(&self, section: usize) -> bool {
        self.inner.should_present_header(section)
    }

    fn should_present_footer(&self, section: usize) -> bool {
        self.inner.should_present_footer(section)
    }

    fn size_for_item(&self, kind: ItemKind, path: ItemPath) -> ItemSize {
        self.inner.size_for_item(kind, path)
    }

    fn initial_layout_attributes_for_inserted_item(
        &self,
        _kind: ItemKind,
        _path: ItemPath,
        attributes: &mut LayoutAttributes,
        phase: InitialAttributesRequestType,
    ) {
        attributes.alpha = 0.5;
        self.phases.borrow_mut().push(phase);
    }
}

// ===== Preparation =====

#[test]
fn first_prepare_builds_model() {
    let host = MockHost::new(WIDTH, 100.0).with_section(MockSection::cells(WIDTH, &[30.0, 40.0]));
    let layout = layout_for(&host);

    assert_eq!(layout.content_size(&host), Size::new(WIDTH, 70.0));
    assert_eq!(layout.state(), ModelState::BeforeUpdate);
}

#[test]
fn content_width_excludes_host_insets() {
    let mut host = MockHost::new(WIDTH, 100.0).with_section(MockSection::cells(WIDTH, &[30.0]));
    host.insets = EdgeInsets::new(0.0, 15.0, 0.0, 15.0);
    let layout = layout_for(&host);

    assert_eq!(layout.content_size(&host).width, 270.0);
}

#[test]
fn data_source_invalidation_rebuilds_model() {
    let mut host = MockHost::new(WIDTH, 100.0).with_section(MockSection::cells(WIDTH, &[30.0]));
    let mut layout = layout_for(&host);

    host.sections[0].items.push(MockElement::exact(WIDTH, 20.0));
    layout.invalidate_layout(&InvalidationContext::data_source_counts());
    layout.prepare(&host, &host).expect("prepare");

    assert_eq!(layout.content_size(&host).height, 50.0);
}

#[test]
fn pinning_invalidation_keeps_measurements() {
    let host = estimated_host(3);
    let mut layout = layout_for(&host);
    let original = layout
        .layout_attributes_for_item(ItemPath::new(0, 0), &host, &host)
        .expect("attributes");
    layout
        .invalidation_context_for_preferred_attributes(&resized(&original, 70.0), &original, &host, &host)
        .expect("measurement");

    layout.invalidate_layout(&InvalidationContext::pinning());
    layout.prepare(&host, &host).expect("prepare");

    let item = layout
        .controller()
        .item(ItemPath::new(0, 0), ItemKind::Cell, ModelState::BeforeUpdate)
        .expect("item");
    assert!(item.calculated_size.is_some());
}

#[test]
fn metrics_invalidation_resets_measurements_but_keeps_frames() {
    let host = estimated_host(3);
    let mut layout = layout_for(&host);
    let original = layout
        .layout_attributes_for_item(ItemPath::new(0, 0), &host, &host)
        .expect("attributes");
    layout
        .invalidation_context_for_preferred_attributes(&resized(&original, 70.0), &original, &host, &host)
        .expect("measurement");

    layout.invalidate_layout(&InvalidationContext::default());
    layout.prepare(&host, &host).expect("prepare");

    let attributes = layout
        .layout_attributes_for_item(ItemPath::new(0, 0), &host, &host)
        .expect("attributes");
    assert_eq!(attributes.frame.height(), 70.0);
    assert!(layout.should_invalidate_for_preferred_attributes(&attributes, &attributes));
}

#[test]
fn settings_change_keeps_identities_and_measured_heights() {
    let host = estimated_host(3);
    let mut layout = layout_for(&host);
    let original = layout
        .layout_attributes_for_item(ItemPath::new(0, 0), &host, &host)
        .expect("attributes");
    layout
        .invalidation_context_for_preferred_attributes(&resized(&original, 60.0), &original, &host, &host)
        .expect("measurement");

    layout.set_settings(LayoutSettings {
        inter_item_spacing: 2.0,
        ..host.settings.clone()
    });
    layout.prepare(&host, &host).expect("prepare");

    let first = layout
        .layout_attributes_for_item(ItemPath::new(0, 0), &host, &host)
        .expect("attributes");
    let second = layout
        .layout_attributes_for_item(ItemPath::new(0, 1), &host, &host)
        .expect("attributes");
    assert_eq!(first.item_id, original.item_id);
    assert_eq!(first.frame.height(), 60.0);
    assert_eq!(second.frame.min_y(), 62.0);
    assert_eq!(layout.content_size(&host).height, 144.0);
}

#[test]
fn settings_change_before_first_prepare_builds_model() {
    let host = MockHost::new(WIDTH, 100.0).with_section(MockSection::cells(WIDTH, &[30.0, 40.0]));
    let mut layout = TableLayout::new(host.settings.clone());

    layout.set_settings(LayoutSettings {
        inter_item_spacing: 5.0,
        ..host.settings.clone()
    });
    layout.prepare(&host, &host).expect("prepare");

    assert_eq!(layout.content_size(&host).height, 75.0);
}

// ===== Queries =====

#[test]
fn supplementary_query_rejects_cells() {
    let host = MockHost::new(WIDTH, 100.0).with_section(MockSection::cells(WIDTH, &[30.0]));
    let layout = layout_for(&host);

    let result = layout.layout_attributes_for_supplementary(ItemKind::Cell, ItemPath::new(0, 0), &host, &host);

    assert!(matches!(result, Err(LayoutError::ItemNotFound { .. })));
}

#[test]
fn supplementary_query_returns_header() {
    let host = MockHost::new(WIDTH, 100.0).with_section(
        MockSection::cells(WIDTH, &[30.0]).with_header(MockElement::exact(WIDTH, 12.0)),
    );
    let layout = layout_for(&host);

    let header = layout
        .layout_attributes_for_supplementary(ItemKind::Header, ItemPath::supplementary(0), &host, &host)
        .expect("header");

    assert_eq!(header.frame, Rect::new(0.0, 0.0, WIDTH, 12.0));
    assert_eq!(header.z_index, attributes::SUPPLEMENTARY_Z_INDEX);
}

#[test]
fn rect_query_uses_current_state() {
    let host = MockHost::new(WIDTH, 100.0).with_section(MockSection::cells(WIDTH, &[30.0; 5]));
    let layout = layout_for(&host);

    let attributes = layout
        .layout_attributes_for_elements(Rect::new(0.0, 0.0, WIDTH, 100.0), &host, &host)
        .expect("query");

    assert_eq!(attributes.len(), 4);
}

// ===== Bounds changes =====

#[test]
fn width_change_invalidates_metrics() {
    let host = MockHost::new(WIDTH, 100.0).with_section(MockSection::cells(WIDTH, &[30.0]));
    let layout = layout_for(&host);
    let new_bounds = Rect::new(0.0, 0.0, 400.0, 100.0);

    assert!(layout.should_invalidate_for_bounds_change(new_bounds, &host));
    let context = layout.invalidation_context_for_bounds_change(new_bounds, &host);
    assert!(context.invalidate_layout_metrics);
    assert!(!context.invalidate_for_pinning);
}

#[test]
fn scrolling_without_pinning_needs_no_layout() {
    let host = MockHost::new(WIDTH, 100.0).with_section(MockSection::cells(WIDTH, &[30.0; 10]));
    let layout = layout_for(&host);

    assert!(!layout.should_invalidate_for_bounds_change(Rect::new(0.0, 50.0, WIDTH, 100.0), &host));
}

#[test]
fn scrolling_with_pinning_repositions_pinned_only() {
    let mut host = MockHost::new(WIDTH, 100.0).with_section(
        MockSection::cells(WIDTH, &[30.0; 10]).with_header(MockElement::exact(WIDTH, 20.0).pinned(ItemPinning::Top)),
    );
    host.settings.allow_pinning = true;
    let mut layout = layout_for(&host);
    let new_bounds = Rect::new(0.0, 150.0, WIDTH, 100.0);

    assert!(layout.should_invalidate_for_bounds_change(new_bounds, &host));
    let context = layout.invalidation_context_for_bounds_change(new_bounds, &host);
    assert!(context.invalidate_for_pinning);
    assert!(!context.invalidate_layout_metrics);

    host.bounds = new_bounds;
    layout.invalidate_layout(&context);
    layout.prepare(&host, &host).expect("prepare");
    let header = layout
        .layout_attributes_for_supplementary(ItemKind::Header, ItemPath::supplementary(0), &host, &host)
        .expect("header");
    assert_eq!(header.frame.min_y(), 150.0);
    assert!(header.pinned);
}

#[test]
fn pinned_flag_follows_pinning_not_displacement() {
    let mut host = MockHost::new(WIDTH, 100.0).with_section(
        MockSection::cells(WIDTH, &[30.0; 5]).with_header(MockElement::exact(WIDTH, 20.0).pinned(ItemPinning::Top)),
    );
    host.settings.allow_pinning = true;
    let layout = layout_for(&host);

    let header = layout
        .layout_attributes_for_supplementary(ItemKind::Header, ItemPath::supplementary(0), &host, &host)
        .expect("header");
    assert_eq!(header.frame.min_y(), 0.0);
    assert!(header.pinned);
    assert_eq!(header.z_index, attributes::PINNED_Z_INDEX);

    host.settings.allow_pinning = false;
    let layout = layout_for(&host);
    let header = layout
        .layout_attributes_for_supplementary(ItemKind::Header, ItemPath::supplementary(0), &host, &host)
        .expect("header");
    assert!(!header.pinned);
    assert_eq!(header.z_index, attributes::SUPPLEMENTARY_Z_INDEX);
}

// ===== Self-sizing =====

#[test]
fn measurement_invalidates_item_and_visible_followers() {
    let host = estimated_host(10);
    let mut layout = layout_for(&host);
    let original = layout
        .layout_attributes_for_item(ItemPath::new(0, 0), &host, &host)
        .expect("attributes");
    let preferred = resized(&original, 60.0);

    assert!(layout.should_invalidate_for_preferred_attributes(&preferred, &original));
    let context = layout
        .invalidation_context_for_preferred_attributes(&preferred, &original, &host, &host)
        .expect("measurement");

    assert_eq!(
        context.invalidated_items,
        vec![(ItemKind::Cell, ItemPath::new(0, 0)), (ItemKind::Cell, ItemPath::new(0, 1))]
    );
    assert_eq!(context.content_size_adjustment, Size::new(0.0, 20.0));
    assert_eq!(context.content_offset_adjustment, Point::ZERO);
    assert!(!context.invalidate_layout_metrics);
    assert!(!layout.should_invalidate_for_preferred_attributes(&preferred, &original));
    assert_eq!(layout.content_size(&host).height, 420.0);
}

#[test]
fn measurement_above_viewport_adjusts_offset() {
    let mut host = estimated_host(10);
    host.scroll_to(200.0);
    let mut layout = layout_for(&host);
    let original = layout
        .layout_attributes_for_item(ItemPath::new(0, 0), &host, &host)
        .expect("attributes");

    let context = layout
        .invalidation_context_for_preferred_attributes(&resized(&original, 60.0), &original, &host, &host)
        .expect("measurement");

    assert_eq!(context.content_offset_adjustment, Point::new(0.0, 20.0));
}

#[test]
fn alignment_change_is_a_measurement() {
    let host = MockHost::new(WIDTH, 100.0).with_section(MockSection::cells(WIDTH, &[30.0]));
    let mut layout = layout_for(&host);
    let original = layout
        .layout_attributes_for_item(ItemPath::new(0, 0), &host, &host)
        .expect("attributes");
    let mut preferred = original.clone();
    preferred.alignment = ItemAlignment::Leading;

    assert!(layout.should_invalidate_for_preferred_attributes(&preferred, &original));
    let context = layout
        .invalidation_context_for_preferred_attributes(&preferred, &original, &host, &host)
        .expect("measurement");
    assert_eq!(context.invalidated_items, vec![(ItemKind::Cell, ItemPath::new(0, 0))]);
}

// ===== Batch updates =====

fn three_cells() -> MockHost {
    MockHost::new(WIDTH, 100.0).with_section(MockSection::cells(WIDTH, &[30.0, 30.0, 30.0]))
}

#[test]
fn insertion_animates_in_and_survivors_move() {
    let mut host = three_cells();
    let mut layout = layout_for(&host);

    host.sections[0].items.insert(0, MockElement::exact(WIDTH, 50.0));
    layout
        .prepare_for_updates(&[ChangeItem::ItemInsert { path: ItemPath::new(0, 0) }], &host, &host)
        .expect("valid batch");
    assert_eq!(layout.state(), ModelState::AfterUpdate);

    let inserted = layout
        .initial_attributes_for_appearing(ItemKind::Cell, ItemPath::new(0, 0), &host, &host)
        .expect("initial");
    assert_eq!(inserted.alpha, 0.0);
    assert_eq!(inserted.frame, Rect::new(0.0, 0.0, WIDTH, 50.0));
    assert!(layout.pending_appearance(ItemKind::Cell, ItemPath::new(0, 0)).is_some());

    let survivor_start = layout
        .initial_attributes_for_appearing(ItemKind::Cell, ItemPath::new(0, 1), &host, &host)
        .expect("initial");
    assert_eq!(survivor_start.frame.min_y(), 0.0);
    assert_eq!(survivor_start.alpha, 1.0);

    let survivor_end = layout
        .final_attributes_for_disappearing(ItemKind::Cell, ItemPath::new(0, 0), &host, &host)
        .expect("final");
    assert_eq!(survivor_end.frame.min_y(), 50.0);

    assert_eq!(layout.content_size(&host).height, 140.0);

    layout.finalize_updates();
    assert_eq!(layout.state(), ModelState::BeforeUpdate);
    assert!(layout.pending_appearance(ItemKind::Cell, ItemPath::new(0, 0)).is_none());
    assert_eq!(layout.controller().number_of_items(0, ModelState::BeforeUpdate), Ok(4));
}

#[test]
fn deletion_animates_out_in_place() {
    let mut host = three_cells();
    let mut layout = layout_for(&host);

    host.sections[0].items.remove(1);
    layout
        .prepare_for_updates(&[ChangeItem::ItemDelete { path: ItemPath::new(0, 1) }], &host, &host)
        .expect("valid batch");

    let deleted = layout
        .final_attributes_for_disappearing(ItemKind::Cell, ItemPath::new(0, 1), &host, &host)
        .expect("final");

    assert_eq!(deleted.alpha, 0.0);
    assert_eq!(deleted.frame.min_y(), 30.0);
}

#[test]
fn resized_insertion_is_readjusted_by_delegate() {
    let mut host = three_cells();
    let mut layout = layout_for(&host);
    host.sections[0].items.push(MockElement::estimated(WIDTH, 40.0));
    let delegate = RecordingDelegate {
        inner: &host,
        phases: RefCell::new(Vec::new()),
    };

    layout
        .prepare_for_updates(&[ChangeItem::ItemInsert { path: ItemPath::new(0, 3) }], &host, &delegate)
        .expect("valid batch");
    let initial = layout
        .initial_attributes_for_appearing(ItemKind::Cell, ItemPath::new(0, 3), &host, &delegate)
        .expect("initial");
    layout
        .invalidation_context_for_preferred_attributes(&resized(&initial, 90.0), &initial, &host, &delegate)
        .expect("measurement");

    assert_eq!(
        delegate.phases.borrow().as_slice(),
        &[InitialAttributesRequestType::Initial, InitialAttributesRequestType::Invalidation]
    );
    let pending = layout
        .pending_appearance(ItemKind::Cell, ItemPath::new(0, 3))
        .expect("cached");
    assert_eq!(pending.frame.height(), 90.0);
    assert_eq!(pending.alpha, 0.5);
}

#[test]
fn target_offset_keeps_first_visible_item_in_place() {
    let mut host = MockHost::new(WIDTH, 100.0).with_section(MockSection::cells(WIDTH, &[30.0; 10]));
    host.scroll_to(90.0);
    let mut layout = layout_for(&host);

    host.sections[0].items.insert(0, MockElement::exact(WIDTH, 45.0));
    layout
        .prepare_for_updates(&[ChangeItem::ItemInsert { path: ItemPath::new(0, 0) }], &host, &host)
        .expect("valid batch");

    assert_eq!(layout.target_content_offset(Point::new(0.0, 90.0), &host), Point::new(0.0, 135.0));
}

#[test]
fn target_offset_sticks_to_bottom_when_configured() {
    let mut host = three_cells();
    host.settings.keep_content_offset_at_bottom_on_batch_updates = true;
    let mut layout = layout_for(&host);
    assert!(layout.is_at_bottom(&host));

    host.sections[0].items.push(MockElement::exact(WIDTH, 50.0));
    layout
        .prepare_for_updates(&[ChangeItem::ItemInsert { path: ItemPath::new(0, 3) }], &host, &host)
        .expect("valid batch");

    // Content is now 140 high in a 100 high viewport.
    assert_eq!(layout.target_content_offset(Point::ZERO, &host), Point::new(0.0, 40.0));
}

#[test]
fn target_offset_is_unchanged_outside_updates() {
    let host = three_cells();
    let layout = layout_for(&host);
    let proposed = Point::new(0.0, 12.0);
    assert_eq!(layout.target_content_offset(proposed, &host), proposed);
}

#[test]
fn failed_batch_leaves_state_untouched() {
    let host = three_cells();
    let mut layout = layout_for(&host);

    let result = layout.prepare_for_updates(&[ChangeItem::SectionDelete { section: 4 }], &host, &host);

    assert_eq!(result, Err(LayoutError::SectionOutOfRange { index: 4, count: 1 }));
    assert_eq!(layout.state(), ModelState::BeforeUpdate);
}
