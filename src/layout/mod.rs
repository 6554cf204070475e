//! Layout driver.
//!
//! [`TableLayout`] bridges a host's layout protocol to the
//! [`StateController`]: it decides when the model is rebuilt, answers
//! attribute queries, runs the self-sizing feedback loop and brackets batch
//! updates. The host and delegate are borrowed per call, never stored.

pub mod attributes;
pub mod delegate;
pub mod invalidation;

// Re-export for convenience
pub use attributes::LayoutAttributes;
pub use delegate::{CollectionHost, DefaultDelegate, HostRepresentation, InitialAttributesRequestType, LayoutDelegate};
pub use invalidation::InvalidationContext;

use crate::config::LayoutSettings;
use crate::geometry::{Point, Rect, Size, EPSILON};
use crate::model::{ItemKind, ItemPath, LayoutError};
use crate::state::{ChangeItem, LayoutRepresentation, ModelState, StateController};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Slack when deciding whether the viewport rests at the bottom.
const BOTTOM_TOLERANCE: f64 = 0.5;

/// Work scheduled for the next [`TableLayout::prepare`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PrepareActions {
    recreate_section_models: bool,
    update_layout_metrics: bool,
}

/// Vertical order of an element inside the content.
fn layout_order(kind: ItemKind, path: ItemPath) -> (usize, usize) {
    let within = match kind {
        ItemKind::Header => 0,
        ItemKind::Cell => path.item.saturating_add(1),
        ItemKind::Footer => usize::MAX,
    };
    (path.section, within)
}

/// Table-style layout for a chat-like list of sections.
#[derive(Debug, Clone)]
pub struct TableLayout {
    settings: LayoutSettings,
    controller: StateController,
    state: ModelState,
    prepare_actions: PrepareActions,
    /// Whether the viewport rested at the bottom when the open batch update began.
    was_at_bottom: bool,
    /// Attributes handed out for inserted elements during the open batch update.
    pending_appearances: HashMap<(ItemKind, ItemPath), LayoutAttributes>,
}

impl TableLayout {
    /// Layout that builds its model on the first [`prepare`](Self::prepare).
    pub fn new(settings: LayoutSettings) -> Self {
        Self {
            settings,
            controller: StateController::new(),
            state: ModelState::BeforeUpdate,
            prepare_actions: PrepareActions {
                recreate_section_models: true,
                update_layout_metrics: false,
            },
            was_at_bottom: false,
            pending_appearances: HashMap::new(),
        }
    }

    /// Current settings.
    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Replace the settings; the next prepare reassembles the model with
    /// them, keeping identities and measured sizes as starting sizes.
    pub fn set_settings(&mut self, settings: LayoutSettings) {
        self.settings = settings;
        self.prepare_actions.update_layout_metrics = true;
    }

    /// The underlying state controller.
    pub fn controller(&self) -> &StateController {
        &self.controller
    }

    /// Snapshot that queries currently address.
    pub fn state(&self) -> ModelState {
        self.state
    }

    /// Record what the next [`prepare`](Self::prepare) has to do.
    pub fn invalidate_layout(&mut self, context: &InvalidationContext) {
        if context.requires_rebuild() {
            self.prepare_actions.recreate_section_models = true;
        }
        if context.invalidate_layout_metrics && !context.invalidate_for_pinning {
            self.prepare_actions.update_layout_metrics = true;
        }
        trace!(?context, "Layout invalidated");
    }

    /// Run the scheduled prepare actions.
    pub fn prepare(
        &mut self,
        host: &impl CollectionHost,
        delegate: &impl LayoutDelegate,
    ) -> Result<(), LayoutError> {
        let actions = std::mem::take(&mut self.prepare_actions);
        let repr = HostRepresentation::new(host, delegate, &self.settings);

        if actions.recreate_section_models {
            let sections = self.controller.build_sections(&repr);
            self.controller.set_sections(sections, self.state, &self.settings)?;
            debug!(state = ?self.state, "Section models recreated");
        } else if actions.update_layout_metrics {
            self.controller.reset_sizes(self.state, &self.settings)?;
        }
        Ok(())
    }

    /// Size of the scrollable content.
    pub fn content_size(&self, host: &impl CollectionHost) -> Size {
        let insets = host.adjusted_content_insets();
        let width = (host.bounds().width() - insets.horizontal()).max(0.0);
        let height = self
            .controller
            .content_height(self.state, &self.settings)
            .unwrap_or_else(|error| {
                warn!(%error, "Content height unavailable");
                0.0
            });
        Size::new(width, height)
    }

    /// Attributes of every element intersecting `rect`.
    pub fn layout_attributes_for_elements(
        &self,
        rect: Rect,
        host: &impl CollectionHost,
        delegate: &impl LayoutDelegate,
    ) -> Result<Vec<LayoutAttributes>, LayoutError> {
        let repr = HostRepresentation::new(host, delegate, &self.settings);
        self.controller.layout_attributes_for_elements(rect, self.state, &repr)
    }

    /// Attributes of one cell.
    pub fn layout_attributes_for_item(
        &self,
        path: ItemPath,
        host: &impl CollectionHost,
        delegate: &impl LayoutDelegate,
    ) -> Result<LayoutAttributes, LayoutError> {
        let repr = HostRepresentation::new(host, delegate, &self.settings);
        self.controller.item_attributes(path, ItemKind::Cell, self.state, &repr)
    }

    /// Attributes of a header or footer.
    pub fn layout_attributes_for_supplementary(
        &self,
        kind: ItemKind,
        path: ItemPath,
        host: &impl CollectionHost,
        delegate: &impl LayoutDelegate,
    ) -> Result<LayoutAttributes, LayoutError> {
        if !kind.is_supplementary() {
            return Err(LayoutError::ItemNotFound { kind, path });
        }
        let repr = HostRepresentation::new(host, delegate, &self.settings);
        self.controller.item_attributes(path, kind, self.state, &repr)
    }

    /// Whether moving to `new_bounds` needs a layout pass.
    ///
    /// A width change invalidates metrics; a pure scroll only matters when
    /// pinned elements have to follow it.
    pub fn should_invalidate_for_bounds_change(&self, new_bounds: Rect, host: &impl CollectionHost) -> bool {
        let old_bounds = host.bounds();
        if (old_bounds.width() - new_bounds.width()).abs() >= EPSILON {
            return true;
        }
        self.settings.allow_pinning
            && ((old_bounds.min_y() - new_bounds.min_y()).abs() >= EPSILON
                || (old_bounds.height() - new_bounds.height()).abs() >= EPSILON)
    }

    /// Invalidation for moving to `new_bounds`.
    pub fn invalidation_context_for_bounds_change(
        &self,
        new_bounds: Rect,
        host: &impl CollectionHost,
    ) -> InvalidationContext {
        let old_bounds = host.bounds();
        if (old_bounds.width() - new_bounds.width()).abs() >= EPSILON {
            debug!(
                old_width = old_bounds.width(),
                new_width = new_bounds.width(),
                "Width changed, invalidating metrics"
            );
            InvalidationContext::default()
        } else {
            InvalidationContext::pinning()
        }
    }

    /// Whether a measurement reported by the host differs from the model.
    pub fn should_invalidate_for_preferred_attributes(
        &self,
        preferred: &LayoutAttributes,
        original: &LayoutAttributes,
    ) -> bool {
        match self.controller.item(original.index_path, original.kind, self.state) {
            Ok(item) => {
                item.calculated_size.is_none()
                    || !item.size().approx_eq(&preferred.size())
                    || item.alignment != preferred.alignment
            }
            Err(error) => {
                trace!(%error, "Preferred attributes for an unknown element");
                false
            }
        }
    }

    /// Push a measurement into the model and describe the targeted
    /// re-layout it requires.
    pub fn invalidation_context_for_preferred_attributes(
        &mut self,
        preferred: &LayoutAttributes,
        original: &LayoutAttributes,
        host: &impl CollectionHost,
        delegate: &impl LayoutDelegate,
    ) -> Result<InvalidationContext, LayoutError> {
        let kind = original.kind;
        let path = original.index_path;
        let repr = HostRepresentation::new(host, delegate, &self.settings);
        let visible = repr.visible_bounds();

        let Some(update) = self.controller.update_preferred_size(
            path,
            kind,
            preferred.size(),
            preferred.alignment,
            self.state,
            &repr,
        )?
        else {
            return Ok(InvalidationContext::items(Vec::new()));
        };

        let mut invalidated = vec![(kind, path)];
        if update.others_shifted {
            let own = layout_order(kind, path);
            invalidated.extend(
                self.controller
                    .element_paths_in(visible, self.state)?
                    .into_iter()
                    .filter(|&(k, p)| layout_order(k, p) > own),
            );
        }

        let delta = update.height_delta();
        let mut context = InvalidationContext::items(invalidated);
        context.content_size_adjustment = Size::new(0.0, delta);
        if update.previous_frame.min_y() < visible.min_y() {
            context.content_offset_adjustment = Point::new(0.0, delta);
        }

        if let Some(cached) = self.pending_appearances.get_mut(&(kind, path)) {
            let mut refreshed = self.controller.item_attributes(path, kind, self.state, &repr)?;
            delegate.initial_layout_attributes_for_inserted_item(
                kind,
                path,
                &mut refreshed,
                InitialAttributesRequestType::Invalidation,
            );
            *cached = refreshed;
        }

        trace!(%path, ?kind, delta, invalidated = context.invalidated_items.len(), "Self-sizing invalidation");
        Ok(context)
    }

    /// Begin a batch update.
    pub fn prepare_for_updates(
        &mut self,
        changes: &[ChangeItem],
        host: &impl CollectionHost,
        delegate: &impl LayoutDelegate,
    ) -> Result<(), LayoutError> {
        let was_at_bottom = self.is_at_bottom(host);
        let repr = HostRepresentation::new(host, delegate, &self.settings);
        self.controller.process_updates(changes, &repr)?;
        self.state = ModelState::AfterUpdate;
        self.was_at_bottom = was_at_bottom;
        self.pending_appearances.clear();
        debug!(changes = changes.len(), was_at_bottom, "Prepared for updates");
        Ok(())
    }

    /// Commit the open batch update.
    pub fn finalize_updates(&mut self) {
        self.controller.commit_updates();
        self.state = ModelState::BeforeUpdate;
        self.was_at_bottom = false;
        self.pending_appearances.clear();
        debug!("Finalized updates");
    }

    /// Starting attributes of an element appearing at `path` (after-update
    /// position).
    ///
    /// Inserted elements start at their final geometry as adjusted by the
    /// delegate; elements that already existed start where they were.
    pub fn initial_attributes_for_appearing(
        &mut self,
        kind: ItemKind,
        path: ItemPath,
        host: &impl CollectionHost,
        delegate: &impl LayoutDelegate,
    ) -> Result<LayoutAttributes, LayoutError> {
        let repr = HostRepresentation::new(host, delegate, &self.settings);
        if !self.controller.is_updating() {
            return self.controller.item_attributes(path, kind, self.state, &repr);
        }
        match self.controller.counterpart_path(kind, path, ModelState::AfterUpdate)? {
            Some(before_path) => self
                .controller
                .item_attributes(before_path, kind, ModelState::BeforeUpdate, &repr),
            None => {
                let mut attributes = self
                    .controller
                    .item_attributes(path, kind, ModelState::AfterUpdate, &repr)?;
                delegate.initial_layout_attributes_for_inserted_item(
                    kind,
                    path,
                    &mut attributes,
                    InitialAttributesRequestType::Initial,
                );
                self.pending_appearances.insert((kind, path), attributes.clone());
                Ok(attributes)
            }
        }
    }

    /// Final attributes of an element disappearing from `path`
    /// (before-update position).
    ///
    /// Deleted elements end at their old geometry as adjusted by the
    /// delegate; elements that survive end where they are going.
    pub fn final_attributes_for_disappearing(
        &self,
        kind: ItemKind,
        path: ItemPath,
        host: &impl CollectionHost,
        delegate: &impl LayoutDelegate,
    ) -> Result<LayoutAttributes, LayoutError> {
        let repr = HostRepresentation::new(host, delegate, &self.settings);
        if !self.controller.is_updating() {
            return self.controller.item_attributes(path, kind, self.state, &repr);
        }
        match self.controller.counterpart_path(kind, path, ModelState::BeforeUpdate)? {
            Some(after_path) => self
                .controller
                .item_attributes(after_path, kind, ModelState::AfterUpdate, &repr),
            None => {
                let mut attributes = self
                    .controller
                    .item_attributes(path, kind, ModelState::BeforeUpdate, &repr)?;
                delegate.final_layout_attributes_for_deleted_item(kind, path, &mut attributes);
                Ok(attributes)
            }
        }
    }

    /// Attributes most recently handed out for an inserted element of the
    /// open batch update.
    pub fn pending_appearance(&self, kind: ItemKind, path: ItemPath) -> Option<&LayoutAttributes> {
        self.pending_appearances.get(&(kind, path))
    }

    /// Content offset to settle on once the open batch update is applied.
    ///
    /// Keeps the viewport at the bottom when configured and it was there,
    /// otherwise keeps the first visible surviving element in place.
    pub fn target_content_offset(&self, proposed: Point, host: &impl CollectionHost) -> Point {
        if !self.controller.is_updating() {
            return proposed;
        }
        if self.settings.keep_content_offset_at_bottom_on_batch_updates && self.was_at_bottom {
            let insets = host.adjusted_content_insets();
            let content_height = self
                .controller
                .content_height(ModelState::AfterUpdate, &self.settings)
                .unwrap_or(0.0);
            let bottom = content_height + insets.bottom - host.bounds().height();
            return Point::new(proposed.x, bottom.max(-insets.top));
        }
        Point::new(proposed.x, proposed.y + self.controller.proposed_compensating_offset())
    }

    /// Whether the viewport currently rests at the end of the content.
    pub fn is_at_bottom(&self, host: &impl CollectionHost) -> bool {
        let bounds = host.bounds();
        let insets = host.adjusted_content_insets();
        let content_height = self.content_size(host).height;
        let max_offset = content_height + insets.bottom - bounds.height();
        bounds.min_y() >= max_offset - BOTTOM_TOLERANCE
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
