//! In-memory host for unit tests.
//!
//! [`MockHost`] plays both the scrollable view and the delegate: it owns a
//! mutable description of the data source that tests edit between batch
//! updates, the current bounds, and the settings the layout is built with.

use crate::config::LayoutSettings;
use crate::geometry::{EdgeInsets, Rect, Size};
use crate::layout::{CollectionHost, HostRepresentation, LayoutDelegate};
use crate::model::{ItemAlignment, ItemKind, ItemPath, ItemPinning, ItemSize};

/// One element of the mock data source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockElement {
    pub size: ItemSize,
    pub alignment: ItemAlignment,
    pub pinning: ItemPinning,
}

impl MockElement {
    /// Full-width element of exactly `height`.
    pub fn exact(width: f64, height: f64) -> Self {
        Self {
            size: ItemSize::Exact(Size::new(width, height)),
            alignment: ItemAlignment::FullWidth,
            pinning: ItemPinning::None,
        }
    }

    /// Element whose height is only an estimate.
    pub fn estimated(width: f64, height: f64) -> Self {
        Self {
            size: ItemSize::Estimated(Size::new(width, height)),
            ..Self::exact(width, height)
        }
    }

    pub fn pinned(mut self, pinning: ItemPinning) -> Self {
        self.pinning = pinning;
        self
    }

    pub fn aligned(mut self, alignment: ItemAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockSection {
    pub header: Option<MockElement>,
    pub footer: Option<MockElement>,
    pub items: Vec<MockElement>,
}

impl MockSection {
    /// Section of exact-height cells.
    pub fn cells(width: f64, heights: &[f64]) -> Self {
        Self {
            header: None,
            footer: None,
            items: heights.iter().map(|&h| MockElement::exact(width, h)).collect(),
        }
    }

    pub fn with_header(mut self, header: MockElement) -> Self {
        self.header = Some(header);
        self
    }

    pub fn with_footer(mut self, footer: MockElement) -> Self {
        self.footer = Some(footer);
        self
    }
}

/// Host and delegate in one.
#[derive(Debug, Clone)]
pub struct MockHost {
    pub sections: Vec<MockSection>,
    pub bounds: Rect,
    pub insets: EdgeInsets,
    pub settings: LayoutSettings,
}

impl MockHost {
    /// Empty host with a viewport of `width` x `height` at offset zero.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            sections: Vec::new(),
            bounds: Rect::new(0.0, 0.0, width, height),
            insets: EdgeInsets::ZERO,
            settings: LayoutSettings::default(),
        }
    }

    pub fn with_section(mut self, section: MockSection) -> Self {
        self.sections.push(section);
        self
    }

    pub fn with_settings(mut self, settings: LayoutSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Move the viewport to content offset `y`.
    pub fn scroll_to(&mut self, y: f64) {
        self.bounds.origin.y = y;
    }

    /// Representation over this host with its own settings.
    pub fn repr(&self) -> HostRepresentation<'_, Self, Self> {
        HostRepresentation::new(self, self, &self.settings)
    }

    fn element(&self, kind: ItemKind, path: ItemPath) -> Option<&MockElement> {
        let section = self.sections.get(path.section)?;
        match kind {
            ItemKind::Cell => section.items.get(path.item),
            ItemKind::Header => section.header.as_ref(),
            ItemKind::Footer => section.footer.as_ref(),
        }
    }
}

impl CollectionHost for MockHost {
    fn number_of_sections(&self) -> usize {
        self.sections.len()
    }

    fn number_of_items(&self, section: usize) -> usize {
        self.sections.get(section).map_or(0, |s| s.items.len())
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn adjusted_content_insets(&self) -> EdgeInsets {
        self.insets
    }
}

impl LayoutDelegate for MockHost {
    fn should_present_header(&self, section: usize) -> bool {
        self.sections.get(section).is_some_and(|s| s.header.is_some())
    }

    fn should_present_footer(&self, section: usize) -> bool {
        self.sections.get(section).is_some_and(|s| s.footer.is_some())
    }

    fn size_for_item(&self, kind: ItemKind, path: ItemPath) -> ItemSize {
        self.element(kind, path).map_or(ItemSize::Auto, |e| e.size)
    }

    fn alignment_for_item(&self, kind: ItemKind, path: ItemPath) -> ItemAlignment {
        self.element(kind, path).map_or(ItemAlignment::FullWidth, |e| e.alignment)
    }

    fn pinning_for_item(&self, kind: ItemKind, path: ItemPath) -> ItemPinning {
        self.element(kind, path).map_or(ItemPinning::None, |e| e.pinning)
    }
}
