//! Host-side collaborators of the layout.
//!
//! The layout never owns its host: a [`CollectionHost`] and a
//! [`LayoutDelegate`] are borrowed for the duration of each call and adapted
//! into a [`LayoutRepresentation`] for the state controller.

use super::attributes::LayoutAttributes;
use crate::config::LayoutSettings;
use crate::geometry::{EdgeInsets, Rect, Size};
use crate::model::{ItemAlignment, ItemConfiguration, ItemKind, ItemPath, ItemPinning, ItemSize};
use crate::state::LayoutRepresentation;

/// When the layout asks the delegate to adjust an appearing element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitialAttributesRequestType {
    /// The host asks for the starting state of an insertion animation.
    Initial,
    /// An element that is still appearing was resized and re-laid out.
    Invalidation,
}

/// The scrollable view hosting the layout.
pub trait CollectionHost {
    /// Number of sections in the data source.
    fn number_of_sections(&self) -> usize;

    /// Number of cells in `section`.
    fn number_of_items(&self, section: usize) -> usize;

    /// Visible rectangle; its origin is the current content offset.
    fn bounds(&self) -> Rect;

    /// Insets applied around the content (safe area, bars).
    fn adjusted_content_insets(&self) -> EdgeInsets {
        EdgeInsets::ZERO
    }
}

/// Per-element intent supplied by the content side.
///
/// Every method has a default, so implementors only override what they
/// care about.
pub trait LayoutDelegate {
    /// Whether `section` presents a header. Defaults to `false`.
    fn should_present_header(&self, _section: usize) -> bool {
        false
    }

    /// Whether `section` presents a footer. Defaults to `false`.
    fn should_present_footer(&self, _section: usize) -> bool {
        false
    }

    /// Size intent of an element. Defaults to [`ItemSize::Auto`].
    ///
    /// Returning [`ItemSize::Exact`] skips measurement for that element.
    fn size_for_item(&self, _kind: ItemKind, _path: ItemPath) -> ItemSize {
        ItemSize::Auto
    }

    /// Horizontal alignment. Defaults to [`ItemAlignment::FullWidth`].
    fn alignment_for_item(&self, _kind: ItemKind, _path: ItemPath) -> ItemAlignment {
        ItemAlignment::FullWidth
    }

    /// Pinning behavior. Only honored when pinning is enabled in the
    /// settings. Defaults to [`ItemPinning::None`].
    fn pinning_for_item(&self, _kind: ItemKind, _path: ItemPath) -> ItemPinning {
        ItemPinning::None
    }

    /// Adjust the starting state of an inserted element. Defaults to a
    /// fully transparent element.
    fn initial_layout_attributes_for_inserted_item(
        &self,
        _kind: ItemKind,
        _path: ItemPath,
        attributes: &mut LayoutAttributes,
        _phase: InitialAttributesRequestType,
    ) {
        attributes.alpha = 0.0;
    }

    /// Adjust the final state of a deleted element. Defaults to a fully
    /// transparent element.
    fn final_layout_attributes_for_deleted_item(
        &self,
        _kind: ItemKind,
        _path: ItemPath,
        attributes: &mut LayoutAttributes,
    ) {
        attributes.alpha = 0.0;
    }
}

/// Delegate that answers every query with its default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDelegate;

impl LayoutDelegate for DefaultDelegate {}

/// Borrowed view of a host, its delegate and the settings, as seen by the
/// state controller.
pub struct HostRepresentation<'a, H: ?Sized, D: ?Sized> {
    host: &'a H,
    delegate: &'a D,
    settings: &'a LayoutSettings,
}

impl<'a, H, D> HostRepresentation<'a, H, D>
where
    H: CollectionHost + ?Sized,
    D: LayoutDelegate + ?Sized,
{
    /// Adapt a host and delegate for one call.
    pub fn new(host: &'a H, delegate: &'a D, settings: &'a LayoutSettings) -> Self {
        Self {
            host,
            delegate,
            settings,
        }
    }

    /// Size used for [`ItemSize::Auto`].
    fn estimated_item_size(&self) -> Size {
        self.settings
            .estimated_item_size
            .unwrap_or_else(|| Size::new(self.layout_frame_width(), LayoutSettings::FALLBACK_ESTIMATED_HEIGHT))
    }
}

impl<H, D> LayoutRepresentation for HostRepresentation<'_, H, D>
where
    H: CollectionHost + ?Sized,
    D: LayoutDelegate + ?Sized,
{
    fn settings(&self) -> &LayoutSettings {
        self.settings
    }

    fn number_of_sections(&self) -> usize {
        self.host.number_of_sections()
    }

    fn number_of_items(&self, section: usize) -> usize {
        self.host.number_of_items(section)
    }

    fn should_present_header(&self, section: usize) -> bool {
        self.delegate.should_present_header(section)
    }

    fn should_present_footer(&self, section: usize) -> bool {
        self.delegate.should_present_footer(section)
    }

    fn configuration(&self, kind: ItemKind, path: ItemPath) -> ItemConfiguration {
        let (preferred_size, calculated_size) = match self.delegate.size_for_item(kind, path) {
            ItemSize::Auto => (self.estimated_item_size(), None),
            ItemSize::Estimated(size) => (size, None),
            ItemSize::Exact(size) => (size, Some(size)),
        };
        ItemConfiguration {
            preferred_size,
            calculated_size,
            alignment: self.delegate.alignment_for_item(kind, path),
            pinning: self.delegate.pinning_for_item(kind, path),
        }
    }

    fn visible_bounds(&self) -> Rect {
        let bounds = self.host.bounds();
        let insets = self.host.adjusted_content_insets();
        Rect::new(
            0.0,
            bounds.min_y() + insets.top,
            (bounds.width() - insets.horizontal()).max(0.0),
            (bounds.height() - insets.vertical()).max(0.0),
        )
    }

    fn adjusted_content_insets(&self) -> EdgeInsets {
        self.host.adjusted_content_insets()
    }

    fn view_size(&self) -> Size {
        self.host.bounds().size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedHost;

    impl CollectionHost for FixedHost {
        fn number_of_sections(&self) -> usize {
            1
        }

        fn number_of_items(&self, _section: usize) -> usize {
            3
        }

        fn bounds(&self) -> Rect {
            Rect::new(0.0, 100.0, 320.0, 480.0)
        }

        fn adjusted_content_insets(&self) -> EdgeInsets {
            EdgeInsets::new(20.0, 10.0, 30.0, 10.0)
        }
    }

    struct ExactDelegate;

    impl LayoutDelegate for ExactDelegate {
        fn size_for_item(&self, _kind: ItemKind, _path: ItemPath) -> ItemSize {
            ItemSize::Exact(Size::new(50.0, 25.0))
        }
    }

    #[test]
    fn default_delegate_answers_defaults() {
        let delegate = DefaultDelegate;
        let path = ItemPath::new(0, 0);
        assert!(!delegate.should_present_header(0));
        assert!(!delegate.should_present_footer(0));
        assert_eq!(delegate.size_for_item(ItemKind::Cell, path), ItemSize::Auto);
        assert_eq!(delegate.alignment_for_item(ItemKind::Cell, path), ItemAlignment::FullWidth);
        assert_eq!(delegate.pinning_for_item(ItemKind::Cell, path), ItemPinning::None);
    }

    #[test]
    fn visible_bounds_subtract_host_insets() {
        let settings = LayoutSettings::default();
        let repr = HostRepresentation::new(&FixedHost, &DefaultDelegate, &settings);
        assert_eq!(repr.visible_bounds(), Rect::new(0.0, 120.0, 300.0, 430.0));
        assert_eq!(repr.view_size(), Size::new(320.0, 480.0));
    }

    #[test]
    fn auto_size_falls_back_to_layout_width() {
        let mut settings = LayoutSettings::default();
        settings.additional_insets = EdgeInsets::new(0.0, 8.0, 0.0, 12.0);
        let repr = HostRepresentation::new(&FixedHost, &DefaultDelegate, &settings);

        let configuration = repr.configuration(ItemKind::Cell, ItemPath::new(0, 0));

        assert_eq!(configuration.preferred_size, Size::new(280.0, 40.0));
        assert_eq!(configuration.calculated_size, None);
    }

    #[test]
    fn auto_size_uses_configured_estimate() {
        let settings = LayoutSettings {
            estimated_item_size: Some(Size::new(100.0, 60.0)),
            ..LayoutSettings::default()
        };
        let repr = HostRepresentation::new(&FixedHost, &DefaultDelegate, &settings);
        let configuration = repr.configuration(ItemKind::Header, ItemPath::supplementary(0));
        assert_eq!(configuration.preferred_size, Size::new(100.0, 60.0));
    }

    #[test]
    fn exact_size_is_already_calculated() {
        let settings = LayoutSettings::default();
        let repr = HostRepresentation::new(&FixedHost, &ExactDelegate, &settings);
        let configuration = repr.configuration(ItemKind::Cell, ItemPath::new(0, 2));
        assert_eq!(configuration.calculated_size, Some(Size::new(50.0, 25.0)));
    }
}
