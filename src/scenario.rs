//! Declarative host for the `stable-layout` binary.
//!
//! A scenario is a TOML description of a viewport and its sections:
//!
//! ```toml
//! [viewport]
//! width = 320.0
//! height = 480.0
//!
//! [[sections]]
//! header = { height = 28.0, pinning = "top" }
//! items = [
//!     { height = 44.0 },
//!     { height = 60.0, width = 200.0, alignment = "trailing" },
//! ]
//! ```
//!
//! [`Scenario`] answers both the host and the delegate questions, so a
//! layout can be built and queried without any UI toolkit.

use crate::config::LayoutSettings;
use crate::geometry::{EdgeInsets, Rect, Size};
use crate::layout::{
    CollectionHost, InvalidationContext, LayoutAttributes, LayoutDelegate, TableLayout,
};
use crate::model::{ItemAlignment, ItemKind, ItemPath, ItemPinning, ItemSize, LayoutError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Failures while loading or rendering a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The scenario file could not be read.
    #[error("Failed to read scenario at {path:?}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The scenario file is not valid TOML or has unknown keys.
    #[error("Invalid scenario in {path:?}: {source}")]
    Parse {
        /// Path with the invalid content.
        path: PathBuf,
        /// Parse error details.
        #[source]
        source: toml::de::Error,
    },

    /// The layout rejected a query.
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// How a scenario element reports its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sizing {
    /// The given size is final.
    #[default]
    Exact,
    /// The given size is a starting estimate.
    Estimated,
    /// Ignore the given size and use the layout's estimate.
    Auto,
}

/// One cell, header or footer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioElement {
    /// Height in points.
    pub height: f64,
    /// Width in points; the full available width when absent.
    #[serde(default)]
    pub width: Option<f64>,
    /// Whether the size is final.
    #[serde(default)]
    pub sizing: Sizing,
    /// Horizontal alignment.
    #[serde(default)]
    pub alignment: ItemAlignment,
    /// Pinning behavior, honored only with pinning enabled.
    #[serde(default)]
    pub pinning: ItemPinning,
}

/// One section of the data source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSection {
    /// Optional header.
    #[serde(default)]
    pub header: Option<ScenarioElement>,
    /// Optional footer.
    #[serde(default)]
    pub footer: Option<ScenarioElement>,
    /// Cells, top to bottom.
    #[serde(default)]
    pub items: Vec<ScenarioElement>,
}

/// Size, offset and insets of the scrollable view.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Viewport {
    /// View width.
    pub width: f64,
    /// View height.
    pub height: f64,
    /// Initial content offset.
    #[serde(default)]
    pub offset: f64,
    /// Adjusted content insets (safe area, bars).
    #[serde(default)]
    pub insets: EdgeInsets,
}

/// A complete scenario: the viewport plus the data source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// The scrollable view.
    pub viewport: Viewport,
    /// Sections, top to bottom.
    #[serde(default)]
    pub sections: Vec<ScenarioSection>,
}

/// What the binary prints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rendering {
    /// Size of the scrollable content.
    pub content_size: Size,
    /// Rectangle the attributes were collected for.
    pub rect: Rect,
    /// Elements intersecting `rect`, in layout order.
    pub attributes: Vec<LayoutAttributes>,
}

impl Scenario {
    /// Read and parse a scenario file.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario: Scenario = toml::from_str(&contents).map_err(|source| ScenarioError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?path, sections = scenario.sections.len(), "Scenario loaded");
        Ok(scenario)
    }

    /// Move the viewport to content offset `y`.
    pub fn scroll_to(&mut self, y: f64) {
        self.viewport.offset = y;
    }

    /// Build a layout for this scenario and collect the attributes in
    /// `rect`, or in the visible bounds when `rect` is `None`.
    pub fn render(&self, settings: LayoutSettings, rect: Option<Rect>) -> Result<Rendering, ScenarioError> {
        let mut layout = TableLayout::new(settings);
        layout.invalidate_layout(&InvalidationContext::everything());
        layout.prepare(self, self)?;

        let rect = rect.unwrap_or_else(|| self.bounds());
        let attributes = layout.layout_attributes_for_elements(rect, self, self)?;
        let content_size = layout.content_size(self);
        info!(
            elements = attributes.len(),
            content_height = content_size.height,
            "Scenario rendered"
        );

        Ok(Rendering {
            content_size,
            rect,
            attributes,
        })
    }

    fn element(&self, kind: ItemKind, path: ItemPath) -> Option<&ScenarioElement> {
        let section = self.sections.get(path.section)?;
        match kind {
            ItemKind::Cell => section.items.get(path.item),
            ItemKind::Header => section.header.as_ref(),
            ItemKind::Footer => section.footer.as_ref(),
        }
    }
}

impl CollectionHost for Scenario {
    fn number_of_sections(&self) -> usize {
        self.sections.len()
    }

    fn number_of_items(&self, section: usize) -> usize {
        self.sections.get(section).map_or(0, |s| s.items.len())
    }

    fn bounds(&self) -> Rect {
        Rect::new(0.0, self.viewport.offset, self.viewport.width, self.viewport.height)
    }

    fn adjusted_content_insets(&self) -> EdgeInsets {
        self.viewport.insets
    }
}

impl LayoutDelegate for Scenario {
    fn should_present_header(&self, section: usize) -> bool {
        self.sections.get(section).is_some_and(|s| s.header.is_some())
    }

    fn should_present_footer(&self, section: usize) -> bool {
        self.sections.get(section).is_some_and(|s| s.footer.is_some())
    }

    fn size_for_item(&self, kind: ItemKind, path: ItemPath) -> ItemSize {
        let Some(element) = self.element(kind, path) else {
            return ItemSize::Auto;
        };
        let available = (self.viewport.width - self.viewport.insets.horizontal()).max(0.0);
        let size = Size::new(element.width.unwrap_or(available), element.height);
        match element.sizing {
            Sizing::Exact => ItemSize::Exact(size),
            Sizing::Estimated => ItemSize::Estimated(size),
            Sizing::Auto => ItemSize::Auto,
        }
    }

    fn alignment_for_item(&self, kind: ItemKind, path: ItemPath) -> ItemAlignment {
        self.element(kind, path).map_or(ItemAlignment::FullWidth, |e| e.alignment)
    }

    fn pinning_for_item(&self, kind: ItemKind, path: ItemPath) -> ItemPinning {
        self.element(kind, path).map_or(ItemPinning::None, |e| e.pinning)
    }
}
