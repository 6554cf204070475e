//! Geometry model (pure).
//!
//! Value records for items and sections. Everything here is plain data with
//! explicit, index- and identity-checked mutation methods; nothing knows
//! about the host view.

pub mod error;
pub mod identifiers;
pub mod item;
pub mod item_path;
pub mod section;

// Re-export for convenience
pub use error::{LayoutError, ModelError};
pub use identifiers::{ItemId, SectionId};
pub use item::{Item, ItemAlignment, ItemConfiguration, ItemKind, ItemPinning, ItemSize};
pub use item_path::ItemPath;
pub use section::Section;
