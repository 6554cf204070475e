//! Layout state (pure).
//!
//! Snapshots, batch-update reconciliation and all geometry queries. Nothing
//! here knows about the host view; it is reached through
//! [`LayoutRepresentation`].

pub mod change_item;
pub mod controller;
pub mod pinning;
pub mod representation;
pub mod snapshot;

// Re-export for convenience
pub use change_item::ChangeItem;
pub use controller::{SizeUpdate, StateController, UpdateSet};
pub use pinning::{pinned_placements, PinnedPlacement};
pub use representation::{LayoutRepresentation, ModelState};
pub use snapshot::Snapshot;
