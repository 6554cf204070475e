//! Error types for the layout core.
//!
//! Two layers, composed via `?` and `From`:
//!
//! - [`ModelError`] - contract violations detected by a single [`Section`](super::Section)
//!   edit (bad index, identity mismatch on a by-identity replace).
//! - [`LayoutError`] - failures of controller queries and transactions, wrapping
//!   [`ModelError`].
//!
//! # Recovery Strategy
//!
//! Every variant signals caller misuse: indices and identities are always derived
//! from the core's own prior output, so there is nothing to retry. Debug builds
//! assert at the detection site; release builds leave the model untouched and
//! return the error so the caller can log it and degrade (empty result, no-op).
//! Absent optional data (no measured size, no header) is never an error.

use crate::model::identifiers::{ItemId, SectionId};
use crate::model::item::ItemKind;
use crate::model::item_path::ItemPath;
use crate::state::ModelState;
use thiserror::Error;

/// Contract violation inside a single section edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Index outside `0..len` (or `0..=len` for insertion).
    #[error("Index {index} out of range (len: {len})")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of items in the section at the time of the call.
        len: usize,
    },

    /// A by-identity replace received a different logical item.
    ///
    /// Replacing a different item must go through insert/remove followed by
    /// a full reassembly.
    #[error("Identity mismatch: expected {expected}, found {found}")]
    IdentityMismatch {
        /// Identity of the current occupant.
        expected: ItemId,
        /// Identity of the replacement.
        found: ItemId,
    },
}

/// Failure of a controller query, update or transaction step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The requested snapshot does not exist in the current transaction state.
    #[error("No {0:?} snapshot is available")]
    SnapshotUnavailable(ModelState),

    /// A batch update was started while another one was still open.
    #[error("A batch update is already in progress")]
    TransactionInProgress,

    /// Section index outside the snapshot.
    #[error("Section {index} out of range (sections: {count})")]
    SectionOutOfRange {
        /// The offending section index.
        index: usize,
        /// Number of sections in the snapshot.
        count: usize,
    },

    /// No element of this kind at this path.
    #[error("No {kind:?} at {path}")]
    ItemNotFound {
        /// Requested kind.
        kind: ItemKind,
        /// Requested path.
        path: ItemPath,
    },

    /// No section with this identity.
    #[error("Unknown section {0}")]
    UnknownSection(SectionId),

    /// A section-level edit failed.
    #[error("Model edit failed: {0}")]
    Model(#[from] ModelError),
}
