//! Stable identifier newtypes.
//!
//! Identifiers are allocated from process-wide counters and are never
//! reused, so an id seen in a `before` snapshot names the same logical
//! element in the `after` snapshot of a batch update.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one laid-out element (cell, header or footer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ItemId(u64);

impl ItemId {
    /// Allocate a fresh identifier.
    pub fn next() -> Self {
        Self(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value, for logging and serialization.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// Identity of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SectionId(u64);

impl SectionId {
    /// Allocate a fresh identifier.
    pub fn next() -> Self {
        Self(NEXT_SECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value, for logging and serialization.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "section-{}", self.0)
    }
}
