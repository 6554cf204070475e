//! Stable layout engine for chat-style sectioned lists.
//!
//! The crate computes frames for cells, headers and footers of a vertically
//! scrolling list, keeps two snapshots of the model across animated batch
//! updates, and repositions pinned elements while scrolling.
//!
//! The pure core lives in [`model`] and [`state`]; [`layout`] drives it from a
//! host view through the [`layout::CollectionHost`] and
//! [`layout::LayoutDelegate`] traits. [`config`], [`logging`] and
//! [`scenario`] back the `stable-layout` binary.

pub mod config;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod model;
pub mod scenario;
pub mod state;

#[cfg(test)]
mod test_harness;
