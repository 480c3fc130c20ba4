//! # berth-registry
//!
//! The source of truth for which containers should exist and how they are
//! configured. Records live in a single JSON table; port and volume lists
//! are normalized by [`sanitize`] before they are stored.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod sanitize;
pub mod store;

pub use store::Registry;
