//! Container lifecycle orchestration for berth.
//!
//! The [`engine::Engine`] turns lifecycle commands into ordered calls over
//! the registry, the [`adapter::RuntimeAdapter`] and a caller-supplied
//! [`dispatch::Dispatcher`].

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod adapter;
pub mod allocator;
pub mod dispatch;
pub mod engine;
pub mod exec;
