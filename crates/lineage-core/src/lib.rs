//! Core types and trait definitions for the Lineage family-tree keeper.
//!
//! This crate is deliberately free of HTTP, image and database dependencies.
//! All other crates depend on it; the graph builder in here performs no I/O.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod graph;
pub mod person;
pub mod store;

pub use error::{Error, Result};
