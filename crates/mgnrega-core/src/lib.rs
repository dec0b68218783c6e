//! Core types and trait definitions for the MGNREGA performance dashboard.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! owns the record model, the validation and de-duplication stages of the
//! ingestion pipeline, and the [`store::PerformanceStore`] abstraction that
//! storage backends implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod dedup;
pub mod error;
pub mod ingestion;
pub mod metrics;
pub mod month;
pub mod normalize;
pub mod raw;
pub mod record;
pub mod store;

pub use error::Rejection;
