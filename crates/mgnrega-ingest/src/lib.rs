//! The MGNREGA ingestion pipeline.
//!
//! One run fetches a page of records from the upstream statistics API,
//! validates and normalises them, drops duplicates, and atomically replaces
//! the persisted dataset. Runs are single-shot and sequential; scheduling is
//! left to an external scheduler (cron, systemd timers, ...).

#![allow(async_fn_in_trait)]

pub mod config;
pub mod fetch;
pub mod pipeline;

pub use config::IngestConfig;
pub use fetch::{DataGovSource, FetchError, RecordSource};
pub use pipeline::{IngestOutcome, Pipeline, PipelineError, SkipReason};
