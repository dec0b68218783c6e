//! JSON REST API over the MGNREGA performance table.
//!
//! Exposes a read-only axum [`Router`] backed by any
//! [`mgnrega_core::store::PerformanceStore`]. CORS, tracing, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/v1/performance", mgnrega_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod performance;

use std::sync::Arc;

use axum::{Router, routing::get};
use mgnrega_core::store::PerformanceStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type. Static segments take precedence over the
/// `{district}` capture, so a district literally named `states` is not
/// reachable through `/{district}`.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: PerformanceStore + 'static,
{
  Router::new()
    .route("/states", get(performance::states::<S>))
    .route("/districts", get(performance::districts::<S>))
    .route("/history/{district}", get(performance::history::<S>))
    .route("/{district}", get(performance::latest::<S>))
    .with_state(store)
}
