//! JSON REST API for Lineage.
//!
//! Exposes an axum [`Router`] backed by any [`lineage_core::store::RecordStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", lineage_api::api_router(api_state))
//! ```

pub mod error;
pub mod graph;
pub mod people;

use std::{ops::RangeInclusive, sync::Arc};

use axum::{Router, routing::get};
use lineage_core::{person::DEFAULT_BIRTH_YEARS, store::RecordStore};
use tokio::sync::Mutex;

pub use error::ApiError;

/// State shared by the API handlers.
pub struct ApiState<S> {
  pub store:       Arc<S>,
  /// Inclusive range accepted for `birth_year`.
  pub birth_years: RangeInclusive<i32>,
  /// Held for the whole of an ingestion so ids are assigned one at a time.
  pub ingest:      Arc<Mutex<()>>,
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      birth_years: DEFAULT_BIRTH_YEARS,
      ingest: Arc::new(Mutex::new(())),
    }
  }
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:       Arc::clone(&self.store),
      birth_years: self.birth_years.clone(),
      ingest:      Arc::clone(&self.ingest),
    }
  }
}

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: RecordStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/people", get(people::list::<S>).post(people::create::<S>))
    .route("/people/{id}", get(people::get_one::<S>))
    .route("/graph", get(graph::handler::<S>))
    .with_state(state)
}
