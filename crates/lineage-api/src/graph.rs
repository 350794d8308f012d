//! Handler for `GET /graph`.
//!
//! Returns the renderer-neutral [`FamilyGraph`] built from every record.
//! Photos are not resolved here; nodes always carry the text-only label.

use axum::{Json, extract::State};
use lineage_core::{
  graph::{FamilyGraph, NoPhotos},
  store::RecordStore,
};

use crate::{ApiState, error::ApiError};

/// `GET /graph`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<FamilyGraph>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let records = state
    .store
    .load_all()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(FamilyGraph::build(&records, &NoPhotos)))
}
