//! `GET /`: the ingestion sidebar and the family chart.

use axum::{
  extract::{Query, State},
  response::Html,
};
use lineage_chart::ChartRenderer;
use lineage_core::store::RecordStore;
use serde::Deserialize;

use crate::{AppState, auth::Authenticated, error::Error, handlers::store_error, pages};

#[derive(Deserialize, Default)]
pub struct IndexParams {
  /// Id of the person just added, for the confirmation notice.
  pub added: Option<u64>,
}

pub async fn index<S, R>(
  State(state): State<AppState<S, R>>,
  _session: Authenticated,
  Query(params): Query<IndexParams>,
) -> Result<Html<String>, Error>
where
  S: RecordStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  R: ChartRenderer + 'static,
{
  let records = state.store.load_all().await.map_err(store_error)?;
  let notice = params
    .added
    .and_then(|id| records.iter().find(|r| r.id.get() == id))
    .map(|r| format!("Added {} to the family tree.", r.name));

  Ok(Html(pages::tree(&state.config, &records, notice.as_deref())))
}
