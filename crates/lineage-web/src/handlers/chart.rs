//! `GET /chart.png`, `/chart.svg` and `/chart.dot`.
//!
//! Responses carry an `ETag` derived from the DOT source. A matching
//! `If-None-Match` answers 304 before the renderer is started.

use axum::{
  extract::State,
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use lineage_chart::{ChartFormat, ChartRenderer, LabelMode, chart_etag, render_chart, render_dot};
use lineage_core::{graph::FamilyGraph, store::RecordStore};

use crate::{AppState, auth::Authenticated, error::Error, handlers::store_error};

pub async fn png<S, R>(
  State(state): State<AppState<S, R>>,
  _session: Authenticated,
  headers: HeaderMap,
) -> Result<Response, Error>
where
  S: RecordStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  R: ChartRenderer + 'static,
{
  serve(&state, &headers, ChartFormat::Png).await
}

pub async fn svg<S, R>(
  State(state): State<AppState<S, R>>,
  _session: Authenticated,
  headers: HeaderMap,
) -> Result<Response, Error>
where
  S: RecordStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  R: ChartRenderer + 'static,
{
  serve(&state, &headers, ChartFormat::Svg).await
}

pub async fn dot<S, R>(
  State(state): State<AppState<S, R>>,
  _session: Authenticated,
  headers: HeaderMap,
) -> Result<Response, Error>
where
  S: RecordStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  R: ChartRenderer + 'static,
{
  serve(&state, &headers, ChartFormat::Dot).await
}

async fn serve<S, R>(
  state: &AppState<S, R>,
  headers: &HeaderMap,
  format: ChartFormat,
) -> Result<Response, Error>
where
  S: RecordStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  R: ChartRenderer + 'static,
{
  let records = state.store.load_all().await.map_err(store_error)?;
  if records.is_empty() {
    return Err(Error::NotFound);
  }
  let graph = FamilyGraph::build(&records, &*state.photos);

  // Either label flavour may be what the client saw last time.
  let current = [LabelMode::Html, LabelMode::Plain]
    .map(|mode| chart_etag(&render_dot(&graph, mode), format));
  if let Some(etag) = cached_etag(headers, &current) {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag.to_owned())]).into_response());
  }

  let chart = render_chart(&*state.renderer, &graph, format).await?;
  Ok(
    (
      [
        (header::CONTENT_TYPE, chart.format.content_type().to_owned()),
        (header::ETAG, chart.etag),
        (header::CACHE_CONTROL, "no-cache".to_owned()),
      ],
      chart.bytes,
    )
      .into_response(),
  )
}

/// The entry of `current` named by the request's `If-None-Match`, if any.
fn cached_etag<'a>(headers: &HeaderMap, current: &'a [String]) -> Option<&'a str> {
  let wanted = headers.get(header::IF_NONE_MATCH)?.to_str().ok()?;
  wanted
    .split(',')
    .map(|tag| tag.trim())
    .map(|tag| tag.strip_prefix("W/").unwrap_or(tag))
    .find_map(|tag| {
      if tag == "*" {
        current.first()
      } else {
        current.iter().find(|etag| *etag == tag)
      }
    })
    .map(String::as_str)
}
