//! Handlers for `/people` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/people` | All records, ordered by id |
//! | `POST` | `/people` | Body: [`NewPerson`] JSON; returns 201 + stored record |
//! | `GET`  | `/people/:id` | 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use lineage_core::{
  person::{NewPerson, PersonId, PersonRecord},
  store::RecordStore,
};

use crate::{ApiState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /people`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<PersonRecord>>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let people = state
    .store
    .load_all()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(people))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /people`, body: `{"name":"...","gender":"female","birth_year":1370}`
///
/// Photos are only accepted through the HTML form, so `photo_path` is
/// ignored here.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(mut body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  body.validate(&state.birth_years)?;
  body.photo_path = None;

  let _guard = state.ingest.lock().await;
  let person = state
    .store
    .append(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(id = %person.id, "person created via api");
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /people/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<u64>,
) -> Result<Json<PersonRecord>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if id == 0 {
    return Err(ApiError::BadRequest("person ids start at 1".into()));
  }
  let id = PersonId(id);
  let person = state
    .store
    .get(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}
