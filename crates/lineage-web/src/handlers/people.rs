//! `POST /people`: the ingestion form.
//!
//! Multipart fields: `name`, `gender`, `birth_year`, `parent`, `spouse`,
//! `bio` and an optional `photo` file. Parent and spouse arrive as picker
//! choices (`"{id}-{name}"`) or bare ids and are stored as the id text.

use std::sync::Arc;

use axum::{
  extract::{Multipart, State},
  response::{IntoResponse, Redirect, Response},
};
use bytes::Bytes;
use lineage_chart::ChartRenderer;
use lineage_core::{
  person::{Gender, NewPerson, PersonRef},
  store::RecordStore,
};

use crate::{AppState, auth::Authenticated, error::Error, handlers::store_error};

/// The raw form submission.
#[derive(Debug, Default)]
pub struct PersonForm {
  pub name:       String,
  pub gender:     String,
  pub birth_year: String,
  pub parent:     String,
  pub spouse:     String,
  pub bio:        String,
  pub photo:      Option<Bytes>,
}

impl PersonForm {
  pub async fn read(mut multipart: Multipart) -> Result<Self, Error> {
    let mut form = Self::default();
    while let Some(field) = multipart.next_field().await? {
      let Some(name) = field.name().map(str::to_owned) else { continue };
      match name.as_str() {
        "name" => form.name = field.text().await?,
        "gender" => form.gender = field.text().await?,
        "birth_year" => form.birth_year = field.text().await?,
        "parent" => form.parent = field.text().await?,
        "spouse" => form.spouse = field.text().await?,
        "bio" => form.bio = field.text().await?,
        "photo" => {
          let bytes = field.bytes().await?;
          form.photo = (!bytes.is_empty()).then_some(bytes);
        }
        _ => {}
      }
    }
    Ok(form)
  }

  /// Turn the submission into an ingestion input.
  ///
  /// An empty birth year falls back to `default_year`.
  pub fn to_new_person(&self, default_year: i32) -> Result<NewPerson, Error> {
    let gender = Gender::parse(self.gender.trim())?;
    let year = self.birth_year.trim();
    let birth_year = if year.is_empty() {
      default_year
    } else {
      year
        .parse()
        .map_err(|_| Error::BadRequest(format!("birth year {year:?} is not a number")))?
    };

    let mut input = NewPerson::new(self.name.trim(), gender, birth_year)
      .with_parent(PersonRef::from_picker(&self.parent))
      .with_spouse(PersonRef::from_picker(&self.spouse));
    input.bio = self.bio.clone();
    Ok(input)
  }
}

/// `POST /people`
///
/// A blank name is ignored rather than rejected: the browser is sent back to
/// the tree and nothing is written.
pub async fn create<S, R>(
  State(state): State<AppState<S, R>>,
  _session: Authenticated,
  multipart: Multipart,
) -> Result<Response, Error>
where
  S: RecordStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  R: ChartRenderer + 'static,
{
  let form = PersonForm::read(multipart).await?;
  if form.name.trim().is_empty() {
    return Ok(Redirect::to("/").into_response());
  }

  let mut input = form.to_new_person(state.config.initial_birth_year())?;
  input.validate(&state.config.birth_years())?;

  // The photo is named after the id the record is about to receive, so the
  // whole sequence runs under the ingest lock.
  let _guard = state.ingest.lock().await;
  let id = state.store.next_id().await.map_err(store_error)?;

  if let Some(bytes) = form.photo {
    let photos = Arc::clone(&state.photos);
    let thumb = tokio::task::spawn_blocking(move || photos.ingest(id, &bytes)).await?;
    input.photo_path = thumb.map(|p| p.to_string_lossy().into_owned());
  }

  let person = state.store.append(input).await.map_err(store_error)?;
  if person.id != id {
    tracing::warn!(expected = %id, assigned = %person.id, "photo was stored under a different id");
  }

  tracing::info!(id = %person.id, name = %person.name, "person added");
  Ok(Redirect::to(&format!("/?added={}", person.id)).into_response())
}
