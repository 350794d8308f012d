//! [`SqliteStore`]: the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use lineage_core::{
  person::{NewPerson, PersonId, PersonRecord},
  store::RecordStore,
};

use crate::{
  encode::{PERSON_COLUMNS, RawPerson, decode_id, encode_dt, encode_gender, encode_id},
  schema::SCHEMA,
  Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Lineage record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  async fn load_all(&self) -> Result<Vec<PersonRecord>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {PERSON_COLUMNS} FROM people ORDER BY id"))?;
        let rows = stmt
          .query_map([], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_record).collect()
  }

  async fn append(&self, input: NewPerson) -> Result<PersonRecord> {
    let created_at = Utc::now();

    let name       = input.name.clone();
    let gender     = encode_gender(input.gender);
    let birth_year = input.birth_year;
    let parent_ref = input.parent.as_str().to_owned();
    let spouse_ref = input.spouse.as_str().to_owned();
    let bio        = input.bio.clone();
    let photo_path = input.photo_path.clone().filter(|p| !p.is_empty());
    let at_str     = encode_dt(created_at);

    // Count and insert in one transaction so the id is always count + 1.
    let raw_id: i64 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let count: i64 = tx.query_row("SELECT COUNT(*) FROM people", [], |r| r.get(0))?;
        let id = count + 1;
        tx.execute(
          "INSERT INTO people (
             id, name, gender, birth_year, parent_ref, spouse_ref,
             bio, photo_path, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id,
            name,
            gender,
            birth_year,
            parent_ref,
            spouse_ref,
            bio,
            photo_path,
            at_str,
          ],
        )?;
        tx.commit()?;
        Ok(id)
      })
      .await?;

    let id = decode_id(raw_id)?;
    tracing::debug!(%id, "appended person record");
    Ok(PersonRecord::from_new(id, input, created_at))
  }

  async fn get(&self, id: PersonId) -> Result<Option<PersonRecord>> {
    let raw_id = encode_id(id);

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PERSON_COLUMNS} FROM people WHERE id = ?1"),
            rusqlite::params![raw_id],
            RawPerson::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPerson::into_record).transpose()
  }

  async fn count(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM people", [], |r| r.get(0))?))
      .await?;
    Ok(count.max(0) as u64)
  }
}
