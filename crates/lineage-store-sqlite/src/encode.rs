//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, genders as their lowercase
//! discriminant, and references as the text they were entered with.

use chrono::{DateTime, Utc};
use lineage_core::person::{Gender, PersonId, PersonRecord, PersonRef};

use crate::{Error, Result};

// ─── PersonId ────────────────────────────────────────────────────────────────

pub fn encode_id(id: PersonId) -> i64 { id.get() as i64 }

pub fn decode_id(raw: i64) -> Result<PersonId> {
  u64::try_from(raw)
    .ok()
    .filter(|&n| n > 0)
    .map(PersonId)
    .ok_or(Error::InvalidId(raw))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Gender ──────────────────────────────────────────────────────────────────

pub fn encode_gender(g: Gender) -> &'static str { g.into() }

pub fn decode_gender(s: &str) -> Result<Gender> { Ok(Gender::parse(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `people` row.
pub struct RawPerson {
  pub id:         i64,
  pub name:       String,
  pub gender:     String,
  pub birth_year: i32,
  pub parent_ref: String,
  pub spouse_ref: String,
  pub bio:        String,
  pub photo_path: Option<String>,
  pub created_at: String,
}

/// Column list matching [`RawPerson::from_row`].
pub const PERSON_COLUMNS: &str =
  "id, name, gender, birth_year, parent_ref, spouse_ref, bio, photo_path, created_at";

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      gender:     row.get(2)?,
      birth_year: row.get(3)?,
      parent_ref: row.get(4)?,
      spouse_ref: row.get(5)?,
      bio:        row.get(6)?,
      photo_path: row.get(7)?,
      created_at: row.get(8)?,
    })
  }

  pub fn into_record(self) -> Result<PersonRecord> {
    Ok(PersonRecord {
      id:         decode_id(self.id)?,
      name:       self.name,
      gender:     decode_gender(&self.gender)?,
      birth_year: self.birth_year,
      parent:     PersonRef::new(self.parent_ref),
      spouse:     PersonRef::new(self.spouse_ref),
      bio:        self.bio,
      photo_path: self.photo_path.filter(|p| !p.is_empty()),
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
