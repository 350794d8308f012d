//! Person records, the only entity in a family tree.
//!
//! A record is appended once and never mutated. Relationships are held as raw
//! textual references ([`PersonRef`]) exactly as they were entered, and are
//! coerced to a [`PersonId`] only when the graph is built.

use std::{fmt, ops::RangeInclusive, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

// ─── Birth years ─────────────────────────────────────────────────────────────

/// Accepted birth years (Solar Hijri).
pub const DEFAULT_BIRTH_YEARS: RangeInclusive<i32> = 1200..=1405;

/// Pre-selected birth year on the ingestion form.
pub const DEFAULT_BIRTH_YEAR: i32 = 1370;

// ─── Identity ────────────────────────────────────────────────────────────────

/// The store-assigned identity of a person. Always `>= 1`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct PersonId(pub u64);

impl PersonId {
  pub fn get(self) -> u64 { self.0 }
}

impl fmt::Display for PersonId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A parent or spouse reference as entered and stored.
///
/// The text is kept verbatim; it may be empty, integer-like (`"3"`) or carry
/// a fractional zero left over from a numeric round trip (`"3.0"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonRef(String);

impl PersonRef {
  pub fn new(raw: impl Into<String>) -> Self { Self(raw.into()) }

  /// The empty reference.
  pub fn none() -> Self { Self::default() }

  /// Build a reference from a picker choice: either a bare id or a full
  /// picker label (`"{id}-{name}"`, see [`PersonRecord::picker_label`]).
  pub fn from_picker(choice: &str) -> Self {
    let id = choice.split_once('-').map_or(choice, |(id, _)| id);
    Self(id.trim().to_owned())
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn is_empty(&self) -> bool { self.0.trim().is_empty() }

  /// Coerce the stored text to an id.
  ///
  /// Accepts ASCII digits optionally followed by `.` and zero digits only,
  /// ignoring surrounding whitespace. Returns `None` for anything else,
  /// including zero.
  pub fn id(&self) -> Option<PersonId> {
    let raw = self.0.trim();
    let (whole, fraction) = match raw.split_once('.') {
      Some((whole, fraction)) => (whole, fraction),
      None => (raw, ""),
    };
    if whole.is_empty()
      || !whole.bytes().all(|b| b.is_ascii_digit())
      || !fraction.bytes().all(|b| b == b'0')
    {
      return None;
    }
    whole.parse::<u64>().ok().filter(|&n| n > 0).map(PersonId)
  }
}

impl From<PersonId> for PersonRef {
  fn from(id: PersonId) -> Self { Self(id.to_string()) }
}

impl From<&str> for PersonRef {
  fn from(raw: &str) -> Self { Self::new(raw) }
}

impl From<Option<PersonId>> for PersonRef {
  fn from(id: Option<PersonId>) -> Self { id.map(Self::from).unwrap_or_default() }
}

// ─── Gender ──────────────────────────────────────────────────────────────────

/// Used only to pick a node color.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
}

impl Gender {
  /// Parse the stored discriminant, mapping failure to a core error.
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownGender(s.to_owned()))
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Input for [`RecordStore::append`](crate::store::RecordStore::append).
///
/// Everything except the id and creation time, which the store assigns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPerson {
  pub name:       String,
  pub gender:     Gender,
  pub birth_year: i32,
  #[serde(default)]
  pub parent:     PersonRef,
  #[serde(default)]
  pub spouse:     PersonRef,
  #[serde(default)]
  pub bio:        String,
  /// Path to the normalized circular thumbnail, if one was produced.
  #[serde(default)]
  pub photo_path: Option<String>,
}

impl NewPerson {
  pub fn new(name: impl Into<String>, gender: Gender, birth_year: i32) -> Self {
    Self {
      name: name.into(),
      gender,
      birth_year,
      parent: PersonRef::none(),
      spouse: PersonRef::none(),
      bio: String::new(),
      photo_path: None,
    }
  }

  pub fn with_parent(mut self, parent: impl Into<PersonRef>) -> Self {
    self.parent = parent.into();
    self
  }

  pub fn with_spouse(mut self, spouse: impl Into<PersonRef>) -> Self {
    self.spouse = spouse.into();
    self
  }

  /// Reject an empty name or a birth year outside `years`.
  ///
  /// Relationship references are deliberately not checked.
  pub fn validate(&self, years: &RangeInclusive<i32>) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::EmptyName);
    }
    if !years.contains(&self.birth_year) {
      return Err(Error::BirthYearOutOfRange {
        year: self.birth_year,
        min:  *years.start(),
        max:  *years.end(),
      });
    }
    Ok(())
  }
}

/// A persisted person.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRecord {
  pub id:         PersonId,
  pub name:       String,
  pub gender:     Gender,
  pub birth_year: i32,
  pub parent:     PersonRef,
  pub spouse:     PersonRef,
  pub bio:        String,
  pub photo_path: Option<String>,
  pub created_at: DateTime<Utc>,
}

impl PersonRecord {
  /// Assemble a record from an ingestion input and store-assigned fields.
  pub fn from_new(id: PersonId, input: NewPerson, created_at: DateTime<Utc>) -> Self {
    Self {
      id,
      name: input.name,
      gender: input.gender,
      birth_year: input.birth_year,
      parent: input.parent,
      spouse: input.spouse,
      bio: input.bio,
      photo_path: input.photo_path.filter(|p| !p.is_empty()),
      created_at,
    }
  }

  /// The text shown for this record in the parent/spouse pickers.
  pub fn picker_label(&self) -> String { format!("{}-{}", self.id, self.name) }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn id_of(raw: &str) -> Option<u64> { PersonRef::new(raw).id().map(PersonId::get) }

  #[test]
  fn integer_text_resolves() {
    assert_eq!(id_of("3"), Some(3));
    assert_eq!(id_of(" 12 "), Some(12));
  }

  #[test]
  fn fractional_zero_resolves() {
    assert_eq!(id_of("3.0"), Some(3));
    assert_eq!(id_of("3.000"), Some(3));
    assert_eq!(id_of("3."), Some(3));
  }

  #[test]
  fn non_integer_text_is_no_reference() {
    for raw in ["", "   ", "abc", "3.5", "nan", "-1", "0", "0.0", ".0", "1e3", "3-Ali"] {
      assert_eq!(id_of(raw), None, "{raw:?}");
    }
  }

  #[test]
  fn picker_choices_become_references() {
    assert_eq!(PersonRef::from_picker("3-Ali Mohammadi").as_str(), "3");
    assert_eq!(PersonRef::from_picker("12").id(), Some(PersonId(12)));
    assert!(PersonRef::from_picker("").is_empty());
  }

  #[test]
  fn ref_from_id_round_trips() {
    let r = PersonRef::from(PersonId(7));
    assert_eq!(r.as_str(), "7");
    assert_eq!(r.id(), Some(PersonId(7)));
    assert!(PersonRef::from(None::<PersonId>).is_empty());
  }

  #[test]
  fn gender_uses_lowercase_discriminants() {
    assert_eq!(Gender::Female.as_ref(), "female");
    assert_eq!(Gender::parse("male").unwrap(), Gender::Male);
    assert!(matches!(Gender::parse("other"), Err(Error::UnknownGender(_))));
  }

  #[test]
  fn validate_rejects_blank_name() {
    let p = NewPerson::new("  ", Gender::Male, DEFAULT_BIRTH_YEAR);
    assert!(matches!(p.validate(&DEFAULT_BIRTH_YEARS), Err(Error::EmptyName)));
  }

  #[test]
  fn validate_bounds_birth_year() {
    let years = DEFAULT_BIRTH_YEARS;
    assert!(NewPerson::new("A", Gender::Male, 1200).validate(&years).is_ok());
    assert!(NewPerson::new("A", Gender::Male, 1405).validate(&years).is_ok());
    assert!(matches!(
      NewPerson::new("A", Gender::Male, 1406).validate(&years),
      Err(Error::BirthYearOutOfRange { year: 1406, .. })
    ));
  }

  #[test]
  fn new_person_json_defaults_references() {
    let p: NewPerson = serde_json::from_str(
      r#"{"name":"Sara","gender":"female","birth_year":1360,"spouse":"2.0"}"#,
    )
    .unwrap();
    assert!(p.parent.is_empty());
    assert_eq!(p.spouse.id(), Some(PersonId(2)));
    assert_eq!(p.photo_path, None);
  }

  #[test]
  fn picker_label_joins_id_and_name() {
    let rec = PersonRecord::from_new(
      PersonId(4),
      NewPerson::new("Reza", Gender::Male, 1350),
      Utc::now(),
    );
    assert_eq!(rec.picker_label(), "4-Reza");
  }
}
