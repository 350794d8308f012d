//! The `RecordStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `lineage-store-sqlite`).
//! Higher layers (`lineage-api`, `lineage-web`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use crate::person::{NewPerson, PersonId, PersonRecord};

/// Abstraction over a Lineage record store backend.
///
/// Records are append-only: there is no update or delete. Identity is
/// assigned by the store as `count + 1` at append time, so ids are dense and
/// follow insertion order.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Every record, ordered by id. Empty for a fresh store.
  fn load_all(
    &self,
  ) -> impl Future<Output = Result<Vec<PersonRecord>, Self::Error>> + Send + '_;

  /// Persist `input` under `id = count + 1` and return the stored record.
  ///
  /// The input is stored as given; callers validate it first.
  fn append(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<PersonRecord, Self::Error>> + Send + '_;

  /// Retrieve a record by id. Returns `None` if not found.
  fn get(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<PersonRecord>, Self::Error>> + Send + '_;

  /// Number of stored records.
  fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// The id the next [`append`](Self::append) will assign.
  ///
  /// Only meaningful while the caller is the sole writer.
  fn next_id(
    &self,
  ) -> impl Future<Output = Result<PersonId, Self::Error>> + Send + '_ {
    async move { Ok(PersonId(self.count().await? + 1)) }
  }
}
