pub mod chart;
pub mod login;
pub mod people;
pub mod tree;

use crate::error::Error;

pub(crate) fn store_error<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(e))
}
