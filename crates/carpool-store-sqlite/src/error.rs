//! Error type for `carpool-store-sqlite`.

use carpool_core::id::{CarpoolId, PersonId, RideRequestId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] carpool_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("person not found: {0}")]
  PersonNotFound(PersonId),

  #[error("carpool not found: {0}")]
  CarpoolNotFound(CarpoolId),

  #[error("ride request not found: {0}")]
  RideRequestNotFound(RideRequestId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
