//! RideRequest — a person's request to join a carpool.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error,
  id::{CarpoolId, PersonId, RideRequestId},
};

/// Approval state of a [`RideRequest`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RideRequestStatus {
  #[default]
  Requested,
  Approved,
  Rejected,
}

impl RideRequestStatus {
  /// Statuses that count as riding in the carpool.
  pub const RIDING: &'static [Self] = &[Self::Approved];

  /// Statuses that count as riding or hoping to ride.
  pub const RIDING_OR_PENDING: &'static [Self] =
    &[Self::Requested, Self::Approved];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Requested => "requested",
      Self::Approved => "approved",
      Self::Rejected => "rejected",
    }
  }
}

impl fmt::Display for RideRequestStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for RideRequestStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "requested" => Ok(Self::Requested),
      "approved" => Ok(Self::Approved),
      "rejected" => Ok(Self::Rejected),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}

/// A persisted ride request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideRequest {
  pub ride_request_id: RideRequestId,
  pub person_id:       PersonId,
  pub carpool_id:      CarpoolId,
  pub status:          RideRequestStatus,
  pub created_at:      DateTime<Utc>,
}

/// Input for
/// [`CarpoolStore::add_ride_request`](crate::store::CarpoolStore::add_ride_request).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRideRequest {
  pub person_id:  PersonId,
  pub carpool_id: CarpoolId,
  #[serde(default)]
  pub status:     RideRequestStatus,
}

impl NewRideRequest {
  /// A request in the default `requested` state.
  pub fn new(person_id: PersonId, carpool_id: CarpoolId) -> Self {
    Self { person_id, carpool_id, status: RideRequestStatus::default() }
  }

  pub fn with_status(mut self, status: RideRequestStatus) -> Self {
    self.status = status;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_status_is_requested() {
    let r = NewRideRequest::new(PersonId(1), CarpoolId(1));
    assert_eq!(r.status, RideRequestStatus::Requested);
  }

  #[test]
  fn status_parses_lowercase_names() {
    for status in [
      RideRequestStatus::Requested,
      RideRequestStatus::Approved,
      RideRequestStatus::Rejected,
    ] {
      assert_eq!(status.as_str().parse::<RideRequestStatus>().unwrap(), status);
    }
  }

  #[test]
  fn status_rejects_unknown() {
    let err = "Approved".parse::<RideRequestStatus>().unwrap_err();
    assert!(matches!(err, Error::UnknownStatus(s) if s == "Approved"));
  }

  #[test]
  fn status_serde_matches_column_text() {
    let json = serde_json::to_string(&RideRequestStatus::Approved).unwrap();
    assert_eq!(json, "\"approved\"");
  }
}
