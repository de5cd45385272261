//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings and statuses as their lowercase names. Row ids are plain integers.

use carpool_core::{
  carpool::Carpool,
  id::{CarpoolId, PersonId, RideRequestId, RoleId},
  person::Person,
  ride_request::{RideRequest, RideRequestStatus},
  role::Role,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── RideRequestStatus ────────────────────────────────────────────────────────

pub fn encode_status(s: RideRequestStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<RideRequestStatus> { Ok(s.parse()?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawPerson::from_row`]; `p` is the `people` alias.
pub const PERSON_COLUMNS: &str = "p.person_id, p.uuid, p.social_id, p.email, \
                                  p.gender, p.gender_self_describe, p.created_at";

/// Raw values read from a `people` row, plus the person's roles.
pub struct RawPerson {
  pub person_id:            i64,
  pub uuid:                 String,
  pub social_id:            String,
  pub email:                String,
  pub gender:               Option<String>,
  pub gender_self_describe: Option<String>,
  pub created_at:           String,
  pub roles:                Vec<RawRole>,
}

impl RawPerson {
  /// Read the [`PERSON_COLUMNS`] of `row`. Roles are loaded separately.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:            row.get(0)?,
      uuid:                 row.get(1)?,
      social_id:            row.get(2)?,
      email:                row.get(3)?,
      gender:               row.get(4)?,
      gender_self_describe: row.get(5)?,
      created_at:           row.get(6)?,
      roles:                Vec::new(),
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:            PersonId(self.person_id),
      uuid:                 decode_uuid(&self.uuid)?,
      social_id:            self.social_id,
      email:                self.email,
      gender:               self.gender,
      gender_self_describe: self.gender_self_describe,
      created_at:           decode_dt(&self.created_at)?,
      roles:                self.roles.into_iter().map(RawRole::into_role).collect(),
    })
  }
}

/// Raw values read from a `roles` row.
pub struct RawRole {
  pub role_id: i64,
  pub name:    String,
}

impl RawRole {
  pub fn into_role(self) -> Role {
    Role { role_id: RoleId(self.role_id), name: self.name }
  }
}

/// Raw values read from a `carpools` row.
pub struct RawCarpool {
  pub carpool_id: i64,
  pub driver_id:  Option<i64>,
  pub created_at: String,
}

impl RawCarpool {
  pub fn into_carpool(self) -> Result<Carpool> {
    Ok(Carpool {
      carpool_id: CarpoolId(self.carpool_id),
      driver_id:  self.driver_id.map(PersonId),
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawRideRequest::from_row`].
pub const RIDE_REQUEST_COLUMNS: &str =
  "ride_request_id, person_id, carpool_id, status, created_at";

/// Raw values read from a `ride_requests` row.
pub struct RawRideRequest {
  pub ride_request_id: i64,
  pub person_id:       i64,
  pub carpool_id:      i64,
  pub status:          String,
  pub created_at:      String,
}

impl RawRideRequest {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      ride_request_id: row.get(0)?,
      person_id:       row.get(1)?,
      carpool_id:      row.get(2)?,
      status:          row.get(3)?,
      created_at:      row.get(4)?,
    })
  }

  pub fn into_ride_request(self) -> Result<RideRequest> {
    Ok(RideRequest {
      ride_request_id: RideRequestId(self.ride_request_id),
      person_id:       PersonId(self.person_id),
      carpool_id:      CarpoolId(self.carpool_id),
      status:          decode_status(&self.status)?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dt_survives_column_text() {
    let now = Utc::now();
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
  }

  #[test]
  fn bad_dt_is_date_parse_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }

  #[test]
  fn unknown_status_is_core_error() {
    assert!(matches!(
      decode_status("pending"),
      Err(Error::Core(carpool_core::Error::UnknownStatus(_)))
    ));
  }
}
