//! [`SqliteStore`] — the SQLite implementation of [`CarpoolStore`].

use std::{collections::HashSet, path::Path};

use carpool_core::{
  carpool::{Carpool, NewCarpool},
  id::{CarpoolId, PersonId, RideRequestId},
  identity::Identity,
  person::{NewPerson, Person},
  ride_request::{NewRideRequest, RideRequest, RideRequestStatus},
  role::Role,
  store::CarpoolStore,
};
use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    PERSON_COLUMNS, RIDE_REQUEST_COLUMNS, RawCarpool, RawPerson, RawRideRequest,
    RawRole, encode_dt, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A carpool store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
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

// ─── Connection-thread helpers ───────────────────────────────────────────────
//
// These run inside `Connection::call` closures, on the database thread.

fn row_exists(
  conn: &rusqlite::Connection,
  sql: &str,
  id: i64,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(sql, rusqlite::params![id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

fn person_exists(conn: &rusqlite::Connection, id: PersonId) -> rusqlite::Result<bool> {
  row_exists(conn, "SELECT 1 FROM people WHERE person_id = ?1", id.0)
}

fn carpool_exists(conn: &rusqlite::Connection, id: CarpoolId) -> rusqlite::Result<bool> {
  row_exists(conn, "SELECT 1 FROM carpools WHERE carpool_id = ?1", id.0)
}

fn load_roles(
  conn: &rusqlite::Connection,
  person_id: i64,
) -> rusqlite::Result<Vec<RawRole>> {
  let mut stmt = conn.prepare_cached(
    "SELECT r.role_id, r.name
     FROM roles r
     JOIN person_roles pr ON pr.role_id = r.role_id
     WHERE pr.person_id = ?1
     ORDER BY r.name",
  )?;
  let rows = stmt
    .query_map(rusqlite::params![person_id], |row| {
      Ok(RawRole { role_id: row.get(0)?, name: row.get(1)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

/// Run a query selecting [`PERSON_COLUMNS`] and return the rows without roles.
fn query_people(
  conn: &rusqlite::Connection,
  sql: &str,
  params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<RawPerson>> {
  let mut stmt = conn.prepare(sql)?;
  let rows = stmt
    .query_map(params, RawPerson::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn attach_roles(
  conn: &rusqlite::Connection,
  people: &mut [RawPerson],
) -> rusqlite::Result<()> {
  for person in people {
    person.roles = load_roles(conn, person.person_id)?;
  }
  Ok(())
}

fn select_carpool(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<RawCarpool>> {
  conn
    .query_row(
      "SELECT carpool_id, driver_id, created_at FROM carpools WHERE carpool_id = ?1",
      rusqlite::params![id],
      |row| {
        Ok(RawCarpool {
          carpool_id: row.get(0)?,
          driver_id:  row.get(1)?,
          created_at: row.get(2)?,
        })
      },
    )
    .optional()
}

fn select_ride_request(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<RawRideRequest>> {
  conn
    .query_row(
      &format!(
        "SELECT {RIDE_REQUEST_COLUMNS} FROM ride_requests WHERE ride_request_id = ?1"
      ),
      rusqlite::params![id],
      RawRideRequest::from_row,
    )
    .optional()
}

/// `?first, ?first+1, …` — one numbered placeholder per status.
fn placeholders(first: usize, count: usize) -> String {
  (first..first + count)
    .map(|i| format!("?{i}"))
    .collect::<Vec<_>>()
    .join(", ")
}

fn status_values(statuses: &[RideRequestStatus]) -> Vec<Value> {
  statuses
    .iter()
    .map(|s| Value::Text(encode_status(*s).to_owned()))
    .collect()
}

// ─── CarpoolStore impl ───────────────────────────────────────────────────────

impl CarpoolStore for SqliteStore {
  type Error = Error;

  // ── People ────────────────────────────────────────────────────────────────

  async fn add_person(&self, input: NewPerson) -> Result<Person> {
    let uuid       = Uuid::new_v4();
    let created_at = Utc::now();

    let NewPerson { social_id, email, gender, gender_self_describe } = input;

    let uuid_str = encode_uuid(uuid);
    let at_str   = encode_dt(created_at);

    let person_id: i64 = self
      .conn
      .call({
        let social_id            = social_id.clone();
        let email                = email.clone();
        let gender               = gender.clone();
        let gender_self_describe = gender_self_describe.clone();
        move |conn| {
          conn.execute(
            "INSERT INTO people (
               uuid, social_id, email, gender, gender_self_describe, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
              uuid_str,
              social_id,
              email,
              gender,
              gender_self_describe,
              at_str,
            ],
          )?;
          Ok(conn.last_insert_rowid())
        }
      })
      .await?;

    tracing::debug!(person_id, %uuid, "added person");

    Ok(Person {
      person_id: PersonId(person_id),
      uuid,
      social_id,
      email,
      gender,
      gender_self_describe,
      created_at,
      roles: Vec::new(),
    })
  }

  async fn get_person(&self, id: PersonId) -> Result<Option<Person>> {
    let mut raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut people = query_people(
          conn,
          &format!("SELECT {PERSON_COLUMNS} FROM people p WHERE p.person_id = ?1"),
          rusqlite::params![id.0],
        )?;
        attach_roles(conn, &mut people)?;
        Ok(people)
      })
      .await?;

    raws.pop().map(RawPerson::into_person).transpose()
  }

  async fn get_person_by_uuid(&self, uuid: Uuid) -> Result<Option<Person>> {
    let uuid_str = encode_uuid(uuid);

    let mut raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut people = query_people(
          conn,
          &format!("SELECT {PERSON_COLUMNS} FROM people p WHERE p.uuid = ?1"),
          rusqlite::params![uuid_str],
        )?;
        attach_roles(conn, &mut people)?;
        Ok(people)
      })
      .await?;

    raws.pop().map(RawPerson::into_person).transpose()
  }

  async fn list_people(&self) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(|conn| {
        let mut people = query_people(
          conn,
          &format!("SELECT {PERSON_COLUMNS} FROM people p ORDER BY p.person_id"),
          rusqlite::params![],
        )?;
        attach_roles(conn, &mut people)?;
        Ok(people)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  // ── Roles ─────────────────────────────────────────────────────────────────

  async fn grant_role(&self, person_id: PersonId, name: &str) -> Result<Role> {
    let name = name.to_owned();

    let raw: Result<RawRole> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !person_exists(&tx, person_id)? {
          return Ok(Err(Error::PersonNotFound(person_id)));
        }

        tx.execute(
          "INSERT OR IGNORE INTO roles (name) VALUES (?1)",
          rusqlite::params![name],
        )?;
        let role_id: i64 = tx.query_row(
          "SELECT role_id FROM roles WHERE name = ?1",
          rusqlite::params![name],
          |row| row.get(0),
        )?;
        tx.execute(
          "INSERT OR IGNORE INTO person_roles (person_id, role_id) VALUES (?1, ?2)",
          rusqlite::params![person_id.0, role_id],
        )?;
        tx.commit()?;

        Ok(Ok(RawRole { role_id, name }))
      })
      .await?;

    let role = raw?.into_role();
    tracing::debug!(%person_id, role = %role.name, "granted role");
    Ok(role)
  }

  async fn revoke_role(&self, person_id: PersonId, name: &str) -> Result<bool> {
    let name = name.to_owned();

    let removed: Result<bool> = self
      .conn
      .call(move |conn| {
        if !person_exists(conn, person_id)? {
          return Ok(Err(Error::PersonNotFound(person_id)));
        }
        let changed = conn.execute(
          "DELETE FROM person_roles
           WHERE person_id = ?1
             AND role_id IN (SELECT role_id FROM roles WHERE name = ?2)",
          rusqlite::params![person_id.0, name],
        )?;
        Ok(Ok(changed > 0))
      })
      .await?;

    removed
  }

  async fn get_roles(&self, person_id: PersonId) -> Result<Vec<Role>> {
    let raws: Vec<RawRole> = self
      .conn
      .call(move |conn| Ok(load_roles(conn, person_id.0)?))
      .await?;

    Ok(raws.into_iter().map(RawRole::into_role).collect())
  }

  // ── Session ───────────────────────────────────────────────────────────────

  async fn identify(&self, session_id: Option<Uuid>) -> Result<Identity> {
    let Some(uuid) = session_id else {
      return Ok(Identity::Anonymous);
    };
    let uuid_str = encode_uuid(uuid);

    let person_id: Option<i64> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT person_id FROM people WHERE uuid = ?1",
              rusqlite::params![uuid_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    let identity = person_id
      .map(|id| Identity::Person { person_id: PersonId(id) })
      .unwrap_or_default();
    if !identity.is_authenticated() {
      tracing::debug!(%uuid, "session id matches nobody; treating as anonymous");
    }

    Ok(identity)
  }

  // ── Carpools ──────────────────────────────────────────────────────────────

  async fn add_carpool(&self, input: NewCarpool) -> Result<Carpool> {
    let created_at = Utc::now();
    let at_str     = encode_dt(created_at);
    let driver_id  = input.driver_id;

    let carpool_id: Result<i64> = self
      .conn
      .call(move |conn| {
        if let Some(driver) = driver_id
          && !person_exists(conn, driver)?
        {
          return Ok(Err(Error::PersonNotFound(driver)));
        }
        conn.execute(
          "INSERT INTO carpools (driver_id, created_at) VALUES (?1, ?2)",
          rusqlite::params![driver_id.map(|d| d.0), at_str],
        )?;
        Ok(Ok(conn.last_insert_rowid()))
      })
      .await?;

    let carpool = Carpool {
      carpool_id: CarpoolId(carpool_id?),
      driver_id,
      created_at,
    };
    tracing::debug!(carpool_id = %carpool.carpool_id, "added carpool");
    Ok(carpool)
  }

  async fn get_carpool(&self, id: CarpoolId) -> Result<Option<Carpool>> {
    let raw: Option<RawCarpool> = self
      .conn
      .call(move |conn| Ok(select_carpool(conn, id.0)?))
      .await?;

    raw.map(RawCarpool::into_carpool).transpose()
  }

  async fn set_driver(
    &self,
    carpool_id: CarpoolId,
    driver_id:  Option<PersonId>,
  ) -> Result<Carpool> {
    let raw: Result<RawCarpool> = self
      .conn
      .call(move |conn| {
        if let Some(driver) = driver_id
          && !person_exists(conn, driver)?
        {
          return Ok(Err(Error::PersonNotFound(driver)));
        }
        conn.execute(
          "UPDATE carpools SET driver_id = ?2 WHERE carpool_id = ?1",
          rusqlite::params![carpool_id.0, driver_id.map(|d| d.0)],
        )?;
        Ok(
          select_carpool(conn, carpool_id.0)?
            .ok_or(Error::CarpoolNotFound(carpool_id)),
        )
      })
      .await?;

    raw?.into_carpool()
  }

  // ── Ride requests ─────────────────────────────────────────────────────────

  async fn add_ride_request(&self, input: NewRideRequest) -> Result<RideRequest> {
    let created_at = Utc::now();
    let at_str     = encode_dt(created_at);
    let status_str = encode_status(input.status);
    let (person_id, carpool_id) = (input.person_id, input.carpool_id);

    let ride_request_id: Result<i64> = self
      .conn
      .call(move |conn| {
        if !person_exists(conn, person_id)? {
          return Ok(Err(Error::PersonNotFound(person_id)));
        }
        if !carpool_exists(conn, carpool_id)? {
          return Ok(Err(Error::CarpoolNotFound(carpool_id)));
        }
        conn.execute(
          "INSERT INTO ride_requests (person_id, carpool_id, status, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![person_id.0, carpool_id.0, status_str, at_str],
        )?;
        Ok(Ok(conn.last_insert_rowid()))
      })
      .await?;

    let ride_request = RideRequest {
      ride_request_id: RideRequestId(ride_request_id?),
      person_id,
      carpool_id,
      status: input.status,
      created_at,
    };
    tracing::debug!(
      ride_request_id = %ride_request.ride_request_id,
      %person_id,
      %carpool_id,
      status = %ride_request.status,
      "added ride request"
    );
    Ok(ride_request)
  }

  async fn set_ride_request_status(
    &self,
    id:     RideRequestId,
    status: RideRequestStatus,
  ) -> Result<RideRequest> {
    let status_str = encode_status(status);

    let raw: Result<RawRideRequest> = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE ride_requests SET status = ?2 WHERE ride_request_id = ?1",
          rusqlite::params![id.0, status_str],
        )?;
        Ok(
          select_ride_request(conn, id.0)?
            .ok_or(Error::RideRequestNotFound(id)),
        )
      })
      .await?;

    let ride_request = raw?.into_ride_request()?;
    tracing::debug!(ride_request_id = %id, %status, "updated ride request status");
    Ok(ride_request)
  }

  async fn get_ride_requests(
    &self,
    carpool_id: CarpoolId,
    statuses:   Option<&[RideRequestStatus]>,
  ) -> Result<Vec<RideRequest>> {
    if statuses.is_some_and(<[_]>::is_empty) {
      return Ok(Vec::new());
    }

    let mut sql = format!(
      "SELECT {RIDE_REQUEST_COLUMNS} FROM ride_requests WHERE carpool_id = ?1"
    );
    let mut params = vec![Value::Integer(carpool_id.0)];
    if let Some(statuses) = statuses {
      sql.push_str(&format!(
        " AND status IN ({})",
        placeholders(2, statuses.len())
      ));
      params.extend(status_values(statuses));
    }
    sql.push_str(" ORDER BY ride_request_id");

    let raws: Vec<RawRideRequest> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawRideRequest::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRideRequest::into_ride_request).collect()
  }

  async fn get_riders(
    &self,
    carpool_id: CarpoolId,
    statuses:   &[RideRequestStatus],
  ) -> Result<Vec<Person>> {
    if statuses.is_empty() {
      return Ok(Vec::new());
    }

    let sql = format!(
      "SELECT {PERSON_COLUMNS}
       FROM ride_requests r
       JOIN people p ON p.person_id = r.person_id
       WHERE r.carpool_id = ?1
         AND r.status IN ({})
       ORDER BY r.ride_request_id",
      placeholders(2, statuses.len())
    );
    let mut params = vec![Value::Integer(carpool_id.0)];
    params.extend(status_values(statuses));

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut people =
          query_people(conn, &sql, rusqlite::params_from_iter(params))?;

        // A person with several matching requests keeps their first slot.
        let mut seen = HashSet::new();
        people.retain(|p| seen.insert(p.person_id));

        attach_roles(conn, &mut people)?;
        Ok(people)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn get_current_user_ride_request(
    &self,
    carpool_id: CarpoolId,
    identity:   Identity,
  ) -> Result<Option<RideRequest>> {
    let Some(person_id) = identity.person_id() else {
      return Ok(None);
    };

    let raw: Option<RawRideRequest> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {RIDE_REQUEST_COLUMNS}
                 FROM ride_requests
                 WHERE carpool_id = ?1 AND person_id = ?2
                 ORDER BY ride_request_id
                 LIMIT 1"
              ),
              rusqlite::params![carpool_id.0, person_id.0],
              RawRideRequest::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRideRequest::into_ride_request).transpose()
  }
}
