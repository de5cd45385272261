//! SQL schema for the carpool SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS people (
    person_id            INTEGER PRIMARY KEY,
    uuid                 TEXT NOT NULL UNIQUE,
    social_id            TEXT NOT NULL,
    email                TEXT NOT NULL,
    gender               TEXT,
    gender_self_describe TEXT,
    created_at           TEXT NOT NULL     -- RFC 3339 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS roles (
    role_id INTEGER PRIMARY KEY,
    name    TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS person_roles (
    person_id INTEGER NOT NULL REFERENCES people(person_id),
    role_id   INTEGER NOT NULL REFERENCES roles(role_id),
    PRIMARY KEY (person_id, role_id)
);

CREATE TABLE IF NOT EXISTS carpools (
    carpool_id INTEGER PRIMARY KEY,
    driver_id  INTEGER REFERENCES people(person_id),  -- NULL: no driver
    created_at TEXT NOT NULL
);

-- Insertion order (ride_request_id) is the order of a carpool's requests.
CREATE TABLE IF NOT EXISTS ride_requests (
    ride_request_id INTEGER PRIMARY KEY,
    person_id       INTEGER NOT NULL REFERENCES people(person_id),
    carpool_id      INTEGER NOT NULL REFERENCES carpools(carpool_id),
    status          TEXT NOT NULL DEFAULT 'requested'
                    CHECK (status IN ('requested', 'approved', 'rejected')),
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS ride_requests_carpool_idx ON ride_requests(carpool_id);
CREATE INDEX IF NOT EXISTS ride_requests_person_idx  ON ride_requests(person_id);
CREATE INDEX IF NOT EXISTS carpools_driver_idx       ON carpools(driver_id);

PRAGMA user_version = 1;
";
