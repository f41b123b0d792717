//! SQL schema for the LifeCoach SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS Person (
    idPerson  INTEGER PRIMARY KEY AUTOINCREMENT,
    lastname  TEXT NOT NULL,
    name      TEXT NOT NULL,
    username  TEXT NOT NULL DEFAULT '',
    birthdate TEXT NOT NULL,            -- yyyy-MM-dd
    email     TEXT NOT NULL DEFAULT ''
);

-- Measures are owned by exactly one person and go away with it.
CREATE TABLE IF NOT EXISTS Measure (
    idMeasure        INTEGER PRIMARY KEY AUTOINCREMENT,
    idPerson         INTEGER NOT NULL
                     REFERENCES Person(idPerson) ON DELETE CASCADE,
    measureType      TEXT NOT NULL,
    measureValue     TEXT NOT NULL,
    measureValueType TEXT,
    timestamp        TEXT NOT NULL      -- RFC 3339 UTC, millisecond precision
);

CREATE INDEX IF NOT EXISTS measure_person_type_idx
    ON Measure(idPerson, measureType, timestamp);

PRAGMA user_version = 1;
";
