//! [`SqliteStore`], the SQLite implementation of [`PersonStore`].

use std::{collections::HashMap, path::Path};

use lifecoach_core::{
  measure::{Measure, NewMeasure},
  person::{NewPerson, Person},
  store::PersonStore,
};
use rusqlite::{Connection, OptionalExtension as _};

use crate::{
  encode::{
    decode_measures, encode_birthdate, EncodedMeasure, RawMeasure, RawPerson,
    MEASURE_COLUMNS, PERSON_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A LifeCoach person store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Every
/// operation is a single [`tokio_rusqlite::Connection::call`]; write
/// operations open one transaction inside it, which rolls back if dropped
/// on an error path.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> { self.execute_batch(SCHEMA).await }

  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Synchronous query helpers ───────────────────────────────────────────────
//
// These run inside `Connection::call` closures. A `Transaction` derefs to a
// `Connection`, so they work both inside and outside a transaction.

fn select_person(
  conn: &Connection,
  id: i64,
) -> rusqlite::Result<Option<RawPerson>> {
  conn
    .query_row(
      &format!("SELECT {PERSON_COLUMNS} FROM Person WHERE idPerson = ?1"),
      rusqlite::params![id],
      RawPerson::from_row,
    )
    .optional()
}

/// Latest measure per `(person, type)`; the smallest `idMeasure` wins ties.
/// `person_id = None` covers every person.
fn select_latest_measures(
  conn: &Connection,
  person_id: Option<i64>,
) -> rusqlite::Result<Vec<RawMeasure>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {MEASURE_COLUMNS}
     FROM (
       SELECT m.*, ROW_NUMBER() OVER (
         PARTITION BY m.idPerson, m.measureType
         ORDER BY m.timestamp DESC, m.idMeasure ASC
       ) AS rn
       FROM Measure m
       WHERE ?1 IS NULL OR m.idPerson = ?1
     )
     WHERE rn = 1
     ORDER BY idPerson, measureType"
  ))?;
  let rows = stmt
    .query_map(rusqlite::params![person_id], RawMeasure::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn select_measure(
  conn: &Connection,
  measure_id: i64,
) -> rusqlite::Result<Option<RawMeasure>> {
  conn
    .query_row(
      &format!("SELECT {MEASURE_COLUMNS} FROM Measure WHERE idMeasure = ?1"),
      rusqlite::params![measure_id],
      RawMeasure::from_row,
    )
    .optional()
}

fn insert_measure(
  conn: &Connection,
  person_id: i64,
  m: &EncodedMeasure,
) -> rusqlite::Result<i64> {
  conn.execute(
    "INSERT INTO Measure (
       idPerson, measureType, measureValue, measureValueType, timestamp
     ) VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      person_id,
      m.measure_type,
      m.value,
      m.value_type,
      m.timestamp,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

/// Load a person and their current health in one read.
fn load_person(
  conn: &Connection,
  id: i64,
) -> rusqlite::Result<Option<(RawPerson, Vec<RawMeasure>)>> {
  let Some(raw) = select_person(conn, id)? else {
    return Ok(None);
  };
  let health = select_latest_measures(conn, Some(id))?;
  Ok(Some((raw, health)))
}

fn decode_person(raw: RawPerson, health: Vec<RawMeasure>) -> Result<Person> {
  raw.into_person(decode_measures(health)?)
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  type Error = Error;

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn find_by_id(&self, id: i64) -> Result<Option<Person>> {
    let loaded = self
      .conn
      .call(move |conn| Ok(load_person(conn, id)?))
      .await?;

    loaded
      .map(|(raw, health)| decode_person(raw, health))
      .transpose()
  }

  async fn find_all(&self) -> Result<Vec<Person>> {
    let (raws, health) = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PERSON_COLUMNS} FROM Person ORDER BY idPerson"
        ))?;
        let raws = stmt
          .query_map([], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        let health = select_latest_measures(conn, None)?;
        Ok((raws, health))
      })
      .await?;

    let mut by_person: HashMap<i64, Vec<Measure>> = HashMap::new();
    for measure in decode_measures(health)? {
      by_person.entry(measure.person_id).or_default().push(measure);
    }

    raws
      .into_iter()
      .map(|raw| {
        let current = by_person.remove(&raw.id).unwrap_or_default();
        raw.into_person(current)
      })
      .collect()
  }

  async fn save(&self, input: NewPerson) -> Result<Person> {
    let NewPerson { first_name, last_name, username, birthdate, email, measures } =
      input;
    let birthdate = encode_birthdate(birthdate);
    let measures = measures
      .into_iter()
      .map(EncodedMeasure::try_from)
      .collect::<Result<Vec<_>>>()?;

    let (raw, health) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO Person (name, lastname, username, birthdate, email)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![first_name, last_name, username, birthdate, email],
        )?;
        let id = tx.last_insert_rowid();
        for m in &measures {
          insert_measure(&tx, id, m)?;
        }
        tx.commit()?;

        Ok(
          load_person(conn, id)?
            .ok_or(rusqlite::Error::QueryReturnedNoRows)?,
        )
      })
      .await?;

    tracing::debug!(person_id = raw.id, "saved person");
    decode_person(raw, health)
  }

  async fn update(&self, person: Person) -> Result<Person> {
    let Person { id, first_name, last_name, username, birthdate, email, .. } =
      person;
    let birthdate = encode_birthdate(birthdate);

    let updated = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE Person
           SET name = ?2, lastname = ?3, username = ?4, birthdate = ?5, email = ?6
           WHERE idPerson = ?1",
          rusqlite::params![id, first_name, last_name, username, birthdate, email],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        tx.commit()?;
        Ok(load_person(conn, id)?)
      })
      .await?;

    let (raw, health) = updated.ok_or(Error::PersonNotFound(id))?;
    tracing::debug!(person_id = id, "updated person");
    decode_person(raw, health)
  }

  async fn remove(&self, id: i64) -> Result<()> {
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "DELETE FROM Person WHERE idPerson = ?1",
          rusqlite::params![id],
        )?;
        if changed == 0 {
          return Ok(false);
        }
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !removed {
      return Err(Error::PersonNotFound(id));
    }
    tracing::debug!(person_id = id, "removed person");
    Ok(())
  }

  // ── Measures ──────────────────────────────────────────────────────────────

  async fn current_health(&self, person_id: i64) -> Result<Vec<Measure>> {
    let raws = self
      .conn
      .call(move |conn| Ok(select_latest_measures(conn, Some(person_id))?))
      .await?;
    decode_measures(raws)
  }

  async fn history(
    &self,
    person_id: i64,
    measure_type: &str,
  ) -> Result<Vec<Measure>> {
    let measure_type = measure_type.to_owned();

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MEASURE_COLUMNS} FROM Measure
           WHERE idPerson = ?1 AND measureType = ?2
           ORDER BY timestamp ASC, idMeasure ASC"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![person_id, measure_type],
            RawMeasure::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    decode_measures(raws)
  }

  async fn record_measure(
    &self,
    person_id: i64,
    input: NewMeasure,
  ) -> Result<Measure> {
    let encoded = EncodedMeasure::try_from(input)?;

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if select_person(&tx, person_id)?.is_none() {
          return Ok(None);
        }
        let measure_id = insert_measure(&tx, person_id, &encoded)?;
        let raw = select_measure(&tx, measure_id)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    let raw = inserted.ok_or(Error::PersonNotFound(person_id))?;
    tracing::debug!(person_id, measure_id = raw.id, "recorded measure");
    raw.into_measure()
  }

  async fn find_measure(
    &self,
    person_id: i64,
    measure_type: &str,
    measure_id: i64,
  ) -> Result<Option<Measure>> {
    let measure_type = measure_type.to_owned();

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          select_measure(conn, measure_id)?
            .filter(|m| m.person_id == person_id && m.measure_type == measure_type),
        )
      })
      .await?;

    raw.map(RawMeasure::into_measure).transpose()
  }

  async fn measure_types(&self) -> Result<Vec<String>> {
    let types = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT measureType FROM Measure ORDER BY measureType",
        )?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(types)
  }
}
