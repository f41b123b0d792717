//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, TimeZone as _, Utc};
use lifecoach_core::{
  measure::NewMeasure,
  person::{BirthDate, NewPerson},
  store::{PersonStore, StoreError as _},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn at(hour: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
}

fn ada() -> NewPerson {
  let mut p = NewPerson::new(
    "Ada",
    "Lovelace",
    BirthDate::from_ymd(1815, 12, 10).unwrap(),
  );
  p.username = "ada".into();
  p.email = "ada@example.com".into();
  p
}

// ─── Save / find ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_and_find_by_id() {
  let s = store().await;

  let saved = s.save(ada()).await.unwrap();
  assert!(saved.id > 0);
  assert!(saved.current_health.is_empty());

  let fetched = s.find_by_id(saved.id).await.unwrap().unwrap();
  assert_eq!(fetched, saved);
  assert_eq!(fetched.first_name, "Ada");
  assert_eq!(fetched.last_name, "Lovelace");
  assert_eq!(fetched.username, "ada");
  assert_eq!(fetched.email, "ada@example.com");
  assert_eq!(fetched.birthdate_string(), "1815-12-10");
}

#[tokio::test]
async fn find_by_id_missing_returns_none() {
  let s = store().await;
  assert!(s.find_by_id(42).await.unwrap().is_none());
}

#[tokio::test]
async fn identifiers_are_assigned_in_order() {
  let s = store().await;
  let a = s.save(ada()).await.unwrap();
  let turing =
    NewPerson::new("Alan", "Turing", BirthDate::from_ymd(1912, 6, 23).unwrap());
  let b = s.save(turing).await.unwrap();
  assert!(b.id > a.id);

  let all = s.find_all().await.unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(all[0].id, a.id);
  assert_eq!(all[1].id, b.id);
}

#[tokio::test]
async fn identifiers_are_not_reused_after_remove() {
  let s = store().await;
  let a = s.save(ada()).await.unwrap();
  s.remove(a.id).await.unwrap();
  let b = s.save(ada()).await.unwrap();
  assert!(b.id > a.id);
}

#[tokio::test]
async fn save_inserts_initial_measures() {
  let s = store().await;
  let mut input = ada();
  input.measures = vec![
    NewMeasure::new("weight", "60.5", at(1)),
    NewMeasure::new("weight", "61.0", at(2)),
    NewMeasure::new("height", "1.65", at(1)),
  ];

  let saved = s.save(input).await.unwrap();
  let types: Vec<_> = saved
    .current_health
    .iter()
    .map(|m| (m.measure_type.as_str(), m.value.as_str()))
    .collect();
  assert_eq!(types, [("height", "1.65"), ("weight", "61.0")]);
  assert!(saved.current_health.iter().all(|m| m.person_id == saved.id));
}

#[tokio::test]
async fn find_all_attaches_current_health_per_person() {
  let s = store().await;
  let a = s.save(ada()).await.unwrap();
  let b = s.save(ada()).await.unwrap();
  s.record_measure(a.id, NewMeasure::new("weight", "60", at(1))).await.unwrap();
  s.record_measure(b.id, NewMeasure::new("steps", "9000", at(1))).await.unwrap();
  s.record_measure(b.id, NewMeasure::new("steps", "12000", at(3))).await.unwrap();

  let all = s.find_all().await.unwrap();
  assert_eq!(all[0].current_health.len(), 1);
  assert_eq!(all[0].current_health[0].measure_type, "weight");
  assert_eq!(all[1].current_health.len(), 1);
  assert_eq!(all[1].current_health[0].value, "12000");
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_replaces_fields() {
  let s = store().await;
  let mut person = s.save(ada()).await.unwrap();

  person.first_name = "Augusta Ada".into();
  person.last_name = "King".into();
  person.email = "countess@example.com".into();
  person.set_birthdate("1815-12-11").unwrap();

  let updated = s.update(person.clone()).await.unwrap();
  assert_eq!(updated, person);

  let fetched = s.find_by_id(person.id).await.unwrap().unwrap();
  assert_eq!(fetched.first_name, "Augusta Ada");
  assert_eq!(fetched.last_name, "King");
  assert_eq!(fetched.email, "countess@example.com");
  assert_eq!(fetched.birthdate_string(), "1815-12-11");
}

#[tokio::test]
async fn update_missing_is_not_found() {
  let s = store().await;
  let mut person = s.save(ada()).await.unwrap();
  person.id += 100;

  let err = s.update(person).await.unwrap_err();
  assert!(matches!(err, Error::PersonNotFound(_)), "{err}");
  assert!(err.is_not_found());
}

#[tokio::test]
async fn update_keeps_measures() {
  let s = store().await;
  let mut person = s.save(ada()).await.unwrap();
  s.record_measure(person.id, NewMeasure::new("weight", "60", at(1)))
    .await
    .unwrap();

  person.current_health.clear();
  person.last_name = "King".into();
  let updated = s.update(person).await.unwrap();
  assert_eq!(updated.current_health.len(), 1);
}

// ─── Remove ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn remove_then_find_is_none() {
  let s = store().await;
  let person = s.save(ada()).await.unwrap();

  s.remove(person.id).await.unwrap();
  assert!(s.find_by_id(person.id).await.unwrap().is_none());
}

#[tokio::test]
async fn remove_twice_is_not_found() {
  let s = store().await;
  let person = s.save(ada()).await.unwrap();
  s.remove(person.id).await.unwrap();

  let err = s.remove(person.id).await.unwrap_err();
  assert!(matches!(err, Error::PersonNotFound(id) if id == person.id));
}

#[tokio::test]
async fn remove_cascades_to_measures() {
  let s = store().await;
  let person = s.save(ada()).await.unwrap();
  s.record_measure(person.id, NewMeasure::new("weight", "60", at(1)))
    .await
    .unwrap();

  s.remove(person.id).await.unwrap();
  assert!(s.history(person.id, "weight").await.unwrap().is_empty());
  assert!(s.measure_types().await.unwrap().is_empty());
}

// ─── Current health / history ────────────────────────────────────────────────

async fn person_with_readings(s: &SqliteStore) -> i64 {
  let person = s.save(ada()).await.unwrap();
  for (ty, value, hour) in [("A", "a1", 1), ("A", "a2", 2), ("B", "b1", 1)] {
    s.record_measure(person.id, NewMeasure::new(ty, value, at(hour)))
      .await
      .unwrap();
  }
  person.id
}

#[tokio::test]
async fn current_health_is_latest_per_type() {
  let s = store().await;
  let id = person_with_readings(&s).await;

  let current = s.current_health(id).await.unwrap();
  let got: Vec<_> = current
    .iter()
    .map(|m| (m.measure_type.as_str(), m.timestamp))
    .collect();
  assert_eq!(got, [("A", at(2)), ("B", at(1))]);

  let person = s.find_by_id(id).await.unwrap().unwrap();
  assert_eq!(person.current_health, current);
}

#[tokio::test]
async fn current_health_tie_goes_to_smallest_id() {
  let s = store().await;
  let person = s.save(ada()).await.unwrap();
  let first = s
    .record_measure(person.id, NewMeasure::new("A", "first", at(5)))
    .await
    .unwrap();
  s.record_measure(person.id, NewMeasure::new("A", "second", at(5)))
    .await
    .unwrap();

  let current = s.current_health(person.id).await.unwrap();
  assert_eq!(current.len(), 1);
  assert_eq!(current[0].id, first.id);
}

#[tokio::test]
async fn history_is_exact_match_in_time_order() {
  let s = store().await;
  let id = person_with_readings(&s).await;
  // Recorded out of order: must still come back oldest first.
  s.record_measure(id, NewMeasure::new("A", "a0", at(0))).await.unwrap();

  let history = s.history(id, "A").await.unwrap();
  let values: Vec<_> = history.iter().map(|m| m.value.as_str()).collect();
  assert_eq!(values, ["a0", "a1", "a2"]);

  assert!(s.history(id, "%").await.unwrap().is_empty());
  assert!(s.history(id, "a").await.unwrap().is_empty());
  assert!(s.history(id, "C").await.unwrap().is_empty());
}

#[tokio::test]
async fn history_is_scoped_to_person() {
  let s = store().await;
  let id = person_with_readings(&s).await;
  let other = person_with_readings(&s).await;

  let history = s.history(id, "B").await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].person_id, id);
  assert_ne!(id, other);
}

// ─── Measures ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_measure_for_missing_person_is_not_found() {
  let s = store().await;
  let err = s
    .record_measure(7, NewMeasure::new("weight", "60", at(1)))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PersonNotFound(7)));
  assert!(s.measure_types().await.unwrap().is_empty());
}

#[tokio::test]
async fn record_and_find_measure() {
  let s = store().await;
  let person = s.save(ada()).await.unwrap();

  let mut input = NewMeasure::new("weight", "60.5", at(8));
  input.value_type = Some("double".into());
  let recorded = s.record_measure(person.id, input).await.unwrap();
  assert_eq!(recorded.value_type.as_deref(), Some("double"));
  assert_eq!(recorded.timestamp, at(8));

  let found = s
    .find_measure(person.id, "weight", recorded.id)
    .await
    .unwrap();
  assert_eq!(found, Some(recorded.clone()));

  // Wrong type or owner yields nothing.
  assert!(s.find_measure(person.id, "height", recorded.id).await.unwrap().is_none());
  assert!(s.find_measure(person.id + 1, "weight", recorded.id).await.unwrap().is_none());
}

#[tokio::test]
async fn measure_types_are_distinct_and_sorted() {
  let s = store().await;
  person_with_readings(&s).await;
  person_with_readings(&s).await;

  assert_eq!(s.measure_types().await.unwrap(), ["A", "B"]);
}

#[tokio::test]
async fn far_future_measure_is_rejected_before_insert() {
  let s = store().await;
  let person = s.save(ada()).await.unwrap();
  let far = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();

  let err = s
    .record_measure(person.id, NewMeasure::new("weight", "1", far))
    .await
    .unwrap_err();
  assert!(
    matches!(err, Error::Core(lifecoach_core::Error::TimestampOutOfRange(_))),
    "{err}"
  );
  assert!(!err.is_not_found());

  // Nothing was written, so reads keep working.
  assert!(s.history(person.id, "weight").await.unwrap().is_empty());
  assert!(s.find_by_id(person.id).await.unwrap().is_some());
  assert_eq!(s.find_all().await.unwrap().len(), 1);

  let mut input = ada();
  input.measures = vec![NewMeasure::new("weight", "1", far)];
  assert!(s.save(input).await.is_err());
  assert_eq!(s.find_all().await.unwrap().len(), 1);
}

// ─── Atomicity ───────────────────────────────────────────────────────────────

const REJECT_FAILING_MEASURES: &str = "
  CREATE TRIGGER reject_failing_measures BEFORE INSERT ON Measure
  WHEN NEW.measureValue = 'fail'
  BEGIN
    SELECT RAISE(ABORT, 'measure rejected');
  END;
";

#[tokio::test]
async fn failed_measure_insert_rolls_back_save() {
  let s = store().await;
  s.execute_batch(REJECT_FAILING_MEASURES).await.unwrap();

  let mut input = ada();
  input.measures = vec![
    NewMeasure::new("weight", "60", at(1)),
    NewMeasure::new("height", "fail", at(1)),
  ];
  let err = s.save(input).await.unwrap_err();
  assert!(matches!(err, Error::Database(_)), "{err}");

  assert!(s.find_all().await.unwrap().is_empty());
  assert!(s.measure_types().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_record_measure_leaves_history_unchanged() {
  let s = store().await;
  s.execute_batch(REJECT_FAILING_MEASURES).await.unwrap();
  let person = s.save(ada()).await.unwrap();
  s.record_measure(person.id, NewMeasure::new("weight", "60", at(1)))
    .await
    .unwrap();

  let err = s
    .record_measure(person.id, NewMeasure::new("weight", "fail", at(2)))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Database(_)), "{err}");

  let history = s.history(person.id, "weight").await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].value, "60");

  // The store stays usable after a rolled-back write.
  s.record_measure(person.id, NewMeasure::new("weight", "61", at(3)))
    .await
    .unwrap();
  assert_eq!(s.history(person.id, "weight").await.unwrap().len(), 2);
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_a_file_store_keeps_records() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("lifecoach.sqlite");

  let id = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.save(ada()).await.unwrap().id
  };

  let s = SqliteStore::open(&path).await.unwrap();
  let person = s.find_by_id(id).await.unwrap().unwrap();
  assert_eq!(person.first_name, "Ada");
}
