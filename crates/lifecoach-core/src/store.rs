//! The `PersonStore` trait.
//!
//! Implemented by storage backends (e.g. `lifecoach-store-sqlite`). The API
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  measure::{Measure, NewMeasure},
  person::{NewPerson, Person},
};

/// Errors produced by a [`PersonStore`] backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` if the operation targeted a person or measure that does not
  /// exist.
  fn is_not_found(&self) -> bool;
}

/// Data access for [`Person`] records and the measures they own.
///
/// Every operation is one unit of work against storage: reads always observe
/// committed state, and each write either fully applies or has no effect.
/// Nothing is retried; retry policy belongs to the caller.
pub trait PersonStore: Send + Sync {
  type Error: StoreError;

  // ── Persons ───────────────────────────────────────────────────────────

  /// Look up a person by identifier. Returns `None` if not found.
  fn find_by_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// All persons, in identifier order.
  fn find_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Insert a new person and its initial measures atomically and return the
  /// stored record with its generated identifier.
  fn save(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Replace every mutable field of the person matched by `person.id`.
  ///
  /// `person.current_health` is ignored. Returns a not-found error if no
  /// person has that identifier.
  fn update(
    &self,
    person: Person,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Delete a person together with all of their measures.
  ///
  /// Returns a not-found error if the person does not exist.
  fn remove(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Measures ──────────────────────────────────────────────────────────

  /// The latest measure of each measure type owned by the person, ordered by
  /// measure type. Among measures sharing the latest timestamp, the one with
  /// the smallest identifier wins.
  fn current_health(
    &self,
    person_id: i64,
  ) -> impl Future<Output = Result<Vec<Measure>, Self::Error>> + Send + '_;

  /// Every measure of the person whose type equals `measure_type` exactly,
  /// oldest first (ties broken by identifier).
  fn history<'a>(
    &'a self,
    person_id: i64,
    measure_type: &'a str,
  ) -> impl Future<Output = Result<Vec<Measure>, Self::Error>> + Send + 'a;

  /// Record a new measure for an existing person.
  ///
  /// Returns a not-found error if the person does not exist.
  fn record_measure(
    &self,
    person_id: i64,
    input: NewMeasure,
  ) -> impl Future<Output = Result<Measure, Self::Error>> + Send + '_;

  /// Look up a single measure by identifier, scoped to its owner and type.
  fn find_measure<'a>(
    &'a self,
    person_id: i64,
    measure_type: &'a str,
    measure_id: i64,
  ) -> impl Future<Output = Result<Option<Measure>, Self::Error>> + Send + 'a;

  /// Every distinct measure type present in the store, sorted.
  fn measure_types(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;
}
