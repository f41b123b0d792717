//! Handlers for `/person` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/person` | All persons |
//! | `POST`   | `/person` | Body: [`PersonBody`]; returns 201 + stored person |
//! | `GET`    | `/person/{id}` | 404 if not found |
//! | `PUT`    | `/person/{id}` | Body: [`PersonBody`]; replaces mutable fields |
//! | `DELETE` | `/person/{id}` | 204; 404 if not found |

use std::sync::Arc;

use axum::{
  extract::{Path, State},
  http::{HeaderMap, StatusCode},
  response::{IntoResponse, Response},
};
use bytes::Bytes;
use lifecoach_core::store::PersonStore;

use crate::{
  error::ApiError,
  repr::{self, Format, PeopleDoc, PersonBody, PersonDoc},
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /person`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: PersonStore,
{
  let people = store.find_all().await.map_err(ApiError::from_store)?;
  repr::render(
    Format::from_accept(&headers),
    StatusCode::OK,
    &PeopleDoc::from(people.as_slice()),
  )
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /person`: returns 201 + the stored person.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Response, ApiError>
where
  S: PersonStore,
{
  let body: PersonBody = repr::parse(Format::from_content_type(&headers), &body)?;
  let person = store
    .save(body.into_new_person()?)
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(person_id = person.id, "created person");
  repr::render(
    Format::from_accept(&headers),
    StatusCode::CREATED,
    &PersonDoc::from(&person),
  )
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /person/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: PersonStore,
{
  let person = store
    .find_by_id(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  repr::render(
    Format::from_accept(&headers),
    StatusCode::OK,
    &PersonDoc::from(&person),
  )
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /person/{id}`: fields left out of the representation (username,
/// email) keep their stored values unless the body supplies them.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Response, ApiError>
where
  S: PersonStore,
{
  let body: PersonBody = repr::parse(Format::from_content_type(&headers), &body)?;
  let existing = store
    .find_by_id(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;

  let person = store
    .update(body.apply_to(existing)?)
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(person_id = id, "updated person");
  repr::render(
    Format::from_accept(&headers),
    StatusCode::OK,
    &PersonDoc::from(&person),
  )
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /person/{id}`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Response, ApiError>
where
  S: PersonStore,
{
  store.remove(id).await.map_err(ApiError::from_store)?;
  tracing::info!(person_id = id, "deleted person");
  Ok(StatusCode::NO_CONTENT.into_response())
}
