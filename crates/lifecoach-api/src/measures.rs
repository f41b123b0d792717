//! Handlers for measure endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/person/{id}/{measureType}` | History, oldest first |
//! | `POST` | `/person/{id}/{measureType}` | Body: [`MeasureBody`]; returns 201 |
//! | `GET`  | `/person/{id}/{measureType}/{mid}` | 404 if not found |
//! | `GET`  | `/measureTypes` | Distinct types in the store |

use std::sync::Arc;

use axum::{
  extract::{Path, State},
  http::{HeaderMap, StatusCode},
  response::Response,
};
use bytes::Bytes;
use lifecoach_core::store::PersonStore;

use crate::{
  error::ApiError,
  repr::{self, Format, MeasureBody, MeasureDoc, MeasureList, MeasureTypesDoc},
};

// ─── History ──────────────────────────────────────────────────────────────────

/// `GET /person/{id}/{measureType}`
pub async fn history<S>(
  State(store): State<Arc<S>>,
  Path((id, measure_type)): Path<(i64, String)>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: PersonStore,
{
  if store.find_by_id(id).await.map_err(ApiError::from_store)?.is_none() {
    return Err(ApiError::NotFound(format!("person {id} not found")));
  }

  let measures = store
    .history(id, &measure_type)
    .await
    .map_err(ApiError::from_store)?;
  repr::render(
    Format::from_accept(&headers),
    StatusCode::OK,
    &MeasureList::from(measures.as_slice()),
  )
}

// ─── Record ───────────────────────────────────────────────────────────────────

/// `POST /person/{id}/{measureType}`: the path's measure type overrides any
/// `measureType` in the body.
pub async fn record<S>(
  State(store): State<Arc<S>>,
  Path((id, measure_type)): Path<(i64, String)>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Response, ApiError>
where
  S: PersonStore,
{
  let body: MeasureBody = repr::parse(Format::from_content_type(&headers), &body)?;
  let measure = store
    .record_measure(id, body.into_new_measure(Some(&measure_type))?)
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(person_id = id, measure_id = measure.id, "recorded measure");
  repr::render(
    Format::from_accept(&headers),
    StatusCode::CREATED,
    &MeasureDoc::from(&measure),
  )
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /person/{id}/{measureType}/{mid}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path((id, measure_type, mid)): Path<(i64, String, i64)>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: PersonStore,
{
  let measure = store
    .find_measure(id, &measure_type, mid)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("measure {mid} of person {id} not found"))
    })?;
  repr::render(
    Format::from_accept(&headers),
    StatusCode::OK,
    &MeasureDoc::from(&measure),
  )
}

// ─── Types ────────────────────────────────────────────────────────────────────

/// `GET /measureTypes`
pub async fn types<S>(
  State(store): State<Arc<S>>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: PersonStore,
{
  let types = store.measure_types().await.map_err(ApiError::from_store)?;
  repr::render(
    Format::from_accept(&headers),
    StatusCode::OK,
    &MeasureTypesDoc { types },
  )
}
