//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Errors render as JSON (`{"error": "..."}`). [`negotiate_errors`] re-renders
//! them as `<error><message>…</message></error>` for clients that did not ask
//! for JSON.

use axum::{
  Json,
  extract::Request,
  http::StatusCode,
  middleware::Next,
  response::{IntoResponse, Response},
};
use lifecoach_core::store::StoreError;
use serde_json::json;
use thiserror::Error;

use crate::repr::{self, ErrorDoc, Format};

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("encoding error: {0}")]
  Encode(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a backend error, keeping not-found distinct from storage failures.
  pub fn from_store<E: StoreError>(e: E) -> Self {
    if e.is_not_found() {
      ApiError::NotFound(e.to_string())
    } else {
      ApiError::Store(Box::new(e))
    }
  }
}

impl From<lifecoach_core::Error> for ApiError {
  fn from(e: lifecoach_core::Error) -> Self { ApiError::BadRequest(e.to_string()) }
}

/// The message of an [`ApiError`] response, kept as a response extension.
#[derive(Debug, Clone)]
struct ErrorMessage(String);

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Encode(m) => {
        tracing::error!(error = %m, "failed to encode response");
        (StatusCode::INTERNAL_SERVER_ERROR, m.clone())
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    let mut response =
      (status, Json(json!({ "error": message.clone() }))).into_response();
    response.extensions_mut().insert(ErrorMessage(message));
    response
  }
}

/// Middleware: render [`ApiError`] responses in the format the request's
/// `Accept` header negotiated.
pub async fn negotiate_errors(req: Request, next: Next) -> Response {
  let format = Format::from_accept(req.headers());
  let response = next.run(req).await;
  if format == Format::Json {
    return response;
  }
  let Some(ErrorMessage(message)) = response.extensions().get::<ErrorMessage>().cloned() else {
    return response;
  };

  match repr::render(format, response.status(), &ErrorDoc { message }) {
    Ok(rendered) => rendered,
    Err(_) => response,
  }
}
