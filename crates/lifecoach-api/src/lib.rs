//! REST API for the LifeCoach person store.
//!
//! Exposes an axum [`Router`] backed by any
//! [`lifecoach_core::store::PersonStore`]. Responses are XML unless the
//! client asks for JSON. Transport, TLS and request tracing are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = lifecoach_api::api_router(Arc::new(store));
//! ```

pub mod error;
pub mod measures;
pub mod people;
pub mod repr;

use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use lifecoach_core::store::PersonStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: PersonStore + 'static,
{
  Router::new()
    // Persons
    .route("/person", get(people::list::<S>).post(people::create::<S>))
    .route(
      "/person/{id}",
      get(people::get_one::<S>)
        .put(people::update::<S>)
        .delete(people::delete::<S>),
    )
    // Measures
    .route(
      "/person/{id}/{measure_type}",
      get(measures::history::<S>).post(measures::record::<S>),
    )
    .route("/person/{id}/{measure_type}/{mid}", get(measures::get_one::<S>))
    .route("/measureTypes", get(measures::types::<S>))
    .layer(middleware::from_fn(error::negotiate_errors))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
