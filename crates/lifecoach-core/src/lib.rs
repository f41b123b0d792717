//! Core types and trait definitions for the LifeCoach person store.
//!
//! This crate is free of HTTP and database dependencies. The storage
//! backends and the API layer depend on it.

pub mod error;
pub mod measure;
pub mod person;
pub mod store;

pub use error::{Error, Result};
