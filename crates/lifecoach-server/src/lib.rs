//! Server assembly for LifeCoach: configuration and the top-level router.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use lifecoach_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `LIFECOACH_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 5900 }

fn default_store_path() -> PathBuf { PathBuf::from("lifecoach.sqlite") }

impl ServerConfig {
  /// Layer the optional TOML file at `path` under the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("LIFECOACH"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API router wrapped in HTTP request tracing.
pub fn router(store: SqliteStore) -> Router {
  lifecoach_api::api_router(Arc::new(store)).layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use tower::ServiceExt as _;

  #[test]
  fn missing_config_file_uses_defaults() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/lifecoach.toml")).unwrap();
    assert_eq!(cfg.port, 5900);
    assert_eq!(cfg.store_path, PathBuf::from("lifecoach.sqlite"));
  }

  #[test]
  fn tilde_is_expanded_only_as_prefix() {
    assert_eq!(expand_tilde(Path::new("/a/~/b")), PathBuf::from("/a/~/b"));
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(
        expand_tilde(Path::new("~/db.sqlite")),
        PathBuf::from(home).join("db.sqlite")
      );
    }
  }

  #[tokio::test]
  async fn router_serves_api() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let req = Request::builder().uri("/person").body(Body::empty()).unwrap();
    let resp = router(store).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }
}
