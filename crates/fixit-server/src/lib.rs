//! HTTP server assembly for fixit.
//!
//! Loads [`ServerConfig`], wires a [`ReportService`] over any
//! [`ReportStore`], and mounts the JSON API under `/api`.

pub mod seed;

use std::path::{Path, PathBuf};

use axum::Router;
use fixit_core::{
  lifecycle::TransitionPolicy,
  service::{ReportService, ServiceConfig},
  store::{IndexOrientation, ReportStore},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered
/// under `FIXIT_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub store_path:        PathBuf,
  /// `department` or `status`.
  pub index_orientation: IndexOrientation,
  /// `unconstrained` or `forward_only`.
  pub transition_policy: TransitionPolicy,
}

impl ServerConfig {
  /// Read `path` (optional) and the environment, falling back to defaults
  /// for anything neither sets.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 3000)?
      .set_default("store_path", "fixit.db")?
      .set_default("index_orientation", "department")?
      .set_default("transition_policy", "unconstrained")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("FIXIT"))
      .build()?
      .try_deserialize()
  }

  pub fn service_config(&self) -> ServiceConfig {
    ServiceConfig {
      orientation: self.index_orientation,
      policy:      self.transition_policy,
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application [`Router`]: the API under `/api`, with request
/// tracing.
pub fn app<S>(service: ReportService<S>) -> Router
where
  S: ReportStore + 'static,
{
  Router::new()
    .nest("/api", fixit_api::api_router(service))
    .layer(TraceLayer::new_for_http())
}
