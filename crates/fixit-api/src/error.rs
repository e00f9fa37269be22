//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Store failures are logged with their full source chain and answered with
//! an opaque message; nothing from the store reaches the client.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(&'static str),

  #[error("bad request: {0}")]
  BadRequest(&'static str),

  #[error("conflict: {0}")]
  Conflict(&'static str),

  #[error("{message}")]
  Internal {
    message: &'static str,
    #[source]
    source:  fixit_core::Error,
  },
}

impl ApiError {
  /// Classify a core error. Store failures are reported as `message`.
  pub fn from_core(err: fixit_core::Error, message: &'static str) -> Self {
    use fixit_core::Error as E;
    match err {
      E::NotFound(id) => {
        tracing::debug!(report_id = %id, "report not found");
        ApiError::NotFound("Report not found")
      }
      E::InvalidStatus(s) => {
        tracing::warn!(status = %s, "rejected invalid status");
        ApiError::BadRequest("Invalid status")
      }
      E::InvalidDepartment(d) => {
        tracing::warn!(department = %d, "rejected unknown department");
        ApiError::BadRequest("Unknown department")
      }
      E::TransitionRejected { from, to } => {
        tracing::warn!(%from, %to, "rejected status transition");
        ApiError::Conflict("Status transition not allowed")
      }
      source => ApiError::Internal { message, source },
    }
  }
}

/// `.or_api("...")` on core results inside handlers.
pub(crate) trait OrApiError<T> {
  fn or_api(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> OrApiError<T> for fixit_core::Result<T> {
  fn or_api(self, message: &'static str) -> Result<T, ApiError> {
    self.map_err(|e| ApiError::from_core(e, message))
  }
}

/// `a: b: c` rendering of an error and its sources.
fn chain(err: &(dyn std::error::Error + 'static)) -> String {
  std::iter::successors(Some(err), |&e| e.source())
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join(": ")
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, *m),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, *m),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, *m),
      ApiError::Internal { message, source } => {
        tracing::error!(error = %chain(source), "{message}");
        (StatusCode::INTERNAL_SERVER_ERROR, *message)
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
