//! JSON REST API for fixit.
//!
//! Exposes an axum [`Router`] backed by a [`ReportService`] over any
//! [`fixit_core::store::ReportStore`]. TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", fixit_api::api_router(service.clone()))
//! ```

pub mod error;
pub mod extract;
pub mod reports;

use axum::{
  Router,
  routing::{get, put},
};
use fixit_core::{service::ReportService, store::ReportStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(service: ReportService<S>) -> Router<()>
where
  S: ReportStore + 'static,
{
  Router::new()
    .route("/reports", get(reports::list::<S>).post(reports::create::<S>))
    // Dashboard
    .route("/reports/stats", get(reports::stats::<S>))
    .route("/reports/details", get(reports::details::<S>))
    .route("/reports/status-change-times", get(reports::status_change_times::<S>))
    // Single report
    .route("/reports/{report_id}", get(reports::get_one::<S>))
    .route("/reports/{report_id}/history", get(reports::history::<S>))
    .route("/reports/{report_id}/status", put(reports::update_status::<S>))
    .with_state(service)
}
