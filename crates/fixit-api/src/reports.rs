//! Handlers for `/reports` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/reports` | Every report, unpaginated |
//! | `GET`  | `/reports/stats` | Department × status count vectors |
//! | `GET`  | `/reports/details` | `?department=&status=`; full reports |
//! | `GET`  | `/reports/status-change-times` | Mean days per lifecycle step |
//! | `GET`  | `/reports/{report_id}` | 404 if not found |
//! | `GET`  | `/reports/{report_id}/history` | Status events, oldest first |
//! | `POST` | `/reports` | Body: [`CreateBody`]; returns 201 + id |
//! | `PUT`  | `/reports/{report_id}/status` | Body: [`StatusBody`] |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use fixit_core::{
  lifecycle::{StatusEvent, StatusUpdate},
  report::{Department, NewReport, Report},
  service::ReportService,
  stats::ReportStats,
  store::ReportStore,
  timings::StatusChangeTimes,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  error::{ApiError, OrApiError as _},
  extract::{JsonBody, QueryParams, optional_utc},
};

/// Parse a path id. A malformed id cannot name an existing report.
fn report_id(raw: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Report not found"))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /reports`
pub async fn list<S>(
  State(service): State<ReportService<S>>,
) -> Result<Json<Vec<Report>>, ApiError>
where
  S: ReportStore,
{
  let reports = service.list_reports().await.or_api("Could not load reports")?;
  Ok(Json(reports))
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

/// `GET /reports/stats`
pub async fn stats<S>(
  State(service): State<ReportService<S>>,
) -> Result<Json<ReportStats>, ApiError>
where
  S: ReportStore,
{
  let stats = service.stats().await.or_api("Could not load report stats")?;
  Ok(Json(stats))
}

/// Missing values are empty strings and fail validation like unknown ones.
#[derive(Debug, Deserialize)]
pub struct DetailsParams {
  #[serde(default)]
  pub department: String,
  #[serde(default)]
  pub status:     String,
}

/// `GET /reports/details?department=<department>&status=<status>`
pub async fn details<S>(
  State(service): State<ReportService<S>>,
  QueryParams(params): QueryParams<DetailsParams>,
) -> Result<Json<Vec<Report>>, ApiError>
where
  S: ReportStore,
{
  let reports = service
    .details_by_name(&params.department, &params.status)
    .await
    .or_api("Could not load report details")?;
  Ok(Json(reports))
}

/// `GET /reports/status-change-times`
pub async fn status_change_times<S>(
  State(service): State<ReportService<S>>,
) -> Result<Json<StatusChangeTimes>, ApiError>
where
  S: ReportStore,
{
  let times = service
    .status_change_times()
    .await
    .or_api("Could not load status change times")?;
  Ok(Json(times))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /reports/{report_id}`
pub async fn get_one<S>(
  State(service): State<ReportService<S>>,
  Path(raw_id): Path<String>,
) -> Result<Json<Report>, ApiError>
where
  S: ReportStore,
{
  let report = service
    .get_report(report_id(&raw_id)?)
    .await
    .or_api("Could not load report")?;
  Ok(Json(report))
}

/// `GET /reports/{report_id}/history`
pub async fn history<S>(
  State(service): State<ReportService<S>>,
  Path(raw_id): Path<String>,
) -> Result<Json<Vec<StatusEvent>>, ApiError>
where
  S: ReportStore,
{
  let events = service
    .report_history(report_id(&raw_id)?)
    .await
    .or_api("Could not load report history")?;
  Ok(Json(events))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /reports`.
///
/// A `status` field may be present; it is ignored because every report
/// starts as `Report`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub department: Department,
  #[serde(default)]
  pub topic:      String,
  #[serde(default)]
  pub details:    String,
  #[serde(default)]
  pub location:   Value,
  #[serde(default)]
  pub username:   String,
  /// RFC 3339, or offset-free ISO 8601 read as UTC.
  #[serde(rename = "createdAt", default, deserialize_with = "optional_utc")]
  pub created_at: Option<DateTime<Utc>>,
}

impl From<CreateBody> for NewReport {
  fn from(b: CreateBody) -> Self {
    NewReport {
      department: b.department,
      topic:      b.topic,
      details:    b.details,
      location:   b.location,
      username:   b.username,
      created_at: b.created_at,
    }
  }
}

/// `POST /reports` — returns 201 + `{"message", "report_id"}`.
pub async fn create<S>(
  State(service): State<ReportService<S>>,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReportStore,
{
  let report_id = service
    .create_report(NewReport::from(body))
    .await
    .or_api("Could not create report")?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "Report created successfully", "report_id": report_id })),
  ))
}

// ─── Update status ────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /reports/{report_id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusBody {
  /// Absent is treated as an unknown status.
  #[serde(default)]
  pub status:       String,
  #[serde(default)]
  pub comment:      String,
  #[serde(default)]
  pub updater:      String,
  #[serde(default)]
  pub updater_role: String,
  #[serde(rename = "createdAt", default, deserialize_with = "optional_utc")]
  pub created_at:   Option<DateTime<Utc>>,
}

/// `PUT /reports/{report_id}/status` — body: [`StatusBody`].
pub async fn update_status<S>(
  State(service): State<ReportService<S>>,
  Path(raw_id): Path<String>,
  JsonBody(body): JsonBody<StatusBody>,
) -> Result<Json<Value>, ApiError>
where
  S: ReportStore,
{
  let update = StatusUpdate {
    comment:      body.comment,
    updater:      body.updater,
    updater_role: body.updater_role,
    created_at:   body.created_at,
  };
  let status = service
    .update_status(report_id(&raw_id)?, &body.status, update)
    .await
    .or_api("Could not update report status")?;
  Ok(Json(json!({ "message": format!("Report status updated to {status}") })))
}
