//! The `ReportStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `fixit-store-sqlite`).
//! The engines and the service depend on this abstraction only; a store handle
//! is always passed in explicitly, never reached through global state.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  lifecycle::{EventLog, StatusEvent, TransitionPolicy},
  report::{Department, Report, ReportKey, Status},
};

// ─── Index queries ───────────────────────────────────────────────────────────

/// Which secondary index serves a (department, status) query.
///
/// Both orientations answer the same question; they differ only in which
/// field is the partition key and which is applied as a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndexOrientation {
  /// Partition on `department`, filter on `status`.
  #[default]
  #[serde(rename = "department")]
  ByDepartment,
  /// Partition on `status`, filter on `department`.
  #[serde(rename = "status")]
  ByStatus,
}

/// A single-partition, single-filter query against a secondary index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexQuery {
  pub orientation: IndexOrientation,
  pub department:  Department,
  pub status:      Status,
}

/// A projected index row. Carries the full primary key but not the
/// descriptive fields; resolve it with [`ReportStore::get_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
  pub report_id:  Uuid,
  pub created_at: DateTime<Utc>,
  pub department: Department,
  pub status:     Status,
}

impl IndexEntry {
  pub fn key(&self) -> ReportKey {
    ReportKey { report_id: self.report_id, created_at: self.created_at }
  }
}

// ─── Appends ─────────────────────────────────────────────────────────────────

/// What [`ReportStore::append_event`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
  Appended,
  /// No report has the event's id. Nothing was written.
  Missing,
  /// The policy forbids leaving `current` for the event's status. Nothing
  /// was written.
  Rejected { current: Status },
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a report store backend.
///
/// Every operation is individually atomic; callers never hold a transaction
/// across two calls.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ReportStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reports ───────────────────────────────────────────────────────────

  /// Insert a report. Fails if the key is already taken.
  fn put_report(
    &self,
    report: Report,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Point lookup by the full composite key. Returns `None` if absent.
  fn get_report(
    &self,
    key: ReportKey,
  ) -> impl Future<Output = Result<Option<Report>, Self::Error>> + Send + '_;

  /// Lookup by `report_id` alone. Returns `None` if absent.
  fn find_report(
    &self,
    report_id: Uuid,
  ) -> impl Future<Output = Result<Option<Report>, Self::Error>> + Send + '_;

  /// Every report in the store, unpaginated.
  fn scan_reports(
    &self,
  ) -> impl Future<Output = Result<Vec<Report>, Self::Error>> + Send + '_;

  // ── Secondary indexes ─────────────────────────────────────────────────

  /// Index rows matching `query`.
  fn query_index(
    &self,
    query: IndexQuery,
  ) -> impl Future<Output = Result<Vec<IndexEntry>, Self::Error>> + Send + '_;

  /// Number of index rows matching `query`, without fetching them.
  fn count_index(
    &self,
    query: IndexQuery,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Status events ─────────────────────────────────────────────────────

  /// Append `event` to `log` and move the owning report's current status to
  /// `log.status()`, atomically.
  ///
  /// `policy` is checked against the report's status as read inside the same
  /// atomic step. Re-appending an event with the same report and `created_at`
  /// replaces the stored one.
  fn append_event(
    &self,
    log: EventLog,
    event: StatusEvent,
    policy: TransitionPolicy,
  ) -> impl Future<Output = Result<AppendOutcome, Self::Error>> + Send + '_;

  /// All events for one report across every log, oldest first.
  fn events_for(
    &self,
    report_id: Uuid,
  ) -> impl Future<Output = Result<Vec<StatusEvent>, Self::Error>> + Send + '_;

  /// Every event in one log.
  fn scan_events(
    &self,
    log: EventLog,
  ) -> impl Future<Output = Result<Vec<StatusEvent>, Self::Error>> + Send + '_;
}
