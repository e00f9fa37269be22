//! Report types — the primary entity of the fixit store.
//!
//! A report is created once with status [`Status::Report`] and afterwards only
//! its `status` moves, driven by status events (see [`crate::lifecycle`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

// ─── Enumerations ────────────────────────────────────────────────────────────

/// The department a report is filed against.
///
/// Declaration order is the fixed dashboard order; every per-department
/// vector produced by the engines is positioned by it.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
pub enum Department {
  #[serde(rename = "HR")]
  #[strum(serialize = "HR")]
  Hr,
  Facility,
  Production,
  Finance,
  Maintenance,
}

/// The lifecycle stage of a report.
///
/// Variants are ordered by progression: `Report < Ack < Processing < Done`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
pub enum Status {
  /// Initial state, set at creation.
  Report,
  Ack,
  Processing,
  Done,
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// The composite primary key of a report in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportKey {
  pub report_id:  Uuid,
  pub created_at: DateTime<Utc>,
}

/// A submitted issue.
///
/// Field names on the wire follow the dashboard's JSON (`createdAt` is
/// camel-cased, everything else snake-cased).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
  pub report_id:  Uuid,
  #[serde(rename = "createdAt")]
  pub created_at: DateTime<Utc>,
  pub department: Department,
  pub status:     Status,
  pub topic:      String,
  pub details:    String,
  /// Opaque to the core: either a free-text place or a coordinate object.
  pub location:   serde_json::Value,
  pub username:   String,
}

impl Report {
  pub fn key(&self) -> ReportKey {
    ReportKey { report_id: self.report_id, created_at: self.created_at }
  }
}

// ─── NewReport ───────────────────────────────────────────────────────────────

/// Input to [`crate::service::ReportService::create_report`].
///
/// `report_id` and `status` are always assigned by the service.
#[derive(Debug, Clone)]
pub struct NewReport {
  pub department: Department,
  pub topic:      String,
  pub details:    String,
  pub location:   serde_json::Value,
  pub username:   String,
  /// Client-supplied creation time; the service clock is used when absent.
  pub created_at: Option<DateTime<Utc>>,
}

impl NewReport {
  /// Convenience constructor with empty descriptive fields.
  pub fn new(department: Department, topic: impl Into<String>) -> Self {
    Self {
      department,
      topic: topic.into(),
      details: String::new(),
      location: serde_json::Value::Null,
      username: String::new(),
      created_at: None,
    }
  }
}
